//! The command executor.

use std::sync::Arc;

use sportsdb_engine::Database;
use tracing::debug;

use crate::bridge::Primitives;
use crate::convert::convert_result;
use crate::handlers;
use crate::{Command, Output, Result};

/// Dispatches [`Command`]s to the engine.
///
/// Cheap to clone; clones share the same database.
#[derive(Clone)]
pub struct Executor {
    primitives: Arc<Primitives>,
}

impl Executor {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            primitives: Arc::new(Primitives::new(db)),
        }
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.primitives.db
    }

    /// Execute one command.
    pub fn execute(&self, command: Command) -> Result<Output> {
        let p = &self.primitives;
        debug!(command = command.name(), kind = %command.kind(), "Executing");

        match command {
            Command::Create { kind, attrs } => handlers::entity::create(p, kind, &attrs),
            Command::Update { kind, id, attrs } => handlers::entity::update(p, kind, id, &attrs),
            Command::Get { kind, id } => handlers::entity::get(p, kind, id),
            Command::Deactivate { kind, id } => handlers::lifecycle::deactivate(p, kind, id),
            Command::Activate { kind, id } => handlers::lifecycle::activate(p, kind, id),
            Command::Filter { kind, expression } => handlers::query::filter(p, kind, &expression),
        }
    }

    /// Persist the store, if it persists anything.
    pub fn flush(&self) -> Result<()> {
        convert_result(self.primitives.db.flush())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde_json::json;
    use sportsdb_core::EntityKind;
    use sportsdb_engine::SportsDbConfig;

    fn executor() -> Executor {
        Executor::new(Database::cache().unwrap())
    }

    fn run(ex: &Executor, op: &str, kind: &str, args: &[&str]) -> Result<Output> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        ex.execute(Command::parse(op, kind, &args)?)
    }

    fn id_of(output: &Output) -> String {
        match output {
            Output::Entity(record) => record.id().to_string(),
            other => panic!("Expected Entity, got {other:?}"),
        }
    }

    #[test]
    fn test_create_get_roundtrip() {
        let ex = executor();
        let created = run(&ex, "create", "sport", &[r#"{"name": "Football", "active": true}"#]).unwrap();
        let id = id_of(&created);
        let fetched = run(&ex, "get", "sport", &[id.as_str()]).unwrap();
        assert_eq!(created, fetched);

        let json: serde_json::Value = serde_json::from_str(&fetched.to_json_string().unwrap()).unwrap();
        assert_eq!(json["kind"], "sport");
        assert_eq!(json["slug"], "football");
        assert_eq!(json["events"], json!([]));
    }

    #[test]
    fn test_hierarchy_through_commands() {
        let ex = executor();
        let sport = id_of(&run(&ex, "create", "sport", &[r#"{"name": "Tennis", "active": true}"#]).unwrap());
        let start = chrono::Utc::now().timestamp() + 3600;
        let event_attrs = format!(
            r#"{{"name": "Final", "active": true, "type": "INPLAY", "status": "PENDING", "sport": {sport}, "scheduled_start": {start}}}"#
        );
        let event = id_of(&run(&ex, "create", "event", &[event_attrs.as_str()]).unwrap());
        let selection_attrs = format!(
            r#"{{"name": "Player A", "active": true, "event": {event}, "price": 1.006, "outcome": "UNSETTLED"}}"#
        );
        let selection = run(&ex, "create", "selection", &[selection_attrs.as_str()]).unwrap();
        let Output::Entity(record) = &selection else { panic!("Expected Entity") };
        assert_eq!(record.entity.as_selection().unwrap().price, 1.01);

        let deactivated = run(&ex, "deactivate", "selection", &[record.id().to_string().as_str()]).unwrap();
        assert_eq!(id_of(&deactivated), record.id().to_string());

        let Output::Entity(sport_record) = run(&ex, "get", "sport", &[sport.as_str()]).unwrap() else {
            panic!("Expected Entity")
        };
        assert!(!sport_record.entity.is_active());

        let reactivated = run(&ex, "activate", "sport", &[sport.as_str()]).unwrap();
        let Output::Entity(sport_record) = reactivated else { panic!("Expected Entity") };
        assert!(sport_record.entity.is_active());
    }

    #[test]
    fn test_filter_returns_entities() {
        let ex = executor();
        for name in ["Sport 1", "Sport 2", "Other"] {
            let attrs = json!({ "name": name }).to_string();
            run(&ex, "create", "sport", &[attrs.as_str()]).unwrap();
        }
        match run(&ex, "filter", "sport", &["regex:Sport"]).unwrap() {
            Output::Entities(records) => {
                assert_eq!(records.len(), 2);
                assert!(records.iter().all(|r| r.kind == EntityKind::Sport));
            }
            other => panic!("Expected Entities, got {other:?}"),
        }
    }

    #[test]
    fn test_error_kinds() {
        let ex = executor();
        let missing = run(&ex, "get", "event", &["12345"]).unwrap_err();
        assert!(missing.is_not_found());

        let start = chrono::Utc::now().timestamp() + 3600;
        let orphan = format!(
            r#"{{"name": "Orphan", "type": 0, "status": 0, "sport": 1, "scheduled_start": {start}}}"#
        );
        assert!(matches!(
            run(&ex, "create", "event", &[orphan.as_str()]),
            Err(Error::DanglingReference { .. })
        ));
        assert!(matches!(
            run(&ex, "create", "sport", &[r#"{"name": ""}"#]),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            run(&ex, "filter", "sport", &["colour:==1"]),
            Err(Error::InvalidFilter { .. })
        ));
        assert!(matches!(
            run(&ex, "get", "sport", &["x"]),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_flush_persists_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let config = SportsDbConfig::default().with_snapshot_path(&path);

        let ex = Executor::new(Database::open(config.clone()).unwrap());
        let created = run(&ex, "create", "sport", &[r#"{"name": "Darts"}"#]).unwrap();
        ex.flush().unwrap();
        assert!(path.exists());
        drop(ex);

        let ex = Executor::new(Database::open(config).unwrap());
        let fetched = run(&ex, "get", "sport", &[id_of(&created).as_str()]).unwrap();
        assert_eq!(fetched, created);
    }
}
