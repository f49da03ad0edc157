//! Bridge between the executor and the engine.

use std::sync::Arc;

use sportsdb_engine::{Database, EntityStore};

/// Engine handles shared by every handler.
pub struct Primitives {
    pub db: Arc<Database>,
    pub store: EntityStore,
}

impl Primitives {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            store: EntityStore::new(db.clone()),
            db,
        }
    }
}
