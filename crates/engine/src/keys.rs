//! Key construction and parsing for entity storage.
//!
//! Every entity field lives under its own key:
//! `{kind}:{id}:{field}`, e.g. `sport:1784120455512345:name`.

use sportsdb_core::{EntityId, EntityKind, SportsError, SportsResult};

/// Separator used between key segments.
const SEP: char = ':';

/// Field whose presence marks an entity as existing.
pub const NAME_FIELD: &str = "name";

// =============================================================================
// Validation
// =============================================================================

/// Validate a field name for use in a key.
pub fn validate_field_name(field: &str) -> SportsResult<()> {
    if field.is_empty() {
        return Err(SportsError::invalid_input("Field name must not be empty"));
    }
    if field.contains(SEP) {
        return Err(SportsError::invalid_input(
            "Field name must not contain ':'",
        ));
    }
    Ok(())
}

// =============================================================================
// Key Construction
// =============================================================================

/// Key for one field of one entity: `{kind}:{id}:{field}`
pub fn field_key(kind: EntityKind, id: EntityId, field: &str) -> String {
    format!("{}{SEP}{}{SEP}{}", kind.as_str(), id, field)
}

/// Key for an entity's name: `{kind}:{id}:name`
pub fn name_key(kind: EntityKind, id: EntityId) -> String {
    field_key(kind, id, NAME_FIELD)
}

/// KEYS pattern matching the name key of every entity of a kind:
/// `{kind}:*:name`
pub fn name_pattern(kind: EntityKind) -> String {
    format!("{}{SEP}*{SEP}{}", kind.as_str(), NAME_FIELD)
}

// =============================================================================
// Key Parsing
// =============================================================================

/// Parse a field key back into (kind, id, field).
pub fn parse_field_key(key: &str) -> Option<(EntityKind, EntityId, String)> {
    let parts: Vec<&str> = key.splitn(3, SEP).collect();
    if parts.len() != 3 || parts[2].is_empty() {
        return None;
    }
    let kind = parts[0].parse::<EntityKind>().ok()?;
    if parts[0] != kind.as_str() {
        return None;
    }
    let id = parts[1].parse::<u64>().ok()?;
    Some((kind, EntityId::from_raw(id), parts[2].to_string()))
}

/// Parse the id out of a name key of the given kind.
pub fn parse_name_key(kind: EntityKind, key: &str) -> Option<EntityId> {
    match parse_field_key(key)? {
        (k, id, field) if k == kind && field == NAME_FIELD => Some(id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> EntityId {
        EntityId::from_raw(raw)
    }

    #[test]
    fn field_key_format() {
        assert_eq!(field_key(EntityKind::Sport, id(42), "name"), "sport:42:name");
        assert_eq!(
            field_key(EntityKind::Selection, id(7), "price"),
            "selection:7:price"
        );
        assert_eq!(name_key(EntityKind::Event, id(9)), "event:9:name");
    }

    #[test]
    fn name_pattern_format() {
        assert_eq!(name_pattern(EntityKind::Sport), "sport:*:name");
        assert_eq!(name_pattern(EntityKind::Selection), "selection:*:name");
    }

    #[test]
    fn keys_are_distinct_across_kinds_and_fields() {
        let a = field_key(EntityKind::Sport, id(1), "name");
        let b = field_key(EntityKind::Event, id(1), "name");
        let c = field_key(EntityKind::Sport, id(1), "slug");
        let d = field_key(EntityKind::Sport, id(11), "name");
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn parse_roundtrip() {
        let key = field_key(EntityKind::Event, id(123), "scheduled_start");
        assert_eq!(
            parse_field_key(&key),
            Some((EntityKind::Event, id(123), "scheduled_start".to_string()))
        );
    }

    #[test]
    fn parse_rejects_malformed() {
        assert_eq!(parse_field_key("sport:abc:name"), None);
        assert_eq!(parse_field_key("market:1:name"), None);
        assert_eq!(parse_field_key("Sport:1:name"), None);
        assert_eq!(parse_field_key("sport:1"), None);
        assert_eq!(parse_field_key("sport:1:"), None);
    }

    #[test]
    fn parse_name_key_checks_kind_and_field() {
        assert_eq!(parse_name_key(EntityKind::Sport, "sport:5:name"), Some(id(5)));
        assert_eq!(parse_name_key(EntityKind::Sport, "event:5:name"), None);
        assert_eq!(parse_name_key(EntityKind::Sport, "sport:5:slug"), None);
    }

    #[test]
    fn field_name_validation() {
        assert!(validate_field_name("price").is_ok());
        assert!(validate_field_name("").is_err());
        assert!(validate_field_name("a:b").is_err());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn parse_inverts_field_key(raw in any::<u64>(), field in "[a-z_]{1,16}") {
                for kind in EntityKind::ALL {
                    let key = field_key(kind, id(raw), &field);
                    prop_assert_eq!(parse_field_key(&key), Some((kind, id(raw), field.clone())));
                }
            }
        }
    }
}
