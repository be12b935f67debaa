//! Unique ID generator.

use uuid::Uuid;

/// Generates unique identifiers for directory entities.
pub struct IdGenerator;

impl IdGenerator {
    /// Generates a unique connection record ID (UUID v4, hyphenated).
    pub fn connection_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Generates a unique request ID.
    pub fn request_id() -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_is_unique() {
        let id1 = IdGenerator::connection_id();
        let id2 = IdGenerator::connection_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_connection_id_is_uuid() {
        let id = IdGenerator::connection_id();
        assert!(Uuid::parse_str(&id).is_ok());
    }
}
