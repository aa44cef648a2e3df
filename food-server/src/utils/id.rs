//! Document ID generation
//!
//! IDs are 24 lowercase hex characters, the same shape as the legacy
//! ObjectId strings, taken from the first 12 bytes of a random UUID.

use uuid::Uuid;

pub const ID_LEN: usize = 24;

pub fn new_object_id() -> String {
    let uuid = Uuid::new_v4();
    hex::encode(&uuid.as_bytes()[..ID_LEN / 2])
}

/// Whether `id` has the 24-hex shape
pub fn is_object_id(id: &str) -> bool {
    id.len() == ID_LEN && id.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_object_id_shape() {
        let id = new_object_id();
        assert_eq!(id.len(), ID_LEN);
        assert!(is_object_id(&id));
        assert_ne!(id, new_object_id());
    }

    #[test]
    fn test_is_object_id() {
        assert!(is_object_id("65a1f0c2e4b0a1b2c3d4e5f6"));
        assert!(!is_object_id("65a1f0c2"));
        assert!(!is_object_id("zz a1f0c2e4b0a1b2c3d4e5f6"));
    }
}
