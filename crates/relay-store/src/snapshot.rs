//! Opaque session snapshot.

use std::fmt;

/// Serialized credentials of an authenticated messaging session.
///
/// The bytes are produced and consumed by the messaging engine; the relay
/// never looks inside them.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    data: Vec<u8>,
}

impl SessionSnapshot {
    /// Wraps raw session bytes.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the snapshot, returning the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the snapshot holds no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// Credentials must not end up in logs.
impl fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("len", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_accessors() {
        let snapshot = SessionSnapshot::new(vec![1, 2, 3]);
        assert_eq!(snapshot.len(), 3);
        assert!(!snapshot.is_empty());
        assert_eq!(snapshot.as_bytes(), &[1, 2, 3]);
        assert_eq!(snapshot.into_bytes(), vec![1, 2, 3]);
    }

    #[test]
    fn test_snapshot_debug_hides_data() {
        let snapshot = SessionSnapshot::new(b"secret-token".to_vec());
        assert_eq!(format!("{:?}", snapshot), "SessionSnapshot { len: 12 }");
    }
}
