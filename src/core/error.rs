//! Error taxonomy for the table core.
//!
//! None of these are fatal to the process. Remote input that produces one of
//! them is logged and skipped unless the table runs in strict mode.

use super::ObjectId;

/// Errors raised while mutating or replaying the board.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// A message or manifest names an id missing from the identity map.
    #[error("unknown object id {0}")]
    UnknownId(ObjectId),

    /// An id was registered twice.
    #[error("object id {0} is already registered")]
    DuplicateId(ObjectId),

    /// The id resolved, but to the wrong kind of object.
    #[error("{id} has kind {found}, expected {expected}")]
    WrongKind {
        id: ObjectId,
        expected: &'static str,
        found: &'static str,
    },

    /// Well-formed JSON whose content cannot be applied.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Payload failed to parse.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Snapshot archive could not be encoded or decoded.
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// The outbound transport refused a message.
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<base64::DecodeError> for TableError {
    fn from(e: base64::DecodeError) -> Self {
        TableError::Snapshot(format!("base64: {e}"))
    }
}

impl From<bincode::Error> for TableError {
    fn from(e: bincode::Error) -> Self {
        TableError::Snapshot(format!("archive: {e}"))
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, TableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(TableError::UnknownId(ObjectId(4)).to_string(), "unknown object id Object(4)");

        let e = TableError::WrongKind {
            id: ObjectId(2),
            expected: "holder",
            found: "image",
        };
        assert_eq!(e.to_string(), "Object(2) has kind image, expected holder");
    }

    #[test]
    fn test_from_json_error() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        let e: TableError = err.into();
        assert!(matches!(e, TableError::Malformed(_)));
    }
}
