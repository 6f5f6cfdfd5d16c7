use thiserror::Error;
use uuid::Uuid;

/// Business-rule violations raised by the data-access layer
#[derive(Debug, Error)]
pub enum BadData {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    NoReadPermission(String),

    #[error("{0}")]
    NoWritePermission(String),

    #[error("{0}")]
    Invalid(String),

    /// The record exists and the caller may write it, but it cannot be removed
    #[error("{0}")]
    Protected(String),
}

/// Typed failures shared by every store operation
#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    BadData(#[from] BadData),

    #[error("{0}")]
    InvalidIdentifier(String),

    #[error("{0}")]
    DuplicateKey(String),

    #[error(transparent)]
    Database(sqlx::Error),
}

// PostgreSQL SQLSTATE codes we translate
const NOT_NULL_VIOLATION: &str = "23502";
const CHECK_VIOLATION: &str = "23514";

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return DataError::DuplicateKey(db.message().to_string());
            }
            if db.is_foreign_key_violation() {
                return BadData::NotFound("referenced record does not exist".to_string()).into();
            }
            if matches!(db.code().as_deref(), Some(NOT_NULL_VIOLATION) | Some(CHECK_VIOLATION)) {
                return BadData::Invalid(db.message().to_string()).into();
            }
        }
        DataError::Database(err)
    }
}

impl DataError {
    pub fn not_found(message: impl Into<String>) -> Self {
        BadData::NotFound(message.into()).into()
    }

    pub fn no_read_permission(message: impl Into<String>) -> Self {
        BadData::NoReadPermission(message.into()).into()
    }

    pub fn no_write_permission(message: impl Into<String>) -> Self {
        BadData::NoWritePermission(message.into()).into()
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        BadData::Invalid(message.into()).into()
    }

    pub fn protected(message: impl Into<String>) -> Self {
        BadData::Protected(message.into()).into()
    }
}

pub type DataResult<T> = Result<T, DataError>;

/// Parse an identifier supplied by a client, naming the kind of record in the error
pub fn parse_id(raw: &str, what: &str) -> DataResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| DataError::InvalidIdentifier(format!("Invalid {} ID", what)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "card").unwrap(), id);
    }

    #[test]
    fn parse_id_rejects_malformed_input() {
        match parse_id("123", "trading card") {
            Err(DataError::InvalidIdentifier(msg)) => assert_eq!(msg, "Invalid trading card ID"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn row_not_found_stays_a_database_error() {
        assert!(matches!(DataError::from(sqlx::Error::RowNotFound), DataError::Database(_)));
    }

    #[test]
    fn constructors_pick_the_right_kind() {
        assert!(matches!(DataError::not_found("x"), DataError::BadData(BadData::NotFound(_))));
        assert!(matches!(
            DataError::no_write_permission("x"),
            DataError::BadData(BadData::NoWritePermission(_))
        ));
        assert!(matches!(DataError::protected("x"), DataError::BadData(BadData::Protected(_))));
    }
}
