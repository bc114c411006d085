use thiserror::Error;

/// Errors raised by the fallible operations of this crate.
///
/// Absence (a missing hash-table node, an exhausted iterator) is not an
/// error and is reported with `Option::None` instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("expected a {expected} geometry, found {found}")]
    GeometryMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl GeometryError {
    pub(crate) fn invalid_argument<S: Into<String>>(reason: S) -> Self {
        GeometryError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GeometryError>;
