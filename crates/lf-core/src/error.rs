use thiserror::Error;

use crate::ids::Id;

pub type LfResult<T> = Result<T, LfError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LfError {
    #[error("Value read before it was initialized: {what}")]
    Uninitialized { what: &'static str },

    #[error("Unknown {what} handle: {id}")]
    UnknownId { what: &'static str, id: Id },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}
