//! Build failures.
//!
//! Every error is raised synchronously at the point of violation and
//! propagates to the immediate caller; nothing is retried or downgraded.
//! Scope restoration is guaranteed on every propagation path, so a failed
//! construction never corrupts the context of the enclosing build.

use crate::registry::AttrType;

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("unknown element kind `{name}`")]
    UnknownKind { name: String },

    #[error("attribute `{attribute}` is not declared for <{tag}>")]
    UnknownAttribute { tag: String, attribute: String },

    #[error("attribute `{attribute}` on <{tag}> does not accept {found} values")]
    AttributeType {
        tag: String,
        attribute: String,
        found: AttrType,
    },

    #[error("body of <{tag}> returned literal text; append it with `text(..)` instead")]
    Script { tag: String },

    #[error("<{tag}> cannot contain children")]
    Structural { tag: String },

    #[error("<{tag}> failed validation: {message}")]
    Validation { tag: String, message: String },
}
