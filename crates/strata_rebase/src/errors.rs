//! Errors surfaced by hierarchy lookups.

use strata_common::InternalError;

/// Result of a lookup or rebase through a hierarchy handle.
pub type RebaseResult<T> = Result<T, RebaseError>;

/// Errors that can occur when reading a member through a hierarchy handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RebaseError {
    /// A scope-tree invariant is broken. Never recoverable.
    #[error(transparent)]
    Internal(#[from] InternalError),

    /// The handle's prototype has no member with this name.
    #[error("no member named `{name}`")]
    UnknownMember {
        /// The requested member name.
        name: String,
    },

    /// The member exists but no lookup is registered for its shape.
    #[error("member `{name}` of type `{type_name}` cannot be looked up through a hierarchy")]
    UnsupportedMember {
        /// The requested member name.
        name: String,
        /// The host type of the member.
        type_name: String,
    },

    /// The lookup needs a destination module and the handle has none.
    #[error("looking up {what} requires a destination module, but the handle has none")]
    MissingContext {
        /// What was being looked up.
        what: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_is_transparent() {
        let err: RebaseError = InternalError::new("index 4 out of range").into();
        assert_eq!(
            format!("{err}"),
            "internal rebase error: index 4 out of range"
        );
    }

    #[test]
    fn display_unsupported_member() {
        let err = RebaseError::UnsupportedMember {
            name: "probe".into(),
            type_name: "DebugProbe".into(),
        };
        assert_eq!(
            format!("{err}"),
            "member `probe` of type `DebugProbe` cannot be looked up through a hierarchy"
        );
    }

    #[test]
    fn display_missing_context() {
        let err = RebaseError::MissingContext {
            what: "memory mem0".into(),
        };
        assert!(format!("{err}").starts_with("looking up memory mem0 requires"));
    }
}
