//! Errors.

use crate::{Arity, Kind};

/// Convenience result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy of generation, rendering and output.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A node has a child count that does not match the arity of its kind.
    ///
    /// This is never produced by the generator.
    /// Seeing it means a tree was built or loaded incorrectly.
    #[error("structural invariant violation: `{kind}` expects {expected} children, found {actual}")]
    Structure {
        /// The kind of the offending node.
        kind: Kind,
        /// The arity contract of the kind.
        expected: Arity,
        /// The actual number of children.
        actual: usize,
    },

    /// Invalid settings, rejected before any work starts.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO failure while writing or reading files.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Failure while encoding or decoding stored trees.
    #[error(transparent)]
    Bincode(#[from] bincode::Error),

    /// Wrapped lower-level error, such as image encoding or thread pool failures.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Build a [`Error::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(Error::config("x").to_string().starts_with("configuration error:"));

        let err = Error::Structure {
            kind: Kind::Average,
            expected: Arity::Variadic {min: 2},
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "structural invariant violation: `avg` expects at least 2 children, found 1"
        );

        let err = Error::Structure {kind: Kind::Pow, expected: Arity::Fixed(2), actual: 3};
        assert_eq!(
            err.to_string(),
            "structural invariant violation: `pow` expects exactly 2 children, found 3"
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = Error::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
