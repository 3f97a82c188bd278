//! Error types for the `migrasim-persons` crate.

/// Errors that can occur while constructing a person.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PersonError {
    /// A field that must be finite and in `[0, 1]` was not.
    #[error("field {field} must be a finite unit value")]
    InvalidUnitField {
        /// Name of the offending field, for diagnostics.
        field: &'static str,
    },

    /// A tag string was empty, which is never meaningful.
    #[error("person tags must be non-empty strings")]
    EmptyTag,
}
