//! Validation errors for moderation vocabulary.

/// Raised when caller-supplied values fall outside the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaxonomyError {
    /// Priority is not one of low, medium, high, critical
    #[error("Unknown priority '{0}' (expected low, medium, high or critical)")]
    UnknownPriority(String),

    /// Action is not in the moderation action set
    #[error("Unknown action '{0}'")]
    UnknownAction(String),

    /// Strict `ContentType` parse failed. Content types stay open strings on
    /// the wire, so unknown kinds are described verbatim rather than rejected
    #[error("Unknown content type '{0}'")]
    UnknownContentType(String),

    /// A required field was empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
