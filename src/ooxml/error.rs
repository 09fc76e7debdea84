/// Error types for OOXML operations.
use thiserror::Error;

/// Result type for OOXML operations.
pub type Result<T> = std::result::Result<T, OoxmlError>;

/// Error types for OOXML operations.
///
/// Model-level errors are returned before anything is mutated, so the
/// document is unchanged whenever an operation fails.
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// Positional index outside the current paragraph, table, row or cell range
    #[error("Invalid {kind} index {index} (count: {len})")]
    InvalidIndex {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    /// Keyed entity not present
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Malformed binary payload
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Unrecognized file format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Keyed entity added under an existing key
    #[error("Duplicate {kind}: {key}")]
    DuplicateIdentifier { kind: &'static str, key: String },

    /// Image placement without width or height
    #[error("Image width and height are required")]
    DimensionRequired,

    /// Attempt to delete a style flagged as default
    #[error("Cannot delete default style: {0}")]
    CannotDeleteDefault(String),

    /// basedOn chain that loops back on itself
    #[error("Style inheritance cycle through: {0}")]
    StyleCycle(String),

    /// Value outside its allowed domain (e.g. a color that is not 6 hex digits)
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Tracked operation requested while tracking is off
    #[error("Track changes is not enabled")]
    TrackChangesDisabled,

    /// XML generation or well-formedness error
    #[error("XML error: {0}")]
    Xml(String),

    /// Archive error
    #[error("ZIP error: {0}")]
    Zip(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OoxmlError {
    pub(crate) fn not_found(kind: &'static str, id: impl ToString) -> Self {
        OoxmlError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn invalid_index(kind: &'static str, index: usize, len: usize) -> Self {
        OoxmlError::InvalidIndex { kind, index, len }
    }

    pub(crate) fn duplicate(kind: &'static str, key: impl Into<String>) -> Self {
        OoxmlError::DuplicateIdentifier {
            kind,
            key: key.into(),
        }
    }
}

impl From<quick_xml::Error> for OoxmlError {
    fn from(err: quick_xml::Error) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}

impl From<std::fmt::Error> for OoxmlError {
    fn from(err: std::fmt::Error) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}

impl From<zip::result::ZipError> for OoxmlError {
    fn from(err: zip::result::ZipError) -> Self {
        OoxmlError::Zip(err.to_string())
    }
}
