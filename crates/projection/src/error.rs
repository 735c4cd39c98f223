#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// The raster's metadata cannot describe its planar projection at all.
    UndefinedProjection,
    /// The cartographic library rejected a definition string.
    InvalidDefinition { definition: String, reason: String },
    /// The cartographic library failed to transform a coordinate.
    Transform(String),
    /// Metadata could not be decoded.
    Metadata(String),
}

impl std::fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionError::UndefinedProjection => write!(f, "unable to define projection"),
            ProjectionError::InvalidDefinition { definition, reason } => {
                write!(f, "invalid projection definition '{definition}': {reason}")
            }
            ProjectionError::Transform(msg) => write!(f, "coordinate transform failed: {msg}"),
            ProjectionError::Metadata(msg) => write!(f, "invalid projection metadata: {msg}"),
        }
    }
}

impl std::error::Error for ProjectionError {}
