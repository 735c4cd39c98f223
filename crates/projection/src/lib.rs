pub mod error;
pub mod library;
pub mod metadata;
pub mod projector;

pub use error::*;
pub use library::*;
pub use metadata::*;
pub use projector::*;
