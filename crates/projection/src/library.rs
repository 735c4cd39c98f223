//! Seam to the external cartographic library.
//!
//! Definitions are PROJ-style `+key=value` strings. Geographic coordinates
//! cross this seam in radians; planar coordinates in the projection's linear
//! units.

use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::error::ProjectionError;

pub trait ProjectionLibrary {
    type Handle;

    /// Build a transform handle from a definition string.
    fn parse(&self, definition: &str) -> Result<Self::Handle, ProjectionError>;

    /// Transform `coord` in place from the `from` system to the `to` system.
    fn transform(
        &self,
        from: &Self::Handle,
        to: &Self::Handle,
        coord: &mut [f64; 3],
    ) -> Result<(), ProjectionError>;
}

/// Pure-Rust PROJ.4 implementation.
#[derive(Debug, Default, Copy, Clone)]
pub struct Proj4rsLibrary;

impl ProjectionLibrary for Proj4rsLibrary {
    type Handle = Proj;

    fn parse(&self, definition: &str) -> Result<Proj, ProjectionError> {
        Proj::from_proj_string(definition).map_err(|e| ProjectionError::InvalidDefinition {
            definition: definition.to_string(),
            reason: format!("{e:?}"),
        })
    }

    fn transform(
        &self,
        from: &Proj,
        to: &Proj,
        coord: &mut [f64; 3],
    ) -> Result<(), ProjectionError> {
        let mut point = (coord[0], coord[1], coord[2]);
        transform(from, to, &mut point)
            .map_err(|e| ProjectionError::Transform(format!("{e:?}")))?;

        if !point.0.is_finite() || !point.1.is_finite() {
            return Err(ProjectionError::Transform(format!(
                "non-finite result for ({}, {})",
                coord[0], coord[1]
            )));
        }

        *coord = [point.0, point.1, point.2];
        Ok(())
    }
}
