//! Conversions between the three coordinate frames of a terrain raster.
//!
//! - Local: render space, origin at the raster's X/Y center.
//! - World: the raster's planar projection, tie-point relative.
//! - Spherical: longitude/latitude in degrees on the body's ellipsoid.

use foundation::math::{Vec2, Vec3};
use tracing::{info, warn};

use crate::error::ProjectionError;
use crate::library::{Proj4rsLibrary, ProjectionLibrary};
use crate::metadata::{CoordTransform, ProjectionMetadata};

/// A 2D or 3D point that can be shifted between local and world space.
pub trait RasterPoint {
    /// Translate by `offset`; 2D points ignore the Z term.
    fn translate(&mut self, offset: Vec3);
}

impl RasterPoint for Vec2 {
    fn translate(&mut self, offset: Vec3) {
        self.x += offset.x;
        self.y += offset.y;
    }
}

impl RasterPoint for Vec3 {
    fn translate(&mut self, offset: Vec3) {
        self.x += offset.x;
        self.y += offset.y;
        self.z += offset.z;
    }
}

struct TransformHandles<H> {
    geographic: H,
    planar: H,
}

pub struct CoordinateProjector<L: ProjectionLibrary = Proj4rsLibrary> {
    library: L,
    metadata: ProjectionMetadata,
    tie_point: Vec3,
    scale: Vec3,
    physical_width: f64,
    physical_length: f64,
    // Built on the first spherical conversion, then reused.
    handles: Option<TransformHandles<L::Handle>>,
}

impl<L: ProjectionLibrary> std::fmt::Debug for CoordinateProjector<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinateProjector")
            .field("metadata", &self.metadata)
            .field("physical_width", &self.physical_width)
            .field("physical_length", &self.physical_length)
            .field("handles_ready", &self.handles.is_some())
            .finish_non_exhaustive()
    }
}

impl CoordinateProjector<Proj4rsLibrary> {
    pub fn new(metadata: ProjectionMetadata) -> Self {
        Self::with_library(metadata, Proj4rsLibrary)
    }
}

impl<L: ProjectionLibrary> CoordinateProjector<L> {
    /// Build a projector, bootstrapping a planar projection first if the
    /// raster arrived with geographic bounds only.
    pub fn with_library(mut metadata: ProjectionMetadata, library: L) -> Self {
        if !metadata.projected {
            bootstrap_projection(&library, &mut metadata);
        }

        let tie_point = Vec3::from_array(metadata.tie_point);
        let scale = Vec3::from_array(metadata.scale);
        let physical_width = metadata.raster_width as f64 * scale.x;
        let physical_length = metadata.raster_length as f64 * scale.y;

        Self {
            library,
            metadata,
            tie_point,
            scale,
            physical_width,
            physical_length,
            handles: None,
        }
    }

    pub fn transform_name(&self) -> &'static str {
        self.metadata.transform_name()
    }

    pub fn globe_name(&self) -> &str {
        &self.metadata.globe
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn tie_point(&self) -> Vec3 {
        self.tie_point
    }

    pub fn metadata(&self) -> &ProjectionMetadata {
        &self.metadata
    }

    pub fn physical_width(&self) -> f64 {
        self.physical_width
    }

    pub fn physical_length(&self) -> f64 {
        self.physical_length
    }

    fn local_offset(&self) -> Vec3 {
        Vec3::new(
            self.physical_width / 2.0 + self.tie_point.x,
            -(self.physical_length / 2.0) + self.tie_point.y,
            self.tie_point.z,
        )
    }

    /// Convert in place from local render coordinates to world coordinates.
    pub fn local_to_world<P: RasterPoint>(&self, point: &mut P) {
        point.translate(self.local_offset());
    }

    /// Convert in place from world coordinates to local render coordinates.
    pub fn world_to_local<P: RasterPoint>(&self, point: &mut P) {
        point.translate(-self.local_offset());
    }

    /// Convert a world point to longitude/latitude degrees in place.
    ///
    /// Z is left untouched. A library failure is logged and leaves X/Y as
    /// they were; only an undescribable projection is returned as an error.
    pub fn world_to_spherical(&mut self, point: &mut Vec3) -> Result<(), ProjectionError> {
        self.ensure_handles()?;
        let Some(handles) = self.handles.as_ref() else {
            return Ok(());
        };

        let mut coord = point.as_array();
        match self
            .library
            .transform(&handles.planar, &handles.geographic, &mut coord)
        {
            Ok(()) => {
                point.x = coord[0].to_degrees();
                point.y = coord[1].to_degrees();
            }
            Err(e) => warn!("world to spherical failed for ({}, {}): {e}", point.x, point.y),
        }
        Ok(())
    }

    /// Convert a longitude/latitude (degrees) point to world coordinates in
    /// place. Same failure policy as [`Self::world_to_spherical`].
    pub fn spherical_to_world(&mut self, point: &mut Vec3) -> Result<(), ProjectionError> {
        self.ensure_handles()?;
        let Some(handles) = self.handles.as_ref() else {
            return Ok(());
        };

        let mut coord = [point.x.to_radians(), point.y.to_radians(), point.z];
        match self
            .library
            .transform(&handles.geographic, &handles.planar, &mut coord)
        {
            Ok(()) => {
                point.x = coord[0];
                point.y = coord[1];
            }
            Err(e) => warn!("spherical to world failed for ({}, {}): {e}", point.x, point.y),
        }
        Ok(())
    }

    fn ensure_handles(&mut self) -> Result<(), ProjectionError> {
        if self.handles.is_some() {
            return Ok(());
        }

        let planar_def = self
            .metadata
            .proj_string()
            .ok_or(ProjectionError::UndefinedProjection)?;
        let geographic_def = self.metadata.geographic_proj_string();

        let built = self.library.parse(&geographic_def).and_then(|geographic| {
            let planar = self.library.parse(&planar_def)?;
            Ok(TransformHandles { geographic, planar })
        });
        match built {
            Ok(handles) => self.handles = Some(handles),
            Err(e) => warn!("unable to build transform handles: {e}"),
        }
        Ok(())
    }
}

/// Give an unprojected raster a planar projection, tie point and scale.
///
/// Best effort: a library failure is logged and whatever was computed so far
/// is kept.
fn bootstrap_projection<L: ProjectionLibrary>(library: &L, metadata: &mut ProjectionMetadata) {
    let bounds = metadata.geographic_bounds();
    let [center_lon, center_lat] = bounds.center();
    metadata.center_lat.get_or_insert(center_lat);
    metadata.center_lon.get_or_insert(center_lon);

    let transform = CoordTransform::for_geographic_bounds(&bounds);
    metadata.coord_transform = Some(transform);
    info!(
        "found unprojected data, projecting tie points with {}",
        transform.name()
    );

    if let Err(e) = project_bounds(library, metadata, bounds.min, bounds.max) {
        warn!("bootstrap projection incomplete: {e}");
    }
    metadata.projected = true;
}

fn project_bounds<L: ProjectionLibrary>(
    library: &L,
    metadata: &mut ProjectionMetadata,
    lower_left: [f64; 2],
    upper_right: [f64; 2],
) -> Result<(), ProjectionError> {
    let planar_def = metadata
        .proj_string()
        .ok_or(ProjectionError::UndefinedProjection)?;
    let geographic = library.parse(&metadata.geographic_proj_string())?;
    let planar = library.parse(&planar_def)?;

    let mut ll = [lower_left[0].to_radians(), lower_left[1].to_radians(), 0.0];
    library.transform(&geographic, &planar, &mut ll)?;
    metadata.tie_point[0] = ll[0];
    metadata.tie_point[1] = ll[1];

    let mut ur = [upper_right[0].to_radians(), upper_right[1].to_radians(), 0.0];
    library.transform(&geographic, &planar, &mut ur)?;
    metadata.scale[0] = (ur[0] - ll[0]) / metadata.raster_width.max(1) as f64;
    metadata.scale[1] = (ur[1] - ll[1]) / metadata.raster_length.max(1) as f64;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use foundation::bounds::Aabb2;
    use foundation::math::{Ellipsoid, Vec2, Vec3};
    use pretty_assertions::assert_eq;

    use super::CoordinateProjector;
    use crate::error::ProjectionError;
    use crate::library::ProjectionLibrary;
    use crate::metadata::{CoordTransform, Pole, ProjectionMetadata};

    const MARS_R: f64 = 3_396_190.0;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn sphere() -> Ellipsoid {
        Ellipsoid::new(MARS_R, MARS_R)
    }

    fn projected_meta() -> ProjectionMetadata {
        ProjectionMetadata::projected(
            "Mars",
            sphere(),
            CoordTransform::Equirectangular,
            [1000.0, 5000.0, -20.0],
            [2.0, 3.0, 1.0],
            400,
            200,
        )
    }

    /// Parses anything; every transform fails.
    #[derive(Default)]
    struct BrokenLibrary {
        parses: Cell<usize>,
    }

    impl ProjectionLibrary for BrokenLibrary {
        type Handle = ();

        fn parse(&self, _definition: &str) -> Result<(), ProjectionError> {
            self.parses.set(self.parses.get() + 1);
            Ok(())
        }

        fn transform(
            &self,
            _from: &(),
            _to: &(),
            _coord: &mut [f64; 3],
        ) -> Result<(), ProjectionError> {
            Err(ProjectionError::Transform("broken".to_string()))
        }
    }

    #[test]
    fn physical_extent_is_fixed_at_construction() {
        let p = CoordinateProjector::new(projected_meta());
        assert_eq!(p.physical_width(), 800.0);
        assert_eq!(p.physical_length(), 600.0);
        assert_eq!(p.tie_point(), Vec3::new(1000.0, 5000.0, -20.0));
        assert_eq!(p.scale(), Vec3::new(2.0, 3.0, 1.0));
        assert_eq!(p.globe_name(), "Mars");
        assert_eq!(p.transform_name(), "Equirectangular");
    }

    #[test]
    fn local_origin_maps_to_raster_center() {
        let p = CoordinateProjector::new(projected_meta());
        let mut v = Vec3::new(0.0, 0.0, 7.0);
        p.local_to_world(&mut v);
        assert_eq!(v, Vec3::new(1400.0, 4700.0, -13.0));

        let mut v2 = Vec2::new(0.0, 0.0);
        p.local_to_world(&mut v2);
        assert_eq!(v2, Vec2::new(1400.0, 4700.0));
    }

    #[test]
    fn local_world_round_trip_2d_and_3d() {
        let p = CoordinateProjector::new(projected_meta());
        for (x, y, z) in [(0.0, 0.0, 0.0), (-123.456, 987.001, 3.5), (1e6, -1e6, -42.0)] {
            let original = Vec3::new(x, y, z);
            let mut v = original;
            p.local_to_world(&mut v);
            p.world_to_local(&mut v);
            assert_close(v.x, original.x, 1e-9);
            assert_close(v.y, original.y, 1e-9);
            assert_close(v.z, original.z, 1e-9);

            let original2 = Vec2::new(x, y);
            let mut v2 = original2;
            p.local_to_world(&mut v2);
            p.world_to_local(&mut v2);
            assert_close(v2.x, original2.x, 1e-9);
            assert_close(v2.y, original2.y, 1e-9);
        }
    }

    #[test]
    fn bootstrap_selects_projection_by_latitude() {
        let cases = [
            ([-88.0, 5.0], CoordTransform::PolarStereographic(Pole::South)),
            ([-10.0, 89.0], CoordTransform::PolarStereographic(Pole::North)),
            ([-10.0, 40.0], CoordTransform::Equirectangular),
        ];
        for ([min_lat, max_lat], expected) in cases {
            let bounds = Aabb2::new([0.0, min_lat], [10.0, max_lat]);
            let meta = ProjectionMetadata::unprojected("Mars", sphere(), bounds, 100, 100);
            let p = CoordinateProjector::new(meta);
            assert_eq!(p.metadata().coord_transform, Some(expected));
            assert!(p.metadata().projected);
        }
    }

    #[test]
    fn bootstrap_equirectangular_tie_point_and_scale() {
        let bounds = Aabb2::new([0.0, -10.0], [10.0, 40.0]);
        let meta = ProjectionMetadata::unprojected("Mars", sphere(), bounds, 100, 500);
        let p = CoordinateProjector::new(meta);

        assert_eq!(p.metadata().center_lon, Some(5.0));
        assert_eq!(p.metadata().center_lat, Some(15.0));

        let rc = 15f64.to_radians().cos();
        let expected_x = MARS_R * (-5f64).to_radians() * rc;
        let expected_y = MARS_R * (-10f64).to_radians();
        assert_close(p.tie_point().x, expected_x, 1e-3);
        assert_close(p.tie_point().y, expected_y, 1e-3);

        let expected_sx = MARS_R * 10f64.to_radians() * rc / 100.0;
        let expected_sy = MARS_R * 50f64.to_radians() / 500.0;
        assert_close(p.scale().x, expected_sx, 1e-6);
        assert_close(p.scale().y, expected_sy, 1e-6);
        assert_close(p.physical_width(), expected_sx * 100.0, 1e-3);
    }

    #[test]
    fn bootstrap_keeps_explicit_center() {
        let bounds = Aabb2::new([0.0, -10.0], [10.0, 40.0]);
        let mut meta = ProjectionMetadata::unprojected("Mars", sphere(), bounds, 100, 100);
        meta.center_lat = Some(0.0);
        let p = CoordinateProjector::new(meta);
        assert_eq!(p.metadata().center_lat, Some(0.0));
        assert_eq!(p.metadata().center_lon, Some(5.0));
    }

    #[test]
    fn bootstrap_failure_is_tolerated() {
        let bounds = Aabb2::new([0.0, -10.0], [10.0, 40.0]);
        let meta = ProjectionMetadata::unprojected("Mars", sphere(), bounds, 100, 100);
        let degree_tie = meta.tie_point;
        let p = CoordinateProjector::with_library(meta, BrokenLibrary::default());
        assert!(p.metadata().projected);
        assert_eq!(p.metadata().coord_transform, Some(CoordTransform::Equirectangular));
        assert_eq!(p.metadata().tie_point, degree_tie);
    }

    #[test]
    fn spherical_round_trip_through_library() {
        let mut p = CoordinateProjector::new(projected_meta());
        let mut v = Vec3::new(22.5, -13.75, 150.0);
        p.spherical_to_world(&mut v).expect("to world");
        assert_close(v.x, MARS_R * 22.5f64.to_radians(), 1e-3);
        assert_eq!(v.z, 150.0);

        p.world_to_spherical(&mut v).expect("to spherical");
        assert_close(v.x, 22.5, 1e-7);
        assert_close(v.y, -13.75, 1e-7);
        assert_eq!(v.z, 150.0);
    }

    #[test]
    fn undefined_projection_is_an_error() {
        let mut meta = projected_meta();
        meta.coord_transform = None;
        let mut p = CoordinateProjector::new(meta);
        let mut v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(
            p.world_to_spherical(&mut v),
            Err(ProjectionError::UndefinedProjection)
        );
        assert_eq!(
            p.spherical_to_world(&mut v),
            Err(ProjectionError::UndefinedProjection)
        );
        assert_eq!(v, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn transform_failure_leaves_point_unchanged() {
        let mut p = CoordinateProjector::with_library(projected_meta(), BrokenLibrary::default());
        let mut v = Vec3::new(10.0, 20.0, 30.0);
        assert_eq!(p.world_to_spherical(&mut v), Ok(()));
        assert_eq!(p.spherical_to_world(&mut v), Ok(()));
        assert_eq!(v, Vec3::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn handles_are_built_once() {
        let mut p = CoordinateProjector::with_library(projected_meta(), BrokenLibrary::default());
        let mut v = Vec3::ZERO;
        p.world_to_spherical(&mut v).expect("first");
        p.spherical_to_world(&mut v).expect("second");
        p.world_to_spherical(&mut v).expect("third");
        assert_eq!(p.library.parses.get(), 2);
    }

    #[test]
    fn malformed_definition_is_not_fatal() {
        let mut meta = projected_meta();
        meta.proj_definition = Some("+proj=no_such_projection".to_string());
        let mut p = CoordinateProjector::new(meta);
        let mut v = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(p.world_to_spherical(&mut v), Ok(()));
        assert_eq!(v, Vec3::new(4.0, 5.0, 6.0));
    }
}
