use foundation::bounds::Aabb2;
use foundation::math::Ellipsoid;
use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

/// Southern/northern latitude beyond which an unprojected raster is
/// bootstrapped onto a polar stereographic plane.
pub const POLAR_LATITUDE_LIMIT: f64 = 85.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pole {
    North,
    South,
}

impl Pole {
    pub fn latitude(self) -> f64 {
        match self {
            Pole::North => 90.0,
            Pole::South => -90.0,
        }
    }
}

/// Planar projection a raster is expressed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordTransform {
    PolarStereographic(Pole),
    Equirectangular,
}

impl CoordTransform {
    /// GeoTIFF `ProjCoordTransGeoKey` code.
    pub fn code(self) -> u16 {
        match self {
            CoordTransform::PolarStereographic(_) => 15,
            CoordTransform::Equirectangular => 17,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CoordTransform::PolarStereographic(_) => "Polar Stereographic",
            CoordTransform::Equirectangular => "Equirectangular",
        }
    }

    /// Pick the bootstrap projection for a geographic bounding box.
    pub fn for_geographic_bounds(bounds: &Aabb2) -> Self {
        if bounds.min[1] < -POLAR_LATITUDE_LIMIT {
            CoordTransform::PolarStereographic(Pole::South)
        } else if bounds.max[1] > POLAR_LATITUDE_LIMIT {
            CoordTransform::PolarStereographic(Pole::North)
        } else {
            CoordTransform::Equirectangular
        }
    }
}

/// Per-raster projection description.
///
/// `tie_point` anchors the raster's upper-left pixel in world units and
/// `scale` is world units per pixel. While `projected` is false both are in
/// degrees of longitude/latitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionMetadata {
    #[serde(default)]
    pub globe: String,
    pub tie_point: [f64; 3],
    pub scale: [f64; 3],
    pub raster_width: u32,
    pub raster_length: u32,
    pub projected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_lat: Option<f64>,
    /// Zero (or absent) radii fall back to the named globe's ellipsoid.
    #[serde(default)]
    pub semi_major_axis: f64,
    #[serde(default)]
    pub semi_minor_axis: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coord_transform: Option<CoordTransform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_origin_lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_origin_lon: Option<f64>,
    #[serde(default)]
    pub false_easting: f64,
    #[serde(default)]
    pub false_northing: f64,
    /// `[min_lon, min_lat] .. [max_lon, max_lat]` in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geographic_bounds: Option<Aabb2>,
    /// Explicit definition string; takes precedence over `coord_transform`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proj_definition: Option<String>,
}

impl ProjectionMetadata {
    /// Metadata for a raster that only carries geographic bounds.
    pub fn unprojected(
        globe: impl Into<String>,
        ellipsoid: Ellipsoid,
        bounds: Aabb2,
        raster_width: u32,
        raster_length: u32,
    ) -> Self {
        let width = raster_width.max(1) as f64;
        let length = raster_length.max(1) as f64;
        Self {
            globe: globe.into(),
            tie_point: [bounds.min[0], bounds.max[1], 0.0],
            scale: [bounds.width() / width, bounds.height() / length, 1.0],
            raster_width,
            raster_length,
            projected: false,
            center_lon: None,
            center_lat: None,
            semi_major_axis: ellipsoid.semi_major_axis,
            semi_minor_axis: ellipsoid.semi_minor_axis,
            coord_transform: None,
            natural_origin_lat: None,
            natural_origin_lon: None,
            false_easting: 0.0,
            false_northing: 0.0,
            geographic_bounds: Some(bounds),
            proj_definition: None,
        }
    }

    /// Metadata for a raster already on a planar projection.
    pub fn projected(
        globe: impl Into<String>,
        ellipsoid: Ellipsoid,
        transform: CoordTransform,
        tie_point: [f64; 3],
        scale: [f64; 3],
        raster_width: u32,
        raster_length: u32,
    ) -> Self {
        Self {
            globe: globe.into(),
            tie_point,
            scale,
            raster_width,
            raster_length,
            projected: true,
            center_lon: None,
            center_lat: None,
            semi_major_axis: ellipsoid.semi_major_axis,
            semi_minor_axis: ellipsoid.semi_minor_axis,
            coord_transform: Some(transform),
            natural_origin_lat: None,
            natural_origin_lon: None,
            false_easting: 0.0,
            false_northing: 0.0,
            geographic_bounds: None,
            proj_definition: None,
        }
    }

    pub fn from_json_str(payload: &str) -> Result<Self, ProjectionError> {
        serde_json::from_str(payload).map_err(|e| ProjectionError::Metadata(e.to_string()))
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        let explicit = Ellipsoid::new(self.semi_major_axis, self.semi_minor_axis);
        if self.semi_major_axis > 0.0 && self.semi_minor_axis > 0.0 {
            return explicit;
        }
        Ellipsoid::for_body(&self.globe).unwrap_or(explicit)
    }

    /// GeoTIFF `ProjCoordTransGeoKey` of the planar projection, if chosen.
    pub fn coord_transform_code(&self) -> Option<u16> {
        self.coord_transform.map(CoordTransform::code)
    }

    /// Geographic extent in degrees.
    ///
    /// Falls back to the tie point and scale read as degrees when no explicit
    /// bounds were supplied.
    pub fn geographic_bounds(&self) -> Aabb2 {
        if let Some(bounds) = self.geographic_bounds {
            return bounds;
        }
        let max_lon = self.tie_point[0] + self.raster_width as f64 * self.scale[0];
        let min_lat = self.tie_point[1] - self.raster_length as f64 * self.scale[1];
        Aabb2::new([self.tie_point[0], min_lat], [max_lon, self.tie_point[1]])
    }

    /// Definition of the body's geographic (longitude/latitude) system.
    pub fn geographic_proj_string(&self) -> String {
        let e = self.ellipsoid();
        format!(
            "+proj=longlat +a={} +b={} +no_defs",
            e.semi_major_axis, e.semi_minor_axis
        )
    }

    /// Definition of the raster's planar system, if one can be described.
    pub fn proj_string(&self) -> Option<String> {
        if let Some(definition) = &self.proj_definition {
            return Some(definition.clone());
        }

        let center_lon = self.center_lon.unwrap_or(0.0);
        let lon_0 = self.natural_origin_lon.unwrap_or(center_lon);
        let body = match self.coord_transform? {
            CoordTransform::PolarStereographic(pole) => format!(
                "+proj=stere +lat_ts={} +lat_0={} +lon_0={} +k_0=1.0 +x_0={} +y_0={}",
                self.natural_origin_lat.unwrap_or(pole.latitude()),
                pole.latitude(),
                lon_0,
                self.false_easting,
                self.false_northing,
            ),
            CoordTransform::Equirectangular => format!(
                "+proj=eqc +lat_ts={} +lon_0={} +x_0={} +y_0={}",
                self.natural_origin_lat
                    .or(self.center_lat)
                    .unwrap_or(0.0),
                lon_0,
                self.false_easting,
                self.false_northing,
            ),
        };

        let e = self.ellipsoid();
        Some(format!(
            "{body} +a={} +b={} +no_defs",
            e.semi_major_axis, e.semi_minor_axis
        ))
    }

    /// Human-readable name of the planar projection.
    pub fn transform_name(&self) -> &'static str {
        self.coord_transform
            .map(CoordTransform::name)
            .unwrap_or("Geographic")
    }
}

#[cfg(test)]
mod tests {
    use foundation::bounds::Aabb2;
    use foundation::math::Ellipsoid;
    use pretty_assertions::assert_eq;

    use super::{CoordTransform, Pole, ProjectionMetadata};

    #[test]
    fn selects_projection_from_latitude_thresholds() {
        let south = Aabb2::new([0.0, -88.0], [10.0, 5.0]);
        let north = Aabb2::new([0.0, -10.0], [10.0, 89.0]);
        let mid = Aabb2::new([0.0, -10.0], [10.0, 40.0]);
        assert_eq!(
            CoordTransform::for_geographic_bounds(&south),
            CoordTransform::PolarStereographic(Pole::South)
        );
        assert_eq!(
            CoordTransform::for_geographic_bounds(&north),
            CoordTransform::PolarStereographic(Pole::North)
        );
        assert_eq!(
            CoordTransform::for_geographic_bounds(&mid),
            CoordTransform::Equirectangular
        );
    }

    #[test]
    fn exactly_85_degrees_is_not_polar() {
        let edge = Aabb2::new([0.0, -85.0], [10.0, 85.0]);
        assert_eq!(
            CoordTransform::for_geographic_bounds(&edge),
            CoordTransform::Equirectangular
        );
    }

    #[test]
    fn equirectangular_definition_uses_false_northing_key() {
        let mut meta = ProjectionMetadata::projected(
            "Moon",
            Ellipsoid::MOON,
            CoordTransform::Equirectangular,
            [0.0, 0.0, 0.0],
            [1.0, 1.0, 1.0],
            10,
            10,
        );
        meta.center_lat = Some(15.0);
        meta.center_lon = Some(5.0);
        assert_eq!(
            meta.proj_string().as_deref(),
            Some("+proj=eqc +lat_ts=15 +lon_0=5 +x_0=0 +y_0=0 +a=1737400 +b=1737400 +no_defs")
        );
    }

    #[test]
    fn polar_definition_defaults_true_scale_to_pole() {
        let meta = ProjectionMetadata::projected(
            "Moon",
            Ellipsoid::MOON,
            CoordTransform::PolarStereographic(Pole::South),
            [0.0, 0.0, 0.0],
            [1.0, 1.0, 1.0],
            10,
            10,
        );
        assert_eq!(
            meta.proj_string().as_deref(),
            Some(
                "+proj=stere +lat_ts=-90 +lat_0=-90 +lon_0=0 +k_0=1.0 +x_0=0 +y_0=0 +a=1737400 +b=1737400 +no_defs"
            )
        );
        assert_eq!(meta.transform_name(), "Polar Stereographic");
        assert_eq!(meta.coord_transform_code(), Some(15));
    }

    #[test]
    fn explicit_definition_wins_and_missing_is_none() {
        let bounds = Aabb2::new([0.0, 0.0], [1.0, 1.0]);
        let mut meta = ProjectionMetadata::unprojected("Mars", Ellipsoid::MARS, bounds, 4, 4);
        assert_eq!(meta.proj_string(), None);
        assert_eq!(meta.transform_name(), "Geographic");
        assert_eq!(meta.coord_transform_code(), None);

        meta.proj_definition = Some("+proj=eqc +a=1 +b=1".to_string());
        assert_eq!(meta.proj_string().as_deref(), Some("+proj=eqc +a=1 +b=1"));
    }

    #[test]
    fn bounds_fall_back_to_tie_point_and_scale() {
        let bounds = Aabb2::new([-20.0, -10.0], [20.0, 30.0]);
        let mut meta = ProjectionMetadata::unprojected("Mars", Ellipsoid::MARS, bounds, 80, 40);
        meta.geographic_bounds = None;
        assert_eq!(meta.geographic_bounds(), bounds);
    }

    #[test]
    fn metadata_decodes_from_json() {
        let payload = r#"{
            "globe": "Mars",
            "tie_point": [100.0, 200.0, 0.0],
            "scale": [2.0, 2.0, 1.0],
            "raster_width": 512,
            "raster_length": 256,
            "projected": true,
            "semi_major_axis": 3396190.0,
            "semi_minor_axis": 3376200.0,
            "coord_transform": "equirectangular"
        }"#;
        let meta = ProjectionMetadata::from_json_str(payload).expect("decode");
        assert_eq!(meta.coord_transform, Some(CoordTransform::Equirectangular));
        assert_eq!(meta.raster_width, 512);
        assert_eq!(meta.false_northing, 0.0);
        assert_eq!(meta.coord_transform_code(), Some(17));
        assert!(ProjectionMetadata::from_json_str("{}").is_err());
    }

    #[test]
    fn missing_radii_come_from_globe_name() {
        let payload = r#"{
            "globe": "mars",
            "tie_point": [0.0, 0.0, 0.0],
            "scale": [1.0, 1.0, 1.0],
            "raster_width": 8,
            "raster_length": 8,
            "projected": true,
            "coord_transform": "equirectangular"
        }"#;
        let meta = ProjectionMetadata::from_json_str(payload).expect("decode");
        assert_eq!(meta.ellipsoid(), Ellipsoid::MARS);
        assert_eq!(
            meta.geographic_proj_string(),
            "+proj=longlat +a=3396190 +b=3376200 +no_defs"
        );
        assert!(
            meta.proj_string()
                .is_some_and(|d| d.ends_with("+a=3396190 +b=3376200 +no_defs"))
        );
    }

    #[test]
    fn explicit_radii_override_globe_name() {
        let meta = ProjectionMetadata::projected(
            "Mars",
            Ellipsoid::new(3_396_190.0, 3_396_190.0),
            CoordTransform::Equirectangular,
            [0.0, 0.0, 0.0],
            [1.0, 1.0, 1.0],
            1,
            1,
        );
        assert_eq!(meta.ellipsoid().semi_minor_axis, 3_396_190.0);
    }
}
