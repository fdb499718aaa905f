//! Geographic primitives and reverse geocoding
//!
//! Holds the selected rectangle ([`AreaBounds`]), plain coordinates, and the
//! geocoder seam used to turn the rectangle's centroid into a place name.

pub mod nominatim;

use crate::constants::search::UNKNOWN_LOCATION;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Axis-aligned lat/lng rectangle selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl AreaBounds {
    /// Build bounds and validate them
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Result<Self> {
        let bounds = Self {
            north,
            south,
            east,
            west,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Parse bounds from an untyped JSON object
    ///
    /// Every field must be present and a JSON number. The result is
    /// validated before it is returned.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::Validation("bounds must be an object".to_string()))?;

        let field = |name: &str| -> Result<f64> {
            match obj.get(name) {
                None | Some(Value::Null) => Err(Error::Validation(format!(
                    "bounds.{} is required",
                    name
                ))),
                Some(v) => v.as_f64().ok_or_else(|| {
                    Error::Validation(format!("bounds.{} must be a number, got {}", name, v))
                }),
            }
        };

        Self::new(field("north")?, field("south")?, field("east")?, field("west")?)
    }

    /// Check ranges and orientation
    ///
    /// Inverted or zero-area rectangles are rejected rather than normalised,
    /// and rectangles crossing the antimeridian are not supported.
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("north", self.north),
            ("south", self.south),
            ("east", self.east),
            ("west", self.west),
        ] {
            if !v.is_finite() {
                return Err(Error::Validation(format!("bounds.{} is not finite", name)));
            }
        }
        for (name, v) in [("north", self.north), ("south", self.south)] {
            if !(-90.0..=90.0).contains(&v) {
                return Err(Error::Validation(format!(
                    "bounds.{} {} is out of range [-90, 90]",
                    name, v
                )));
            }
        }
        for (name, v) in [("east", self.east), ("west", self.west)] {
            if !(-180.0..=180.0).contains(&v) {
                return Err(Error::Validation(format!(
                    "bounds.{} {} is out of range [-180, 180]",
                    name, v
                )));
            }
        }
        if self.north <= self.south {
            return Err(Error::Validation(format!(
                "bounds.north ({}) must be greater than bounds.south ({})",
                self.north, self.south
            )));
        }
        if self.east <= self.west {
            return Err(Error::Validation(format!(
                "bounds.east ({}) must be greater than bounds.west ({})",
                self.east, self.west
            )));
        }
        Ok(())
    }

    /// Center of the rectangle
    pub fn centroid(&self) -> Coordinates {
        Coordinates::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }

    /// Clamp a point into the rectangle
    pub fn clamp(&self, point: Coordinates) -> Coordinates {
        Coordinates::new(
            point.lat.clamp(self.south, self.north),
            point.lng.clamp(self.west, self.east),
        )
    }

    /// Whether a point lies inside (or on the edge of) the rectangle
    pub fn contains(&self, point: Coordinates) -> bool {
        (self.south..=self.north).contains(&point.lat)
            && (self.west..=self.east).contains(&point.lng)
    }
}

/// Address components from a reverse geocode lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl Address {
    /// Human-readable place name
    ///
    /// Priority: "city, state" > city > "state, country" > country.
    pub fn place_name(&self) -> Option<String> {
        let present = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        match (present(&self.city), present(&self.state), present(&self.country)) {
            (Some(city), Some(state), _) => Some(format!("{}, {}", city, state)),
            (Some(city), None, _) => Some(city),
            (None, Some(state), Some(country)) => Some(format!("{}, {}", state, country)),
            (None, _, Some(country)) => Some(country),
            _ => None,
        }
    }
}

/// Trait for reverse geocoding backends
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Address components at a point, or None if the service knows nothing
    async fn reverse_geocode(&self, at: Coordinates) -> Result<Option<Address>>;
}

/// Best-effort place name for a point
///
/// Never fails: lookup errors and empty results become "Unknown Location".
pub async fn resolve_place_name(geocoder: &dyn Geocoder, at: Coordinates) -> String {
    match geocoder.reverse_geocode(at).await {
        Ok(Some(address)) => address
            .place_name()
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        Ok(None) => UNKNOWN_LOCATION.to_string(),
        Err(e) => {
            warn!(lat = at.lat, lng = at.lng, error = %e, "Reverse geocoding failed");
            UNKNOWN_LOCATION.to_string()
        }
    }
}

/// Get the default geocoding backend
pub fn get_geocoder() -> Result<nominatim::NominatimBackend> {
    nominatim::NominatimBackend::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn nyc() -> AreaBounds {
        AreaBounds::new(40.8, 40.7, -73.9, -74.1).unwrap()
    }

    fn address(city: Option<&str>, state: Option<&str>, country: Option<&str>) -> Address {
        Address {
            city: city.map(String::from),
            state: state.map(String::from),
            country: country.map(String::from),
        }
    }

    struct FixedGeocoder(Result<Option<Address>>);

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn reverse_geocode(&self, _at: Coordinates) -> Result<Option<Address>> {
            match &self.0 {
                Ok(a) => Ok(a.clone()),
                Err(e) => Err(Error::Upstream(e.to_string())),
            }
        }
    }

    #[test]
    fn test_from_value() {
        let bounds = AreaBounds::from_value(&json!({
            "north": 40.8, "south": 40.7, "east": -73.9, "west": -74.1
        }))
        .unwrap();
        assert_eq!(bounds, nyc());
    }

    #[test]
    fn test_from_value_missing_field() {
        let err = AreaBounds::from_value(&json!({
            "north": 40.8, "south": 40.7, "east": -73.9
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("west"));
    }

    #[test]
    fn test_from_value_non_numeric() {
        let err = AreaBounds::from_value(&json!({
            "north": "40.8", "south": 40.7, "east": -73.9, "west": -74.1
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("north"));
    }

    #[test]
    fn test_from_value_not_object() {
        assert!(AreaBounds::from_value(&json!([1, 2, 3, 4])).is_err());
        assert!(AreaBounds::from_value(&Value::Null).is_err());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        assert!(AreaBounds::new(40.7, 40.8, -73.9, -74.1).is_err());
        assert!(AreaBounds::new(40.8, 40.7, -74.1, -73.9).is_err());
    }

    #[test]
    fn test_degenerate_bounds_rejected() {
        assert!(AreaBounds::new(40.7, 40.7, -73.9, -74.1).is_err());
        assert!(AreaBounds::new(40.8, 40.7, -74.0, -74.0).is_err());
    }

    #[test]
    fn test_out_of_range_bounds_rejected() {
        assert!(AreaBounds::new(91.0, 40.7, -73.9, -74.1).is_err());
        assert!(AreaBounds::new(40.8, 40.7, 181.0, -74.1).is_err());
        assert!(AreaBounds::new(f64::NAN, 40.7, -73.9, -74.1).is_err());
    }

    #[test]
    fn test_centroid() {
        let c = nyc().centroid();
        assert_relative_eq!(c.lat, 40.75, epsilon = 1e-9);
        assert_relative_eq!(c.lng, -74.0, epsilon = 1e-9);
    }

    #[test]
    fn test_clamp() {
        let bounds = nyc();
        let clamped = bounds.clamp(Coordinates::new(41.5, -75.0));
        assert_eq!(clamped, Coordinates::new(40.8, -74.1));

        let inside = Coordinates::new(40.75, -74.0);
        assert_eq!(bounds.clamp(inside), inside);
        assert!(bounds.contains(clamped));
    }

    #[test]
    fn test_place_name_priority() {
        assert_eq!(
            address(Some("New York"), Some("NY"), Some("USA")).place_name(),
            Some("New York, NY".to_string())
        );
        assert_eq!(
            address(Some("New York"), None, Some("USA")).place_name(),
            Some("New York".to_string())
        );
        assert_eq!(
            address(None, Some("Bavaria"), Some("Germany")).place_name(),
            Some("Bavaria, Germany".to_string())
        );
        assert_eq!(
            address(None, None, Some("Germany")).place_name(),
            Some("Germany".to_string())
        );
        assert_eq!(address(None, Some("Bavaria"), None).place_name(), None);
        assert_eq!(address(Some("  "), None, None).place_name(), None);
    }

    #[tokio::test]
    async fn test_resolve_place_name() {
        let geocoder = FixedGeocoder(Ok(Some(address(Some("Boston"), Some("MA"), None))));
        let name = resolve_place_name(&geocoder, nyc().centroid()).await;
        assert_eq!(name, "Boston, MA");
    }

    #[tokio::test]
    async fn test_resolve_place_name_never_fails() {
        let failing = FixedGeocoder(Err(Error::Upstream("down".to_string())));
        assert_eq!(
            resolve_place_name(&failing, nyc().centroid()).await,
            UNKNOWN_LOCATION
        );

        let empty = FixedGeocoder(Ok(None));
        assert_eq!(
            resolve_place_name(&empty, nyc().centroid()).await,
            UNKNOWN_LOCATION
        );

        let blank = FixedGeocoder(Ok(Some(Address::default())));
        assert_eq!(
            resolve_place_name(&blank, nyc().centroid()).await,
            UNKNOWN_LOCATION
        );
    }
}
