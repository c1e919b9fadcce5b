use foundation::LatLng;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::value::number_from_value;

/// Mode tag asking for the view to be re-derived from the `initial-map-view`
/// parameter.
pub const AUTO_MODE: &str = "auto";

/// The slice of application state this module reads and writes.
///
/// Fields owned by other modules are kept in `extra` and survive a round trip.
/// Viewport fields are read leniently: `"10.5"` counts as `10.5`, and anything
/// unreadable counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppState {
    pub fn with_viewport(lat: f64, lon: f64, zoom: f64) -> Self {
        Self {
            lat: Some(lat),
            lon: Some(lon),
            zoom: Some(zoom),
            ..Self::default()
        }
    }

    /// Center and zoom, only when all three fields are present.
    pub fn viewport(&self) -> Option<(LatLng, f64)> {
        Some((LatLng::new(self.lat?, self.lon?), self.zoom?))
    }

    pub fn is_auto(&self) -> bool {
        self.map.as_deref() == Some(AUTO_MODE)
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(number_from_value)
        .filter(|n| n.is_finite()))
}
