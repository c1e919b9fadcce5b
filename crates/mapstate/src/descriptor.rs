//! View descriptors: the loosely typed "where should the map look" values that
//! arrive from URL parameters and remote configuration.
//!
//! Parsing never fails. Input that names neither bounds nor a center becomes
//! [`ViewDescriptor::Unspecified`], and a bounds form with missing or garbage
//! corners becomes an invalid [`LatLngBounds`] so that resolution refuses it
//! instead of falling through to the center form.

use foundation::{LatLng, LatLngBounds};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::value::number_from_value;

const CORNER_KEYS: [&str; 4] = ["minlat", "minlon", "maxlat", "maxlon"];

/// Render/animation options handed to the map untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewOptions {
    #[serde(rename = "maxZoom", default, skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ViewOptions {
    pub fn is_empty(&self) -> bool {
        self.max_zoom.is_none() && self.extra.is_empty()
    }

    fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(v @ Value::Object(_)) => serde_json::from_value(v.clone()).unwrap_or_else(|err| {
                tracing::debug!("ignoring malformed view options: {err}");
                Self::default()
            }),
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum ViewDescriptor {
    /// Fit the map to a bounding box. Takes precedence over a center.
    Bounds {
        bounds: LatLngBounds,
        options: ViewOptions,
    },
    Center {
        center: LatLng,
        zoom: Option<f64>,
        options: ViewOptions,
    },
    /// Neither bounds nor a center could be read.
    Unspecified,
}

impl ViewDescriptor {
    pub fn bounds(minlat: f64, minlon: f64, maxlat: f64, maxlon: f64) -> Self {
        ViewDescriptor::Bounds {
            bounds: LatLngBounds::new(LatLng::new(minlat, minlon), LatLng::new(maxlat, maxlon)),
            options: ViewOptions::default(),
        }
    }

    pub fn center(lat: f64, lng: f64, zoom: Option<f64>) -> Self {
        ViewDescriptor::Center {
            center: LatLng::new(lat, lng),
            zoom,
            options: ViewOptions::default(),
        }
    }

    pub fn with_options(mut self, new_options: ViewOptions) -> Self {
        match &mut self {
            ViewDescriptor::Bounds { options, .. } | ViewDescriptor::Center { options, .. } => {
                *options = new_options;
            }
            ViewDescriptor::Unspecified => {}
        }
        self
    }

    pub fn options(&self) -> Option<&ViewOptions> {
        match self {
            ViewDescriptor::Bounds { options, .. } | ViewDescriptor::Center { options, .. } => {
                Some(options)
            }
            ViewDescriptor::Unspecified => None,
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let Value::Object(fields) = value else {
            return ViewDescriptor::Unspecified;
        };
        let options = ViewOptions::from_value(fields.get("options"));

        if CORNER_KEYS.iter().any(|k| present(fields, k)) {
            let corner = |key: &str| {
                fields
                    .get(key)
                    .and_then(number_from_value)
                    .unwrap_or(f64::NAN)
            };
            let bounds = LatLngBounds::new(
                LatLng::new(corner("minlat"), corner("minlon")),
                LatLng::new(corner("maxlat"), corner("maxlon")),
            );
            return ViewDescriptor::Bounds { bounds, options };
        }

        if present(fields, "bounds") {
            let bounds = parse_bounds(&fields["bounds"]);
            return ViewDescriptor::Bounds { bounds, options };
        }

        if let Some(center) = fields.get("center").and_then(parse_lat_lng) {
            let zoom = fields
                .get("zoom")
                .and_then(number_from_value)
                .filter(|z| z.is_finite());
            return ViewDescriptor::Center {
                center,
                zoom,
                options,
            };
        }

        ViewDescriptor::Unspecified
    }

    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        match self {
            ViewDescriptor::Bounds { bounds, options } => {
                let corners = match (bounds.is_valid(), bounds.south_west(), bounds.north_east()) {
                    (true, Some(sw), Some(ne)) => json!([[sw.lat, sw.lng], [ne.lat, ne.lng]]),
                    _ => json!([]),
                };
                out.insert("bounds".into(), corners);
                insert_options(&mut out, options);
            }
            ViewDescriptor::Center {
                center,
                zoom,
                options,
            } => {
                out.insert("center".into(), json!({ "lat": center.lat, "lng": center.lng }));
                if let Some(zoom) = zoom {
                    out.insert("zoom".into(), json!(zoom));
                }
                insert_options(&mut out, options);
            }
            ViewDescriptor::Unspecified => {}
        }
        Value::Object(out)
    }
}

impl From<Value> for ViewDescriptor {
    fn from(value: Value) -> Self {
        ViewDescriptor::from_value(&value)
    }
}

impl From<ViewDescriptor> for Value {
    fn from(descriptor: ViewDescriptor) -> Self {
        descriptor.to_value()
    }
}

fn present(fields: &Map<String, Value>, key: &str) -> bool {
    fields.get(key).is_some_and(|v| !v.is_null())
}

fn insert_options(out: &mut Map<String, Value>, options: &ViewOptions) {
    if options.is_empty() {
        return;
    }
    if let Ok(v) = serde_json::to_value(options) {
        out.insert("options".into(), v);
    }
}

/// Accepts `{lat, lng}`, `{lat, lon}` and `[lat, lng]`.
fn parse_lat_lng(value: &Value) -> Option<LatLng> {
    let (lat, lng) = match value {
        Value::Object(o) => (o.get("lat")?, o.get("lng").or_else(|| o.get("lon"))?),
        Value::Array(a) if a.len() >= 2 => (&a[0], &a[1]),
        _ => return None,
    };
    let p = LatLng::new(number_from_value(lat)?, number_from_value(lng)?);
    p.is_finite().then_some(p)
}

/// `[[lat, lng], [lat, lng]]`; anything else yields an invalid bounds value.
fn parse_bounds(value: &Value) -> LatLngBounds {
    let mut bounds = LatLngBounds::empty();
    let Value::Array(points) = value else {
        return bounds;
    };
    for point in points {
        bounds.extend(parse_lat_lng(point).unwrap_or(LatLng::new(f64::NAN, f64::NAN)));
    }
    bounds
}
