/// Geographic coordinate in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const ORIGIN: LatLng = LatLng { lat: 0.0, lng: 0.0 };

    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Returns a copy with the longitude folded into `[-180, 180]`.
    ///
    /// Exactly `180` is kept as is; every other value lands in `[-180, 180)`.
    /// Latitude is not clamped.
    pub fn wrap(&self) -> Self {
        Self {
            lat: self.lat,
            lng: wrap_longitude(self.lng),
        }
    }
}

pub fn wrap_longitude(lng: f64) -> f64 {
    const MIN: f64 = -180.0;
    const MAX: f64 = 180.0;
    if lng == MAX {
        return lng;
    }
    let span = MAX - MIN;
    ((lng - MIN) % span + span) % span + MIN
}
