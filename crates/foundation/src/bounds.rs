use crate::geo::LatLng;

/// Geographic bounding box in degrees, normalized to south-west / north-east.
///
/// A default (empty) bounds value has no corners and is never valid. Any
/// non-finite point extended into the box poisons it for good.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LatLngBounds {
    corners: Option<[LatLng; 2]>,
    degenerate: bool,
}

impl LatLngBounds {
    pub fn new(a: LatLng, b: LatLng) -> Self {
        let mut bounds = Self::default();
        bounds.extend(a);
        bounds.extend(b);
        bounds
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, p: LatLng) {
        if !p.is_finite() {
            self.degenerate = true;
            return;
        }
        self.corners = Some(match self.corners {
            None => [p, p],
            Some([sw, ne]) => [
                LatLng::new(sw.lat.min(p.lat), sw.lng.min(p.lng)),
                LatLng::new(ne.lat.max(p.lat), ne.lng.max(p.lng)),
            ],
        });
    }

    pub fn is_valid(&self) -> bool {
        self.corners.is_some() && !self.degenerate
    }

    pub fn south_west(&self) -> Option<LatLng> {
        self.corners.map(|[sw, _]| sw)
    }

    pub fn north_east(&self) -> Option<LatLng> {
        self.corners.map(|[_, ne]| ne)
    }

    pub fn center(&self) -> Option<LatLng> {
        let [sw, ne] = self.corners?;
        Some(LatLng::new((sw.lat + ne.lat) / 2.0, (sw.lng + ne.lng) / 2.0))
    }
}

#[cfg(test)]
mod tests {
    use super::LatLngBounds;
    use crate::geo::LatLng;

    #[test]
    fn corners_are_normalized() {
        let b = LatLngBounds::new(LatLng::new(10.0, 20.0), LatLng::new(-5.0, 30.0));
        assert!(b.is_valid());
        assert_eq!(b.south_west(), Some(LatLng::new(-5.0, 20.0)));
        assert_eq!(b.north_east(), Some(LatLng::new(10.0, 30.0)));
        assert_eq!(b.center(), Some(LatLng::new(2.5, 25.0)));
    }

    #[test]
    fn empty_bounds_are_invalid() {
        let b = LatLngBounds::empty();
        assert!(!b.is_valid());
        assert_eq!(b.center(), None);
    }

    #[test]
    fn nan_corner_poisons_bounds() {
        let b = LatLngBounds::new(LatLng::new(f64::NAN, 20.0), LatLng::new(1.0, 2.0));
        assert!(!b.is_valid());

        let mut b = LatLngBounds::new(LatLng::new(0.0, 0.0), LatLng::new(1.0, 2.0));
        b.extend(LatLng::new(3.0, f64::INFINITY));
        assert!(!b.is_valid());
    }

    #[test]
    fn single_point_bounds_are_valid() {
        let mut b = LatLngBounds::empty();
        b.extend(LatLng::new(4.0, 5.0));
        assert!(b.is_valid());
        assert_eq!(b.south_west(), b.north_east());
    }
}
