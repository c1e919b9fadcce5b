//! The mapping widget as seen from the synchronizer.

use std::cell::RefCell;

use foundation::{LatLng, LatLngBounds};
use serde_json::{Value, json};

use crate::descriptor::ViewOptions;

/// Upper zoom bound used when neither the map nor the command sets one.
pub const DEFAULT_MAX_ZOOM: f64 = 18.0;

/// Viewport capability of a map widget.
///
/// Mutations are fire-and-forget commands: the widget may animate them, but
/// callers treat them as done once the call returns.
pub trait MapWidget {
    fn set_view(&self, center: LatLng, zoom: f64, options: &ViewOptions);
    fn fly_to(&self, center: LatLng, zoom: f64, options: &ViewOptions);
    fn fit_bounds(&self, bounds: LatLngBounds, options: &ViewOptions);
    /// `None` until the map has been given a first view.
    fn zoom(&self) -> Option<f64>;
    fn center(&self) -> LatLng;
    fn set_attribution_prefix(&self, html: &str);
}

/// A concrete viewport command.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCommand {
    SetView {
        center: LatLng,
        zoom: f64,
        options: ViewOptions,
    },
    FlyTo {
        center: LatLng,
        zoom: f64,
        options: ViewOptions,
    },
    FitBounds {
        bounds: LatLngBounds,
        options: ViewOptions,
    },
}

impl ViewCommand {
    pub fn issue<M: MapWidget + ?Sized>(&self, map: &M) {
        match self {
            ViewCommand::SetView {
                center,
                zoom,
                options,
            } => map.set_view(*center, *zoom, options),
            ViewCommand::FlyTo {
                center,
                zoom,
                options,
            } => map.fly_to(*center, *zoom, options),
            ViewCommand::FitBounds { bounds, options } => map.fit_bounds(*bounds, options),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ViewCommand::SetView { .. } => "set-view",
            ViewCommand::FlyTo { .. } => "fly-to",
            ViewCommand::FitBounds { .. } => "fit-bounds",
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ViewCommand::SetView {
                center,
                zoom,
                options,
            }
            | ViewCommand::FlyTo {
                center,
                zoom,
                options,
            } => json!({
                "kind": self.kind(),
                "center": { "lat": center.lat, "lng": center.lng },
                "zoom": zoom,
                "options": options,
            }),
            ViewCommand::FitBounds { bounds, options } => {
                let corner = |p: Option<LatLng>| p.map(|p| json!([p.lat, p.lng]));
                json!({
                    "kind": self.kind(),
                    "bounds": [corner(bounds.south_west()), corner(bounds.north_east())],
                    "options": options,
                })
            }
        }
    }
}

impl std::fmt::Display for ViewCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewCommand::SetView { center, zoom, .. } | ViewCommand::FlyTo { center, zoom, .. } => {
                write!(f, "{} ({}, {}) z{}", self.kind(), center.lat, center.lng, zoom)
            }
            ViewCommand::FitBounds { bounds, .. } => match (bounds.south_west(), bounds.north_east()) {
                (Some(sw), Some(ne)) => write!(
                    f,
                    "fit-bounds ({}, {}) - ({}, {})",
                    sw.lat, sw.lng, ne.lat, ne.lng
                ),
                _ => write!(f, "fit-bounds (empty)"),
            },
        }
    }
}

#[derive(Debug, Default)]
struct HeadlessState {
    center: Option<LatLng>,
    zoom: Option<f64>,
    attribution_prefix: Option<String>,
    issued: Vec<ViewCommand>,
}

/// In-memory map widget: tracks the viewport and keeps every issued command.
///
/// Transitions are applied instantly; `fly_to` ends where `set_view` would.
#[derive(Debug)]
pub struct HeadlessMap {
    max_zoom: f64,
    state: RefCell<HeadlessState>,
}

impl Default for HeadlessMap {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HeadlessMap {
    pub fn new(max_zoom: Option<f64>) -> Self {
        Self {
            max_zoom: max_zoom.unwrap_or(DEFAULT_MAX_ZOOM),
            state: RefCell::new(HeadlessState::default()),
        }
    }

    /// A map that already shows `center` at `zoom`, as after a first load.
    pub fn showing(center: LatLng, zoom: f64) -> Self {
        let map = Self::default();
        {
            let mut st = map.state.borrow_mut();
            st.center = Some(center);
            st.zoom = Some(zoom);
        }
        map
    }

    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    pub fn issued(&self) -> Vec<ViewCommand> {
        self.state.borrow().issued.clone()
    }

    pub fn attribution_prefix(&self) -> Option<String> {
        self.state.borrow().attribution_prefix.clone()
    }

    fn clamp_zoom(&self, zoom: f64, options: &ViewOptions) -> f64 {
        let max = options.max_zoom.unwrap_or(self.max_zoom).min(self.max_zoom);
        zoom.clamp(0.0, max.max(0.0))
    }

    fn move_to(&self, center: LatLng, zoom: f64, command: ViewCommand) {
        let mut st = self.state.borrow_mut();
        st.center = Some(center);
        st.zoom = Some(zoom);
        st.issued.push(command);
    }
}

/// Largest zoom at which `bounds` still fits, from its angular span.
fn zoom_for_bounds(bounds: &LatLngBounds) -> f64 {
    let (Some(sw), Some(ne)) = (bounds.south_west(), bounds.north_east()) else {
        return 0.0;
    };
    let span = (ne.lng - sw.lng).max((ne.lat - sw.lat) * 2.0).max(1e-9);
    (360.0 / span).log2().floor().max(0.0)
}

impl MapWidget for HeadlessMap {
    fn set_view(&self, center: LatLng, zoom: f64, options: &ViewOptions) {
        let zoom = self.clamp_zoom(zoom, options);
        self.move_to(
            center,
            zoom,
            ViewCommand::SetView {
                center,
                zoom,
                options: options.clone(),
            },
        );
    }

    fn fly_to(&self, center: LatLng, zoom: f64, options: &ViewOptions) {
        let zoom = self.clamp_zoom(zoom, options);
        self.move_to(
            center,
            zoom,
            ViewCommand::FlyTo {
                center,
                zoom,
                options: options.clone(),
            },
        );
    }

    fn fit_bounds(&self, bounds: LatLngBounds, options: &ViewOptions) {
        let Some(center) = bounds.center() else {
            tracing::debug!("headless map: ignoring fit to empty bounds");
            return;
        };
        let zoom = self.clamp_zoom(zoom_for_bounds(&bounds), options);
        self.move_to(
            center,
            zoom,
            ViewCommand::FitBounds {
                bounds,
                options: options.clone(),
            },
        );
    }

    fn zoom(&self) -> Option<f64> {
        self.state.borrow().zoom
    }

    fn center(&self) -> LatLng {
        self.state.borrow().center.unwrap_or(LatLng::ORIGIN)
    }

    fn set_attribution_prefix(&self, html: &str) {
        self.state.borrow_mut().attribution_prefix = Some(html.to_string());
    }
}
