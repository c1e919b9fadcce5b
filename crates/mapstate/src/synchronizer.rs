//! Two-way bridge between app state and the map viewport.
//!
//! Every programmatic viewport change happens inside a suppression guard, so
//! the `moveend` it causes is not mistaken for the user panning the map. When
//! the change waits on a parameter fetch, the guard is held across the await.

use std::cell::{Ref, RefCell};

use runtime::{Event, EventBus, InteractivityFlag, SuppressionGuard, SuppressionScope};
use tracing::{debug, info};

use crate::config::HostConfig;
use crate::host::Host;
use crate::map::{MapWidget, ViewCommand};
use crate::pipeline::{self, ViewSource};
use crate::resolver::Resolution;
use crate::state::AppState;

/// Follow-up of `state-apply` that waits on the parameter lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingView {
    /// Re-read the parameter only; failures keep the viewport.
    AutoRefresh,
    /// Parameter, then configured default, then the fixed fallback.
    Initial,
}

pub struct Synchronizer<M, H> {
    map: M,
    host: H,
    config: HostConfig,
    suppression: SuppressionScope,
    events: RefCell<EventBus>,
}

impl<M: MapWidget, H: Host> Synchronizer<M, H> {
    pub fn new(map: M, host: H, config: HostConfig) -> Self {
        Self {
            map,
            host,
            config,
            suppression: SuppressionScope::new(),
            events: RefCell::new(EventBus::new()),
        }
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn events(&self) -> Ref<'_, EventBus> {
        self.events.borrow()
    }

    pub fn drain_events(&self) -> Vec<Event> {
        self.events.borrow_mut().drain()
    }

    /// Handles `state-apply`.
    ///
    /// Runs [`apply_state_viewport`](Self::apply_state_viewport) and then
    /// whatever parameter lookup it left pending.
    pub async fn apply_state(&self, state: &AppState) {
        if let Some(pending) = self.apply_state_viewport(state) {
            self.finish_apply(pending).await;
        }
    }

    /// Synchronous part of `state-apply`.
    ///
    /// A viewport carried by `state` is applied right away: `set_view` on a map
    /// that has never been positioned, `fly_to` otherwise. Returns the follow-up
    /// that needs the `initial-map-view` parameter: an `auto` refresh for a map
    /// that has a zoom and a state asking for `auto` mode, or the full initial
    /// view pipeline for a map that still has no zoom.
    pub fn apply_state_viewport(&self, state: &AppState) -> Option<PendingView> {
        if let Some((center, zoom)) = state.viewport() {
            let _guard = self.suppress();
            let options = Default::default();
            let command = if self.map.zoom().is_none() {
                ViewCommand::SetView {
                    center,
                    zoom,
                    options,
                }
            } else {
                ViewCommand::FlyTo {
                    center,
                    zoom,
                    options,
                }
            };
            command.issue(&self.map);
            self.record_applied(ViewSource::State, &command);
        }

        if self.map.zoom().is_some() {
            return state.is_auto().then_some(PendingView::AutoRefresh);
        }
        Some(PendingView::Initial)
    }

    /// Asynchronous part of `state-apply`. The flag stays raised until the
    /// lookup and the resulting viewport change are done.
    pub async fn finish_apply(&self, pending: PendingView) {
        match pending {
            PendingView::AutoRefresh => self.refresh_auto_view().await,
            PendingView::Initial => self.run_initial_view().await,
        }
    }

    async fn run_initial_view(&self) {
        let _guard = self.suppress();
        let outcome =
            pipeline::initial_view(&self.map, &self.host, self.config.default_view()).await;
        if let Some(err) = &outcome.fetch_error {
            self.emit("parameter.failed", err.to_string());
        }
        self.record_applied(outcome.source, &outcome.command);
    }

    async fn refresh_auto_view(&self) {
        let _guard = self.suppress();
        match pipeline::refresh_auto_view(&self.map, &self.host).await {
            Ok(Resolution::Applied(cmd)) => self.record_applied(ViewSource::Parameter, &cmd),
            Ok(Resolution::NotApplicable) => {
                debug!("auto view: parameter not applicable, keeping viewport");
                self.emit("view.not_applicable", ViewSource::Parameter.as_str());
            }
            Err(err) => {
                debug!("auto view: {err}, keeping viewport");
                self.emit("parameter.failed", err.to_string());
            }
        }
    }

    /// Handles `state-get`: writes the current viewport into `state`.
    ///
    /// Longitude is wrapped into `[-180, 180]` and the zoom truncated to an
    /// integer. A map without a zoom leaves `state` untouched.
    pub fn capture_state(&self, state: &mut AppState) {
        let Some(zoom) = self.map.zoom() else {
            return;
        };
        let center = self.map.center().wrap();
        state.lat = Some(center.lat);
        state.lon = Some(center.lng);
        state.zoom = Some(zoom.trunc());
        self.emit(
            "state.captured",
            format!("{} {} z{}", center.lat, center.lng, zoom.trunc()),
        );
    }

    /// Handles the map's `moveend`. Only user-driven moves refresh the link.
    pub fn on_move_end(&self) {
        if self.host.is_interactive() {
            self.host.update_link();
            self.emit("link.update", "");
        } else {
            debug!("skip link update for programmatic move");
            self.emit("move.ignored", "");
        }
    }

    fn suppress(&self) -> SuppressionGuard<'_> {
        self.suppression.enter(&self.host as &dyn InteractivityFlag)
    }

    fn record_applied(&self, source: ViewSource, command: &ViewCommand) {
        info!(%source, "applied view: {command}");
        self.emit("view.applied", format!("{source}: {command}"));
    }

    fn emit(&self, kind: &'static str, message: impl Into<String>) {
        self.events.borrow_mut().emit(kind, message);
    }
}
