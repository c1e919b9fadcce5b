//! Decides the map's first viewport.
//!
//! Sources are tried in order and the first one that resolves wins:
//! the `initial-map-view` parameter, the configured default view, and finally
//! a fixed view of the whole world at zoom 4. A failed fetch and an
//! unresolvable descriptor are treated the same way: skip to the next source.

use foundation::LatLng;

use crate::descriptor::{ViewDescriptor, ViewOptions};
use crate::host::{Host, ParameterError};
use crate::map::{MapWidget, ViewCommand};
use crate::resolver::{Resolution, resolve};

/// Host parameter holding the preferred initial view.
pub const INITIAL_VIEW_PARAMETER: &str = "initial-map-view";

pub const FALLBACK_CENTER: LatLng = LatLng::ORIGIN;
pub const FALLBACK_ZOOM: f64 = 4.0;

/// Where an applied view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewSource {
    /// `lat`/`lon`/`zoom` carried by the inbound state.
    State,
    Parameter,
    ConfiguredDefault,
    Fallback,
}

impl ViewSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewSource::State => "state",
            ViewSource::Parameter => "parameter",
            ViewSource::ConfiguredDefault => "default-view",
            ViewSource::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for ViewSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn fallback_command() -> ViewCommand {
    ViewCommand::SetView {
        center: FALLBACK_CENTER,
        zoom: FALLBACK_ZOOM,
        options: ViewOptions::default(),
    }
}

/// First-success-wins over `candidates`; the fixed fallback closes the chain,
/// so a command is always produced.
pub fn first_applicable<'a, I>(candidates: I) -> (ViewSource, ViewCommand)
where
    I: IntoIterator<Item = (ViewSource, &'a ViewDescriptor)>,
{
    for (source, descriptor) in candidates {
        match resolve(descriptor) {
            Resolution::Applied(cmd) => return (source, cmd),
            Resolution::NotApplicable => {
                tracing::debug!(%source, "view source not applicable");
            }
        }
    }
    (ViewSource::Fallback, fallback_command())
}

/// Fetches the `initial-map-view` parameter as a descriptor.
pub async fn fetch_initial_view<H: Host>(host: &H) -> Result<ViewDescriptor, ParameterError> {
    let value = host.get_parameter(INITIAL_VIEW_PARAMETER).await?;
    Ok(ViewDescriptor::from_value(&value))
}

/// What the initial view pipeline did.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialView {
    pub source: ViewSource,
    pub command: ViewCommand,
    /// Set when the parameter fetch failed and the chain carried on without it.
    pub fetch_error: Option<ParameterError>,
}

/// Runs the full chain and issues the winning command on `map`.
pub async fn initial_view<M, H>(
    map: &M,
    host: &H,
    default_view: Option<&ViewDescriptor>,
) -> InitialView
where
    M: MapWidget + ?Sized,
    H: Host,
{
    let fetched = fetch_initial_view(host).await;
    let (parameter, fetch_error) = match fetched {
        Ok(descriptor) => (Some(descriptor), None),
        Err(err) => {
            tracing::debug!("initial view parameter unavailable: {err}");
            (None, Some(err))
        }
    };

    let candidates = parameter
        .as_ref()
        .map(|d| (ViewSource::Parameter, d))
        .into_iter()
        .chain(default_view.map(|d| (ViewSource::ConfiguredDefault, d)));
    let (source, command) = first_applicable(candidates);
    command.issue(map);

    InitialView {
        source,
        command,
        fetch_error,
    }
}

/// Re-derives the view from the parameter only. Failures leave the map as is.
pub async fn refresh_auto_view<M, H>(map: &M, host: &H) -> Result<Resolution, ParameterError>
where
    M: MapWidget + ?Sized,
    H: Host,
{
    let descriptor = fetch_initial_view(host).await?;
    let resolution = resolve(&descriptor);
    if let Resolution::Applied(cmd) = &resolution {
        cmd.issue(map);
    }
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::{FALLBACK_ZOOM, ViewSource, fallback_command, first_applicable};
    use crate::descriptor::ViewDescriptor;
    use crate::map::ViewCommand;
    use foundation::LatLng;

    #[test]
    fn first_resolvable_source_wins() {
        let param = ViewDescriptor::center(1.0, 2.0, Some(3.0));
        let default = ViewDescriptor::center(5.0, 6.0, Some(7.0));
        let (source, cmd) = first_applicable([
            (ViewSource::Parameter, &param),
            (ViewSource::ConfiguredDefault, &default),
        ]);
        assert_eq!(source, ViewSource::Parameter);
        assert!(matches!(cmd, ViewCommand::SetView { zoom, .. } if zoom == 3.0));
    }

    #[test]
    fn unresolvable_sources_are_skipped() {
        let param = ViewDescriptor::Unspecified;
        let default = ViewDescriptor::bounds(0.0, 0.0, 1.0, 1.0);
        let (source, cmd) = first_applicable([
            (ViewSource::Parameter, &param),
            (ViewSource::ConfiguredDefault, &default),
        ]);
        assert_eq!(source, ViewSource::ConfiguredDefault);
        assert_eq!(cmd.kind(), "fit-bounds");
    }

    #[test]
    fn broken_default_still_reaches_fallback() {
        let default = ViewDescriptor::bounds(f64::NAN, 0.0, 1.0, 1.0);
        let (source, cmd) = first_applicable([(ViewSource::ConfiguredDefault, &default)]);
        assert_eq!(source, ViewSource::Fallback);
        assert_eq!(cmd, fallback_command());
    }

    #[test]
    fn empty_chain_falls_back_to_world_view() {
        let (source, cmd) = first_applicable(std::iter::empty());
        assert_eq!(source, ViewSource::Fallback);
        match cmd {
            ViewCommand::SetView { center, zoom, .. } => {
                assert_eq!(center, LatLng::new(0.0, 0.0));
                assert_eq!(zoom, FALLBACK_ZOOM);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
