use crate::descriptor::ViewDescriptor;
use crate::map::{MapWidget, ViewCommand};

/// Zoom used for a center without an explicit zoom or `options.maxZoom`.
pub const DEFAULT_CENTER_ZOOM: f64 = 12.0;

/// Outcome of turning a descriptor into a map command.
///
/// `NotApplicable` is not an error: the caller moves on to its next source.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Applied(ViewCommand),
    NotApplicable,
}

impl Resolution {
    pub fn is_applied(&self) -> bool {
        matches!(self, Resolution::Applied(_))
    }

    pub fn command(&self) -> Option<&ViewCommand> {
        match self {
            Resolution::Applied(cmd) => Some(cmd),
            Resolution::NotApplicable => None,
        }
    }
}

pub fn resolve(descriptor: &ViewDescriptor) -> Resolution {
    match descriptor {
        ViewDescriptor::Bounds { bounds, options } => {
            if !bounds.is_valid() {
                return Resolution::NotApplicable;
            }
            Resolution::Applied(ViewCommand::FitBounds {
                bounds: *bounds,
                options: options.clone(),
            })
        }
        ViewDescriptor::Center {
            center,
            zoom,
            options,
        } => {
            let zoom = zoom.or(options.max_zoom).unwrap_or(DEFAULT_CENTER_ZOOM);
            Resolution::Applied(ViewCommand::SetView {
                center: *center,
                zoom,
                options: options.clone(),
            })
        }
        ViewDescriptor::Unspecified => Resolution::NotApplicable,
    }
}

/// Resolves `descriptor` and, if it yields a command, issues it on `map`.
pub fn apply_view<M: MapWidget + ?Sized>(map: &M, descriptor: &ViewDescriptor) -> bool {
    match resolve(descriptor) {
        Resolution::Applied(cmd) => {
            cmd.issue(map);
            true
        }
        Resolution::NotApplicable => false,
    }
}
