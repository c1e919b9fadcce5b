//! Keeps an interactive map's viewport in step with serializable app state.
//!
//! Inbound state is applied to the map (`state-apply`), the map's viewport is
//! written back into state on request (`state-get`), and user-driven moves ask
//! the host to refresh its link. When state carries no viewport, the first view
//! comes from the `initial-map-view` parameter, then the configured default
//! view, then a fixed fallback.

pub mod config;
pub mod descriptor;
pub mod host;
pub mod map;
pub mod pipeline;
pub mod plugin;
pub mod resolver;
pub mod state;
pub mod synchronizer;
mod value;

pub use config::*;
pub use descriptor::*;
pub use host::*;
pub use map::*;
pub use pipeline::*;
pub use plugin::*;
pub use resolver::*;
pub use state::*;
pub use synchronizer::*;
