pub mod event_bus;
pub mod interaction;

pub use event_bus::*;
pub use interaction::*;
