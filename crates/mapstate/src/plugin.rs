//! Registration surface for the host's module loader.

use crate::config::HostConfig;
use crate::host::Host;
use crate::map::MapWidget;
use crate::synchronizer::Synchronizer;

/// Identifier the host registers this module under.
pub const MODULE_ID: &str = "map";

/// Modules that must be initialized first.
pub const REQUIRED_MODULES: &[&str] = &["config"];

pub struct MapModule;

impl MapModule {
    /// Brands the map with the application's attribution link and returns the
    /// synchronizer whose handlers the host wires to its events.
    ///
    /// The map is expected to have been created with `config.max_zoom`.
    pub fn init<M: MapWidget, H: Host>(map: M, host: H, config: HostConfig) -> Synchronizer<M, H> {
        map.set_attribution_prefix(&config.attribution_prefix());
        tracing::info!(module = MODULE_ID, app = %config.app.name, "map module initialized");
        Synchronizer::new(map, host, config)
    }
}

#[cfg(test)]
mod tests {
    use super::{MODULE_ID, MapModule, REQUIRED_MODULES};
    use crate::config::HostConfig;
    use crate::host::{Host, ParameterError};
    use crate::map::HeadlessMap;
    use runtime::{InteractivityFlag, LocalFlag};
    use serde_json::Value;

    struct NoParams(LocalFlag);

    impl InteractivityFlag for NoParams {
        fn set_non_interactive(&self, value: bool) {
            self.0.set_non_interactive(value)
        }

        fn is_interactive(&self) -> bool {
            self.0.is_interactive()
        }
    }

    impl Host for NoParams {
        async fn get_parameter(&self, name: &str) -> Result<Value, ParameterError> {
            Err(ParameterError::Missing(name.to_string()))
        }

        fn update_link(&self) {}
    }

    #[test]
    fn identity() {
        assert_eq!(MODULE_ID, "map");
        assert_eq!(REQUIRED_MODULES, &["config"]);
    }

    #[test]
    fn init_sets_attribution_prefix() {
        let sync = MapModule::init(
            HeadlessMap::default(),
            NoParams(LocalFlag::new()),
            HostConfig::default(),
        );
        let prefix = sync.map().attribution_prefix().unwrap();
        assert!(prefix.contains("href=\"https://github.com/geowiki-net/geowiki-viewer/\""));
        assert!(prefix.ends_with(">geowiki-viewer</a>"));
    }

    #[test]
    fn init_accepts_relative_app_url() {
        let mut config = HostConfig::default();
        config.app.url = "/about/".into();
        let sync = MapModule::init(HeadlessMap::default(), NoParams(LocalFlag::new()), config);
        assert_eq!(
            sync.map().attribution_prefix().as_deref(),
            Some(r#"<a target="_blank" href="/about/">geowiki-viewer</a>"#)
        );
    }
}
