//! Host configuration as far as the map module cares about it.

use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::descriptor::ViewDescriptor;

pub const DEFAULT_APP_NAME: &str = "geowiki-viewer";
pub const DEFAULT_APP_URL: &str = "https://github.com/geowiki-net/geowiki-viewer/";

/// Characters left alone when escaping a URL: alphanumerics plus the URI
/// reserved and unreserved marks.
const URI_KEEP: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(rename = "maxZoom", default, skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<MapConfig>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub app: AppInfo,
    /// Sections owned by other modules.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(rename = "defaultView", default, skip_serializing_if = "Option::is_none")]
    pub default_view: Option<ViewDescriptor>,
}

/// Application identity shown in the map attribution.
///
/// Each field falls back to its default on its own, whether missing or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppInfo {
    #[serde(default = "default_app_name", deserialize_with = "name_or_default")]
    pub name: String,
    #[serde(default = "default_app_url", deserialize_with = "url_or_default")]
    pub url: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn name_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_app_name))
}

fn url_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_app_url))
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

fn default_app_url() -> String {
    DEFAULT_APP_URL.to_string()
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            url: default_app_url(),
        }
    }
}

impl HostConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn default_view(&self) -> Option<&ViewDescriptor> {
        self.map.as_ref()?.default_view.as_ref()
    }

    /// HTML for the attribution prefix: a link to the application's homepage.
    pub fn attribution_prefix(&self) -> String {
        format!(
            "<a target=\"_blank\" href=\"{}\">{}</a>",
            encode_uri(&self.app.url),
            self.app.name
        )
    }
}

/// Escapes `raw` for use as a link target. Absolute URLs are normalized by the
/// URL parser; relative ones are percent-encoded as they are.
pub fn encode_uri(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => url.to_string(),
        Err(_) => utf8_percent_encode(raw, URI_KEEP).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, DEFAULT_APP_NAME, DEFAULT_APP_URL, HostConfig, encode_uri};
    use crate::descriptor::ViewDescriptor;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_config_gets_app_defaults() {
        let cfg = HostConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg.app.name, DEFAULT_APP_NAME);
        assert_eq!(cfg.app.url, DEFAULT_APP_URL);
        assert_eq!(cfg.max_zoom, None);
        assert!(cfg.default_view().is_none());
    }

    #[test]
    fn partial_app_section_keeps_other_default() {
        let cfg = HostConfig::from_json_str(r#"{ "app": { "name": "atlas" } }"#).unwrap();
        assert_eq!(cfg.app.name, "atlas");
        assert_eq!(cfg.app.url, DEFAULT_APP_URL);
    }

    #[test]
    fn reads_max_zoom_and_default_view() {
        let cfg = HostConfig::from_json_str(
            r#"{
                "maxZoom": 19,
                "map": { "defaultView": { "center": [47.0, 15.4], "zoom": 8 } },
                "dataDirectory": "data"
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.max_zoom, Some(19.0));
        assert_eq!(
            cfg.default_view(),
            Some(&ViewDescriptor::center(47.0, 15.4, Some(8.0)))
        );
        assert!(cfg.extra.contains_key("dataDirectory"));
    }

    #[test]
    fn attribution_prefix_links_app_url() {
        let mut cfg = HostConfig::default();
        cfg.app.name = "My Map".into();
        cfg.app.url = "https://example.org/a b".into();
        assert_eq!(
            cfg.attribution_prefix(),
            r#"<a target="_blank" href="https://example.org/a%20b">My Map</a>"#
        );
    }

    #[test]
    fn relative_app_url_is_escaped_not_rejected() {
        let mut cfg = HostConfig::default();
        cfg.app.name = "Local".into();
        cfg.app.url = "/about/our map?x=1#top".into();
        assert_eq!(
            cfg.attribution_prefix(),
            r#"<a target="_blank" href="/about/our%20map?x=1#top">Local</a>"#
        );
    }

    #[test]
    fn encode_uri_keeps_reserved_marks() {
        assert_eq!(encode_uri("/about/"), "/about/");
        assert_eq!(encode_uri("not a url"), "not%20a%20url");
        assert_eq!(encode_uri("a/ü\"b"), "a/%C3%BC%22b");
        assert_eq!(encode_uri("100%"), "100%25");
    }

    #[test]
    fn null_app_section_gets_defaults() {
        let cfg = HostConfig::from_json_str(r#"{ "app": null }"#).unwrap();
        assert_eq!(cfg.app.name, DEFAULT_APP_NAME);
        assert_eq!(cfg.app.url, DEFAULT_APP_URL);

        let cfg =
            HostConfig::from_json_str(r#"{ "app": { "name": null, "url": "/home" } }"#).unwrap();
        assert_eq!(cfg.app.name, DEFAULT_APP_NAME);
        assert_eq!(cfg.app.url, "/home");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = HostConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
