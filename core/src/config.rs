use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;

pub const DEFAULT_VIEWER_BASE_URL: &str = "https://neuroglancer-demo.appspot.com/";
pub const DEFAULT_FRAGMENT_MARKER: &str = "#!";
pub const DEFAULT_LAYER_NAME: &str = "manc:v1.2.3";
pub const DEFAULT_KEY_FIELD: &str = "bodyId_post";
pub const DEFAULT_SEGMENTS: [&str; 2] = ["10327", "11670"];

/// What `clear()` does to the metadata panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClearPolicy {
    /// Keep showing the last displayed record.
    #[default]
    Retain,
    /// Unset the displayed record together with the selection.
    Unset,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    pub base_url: String,
    pub fragment_marker: String,
    pub layer_name: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_VIEWER_BASE_URL.to_string(),
            fragment_marker: DEFAULT_FRAGMENT_MARKER.to_string(),
            layer_name: DEFAULT_LAYER_NAME.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DatasetConfig {
    pub key_field: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            key_field: DEFAULT_KEY_FIELD.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    pub default_segments: Vec<String>,
    pub clear_policy: ClearPolicy,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            default_segments: DEFAULT_SEGMENTS.iter().map(|s| s.to_string()).collect(),
            clear_policy: ClearPolicy::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SourcesConfig {
    pub edges_path: String,
    pub metadata_path: String,
    pub state_path: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            edges_path: "matrix.json".to_string(),
            metadata_path: "cell_info.csv".to_string(),
            state_path: "state.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub viewer: ViewerConfig,
    pub dataset: DatasetConfig,
    pub selection: SelectionConfig,
    pub sources: SourcesConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Layers `<dir>/default`, `<dir>/<RUN_MODE>` and `CONNECTOME__*`
    /// environment variables.
    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let dir = dir.as_ref();

        let builder = Config::builder()
            .add_source(File::from(dir.join("default")).required(false))
            .add_source(File::from(dir.join(&run_mode)).required(false))
            .add_source(
                Environment::with_prefix("CONNECTOME")
                    .prefix_separator("__")
                    .separator("__"),
            );

        builder.build()?.try_deserialize()
    }
}
