use crate::filter::Perspective;
use crate::table::ColumnNames;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub columns: ColumnNames,
    pub geocoder: GeocoderConfig,
    pub cache: CacheConfig,
    pub filter: FilterConfig,
    pub render: RenderConfig,
}

/// How a country code is turned into a geocoder query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Send the raw code.
    #[default]
    Code,
    /// Send the English country name for ISO alpha-3 codes, the raw code otherwise.
    CountryName,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub requests_per_minute: u32,
    pub query_mode: QueryMode,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "mymap".to_string(),
            timeout_secs: 10,
            requests_per_minute: 60,
            query_mode: QueryMode::Code,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// JSON file holding resolved positions across runs.
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("cache/geocode.json"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Top share of each country's edges to keep, in percent. `None` keeps every edge.
    pub quantile: Option<f64>,
    pub perspective: Perspective,
}

/// Region the map is cropped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapScope {
    #[default]
    World,
    Europe,
    Asia,
    Africa,
    NorthAmerica,
    SouthAmerica,
    Usa,
}

/// Maps an edge's share of the maximum value (0..=1) to a width factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeScaling {
    /// Every edge gets `line_width`.
    #[default]
    Constant,
    Linear,
    Sqrt,
    /// `ln(1 + x) / ln(2)`
    Log,
}

impl EdgeScaling {
    #[must_use]
    pub fn factor(&self, share: f64) -> f64 {
        let share = share.clamp(0.0, 1.0);
        match self {
            Self::Constant => 1.0,
            Self::Linear => share,
            Self::Sqrt => share.sqrt(),
            Self::Log => share.ln_1p() / std::f64::consts::LN_2,
        }
    }
}

/// Display options handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub title: String,
    pub scope: MapScope,
    /// Country code the map is centred on.
    pub center: Option<String>,
    pub zoom: f64,
    pub marker_size: f64,
    pub marker_color: String,
    pub line_color: String,
    pub line_width: f64,
    pub land_color: String,
    pub country_color: String,
    pub show_land: bool,
    pub show_legend: bool,
    pub edge_scaling: EdgeScaling,
    /// Output image path; `None` shows the figure interactively.
    pub save: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "TITLE".to_string(),
            scope: MapScope::World,
            center: None,
            zoom: 1.0,
            marker_size: 2.0,
            marker_color: "rgb(0, 0, 255)".to_string(),
            line_color: "red".to_string(),
            line_width: 1.0,
            land_color: "rgb(243, 243, 243)".to_string(),
            country_color: "rgb(204, 204, 204)".to_string(),
            show_land: true,
            show_legend: false,
            edge_scaling: EdgeScaling::Constant,
            save: None,
        }
    }
}
