//! Core types and transforms for mapping bilateral trade networks.
//!
//! This crate provides:
//! - The column-oriented [`TradeTable`] and [`TradeRecord`]
//! - Per-country node aggregation with pluggable position resolution
//! - Percentile edge filtering and symmetric pair totals
//! - The render plan handed to a map renderer
//! - Layered configuration

pub mod config;
pub mod config_loader;
pub mod error;
pub mod filter;
pub mod geo;
pub mod nodes;
pub mod plan;
pub mod symmetric;
pub mod table;
pub mod traits;

pub use config::{
    AppConfig, CacheConfig, EdgeScaling, FilterConfig, GeocoderConfig, MapScope, QueryMode,
    RenderConfig,
};
pub use config_loader::ConfigLoader;
pub use error::{GeocodeError, Result, TradeMapError};
pub use filter::{
    filter_by_percentile, filter_by_percentile_combined, filter_by_perspective, percentile,
    Perspective,
};
pub use geo::Coordinates;
pub use nodes::{aggregate_nodes, CountryNode, GeocodeFailure, NodeTable};
pub use plan::{build_render_plan, EdgeSegment, NodeMarker, RenderPlan};
pub use symmetric::total_trade_per_pair;
pub use table::{ColumnNames, TradeRecord, TradeTable};
pub use traits::{Geocoder, PositionResolver};
