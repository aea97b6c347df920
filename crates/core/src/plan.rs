//! Render plan: the prepared node and edge geometry a map renderer draws.
//!
//! Node positions are joined onto trade rows by country code. Rows with an
//! endpoint that has no position are left out and counted, never drawn at (0, 0).

use crate::config::RenderConfig;
use crate::error::Result;
use crate::geo::Coordinates;
use crate::nodes::NodeTable;
use crate::table::TradeTable;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A country marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMarker {
    pub iso: String,
    pub position: Coordinates,
    /// Aggregate trade value of the country
    pub value: f64,
    pub size: f64,
    pub hover_text: String,
}

/// A line between two trading countries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSegment {
    pub reporter: String,
    pub partner: String,
    pub from: Coordinates,
    pub to: Coordinates,
    pub value: f64,
    /// `value / max value` over the edge table
    pub opacity: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub markers: Vec<NodeMarker>,
    pub segments: Vec<EdgeSegment>,
    /// Edge rows without two positioned endpoints or without a finite value
    pub skipped_edges: usize,
    pub center: Option<Coordinates>,
    pub config: RenderConfig,
}

/// Builds the render plan for `nodes` and the trade rows in `edges`.
///
/// # Errors
/// Returns `InvalidArgument` if a named column is missing from `edges`.
pub fn build_render_plan(
    nodes: &NodeTable,
    edges: &TradeTable,
    value_column: &str,
    reporter_column: &str,
    partner_column: &str,
    config: &RenderConfig,
) -> Result<RenderPlan> {
    let values = edges.numeric(value_column)?;
    let reporters = edges.text(reporter_column)?;
    let partners = edges.text(partner_column)?;

    let markers: Vec<NodeMarker> = nodes
        .positioned()
        .filter_map(|node| {
            node.position.map(|position| NodeMarker {
                iso: node.iso.clone(),
                position,
                value: node.aggregate_value,
                size: config.marker_size,
                hover_text: node.iso.clone(),
            })
        })
        .collect();

    let max_value = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);

    let mut segments = Vec::with_capacity(edges.len());
    let mut skipped_edges = 0usize;
    for ((reporter, partner), &value) in reporters.iter().zip(partners).zip(values) {
        let (Some(from), Some(to)) = (nodes.position(reporter), nodes.position(partner)) else {
            skipped_edges += 1;
            continue;
        };
        if !value.is_finite() {
            skipped_edges += 1;
            continue;
        }

        let share = if max_value > 0.0 {
            (value / max_value).clamp(0.0, 1.0)
        } else {
            0.0
        };

        segments.push(EdgeSegment {
            reporter: reporter.clone(),
            partner: partner.clone(),
            from,
            to,
            value,
            opacity: share,
            width: config.line_width * config.edge_scaling.factor(share),
        });
    }

    let center = match config.center.as_deref() {
        Some(code) => {
            let position = nodes.position(code);
            if position.is_none() {
                warn!(center = code, "Map center country has no position");
            }
            position
        }
        None => None,
    };

    if skipped_edges > 0 {
        warn!(skipped_edges, "Edges without positioned endpoints left out");
    }
    info!(
        markers = markers.len(),
        segments = segments.len(),
        "Built render plan"
    );

    Ok(RenderPlan {
        markers,
        segments,
        skipped_edges,
        center,
        config: config.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EdgeScaling;
    use crate::nodes::CountryNode;
    use crate::table::{ColumnNames, TradeRecord};

    fn nodes() -> NodeTable {
        let mut nodes = NodeTable::new();
        nodes.insert(CountryNode {
            iso: "USA".to_string(),
            aggregate_value: 110.0,
            position: Some(Coordinates::new(39.8, -98.6)),
        });
        nodes.insert(CountryNode {
            iso: "CAN".to_string(),
            aggregate_value: 50.0,
            position: Some(Coordinates::new(61.1, -107.9)),
        });
        nodes.insert(CountryNode {
            iso: "ATL".to_string(),
            aggregate_value: 1.0,
            position: None,
        });
        nodes
    }

    fn edges() -> TradeTable {
        TradeTable::from_records(
            &[
                TradeRecord::new("USA", "CAN", 100.0),
                TradeRecord::new("CAN", "USA", 50.0),
                TradeRecord::new("USA", "ATL", 10.0),
                TradeRecord::new("USA", "MEX", 200.0),
            ],
            &ColumnNames::default(),
        )
    }

    fn plan(config: &RenderConfig) -> RenderPlan {
        build_render_plan(
            &nodes(),
            &edges(),
            "fobvalue",
            "reporterISO",
            "partnerISO",
            config,
        )
        .unwrap()
    }

    #[test]
    fn test_markers_only_for_positioned_nodes() {
        let plan = plan(&RenderConfig::default());
        let codes: Vec<&str> = plan.markers.iter().map(|m| m.iso.as_str()).collect();
        assert_eq!(codes, vec!["CAN", "USA"]);
        assert_eq!(plan.markers[1].value, 110.0);
        assert_eq!(plan.markers[1].size, 2.0);
    }

    #[test]
    fn test_segments_skip_unpositioned_endpoints() {
        let plan = plan(&RenderConfig::default());
        assert_eq!(plan.segments.len(), 2);
        assert_eq!(plan.skipped_edges, 2);
        assert_eq!(plan.segments[0].from, Coordinates::new(39.8, -98.6));
        assert_eq!(plan.segments[0].to, Coordinates::new(61.1, -107.9));
    }

    #[test]
    fn test_opacity_relative_to_table_maximum() {
        // MEX is skipped but its value still sets the maximum
        let plan = plan(&RenderConfig::default());
        assert_eq!(plan.segments[0].opacity, 0.5);
        assert_eq!(plan.segments[1].opacity, 0.25);
        assert_eq!(plan.segments[0].width, 1.0);
    }

    #[test]
    fn test_width_follows_edge_scaling() {
        let config = RenderConfig {
            line_width: 4.0,
            edge_scaling: EdgeScaling::Linear,
            ..RenderConfig::default()
        };
        let plan = plan(&config);
        assert_eq!(plan.segments[0].width, 2.0);
        assert_eq!(plan.segments[1].width, 1.0);
    }

    #[test]
    fn test_center_resolution() {
        let config = RenderConfig {
            center: Some("CAN".to_string()),
            ..RenderConfig::default()
        };
        assert_eq!(plan(&config).center, Some(Coordinates::new(61.1, -107.9)));

        let config = RenderConfig {
            center: Some("ATL".to_string()),
            ..RenderConfig::default()
        };
        assert_eq!(plan(&config).center, None);
    }

    #[test]
    fn test_empty_edges() {
        let plan = build_render_plan(
            &nodes(),
            &TradeTable::from_records(&[], &ColumnNames::default()),
            "fobvalue",
            "reporterISO",
            "partnerISO",
            &RenderConfig::default(),
        )
        .unwrap();
        assert!(plan.segments.is_empty());
        assert_eq!(plan.markers.len(), 2);
    }
}
