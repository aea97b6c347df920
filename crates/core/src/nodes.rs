//! Per-country aggregation of trade volume.
//!
//! Produces one [`CountryNode`] per distinct value of the grouping column,
//! positioned through a [`PositionResolver`].

use crate::error::Result;
use crate::geo::Coordinates;
use crate::table::TradeTable;
use crate::traits::PositionResolver;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// One country's aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryNode {
    /// Country code (unique within a node table)
    pub iso: String,
    /// Sum of the value column over the country's rows
    pub aggregate_value: f64,
    /// Geocoded position; `None` when the country did not resolve
    pub position: Option<Coordinates>,
}

impl CountryNode {
    #[must_use]
    pub fn lat(&self) -> Option<f64> {
        self.position.map(|p| p.lat)
    }

    #[must_use]
    pub fn lon(&self) -> Option<f64> {
        self.position.map(|p| p.lon)
    }
}

/// A lookup that could not be completed for one code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeFailure {
    pub iso: String,
    pub error: String,
}

/// Country nodes keyed by code, iterated in ascending code order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeTable {
    nodes: BTreeMap<String, CountryNode>,
    unresolved: Vec<String>,
    failed: Vec<GeocodeFailure>,
}

impl NodeTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a node.
    pub fn insert(&mut self, node: CountryNode) {
        self.nodes.insert(node.iso.clone(), node);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn get(&self, iso: &str) -> Option<&CountryNode> {
        self.nodes.get(iso)
    }

    /// Position of a country, if it is in the table and resolved.
    #[must_use]
    pub fn position(&self, iso: &str) -> Option<Coordinates> {
        self.nodes.get(iso).and_then(|n| n.position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountryNode> {
        self.nodes.values()
    }

    /// Nodes that have a position.
    pub fn positioned(&self) -> impl Iterator<Item = &CountryNode> {
        self.nodes.values().filter(|n| n.position.is_some())
    }

    /// Codes the geocoder answered with "no match".
    #[must_use]
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    /// Codes whose lookup failed with a service error.
    #[must_use]
    pub fn failed(&self) -> &[GeocodeFailure] {
        &self.failed
    }
}

/// Sums `value_column` per distinct `group_column` value and positions each group.
///
/// NaN values are skipped in the sums. A geocoding error for one code leaves that
/// node without a position and is recorded in [`NodeTable::failed`]; the other
/// codes are still resolved.
///
/// # Errors
/// Returns `InvalidArgument` if either column is missing. Geocoding errors are
/// never returned.
pub async fn aggregate_nodes<R>(
    table: &TradeTable,
    value_column: &str,
    group_column: &str,
    resolver: &mut R,
) -> Result<NodeTable>
where
    R: PositionResolver + ?Sized,
{
    let values = table.numeric(value_column)?;
    let groups = table.text(group_column)?;

    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for (group, value) in groups.iter().zip(values) {
        let sum = sums.entry(group.as_str()).or_insert(0.0);
        if !value.is_nan() {
            *sum += value;
        }
    }

    let mut nodes = NodeTable::new();
    for (iso, aggregate_value) in sums {
        let position = match resolver.resolve_position(iso).await {
            Ok(Some(position)) => Some(position),
            Ok(None) => {
                nodes.unresolved.push(iso.to_string());
                None
            }
            Err(e) => {
                warn!(iso, error = %e, "Geocoding failed, node left without position");
                nodes.failed.push(GeocodeFailure {
                    iso: iso.to_string(),
                    error: e.to_string(),
                });
                None
            }
        };

        nodes.insert(CountryNode {
            iso: iso.to_string(),
            aggregate_value,
            position,
        });
    }

    if !nodes.unresolved.is_empty() || !nodes.failed.is_empty() {
        warn!(
            unresolved = ?nodes.unresolved,
            failed = ?nodes.failed.iter().map(|f| f.iso.as_str()).collect::<Vec<_>>(),
            "Some countries have no position"
        );
    }
    info!(
        nodes = nodes.len(),
        positioned = nodes.positioned().count(),
        group_column,
        "Aggregated country nodes"
    );

    Ok(nodes)
}
