use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use trade_map_core::RenderPlan;

pub struct PlanWriter;

impl PlanWriter {
    /// Writes the render plan as pretty JSON, creating parent directories.
    ///
    /// # Errors
    /// Returns error if the file cannot be created or serialization fails
    pub fn write_json(path: impl AsRef<Path>, plan: &RenderPlan) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create plan file: {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), plan)?;

        tracing::info!(
            path = %path.display(),
            markers = plan.markers.len(),
            segments = plan.segments.len(),
            "Wrote render plan"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use trade_map_core::{build_render_plan, ColumnNames, NodeTable, RenderConfig, TradeTable};

    #[test]
    fn test_plan_json_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("plan.json");

        let plan = build_render_plan(
            &NodeTable::new(),
            &TradeTable::from_records(&[], &ColumnNames::default()),
            "fobvalue",
            "reporterISO",
            "partnerISO",
            &RenderConfig::default(),
        )
        .unwrap();

        PlanWriter::write_json(&path, &plan).unwrap();
        let loaded: RenderPlan =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, plan);
        assert_eq!(loaded.config.title, "TITLE");
    }
}
