//! Pipeline commands: run, ingest, enrich, synthesize.

use crate::error::Result;
use crate::output::Formatter;
use vantage_pipeline::{Pipeline, PipelineConfig, Stage};

/// Execute the given stages against the configured store.
pub async fn execute_run(
    stages: &[Stage],
    config: &PipelineConfig,
    formatter: &Formatter,
) -> Result<()> {
    let mut pipeline = Pipeline::from_config(config)?;
    let report = pipeline.run_stages(stages).await;

    println!("{}", formatter.format_run_report(&report)?);

    Ok(())
}
