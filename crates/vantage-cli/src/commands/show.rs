//! Show command implementation.

use crate::error::Result;
use crate::output::Formatter;
use vantage_pipeline::PipelineConfig;
use vantage_store::{shared, SqliteTableStore};
use vantage_synthesizer::read_current;

/// Execute the show command.
pub async fn execute_show(config: &PipelineConfig, formatter: &Formatter) -> Result<()> {
    let store = shared(SqliteTableStore::new(&config.store.path)?);
    let document = read_current(&store, &config.retry).await?;

    println!("{}", formatter.format_insight(document.as_ref())?);

    Ok(())
}
