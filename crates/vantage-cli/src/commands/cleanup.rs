//! Cleanup command implementation.

use crate::cli::CleanupArgs;
use crate::error::Result;
use crate::output::Formatter;
use vantage_janitor::{Janitor, SweepReport};
use vantage_pipeline::PipelineConfig;
use vantage_store::SqliteTableStore;

/// Execute the cleanup command.
///
/// Runs the retention sweep on its own; no inference client is built.
pub fn execute_cleanup(
    args: CleanupArgs,
    config: &PipelineConfig,
    formatter: &Formatter,
) -> Result<()> {
    let sweep = sweep(args.dry_run, config)?;
    let dry_run = args.dry_run || config.retention.dry_run;

    println!("{}", formatter.format_sweep(&sweep, dry_run)?);

    Ok(())
}

fn sweep(dry_run: bool, config: &PipelineConfig) -> Result<SweepReport> {
    let mut retention = config.retention();
    retention.dry_run |= dry_run;

    let mut store = SqliteTableStore::new(&config.store.path)?;
    let mut janitor = Janitor::new(retention)?.with_retry(config.retry);
    Ok(janitor.sweep(&mut store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_domain::{RawRecord, Source, TableStore};

    fn config_with_old_post(dir: &tempfile::TempDir) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.store.path = dir.path().join("vantage.db");

        let schema = Source::Forum.schema();
        let mut store = SqliteTableStore::new(&config.store.path).unwrap();
        let table = store.open(Source::Forum.raw_table(), &schema.raw_header()).unwrap();
        let row = RawRecord::new(Source::Forum)
            .with_field("Title", "Old thread")
            .with_field("Date", "2001-01-01")
            .to_row(&schema);
        store.append(&table, &[row]).unwrap();
        config
    }

    fn forum_rows(config: &PipelineConfig) -> usize {
        let mut store = SqliteTableStore::new(&config.store.path).unwrap();
        let table = store
            .open(Source::Forum.raw_table(), &Source::Forum.schema().raw_header())
            .unwrap();
        store.read_all(&table).unwrap().len()
    }

    #[test]
    fn test_dry_run_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_old_post(&dir);

        let report = sweep(true, &config).unwrap();

        assert_eq!(report.removed(), 1);
        assert_eq!(forum_rows(&config), 1);
    }

    #[test]
    fn test_sweep_removes_expired_rows() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_old_post(&dir);

        let report = sweep(false, &config).unwrap();

        assert_eq!(report.removed(), 1);
        assert_eq!(forum_rows(&config), 0);
    }
}
