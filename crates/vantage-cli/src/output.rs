//! Output formatting for the CLI.

use crate::error::Result;
use colored::*;
use serde_json::json;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use vantage_domain::InsightDocument;
use vantage_janitor::SweepReport;
use vantage_pipeline::RunReport;
use vantage_synthesizer::SynthesisReport;

/// How results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a pipeline run report.
    pub fn format_run_report(&self, report: &RunReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&run_report_json(report))?),
            OutputFormat::Table => Ok(self.format_run_report_table(report)),
        }
    }

    /// Format a standalone retention sweep.
    pub fn format_sweep(&self, sweep: &SweepReport, dry_run: bool) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let mut value = sweep_json(sweep);
                value["dry_run"] = json!(dry_run);
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Table => {
                let mut out = sweep_table(sweep);
                let verb = if dry_run { "Would remove" } else { "Removed" };
                out.push('\n');
                out.push_str(&self.success(&format!("{} {} row(s)", verb, sweep.removed())));
                for failure in &sweep.failures {
                    out.push('\n');
                    out.push_str(&self.error(&format!(
                        "{} [{}]: {}",
                        failure.source, failure.kind, failure.message
                    )));
                }
                Ok(out)
            }
        }
    }

    /// Format the stored insight document.
    pub fn format_insight(&self, document: Option<&InsightDocument>) -> Result<String> {
        let Some(document) = document else {
            return Ok(match self.format {
                OutputFormat::Json => "null".to_string(),
                OutputFormat::Table => self.warning("No insight document yet. Run `vantage run` first."),
            });
        };

        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(document)?),
            OutputFormat::Table => Ok(self.format_insight_text(document)),
        }
    }

    fn format_run_report_table(&self, report: &RunReport) -> String {
        let mut sections = vec![self.info(&format!(
            "Run {} started {}",
            report.run_id,
            report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ))];

        if !report.ingest.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Source", "Fetched", "Duplicates", "Appended"]);
            for ingest in &report.ingest {
                builder.push_record([
                    ingest.source.to_string(),
                    ingest.fetched.to_string(),
                    ingest.duplicates.to_string(),
                    ingest.appended.to_string(),
                ]);
            }
            sections.push(render(builder));
        }

        if let Some(sweep) = &report.cleanup {
            if !sweep.cleaned.is_empty() {
                sections.push(sweep_table(sweep));
            }
        }

        if !report.enrichment.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Source", "Considered", "Seen", "Enriched", "Deferred", "Failed"]);
            for enrichment in &report.enrichment {
                builder.push_record([
                    enrichment.source.to_string(),
                    enrichment.considered.to_string(),
                    enrichment.already_enriched.to_string(),
                    enrichment.enriched.to_string(),
                    enrichment.deferred.to_string(),
                    enrichment.failed().to_string(),
                ]);
            }
            sections.push(render(builder));
        }

        if let Some(synthesis) = &report.synthesis {
            sections.push(self.synthesis_line(synthesis));
        }

        if report.skips.is_empty() {
            sections.push(self.success(&format!(
                "{} ingested, {} enriched, nothing skipped",
                report.total_ingested(),
                report.total_enriched()
            )));
        } else {
            let mut builder = Builder::default();
            builder.push_record(["Stage", "Unit", "Kind", "Message"]);
            for skip in &report.skips {
                builder.push_record([
                    skip.stage.to_string(),
                    skip.unit.clone(),
                    skip.kind.to_string(),
                    skip.message.clone(),
                ]);
            }
            sections.push(render(builder));
            sections.push(self.warning(&format!(
                "{} ingested, {} enriched, {} skipped",
                report.total_ingested(),
                report.total_enriched(),
                report.skips.len()
            )));
        }

        sections.join("\n")
    }

    fn synthesis_line(&self, synthesis: &SynthesisReport) -> String {
        let line = format!(
            "Insight document {}: {} of {} analyses, {} chars",
            synthesis.outcome,
            synthesis.records_selected,
            synthesis.records_available,
            synthesis.context_chars
        );
        if synthesis.written() {
            self.success(&line)
        } else {
            self.info(&line)
        }
    }

    fn format_insight_text(&self, document: &InsightDocument) -> String {
        let mut out = String::new();
        out.push_str(&self.colorize("Executive summary", "cyan"));
        out.push('\n');
        out.push_str(&document.executive_summary);
        out.push('\n');

        if let Some(competitors) = &document.competitor_insights {
            let mut builder = Builder::default();
            builder.push_record(["Competitor", "Strengths", "Weaknesses"]);
            for insight in competitors {
                builder.push_record([
                    insight.competitor.clone(),
                    insight.strengths.join("\n"),
                    insight.weaknesses.join("\n"),
                ]);
            }
            out.push('\n');
            out.push_str(&render(builder));
            out.push('\n');
        }

        if let Some(recommendations) = &document.recommendations_for_product_manager {
            self.push_list(&mut out, "Product recommendations", recommendations);
        }

        if let Some(marketing) = &document.recommendations_for_marketing_team {
            self.push_list(&mut out, "Campaign themes", &marketing.campaign_themes);
            self.push_list(&mut out, "Keywords", &marketing.keywords);
            self.push_list(&mut out, "Pain points", &marketing.pain_points);
            self.push_list(&mut out, "Market gaps", &marketing.market_gaps);
        }

        if let Some(notes) = &document.regulatory_notes {
            let mut builder = Builder::default();
            builder.push_record(["Regulatory", "Notes"]);
            for (label, text) in [
                ("FDA", &notes.fda),
                ("Recalls", &notes.recalls),
                ("Approvals", &notes.approvals),
                ("Regulations", &notes.regulations),
            ] {
                if !text.is_empty() {
                    builder.push_record([label, text.as_str()]);
                }
            }
            out.push('\n');
            out.push_str(&render(builder));
            out.push('\n');
        }

        out.trim_end().to_string()
    }

    fn push_list(&self, out: &mut String, title: &str, items: &[String]) {
        if items.is_empty() {
            return;
        }
        out.push('\n');
        out.push_str(&self.colorize(title, "cyan"));
        out.push('\n');
        for item in items {
            out.push_str(&format!("  • {}\n", item));
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().bold().to_string(),
            _ => text.to_string(),
        }
    }
}

fn render(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn sweep_table(sweep: &SweepReport) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Source", "Removed", "Kept", "Undated", "Applied"]);
    for cleaned in &sweep.cleaned {
        builder.push_record([
            cleaned.source.to_string(),
            cleaned.counts.removed.to_string(),
            cleaned.counts.kept.to_string(),
            cleaned.counts.undated.to_string(),
            if cleaned.applied { "yes" } else { "no" }.to_string(),
        ]);
    }
    render(builder)
}

fn sweep_json(sweep: &SweepReport) -> serde_json::Value {
    json!({
        "removed": sweep.removed(),
        "cleaned": sweep.cleaned.iter().map(|c| json!({
            "source": c.source.as_str(),
            "removed": c.counts.removed,
            "kept": c.counts.kept,
            "undated": c.counts.undated,
            "applied": c.applied,
        })).collect::<Vec<_>>(),
        "failures": sweep.failures.iter().map(|f| json!({
            "source": f.source.as_str(),
            "kind": f.kind.to_string(),
            "message": f.message,
        })).collect::<Vec<_>>(),
    })
}

fn run_report_json(report: &RunReport) -> serde_json::Value {
    json!({
        "run_id": report.run_id.to_string(),
        "started_at": report.started_at,
        "ingest": report.ingest.iter().map(|i| json!({
            "source": i.source.as_str(),
            "fetched": i.fetched,
            "duplicates": i.duplicates,
            "appended": i.appended,
        })).collect::<Vec<_>>(),
        "cleanup": report.cleanup.as_ref().map(sweep_json),
        "enrichment": report.enrichment.iter().map(|e| json!({
            "source": e.source.as_str(),
            "considered": e.considered,
            "already_enriched": e.already_enriched,
            "enriched": e.enriched,
            "deferred": e.deferred,
            "failed": e.failed(),
        })).collect::<Vec<_>>(),
        "synthesis": report.synthesis.as_ref().map(|s| json!({
            "outcome": s.outcome.to_string(),
            "records_available": s.records_available,
            "records_selected": s.records_selected,
            "context_chars": s.context_chars,
        })),
        "skips": report.skips.iter().map(|s| json!({
            "stage": s.stage.to_string(),
            "unit": s.unit,
            "kind": s.kind.to_string(),
            "message": s.message,
        })).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_domain::{FailureKind, Source};
    use vantage_janitor::{SourceCleanup, SourceCounts};
    use vantage_pipeline::{IngestReport, Stage};

    fn report() -> RunReport {
        let mut report = RunReport::new();
        report.ingest.push(IngestReport {
            source: Source::News,
            fetched: 5,
            duplicates: 2,
            appended: 3,
        });
        report.skip(Stage::Ingest, "forum", FailureKind::SourceUnavailable, "timed out");
        report
    }

    fn document() -> InsightDocument {
        InsightDocument::from_json(
            r#"{"executive_summary": "Parents want smaller masks",
                "competitor_insights": [{"competitor": "Spacer B", "strengths": ["cheap"], "weaknesses": ["loud valve"]}],
                "recommendations_for_product_manager": ["Ship a pediatric mask"]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_run_report_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_run_report(&report()).unwrap();
        assert!(output.contains("Duplicates"));
        assert!(output.contains("source_unavailable"));
        assert!(output.contains("⚠ 3 ingested, 0 enriched, 1 skipped"));
    }

    #[test]
    fn test_run_report_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_run_report(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["ingest"][0]["appended"], 3);
        assert_eq!(value["skips"][0]["kind"], "source_unavailable");
        assert!(value["synthesis"].is_null());
    }

    #[test]
    fn test_insight_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_insight(Some(&document())).unwrap();
        assert!(output.starts_with("Executive summary\nParents want smaller masks"));
        assert!(output.contains("loud valve"));
        assert!(output.contains("• Ship a pediatric mask"));
    }

    #[test]
    fn test_insight_json_round_trips() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_insight(Some(&document())).unwrap();
        assert_eq!(InsightDocument::from_json(&output).unwrap(), document());
    }

    #[test]
    fn test_missing_insight() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_insight(None).unwrap();
        assert!(output.contains("No insight document yet"));
    }

    #[test]
    fn test_sweep_dry_run() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let sweep = SweepReport {
            cleaned: vec![SourceCleanup {
                source: Source::Forum,
                counts: SourceCounts {
                    removed: 4,
                    kept: 10,
                    undated: 1,
                },
                applied: false,
            }],
            failures: vec![],
        };
        let output = formatter.format_sweep(&sweep, true).unwrap();
        assert!(output.contains("✓ Would remove 4 row(s)"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }
}
