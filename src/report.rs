use std::fmt::Write;
use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};

use crate::ai::AiSummarizer;
use crate::charts::ChartRenderer;
use crate::config::ReportConfig;
use crate::error::Result;
use crate::loader;
use crate::models::{AnalysisOutcome, Dataset, Language, ReportResult};
use crate::risk;

/// Load, chart and summarize one uploaded CSV.
///
/// Holds no per-request state, so a single instance can serve concurrent
/// requests.
#[derive(Clone)]
pub struct ReportGenerator {
    charts: ChartRenderer,
    summarizer: AiSummarizer,
    config: ReportConfig,
}

impl ReportGenerator {
    pub fn new(config: ReportConfig, summarizer: AiSummarizer) -> Self {
        Self {
            charts: ChartRenderer::new(config.plots_dir.clone(), config.language),
            summarizer,
            config,
        }
    }

    /// Whether this request will go through the text-generation provider.
    pub fn uses_ai(&self) -> bool {
        self.config.use_ai && self.summarizer.is_available()
    }

    pub async fn generate(&self, csv_path: &Path) -> Result<ReportResult> {
        let dataset = loader::load_from_path(csv_path)?;
        info!(path = %csv_path.display(), rows = dataset.len(), "generating report");
        self.generate_for(&dataset).await
    }

    pub async fn generate_for(&self, dataset: &Dataset) -> Result<ReportResult> {
        let charts = self.charts.clone();
        let ttl = self.config.chart_ttl;
        let owned = dataset.clone();
        let (bar_chart, line_chart) =
            tokio::task::spawn_blocking(move || render_charts(&charts, &owned, ttl)).await??;

        let outcome = if self.uses_ai() {
            self.summarizer.summarize(dataset, self.config.language).await
        } else {
            AnalysisOutcome::Statistical(risk::summarize(dataset, self.config.language))
        };
        info!(
            analysis_type = %outcome.analysis_type(),
            bar_chart = bar_chart.is_some(),
            line_chart = line_chart.is_some(),
            "report assembled"
        );

        Ok(ReportResult::new(outcome, bar_chart, line_chart))
    }
}

/// Sweep and chart stage. Plotters and `std::fs` block, so this runs on the
/// blocking pool.
fn render_charts(
    charts: &ChartRenderer,
    dataset: &Dataset,
    ttl: Option<Duration>,
) -> Result<(Option<String>, Option<String>)> {
    if let Some(ttl) = ttl {
        match charts.sweep_older_than(ttl) {
            Ok(removed) if removed > 0 => info!(removed, "expired charts swept"),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "chart sweep failed"),
        }
    }
    let bar_chart = charts.category_bar_chart(dataset)?;
    let line_chart = charts.monthly_line_chart(dataset)?;
    Ok((bar_chart, line_chart))
}

/// Markdown rendering of a finished report.
pub fn render_markdown(report: &ReportResult, lang: Language) -> String {
    let labels = match lang {
        Language::German => MarkdownLabels {
            title: "Risikobericht",
            analysis: "Analyseart",
            summary: "Zusammenfassung",
            recommendations: "Empfehlungen",
            none: "Keine Empfehlungen.",
            charts: "Diagramme",
            bar: "Risiken nach Kategorie",
            line: "Risikoscore pro Monat",
            no_chart: "nicht verfügbar",
        },
        Language::English => MarkdownLabels {
            title: "Risk Report",
            analysis: "Analysis type",
            summary: "Summary",
            recommendations: "Recommendations",
            none: "No recommendations.",
            charts: "Charts",
            bar: "Risks by category",
            line: "Risk score per month",
            no_chart: "not available",
        },
    };

    let mut output = String::new();
    let _ = writeln!(output, "# {}", labels.title);
    let _ = writeln!(output, "{}: {}", labels.analysis, report.analysis_type);
    let _ = writeln!(output);
    let _ = writeln!(output, "## {}", labels.summary);
    let _ = writeln!(output, "{}", report.summary);
    let _ = writeln!(output);
    let _ = writeln!(output, "## {}", labels.recommendations);
    if report.recommendations.is_empty() {
        let _ = writeln!(output, "{}", labels.none);
    } else {
        let _ = writeln!(output, "{}", report.recommendations);
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "## {}", labels.charts);
    for (label, chart) in [(labels.bar, &report.bar_chart), (labels.line, &report.line_chart)] {
        match chart {
            Some(file) => {
                let _ = writeln!(output, "- {label}: {file}");
            }
            None => {
                let _ = writeln!(output, "- {label}: {}", labels.no_chart);
            }
        }
    }

    output
}

struct MarkdownLabels {
    title: &'static str,
    analysis: &'static str,
    summary: &'static str,
    recommendations: &'static str,
    none: &'static str,
    charts: &'static str,
    bar: &'static str,
    line: &'static str,
    no_chart: &'static str,
}
