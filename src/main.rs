use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use risk_report::ai::{create_generator, AiSummarizer};
use risk_report::charts::ChartRenderer;
use risk_report::config::{AiSettings, ReportConfig};
use risk_report::report::{render_markdown, ReportGenerator};
use risk_report::telemetry;
use risk_report::Language;

#[derive(Parser)]
#[command(name = "risk-report")]
#[command(about = "Charts and written summaries for risk datasets", long_about = None)]
struct Cli {
    /// Directory chart files are written to
    #[arg(long, global = true, env = "RISK_REPORT_PLOTS_DIR", default_value = "static/plots")]
    plots_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a report for an uploaded CSV file
    Report {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, value_enum, default_value = "de")]
        lang: Language,
        /// Ask the external text-generation provider for the summary.
        /// `RISK_REPORT_AI_ENABLED` (1/true/yes/on) turns it on as well.
        #[arg(long)]
        ai: bool,
        #[arg(long, value_enum, default_value = "markdown")]
        format: OutputFormat,
        /// Write the report here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Sweep chart files older than this many hours first
        #[arg(long)]
        chart_ttl_hours: Option<u64>,
    },
    /// Delete chart files older than the given age
    Sweep {
        #[arg(long, default_value_t = 24)]
        max_age_hours: u64,
    },
}

fn hours(h: u64) -> Duration {
    Duration::from_secs(h.saturating_mul(3600))
}

/// The `--ai` flag or the environment switch, whichever is set.
fn ai_requested(flag: bool, settings: &AiSettings) -> bool {
    flag || settings.enabled
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            csv,
            lang,
            ai,
            format,
            out,
            chart_ttl_hours,
        } => {
            let mut settings = AiSettings::from_env();
            let use_ai = ai_requested(ai, &settings);
            settings.enabled = use_ai;
            let summarizer = AiSummarizer::new(create_generator(&settings));

            let config = ReportConfig {
                plots_dir: cli.plots_dir,
                language: lang,
                use_ai,
                chart_ttl: chart_ttl_hours.map(hours),
            };
            let reports = ReportGenerator::new(config, summarizer);
            let report = reports
                .generate(&csv)
                .await
                .with_context(|| format!("failed to build report for {}", csv.display()))?;

            let rendered = match format {
                OutputFormat::Markdown => render_markdown(&report, lang),
                OutputFormat::Json => serde_json::to_string_pretty(&report)?,
            };

            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Report written to {}.", path.display());
                }
                None => println!("{rendered}"),
            }
        }
        Commands::Sweep { max_age_hours } => {
            let charts = ChartRenderer::new(&cli.plots_dir, Language::default());
            let removed = charts.sweep_older_than(hours(max_age_hours))?;
            println!(
                "Removed {removed} chart files from {}.",
                charts.output_dir().display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_flag(value: &str) -> AiSettings {
        AiSettings::from_lookup(|key: &str| (key == "RISK_REPORT_AI_ENABLED").then(|| value.to_string()))
    }

    #[test]
    fn report_parses_without_an_ai_value() {
        let cli = Cli::try_parse_from(["risk-report", "report", "--csv", "p.csv"]).unwrap();
        let Commands::Report { ai, .. } = cli.command else {
            panic!("expected the report subcommand");
        };
        assert!(!ai);
    }

    #[test]
    fn env_switch_accepts_common_truthy_words() {
        for value in ["1", "yes", "on", "TRUE"] {
            assert!(ai_requested(false, &settings_with_flag(value)), "{value}");
        }
        for value in ["0", "no", "maybe", ""] {
            assert!(!ai_requested(false, &settings_with_flag(value)), "{value}");
        }
        assert!(ai_requested(true, &settings_with_flag("0")));
    }

    #[test]
    fn huge_ages_saturate_instead_of_overflowing() {
        assert_eq!(hours(2), Duration::from_secs(7200));
        assert_eq!(hours(u64::MAX), Duration::from_secs(u64::MAX));

        let cli = Cli::try_parse_from(["risk-report", "sweep", "--max-age-hours", "18446744073709551615"])
            .unwrap();
        let Commands::Sweep { max_age_hours } = cli.command else {
            panic!("expected the sweep subcommand");
        };
        assert_eq!(hours(max_age_hours), Duration::from_secs(u64::MAX));
    }
}
