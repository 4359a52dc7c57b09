//! Condensed dataset digest and the instruction prompt built around it.

use std::fmt::Write;

use crate::models::{Dataset, Language};
use crate::stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

impl TrendDirection {
    /// Last monthly mean against the first one; equal counts as decreasing.
    pub fn between(first: f64, last: f64) -> Self {
        if last > first {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
        }
    }
}

/// Plain-text statistics handed to the text-generation provider.
pub fn build_digest(dataset: &Dataset) -> String {
    let mut out = String::new();

    let _ = write!(out, "Records: {}", dataset.len());
    if let Some((first, last)) = stats::date_span(dataset) {
        let _ = write!(out, " (from {first} to {last})");
    }
    let _ = writeln!(out);

    if let Some(categories) = stats::category_stats(dataset) {
        if !categories.is_empty() {
            let _ = writeln!(out, "Risk categories:");
            for c in &categories {
                let _ = writeln!(
                    out,
                    "- {}: {} entries, total score {:.1}, average score {:.2}",
                    c.category, c.count, c.total, c.mean
                );
            }
        }
    }

    if let Some(months) = stats::monthly_means(dataset) {
        if let (Some(first), Some(last)) = (months.first(), months.last()) {
            let direction = TrendDirection::between(first.mean, last.mean);
            let _ = writeln!(
                out,
                "Monthly trend: {} ({} average {:.2}, {} average {:.2})",
                direction.as_str(),
                first.label,
                first.mean,
                last.label,
                last.mean
            );
        }
        if let (Some(high), Some(low)) = (stats::peak(&months), stats::trough(&months)) {
            let _ = writeln!(
                out,
                "Highest month: {} ({:.2}); lowest month: {} ({:.2})",
                high.label, high.mean, low.label, low.mean
            );
        }
    }

    if let Some(losses) = stats::loss_stats(dataset) {
        let _ = writeln!(
            out,
            "Losses: total {:.2}, average {:.2}, maximum {:.2}",
            losses.total, losses.mean, losses.max
        );
    }

    if let Some(customers) = stats::customer_stats(dataset) {
        let _ = writeln!(
            out,
            "Customers: total {:.0}, average {:.1}",
            customers.total, customers.mean
        );
    }

    out
}

pub const SYSTEM_PROMPT: &str = "You are a senior risk analyst who writes concise, \
     well-structured briefings for executive risk reports.";

/// Wrap the digest in the fixed instruction template.
pub fn build_prompt(digest: &str, lang: Language) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Analyze the following risk dataset statistics:");
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", digest.trim_end());
    let _ = writeln!(out);
    let _ = writeln!(out, "Please provide:");
    let _ = writeln!(
        out,
        "1. A summary of the overall risk landscape in 2-3 paragraphs."
    );
    let _ = writeln!(
        out,
        "2. The critical risks that need immediate attention."
    );
    let _ = writeln!(out, "3. 3-5 actionable recommendations as bullet points.");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Format the answer for executive reporting. Begin the recommendations \
         section with the line \"Recommendations:\"."
    );
    let _ = write!(out, "Write the answer in {}.", lang.name());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_dataset() -> Dataset {
        Dataset::from_rows(
            &["Date", "RiskCategory", "Risikoscore", "Verluste", "Kundenzahlen"],
            &[
                &["2024-01-10", "Market", "40", "100", "10"],
                &["2024-01-20", "Credit", "20", "300", "30"],
                &["2024-02-05", "Market", "60", "200", "20"],
                &["2024-03-05", "Credit", "10", "", ""],
            ],
        )
    }

    #[test]
    fn digest_lists_every_section() {
        let digest = build_digest(&full_dataset());
        assert!(digest.starts_with("Records: 4 (from 2024-01-10 to 2024-03-05)\n"));
        assert!(digest.contains("- Credit: 2 entries, total score 30.0, average score 15.00"));
        assert!(digest.contains("- Market: 2 entries, total score 100.0, average score 50.00"));
        assert!(digest.contains("Monthly trend: decreasing (2024-01 average 30.00, 2024-03 average 10.00)"));
        assert!(digest.contains("Highest month: 2024-02 (60.00); lowest month: 2024-03 (10.00)"));
        assert!(digest.contains("Losses: total 600.00, average 200.00, maximum 300.00"));
        assert!(digest.contains("Customers: total 60, average 20.0"));
    }

    #[test]
    fn digest_of_bare_dataset_has_only_the_count() {
        let digest = build_digest(&Dataset::from_rows(&["Other"], &[&["x"]]));
        assert_eq!(digest, "Records: 1\n");
    }

    #[test]
    fn trend_is_a_two_point_comparison() {
        assert_eq!(TrendDirection::between(1.0, 2.0), TrendDirection::Increasing);
        assert_eq!(TrendDirection::between(2.0, 1.0), TrendDirection::Decreasing);
        assert_eq!(TrendDirection::between(2.0, 2.0), TrendDirection::Decreasing);
    }

    #[test]
    fn prompt_embeds_digest_and_language() {
        let prompt = build_prompt("Records: 3\n", Language::German);
        assert!(prompt.contains("Records: 3\n"));
        assert!(prompt.contains("Recommendations:"));
        assert!(prompt.ends_with("Write the answer in German."));
    }
}
