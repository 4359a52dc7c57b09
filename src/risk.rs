use crate::models::{Analysis, Dataset, Language};
use crate::stats::{self, CategoryStat, LossStats, PeriodMean};

const TOP_CATEGORIES: usize = 3;
const QUARTER_RISE: f64 = 1.10;
const QUARTER_DROP: f64 = 0.90;
const LOSS_OUTLIER: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarterTrend {
    Rising,
    Falling,
    Flat,
}

/// Compare the first two quarters only.
pub fn quarter_trend(first: f64, second: f64) -> QuarterTrend {
    if second > first * QUARTER_RISE {
        QuarterTrend::Rising
    } else if second < first * QUARTER_DROP {
        QuarterTrend::Falling
    } else {
        QuarterTrend::Flat
    }
}

pub fn has_loss_outlier(losses: &LossStats) -> bool {
    losses.max > losses.mean * LOSS_OUTLIER
}

/// Rule-based summary and recommendations. Never fails, even on an empty
/// dataset.
pub fn summarize(dataset: &Dataset, lang: Language) -> Analysis {
    let mut summary = vec![record_count(dataset.len(), lang)];
    let mut recommendations = Vec::new();

    if let Some(ranked) = stats::ranked_categories(dataset) {
        if !ranked.is_empty() {
            let top = &ranked[..ranked.len().min(TOP_CATEGORIES)];
            summary.push(top_categories(top, lang));
        }
    }

    if let Some(months) = stats::monthly_means(dataset) {
        if let Some(peak) = stats::peak(&months) {
            summary.push(peak_month(peak, lang));

            let quarters = stats::quarterly_means(dataset).unwrap_or_default();
            if let [q1, q2, ..] = quarters.as_slice() {
                match quarter_trend(q1.mean, q2.mean) {
                    QuarterTrend::Rising => recommendations.push(rising_quarter(lang)),
                    QuarterTrend::Falling => recommendations.push(falling_quarter(lang)),
                    QuarterTrend::Flat => {}
                }
            }
        }
    }

    if let Some(losses) = stats::loss_stats(dataset) {
        summary.push(loss_sentence(&losses, lang));
        if has_loss_outlier(&losses) {
            recommendations.push(loss_outlier(lang));
        }
    }

    Analysis {
        summary: summary.join(" "),
        recommendations: recommendations.join(" "),
    }
}

fn record_count(n: usize, lang: Language) -> String {
    match lang {
        Language::German => format!("Der Datensatz enthält insgesamt {n} Einträge."),
        Language::English => format!("The dataset contains {n} records in total."),
    }
}

fn top_categories(top: &[CategoryStat], lang: Language) -> String {
    let label = match lang {
        Language::German => "Summe",
        Language::English => "total",
    };
    let cats = top
        .iter()
        .map(|c| format!("{} ({label}: {:.1})", c.category, c.total))
        .collect::<Vec<_>>()
        .join(", ");
    match lang {
        Language::German => format!("Die drei wichtigsten Risikokategorien sind {cats}."),
        Language::English => format!("The three most significant risk categories are {cats}."),
    }
}

fn peak_month(peak: &PeriodMean, lang: Language) -> String {
    match lang {
        Language::German => format!(
            "Der höchste durchschnittliche Risikoscore wurde im Monat {} mit {:.2} erreicht.",
            peak.label, peak.mean
        ),
        Language::English => format!(
            "The highest average risk score was reached in {} at {:.2}.",
            peak.label, peak.mean
        ),
    }
}

fn rising_quarter(lang: Language) -> String {
    match lang {
        Language::German => {
            "Achten Sie auf den signifikanten Anstieg des Risikoscores im zweiten Quartal."
        }
        Language::English => {
            "Watch the significant increase of the risk score in the second quarter."
        }
    }
    .to_string()
}

fn falling_quarter(lang: Language) -> String {
    match lang {
        Language::German => "Der Risikoscore hat sich im zweiten Quartal deutlich verringert, \
             nutzen Sie diese positive Entwicklung.",
        Language::English => "The risk score decreased noticeably in the second quarter; \
             build on this positive development.",
    }
    .to_string()
}

fn loss_sentence(losses: &LossStats, lang: Language) -> String {
    match lang {
        Language::German => format!(
            "Die durchschnittlichen Verluste betragen {:.2} Einheiten, der maximale Verlust lag bei {:.2}.",
            losses.mean, losses.max
        ),
        Language::English => format!(
            "Average losses amount to {:.2} units; the maximum loss was {:.2}.",
            losses.mean, losses.max
        ),
    }
}

fn loss_outlier(lang: Language) -> String {
    match lang {
        Language::German => {
            "Es gibt einzelne Monate mit außergewöhnlich hohen Verlusten, prüfen Sie diese genauer."
        }
        Language::English => "Some months show exceptionally high losses; review them in detail.",
    }
    .to_string()
}
