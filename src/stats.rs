//! Aggregate views over a [`Dataset`].
//!
//! Each function returns `None` when a source column is missing so callers
//! can drop the dependent clause or chart without special casing.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::models::{columns, Dataset};
use crate::util::average;

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStat {
    pub category: String,
    pub count: usize,
    pub total: f64,
    pub mean: f64,
}

/// Mean score of one month or quarter bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodMean {
    pub label: String,
    pub mean: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossStats {
    pub total: f64,
    pub mean: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CustomerStats {
    pub total: f64,
    pub mean: f64,
}

/// Per-category count, score total and mean, in category name order.
pub fn category_stats(dataset: &Dataset) -> Option<Vec<CategoryStat>> {
    let categories = dataset.text_column(columns::RISK_CATEGORY)?;
    let scores = dataset.numeric_column(columns::RISK_SCORE)?;

    let mut map: BTreeMap<&str, (usize, Vec<f64>)> = BTreeMap::new();
    for (category, score) in categories.into_iter().zip(scores) {
        let Some(category) = category else { continue };
        let entry = map.entry(category).or_insert((0, Vec::new()));
        entry.0 += 1;
        if let Some(score) = score {
            entry.1.push(score);
        }
    }

    Some(
        map.into_iter()
            .map(|(category, (count, scores))| CategoryStat {
                category: category.to_string(),
                count,
                total: scores.iter().sum(),
                mean: average(&scores),
            })
            .collect(),
    )
}

/// Categories ordered by score total, highest first. Ties keep name order.
pub fn ranked_categories(dataset: &Dataset) -> Option<Vec<CategoryStat>> {
    let mut stats = category_stats(dataset)?;
    stats.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
    Some(stats)
}

/// Mean score per calendar month, oldest first.
pub fn monthly_means(dataset: &Dataset) -> Option<Vec<PeriodMean>> {
    bucket_means(dataset, |d| (d.year(), d.month()), |(y, m)| {
        format!("{y:04}-{m:02}")
    })
}

/// Mean score per calendar quarter, oldest first.
pub fn quarterly_means(dataset: &Dataset) -> Option<Vec<PeriodMean>> {
    bucket_means(dataset, |d| (d.year(), (d.month() - 1) / 3 + 1), |(y, q)| {
        format!("{y}Q{q}")
    })
}

fn bucket_means(
    dataset: &Dataset,
    key: impl Fn(NaiveDate) -> (i32, u32),
    label: impl Fn((i32, u32)) -> String,
) -> Option<Vec<PeriodMean>> {
    let dates = dataset.date_column()?;
    let scores = dataset.numeric_column(columns::RISK_SCORE)?;

    let mut buckets: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();
    for (date, score) in dates.into_iter().zip(scores) {
        if let (Some(date), Some(score)) = (date, score) {
            buckets.entry(key(date)).or_default().push(score);
        }
    }

    Some(
        buckets
            .into_iter()
            .map(|(k, scores)| PeriodMean {
                label: label(k),
                mean: average(&scores),
            })
            .collect(),
    )
}

/// First bucket with the highest mean.
pub fn peak(periods: &[PeriodMean]) -> Option<&PeriodMean> {
    periods.iter().fold(None, |best: Option<&PeriodMean>, p| match best {
        Some(b) if p.mean <= b.mean => Some(b),
        _ => Some(p),
    })
}

/// First bucket with the lowest mean.
pub fn trough(periods: &[PeriodMean]) -> Option<&PeriodMean> {
    periods.iter().fold(None, |best: Option<&PeriodMean>, p| match best {
        Some(b) if p.mean >= b.mean => Some(b),
        _ => Some(p),
    })
}

pub fn loss_stats(dataset: &Dataset) -> Option<LossStats> {
    let losses: Vec<f64> = dataset
        .numeric_column(columns::LOSSES)?
        .into_iter()
        .flatten()
        .collect();
    if losses.is_empty() {
        return None;
    }
    Some(LossStats {
        total: losses.iter().sum(),
        mean: average(&losses),
        max: losses.iter().copied().fold(f64::MIN, f64::max),
    })
}

pub fn customer_stats(dataset: &Dataset) -> Option<CustomerStats> {
    let customers: Vec<f64> = dataset
        .numeric_column(columns::CUSTOMERS)?
        .into_iter()
        .flatten()
        .collect();
    if customers.is_empty() {
        return None;
    }
    Some(CustomerStats {
        total: customers.iter().sum(),
        mean: average(&customers),
    })
}

/// Earliest and latest valid date.
pub fn date_span(dataset: &Dataset) -> Option<(NaiveDate, NaiveDate)> {
    let dates: Vec<NaiveDate> = dataset.date_column()?.into_iter().flatten().collect();
    let first = dates.iter().min()?;
    let last = dates.iter().max()?;
    Some((*first, *last))
}
