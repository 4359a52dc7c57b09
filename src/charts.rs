//! Chart artifacts written into the shared plots directory.
//!
//! Charts are SVG: text is emitted as markup, so rendering needs no system
//! fonts on the host.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use plotters::prelude::*;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ReportError, Result};
use crate::models::{Dataset, Language};
use crate::stats::{self, CategoryStat, PeriodMean};

pub const BAR_PREFIX: &str = "bar_";
pub const LINE_PREFIX: &str = "line_";
pub const CHART_EXTENSION: &str = "svg";

const CHART_SIZE: (u32, u32) = (800, 400);
const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const STEEL_BLUE: RGBColor = RGBColor(70, 130, 180);

#[derive(Debug, Clone)]
pub struct ChartRenderer {
    output_dir: PathBuf,
    lang: Language,
}

impl ChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, lang: Language) -> Self {
        Self {
            output_dir: output_dir.into(),
            lang,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Bar chart of summed risk score per category, largest first.
    ///
    /// Returns `Ok(None)` when the dataset lacks `RiskCategory` or
    /// `Risikoscore`, or has no categorised rows.
    pub fn category_bar_chart(&self, dataset: &Dataset) -> Result<Option<String>> {
        let Some(ranked) = stats::ranked_categories(dataset) else {
            return Ok(None);
        };
        if ranked.is_empty() {
            return Ok(None);
        }
        let (file_name, path) = self.next_artifact(BAR_PREFIX)?;
        draw_bars(&path, &ranked, self.lang).map_err(|reason| ReportError::Chart {
            chart: "bar",
            reason,
        })?;
        info!(file = %file_name, categories = ranked.len(), "bar chart written");
        Ok(Some(file_name))
    }

    /// Line chart of the mean risk score per month.
    ///
    /// Returns `Ok(None)` when the dataset lacks `Date` or `Risikoscore`,
    /// or no row has both a valid date and score.
    pub fn monthly_line_chart(&self, dataset: &Dataset) -> Result<Option<String>> {
        let Some(months) = stats::monthly_means(dataset) else {
            return Ok(None);
        };
        if months.is_empty() {
            return Ok(None);
        }
        let (file_name, path) = self.next_artifact(LINE_PREFIX)?;
        draw_line(&path, &months, self.lang).map_err(|reason| ReportError::Chart {
            chart: "line",
            reason,
        })?;
        info!(file = %file_name, months = months.len(), "line chart written");
        Ok(Some(file_name))
    }

    /// Remove chart files older than `max_age`. Other files are left alone.
    pub fn sweep_older_than(&self, max_age: Duration) -> Result<usize> {
        let io_err = |source: std::io::Error| ReportError::Io {
            path: self.output_dir.clone(),
            source,
        };
        let entries = match fs::read_dir(&self.output_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(io_err(e)),
        };

        let now = SystemTime::now();
        let mut removed = 0usize;
        for entry in entries {
            let entry = entry.map_err(io_err)?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !is_chart_file(name) {
                continue;
            }
            let modified = entry.metadata().and_then(|m| m.modified()).map_err(io_err)?;
            let age = now.duration_since(modified).unwrap_or_default();
            if age >= max_age {
                fs::remove_file(entry.path()).map_err(io_err)?;
                debug!(file = name, age_secs = age.as_secs(), "expired chart removed");
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn next_artifact(&self, prefix: &str) -> Result<(String, PathBuf)> {
        fs::create_dir_all(&self.output_dir).map_err(|source| ReportError::Io {
            path: self.output_dir.clone(),
            source,
        })?;
        let file_name = format!("{prefix}{}.{CHART_EXTENSION}", Uuid::new_v4().simple());
        let path = self.output_dir.join(&file_name);
        Ok((file_name, path))
    }
}

fn is_chart_file(name: &str) -> bool {
    (name.starts_with(BAR_PREFIX) || name.starts_with(LINE_PREFIX))
        && name.ends_with(&format!(".{CHART_EXTENSION}"))
}

fn draw_bars(path: &Path, ranked: &[CategoryStat], lang: Language) -> std::result::Result<(), String> {
    let (title, x_desc, y_desc) = match lang {
        Language::German => ("Top-Risiken nach Kategorie", "Risikokategorie", "Summe Risikoscore"),
        Language::English => ("Top risks by category", "Risk category", "Total risk score"),
    };

    let n = ranked.len() as i32;
    let max = ranked.iter().map(|c| c.total).fold(0.0, f64::max);
    let min = ranked.iter().map(|c| c.total).fold(0.0, f64::min);
    let (y_min, y_max) = padded_range(min, max);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((0..n).into_segmented(), y_min..y_max)
        .map_err(|e| e.to_string())?;

    let label = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(i) => ranked
            .get(*i as usize)
            .map(|c| c.category.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(ranked.len())
        .x_label_formatter(&label)
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()
        .map_err(|e| e.to_string())?;

    chart
        .draw_series(ranked.iter().enumerate().map(|(i, c)| {
            let x = i as i32;
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(x), 0.0), (SegmentValue::Exact(x + 1), c.total)],
                SKY_BLUE.filled(),
            );
            bar.set_margin(0, 0, 6, 6);
            bar
        }))
        .map_err(|e| e.to_string())?;

    root.present().map_err(|e| e.to_string())
}

fn draw_line(path: &Path, months: &[PeriodMean], lang: Language) -> std::result::Result<(), String> {
    let (title, x_desc, y_desc) = match lang {
        Language::German => (
            "Durchschnittlicher Risikoscore pro Monat",
            "Monat",
            "Risikoscore (Mittelwert)",
        ),
        Language::English => ("Average risk score per month", "Month", "Risk score (mean)"),
    };

    let n = months.len() as i32;
    let max = months.iter().map(|m| m.mean).fold(f64::MIN, f64::max);
    let min = months.iter().map(|m| m.mean).fold(f64::MAX, f64::min);
    let (y_min, y_max) = padded_range(min, max);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((0..n).into_segmented(), y_min..y_max)
        .map_err(|e| e.to_string())?;

    let label = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(i) => months
            .get(*i as usize)
            .map(|m| m.label.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .x_labels(months.len())
        .x_label_formatter(&label)
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()
        .map_err(|e| e.to_string())?;

    let points: Vec<(SegmentValue<i32>, f64)> = months
        .iter()
        .enumerate()
        .map(|(i, m)| (SegmentValue::CenterOf(i as i32), m.mean))
        .collect();

    if points.len() > 1 {
        chart
            .draw_series(LineSeries::new(points.clone(), STEEL_BLUE.stroke_width(2)))
            .map_err(|e| e.to_string())?;
    }
    chart
        .draw_series(
            points
                .into_iter()
                .map(|p| Circle::new(p, 4, STEEL_BLUE.filled())),
        )
        .map_err(|e| e.to_string())?;

    root.present().map_err(|e| e.to_string())
}

/// Value range with headroom; degenerate ranges are widened.
fn padded_range(min: f64, max: f64) -> (f64, f64) {
    let span = max - min;
    if span.abs() < f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }
    let pad = span * 0.1;
    (min - if min < 0.0 { pad } else { 0.0 }, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn renderer() -> (tempfile::TempDir, ChartRenderer) {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path(), Language::English);
        (dir, renderer)
    }

    #[test]
    fn bar_chart_needs_category_and_score() {
        let (dir, renderer) = renderer();
        let no_score = Dataset::from_rows(&["RiskCategory"], &[&["A"]]);
        let no_category = Dataset::from_rows(&["Risikoscore"], &[&["1"]]);
        assert_eq!(renderer.category_bar_chart(&no_score).unwrap(), None);
        assert_eq!(renderer.category_bar_chart(&no_category).unwrap(), None);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn bar_chart_writes_one_prefixed_file() {
        let (dir, renderer) = renderer();
        let dataset = Dataset::from_rows(
            &["RiskCategory", "Risikoscore"],
            &[&["Market", "4"], &["Credit", "9"], &["Market", "2"]],
        );
        let name = renderer.category_bar_chart(&dataset).unwrap().unwrap();
        assert!(name.starts_with(BAR_PREFIX));
        assert!(name.ends_with(".svg"));
        assert!(!name.contains('/'));

        let svg = fs::read_to_string(dir.path().join(&name)).unwrap();
        assert!(svg.contains("Credit"));
        assert!(svg.contains("Market"));
    }

    #[test]
    fn line_chart_needs_date_and_score() {
        let (_dir, renderer) = renderer();
        let dataset = Dataset::from_rows(&["Date"], &[&["2024-01-01"]]);
        assert_eq!(renderer.monthly_line_chart(&dataset).unwrap(), None);
    }

    #[test]
    fn line_chart_handles_a_single_month() {
        let (dir, renderer) = renderer();
        let dataset = Dataset::from_rows(
            &["Date", "Risikoscore"],
            &[&["2024-01-01", "5"], &["2024-01-20", "7"], &["bad", "100"]],
        );
        let name = renderer.monthly_line_chart(&dataset).unwrap().unwrap();
        assert!(name.starts_with(LINE_PREFIX));
        let svg = fs::read_to_string(dir.path().join(&name)).unwrap();
        assert!(svg.contains("2024-01"));
        assert_eq!(svg.matches("<circle").count(), 1);
    }

    #[test]
    fn file_names_never_collide() {
        let (_dir, renderer) = renderer();
        let dataset = Dataset::from_rows(&["RiskCategory", "Risikoscore"], &[&["A", "1"]]);
        let names: HashSet<String> = (0..20)
            .map(|_| renderer.category_bar_chart(&dataset).unwrap().unwrap())
            .collect();
        assert_eq!(names.len(), 20);
    }

    #[test]
    fn sweep_removes_only_chart_files() {
        let (dir, renderer) = renderer();
        let dataset = Dataset::from_rows(
            &["Date", "RiskCategory", "Risikoscore"],
            &[&["2024-01-01", "A", "1"]],
        );
        renderer.category_bar_chart(&dataset).unwrap();
        renderer.monthly_line_chart(&dataset).unwrap();
        fs::write(dir.path().join("notes.txt"), "keep").unwrap();

        assert_eq!(renderer.sweep_older_than(Duration::from_secs(3600)).unwrap(), 0);
        assert_eq!(renderer.sweep_older_than(Duration::from_secs(u64::MAX)).unwrap(), 0);
        assert_eq!(renderer.sweep_older_than(Duration::ZERO).unwrap(), 2);
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn sweep_of_missing_directory_is_a_no_op() {
        let renderer = ChartRenderer::new("/nonexistent/plots", Language::German);
        assert_eq!(renderer.sweep_older_than(Duration::ZERO).unwrap(), 0);
    }

    #[test]
    fn padded_range_widens_flat_series() {
        assert_eq!(padded_range(5.0, 5.0), (4.0, 6.0));
        let (lo, hi) = padded_range(0.0, 100.0);
        assert_eq!(lo, 0.0);
        assert!(hi > 100.0);
    }
}
