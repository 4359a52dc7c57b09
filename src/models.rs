use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::util::{parse_date_safe, parse_f64_safe};

/// Column names the pipeline reads. Any other column is carried but ignored.
pub mod columns {
    pub const DATE: &str = "Date";
    pub const RISK_CATEGORY: &str = "RiskCategory";
    pub const RISK_SCORE: &str = "Risikoscore";
    pub const LOSSES: &str = "Verluste";
    pub const CUSTOMERS: &str = "Kundenzahlen";
}

#[derive(Debug, Clone)]
pub struct Row {
    pub values: Vec<String>,
    /// Coerced `Date` cell; `None` when missing or unparsable.
    pub date: Option<NaiveDate>,
}

/// Rows of an uploaded CSV, cells kept as text except for `Date`.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_rows(columns: &[&str], rows: &[&[&str]]) -> Self {
        let mut dataset = Self::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            dataset.push_row(row.iter().map(|v| v.to_string()).collect());
        }
        dataset
    }

    pub fn push_row(&mut self, values: Vec<String>) {
        let date = self
            .column_index(columns::DATE)
            .and_then(|idx| parse_date_safe(values.get(idx).map(String::as_str)));
        self.rows.push(Row { values, date });
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Trimmed, non-empty text cells of a column; `None` if the column is absent.
    pub fn text_column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| {
                    row.values
                        .get(idx)
                        .map(|v| v.trim())
                        .filter(|v| !v.is_empty())
                })
                .collect(),
        )
    }

    /// Numeric cells of a column; `None` if the column is absent.
    pub fn numeric_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| parse_f64_safe(row.values.get(idx).map(String::as_str)))
                .collect(),
        )
    }

    /// Coerced dates; `None` if there is no `Date` column.
    pub fn date_column(&self) -> Option<Vec<Option<NaiveDate>>> {
        self.column_index(columns::DATE)?;
        Some(self.rows.iter().map(|row| row.date).collect())
    }
}

/// Output language of generated text and chart labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    #[value(name = "de")]
    German,
    #[value(name = "en")]
    English,
}

impl Language {
    pub fn name(self) -> &'static str {
        match self {
            Language::German => "German",
            Language::English => "English",
        }
    }
}

/// Narrative text produced by either summarizer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Analysis {
    pub summary: String,
    pub recommendations: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnalysisType {
    #[serde(rename = "AI-Enhanced")]
    AiEnhanced,
    #[serde(rename = "Statistical")]
    Statistical,
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisType::AiEnhanced => f.write_str("AI-Enhanced"),
            AnalysisType::Statistical => f.write_str("Statistical"),
        }
    }
}

/// Which summarizer actually produced the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    AiEnhanced(Analysis),
    Statistical(Analysis),
}

impl AnalysisOutcome {
    pub fn analysis_type(&self) -> AnalysisType {
        match self {
            AnalysisOutcome::AiEnhanced(_) => AnalysisType::AiEnhanced,
            AnalysisOutcome::Statistical(_) => AnalysisType::Statistical,
        }
    }

    pub fn analysis(&self) -> &Analysis {
        match self {
            AnalysisOutcome::AiEnhanced(a) | AnalysisOutcome::Statistical(a) => a,
        }
    }

    pub fn into_analysis(self) -> Analysis {
        match self {
            AnalysisOutcome::AiEnhanced(a) | AnalysisOutcome::Statistical(a) => a,
        }
    }
}

/// Everything the presentation layer needs for one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportResult {
    pub summary: String,
    pub recommendations: String,
    /// File name within the plots directory, `None` when not applicable.
    #[serde(serialize_with = "empty_if_none")]
    pub bar_chart: Option<String>,
    #[serde(serialize_with = "empty_if_none")]
    pub line_chart: Option<String>,
    pub analysis_type: AnalysisType,
}

impl ReportResult {
    pub fn new(
        outcome: AnalysisOutcome,
        bar_chart: Option<String>,
        line_chart: Option<String>,
    ) -> Self {
        let analysis_type = outcome.analysis_type();
        let Analysis {
            summary,
            recommendations,
        } = outcome.into_analysis();
        Self {
            summary,
            recommendations,
            bar_chart,
            line_chart,
            analysis_type,
        }
    }
}

fn empty_if_none<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or(""))
}
