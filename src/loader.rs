use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use tracing::debug;

use crate::error::{ReportError, Result};
use crate::models::Dataset;

/// Load an uploaded CSV from disk.
pub fn load_from_path(path: &Path) -> Result<Dataset> {
    let file = File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ReportError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => ReportError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let dataset = load_from_reader(file)?;
    debug!(
        path = %path.display(),
        rows = dataset.len(),
        columns = dataset.columns().len(),
        "dataset loaded"
    );
    Ok(dataset)
}

/// Parse CSV bytes. Only structural problems (ragged rows, bad UTF-8) are
/// errors; unparsable dates simply become missing values.
pub fn load_from_reader<R: Read>(reader: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut dataset = Dataset::new(headers);

    for result in reader.records() {
        let record = result?;
        dataset.push_row(record.iter().map(str::to_string).collect());
    }

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::columns;
    use chrono::NaiveDate;
    use std::io::Write;

    #[test]
    fn loads_rows_and_coerces_dates() {
        let csv = "Date,RiskCategory,Risikoscore,Extra\n\
                   2024-01-15,Operational,12.5,a\n\
                   garbage,Market,7,b\n";
        let dataset = load_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert!(dataset.has_column("Extra"));

        let dates = dataset.date_column().unwrap();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(dates[1], None);

        let scores = dataset.numeric_column(columns::RISK_SCORE).unwrap();
        assert_eq!(scores, vec![Some(12.5), Some(7.0)]);
    }

    #[test]
    fn ragged_rows_are_a_parse_error() {
        let csv = "Date,Risikoscore\n2024-01-01,1,extra\n";
        let err = load_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ReportError::MalformedCsv(_)));
    }

    #[test]
    fn empty_input_is_an_empty_dataset() {
        let dataset = load_from_reader("".as_bytes()).unwrap();
        assert!(dataset.is_empty());
        assert!(dataset.columns().is_empty());
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let err = load_from_path(Path::new("/nonexistent/file.csv")).unwrap_err();
        assert!(matches!(err, ReportError::InputNotFound { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "RiskCategory,Risikoscore").unwrap();
        writeln!(file, "Credit,3").unwrap();
        let dataset = load_from_path(file.path()).unwrap();
        assert_eq!(dataset.len(), 1);
    }
}
