use std::path::Path;

use crate::{batch::AnalysisResult, error::SrResult};

pub const NOT_AVAILABLE: &str = "N/A";

pub const COLUMNS: [&str; 5] = [
    "Ticker",
    "Sharpe (No Dividends)",
    "Sharpe (With Dividends)",
    "Total Dividends",
    "Rating (No Dividends)",
];

pub fn format_ratio(value: Option<f64>) -> String {
    format_optional(value, 4)
}

pub fn format_dividends(value: Option<f64>) -> String {
    format_optional(value, 2)
}

/// Header row followed by one row per result, ready for a text table.
pub fn table_data(results: &[AnalysisResult]) -> Vec<Vec<String>> {
    let mut table_data: Vec<Vec<String>> = vec![COLUMNS.iter().map(|c| c.to_string()).collect()];

    for result in results {
        table_data.push(row(result));
    }

    table_data
}

pub fn row(result: &AnalysisResult) -> Vec<String> {
    vec![
        result.ticker.clone(),
        format_ratio(result.sharpe_no_dividends),
        format_ratio(result.sharpe_with_dividends),
        format_dividends(result.total_dividends),
        result.rating.to_string(),
    ]
}

pub fn write_csv(path: &Path, results: &[AnalysisResult]) -> SrResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(COLUMNS)?;
    for result in results {
        writer.write_record(row(result))?;
    }
    writer.flush()?;

    Ok(())
}

fn format_optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{v:.decimals$}"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::{Assessment, Rating},
        error::SrError,
    };

    fn results() -> Vec<AnalysisResult> {
        vec![
            AnalysisResult {
                ticker: "PETR4.SA".to_string(),
                sharpe_no_dividends: Some(1.234567),
                sharpe_with_dividends: Some(2.5),
                total_dividends: Some(3.456),
                rating: Assessment::Rated(Rating::VeryGood),
            },
            AnalysisResult::failed(
                "XXXX3.SA",
                &SrError::InsufficientData {
                    ticker: "XXXX3.SA".to_string(),
                    period: "6mo".to_string(),
                },
            ),
        ]
    }

    #[test]
    fn test_format() {
        assert_eq!(format_ratio(Some(0.95754)), "0.9575");
        assert_eq!(format_ratio(Some(-1.0)), "-1.0000");
        assert_eq!(format_ratio(None), "N/A");
        assert_eq!(format_ratio(Some(f64::NAN)), "N/A");
        assert_eq!(format_ratio(Some(f64::INFINITY)), "inf");
        assert_eq!(format_dividends(Some(1.005)), "1.00");
        assert_eq!(format_dividends(Some(2.0)), "2.00");
        assert_eq!(format_dividends(None), "N/A");
    }

    #[test]
    fn test_table_data() {
        let table_data = table_data(&results());

        assert_eq!(table_data.len(), 3);
        assert_eq!(table_data[0][0], "Ticker");
        assert_eq!(
            table_data[1],
            ["PETR4.SA", "1.2346", "2.5000", "3.46", "Very Good"]
        );
        assert_eq!(table_data[2][1..4], ["N/A", "N/A", "N/A"]);
        assert!(table_data[2][4].starts_with("[Insufficient Data]"));
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sharpe.csv");

        write_csv(&path, &results()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Ticker,Sharpe (No Dividends)"));
        assert_eq!(lines[1], "PETR4.SA,1.2346,2.5000,3.46,Very Good");
        assert!(lines[2].starts_with("XXXX3.SA,N/A,N/A,N/A,"));
    }
}
