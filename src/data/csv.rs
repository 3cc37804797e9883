//! CSV loading for dense datasets
//!
//! Supports loading datasets from CSV files where:
//! - The last column is the label
//! - All other columns are features
//! - First row can be headers (automatically detected)

use crate::core::{Result, SVMError};
use crate::data::DenseDataset;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

impl DenseDataset {
    /// Load a dataset from a CSV file
    ///
    /// The last column is assumed to be the label.
    /// Headers are automatically detected if present.
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_csv_reader(BufReader::new(file))
    }

    /// Load a dataset from a reader with header auto-detection
    pub fn from_csv_reader<R: BufRead>(reader: R) -> Result<Self> {
        Self::from_csv_reader_with_options(reader, true)
    }

    /// Load a dataset from a reader with explicit header option
    pub fn from_csv_reader_with_options<R: BufRead>(
        reader: R,
        auto_detect_header: bool,
    ) -> Result<Self> {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        let mut first_data_line = true;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if first_data_line {
                first_data_line = false;
                if auto_detect_header && is_header_line(line) {
                    continue;
                }
            }

            let (features, label) = parse_data_line(line)
                .map_err(|e| SVMError::ParseError(format!("line {}: {e}", line_no + 1)))?;
            if let Some(first) = rows.first().map(Vec::len) {
                if features.len() != first {
                    return Err(SVMError::DimensionMismatch {
                        expected: first,
                        actual: features.len(),
                    });
                }
            }
            rows.push(features);
            labels.push(label);
        }

        if rows.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        Self::from_rows(rows, labels)
    }
}

/// Check if a line appears to be a header
fn is_header_line(line: &str) -> bool {
    let fields: Vec<&str> = line.split(',').collect();

    if fields.len() < 2 {
        return false;
    }

    // Most feature columns failing to parse as numbers means a header
    let non_numeric_count = fields
        .iter()
        .take(fields.len() - 1)
        .filter(|field| field.trim().parse::<f64>().is_err())
        .count();

    non_numeric_count > fields.len() / 2
}

/// Parse a CSV data line into features and a {-1, +1} label
fn parse_data_line(line: &str) -> std::result::Result<(Vec<f64>, f64), String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();

    if fields.len() < 2 {
        return Err(format!("too few fields: {line}"));
    }

    let (label_str, feature_fields) = fields
        .split_last()
        .ok_or_else(|| format!("too few fields: {line}"))?;
    let label = label_str
        .parse::<f64>()
        .map_err(|_| format!("invalid label: {label_str}"))?;

    // Map arbitrary label values onto the two classes by sign
    let label = if label == 1.0 || label == -1.0 {
        label
    } else if label > 0.0 {
        1.0
    } else {
        -1.0
    };

    let features = feature_fields
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            field
                .parse::<f64>()
                .map_err(|_| format!("invalid feature value at column {}: {field}", idx + 1))
        })
        .collect::<std::result::Result<Vec<f64>, String>>()?;

    Ok((features, label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Dataset;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_csv_basic() {
        let data = "1.0,2.0,1\n3.0,4.0,-1\n";
        let dataset = DenseDataset::from_csv_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.n_features(), 2);
        assert_eq!(dataset.row(0).to_vec(), vec![1.0, 2.0]);
        assert_eq!(dataset.row(1).to_vec(), vec![3.0, 4.0]);
        assert_eq!(dataset.labels(), &[1.0, -1.0]);
    }

    #[test]
    fn test_csv_with_headers() {
        let data = "feature1,feature2,label\n1.0,2.0,1\n3.0,4.0,-1\n";
        let dataset = DenseDataset::from_csv_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.len(), 2); // Headers should be skipped
        assert_eq!(dataset.labels(), &[1.0, -1.0]);
    }

    #[test]
    fn test_csv_keeps_zero_features() {
        let data = "0.0,0.0,1\n0.0,3.0,-1\n";
        let dataset = DenseDataset::from_csv_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.row(0).to_vec(), vec![0.0, 0.0]);
        assert_eq!(dataset.row(1).to_vec(), vec![0.0, 3.0]);
    }

    #[test]
    fn test_csv_label_conversion() {
        let data = "1.0,2.0,0.5\n3.0,4.0,-0.5\n5.0,6.0,0\n";
        let dataset = DenseDataset::from_csv_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.labels(), &[1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_csv_empty_lines_and_comments() {
        let data = "# Comment\nx,y,label\n1.0,2.0,1\n\n3.0,4.0,-1\n";
        let dataset = DenseDataset::from_csv_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_csv_invalid_format() {
        // Too few fields
        let result = DenseDataset::from_csv_reader(Cursor::new("1.0\n"));
        assert!(matches!(result, Err(SVMError::ParseError(_))));

        // Invalid number
        let result = DenseDataset::from_csv_reader(Cursor::new("1.0,2.0,1\n1.0,abc,-1\n"));
        assert!(matches!(result, Err(SVMError::ParseError(msg)) if msg.starts_with("line 2")));

        // Ragged rows
        let result = DenseDataset::from_csv_reader(Cursor::new("1.0,2.0,1\n1.0,-1\n"));
        assert!(matches!(
            result,
            Err(SVMError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_csv_empty_input() {
        let result = DenseDataset::from_csv_reader(Cursor::new("# only a comment\n\n"));
        assert!(matches!(result, Err(SVMError::EmptyDataset)));

        let result = DenseDataset::from_csv_reader(Cursor::new("a,b,label\n"));
        assert!(matches!(result, Err(SVMError::EmptyDataset)));
    }

    #[test]
    fn test_csv_manual_header_control() {
        let data = "1.0,2.0,1\n3.0,4.0,-1\n";
        let dataset = DenseDataset::from_csv_reader_with_options(Cursor::new(data), false).unwrap();
        assert_eq!(dataset.len(), 2);

        let with_header = "a,b,label\n1.0,2.0,1\n";
        let result = DenseDataset::from_csv_reader_with_options(Cursor::new(with_header), false);
        assert!(result.is_err());
    }

    #[test]
    fn test_is_header_line() {
        assert!(is_header_line("feature1,feature2,label"));
        assert!(is_header_line("x1,x2,x3,y"));
        assert!(!is_header_line("1.0,2.0,3.0,1"));
        assert!(!is_header_line("1")); // Too few fields
    }

    #[test]
    fn test_csv_from_file() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "x,y,label").expect("Failed to write");
        writeln!(file, "2.0,1.0,1").expect("Failed to write");
        writeln!(file, "-2.0,-1.0,-1").expect("Failed to write");
        file.flush().expect("Failed to flush");

        let dataset = DenseDataset::from_csv_file(file.path()).expect("Failed to load");
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.n_features(), 2);

        let missing = DenseDataset::from_csv_file("/nonexistent/data.csv");
        assert!(matches!(missing, Err(SVMError::IoError(_))));
    }
}
