use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::error::DatasetLoadError;
use crate::data::{Dataset, DatasetBuilder};

/// Load a comma separated dataset from disk.
pub fn load_text(path: impl AsRef<Path>) -> Result<Dataset, DatasetLoadError> {
    let file = File::open(path.as_ref())?;
    parse_text(BufReader::new(file))
}

/// Parse a comma separated dataset from a reader.
///
/// Line numbers in errors are 1-based.
pub fn parse_text<R: BufRead>(reader: R) -> Result<Dataset, DatasetLoadError> {
    let mut builder = DatasetBuilder::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut values = trimmed
            .split(',')
            .map(|tok| {
                let tok = tok.trim();
                tok.parse::<f32>().map_err(|_| DatasetLoadError::Parse {
                    line: line_no,
                    token: tok.to_string(),
                })
            })
            .collect::<Result<Vec<f32>, _>>()?;

        // at least one value exists: split always yields a token
        let label = values.pop().unwrap_or_default();
        builder
            .push(values, label)
            .map_err(|source| DatasetLoadError::Dataset { line: line_no, source })?;
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DatasetError;
    use std::io::Cursor;

    #[test]
    fn parses_rows_with_label_last() {
        let text = "1,2,3\n\n 4 , 5 , -6 \n";
        let data = parse_text(Cursor::new(text)).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.n_features(), 2);
        assert_eq!(data.sample(1).x.as_slice(), &[4.0, 5.0]);
        assert_eq!(data.sample(1).y, -6.0);
    }

    #[test]
    fn reports_bad_token_with_line() {
        let err = parse_text(Cursor::new("1,2,3\n1,x,3\n")).unwrap_err();
        match err {
            DatasetLoadError::Parse { line, token } => {
                assert_eq!(line, 2);
                assert_eq!(token, "x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reports_ragged_rows() {
        let err = parse_text(Cursor::new("1,2,3\n1,3\n")).unwrap_err();
        assert!(matches!(
            err,
            DatasetLoadError::Dataset {
                line: 2,
                source: DatasetError::DimensionMismatch { expected: 2, got: 1 }
            }
        ));
    }

    #[test]
    fn label_only_row_is_rejected() {
        let err = parse_text(Cursor::new("5\n")).unwrap_err();
        assert!(matches!(
            err,
            DatasetLoadError::Dataset { source: DatasetError::NoFeatures, .. }
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_text("/nonexistent/pwaffine/data.csv").unwrap_err();
        assert!(matches!(err, DatasetLoadError::Io(_)));
    }
}
