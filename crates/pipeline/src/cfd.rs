//! Per-point CFD result tables.
//!
//! The simulation exports one row per mesh point and one named column per
//! hemodynamic metric. Exporters disagree on separators, so the delimiter is
//! sniffed from the header line.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::{PipelineError, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CfdTable {
    headers: Vec<String>,
    columns: Vec<Vec<f32>>,
}

fn detect_delimiter(header_line: &str) -> u8 {
    let tabs = header_line.matches('\t').count();
    let commas = header_line.matches(',').count();
    if tabs > commas {
        b'\t'
    } else {
        b','
    }
}

impl CfdTable {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file =
            std::fs::File::open(path).map_err(|e| PipelineError::CfdRead {
                path: path.to_path_buf(),
                source: e.into(),
            })?;
        Self::from_reader(file, path)
    }

    /// Parses a table from `reader`; `origin` only labels errors.
    pub fn from_reader<R: Read>(mut reader: R, origin: &Path) -> Result<Self> {
        let cfd_error = |source: csv::Error| PipelineError::CfdRead {
            path: origin.to_path_buf(),
            source,
        };
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| cfd_error(e.into()))?;
        let delimiter = detect_delimiter(text.lines().next().unwrap_or_default());

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = rdr
            .headers()
            .map_err(cfd_error)?
            .iter()
            .map(str::to_string)
            .collect();
        let mut columns = vec![Vec::new(); headers.len()];
        for (row, record) in rdr.records().enumerate() {
            let record = record.map_err(cfd_error)?;
            for (column, field) in record.iter().enumerate() {
                let value = field
                    .parse::<f32>()
                    .map_err(|_| PipelineError::InvalidCfdValue {
                        path: PathBuf::from(origin),
                        row,
                        column: headers[column].clone(),
                        value: field.to_string(),
                    })?;
                columns[column].push(value);
            }
        }
        Ok(CfdTable { headers, columns })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    /// First column whose header contains `pattern`.
    pub fn column_matching(&self, pattern: &str) -> Option<(&str, &[f32])> {
        self.headers
            .iter()
            .position(|h| h.contains(pattern))
            .map(|i| (self.headers[i].as_str(), self.columns[i].as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<CfdTable> {
        CfdTable::from_reader(text.as_bytes(), Path::new("test.csv"))
    }

    #[test]
    fn comma_separated() {
        let table = parse("TAWSS [Pa],OSI,ECAP\n1.5,0.1,0.2\n2.5,0.2,0.3\n").unwrap();
        assert_eq!(2, table.row_count());
        assert_eq!(
            Some(("TAWSS [Pa]", &[1.5, 2.5][..])),
            table.column_matching("TAWSS")
        );
        assert_eq!(Some(("OSI", &[0.1, 0.2][..])), table.column_matching("OSI"));
    }

    #[test]
    fn tab_separated_with_padding() {
        let table = parse("Point ID\tRRT\n0\t 4.0\n1\t5.0 \n").unwrap();
        assert_eq!(Some(("RRT", &[4.0, 5.0][..])), table.column_matching("RRT"));
    }

    #[test]
    fn first_match_wins() {
        let table = parse("ECAP_mean,ECAP_max\n1,2\n").unwrap();
        assert_eq!(Some(("ECAP_mean", &[1.0][..])), table.column_matching("ECAP"));
    }

    #[test]
    fn missing_column() {
        let table = parse("TAWSS\n1\n").unwrap();
        assert_eq!(None, table.column_matching("OSI"));
    }

    #[test]
    fn non_numeric_value_names_its_cell() {
        let err = parse("TAWSS,OSI\n1.0,abc\n").unwrap_err();
        match err {
            PipelineError::InvalidCfdValue {
                row, column, value, ..
            } => {
                assert_eq!(0, row);
                assert_eq!("OSI", column);
                assert_eq!("abc", value);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn ragged_rows_are_rejected() {
        assert!(matches!(
            parse("TAWSS,OSI\n1.0,2.0\n3.0\n"),
            Err(PipelineError::CfdRead { .. })
        ));
    }
}
