//! Lazy CSV row source
//!
//! A [`RowSource`] is a finite, forward-only sequence over a CSV file. It
//! is not restartable: retrying a whole table means opening a fresh source,
//! which re-reads the file from the start.

use crate::error::Result;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use std::fs::File;
use std::path::Path;

/// Forward-only reader over one CSV data file
pub struct RowSource {
    headers: StringRecord,
    records: StringRecordsIntoIter<File>,
}

impl RowSource {
    /// Open a CSV file with the given field delimiter
    ///
    /// The first record is consumed as the header row.
    pub fn open(path: impl AsRef<Path>, delimiter: u8) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(false)
            .from_path(path.as_ref())?;

        let headers = reader.headers()?.clone();

        Ok(Self {
            headers,
            records: reader.into_records(),
        })
    }

    /// The header row
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// Next data row, None at end of file
    pub fn next_record(&mut self) -> Option<Result<StringRecord>> {
        self.records.next().map(|r| r.map_err(Into::into))
    }
}

impl std::fmt::Debug for RowSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowSource")
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_headers_and_rows_in_order() {
        let file = write_csv("name,value\nalpha,1\nbeta,2\n");
        let mut source = RowSource::open(file.path(), b',').unwrap();

        assert_eq!(source.headers().iter().collect::<Vec<_>>(), vec!["name", "value"]);

        let first = source.next_record().unwrap().unwrap();
        assert_eq!(&first[0], "alpha");
        let second = source.next_record().unwrap().unwrap();
        assert_eq!(&second[1], "2");
        assert!(source.next_record().is_none());
    }

    #[test]
    fn test_tab_delimiter() {
        let file = write_csv("a\tb\n1\t2\n");
        let mut source = RowSource::open(file.path(), b'\t').unwrap();
        assert_eq!(source.headers().len(), 2);
        let row = source.next_record().unwrap().unwrap();
        assert_eq!(&row[0], "1");
    }

    #[test]
    fn test_empty_file_has_no_rows() {
        let file = write_csv("only,headers\n");
        let mut source = RowSource::open(file.path(), b',').unwrap();
        assert!(source.next_record().is_none());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(RowSource::open("/nonexistent/data.csv", b',').is_err());
    }

    #[test]
    fn test_ragged_row_is_an_error() {
        let file = write_csv("a,b\n1,2\n3\n");
        let mut source = RowSource::open(file.path(), b',').unwrap();
        assert!(source.next_record().unwrap().is_ok());
        assert!(source.next_record().unwrap().is_err());
    }
}
