//! CSV row source

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use rowsample_core::{RawRow, RowSchema};
use tracing::debug;

use crate::error::{Error, Result};
use crate::source::RowSource;

use super::parser::CsvParser;

/// Options for CSV reader
#[derive(Debug, Clone)]
pub struct CsvReaderOptions {
    /// Whether the CSV has a header row
    pub has_header: bool,

    /// Delimiter character
    pub delimiter: u8,

    /// Quote character
    pub quote: u8,

    /// Comment character
    pub comment: Option<u8>,

    /// Check header names against the declared schema
    pub validate_header: bool,
}

impl Default for CsvReaderOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            comment: None,
            validate_header: true,
        }
    }
}

/// Streams rows from delimited text against a declared schema
pub struct CsvRowSource<R: Read> {
    /// Inner CSV reader
    reader: csv::Reader<R>,

    /// Cell parser
    parser: CsvParser,

    /// Reusable record buffer
    record: StringRecord,

    /// Number of data records read so far
    records_read: u64,
}

impl<R: Read> CsvRowSource<R> {
    /// Create a new CSV row source
    pub fn new(reader: R, schema: RowSchema, options: CsvReaderOptions) -> Result<Self> {
        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(options.has_header)
            .comment(options.comment)
            .flexible(true);

        let mut reader = builder.from_reader(reader);

        if options.has_header && options.validate_header {
            let header = reader.headers()?;
            let names: Vec<&str> = header.iter().collect();
            let expected: Vec<&str> = schema.columns().iter().map(|c| c.name.as_str()).collect();
            if names != expected {
                return Err(Error::Format(format!(
                    "Header {:?} does not match declared columns {:?}",
                    names, expected
                )));
            }
        }

        debug!(columns = schema.len(), has_header = options.has_header, "opened CSV row source");

        Ok(Self {
            reader,
            parser: CsvParser::new(schema),
            record: StringRecord::new(),
            records_read: 0,
        })
    }

    /// Number of data records read so far
    pub fn records_read(&self) -> u64 {
        self.records_read
    }
}

impl CsvRowSource<File> {
    /// Open a CSV file
    pub fn from_path(path: impl AsRef<Path>, schema: RowSchema, options: CsvReaderOptions) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(file, schema, options)
    }
}

impl<R: Read + Send> RowSource for CsvRowSource<R> {
    fn schema(&self) -> &RowSchema {
        self.parser.schema()
    }

    fn next_row(&mut self) -> Result<Option<RawRow>> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }
        self.records_read += 1;

        let cells: Vec<&str> = self.record.iter().collect();
        self.parser.parse_record(self.records_read, &cells).map(Some)
    }
}
