//! Tabular source: RFC 4180 comma-separated text with a header row.
//!
//! Quoted fields may hold commas, doubled quotes and line breaks. An empty
//! unquoted field is a null; `""` is an empty string.

use mtl_core::{Dataframe, Reader, Row, SourceError};

use crate::filter::RowFilter;
use crate::state::ReaderState;

/// One parsed cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Null,
    Text(String),
}

impl Cell {
    pub fn into_value(self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Text(t) => Some(t),
        }
    }
}

/// Split `text` into records of cells.
///
/// Blank lines between records are skipped. The error names the 1-based line
/// where an unterminated quoted field starts.
pub fn parse_records(text: &str) -> Result<Vec<Vec<Cell>>, SourceError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = Vec::new();
    let mut record: Vec<Cell> = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut quote_line = 0;
    let mut line = 1;
    let mut chars = text.chars().peekable();

    fn end_field(record: &mut Vec<Cell>, field: &mut String, quoted: &mut bool) {
        let value = std::mem::take(field);
        record.push(if value.is_empty() && !*quoted {
            Cell::Null
        } else {
            Cell::Text(value)
        });
        *quoted = false;
    }

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !quoted => {
                in_quotes = true;
                quoted = true;
                quote_line = line;
            }
            ',' => end_field(&mut record, &mut field, &mut quoted),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                line += 1;
                if record.is_empty() && field.is_empty() && !quoted {
                    continue;
                }
                end_field(&mut record, &mut field, &mut quoted);
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(SourceError::Parse(format!(
            "unterminated quoted field starting on line {}",
            quote_line
        )));
    }
    if !record.is_empty() || !field.is_empty() || quoted {
        end_field(&mut record, &mut field, &mut quoted);
        records.push(record);
    }
    Ok(records)
}

/// Header plus records as a dataframe; every record must match the header's
/// width.
pub fn parse_table(text: &str) -> Result<Dataframe, SourceError> {
    let mut records = parse_records(text)?.into_iter();
    let header: Vec<String> = match records.next() {
        Some(header) => header
            .into_iter()
            .map(|c| c.into_value().unwrap_or_default().trim().to_string())
            .collect(),
        None => return Ok(Dataframe::empty()),
    };

    for (i, name) in header.iter().enumerate() {
        if name.is_empty() {
            return Err(SourceError::Parse(format!("empty column name at position {}", i + 1)));
        }
        if header[..i].contains(name) {
            return Err(SourceError::Parse(format!("duplicate column '{}'", name)));
        }
    }

    records
        .enumerate()
        .map(|(i, record)| {
            if record.len() != header.len() {
                return Err(SourceError::Parse(format!(
                    "record {} has {} fields, header has {}",
                    i + 1,
                    record.len(),
                    header.len()
                )));
            }
            Ok(header
                .iter()
                .cloned()
                .zip(record.into_iter().map(Cell::into_value))
                .collect::<Row>())
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Dataframe::new)
}

/// CSV file or string held in memory and filtered per query
#[derive(Debug)]
pub struct CsvReader {
    frame: Dataframe,
    state: ReaderState,
}

impl CsvReader {
    pub fn open(path: &str) -> Result<Self, SourceError> {
        let text = std::fs::read_to_string(path)?;
        let frame = parse_table(&text)?;
        tracing::debug!(path, rows = frame.len(), "loaded csv");
        Ok(Self {
            frame,
            state: ReaderState::new(path),
        })
    }

    pub fn from_str(text: &str) -> Result<Self, SourceError> {
        Ok(Self {
            frame: parse_table(text)?,
            state: ReaderState::new("csv"),
        })
    }
}

impl Reader for CsvReader {
    fn kind(&self) -> &'static str {
        "csv"
    }

    fn dataframe(&self, query: &str) -> Result<Dataframe, SourceError> {
        self.state.ensure_open()?;
        let frame = RowFilter::parse(self.state.label(), query)?.apply(self.state.label(), &self.frame)?;
        self.state.log_query(self.kind(), query, &frame);
        Ok(frame)
    }

    fn full_dataframe(&self) -> Result<Dataframe, SourceError> {
        self.dataframe("*")
    }

    fn set_verbose(&self, verbose: bool) {
        self.state.set_verbose(verbose);
    }

    fn shut_down(&self) -> Result<(), SourceError> {
        self.state.shut_down();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoting() {
        let records = parse_records("a,b,c\n\"x,1\",\"say \"\"hi\"\"\",\n\"\",\"multi\nline\",z\n").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[1],
            vec![
                Cell::Text("x,1".to_string()),
                Cell::Text("say \"hi\"".to_string()),
                Cell::Null
            ]
        );
        assert_eq!(records[2][0], Cell::Text(String::new()));
        assert_eq!(records[2][1], Cell::Text("multi\nline".to_string()));
    }

    #[test]
    fn test_crlf_and_trailing_record() {
        let records = parse_records("a,b\r\n1,2\r\n\r\n3,4").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2], vec![Cell::Text("3".into()), Cell::Text("4".into())]);
    }

    #[test]
    fn test_unterminated_quote() {
        let err = parse_records("a\n\"open\n").unwrap_err();
        assert!(err.to_string().contains("line 2"), "{}", err);
    }

    #[test]
    fn test_table_width_mismatch() {
        assert!(matches!(parse_table("a,b\n1\n"), Err(SourceError::Parse(_))));
        assert!(matches!(parse_table("a,a\n1,2\n"), Err(SourceError::Parse(_))));
        assert!(parse_table("").unwrap().is_empty());
    }

    #[test]
    fn test_reader_queries() {
        let reader = CsvReader::from_str("id,dept\n1,eng\n2,ops\n3,eng\n").unwrap();
        assert_eq!(reader.full_dataframe().unwrap().len(), 3);
        assert_eq!(reader.dataframe("dept=eng").unwrap().len(), 2);

        reader.shut_down().unwrap();
        assert!(matches!(
            reader.dataframe("*"),
            Err(SourceError::ShutDown(_))
        ));
    }
}
