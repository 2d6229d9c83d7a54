//!
//! src/table.rs  Andrew Belles  Oct 3rd, 2025
//!
//! Generic column/row table the track rows are flattened into before they
//! are written to csv or sent to bigquery. Also holds the delimited-text
//! round trip that settles column types before a load
//!

use serde_json::{Map, Value};

use crate::errors::LoaderError;

/// Delimiter for the normalization round trip, chosen so commas in titles
/// and album names never split a field
pub const NORMALIZE_DELIMITER: u8 = b';';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    String
}

impl ColumnType {
    /// Standard SQL type name used in a bigquery schema
    pub fn bigquery_name(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Float => "FLOAT",
            ColumnType::String => "STRING"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnType) -> Self {
        Self { name: name.into(), kind }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Integer(i64),
    Float(f64),
    Text(String),
    Null
}

impl Cell {
    /// Text form written to delimited output. Floats keep a fractional part
    /// so they are not read back as integers
    pub fn render(&self) -> String {
        match self {
            Cell::Integer(i) => i.to_string(),
            Cell::Float(f) => format!("{f:?}"),
            Cell::Text(s) => s.clone(),
            Cell::Null => String::new()
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Cell::Integer(i) => Value::from(*i),
            Cell::Float(f) => Value::from(*f),
            Cell::Text(s) => Value::from(s.as_str()),
            Cell::Null => Value::Null
        }
    }
}

fn looks_like_float(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
        && s.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Picks the narrowest type every non-empty value of a column parses as
fn infer_column_type(values: &[&str]) -> ColumnType {
    let present: Vec<&str> = values.iter().copied().filter(|v| !v.is_empty()).collect();
    if present.is_empty() {
        ColumnType::String
    } else if present.iter().all(|v| v.parse::<i64>().is_ok()) {
        ColumnType::Integer
    } else if present.iter().all(|v| looks_like_float(v)) {
        ColumnType::Float
    } else {
        ColumnType::String
    }
}

fn parse_cell(raw: &str, kind: ColumnType) -> Cell {
    if raw.is_empty() {
        return Cell::Null;
    }
    match kind {
        ColumnType::Integer => raw.parse().map(Cell::Integer).unwrap_or(Cell::Null),
        ColumnType::Float => raw.parse().map(Cell::Float).unwrap_or(Cell::Null),
        ColumnType::String => Cell::Text(raw.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>
}

impl Table {
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<Cell>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[Column] { &self.columns }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn rows(&self) -> &[Vec<Cell>] { &self.rows }

    pub fn len(&self) -> usize { self.rows.len() }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Writes header plus rows, no index column
    pub fn to_delimited(&self, delimiter: u8) -> Result<String, LoaderError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());

        writer.write_record(self.columns.iter().map(|c| c.name.as_str()))?;
        for row in &self.rows {
            writer.write_record(row.iter().map(Cell::render))?;
        }

        let bytes = writer.into_inner()
            .map_err(|e| LoaderError::Csv(format!("flush: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| LoaderError::Csv(format!("utf8: {e}")))
    }

    /// Reads delimited text with a header line, inferring each column's type
    pub fn from_delimited(text: &str, delimiter: u8) -> Result<Table, LoaderError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(text.as_bytes());

        let names: Vec<String> = reader.headers()?
            .iter()
            .map(str::to_string)
            .collect();

        let mut raw_rows: Vec<csv::StringRecord> = Vec::new();
        for record in reader.records() {
            raw_rows.push(record?);
        }

        let columns: Vec<Column> = names.into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let values: Vec<&str> = raw_rows.iter()
                    .map(|r| r.get(idx).unwrap_or_default())
                    .collect();
                Column::new(name, infer_column_type(&values))
            })
            .collect();

        let rows = raw_rows.iter()
            .map(|record| {
                columns.iter()
                    .enumerate()
                    .map(|(idx, col)| parse_cell(record.get(idx).unwrap_or_default(), col.kind))
                    .collect()
            })
            .collect();

        Ok( Table { columns, rows } )
    }

    /// Round trips through `;` delimited text so column types match what the
    /// warehouse will infer from the same text. Applying it twice changes
    /// nothing further
    pub fn normalize(&self) -> Result<Table, LoaderError> {
        let text = self.to_delimited(NORMALIZE_DELIMITER)?;
        Table::from_delimited(&text, NORMALIZE_DELIMITER)
    }

    /// Rows keyed by column name, nulls left out
    pub fn json_rows(&self) -> Vec<Map<String, Value>> {
        self.rows.iter()
            .map(|row| {
                self.columns.iter()
                    .zip(row)
                    .filter(|(_, cell)| **cell != Cell::Null)
                    .map(|(col, cell)| (col.name.clone(), cell.to_json()))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec![
                Column::new("track_name", ColumnType::String),
                Column::new("popularity", ColumnType::Integer),
                Column::new("artists", ColumnType::String),
            ],
            vec![
                vec![Cell::Text("Hola, Adiós".into()), Cell::Integer(64), Cell::Text("Bad Bunny".into())],
                vec![Cell::Text("Dákiti".into()), Cell::Integer(90), Cell::Text("Jhay Cortez".into())],
            ]
        )
    }

    #[test]
    fn normalize_keeps_values_and_types() {
        let once = sample().normalize().unwrap();
        assert_eq!(once, sample());
    }

    #[test]
    fn normalize_is_idempotent() {
        let mixed = Table::new(
            vec![
                Column::new("a", ColumnType::String),
                Column::new("b", ColumnType::String),
                Column::new("c", ColumnType::String),
            ],
            vec![
                vec![Cell::Text("007".into()), Cell::Text("1.50".into()), Cell::Null],
                vec![Cell::Text("12".into()), Cell::Text("2".into()), Cell::Text("x".into())],
            ]
        );
        let once = mixed.normalize().unwrap();
        let twice = once.normalize().unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.columns()[0].kind, ColumnType::Integer);
        assert_eq!(once.columns()[1].kind, ColumnType::Float);
        assert_eq!(once.rows()[0][1], Cell::Float(1.5));
        assert_eq!(once.rows()[1][1], Cell::Float(2.0));
        assert_eq!(once.columns()[2].kind, ColumnType::String);
        assert_eq!(once.rows()[0][2], Cell::Null);
    }

    #[test]
    fn overflowing_number_stays_text() {
        let huge = Table::new(
            vec![Column::new("track_name", ColumnType::String)],
            vec![vec![Cell::Text("1e400".into())]]
        );
        let once = huge.normalize().unwrap();
        assert_eq!(once.normalize().unwrap(), once);
        assert_eq!(once.columns()[0].kind, ColumnType::String);
        assert_eq!(once.json_rows()[0].get("track_name"), Some(&Value::from("1e400")));
    }

    #[test]
    fn delimited_output_uses_semicolons_and_header() {
        let text = sample().to_delimited(NORMALIZE_DELIMITER).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("track_name;popularity;artists"));
        assert_eq!(lines.next(), Some("Hola, Adiós;64;Bad Bunny"));
    }

    #[test]
    fn delimiter_inside_value_is_quoted() {
        let table = Table::new(
            vec![Column::new("album_name", ColumnType::String)],
            vec![vec![Cell::Text("Side A; Side B".into())]]
        );
        let once = table.normalize().unwrap();
        assert_eq!(once.rows()[0][0], Cell::Text("Side A; Side B".into()));
    }

    #[test]
    fn json_rows_skip_nulls() {
        let table = Table::new(
            vec![Column::new("a", ColumnType::Integer), Column::new("b", ColumnType::String)],
            vec![vec![Cell::Integer(3), Cell::Null]]
        );
        let rows = table.json_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("a"), Some(&Value::from(3)));
        assert!(rows[0].get("b").is_none());
    }
}
