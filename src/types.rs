use serde::Deserialize;

use crate::table::{Cell, Column, ColumnType, Table};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaylistId(pub String);

impl PlaylistId {
    pub fn as_str(&self) -> &str { &self.0 }
}

impl std::fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One search string or several, as written in config.yaml
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum QueryTerms {
    Single(String),
    Many(Vec<String>)
}

impl QueryTerms {
    pub fn terms(&self) -> Vec<&str> {
        match self {
            QueryTerms::Single(q) => vec![q.as_str()],
            QueryTerms::Many(qs) => qs.iter().map(String::as_str).collect()
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            QueryTerms::Single(q) => q.trim().is_empty(),
            QueryTerms::Many(qs) => qs.is_empty()
        }
    }
}

impl From<&str> for QueryTerms {
    fn from(s: &str) -> Self { QueryTerms::Single(s.to_string()) }
}

impl From<Vec<String>> for QueryTerms {
    fn from(v: Vec<String>) -> Self { QueryTerms::Many(v) }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AlbumType {
    Album,
    Single,
    Compilation,
    Other(String)
}

impl AlbumType {
    pub fn as_str(&self) -> &str {
        match self {
            AlbumType::Album => "album",
            AlbumType::Single => "single",
            AlbumType::Compilation => "compilation",
            AlbumType::Other(s) => s.as_str()
        }
    }
    pub fn parse(s: &str) -> AlbumType {
        match s {
            "album" => AlbumType::Album,
            "single" => AlbumType::Single,
            "compilation" => AlbumType::Compilation,
            other => AlbumType::Other(other.to_string())
        }
    }
}

/// Column names of the flattened track table, in load order
pub const TRACK_COLUMNS: [&str; 8] = [
    "track_name",
    "popularity",
    "duration",
    "artists",
    "release_date",
    "album_name",
    "album_type",
    "total_album_tracks",
];

const TRACK_COLUMN_TYPES: [ColumnType; 8] = [
    ColumnType::String,
    ColumnType::Integer,
    ColumnType::Integer,
    ColumnType::String,
    ColumnType::String,
    ColumnType::String,
    ColumnType::String,
    ColumnType::Integer,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    pub track_name: String,
    pub popularity: u32,
    pub duration_ms: i64,
    pub artists: Vec<String>,       // never empty
    pub release_date: String,
    pub album_name: String,
    pub album_type: AlbumType,
    pub total_album_tracks: u32
}

impl TrackRecord {
    pub fn primary_artist(&self) -> &str {
        self.artists.first().map(String::as_str).unwrap_or_default()
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.track_name.clone()),
            Cell::Integer(i64::from(self.popularity)),
            Cell::Integer(self.duration_ms),
            Cell::Text(self.primary_artist().to_string()),
            Cell::Text(self.release_date.clone()),
            Cell::Text(self.album_name.clone()),
            Cell::Text(self.album_type.as_str().to_string()),
            Cell::Integer(i64::from(self.total_album_tracks)),
        ]
    }
}

/// Rows accumulated across playlists; duplicates are kept
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTable {
    rows: Vec<TrackRecord>
}

impl TrackTable {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, record: TrackRecord) {
        self.rows.push(record);
    }

    /// Appends every row of other after the rows already held
    pub fn concat(&mut self, other: TrackTable) {
        self.rows.extend(other.rows);
    }

    pub fn len(&self) -> usize { self.rows.len() }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn rows(&self) -> &[TrackRecord] { &self.rows }

    pub fn to_table(&self) -> Table {
        let columns = TRACK_COLUMNS.iter()
            .zip(TRACK_COLUMN_TYPES)
            .map(|(name, kind)| Column::new(*name, kind))
            .collect();
        let rows = self.rows.iter().map(TrackRecord::cells).collect();
        Table::new(columns, rows)
    }
}

impl FromIterator<TrackRecord> for TrackTable {
    fn from_iter<I: IntoIterator<Item = TrackRecord>>(iter: I) -> Self {
        Self { rows: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> TrackRecord {
        TrackRecord {
            track_name: name.to_string(),
            popularity: 71,
            duration_ms: 215_000,
            artists: vec!["Rosalía".into(), "J Balvin".into()],
            release_date: "2019-03-28".into(),
            album_name: "Con Altura".into(),
            album_type: AlbumType::Single,
            total_album_tracks: 1
        }
    }

    #[test]
    fn concat_keeps_order_and_duplicates() {
        let mut all = TrackTable::new();
        all.concat(TrackTable::from_iter([record("a"), record("b")]));
        all.concat(TrackTable::from_iter([record("a")]));

        let names: Vec<&str> = all.rows().iter().map(|r| r.track_name.as_str()).collect();
        assert_eq!(names, ["a", "b", "a"]);
    }

    #[test]
    fn flattened_row_keeps_primary_artist() {
        let table = TrackTable::from_iter([record("Con Altura")]).to_table();
        assert_eq!(table.column_names(), TRACK_COLUMNS.to_vec());
        assert_eq!(table.rows()[0], vec![
            Cell::Text("Con Altura".into()),
            Cell::Integer(71),
            Cell::Integer(215_000),
            Cell::Text("Rosalía".into()),
            Cell::Text("2019-03-28".into()),
            Cell::Text("Con Altura".into()),
            Cell::Text("single".into()),
            Cell::Integer(1),
        ]);
    }

    #[test]
    fn album_type_keeps_unknown_values() {
        assert_eq!(AlbumType::parse("compilation"), AlbumType::Compilation);
        let other = AlbumType::parse("appears_on");
        assert_eq!(other.as_str(), "appears_on");
    }

    #[test]
    fn query_terms_list_every_search() {
        assert_eq!(QueryTerms::from("hindi").terms(), ["hindi"]);
        let many = QueryTerms::from(vec!["hindi".to_string(), "spanish".to_string()]);
        assert_eq!(many.terms(), ["hindi", "spanish"]);
        assert!(QueryTerms::Many(vec![]).is_empty());
        assert!(QueryTerms::from("  ").is_empty());
    }
}
