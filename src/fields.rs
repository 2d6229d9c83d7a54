//!
//! src/fields.rs  Andrew Belles  Oct 3rd, 2025
//!
//! Named lookups into a single spotify track object. Not used when building
//! rows; kept as a general accessor for ad hoc inspection of responses
//!

use serde_json::Value;

pub const UNAVAILABLE: &str = "Unable to get information";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackField {
    TrackName,
    Duration,
    AlbumName,
    ArtistName,
    Markets,
    TotalTracks,
    ReleaseDate,
    Unrecognized(String)
}

impl TrackField {
    pub fn parse(s: &str) -> TrackField {
        match s {
            "track_name" => TrackField::TrackName,
            "duration" => TrackField::Duration,
            "album_name" => TrackField::AlbumName,
            "artist_name" => TrackField::ArtistName,
            "markets" => TrackField::Markets,
            "total_tracks" => TrackField::TotalTracks,
            "release_date" => TrackField::ReleaseDate,
            other => TrackField::Unrecognized(other.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Markets(Vec<String>),
    Unavailable
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Markets(m) => f.write_str(&m.join(",")),
            FieldValue::Unavailable => f.write_str(UNAVAILABLE)
        }
    }
}

fn text_at(record: &Value, pointer: &str) -> Option<FieldValue> {
    record.pointer(pointer)
        .and_then(Value::as_str)
        .map(|s| FieldValue::Text(s.to_string()))
}

fn integer_at(record: &Value, pointer: &str) -> Option<FieldValue> {
    record.pointer(pointer)
        .and_then(Value::as_i64)
        .map(FieldValue::Integer)
}

///
/// Returns the value behind field, or None when the record lacks it.
/// Unrecognized fields give FieldValue::Unavailable whatever the record holds
///
pub fn get_field(record: &Value, field: &TrackField) -> Option<FieldValue> {
    match field {
        TrackField::TrackName   => text_at(record, "/name"),
        TrackField::Duration    => integer_at(record, "/duration_ms"),
        TrackField::AlbumName   => text_at(record, "/album/name"),
        TrackField::ArtistName  => text_at(record, "/artists/0/name"),
        TrackField::TotalTracks => integer_at(record, "/album/total_tracks"),
        TrackField::ReleaseDate => text_at(record, "/album/release_date"),
        TrackField::Markets => {
            record.get("available_markets")
                .and_then(Value::as_array)
                .map(|markets| FieldValue::Markets(
                    markets.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                ))
        }
        TrackField::Unrecognized(_) => Some(FieldValue::Unavailable)
    }
}

/// String keyed convenience over get_field
pub fn get_field_by_name(record: &Value, name: &str) -> Option<FieldValue> {
    get_field(record, &TrackField::parse(name))
}
