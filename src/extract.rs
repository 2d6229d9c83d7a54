//!
//! src/extract.rs  Andrew Belles  Oct 3rd, 2025
//!
//! Turns raw spotify responses into playlist ids and track rows. Items that
//! are missing any of the required fields are dropped, never half filled
//!

use serde_json::Value;
use tracing::debug;

use crate::errors::LoaderError;
use crate::types::{AlbumType, PlaylistId, TrackRecord, TrackTable};

/// Rows parsed from one playlist page plus how many items were dropped
#[derive(Debug, Clone, Default)]
pub struct Extracted {
    pub table: TrackTable,
    pub skipped: usize
}

fn str_field(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(Value::as_str).map(str::to_string)
}

///
/// Reads one playlist item ({"track": {...}}). None when the track was
/// removed or any field is absent, null or the wrong type
///
pub fn parse_track_item(item: &Value) -> Option<TrackRecord> {
    let track = item.get("track").filter(|t| t.is_object())?;
    let album = track.get("album").filter(|a| a.is_object())?;

    let track_name = str_field(track, "name")?;
    let popularity = track.get("popularity")
        .and_then(Value::as_u64)
        .and_then(|p| u32::try_from(p).ok())?;
    let duration_ms = track.get("duration_ms")
        .and_then(Value::as_u64)
        .and_then(|d| i64::try_from(d).ok())?;

    // every artist needs a name, and there has to be a primary one
    let artists = track.get("artists")
        .and_then(Value::as_array)?
        .iter()
        .map(|a| str_field(a, "name"))
        .collect::<Option<Vec<String>>>()
        .filter(|names| !names.is_empty())?;

    let release_date = str_field(album, "release_date")?;
    let album_name = str_field(album, "name")?;
    let album_type = str_field(album, "album_type").map(|s| AlbumType::parse(&s))?;
    let total_album_tracks = album.get("total_tracks")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())?;

    Some( TrackRecord {
        track_name,
        popularity,
        duration_ms,
        artists,
        release_date,
        album_name,
        album_type,
        total_album_tracks
    })
}

/// Parses a playlist items page, keeping item order
pub fn parse_playlist_items(response: &Value) -> Result<Extracted, LoaderError> {
    let items = response.get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| LoaderError::Parse("playlist response has no items".into()))?;

    let mut extracted = Extracted::default();
    for item in items {
        match parse_track_item(item) {
            Some(record) => extracted.table.push(record),
            None => extracted.skipped += 1,
        }
    }
    Ok(extracted)
}

/// Collects playlist ids from a search response, in response order
pub fn parse_playlist_search(response: &Value) -> Result<Vec<PlaylistId>, LoaderError> {
    let items = response.pointer("/playlists/items")
        .and_then(Value::as_array)
        .ok_or_else(|| LoaderError::Parse("search response has no playlists.items".into()))?;

    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        match item.get("id").and_then(Value::as_str) {
            Some(id) => ids.push(PlaylistId(id.to_string())),
            None => debug!(item = %item, "search.skip.no_id"),
        }
    }
    Ok(ids)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    pub fn track_item(name: &str, artist: &str) -> Value {
        json!({
            "added_at": "2024-01-01T00:00:00Z",
            "track": {
                "name": name,
                "popularity": 77,
                "duration_ms": 187_000,
                "artists": [{"name": artist}, {"name": "Feat"}],
                "album": {
                    "name": format!("{name} (Deluxe)"),
                    "album_type": "album",
                    "release_date": "2020-02-29",
                    "total_tracks": 12
                }
            }
        })
    }

    pub fn broken_item() -> Value {
        json!({ "added_at": "2024-01-01T00:00:00Z", "track": null })
    }

    pub fn page(items: Vec<Value>) -> Value {
        json!({ "items": items, "next": null, "total": 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn complete_item_maps_all_fields() {
        let record = parse_track_item(&track_item("Ella Baila Sola", "Eslabon Armado")).unwrap();
        assert_eq!(record, TrackRecord {
            track_name: "Ella Baila Sola".into(),
            popularity: 77,
            duration_ms: 187_000,
            artists: vec!["Eslabon Armado".into(), "Feat".into()],
            release_date: "2020-02-29".into(),
            album_name: "Ella Baila Sola (Deluxe)".into(),
            album_type: AlbumType::Album,
            total_album_tracks: 12
        });
        assert_eq!(record.primary_artist(), "Eslabon Armado");
    }

    #[test]
    fn any_missing_field_drops_item() {
        let pointers = [
            "/track/name",
            "/track/popularity",
            "/track/duration_ms",
            "/track/artists",
            "/track/album/release_date",
            "/track/album/name",
            "/track/album/album_type",
            "/track/album/total_tracks",
        ];
        for pointer in pointers {
            let mut item = track_item("x", "y");
            let (parent, key) = pointer.rsplit_once('/').unwrap();
            item.pointer_mut(parent).unwrap().as_object_mut().unwrap().remove(key);
            assert_eq!(parse_track_item(&item), None, "missing {pointer}");
        }
    }

    #[test]
    fn null_and_odd_shapes_drop_item() {
        assert_eq!(parse_track_item(&broken_item()), None);

        let mut item = track_item("x", "y");
        item["track"]["album"] = Value::Null;
        assert_eq!(parse_track_item(&item), None);

        let mut item = track_item("x", "y");
        item["track"]["artists"] = json!([]);
        assert_eq!(parse_track_item(&item), None);

        let mut item = track_item("x", "y");
        item["track"]["artists"] = json!([{"name": "a"}, {"id": "no-name"}]);
        assert_eq!(parse_track_item(&item), None);

        let mut item = track_item("x", "y");
        item["track"]["popularity"] = json!("high");
        assert_eq!(parse_track_item(&item), None);

        let mut item = track_item("x", "y");
        item["track"]["duration_ms"] = json!(u64::MAX);
        assert_eq!(parse_track_item(&item), None);
    }

    #[test]
    fn page_keeps_order_and_counts_skips() {
        let response = page(vec![
            track_item("one", "a"),
            broken_item(),
            track_item("two", "b"),
        ]);
        let extracted = parse_playlist_items(&response).unwrap();
        let names: Vec<&str> = extracted.table.rows().iter()
            .map(|r| r.track_name.as_str())
            .collect();
        assert_eq!(names, ["one", "two"]);
        assert_eq!(extracted.skipped, 1);
    }

    #[test]
    fn page_without_items_is_an_error() {
        assert!(matches!(
            parse_playlist_items(&json!({"error": "gone"})),
            Err(LoaderError::Parse(_))
        ));
    }

    #[test]
    fn search_ids_in_response_order() {
        let response = json!({
            "playlists": {
                "items": [{"id": "p2", "name": "b"}, null, {"id": "p1", "name": "a"}]
            }
        });
        let ids = parse_playlist_search(&response).unwrap();
        assert_eq!(ids, vec![PlaylistId("p2".into()), PlaylistId("p1".into())]);
        assert!(parse_playlist_search(&json!({"tracks": {}})).is_err());
    }
}
