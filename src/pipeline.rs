//!
//! src/pipeline.rs  Andrew Belles  Oct 5th, 2025
//!
//! Defines the loader run: discover playlists, pull their tracks in the
//! order they were found, then normalize and append to bigquery
//!
//!

use tracing::{debug, info};

use crate::config::AppConfig;
use crate::errors::LoaderError;
use crate::extract::{self, Extracted};
use crate::fetch::{send_json, BigQueryClient, SpotifyClient};
use crate::load;
use crate::sink;
use crate::types::{PlaylistId, QueryTerms, TrackTable};

#[derive(Clone, Debug)]
pub struct Clients {
    pub spotify: SpotifyClient,
    pub bigquery: BigQueryClient
}

impl Clients {
    pub fn new(cfg: &AppConfig) -> Result<Self, LoaderError> {
        Ok( Self {
            spotify: SpotifyClient::new(&cfg.http, &cfg.spotify)?,
            bigquery: BigQueryClient::new(&cfg.http, &cfg.bigquery)?
        })
    }
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub playlists: usize,
    pub rows: usize,
    pub skipped: usize,
    pub loaded: usize
}

///
/// One search per query term, ids concatenated in query order, no dedup
///
pub async fn find_playlists(
    spotify: &SpotifyClient,
    queries: &QueryTerms,
    limit: u32,
    bearer: &str
) -> Result<Vec<PlaylistId>, LoaderError> {
    let mut ids = Vec::new();
    for query in queries.terms() {
        let response = send_json(spotify.search_playlists(query, limit, bearer)?).await?;
        let found = extract::parse_playlist_search(&response)?;
        debug!(%query, found = found.len(), "discovery.query");
        ids.extend(found);
    }
    info!(playlists = ids.len(), "discovery.done");
    Ok(ids)
}

/// Track rows for the first page of one playlist
pub async fn extract_tracks(
    spotify: &SpotifyClient,
    playlist_id: &PlaylistId,
    bearer: &str
) -> Result<Extracted, LoaderError> {
    let response = send_json(spotify.playlist_items(playlist_id.as_str(), bearer)?).await?;
    let extracted = extract::parse_playlist_items(&response)?;
    debug!(
        playlist = %playlist_id,
        rows = extracted.table.len(),
        skipped = extracted.skipped,
        "extract.playlist"
    );
    Ok(extracted)
}

/// Extracts every playlist in order and concatenates the rows
pub async fn collect_tracks(
    spotify: &SpotifyClient,
    playlist_ids: &[PlaylistId],
    bearer: &str
) -> Result<(TrackTable, usize), LoaderError> {
    let mut table = TrackTable::new();
    let mut skipped = 0_usize;
    for playlist_id in playlist_ids {
        let extracted = extract_tracks(spotify, playlist_id, bearer).await?;
        skipped += extracted.skipped;
        table.concat(extracted.table);
    }
    Ok((table, skipped))
}

pub struct Pipeline<'a> {
    cfg: &'a AppConfig,
    clients: Clients
}

impl<'a> Pipeline<'a> {
    pub fn new(cfg: &'a AppConfig, clients: Clients) -> Self {
        Self { cfg, clients }
    }

    pub async fn run(&self) -> Result<RunSummary, LoaderError> {
        let run = &self.cfg.run;
        info!(
            queries = ?run.queries.terms(),
            limit = run.search_limit,
            table = %self.cfg.bigquery.table,
            "pipeline.start"
        );

        let bearer = self.clients.spotify.authorize().await?;

        let playlist_ids = find_playlists(
            &self.clients.spotify,
            &run.queries,
            run.search_limit,
            &bearer
        ).await?;

        info!(playlists = playlist_ids.len(), "extract.start");
        let (tracks, skipped) = collect_tracks(
            &self.clients.spotify,
            &playlist_ids,
            &bearer
        ).await?;

        let table = tracks.to_table();
        info!(
            rows = table.len(),
            columns = table.columns().len(),
            skipped,
            "pipeline.collected"
        );

        if let Some(csv) = &run.csv {
            sink::save_csv_to_disk(&table, &csv.filename, &csv.dir)?;
        }

        let normalized = table.normalize()?;
        let loaded = load::append(&self.clients.bigquery, &normalized).await?;

        let summary = RunSummary {
            playlists: playlist_ids.len(),
            rows: table.len(),
            skipped,
            loaded
        };
        info!(?summary, "pipeline.done");
        Ok(summary)
    }
}
