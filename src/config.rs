//!
//! src/config.rs  Andrew Belles  Oct 2nd, 2025
//!
//! Reads the yaml configuration document and the environment into a single
//! AppConfig that is built once at startup and handed to every stage
//!

use serde::Deserialize;
use url::Url;
use std::{path::{Path, PathBuf}, time};

use crate::types::QueryTerms;
use crate::LoaderError;

/// Constants for HTTP Config
pub const HTTP_TIMEOUT: u64 = 30000;
pub const HTTP_CONNECT_TIMEOUT: u64 = 5000;
pub const HTTP_POOL_MAX_IDLE: usize = 4;
pub const HTTP_POOL_IDLE_TIMEOUT: u64 = 90000;
pub const HTTP_MAX_REDIRECTS: u8 = 4;

/// Constants for a run
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const DEFAULT_QUERY: &str = "spanish";
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;
pub const BQ_INSERT_BATCH_ROWS: usize = 500;

/// Lookup used in place of std::env::var so tests can feed their own values
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Returns value if set and not blank, otherwise a config error naming key
fn required(key: &str, value: Option<String>) -> Result<String, LoaderError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(LoaderError::Config(format!("{key} was not set"))),
    }
}

/// Ensures that url is https
fn ensure_https(url: &Url) -> Result<(), String> {
    if url.scheme() == "https" {
        Ok(())
    } else {
        Err(format!("URL must be https: {url}"))
    }
}

fn ensure_host(url: &Url, expected_host: &str) -> Result<(), String> {
    match url.host_str() {
        Some(h) if h.eq_ignore_ascii_case(expected_host) => Ok(()),
        Some(h) => Err(
            format!("Unexpected host for {url} (got {h}, expected {expected_host})")
        ),
        None => Err(format!("URL missing host: {url}"))
    }
}

/// Url::join drops the last segment of a base without a trailing slash
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let mut path = url.path().to_string();
        path.push('/');
        url.set_path(&path);
    }
    url
}

/// Parses an endpoint from env (or default) and checks scheme and host
fn endpoint(
    env: EnvLookup,
    key: &str,
    default: &str,
    expected_host: &str
) -> Result<Url, LoaderError> {
    let raw = env(key).unwrap_or_else(|| default.to_string());
    let url = Url::parse(&raw)
        .map_err(|e| LoaderError::Config(format!("{key} invalid {e}")))?;

    ensure_https(&url).map_err(LoaderError::Config)?;
    ensure_host(&url, expected_host).map_err(LoaderError::Config)?;
    Ok(url)
}

///
/// Document layout of config.yaml. Every key is optional here so that a
/// missing key is reported by name instead of as a serde error
///
#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    client_id: Option<String>,
    client_secret: Option<String>,
    bq_table: Option<String>,
    bq_project_id: Option<String>,
    queries: Option<QueryTerms>,
    search_limit: Option<u32>,
    csv_dir: Option<String>,
    csv_filename: Option<String>
}

/// Configuration that Spotify expects when hitting endpoints
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: Url,
    pub api_base: Url,
}

fn build_spotify(doc: &ConfigDocument, env: EnvLookup) -> Result<SpotifyConfig, LoaderError> {
    let client_id = required(
        "client_id",
        env("SPOTIFY_CLIENT_ID").filter(|v| !v.trim().is_empty()).or_else(|| doc.client_id.clone())
    )?;
    let client_secret = required(
        "client_secret",
        env("SPOTIFY_CLIENT_SECRET").filter(|v| !v.trim().is_empty()).or_else(|| doc.client_secret.clone())
    )?;

    let token_url = endpoint(
        env,
        "SPOTIFY_TOKEN_URL",
        "https://accounts.spotify.com/api/token",
        "accounts.spotify.com"
    )?;
    let api_base = endpoint(
        env,
        "SPOTIFY_API_BASE",
        "https://api.spotify.com/v1/",
        "api.spotify.com"
    )?;

    Ok( SpotifyConfig {
        client_id,
        client_secret,
        token_url,
        api_base: with_trailing_slash(api_base)
    })
}

///
/// Destination table given as dataset.table
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub dataset: String,
    pub table: String
}

impl TableRef {
    pub fn parse(s: &str) -> Result<Self, LoaderError> {
        match s.trim().split_once('.') {
            Some((dataset, table))
                if !dataset.is_empty() && !table.is_empty() && !table.contains('.') => {
                Ok( Self { dataset: dataset.to_string(), table: table.to_string() } )
            }
            _ => Err(LoaderError::Config(
                format!("bq_table must be dataset.table, got {s:?}")
            ))
        }
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.dataset, self.table)
    }
}

#[derive(Debug, Clone)]
pub struct BigQueryConfig {
    pub project_id: String,
    pub table: TableRef,
    pub api_base: Url,
    pub access_token: Option<String>,  // skips ADC when set
    pub insert_batch_rows: usize
}

fn build_bigquery(doc: &ConfigDocument, env: EnvLookup) -> Result<BigQueryConfig, LoaderError> {
    let table = required("bq_table", doc.bq_table.clone())?;
    let table = TableRef::parse(&table)?;
    let project_id = required("bq_project_id", doc.bq_project_id.clone())?;

    let api_base = endpoint(
        env,
        "BQ_API_BASE",
        "https://bigquery.googleapis.com/bigquery/v2/",
        "bigquery.googleapis.com"
    )?;

    let access_token = env("BQ_ACCESS_TOKEN").filter(|t| !t.trim().is_empty());

    Ok( BigQueryConfig {
        project_id,
        table,
        api_base: with_trailing_slash(api_base),
        access_token,
        insert_batch_rows: BQ_INSERT_BATCH_ROWS
    })
}

///
/// What a single run searches for and where an optional csv snapshot goes
///
#[derive(Debug, Clone)]
pub struct CsvOutputConfig {
    pub dir: PathBuf,
    pub filename: String
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub queries: QueryTerms,
    pub search_limit: u32,
    pub csv: Option<CsvOutputConfig>
}

fn build_run(doc: &ConfigDocument) -> Result<RunConfig, LoaderError> {
    let queries = doc.queries.clone()
        .unwrap_or_else(|| QueryTerms::Single(DEFAULT_QUERY.to_string()));
    if queries.is_empty() {
        return Err(LoaderError::Config("queries must not be empty".to_string()));
    }

    let search_limit = doc.search_limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

    let csv = match (&doc.csv_dir, &doc.csv_filename) {
        (Some(dir), Some(filename)) => Some(CsvOutputConfig {
            dir: PathBuf::from(dir),
            filename: filename.clone()
        }),
        (None, None) => None,
        _ => return Err(LoaderError::Config(
            "csv_dir and csv_filename must be set together".to_string()
        )),
    };

    Ok( RunConfig { queries, search_limit, csv } )
}

///
/// Configuration for Http timeouts, pools, etc.
///
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: time::Duration,
    pub connect_timeout: time::Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: time::Duration,
    pub max_redirects: u8,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: time::Duration::from_millis(HTTP_TIMEOUT),
            connect_timeout: time::Duration::from_millis(HTTP_CONNECT_TIMEOUT),
            pool_max_idle_per_host: HTTP_POOL_MAX_IDLE,
            pool_idle_timeout: time::Duration::from_millis(HTTP_POOL_IDLE_TIMEOUT),
            max_redirects: HTTP_MAX_REDIRECTS,
        }
    }
}

///
/// Configuration for Logger
///

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter_directives: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub include_file_line: bool,
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter_directives: "info,rs_playlist_loader=debug,playlist_loader=debug,reqwest=warn"
                .to_string(),
            format: LogFormat::Json,
            with_ansi: true,
            include_file_line: true,
            include_target: true,
        }
    }
}

fn build_logging(env: EnvLookup) -> LoggingConfig {
    let mut logging = LoggingConfig::default();
    if let Some(format) = env("LOG_FORMAT") {
        logging.format = match format.trim().to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        };
    }
    logging
}

///
/// AppConfig which holds everything the pipeline stages need
///
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub spotify: SpotifyConfig,
    pub bigquery: BigQueryConfig,
    pub run: RunConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig
}

///
/// Builds the config from a yaml document. Malformed yaml is fatal.
///
pub fn parse_config(document: &str, env: EnvLookup) -> Result<AppConfig, LoaderError> {
    let doc: ConfigDocument = if document.trim().is_empty() {
        ConfigDocument::default()
    } else {
        serde_yaml::from_str(document)?
    };

    let spotify  = build_spotify(&doc, env)?;
    let bigquery = build_bigquery(&doc, env)?;
    let run      = build_run(&doc)?;
    let http     = HttpConfig::default();
    let logging  = build_logging(env);

    Ok( AppConfig { spotify, bigquery, run, http, logging } )
}

pub fn load_config_from(path: impl AsRef<Path>, env: EnvLookup) ->
    Result<AppConfig, LoaderError> {
    let path = path.as_ref();
    let document = std::fs::read_to_string(path)
        .map_err(|e| LoaderError::Config(format!("read {}: {e}", path.display())))?;
    parse_config(&document, env)
}

///
/// Return the full configuration to caller at program start.
///
pub fn load_config() -> Result<AppConfig, LoaderError> {
    dotenvy::dotenv().ok();

    let path = process_env("PLAYLIST_LOADER_CONFIG")
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    load_config_from(path, &process_env)
}
