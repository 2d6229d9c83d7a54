//!
//! src/fetch.rs  Andrew Belles  Oct 4th, 2025
//!
//! Defines methods for hitting the spotify and bigquery endpoints and
//! returning unparsed json. No retries: a failed call ends the run
//!

use reqwest::{Client, header, redirect, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use url::Url;

use crate::auth::WarehouseAuth;
use crate::config::{BigQueryConfig, HttpConfig, SpotifyConfig, TableRef};
use crate::table::Table;
use crate::LoaderError;

/// Client building functionality
fn client_helper(http: &HttpConfig) -> reqwest::ClientBuilder {
    Client::builder()
        .timeout(http.timeout)
        .connect_timeout(http.connect_timeout)
        .pool_max_idle_per_host(http.pool_max_idle_per_host)
        .pool_idle_timeout(Some(http.pool_idle_timeout))
        .redirect(redirect::Policy::limited(http.max_redirects as usize))
}

pub fn base_client(http: &HttpConfig) -> Result<Client, LoaderError> {
    let mut h = header::HeaderMap::new();
    h.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
    client_helper(http)
        .default_headers(h)
        .build()
        .map_err(|e| LoaderError::Http(format!("build client: {e}")))
}

fn join(base: &Url, path: &str) -> Result<Url, LoaderError> {
    base.join(path)
        .map_err(|e| LoaderError::Config(format!("join {base} + {path}: {e}")))
}

/// Sends request and returns the json body, or an Http error with status
/// and body for anything outside 2xx
pub async fn send_json(request: RequestBuilder) -> Result<Value, LoaderError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<Value>().await?);
    }
    let body = response.text().await.unwrap_or_default();
    Err(LoaderError::Http(format!("status {status}: {body}")))
}

#[derive(Clone, Debug)]
pub struct SpotifyClient {
    pub http: Client,
    pub cfg: SpotifyConfig
}

impl SpotifyClient {
    pub fn new(http_config: &HttpConfig, cfg: &SpotifyConfig) ->
        Result<Self, LoaderError> {

        let http = base_client(http_config)?;
        Ok( Self {
            http,
            cfg: cfg.clone()
        })
    }

    pub fn token_request(&self) -> RequestBuilder {
        self.http
            .post(self.cfg.token_url.clone())
            .basic_auth(&self.cfg.client_id, Some(&self.cfg.client_secret))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
    }

    /// Client credential exchange, returns the bearer token
    pub async fn authorize(&self) -> Result<String, LoaderError> {
        let token = send_json(self.token_request())
            .await
            .map_err(|e| LoaderError::Auth(format!("spotify token: {e}")))?;
        token["access_token"].as_str()
            .map(str::to_string)
            .ok_or_else(|| LoaderError::Auth("no access_token in response".into()))
    }

    /// GET /v1/search?type=playlist&q=...&limit=
    pub fn search_playlists(&self, query: &str, limit: u32, bearer: &str) ->
        Result<RequestBuilder, LoaderError> {
        let url = join(&self.cfg.api_base, "search")?;
        let limit = limit.to_string();
        Ok( self.http.get(url).bearer_auth(bearer).query(&[
            ("type", "playlist"),
            ("q", query),
            ("limit", limit.as_str())
        ]))
    }

    /// GET /v1/playlists/{id}/tracks, first page only
    pub fn playlist_items(&self, playlist_id: &str, bearer: &str) ->
        Result<RequestBuilder, LoaderError> {
        let url = join(&self.cfg.api_base, &format!("playlists/{playlist_id}/tracks"))?;
        Ok( self.http.get(url).bearer_auth(bearer).query(&[
            ("additional_types", "track")
        ]))
    }
}

#[derive(Clone, Debug)]
pub struct BigQueryClient {
    pub http: Client,
    pub cfg: BigQueryConfig,
    pub auth: WarehouseAuth
}

impl BigQueryClient {
    pub fn new(http_config: &HttpConfig, cfg: &BigQueryConfig) ->
        Result<Self, LoaderError> {
        let http = base_client(http_config)?;
        let auth = WarehouseAuth::from_config(cfg.access_token.as_deref());
        Ok( Self { http, cfg: cfg.clone(), auth } )
    }

    /// projects/{p}/datasets/{d}/tables followed by suffix
    fn tables_url(&self, table: &TableRef, suffix: &str) -> Result<Url, LoaderError> {
        join(&self.cfg.api_base, &format!(
            "projects/{}/datasets/{}/tables{suffix}",
            self.cfg.project_id, table.dataset
        ))
    }

    /// GET projects/{p}/datasets/{d}/tables/{t}, Ok(false) on 404
    pub async fn table_exists(&self, table: &TableRef, bearer: &str) ->
        Result<bool, LoaderError> {
        let url = self.tables_url(table, &format!("/{}", table.table))?;
        let response = self.http.get(url).bearer_auth(bearer).send().await?;
        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            s => {
                let body = response.text().await.unwrap_or_default();
                Err(LoaderError::Warehouse(format!("get table {table}: status {s}: {body}")))
            }
        }
    }

    /// POST projects/{p}/datasets/{d}/tables with a schema taken from data
    pub async fn create_table(&self, table: &TableRef, data: &Table, bearer: &str) ->
        Result<(), LoaderError> {
        let url = self.tables_url(table, "")?;
        let fields: Vec<Value> = data.columns().iter()
            .map(|c| json!({
                "name": c.name,
                "type": c.kind.bigquery_name(),
                "mode": "NULLABLE"
            }))
            .collect();
        let body = json!({
            "tableReference": {
                "projectId": self.cfg.project_id,
                "datasetId": table.dataset,
                "tableId": table.table
            },
            "schema": { "fields": fields }
        });

        send_json(self.http.post(url).bearer_auth(bearer).json(&body))
            .await
            .map_err(|e| LoaderError::Warehouse(format!("create table {table}: {e}")))?;
        Ok(())
    }

    /// POST .../tables/{t}/insertAll
    pub fn insert_all(&self, table: &TableRef, body: &Value, bearer: &str) ->
        Result<RequestBuilder, LoaderError> {
        let url = self.tables_url(table, &format!("/{}/insertAll", table.table))?;
        Ok( self.http.post(url).bearer_auth(bearer).json(body) )
    }
}
