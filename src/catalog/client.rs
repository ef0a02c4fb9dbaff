use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::CatalogSettings;

use super::model::{ErrorBody, Track, VideoDetails, VideoList};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The proxy rejects empty searches; we do too, without a round trip.
    #[error("search query is required")]
    EmptyQuery,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("catalog returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Source of track lists consumed by the presentation layer.
pub trait CatalogProvider {
    fn search(&self, query: &str, max_results: u32) -> Result<Vec<Track>, CatalogError>;
    fn trending(&self, max_results: u32) -> Result<Vec<Track>, CatalogError>;
    fn video_details(&self, video_id: &str) -> Result<Track, CatalogError>;

    /// Cheap reachability probe.
    fn health(&self) -> Result<(), CatalogError> {
        Ok(())
    }
}

/// Blocking HTTP client for the Muse catalog proxy.
pub struct CatalogClient {
    http: reqwest::blocking::Client,
    base_url: String,
    trending_category: Option<String>,
}

impl CatalogClient {
    pub fn new(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            trending_category: settings
                .trending_category
                .clone()
                .filter(|c| !c.trim().is_empty()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, CatalogError> {
        let url = self.url(path);
        log::debug!("catalog: GET {url} {query:?}");

        let response = self.http.get(&url).query(query).send()?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .map(|b| b.error)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").to_string());
            log::warn!("catalog: {url} failed with {status}: {message}");
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>()?)
    }

    /// Most popular music videos within a single platform category.
    pub fn trending_category(&self, category_id: &str, max_results: u32) -> Result<Vec<Track>, CatalogError> {
        let list: VideoList = self.get(
            &format!("trending/category/{category_id}"),
            &[("maxResults", max_results.to_string())],
        )?;
        Ok(list.videos.into_iter().map(Track::from).collect())
    }
}

impl CatalogProvider for CatalogClient {
    fn search(&self, query: &str, max_results: u32) -> Result<Vec<Track>, CatalogError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CatalogError::EmptyQuery);
        }

        let list: VideoList = self.get(
            "search",
            &[("q", query.to_string()), ("maxResults", max_results.to_string())],
        )?;
        Ok(list.videos.into_iter().map(Track::from).collect())
    }

    fn trending(&self, max_results: u32) -> Result<Vec<Track>, CatalogError> {
        if let Some(category) = self.trending_category.as_deref() {
            return self.trending_category(category, max_results);
        }

        let list: VideoList = self.get("trending", &[("maxResults", max_results.to_string())])?;
        Ok(list.videos.into_iter().map(Track::from).collect())
    }

    fn video_details(&self, video_id: &str) -> Result<Track, CatalogError> {
        let details: VideoDetails = self.get(&format!("search/{video_id}"), &[])?;
        Ok(Track::from(details.video))
    }

    /// Any 2xx from `/health` counts as healthy.
    fn health(&self) -> Result<(), CatalogError> {
        let url = self.url("health");
        let status = self.http.get(&url).send()?.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(CatalogError::Status {
                status: status.as_u16(),
                message: "health check failed".to_string(),
            })
        }
    }
}
