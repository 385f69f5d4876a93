//! HTTP access to the content API, optionally through a URL-rewriting relay.

use image::DynamicImage;
use log::debug;
use serde_json::Value;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::model::{ChapterId, ChapterImages, Listing, ManhwaDetail};
use crate::nav::{ListQuery, View};
use crate::normalize;

#[derive(Clone, Debug, PartialEq)]
pub struct Endpoints {
    api_base: String,
    relay: Option<String>,
}

impl Endpoints {
    pub fn new(api_base: impl Into<String>, relay: Option<String>) -> Self {
        Self {
            api_base: api_base.into(),
            relay,
        }
    }

    pub fn list_path(query: &ListQuery) -> String {
        let mature = u8::from(query.mature);
        match &query.view {
            View::Home => format!("/manwha/home/{}?mature={}", query.page, mature),
            View::Popular => format!("/manwha/popular/{}?mature={}", query.page, mature),
            View::Search(q) => format!(
                "/search/{}/{}?mature={}",
                urlencoding::encode(q),
                query.page,
                mature
            ),
        }
    }

    pub fn detail_path(manhwa_id: &str) -> String {
        format!("/manwha/{}", urlencoding::encode(manhwa_id))
    }

    pub fn chapter_path(manhwa_id: &str, chapter: &ChapterId) -> String {
        format!(
            "/manwha/{}/{}",
            urlencoding::encode(manhwa_id),
            urlencoding::encode(chapter.as_str())
        )
    }

    /// Full request URL for an API path. Through the relay the whole target
    /// URL, query string included, is percent-encoded once more.
    pub fn url(&self, path: &str) -> String {
        let target = format!("{}{}", self.api_base, path);
        match &self.relay {
            Some(relay) => format!("{}{}", relay, urlencoding::encode(&target)),
            None => target,
        }
    }
}

#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl Client {
    pub fn new(endpoints: Endpoints) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("rmanhwa/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, endpoints }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(Endpoints::new(
            settings.api_base.clone(),
            settings.relay.clone(),
        ))
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {url}");
        let resp = self.http.get(url).send().await?.error_for_status()?;
        Ok(resp.bytes().await?.to_vec())
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let body = self.get_bytes(&self.endpoints.url(path)).await?;
        serde_json::from_slice(&body).map_err(|e| Error::InvalidResponseShape(e.to_string()))
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Listing> {
        let body = self.get_json(&Endpoints::list_path(query)).await?;
        normalize::listing(body)
    }

    pub async fn detail(&self, manhwa_id: &str) -> Result<ManhwaDetail> {
        let body = self.get_json(&Endpoints::detail_path(manhwa_id)).await?;
        normalize::detail(body)
    }

    pub async fn chapter(&self, manhwa_id: &str, chapter: &ChapterId) -> Result<ChapterImages> {
        let body = self
            .get_json(&Endpoints::chapter_path(manhwa_id, chapter))
            .await?;
        normalize::chapter_images(body)
    }

    /// Images are fetched straight from their host, never through the relay.
    pub async fn image(&self, url: &str) -> Result<DynamicImage> {
        let bytes = self.get_bytes(url).await?;
        image::load_from_memory(&bytes).map_err(|e| Error::Image(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(view: View, page: u32, mature: bool) -> ListQuery {
        ListQuery { view, page, mature }
    }

    #[test]
    fn list_paths_per_view() {
        assert_eq!(
            Endpoints::list_path(&query(View::Home, 1, false)),
            "/manwha/home/1?mature=0"
        );
        assert_eq!(
            Endpoints::list_path(&query(View::Popular, 3, true)),
            "/manwha/popular/3?mature=1"
        );
        assert_eq!(
            Endpoints::list_path(&query(View::Search("solo leveling".into()), 2, false)),
            "/search/solo%20leveling/2?mature=0"
        );
    }

    #[test]
    fn detail_and_chapter_paths() {
        assert_eq!(Endpoints::detail_path("tower-of-god"), "/manwha/tower-of-god");
        assert_eq!(
            Endpoints::chapter_path("tower-of-god", &ChapterId::from("12")),
            "/manwha/tower-of-god/12"
        );
    }

    #[test]
    fn relay_encodes_the_whole_target() {
        let endpoints = Endpoints::new(
            "https://api.test/api",
            Some("https://relay.test/raw?url=".to_string()),
        );
        assert_eq!(
            endpoints.url("/manwha/home/1?mature=0"),
            "https://relay.test/raw?url=https%3A%2F%2Fapi.test%2Fapi%2Fmanwha%2Fhome%2F1%3Fmature%3D0"
        );
    }

    #[test]
    fn search_query_is_encoded_twice_through_relay() {
        let endpoints = Endpoints::new("https://api.test/api", Some("R?u=".to_string()));
        let path = Endpoints::list_path(&query(View::Search("a b".into()), 1, false));
        assert_eq!(
            endpoints.url(&path),
            "R?u=https%3A%2F%2Fapi.test%2Fapi%2Fsearch%2Fa%2520b%2F1%3Fmature%3D0"
        );
    }

    #[test]
    fn direct_mode_concatenates() {
        let endpoints = Endpoints::new("http://localhost:9000/api", None);
        assert_eq!(
            endpoints.url("/manwha/x"),
            "http://localhost:9000/api/manwha/x"
        );
    }
}
