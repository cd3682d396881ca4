//! OpenBeta GraphQL client.
//!
//! Fetch strategy: list all countries, then walk each country's area tree
//! collecting climbs from paginated leaf-area queries. A region whose first
//! page times out (or draws a 502/504 from the gateway) is too big for one
//! query; it is split into its child areas and each child is walked
//! recursively. USA and Canada are known to be too large up front and skip
//! straight to their children. When a later page of an already-started
//! region fails, the pages fetched so far are kept with a warning.

pub mod errors;
pub mod models;
pub mod queries;

use std::path::Path;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::climb_model::Climb;
use errors::{body_excerpt, ClientError};
use models::{AreasData, CountriesData, CountryRef, GraphqlResponse, PathChildrenData, UuidChildrenData};
use queries::{AREAS_QUERY, CHILDREN_BY_PATH_QUERY, CHILDREN_BY_UUID_QUERY, COUNTRIES_QUERY};

/// Countries too large for the API to answer in a single query.
const LARGE_REGIONS: &[&str] = &["USA", "Canada"];

const METADATA_TIMEOUT: Duration = Duration::from_secs(30);
const AREAS_TIMEOUT: Duration = Duration::from_secs(120);

/// Outcome of fetching one region's climbs directly.
enum RegionFetch {
    /// All pages fetched, or a later page failed and the earlier pages are
    /// returned as-is.
    Climbs(Vec<Climb>),
    /// First page timed out; the caller should split into children.
    Split,
    /// First page failed for a reason splitting will not fix.
    Failed(String),
}

pub struct OpenBetaClient {
    http: reqwest::Client,
    api_url: String,
    page_size: i64,
}

impl OpenBetaClient {
    pub fn new(api_url: impl Into<String>, page_size: i64) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(ClientError::Build)?;
        Ok(OpenBetaClient {
            http,
            api_url: api_url.into(),
            page_size,
        })
    }

    /// Walk every country and return the union of their climbs. Individual
    /// regions that fail are logged and skipped; only the initial countries
    /// query is fatal.
    pub async fn fetch_all_climbs(&self) -> Result<Vec<Climb>, ClientError> {
        log::info!("Fetching countries from {}...", self.api_url);
        let countries = self.fetch_countries().await?;
        log::info!("Found {} countries", countries.len());

        let total = countries.len();
        let mut climbs = Vec::new();
        for (index, country) in countries.into_iter().enumerate() {
            log::info!("[{}/{}] {}", index + 1, total, country.area_name);
            let country_climbs = self
                .fetch_region(vec![country.area_name], Some(country.uuid), 0)
                .await;
            climbs.extend(country_climbs);
        }

        log::info!("Total climbs fetched: {}", climbs.len());
        Ok(climbs)
    }

    pub async fn fetch_countries(&self) -> Result<Vec<CountryRef>, ClientError> {
        let data: CountriesData = self
            .post_graphql(COUNTRIES_QUERY, None, METADATA_TIMEOUT)
            .await?;
        Ok(data.countries)
    }

    /// Recursively fetch a region's climbs, splitting into children when the
    /// region is too large for a single paginated query.
    pub fn fetch_region(
        &self,
        tokens: Vec<String>,
        uuid: Option<String>,
        depth: usize,
    ) -> BoxFuture<'_, Vec<Climb>> {
        async move {
            let region_name = tokens.join(" > ");
            let indent = "  ".repeat(depth + 1);

            if let Some(country_uuid) = uuid.as_deref() {
                if tokens
                    .last()
                    .is_some_and(|t| LARGE_REGIONS.contains(&t.as_str()))
                {
                    log::info!("{indent}{region_name}: splitting (known large region)");
                    let children = self.fetch_children_by_uuid(country_uuid).await;
                    return self.walk_children(tokens, children, depth).await;
                }
            }

            match self.fetch_region_climbs(&tokens).await {
                RegionFetch::Climbs(climbs) => {
                    log::info!("{indent}{region_name}: {} climbs", climbs.len());
                    climbs
                }
                RegionFetch::Failed(reason) => {
                    log::warn!("{indent}{region_name}: failed ({reason})");
                    Vec::new()
                }
                RegionFetch::Split => {
                    log::info!("{indent}{region_name}: timeout, splitting into children...");
                    let children = match uuid.as_deref() {
                        Some(country_uuid) => self.fetch_children_by_uuid(country_uuid).await,
                        None => self.fetch_children_by_path(&tokens).await,
                    };
                    self.walk_children(tokens, children, depth).await
                }
            }
        }
        .boxed()
    }

    async fn walk_children(
        &self,
        tokens: Vec<String>,
        children: Vec<String>,
        depth: usize,
    ) -> Vec<Climb> {
        let indent = "  ".repeat(depth + 2);
        if children.is_empty() {
            log::warn!("{indent}no children found for {}", tokens.join(" > "));
            return Vec::new();
        }
        log::info!("{indent}found {} children", children.len());

        let mut climbs = Vec::new();
        for child in children {
            let mut child_tokens = tokens.clone();
            child_tokens.push(child);
            climbs.extend(self.fetch_region(child_tokens, None, depth + 1).await);
        }
        climbs
    }

    /// Page through the leaf areas under a token path, collecting climbs.
    async fn fetch_region_climbs(&self, tokens: &[String]) -> RegionFetch {
        let mut climbs: Vec<Climb> = Vec::new();
        let mut total_areas = 0usize;
        let mut offset: i64 = 0;

        loop {
            let variables = json!({
                "tokens": tokens,
                "limit": self.page_size,
                "offset": offset,
            });
            let page: AreasData = match self
                .post_graphql(AREAS_QUERY, Some(variables), AREAS_TIMEOUT)
                .await
            {
                Ok(page) => page,
                Err(err) if offset == 0 && err.is_split_signal() => return RegionFetch::Split,
                Err(err) if offset == 0 => return RegionFetch::Failed(err.to_string()),
                Err(err) => {
                    log::warn!(
                        "error at offset {offset}, keeping {} climbs already fetched: {err}",
                        climbs.len()
                    );
                    return RegionFetch::Climbs(climbs);
                }
            };

            let page_len = page.areas.len();
            total_areas += page_len;
            for mut area in page.areas {
                let area_climbs = std::mem::take(&mut area.climbs);
                for mut climb in area_climbs {
                    area.adopt_context(&mut climb);
                    climbs.push(climb);
                }
            }

            if page_len < self.page_size as usize {
                return RegionFetch::Climbs(climbs);
            }
            offset += self.page_size;

            // Progress heartbeat for very large regions.
            if offset % 1000 == 0 {
                log::info!(
                    "    ... fetched {total_areas} areas, {} climbs so far",
                    climbs.len()
                );
            }
        }
    }

    pub async fn fetch_children_by_uuid(&self, uuid: &str) -> Vec<String> {
        let variables = json!({ "uuid": uuid });
        match self
            .post_graphql::<UuidChildrenData>(CHILDREN_BY_UUID_QUERY, Some(variables), METADATA_TIMEOUT)
            .await
        {
            Ok(data) => data
                .area
                .map(|a| a.children.into_iter().map(|c| c.area_name).collect())
                .unwrap_or_default(),
            Err(err) => {
                log::debug!("child lookup by uuid {uuid} failed: {err}");
                Vec::new()
            }
        }
    }

    pub async fn fetch_children_by_path(&self, tokens: &[String]) -> Vec<String> {
        let variables = json!({ "tokens": tokens });
        match self
            .post_graphql::<PathChildrenData>(CHILDREN_BY_PATH_QUERY, Some(variables), METADATA_TIMEOUT)
            .await
        {
            Ok(data) => data
                .areas
                .into_iter()
                .next()
                .map(|a| a.children.into_iter().map(|c| c.area_name).collect())
                .unwrap_or_default(),
            Err(err) => {
                log::debug!("child lookup by path {tokens:?} failed: {err}");
                Vec::new()
            }
        }
    }

    async fn post_graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<Value>,
        timeout: Duration,
    ) -> Result<T, ClientError> {
        let payload = match variables {
            Some(variables) => json!({ "query": query, "variables": variables }),
            None => json!({ "query": query }),
        };

        let response = self
            .http
            .post(&self.api_url)
            .timeout(timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: self.api_url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ClientError::Transport {
                url: self.api_url.clone(),
                source,
            })?;

        if !status.is_success() {
            return Err(ClientError::Status {
                url: self.api_url.clone(),
                status,
                body: body_excerpt(&body),
            });
        }

        let parsed: GraphqlResponse<T> =
            serde_json::from_str(&body).map_err(ClientError::Decode)?;
        if !parsed.errors.is_empty() {
            let joined = parsed
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ClientError::Graphql(joined));
        }
        parsed.data.ok_or(ClientError::MissingData)
    }
}

/// Read climbs from a local JSON array, the shape a previous fetch dumps.
/// Lets the flatten/write stages run without touching the API.
pub fn load_climbs_from_file(path: &Path) -> Result<Vec<Climb>, ClientError> {
    let content = std::fs::read_to_string(path).map_err(|source| ClientError::File {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(ClientError::Decode)
}
