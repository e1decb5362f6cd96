//! Query facade over the headless content store.
//!
//! Show/performance documents live in an external content API queried
//! with GROQ expressions. This module translates the UI's filter and sort
//! selections into those expressions and executes them. A fresh query is
//! issued on every filter change; search results are never cached.
//! Product-page lookups by slug are cached briefly, like any other
//! product data.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;

use ciclo_core::Slug;

use crate::config::CatalogConfig;
use crate::models::Product;

/// Sort key for catalog searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchSort {
    /// Catalog order.
    #[default]
    Default,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Best rated first.
    RatingDesc,
}

impl SearchSort {
    /// Parse the URL parameter value; anything unknown is the default.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "lowest" => Self::PriceAsc,
            "highest" => Self::PriceDesc,
            "toprated" => Self::RatingDesc,
            _ => Self::Default,
        }
    }

    const fn order_clause(self) -> Option<&'static str> {
        match self {
            Self::Default => None,
            Self::PriceAsc => Some("| order(price asc)"),
            Self::PriceDesc => Some("| order(price desc)"),
            Self::RatingDesc => Some("| order(rating desc)"),
        }
    }
}

/// Filter and sort selections from the search controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    /// Restrict to one category; `None` means all.
    pub category: Option<String>,
    /// Free-text match against the show name; `None` means all.
    pub query: Option<String>,
    /// Sort key.
    pub sort: SearchSort,
}

/// Projection shared by every product query: resolves the poster image
/// reference to a plain CDN URL.
const PRODUCT_PROJECTION: &str = "{_id, name, slug, price, \"image\": image.asset->url, countInStock, description, category, rating}";

/// GROQ string literals cannot carry user input verbatim.
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Build the GROQ expression for a search over product documents.
#[must_use]
pub fn build_search_query(filters: &SearchFilters) -> String {
    let mut groq = String::from("*[_type == \"product\"");
    if let Some(category) = &filters.category {
        groq.push_str(&format!(" && category match \"{}\"", escape(category)));
    }
    if let Some(query) = &filters.query {
        groq.push_str(&format!(" && name match \"{}\"", escape(query)));
    }
    groq.push(']');
    groq.push_str(PRODUCT_PROJECTION);
    if let Some(order) = filters.sort.order_clause() {
        groq.push(' ');
        groq.push_str(order);
    }
    groq
}

/// Build the GROQ expression fetching one product by slug.
fn build_slug_query(slug: &Slug) -> String {
    format!(
        "*[_type == \"product\" && slug.current == \"{}\"]{PRODUCT_PROJECTION}[0]",
        escape(slug.as_str())
    )
}

/// Errors from content API queries.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request never produced a response.
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The content API rejected the query.
    #[error("catalog query failed ({status}): {message}")]
    Query {
        /// HTTP status of the response.
        status: StatusCode,
        /// Response body excerpt.
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: Option<T>,
}

/// Client for the content API.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    slug_cache: Cache<Slug, Product>,
}

impl CatalogClient {
    /// Create a new content API client.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        let endpoint = format!(
            "https://{}.api.sanity.io/v{}/data/query/{}",
            config.project_id, config.api_version, config.dataset
        );
        let slug_cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300))
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                http: reqwest::Client::new(),
                endpoint,
                token: config
                    .token
                    .as_ref()
                    .map(|token| token.expose_secret().to_owned()),
                slug_cache,
            }),
        }
    }

    /// Execute a GROQ query.
    async fn query<T: DeserializeOwned>(&self, groq: &str) -> Result<Option<T>, CatalogError> {
        let mut request = self
            .inner
            .http
            .get(&self.inner.endpoint)
            .query(&[("query", groq)]);
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "Catalog query rejected");
            return Err(CatalogError::Query {
                status,
                message: body.chars().take(200).collect(),
            });
        }

        let parsed: QueryResponse<T> = response.json().await?;
        Ok(parsed.result)
    }

    /// Run a search with the given filters.
    ///
    /// Returns a finite result list for this request; the next filter
    /// change issues a fresh query.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the query cannot be executed.
    #[instrument(skip(self))]
    pub async fn search(&self, filters: &SearchFilters) -> Result<Vec<Product>, CatalogError> {
        let groq = build_search_query(filters);
        Ok(self.query(&groq).await?.unwrap_or_default())
    }

    /// Fetch one product by its routing slug, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the query cannot be executed.
    #[instrument(skip(self))]
    pub async fn product_by_slug(&self, slug: &Slug) -> Result<Option<Product>, CatalogError> {
        if let Some(cached) = self.inner.slug_cache.get(slug).await {
            return Ok(Some(cached));
        }

        let product: Option<Product> = self.query(&build_slug_query(slug)).await?;
        if let Some(product) = &product {
            self.inner
                .slug_cache
                .insert(slug.clone(), product.clone())
                .await;
        }
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parse() {
        assert_eq!(SearchSort::parse("lowest"), SearchSort::PriceAsc);
        assert_eq!(SearchSort::parse("highest"), SearchSort::PriceDesc);
        assert_eq!(SearchSort::parse("toprated"), SearchSort::RatingDesc);
        assert_eq!(SearchSort::parse("default"), SearchSort::Default);
        assert_eq!(SearchSort::parse("anything"), SearchSort::Default);
    }

    #[test]
    fn test_build_search_query_unfiltered() {
        let groq = build_search_query(&SearchFilters::default());
        assert!(groq.starts_with("*[_type == \"product\"]"));
        assert!(groq.contains("\"image\": image.asset->url"));
        assert!(!groq.contains("order("));
    }

    #[test]
    fn test_build_search_query_with_filters_and_sort() {
        let filters = SearchFilters {
            category: Some("Teatro".to_string()),
            query: Some("noite".to_string()),
            sort: SearchSort::PriceAsc,
        };
        let groq = build_search_query(&filters);
        assert!(groq.contains("&& category match \"Teatro\""));
        assert!(groq.contains("&& name match \"noite\""));
        assert!(groq.ends_with("| order(price asc)"));
    }

    #[test]
    fn test_build_search_query_escapes_quotes() {
        let filters = SearchFilters {
            category: None,
            query: Some("a\"] | *".to_string()),
            sort: SearchSort::Default,
        };
        let groq = build_search_query(&filters);
        assert!(groq.contains("name match \"a\\\"] | *\""));
    }

    #[test]
    fn test_build_slug_query() {
        let groq = build_slug_query(&Slug::new("noite-de-fado"));
        assert!(groq.contains("slug.current == \"noite-de-fado\""));
        assert!(groq.ends_with("[0]"));
    }
}
