//! Upstream translation platform access.

use std::time::Duration;

use scraper::{
    Html,
    Selector,
};
use thiserror::Error;

use crate::codec::{
    TreeError,
    tree_from_yaml,
};
use crate::config::SyncSettings;
use crate::types::{
    LanguageRecord,
    Tree,
};

#[derive(Error, Debug)]
pub enum ProviderError {
    /// Request failed or returned an error status
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The language listing page could not be interpreted
    #[error("Failed to read language table: {0}")]
    Html(String),
    /// The export is not valid YAML
    #[error("Failed to parse export for '{code}': {source}")]
    Yaml {
        code: String,
        #[source]
        source: serde_norway::Error,
    },
    /// The export has an unexpected shape
    #[error("Unexpected export structure for '{code}': {source}")]
    Tree {
        code: String,
        #[source]
        source: TreeError,
    },
    /// Client setup failed
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Source of upstream translations.
#[allow(async_fn_in_trait)]
pub trait SourceProvider {
    /// Lists every language the platform offers.
    async fn languages(&self) -> Result<Vec<LanguageRecord>, ProviderError>;

    /// Fetches the raw export for `code`, root key included.
    async fn fetch(&self, code: &str) -> Result<Tree, ProviderError>;
}

/// Provider backed by the platform's web pages.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: reqwest::Client,
    settings: SyncSettings,
}

impl HttpProvider {
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(settings: &SyncSettings) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ProviderError::Client)?;

        Ok(Self { client, settings: settings.clone() })
    }

    async fn get_text(&self, url: &str) -> Result<String, ProviderError> {
        tracing::debug!(url, "GET");
        let to_error = |source| ProviderError::Http { url: url.to_string(), source };

        self.client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(to_error)?
            .text()
            .await
            .map_err(to_error)
    }
}

impl SourceProvider for HttpProvider {
    async fn languages(&self) -> Result<Vec<LanguageRecord>, ProviderError> {
        let html = self.get_text(&self.settings.languages_url).await?;
        parse_language_table(&html)
    }

    async fn fetch(&self, code: &str) -> Result<Tree, ProviderError> {
        let body = self.get_text(&self.settings.export_url(code)).await?;
        parse_export(code, &body)
    }
}

/// Reads language records from the first table of an HTML page.
///
/// The first cell of each row holds the code, the second the display name.
/// Header rows (without `td` cells) are skipped.
pub fn parse_language_table(html: &str) -> Result<Vec<LanguageRecord>, ProviderError> {
    let document = Html::parse_document(html);
    let table_selector =
        Selector::parse("table").map_err(|e| ProviderError::Html(format!("{e}")))?;
    let row_selector = Selector::parse("tr").map_err(|e| ProviderError::Html(format!("{e}")))?;
    let cell_selector = Selector::parse("td").map_err(|e| ProviderError::Html(format!("{e}")))?;

    let Some(table) = document.select(&table_selector).next() else {
        return Err(ProviderError::Html("no table found".to_string()));
    };

    let mut records = Vec::new();
    for row in table.select(&row_selector) {
        let mut cells =
            row.select(&cell_selector).map(|cell| cell.text().collect::<String>().trim().to_string());
        let (Some(code), Some(name)) = (cells.next(), cells.next()) else {
            continue;
        };
        if code.is_empty() {
            continue;
        }
        records.push(LanguageRecord::new(code, name));
    }

    if records.is_empty() {
        return Err(ProviderError::Html("language table has no rows".to_string()));
    }
    Ok(records)
}

/// Parses a YAML export into a tree.
pub fn parse_export(code: &str, body: &str) -> Result<Tree, ProviderError> {
    let value: serde_norway::Value = serde_norway::from_str(body)
        .map_err(|source| ProviderError::Yaml { code: code.to_string(), source })?;
    tree_from_yaml(&value).map_err(|source| ProviderError::Tree { code: code.to_string(), source })
}
