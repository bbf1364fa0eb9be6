//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat, PageArgs};
use crate::config::ClientConfig;
use crate::decode::{EnvelopeDecoder, ResponseDecoder};
use crate::error::Result;
use crate::fetch::{Fetcher, RequestConfig};
use crate::http::HttpFetcher;
use crate::iterator::PageIterator;
use crate::pagination::PaginationState;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::List {
                path,
                query,
                max_items,
            } => {
                for item in self.list(path, query, *max_items).await? {
                    self.output(&item);
                }
                Ok(())
            }
            Commands::Page { path, query } => {
                let page = self.page(path, query).await?;
                self.output(&page);
                Ok(())
            }
            Commands::Get { path, params } => {
                let response = self.get(path, params).await?;
                self.output(&response);
                Ok(())
            }
        }
    }

    /// Items from the starting page onward, up to `max_items`
    pub async fn list(
        &self,
        path: &str,
        query: &PageArgs,
        max_items: Option<usize>,
    ) -> Result<Vec<Value>> {
        let started = Instant::now();
        let mut iter = self.build_iterator(path, query)?;

        let mut items = Vec::new();
        while max_items.map_or(true, |max| items.len() < max) {
            match iter.next().await? {
                Some(item) => items.push(item.clone()),
                None => break,
            }
        }

        info!(
            "Listed {} items from {} in {}ms",
            items.len(),
            path,
            started.elapsed().as_millis()
        );
        Ok(items)
    }

    /// One page with its pagination block and message
    pub async fn page(&self, path: &str, query: &PageArgs) -> Result<Value> {
        let mut iter = self.build_iterator(path, query)?;
        let data = serde_json::to_value(iter.get_page().await?)?;

        Ok(json!({
            "data": data,
            "page": iter.pagination(),
            "message": iter.message(),
        }))
    }

    /// One decoded response, fetched without pagination parameters
    pub async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value> {
        let fetcher = HttpFetcher::with_config(self.load_config()?)?;
        let request = request_template(params);

        let raw = fetcher.fetch(path, &request).await?;
        let envelope = EnvelopeDecoder::new().decode(raw).await?;
        debug!("Decoded {} record(s) from {}", envelope.data.len(), path);

        Ok(json!({
            "message": envelope.message,
            "data": envelope.data,
        }))
    }

    /// Load client configuration, applying command-line overrides
    pub fn load_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };

        if let Some(ref base_url) = self.cli.base_url {
            config = config.with_base_url(base_url.clone());
        }
        Ok(config)
    }

    fn build_iterator(&self, path: &str, query: &PageArgs) -> Result<PageIterator<HttpFetcher>> {
        let mut config = self.load_config()?;
        if let Some(items_per_page) = query.items_per_page {
            config = config.with_items_per_page(items_per_page);
        }

        let pagination = PaginationState::with_page(query.page.unwrap_or(1))
            .with_items_per_page(config.items_per_page);
        let fetcher = HttpFetcher::with_config(config)?;

        Ok(PageIterator::new(fetcher, path)
            .with_request(request_template(&query.params))
            .with_pagination(pagination))
    }

    /// Output a value to stdout
    fn output(&self, value: &Value) {
        println!("{}", render(value, self.cli.format));
    }
}

/// Request template carrying the given query parameters
fn request_template(params: &[(String, String)]) -> RequestConfig {
    params
        .iter()
        .fold(RequestConfig::new(), |request, (key, value)| {
            request.param(key.as_str(), value.as_str())
        })
}

/// Render a value in the requested format
fn render(value: &Value, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(value).unwrap_or_default(),
        OutputFormat::Pretty => serde_json::to_string_pretty(value).unwrap_or_default(),
    }
}
