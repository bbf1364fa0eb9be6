//! Page iterator module
//!
//! Walks a paged endpoint as one logical sequence.
//!
//! # Overview
//!
//! A [`PageIterator`] keeps a global `cursor` over every item the endpoint can
//! return, plus the `offset` of the first item of the page it currently holds.
//! Navigation calls fetch pages on demand through the injected
//! [`Fetcher`], normalize them with a [`ResponseDecoder`] and adopt the
//! server's page descriptor as authoritative.
//!
//! ```rust,ignore
//! use pagewalk::{HttpFetcher, PageIterator, ClientConfig};
//!
//! let fetcher = HttpFetcher::with_config(ClientConfig::new().with_base_url("https://api.example.com"))?;
//! let mut books = PageIterator::<_, Book>::new(fetcher, "/book/list");
//! while let Some(book) = books.next().await? {
//!     println!("{}", book.book_name);
//! }
//! ```
//!
//! Failed fetches are reported twice: as the `Err` of the call and through
//! [`PageIterator::err`] / [`PageIterator::message`]. The page that was
//! cached before the failure stays in place, so the same call can be retried.

use crate::decode::{EnvelopeDecoder, ResponseData, ResponseDecoder, ResponseEnvelope};
use crate::error::{Error, FetchFailure, Result};
use crate::fetch::{Fetcher, RequestConfig};
use crate::pagination::PaginationState;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Stateful cursor over a paged endpoint
pub struct PageIterator<F, T = Value> {
    /// Fetch capability
    fetcher: F,
    /// Envelope decoder
    decoder: Arc<dyn ResponseDecoder>,
    /// Resource path handed to the fetcher
    path: String,
    /// Caller's request template; never mutated
    template: RequestConfig,
    /// Page descriptor last adopted
    pagination: PaginationState,
    /// Global 0-based item position
    cursor: u64,
    /// Global position of the first cached item
    offset: u64,
    /// Records of the current page
    page: ResponseData<T>,
    /// Set once the endpoint answers with a single record
    single_item: bool,
    /// Whether any response has been adopted yet
    loaded: bool,
    last_error: Option<FetchFailure>,
    last_message: String,
    envelope_message: String,
}

impl<F, T> PageIterator<F, T>
where
    F: Fetcher,
    T: DeserializeOwned,
{
    /// Create an iterator over `path` with the default envelope decoder
    pub fn new(fetcher: F, path: impl Into<String>) -> Self {
        Self {
            fetcher,
            decoder: Arc::new(EnvelopeDecoder::new()),
            path: path.into(),
            template: RequestConfig::default(),
            pagination: PaginationState::default(),
            cursor: 0,
            offset: 0,
            page: ResponseData::default(),
            single_item: false,
            loaded: false,
            last_error: None,
            last_message: String::new(),
            envelope_message: String::new(),
        }
    }

    /// Set the request template every fetch is derived from
    #[must_use]
    pub fn with_request(mut self, template: RequestConfig) -> Self {
        self.template = template;
        self
    }

    /// Start from a given pagination (page, page size)
    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationState) -> Self {
        self.pagination = pagination;
        self.offset = pagination.offset();
        self.cursor = self.offset;
        self
    }

    /// Use a custom envelope decoder
    #[must_use]
    pub fn with_decoder(mut self, decoder: impl ResponseDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    /// Prime the iterator with a response fetched elsewhere.
    ///
    /// The envelope is adopted exactly like a fetched one, and its message
    /// becomes the fallback for [`PageIterator::message`].
    pub fn with_initial_response(mut self, envelope: ResponseEnvelope) -> Result<Self> {
        let envelope = convert_envelope(envelope)?;
        let pagination = self.pagination;
        self.adopt(envelope, pagination);
        self.cursor = self.offset;
        Ok(self)
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Change the page size and reload the current page.
    ///
    /// Sizes outside `1..=500` are ignored: nothing changes, nothing is
    /// fetched, and `Ok(false)` is returned.
    pub async fn set_items_per_page(&mut self, items_per_page: u32) -> Result<bool> {
        if !PaginationState::is_valid_items_per_page(i64::from(items_per_page)) {
            debug!(
                "Ignoring items_per_page {} for {}: outside the accepted range",
                items_per_page, self.path
            );
            return Ok(false);
        }

        let target = PaginationState {
            items_per_page,
            ..self.pagination
        };
        self.navigate(target).await?;
        Ok(true)
    }

    /// The cached page, fetching it first if nothing is cached
    pub async fn get_page(&mut self) -> Result<&ResponseData<T>> {
        if self.page.is_empty() {
            self.fetch(self.pagination).await?;
        }
        Ok(&self.page)
    }

    /// The item under the cursor, fetching first if nothing is cached
    pub async fn current(&mut self) -> Result<&T> {
        if self.page.is_empty() {
            self.fetch(self.pagination).await?;
        }

        if let ResponseData::Single(item) = &self.page {
            return Ok(item);
        }

        let len = self.page.len();
        match self.local_index().and_then(|index| self.page.get(index)) {
            Some(item) => Ok(item),
            None => Err(Error::IndexOutOfRange {
                index: self.cursor as i64 - self.offset as i64,
                len,
            }),
        }
    }

    /// Load page `page`, clamped into `[1, total_pages]`
    pub async fn go_to_page(&mut self, page: u32) -> Result<&ResponseData<T>> {
        self.ensure_paged()?;
        let target = self.page_target(i64::from(page));
        self.navigate(target).await
    }

    /// Load the page before the current one (never before page 1)
    pub async fn previous_page(&mut self) -> Result<&ResponseData<T>> {
        self.ensure_paged()?;
        let target = self.page_target(i64::from(self.pagination.current_page) - 1);
        self.navigate(target).await
    }

    /// Load the page after the current one (never past the last page)
    pub async fn next_page(&mut self) -> Result<&ResponseData<T>> {
        self.ensure_paged()?;
        let target = self.page_target(i64::from(self.pagination.current_page) + 1);
        self.navigate(target).await
    }

    /// Advance the cursor by one item.
    ///
    /// Returns `Ok(None)` once no item exists past the cursor. The first call
    /// on a fresh iterator fetches and returns the first item of the page.
    pub async fn next(&mut self) -> Result<Option<&T>> {
        if self.single_item {
            return Ok(None);
        }

        if !self.loaded {
            self.fetch(self.pagination).await?;
            if let ResponseData::Single(item) = &self.page {
                return Ok(Some(item));
            }
            self.cursor = self.offset;
            return Ok(self.page.get(0));
        }

        let end = self.known_end();
        if self.cursor >= end {
            return Ok(None);
        }

        self.cursor += 1;
        if self.cursor >= end {
            return Ok(None);
        }

        if self.local_index().map_or(true, |index| index >= self.page.len()) {
            let target = self.page_target(i64::from(self.pagination.current_page) + 1);
            if let Err(err) = self.fetch(target).await {
                self.cursor -= 1;
                return Err(err);
            }
        }

        Ok(self.local_index().and_then(|index| self.page.get(index)))
    }

    /// Every item from the cursor onward, in order.
    ///
    /// The item currently under the cursor is included when one is cached.
    pub async fn collect_all(&mut self) -> Result<Vec<T>>
    where
        T: Clone,
    {
        let mut items = Vec::new();

        if self.loaded {
            if let ResponseData::Single(item) = &self.page {
                return Ok(vec![item.clone()]);
            }
            if let Some(item) = self.local_index().and_then(|index| self.page.get(index)) {
                items.push(item.clone());
            }
        }

        while let Some(item) = self.next().await? {
            items.push(item.clone());
        }
        Ok(items)
    }

    // ========================================================================
    // Fetch protocol
    // ========================================================================

    /// Fetch with `target` pagination, adopting the result on success.
    ///
    /// On failure nothing but the captured error and message changes.
    async fn fetch(&mut self, target: PaginationState) -> Result<()> {
        let request = self.template.with_pagination(&target);
        debug!(
            "Fetching {} page {} ({} per page)",
            self.path, target.current_page, target.items_per_page
        );

        match self.load(&request).await {
            Ok(envelope) => {
                self.adopt(envelope, target);
                Ok(())
            }
            Err(err) => Err(self.capture(err)),
        }
    }

    async fn load(&self, request: &RequestConfig) -> Result<ResponseEnvelope<T>> {
        let raw = self.fetcher.fetch(&self.path, request).await?;
        let envelope = self.decoder.decode(raw).await?;
        convert_envelope(envelope)
    }

    fn adopt(&mut self, envelope: ResponseEnvelope<T>, requested: PaginationState) {
        // The server's page block wins over what we asked for
        self.pagination = envelope.pagination.unwrap_or(requested);
        self.offset = self.pagination.offset();

        if envelope.data.is_single() && !self.single_item {
            debug!("{} returned a single record; page navigation disabled", self.path);
            self.single_item = true;
        }
        self.page = envelope.data;

        self.last_message.clone_from(&envelope.message);
        self.envelope_message = envelope.message;
        self.last_error = None;
        self.loaded = true;

        debug!(
            "Adopted {} page {}/{}: {} items at offset {}",
            self.path,
            self.pagination.current_page,
            self.pagination.total_pages,
            self.page.len(),
            self.offset
        );
    }

    fn capture(&mut self, err: Error) -> Error {
        let failure = FetchFailure::from(err);
        warn!(
            "Fetch of {} failed, keeping page {}: {}",
            self.path, self.pagination.current_page, failure
        );
        self.last_message = failure.message().to_string();
        self.last_error = Some(failure.clone());
        Error::Fetch(failure)
    }

    async fn navigate(&mut self, target: PaginationState) -> Result<&ResponseData<T>> {
        self.fetch(target).await?;
        self.cursor = self.offset;
        Ok(&self.page)
    }

    fn ensure_paged(&self) -> Result<()> {
        if self.single_item {
            Err(Error::SingleItemMode)
        } else {
            Ok(())
        }
    }

    fn page_target(&self, page: i64) -> PaginationState {
        PaginationState {
            current_page: self.pagination.clamp_page(page),
            ..self.pagination
        }
    }

    /// Cursor position within the cached page
    fn local_index(&self) -> Option<usize> {
        self.cursor
            .checked_sub(self.offset)
            .and_then(|index| usize::try_from(index).ok())
    }

    /// One past the last item we know exists
    fn known_end(&self) -> u64 {
        if self.pagination.total_items > 0 {
            self.pagination.total_items
        } else {
            self.offset + self.page.len() as u64
        }
    }
}

impl<F, T> PageIterator<F, T> {
    /// Last captured fetch failure; cleared by the next successful fetch
    pub fn err(&self) -> Option<&FetchFailure> {
        self.last_error.as_ref()
    }

    /// Last server message, falling back to the last decoded envelope's
    pub fn message(&self) -> &str {
        if self.last_message.is_empty() {
            &self.envelope_message
        } else {
            &self.last_message
        }
    }

    /// Pagination last adopted
    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    /// Global 0-based cursor
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Global position of the first cached item
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Whether the endpoint turned out to be a single record
    pub fn is_single_item(&self) -> bool {
        self.single_item
    }

    /// The cached page, without fetching
    pub fn cached_page(&self) -> &ResponseData<T> {
        &self.page
    }

    /// Resource path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request template
    pub fn request_template(&self) -> &RequestConfig {
        &self.template
    }
}

impl<F, T> fmt::Debug for PageIterator<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageIterator")
            .field("path", &self.path)
            .field("pagination", &self.pagination)
            .field("cursor", &self.cursor)
            .field("offset", &self.offset)
            .field("cached", &self.page.len())
            .field("single_item", &self.single_item)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

/// Turn decoded JSON records into `T`, keeping the envelope's shape
fn convert_envelope<T: DeserializeOwned>(envelope: ResponseEnvelope) -> Result<ResponseEnvelope<T>> {
    let data = envelope
        .data
        .try_map(serde_json::from_value::<T>)
        .map_err(|e| Error::decode(format!("Failed to convert record: {e}")))?;

    Ok(ResponseEnvelope {
        data,
        pagination: envelope.pagination,
        message: envelope.message,
    })
}
