//! # Bindery
//!
//! Turns a single blog's paginated RSS feed into a static HTML book ready for
//! e-book conversion.
//!
//! ## Architecture
//!
//! Bindery is a one-shot, sequential pipeline:
//!
//! ```text
//! PageCache/Fetcher → CorpusBuilder → Link rewriter → MediaLocalizer → BookAssembler → Converter
//! ```
//!
//! - [`store`]: on-disk mirror of the feed, one file per page
//! - [`fetcher`]: HTTP client and the resumable page walk
//! - [`corpus`]: ordered posts with stable local file names, link rewriting
//! - [`media`]: image download, cache and downscaling
//! - [`book`]: HTML output and the external converter
//!
//! ## Quick Start
//!
//! ```bash
//! # Download what's new and build the book
//! bindery build
//!
//! # Rebuild from the cache only
//! bindery build --offline --no-convert
//!
//! # What's cached?
//! bindery status
//! ```

/// Application context and error handling.
///
/// [`AppContext`](app::AppContext) wires together config, page cache and fetcher.
pub mod app;

/// HTML book output and e-book conversion.
///
/// - [`BookAssembler`](book::BookAssembler): one document per post plus `index.html`
/// - [`Converter`](book::Converter): runs `ebook-convert` once per format
pub mod book;

/// Command-line interface using clap.
///
/// - `build` - fetch, rewrite, write and convert
/// - `fetch` - update the page cache
/// - `status` - show what is cached
/// - `convert` - convert an existing book
pub mod cli;

/// Configuration loaded from `~/.config/bindery/config.toml`.
pub mod config;

/// Post corpus and the cross-reference rewriter.
///
/// - [`CorpusBuilder`](corpus::CorpusBuilder): assigns `p0000.html`, `p0001.html`, ... in first-seen order
/// - [`rewrite_links`](corpus::rewrite_links): points internal links at local files
pub mod corpus;

/// Core domain models.
///
/// - [`FeedItem`](domain::FeedItem): one entry of a feed page
/// - [`Post`](domain::Post): an article with its local file name
/// - [`CachedPage`](domain::CachedPage), [`PageItems`](domain::PageItems): pages on disk and parsed
pub mod domain;

/// Fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait separating "not found" from failures
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`PaginatedFetcher`](fetcher::paginated::PaginatedFetcher): cache-first walk over feed pages
pub mod fetcher;

/// Image localization.
pub mod media;

/// Feed page parsing with feed-rs.
pub mod normalizer;

/// Page cache and URL map persistence.
pub mod store;
