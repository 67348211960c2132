use std::path::Path;

use chrono::Utc;

use crate::app::{AppContext, BinderyError, Result};
use crate::book::{BookAssembler, ConversionOutcome, Converter, INDEX_FILE};
use crate::corpus::{rewrite_links, CorpusBuilder};
use crate::domain::PageSource;
use crate::media::MediaStats;
use crate::store::UrlMap;

#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    pub images: bool,
    pub convert: bool,
    pub open: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            images: true,
            convert: true,
            open: false,
        }
    }
}

/// What a build produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub pages: usize,
    pub posts: usize,
    pub links_rewritten: usize,
    pub media: MediaStats,
    pub documents: usize,
    pub conversions_failed: usize,
}

/// Fetch, build the corpus, rewrite links and images, write the book and
/// convert it.
pub async fn build(ctx: &AppContext, options: &BuildOptions) -> Result<BuildReport> {
    let start = Utc::now();
    let config = &ctx.config;
    let mut report = BuildReport::default();

    println!("Reading feed pages...");
    let pages = ctx.paginated_fetcher().fetch_all(&ctx.cache).await?;
    let downloaded = pages
        .iter()
        .filter(|p| p.source == PageSource::Remote)
        .count();
    report.pages = pages.len();
    println!(
        "{} pages ({} from cache, {} downloaded)",
        pages.len(),
        pages.len() - downloaded,
        downloaded
    );

    let mut corpus = CorpusBuilder::build(pages);
    report.posts = corpus.len();
    println!("{} posts", corpus.len());

    let url_map = UrlMap::from_corpus(&corpus);
    let previous = UrlMap::load(ctx.cache.dir())?;
    let moved = url_map.moved_since(&previous);
    if !moved.is_empty() {
        tracing::warn!("{} posts changed file name since the last build", moved.len());
        for url in &moved {
            eprintln!("  moved: {}", url);
        }
    }
    url_map.save(ctx.cache.dir())?;

    println!("Rewriting post links...");
    report.links_rewritten = rewrite_links(&mut corpus)?;
    println!("{} internal links rewritten", report.links_rewritten);

    let assembler = BookAssembler::new(&config.paths.output_dir, &config.feed.title)
        .protect(&config.paths.cache_dir);
    assembler.prepare()?;

    if options.images && config.media.enabled {
        println!("Localizing images...");
        report.media = ctx.media_localizer().localize(&mut corpus).await?;
        println!(
            "{} images localized, {} skipped, {} failed",
            report.media.localized(),
            report.media.skipped,
            report.media.failed
        );
    }

    println!("Creating book data...");
    let manifest = assembler.assemble(&corpus)?;
    report.documents = manifest.documents.len();
    println!(
        "Wrote {} posts and {} to {}",
        manifest.documents.len(),
        INDEX_FILE,
        assembler.output_dir().display()
    );

    if options.convert && config.converter.enabled {
        let outcomes = run_converter(ctx, &manifest.index);
        report.conversions_failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        check_conversions(&outcomes)?;
    }

    if options.open {
        if let Err(e) = open::that(&manifest.index) {
            eprintln!("Could not open {}: {}", manifest.index.display(), e);
        }
    }

    let elapsed = Utc::now().signed_duration_since(start);
    println!(
        "Build complete ({:.1}s)",
        elapsed.num_milliseconds() as f64 / 1000.0
    );
    Ok(report)
}

/// Update the page cache only.
pub async fn fetch(ctx: &AppContext) -> Result<()> {
    let pages = ctx.paginated_fetcher().fetch_new(&ctx.cache).await?;

    if pages.is_empty() {
        println!("No pages available from page {}", ctx.cache.last_cached_page_number()?);
        return Ok(());
    }

    for page in &pages {
        println!("  page {}: {} items", page.number, page.items.len());
    }
    let items: usize = pages.iter().map(|p| p.items.len()).sum();
    println!("Fetched {} pages, {} items", pages.len(), items);
    Ok(())
}

/// Describe the page cache without touching the network.
pub fn status(ctx: &AppContext) -> Result<()> {
    let cached = ctx.cache.list_cached_pages()?;

    if cached.is_empty() {
        println!("No cached pages in {}", ctx.cache.dir().display());
        return Ok(());
    }

    let pages = ctx.paginated_fetcher().fetch_cached(&ctx.cache)?;
    for (page, items) in cached.iter().zip(&pages) {
        println!(
            "  page {:>4}  {} items  {}",
            page.number,
            items.items.len(),
            page.path.display()
        );
    }

    let corpus = CorpusBuilder::build(pages);
    println!(
        "{} cached pages, {} distinct posts; next fetch starts at page {}",
        cached.len(),
        corpus.len(),
        ctx.cache.last_cached_page_number()?
    );
    Ok(())
}

/// Convert an already written book.
pub fn convert(ctx: &AppContext) -> Result<()> {
    let index = ctx.config.paths.output_dir.join(INDEX_FILE);
    if !index.is_file() {
        return Err(BinderyError::Other(format!(
            "{} not found, run `bindery build` first",
            index.display()
        )));
    }
    let outcomes = run_converter(ctx, &index);
    check_conversions(&outcomes)
}

fn run_converter(ctx: &AppContext, index: &Path) -> Vec<ConversionOutcome> {
    let feed = &ctx.config.feed;
    println!("Converting...");

    let outcomes = Converter::new(&ctx.config.converter).convert_all(index, &feed.title, &feed.author);
    for outcome in &outcomes {
        match &outcome.result {
            Ok(path) => println!("  {}: {}", outcome.format, path.display()),
            Err(e) => eprintln!("  {}: {}", outcome.format, e),
        }
    }
    outcomes
}

/// The HTML stays valid whatever the converter does; only a converter that
/// produced nothing at all is an error.
fn check_conversions(outcomes: &[ConversionOutcome]) -> Result<()> {
    if !outcomes.is_empty() && outcomes.iter().all(|o| o.result.is_err()) {
        return Err(BinderyError::Converter(format!(
            "all {} formats failed",
            outcomes.len()
        )));
    }
    Ok(())
}
