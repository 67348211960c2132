pub mod page_cache;
pub mod url_map;

pub use page_cache::PageCache;
pub use url_map::UrlMap;
