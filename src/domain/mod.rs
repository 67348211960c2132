pub mod feed_item;
pub mod page;
pub mod post;

pub use feed_item::FeedItem;
pub use page::{CachedPage, PageItems, PageSource};
pub use post::Post;
