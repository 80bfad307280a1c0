// Fetch a resource and hand its body to a continuation, or warm a cache with a batch of
// images without waiting on them.

pub mod cache;
pub mod config;
pub mod fetcher;
pub mod preloader;
pub mod resource_path;
pub mod transport;

pub use cache::ResourceCache;
pub use config::Config;
pub use fetcher::{Fetched, Fetcher, Pending};
pub use preloader::{Dispatched, Preloader};
pub use resource_path::ResourcePath;
pub use transport::{HttpTransport, Transport};
