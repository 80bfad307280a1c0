use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{cache::ResourceCache, resource_path::ResourcePath};

/// Warms a [`ResourceCache`] for a list of images without waiting on any of them.
#[derive(Clone)]
pub struct Preloader {
    cache: ResourceCache,
}

/// The background loads started by one [`Preloader::preload`] call, in input order.
/// Dropping this detaches them; they keep running.
pub struct Dispatched(Vec<JoinHandle<()>>);

impl Dispatched {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Wait until every load has either landed in the cache or failed.
    pub async fn settle(self: Self) {
        for handle in self.0 {
            if let Err(err) = handle.await {
                warn!("Preload task did not finish: {}", err);
            }
        }
    }
}

impl Preloader {
    pub fn new(cache: ResourceCache) -> Self {
        Preloader { cache }
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// Start one background load per url, in order, then call `continuation` right away.
    /// Nothing is validated and failures go unreported; a url that fails to load simply
    /// stays out of the cache.
    ///
    /// Must be called from within a tokio runtime.
    pub fn preload<S, F>(&self, urls: &[S], continuation: F) -> Dispatched
    where
        S: AsRef<str>,
        F: FnOnce(),
    {
        info!("Preloading {} resources", urls.len());

        let handles: Vec<JoinHandle<()>> = urls
            .iter()
            .map(|url| {
                let path = ResourcePath::from(url.as_ref());
                let cache = self.cache.clone();

                tokio::spawn(async move {
                    if let Err(err) = cache.get(path.clone()).await {
                        debug!("Preload of {} failed: {:?}", path, err);
                    }
                })
            })
            .collect();

        continuation();

        Dispatched(handles)
    }
}
