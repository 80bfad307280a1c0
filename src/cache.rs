use std::{collections::HashMap, sync::Arc};

use bytes::Bytes;
use tokio::sync::{OnceCell, RwLock};
use tracing::debug;

use crate::{
    config::Config,
    resource_path::ResourcePath,
    transport::{BoxFuture, HttpTransport, Transport},
};

// A cell that holds a loader and caches its first successful output.
// A failed load leaves the cell empty so the next caller tries again.
#[derive(Clone)]
pub struct Resource<T> {
    inner: Arc<ResourceInner<T>>,
}

struct ResourceInner<T> {
    // the function producing the boxed future
    f: Box<dyn Fn() -> BoxFuture<anyhow::Result<T>> + Send + Sync + 'static>,

    // the cell caching the output of f().await, once it succeeds
    cell: OnceCell<T>,
}

impl<T> Resource<T> {
    pub fn new(f: impl Fn() -> BoxFuture<anyhow::Result<T>> + Send + Sync + 'static) -> Resource<T> {
        Resource {
            inner: Arc::new(ResourceInner {
                f: Box::new(f),
                cell: OnceCell::new(),
            }),
        }
    }

    pub async fn get(self: &Self) -> anyhow::Result<&T> {
        self.inner
            .cell
            .get_or_try_init(|| (self.inner.f)())
            .await
    }

    pub fn is_loaded(self: &Self) -> bool {
        self.inner.cell.initialized()
    }
}

type Index = Arc<RwLock<HashMap<ResourcePath, Resource<Bytes>>>>;

/// Load-once store of raw resource contents, keyed by where they came from.
/// Nothing is ever evicted.
#[derive(Clone)]
pub struct ResourceCache {
    transport: Arc<dyn Transport>,
    entries: Index,
}

impl ResourceCache {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        ResourceCache {
            transport,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(ResourceCache::new(Arc::new(HttpTransport::new(
            config.clone(),
        )?)))
    }

    /// Cached contents of `path`, loading them first if needed.
    pub async fn get<P: Into<ResourcePath>>(&self, path: P) -> anyhow::Result<Bytes> {
        let cell = self.cell(path.into()).await;
        let bytes = cell.get().await?;
        Ok(bytes.clone())
    }

    pub async fn is_cached<P: Into<ResourcePath>>(&self, path: P) -> bool {
        let entries = self.entries.read().await;
        entries
            .get(&path.into())
            .map(|cell| cell.is_loaded())
            .unwrap_or(false)
    }

    /// Number of entries that loaded successfully.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.values().filter(|cell| cell.is_loaded()).count()
    }

    async fn cell(&self, path: ResourcePath) -> Resource<Bytes> {
        {
            let entries = self.entries.read().await;
            if let Some(cell) = entries.get(&path) {
                return cell.clone();
            }
        } // release the read lock

        let mut entries = self.entries.write().await;

        // someone may have inserted it between the two locks
        entries
            .entry(path.clone())
            .or_insert_with(|| {
                debug!("Registering {}", path);

                let transport = self.transport.clone();
                Resource::new(move || transport.get(path.clone()))
            })
            .clone()
    }
}
