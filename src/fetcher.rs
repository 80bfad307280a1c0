use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{
    config::Config,
    resource_path::ResourcePath,
    transport::{HttpTransport, Transport},
};

/// The outcome of one GET. Each request gets its own, so a continuation never sees
/// the body of some other request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fetched {
    pub url: String,

    /// Full response body, or empty if the request failed or nothing came back.
    pub response_text: String,
}

/// Issues GET requests and hands the body to a continuation once the whole
/// response has arrived.
///
/// Failures are never surfaced: they are logged and show up as an empty
/// `response_text`. There is no timeout, retry or cancellation.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    last_response: Arc<Mutex<String>>,
}

/// Handle to a request started by [`Fetcher::get`]. Dropping it does not cancel anything.
pub struct Pending(JoinHandle<()>);

impl Pending {
    /// Resolves once the continuation has returned.
    pub async fn wait(self: Self) {
        if let Err(err) = self.0.await {
            warn!("Continuation did not finish: {}", err);
        }
    }
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Fetcher {
            transport,
            last_response: Arc::new(Mutex::new(String::new())),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Fetcher::new(Arc::new(HttpTransport::new(config.clone())?)))
    }

    /// Start a GET for `url` and return immediately. `continuation` runs exactly once,
    /// on the runtime, after the response has been read in full or the request failed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn get<T, F>(&self, url: T, continuation: F) -> Pending
    where
        T: ToString,
        F: FnOnce(Fetched) + Send + 'static,
    {
        let fetcher = self.clone();
        let url = url.to_string();

        Pending(tokio::spawn(async move {
            let fetched = fetcher.fetch(url).await;
            continuation(fetched);
        }))
    }

    /// Same as [`Fetcher::get`], but awaited instead of driving a continuation.
    pub async fn fetch<T: ToString>(&self, url: T) -> Fetched {
        let url = url.to_string();

        info!("Fetching {}", url);

        let response_text = match self.transport.get(ResourcePath::from(url.clone())).await {
            Ok(body) => String::from_utf8_lossy(&body).into_owned(),
            Err(err) => {
                warn!("Request for {} failed: {:?}", url, err);
                String::new()
            }
        };

        // written before anyone is handed the result
        *self.last_response() = response_text.clone();

        Fetched { url, response_text }
    }

    /// Body of the most recently completed request, empty before the first one.
    /// Safe to call from inside a continuation.
    pub fn response_text(&self) -> String {
        self.last_response().clone()
    }

    // only held for one assignment or clone, never across an await
    fn last_response(&self) -> MutexGuard<'_, String> {
        self.last_response
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
