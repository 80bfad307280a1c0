use std::{future::Future, pin::Pin};

use anyhow::Context;
use bytes::Bytes;
use tracing::{debug, warn};

use crate::{config::Config, resource_path::ResourcePath};

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Something that can fetch the raw contents of a resource.
///
/// Implementations must not treat an HTTP error status as a failure: the body the server
/// sent back (possibly empty) is still the result. Only failures to reach the resource at
/// all are errors.
pub trait Transport: Send + Sync {
    fn get(&self, path: ResourcePath) -> BoxFuture<anyhow::Result<Bytes>>;
}

/// Fetches URLs with reqwest and local paths from disk, relative to the configured base
/// directories.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: Config,
}

impl HttpTransport {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(agent) = &config.http.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(HttpTransport { client, config })
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: ResourcePath) -> BoxFuture<anyhow::Result<Bytes>> {
        let client = self.client.clone();
        let config = self.config.clone();

        Box::pin(async move {
            use ResourcePath::*;
            match path.resolve(&config).await {
                Local(path) => load_local(&path).await,
                URL(url) => load_url(&client, &url).await,
            }
        })
    }
}

async fn load_local(path: &std::path::Path) -> anyhow::Result<Bytes> {
    tokio::fs::read(path)
        .await
        .map(Bytes::from)
        .context(format!("Failed to load file {}", path.display()))
}

async fn load_url(client: &reqwest::Client, url: &str) -> anyhow::Result<Bytes> {
    let response = client
        .get(url)
        .send()
        .await
        .context(format!("Failed to get {}", url))?;

    let status = response.status();
    if !status.is_success() {
        warn!("{} answered with status {}", url, status);
    }

    let body = response
        .bytes()
        .await
        .context(format!("Failed to read body of {}", url))?;

    debug!("Received {} bytes from {}", body.len(), url);

    Ok(body)
}

#[cfg(test)]
pub mod tests {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use super::*;

    /// In-memory transport. Unknown paths fail. Every request is recorded in order.
    #[derive(Clone, Default)]
    pub struct MockTransport {
        pub bodies: HashMap<String, String>,
        pub requests: Arc<Mutex<Vec<String>>>,
    }

    impl MockTransport {
        pub fn with(bodies: &[(&str, &str)]) -> Self {
            MockTransport {
                bodies: bodies
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                requests: Default::default(),
            }
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    fn key(path: &ResourcePath) -> String {
        match path {
            ResourcePath::Local(path) => path.display().to_string(),
            ResourcePath::URL(url) => url.clone(),
        }
    }

    impl Transport for MockTransport {
        fn get(&self, path: ResourcePath) -> BoxFuture<anyhow::Result<Bytes>> {
            let key = key(&path);
            self.requests.lock().unwrap().push(key.clone());
            let body = self.bodies.get(&key).cloned();

            Box::pin(async move {
                match body {
                    Some(body) => Ok(Bytes::from(body)),
                    None => anyhow::bail!("no such resource {}", key),
                }
            })
        }
    }

    #[tokio::test]
    async fn reads_local_files_from_base_dirs() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("data.txt"), "hello")
            .await
            .unwrap();

        let transport = HttpTransport::new(Config {
            base_dirs: vec![dir.path().to_path_buf()],
            ..Default::default()
        })
        .unwrap();

        let body = transport.get("data.txt".into()).await.unwrap();
        assert_eq!(&body[..], b"hello");
    }

    #[tokio::test]
    async fn missing_local_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let transport = HttpTransport::new(Config {
            base_dirs: vec![dir.path().to_path_buf()],
            ..Default::default()
        })
        .unwrap();

        assert!(transport.get("nothing.txt".into()).await.is_err());
    }

    #[tokio::test]
    async fn mock_records_requests() {
        let mock = MockTransport::with(&[("a", "1")]);
        assert_eq!(&mock.get("a".into()).await.unwrap()[..], b"1");
        assert!(mock.get("b".into()).await.is_err());
        assert_eq!(mock.requests(), vec!["a", "b"]);
    }
}
