//! Public site hooks: page cache invalidation and push notifications
//!
//! Handlers enqueue events and return; one background task delivers them in
//! order. Delivery failures are logged and dropped, never retried.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::SiteConfig;

/// Queue depth before new events are dropped
const EVENT_QUEUE: usize = 200;

/// Push notification payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
    pub url: String,
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteEvent {
    Revalidate { path: String },
    Notify(PushNotification),
}

#[async_trait]
pub trait SiteHooks: Send + Sync {
    /// Ask the page cache to rebuild `path`
    async fn revalidate(&self, path: &str) -> anyhow::Result<()>;

    async fn notify(&self, notification: &PushNotification) -> anyhow::Result<()>;
}

/// Hooks over HTTP. A blank endpoint disables that hook.
pub struct HttpSiteHooks {
    client: reqwest::Client,
    config: SiteConfig,
}

impl HttpSiteHooks {
    pub fn new(config: SiteConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn post<T: Serialize + ?Sized>(&self, url: &str, secret: &str, body: &T) -> anyhow::Result<()> {
        let mut request = self.client.post(url).json(body);
        if !secret.is_empty() {
            request = request.bearer_auth(secret);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            anyhow::bail!("{} responded with {}", url, response.status());
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct RevalidateBody<'a> {
    path: &'a str,
}

#[async_trait]
impl SiteHooks for HttpSiteHooks {
    async fn revalidate(&self, path: &str) -> anyhow::Result<()> {
        if self.config.revalidate_url.is_empty() {
            tracing::debug!("Revalidation disabled, skipping {}", path);
            return Ok(());
        }
        self.post(&self.config.revalidate_url, &self.config.revalidate_secret, &RevalidateBody { path })
            .await
    }

    async fn notify(&self, notification: &PushNotification) -> anyhow::Result<()> {
        if self.config.notify_url.is_empty() {
            tracing::debug!("Notifications disabled, skipping '{}'", notification.title);
            return Ok(());
        }
        self.post(&self.config.notify_url, &self.config.notify_secret, notification)
            .await
    }
}

/// Sending half of the event queue, kept in the application state
#[derive(Clone)]
pub struct Publisher {
    tx: mpsc::Sender<SiteEvent>,
}

impl Publisher {
    /// Start the delivery task. Must be called inside a Tokio runtime.
    pub fn spawn(hooks: Arc<dyn SiteHooks>) -> Self {
        let (tx, mut rx) = mpsc::channel::<SiteEvent>(EVENT_QUEUE);

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let result = match &event {
                    SiteEvent::Revalidate { path } => hooks.revalidate(path).await,
                    SiteEvent::Notify(n) => hooks.notify(n).await,
                };
                match result {
                    Ok(()) => tracing::debug!("Delivered {:?}", event),
                    Err(e) => tracing::error!("Failed to deliver {:?}: {}", event, e),
                }
            }
        });

        Self { tx }
    }

    fn send(&self, event: SiteEvent) {
        if let Err(e) = self.tx.try_send(event) {
            tracing::warn!("Site event queue unavailable, event dropped: {}", e);
        }
    }

    pub fn revalidate(&self, path: impl Into<String>) {
        self.send(SiteEvent::Revalidate { path: path.into() });
    }

    pub fn notify(&self, notification: PushNotification) {
        self.send(SiteEvent::Notify(notification));
    }
}

/// Records every call; used by tests across the crate
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use tokio::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingHooks {
        pub events: Mutex<Vec<SiteEvent>>,
        pub fail: bool,
    }

    #[async_trait]
    impl SiteHooks for RecordingHooks {
        async fn revalidate(&self, path: &str) -> anyhow::Result<()> {
            self.events.lock().await.push(SiteEvent::Revalidate { path: path.to_string() });
            if self.fail {
                anyhow::bail!("cache endpoint down");
            }
            Ok(())
        }

        async fn notify(&self, notification: &PushNotification) -> anyhow::Result<()> {
            self.events.lock().await.push(SiteEvent::Notify(notification.clone()));
            if self.fail {
                anyhow::bail!("push endpoint down");
            }
            Ok(())
        }
    }

    impl RecordingHooks {
        /// Wait until at least `n` events arrived, up to one second
        pub async fn wait_for(&self, n: usize) -> Vec<SiteEvent> {
            for _ in 0..100 {
                {
                    let events = self.events.lock().await;
                    if events.len() >= n {
                        return events.clone();
                    }
                }
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            }
            self.events.lock().await.clone()
        }
    }
}
