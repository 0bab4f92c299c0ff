use futures_util::future::BoxFuture;
use lifeline_hazards::{FeedError, HazardFeed, RawHazardEvent};

/// Pull-based feed over an HTTP provider that serves raw hazard batches
/// as a JSON array.
pub struct HttpJsonFeed {
    name: String,
    url: String,
    client: reqwest::Client,
}

impl HttpJsonFeed {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

impl HazardFeed for HttpJsonFeed {
    fn name(&self) -> &str {
        &self.name
    }

    fn poll(&self) -> BoxFuture<'_, Result<Vec<RawHazardEvent>, FeedError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|e| FeedError::Connection(e.to_string()))?
                .error_for_status()
                .map_err(|e| FeedError::Connection(e.to_string()))?;

            let mut batch: Vec<RawHazardEvent> = response
                .json()
                .await
                .map_err(|e| FeedError::Payload(e.to_string()))?;

            // Attribute events to this feed regardless of what the
            // provider put in the field.
            for raw in &mut batch {
                raw.source_feed = self.name.clone();
            }
            Ok(batch)
        })
    }
}
