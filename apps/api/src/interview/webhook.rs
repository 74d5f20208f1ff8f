use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

/// Forwards every generated question to an external automation hook
/// (e.g. a text-to-speech or logging workflow). Fire-and-forget.
#[derive(Clone)]
pub struct QuestionNotifier {
    client: Client,
    url: Option<String>,
}

impl QuestionNotifier {
    pub fn new(client: Client, url: Option<String>) -> Self {
        Self { client, url }
    }

    #[cfg(test)]
    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            url: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    pub fn notify(&self, question: &str) {
        let Some(url) = self.url.clone() else {
            return;
        };
        let client = self.client.clone();
        let payload = json!({ "text": question });

        tokio::spawn(async move {
            match client.post(&url).json(&payload).send().await {
                Ok(resp) if resp.status().is_success() => debug!("Question webhook delivered"),
                Ok(resp) => warn!("Question webhook returned {}", resp.status()),
                Err(e) => warn!("Question webhook error: {e}"),
            }
        });
    }
}
