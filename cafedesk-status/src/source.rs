//! Status snapshot sources
//!
//! The synchronizer only needs "give me the current snapshot or tell me why not".
//! `HttpStatusSource` asks the admin backend; tests plug scripted sources in.

use crate::error::PollError;
use crate::models::StatusSnapshot;
use std::future::Future;
use std::time::Duration;

pub trait StatusSource {
    /// One request to the status endpoint
    fn fetch(&self) -> impl Future<Output = Result<StatusSnapshot, PollError>> + Send;
}

/// `GET <status_url>` against the admin backend.
#[derive(Debug, Clone)]
pub struct HttpStatusSource {
    client: reqwest::Client,
    url: String,
}

impl HttpStatusSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl StatusSource for HttpStatusSource {
    fn fetch(&self) -> impl Future<Output = Result<StatusSnapshot, PollError>> + Send {
        let request = self.client.get(&self.url);
        async move {
            let response = request
                .send()
                .await
                .map_err(|e| PollError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(PollError::Status(status.as_u16()));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| PollError::Transport(e.to_string()))?;
            Ok(StatusSnapshot::from_json(&body)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_transport_failure() {
        // port 9 (discard) is closed on test machines
        let source = HttpStatusSource::new("http://127.0.0.1:9/api/get_computers_status", Duration::from_secs(2)).unwrap();
        let result = source.fetch().await;
        assert!(matches!(result, Err(PollError::Transport(_))), "got {result:?}");
    }
}
