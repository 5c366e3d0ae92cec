use std::time::Duration;

use tokio::time::Instant;

use crate::types::Endpoint;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of one HTTP call. Transport failures never escape as errors; they
/// come back tagged so the runner treats them like any other failed step.
#[derive(Debug, Clone)]
pub enum CallOutcome {
    Response { status: u16, body: String },
    TransportFailure(String),
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Preflight: GET the API root to check the service is reachable at all.
    pub async fn is_available(&self) -> bool {
        self.http.get(&self.base_url).send().await.is_ok()
    }

    /// Issues one POST and measures wall time from just before dispatch to
    /// just after the response (or transport failure) is obtained.
    pub async fn timed_post(
        &self,
        endpoint: Endpoint,
        body: &serde_json::Value,
        bearer: Option<&str>,
    ) -> (f64, CallOutcome) {
        let url = format!("{}{}", self.base_url, endpoint.path());
        let mut request = self.http.post(&url).json(body);
        if let Some(token) = bearer {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let start = Instant::now();
        let outcome = match request.send().await {
            Ok(resp) => {
                let status = resp.status().as_u16();
                // A failed body read after a successful status exchange is
                // still a transport-level problem.
                match resp.text().await {
                    Ok(body) => CallOutcome::Response { status, body },
                    Err(e) => CallOutcome::TransportFailure(e.to_string()),
                }
            }
            Err(e) => CallOutcome::TransportFailure(e.to_string()),
        };
        (start.elapsed().as_secs_f64(), outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn preflight_reports_unreachable_base_url() {
        // Port 1 is never serving locally; the connection is refused.
        let client = ApiClient::new("http://127.0.0.1:1").unwrap();
        assert!(!client.is_available().await);
    }

    #[tokio::test]
    async fn timed_post_tags_transport_failure_instead_of_erroring() {
        let client = ApiClient::new("http://127.0.0.1:1").unwrap();
        let (elapsed, outcome) = client
            .timed_post(Endpoint::Register, &serde_json::json!({}), None)
            .await;
        assert!(elapsed >= 0.0);
        assert!(matches!(outcome, CallOutcome::TransportFailure(_)));
    }

    #[test]
    fn trailing_slash_in_base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }
}
