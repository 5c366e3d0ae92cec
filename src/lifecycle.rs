use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::{ApiClient, CallOutcome};
use crate::identity::IdentityGenerator;
use crate::tokens::{TokenExtractor, TokenPair};
use crate::types::{Endpoint, IterationOutcome, StepFailure, StepStatus};

// Request body key for the refresh token. Unlike the response fields this one
// has been stable across API versions.
const REFRESH_TOKEN_BODY_KEY: &str = "refreshToken";

/// Seam between the lifecycle state machine and the HTTP transport, so the
/// loop can be driven by a scripted caller in tests.
#[async_trait]
pub trait StepCaller {
    async fn call(
        &self,
        endpoint: Endpoint,
        body: &Value,
        bearer: Option<&str>,
    ) -> (f64, CallOutcome);
}

#[async_trait]
impl StepCaller for ApiClient {
    async fn call(
        &self,
        endpoint: Endpoint,
        body: &Value,
        bearer: Option<&str>,
    ) -> (f64, CallOutcome) {
        self.timed_post(endpoint, body, bearer).await
    }
}

/// Runs one register → login → refresh → logout iteration at a time.
///
/// Abort edges: a failed register, login or refresh skips every later step of
/// the iteration (there are no credentials or tokens to proceed with). Logout
/// is the last step, so its failure only gets recorded. Each executed step
/// emits exactly one outcome, in step order, regardless of later aborts.
///
/// The runner tracks two token generations per iteration: login's pair, then
/// refresh's pair which supersedes it. Logout always authenticates with the
/// latest generation.
pub struct LifecycleRunner<C> {
    caller: C,
    identities: IdentityGenerator,
    extractor: TokenExtractor,
}

impl<C: StepCaller> LifecycleRunner<C> {
    pub fn new(caller: C, extractor: TokenExtractor) -> Self {
        Self {
            caller,
            identities: IdentityGenerator,
            extractor,
        }
    }

    pub async fn run_iteration(&mut self, iteration: u32) -> Vec<IterationOutcome> {
        let mut outcomes = Vec::with_capacity(4);
        let identity = self.identities.next_identity();

        // Register
        let body = json!({
            "nickname": identity.nickname,
            "email": identity.email,
            "password": identity.password,
        });
        let (elapsed, call) = self.caller.call(Endpoint::Register, &body, None).await;
        let status = classify_plain(call);
        let registered = status.is_success();
        outcomes.push(outcome(iteration, Endpoint::Register, elapsed, status));
        if !registered {
            return outcomes;
        }

        // Login
        let body = json!({
            "email": identity.email,
            "password": identity.password,
        });
        let (elapsed, call) = self.caller.call(Endpoint::Login, &body, None).await;
        let (status, login_tokens) = classify_with_tokens(call, &self.extractor, Endpoint::Login);
        let logged_in = status.is_success();
        outcomes.push(outcome(iteration, Endpoint::Login, elapsed, status));
        if !logged_in {
            return outcomes;
        }
        // classify_with_tokens only reports success with both tokens present
        let login_tokens = login_tokens.unwrap_or_default();

        // Refresh: the login refresh token in the body, no bearer header.
        // Tokens rotate independently of the header.
        let body = json!({ REFRESH_TOKEN_BODY_KEY: login_tokens.refresh });
        let (elapsed, call) = self.caller.call(Endpoint::Refresh, &body, None).await;
        let (status, fresh_tokens) = classify_with_tokens(call, &self.extractor, Endpoint::Refresh);
        let refreshed = status.is_success();
        outcomes.push(outcome(iteration, Endpoint::Refresh, elapsed, status));
        if !refreshed {
            return outcomes;
        }
        let fresh_tokens = fresh_tokens.unwrap_or_default();

        // Logout: always the refresh generation, never login's.
        let body = json!({ REFRESH_TOKEN_BODY_KEY: fresh_tokens.refresh });
        let (elapsed, call) = self
            .caller
            .call(Endpoint::Logout, &body, fresh_tokens.access.as_deref())
            .await;
        let status = classify_plain(call);
        outcomes.push(outcome(iteration, Endpoint::Logout, elapsed, status));

        outcomes
    }
}

fn outcome(
    iteration: u32,
    endpoint: Endpoint,
    elapsed_secs: f64,
    status: StepStatus,
) -> IterationOutcome {
    IterationOutcome {
        iteration,
        endpoint,
        elapsed_secs,
        status,
    }
}

/// Success is transport success plus HTTP 200.
fn classify_plain(call: CallOutcome) -> StepStatus {
    match call {
        CallOutcome::Response { status: 200, .. } => StepStatus::Success,
        CallOutcome::Response { status, body } => StepStatus::Failure(StepFailure::Application {
            status,
            detail: error_detail(&body),
        }),
        CallOutcome::TransportFailure(reason) => {
            StepStatus::Failure(StepFailure::Transport(reason))
        }
    }
}

/// Login and refresh additionally require both tokens to be extractable from
/// a 200 body; a 200 without them is a protocol failure, not a success.
fn classify_with_tokens(
    call: CallOutcome,
    extractor: &TokenExtractor,
    endpoint: Endpoint,
) -> (StepStatus, Option<TokenPair>) {
    match call {
        CallOutcome::Response { status: 200, body } => {
            let tokens = extractor.extract(&body);
            if tokens.is_complete() {
                (StepStatus::Success, Some(tokens))
            } else {
                let status = StepStatus::Failure(StepFailure::Protocol(format!(
                    "{} returned 200 but the token fields are missing or unreadable",
                    endpoint.name()
                )));
                (status, None)
            }
        }
        other => (classify_plain(other), None),
    }
}

/// Pulls the API's structured {error, cause} detail out of a failure body,
/// falling back to the raw text when it is not JSON.
fn error_detail(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<Value>(body) {
        if let Some(error) = parsed.get("error").and_then(Value::as_str) {
            let cause = parsed.get("cause").and_then(Value::as_str).unwrap_or("");
            return if cause.is_empty() {
                error.to_string()
            } else {
                format!("{}: {}", error, cause)
            };
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "<empty body>".to_string()
    } else {
        trimmed.to_string()
    }
}
