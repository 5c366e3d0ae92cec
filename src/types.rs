use serde::Deserialize;

fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

// The API's two evolutions disagree on the access token field name
// ("accessToken" vs "token"), so both response field names are config.
fn default_access_token_field() -> String {
    "accessToken".to_string()
}

fn default_refresh_token_field() -> String {
    "refreshToken".to_string()
}

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_access_token_field")]
    pub access_token_field: String,
    #[serde(default = "default_refresh_token_field")]
    pub refresh_token_field: String,
}

/// The four lifecycle steps, in the order an iteration runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Register,
    Login,
    Refresh,
    Logout,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::Register,
        Endpoint::Login,
        Endpoint::Refresh,
        Endpoint::Logout,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Register => "register",
            Endpoint::Login => "login",
            Endpoint::Refresh => "refresh",
            Endpoint::Logout => "logout",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Register => "/register",
            Endpoint::Login => "/login",
            Endpoint::Refresh => "/refresh",
            Endpoint::Logout => "/logout",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Endpoint::Register => 0,
            Endpoint::Login => 1,
            Endpoint::Refresh => 2,
            Endpoint::Logout => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub enum StepFailure {
    /// Connection refused, DNS failure, timeout. The request never produced
    /// an HTTP status.
    Transport(String),
    /// Non-200 status with whatever error detail the body carried.
    Application { status: u16, detail: String },
    /// 200 status but the body did not honor the expected contract
    /// (unparseable, or token fields missing).
    Protocol(String),
}

impl std::fmt::Display for StepFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepFailure::Transport(reason) => write!(f, "transport error: {}", reason),
            StepFailure::Application { status, detail } => {
                write!(f, "application error: status {} ({})", status, detail)
            }
            StepFailure::Protocol(what) => write!(f, "protocol error: {}", what),
        }
    }
}

#[derive(Debug, Clone)]
pub enum StepStatus {
    Success,
    Failure(StepFailure),
}

impl StepStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, StepStatus::Success)
    }
}

/// One timed step of one iteration. Immutable once produced.
#[derive(Debug, Clone)]
pub struct IterationOutcome {
    pub iteration: u32,
    pub endpoint: Endpoint,
    pub elapsed_secs: f64,
    pub status: StepStatus,
}

/// End-of-run statistics for one endpoint, computed over the full sample set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndpointSummary {
    pub count: usize,
    pub min_secs: f64,
    pub max_secs: f64,
    pub mean_secs: f64,
}
