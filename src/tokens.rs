use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenPair {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl TokenPair {
    pub fn is_complete(&self) -> bool {
        self.access.is_some() && self.refresh.is_some()
    }
}

/// Pulls the access and refresh tokens out of a login or refresh response
/// body. Field names are configured because API versions disagree on them.
/// A malformed body is treated the same as tokens being absent.
pub struct TokenExtractor {
    access_field: String,
    refresh_field: String,
}

impl TokenExtractor {
    pub fn new(access_field: &str, refresh_field: &str) -> Self {
        Self {
            access_field: access_field.to_string(),
            refresh_field: refresh_field.to_string(),
        }
    }

    pub fn extract(&self, body: &str) -> TokenPair {
        let Ok(parsed) = serde_json::from_str::<Value>(body) else {
            return TokenPair::default();
        };
        TokenPair {
            access: string_field(&parsed, &self.access_field),
            refresh: string_field(&parsed, &self.refresh_field),
        }
    }
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    value.get(field)?.as_str().map(str::to_string)
}
