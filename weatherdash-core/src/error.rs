//! Error type shared by the fetch, aggregation and storage paths.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{service} request failed with status {status}: {body}")]
    Http {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to parse {what} response: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Geolocation unavailable: {0}")]
    Geolocation(String),

    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(
        "No OpenWeather API key configured.\n\
         Hint: run `weatherdash configure` or set OPENWEATHER_API_KEY."
    )]
    MissingApiKey,
}

impl DashError {
    /// Short message suitable for showing in place of the dashboard.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Network error. Check your connection.".to_string(),
            Self::Http { status, .. } => format!("Weather service answered with HTTP {status}."),
            Self::Parse { .. } | Self::InvalidSample(_) => {
                "Weather service sent data we could not read.".to_string()
            }
            Self::Geolocation(msg) => format!("Could not get location: {msg}"),
            Self::Storage(_) => "Could not save your preferences.".to_string(),
            Self::MissingApiKey => "No API key configured.".to_string(),
        }
    }

    /// True for failures of an outbound request (transport or status).
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Http { .. } | Self::Parse { .. })
    }
}

impl From<std::io::Error> for DashError {
    fn from(e: std::io::Error) -> Self {
        DashError::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_message_includes_status() {
        let err = DashError::Http {
            service: "OpenWeather forecast",
            status: 401,
            body: "Invalid API key".into(),
        };

        assert_eq!(
            err.to_string(),
            "OpenWeather forecast request failed with status 401: Invalid API key"
        );
        assert!(err.user_message().contains("401"));
        assert!(err.is_fetch_failure());
    }

    #[test]
    fn geolocation_is_not_a_fetch_failure() {
        let err = DashError::Geolocation("denied".into());
        assert!(!err.is_fetch_failure());
        assert!(err.user_message().contains("denied"));
    }

    #[test]
    fn missing_api_key_carries_hint() {
        assert!(DashError::MissingApiKey.to_string().contains("weatherdash configure"));
    }
}
