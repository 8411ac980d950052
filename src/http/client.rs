//! `reqwest` client construction.

use std::time::Duration;

use crate::config::schema::HttpConfig;

/// Build an HTTP client with connect and total timeouts and the configured User-Agent.
///
/// # Arguments
/// * `config` - Shared HTTP settings
pub fn build_http_client(config: &HttpConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&HttpConfig::default()).is_ok());
    }
}
