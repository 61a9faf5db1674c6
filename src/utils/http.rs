// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};

use crate::error::{AppError, Result};
use crate::models::FetchConfig;

/// Anything that can turn a URL into response text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return the body text of a successful response.
    async fn fetch_text(&self, url: &str) -> Result<String>;

    /// Fetch `url` and return the undecoded body of a successful response.
    ///
    /// Feeds declare their own encoding in the XML prolog, so they are
    /// parsed from these bytes rather than from charset-decoded text.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        Ok(self.fetch_text(url).await?.into_bytes())
    }
}

/// Create a configured asynchronous HTTP client.
pub fn create_client(config: &FetchConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// `PageFetcher` backed by a `reqwest` client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
        })
    }
}

impl HttpFetcher {
    async fn get(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(url, format!("HTTP {status}")));
        }
        Ok(response)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        Ok(self.get(url).await?.text().await?)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        Ok(self.get(url).await?.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_from_default_config() {
        assert!(create_client(&FetchConfig::default()).is_ok());
        assert!(HttpFetcher::new(&FetchConfig::default()).is_ok());
    }
}
