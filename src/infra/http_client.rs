use std::time::Duration;

use async_trait::async_trait;

use crate::app::ports::PageSourcePort;
use crate::config::FetchConfig;
use crate::error::{PipelineError, Result};

/// Page source backed by one shared `reqwest` client
pub struct ReqwestPageSource {
    client: reqwest::Client,
}

impl ReqwestPageSource {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSourcePort for ReqwestPageSource {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PipelineError::Fetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.text().await?)
    }
}
