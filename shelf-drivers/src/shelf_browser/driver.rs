use crate::shelf_browser::{options::build_capabilities, page::ShelfPage};
use anyhow::{Context, Result};
use fantoccini::{Client, ClientBuilder};
use shelf_config::BrowserConfig;
use std::time::Duration;
use tracing::{debug, info};

/// Thin wrapper around a `fantoccini` WebDriver client.
///
/// One driver owns one browser session for the whole run; pages handed out
/// by [`ShelfDriver::page`] share it.
pub struct ShelfDriver {
    pub client: Client,
}

impl ShelfDriver {
    /// Connect to a running WebDriver service at `config.webdriver_url`.
    pub async fn new(config: &BrowserConfig) -> Result<Self> {
        let client = ClientBuilder::native()
            .capabilities(build_capabilities(config))
            .connect(&config.webdriver_url)
            .await
            .with_context(|| {
                format!("failed to open WebDriver session at {}", config.webdriver_url)
            })?;

        info!(
            target: "shelf.driver",
            endpoint = %config.webdriver_url,
            headless = config.headless,
            "browser session started"
        );
        Ok(Self { client })
    }

    /// Navigate the session to `url`.
    pub async fn goto(&self, url: &str) -> Result<()> {
        debug!(target: "shelf.driver", %url, "navigating");
        self.client
            .goto(url)
            .await
            .with_context(|| format!("navigation to {url} failed"))
    }

    /// Page helpers bound to this session, polling waits every `poll`.
    pub fn page(&self, poll: Duration) -> ShelfPage {
        ShelfPage::new(self.client.clone(), poll)
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        info!(target: "shelf.driver", "browser session closed");
        Ok(())
    }
}
