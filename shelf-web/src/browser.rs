use crate::session::{Activation, BrowsingSession, Lookup, SessionError, Wait};
use anyhow::Result;
use async_trait::async_trait;
use shelf_config::BrowserConfig;
use shelf_drivers::{ClickOutcome, Element, ShelfDriver, ShelfPage};
use std::time::Duration;

/// [`BrowsingSession`] backed by the fantoccini driver.
pub struct FantocciniSession {
    driver: ShelfDriver,
    page: ShelfPage,
}

impl FantocciniSession {
    /// Open a browser session; waits poll every `poll`.
    pub async fn connect(config: &BrowserConfig, poll: Duration) -> Result<Self> {
        let driver = ShelfDriver::new(config).await?;
        let page = driver.page(poll);
        Ok(Self { driver, page })
    }

    /// Always attempt this before exiting, even after a failed run.
    pub async fn close(self) -> Result<()> {
        self.driver.close().await
    }
}

#[async_trait]
impl BrowsingSession for FantocciniSession {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        self.driver
            .goto(url)
            .await
            .map_err(|source| SessionError::Navigation {
                url: url.to_string(),
                source,
            })
    }

    async fn locate_optional(&self, selector: &str) -> Result<Lookup<Element>, SessionError> {
        Ok(self.page.find_optional(selector).await?.into())
    }

    async fn locate_all_under_scope(
        &self,
        selector: &str,
        scope: &Element,
    ) -> Result<Vec<Element>, SessionError> {
        Ok(self.page.find_all_within(selector, scope).await?)
    }

    async fn wait_for_presence(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Wait<Element>, SessionError> {
        Ok(self.page.wait_for_element(selector, timeout).await?.into())
    }

    async fn wait_for_interactable(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Wait<Element>, SessionError> {
        Ok(self.page.wait_for_clickable(selector, timeout).await?.into())
    }

    async fn activate(&self, element: &Element) -> Result<Activation, SessionError> {
        Ok(match self.page.click(element).await? {
            ClickOutcome::Clicked => Activation::Activated,
            ClickOutcome::Refused(reason) => Activation::Rejected(reason),
        })
    }

    async fn current_markup_snapshot(&self) -> Result<String, SessionError> {
        Ok(self.page.source().await?)
    }
}
