use anyhow::Result;
use fantoccini::{
    elements::Element,
    error::{CmdError, ErrorStatus},
    Client, Locator,
};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Result of clicking an element that was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Clicked,
    /// The browser refused the click (detached, hidden, covered, ...).
    Refused(String),
}

/// Page operations on a live session.
///
/// Conditions that are expected while a page is still rendering come back as
/// `None`/[`ClickOutcome::Refused`]; only session-level failures are `Err`.
#[derive(Clone)]
pub struct ShelfPage {
    pub(crate) client: Client,
    poll: Duration,
}

/// Whether a WebDriver error describes element timing rather than a broken session.
pub fn is_transient(err: &CmdError) -> bool {
    match err {
        CmdError::WaitTimeout => true,
        CmdError::Standard(e) => matches!(
            e.error,
            ErrorStatus::NoSuchElement
                | ErrorStatus::ElementNotInteractable
                | ErrorStatus::ElementClickIntercepted
                | ErrorStatus::StaleElementReference
                | ErrorStatus::Timeout
        ),
        _ => false,
    }
}

impl ShelfPage {
    pub fn new(client: Client, poll: Duration) -> Self {
        Self { client, poll }
    }

    /// Return the full page HTML source.
    pub async fn source(&self) -> Result<String> {
        self.client.source().await.map_err(anyhow::Error::from)
    }

    /// Find a single element by CSS selector without waiting.
    pub async fn find_optional(&self, selector: &str) -> Result<Option<Element>> {
        match self.client.find(Locator::Css(selector)).await {
            Ok(element) => Ok(Some(element)),
            Err(e) if is_transient(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Find zero or more descendants of `scope` by CSS selector.
    ///
    /// A scope that went stale yields no elements.
    pub async fn find_all_within(&self, selector: &str, scope: &Element) -> Result<Vec<Element>> {
        match scope.find_all(Locator::Css(selector)).await {
            Ok(elements) => Ok(elements),
            Err(e) if is_transient(&e) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Wait up to `timeout` for an element matching `selector` to exist.
    pub async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<Element>> {
        let found = self
            .client
            .wait()
            .at_most(timeout)
            .every(self.poll)
            .for_element(Locator::Css(selector))
            .await;
        match found {
            Ok(element) => Ok(Some(element)),
            Err(e) if is_transient(&e) => {
                debug!(target: "shelf.driver", %selector, ?timeout, "element did not appear");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Wait up to `timeout` for an element that is both displayed and enabled.
    pub async fn wait_for_clickable(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<Element>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(element) = self.find_optional(selector).await? {
                if self.is_clickable(&element).await? {
                    return Ok(Some(element));
                }
            }
            if Instant::now() >= deadline {
                debug!(target: "shelf.driver", %selector, ?timeout, "element never became clickable");
                return Ok(None);
            }
            sleep(self.poll).await;
        }
    }

    async fn is_clickable(&self, element: &Element) -> Result<bool> {
        let displayed = match element.is_displayed().await {
            Ok(v) => v,
            Err(e) if is_transient(&e) => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        if !displayed {
            return Ok(false);
        }
        match element.is_enabled().await {
            Ok(v) => Ok(v),
            Err(e) if is_transient(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Click `element`, reporting a refusal instead of failing.
    pub async fn click(&self, element: &Element) -> Result<ClickOutcome> {
        match element.click().await {
            Ok(()) => Ok(ClickOutcome::Clicked),
            Err(e) if is_transient(&e) => Ok(ClickOutcome::Refused(e.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
