use async_trait::async_trait;
use std::time::Duration;

/// Session-level failure: the browser is gone or cannot reach a page.
///
/// Element timing (missing, hidden, stale, slow) is never reported through
/// this type; see [`Lookup`], [`Wait`] and [`Activation`].
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("browser session failed: {0}")]
    Driver(#[from] anyhow::Error),
}

/// Outcome of an immediate element lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<E> {
    Found(E),
    Absent,
}

/// Outcome of a bounded wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wait<E> {
    Ready(E),
    TimedOut,
}

/// Outcome of activating (clicking) an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Activated,
    Rejected(String),
}

/// The page primitives the harvester needs from a live browsing session.
///
/// The session is owned by the caller and shared across categories;
/// implementations must not close it.
#[async_trait]
pub trait BrowsingSession: Send + Sync {
    type Element: Send + Sync;

    async fn navigate(&self, url: &str) -> Result<(), SessionError>;

    async fn locate_optional(&self, selector: &str) -> Result<Lookup<Self::Element>, SessionError>;

    async fn locate_all_under_scope(
        &self,
        selector: &str,
        scope: &Self::Element,
    ) -> Result<Vec<Self::Element>, SessionError>;

    async fn wait_for_presence(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Wait<Self::Element>, SessionError>;

    async fn wait_for_interactable(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Wait<Self::Element>, SessionError>;

    async fn activate(&self, element: &Self::Element) -> Result<Activation, SessionError>;

    async fn current_markup_snapshot(&self) -> Result<String, SessionError>;
}

impl<E> From<Option<E>> for Lookup<E> {
    fn from(value: Option<E>) -> Self {
        value.map_or(Lookup::Absent, Lookup::Found)
    }
}

impl<E> From<Option<E>> for Wait<E> {
    fn from(value: Option<E>) -> Self {
        value.map_or(Wait::TimedOut, Wait::Ready)
    }
}
