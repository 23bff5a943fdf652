//! The "load more" expansion loop.
//!
//! ```text
//! Seeking ──trigger clickable──▶ Triggering ──activated──▶ AwaitingContent
//!    ▲                              │                          │
//!    └──────────── new items ───────┼──────────────────────────┘
//!                                   ▼
//!  timeout / rejected / no growth / round limit ──▶ Done
//! ```
//!
//! Every way of reaching `Done` is a normal end of content. Only a
//! [`SessionError`] leaves the loop early.

use crate::session::{Activation, BrowsingSession, Lookup, SessionError, Wait};
use shelf_config::ExpansionConfig;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Scope used to count item containers on the whole page.
const ROOT_SELECTOR: &str = "html";

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The trigger was missing or never became clickable.
    TriggerAbsent,
    /// The trigger was found but refused the click.
    TriggerRejected,
    /// The click produced no new item containers in time.
    NoNewContent,
    /// `max_rounds` activations were performed.
    RoundLimit,
}

/// Completion signal of one expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionReport {
    /// Successful trigger activations.
    pub activations: u32,
    pub termination: Termination,
}

enum State<E> {
    Seeking,
    Triggering(E),
    AwaitingContent { before: usize },
    Done(Termination),
}

/// Drives one navigated page until the trigger stops yielding content.
#[derive(Debug, Clone)]
pub struct DynamicContentExpander {
    trigger_selector: String,
    item_selector: String,
    trigger_timeout: Duration,
    content_timeout: Duration,
    poll_interval: Duration,
    max_rounds: Option<u32>,
}

impl DynamicContentExpander {
    pub fn new(config: &ExpansionConfig) -> Self {
        Self {
            trigger_selector: config.trigger_selector.clone(),
            item_selector: config.item_selector.clone(),
            trigger_timeout: config.trigger_timeout(),
            content_timeout: config.content_timeout(),
            poll_interval: config.poll_interval(),
            max_rounds: config.max_rounds,
        }
    }

    /// Run the loop to completion on `session`.
    pub async fn expand<S>(&self, session: &S) -> Result<ExpansionReport, SessionError>
    where
        S: BrowsingSession + ?Sized,
    {
        let mut activations = 0u32;
        let mut state = State::Seeking;

        let termination = loop {
            state = match state {
                State::Seeking => {
                    if self.max_rounds.is_some_and(|max| activations >= max) {
                        warn!(
                            target: "shelf.expand",
                            activations,
                            "round limit reached; treating page as fully loaded"
                        );
                        State::Done(Termination::RoundLimit)
                    } else {
                        match session
                            .wait_for_interactable(&self.trigger_selector, self.trigger_timeout)
                            .await?
                        {
                            Wait::Ready(trigger) => State::Triggering(trigger),
                            Wait::TimedOut => {
                                debug!(target: "shelf.expand", "trigger not clickable");
                                State::Done(Termination::TriggerAbsent)
                            }
                        }
                    }
                }
                State::Triggering(trigger) => {
                    let before = self.count_items(session).await?;
                    match session.activate(&trigger).await? {
                        Activation::Activated => {
                            activations += 1;
                            debug!(target: "shelf.expand", activations, before, "trigger activated");
                            State::AwaitingContent { before }
                        }
                        Activation::Rejected(reason) => {
                            debug!(target: "shelf.expand", %reason, "trigger refused activation");
                            State::Done(Termination::TriggerRejected)
                        }
                    }
                }
                State::AwaitingContent { before } => {
                    if self.await_new_content(session, before).await? {
                        State::Seeking
                    } else {
                        debug!(target: "shelf.expand", before, "no new items after activation");
                        State::Done(Termination::NoNewContent)
                    }
                }
                State::Done(termination) => break termination,
            };
        };

        let report = ExpansionReport {
            activations,
            termination,
        };
        info!(
            target: "shelf.expand",
            activations,
            termination = ?termination,
            "page expansion finished"
        );
        Ok(report)
    }

    async fn count_items<S>(&self, session: &S) -> Result<usize, SessionError>
    where
        S: BrowsingSession + ?Sized,
    {
        match session.locate_optional(ROOT_SELECTOR).await? {
            Lookup::Found(root) => Ok(session
                .locate_all_under_scope(&self.item_selector, &root)
                .await?
                .len()),
            Lookup::Absent => Ok(0),
        }
    }

    /// Poll until more than `before` items exist or `content_timeout` passes.
    async fn await_new_content<S>(&self, session: &S, before: usize) -> Result<bool, SessionError>
    where
        S: BrowsingSession + ?Sized,
    {
        let deadline = Instant::now() + self.content_timeout;
        loop {
            let now = self.count_items(session).await?;
            if now > before {
                debug!(target: "shelf.expand", before, now, "new items appeared");
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(self.poll_interval).await;
        }
    }
}
