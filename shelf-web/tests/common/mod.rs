#![allow(dead_code)]

use anyhow::anyhow;
use async_trait::async_trait;
use shelf_common::Record;
use shelf_config::{Category, ExpansionConfig, ShelfConfig};
use shelf_web::{
    Activation, BrowsingSession, ExportError, Lookup, RecordSink, SessionError, Wait,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

pub const ITEM: &str = ".thumbnail";
pub const TRIGGER: &str = "a.ecomerce-items-scroll-more";
pub const CONSENT: &str = ".acceptCookies";
pub const HOME: &str = "https://shop.test/more/";

/// Markup of one product card in the layout the default selectors expect.
pub fn product(title: &str, price: Option<&str>, stars: usize, reviews: &str) -> String {
    let price = price
        .map(|p| format!(r#"<h4 class="price float-end">{p}</h4>"#))
        .unwrap_or_default();
    let stars = r#"<span class="ws-icon ws-icon-star"></span>"#.repeat(stars);
    format!(
        r#"<div class="col-md-4 col-xl-4 col-lg-4"><div class="card thumbnail">
  <div class="caption">{price}
    <h4><a href="/product/{title}" class="title" title="{title}">{title}</a></h4>
    <p class="description card-text">{title}&nbsp;description</p>
  </div>
  <div class="ratings">
    <p class="review-count float-end">{reviews}</p>
    <p>{stars}</p>
  </div>
</div></div>"#
    )
}

pub fn products(prefix: &str, n: usize) -> Vec<String> {
    (0..n)
        .map(|i| product(&format!("{prefix}-{i}"), Some("$10.00"), 3, "4 reviews"))
        .collect()
}

/// Scripted state of one page.
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    pub items: Vec<String>,
    /// Appended one batch per successful click.
    pub batches: VecDeque<Vec<String>>,
    /// Trigger is shown but every click is refused.
    pub reject_clicks: bool,
    /// Trigger stays clickable after the batches run out.
    pub stuck_trigger: bool,
    /// Every click appends one more item, forever.
    pub endless: bool,
}

impl MockPage {
    pub fn with_items(items: Vec<String>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    pub fn batches(mut self, batches: Vec<Vec<String>>) -> Self {
        self.batches = batches.into();
        self
    }

    fn trigger_visible(&self) -> bool {
        self.reject_clicks || self.stuck_trigger || self.endless || !self.batches.is_empty()
    }

    fn markup(&self) -> String {
        format!(
            "<html><head><title>shop</title></head><body><div class=\"row\">{}</div></body></html>",
            self.items.concat()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockElement {
    Root,
    Trigger,
    Consent,
    Item(usize),
}

#[derive(Debug, Default)]
pub struct Calls {
    pub navigations: Vec<String>,
    pub interactable_waits: usize,
    pub trigger_activations: usize,
    pub consent_clicks: usize,
}

#[derive(Default)]
struct State {
    pages: HashMap<String, MockPage>,
    current: Option<MockPage>,
    consent_banner: bool,
    unreachable: HashSet<String>,
    lost: bool,
    calls: Calls,
}

/// In-memory [`BrowsingSession`] driven by [`MockPage`] scripts.
#[derive(Default)]
pub struct MockSession {
    state: Mutex<State>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, page: MockPage) -> Self {
        self.state.lock().unwrap().pages.insert(url.to_string(), page);
        self
    }

    pub fn with_consent_banner(self) -> Self {
        self.state.lock().unwrap().consent_banner = true;
        self
    }

    pub fn unreachable(self, url: &str) -> Self {
        self.state.lock().unwrap().unreachable.insert(url.to_string());
        self
    }

    /// Navigate straight to `page`, bypassing the url table.
    pub fn loaded(page: MockPage) -> Self {
        let session = Self::new();
        session.state.lock().unwrap().current = Some(page);
        session
    }

    pub fn lose_session(&self) {
        self.state.lock().unwrap().lost = true;
    }

    pub fn with_calls<T>(&self, f: impl FnOnce(&Calls) -> T) -> T {
        f(&self.state.lock().unwrap().calls)
    }

    pub fn item_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .current
            .as_ref()
            .map_or(0, |p| p.items.len())
    }

    fn check(state: &State) -> Result<(), SessionError> {
        if state.lost {
            return Err(SessionError::Driver(anyhow!("invalid session id")));
        }
        Ok(())
    }
}

#[async_trait]
impl BrowsingSession for MockSession {
    type Element = MockElement;

    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap();
        Self::check(&state)?;
        state.calls.navigations.push(url.to_string());
        if state.unreachable.contains(url) {
            return Err(SessionError::Navigation {
                url: url.to_string(),
                source: anyhow!("net::ERR_NAME_NOT_RESOLVED"),
            });
        }
        state.current = Some(state.pages.get(url).cloned().unwrap_or_default());
        Ok(())
    }

    async fn locate_optional(&self, selector: &str) -> Result<Lookup<MockElement>, SessionError> {
        let state = self.state.lock().unwrap();
        Self::check(&state)?;
        Ok(match selector {
            "html" if state.current.is_some() => Lookup::Found(MockElement::Root),
            _ => Lookup::Absent,
        })
    }

    async fn locate_all_under_scope(
        &self,
        selector: &str,
        scope: &MockElement,
    ) -> Result<Vec<MockElement>, SessionError> {
        let state = self.state.lock().unwrap();
        Self::check(&state)?;
        match (&state.current, selector, scope) {
            (Some(page), ITEM, MockElement::Root) => {
                Ok((0..page.items.len()).map(MockElement::Item).collect())
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn wait_for_presence(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<Wait<MockElement>, SessionError> {
        let state = self.state.lock().unwrap();
        Self::check(&state)?;
        Ok(match selector {
            CONSENT if state.consent_banner => Wait::Ready(MockElement::Consent),
            _ => Wait::TimedOut,
        })
    }

    async fn wait_for_interactable(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<Wait<MockElement>, SessionError> {
        let mut state = self.state.lock().unwrap();
        Self::check(&state)?;
        state.calls.interactable_waits += 1;
        let visible = state.current.as_ref().is_some_and(MockPage::trigger_visible);
        Ok(if selector == TRIGGER && visible {
            Wait::Ready(MockElement::Trigger)
        } else {
            Wait::TimedOut
        })
    }

    async fn activate(&self, element: &MockElement) -> Result<Activation, SessionError> {
        let mut state = self.state.lock().unwrap();
        Self::check(&state)?;
        match element {
            MockElement::Consent => {
                state.calls.consent_clicks += 1;
                state.consent_banner = false;
                Ok(Activation::Activated)
            }
            MockElement::Trigger => {
                let Some(page) = state.current.as_mut() else {
                    return Ok(Activation::Rejected("stale element reference".into()));
                };
                if page.reject_clicks {
                    return Ok(Activation::Rejected("element not interactable".into()));
                }
                if page.endless {
                    let n = page.items.len();
                    page.items.push(product(&format!("endless-{n}"), Some("$1.00"), 1, "1 reviews"));
                } else if let Some(batch) = page.batches.pop_front() {
                    page.items.extend(batch);
                }
                state.calls.trigger_activations += 1;
                Ok(Activation::Activated)
            }
            _ => Ok(Activation::Rejected("element not interactable".into())),
        }
    }

    async fn current_markup_snapshot(&self) -> Result<String, SessionError> {
        let state = self.state.lock().unwrap();
        Self::check(&state)?;
        Ok(state.current.as_ref().map(MockPage::markup).unwrap_or_default())
    }
}

/// Keeps every write in memory; can be told to fail for one category.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub written: Vec<(String, Vec<Record>)>,
    pub fail_on: Option<String>,
}

impl RecordSink for MemorySink {
    fn write(&mut self, category: &Category, records: &[Record]) -> Result<(), ExportError> {
        if self.fail_on.as_deref() == Some(category.name.as_str()) {
            return Err(ExportError::Io {
                path: format!("{}.csv", category.name).into(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.written.push((category.name.clone(), records.to_vec()));
        Ok(())
    }
}

/// Expansion settings fast enough for tests.
pub fn fast_expansion() -> ExpansionConfig {
    ExpansionConfig {
        trigger_timeout_ms: 20,
        content_timeout_ms: 30,
        poll_interval_ms: 5,
        ..ExpansionConfig::default()
    }
}

pub fn test_config(categories: Vec<Category>) -> ShelfConfig {
    ShelfConfig {
        home_url: HOME.to_string(),
        expansion: fast_expansion(),
        categories,
        ..ShelfConfig::default()
    }
}
