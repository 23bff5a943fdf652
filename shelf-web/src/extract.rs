//! Tolerant record extraction from a static markup snapshot.
//!
//! Each item container is parsed on its own. The first missing element or
//! unparsable value abandons that item with a [`Diagnostic`]; its siblings
//! are unaffected.

use scraper::{ElementRef, Html, Selector};
use shelf_common::{Record, ShelfError, MAX_RATING};
use shelf_config::SelectorConfig;
use std::fmt;
use tracing::{debug, warn};

/// Record fields, named in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Price,
    ReviewCount,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::Price => "price",
            Field::ReviewCount => "review count",
        })
    }
}

/// Why an item produced no record.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ItemError {
    #[error("missing {0} element")]
    MissingElement(Field),

    #[error("title element has no `{0}` attribute")]
    MissingAttribute(String),

    #[error("title is empty")]
    EmptyTitle,

    #[error("unparsable price `{0}`")]
    InvalidPrice(String),

    #[error("{0} rating markers exceed the maximum of 5")]
    RatingOutOfRange(usize),

    #[error("unparsable review count `{0}`")]
    InvalidReviewCount(String),

    #[error("record rejected: {0}")]
    Rejected(String),
}

/// A skipped item.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Position of the container among all containers on the page.
    pub index: usize,
    /// Title of the item when it was read before the failure.
    pub context: Option<String>,
    pub reason: ItemError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(title) => write!(f, "item #{} ({title}): {}", self.index, self.reason),
            None => write!(f, "item #{}: {}", self.index, self.reason),
        }
    }
}

/// Records in source order plus one diagnostic per skipped item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub records: Vec<Record>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compiled selectors for one catalog layout.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    container: Selector,
    title: Selector,
    title_attribute: String,
    description: Selector,
    price: Selector,
    rating_marker: Selector,
    review_count: Selector,
}

fn compile(selector: &str) -> shelf_common::Result<Selector> {
    Selector::parse(selector).map_err(|e| ShelfError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

impl RecordExtractor {
    pub fn new(config: &SelectorConfig) -> shelf_common::Result<Self> {
        Ok(Self {
            container: compile(&config.container)?,
            title: compile(&config.title)?,
            title_attribute: config.title_attribute.clone(),
            description: compile(&config.description)?,
            price: compile(&config.price)?,
            rating_marker: compile(&config.rating_marker)?,
            review_count: compile(&config.review_count)?,
        })
    }

    /// Parse every item container in `markup`.
    pub fn extract(&self, markup: &str) -> Extraction {
        let document = Html::parse_document(markup);
        let mut extraction = Extraction::default();

        for (index, item) in document.select(&self.container).enumerate() {
            match self.extract_item(item) {
                Ok(record) => extraction.records.push(record),
                Err((context, reason)) => {
                    let diagnostic = Diagnostic {
                        index,
                        context,
                        reason,
                    };
                    warn!(target: "shelf.extract", %diagnostic, "skipping item");
                    extraction.diagnostics.push(diagnostic);
                }
            }
        }

        debug!(
            target: "shelf.extract",
            records = extraction.records.len(),
            skipped = extraction.diagnostics.len(),
            "extraction finished"
        );
        extraction
    }

    fn extract_item(&self, item: ElementRef<'_>) -> Result<Record, (Option<String>, ItemError)> {
        let title = self.read_title(item).map_err(|e| (None, e))?;
        self.extract_fields(item, &title)
            .map_err(|e| (Some(title.clone()), e))
    }

    fn extract_fields(&self, item: ElementRef<'_>, title: &str) -> Result<Record, ItemError> {
        let description =
            normalize_text(&self.first_text(item, &self.description, Field::Description)?);

        let price_text = self.first_text(item, &self.price, Field::Price)?;
        let price = parse_price(&price_text).ok_or(ItemError::InvalidPrice(price_text))?;

        let markers = item.select(&self.rating_marker).count();
        let rating = u8::try_from(markers)
            .ok()
            .filter(|r| *r <= MAX_RATING)
            .ok_or(ItemError::RatingOutOfRange(markers))?;

        let reviews_text = self.first_text(item, &self.review_count, Field::ReviewCount)?;
        let review_count = parse_leading_count(&reviews_text)
            .ok_or_else(|| ItemError::InvalidReviewCount(reviews_text.trim().to_string()))?;

        Record::new(title, description, price, rating, review_count)
            .map_err(|e| ItemError::Rejected(e.to_string()))
    }

    fn read_title(&self, item: ElementRef<'_>) -> Result<String, ItemError> {
        let element = item
            .select(&self.title)
            .next()
            .ok_or(ItemError::MissingElement(Field::Title))?;
        let title = element
            .value()
            .attr(&self.title_attribute)
            .ok_or_else(|| ItemError::MissingAttribute(self.title_attribute.clone()))?
            .trim();
        if title.is_empty() {
            return Err(ItemError::EmptyTitle);
        }
        Ok(title.to_string())
    }

    fn first_text(
        &self,
        item: ElementRef<'_>,
        selector: &Selector,
        field: Field,
    ) -> Result<String, ItemError> {
        item.select(selector)
            .next()
            .map(|el| el.text().collect::<String>())
            .ok_or(ItemError::MissingElement(field))
    }
}

/// Replace non-breaking spaces and trim.
fn normalize_text(raw: &str) -> String {
    raw.replace('\u{a0}', " ").trim().to_string()
}

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥'];

/// `"$1,099.50"` → `1099.5`. Only a leading currency symbol is stripped;
/// negative or non-finite values are rejected.
fn parse_price(raw: &str) -> Option<f64> {
    let numeral: String = raw
        .trim()
        .trim_start_matches(CURRENCY_SYMBOLS)
        .trim_start()
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if !numeral.starts_with(|c: char| c.is_ascii_digit() || c == '.' || c == '-') {
        return None;
    }
    let value: f64 = numeral.parse().ok()?;
    // `-0` survives the sign check; export it as `0`.
    (value.is_finite() && value >= 0.0).then_some(value.abs())
}

/// `"12 reviews"` → `12`.
fn parse_leading_count(raw: &str) -> Option<u32> {
    raw.split_whitespace().next()?.parse().ok()
}
