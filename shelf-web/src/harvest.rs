//! Sequences one browsing session through every configured category.

use crate::consent::accept_cookies;
use crate::expand::{DynamicContentExpander, ExpansionReport};
use crate::export::{ExportError, RecordSink};
use crate::extract::{Diagnostic, Extraction, RecordExtractor};
use crate::session::{BrowsingSession, SessionError};
use shelf_config::{Category, ConsentConfig, ShelfConfig};
use tracing::{error, info, info_span, Instrument};

/// A category that could not be completed.
#[derive(thiserror::Error, Debug)]
pub enum HarvestError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// What one completed category produced.
#[derive(Debug, Clone)]
pub struct CategoryReport {
    pub category: String,
    pub expansion: ExpansionReport,
    pub records: usize,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Default)]
pub struct HarvestSummary {
    pub completed: Vec<CategoryReport>,
    pub failed: Vec<(String, HarvestError)>,
}

impl HarvestSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total_records(&self) -> usize {
        self.completed.iter().map(|c| c.records).sum()
    }
}

/// navigate → expand → extract → export, once per category.
pub struct Harvester {
    home_url: String,
    consent: ConsentConfig,
    expander: DynamicContentExpander,
    extractor: RecordExtractor,
}

impl Harvester {
    pub fn from_config(config: &ShelfConfig) -> shelf_common::Result<Self> {
        Ok(Self {
            home_url: config.home_url.clone(),
            consent: config.consent.clone(),
            expander: DynamicContentExpander::new(&config.expansion),
            extractor: RecordExtractor::new(&config.selectors)?,
        })
    }

    /// Visit the home page once to dismiss the consent banner, then harvest
    /// every category in order.
    ///
    /// A failing category is recorded in the summary and the run moves on;
    /// only a failure on the home page aborts the run.
    pub async fn run<S, K>(
        &self,
        session: &S,
        sink: &mut K,
        categories: &[Category],
    ) -> Result<HarvestSummary, SessionError>
    where
        S: BrowsingSession + ?Sized,
        K: RecordSink + ?Sized,
    {
        session.navigate(&self.home_url).await?;
        accept_cookies(session, &self.consent).await?;

        let mut summary = HarvestSummary::default();
        for category in categories {
            let span = info_span!("category", name = %category.name);
            match self.harvest(session, sink, category).instrument(span).await {
                Ok(report) => summary.completed.push(report),
                Err(e) => {
                    error!(
                        target: "shelf.harvest",
                        category = %category.name,
                        error = %e,
                        "category failed; continuing with the next one"
                    );
                    summary.failed.push((category.name.clone(), e));
                }
            }
        }

        info!(
            target: "shelf.harvest",
            completed = summary.completed.len(),
            failed = summary.failed.len(),
            records = summary.total_records(),
            "harvest finished"
        );
        Ok(summary)
    }

    async fn harvest<S, K>(
        &self,
        session: &S,
        sink: &mut K,
        category: &Category,
    ) -> Result<CategoryReport, HarvestError>
    where
        S: BrowsingSession + ?Sized,
        K: RecordSink + ?Sized,
    {
        let (expansion, extraction) = self.collect(session, category).await?;
        sink.write(category, &extraction.records)?;

        Ok(CategoryReport {
            category: category.name.clone(),
            expansion,
            records: extraction.records.len(),
            diagnostics: extraction.diagnostics,
        })
    }

    /// Load one category page completely and extract its records.
    pub async fn collect<S>(
        &self,
        session: &S,
        category: &Category,
    ) -> Result<(ExpansionReport, Extraction), SessionError>
    where
        S: BrowsingSession + ?Sized,
    {
        info!(target: "shelf.harvest", url = %category.url, "loading category");
        session.navigate(category.url.as_str()).await?;

        let expansion = self.expander.expand(session).await?;
        let markup = session.current_markup_snapshot().await?;
        let extraction = self.extractor.extract(&markup);

        info!(
            target: "shelf.harvest",
            activations = expansion.activations,
            records = extraction.records.len(),
            skipped = extraction.diagnostics.len(),
            "category extracted"
        );
        Ok((expansion, extraction))
    }
}
