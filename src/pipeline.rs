//! Search -> fetch -> classify.
//!
//! Empty searches and zero qualifying papers are normal outcomes, not errors.
//! Network failures abort the run.

use crate::classify;
use crate::error::Result;
use crate::eutils::PubmedClient;
use crate::models::QualifyingPaper;
use crate::rules::ClassifierRules;
use tracing::info;

/// Terminal state of a run
#[derive(Debug)]
pub enum PipelineOutcome {
    /// The search returned no identifiers
    NoResults,
    /// Articles were fetched but none had a non-academic author
    NoQualifying { fetched: usize },
    /// Rows ready for export
    Papers(Vec<QualifyingPaper>),
}

pub async fn run(
    client: &PubmedClient,
    query: &str,
    max_results: usize,
    rules: &ClassifierRules,
) -> Result<PipelineOutcome> {
    let ids = client.search_ids(query, max_results).await?;
    if ids.is_empty() {
        return Ok(PipelineOutcome::NoResults);
    }

    let records = client.fetch_articles(&ids, rules).await?;
    let papers = classify::filter_papers(&records, rules);

    info!(
        fetched = records.len(),
        qualifying = papers.len(),
        "Pipeline complete"
    );

    if papers.is_empty() {
        Ok(PipelineOutcome::NoQualifying {
            fetched: records.len(),
        })
    } else {
        Ok(PipelineOutcome::Papers(papers))
    }
}
