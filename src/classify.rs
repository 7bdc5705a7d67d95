//! Non-academic author classification.
//!
//! Turns parsed [`ArticleRecord`]s into output rows, keeping only articles with at
//! least one author whose affiliation matches the keyword rules.

use crate::models::{ArticleRecord, Author, QualifyingPaper, NO_EMAIL};
use crate::rules::ClassifierRules;
use tracing::debug;

/// Separator for multi-valued CSV cells
pub const CELL_SEPARATOR: &str = "; ";

/// First author email in document order, or "N/A"
pub fn corresponding_email(authors: &[Author]) -> String {
    authors
        .iter()
        .find(|a| a.has_email())
        .map(|a| a.email.clone())
        .unwrap_or_else(|| NO_EMAIL.to_string())
}

/// Authors whose affiliation matches the rules, in document order
pub fn non_academic_authors<'a>(
    record: &'a ArticleRecord,
    rules: &ClassifierRules,
) -> Vec<&'a Author> {
    record
        .authors
        .iter()
        .filter(|a| rules.is_non_academic(&a.affiliation))
        .collect()
}

/// Build the output row for a record, or `None` when every author is academic
pub fn qualify(record: &ArticleRecord, rules: &ClassifierRules) -> Option<QualifyingPaper> {
    let company_authors = non_academic_authors(record, rules);
    if company_authors.is_empty() {
        return None;
    }

    let names: Vec<&str> = company_authors.iter().map(|a| a.name.as_str()).collect();
    let affiliations: Vec<&str> = company_authors
        .iter()
        .map(|a| a.affiliation.as_str())
        .collect();

    Some(QualifyingPaper {
        id: record.id.clone(),
        title: record.title.clone(),
        publication_date: record.publication_date.clone(),
        non_academic_authors: names.join(CELL_SEPARATOR),
        company_affiliations: affiliations.join(CELL_SEPARATOR),
        corresponding_email: corresponding_email(&record.authors),
    })
}

/// Qualifying rows for all records, preserving input order
pub fn filter_papers(records: &[ArticleRecord], rules: &ClassifierRules) -> Vec<QualifyingPaper> {
    let papers: Vec<QualifyingPaper> = records.iter().filter_map(|r| qualify(r, rules)).collect();

    debug!(
        total = records.len(),
        qualifying = papers.len(),
        "Classified articles"
    );

    papers
}
