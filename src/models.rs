//! Record types flowing through the pipeline.

use serde::Serialize;

/// Placeholder for an article without a PMID
pub const UNKNOWN_ID: &str = "Unknown ID";
/// Placeholder for an article without a title
pub const UNKNOWN_TITLE: &str = "Unknown Title";
/// Placeholder for an article without a publication date
pub const UNKNOWN_DATE: &str = "Unknown Date";
/// Placeholder for an author missing a fore name or last name
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
/// Placeholder for an author without an affiliation
pub const NO_AFFILIATION: &str = "No Affiliation";
/// Marker for "no email found"
pub const NO_EMAIL: &str = "N/A";

/// A single author as listed on an article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// "ForeName LastName", or [`UNKNOWN_AUTHOR`]
    pub name: String,
    /// Free-text affiliation, or [`NO_AFFILIATION`]
    pub affiliation: String,
    /// First email found in the affiliation, or [`NO_EMAIL`]
    pub email: String,
}

impl Author {
    pub fn has_email(&self) -> bool {
        self.email != NO_EMAIL
    }
}

/// One parsed `<PubmedArticle>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub id: String,
    pub title: String,
    pub publication_date: String,
    /// Authors in document order
    pub authors: Vec<Author>,
}

/// Output row for an article with at least one non-academic author
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualifyingPaper {
    #[serde(rename = "PubmedID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Publication Date")]
    pub publication_date: String,
    /// Names joined with "; "
    #[serde(rename = "Non-academic Author(s)")]
    pub non_academic_authors: String,
    /// Affiliations joined with "; "
    #[serde(rename = "Company Affiliation(s)")]
    pub company_affiliations: String,
    #[serde(rename = "Corresponding Author Email")]
    pub corresponding_email: String,
}

/// CSV column order for exported rows
pub const PAPER_COLUMNS: &[&str] = &[
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academic Author(s)",
    "Company Affiliation(s)",
    "Corresponding Author Email",
];
