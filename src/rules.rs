//! Classifier rules: the commercial keyword list and the email pattern.
//!
//! Rules are resolved from an explicit JSON file, then `~/.rustpubmed_rules.json`,
//! then the built-in defaults.

use crate::error::{PubmedError, Result};
use crate::models::NO_EMAIL;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Affiliation keywords that mark an author as non-academic
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "pharma",
    "biotech",
    "therapeutics",
    "biosciences",
    "genomics",
    "biopharma",
    "life sciences",
    "laboratories",
    "inc.",
    "corp",
    "llc",
    "gmbh",
    "s.a.",
    "drug discovery",
    "biologics",
    "biomedicine",
    "diagnostics",
    "pharmaceutical",
    "clinical research",
    "medtech",
    "bioprocessing",
    "CRISPR",
];

/// Email-shaped substring
pub const DEFAULT_EMAIL_PATTERN: &str = r"[\w.-]+@[\w.-]+\.[a-zA-Z]{2,6}";

/// Default rules file: `~/.rustpubmed_rules.json`
fn default_rules_path() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".rustpubmed_rules.json"))
}

/// On-disk rules format; missing fields fall back to the defaults
#[derive(Debug, Default, Deserialize)]
struct RulesFile {
    #[serde(default)]
    keywords: Option<Vec<String>>,
    #[serde(default)]
    email_pattern: Option<String>,
}

/// Keyword classifier and email extractor
#[derive(Debug, Clone)]
pub struct ClassifierRules {
    /// Lower-cased keywords
    keywords: Vec<String>,
    email_pattern: Regex,
}

impl ClassifierRules {
    /// Build rules from a keyword list and an email regex.
    ///
    /// Keywords are lower-cased so matching is case-insensitive on both sides.
    pub fn new<I, S>(keywords: I, email_pattern: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        Ok(Self {
            keywords,
            email_pattern: Regex::new(email_pattern)?,
        })
    }

    /// Built-in pharma/biotech keywords and email pattern
    pub fn builtin() -> Result<Self> {
        Self::new(DEFAULT_KEYWORDS.iter().copied(), DEFAULT_EMAIL_PATTERN)
    }

    /// Load rules from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PubmedError::Config(format!("Cannot read rules file {:?}: {}", path, e))
        })?;
        Self::from_json(&content)
    }

    /// Parse rules from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let file: RulesFile = serde_json::from_str(json)?;
        let pattern = file
            .email_pattern
            .unwrap_or_else(|| DEFAULT_EMAIL_PATTERN.to_string());

        match file.keywords {
            Some(keywords) => Self::new(keywords, &pattern),
            None => Self::new(DEFAULT_KEYWORDS.iter().copied(), &pattern),
        }
    }

    /// Resolve rules: explicit file, then the home-directory file, then built-ins
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!(path = ?path, "Loading classifier rules");
            return Self::from_file(path);
        }

        match default_rules_path() {
            Some(path) if path.exists() => {
                info!(path = ?path, "Loading classifier rules");
                Self::from_file(&path)
            }
            _ => {
                debug!("Using built-in classifier rules");
                Self::builtin()
            }
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// True when the affiliation contains any keyword, ignoring case
    pub fn is_non_academic(&self, affiliation: &str) -> bool {
        let affiliation = affiliation.to_lowercase();
        self.keywords.iter().any(|k| affiliation.contains(k.as_str()))
    }

    /// First email-shaped substring of `text`, or "N/A"
    pub fn extract_email(&self, text: &str) -> String {
        self.email_pattern
            .find(text)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| NO_EMAIL.to_string())
    }
}
