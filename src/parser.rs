//! EFetch XML parser using quick-xml.
//!
//! Streams `<PubmedArticle>` elements into [`ArticleRecord`]s. Absent fields are
//! replaced with placeholder strings; an article whose content cannot be decoded
//! is skipped rather than failing the batch.

use crate::error::Result;
use crate::models::{
    ArticleRecord, Author, NO_AFFILIATION, NO_EMAIL, UNKNOWN_AUTHOR, UNKNOWN_DATE, UNKNOWN_ID,
    UNKNOWN_TITLE,
};
use crate::rules::ClassifierRules;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};

/// Parse every `<PubmedArticle>` in an EFetch response
pub fn parse_articles(xml: &str, rules: &ClassifierRules) -> Result<Vec<ArticleRecord>> {
    let mut reader = Reader::from_str(xml);
    let mut articles = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"PubmedArticle" => {
                match parse_article(&mut reader, rules) {
                    Ok(article) => articles.push(article),
                    Err(e) => warn!(error = %e, "Skipping unreadable article"),
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    debug!(count = articles.len(), "Parsed articles from XML response");
    Ok(articles)
}

/// Fields collected while scanning one article
#[derive(Default)]
struct ArticleFields {
    pmid: Option<String>,
    title: Option<String>,
    pub_date: Option<String>,
    authors: Vec<Author>,
}

impl ArticleFields {
    fn into_record(self) -> ArticleRecord {
        ArticleRecord {
            id: self.pmid.unwrap_or_else(|| UNKNOWN_ID.to_string()),
            title: self.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            publication_date: self.pub_date.unwrap_or_else(|| UNKNOWN_DATE.to_string()),
            authors: self.authors,
        }
    }
}

/// Scan one article; the first PMID, ArticleTitle and PubDate win,
/// every Author element is collected in order.
fn parse_article(reader: &mut Reader<&[u8]>, rules: &ClassifierRules) -> Result<ArticleRecord> {
    let mut fields = ArticleFields::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"PMID" => {
                    let text = read_text_content(reader, b"PMID")?;
                    if fields.pmid.is_none() {
                        fields.pmid = non_empty(text);
                    }
                }
                b"ArticleTitle" => {
                    let text = read_text_content(reader, b"ArticleTitle")?;
                    if fields.title.is_none() {
                        fields.title = non_empty(text);
                    }
                }
                b"PubDate" => {
                    let date = parse_pub_date(reader)?;
                    if fields.pub_date.is_none() {
                        fields.pub_date = date;
                    }
                }
                b"Author" => fields.authors.push(parse_author(reader, rules)?),
                _ => {}
            },
            Event::Empty(e) if e.name().as_ref() == b"Author" => {
                fields.authors.push(build_author(None, None, Vec::new(), rules));
            }
            Event::End(e) if e.name().as_ref() == b"PubmedArticle" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(fields.into_record())
}

/// Join the parts of `<PubDate>` (Year, Season, Month, Day or MedlineDate)
fn parse_pub_date(reader: &mut Reader<&[u8]>) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let mut parts = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                let text = read_text_content(reader, &name)?;
                if let Some(text) = non_empty(text) {
                    parts.push(text);
                }
            }
            Event::Text(e) => {
                if let Some(text) = non_empty(e.unescape()?.into_owned()) {
                    parts.push(text);
                }
            }
            Event::End(e) if e.name().as_ref() == b"PubDate" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if parts.is_empty() {
        Ok(None)
    } else {
        Ok(Some(parts.join(" ")))
    }
}

fn parse_author(reader: &mut Reader<&[u8]>, rules: &ClassifierRules) -> Result<Author> {
    let mut last_name = None;
    let mut fore_name = None;
    let mut affiliations = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"LastName" => last_name = non_empty(read_text_content(reader, b"LastName")?),
                b"ForeName" => fore_name = non_empty(read_text_content(reader, b"ForeName")?),
                b"Affiliation" => {
                    if let Some(text) = non_empty(read_text_content(reader, b"Affiliation")?) {
                        affiliations.push(text);
                    }
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"Author" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(build_author(fore_name, last_name, affiliations, rules))
}

/// The first affiliation is kept; the email is the first match across all of them
fn build_author(
    fore_name: Option<String>,
    last_name: Option<String>,
    affiliations: Vec<String>,
    rules: &ClassifierRules,
) -> Author {
    let name = match (fore_name, last_name) {
        (Some(fore), Some(last)) => format!("{} {}", fore, last),
        _ => UNKNOWN_AUTHOR.to_string(),
    };
    let email = affiliations
        .iter()
        .map(|a| rules.extract_email(a))
        .find(|e| e != NO_EMAIL)
        .unwrap_or_else(|| NO_EMAIL.to_string());
    let affiliation = affiliations
        .into_iter()
        .next()
        .unwrap_or_else(|| NO_AFFILIATION.to_string());

    Author {
        name,
        affiliation,
        email,
    }
}

/// Read the text of an element, flattening nested markup like `<i>` or `<sup>`
fn read_text_content(reader: &mut Reader<&[u8]>, end_tag: &[u8]) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Start(_) => depth += 1,
            Event::End(e) => {
                depth -= 1;
                if depth == 0 && e.name().as_ref() == end_tag {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
