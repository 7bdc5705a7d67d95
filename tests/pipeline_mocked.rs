//! End-to-end pipeline tests against a mocked E-utilities server.

use rustpubmed::eutils::{ClientConfig, PubmedClient};
use rustpubmed::export::{self, WriteMode};
use rustpubmed::pipeline::{self, PipelineOutcome};
use rustpubmed::rules::ClassifierRules;
use rustpubmed::PubmedError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ESEARCH_RESPONSE: &str = r#"{
  "header": {"type": "esearch", "version": "0.3"},
  "esearchresult": {
    "count": "2", "retmax": "2", "retstart": "0",
    "idlist": ["111", "222"]
  }
}"#;

const ESEARCH_EMPTY: &str = r#"{"esearchresult": {"count": "0", "idlist": []}}"#;

const EFETCH_RESPONSE: &str = r#"<?xml version="1.0" ?>
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">111</PMID>
      <Article>
        <Journal>
          <JournalIssue><PubDate><Year>2024</Year><Month>Feb</Month></PubDate></JournalIssue>
        </Journal>
        <ArticleTitle>In vivo CRISPR editing in the clinic</ArticleTitle>
        <AuthorList>
          <Author>
            <LastName>Roe</LastName>
            <ForeName>Jane</ForeName>
            <AffiliationInfo><Affiliation>Broad Institute</Affiliation></AffiliationInfo>
          </Author>
          <Author>
            <LastName>Doe</LastName>
            <ForeName>John</ForeName>
            <AffiliationInfo><Affiliation>Editas Medicine, Inc.</Affiliation></AffiliationInfo>
            <AffiliationInfo><Affiliation>x@editas.com</Affiliation></AffiliationInfo>
          </Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">222</PMID>
      <Article>
        <ArticleTitle>Guide RNA design rules</ArticleTitle>
        <AuthorList>
          <Author>
            <LastName>Smith</LastName>
            <ForeName>Ada</ForeName>
            <AffiliationInfo><Affiliation>Stanford University, ada@stanford.edu</Affiliation></AffiliationInfo>
          </Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

fn client_for(server: &MockServer) -> PubmedClient {
    PubmedClient::new(ClientConfig {
        base_url: server.uri(),
        ..Default::default()
    })
    .expect("client")
}

fn rules() -> ClassifierRules {
    ClassifierRules::builtin().expect("rules")
}

async fn mount_search(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("retmode", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_end_to_end_keeps_only_company_papers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("term", "CRISPR gene editing"))
        .and(query_param("retmax", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ESEARCH_RESPONSE))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("id", "111,222"))
        .and(query_param("retmode", "xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_RESPONSE))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = pipeline::run(&client_for(&server), "CRISPR gene editing", 50, &rules())
        .await
        .expect("pipeline");

    let papers = match outcome {
        PipelineOutcome::Papers(papers) => papers,
        other => panic!("expected papers, got {:?}", other),
    };

    // 222 has only academic authors
    assert_eq!(papers.len(), 1);
    let paper = &papers[0];
    assert_eq!(paper.id, "111");
    assert_eq!(paper.title, "In vivo CRISPR editing in the clinic");
    assert_eq!(paper.publication_date, "2024 Feb");
    assert_eq!(paper.non_academic_authors, "John Doe");
    assert_eq!(paper.company_affiliations, "Editas Medicine, Inc.");
    assert_eq!(paper.corresponding_email, "x@editas.com");
}

#[tokio::test]
async fn test_end_to_end_email_in_affiliation() {
    let server = MockServer::start().await;
    mount_search(&server, r#"{"esearchresult": {"idlist": ["111"]}}"#).await;

    let xml = r#"<PubmedArticleSet><PubmedArticle><MedlineCitation><PMID>111</PMID><Article>
<ArticleTitle>T</ArticleTitle>
<AuthorList>
<Author><LastName>Roe</LastName><ForeName>Jane</ForeName><AffiliationInfo><Affiliation>Broad Institute</Affiliation></AffiliationInfo></Author>
<Author><LastName>Doe</LastName><ForeName>John</ForeName><AffiliationInfo><Affiliation>Editas Medicine, Inc. Electronic address: x@editas.com.</Affiliation></AffiliationInfo></Author>
</AuthorList></Article></MedlineCitation></PubmedArticle></PubmedArticleSet>"#;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(xml))
        .mount(&server)
        .await;

    let outcome = pipeline::run(&client_for(&server), "CRISPR gene editing", 50, &rules())
        .await
        .expect("pipeline");

    let PipelineOutcome::Papers(papers) = outcome else {
        panic!("expected papers");
    };
    assert_eq!(papers[0].non_academic_authors, "John Doe");
    assert_eq!(papers[0].corresponding_email, "x@editas.com");
}

#[tokio::test]
async fn test_empty_search_skips_fetch() {
    let server = MockServer::start().await;
    mount_search(&server, ESEARCH_EMPTY).await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = pipeline::run(&client_for(&server), "nothing matches", 50, &rules())
        .await
        .expect("pipeline");
    assert!(matches!(outcome, PipelineOutcome::NoResults));
}

#[tokio::test]
async fn test_no_qualifying_papers() {
    let server = MockServer::start().await;
    mount_search(&server, r#"{"esearchresult": {"idlist": ["222"]}}"#).await;

    let xml = r#"<PubmedArticleSet><PubmedArticle><MedlineCitation><PMID>222</PMID><Article>
<AuthorList><Author><LastName>Smith</LastName><ForeName>Ada</ForeName>
<AffiliationInfo><Affiliation>Stanford University</Affiliation></AffiliationInfo></Author></AuthorList>
</Article></MedlineCitation></PubmedArticle></PubmedArticleSet>"#;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(xml))
        .mount(&server)
        .await;

    let outcome = pipeline::run(&client_for(&server), "guide rna", 50, &rules())
        .await
        .expect("pipeline");
    assert!(matches!(outcome, PipelineOutcome::NoQualifying { fetched: 1 }));
}

#[tokio::test]
async fn test_search_http_error_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = pipeline::run(&client_for(&server), "anything", 50, &rules()).await;
    assert!(matches!(result, Err(PubmedError::Api { code: 500, .. })));
}

#[tokio::test]
async fn test_fetch_http_error_is_fatal() {
    let server = MockServer::start().await;
    mount_search(&server, ESEARCH_RESPONSE).await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let result = pipeline::run(&client_for(&server), "anything", 50, &rules()).await;
    assert!(matches!(result, Err(PubmedError::Api { code: 429, .. })));
}

#[tokio::test]
async fn test_api_key_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("api_key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ESEARCH_EMPTY))
        .expect(1)
        .mount(&server)
        .await;

    let client = PubmedClient::new(ClientConfig {
        base_url: server.uri(),
        api_key: Some("secret".to_string()),
        ..Default::default()
    })
    .expect("client");

    let ids = client.search_ids("q", 10).await.expect("search");
    assert!(ids.is_empty());
}

#[tokio::test]
async fn test_export_results_twice_appends() {
    let server = MockServer::start().await;
    mount_search(&server, ESEARCH_RESPONSE).await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_RESPONSE))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("papers.csv");

    for expected in [WriteMode::Created, WriteMode::Appended] {
        let PipelineOutcome::Papers(papers) =
            pipeline::run(&client, "CRISPR gene editing", 50, &rules())
                .await
                .expect("pipeline")
        else {
            panic!("expected papers");
        };
        assert_eq!(export::save_csv(&out, &papers).expect("save"), expected);
    }

    let content = std::fs::read_to_string(&out).expect("read");
    assert_eq!(content.matches("PubmedID").count(), 1);
    assert_eq!(content.lines().filter(|l| l.starts_with("111,")).count(), 2);
}
