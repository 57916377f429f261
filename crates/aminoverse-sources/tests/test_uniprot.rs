//! UniProt client against a mock server: primary search and both fallbacks.

use aminoverse_common::{Lookup, SandboxClient};
use aminoverse_sources::UniprotClient;
use aminoverse_test_utils::{uniprot_empty_search, uniprot_p53_entry, uniprot_p53_search, P53_ACCESSION, P53_NAME};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> UniprotClient {
    UniprotClient::with_base_url(SandboxClient::new().unwrap(), server.uri())
}

#[tokio::test]
async fn test_resolve_p53() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uniprotkb/search"))
        .and(query_param("query", "p53 AND organism_id:9606"))
        .and(query_param("format", "json"))
        .and(query_param("size", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(uniprot_p53_search()))
        .expect(1)
        .mount(&server)
        .await;

    let resolution = client(&server).resolve("p53").await;

    assert!(resolution.found);
    assert_eq!(resolution.canonical_id(), Some(P53_ACCESSION));
    assert_eq!(resolution.display_name.as_deref(), Some(P53_NAME));
    assert_eq!(resolution.error, None);
}

#[tokio::test]
async fn test_function_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uniprotkb/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(uniprot_p53_search()))
        .mount(&server)
        .await;

    let record = client(&server).get_function("p53").await.found().unwrap();

    assert_eq!(record.id, P53_ACCESSION);
    assert_eq!(record.name, P53_NAME);
    assert_eq!(record.gene_names, vec!["TP53"]);
    assert_eq!(record.organism, "Homo sapiens");
    assert!(record.function.starts_with("Multifunctional transcription factor"));
}

#[tokio::test]
async fn test_empty_results_are_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uniprotkb/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(uniprot_empty_search()))
        .mount(&server)
        .await;

    let uniprot = client(&server);

    let resolution = uniprot.resolve("notaprotein").await;
    assert!(!resolution.found);
    assert_eq!(resolution.error.as_deref(), Some("No protein information found"));

    assert_eq!(
        uniprot.get_function("notaprotein").await,
        Lookup::NotFound("No protein information found".to_string())
    );
}

#[tokio::test]
async fn test_top_hit_without_accession() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uniprotkb/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{ "uniProtkbId": "P53_HUMAN" }]
        })))
        .mount(&server)
        .await;

    let resolution = client(&server).resolve("p53").await;
    assert!(!resolution.found);
    assert_eq!(resolution.canonical_id(), None);
    assert_eq!(resolution.error.as_deref(), Some("Could not determine UniProt ID"));
}

#[tokio::test]
async fn test_direct_accession_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uniprotkb/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/uniprotkb/{}", P53_ACCESSION)))
        .respond_with(ResponseTemplate::new(200).set_body_json(uniprot_p53_entry()))
        .expect(1)
        .mount(&server)
        .await;

    let resolution = client(&server).resolve(P53_ACCESSION).await;

    assert!(resolution.found);
    assert_eq!(resolution.canonical_id(), Some(P53_ACCESSION));
}

#[tokio::test]
async fn test_gene_name_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uniprotkb/search"))
        .and(query_param("query", "KRAS AND organism_id:9606"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/uniprotkb/search"))
        .and(query_param("query", "gene:KRAS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{
                "primaryAccession": "P01116",
                "proteinDescription": { "recommendedName": { "fullName": { "value": "GTPase KRas" } } }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolution = client(&server).resolve("KRAS").await;

    assert_eq!(resolution.canonical_id(), Some("P01116"));
    assert_eq!(resolution.display_name.as_deref(), Some("GTPase KRas"));
}

#[tokio::test]
async fn test_all_attempts_failing_reports_primary_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uniprotkb/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let uniprot = client(&server);

    let resolution = uniprot.resolve("p53").await;
    assert!(!resolution.found);
    assert!(resolution
        .error
        .as_deref()
        .unwrap()
        .starts_with("Error querying UniProt API:"));

    match uniprot.get_function("p53").await {
        Lookup::Failed(msg) => assert!(msg.starts_with("Error querying UniProt API:")),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_blocked_host_fails_without_request() {
    let uniprot = UniprotClient::with_base_url(SandboxClient::new().unwrap(), "https://uniprot.example.com");
    let resolution = uniprot.resolve("p53").await;
    assert!(!resolution.found);
    assert!(resolution.error.unwrap().contains("not in allowlist"));
}
