//! AlphaFold client against a mock server.

use aminoverse_common::{Lookup, SandboxClient};
use aminoverse_sources::alphafold::{NO_PDB_URL, STRUCTURE_NOT_FOUND};
use aminoverse_sources::AlphaFoldClient;
use aminoverse_test_utils::{alphafold_p53_prediction, P53_ACCESSION, PDB_PATH, PDB_TEXT};
use pretty_assertions::assert_eq;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> AlphaFoldClient {
    AlphaFoldClient::with_base_url(SandboxClient::new().unwrap(), server.uri())
}

#[tokio::test]
async fn test_prediction_then_pdb_download() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/prediction/P04637"))
        .respond_with(ResponseTemplate::new(200).set_body_json(alphafold_p53_prediction(&server.uri())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PDB_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(PDB_TEXT))
        .expect(1)
        .mount(&server)
        .await;

    let alphafold = client(&server);

    let records = alphafold.get_prediction(P53_ACCESSION).await.found().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].entry_id.as_deref(), Some("AF-P04637-F1"));
    assert_eq!(records[0].global_metric_value, Some(75.06));

    let pdb = alphafold.fetch_structure_file(&records).await.found().unwrap();
    assert_eq!(pdb.pdb_data, PDB_TEXT);
}

#[tokio::test]
async fn test_missing_model_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/prediction/Q00000"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"detail": "Not Found"})))
        .mount(&server)
        .await;

    assert_eq!(
        client(&server).get_prediction("Q00000").await,
        Lookup::NotFound(STRUCTURE_NOT_FOUND.to_string())
    );
}

#[tokio::test]
async fn test_server_error_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/prediction/P04637"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    match client(&server).get_prediction(P53_ACCESSION).await {
        Lookup::Failed(msg) => assert!(msg.starts_with("Error querying AlphaFold API:")),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_object_payload_is_unexpected_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/prediction/P04637"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"entryId": "AF-P04637-F1"})))
        .mount(&server)
        .await;

    assert_eq!(
        client(&server).get_prediction(P53_ACCESSION).await,
        Lookup::Failed("Unexpected structure data format".to_string())
    );
}

#[tokio::test]
async fn test_pdb_download_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/prediction/P04637"))
        .respond_with(ResponseTemplate::new(200).set_body_json(alphafold_p53_prediction(&server.uri())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PDB_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let alphafold = client(&server);
    let records = alphafold.get_prediction(P53_ACCESSION).await.found().unwrap();

    match alphafold.fetch_structure_file(&records).await {
        Lookup::Failed(msg) => assert!(msg.starts_with("Error fetching AlphaFold PDB:")),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_no_records_means_no_download() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_string(PDB_TEXT))
        .expect(0)
        .mount(&server)
        .await;

    let result = client(&server).fetch_structure_file(&[]).await;

    assert_eq!(result, Lookup::Failed(NO_PDB_URL.to_string()));
    server.verify().await;
}
