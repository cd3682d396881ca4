use cragflat::openbeta_client::OpenBetaClient;

const API_URL: &str = "https://api.openbeta.io";

#[tokio::test]
#[ignore = "hits the public OpenBeta API"]
async fn test_countries_query_live() {
    let client = OpenBetaClient::new(API_URL, 500).expect("client should build");
    let countries = client.fetch_countries().await.expect("countries query");
    assert!(!countries.is_empty());
    assert!(
        countries.iter().any(|c| c.area_name == "USA"),
        "USA should be among the countries"
    );
    for country in &countries {
        assert!(!country.uuid.is_empty());
    }
}

#[tokio::test]
#[ignore = "hits the public OpenBeta API"]
async fn test_small_region_fetch_live() {
    let client = OpenBetaClient::new(API_URL, 500).expect("client should build");
    // Andorra is a single small region; one page covers it.
    let climbs = client
        .fetch_region(vec!["Andorra".to_string()], None, 0)
        .await;
    for climb in &climbs {
        assert!(!climb.uuid.is_empty());
        assert_eq!(climb.path_tokens.first().map(String::as_str), Some("Andorra"));
    }
}
