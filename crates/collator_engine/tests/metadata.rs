use chrono::NaiveDate;
use collator_engine::{HttpSettings, MetadataClient, MetadataQuery};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn august_2021() -> MetadataQuery {
    MetadataQuery {
        start_date: NaiveDate::from_ymd_opt(2021, 8, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2021, 8, 3).unwrap(),
    }
}

#[tokio::test]
async fn parses_metadata_array_and_forwards_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/planetary/apod"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("start_date", "2021-08-01"))
        .and(query_param("end_date", "2021-08-03"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "date": "2021-08-01",
                "media_type": "image",
                "url": "https://img.example.com/a.png",
                "hdurl": "https://img.example.com/a_hd.png"
            },
            {
                "date": "2021-08-02",
                "media_type": "video",
                "url": "https://video.example.com/v"
            },
            {
                "date": "2021-08-03",
                "media_type": "image"
            }
        ])))
        .mount(&server)
        .await;

    let client = MetadataClient::new(
        format!("{}/planetary/apod", server.uri()),
        "test-key",
        HttpSettings::default(),
    );
    let items = client.query(&august_2021()).await;

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].date, "2021-08-01");
    assert!(items[0].is_image());
    assert_eq!(
        items[0].download_url(),
        Some("https://img.example.com/a_hd.png")
    );
    assert!(!items[1].is_image());
    // Entries may omit both url fields; that is a per-item concern later.
    assert_eq!(items[2].download_url(), None);
}

#[tokio::test]
async fn non_2xx_degrades_to_empty_list() {
    stage_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/planetary/apod"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = MetadataClient::new(
        format!("{}/planetary/apod", server.uri()),
        "test-key",
        HttpSettings::default(),
    );

    assert!(client.query(&august_2021()).await.is_empty());
}

#[tokio::test]
async fn unreachable_endpoint_degrades_to_empty_list() {
    // Port 9 (discard) refuses connections on loopback.
    let client = MetadataClient::new(
        "http://127.0.0.1:9/planetary/apod",
        "test-key",
        HttpSettings::default(),
    );

    assert!(client.query(&august_2021()).await.is_empty());
}

#[tokio::test]
async fn malformed_body_degrades_to_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/planetary/apod"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = MetadataClient::new(
        format!("{}/planetary/apod", server.uri()),
        "test-key",
        HttpSettings::default(),
    );

    assert!(client.query(&august_2021()).await.is_empty());
}
