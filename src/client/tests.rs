use super::{ClientError, UsageClient, UsageSource};

use anyhow::Result;
use futures::TryStreamExt;
use serde_json::{json, Value};
use wiremock::matchers::{basic_auth, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::models::AccountCredential;

const RECORDS_PATH: &str = "/2010-04-01/Accounts/AC123/Usage/Records/Monthly.json";

fn create_record(start_date: &str, category: &str) -> Value {
    json!({
        "account_sid": "AC123",
        "category": category,
        "description": format!("{category} usage"),
        "start_date": start_date,
        "end_date": start_date,
        "count": "1",
        "count_unit": "messages",
        "usage": "1",
        "usage_unit": "messages",
        "price": "0.0079",
        "price_unit": "usd"
    })
}

fn create_credential() -> AccountCredential {
    AccountCredential::new("AC123", "secret-token", "1")
}

#[tokio::test]
async fn test_client_follows_pagination_until_last_page() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .and(query_param("PageSize", "2"))
        .and(query_param_is_missing("Page"))
        .and(basic_auth("AC123", "secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "usage_records": [create_record("2024-01-01", "sms"), create_record("2024-01-01", "calls")],
            "next_page_uri": format!("{RECORDS_PATH}?PageSize=2&Page=1&PageToken=PA1")
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .and(query_param("Page", "1"))
        .and(query_param("PageToken", "PA1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "usage_records": [create_record("2024-02-01", "sms")],
            "next_page_uri": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = UsageClient::new(&server.uri())?.with_page_size(2);
    let records: Vec<_> = client.monthly_records(create_credential()).try_collect().await?;

    let categories: Vec<_> = records.iter().map(|record| record.category.as_str()).collect();
    assert_eq!(categories, vec!["sms", "calls", "sms"]);
    assert_eq!(records[2].start_date.to_string(), "2024-02-01");

    Ok(())
}

#[tokio::test]
async fn test_client_surfaces_auth_rejection_as_api_error() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": 20003,
            "message": "Authenticate",
            "more_info": "https://www.twilio.com/docs/errors/20003",
            "status": 401
        })))
        .mount(&server)
        .await;

    let client = UsageClient::new(&server.uri())?;
    let result: Result<Vec<_>, ClientError> = client.monthly_records(create_credential()).try_collect().await;

    match result {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Authenticate (code 20003)");
        }
        other => panic!("Expected an API error, got {other:?}")
    }

    Ok(())
}

#[tokio::test]
async fn test_client_maps_too_many_requests_to_rate_limited() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let client = UsageClient::new(&server.uri())?;
    let result: Result<Vec<_>, ClientError> = client.monthly_records(create_credential()).try_collect().await;

    assert!(matches!(result, Err(ClientError::RateLimited { ref message }) if message == "slow down"));

    Ok(())
}

#[tokio::test]
async fn test_client_yields_earlier_pages_before_a_failing_page() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .and(query_param_is_missing("Page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "usage_records": [create_record("2024-01-01", "sms")],
            "next_page_uri": format!("{RECORDS_PATH}?Page=1")
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .and(query_param("Page", "1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = UsageClient::new(&server.uri())?;
    let mut stream = client.monthly_records(create_credential());

    let first = stream.try_next().await?;
    assert!(first.is_some());

    let second = stream.try_next().await;
    assert!(matches!(second, Err(ClientError::Api { status: 500, .. })));

    Ok(())
}

#[tokio::test]
async fn test_transport_errors_do_not_expose_the_account_identifier() -> Result<()> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let closed_address = listener.local_addr()?;
    drop(listener);

    let client = UsageClient::new(&format!("http://{closed_address}"))?;
    let credential = AccountCredential::new("AC0123456789abcdef", "secret-token", "1");
    let result: Result<Vec<_>, ClientError> = client.monthly_records(credential).try_collect().await;

    match result {
        Err(error @ ClientError::Transport(_)) => {
            let message = error.to_string();
            assert!(!message.contains("AC0123456789abcdef"), "{message}");
            assert!(!message.contains("/Accounts/"), "{message}");
        }
        other => panic!("Expected a transport error, got {other:?}")
    }

    Ok(())
}

#[test]
fn test_client_rejects_base_url_without_scheme() {
    assert!(matches!(UsageClient::new("api.twilio.com"), Err(ClientError::InvalidBaseUrl(_))));
}
