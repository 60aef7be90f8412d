//! # Ingestion Endpoint Tests
//!
//! Runs each source through the HTTP API: tabular files are parsed locally,
//! images and web pages go through the mocked Extraction Service.

mod common;

use anyhow::Result;
use common::{png_bytes, TestApp, SALES_CSV};
use httpmock::Method;
use serde_json::{json, Value};

const MENU_REPLY: &str =
    "```json\n[{\"Item\":\"Coffee\",\"Price\":4.5},{\"Item\":\"Tea\",\"Price\":3}]\n```";

#[tokio::test]
async fn test_csv_upload_is_parsed_without_the_model() -> Result<()> {
    let app = TestApp::spawn().await?;
    let any_completion = app.mock_completion_status(500, "should not be called").await;
    let id = app.create_session().await?;

    let response = app.upload_csv(id, SALES_CSV).await?;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["result"]["source"], "file");
    assert_eq!(body["result"]["records"], 3);
    assert_eq!(
        body["result"]["columns"],
        json!(["Region", "Product", "Revenue", "Units"])
    );

    let (status, table) = app.get_json(&format!("/sessions/{id}/table")).await?;
    assert_eq!(status, 200);
    assert_eq!(table["result"]["rows"][0], json!(["North", "Coffee", 1200.5, 10]));
    any_completion.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_xlsx_upload_is_parsed_without_the_model() -> Result<()> {
    let app = TestApp::spawn().await?;
    let any_completion = app.mock_completion_status(500, "should not be called").await;
    let id = app.create_session().await?;
    let workbook = include_bytes!("../../sheets/tests/fixtures/sales.xlsx").to_vec();

    let response = app.upload(id, "file", "sales.xlsx", workbook, None).await?;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["result"]["source"], "file");
    assert_eq!(body["result"]["records"], 2);
    assert_eq!(
        body["result"]["columns"],
        json!(["Date", "Region", "Revenue", "Units"])
    );

    let (_, table) = app.get_json(&format!("/sessions/{id}/table")).await?;
    assert_eq!(table["result"]["rows"][0], json!(["2024-03-09", "North", 1200.5, 10.0]));
    any_completion.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_unsupported_file_extension_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;
    let id = app.create_session().await?;

    let response = app
        .upload(id, "file", "notes.txt", b"hello".to_vec(), None)
        .await?;
    assert_eq!(response.status().as_u16(), 422);
    let body: Value = response.json().await?;
    assert_eq!(body["kind"], "acquisition");
    Ok(())
}

#[tokio::test]
async fn test_empty_file_is_an_acquisition_error() -> Result<()> {
    let app = TestApp::spawn().await?;
    let id = app.create_session().await?;

    let response = app.upload(id, "file", "empty.csv", Vec::new(), None).await?;
    assert_eq!(response.status().as_u16(), 422);
    let body: Value = response.json().await?;
    assert_eq!(body["kind"], "acquisition");
    assert!(body["error"].as_str().unwrap().contains("no header row"));
    Ok(())
}

#[tokio::test]
async fn test_missing_file_field_is_bad_request() -> Result<()> {
    let app = TestApp::spawn().await?;
    let id = app.create_session().await?;

    let form = reqwest::multipart::Form::new().text("hint", "menu");
    let response = app
        .client
        .post(app.url(&format!("/sessions/{id}/ingest/file")))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 400);
    Ok(())
}

#[tokio::test]
async fn test_image_upload_is_structured() -> Result<()> {
    let app = TestApp::spawn().await?;
    let completion = app
        .mock_completion("Extract all tabular data visible in this image", MENU_REPLY)
        .await;
    let id = app.create_session().await?;

    let response = app
        .upload(id, "image", "menu.png", png_bytes(), None)
        .await?;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["result"]["source"], "image");
    assert_eq!(body["result"]["records"], 2);
    assert_eq!(body["result"]["columns"], json!(["Item", "Price"]));
    completion.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn test_image_hint_and_debug_reply() -> Result<()> {
    let app = TestApp::spawn().await?;
    let completion = app.mock_completion("Only the drinks section", MENU_REPLY).await;
    let id = app.create_session().await?;

    let response = app
        .client
        .post(app.url(&format!("/sessions/{id}/ingest/image?debug=true")))
        .multipart(
            reqwest::multipart::Form::new()
                .part(
                    "file",
                    reqwest::multipart::Part::bytes(png_bytes()).file_name("menu.png"),
                )
                .text("hint", "Only the drinks section"),
        )
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["debug"]["raw_reply"], MENU_REPLY);
    assert_eq!(body["debug"]["schema"][1]["kind"], "numeric");
    completion.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn test_undecodable_image_is_rejected_before_the_model() -> Result<()> {
    let app = TestApp::spawn().await?;
    let any_completion = app.mock_completion_status(500, "should not be called").await;
    let id = app.create_session().await?;

    let response = app
        .upload(id, "image", "menu.png", b"not an image".to_vec(), None)
        .await?;
    assert_eq!(response.status().as_u16(), 422);
    let body: Value = response.json().await?;
    assert_eq!(body["kind"], "acquisition");
    any_completion.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_url_ingestion_extracts_page_text() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_page(
        "/shop",
        "<html><head><script>var x = 1;</script></head>\
         <body><h1>Our Products</h1><p>Widget 19.50</p></body></html>",
    )
    .await;
    let completion = app
        .mock_completion(
            "Our Products Widget 19.50",
            "[{\"Product\":\"Widget\",\"Price\":19.5}]",
        )
        .await;
    let id = app.create_session().await?;

    let response = app
        .client
        .post(app.url(&format!("/sessions/{id}/ingest/url")))
        .json(&json!({ "url": app.mock_server.url("/shop") }))
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["result"]["source"], "website");
    assert_eq!(body["result"]["columns"], json!(["Product", "Price"]));
    completion.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn test_unreachable_url_sends_error_text_to_the_model() -> Result<()> {
    let app = TestApp::spawn().await?;
    let completion = app.mock_completion("Error scraping URL", "[]").await;
    let id = app.create_session().await?;

    let response = app
        .client
        .post(app.url(&format!("/sessions/{id}/ingest/url")))
        .json(&json!({ "url": "http://127.0.0.1:1/menu" }))
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["result"]["records"], 0);
    assert_eq!(body["result"]["columns"], json!([]));
    completion.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn test_empty_url_is_bad_request() -> Result<()> {
    let app = TestApp::spawn().await?;
    let id = app.create_session().await?;

    let response = app
        .client
        .post(app.url(&format!("/sessions/{id}/ingest/url")))
        .json(&json!({ "url": "  " }))
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 400);
    Ok(())
}

#[tokio::test]
async fn test_failed_run_keeps_previous_table() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_completion("Extract all tabular data", "not json at all")
        .await;
    let id = app.create_session().await?;
    assert!(app.upload_csv(id, SALES_CSV).await?.status().is_success());

    let response = app
        .upload(id, "image", "menu.png", png_bytes(), None)
        .await?;
    assert_eq!(response.status().as_u16(), 422);
    let body: Value = response.json().await?;
    assert_eq!(body["kind"], "normalization");
    assert!(body["error"].as_str().unwrap().starts_with("parse error"));

    let (status, table) = app.get_json(&format!("/sessions/{id}/table")).await?;
    assert_eq!(status, 200);
    assert_eq!(table["result"]["columns"][0], "Region");
    Ok(())
}

#[tokio::test]
async fn test_nested_reply_is_rejected_by_default() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_completion(
        "Extract all tabular data",
        "[{\"Item\":\"Coffee\",\"Sizes\":[\"S\",\"M\"]}]",
    )
    .await;
    let id = app.create_session().await?;

    let response = app
        .upload(id, "image", "menu.png", png_bytes(), None)
        .await?;
    assert_eq!(response.status().as_u16(), 422);
    let body: Value = response.json().await?;
    assert_eq!(body["kind"], "normalization");
    Ok(())
}

#[tokio::test]
async fn test_nested_reply_is_stringified_when_configured() -> Result<()> {
    let app = TestApp::spawn_with_config("extraction:\n  nested_values: stringify\n").await?;
    app.mock_completion(
        "Extract all tabular data",
        "[{\"Item\":\"Coffee\",\"Sizes\":[\"S\",\"M\"]}]",
    )
    .await;
    let id = app.create_session().await?;

    let response = app
        .upload(id, "image", "menu.png", png_bytes(), None)
        .await?;
    assert_eq!(response.status().as_u16(), 200);

    let (_, table) = app.get_json(&format!("/sessions/{id}/table")).await?;
    assert_eq!(table["result"]["rows"][0][1], "[\"S\",\"M\"]");
    Ok(())
}

#[tokio::test]
async fn test_service_failures_map_to_gateway_statuses() -> Result<()> {
    for (status, expected) in [(500u16, 502u16), (429, 429), (401, 502)] {
        let app = TestApp::spawn().await?;
        app.mock_server
            .mock_async(|when, then| {
                when.method(Method::POST).path(common::COMPLETIONS_PATH);
                then.status(status).body("provider failure");
            })
            .await;
        let id = app.create_session().await?;

        let response = app
            .upload(id, "image", "menu.png", png_bytes(), None)
            .await?;
        assert_eq!(response.status().as_u16(), expected, "provider status {status}");
        let body: Value = response.json().await?;
        assert_eq!(body["kind"], "service");
    }
    Ok(())
}

#[tokio::test]
async fn test_oversized_upload_is_refused() -> Result<()> {
    let app = TestApp::spawn_with_config("max_upload_bytes: 1024\n").await?;
    let id = app.create_session().await?;

    let big_csv = format!("A,B\n{}", "1,2\n".repeat(2000));
    let response = app.upload_csv(id, &big_csv).await?;
    assert!(response.status().is_client_error());
    assert!(app.app_state.sessions.get(id).await.unwrap().table.is_none());
    Ok(())
}
