mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn first_paper_id(browser: &reqwest::Client, server: &common::TestServer) -> Result<String> {
    let body: Value = browser.get(server.url("/api/papers")).send().await?.json().await?;
    body["data"][0]["id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("no papers in {}", body))
}

#[tokio::test]
async fn feedback_is_recorded_and_can_change() -> Result<()> {
    let server = common::ensure_server().await?;
    let browser = common::registered(server, &common::unique_email("feedback")).await?;
    let paper_id = first_paper_id(&browser, server).await?;

    for is_helpful in [true, false] {
        let res = browser
            .post(server.url("/api/feedback"))
            .json(&json!({ "paper_id": paper_id, "is_helpful": is_helpful }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await?;
        assert_eq!(body["data"]["notice"]["title"], "Thank you!");
        assert_eq!(body["data"]["feedback"]["paper_id"], paper_id.as_str());
        assert_eq!(body["data"]["feedback"]["is_helpful"], is_helpful);
    }
    Ok(())
}

#[tokio::test]
async fn feedback_without_session_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::Client::new()
        .post(server.url("/api/feedback"))
        .json(&json!({ "paper_id": uuid::Uuid::new_v4(), "is_helpful": true }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn feedback_after_logout_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    let browser = common::registered(server, &common::unique_email("late")).await?;
    let paper_id = first_paper_id(&browser, server).await?;

    browser.post(server.url("/logout")).send().await?;

    let res = browser
        .post(server.url("/api/feedback"))
        .json(&json!({ "paper_id": paper_id, "is_helpful": true }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
