mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{send, TestServer};

#[tokio::test]
async fn tom_is_created_fetched_and_deleted() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;
    let client = &server.client;

    let tom = json!({ "name": "Tom", "age": 3, "gender": "male" });
    let (status, created) = send(client.post(server.url("/apps/cats")).bearer_auth(&token).json(&tom)).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created, json!({ "id": 1, "name": "Tom", "age": 3, "gender": "male" }));

    let (status, fetched) = send(client.get(server.url("/apps/cats/1")).bearer_auth(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, body) = send(client.delete(server.url("/apps/cats/1")).bearer_auth(&token)).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(client.get(server.url("/apps/cats/1")).bearer_auth(&token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;
    let client = &server.client;
    let cat = json!({ "name": "Kitty", "age": 1, "gender": "female" });

    let (_, first) = send(client.post(server.url("/apps/cats")).bearer_auth(&token).json(&cat)).await?;
    send(client.delete(server.url(&format!("/apps/cats/{}", first["id"]))).bearer_auth(&token)).await?;
    let (_, second) = send(client.post(server.url("/apps/cats/")).bearer_auth(&token).json(&cat)).await?;

    assert!(second["id"].as_i64() > first["id"].as_i64());
    Ok(())
}

#[tokio::test]
async fn list_update_and_patch() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;
    let client = &server.client;

    for (name, age) in [("Tom", 3), ("Felix", 5)] {
        let body = json!({ "name": name, "age": age, "gender": "male" });
        send(client.post(server.url("/apps/cats")).bearer_auth(&token).json(&body)).await?;
    }

    let (status, list) = send(client.get(server.url("/apps/cats")).bearer_auth(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(2));
    assert_eq!(list[0]["name"], "Tom");

    let (status, updated) = send(
        client
            .put(server.url("/apps/cats/2/"))
            .bearer_auth(&token)
            .json(&json!({ "name": "Felix", "age": 6, "gender": "male" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["age"], 6);

    let (status, patched) = send(
        client
            .patch(server.url("/apps/cats/2"))
            .bearer_auth(&token)
            .json(&json!({ "gender": "tom" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched, json!({ "id": 2, "name": "Felix", "age": 6, "gender": "tom" }));
    Ok(())
}

#[tokio::test]
async fn invalid_bodies_are_rejected_without_writing() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;
    let client = &server.client;

    let long = json!({ "name": "n".repeat(65), "age": 3, "gender": "male" });
    let (status, body) = send(client.post(server.url("/apps/cats")).bearer_auth(&token).json(&long)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["name"].is_array());

    let (status, body) = send(
        client
            .post(server.url("/apps/cats"))
            .bearer_auth(&token)
            .header("content-type", "application/json")
            .body("{\"name\":"),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");

    let (_, list) = send(client.get(server.url("/apps/cats")).bearer_auth(&token)).await?;
    assert_eq!(list, json!([]));
    Ok(())
}

#[tokio::test]
async fn unauthenticated_requests_change_nothing() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;
    let client = &server.client;

    let tom = json!({ "name": "Tom", "age": 3, "gender": "male" });
    send(client.post(server.url("/apps/cats")).bearer_auth(&token).json(&tom)).await?;

    let (status, _) = send(client.delete(server.url("/apps/cats/1"))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(client.post(server.url("/apps/cats")).json(&tom)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, list) = send(client.get(server.url("/apps/cats")).bearer_auth(&token)).await?;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    Ok(())
}
