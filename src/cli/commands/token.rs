use std::time::Duration;

use anyhow::Context;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::handlers::auth::TokenResponse;

pub async fn handle(server: &str, username: &str, password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let token = request_token(server, username, password).await?;

    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "token": token.token,
                    "token_type": token.token_type,
                    "expires_in": token.expires_in,
                }))?
            );
        }
        OutputFormat::Text => println!("{}", token.token),
    }
    Ok(())
}

pub async fn request_token(server: &str, username: &str, password: &str) -> anyhow::Result<TokenResponse> {
    let client = reqwest::Client::new();
    let url = format!("{}/auth/token", server.trim_end_matches('/'));

    let response = client
        .post(&url)
        .timeout(Duration::from_secs(10))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .with_context(|| format!("failed to reach {}", url))?;

    let status = response.status();
    if !status.is_success() {
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let message = body["message"].as_str().unwrap_or("request failed");
        anyhow::bail!("{} ({})", message, status);
    }

    Ok(response.json::<TokenResponse>().await?)
}
