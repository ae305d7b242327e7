//! HTTP client utilities for testing.
//!
//! Helpers for making requests to a running isobar server.

use reqwest::{Client, Response, StatusCode, Url};
use std::error::Error;
use std::net::SocketAddr;
use std::time::Duration;

/// Default timeout for HTTP requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Create a default test client
pub fn create_test_client() -> Client {
    Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .expect("Failed to build test HTTP client")
}

/// Build a URL for an isobar server endpoint
pub fn build_url(addr: &SocketAddr, path: &str) -> Url {
    format!("http://{}{}", addr, path)
        .parse()
        .expect("Failed to parse URL")
}

/// Make a GET request to the server
pub async fn get(addr: &SocketAddr, path: &str) -> Result<Response, Box<dyn Error>> {
    let url = build_url(addr, path);
    println!("Making request to: {}", url);
    Ok(create_test_client().get(url).send().await?)
}

/// Make a GET request and parse the JSON body, whatever the status
pub async fn get_json(
    addr: &SocketAddr,
    path: &str,
) -> Result<(StatusCode, serde_json::Value), Box<dyn Error>> {
    let response = get(addr, path).await?;
    let status = response.status();
    Ok((status, response.json().await?))
}

/// Download a PNG, failing on any non-200 response
pub async fn get_png(addr: &SocketAddr, path: &str) -> Result<Vec<u8>, Box<dyn Error>> {
    let response = get(addr, path).await?;

    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().await?;
        return Err(format!("Unexpected status code: {}, body: {}", status, body).into());
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if content_type.as_deref() != Some("image/png") {
        return Err(format!("Unexpected content type: {:?}", content_type).into());
    }

    Ok(response.bytes().await?.to_vec())
}
