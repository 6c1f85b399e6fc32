//! HTTP fetcher collaborator
//!
//! One call per URL: a HEAD request first to read status, Content-Type and
//! any redirect target without downloading a body, then a GET only when the
//! response is an ok, non-redirect HTML page. Redirects are handled by the
//! crawl loop, never followed by the client.

use crate::config::Credentials;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;

/// Result of fetching one URL, tagged so the crawl loop can branch without
/// inspecting error internals
#[derive(Debug)]
pub enum FetchOutcome {
    /// A well-formed HTTP response (any status)
    Response(FetchedResponse),

    /// Transport-level connectivity failure; fatal to the current run
    Connectivity(String),

    /// Any other request fault; the URL is recorded as errored
    Other(String),
}

/// A normalized HTTP response
#[derive(Debug)]
pub struct FetchedResponse {
    /// HTTP status code
    pub status: u16,

    /// Content-Type header value, lowercased; empty when absent
    pub content_type: String,

    /// Location header value when the response is a redirect
    pub redirect: Option<String>,

    /// Response body; empty unless an ok HTML page was fetched
    pub body: String,
}

impl FetchedResponse {
    /// True for 2xx/3xx statuses
    pub fn ok(&self) -> bool {
        (200..400).contains(&self.status)
    }

    /// True when the Content-Type indicates HTML
    pub fn is_html(&self) -> bool {
        self.content_type.contains("text/html")
    }
}

/// Builds the HTTP client used for the whole crawl
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("webtrawl/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none()) // the crawl loop classifies redirects itself
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL, optionally with basic-auth credentials.
///
/// # Request flow
///
/// 1. HEAD to read status, Content-Type and Location
/// 2. If the response is ok, non-redirect HTML, GET the body
/// 3. Otherwise the HEAD metadata alone is returned
///
/// Connect-class transport errors come back as
/// [`FetchOutcome::Connectivity`]; everything else unexpected as
/// [`FetchOutcome::Other`].
pub async fn fetch_url(
    client: &Client,
    url: &str,
    credentials: Option<&Credentials>,
) -> FetchOutcome {
    let head = match send(client.head(url), credentials).await {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = head.status().as_u16();
    let content_type = header_value(&head, CONTENT_TYPE).to_lowercase();
    let redirect = match head.headers().get(LOCATION) {
        Some(value) => value.to_str().ok().map(str::to_string),
        None => None,
    };

    let mut response = FetchedResponse {
        status,
        content_type,
        redirect,
        body: String::new(),
    };

    if !response.ok() || response.redirect.is_some() || !response.is_html() {
        return FetchOutcome::Response(response);
    }

    // Ok HTML page: fetch the body
    match send(client.get(url), credentials).await {
        Ok(get_response) => {
            response.status = get_response.status().as_u16();
            match get_response.text().await {
                Ok(body) => {
                    response.body = body;
                    FetchOutcome::Response(response)
                }
                Err(e) => classify_error(e),
            }
        }
        Err(e) => classify_error(e),
    }
}

async fn send(
    request: reqwest::RequestBuilder,
    credentials: Option<&Credentials>,
) -> Result<Response, reqwest::Error> {
    let request = match credentials {
        Some(creds) => request.basic_auth(&creds.username, Some(&creds.password)),
        None => request,
    };
    request.send().await
}

fn header_value(response: &Response, name: reqwest::header::HeaderName) -> String {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

fn classify_error(e: reqwest::Error) -> FetchOutcome {
    if e.is_connect() {
        FetchOutcome::Connectivity(e.to_string())
    } else {
        FetchOutcome::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client().is_ok());
    }

    fn response(status: u16, content_type: &str, redirect: Option<&str>) -> FetchedResponse {
        FetchedResponse {
            status,
            content_type: content_type.to_string(),
            redirect: redirect.map(str::to_string),
            body: String::new(),
        }
    }

    #[test]
    fn test_ok_covers_2xx_and_3xx() {
        assert!(response(200, "text/html", None).ok());
        assert!(response(204, "", None).ok());
        assert!(response(301, "", Some("/elsewhere")).ok());
        assert!(!response(404, "", None).ok());
        assert!(!response(500, "", None).ok());
        assert!(!response(199, "", None).ok());
    }

    #[test]
    fn test_is_html_matches_parameterized_content_type() {
        assert!(response(200, "text/html", None).is_html());
        assert!(response(200, "text/html; charset=utf-8", None).is_html());
        assert!(!response(200, "application/pdf", None).is_html());
        assert!(!response(200, "", None).is_html());
    }
}
