use std::{error::Error, time::Duration};

use crate::errors::Result;

#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking GET used for both metadata pages and images.
///
/// Transport failures are returned as errors; HTTP error statuses are not,
/// callers decide what a non-2xx response means.
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse>;
}

pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client })
    }
}

fn get_error(error: &reqwest::Error) -> String {
    match error.source() {
        Some(e) => match e.source() {
            Some(e) => e.to_string(),
            None => e.to_string(),
        },
        None => error.to_string(),
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        log::debug!("{url}: requesting");

        let resp = self.client.get(url).send().map_err(|err| {
            log::error!("{url}: {}", get_error(&err));
            err
        })?;

        let status = resp.status();
        if !status.is_success() {
            log::debug!("{url}: {status}");
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = resp.bytes()?;

        Ok(HttpResponse {
            status: status.as_u16(),
            content_type,
            body: body.into(),
        })
    }
}
