use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderValue, USER_AGENT};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ResponseData {
    pub status: u16,
    pub body: String,
    pub json: Option<Value>,
}

/// Client for the Harbor REST API (`/api/v2.0/`).
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: Client,
    username: String,
    secret: String,
}

impl ApiClient {
    pub fn new(base_url: &str, username: &str, secret: &str) -> Result<Self> {
        let api_root = format!("{}/api/v2.0/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&api_root).context("parsing base URL")?;
        let http = Client::builder()
            .user_agent(HeaderValue::from_static("harborctl/0.1"))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            base_url: parsed,
            http,
            username: username.to_string(),
            secret: secret.to_string(),
        })
    }

    pub fn get(&self, path: &str, query: &[(&str, String)]) -> Result<ResponseData> {
        self.request(Method::GET, path, query)
    }

    /// GET a path and deserialize the body as a single instance of `T`.
    pub fn get_one<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self.get(path, query)?;
        serde_json::from_str(&response.body)
            .with_context(|| format!("parsing response from `{}`", path))
    }

    /// GET a path and deserialize the body as a list of `T`.
    pub fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let response = self.get(path, query)?;
        serde_json::from_str(&response.body)
            .with_context(|| format!("parsing response from `{}`", path))
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ResponseData> {
        let normalized = path.trim_start_matches('/');
        let url = self
            .base_url
            .join(normalized)
            .with_context(|| format!("joining path `{}` to base URL", path))?;
        debug!("{} {}", method, url);

        let mut request = self
            .http
            .request(method, url)
            .basic_auth(&self.username, Some(&self.secret))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(USER_AGENT, HeaderValue::from_static("harborctl/0.1"));

        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .and_then(|r| r.error_for_status())
            .context("sending request")?;

        let status = response.status().as_u16();
        let text = response.text().context("reading response body")?;
        let json = serde_json::from_str(&text).ok();

        Ok(ResponseData {
            status,
            body: text,
            json,
        })
    }
}
