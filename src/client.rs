use std::collections::HashMap;

use anyhow::{Context, Result};
use base64::prelude::*;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use crate::models::{CalendarEntry, Endpoint};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub struct SportPlusClient {
    client: Client,
    base_url: String,
}

impl SportPlusClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Exchange a login/password pair for a bearer token.
    ///
    /// A 200 response without a string `token` field yields an empty token.
    pub async fn get_token(&self, login: &str, password: &str) -> Result<String, ApiError> {
        let url = format!(
            "{}/auth/signin?login={}&password={}",
            self.base_url,
            urlencoding::encode(login),
            urlencoding::encode(password)
        );

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        debug!("Signin response for {} (status {}): {}", login, status, text);

        if status != StatusCode::OK {
            return Err(ApiError::Auth {
                login: login.to_string(),
                status,
                body: text,
            });
        }

        let body: serde_json::Value = serde_json::from_str(&text)
            .map_err(|source| ApiError::Decode { what: "signin", source })?;
        let token = body
            .get("token")
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string();
        Ok(token)
    }

    /// Fetch one calendar collection. Entries are kept as raw JSON.
    pub async fn get_schedules(
        &self,
        token: &str,
        endpoint: Endpoint,
    ) -> Result<Vec<serde_json::Value>, ApiError> {
        let url = format!("{}/calendar/{}", self.base_url, endpoint);

        let resp = self.client.get(&url).bearer_auth(token).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        debug!("Calendar {} response (status {}): {}", endpoint, status, text);

        if status != StatusCode::OK {
            return Err(ApiError::Fetch {
                endpoint,
                status,
                body: text,
            });
        }

        let entries: Vec<serde_json::Value> = serde_json::from_str(&text)
            .map_err(|source| ApiError::Decode { what: "calendar", source })?;
        debug!("Fetched {} {} schedules", entries.len(), endpoint);
        Ok(entries)
    }

    pub async fn create_schedule(&self, token: &str, entry: &CalendarEntry) -> Result<(), ApiError> {
        let url = format!("{}/calendar", self.base_url);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(entry)
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;
        debug!("Create schedule response (status {}): {}", status, text);

        match status {
            StatusCode::OK | StatusCode::CREATED => Ok(()),
            _ => Err(ApiError::Create { status, body: text }),
        }
    }
}

/// Tokens obtained during this run, keyed by login.
#[derive(Debug, Default)]
pub struct TokenStore {
    by_login: HashMap<String, String>,
}

impl TokenStore {
    pub fn insert(&mut self, login: &str, token: String) {
        self.by_login.insert(login.to_string(), token);
    }

    pub fn get(&self, login: &str) -> Result<&str> {
        self.by_login
            .get(login)
            .map(String::as_str)
            .with_context(|| format!("No token for {}, sign in first", login))
    }

    pub fn len(&self) -> usize {
        self.by_login.len()
    }
}

/// Claims the server puts in its signin JWT.
#[derive(Debug, Deserialize, PartialEq)]
pub struct TokenClaims {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Read the payload segment of a JWT without checking its signature.
/// Returns `None` for anything that is not a decodable JWT.
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    let payload = token.split('.').nth(1)?;
    let bytes = BASE64_URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}
