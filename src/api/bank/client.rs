use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client as HttpClient;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::models::{ApiReply, LoginRequest, PageQuery, WithdrawRequest};
use crate::utils::errors::error_message_or;

/// Request/response access to the account service.
///
/// Implementations never fail with `Err`: every outcome, including network
/// failures, is encoded in the returned [`ApiReply`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST /auth/login
    async fn login(&self, card_number: &str, pin: &str) -> ApiReply;

    /// GET /accounts/{account_id}/balance
    async fn get_balance(&self, account_id: i64) -> ApiReply;

    /// POST /accounts/{account_id}/withdraw
    async fn withdraw(&self, account_id: i64, amount: i64) -> ApiReply;

    /// GET /accounts/{account_id}/transactions
    async fn get_transactions_page(&self, account_id: i64, query: &PageQuery) -> ApiReply;
}

/// reqwest backed client for the bank backend
pub struct BankClient {
    http_client: HttpClient,
    base_url: String,
}

impl BankClient {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:3000";

    /// Create a client against `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .default_headers(Self::create_headers())
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn create_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// Join base and path with exactly one slash between them
    pub fn join_url(base_url: &str, path: &str) -> String {
        let base = base_url.strip_suffix('/').unwrap_or(base_url);
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> ApiReply {
        let url = Self::join_url(&self.base_url, path);
        debug!("GET {}", url);
        let result = self.http_client.get(&url).query(query).send().await;
        Self::into_reply(result).await
    }

    async fn post_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> ApiReply {
        let url = Self::join_url(&self.base_url, path);
        debug!("POST {}", url);
        let result = self.http_client.post(&url).json(body).send().await;
        Self::into_reply(result).await
    }

    /// Turn a reqwest outcome into an [`ApiReply`]
    async fn into_reply(result: Result<reqwest::Response, reqwest::Error>) -> ApiReply {
        let response = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Request failed: {}", e);
                return ApiReply::network_error(e.to_string());
            }
        };

        let status = response.status();
        let body_text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to read response body: {}", e);
                return ApiReply::network_error(e.to_string());
            }
        };
        let body = serde_json::from_str::<Value>(&body_text).ok();

        if !status.is_success() {
            let code = status.as_u16();
            let error = error_message_or(body.as_ref(), &format!("HTTP {}", code));
            debug!("HTTP {} from server: {}", code, error);
            return ApiReply::http_error(code, body, error);
        }

        ApiReply::success(status.as_u16(), body)
    }
}

#[async_trait]
impl Transport for BankClient {
    async fn login(&self, card_number: &str, pin: &str) -> ApiReply {
        let body = LoginRequest {
            card_number: card_number.trim(),
            pin,
        };
        self.post_json("/auth/login", &body).await
    }

    async fn get_balance(&self, account_id: i64) -> ApiReply {
        self.get_json(&format!("/accounts/{}/balance", account_id), &[])
            .await
    }

    async fn withdraw(&self, account_id: i64, amount: i64) -> ApiReply {
        let body = WithdrawRequest { amount };
        self.post_json(&format!("/accounts/{}/withdraw", account_id), &body)
            .await
    }

    async fn get_transactions_page(&self, account_id: i64, query: &PageQuery) -> ApiReply {
        self.get_json(
            &format!("/accounts/{}/transactions", account_id),
            &query.to_query_pairs(),
        )
        .await
    }
}
