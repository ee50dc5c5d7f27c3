use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default number of transactions requested per page
pub const DEFAULT_PAGE_LIMIT: i64 = 10;
/// Upper bound accepted by the transactions endpoint
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Clamp a caller supplied page limit into `[1, 100]`, using 10 for `<= 0`
pub fn clamp_limit(limit: i64) -> i64 {
    if limit <= 0 {
        DEFAULT_PAGE_LIMIT
    } else {
        limit.min(MAX_PAGE_LIMIT)
    }
}

/// Outcome of one request as delivered by the transport.
///
/// `status` is 0 when no HTTP response was received at all.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub ok: bool,
    pub status: u16,
    pub body: Option<Value>,
    pub error: String,
}

impl ApiReply {
    pub fn success(status: u16, body: Option<Value>) -> Self {
        Self {
            ok: true,
            status,
            body,
            error: String::new(),
        }
    }

    pub fn http_error(status: u16, body: Option<Value>, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            status,
            body,
            error: error.into(),
        }
    }

    pub fn network_error(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            status: 0,
            body: None,
            error: error.into(),
        }
    }

    /// True when the transport never got an HTTP answer
    pub fn is_network_failure(&self) -> bool {
        !self.ok && self.status == 0
    }

    /// The transport error text, or `fallback` when empty
    pub fn error_or(&self, fallback: &str) -> String {
        if self.error.is_empty() {
            fallback.to_string()
        } else {
            self.error.clone()
        }
    }
}

/// Cursor filter for one transactions page request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub limit: i64,
    /// Fetch items older than this cursor
    pub before: Option<String>,
    /// Fetch items newer than this cursor
    pub after: Option<String>,
}

impl PageQuery {
    pub fn first(limit: i64) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    pub fn older_than(limit: i64, cursor: &str) -> Self {
        Self {
            limit,
            before: Some(cursor.to_string()),
            after: None,
        }
    }

    pub fn newer_than(limit: i64, cursor: &str) -> Self {
        Self {
            limit,
            before: None,
            after: Some(cursor.to_string()),
        }
    }

    /// Query string pairs, omitting empty cursors
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("limit", clamp_limit(self.limit).to_string())];
        if let Some(before) = self.before.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("before", before.to_string()));
        }
        if let Some(after) = self.after.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("after", after.to_string()));
        }
        pairs
    }
}

/// Request body for POST /auth/login
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    #[serde(rename = "cardNumber")]
    pub card_number: &'a str,
    pub pin: &'a str,
}

/// Request body for POST /accounts/{id}/withdraw
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawRequest {
    pub amount: i64,
}

/// Money value that the backend sends either as a DECIMAL string or a number
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountValue {
    Text(String),
    Integer(i64),
    Number(f64),
}

impl std::fmt::Display for AmountValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmountValue::Text(s) => write!(f, "{}", s),
            AmountValue::Integer(n) => write!(f, "{}", n),
            AmountValue::Number(n) => write!(f, "{:.2}", n),
        }
    }
}

/// Body of GET /accounts/{id}/balance
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceResponse {
    pub balance: AmountValue,
    #[serde(default)]
    pub account_type: Option<String>,
}

/// Body of a successful POST /accounts/{id}/withdraw
#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawResponse {
    pub balance: AmountValue,
    #[serde(default)]
    pub withdrawn: Option<i64>,
    #[serde(default)]
    pub bills: Option<std::collections::BTreeMap<String, u32>>,
}

/// One row of GET /accounts/{id}/transactions
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRow {
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub tx_type: Option<String>,
    #[serde(default)]
    pub amount: Option<AmountValue>,
}

/// Cursor paginated body of GET /accounts/{id}/transactions
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionsPageResponse {
    #[serde(default)]
    pub items: Vec<TransactionRow>,
    #[serde(rename = "nextCursor", default)]
    pub next_cursor: Option<String>,
    #[serde(rename = "prevCursor", default)]
    pub prev_cursor: Option<String>,
}
