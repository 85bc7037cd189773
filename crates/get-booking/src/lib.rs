use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use fine_grained_permissions::PERMISSIONS_CLAIM;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const READ_PERMISSION: &str = "booking:read";

/// The slice of a REST API proxy event this function looks at. Claims are
/// placed in `requestContext.authorizer.claims` by the user pool authorizer
/// after it has validated the token.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub request_context: Option<RequestContext>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub authorizer: Option<Authorizer>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Authorizer {
    #[serde(default)]
    pub claims: Option<HashMap<String, Value>>,
}

impl ProxyRequest {
    pub fn claims(&self) -> Option<&HashMap<String, Value>> {
        self.request_context
            .as_ref()?
            .authorizer
            .as_ref()?
            .claims
            .as_ref()
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ProxyResponse {
    fn json<T: Serialize>(status_code: u16, body: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status_code,
            headers: HashMap::from([("Content-Type".to_string(), "application/json".to_string())]),
            body: serde_json::to_string(body)?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: String,
    pub date: String,
    pub name: String,
}

impl Booking {
    pub fn sample(now: DateTime<Utc>) -> Self {
        Self {
            id: "456".to_string(),
            date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            name: "Hotel California".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub message: String,
}

/// True when `required` is one of the comma-separated entries of the
/// `permissions` claim. Missing claims, a missing or non-string
/// `permissions` value, and partial matches all count as absent.
pub fn has_permission(claims: Option<&HashMap<String, Value>>, required: &str) -> bool {
    claims
        .and_then(|claims| claims.get(PERMISSIONS_CLAIM))
        .and_then(Value::as_str)
        .is_some_and(|permissions| permissions.split(',').any(|p| p == required))
}

pub fn handle(request: &ProxyRequest, now: DateTime<Utc>) -> Result<ProxyResponse, serde_json::Error> {
    if !has_permission(request.claims(), READ_PERMISSION) {
        log::info!("Denied booking read: {} missing", READ_PERMISSION);
        return ProxyResponse::json(
            403,
            &ErrorResponse {
                message: "Forbidden".to_string(),
            },
        );
    }

    log::info!("Allowed booking read");
    ProxyResponse::json(200, &Booking::sample(now))
}
