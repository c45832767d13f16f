//! Talent Protocol reputation lookup.
//!
//! A missing passport is a normal state for most wallets, so an upstream 404
//! is answered with a zero score instead of an error.

use axum::extract::{Query, State};
use axum::Json;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::{debug, error};

use super::upstream::join_segments;
use crate::error::ApiError;
use crate::server::AppState;

const FAILURE: &str = "Failed to fetch reputation data";

/// Query string of `GET /api/talent`.
#[derive(Debug, Default, Deserialize)]
pub struct TalentQuery {
    /// Wallet address to look up.
    pub address: Option<String>,
}

/// Narrowed reputation record returned to the dashboard.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Reputation {
    /// Builder score, `0` when unknown.
    pub score: Number,
    /// Passport id, `null` when there is none.
    pub passport_id: Value,
    /// Avatar URL or `null`. Omitted for addresses without a passport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<Value>,
}

impl Reputation {
    /// Record for an address with no passport.
    pub fn none() -> Self {
        Self {
            score: Number::from(0),
            passport_id: Value::Null,
            profile_picture: None,
        }
    }

    /// Reshape a `/api/v3/passports/{address}` response.
    pub fn from_passport_response(body: &Value) -> Self {
        let passport = body.get("passport");
        let field = |name: &str| {
            passport
                .and_then(|p| p.get(name))
                .filter(|v| is_truthy(v))
                .cloned()
        };

        let score = match field("score") {
            Some(Value::Number(n)) => n,
            _ => Number::from(0),
        };
        Self {
            score,
            passport_id: field("id").unwrap_or(Value::Null),
            profile_picture: Some(field("profile_picture_url").unwrap_or(Value::Null)),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// GET /api/talent
pub async fn reputation(
    State(state): State<AppState>,
    Query(query): Query<TalentQuery>,
) -> Result<Json<Reputation>, ApiError> {
    let address = query
        .address
        .as_deref()
        .filter(|a| !a.is_empty())
        .ok_or(ApiError::MissingParameter("Address is required"))?;

    let upstream = &state.settings.upstream;
    let Some(api_key) = upstream.talent_api_key.as_ref() else {
        error!("TALENT_PROTOCOL_API_KEY is not set");
        return Err(ApiError::Misconfigured("TALENT_PROTOCOL_API_KEY is not set"));
    };

    let url = join_segments(&upstream.talent_url, &["api", "v3", "passports", address])
        .map_err(|source| {
            error!(error = %source, "talent proxy URL rejected");
            ApiError::Upstream {
                message: FAILURE,
                source,
            }
        })?;

    match state
        .upstream
        .get_json(url, &[("x-api-key", api_key.expose_secret())])
        .await
    {
        Ok(body) => Ok(Json(Reputation::from_passport_response(&body))),
        Err(e) if e.is_not_found() => {
            debug!(address, "no passport for address");
            Ok(Json(Reputation::none()))
        }
        Err(source) => {
            error!(error = %source, address, "talent protocol proxy error");
            Err(ApiError::Upstream {
                message: FAILURE,
                source,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn none_serializes_without_picture() {
        let v = serde_json::to_value(Reputation::none()).unwrap();
        assert_eq!(v, json!({"score": 0, "passport_id": null}));
    }

    #[test]
    fn reshapes_passport() {
        let body = json!({"passport": {
            "score": 70,
            "id": 1234,
            "profile_picture_url": "https://img/x.png",
            "activity_score": 3
        }});
        let v = serde_json::to_value(Reputation::from_passport_response(&body)).unwrap();
        assert_eq!(
            v,
            json!({"score": 70, "passport_id": 1234, "profile_picture": "https://img/x.png"})
        );
    }

    #[test]
    fn missing_passport_defaults() {
        let v = serde_json::to_value(Reputation::from_passport_response(&json!({}))).unwrap();
        assert_eq!(v, json!({"score": 0, "passport_id": null, "profile_picture": null}));
    }

    #[test]
    fn falsy_fields_collapse_to_defaults() {
        let body = json!({"passport": {"score": null, "id": 0, "profile_picture_url": ""}});
        let r = Reputation::from_passport_response(&body);
        assert_eq!(r.score, Number::from(0));
        assert_eq!(r.passport_id, Value::Null);
        assert_eq!(r.profile_picture, Some(Value::Null));
    }

    #[test]
    fn non_numeric_score_is_zero() {
        let body = json!({"passport": {"score": "high"}});
        assert_eq!(Reputation::from_passport_response(&body).score, Number::from(0));
    }

    #[test]
    fn fractional_score_kept() {
        let body = json!({"passport": {"score": 42.5}});
        let v = serde_json::to_value(Reputation::from_passport_response(&body)).unwrap();
        assert_eq!(v["score"], 42.5);
    }
}
