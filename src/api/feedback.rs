use axum::extract::{FromRequest, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::{Map, Number, Value};

use super::error::{ApiError, PersistenceError, ValidationError};
use super::AppState;
use crate::models::{CreateFeedbackInput, Feedback};

/// Body of a create request, before validation.
///
/// Fields are kept as raw JSON so the only check made up front is that
/// `message` is present and truthy. Everything else is handed to the store
/// as-is, which rejects values it cannot hold.
#[derive(Debug, Default, Deserialize)]
pub struct FeedbackPayload {
    pub name: Option<Value>,
    pub email: Option<Value>,
    pub message: Option<Value>,
    pub rating: Option<Value>,
}

impl FeedbackPayload {
    /// Read a payload out of an arbitrary JSON value. Anything that is not an
    /// object carries no fields.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_truthy(self.message.as_ref()) {
            Ok(())
        } else {
            Err(ValidationError::MissingMessage)
        }
    }

    /// Convert into a store input. Type mismatches surface as save failures,
    /// the same as any other value the store refuses.
    pub fn into_input(self) -> Result<CreateFeedbackInput, PersistenceError> {
        let message = text_field("message", self.message)?
            .ok_or_else(|| PersistenceError::Save(anyhow::anyhow!("message missing")))?;

        Ok(CreateFeedbackInput {
            name: text_field("name", self.name)?,
            email: text_field("email", self.email)?,
            message,
            rating: number_field("rating", self.rating)?,
        })
    }
}

/// JavaScript-style truthiness: missing, `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn text_field(field: &str, value: Option<Value>) -> Result<Option<String>, PersistenceError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(PersistenceError::Save(anyhow::anyhow!(
            "`{field}` must be a string, got {other}"
        ))),
    }
}

fn number_field(field: &str, value: Option<Value>) -> Result<Option<Number>, PersistenceError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n)),
        Some(other) => Err(PersistenceError::Save(anyhow::anyhow!(
            "`{field}` must be a number, got {other}"
        ))),
    }
}

/// A create request body: JSON from API clients, or the urlencoded fields the
/// widget's form submits.
#[derive(Debug)]
pub struct FeedbackBody(pub Value);

impl<S> FromRequest<S> for FeedbackBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(req.headers()) {
            let Form(fields) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| ValidationError::MalformedBody(e.body_text()))?;
            Ok(Self(form_to_json(fields)))
        } else {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| ValidationError::MalformedBody(e.body_text()))?;
            Ok(Self(value))
        }
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

/// Empty form fields count as absent; `rating` is read as a number when it
/// parses as one.
pub fn form_to_json(fields: Vec<(String, String)>) -> Value {
    let mut object = Map::new();
    for (key, value) in fields {
        if value.is_empty() {
            continue;
        }
        let value = if key == "rating" {
            parse_number(&value)
        } else {
            Value::String(value)
        };
        object.insert(key, value);
    }
    Value::Object(object)
}

fn parse_number(raw: &str) -> Value {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .map(Value::from)
        .or_else(|| {
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
        })
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

pub async fn create_feedback(
    State(state): State<AppState>,
    FeedbackBody(body): FeedbackBody,
) -> Result<(StatusCode, Json<Feedback>), ApiError> {
    let payload = FeedbackPayload::from_json(body);
    payload.validate()?;
    let input = payload.into_input()?;

    let feedback = state
        .db
        .create_feedback(input)
        .map_err(PersistenceError::Save)?;

    tracing::info!(id = %feedback.id, "feedback saved");
    Ok((StatusCode::CREATED, Json(feedback)))
}

pub async fn list_feedback(State(state): State<AppState>) -> Result<Json<Vec<Feedback>>, ApiError> {
    let feedbacks = state.db.list_feedback().map_err(PersistenceError::Fetch)?;
    Ok(Json(feedbacks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_messages_fail_validation() {
        for body in [
            json!({}),
            json!({ "message": null }),
            json!({ "message": "" }),
            json!({ "message": false }),
            json!({ "message": 0 }),
            json!(null),
            json!(["message"]),
            json!("message"),
        ] {
            let payload = FeedbackPayload::from_json(body.clone());
            assert!(
                matches!(payload.validate(), Err(ValidationError::MissingMessage)),
                "{body} should be rejected"
            );
        }
    }

    #[test]
    fn other_fields_are_not_validated() {
        let payload = FeedbackPayload::from_json(json!({
            "message": "hi",
            "email": "not an email",
            "rating": 42,
        }));
        assert!(payload.validate().is_ok());

        let input = payload.into_input().unwrap();
        assert_eq!(input.message, "hi");
        assert_eq!(input.email.as_deref(), Some("not an email"));
        assert_eq!(input.rating, Some(Number::from(42)));
        assert_eq!(input.name, None);
    }

    #[test]
    fn wrongly_typed_fields_fail_as_save_errors() {
        let payload = FeedbackPayload::from_json(json!({ "message": "hi", "rating": "five" }));
        assert!(payload.validate().is_ok());
        assert!(matches!(payload.into_input(), Err(PersistenceError::Save(_))));

        let payload = FeedbackPayload::from_json(json!({ "message": "hi", "rating": [5] }));
        assert!(matches!(payload.into_input(), Err(PersistenceError::Save(_))));

        let payload = FeedbackPayload::from_json(json!({ "message": 7 }));
        assert!(payload.validate().is_ok());
        assert!(matches!(payload.into_input(), Err(PersistenceError::Save(_))));
    }

    #[test]
    fn fractional_ratings_pass_through() {
        let payload = FeedbackPayload::from_json(json!({ "message": "Nice", "rating": 4.5 }));
        let input = payload.into_input().unwrap();
        assert_eq!(input.rating, Number::from_f64(4.5));
    }

    #[test]
    fn form_fields_become_payload() {
        let body = form_to_json(vec![
            ("name".into(), "".into()),
            ("email".into(), "ada@example.com".into()),
            ("message".into(), "Great app!".into()),
            ("rating".into(), "5".into()),
        ]);
        assert_eq!(
            body,
            json!({ "email": "ada@example.com", "message": "Great app!", "rating": 5 })
        );

        let body = form_to_json(vec![("message".into(), "".into()), ("rating".into(), "".into())]);
        assert_eq!(body, json!({}));

        let body = form_to_json(vec![("rating".into(), "4.5".into())]);
        assert_eq!(body, json!({ "rating": 4.5 }));

        let body = form_to_json(vec![("rating".into(), "lots".into())]);
        assert_eq!(body, json!({ "rating": "lots" }));
    }

    #[test]
    fn detects_form_content_type() {
        let mut headers = HeaderMap::new();
        assert!(!is_form(&headers));

        headers.insert(
            CONTENT_TYPE,
            "application/x-www-form-urlencoded; charset=UTF-8".parse().unwrap(),
        );
        assert!(is_form(&headers));

        headers.insert(CONTENT_TYPE, "application/json".parse().unwrap());
        assert!(!is_form(&headers));
    }
}
