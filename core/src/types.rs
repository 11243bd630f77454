//! Domain DTOs for the notes API.
//!
//! # Design
//! These mirror the backend's JSON but are defined independently of the mock
//! server; the live lifecycle test catches schema drift. Decoding is lenient
//! where the backend is loose (ids may be strings or integers, `content` may
//! be null, timestamps may lack a zone) and strict where the client depends
//! on a field (`title`).

use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Server-assigned note identifier, kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteId {
    Int(i64),
    Text(String),
    /// Numbers outside `i64`: large unsigned or fractional ids.
    Other(serde_json::Number),
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteId::Int(n) => write!(f, "{n}"),
            NoteId::Text(s) => f.write_str(s),
            NoteId::Other(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        NoteId::Text(value.to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        NoteId::Text(value)
    }
}

impl From<i64> for NoteId {
    fn from(value: i64) -> Self {
        NoteId::Int(value)
    }
}

/// A single note returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Note {
    /// Display-order key: last update, else creation. Undated notes sort last.
    pub fn sort_key(&self) -> DateTime<Utc> {
        self.updated_at.or(self.created_at).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Order notes for display, most recently touched first.
///
/// The sort is stable, so notes with equal keys keep their cache order.
pub fn display_order(notes: &[Note]) -> Vec<&Note> {
    let mut ordered: Vec<&Note> = notes.iter().collect();
    ordered.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
    ordered
}

/// Payload for creating or updating a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteInput {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl NoteInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Trim the title and reject it when blank. Content is kept as typed.
    pub fn validated(self) -> Result<Self, ApiError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ApiError::Validation("Title is required.".to_string()));
        }
        Ok(Self {
            title: title.to_string(),
            content: self.content,
        })
    }
}

/// Login form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validated(self) -> Result<Self, ApiError> {
        if self.email.trim().is_empty() {
            return Err(ApiError::Validation("Email is required.".to_string()));
        }
        if self.password.is_empty() {
            return Err(ApiError::Validation("Password is required.".to_string()));
        }
        Ok(self)
    }
}

/// Body of a successful login. Fields other than the token are passed through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The authenticated user's profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        if self.email.is_empty() {
            "User"
        } else {
            &self.email
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => parse_timestamp(&s),
        Some(Value::Number(n)) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    })
}

/// Parse RFC 3339, or a zone-less ISO-8601 timestamp taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn note_at(id: i64, updated_at: &str) -> Note {
        serde_json::from_value(json!({
            "id": id,
            "title": format!("note {id}"),
            "updated_at": updated_at,
        }))
        .unwrap()
    }

    #[test]
    fn display_order_is_descending_by_updated_at() {
        let notes = vec![
            note_at(1, "2024-05-01T10:00:00Z"),
            note_at(2, "2024-05-01T12:00:00Z"),
            note_at(3, "2024-05-01T11:00:00Z"),
        ];
        let ids: Vec<String> = display_order(&notes).iter().map(|n| n.id.to_string()).collect();
        assert_eq!(ids, ["2", "3", "1"]);
    }

    #[test]
    fn created_at_used_when_updated_at_missing() {
        let older = note_at(1, "2024-05-01T10:00:00Z");
        let newer: Note = serde_json::from_value(json!({
            "id": 2,
            "title": "only created",
            "created_at": "2024-05-02T09:00:00",
        }))
        .unwrap();
        let undated: Note = serde_json::from_value(json!({"id": 3, "title": "undated"})).unwrap();
        let notes = vec![undated, older, newer];
        let ids: Vec<String> = display_order(&notes).iter().map(|n| n.id.to_string()).collect();
        assert_eq!(ids, ["2", "1", "3"]);
    }

    #[test]
    fn note_accepts_null_or_missing_content() {
        let a: Note = serde_json::from_value(json!({"id": "a", "title": "T", "content": null})).unwrap();
        let b: Note = serde_json::from_value(json!({"id": "b", "title": "T"})).unwrap();
        assert_eq!(a.content, "");
        assert_eq!(b.content, "");
    }

    #[test]
    fn note_requires_title() {
        let result: Result<Note, _> = serde_json::from_value(json!({"id": 1, "content": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn note_id_keeps_its_shape() {
        let int: NoteId = serde_json::from_value(json!(42)).unwrap();
        let text: NoteId = serde_json::from_value(json!("a/b")).unwrap();
        assert_eq!(int, NoteId::Int(42));
        assert_eq!(text, NoteId::Text("a/b".into()));
        assert_eq!(serde_json::to_value(&int).unwrap(), json!(42));
    }

    #[test]
    fn out_of_range_numeric_ids_still_decode() {
        let big: NoteId = serde_json::from_value(json!(u64::MAX)).unwrap();
        assert_eq!(big.to_string(), u64::MAX.to_string());
        assert_eq!(serde_json::to_value(&big).unwrap(), json!(u64::MAX));

        let frac: NoteId = serde_json::from_value(json!(1.5)).unwrap();
        assert_eq!(frac.to_string(), "1.5");

        let notes: Vec<Note> = serde_json::from_value(json!([
            {"id": u64::MAX, "title": "big"},
            {"id": 3, "title": "small"}
        ]))
        .unwrap();
        assert!(matches!(notes[0].id, NoteId::Other(_)));
        assert_eq!(notes[1].id, NoteId::Int(3));
    }

    #[test]
    fn timestamps_parse_leniently() {
        assert!(parse_timestamp("2024-05-01T10:00:00+02:00").is_some());
        assert!(parse_timestamp("2024-05-01T10:00:00.123456").is_some());
        assert!(parse_timestamp("2024-05-01 10:00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        let n: Note = serde_json::from_value(json!({"id": 1, "title": "T", "updated_at": "garbage"})).unwrap();
        assert_eq!(n.updated_at, None);
    }

    #[test]
    fn blank_title_rejected_and_title_trimmed() {
        let err = NoteInput::new("   ", "body").validated().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        let ok = NoteInput::new("  Groceries ", "  milk ").validated().unwrap();
        assert_eq!(ok.title, "Groceries");
        assert_eq!(ok.content, "  milk ");
    }

    #[test]
    fn credentials_require_both_fields() {
        assert!(Credentials::new("", "pw").validated().is_err());
        assert!(Credentials::new("a@b.c", "").validated().is_err());
        assert!(Credentials::new("a@b.c", "pw").validated().is_ok());
    }

    #[test]
    fn profile_keeps_unknown_fields() {
        let p: UserProfile = serde_json::from_value(json!({"email": "a@b.c", "id": 7, "name": "A"})).unwrap();
        assert_eq!(p.display_name(), "a@b.c");
        assert_eq!(p.extra["id"], 7);
        assert_eq!(UserProfile::default().display_name(), "User");
    }
}
