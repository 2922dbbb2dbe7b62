//! RAGFlow API wire types
//!
//! Request bodies and response shapes for the `/api/v1` HTTP interface.
//! Every response is wrapped in an [`Envelope`].

use bridge_traits::storage::{DocumentMetadata, RemoteDocument};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response wrapper shared by every endpoint: `{code, message, data}`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    /// Zero on success
    pub code: i64,

    #[serde(default)]
    pub message: Option<String>,

    pub data: Option<T>,
}

/// Entry of `GET /datasets`
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetEntry {
    pub id: String,

    #[serde(default)]
    pub name: String,
}

/// `parser_config` object used on create and update
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ParserConfigBody {
    pub chunk_token_num: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

/// Body of `POST /datasets`
#[derive(Debug, Serialize)]
pub struct CreateDatasetRequest<'a> {
    pub name: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,

    pub embedding_model: &'a str,
    pub chunk_method: &'a str,
    pub parser_config: ParserConfigBody,
}

/// Body of `PUT /datasets/{id}`
#[derive(Debug, Default, Serialize)]
pub struct UpdateDatasetRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser_config: Option<ParserConfigBody>,
}

/// `data` of `GET /datasets/{id}/documents`
///
/// `docs` is required: a page without it is malformed and gets retried.
#[derive(Debug, Deserialize)]
pub struct DocumentPage {
    pub docs: Vec<DocumentEntry>,

    #[serde(default)]
    pub total: Option<u64>,
}

/// One listed document
///
/// Servers differ in which timestamp and metadata keys they send, so each
/// spelling has its own field and the first present one wins.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentEntry {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub created_at: Option<WireTimestamp>,

    #[serde(default)]
    pub create_time: Option<WireTimestamp>,

    #[serde(default)]
    pub create_date: Option<WireTimestamp>,

    #[serde(default)]
    pub updated_at: Option<WireTimestamp>,

    #[serde(default)]
    pub update_time: Option<WireTimestamp>,

    #[serde(default)]
    pub update_date: Option<WireTimestamp>,

    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, Value>>,

    #[serde(default)]
    pub meta_fields: Option<serde_json::Map<String, Value>>,
}

/// Timestamps arrive either as epoch numbers (ms or s) or as date strings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WireTimestamp {
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Above this an epoch number is taken to be in milliseconds
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

impl WireTimestamp {
    /// Unix seconds, if the value can be interpreted
    pub fn to_unix_seconds(&self) -> Option<i64> {
        match self {
            WireTimestamp::Integer(n) => Some(Self::normalize_epoch(*n)),
            WireTimestamp::Float(f) if f.is_finite() => Some(Self::normalize_epoch(*f as i64)),
            WireTimestamp::Float(_) => None,
            WireTimestamp::Text(text) => Self::parse_text(text.trim()),
        }
    }

    fn normalize_epoch(n: i64) -> i64 {
        if n.abs() >= MILLIS_THRESHOLD {
            n / 1000
        } else {
            n
        }
    }

    fn parse_text(text: &str) -> Option<i64> {
        if let Ok(n) = text.parse::<i64>() {
            return Some(Self::normalize_epoch(n));
        }

        DateTime::parse_from_rfc3339(text)
            .or_else(|_| DateTime::parse_from_rfc2822(text))
            .ok()
            .map(|dt| dt.with_timezone(&Utc).timestamp())
    }
}

fn first_timestamp(candidates: [&Option<WireTimestamp>; 3]) -> Option<i64> {
    candidates
        .into_iter()
        .flatten()
        .find_map(WireTimestamp::to_unix_seconds)
}

impl DocumentEntry {
    pub fn into_remote_document(self) -> RemoteDocument {
        let created_at = first_timestamp([&self.created_at, &self.create_time, &self.create_date]);
        let updated_at = first_timestamp([&self.updated_at, &self.update_time, &self.update_date]);

        let metadata: DocumentMetadata = self
            .metadata
            .or(self.meta_fields)
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect();

        RemoteDocument {
            id: self.id,
            name: self.name,
            created_at,
            updated_at,
            metadata,
        }
    }
}

/// Body of `POST /datasets/{id}/chunks`
#[derive(Debug, Serialize)]
pub struct ParseRequest<'a> {
    pub document_ids: Vec<&'a str>,
}

/// Body of `PUT /datasets/{id}/documents/{doc_id}`
#[derive(Debug, Serialize)]
pub struct MetadataRequest<'a> {
    pub meta_fields: &'a DocumentMetadata,
}
