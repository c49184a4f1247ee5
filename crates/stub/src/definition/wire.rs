//! The document form of a [`ResponseDefinition`].
//!
//! A document may carry several body fields at once. They collapse into one [`BodyVariant`]
//! by precedence, highest first:
//!
//! 1. an explicit entity (builder only)
//! 2. `body` as an enriched object
//! 3. `base64Body`
//! 4. `jsonBody`
//! 5. `body` as a string
//!
//! `bodyFileName` is stored alongside and only served when none of the above is present.
//! Serialization emits the field of the stored variant only.

use crate::body::{BodyVariant, EnrichedBody};
use crate::definition::{ChunkedDribbleDelay, DelayDistribution, Fault, HttpHeaders, Parameters, ResponseDefinition};
use crate::error::DefinitionError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) const DEFAULT_STATUS: u16 = 200;

/// The body fields a definition was given, before precedence picks one.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct BodyCandidates {
    pub(crate) entity: Option<BodyVariant>,
    pub(crate) enriched: Option<EnrichedBody>,
    pub(crate) binary: Option<Bytes>,
    pub(crate) json: Option<Value>,
    pub(crate) text: Option<String>,
    pub(crate) file_name: Option<String>,
}

impl BodyCandidates {
    /// Seeds the slot matching an already selected body.
    pub(crate) fn from_selected(body: Option<BodyVariant>, file_name: Option<String>) -> Self {
        let mut candidates = BodyCandidates { file_name, ..Default::default() };
        match body {
            Some(BodyVariant::Text(text)) => candidates.text = Some(text),
            Some(BodyVariant::Binary(bytes)) => candidates.binary = Some(bytes),
            Some(BodyVariant::Json(value)) => candidates.json = Some(value),
            Some(BodyVariant::Enriched(enriched)) => candidates.enriched = Some(enriched),
            Some(BodyVariant::File(name)) => candidates.file_name = Some(name),
            None => {}
        }
        candidates
    }

    /// Applies the precedence rules, returning the inline body and the body file name.
    pub(crate) fn select(self) -> (Option<BodyVariant>, Option<String>) {
        match self.entity {
            // a file entity replaces inline content with the file reference
            Some(BodyVariant::File(name)) => (None, Some(name)),
            Some(entity) => (Some(entity), self.file_name),
            None => {
                let body = self
                    .enriched
                    .map(BodyVariant::Enriched)
                    .or_else(|| self.binary.map(BodyVariant::Binary))
                    .or_else(|| self.json.filter(|value| !value.is_null()).map(BodyVariant::Json))
                    .or_else(|| self.text.map(BodyVariant::Text));
                (body, self.file_name)
            }
        }
    }
}

/// `body` is either plain text or an enriched object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum BodyField {
    Text(String),
    Enriched(EnrichedBody),
}

fn default_status() -> u16 {
    DEFAULT_STATUS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResponseDoc {
    #[serde(default = "default_status")]
    status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<BodyField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base64_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    json_body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    headers: Option<HttpHeaders>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    additional_proxy_request_headers: Option<HttpHeaders>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fixed_delay_milliseconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delay_distribution: Option<DelayDistribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chunked_dribble_delay: Option<ChunkedDribbleDelay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    proxy_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    proxy_url_prefix_to_remove: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fault: Option<Fault>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    transformers: Vec<String>,
    #[serde(default, skip_serializing_if = "Parameters::is_empty")]
    transformer_parameters: Parameters,
    /// Only written for the not-configured sentinel; absent means configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from_configured_stub: Option<bool>,
}

impl TryFrom<ResponseDoc> for ResponseDefinition {
    type Error = DefinitionError;

    fn try_from(doc: ResponseDoc) -> Result<Self, Self::Error> {
        let binary = match doc.base64_body {
            Some(base64) => Some(Bytes::from(STANDARD.decode(base64)?)),
            None => None,
        };
        let (enriched, text) = match doc.body {
            Some(BodyField::Enriched(enriched)) => (Some(enriched), None),
            Some(BodyField::Text(text)) => (None, Some(text)),
            None => (None, None),
        };

        let candidates =
            BodyCandidates { entity: None, enriched, binary, json: doc.json_body, text, file_name: doc.body_file_name };
        let (body, body_file_name) = candidates.select();

        Ok(ResponseDefinition {
            status: doc.status,
            status_message: doc.status_message,
            body,
            body_file_name,
            headers: doc.headers,
            additional_proxy_request_headers: doc.additional_proxy_request_headers,
            fixed_delay_milliseconds: doc.fixed_delay_milliseconds,
            delay_distribution: doc.delay_distribution,
            chunked_dribble_delay: doc.chunked_dribble_delay,
            proxy_base_url: doc.proxy_base_url,
            proxy_url_prefix_to_remove: doc.proxy_url_prefix_to_remove,
            fault: doc.fault,
            transformers: doc.transformers,
            transformer_parameters: doc.transformer_parameters,
            was_configured: doc.from_configured_stub.unwrap_or(true),
        })
    }
}

impl From<ResponseDefinition> for ResponseDoc {
    fn from(definition: ResponseDefinition) -> Self {
        let mut doc = ResponseDoc {
            status: definition.status,
            status_message: definition.status_message,
            body: None,
            base64_body: None,
            json_body: None,
            body_file_name: definition.body_file_name,
            headers: definition.headers,
            additional_proxy_request_headers: definition.additional_proxy_request_headers,
            fixed_delay_milliseconds: definition.fixed_delay_milliseconds,
            delay_distribution: definition.delay_distribution,
            chunked_dribble_delay: definition.chunked_dribble_delay,
            proxy_base_url: definition.proxy_base_url,
            proxy_url_prefix_to_remove: definition.proxy_url_prefix_to_remove,
            fault: definition.fault,
            transformers: definition.transformers,
            transformer_parameters: definition.transformer_parameters,
            from_configured_stub: (!definition.was_configured).then_some(false),
        };

        match definition.body {
            Some(BodyVariant::Text(text)) => doc.body = Some(BodyField::Text(text)),
            Some(BodyVariant::Enriched(enriched)) => doc.body = Some(BodyField::Enriched(enriched)),
            Some(BodyVariant::Binary(bytes)) => doc.base64_body = Some(STANDARD.encode(bytes)),
            Some(BodyVariant::Json(value)) => doc.json_body = Some(value),
            // never stored inline, see `BodyCandidates::select`
            Some(BodyVariant::File(name)) => doc.body_file_name = Some(name),
            None => {}
        }
        doc
    }
}
