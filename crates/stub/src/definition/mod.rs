//! Response definitions: the declarative description of what a stub responds with.
//!
//! A [`ResponseDefinition`] owns at most one inline [`BodyVariant`] plus an optional body file
//! name. When several body fields are offered, by a document or by the builder, the highest
//! ranked one is kept:
//!
//! 1. an explicit entity given to [`ResponseDefinitionBuilder::with_entity`]
//! 2. an enriched `body` object
//! 3. `base64Body`
//! 4. `jsonBody`
//! 5. a plain string `body`
//!
//! The body file is only served when no inline body is present, see
//! [`ResponseDefinition::effective_body`].
//!
//! # Example
//!
//! ```
//! use micro_stub::definition::ResponseDefinition;
//!
//! let definition = ResponseDefinition::from_json(r#"{"status": 201, "base64Body": "AQID"}"#).unwrap();
//! assert_eq!(definition.status(), 201);
//! assert_eq!(definition.byte_body().as_deref(), Some(&[1u8, 2, 3][..]));
//! ```

mod builder;
mod header;
mod peer;
mod wire;

pub use builder::ResponseDefinitionBuilder;
pub use header::HttpHeader;
pub use header::HttpHeaders;
pub use peer::ChunkedDribbleDelay;
pub use peer::DelayDistribution;
pub use peer::Fault;
pub use peer::Parameters;

use crate::body::{BodyVariant, EnrichedBody, ResolvedBody};
use crate::error::DefinitionError;
use crate::resolve::{RenderContext, Resolver};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use wire::ResponseDoc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ResponseDoc", into = "ResponseDoc")]
pub struct ResponseDefinition {
    pub(crate) status: u16,
    pub(crate) status_message: Option<String>,
    pub(crate) body: Option<BodyVariant>,
    pub(crate) body_file_name: Option<String>,
    pub(crate) headers: Option<HttpHeaders>,
    pub(crate) additional_proxy_request_headers: Option<HttpHeaders>,
    pub(crate) fixed_delay_milliseconds: Option<u32>,
    pub(crate) delay_distribution: Option<DelayDistribution>,
    pub(crate) chunked_dribble_delay: Option<ChunkedDribbleDelay>,
    pub(crate) proxy_base_url: Option<String>,
    pub(crate) proxy_url_prefix_to_remove: Option<String>,
    pub(crate) fault: Option<Fault>,
    pub(crate) transformers: Vec<String>,
    pub(crate) transformer_parameters: Parameters,
    pub(crate) was_configured: bool,
}

impl ResponseDefinition {
    /// A configured definition with a status and an optional body.
    pub fn new(status: u16, body: Option<BodyVariant>) -> Self {
        let (body, body_file_name) = wire::BodyCandidates { entity: body, ..Default::default() }.select();
        Self {
            status,
            status_message: None,
            body,
            body_file_name,
            headers: None,
            additional_proxy_request_headers: None,
            fixed_delay_milliseconds: None,
            delay_distribution: None,
            chunked_dribble_delay: None,
            proxy_base_url: None,
            proxy_url_prefix_to_remove: None,
            fault: None,
            transformers: Vec::new(),
            transformer_parameters: Parameters::empty(),
            was_configured: true,
        }
    }

    /// The sentinel for "no response has been defined yet": a 404 without a body.
    pub fn not_configured() -> Self {
        Self { was_configured: false, ..Self::new(404, None) }
    }

    /// A deep copy; nothing is shared with `original`.
    pub fn copy_of(original: &ResponseDefinition) -> Self {
        original.clone()
    }

    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, DefinitionError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// The inline body declaration, if any.
    pub fn body_variant(&self) -> Option<&BodyVariant> {
        self.body.as_ref()
    }

    /// The declared text body. Enriched bodies count when they carry textual inline data.
    pub fn body(&self) -> Option<&str> {
        match self.body.as_ref()? {
            BodyVariant::Text(text) => Some(text),
            BodyVariant::Enriched(enriched) => enriched.declared_text(),
            BodyVariant::Binary(_) | BodyVariant::Json(_) | BodyVariant::File(_) => None,
        }
    }

    /// The declared json body. Enriched bodies count when they classify as json.
    pub fn json_body(&self) -> Option<&Value> {
        match self.body.as_ref()? {
            BodyVariant::Json(value) => Some(value),
            BodyVariant::Enriched(enriched) => enriched.declared_json(),
            BodyVariant::Text(_) | BodyVariant::Binary(_) | BodyVariant::File(_) => None,
        }
    }

    pub fn base64_body(&self) -> Option<String> {
        self.body.as_ref().and_then(BodyVariant::base64)
    }

    /// The declared inline body as bytes; json bodies are rendered as json text.
    ///
    /// Enriched bodies may be compressed or stored elsewhere and file bodies live in a file
    /// source, so both give `None` here. Their bytes come from [`response_body`](Self::response_body)
    /// or a configured [`Resolver`].
    pub fn byte_body(&self) -> Option<Bytes> {
        match self.body.as_ref()? {
            BodyVariant::Binary(bytes) => Some(bytes.clone()),
            BodyVariant::Text(text) => Some(Bytes::copy_from_slice(text.as_bytes())),
            BodyVariant::Json(value) => Some(Bytes::from(value.to_string())),
            BodyVariant::Enriched(_) | BodyVariant::File(_) => None,
        }
    }

    pub fn enriched_body(&self) -> Option<&EnrichedBody> {
        match self.body.as_ref()? {
            BodyVariant::Enriched(enriched) => Some(enriched),
            _ => None,
        }
    }

    pub fn body_file_name(&self) -> Option<&str> {
        self.body_file_name.as_deref()
    }

    /// The body that is actually served: the inline body, or else the body file.
    pub fn effective_body(&self) -> Option<Cow<'_, BodyVariant>> {
        match (&self.body, &self.body_file_name) {
            (Some(body), _) => Some(Cow::Borrowed(body)),
            (None, Some(file_name)) => Some(Cow::Owned(BodyVariant::File(file_name.clone()))),
            (None, None) => None,
        }
    }

    /// True when the body file is served, i.e. no inline body suppresses it.
    pub fn specifies_body_file(&self) -> bool {
        self.body_file_name.is_some() && self.body.is_none()
    }

    pub fn specifies_body_content(&self) -> bool {
        self.body.is_some()
    }

    /// Resolves the body with the default [`Resolver`], which has no files or data stores.
    pub fn response_body(&self) -> ResolvedBody {
        Resolver::default().resolve(self, &RenderContext::empty())
    }

    pub fn headers(&self) -> Option<&HttpHeaders> {
        self.headers.as_ref()
    }

    pub fn additional_proxy_request_headers(&self) -> Option<&HttpHeaders> {
        self.additional_proxy_request_headers.as_ref()
    }

    pub fn fixed_delay_milliseconds(&self) -> Option<u32> {
        self.fixed_delay_milliseconds
    }

    pub fn delay_distribution(&self) -> Option<&DelayDistribution> {
        self.delay_distribution.as_ref()
    }

    pub fn chunked_dribble_delay(&self) -> Option<ChunkedDribbleDelay> {
        self.chunked_dribble_delay
    }

    pub fn proxy_base_url(&self) -> Option<&str> {
        self.proxy_base_url.as_deref()
    }

    pub fn proxy_url_prefix_to_remove(&self) -> Option<&str> {
        self.proxy_url_prefix_to_remove.as_deref()
    }

    pub fn is_proxy_response(&self) -> bool {
        self.proxy_base_url.is_some()
    }

    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    pub fn transformers(&self) -> &[String] {
        &self.transformers
    }

    pub fn has_transformer(&self, name: &str) -> bool {
        self.transformers.iter().any(|transformer| transformer == name)
    }

    pub fn transformer_parameters(&self) -> &Parameters {
        &self.transformer_parameters
    }

    pub fn was_configured(&self) -> bool {
        self.was_configured
    }
}

impl Default for ResponseDefinition {
    fn default() -> Self {
        Self::new(wire::DEFAULT_STATUS, None)
    }
}

/// Deep copy of a definition, see [`ResponseDefinition::copy_of`].
pub fn copy_of(original: &ResponseDefinition) -> ResponseDefinition {
    ResponseDefinition::copy_of(original)
}
