use crate::body::BodyVariant;
use crate::definition::wire::{BodyCandidates, DEFAULT_STATUS};
use crate::definition::{
    ChunkedDribbleDelay, DelayDistribution, Fault, HttpHeader, HttpHeaders, Parameters, ResponseDefinition,
};
use crate::error::DefinitionError;
use bytes::Bytes;
use serde_json::Value;

/// Builds [`ResponseDefinition`]s.
///
/// Each body setter replaces the previous inline body; the body file name is kept alongside.
/// An entity set with [`with_entity`](Self::with_entity) outranks every other body.
///
/// ```
/// use micro_stub::definition::ResponseDefinitionBuilder;
///
/// let original = ResponseDefinitionBuilder::response_definition()
///     .with_transformer_parameter("name", "original")
///     .build()
///     .unwrap();
/// let derived = ResponseDefinitionBuilder::like(&original)
///     .but()
///     .with_transformer_parameter("name", "changed")
///     .build()
///     .unwrap();
///
/// assert_eq!(original.transformer_parameters().get_string("name"), Some("original"));
/// assert_eq!(derived.transformer_parameters().get_string("name"), Some("changed"));
/// ```
#[derive(Debug, Clone)]
pub struct ResponseDefinitionBuilder {
    status: u16,
    status_message: Option<String>,
    body: Option<BodyVariant>,
    base64_body: Option<String>,
    entity: Option<BodyVariant>,
    body_file_name: Option<String>,
    headers: Option<HttpHeaders>,
    additional_proxy_request_headers: Option<HttpHeaders>,
    fixed_delay_milliseconds: Option<u32>,
    delay_distribution: Option<DelayDistribution>,
    chunked_dribble_delay: Option<ChunkedDribbleDelay>,
    proxy_base_url: Option<String>,
    proxy_url_prefix_to_remove: Option<String>,
    fault: Option<Fault>,
    transformers: Vec<String>,
    transformer_parameters: Parameters,
    was_configured: bool,
}

impl Default for ResponseDefinitionBuilder {
    fn default() -> Self {
        Self::response_definition()
    }
}

impl ResponseDefinitionBuilder {
    pub fn response_definition() -> Self {
        Self {
            status: DEFAULT_STATUS,
            status_message: None,
            body: None,
            base64_body: None,
            entity: None,
            body_file_name: None,
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

    /// Starts from a copy of `definition`. The builder owns clones of every field, so nothing
    /// done to it reaches the original.
    pub fn like(definition: &ResponseDefinition) -> Self {
        let definition = definition.clone();
        Self {
            status: definition.status,
            status_message: definition.status_message,
            body: definition.body,
            base64_body: None,
            entity: None,
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
            was_configured: definition.was_configured,
        }
    }

    /// A builder for a response proxied to `proxy_base_url`.
    pub fn proxied_from(mut self, proxy_base_url: impl Into<String>) -> Self {
        self.proxy_base_url = Some(proxy_base_url.into());
        self
    }

    /// Reads nicely after [`like`](Self::like).
    pub fn but(self) -> Self {
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_status_message(mut self, message: impl Into<String>) -> Self {
        self.status_message = Some(message.into());
        self
    }

    fn replace_body(mut self, body: BodyVariant) -> Self {
        self.body = Some(body);
        self.base64_body = None;
        self
    }

    pub fn with_body(self, body: impl Into<String>) -> Self {
        self.replace_body(BodyVariant::Text(body.into()))
    }

    pub fn with_binary_body(self, body: impl Into<Bytes>) -> Self {
        self.replace_body(BodyVariant::Binary(body.into()))
    }

    /// Sets a binary body from its base64 form; invalid base64 fails the build.
    pub fn with_base64_body(mut self, base64: impl Into<String>) -> Self {
        self.body = None;
        self.base64_body = Some(base64.into());
        self
    }

    pub fn with_json_body(self, body: Value) -> Self {
        self.replace_body(BodyVariant::Json(body))
    }

    pub fn with_body_file(mut self, file_name: impl Into<String>) -> Self {
        self.body_file_name = Some(file_name.into());
        self
    }

    /// Sets a body that outranks any other body set on this builder.
    pub fn with_entity(mut self, entity: impl Into<BodyVariant>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.get_or_insert_with(HttpHeaders::new).push(HttpHeader::new(key, value));
        self
    }

    pub fn with_headers(mut self, headers: HttpHeaders) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_fixed_delay(mut self, milliseconds: u32) -> Self {
        self.fixed_delay_milliseconds = Some(milliseconds);
        self
    }

    pub fn with_random_delay(mut self, distribution: DelayDistribution) -> Self {
        self.delay_distribution = Some(distribution);
        self
    }

    pub fn with_uniform_random_delay(self, lower: u32, upper: u32) -> Self {
        self.with_random_delay(DelayDistribution::Uniform { lower, upper })
    }

    pub fn with_log_normal_random_delay(self, median: f64, sigma: f64) -> Self {
        self.with_random_delay(DelayDistribution::Lognormal { median, sigma })
    }

    pub fn with_chunked_dribble_delay(mut self, number_of_chunks: u32, total_duration: u64) -> Self {
        self.chunked_dribble_delay = Some(ChunkedDribbleDelay { number_of_chunks, total_duration });
        self
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }

    pub fn with_transformers<I, S>(mut self, transformers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transformers = transformers.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a transformer together with one of its parameters.
    pub fn with_transformer(mut self, name: impl Into<String>, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.transformers.push(name.into());
        self.with_transformer_parameter(key, value)
    }

    pub fn with_transformer_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.transformer_parameters.insert(key, value);
        self
    }

    pub fn with_transformer_parameters(mut self, parameters: Parameters) -> Self {
        self.transformer_parameters.extend(parameters.iter().map(|(key, value)| (key.clone(), value.clone())));
        self
    }

    /// Adds a header to the request sent to the proxy target.
    pub fn with_additional_request_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_proxy_request_headers.get_or_insert_with(HttpHeaders::new).push(HttpHeader::new(key, value));
        self
    }

    pub fn with_proxy_url_prefix_to_remove(mut self, prefix: impl Into<String>) -> Self {
        self.proxy_url_prefix_to_remove = Some(prefix.into());
        self
    }

    pub fn build(self) -> Result<ResponseDefinition, DefinitionError> {
        let body = match self.base64_body {
            Some(base64) => Some(BodyVariant::from_base64(&base64)?),
            None => self.body,
        };

        let mut candidates = BodyCandidates::from_selected(body, self.body_file_name);
        candidates.entity = self.entity;
        let (body, body_file_name) = candidates.select();

        Ok(ResponseDefinition {
            status: self.status,
            status_message: self.status_message,
            body,
            body_file_name,
            headers: self.headers,
            additional_proxy_request_headers: self.additional_proxy_request_headers,
            fixed_delay_milliseconds: self.fixed_delay_milliseconds,
            delay_distribution: self.delay_distribution,
            chunked_dribble_delay: self.chunked_dribble_delay,
            proxy_base_url: self.proxy_base_url,
            proxy_url_prefix_to_remove: self.proxy_url_prefix_to_remove,
            fault: self.fault,
            transformers: self.transformers,
            transformer_parameters: self.transformer_parameters,
            was_configured: self.was_configured,
        })
    }
}
