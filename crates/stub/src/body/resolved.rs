use crate::body::Format;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use mime::Mime;
use serde_json::Value;

/// The concrete body a stub serves, with its classification flags.
///
/// An absent body is what a failed resolution produces: the response is still serviceable,
/// just empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedBody {
    bytes: Option<Bytes>,
    format: Format,
    json: bool,
    binary: bool,
}

impl ResolvedBody {
    pub(crate) fn new(bytes: Bytes, format: Format, json: bool, binary: bool) -> Self {
        Self { bytes: Some(bytes), format, json, binary }
    }

    pub fn absent() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Bytes::from(text.into()), Format::Text, false, false)
    }

    pub fn binary(bytes: impl Into<Bytes>) -> Self {
        Self::new(bytes.into(), Format::Text, false, true)
    }

    pub fn json(value: &Value) -> Self {
        Self::new(Bytes::from(value.to_string()), Format::Json, true, false)
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        self.bytes.is_some()
    }

    #[inline]
    pub fn is_json(&self) -> bool {
        self.json
    }

    #[inline]
    pub fn is_binary(&self) -> bool {
        self.binary
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// The body bytes, empty when absent.
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_deref().unwrap_or_default()
    }

    pub fn into_bytes(self) -> Option<Bytes> {
        self.bytes
    }

    /// The body as text; invalid UTF-8 sequences are replaced.
    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }

    /// The body parsed as a json document, if it is one.
    pub fn as_json(&self) -> Option<Value> {
        let bytes = self.bytes.as_ref()?;
        serde_json::from_slice(bytes).ok()
    }

    pub fn as_base64(&self) -> Option<String> {
        self.bytes.as_ref().map(|bytes| STANDARD.encode(bytes))
    }

    /// The media type to serve the body with, `None` when absent.
    pub fn content_type(&self) -> Option<Mime> {
        if !self.is_present() {
            return None;
        }
        if self.binary && self.format == Format::Text {
            return Some(mime::APPLICATION_OCTET_STREAM);
        }
        Some(self.format.mime())
    }
}
