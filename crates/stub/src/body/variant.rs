use crate::body::EnrichedBody;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde_json::Value;

/// One way of declaring a response body.
///
/// A definition carries at most one of these; when a document offers several candidates the
/// precedence documented on [`crate::definition::ResponseDefinition`] picks the winner. Consumers match
/// exhaustively so that a new representation can't be silently ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyVariant {
    /// Plain text, served as is.
    Text(String),
    /// Raw bytes, carried as base64 on the wire.
    Binary(Bytes),
    /// A structured document, served as json text.
    Json(Value),
    /// A symbolic file name, fetched through a [`crate::resolve::FileSource`].
    File(String),
    /// A body with encoding, format, compression and data source metadata.
    Enriched(EnrichedBody),
}

impl BodyVariant {
    pub fn text(text: impl Into<String>) -> Self {
        BodyVariant::Text(text.into())
    }

    pub fn binary(bytes: impl Into<Bytes>) -> Self {
        BodyVariant::Binary(bytes.into())
    }

    pub fn from_base64(base64: &str) -> Result<Self, base64::DecodeError> {
        STANDARD.decode(base64).map(|bytes| BodyVariant::Binary(Bytes::from(bytes)))
    }

    /// Returns true for variants whose content is declared in the definition itself.
    pub fn is_inline(&self) -> bool {
        match self {
            BodyVariant::Text(_) | BodyVariant::Binary(_) | BodyVariant::Json(_) | BodyVariant::Enriched(_) => true,
            BodyVariant::File(_) => false,
        }
    }

    /// The base64 form of a binary body.
    pub fn base64(&self) -> Option<String> {
        match self {
            BodyVariant::Binary(bytes) => Some(STANDARD.encode(bytes)),
            _ => None,
        }
    }
}

impl From<EnrichedBody> for BodyVariant {
    fn from(body: EnrichedBody) -> Self {
        BodyVariant::Enriched(body)
    }
}

impl From<String> for BodyVariant {
    fn from(text: String) -> Self {
        BodyVariant::Text(text)
    }
}

impl From<&str> for BodyVariant {
    fn from(text: &str) -> Self {
        BodyVariant::Text(text.to_owned())
    }
}

impl From<Value> for BodyVariant {
    fn from(value: Value) -> Self {
        BodyVariant::Json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_decodes_binary() {
        let body = BodyVariant::from_base64("AQID").unwrap();
        assert_eq!(body, BodyVariant::Binary(Bytes::from_static(&[1, 2, 3])));
        assert_eq!(body.base64().as_deref(), Some("AQID"));
    }

    #[test]
    fn invalid_base64_is_an_error() {
        assert!(BodyVariant::from_base64("not base64!").is_err());
    }

    #[test]
    fn only_file_is_not_inline() {
        assert!(BodyVariant::text("hello").is_inline());
        assert!(BodyVariant::from(serde_json::json!({})).is_inline());
        assert!(!BodyVariant::File("my-file".into()).is_inline());
    }
}
