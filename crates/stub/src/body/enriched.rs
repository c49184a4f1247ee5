//! The enriched body: a payload described by encoding, format and compression metadata,
//! carried inline or referenced in an external data store.
//!
//! The three metadata enums are closed sets with a total parse: anything outside the set,
//! including empty and whitespace-only input, becomes the documented default. The data-store
//! fields are kept verbatim since they may hold template placeholders that only resolve at
//! serve time.

use crate::codec::Encoder;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mime::Mime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use std::io;

/// How the payload is natively represented.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    #[default]
    Text,
    Binary,
    Multipart,
}

impl Encoding {
    pub const ALL: [Encoding; 3] = [Encoding::Text, Encoding::Binary, Encoding::Multipart];

    /// Parses a wire name, falling back to [`Encoding::Text`].
    pub fn parse(name: &str) -> Self {
        Self::ALL.into_iter().find(|encoding| name.trim().eq_ignore_ascii_case(encoding.as_str())).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Text => "text",
            Encoding::Binary => "binary",
            Encoding::Multipart => "multipart",
        }
    }
}

/// The logical content format of the payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Format {
    #[default]
    Text,
    Json,
    Xml,
    Html,
    Yaml,
    Csv,
}

impl Format {
    pub const ALL: [Format; 6] = [Format::Text, Format::Json, Format::Xml, Format::Html, Format::Yaml, Format::Csv];

    /// Parses a wire name, falling back to [`Format::Text`].
    pub fn parse(name: &str) -> Self {
        Self::ALL.into_iter().find(|format| name.trim().eq_ignore_ascii_case(format.as_str())).unwrap_or_default()
    }

    /// Infers the format from a file name's extension.
    pub fn from_extension(file_name: &str) -> Self {
        let Some((_, ext)) = file_name.rsplit_once('.') else {
            return Format::Text;
        };

        match ext.to_ascii_lowercase().as_str() {
            "json" => Format::Json,
            "xml" => Format::Xml,
            "html" | "htm" => Format::Html,
            "yaml" | "yml" => Format::Yaml,
            "csv" => Format::Csv,
            _ => Format::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Text => "text",
            Format::Json => "json",
            Format::Xml => "xml",
            Format::Html => "html",
            Format::Yaml => "yaml",
            Format::Csv => "csv",
        }
    }

    /// The media type a body of this format is served with.
    pub fn mime(&self) -> Mime {
        match self {
            Format::Text => mime::TEXT_PLAIN_UTF_8,
            Format::Json => mime::APPLICATION_JSON,
            Format::Xml => mime::TEXT_XML,
            Format::Html => mime::TEXT_HTML_UTF_8,
            Format::Yaml => "application/yaml".parse().unwrap_or(mime::TEXT_PLAIN_UTF_8),
            Format::Csv => mime::TEXT_CSV_UTF_8,
        }
    }
}

/// Compression applied to the stored payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Deflate,
    Brotli,
}

impl Compression {
    pub const ALL: [Compression; 4] = [Compression::None, Compression::Gzip, Compression::Deflate, Compression::Brotli];

    /// Parses a wire name, falling back to [`Compression::None`].
    pub fn parse(name: &str) -> Self {
        Self::ALL.into_iter().find(|compression| name.trim().eq_ignore_ascii_case(compression.as_str())).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
            Compression::Deflate => "deflate",
            Compression::Brotli => "brotli",
        }
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Compression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true when a data store name means "the payload is inline".
pub(crate) fn is_inline_store(store: &str) -> bool {
    let store = store.trim();
    store.is_empty() || store.eq_ignore_ascii_case("none")
}

/// A body carrying its own encoding, format and compression metadata.
///
/// The payload is either inline in `data` or referenced through `data_store`/`data_ref`.
/// When both are given the reference wins and `data` is only informative.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(into = "EnrichedDoc")]
pub struct EnrichedBody {
    encoding: Encoding,
    format: Format,
    compression: Compression,
    data_store: Option<String>,
    data_ref: Option<String>,
    data: Option<Value>,
}

impl EnrichedBody {
    pub fn new(
        encoding: Encoding,
        format: Format,
        compression: Compression,
        data_store: Option<String>,
        data_ref: Option<String>,
        data: Option<Value>,
    ) -> Self {
        let data = data.filter(|value| !value.is_null());
        Self { encoding, format, compression, data_store, data_ref, data }
    }

    /// An uncompressed inline body.
    pub fn inline(encoding: Encoding, format: Format, data: impl Into<Value>) -> Self {
        Self::new(encoding, format, Compression::None, None, None, Some(data.into()))
    }

    /// A body whose payload lives in `store` under `reference`.
    pub fn stored(
        encoding: Encoding,
        format: Format,
        compression: Compression,
        store: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self::new(encoding, format, compression, Some(store.into()), Some(reference.into()), None)
    }

    /// Compresses `payload` and carries it inline as base64 text.
    pub fn compressed_inline(
        encoding: Encoding,
        format: Format,
        compression: Compression,
        payload: &[u8],
    ) -> io::Result<Self> {
        let compressed = match Encoder::select(compression) {
            Some(mut encoder) => {
                encoder.write(payload)?;
                encoder.finish()?
            }
            None => bytes::Bytes::copy_from_slice(payload),
        };
        let data = Value::String(STANDARD.encode(compressed));
        Ok(Self::new(encoding, format, compression, None, None, Some(data)))
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn data_store(&self) -> Option<&str> {
        self.data_store.as_deref()
    }

    pub fn data_ref(&self) -> Option<&str> {
        self.data_ref.as_deref()
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// True when the payload must be fetched from a store rather than taken from `data`.
    pub fn is_indirect(&self) -> bool {
        self.data_ref.is_some() && self.data_store.as_deref().is_some_and(|store| !is_inline_store(store))
    }

    pub fn is_binary(&self) -> bool {
        self.encoding == Encoding::Binary
    }

    // binary encoding suppresses the json classification, even for json formatted data
    pub fn is_json(&self) -> bool {
        self.format == Format::Json && self.encoding != Encoding::Binary
    }

    /// The inline data as declared text, for non-json textual bodies.
    pub(crate) fn declared_text(&self) -> Option<&str> {
        if self.is_binary() || self.format == Format::Json {
            return None;
        }
        self.data.as_ref().and_then(Value::as_str)
    }

    /// The inline data as a declared json document.
    pub(crate) fn declared_json(&self) -> Option<&Value> {
        if !self.is_json() {
            return None;
        }
        self.data.as_ref()
    }
}

/// Wire shape of [`EnrichedBody`]; unrecognized enum names are normalized on conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct EnrichedDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    compression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_store: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl From<EnrichedDoc> for EnrichedBody {
    fn from(doc: EnrichedDoc) -> Self {
        EnrichedBody::new(
            doc.encoding.as_deref().map(Encoding::parse).unwrap_or_default(),
            doc.format.as_deref().map(Format::parse).unwrap_or_default(),
            doc.compression.as_deref().map(Compression::parse).unwrap_or_default(),
            doc.data_store,
            doc.data_ref,
            doc.data,
        )
    }
}

impl<'de> Deserialize<'de> for EnrichedBody {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // only an object matches the enriched shape, never a sequence of its fields
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        EnrichedDoc::deserialize(Value::Object(fields)).map(EnrichedBody::from).map_err(serde::de::Error::custom)
    }
}

impl From<EnrichedBody> for EnrichedDoc {
    fn from(body: EnrichedBody) -> Self {
        EnrichedDoc {
            encoding: Some(body.encoding.as_str().to_owned()),
            format: Some(body.format.as_str().to_owned()),
            compression: Some(body.compression.as_str().to_owned()),
            data_store: body.data_store,
            data_ref: body.data_ref,
            data: body.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_recognized_names() {
        for encoding in Encoding::ALL {
            assert_eq!(Encoding::parse(encoding.as_str()), encoding);
        }
        for format in Format::ALL {
            assert_eq!(Format::parse(format.as_str()), format);
        }
        for compression in Compression::ALL {
            assert_eq!(Compression::parse(compression.as_str()), compression);
        }

        assert_eq!(Encoding::parse(" BINARY "), Encoding::Binary);
        assert_eq!(Format::parse("Json"), Format::Json);
    }

    #[test]
    fn parse_unknown_names_to_default() {
        for name in ["unknown", "", "  ", "\t", "gzipped"] {
            assert_eq!(Encoding::parse(name), Encoding::Text);
            assert_eq!(Format::parse(name), Format::Text);
            assert_eq!(Compression::parse(name), Compression::None);
        }
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_extension("users.json"), Format::Json);
        assert_eq!(Format::from_extension("page.HTM"), Format::Html);
        assert_eq!(Format::from_extension("data.yml"), Format::Yaml);
        assert_eq!(Format::from_extension("noext"), Format::Text);
        assert_eq!(Format::from_extension("archive.tar.gz"), Format::Text);
    }

    #[test]
    fn format_mime() {
        assert_eq!(Format::Json.mime(), mime::APPLICATION_JSON);
        assert_eq!(Format::Yaml.mime().essence_str(), "application/yaml");
        assert_eq!(Format::Csv.mime().essence_str(), "text/csv");
    }

    #[test]
    fn deserialize_defaults_missing_and_invalid_enums() {
        let body: EnrichedBody = serde_json::from_value(json!({
            "encoding": "unknown",
            "compression": "  ",
            "dataStore": "{{request.path.[1]}}",
            "dataRef": "/path/to/my.data.json"
        }))
        .unwrap();

        assert_eq!(body.encoding(), Encoding::Text);
        assert_eq!(body.format(), Format::Text);
        assert_eq!(body.compression(), Compression::None);
        assert_eq!(body.data_store(), Some("{{request.path.[1]}}"));
        assert_eq!(body.data_ref(), Some("/path/to/my.data.json"));
        assert_eq!(body.data(), None);
    }

    #[test]
    fn serialize_canonical_names() {
        let body: EnrichedBody = serde_json::from_value(json!({"encoding": "BINARY", "format": "bogus"})).unwrap();

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, json!({"encoding": "binary", "format": "text", "compression": "none"}));

        // normalized once, stable afterwards
        let again: EnrichedBody = serde_json::from_value(value).unwrap();
        assert_eq!(again, body);
    }

    #[test]
    fn indirection_needs_store_and_ref() {
        assert!(EnrichedBody::stored(Encoding::Text, Format::Text, Compression::None, "db", "k").is_indirect());
        assert!(!EnrichedBody::stored(Encoding::Text, Format::Text, Compression::None, "none", "k").is_indirect());
        assert!(!EnrichedBody::stored(Encoding::Text, Format::Text, Compression::None, " ", "k").is_indirect());

        let no_ref = EnrichedBody::new(Encoding::Text, Format::Text, Compression::None, Some("db".into()), None, None);
        assert!(!no_ref.is_indirect());
    }

    #[test]
    fn binary_encoding_suppresses_json() {
        let json_text = EnrichedBody::inline(Encoding::Text, Format::Json, json!({"a": 1}));
        assert!(json_text.is_json());
        assert!(!json_text.is_binary());

        let json_binary = EnrichedBody::inline(Encoding::Binary, Format::Json, json!({"a": 1}));
        assert!(!json_binary.is_json());
        assert!(json_binary.is_binary());
    }

    #[test]
    fn only_objects_with_known_fields_deserialize() {
        assert!(serde_json::from_value::<EnrichedBody>(json!(["binary", "json", "gzip"])).is_err());
        assert!(serde_json::from_value::<EnrichedBody>(json!({"status": 500, "foo": 1})).is_err());
        assert!(serde_json::from_value::<EnrichedBody>(json!("text")).is_err());
        assert_eq!(serde_json::from_value::<EnrichedBody>(json!({})).unwrap(), EnrichedBody::default());
    }

    #[test]
    fn null_data_is_absent() {
        let body = EnrichedBody::new(Encoding::Text, Format::Text, Compression::None, None, None, Some(Value::Null));
        assert_eq!(body.data(), None);
    }
}
