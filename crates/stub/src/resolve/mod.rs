//! Resolution of body specifications into served bodies.
//!
//! The [`Resolver`] turns the body a [`ResponseDefinition`] declares into a [`ResolvedBody`].
//! Plain text, json and binary bodies map directly. File bodies and enriched bodies go through
//! injected collaborators:
//!
//! - [`TemplateResolver`]: renders templatable data stores, data references and file names
//! - [`FileSource`]: fetches body files and `file` store references
//! - [`DataStore`]: fetches references from named stores such as `db`
//! - [`Decompress`]: undoes the payload compression
//!
//! Each collaborator is called at most once per resolution and never retried. Any failure is
//! logged and absorbed: the result is an absent body, so the response stays serviceable.
//!
//! # Enriched bodies
//!
//! ```text
//! dataStore / dataRef ──render templates──▶ none? ──yes──▶ inline data
//!                                             │ no
//!                                             ▼
//!                                 file ▶ FileSource, other ▶ DataStore
//!                                             │
//!                                             ▼
//!                                   decompress(compression)
//!                                             │
//!                                             ▼
//!                         ResolvedBody { is_binary, is_json, format }
//! ```

use crate::body::{BodyVariant, Compression, EnrichedBody, Format, ResolvedBody, is_inline_store};
use crate::codec::Decoder;
use crate::definition::ResponseDefinition;
use crate::error::ResolveError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt::{Debug, Formatter};
use tracing::{debug, trace};

mod source;
pub use source::DataStore;
pub use source::Decompress;
pub use source::FILE_STORE;
pub use source::FileSource;
pub use source::FsFileSource;
pub use source::InMemoryStore;
pub use source::NoFiles;
pub use source::NoStores;

mod template;
pub use template::PassThrough;
pub use template::RenderContext;
pub use template::TemplateResolver;

#[cfg(test)]
pub(crate) use source::{MockDataStore, MockDecompress, MockFileSource};
#[cfg(test)]
pub(crate) use template::MockTemplateResolver;

/// Where an enriched body's payload comes from once its templates are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DataSource {
    Inline,
    File(String),
    Store { store: String, reference: String },
}

pub struct ResolverBuilder {
    templates: Option<Box<dyn TemplateResolver>>,
    files: Option<Box<dyn FileSource>>,
    stores: Option<Box<dyn DataStore>>,
    decompressor: Option<Box<dyn Decompress>>,
}

impl ResolverBuilder {
    fn new() -> Self {
        Self { templates: None, files: None, stores: None, decompressor: None }
    }

    pub fn templates(mut self, templates: impl TemplateResolver + 'static) -> Self {
        self.templates = Some(Box::new(templates));
        self
    }

    pub fn files(mut self, files: impl FileSource + 'static) -> Self {
        self.files = Some(Box::new(files));
        self
    }

    pub fn stores(mut self, stores: impl DataStore + 'static) -> Self {
        self.stores = Some(Box::new(stores));
        self
    }

    pub fn decompressor(mut self, decompressor: impl Decompress + 'static) -> Self {
        self.decompressor = Some(Box::new(decompressor));
        self
    }

    /// Builds the resolver; unset collaborators fall back to [`PassThrough`], [`NoFiles`],
    /// [`NoStores`] and [`Decoder`].
    pub fn build(self) -> Resolver {
        Resolver {
            templates: self.templates.unwrap_or_else(|| Box::new(PassThrough)),
            files: self.files.unwrap_or_else(|| Box::new(NoFiles)),
            stores: self.stores.unwrap_or_else(|| Box::new(NoStores)),
            decompressor: self.decompressor.unwrap_or_else(|| Box::new(Decoder::default())),
        }
    }
}

pub struct Resolver {
    templates: Box<dyn TemplateResolver>,
    files: Box<dyn FileSource>,
    stores: Box<dyn DataStore>,
    decompressor: Box<dyn Decompress>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Debug for Resolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

impl Debug for ResolverBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverBuilder")
            .field("templates", &self.templates.is_some())
            .field("files", &self.files.is_some())
            .field("stores", &self.stores.is_some())
            .field("decompressor", &self.decompressor.is_some())
            .finish()
    }
}

impl Resolver {
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    /// Resolves the body a definition declares; a definition without a body resolves absent.
    pub fn resolve(&self, definition: &ResponseDefinition, context: &RenderContext) -> ResolvedBody {
        match definition.effective_body() {
            Some(body) => self.resolve_variant(&body, context),
            None => ResolvedBody::absent(),
        }
    }

    pub fn resolve_variant(&self, body: &BodyVariant, context: &RenderContext) -> ResolvedBody {
        match body {
            BodyVariant::Text(text) => ResolvedBody::text(text.as_str()),
            BodyVariant::Binary(bytes) => ResolvedBody::binary(bytes.clone()),
            BodyVariant::Json(value) => ResolvedBody::json(value),
            BodyVariant::File(name) => self.resolve_file(name, context),
            BodyVariant::Enriched(enriched) => self.resolve_enriched(enriched, context),
        }
    }

    fn resolve_file(&self, name: &str, context: &RenderContext) -> ResolvedBody {
        let name = self.render(name, context);
        match self.files.fetch(&name) {
            Ok(bytes) => ResolvedBody::new(bytes, Format::from_extension(&name), false, true),
            Err(e) => {
                debug!(cause = %e, file = %name, "failed to fetch body file, body is absent");
                ResolvedBody::absent()
            }
        }
    }

    fn resolve_enriched(&self, body: &EnrichedBody, context: &RenderContext) -> ResolvedBody {
        match self.enriched_payload(body, context) {
            Ok(bytes) => ResolvedBody::new(bytes, body.format(), body.is_json(), body.is_binary()),
            Err(e) => {
                debug!(cause = %e, "failed to resolve enriched body, body is absent");
                ResolvedBody::absent()
            }
        }
    }

    fn enriched_payload(&self, body: &EnrichedBody, context: &RenderContext) -> Result<Bytes, ResolveError> {
        let raw = match self.data_source(body, context) {
            DataSource::Inline => inline_payload(body)?,
            DataSource::File(reference) => self.files.fetch(&reference)?,
            DataSource::Store { store, reference } => self.stores.fetch(&store, &reference)?,
        };

        match body.compression() {
            Compression::None => Ok(raw),
            compression => Ok(self.decompressor.decompress(&raw, compression)?),
        }
    }

    fn data_source(&self, body: &EnrichedBody, context: &RenderContext) -> DataSource {
        let (Some(store), Some(reference)) = (body.data_store(), body.data_ref()) else {
            return DataSource::Inline;
        };

        let store = self.render(store, context);
        if is_inline_store(&store) {
            return DataSource::Inline;
        }

        let store = store.trim();
        let reference = self.render(reference, context).into_owned();
        trace!(store, reference = %reference, "enriched body payload is stored externally");
        if store.eq_ignore_ascii_case(FILE_STORE) {
            DataSource::File(reference)
        } else {
            DataSource::Store { store: store.to_owned(), reference }
        }
    }

    /// Renders a templatable string; a failed render keeps the literal.
    fn render<'a>(&self, text: &'a str, context: &RenderContext) -> Cow<'a, str> {
        if !template::is_templated(text) {
            return Cow::Borrowed(text);
        }

        match self.templates.resolve(text, context) {
            Ok(rendered) => Cow::Owned(rendered),
            Err(e) => {
                debug!(cause = %e, template = text, "unresolvable template, using it literally");
                Cow::Borrowed(text)
            }
        }
    }
}

/// The payload bytes of an inline enriched body.
///
/// Strings are taken as UTF-8 text, other values go through the serializer of the body's
/// format, see [`render_structured`]. A compressed payload can only travel inline as base64 text.
fn inline_payload(body: &EnrichedBody) -> Result<Bytes, ResolveError> {
    match body.data() {
        None => Err(ResolveError::invalid_data("enriched body has neither data nor a data reference")),
        Some(Value::String(text)) if body.compression() != Compression::None => STANDARD
            .decode(text)
            .map(Bytes::from)
            .map_err(|e| ResolveError::invalid_data(format!("compressed inline data must be base64: {e}"))),
        Some(Value::String(text)) => Ok(Bytes::from(text.clone())),
        Some(value) => render_structured(value, body.format()),
    }
}

/// Renders structured inline data in the body's format.
///
/// Yaml bodies are rendered as yaml. Xml, csv and html have no serializer for arbitrary
/// documents, so they fall back to json text like json and text bodies do.
fn render_structured(value: &Value, format: Format) -> Result<Bytes, ResolveError> {
    match format {
        Format::Yaml => serde_yml::to_string(value).map(Bytes::from).map_err(ResolveError::invalid_data),
        Format::Json | Format::Text | Format::Xml | Format::Html | Format::Csv => {
            serde_json::to_vec(value).map(Bytes::from).map_err(ResolveError::invalid_data)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Encoding;
    use crate::definition::ResponseDefinitionBuilder;
    use crate::error::DecompressError;
    use mockall::predicate::eq;
    use serde_json::json;

    fn wiremock_json() -> Value {
        json!({"name": "wiremock", "isCool": true})
    }

    fn entity(body: EnrichedBody) -> ResponseDefinition {
        ResponseDefinitionBuilder::response_definition().with_entity(body).build().unwrap()
    }

    #[test]
    fn text_no_compression() {
        let body = EnrichedBody::inline(Encoding::Text, Format::Text, "some body");
        let resolved = Resolver::default().resolve(&entity(body), &RenderContext::empty());

        assert!(resolved.is_present());
        assert_eq!(resolved.as_string(), "some body");
        assert!(!resolved.is_json());
        assert!(!resolved.is_binary());
    }

    #[test]
    fn json_no_compression() {
        let body = EnrichedBody::inline(Encoding::Text, Format::Json, wiremock_json());
        let resolved = Resolver::default().resolve(&entity(body), &RenderContext::empty());

        assert!(resolved.is_present());
        assert!(resolved.is_json());
        assert!(!resolved.is_binary());
        assert_eq!(resolved.as_json(), Some(wiremock_json()));
        assert_eq!(resolved.format(), Format::Json);
    }

    #[test]
    fn binary_no_compression() {
        let body = EnrichedBody::inline(Encoding::Binary, Format::Text, "some body");
        let resolved = Resolver::default().resolve(&entity(body), &RenderContext::empty());

        assert!(resolved.is_present());
        assert_eq!(resolved.as_string(), "some body");
        assert!(!resolved.is_json());
        assert!(resolved.is_binary());
    }

    // binary encoding wins over the json format
    #[test]
    fn binary_json_is_not_json() {
        let body = EnrichedBody::inline(Encoding::Binary, Format::Json, wiremock_json());
        let resolved = Resolver::default().resolve(&entity(body), &RenderContext::empty());

        assert!(resolved.is_present());
        assert!(!resolved.is_json());
        assert!(resolved.is_binary());
        assert_eq!(resolved.as_json(), Some(wiremock_json()));
    }

    #[test]
    fn non_string_text_data_renders_as_json() {
        let body = EnrichedBody::inline(Encoding::Text, Format::Text, json!([1, 2, 3]));
        let resolved = Resolver::default().resolve_variant(&body.into(), &RenderContext::empty());
        assert_eq!(resolved.as_string(), "[1,2,3]");
    }

    #[test]
    fn yaml_format_renders_structured_data_as_yaml() {
        let body = EnrichedBody::inline(Encoding::Text, Format::Yaml, json!({"name": "wiremock"}));
        let resolved = Resolver::default().resolve_variant(&body.into(), &RenderContext::empty());

        assert_eq!(resolved.as_string(), "name: wiremock\n");
        assert_eq!(resolved.format(), Format::Yaml);
        assert!(!resolved.is_json());
    }

    #[test]
    fn yaml_format_keeps_string_data_verbatim() {
        let body = EnrichedBody::inline(Encoding::Text, Format::Yaml, "name: as written");
        let resolved = Resolver::default().resolve_variant(&body.into(), &RenderContext::empty());
        assert_eq!(resolved.as_string(), "name: as written");
    }

    #[test]
    fn xml_format_falls_back_to_json_text() {
        let body = EnrichedBody::inline(Encoding::Text, Format::Xml, json!({"a": 1}));
        let resolved = Resolver::default().resolve_variant(&body.into(), &RenderContext::empty());
        assert_eq!(resolved.as_string(), "{\"a\":1}");
    }

    #[test]
    fn missing_data_is_absent() {
        let body = EnrichedBody::new(Encoding::Text, Format::Text, Compression::None, None, None, None);
        let resolved = Resolver::default().resolve_variant(&body.into(), &RenderContext::empty());
        assert!(!resolved.is_present());
    }

    #[test]
    fn compressed_inline_data() {
        let payload = wiremock_json().to_string();
        for compression in [Compression::Gzip, Compression::Deflate, Compression::Brotli] {
            let body =
                EnrichedBody::compressed_inline(Encoding::Text, Format::Json, compression, payload.as_bytes()).unwrap();
            let resolved = Resolver::default().resolve_variant(&body.into(), &RenderContext::empty());

            assert!(resolved.is_json(), "{compression}");
            assert_eq!(resolved.as_json(), Some(wiremock_json()), "{compression}");
        }
    }

    #[test]
    fn compressed_inline_data_must_be_base64() {
        let body = EnrichedBody::new(
            Encoding::Text,
            Format::Text,
            Compression::Gzip,
            None,
            None,
            Some(json!("My Response Data")),
        );
        let resolved = Resolver::default().resolve_variant(&body.into(), &RenderContext::empty());
        assert!(!resolved.is_present());
    }

    #[test]
    fn store_indirection_wins_over_inline_data() {
        let mut stores = MockDataStore::new();
        stores
            .expect_fetch()
            .with(eq("db"), eq("users/1"))
            .times(1)
            .returning(|_, _| Ok(Bytes::from_static(b"{\"id\":1}")));

        let body = EnrichedBody::new(
            Encoding::Text,
            Format::Json,
            Compression::None,
            Some("db".into()),
            Some("users/1".into()),
            Some(json!("inline data")),
        );
        let resolver = Resolver::builder().stores(stores).build();
        let resolved = resolver.resolve_variant(&body.into(), &RenderContext::empty());

        assert!(resolved.is_json());
        assert_eq!(resolved.as_json(), Some(json!({"id": 1})));
    }

    #[test]
    fn file_store_goes_to_file_source() {
        let mut files = MockFileSource::new();
        files
            .expect_fetch()
            .with(eq("/path/to/my.data.json"))
            .times(1)
            .returning(|_| Ok(Bytes::from_static(b"file content")));

        let body = EnrichedBody::stored(Encoding::Text, Format::Text, Compression::None, "FILE", "/path/to/my.data.json");
        let resolver = Resolver::builder().files(files).build();
        let resolved = resolver.resolve_variant(&body.into(), &RenderContext::empty());

        assert_eq!(resolved.as_string(), "file content");
    }

    #[test]
    fn custom_store_names_go_to_data_store() {
        let store = InMemoryStore::new().with("files", "/path/to/my.data.json", "from the files store");
        let body = EnrichedBody::stored(Encoding::Text, Format::Text, Compression::None, "files", "/path/to/my.data.json");

        let resolver = Resolver::builder().stores(store).build();
        let resolved = resolver.resolve_variant(&body.into(), &RenderContext::empty());

        assert_eq!(resolved.as_string(), "from the files store");
    }

    #[test]
    fn none_store_uses_inline_data() {
        let mut stores = MockDataStore::new();
        stores.expect_fetch().never();

        let body = EnrichedBody::new(
            Encoding::Text,
            Format::Text,
            Compression::None,
            Some("none".into()),
            Some("ignored".into()),
            Some(json!("inline")),
        );
        let resolver = Resolver::builder().stores(stores).build();
        assert_eq!(resolver.resolve_variant(&body.into(), &RenderContext::empty()).as_string(), "inline");
    }

    #[test]
    fn templated_reference_is_rendered_before_fetch() {
        let context = RenderContext::new(json!({"request": {"path": ["users", "7"]}}));

        let mut templates = MockTemplateResolver::new();
        templates
            .expect_resolve()
            .with(eq("users/{{request.path.[1]}}"), eq(context.clone()))
            .times(1)
            .returning(|_, _| Ok("users/7".to_owned()));

        let mut stores = MockDataStore::new();
        stores.expect_fetch().with(eq("db"), eq("users/7")).times(1).returning(|_, _| Ok(Bytes::from_static(b"bob")));

        let body = EnrichedBody::stored(Encoding::Text, Format::Text, Compression::None, "db", "users/{{request.path.[1]}}");
        let resolver = Resolver::builder().templates(templates).stores(stores).build();

        assert_eq!(resolver.resolve_variant(&body.into(), &context).as_string(), "bob");
    }

    #[test]
    fn unresolvable_template_falls_back_to_literal() {
        let mut templates = MockTemplateResolver::new();
        templates.expect_resolve().times(1).returning(|_, _| Err(ResolveError::template("unknown helper")));

        let mut stores = MockDataStore::new();
        stores
            .expect_fetch()
            .with(eq("db"), eq("{{oops}}"))
            .times(1)
            .returning(|store, reference| Err(ResolveError::not_found(store, reference)));

        let body = EnrichedBody::stored(Encoding::Text, Format::Text, Compression::None, "db", "{{oops}}");
        let resolver = Resolver::builder().templates(templates).stores(stores).build();

        assert!(!resolver.resolve_variant(&body.into(), &RenderContext::empty()).is_present());
    }

    #[test]
    fn stored_payload_is_decompressed_once() {
        let mut decompressor = MockDecompress::new();
        decompressor
            .expect_decompress()
            .with(eq(&b"squashed"[..]), eq(Compression::Brotli))
            .times(1)
            .returning(|_, _| Ok(Bytes::from_static(b"expanded")));

        let store = InMemoryStore::new().with("db", "k", &b"squashed"[..]);
        let body = EnrichedBody::stored(Encoding::Binary, Format::Text, Compression::Brotli, "db", "k");
        let resolver = Resolver::builder().stores(store).decompressor(decompressor).build();

        let resolved = resolver.resolve_variant(&body.into(), &RenderContext::empty());
        assert!(resolved.is_binary());
        assert_eq!(resolved.as_bytes(), b"expanded");
    }

    #[test]
    fn decompress_failure_is_absent() {
        let mut decompressor = MockDecompress::new();
        decompressor.expect_decompress().times(1).returning(|_, algorithm| {
            Err(DecompressError::malformed(algorithm, std::io::Error::other("corrupt stream")))
        });

        let store = InMemoryStore::new().with("db", "k", &b"garbage"[..]);
        let body = EnrichedBody::stored(Encoding::Text, Format::Text, Compression::Gzip, "db", "k");
        let resolver = Resolver::builder().stores(store).decompressor(decompressor).build();

        let resolved = resolver.resolve_variant(&body.into(), &RenderContext::empty());
        assert!(!resolved.is_present());
    }

    #[test]
    fn real_gzip_from_store() {
        let payload = b"hello from a gzip store".repeat(8);
        let mut encoder = crate::codec::Encoder::select(Compression::Gzip).unwrap();
        encoder.write(&payload).unwrap();
        let compressed = encoder.finish().unwrap();

        let store = InMemoryStore::new().with("db", "greeting", compressed);
        let body = EnrichedBody::stored(Encoding::Text, Format::Text, Compression::Gzip, "db", "greeting");
        let resolver = Resolver::builder().stores(store).build();

        assert_eq!(resolver.resolve_variant(&body.into(), &RenderContext::empty()).as_bytes(), &payload[..]);
    }

    #[test]
    fn oversized_payload_is_absent() {
        let payload = b"x".repeat(1024);
        let body = EnrichedBody::compressed_inline(Encoding::Text, Format::Text, Compression::Gzip, &payload).unwrap();

        let capped = Resolver::builder().decompressor(Decoder::with_limit(64)).build();
        assert!(!capped.resolve_variant(&body.clone().into(), &RenderContext::empty()).is_present());

        let resolved = Resolver::default().resolve_variant(&body.into(), &RenderContext::empty());
        assert_eq!(resolved.as_bytes(), &payload[..]);
    }

    #[test]
    fn body_file_resolution() {
        let store = InMemoryStore::new().with(FILE_STORE, "users.json", "[{\"id\":1}]");
        let resolver = Resolver::builder().files(store).build();

        let definition = ResponseDefinitionBuilder::response_definition().with_body_file("users.json").build().unwrap();
        let resolved = resolver.resolve(&definition, &RenderContext::empty());

        assert!(resolved.is_binary());
        assert_eq!(resolved.format(), Format::Json);
        assert_eq!(resolved.as_string(), "[{\"id\":1}]");
    }

    #[test]
    fn body_file_ignored_when_inline_content_present() {
        let mut files = MockFileSource::new();
        files.expect_fetch().never();

        let definition = ResponseDefinitionBuilder::response_definition()
            .with_body_file("my-file")
            .with_body("hello")
            .build()
            .unwrap();
        let resolver = Resolver::builder().files(files).build();

        assert_eq!(resolver.resolve(&definition, &RenderContext::empty()).as_string(), "hello");
    }

    #[test]
    fn missing_body_file_is_absent() {
        let definition = ResponseDefinitionBuilder::response_definition().with_body_file("nope").build().unwrap();
        assert!(!Resolver::default().resolve(&definition, &RenderContext::empty()).is_present());
    }

    #[test]
    fn plain_variants() {
        let resolver = Resolver::default();
        let context = RenderContext::empty();

        let text = resolver.resolve_variant(&BodyVariant::text("hi"), &context);
        assert_eq!(text.as_string(), "hi");
        assert!(!text.is_json() && !text.is_binary());

        let json = resolver.resolve_variant(&BodyVariant::Json(wiremock_json()), &context);
        assert!(json.is_json());
        assert_eq!(json.as_json(), Some(wiremock_json()));

        let binary = resolver.resolve_variant(&BodyVariant::binary(vec![1u8, 2, 3]), &context);
        assert!(binary.is_binary());
        assert_eq!(binary.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn not_configured_resolves_absent() {
        let resolved = Resolver::default().resolve(&ResponseDefinition::not_configured(), &RenderContext::empty());
        assert!(!resolved.is_present());
    }
}
