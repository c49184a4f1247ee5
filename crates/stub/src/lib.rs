//! Declarative stub response bodies and their resolution
//!
//! This crate models the response half of an HTTP stub: a [`ResponseDefinition`] declares a
//! status, headers and a body, and a [`Resolver`] turns the declared body into the concrete
//! bytes that get served.
//!
//! # Features
//!
//! - Text, binary, json, file and enriched body declarations in one closed [`BodyVariant`]
//! - Enriched bodies with encoding, format and compression metadata
//! - Payloads stored inline or behind a data store reference, with templated references
//! - gzip, deflate and brotli decompression of stored payloads
//! - A json wire format with a fixed body precedence and lossless round trips
//! - Resolution failures degrade to an absent body instead of an error
//!
//! # Example
//!
//! ```
//! use micro_stub::resolve::{InMemoryStore, RenderContext, Resolver};
//! use micro_stub::ResponseDefinition;
//!
//! let definition = ResponseDefinition::from_json(
//!     r#"{
//!         "status": 200,
//!         "body": {"encoding": "text", "format": "json", "dataStore": "db", "dataRef": "users/1"}
//!     }"#,
//! )
//! .unwrap();
//!
//! let store = InMemoryStore::new().with("db", "users/1", r#"{"name":"alice"}"#);
//! let resolver = Resolver::builder().stores(store).build();
//!
//! let body = resolver.resolve(&definition, &RenderContext::empty());
//! assert!(body.is_json());
//! assert_eq!(body.as_string(), r#"{"name":"alice"}"#);
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`body`]: body declarations and the resolved body
//! - [`definition`]: response definitions, their builder and wire format
//! - [`resolve`]: the resolver and the collaborators it delegates to
//! - [`codec`]: compression codecs for stored payloads
//! - [`error`]: error types

pub mod body;
pub mod codec;
pub mod definition;
pub mod error;
pub mod resolve;

pub use body::{BodyVariant, Compression, EnrichedBody, Encoding, Format, ResolvedBody};
pub use definition::{ResponseDefinition, ResponseDefinitionBuilder};
pub use resolve::{RenderContext, Resolver};
