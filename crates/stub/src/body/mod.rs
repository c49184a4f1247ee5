//! Response body representations.
//!
//! - [`BodyVariant`]: the closed set of ways a body can be declared
//! - [`EnrichedBody`]: the variant carrying encoding, format, compression and data source
//!   metadata, with its [`Encoding`], [`Format`] and [`Compression`] enums
//! - [`ResolvedBody`]: the bytes actually served, with `is_json`/`is_binary` flags

mod enriched;
pub use enriched::Compression;
pub use enriched::EnrichedBody;
pub use enriched::Encoding;
pub use enriched::Format;
pub(crate) use enriched::is_inline_store;

mod resolved;
pub use resolved::ResolvedBody;

mod variant;
pub use variant::BodyVariant;
