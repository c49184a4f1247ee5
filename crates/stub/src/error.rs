use crate::body::Compression;
use std::io;
use thiserror::Error;

/// Failure while turning a body specification into a served body.
///
/// These never reach the caller of [`crate::resolve::Resolver::resolve`]: the resolver absorbs
/// them into an absent body. Collaborator implementations return them.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("template error: {reason}")]
    Template { reason: String },

    #[error("reference {reference:?} not found in store {store:?}")]
    NotFound { store: String, reference: String },

    #[error("store error: {reason}")]
    Store { reason: String },

    #[error("invalid inline data: {reason}")]
    InvalidData { reason: String },

    #[error("decompress error: {source}")]
    Decompress {
        #[from]
        source: DecompressError,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ResolveError {
    pub fn template<S: ToString>(str: S) -> Self {
        Self::Template { reason: str.to_string() }
    }

    pub fn not_found<S: ToString, R: ToString>(store: S, reference: R) -> Self {
        Self::NotFound { store: store.to_string(), reference: reference.to_string() }
    }

    pub fn store<S: ToString>(str: S) -> Self {
        Self::Store { reason: str.to_string() }
    }

    pub fn invalid_data<S: ToString>(str: S) -> Self {
        Self::InvalidData { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum DecompressError {
    #[error("malformed {algorithm} payload: {source}")]
    Malformed { algorithm: Compression, source: io::Error },

    #[error("{algorithm} payload expands past {limit} bytes")]
    TooLarge { algorithm: Compression, limit: u64 },
}

impl DecompressError {
    pub fn malformed<E: Into<io::Error>>(algorithm: Compression, e: E) -> Self {
        Self::Malformed { algorithm, source: e.into() }
    }

    pub fn too_large(algorithm: Compression, limit: u64) -> Self {
        Self::TooLarge { algorithm, limit }
    }
}

/// A response definition document that can't be read or written.
#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("malformed response definition: {source}")]
    Parse {
        #[from]
        source: serde_json::Error,
    },

    #[error("invalid base64 body: {source}")]
    InvalidBase64 {
        #[from]
        source: base64::DecodeError,
    },
}
