use crate::error::ResolveError;
use serde_json::Value;

/// The request/response model templatable strings are rendered against.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderContext {
    model: Value,
}

impl RenderContext {
    pub fn new(model: Value) -> Self {
        Self { model }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn model(&self) -> &Value {
        &self.model
    }
}

/// Renders a templatable string at serve time.
///
/// Only strings containing a `{{` placeholder are handed to the resolver. An error leaves the
/// literal string in place.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateResolver: Send + Sync {
    fn resolve(&self, text: &str, context: &RenderContext) -> Result<String, ResolveError>;
}

/// Leaves every string untouched, for setups without a template engine.
#[derive(Debug, Copy, Clone, Default)]
pub struct PassThrough;

impl TemplateResolver for PassThrough {
    fn resolve(&self, text: &str, _context: &RenderContext) -> Result<String, ResolveError> {
        Ok(text.to_owned())
    }
}

/// True when the string holds a template placeholder.
pub(crate) fn is_templated(text: &str) -> bool {
    text.contains("{{")
}
