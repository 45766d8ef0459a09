//! MTL-OUT: template merge over Handlebars
//!
//! This crate is the merge collaborator: it evaluates template source, either
//! compiled from a mapping or written by hand, against a binding snapshot and
//! returns the rendered text.
//!
//! # Example
//!
//! ```
//! use mtl_out::{merge, FunctionRegistry, TemplateContext};
//!
//! let context = TemplateContext::new(FunctionRegistry::standard());
//! let out = merge(r#"{{iri "http://ex.org/a"}} {{literal (upper "x")}}"#, &context).unwrap();
//! assert_eq!(out, r#"<http://ex.org/a> "X""#);
//! ```

pub mod context;
pub mod functions;
pub mod renderer;
pub mod templates;

pub use context::TemplateContext;
pub use functions::{value_text, Function, FunctionRegistry, LIBRARIES};
pub use renderer::{ReaderMap, TemplateRenderer};
pub use templates::{TemplateLibrary, DEFAULT_TEMPLATE};

use mtl_core::UnresolvedPolicy;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during rendering
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template load failed: {0}")]
    Template(String),
    #[error("Render failed: {0}")]
    Render(String),
    #[error("Unknown function library: {0}")]
    UnknownLibrary(String),
}

/// Evaluate `template` once against the context's static bindings
pub fn merge(template: &str, context: &TemplateContext) -> Result<String, RenderError> {
    context
        .renderer()
        .render_string(template, &context.bindings().snapshot())
}

/// Render with an inline template string, the standard library and no readers
pub fn render_string(template: &str, data: &Value) -> Result<String, RenderError> {
    TemplateRenderer::new(
        &FunctionRegistry::standard(),
        ReaderMap::new(),
        UnresolvedPolicy::Fail,
    )
    .render_string(template, data)
}
