//! Template rendering for MTL.
//!
//! Uses Handlebars as the merge engine. Every function in the
//! [`FunctionRegistry`] becomes a helper usable both as `{{name args}}` and as
//! a subexpression `(name args)`. Readers are reachable through two more
//! helpers:
//! - query: `(query "reader" "q")` runs a query and yields its rows
//! - dump: `(dump "reader")` yields every row of a reader

use handlebars::{
    Context, Handlebars, Helper, HelperDef, RenderContext, RenderErrorReason, ScopedJson,
};
use mtl_core::{Dataframe, Reader, UnresolvedPolicy};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::functions::{value_text, Function, FunctionRegistry};
use crate::RenderError;

/// Readers by name
pub type ReaderMap = BTreeMap<String, Arc<dyn Reader>>;

/// Handlebars registry with the runtime library registered
pub struct TemplateRenderer<'a> {
    handlebars: Handlebars<'a>,
    policy: UnresolvedPolicy,
}

impl<'a> TemplateRenderer<'a> {
    pub fn new(functions: &FunctionRegistry, readers: ReaderMap, policy: UnresolvedPolicy) -> Self {
        let mut handlebars = Handlebars::new();

        // Output is RDF text, never HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(policy == UnresolvedPolicy::Fail);

        for (name, function) in functions.iter() {
            handlebars.register_helper(
                name,
                Box::new(FunctionHelper {
                    name: name.to_string(),
                    function: function.clone(),
                    policy,
                }),
            );
        }

        let readers = Arc::new(readers);
        handlebars.register_helper(
            "query",
            Box::new(ReaderHelper {
                readers: readers.clone(),
                full: false,
            }),
        );
        let reader_count = readers.len();
        handlebars.register_helper("dump", Box::new(ReaderHelper { readers, full: true }));

        tracing::debug!(
            functions = functions.len(),
            readers = reader_count,
            policy = ?policy,
            "template renderer ready"
        );
        TemplateRenderer { handlebars, policy }
    }

    pub fn policy(&self) -> UnresolvedPolicy {
        self.policy
    }

    /// Parse and register a template under `name`
    pub fn register_template(&mut self, name: &str, source: &str) -> Result<(), RenderError> {
        tracing::debug!(template = name, bytes = source.len(), "registering template");
        self.handlebars
            .register_template_string(name, source)
            .map_err(|e| RenderError::Template(format!("{}: {}", name, e)))
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }

    /// Render a registered template with data
    pub fn render(&self, template_name: &str, data: &Value) -> Result<String, RenderError> {
        self.handlebars
            .render(template_name, data)
            .map_err(|e| RenderError::Render(e.to_string()))
    }

    /// Render a template string directly (parsed on every call)
    pub fn render_string(&self, template: &str, data: &Value) -> Result<String, RenderError> {
        self.handlebars
            .render_template(template, data)
            .map_err(|e| RenderError::Render(e.to_string()))
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Adapts one registry function to a Handlebars helper.
///
/// Absent parameters are an error under [`UnresolvedPolicy::Fail`] and read as
/// null under [`UnresolvedPolicy::Lenient`].
struct FunctionHelper {
    name: String,
    function: Function,
    policy: UnresolvedPolicy,
}

impl HelperDef for FunctionHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, handlebars::RenderError> {
        let mut args = Vec::with_capacity(h.params().len());
        for param in h.params() {
            if param.is_value_missing() {
                if self.policy == UnresolvedPolicy::Fail {
                    let path = param.relative_path().map(String::as_str).unwrap_or("?");
                    return Err(RenderErrorReason::Other(format!(
                        "unresolved reference '{}' in {}",
                        path, self.name
                    ))
                    .into());
                }
                args.push(Value::Null);
            } else {
                args.push(param.value().clone());
            }
        }

        let value = (self.function)(&args)
            .map_err(|e| RenderErrorReason::Other(format!("{}: {}", self.name, e)))?;
        Ok(ScopedJson::Derived(value))
    }
}

/// `query` and `dump`: rows of a named reader as a JSON array
struct ReaderHelper {
    readers: Arc<ReaderMap>,
    full: bool,
}

impl HelperDef for ReaderHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, handlebars::RenderError> {
        let name = h
            .param(0)
            .map(|p| value_text(p.value()))
            .ok_or(RenderErrorReason::ParamNotFoundForIndex("query", 0))?;
        let reader = self
            .readers
            .get(&name)
            .ok_or_else(|| RenderErrorReason::Other(format!("unknown reader '{}'", name)))?;

        let result = if self.full {
            reader.full_dataframe()
        } else {
            let query = h.param(1).map(|p| value_text(p.value())).unwrap_or_default();
            reader.dataframe(&query)
        };
        let frame: Dataframe = result.map_err(|e| RenderErrorReason::Other(e.to_string()))?;

        let rows = serde_json::to_value(frame)
            .map_err(|e| RenderErrorReason::Other(e.to_string()))?;
        Ok(ScopedJson::Derived(rows))
    }
}
