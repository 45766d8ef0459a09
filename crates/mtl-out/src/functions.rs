//! Runtime function library.
//!
//! Functions are plain `Fn(&[Value]) -> Result<Value, String>` values grouped
//! into named libraries:
//! - rdf: the routines encoded terms call (`iri`, `literal`, `bnode`, ...)
//! - string: `concat`, `upper`, `lower`, `trim`, `replace`
//! - frame: `join`, `left_join`, `distinct`, `rename` over query results
//!
//! The set is fixed when the renderer is built; nothing is loaded later.

use mtl_core::Dataframe;
use mtl_encode::{
    blank_node_id, encode_iri, encode_uri_component, escape_literal, hash, language_suffix,
    resolve_iri, runtime, transform_datatype,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::RenderError;

/// One registered function
pub type Function = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// Every library name [`FunctionRegistry::from_libraries`] understands
pub const LIBRARIES: &[&str] = &["rdf", "string", "frame"];

/// Named functions visible to templates
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, Function>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.functions.keys()).finish()
    }
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every library
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for library in LIBRARIES {
            registry.add_library(library);
        }
        registry
    }

    /// Only the named libraries
    pub fn from_libraries<S: AsRef<str>>(names: &[S]) -> Result<Self, RenderError> {
        let mut registry = Self::new();
        for name in names {
            if !registry.add_library(name.as_ref()) {
                return Err(RenderError::UnknownLibrary(name.as_ref().to_string()));
            }
        }
        Ok(registry)
    }

    fn add_library(&mut self, name: &str) -> bool {
        match name {
            "rdf" => {
                self.register(runtime::CONCAT, concat);
                self.register(runtime::SYM, sym);
                self.register(runtime::ENCODE_URI, |args: &[Value]| {
                    Ok(Value::String(encode_uri_component(&arg_text(args, 0))))
                });
                self.register(runtime::IRI, iri);
                self.register(runtime::IRI_ENCODED, |args: &[Value]| {
                    Ok(Value::String(format!("<{}>", encode_iri(&arg_text(args, 0)))))
                });
                self.register(runtime::LITERAL, |args: &[Value]| {
                    Ok(Value::String(format!("\"{}\"", escape_literal(&arg_text(args, 0)))))
                });
                self.register(runtime::TYPED_LITERAL, typed_literal);
                self.register(runtime::LANG_LITERAL, lang_literal);
                self.register(runtime::BNODE, |args: &[Value]| {
                    Ok(Value::String(format!("_:{}", blank_node_id(&arg_text(args, 0)))))
                });
                self.register(runtime::BOUND, |args: &[Value]| {
                    Ok(Value::Bool(args.iter().all(|a| !a.is_null())))
                });
                self.register(runtime::HASH, |args: &[Value]| {
                    Ok(Value::String(hash(&arg_text(args, 0))))
                });
            }
            "string" => {
                self.register(runtime::CONCAT, concat);
                self.register("upper", |args: &[Value]| {
                    Ok(Value::String(arg_text(args, 0).to_uppercase()))
                });
                self.register("lower", |args: &[Value]| {
                    Ok(Value::String(arg_text(args, 0).to_lowercase()))
                });
                self.register("trim", |args: &[Value]| {
                    Ok(Value::String(arg_text(args, 0).trim().to_string()))
                });
                self.register("replace", |args: &[Value]| {
                    Ok(Value::String(
                        arg_text(args, 0).replace(&arg_text(args, 1), &arg_text(args, 2)),
                    ))
                });
            }
            "frame" => {
                self.register("join", |args: &[Value]| {
                    let (left, right, lk, rk) = join_args(args)?;
                    frame_value(mtl_frame::inner_join(&left, &right, &lk, &rk))
                });
                self.register("left_join", |args: &[Value]| {
                    let (left, right, lk, rk) = join_args(args)?;
                    frame_value(mtl_frame::left_join(&left, &right, &lk, &rk))
                });
                self.register("distinct", |args: &[Value]| {
                    let frame = arg_frame(args, 0)?;
                    frame_value(Ok(mtl_frame::remove_duplicate_rows(&frame)))
                });
                self.register("rename", |args: &[Value]| {
                    let frame = arg_frame(args, 0)?;
                    frame_value(mtl_frame::rename_column(
                        &frame,
                        &arg_text(args, 1),
                        &arg_text(args, 2),
                    ))
                });
            }
            _ => return false,
        }
        true
    }

    /// Add or replace a function
    pub fn register<F>(&mut self, name: &str, function: F)
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.functions.insert(name.to_string(), Arc::new(function));
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Function)> {
        self.functions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Call `name` directly, outside any template
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, String> {
        let function = self
            .get(name)
            .ok_or_else(|| format!("unknown function '{}'", name))?;
        function(args)
    }
}

/// String form of a value: null is empty, strings are bare, anything else is
/// its JSON text.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn arg_text(args: &[Value], index: usize) -> String {
    args.get(index).map(value_text).unwrap_or_default()
}

fn concat(args: &[Value]) -> Result<Value, String> {
    Ok(Value::String(args.iter().map(value_text).collect()))
}

fn sym(args: &[Value]) -> Result<Value, String> {
    let name = arg_text(args, 0);
    runtime::sentinel(&name)
        .map(|c| Value::String(c.to_string()))
        .ok_or_else(|| format!("unknown sentinel '{}'", name))
}

fn iri(args: &[Value]) -> Result<Value, String> {
    if args.first().map_or(true, Value::is_null) {
        return Ok(Value::Null);
    }
    let base = args.get(1).filter(|b| !b.is_null()).map(value_text);
    resolve_iri(&arg_text(args, 0), base.as_deref())
        .map(|iri| Value::String(format!("<{}>", iri)))
        .map_err(|e| e.to_string())
}

fn typed_literal(args: &[Value]) -> Result<Value, String> {
    let datatype = arg_text(args, 1);
    let value = transform_datatype(&arg_text(args, 0), &datatype);
    Ok(Value::String(format!(
        "\"{}\"^^<{}>",
        escape_literal(&value),
        datatype
    )))
}

fn lang_literal(args: &[Value]) -> Result<Value, String> {
    let value = escape_literal(&arg_text(args, 0));
    Ok(Value::String(match language_suffix(&arg_text(args, 1)) {
        Some(suffix) => format!("\"{}\"{}", value, suffix),
        None => format!("\"{}\"", value),
    }))
}

fn arg_frame(args: &[Value], index: usize) -> Result<Dataframe, String> {
    match args.get(index) {
        Some(Value::Null) | None => Ok(Dataframe::empty()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| format!("argument {} is not a row list: {}", index, e)),
    }
}

fn join_args(args: &[Value]) -> Result<(Dataframe, Dataframe, String, String), String> {
    let left_key = arg_text(args, 2);
    let right_key = match args.get(3) {
        Some(v) if !v.is_null() => value_text(v),
        _ => left_key.clone(),
    };
    Ok((arg_frame(args, 0)?, arg_frame(args, 1)?, left_key, right_key))
}

fn frame_value(result: Result<Dataframe, mtl_frame::FrameError>) -> Result<Value, String> {
    let frame = result.map_err(|e| e.to_string())?;
    serde_json::to_value(frame).map_err(|e| e.to_string())
}
