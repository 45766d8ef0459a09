//! MTL-EXEC: Parametric Executor
//!
//! Runs a template once (single-shot) or once per row of a reader query
//! (parametric). In parametric mode every row gets a [`mtl_core::RowId`]
//! before evaluation starts, is bound under `row` with hashed column names,
//! and produces one artifact whose file name carries the row's id.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mtl_core::Dataframe;
//! use mtl_exec::{ExecOptions, Executor, RowQuery};
//! use mtl_out::{FunctionRegistry, TemplateContext};
//! use mtl_readers::MemoryReader;
//!
//! let frame = Dataframe::from_pairs(vec![
//!     vec![("name", Some("a"))],
//!     vec![("id", Some("42")), ("name", Some("b"))],
//! ]);
//! let context = TemplateContext::new(FunctionRegistry::standard())
//!     .with_reader("people", Arc::new(MemoryReader::new(frame)));
//!
//! let mut executor = Executor::new(context, ExecOptions::default());
//! let rows = executor
//!     .evaluate_parametric("{{literal row.name}}", Some(&RowQuery::new("people", "*")))
//!     .unwrap();
//!
//! let ids: Vec<String> = rows.ids().map(|id| id.to_string()).collect();
//! assert_eq!(ids, vec!["-T-id-0", "-42"]);
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod formatter;
pub mod naming;
pub mod overrides;

use std::path::Path;

pub use config::{RowQuery, RunConfig, BASE_IRI_ENV};
pub use error::ExecError;
pub use executor::{ExecOptions, ExecutionReport, Executor, ReportEntry, Run};
pub use formatter::NQuadsFormatter;
pub use naming::{check_unique, splice_row_id};
pub use overrides::OverrideMap;

use mtl_out::{FunctionRegistry, TemplateContext};
use mtl_readers::ReaderSet;

/// Build the evaluation context a [`RunConfig`] describes.
///
/// Relative reader and override paths are resolved against `root`.
pub fn build_context(config: &RunConfig, root: &Path) -> Result<TemplateContext, ExecError> {
    let functions = FunctionRegistry::from_libraries(&config.libraries)?;

    let readers = ReaderSet::from_configs(&config.readers, root)?;
    readers.set_verbose(config.verbose);

    let override_paths: Vec<_> = config
        .overrides
        .iter()
        .map(|p| if p.is_absolute() { p.clone() } else { root.join(p) })
        .collect();
    let overrides = OverrideMap::load_all(&override_paths)?;

    tracing::debug!(
        readers = config.readers.len(),
        overrides = overrides.len(),
        policy = ?config.policy,
        "built template context"
    );

    Ok(TemplateContext::new(functions)
        .with_readers(readers.into_map())
        .with_statics(overrides.into_entries())
        .with_policy(config.policy))
}

/// Executor options a [`RunConfig`] describes
pub fn exec_options(config: &RunConfig) -> ExecOptions {
    let options = ExecOptions::default().parallel(config.parallel);
    if config.format {
        options.with_formatter(std::sync::Arc::new(NQuadsFormatter::new()))
    } else {
        options
    }
}
