//! MTL Core: data model, binding snapshots and source contracts.
//!
//! Everything the compiler, the template layer and the executor share lives
//! here: rows and dataframes, row identities, artifacts, the unresolved
//! reference policy, and the `Reader` / `Formatter` contracts every concrete
//! source or output formatter implements.

pub mod context;
pub mod data_model;
pub mod error;
pub mod source;

pub use context::{Bindings, UnresolvedPolicy, CURRENT_ROW, READERS, STATIC_MAP};
pub use data_model::{Artifact, Dataframe, ExecutionResult, Row, RowArtifacts, RowId, ID_FIELD};
pub use error::SourceError;
pub use source::{Formatter, Reader};

/// MTL engine version
pub const MTL_VERSION: &str = "1.0.0";
