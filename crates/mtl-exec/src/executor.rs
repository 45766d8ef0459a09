//! Single-shot and parametric execution.
//!
//! Parametric runs follow QUERY → (BIND → EVALUATE → NAME → EMIT) per row:
//! the reader's rows are fetched once, every row is given its [`RowId`] up
//! front, and each evaluation sees a fresh snapshot of the static bindings
//! with only the current row overlaid. A failing row stops the run; artifacts
//! already emitted stay where they are.

use chrono::{DateTime, Utc};
use mtl_core::{
    Artifact, Bindings, ExecutionResult, Formatter, Row, RowArtifacts, RowId, CURRENT_ROW,
};
use mtl_frame::FrameError;
use mtl_out::{TemplateContext, TemplateRenderer};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::config::RowQuery;
use crate::error::ExecError;
use crate::naming::{check_unique, splice_row_id};

/// Name the template under evaluation is registered as
const MAIN_TEMPLATE: &str = "mtl_main";

#[derive(Clone, Default)]
pub struct ExecOptions {
    /// Evaluate rows on the rayon pool
    pub parallel: bool,
    /// Applied to every artifact before it is emitted
    pub formatter: Option<Arc<dyn Formatter>>,
}

impl ExecOptions {
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }
}

/// Summary of one run
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    pub run_id: String,
    pub mode: &'static str,
    pub rows: usize,
    pub artifacts: Vec<ReportEntry>,
    pub elapsed_ms: u64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_id: Option<String>,
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl ExecutionReport {
    fn new(run_id: &str, result: &ExecutionResult, started: Instant) -> Self {
        let (mode, artifacts): (_, Vec<ReportEntry>) = match result {
            ExecutionResult::Single(artifact) => ("single", vec![entry(None, artifact)]),
            ExecutionResult::PerRow(rows) => (
                "parametric",
                rows.iter().map(|(id, a)| entry(Some(id), a)).collect(),
            ),
        };
        Self {
            run_id: run_id.to_string(),
            mode,
            rows: artifacts.len(),
            artifacts,
            elapsed_ms: started.elapsed().as_millis() as u64,
            generated_at: Utc::now(),
        }
    }
}

fn entry(id: Option<&RowId>, artifact: &Artifact) -> ReportEntry {
    ReportEntry {
        row_id: id.map(|id| id.suffix().trim_start_matches('-').to_string()),
        hash: artifact.hash.clone(),
        path: artifact.path.clone(),
    }
}

/// Result plus report of [`Executor::run`]
#[derive(Debug, Clone)]
pub struct Run {
    pub result: ExecutionResult,
    pub report: ExecutionReport,
}

pub struct Executor {
    context: TemplateContext,
    renderer: TemplateRenderer<'static>,
    bindings: Bindings,
    options: ExecOptions,
}

impl Executor {
    pub fn new(context: TemplateContext, options: ExecOptions) -> Self {
        let renderer = context.renderer();
        let bindings = context.bindings();
        Self {
            context,
            renderer,
            bindings,
            options,
        }
    }

    pub fn context(&self) -> &TemplateContext {
        &self.context
    }

    fn prepare(&mut self, template: &str) -> Result<(), ExecError> {
        self.renderer.register_template(MAIN_TEMPLATE, template)?;
        Ok(())
    }

    fn finish(&self, text: String) -> Result<String, ExecError> {
        match &self.options.formatter {
            Some(formatter) => Ok(formatter.format_string(&text)?),
            None => Ok(text),
        }
    }

    /// Evaluate `template` once, without a current row
    pub fn evaluate(&mut self, template: &str) -> Result<Artifact, ExecError> {
        self.prepare(template)?;
        let text = self.renderer.render(MAIN_TEMPLATE, &self.bindings.snapshot())?;
        Ok(Artifact::new(self.finish(text)?))
    }

    /// Evaluate `template` once per row of `query`, in memory
    pub fn evaluate_parametric(
        &mut self,
        template: &str,
        query: Option<&RowQuery>,
    ) -> Result<RowArtifacts, ExecError> {
        self.parametric(template, query, None)
    }

    /// Evaluate `template` once per row of `query`, writing each artifact to
    /// `output` with the row id spliced into the file name
    pub fn evaluate_parametric_to_files(
        &mut self,
        template: &str,
        query: Option<&RowQuery>,
        output: &Path,
    ) -> Result<RowArtifacts, ExecError> {
        self.parametric(template, query, Some(output))
    }

    /// Pick the mode from `query`, run it under a fresh run id and report.
    ///
    /// In single-shot mode the artifact is written to `output` as is.
    pub fn run(
        &mut self,
        template: &str,
        query: Option<&RowQuery>,
        output: Option<&Path>,
    ) -> Result<Run, ExecError> {
        let run_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("run", run_id = %run_id);
        let _guard = span.enter();
        let started = Instant::now();

        let result = match query {
            Some(_) => ExecutionResult::PerRow(self.parametric(template, query, output)?),
            None => {
                let mut artifact = self.evaluate(template)?;
                if let Some(path) = output {
                    write_artifact(path, &artifact.content)?;
                    artifact = artifact.written_to(path.to_path_buf());
                }
                ExecutionResult::Single(artifact)
            }
        };

        let report = ExecutionReport::new(&run_id, &result, started);
        tracing::info!(
            mode = report.mode,
            artifacts = report.rows,
            elapsed_ms = report.elapsed_ms,
            "run finished"
        );
        Ok(Run { result, report })
    }

    fn parametric(
        &mut self,
        template: &str,
        query: Option<&RowQuery>,
        output: Option<&Path>,
    ) -> Result<RowArtifacts, ExecError> {
        let query = query.ok_or_else(|| {
            ExecError::InvalidArgument("parametric execution needs a query".to_string())
        })?;
        self.prepare(template)?;

        // QUERY
        let frame = self.context.reader(&query.reader)?.dataframe(&query.query)?;
        let ids = RowId::assign(frame.rows());
        check_unique(&ids)?;
        let (hashed, ambiguous) = mtl_frame::hash_columns_unambiguous(&frame);
        if let Some((_, columns)) = ambiguous
            .iter()
            .find(|(name, _)| binds_column(template, name))
        {
            return Err(FrameError::DuplicateColumn {
                columns: columns.clone(),
            }
            .into());
        }

        tracing::info!(
            reader = %query.reader,
            query = %query.query,
            rows = frame.len(),
            parallel = self.options.parallel,
            "parametric run"
        );

        let artifacts: Vec<(RowId, Artifact)> = if self.options.parallel {
            ids.into_par_iter()
                .zip(hashed.rows().par_iter())
                .map(|(id, row)| self.emit_row(id, row, output))
                .collect::<Result<_, _>>()?
        } else {
            let mut artifacts = Vec::with_capacity(ids.len());
            for (id, row) in ids.into_iter().zip(hashed.rows()) {
                artifacts.push(self.emit_row(id, row, output)?);
            }
            artifacts
        };

        Ok(artifacts.into_iter().collect())
    }

    /// BIND, EVALUATE, NAME and EMIT for one row
    fn emit_row(
        &self,
        id: RowId,
        row: &Row,
        output: Option<&Path>,
    ) -> Result<(RowId, Artifact), ExecError> {
        let snapshot = self.bindings.snapshot_with_row(row);
        let text = self
            .renderer
            .render(MAIN_TEMPLATE, &snapshot)
            .map_err(|source| ExecError::Row {
                row_id: id.suffix(),
                source,
            })?;
        let artifact = Artifact::new(self.finish(text)?);

        let artifact = match output {
            Some(output) => {
                let path = splice_row_id(output, &id);
                write_artifact(&path, &artifact.content)?;
                artifact.written_to(path)
            }
            None => artifact,
        };

        tracing::debug!(row = %id, hash = %artifact.hash, "row emitted");
        Ok((id, artifact))
    }
}

/// Whether `template` reads the hashed column `name` from the current row
fn binds_column(template: &str, name: &str) -> bool {
    if template.contains(&format!("{}.[{}]", CURRENT_ROW, name)) {
        return true;
    }
    let path = format!("{}.{}", CURRENT_ROW, name);
    template.match_indices(&path).any(|(at, _)| {
        template[at + path.len()..]
            .chars()
            .next()
            .map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '_'))
    })
}

fn write_artifact(path: &Path, content: &str) -> Result<(), ExecError> {
    let write_error = |source| ExecError::Write {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, content).map_err(write_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtl_core::{Dataframe, UnresolvedPolicy};
    use mtl_out::FunctionRegistry;
    use mtl_readers::MemoryReader;

    fn context(frame: Dataframe) -> TemplateContext {
        TemplateContext::new(FunctionRegistry::standard())
            .with_reader("rows", Arc::new(MemoryReader::new(frame)))
    }

    #[test]
    fn test_missing_query_is_invalid_argument() {
        let mut executor = Executor::new(context(Dataframe::empty()), ExecOptions::default());
        assert!(matches!(
            executor.evaluate_parametric("x", None),
            Err(ExecError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rows_bound_one_at_a_time() {
        let frame = Dataframe::from_pairs(vec![
            vec![("name", Some("a")), ("extra", Some("only-first"))],
            vec![("name", Some("b"))],
        ]);
        let context = context(frame).with_policy(UnresolvedPolicy::Lenient);
        let mut executor = Executor::new(context, ExecOptions::default());
        let template = "{{row.name}}{{#if row.extra}}+{{row.extra}}{{/if}}";
        let out = executor
            .evaluate_parametric(template, Some(&RowQuery::new("rows", "*")))
            .unwrap();

        let contents: Vec<&str> = out.iter().map(|(_, a)| a.content.as_str()).collect();
        assert_eq!(contents, vec!["a+only-first", "b"]);
    }

    #[test]
    fn test_hashed_column_names() {
        let frame = Dataframe::from_pairs(vec![vec![("dept-1", Some("eng"))]]);
        let mut executor = Executor::new(context(frame), ExecOptions::default());
        let out = executor
            .evaluate_parametric("{{row.deptzb}}", Some(&RowQuery::new("rows", "")))
            .unwrap();
        assert_eq!(out.iter().next().map(|(_, a)| a.content.as_str()), Some("eng"));
    }

    #[test]
    fn test_colliding_columns_fail_only_when_bound() {
        let frame = Dataframe::from_pairs(vec![vec![
            ("a1", Some("x")),
            ("ab", Some("y")),
            ("name", Some("n")),
        ]]);
        let query = RowQuery::new("rows", "*");

        let mut executor = Executor::new(context(frame.clone()), ExecOptions::default());
        let out = executor.evaluate_parametric("{{row.name}}", Some(&query)).unwrap();
        assert_eq!(out.iter().next().map(|(_, a)| a.content.as_str()), Some("n"));

        let mut executor = Executor::new(context(frame), ExecOptions::default());
        assert!(matches!(
            executor.evaluate_parametric("{{row.ab}}", Some(&query)),
            Err(ExecError::Frame(FrameError::DuplicateColumn { .. }))
        ));
    }

    #[test]
    fn test_binds_column_respects_name_boundaries() {
        assert!(binds_column("{{literal row.ab}}", "ab"));
        assert!(binds_column("{{row.[ab]}}", "ab"));
        assert!(!binds_column("{{literal row.abc}}", "ab"));
        assert!(!binds_column("{{map.ab}}", "ab"));
    }

    #[test]
    fn test_row_failure_names_row() {
        let frame = Dataframe::from_pairs(vec![
            vec![("id", Some("1")), ("v", Some("x"))],
            vec![("id", Some("2"))],
        ]);
        let mut executor = Executor::new(context(frame), ExecOptions::default());
        match executor.evaluate_parametric("{{literal row.v}}", Some(&RowQuery::new("rows", "*"))) {
            Err(ExecError::Row { row_id, .. }) => assert_eq!(row_id, "-2"),
            other => panic!("expected row error, got {:?}", other.map(|a| a.len())),
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let frame = Dataframe::from_pairs(vec![vec![("id", Some("1"))], vec![("id", Some("1"))]]);
        let mut executor = Executor::new(context(frame), ExecOptions::default());
        assert!(matches!(
            executor.evaluate_parametric("x", Some(&RowQuery::new("rows", "*"))),
            Err(ExecError::DuplicateRowId(_))
        ));
    }

    #[test]
    fn test_unknown_reader() {
        let mut executor = Executor::new(context(Dataframe::empty()), ExecOptions::default());
        assert!(matches!(
            executor.evaluate_parametric("x", Some(&RowQuery::new("nope", "*"))),
            Err(ExecError::Source(_))
        ));
    }

    #[test]
    fn test_single_shot_report() {
        let mut executor = Executor::new(context(Dataframe::empty()), ExecOptions::default());
        let run = executor.run("<a> <b> <c> .\n", None, None).unwrap();
        assert_eq!(run.report.mode, "single");
        assert_eq!(run.report.rows, 1);
        assert!(run.report.artifacts[0].hash.starts_with("blake3:"));
        assert!(Uuid::parse_str(&run.report.run_id).is_ok());
    }
}
