//! `mtl`: compile mapping specs and run templates.
//!
//! ```bash
//! # Print the template compiled from a mapping
//! mtl compile mapping.yaml --base http://ex.org/
//!
//! # Compile a mapping and evaluate it once per row of the configured query
//! mtl run --config run.yaml --mapping mapping.yaml
//!
//! # Evaluate a hand-written template once, with a JSON run report
//! mtl run --config run.yaml --template departments.hbs --single --report report.json
//! ```
//!
//! Logging is controlled with `RUST_LOG` (default: `warn,mtl=info`).

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use mtl_compiler::{compile, MappingSpec};
use mtl_exec::{build_context, exec_options, Executor, RowQuery, RunConfig};
use mtl_out::TemplateLibrary;

#[derive(Parser)]
#[command(name = "mtl", version, about = "Mapping template compiler and executor")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a mapping spec into a template
    Compile {
        /// Mapping spec (YAML)
        mapping: PathBuf,

        /// Base IRI used when the mapping's prologue declares none
        #[arg(long, env = "MTL_BASE_IRI")]
        base: Option<String>,

        /// Write the template here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Evaluate a compiled mapping or a template
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Run configuration (YAML)
    #[arg(short, long)]
    config: PathBuf,

    /// Mapping spec to compile and evaluate
    #[arg(long, conflicts_with = "template", required_unless_present = "template")]
    mapping: Option<PathBuf>,

    /// Template file or template library to evaluate
    #[arg(long)]
    template: Option<PathBuf>,

    /// Template to pick from a library
    #[arg(long, requires = "template")]
    name: Option<String>,

    /// Ignore the configured row query and evaluate once
    #[arg(long)]
    single: bool,

    /// Output path (overrides the configuration)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Evaluate rows in parallel
    #[arg(long)]
    parallel: bool,

    /// Write the JSON run report here
    #[arg(long)]
    report: Option<PathBuf>,

    /// Directory relative reader, override and output paths resolve against
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,mtl=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Compile { mapping, base, out } => compile_command(&mapping, base.as_deref(), out),
        Command::Run(args) => run_command(args),
    }
}

fn load_mapping(path: &Path) -> Result<MappingSpec> {
    MappingSpec::load(&path.to_string_lossy())
        .with_context(|| format!("failed to load mapping {}", path.display()))
}

fn compile_command(mapping: &Path, base: Option<&str>, out: Option<PathBuf>) -> Result<()> {
    let spec = load_mapping(mapping)?;
    let compiled = compile(&spec, base)
        .with_context(|| format!("failed to compile {}", mapping.display()))?;

    match out {
        Some(path) => {
            std::fs::write(&path, compiled.as_str())
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(
                path = %path.display(),
                statements = compiled.triple_count,
                "template written"
            );
        }
        None => print!("{}", compiled.as_str()),
    }
    Ok(())
}

fn run_command(args: RunArgs) -> Result<()> {
    let mut config = RunConfig::load(&args.config.to_string_lossy())
        .with_context(|| format!("failed to load config {}", args.config.display()))?
        .apply_env();
    if args.parallel {
        config.parallel = true;
    }

    let template = match (&args.mapping, &args.template) {
        (Some(mapping), _) => {
            let mut spec = load_mapping(mapping)?;
            for (prefix, namespace) in &config.prefixes {
                spec.prefixes
                    .entry(prefix.clone())
                    .or_insert_with(|| namespace.clone());
            }
            compile(&spec, config.base_iri.as_deref())
                .with_context(|| format!("failed to compile {}", mapping.display()))?
                .source
        }
        (None, Some(path)) => {
            let library = TemplateLibrary::load(&path.to_string_lossy())
                .with_context(|| format!("failed to load template {}", path.display()))?;
            let source = match &args.name {
                Some(name) => library.get(name),
                None => library.primary(),
            };
            source
                .map(str::to_string)
                .ok_or_else(|| anyhow!("no template to run in {}", path.display()))?
        }
        (None, None) => bail!("either --mapping or --template is required"),
    };

    let query: Option<RowQuery> = if args.single {
        None
    } else {
        config.parametric.clone()
    };
    let output = args
        .output
        .clone()
        .or_else(|| config.output.clone())
        .map(|p| if p.is_absolute() { p } else { args.root.join(p) });

    let context = build_context(&config, &args.root).context("failed to set up readers")?;
    let mut executor = Executor::new(context, exec_options(&config));

    let outcome = executor.run(&template, query.as_ref(), output.as_deref());

    for (name, reader) in executor.context().readers() {
        if let Err(e) = reader.shut_down() {
            tracing::warn!(reader = name, error = %e, "reader shut down failed");
        }
    }

    let run = outcome.context("execution failed")?;

    if output.is_none() {
        if let Some(single) = run.result.as_single() {
            print!("{}", single.content);
        } else if let Some(rows) = run.result.as_per_row() {
            for (_, artifact) in rows.iter() {
                print!("{}", artifact.content);
            }
        }
    }

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&run.report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }

    Ok(())
}
