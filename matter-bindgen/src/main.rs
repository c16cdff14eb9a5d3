//! The `matter-bindgen` command line generator.

use std::path::PathBuf;

use clap::Parser;
use matter_bindgen::{generate, output, EmitContext};
use matter_bindgen_model::{validate::validate, Idl};
use miette::{IntoDiagnostic, WrapErr};
use tracing::info;

#[derive(Debug, Parser)]
#[command(version, about = "Generate client command/attribute bindings from a Matter IDL file")]
struct Args {
    /// Input device-description file (.matter)
    #[arg(long)]
    idl: PathBuf,

    /// Directory receiving the generated sources
    #[arg(long, default_value = "generated")]
    out: PathBuf,

    /// Declared output file names. Generation fails without writing anything
    /// if the produced set differs; defaults to the set derived from the
    /// input document.
    #[arg(long = "expect")]
    expect: Vec<String>,

    /// Crate path generated code uses for runtime support types
    #[arg(long, default_value = "matter_bindgen_runtime")]
    runtime_crate: String,
}

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let input = std::fs::read_to_string(&args.idl)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading {}", args.idl.display()))?;

    let idl = Idl::parse(&input)?;
    validate(&idl).into_diagnostic()?;

    let files = generate(&idl, &EmitContext::new(&args.runtime_crate)).into_diagnostic()?;

    let declared = if args.expect.is_empty() {
        output::expected_files(&idl)
    } else {
        args.expect.clone()
    };
    output::write_output(&args.out, &declared, &files).into_diagnostic()?;

    info!(
        clusters = idl.clusters.len(),
        files = files.len(),
        out = %args.out.display(),
        "generation complete"
    );
    Ok(())
}
