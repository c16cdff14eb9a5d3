//! Rendered output files and the output-set contract.
//!
//! The generator declares its output file set up front; after rendering, the
//! produced set must match the declared one exactly. On a mismatch nothing is
//! written, so a stale build-system file list fails loudly instead of leaving
//! half-updated sources behind.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use matter_bindgen_model::Idl;
use proc_macro2::TokenStream;
use quote::quote;
use thiserror::Error;
use tracing::info;

use crate::bindings::{any_module_tokens, cluster_module_tokens};
use crate::id;
use crate::{EmitContext, EmitError};

const HEADER: &str = "// Generated by matter-bindgen. Do not edit by hand.";

/// The produced file set differs from the declared one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("generated file set differs from the declared one (missing: {missing:?}, unexpected: {unexpected:?})")]
pub struct OutputMismatchError {
    pub missing: Vec<String>,
    pub unexpected: Vec<String>,
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error(transparent)]
    Mismatch(#[from] OutputMismatchError),

    #[error("failed to write {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The file names generation will produce for this document.
pub fn expected_files(idl: &Idl) -> Vec<String> {
    let mut files = vec!["mod.rs".to_string(), "any.rs".to_string()];
    files.extend(
        idl.clusters
            .iter()
            .map(|cluster| format!("{}.rs", id::cluster_module_name(&cluster.id))),
    );
    files
}

fn render_file(tokens: TokenStream) -> String {
    format!("{}\n\n{}\n", HEADER, tokens)
}

/// Render every generated source file, keyed by file name.
pub fn render_bindings(
    idl: &Idl,
    ctx: &EmitContext,
) -> Result<BTreeMap<String, String>, EmitError> {
    let krate = &ctx.runtime_crate;
    let mut files = BTreeMap::new();

    let modules: Vec<_> = idl
        .clusters
        .iter()
        .map(|cluster| {
            proc_macro2::Ident::new(
                &id::cluster_module_name(&cluster.id),
                proc_macro2::Span::call_site(),
            )
        })
        .collect();

    files.insert(
        "mod.rs".to_string(),
        render_file(quote! {
            pub mod any;
            #(pub mod #modules;)*

            pub fn register_clusters(registry: &mut #krate::Registry) {
                any::register(registry);
                #(#modules::register(registry);)*
            }
        }),
    );
    files.insert("any.rs".to_string(), render_file(any_module_tokens(ctx)));

    for cluster in &idl.clusters {
        files.insert(
            format!("{}.rs", id::cluster_module_name(&cluster.id)),
            render_file(cluster_module_tokens(cluster, ctx)?),
        );
    }

    Ok(files)
}

/// Check the produced file set against the declared one.
pub fn verify_output_set(
    declared: &[String],
    produced: &BTreeMap<String, String>,
) -> Result<(), OutputMismatchError> {
    let declared: BTreeSet<&str> = declared.iter().map(String::as_str).collect();
    let produced: BTreeSet<&str> = produced.keys().map(String::as_str).collect();

    let missing: Vec<String> = declared
        .difference(&produced)
        .map(|s| s.to_string())
        .collect();
    let unexpected: Vec<String> = produced
        .difference(&declared)
        .map(|s| s.to_string())
        .collect();

    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(OutputMismatchError {
            missing,
            unexpected,
        })
    }
}

/// Write the rendered files under `out_dir`. Nothing is written unless the
/// produced set matches the declared one.
pub fn write_output(
    out_dir: &Path,
    declared: &[String],
    files: &BTreeMap<String, String>,
) -> Result<(), OutputError> {
    verify_output_set(declared, files)?;

    fs::create_dir_all(out_dir).map_err(|source| OutputError::Io {
        path: out_dir.display().to_string(),
        source,
    })?;

    for (name, content) in files {
        let path = out_dir.join(name);
        fs::write(&path, content).map_err(|source| OutputError::Io {
            path: path.display().to_string(),
            source,
        })?;
    }

    info!(files = files.len(), dir = %out_dir.display(), "wrote generated sources");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_CLUSTERS: &str = "
      cluster OnOff = 6 {
        revision 6;
        command Toggle(): DefaultSuccess = 2;
        readonly attribute boolean onOff = 0;
      }

      cluster LevelControl = 8 {
        revision 5;
        attribute int8u currentLevel = 0;
      }
    ";

    #[test]
    fn produced_set_matches_the_declared_one() {
        let idl = Idl::parse(TWO_CLUSTERS).expect("valid idl");
        let files = render_bindings(&idl, &EmitContext::default()).expect("render");

        let declared = expected_files(&idl);
        assert_eq!(
            declared,
            vec!["mod.rs", "any.rs", "on_off.rs", "level_control.rs"]
        );
        assert_eq!(verify_output_set(&declared, &files), Ok(()));
    }

    #[test]
    fn rendering_is_deterministic() {
        let idl = Idl::parse(TWO_CLUSTERS).expect("valid idl");

        let first = render_bindings(&idl, &EmitContext::default()).expect("render");
        let second = render_bindings(&idl, &EmitContext::default()).expect("render");

        // byte identical, not merely equivalent
        assert_eq!(first, second);
    }

    #[test]
    fn mismatches_name_both_directions() {
        let idl = Idl::parse(TWO_CLUSTERS).expect("valid idl");
        let mut files = render_bindings(&idl, &EmitContext::default()).expect("render");
        files.remove("on_off.rs");
        files.insert("extra.rs".into(), String::new());

        let err = verify_output_set(&expected_files(&idl), &files).expect_err("mismatch");
        assert_eq!(err.missing, vec!["on_off.rs"]);
        assert_eq!(err.unexpected, vec!["extra.rs"]);
    }

    #[test]
    fn mod_file_registers_any_first() {
        let idl = Idl::parse(TWO_CLUSTERS).expect("valid idl");
        let files = render_bindings(&idl, &EmitContext::default()).expect("render");
        let root = &files["mod.rs"];

        let any = root.find("any :: register").expect("any registration");
        let on_off = root.find("on_off :: register").expect("cluster registration");
        let level = root
            .find("level_control :: register")
            .expect("cluster registration");
        assert!(any < on_off && on_off < level);
    }
}
