//! Client-binding generator for Matter device-description IDL files.
//!
//! The pipeline is: parse and validate a document (`matter-bindgen-model`),
//! resolve every referenced type ([`resolve`]), plan the registry
//! ([`registry`]), emit one module per cluster ([`bindings`]) and write the
//! declared file set ([`output`]). Generated code targets the runtime support
//! crate named by [`EmitContext`].

pub mod bindings;
pub mod id;
pub mod output;
pub mod registry;
pub mod resolve;

use std::collections::BTreeMap;

use matter_bindgen_model::Idl;
use proc_macro2::{Ident, Span};
use thiserror::Error;

use crate::resolve::ReferenceError;

/// Emission-wide settings.
#[derive(Debug, Clone)]
pub struct EmitContext {
    /// Crate path generated code uses to reach the runtime support types.
    pub runtime_crate: Ident,
}

impl EmitContext {
    /// `runtime_crate` must be a valid crate identifier, so underscores
    /// rather than hyphens.
    pub fn new(runtime_crate: &str) -> Self {
        Self {
            runtime_crate: Ident::new(runtime_crate, Span::call_site()),
        }
    }
}

impl Default for EmitContext {
    fn default() -> Self {
        Self::new("matter_bindgen_runtime")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error("binding identity {name} is generated by both {first} and {second}")]
    DuplicateBinding {
        name: String,
        first: String,
        second: String,
    },
}

/// Generate all binding sources for a validated document, keyed by file name.
pub fn generate(idl: &Idl, ctx: &EmitContext) -> Result<BTreeMap<String, String>, EmitError> {
    // the plan check runs first so nothing is emitted for a colliding document
    registry::build_plan(idl)?;
    output::render_bindings(idl, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_the_expected_set() {
        let idl = Idl::parse(
            "
              cluster OnOff = 6 {
                revision 6;
                command Toggle(): DefaultSuccess = 2;
              }
            ",
        )
        .expect("valid idl");

        let files = generate(&idl, &EmitContext::default()).expect("generate");
        assert_eq!(
            output::verify_output_set(&output::expected_files(&idl), &files),
            Ok(())
        );
    }

    #[test]
    fn runtime_crate_path_is_configurable() {
        let idl = Idl::parse(
            "
              cluster OnOff = 6 {
                revision 6;
                command Toggle(): DefaultSuccess = 2;
              }
            ",
        )
        .expect("valid idl");

        let files = generate(&idl, &EmitContext::new("my_runtime")).expect("generate");
        assert!(files["on_off.rs"].contains("my_runtime :: Transport"));
        assert!(!files["on_off.rs"].contains("matter_bindgen_runtime"));
    }
}
