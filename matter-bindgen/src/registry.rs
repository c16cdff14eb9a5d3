//! The registry plan: which clusters register which bindings, in which order.
//!
//! The plan is the registration-order contract. The `Any` pseudo-cluster is
//! always first; document clusters follow in declaration order. Binding
//! identities must be globally unique, checked here before any code is
//! emitted.

use std::collections::HashMap;

use matter_bindgen_model::Idl;
use tracing::debug;

use crate::bindings::{any_bindings, cluster_bindings, Binding};
use crate::id;
use crate::EmitError;

/// The full registration plan of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryPlan {
    /// Cluster name to its ordered bindings, in registration order.
    pub clusters: Vec<(String, Vec<Binding>)>,
}

impl RegistryPlan {
    pub fn binding_count(&self) -> usize {
        self.clusters.iter().map(|(_, bindings)| bindings.len()).sum()
    }
}

/// Build and check the plan for a validated document.
pub fn build_plan(idl: &Idl) -> Result<RegistryPlan, EmitError> {
    let mut clusters = vec![(id::ANY_CLUSTER.to_string(), any_bindings())];
    clusters.extend(
        idl.clusters
            .iter()
            .map(|cluster| (cluster.id.clone(), cluster_bindings(cluster))),
    );

    let mut seen: HashMap<&str, &str> = HashMap::new();
    for (cluster, bindings) in &clusters {
        for binding in bindings {
            if let Some(first) = seen.insert(&binding.name, cluster) {
                return Err(EmitError::DuplicateBinding {
                    name: binding.name.clone(),
                    first: first.into(),
                    second: cluster.clone(),
                });
            }
        }
    }

    debug!(
        clusters = clusters.len(),
        bindings = clusters.iter().map(|(_, b)| b.len()).sum::<usize>(),
        "registry plan built"
    );

    Ok(RegistryPlan { clusters })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Idl {
        Idl::parse(input).expect("valid idl")
    }

    #[test]
    fn any_registers_first_then_document_order() {
        let idl = parse(
            "
              cluster OnOff = 6 {
                revision 6;
                command Toggle(): DefaultSuccess = 2;
              }

              cluster LevelControl = 8 {
                revision 5;
                attribute int8u currentLevel = 0;
              }
            ",
        );

        let plan = build_plan(&idl).expect("plan");
        let order: Vec<_> = plan.clusters.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(order, vec!["Any", "OnOff", "LevelControl"]);

        // 6 Any bindings, 4 placeholders + 1 command, 4 placeholders + 3 attribute ops
        assert_eq!(plan.binding_count(), 6 + 5 + 7);
    }

    #[test]
    fn plan_is_deterministic() {
        let idl = parse(
            "
              cluster OnOff = 6 {
                revision 6;
                attribute boolean onOff = 0;
              }
            ",
        );

        assert_eq!(build_plan(&idl).unwrap(), build_plan(&idl).unwrap());
    }

    #[test]
    fn cluster_shadowing_any_is_rejected() {
        // a document cluster named Any would collide with the generic bindings
        let idl = parse(
            "
              cluster Any = 1 {
                revision 1;
              }
            ",
        );

        let err = build_plan(&idl).expect_err("identity collision");
        assert!(matches!(
            err,
            EmitError::DuplicateBinding { ref name, .. } if name == "AnyCommandById"
        ));
    }
}
