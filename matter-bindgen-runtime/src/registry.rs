//! The process-wide binding registry.
//!
//! One `Registry` value is constructed at startup and passed by reference to
//! each generated `register_cluster_*` function; there is no hidden static.
//! Entry order is first-registration order, so re-registering a cluster
//! replaces its bindings in place and two identical registration runs yield
//! identical registry content.

use tracing::debug;

/// Cluster-id sentinel used by wildcard bindings registered "by id".
pub const INVALID_CLUSTER_ID: u32 = 0xFFFF_FFFF;

/// Which operation a binding implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Invoke,
    ReadAttribute,
    WriteAttribute,
    SubscribeAttribute,
    ReadEvent,
    SubscribeEvent,
}

/// What a binding operates against.
///
/// The two wildcard forms are deliberately distinct: `Wildcard` bindings take
/// the cluster id as a per-call argument, while `WildcardSentinel` bindings
/// are registered against [`INVALID_CLUSTER_ID`] plus an is-event flag and
/// resolve the id at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingTarget {
    /// A concrete cluster, known at generation time.
    Cluster(u32),
    Wildcard,
    WildcardSentinel { is_event: bool },
}

impl BindingTarget {
    /// The cluster id this binding is registered against. Sentinel wildcards
    /// register against [`INVALID_CLUSTER_ID`]; plain wildcards carry no id
    /// at registration time.
    pub fn registered_cluster_id(&self) -> Option<u32> {
        match self {
            BindingTarget::Cluster(id) => Some(*id),
            BindingTarget::Wildcard => None,
            BindingTarget::WildcardSentinel { .. } => Some(INVALID_CLUSTER_ID),
        }
    }
}

/// One registered binding: a named unit implementing one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingEntry {
    /// The deterministic identity string, e.g. `ReadOnOffOnOff`.
    pub name: String,
    pub kind: OperationKind,
    pub target: BindingTarget,
    /// Command/attribute code for concrete bindings; `None` for generic ones.
    pub member_code: Option<u64>,
}

impl BindingEntry {
    pub fn new(
        name: impl Into<String>,
        kind: OperationKind,
        target: BindingTarget,
        member_code: Option<u64>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            target,
            member_code,
        }
    }

    pub fn generic(name: impl Into<String>, kind: OperationKind, target: BindingTarget) -> Self {
        Self::new(name, kind, target, None)
    }
}

/// Mapping from cluster name to its ordered binding list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: Vec<(String, Vec<BindingEntry>)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the entry for `cluster`, or replace it in place if the cluster
    /// was registered before.
    pub fn register(&mut self, cluster: &str, bindings: Vec<BindingEntry>) {
        debug!(cluster, count = bindings.len(), "registering cluster");

        if let Some(entry) = self.entries.iter_mut().find(|(name, _)| name == cluster) {
            entry.1 = bindings;
        } else {
            self.entries.push((cluster.into(), bindings));
        }
    }

    /// Cluster names in registration order.
    pub fn clusters(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn cluster(&self, name: &str) -> Option<&[BindingEntry]> {
        self.entries
            .iter()
            .find(|(cluster, _)| cluster == name)
            .map(|(_, bindings)| bindings.as_slice())
    }

    /// Look a binding up by its identity string.
    pub fn find(&self, binding_name: &str) -> Option<&BindingEntry> {
        self.entries
            .iter()
            .flat_map(|(_, bindings)| bindings.iter())
            .find(|binding| binding.name == binding_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> BindingEntry {
        BindingEntry::new(
            name,
            OperationKind::Invoke,
            BindingTarget::Cluster(6),
            Some(0),
        )
    }

    #[test]
    fn preserves_registration_order() {
        let mut registry = Registry::new();
        registry.register("Any", vec![]);
        registry.register("OnOff", vec![entry("OnOffOn")]);
        registry.register("LevelControl", vec![]);

        assert_eq!(
            registry.clusters().collect::<Vec<_>>(),
            vec!["Any", "OnOff", "LevelControl"]
        );
    }

    #[test]
    fn register_twice_replaces_in_place() {
        let mut registry = Registry::new();
        registry.register("OnOff", vec![entry("OnOffOn")]);
        registry.register("LevelControl", vec![]);

        let mut again = registry.clone();
        again.register("OnOff", vec![entry("OnOffOn")]);

        // identical input, identical content, identical order
        assert_eq!(registry, again);
        assert_eq!(again.clusters().next(), Some("OnOff"));
    }

    #[test]
    fn sentinel_wildcards_register_against_the_invalid_id() {
        assert_eq!(BindingTarget::Cluster(6).registered_cluster_id(), Some(6));
        assert_eq!(BindingTarget::Wildcard.registered_cluster_id(), None);
        assert_eq!(
            BindingTarget::WildcardSentinel { is_event: true }.registered_cluster_id(),
            Some(INVALID_CLUSTER_ID)
        );
    }

    #[test]
    fn find_by_identity() {
        let mut registry = Registry::new();
        registry.register("OnOff", vec![entry("OnOffOn"), entry("OnOffToggle")]);

        assert_eq!(registry.find("OnOffToggle").map(|b| b.kind), Some(OperationKind::Invoke));
        assert!(registry.find("Missing").is_none());
    }
}
