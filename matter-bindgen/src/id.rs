//! Identifier conversion and binding identity strings.
//!
//! Binding identities are a contract: registration and lookup-by-name depend
//! on them, and uniqueness follows from the model-level uniqueness of
//! cluster/command/attribute names.

use convert_case::{Case, Casing};

/// Registry name of the pseudo-cluster holding the fully generic bindings.
pub const ANY_CLUSTER: &str = "Any";

/// Identities of the fully generic bindings. These do not follow the
/// per-cluster placeholder pattern: the cluster id is a call-time argument.
pub const ANY_COMMAND_BY_ID: &str = "AnyCommandById";
pub const ANY_READ_BY_ID: &str = "AnyReadById";
pub const ANY_WRITE_BY_ID: &str = "AnyWriteById";
pub const ANY_SUBSCRIBE_BY_ID: &str = "AnySubscribeById";
pub const ANY_READ_EVENT_BY_ID: &str = "AnyReadEventById";
pub const ANY_SUBSCRIBE_EVENT_BY_ID: &str = "AnySubscribeEventById";

/// Converts an idl field name (like `identifyTime`) into a rust field name.
///
/// Examples:
///
/// ```
/// use matter_bindgen::id::idl_field_name_to_rs_name;
///
/// assert_eq!(idl_field_name_to_rs_name("test"), "test");
/// assert_eq!(idl_field_name_to_rs_name("anotherTest"), "another_test");
/// ```
pub fn idl_field_name_to_rs_name(s: &str) -> String {
    s.to_case(Case::Snake)
}

/// Converts a cluster name into the module name of its generated bindings.
pub fn cluster_module_name(s: &str) -> String {
    s.to_case(Case::Snake)
}

/// Capitalize the first character (attribute names are lowerCamel in the IDL,
/// identity strings are UpperCamel).
///
/// Examples:
///
/// ```
/// use matter_bindgen::id::capitalized;
///
/// assert_eq!(capitalized("onOff"), "OnOff");
/// assert_eq!(capitalized("x"), "X");
/// ```
pub fn capitalized(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// Identity of an invoke-command binding: `{ClusterName}{CommandName}`.
pub fn invoke_binding_name(cluster: &str, command: &str) -> String {
    format!("{}{}", cluster, command)
}

/// Identity of a read-attribute binding: `Read{ClusterName}{AttributeName}`.
pub fn read_attribute_binding_name(cluster: &str, attribute: &str) -> String {
    format!("Read{}{}", cluster, capitalized(attribute))
}

/// Identity of a write-attribute binding: `Write{ClusterName}{AttributeName}`.
pub fn write_attribute_binding_name(cluster: &str, attribute: &str) -> String {
    format!("Write{}{}", cluster, capitalized(attribute))
}

/// Identity of a subscribe-attribute binding:
/// `Subscribe{ClusterName}{AttributeName}`.
pub fn subscribe_attribute_binding_name(cluster: &str, attribute: &str) -> String {
    format!("Subscribe{}{}", cluster, capitalized(attribute))
}

/// Identity of the generic invoke-by-id placeholder of a cluster.
pub fn command_by_id_binding_name(cluster: &str) -> String {
    format!("{}CommandById", cluster)
}

pub fn read_by_id_binding_name(cluster: &str) -> String {
    format!("Read{}ById", cluster)
}

pub fn write_by_id_binding_name(cluster: &str) -> String {
    format!("Write{}ById", cluster)
}

pub fn subscribe_by_id_binding_name(cluster: &str) -> String {
    format!("Subscribe{}ById", cluster)
}

/// Identity of the generic event-read placeholder of a cluster. Events have
/// no per-event bindings.
pub fn read_event_binding_name(cluster: &str) -> String {
    format!("Read{}Event", cluster)
}

pub fn subscribe_event_binding_name(cluster: &str) -> String {
    format!("Subscribe{}Event", cluster)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_identities() {
        assert_eq!(invoke_binding_name("OnOff", "Toggle"), "OnOffToggle");
        assert_eq!(read_attribute_binding_name("OnOff", "onOff"), "ReadOnOffOnOff");
        assert_eq!(
            write_attribute_binding_name("LevelControl", "onLevel"),
            "WriteLevelControlOnLevel"
        );
        assert_eq!(
            subscribe_attribute_binding_name("OnOff", "onTime"),
            "SubscribeOnOffOnTime"
        );
        assert_eq!(command_by_id_binding_name("Any"), "AnyCommandById");
        assert_eq!(read_event_binding_name("OnOff"), "ReadOnOffEvent");
    }

    #[test]
    fn module_names() {
        assert_eq!(cluster_module_name("OnOff"), "on_off");
        assert_eq!(cluster_module_name("LevelControl"), "level_control");
    }
}
