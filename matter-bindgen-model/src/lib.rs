//! In-memory model of a Matter device-description IDL.
//!
//! The model is built once per generation run by the [`idl`] parser and is
//! read-only afterwards. Ordering of commands, attributes, events and struct
//! fields follows declaration order in the source document; that order is
//! wire-relevant and must be preserved by all consumers.

pub mod idl;
pub mod validate;

/// Name of the status-only command output: a command returning this declares
/// no specific response shape (completion is acknowledge-or-error).
pub const STATUS_RESPONSE: &str = "DefaultSuccess";

/// The type of a field or attribute value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DataType {
    pub name: String,
    pub is_list: bool,
    pub max_length: Option<u64>,
}

impl DataType {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_list: false,
            max_length: None,
        }
    }

    pub fn list_of(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_list: true,
            max_length: None,
        }
    }

    pub fn is_utf8_string(&self) -> bool {
        matches!(self.name.as_str(), "char_string" | "long_char_string")
    }

    pub fn is_octet_string(&self) -> bool {
        matches!(self.name.as_str(), "octet_string" | "long_octet_string")
    }
}

/// A named, coded member of a struct/event/attribute declaration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Field {
    pub data_type: DataType,
    pub id: String,
    pub code: u64,
}

/// A [`Field`] together with its qualities.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StructField {
    pub field: Field,
    pub is_optional: bool,
    pub is_nullable: bool,
    pub is_fabric_sensitive: bool,
}

/// What kind of struct is being defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum StructType {
    #[default]
    Regular,
    Request,
    /// Responses have a command id associated with them.
    Response(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Struct {
    pub doc_comment: Option<String>,
    pub struct_type: StructType,
    pub id: String,
    pub fields: Vec<StructField>,
    pub is_fabric_scoped: bool,
}

/// A constant within an enum or bitmap definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ConstantEntry {
    pub id: String,
    pub code: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Enum {
    pub doc_comment: Option<String>,
    pub id: String,
    pub base_type: String,
    pub entries: Vec<ConstantEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Bitmap {
    pub doc_comment: Option<String>,
    pub id: String,
    pub base_type: String,
    pub entries: Vec<ConstantEntry>,
}

/// An attribute of a cluster.
///
/// Capability flags gate which bindings get generated: no write binding for
/// read-only attributes, no subscribe binding for non-subscribable ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Attribute {
    pub doc_comment: Option<String>,
    pub field: StructField,
    pub is_read_only: bool,
    pub is_no_subscribe: bool,
    pub is_timed_write: bool,
}

impl Attribute {
    pub fn is_writable(&self) -> bool {
        !self.is_read_only
    }

    pub fn is_subscribable(&self) -> bool {
        !self.is_no_subscribe
    }
}

/// A command of a cluster.
///
/// `input` names a request struct (or is `None` for argument-less commands),
/// `output` names a response struct or [`STATUS_RESPONSE`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Command {
    pub doc_comment: Option<String>,
    pub id: String,
    pub input: Option<String>,
    pub output: String,
    pub code: u64,
    pub is_timed: bool,
}

impl Command {
    /// True when the command declares no specific response shape.
    pub fn is_status_only(&self) -> bool {
        self.output == STATUS_RESPONSE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum EventPriority {
    #[default]
    Debug,
    Info,
    Critical,
}

/// An event of a cluster. Events are accessed generically (read-by-id and
/// subscribe-by-id); no per-event binding exists.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Event {
    pub doc_comment: Option<String>,
    pub priority: EventPriority,
    pub id: String,
    pub code: u64,
    pub fields: Vec<StructField>,
    pub is_fabric_sensitive: bool,
}

/// A cluster: one functional unit of a device, identified by name and code.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cluster {
    pub doc_comment: Option<String>,
    pub id: String,
    pub code: u64,
    pub revision: u64,
    pub enums: Vec<Enum>,
    pub bitmaps: Vec<Bitmap>,
    pub structs: Vec<Struct>,
    pub attributes: Vec<Attribute>,
    pub commands: Vec<Command>,
    pub events: Vec<Event>,
}

impl Cluster {
    pub fn struct_named(&self, name: &str) -> Option<&Struct> {
        self.structs.iter().find(|s| s.id == name)
    }

    /// The request struct of a command, if it takes arguments.
    pub fn request_struct(&self, command: &Command) -> Option<&Struct> {
        command
            .input
            .as_deref()
            .and_then(|name| self.struct_named(name))
    }

    /// The response struct of a command, unless it is status-only.
    pub fn response_struct(&self, command: &Command) -> Option<&Struct> {
        if command.is_status_only() {
            None
        } else {
            self.struct_named(&command.output)
        }
    }
}

/// A parsed device-description document: clusters in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Idl {
    pub clusters: Vec<Cluster>,
}

impl Idl {
    pub fn cluster_named(&self, name: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.id == name)
    }
}
