//! Type resolution: from IDL type names to concrete storage representations.
//!
//! Resolution is cluster-local. A field type name is first matched against the
//! builtin scalar table, then against the enums, bitmaps and structs declared
//! by the owning cluster. Anything else is a [`ReferenceError`] and generation
//! stops; no code is emitted for a partially resolved cluster.

use matter_bindgen_model::{Cluster, DataType, Struct, StructField};
use thiserror::Error;

/// A type name used somewhere in a cluster does not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("unknown type {name:?} referenced from cluster {cluster}")]
    UnknownType { cluster: String, name: String },

    #[error("enum/bitmap {name} in cluster {cluster} has non-integer base type {base:?}")]
    InvalidBaseType {
        cluster: String,
        name: String,
        base: String,
    },

    #[error("struct {name} in cluster {cluster} is recursively defined")]
    RecursiveType { cluster: String, name: String },
}

/// Inclusive value range of a scalar, as declared by its IDL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: i128,
    pub max: i128,
}

impl Bounds {
    pub const fn unsigned(bits: u32) -> Self {
        Self {
            min: 0,
            max: (1 << bits) - 1,
        }
    }

    pub const fn signed(bits: u32) -> Self {
        Self {
            min: -(1 << (bits - 1)),
            max: (1 << (bits - 1)) - 1,
        }
    }
}

/// A fully resolved field type.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedType {
    Unsigned { bits: u8, bounds: Bounds },
    Signed { bits: u8, bounds: Bounds },
    Bool,
    Float { double: bool },
    Utf8String { max_length: Option<u64> },
    OctetString { max_length: Option<u64> },
    Enum { name: String, base: Box<ResolvedType> },
    Bitmap { name: String, base: Box<ResolvedType> },
    Struct(ResolvedStruct),
    List(Box<ResolvedType>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStruct {
    pub name: String,
    pub is_fabric_scoped: bool,
    pub fields: Vec<ResolvedField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub name: String,
    pub code: u64,
    pub is_optional: bool,
    pub is_nullable: bool,
    pub ty: ResolvedType,
}

impl ResolvedType {
    /// The declared value range, where one exists. Enums and bitmaps carry
    /// the range of their base type.
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            ResolvedType::Unsigned { bounds, .. } | ResolvedType::Signed { bounds, .. } => {
                Some(*bounds)
            }
            ResolvedType::Enum { base, .. } | ResolvedType::Bitmap { base, .. } => base.bounds(),
            _ => None,
        }
    }

    /// True for fabric-scoped structs and lists of them. These are the types
    /// whose reads accept a fabric filter.
    pub fn is_fabric_scoped(&self) -> bool {
        match self {
            ResolvedType::Struct(s) => s.is_fabric_scoped,
            ResolvedType::List(element) => element.is_fabric_scoped(),
            _ => false,
        }
    }
}

/// Resolve a builtin scalar type name.
///
/// This is the full set of IDL-level scalars, including the derived names
/// (ids, timestamps, percentages) that alias an integer width.
pub fn resolve_scalar(name: &str) -> Option<ResolvedType> {
    let unsigned = |bits: u8| {
        Some(ResolvedType::Unsigned {
            bits,
            bounds: Bounds::unsigned(bits as u32),
        })
    };
    let signed = |bits: u8| {
        Some(ResolvedType::Signed {
            bits,
            bounds: Bounds::signed(bits as u32),
        })
    };

    match name {
        "enum8" | "int8u" | "bitmap8" | "action_id" | "fabric_idx" | "percent" | "priority"
        | "status" | "namespace" | "tag" => unsigned(8),
        "enum16" | "int16u" | "bitmap16" | "endpoint_no" | "group_id" | "vendor_id"
        | "percent100ths" | "entry_idx" => unsigned(16),
        "int32u" | "bitmap32" | "epoch_s" | "elapsed_s" | "utc" | "cluster_id" | "attrib_id"
        | "field_id" | "event_id" | "command_id" | "trans_id" | "devtype_id" | "data_ver" => {
            unsigned(32)
        }
        "int64u" | "bitmap64" | "epoch_us" | "posix_ms" | "systime_us" | "systime_ms"
        | "fabric_id" | "node_id" | "event_no" => unsigned(64),
        "int8s" => signed(8),
        "int16s" | "temperature" => signed(16),
        "int32s" => signed(32),
        "int64s" => signed(64),
        "boolean" => Some(ResolvedType::Bool),
        "single" => Some(ResolvedType::Float { double: false }),
        "double" => Some(ResolvedType::Float { double: true }),
        _ => None,
    }
}

/// Resolve one field type within its owning cluster.
pub fn resolve_data_type(cluster: &Cluster, ty: &DataType) -> Result<ResolvedType, ReferenceError> {
    let element = resolve_named(cluster, &ty.name, &mut Vec::new())?;
    let element = match (element, ty.max_length) {
        // the parser only attaches lengths to string types
        (ResolvedType::Utf8String { .. }, max_length @ Some(_)) => {
            ResolvedType::Utf8String { max_length }
        }
        (ResolvedType::OctetString { .. }, max_length @ Some(_)) => {
            ResolvedType::OctetString { max_length }
        }
        (element, _) => element,
    };

    if ty.is_list {
        Ok(ResolvedType::List(Box::new(element)))
    } else {
        Ok(element)
    }
}

fn resolve_named(
    cluster: &Cluster,
    name: &str,
    visiting: &mut Vec<String>,
) -> Result<ResolvedType, ReferenceError> {
    match name {
        "char_string" | "long_char_string" => {
            return Ok(ResolvedType::Utf8String { max_length: None })
        }
        "octet_string" | "long_octet_string" => {
            return Ok(ResolvedType::OctetString { max_length: None })
        }
        _ => (),
    }

    if let Some(scalar) = resolve_scalar(name) {
        return Ok(scalar);
    }

    if let Some(e) = cluster.enums.iter().find(|e| e.id == name) {
        return Ok(ResolvedType::Enum {
            name: e.id.clone(),
            base: Box::new(integer_base(cluster, &e.id, &e.base_type)?),
        });
    }

    if let Some(b) = cluster.bitmaps.iter().find(|b| b.id == name) {
        return Ok(ResolvedType::Bitmap {
            name: b.id.clone(),
            base: Box::new(integer_base(cluster, &b.id, &b.base_type)?),
        });
    }

    if let Some(s) = cluster.structs.iter().find(|s| s.id == name) {
        return resolve_struct(cluster, s, visiting).map(ResolvedType::Struct);
    }

    Err(ReferenceError::UnknownType {
        cluster: cluster.id.clone(),
        name: name.into(),
    })
}

fn integer_base(cluster: &Cluster, owner: &str, base: &str) -> Result<ResolvedType, ReferenceError> {
    match resolve_scalar(base) {
        Some(resolved @ (ResolvedType::Unsigned { .. } | ResolvedType::Signed { .. })) => {
            Ok(resolved)
        }
        _ => Err(ReferenceError::InvalidBaseType {
            cluster: cluster.id.clone(),
            name: owner.into(),
            base: base.into(),
        }),
    }
}

fn resolve_struct(
    cluster: &Cluster,
    s: &Struct,
    visiting: &mut Vec<String>,
) -> Result<ResolvedStruct, ReferenceError> {
    if visiting.iter().any(|n| n == &s.id) {
        return Err(ReferenceError::RecursiveType {
            cluster: cluster.id.clone(),
            name: s.id.clone(),
        });
    }
    visiting.push(s.id.clone());

    let fields = s
        .fields
        .iter()
        .map(|field| resolve_struct_field(cluster, field, visiting))
        .collect::<Result<Vec<_>, _>>()?;

    visiting.pop();

    Ok(ResolvedStruct {
        name: s.id.clone(),
        is_fabric_scoped: s.is_fabric_scoped,
        fields,
    })
}

fn resolve_struct_field(
    cluster: &Cluster,
    field: &StructField,
    visiting: &mut Vec<String>,
) -> Result<ResolvedField, ReferenceError> {
    let element = resolve_named(cluster, &field.field.data_type.name, visiting)?;
    let ty = if field.field.data_type.is_list {
        ResolvedType::List(Box::new(element))
    } else {
        element
    };

    Ok(ResolvedField {
        name: field.field.id.clone(),
        code: field.field.code,
        is_optional: field.is_optional,
        is_nullable: field.is_nullable,
        ty,
    })
}

/// Resolve the request struct of a command, if it takes arguments.
pub fn resolve_request(
    cluster: &Cluster,
    input: Option<&str>,
) -> Result<Option<ResolvedStruct>, ReferenceError> {
    match input {
        None => Ok(None),
        Some(name) => {
            let s = cluster
                .struct_named(name)
                .ok_or_else(|| ReferenceError::UnknownType {
                    cluster: cluster.id.clone(),
                    name: name.into(),
                })?;
            resolve_struct(cluster, s, &mut Vec::new()).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matter_bindgen_model::Idl;
    use rstest::rstest;

    fn sample_cluster() -> Cluster {
        let idl = Idl::parse(
            "
              cluster Sample = 100 {
                revision 1;

                enum ModeTag : enum16 {
                  kAuto = 0;
                  kQuick = 1;
                }

                bitmap Features : bitmap32 {
                  kLighting = 0x1;
                }

                enum Broken : char_string {
                  kOops = 0;
                }

                fabric_scoped struct EntryStruct {
                  fabric_idx fabricIndex = 254;
                }

                struct NestedStruct {
                  EntryStruct inner = 1;
                  int8u count = 2;
                }
              }
            ",
        )
        .expect("valid idl");
        idl.clusters.into_iter().next().expect("one cluster")
    }

    #[rstest]
    #[case("int8u", 0, 255)]
    #[case("enum8", 0, 255)]
    #[case("percent100ths", 0, 65535)]
    #[case("cluster_id", 0, u32::MAX as i128)]
    #[case("epoch_us", 0, u64::MAX as i128)]
    #[case("int8s", -128, 127)]
    #[case("temperature", i16::MIN as i128, i16::MAX as i128)]
    #[case("int64s", i64::MIN as i128, i64::MAX as i128)]
    fn scalar_bounds(#[case] name: &str, #[case] min: i128, #[case] max: i128) {
        let bounds = resolve_scalar(name)
            .expect("known scalar")
            .bounds()
            .expect("integer type");
        assert_eq!(bounds, Bounds { min, max });
    }

    #[test]
    fn cluster_local_enum_carries_base_bounds() {
        let cluster = sample_cluster();
        let resolved = resolve_data_type(&cluster, &DataType::scalar("ModeTag")).unwrap();

        assert!(matches!(resolved, ResolvedType::Enum { ref name, .. } if name == "ModeTag"));
        assert_eq!(resolved.bounds(), Some(Bounds::unsigned(16)));
    }

    #[test]
    fn fabric_scoped_propagates_through_lists() {
        let cluster = sample_cluster();

        let direct = resolve_data_type(&cluster, &DataType::scalar("EntryStruct")).unwrap();
        let listed = resolve_data_type(&cluster, &DataType::list_of("EntryStruct")).unwrap();
        let nested = resolve_data_type(&cluster, &DataType::scalar("NestedStruct")).unwrap();

        assert!(direct.is_fabric_scoped());
        assert!(listed.is_fabric_scoped());
        // containment does not make the outer struct fabric scoped
        assert!(!nested.is_fabric_scoped());
    }

    #[test]
    fn unknown_type_is_an_error() {
        let cluster = sample_cluster();
        let err = resolve_data_type(&cluster, &DataType::scalar("NoSuchType")).unwrap_err();

        assert_eq!(
            err,
            ReferenceError::UnknownType {
                cluster: "Sample".into(),
                name: "NoSuchType".into(),
            }
        );
    }

    #[test]
    fn non_integer_enum_base_is_an_error() {
        let cluster = sample_cluster();
        let err = resolve_data_type(&cluster, &DataType::scalar("Broken")).unwrap_err();

        assert!(matches!(err, ReferenceError::InvalidBaseType { ref base, .. } if base == "char_string"));
    }

    #[test]
    fn string_length_is_carried() {
        let cluster = sample_cluster();
        let resolved = resolve_data_type(
            &cluster,
            &DataType {
                name: "char_string".into(),
                is_list: false,
                max_length: Some(32),
            },
        )
        .unwrap();

        assert_eq!(
            resolved,
            ResolvedType::Utf8String {
                max_length: Some(32)
            }
        );
    }
}
