//! Model validation performed after parsing and before any code generation.
//!
//! A document that parses is not necessarily generatable: duplicate codes
//! would produce colliding binding identities, codes wider than their emitted
//! identifier width would truncate, and dangling struct references would
//! defer failures to runtime. All are rejected here, while the model is
//! still the only state of the generation run.

use std::collections::HashSet;

use thiserror::Error;

use crate::{Cluster, Idl, StructType, STATUS_RESPONSE};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("duplicate cluster code {code} (cluster {cluster})")]
    DuplicateClusterCode { cluster: String, code: u64 },

    #[error("duplicate cluster name {cluster}")]
    DuplicateClusterName { cluster: String },

    #[error("duplicate {member} code {code} in cluster {cluster}")]
    DuplicateMemberCode {
        cluster: String,
        member: &'static str,
        code: u64,
    },

    #[error("duplicate {member} name {name} in cluster {cluster}")]
    DuplicateMemberName {
        cluster: String,
        member: &'static str,
        name: String,
    },

    #[error("{member} code {code} in cluster {cluster} exceeds the identifier range (max {max})")]
    CodeOutOfRange {
        cluster: String,
        member: &'static str,
        code: u64,
        max: u64,
    },

    #[error("command {command} in cluster {cluster} references unknown request struct {name}")]
    UnknownRequestStruct {
        cluster: String,
        command: String,
        name: String,
    },

    #[error("command {command} in cluster {cluster} references unknown response struct {name}")]
    UnknownResponseStruct {
        cluster: String,
        command: String,
        name: String,
    },
}

fn check_unique_codes<'a>(
    cluster: &Cluster,
    member: &'static str,
    codes: impl Iterator<Item = &'a u64>,
) -> Result<(), ModelError> {
    let mut seen = HashSet::new();
    for code in codes {
        if !seen.insert(*code) {
            return Err(ModelError::DuplicateMemberCode {
                cluster: cluster.id.clone(),
                member,
                code: *code,
            });
        }
    }
    Ok(())
}

fn check_unique_names<'a>(
    cluster: &Cluster,
    member: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ModelError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ModelError::DuplicateMemberName {
                cluster: cluster.id.clone(),
                member,
                name: name.into(),
            });
        }
    }
    Ok(())
}

fn check_code_range(
    cluster: &Cluster,
    member: &'static str,
    max: u64,
    codes: impl Iterator<Item = u64>,
) -> Result<(), ModelError> {
    for code in codes {
        if code > max {
            return Err(ModelError::CodeOutOfRange {
                cluster: cluster.id.clone(),
                member,
                code,
                max,
            });
        }
    }
    Ok(())
}

fn validate_cluster(cluster: &Cluster) -> Result<(), ModelError> {
    check_unique_codes(cluster, "command", cluster.commands.iter().map(|c| &c.code))?;
    check_unique_names(
        cluster,
        "command",
        cluster.commands.iter().map(|c| c.id.as_str()),
    )?;

    check_unique_codes(
        cluster,
        "attribute",
        cluster.attributes.iter().map(|a| &a.field.field.code),
    )?;
    check_unique_names(
        cluster,
        "attribute",
        cluster.attributes.iter().map(|a| a.field.field.id.as_str()),
    )?;

    check_unique_codes(cluster, "event", cluster.events.iter().map(|e| &e.code))?;
    check_unique_names(
        cluster,
        "event",
        cluster.events.iter().map(|e| e.id.as_str()),
    )?;

    // structs, enums and bitmaps share the type namespace of the cluster
    check_unique_names(
        cluster,
        "type",
        cluster
            .structs
            .iter()
            .map(|s| s.id.as_str())
            .chain(cluster.enums.iter().map(|e| e.id.as_str()))
            .chain(cluster.bitmaps.iter().map(|b| b.id.as_str())),
    )?;

    // member codes become u32 identifier constants and struct field codes
    // become u8 wire tags; anything wider would truncate on emission
    check_code_range(
        cluster,
        "command",
        u32::MAX as u64,
        cluster.commands.iter().map(|c| c.code),
    )?;
    check_code_range(
        cluster,
        "attribute",
        u32::MAX as u64,
        cluster.attributes.iter().map(|a| a.field.field.code),
    )?;
    check_code_range(
        cluster,
        "event",
        u32::MAX as u64,
        cluster.events.iter().map(|e| e.code),
    )?;
    check_code_range(
        cluster,
        "response",
        u32::MAX as u64,
        cluster.structs.iter().filter_map(|s| match s.struct_type {
            StructType::Response(code) => Some(code),
            _ => None,
        }),
    )?;
    check_code_range(
        cluster,
        "field",
        u8::MAX as u64,
        cluster
            .structs
            .iter()
            .flat_map(|s| s.fields.iter())
            .chain(cluster.events.iter().flat_map(|e| e.fields.iter()))
            .map(|f| f.field.code),
    )?;

    for command in cluster.commands.iter() {
        if let Some(input) = command.input.as_deref() {
            let known = cluster
                .struct_named(input)
                .map(|s| s.struct_type == StructType::Request)
                .unwrap_or(false);
            if !known {
                return Err(ModelError::UnknownRequestStruct {
                    cluster: cluster.id.clone(),
                    command: command.id.clone(),
                    name: input.into(),
                });
            }
        }

        if command.output != STATUS_RESPONSE {
            let known = cluster
                .struct_named(&command.output)
                .map(|s| matches!(s.struct_type, StructType::Response(_)))
                .unwrap_or(false);
            if !known {
                return Err(ModelError::UnknownResponseStruct {
                    cluster: cluster.id.clone(),
                    command: command.id.clone(),
                    name: command.output.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Validate a parsed document. Pure function of the model; no global state.
pub fn validate(idl: &Idl) -> Result<(), ModelError> {
    let mut codes = HashSet::new();
    let mut names = HashSet::new();

    for cluster in idl.clusters.iter() {
        if !codes.insert(cluster.code) {
            return Err(ModelError::DuplicateClusterCode {
                cluster: cluster.id.clone(),
                code: cluster.code,
            });
        }
        if !names.insert(cluster.id.as_str()) {
            return Err(ModelError::DuplicateClusterName {
                cluster: cluster.id.clone(),
            });
        }
        if cluster.code > u32::MAX as u64 {
            return Err(ModelError::CodeOutOfRange {
                cluster: cluster.id.clone(),
                member: "cluster",
                code: cluster.code,
                max: u32::MAX as u64,
            });
        }

        validate_cluster(cluster)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parsed(input: &str) -> Idl {
        Idl::parse(input).expect("valid input")
    }

    #[test]
    fn accepts_valid_document() {
        let idl = parsed(
            "
            cluster OnOff = 6 {
              request struct OnWithTimedOffRequest {
                int16u onTime = 0;
              }
              response struct TimeResponse = 1 {
                int16u remaining = 0;
              }

              readonly attribute boolean onOff = 0;
              command OnWithTimedOff(OnWithTimedOffRequest): DefaultSuccess = 66;
              command TimeQuery(): TimeResponse = 67;
            }
            ",
        );
        assert_eq!(validate(&idl), Ok(()));
    }

    #[rstest]
    #[case::cluster_code(
        "cluster A = 1 {} cluster B = 1 {}",
        ModelError::DuplicateClusterCode { cluster: "B".into(), code: 1 }
    )]
    #[case::cluster_name(
        "cluster A = 1 {} cluster A = 2 {}",
        ModelError::DuplicateClusterName { cluster: "A".into() }
    )]
    #[case::command_code(
        "cluster A = 1 {
           command X(): DefaultSuccess = 0;
           command Y(): DefaultSuccess = 0;
         }",
        ModelError::DuplicateMemberCode { cluster: "A".into(), member: "command", code: 0 }
    )]
    #[case::attribute_code(
        "cluster A = 1 {
           attribute int8u x = 7;
           attribute int8u y = 7;
         }",
        ModelError::DuplicateMemberCode { cluster: "A".into(), member: "attribute", code: 7 }
    )]
    #[case::attribute_name(
        "cluster A = 1 {
           attribute int8u x = 1;
           attribute int16u x = 2;
         }",
        ModelError::DuplicateMemberName { cluster: "A".into(), member: "attribute", name: "x".into() }
    )]
    #[case::cluster_code_range(
        "cluster A = 6 {} cluster B = 0x100000006 {}",
        ModelError::CodeOutOfRange {
            cluster: "B".into(), member: "cluster", code: 0x1_0000_0006, max: u32::MAX as u64
        }
    )]
    #[case::attribute_code_range(
        "cluster A = 1 {
           attribute int8u x = 0x100000000;
         }",
        ModelError::CodeOutOfRange {
            cluster: "A".into(), member: "attribute", code: 0x1_0000_0000, max: u32::MAX as u64
        }
    )]
    #[case::field_code_range(
        "cluster A = 1 {
           struct S {
             int8u x = 256;
           }
         }",
        ModelError::CodeOutOfRange {
            cluster: "A".into(), member: "field", code: 256, max: u8::MAX as u64
        }
    )]
    #[case::missing_request(
        "cluster A = 1 {
           command X(MissingRequest): DefaultSuccess = 0;
         }",
        ModelError::UnknownRequestStruct {
            cluster: "A".into(), command: "X".into(), name: "MissingRequest".into()
        }
    )]
    #[case::missing_response(
        "cluster A = 1 {
           command X(): MissingResponse = 0;
         }",
        ModelError::UnknownResponseStruct {
            cluster: "A".into(), command: "X".into(), name: "MissingResponse".into()
        }
    )]
    fn rejects_invalid_documents(#[case] input: &str, #[case] expected: ModelError) {
        assert_eq!(validate(&parsed(input)), Err(expected));
    }

    #[test]
    fn request_struct_must_be_marked_request() {
        // a plain struct cannot serve as a command request
        let idl = parsed(
            "cluster A = 1 {
               struct NotARequest {
                 int8u x = 0;
               }
               command X(NotARequest): DefaultSuccess = 0;
             }",
        );
        assert!(matches!(
            validate(&idl),
            Err(ModelError::UnknownRequestStruct { .. })
        ));
    }
}
