//! Binding emission: one unit struct per binding, plus per-cluster
//! registration functions.
//!
//! The binding plan ([`cluster_bindings`]) is the single source of ordering:
//! module item order, registration order and the registry plan all walk the
//! same list. Capability gating happens here (no write binding for read-only
//! attributes, no subscribe binding for non-subscribable ones); argument
//! validation and payload encoding are baked into the generated functions.

use matter_bindgen_model::{Attribute, Cluster, Command, StructType};
use proc_macro2::{Ident, Literal, Span, TokenStream};
use quote::quote;

use crate::id;
use crate::resolve::{
    resolve_data_type, resolve_request, ReferenceError, ResolvedField, ResolvedStruct,
    ResolvedType,
};
use crate::EmitContext;

/// Which operation a planned binding implements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind {
    Invoke { command: String },
    ReadAttribute { attribute: String },
    WriteAttribute { attribute: String },
    SubscribeAttribute { attribute: String },
    /// Per-cluster invoke-by-id placeholder.
    CommandById,
    ReadById,
    WriteById,
    SubscribeById,
    /// Generic event access (events have no per-event bindings).
    ReadEvent,
    SubscribeEvent,
}

/// One planned binding: identity string plus what it does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
}

/// The ordered binding list of one cluster: generic placeholders first, then
/// commands in declaration order, then per attribute its read/write/subscribe
/// bindings in declaration order, then the event placeholders if the cluster
/// declares any events.
pub fn cluster_bindings(cluster: &Cluster) -> Vec<Binding> {
    let mut bindings = vec![
        Binding {
            name: id::command_by_id_binding_name(&cluster.id),
            kind: BindingKind::CommandById,
        },
        Binding {
            name: id::read_by_id_binding_name(&cluster.id),
            kind: BindingKind::ReadById,
        },
        Binding {
            name: id::write_by_id_binding_name(&cluster.id),
            kind: BindingKind::WriteById,
        },
        Binding {
            name: id::subscribe_by_id_binding_name(&cluster.id),
            kind: BindingKind::SubscribeById,
        },
    ];

    for command in &cluster.commands {
        bindings.push(Binding {
            name: id::invoke_binding_name(&cluster.id, &command.id),
            kind: BindingKind::Invoke {
                command: command.id.clone(),
            },
        });
    }

    for attribute in &cluster.attributes {
        let attr = &attribute.field.field.id;

        bindings.push(Binding {
            name: id::read_attribute_binding_name(&cluster.id, attr),
            kind: BindingKind::ReadAttribute {
                attribute: attr.clone(),
            },
        });
        if attribute.is_writable() {
            bindings.push(Binding {
                name: id::write_attribute_binding_name(&cluster.id, attr),
                kind: BindingKind::WriteAttribute {
                    attribute: attr.clone(),
                },
            });
        }
        if attribute.is_subscribable() {
            bindings.push(Binding {
                name: id::subscribe_attribute_binding_name(&cluster.id, attr),
                kind: BindingKind::SubscribeAttribute {
                    attribute: attr.clone(),
                },
            });
        }
    }

    if !cluster.events.is_empty() {
        bindings.push(Binding {
            name: id::read_event_binding_name(&cluster.id),
            kind: BindingKind::ReadEvent,
        });
        bindings.push(Binding {
            name: id::subscribe_event_binding_name(&cluster.id),
            kind: BindingKind::SubscribeEvent,
        });
    }

    bindings
}

/// The binding list of the `Any` pseudo-cluster, always registered first.
pub fn any_bindings() -> Vec<Binding> {
    vec![
        Binding {
            name: id::ANY_COMMAND_BY_ID.into(),
            kind: BindingKind::CommandById,
        },
        Binding {
            name: id::ANY_READ_BY_ID.into(),
            kind: BindingKind::ReadById,
        },
        Binding {
            name: id::ANY_WRITE_BY_ID.into(),
            kind: BindingKind::WriteById,
        },
        Binding {
            name: id::ANY_SUBSCRIBE_BY_ID.into(),
            kind: BindingKind::SubscribeById,
        },
        Binding {
            name: id::ANY_READ_EVENT_BY_ID.into(),
            kind: BindingKind::ReadEvent,
        },
        Binding {
            name: id::ANY_SUBSCRIBE_EVENT_BY_ID.into(),
            kind: BindingKind::SubscribeEvent,
        },
    ]
}

fn ident(name: &str) -> Ident {
    Ident::new(name, Span::call_site())
}

fn doc_tokens(doc: &Option<String>) -> TokenStream {
    match doc {
        Some(doc) => quote!(#[doc = #doc]),
        None => quote!(),
    }
}

/// Parameter type, bounds check and value construction for one argument.
struct ArgCodec {
    param_type: TokenStream,
    check: TokenStream,
    value: TokenStream,
}

fn arg_codec(ty: &ResolvedType, arg: &Ident, krate: &Ident) -> ArgCodec {
    let arg_name = arg.to_string();
    let bounds_check = |unsigned: bool| {
        let bounds = ty.bounds().expect("integer types carry bounds");
        let min = Literal::i128_suffixed(bounds.min);
        let max = Literal::i128_suffixed(bounds.max);
        let check = if unsigned {
            ident("check_unsigned")
        } else {
            ident("check_signed")
        };
        quote! {
            #krate::ScalarBounds::new(#min, #max).#check(#arg_name, #arg)?;
        }
    };

    match ty {
        ResolvedType::Unsigned { .. }
        | ResolvedType::Enum { .. }
        | ResolvedType::Bitmap { .. } => ArgCodec {
            param_type: quote!(u64),
            check: bounds_check(true),
            value: quote!(#krate::Value::Unsigned(#arg)),
        },
        ResolvedType::Signed { .. } => ArgCodec {
            param_type: quote!(i64),
            check: bounds_check(false),
            value: quote!(#krate::Value::Signed(#arg)),
        },
        ResolvedType::Bool => ArgCodec {
            param_type: quote!(bool),
            check: quote!(),
            value: quote!(#krate::Value::Bool(#arg)),
        },
        ResolvedType::Float { double: false } => ArgCodec {
            param_type: quote!(f32),
            check: quote!(),
            value: quote!(#krate::Value::Float(#arg as f64)),
        },
        ResolvedType::Float { double: true } => ArgCodec {
            param_type: quote!(f64),
            check: quote!(),
            value: quote!(#krate::Value::Float(#arg)),
        },
        // NOTE: declared maximum string lengths are not enforced here
        ResolvedType::Utf8String { .. } => ArgCodec {
            param_type: quote!(&str),
            check: quote!(),
            value: quote!(#krate::Value::Utf8(#arg.into())),
        },
        ResolvedType::OctetString { .. } => ArgCodec {
            param_type: quote!(&[u8]),
            check: quote!(),
            value: quote!(#krate::Value::Octets(#arg.to_vec())),
        },
        // structs and lists arrive pre-encoded
        ResolvedType::Struct(_) | ResolvedType::List(_) => ArgCodec {
            param_type: quote!(#krate::Value),
            check: quote!(),
            value: quote!(#arg),
        },
    }
}

/// One request-struct field as a binding parameter plus the statements
/// encoding it into the payload field list.
struct FieldArg {
    param: TokenStream,
    encode: TokenStream,
}

fn field_arg(field: &ResolvedField, krate: &Ident) -> FieldArg {
    let arg = ident(&id::idl_field_name_to_rs_name(&field.name));
    // model validation bounds field codes to u8 and member codes to u32, so
    // the narrowing casts in this module are lossless
    let code = Literal::u8_suffixed(field.code as u8);
    let ArgCodec {
        param_type,
        check,
        value,
    } = arg_codec(&field.ty, &arg, krate);

    let push = quote! {
        #check
        fields.push((#code, #value));
    };
    let push_nullable = quote! {
        match #arg {
            Some(#arg) => {
                #push
            }
            None => fields.push((#code, #krate::Value::Null)),
        }
    };

    let (param_type, encode) = match (field.is_optional, field.is_nullable) {
        (false, false) => (param_type, push),
        (false, true) => (quote!(Option<#param_type>), push_nullable),
        (true, false) => (
            quote!(Option<#param_type>),
            quote! {
                if let Some(#arg) = #arg {
                    #push
                }
            },
        ),
        (true, true) => (
            quote!(Option<Option<#param_type>>),
            quote! {
                if let Some(#arg) = #arg {
                    #push_nullable
                }
            },
        ),
    };

    FieldArg {
        param: quote!(#arg: #param_type),
        encode,
    }
}

fn request_payload(request: &Option<ResolvedStruct>, krate: &Ident) -> (Vec<TokenStream>, TokenStream) {
    match request {
        None => (Vec::new(), quote!(let payload = None;)),
        Some(request) => {
            let args: Vec<_> = request
                .fields
                .iter()
                .map(|field| field_arg(field, krate))
                .collect();
            let params = args.iter().map(|a| a.param.clone()).collect();
            let encodes = args.iter().map(|a| &a.encode);
            let build = quote! {
                let mut fields = Vec::new();
                #(#encodes)*
                let payload = Some(#krate::Value::Struct(fields));
            };
            (params, build)
        }
    }
}

/// Response command id of a command, or `None` for status-only commands.
fn response_id(cluster: &Cluster, command: &Command) -> Result<Option<u64>, ReferenceError> {
    if command.is_status_only() {
        return Ok(None);
    }
    match cluster.response_struct(command).map(|s| s.struct_type) {
        Some(StructType::Response(code)) => Ok(Some(code)),
        _ => Err(ReferenceError::UnknownType {
            cluster: cluster.id.clone(),
            name: command.output.clone(),
        }),
    }
}

/// Emit the binding struct of one concrete command.
pub fn invoke_binding_tokens(
    cluster: &Cluster,
    command: &Command,
    ctx: &EmitContext,
) -> Result<TokenStream, ReferenceError> {
    let krate = &ctx.runtime_crate;
    let name = id::invoke_binding_name(&cluster.id, &command.id);
    let ty = ident(&name);
    let doc = doc_tokens(&command.doc_comment);
    let cluster_code = Literal::u32_suffixed(cluster.code as u32);
    let command_code = Literal::u32_suffixed(command.code as u32);
    let member_code = Literal::u64_suffixed(command.code);

    let response = match response_id(cluster, command)? {
        Some(code) => {
            let code = Literal::u32_suffixed(code as u32);
            quote!(Some(#code))
        }
        None => quote!(None),
    };

    let request = resolve_request(cluster, command.input.as_deref())?;
    let (params, payload) = request_payload(&request, krate);

    let (timed_param, timed_value) = if command.is_timed {
        (
            quote!(timed_timeout: Option<core::time::Duration>,),
            quote!(timed_timeout),
        )
    } else {
        (quote!(), quote!(None))
    };

    Ok(quote! {
        #doc
        pub struct #ty;

        impl #ty {
            pub const NAME: &'static str = #name;
            pub const CLUSTER_ID: u32 = #cluster_code;
            pub const COMMAND_ID: u32 = #command_code;
            pub const RESPONSE_ID: Option<u32> = #response;

            pub fn entry() -> #krate::BindingEntry {
                #krate::BindingEntry::new(
                    Self::NAME,
                    #krate::OperationKind::Invoke,
                    #krate::BindingTarget::Cluster(Self::CLUSTER_ID),
                    Some(#member_code),
                )
            }

            pub fn invoke(
                transport: &dyn #krate::Transport,
                #(#params,)*
                #timed_param
                repeat: usize,
                done: #krate::AggregateCompletion,
            ) -> Result<(), #krate::ArgumentRangeError> {
                #payload
                #krate::invoke_repeated(
                    transport,
                    #krate::InvokeRequest {
                        cluster_id: Self::CLUSTER_ID,
                        command_id: Self::COMMAND_ID,
                        payload,
                        timed_timeout: #timed_value,
                    },
                    Self::RESPONSE_ID,
                    repeat,
                    done,
                );
                Ok(())
            }
        }
    })
}

fn attribute_consts(cluster: &Cluster, attribute: &Attribute, name: &str) -> TokenStream {
    let cluster_code = Literal::u32_suffixed(cluster.code as u32);
    let attribute_code = Literal::u32_suffixed(attribute.field.field.code as u32);
    quote! {
        pub const NAME: &'static str = #name;
        pub const CLUSTER_ID: u32 = #cluster_code;
        pub const ATTRIBUTE_ID: u32 = #attribute_code;
    }
}

fn attribute_entry(attribute: &Attribute, kind: TokenStream, krate: &Ident) -> TokenStream {
    let member_code = Literal::u64_suffixed(attribute.field.field.code);
    quote! {
        pub fn entry() -> #krate::BindingEntry {
            #krate::BindingEntry::new(
                Self::NAME,
                #krate::OperationKind::#kind,
                #krate::BindingTarget::Cluster(Self::CLUSTER_ID),
                Some(#member_code),
            )
        }
    }
}

/// Emit the read binding of one attribute. Fabric-scoped attribute types get
/// a fabric-filter parameter; everything else reads unfiltered.
pub fn read_attribute_tokens(
    cluster: &Cluster,
    attribute: &Attribute,
    ctx: &EmitContext,
) -> Result<TokenStream, ReferenceError> {
    let krate = &ctx.runtime_crate;
    let name = id::read_attribute_binding_name(&cluster.id, &attribute.field.field.id);
    let ty = ident(&name);
    let doc = doc_tokens(&attribute.doc_comment);
    let consts = attribute_consts(cluster, attribute, &name);
    let entry = attribute_entry(attribute, quote!(ReadAttribute), krate);

    let resolved = resolve_data_type(cluster, &attribute.field.field.data_type)?;
    let (filter_param, build) = if resolved.is_fabric_scoped() {
        (
            quote!(fabric_filtered: Option<bool>,),
            quote! {
                let mut request = #krate::ReadRequest::attribute(Self::CLUSTER_ID, Self::ATTRIBUTE_ID);
                if let Some(filtered) = fabric_filtered {
                    request = request.fabric_filtered(filtered);
                }
            },
        )
    } else {
        (
            quote!(),
            quote! {
                let request = #krate::ReadRequest::attribute(Self::CLUSTER_ID, Self::ATTRIBUTE_ID);
            },
        )
    };

    Ok(quote! {
        #doc
        pub struct #ty;

        impl #ty {
            #consts

            #entry

            pub fn read(
                transport: &dyn #krate::Transport,
                #filter_param
                done: #krate::Completion<Option<#krate::Value>>,
            ) {
                #build
                transport.read(request, done);
            }
        }
    })
}

/// Emit the write binding of one writable attribute.
pub fn write_attribute_tokens(
    cluster: &Cluster,
    attribute: &Attribute,
    ctx: &EmitContext,
) -> Result<TokenStream, ReferenceError> {
    let krate = &ctx.runtime_crate;
    let name = id::write_attribute_binding_name(&cluster.id, &attribute.field.field.id);
    let ty = ident(&name);
    let doc = doc_tokens(&attribute.doc_comment);
    let consts = attribute_consts(cluster, attribute, &name);
    let entry = attribute_entry(attribute, quote!(WriteAttribute), krate);

    let arg = ident(&id::idl_field_name_to_rs_name(&attribute.field.field.id));
    let resolved = resolve_data_type(cluster, &attribute.field.field.data_type)?;
    let ArgCodec {
        param_type,
        check,
        value,
    } = arg_codec(&resolved, &arg, krate);

    let (param_type, encode) = if attribute.field.is_nullable {
        (
            quote!(Option<#param_type>),
            quote! {
                let encoded = match #arg {
                    Some(#arg) => {
                        #check
                        #value
                    }
                    None => #krate::Value::Null,
                };
            },
        )
    } else {
        (
            param_type,
            quote! {
                #check
                let encoded = #value;
            },
        )
    };

    Ok(quote! {
        #doc
        pub struct #ty;

        impl #ty {
            #consts

            #entry

            pub fn write(
                transport: &dyn #krate::Transport,
                #arg: #param_type,
                data_version: Option<u32>,
                timed_timeout: Option<core::time::Duration>,
                done: #krate::Completion<()>,
            ) -> Result<(), #krate::ArgumentRangeError> {
                #encode
                let mut request = #krate::WriteRequest::new(Self::CLUSTER_ID, Self::ATTRIBUTE_ID, encoded);
                if let Some(data_version) = data_version {
                    request = request.if_version(data_version);
                }
                if let Some(timed_timeout) = timed_timeout {
                    request = request.timed(timed_timeout);
                }
                transport.write(request, done);
                Ok(())
            }
        }
    })
}

/// Emit the subscribe binding of one subscribable attribute.
///
/// The fabric filter is a generic subscribe option, offered regardless of
/// the attribute's type.
pub fn subscribe_attribute_tokens(
    cluster: &Cluster,
    attribute: &Attribute,
    ctx: &EmitContext,
) -> TokenStream {
    let krate = &ctx.runtime_crate;
    let name = id::subscribe_attribute_binding_name(&cluster.id, &attribute.field.field.id);
    let ty = ident(&name);
    let doc = doc_tokens(&attribute.doc_comment);
    let consts = attribute_consts(cluster, attribute, &name);
    let entry = attribute_entry(attribute, quote!(SubscribeAttribute), krate);

    quote! {
        #doc
        pub struct #ty;

        impl #ty {
            #consts

            #entry

            pub fn subscribe(
                transport: &dyn #krate::Transport,
                min_interval_secs: u16,
                max_interval_secs: u16,
                keep_subscriptions: Option<bool>,
                fabric_filtered: Option<bool>,
                auto_resubscribe: Option<bool>,
                sink: std::sync::Arc<#krate::SubscriptionSink>,
            ) {
                let mut request = #krate::SubscribeRequest::new(
                    Self::CLUSTER_ID,
                    #krate::MemberPath::Attribute(Self::ATTRIBUTE_ID),
                    min_interval_secs,
                    max_interval_secs,
                );
                if let Some(keep) = keep_subscriptions {
                    request = request.keep_subscriptions(keep);
                }
                if let Some(filtered) = fabric_filtered {
                    request = request.fabric_filtered(filtered);
                }
                if let Some(auto) = auto_resubscribe {
                    request = request.auto_resubscribe(auto);
                }
                transport.subscribe(request, sink);
            }
        }
    }
}

/// Targeting of a generic binding: a concrete cluster or the wildcard forms
/// of the `Any` pseudo-cluster.
enum GenericTarget {
    Cluster(u64),
    Wildcard,
    WildcardSentinel { is_event: bool },
}

impl GenericTarget {
    fn consts(&self) -> TokenStream {
        match self {
            GenericTarget::Cluster(code) => {
                let code = Literal::u32_suffixed(*code as u32);
                quote!(pub const CLUSTER_ID: u32 = #code;)
            }
            // wildcard bindings take the cluster id per call
            _ => quote!(),
        }
    }

    fn entry_target(&self, krate: &Ident) -> TokenStream {
        match self {
            GenericTarget::Cluster(_) => {
                quote!(#krate::BindingTarget::Cluster(Self::CLUSTER_ID))
            }
            GenericTarget::Wildcard => quote!(#krate::BindingTarget::Wildcard),
            GenericTarget::WildcardSentinel { is_event } => {
                quote!(#krate::BindingTarget::WildcardSentinel { is_event: #is_event })
            }
        }
    }

    /// Parameter list prefix and the cluster-id expression of the generated
    /// operation function.
    fn cluster_arg(&self) -> (TokenStream, TokenStream) {
        match self {
            GenericTarget::Cluster(_) => (quote!(), quote!(Self::CLUSTER_ID)),
            _ => (quote!(cluster_id: u32,), quote!(cluster_id)),
        }
    }
}

fn generic_binding_tokens(
    name: &str,
    kind: &BindingKind,
    target: &GenericTarget,
    krate: &Ident,
) -> TokenStream {
    let ty = ident(name);
    let consts = target.consts();
    let entry_target = target.entry_target(krate);
    let (cluster_param, cluster_expr) = target.cluster_arg();

    let (operation_kind, operation) = match kind {
        BindingKind::CommandById => (
            quote!(Invoke),
            quote! {
                pub fn invoke(
                    transport: &dyn #krate::Transport,
                    #cluster_param
                    command_id: u32,
                    payload: Option<#krate::Value>,
                    repeat: usize,
                    done: #krate::AggregateCompletion,
                ) {
                    #krate::invoke_repeated(
                        transport,
                        #krate::InvokeRequest {
                            cluster_id: #cluster_expr,
                            command_id,
                            payload,
                            timed_timeout: None,
                        },
                        None,
                        repeat,
                        done,
                    );
                }
            },
        ),
        BindingKind::ReadById => (
            quote!(ReadAttribute),
            quote! {
                pub fn read(
                    transport: &dyn #krate::Transport,
                    #cluster_param
                    attribute_id: u32,
                    done: #krate::Completion<Option<#krate::Value>>,
                ) {
                    transport.read(#krate::ReadRequest::attribute(#cluster_expr, attribute_id), done);
                }
            },
        ),
        BindingKind::WriteById => (
            quote!(WriteAttribute),
            quote! {
                pub fn write(
                    transport: &dyn #krate::Transport,
                    #cluster_param
                    attribute_id: u32,
                    value: #krate::Value,
                    data_version: Option<u32>,
                    done: #krate::Completion<()>,
                ) {
                    let mut request = #krate::WriteRequest::new(#cluster_expr, attribute_id, value);
                    if let Some(data_version) = data_version {
                        request = request.if_version(data_version);
                    }
                    transport.write(request, done);
                }
            },
        ),
        BindingKind::SubscribeById => (
            quote!(SubscribeAttribute),
            quote! {
                pub fn subscribe(
                    transport: &dyn #krate::Transport,
                    #cluster_param
                    attribute_id: u32,
                    min_interval_secs: u16,
                    max_interval_secs: u16,
                    sink: std::sync::Arc<#krate::SubscriptionSink>,
                ) {
                    transport.subscribe(
                        #krate::SubscribeRequest::new(
                            #cluster_expr,
                            #krate::MemberPath::Attribute(attribute_id),
                            min_interval_secs,
                            max_interval_secs,
                        ),
                        sink,
                    );
                }
            },
        ),
        BindingKind::ReadEvent => (
            quote!(ReadEvent),
            quote! {
                pub fn read(
                    transport: &dyn #krate::Transport,
                    #cluster_param
                    event_id: u32,
                    done: #krate::Completion<Option<#krate::Value>>,
                ) {
                    transport.read(#krate::ReadRequest::event(#cluster_expr, event_id), done);
                }
            },
        ),
        BindingKind::SubscribeEvent => (
            quote!(SubscribeEvent),
            quote! {
                pub fn subscribe(
                    transport: &dyn #krate::Transport,
                    #cluster_param
                    event_id: u32,
                    min_interval_secs: u16,
                    max_interval_secs: u16,
                    sink: std::sync::Arc<#krate::SubscriptionSink>,
                ) {
                    transport.subscribe(
                        #krate::SubscribeRequest::new(
                            #cluster_expr,
                            #krate::MemberPath::Event(event_id),
                            min_interval_secs,
                            max_interval_secs,
                        ),
                        sink,
                    );
                }
            },
        ),
        _ => unreachable!("concrete bindings are emitted separately"),
    };

    quote! {
        pub struct #ty;

        impl #ty {
            pub const NAME: &'static str = #name;
            #consts

            pub fn entry() -> #krate::BindingEntry {
                #krate::BindingEntry::generic(
                    Self::NAME,
                    #krate::OperationKind::#operation_kind,
                    #entry_target,
                )
            }

            #operation
        }
    }
}

/// Emit one cluster as a complete generated module: binding structs in plan
/// order, then the registration function.
pub fn cluster_module_tokens(
    cluster: &Cluster,
    ctx: &EmitContext,
) -> Result<TokenStream, ReferenceError> {
    let krate = &ctx.runtime_crate;
    let bindings = cluster_bindings(cluster);

    let mut items = TokenStream::new();
    for binding in &bindings {
        let tokens = match &binding.kind {
            BindingKind::Invoke { command } => {
                let command = cluster
                    .commands
                    .iter()
                    .find(|c| &c.id == command)
                    .expect("plan built from this cluster");
                invoke_binding_tokens(cluster, command, ctx)?
            }
            BindingKind::ReadAttribute { attribute } => {
                let attribute = attribute_named(cluster, attribute);
                read_attribute_tokens(cluster, attribute, ctx)?
            }
            BindingKind::WriteAttribute { attribute } => {
                let attribute = attribute_named(cluster, attribute);
                write_attribute_tokens(cluster, attribute, ctx)?
            }
            BindingKind::SubscribeAttribute { attribute } => {
                let attribute = attribute_named(cluster, attribute);
                subscribe_attribute_tokens(cluster, attribute, ctx)
            }
            kind => generic_binding_tokens(
                &binding.name,
                kind,
                &GenericTarget::Cluster(cluster.code),
                krate,
            ),
        };
        items.extend(tokens);
    }

    let cluster_name = &cluster.id;
    let entries = bindings.iter().map(|binding| {
        let ty = ident(&binding.name);
        quote!(#ty::entry())
    });

    Ok(quote! {
        #items

        pub fn register(registry: &mut #krate::Registry) {
            registry.register(#cluster_name, vec![#(#entries),*]);
        }
    })
}

fn attribute_named<'a>(cluster: &'a Cluster, name: &str) -> &'a Attribute {
    cluster
        .attributes
        .iter()
        .find(|a| a.field.field.id == name)
        .expect("plan built from this cluster")
}

/// Emit the `Any` pseudo-cluster module.
pub fn any_module_tokens(ctx: &EmitContext) -> TokenStream {
    let krate = &ctx.runtime_crate;
    let bindings = any_bindings();

    let mut items = TokenStream::new();
    for binding in &bindings {
        let target = match binding.kind {
            BindingKind::ReadEvent => GenericTarget::WildcardSentinel { is_event: true },
            BindingKind::SubscribeEvent => GenericTarget::WildcardSentinel { is_event: true },
            _ => GenericTarget::Wildcard,
        };
        items.extend(generic_binding_tokens(
            &binding.name,
            &binding.kind,
            &target,
            krate,
        ));
    }

    let cluster_name = id::ANY_CLUSTER;
    let entries = bindings.iter().map(|binding| {
        let ty = ident(&binding.name);
        quote!(#ty::entry())
    });

    quote! {
        #items

        pub fn register(registry: &mut #krate::Registry) {
            registry.register(#cluster_name, vec![#(#entries),*]);
        }
    }
}
