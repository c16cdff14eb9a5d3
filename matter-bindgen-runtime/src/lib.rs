//! Runtime support for generated cluster client bindings.
//!
//! Generated binding sources are standalone artifacts; everything they share
//! lives here: the process-wide [`Registry`] populated once at startup, the
//! generic [`Value`] adapter used for complex (struct/list) arguments,
//! scalar-bounds validation at the binding boundary, the repeated-invoke
//! aggregator and the subscription lifecycle.

pub mod bounds;
pub mod error;
pub mod interaction;
pub mod invoke;
pub mod registry;
pub mod subscribe;
pub mod value;

pub use bounds::ScalarBounds;
pub use error::{
    ArgumentRangeError, CodecError, Error, ProtocolMismatchError, TransportError,
};
pub use interaction::{MemberPath, ReadRequest, SubscribeRequest, WriteRequest};
pub use invoke::{
    check_response_shape, invoke_repeated, AggregateCompletion, Completion, InvokeRequest,
    InvokeResponse, RepeatAggregator, Transport,
};
pub use registry::{BindingEntry, BindingTarget, OperationKind, Registry, INVALID_CLUSTER_ID};
pub use subscribe::{Subscription, SubscriptionSink};
pub use value::{DecodableList, Value};
