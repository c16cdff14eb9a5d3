//! Command invocation: the transport seam, response-shape checking and the
//! repeated-invoke aggregator.
//!
//! Each round trip is a suspend point: the request is issued and the
//! completion arrives later, possibly on a different thread or queue. No lock
//! is held across that gap; the aggregator locks only for its own state
//! transition.

use core::time::Duration;
use std::sync::Arc;
use std::sync::Mutex;

use tracing::trace;

use crate::error::{Error, ProtocolMismatchError, TransportError};
use crate::interaction::{ReadRequest, SubscribeRequest, WriteRequest};
use crate::subscribe::SubscriptionSink;
use crate::value::Value;

/// Completion callback of one round trip. May be invoked from any thread.
pub type Completion<T> = Box<dyn FnOnce(Result<T, TransportError>) + Send>;

/// Completion callback of a whole (possibly repeated) operation.
pub type AggregateCompletion = Box<dyn FnOnce(Result<(), Error>) + Send>;

/// One command invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeRequest {
    pub cluster_id: u32,
    pub command_id: u32,
    /// Encoded request payload; `None` for argument-less commands.
    pub payload: Option<Value>,
    /// Timed-invoke deadline; `None` for untimed interactions.
    pub timed_timeout: Option<Duration>,
}

/// What came back for a command invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeResponse {
    /// Response command id, or `None` when the server acknowledged with a
    /// plain status.
    pub command_id: Option<u32>,
    pub payload: Option<Value>,
}

/// The request/response mechanism bindings run against.
///
/// Supplied by the embedding application; opaque to bindings. Completions may
/// run on any thread.
pub trait Transport: Send + Sync {
    fn invoke(&self, request: InvokeRequest, done: Completion<InvokeResponse>);
    fn read(&self, request: ReadRequest, done: Completion<Option<Value>>);
    fn write(&self, request: WriteRequest, done: Completion<()>);
    fn subscribe(&self, request: SubscribeRequest, sink: Arc<SubscriptionSink>);
}

/// Validate the shape of an invoke response.
///
/// A command declaring a specific response must see exactly that response; a
/// success framed as the wrong response type is a protocol error, not a
/// success. Status-only commands accept any acknowledgement without decoding.
pub fn check_response_shape(
    expected: Option<u32>,
    response: &InvokeResponse,
) -> Result<(), ProtocolMismatchError> {
    match expected {
        Some(expected) if response.command_id != Some(expected) => Err(ProtocolMismatchError {
            expected,
            actual: response.command_id,
        }),
        _ => Ok(()),
    }
}

enum AggState {
    Pending {
        remaining: usize,
        last_error: Option<Error>,
    },
    Completed,
}

/// Aggregates N pipelined round trips into exactly one completion.
///
/// Transitions: `Pending(remaining)` decrements per round trip, retaining the
/// most recent error; when the count reaches zero the terminal transition
/// fires the aggregate callback once. Late or extra completions are ignored.
pub struct RepeatAggregator {
    state: Mutex<AggState>,
    on_done: Mutex<Option<AggregateCompletion>>,
}

impl RepeatAggregator {
    /// `total` is the number of round trips that will be issued; must be > 0.
    pub fn new(total: usize, on_done: AggregateCompletion) -> Arc<Self> {
        assert!(total > 0, "an invoke issues at least one round trip");

        Arc::new(Self {
            state: Mutex::new(AggState::Pending {
                remaining: total,
                last_error: None,
            }),
            on_done: Mutex::new(Some(on_done)),
        })
    }

    /// Record the completion of one round trip.
    pub fn complete_one(&self, result: Result<(), Error>) {
        let finished = {
            let mut state = self.state.lock().expect("aggregator state");
            match &mut *state {
                AggState::Pending {
                    remaining,
                    last_error,
                } => {
                    if let Err(e) = result {
                        trace!(error = %e, "round trip failed");
                        *last_error = Some(e);
                    }
                    *remaining -= 1;

                    if *remaining == 0 {
                        let outcome = match core::mem::replace(&mut *state, AggState::Completed) {
                            AggState::Pending { last_error, .. } => last_error,
                            AggState::Completed => unreachable!(),
                        };
                        Some(outcome)
                    } else {
                        None
                    }
                }
                AggState::Completed => None,
            }
        };

        // terminal transition: fire the aggregate callback outside the lock
        if let Some(last_error) = finished {
            if let Some(on_done) = self.on_done.lock().expect("aggregator callback").take() {
                on_done(match last_error {
                    None => Ok(()),
                    Some(e) => Err(e),
                });
            }
        }
    }
}

/// Issue the same invoke `repeat` times, pipelined, reporting one aggregate
/// completion after the last round trip finishes.
pub fn invoke_repeated(
    transport: &dyn Transport,
    request: InvokeRequest,
    expected_response: Option<u32>,
    repeat: usize,
    on_done: AggregateCompletion,
) {
    let aggregator = RepeatAggregator::new(repeat.max(1), on_done);

    for _ in 0..repeat.max(1) {
        let aggregator = aggregator.clone();
        transport.invoke(
            request.clone(),
            Box::new(move |result| {
                let outcome = result.map_err(Error::from).and_then(|response| {
                    check_response_shape(expected_response, &response).map_err(Error::from)
                });
                aggregator.complete_one(outcome);
            }),
        );
    }
}
