//! Subscription lifecycle.
//!
//! A subscription reports "established" exactly once, then zero or more value
//! reports, until it is cancelled or the underlying session ends. Session
//! loss is reported once; re-subscribing is the caller's decision unless
//! auto-resubscribe was requested at subscribe time (a server-default-driven
//! behavior, handled by the transport, not here).

use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::error::TransportError;
use crate::value::Value;

type EstablishedHandler = Box<dyn FnOnce() + Send>;
type ReportHandler = Box<dyn FnMut(Value) + Send>;
type ErrorHandler = Box<dyn FnOnce(TransportError) + Send>;

#[derive(Default)]
struct SinkState {
    established: bool,
    cancelled: bool,
    failed: bool,
    on_established: Option<EstablishedHandler>,
    on_report: Option<ReportHandler>,
    on_error: Option<ErrorHandler>,
}

/// The callback side of one subscription, driven by the transport.
///
/// Handlers are released on cancellation or failure; reports arriving after
/// cancellation is acknowledged are dropped. Handlers are never invoked while
/// the internal lock is held, so transports may call in from any thread.
pub struct SubscriptionSink {
    state: Mutex<SinkState>,
}

impl SubscriptionSink {
    pub fn new(
        on_established: EstablishedHandler,
        on_report: ReportHandler,
        on_error: ErrorHandler,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SinkState {
                on_established: Some(on_established),
                on_report: Some(on_report),
                on_error: Some(on_error),
                ..Default::default()
            }),
        })
    }

    /// The transport acknowledged the subscription. Fires the established
    /// handler exactly once; repeated calls are ignored.
    pub fn established(&self) {
        let handler = {
            let mut state = self.state.lock().expect("sink state");
            if state.established || state.cancelled || state.failed {
                None
            } else {
                state.established = true;
                state.on_established.take()
            }
        };

        if let Some(handler) = handler {
            handler();
        }
    }

    /// Deliver one value report.
    pub fn report(&self, value: Value) {
        // take the handler out so it never runs under the lock
        let handler = {
            let mut state = self.state.lock().expect("sink state");
            if state.cancelled || state.failed || !state.established {
                trace!("dropping report outside the established window");
                None
            } else {
                state.on_report.take()
            }
        };

        let Some(mut handler) = handler else {
            return;
        };
        handler(value);

        // put it back unless the subscription went away while reporting
        let mut state = self.state.lock().expect("sink state");
        if !state.cancelled && !state.failed {
            state.on_report = Some(handler);
        }
    }

    /// The underlying session ended. Reports failure once and releases all
    /// handlers.
    pub fn failed(&self, error: TransportError) {
        let handler = {
            let mut state = self.state.lock().expect("sink state");
            if state.cancelled || state.failed {
                None
            } else {
                state.failed = true;
                state.on_established = None;
                state.on_report = None;
                state.on_error.take()
            }
        };

        if let Some(handler) = handler {
            handler(error);
        }
    }

    fn cancel(&self) {
        let mut state = self.state.lock().expect("sink state");
        state.cancelled = true;
        state.on_established = None;
        state.on_report = None;
        state.on_error = None;
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.lock().expect("sink state").cancelled
    }
}

/// Caller-side handle to a live subscription.
pub struct Subscription {
    sink: Arc<SubscriptionSink>,
}

impl Subscription {
    pub fn new(sink: Arc<SubscriptionSink>) -> Self {
        Self { sink }
    }

    /// Cancel the subscription: releases the registered callbacks; no report
    /// fires after this returns.
    pub fn cancel(&self) {
        self.sink.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_sink() -> (Arc<SubscriptionSink>, Arc<AtomicUsize>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let established = Arc::new(AtomicUsize::new(0));
        let reports = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(AtomicUsize::new(0));

        let sink = SubscriptionSink::new(
            Box::new({
                let established = established.clone();
                move || {
                    established.fetch_add(1, Ordering::SeqCst);
                }
            }),
            Box::new({
                let reports = reports.clone();
                move |_value| {
                    reports.fetch_add(1, Ordering::SeqCst);
                }
            }),
            Box::new({
                let errors = errors.clone();
                move |_error| {
                    errors.fetch_add(1, Ordering::SeqCst);
                }
            }),
        );

        (sink, established, reports, errors)
    }

    #[test]
    fn established_fires_exactly_once() {
        let (sink, established, _, _) = counting_sink();

        sink.established();
        sink.established();

        assert_eq!(established.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reports_flow_after_establishment() {
        let (sink, _, reports, _) = counting_sink();

        // a report before establishment is dropped
        sink.report(Value::Bool(true));
        assert_eq!(reports.load(Ordering::SeqCst), 0);

        sink.established();
        sink.report(Value::Bool(true));
        sink.report(Value::Bool(false));
        assert_eq!(reports.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cancel_suppresses_further_reports() {
        let (sink, _, reports, errors) = counting_sink();
        let subscription = Subscription::new(sink.clone());

        sink.established();
        sink.report(Value::Unsigned(1));
        subscription.cancel();

        sink.report(Value::Unsigned(2));
        sink.failed(TransportError::new("session down"));

        assert_eq!(reports.load(Ordering::SeqCst), 1);
        assert_eq!(errors.load(Ordering::SeqCst), 0);
        assert!(sink.is_cancelled());
    }

    #[test]
    fn session_loss_reports_failure_once() {
        let (sink, _, reports, errors) = counting_sink();

        sink.established();
        sink.failed(TransportError::new("session down"));
        sink.failed(TransportError::new("again"));
        sink.report(Value::Unsigned(1));

        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(reports.load(Ordering::SeqCst), 0);
    }
}
