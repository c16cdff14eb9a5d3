//! Read/write/subscribe request shapes shared by generated bindings.

use core::time::Duration;

use crate::value::Value;

/// Path to a readable/subscribable member of a cluster.
///
/// Events have no per-event bindings; they are addressed by id through the
/// same generic paths as attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberPath {
    Attribute(u32),
    Event(u32),
}

/// A read of one attribute or event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    pub cluster_id: u32,
    pub member: MemberPath,
    /// Only meaningful when the member's type is fabric-scoped; `None`
    /// leaves the server default in place.
    pub fabric_filtered: Option<bool>,
}

impl ReadRequest {
    pub fn attribute(cluster_id: u32, attribute_id: u32) -> Self {
        Self {
            cluster_id,
            member: MemberPath::Attribute(attribute_id),
            fabric_filtered: None,
        }
    }

    pub fn event(cluster_id: u32, event_id: u32) -> Self {
        Self {
            cluster_id,
            member: MemberPath::Event(event_id),
            fabric_filtered: None,
        }
    }

    pub fn fabric_filtered(mut self, filtered: bool) -> Self {
        self.fabric_filtered = Some(filtered);
        self
    }
}

/// A write of one attribute value.
///
/// Omitting `data_version` makes the write unconditional; omitting
/// `timed_timeout` makes it untimed.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRequest {
    pub cluster_id: u32,
    pub attribute_id: u32,
    pub value: Value,
    pub data_version: Option<u32>,
    pub timed_timeout: Option<Duration>,
}

impl WriteRequest {
    pub fn new(cluster_id: u32, attribute_id: u32, value: Value) -> Self {
        Self {
            cluster_id,
            attribute_id,
            value,
            data_version: None,
            timed_timeout: None,
        }
    }

    /// Guard the write on a previously observed data version.
    pub fn if_version(mut self, data_version: u32) -> Self {
        self.data_version = Some(data_version);
        self
    }

    pub fn timed(mut self, timeout: Duration) -> Self {
        self.timed_timeout = Some(timeout);
        self
    }
}

/// A subscription to one attribute or event.
///
/// The interval range is mandatory; all flags default to unset, meaning the
/// server default applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeRequest {
    pub cluster_id: u32,
    pub member: MemberPath,
    pub min_interval_secs: u16,
    pub max_interval_secs: u16,
    /// `Some(true)` keeps existing subscriptions; default is replace.
    pub keep_subscriptions: Option<bool>,
    pub fabric_filtered: Option<bool>,
    pub auto_resubscribe: Option<bool>,
}

impl SubscribeRequest {
    pub fn new(
        cluster_id: u32,
        member: MemberPath,
        min_interval_secs: u16,
        max_interval_secs: u16,
    ) -> Self {
        Self {
            cluster_id,
            member,
            min_interval_secs,
            max_interval_secs,
            keep_subscriptions: None,
            fabric_filtered: None,
            auto_resubscribe: None,
        }
    }

    pub fn keep_subscriptions(mut self, keep: bool) -> Self {
        self.keep_subscriptions = Some(keep);
        self
    }

    pub fn fabric_filtered(mut self, filtered: bool) -> Self {
        self.fabric_filtered = Some(filtered);
        self
    }

    pub fn auto_resubscribe(mut self, auto: bool) -> Self {
        self.auto_resubscribe = Some(auto);
        self
    }
}
