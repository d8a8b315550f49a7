//! In-process RAIL transport.
//!
//! Records what would have gone on the wire instead of sending it. Useful
//! for tests and demos; nothing reaches a real server.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

use crate::{
    ChannelLoader, ChannelResult, PluginLoadError, RailClient, RemoteAppSettings,
    orders::{ClientStatusOrder, ExecOrder, HandshakeOrder, SysParamOrder},
    status::{channel_result, rc},
};

/// Kind of client order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderKind {
    Handshake,
    ClientStatus,
    SysParam,
    Execute,
}

/// An order accepted by the loopback client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentOrder {
    Handshake(HandshakeOrder),
    ClientStatus(ClientStatusOrder),
    SysParam(SysParamOrder),
    Execute(ExecOrder),
}

impl SentOrder {
    #[must_use]
    pub const fn kind(&self) -> OrderKind {
        match self {
            Self::Handshake(_) => OrderKind::Handshake,
            Self::ClientStatus(_) => OrderKind::ClientStatus,
            Self::SysParam(_) => OrderKind::SysParam,
            Self::Execute(_) => OrderKind::Execute,
        }
    }
}

/// Recording [`RailClient`].
#[derive(Debug, Default)]
pub struct LoopbackClient {
    sent: Mutex<Vec<SentOrder>>,
    failures: Mutex<HashMap<OrderKind, u32>>,
    latency: Option<Duration>,
    in_flight: AtomicBool,
    overlaps: AtomicUsize,
}

impl LoopbackClient {
    /// Create a client that accepts every order immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client that holds each send for `latency`.
    #[must_use]
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Make every send of `kind` report the raw transport status `code`.
    ///
    /// A code of zero is the OK status and clears an earlier failure.
    pub fn fail_on(&self, kind: OrderKind, code: u32) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, code);
    }

    /// Orders accepted so far, in send order.
    #[must_use]
    pub fn sent(&self) -> Vec<SentOrder> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Kinds of the orders accepted so far.
    #[must_use]
    pub fn sent_kinds(&self) -> Vec<OrderKind> {
        self.sent().iter().map(SentOrder::kind).collect()
    }

    /// Number of sends that started while another was still running.
    #[must_use]
    pub fn overlapping_sends(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    fn record(&self, order: SentOrder) -> ChannelResult {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(latency) = self.latency {
            thread::sleep(latency);
        }

        let status = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&order.kind())
            .copied()
            .unwrap_or(rc::OK);

        let result = channel_result(status);
        if result.is_ok() {
            self.sent
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(order);
        }

        self.in_flight.store(false, Ordering::SeqCst);
        result
    }
}

impl RailClient for LoopbackClient {
    fn client_handshake(&self, order: &HandshakeOrder) -> ChannelResult {
        self.record(SentOrder::Handshake(*order))
    }

    fn client_information(&self, order: &ClientStatusOrder) -> ChannelResult {
        self.record(SentOrder::ClientStatus(*order))
    }

    fn client_system_param(&self, order: &SysParamOrder) -> ChannelResult {
        self.record(SentOrder::SysParam(order.clone()))
    }

    fn client_execute(&self, order: &ExecOrder) -> ChannelResult {
        self.record(SentOrder::Execute(order.clone()))
    }
}

/// [`ChannelLoader`] offering a fixed set of plugins.
#[derive(Debug, Default)]
pub struct LoopbackChannels {
    available: HashSet<String>,
    broken: Mutex<HashMap<String, String>>,
    attempts: Mutex<Vec<String>>,
}

impl LoopbackChannels {
    /// Create a loader offering the given plugins.
    #[must_use]
    pub fn new<I>(available: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            available: available.into_iter().map(Into::into).collect(),
            broken: Mutex::new(HashMap::new()),
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Make the named plugin fail to initialize with `reason`.
    pub fn fail_init(&self, name: impl Into<String>, reason: impl Into<String>) {
        self.broken
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), reason.into());
    }

    /// Plugin names requested so far.
    #[must_use]
    pub fn attempts(&self) -> Vec<String> {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ChannelLoader for LoopbackChannels {
    fn load_channel_plugin(
        &self,
        name: &str,
        _settings: &RemoteAppSettings,
    ) -> Result<(), PluginLoadError> {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(name.to_string());

        if !self.available.contains(name) {
            return Err(PluginLoadError::NotAvailable(name.to_string()));
        }
        match self
            .broken
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            Some(reason) => Err(PluginLoadError::Failed {
                name: name.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}
