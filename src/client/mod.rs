//! Live Client
//!
//! Owns the document, the channel and the view machinery of one page, and
//! processes everything that happens to it one event at a time.
//!
//! Architecture:
//! ```text
//! ChannelEvent ──► handle() ──► Open    → Hydrator (mount + Subscribe)
//!                            ├► Message → PatchApplier → rediscover
//!                            └► Close   → Channel backoff
//! UserAction ──► interact() ──► simulate → EventBus → Channel::send
//! ```

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::channel::{Backoff, Channel, ChannelError, ChannelEvent, ChannelState, Transport, derive_endpoint};
use crate::config::ClientConfig;
use crate::dom::{Document, DomReconciler, MarkupParser, NodeId, Reconciler, TlParser};
use crate::event::{EventBus, EventCategory, EventError, Interaction, UserAction, perform};
use crate::protocol::{InboundMessage, OutboundMessage, ProtocolError};
use crate::view::{HydrationReport, Hydrator, PatchApplier, ViewError, ViewRegistry};
use crate::{debug, debug_do, log};


#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    Event(#[from] EventError),
}

/// Everything a client needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub endpoint: Url,
    pub backoff: Backoff,
    pub reconnect: bool,
    pub view_attribute: String,
    pub categories: Vec<EventCategory>,
    pub auto_rediscover: bool,
}

impl ClientOptions {
    /// Defaults for a known endpoint.
    pub fn new(endpoint: Url) -> Self {
        Self::from_sections(endpoint, &ClientConfig::default())
    }

    /// Options for `page`, deriving the endpoint from its location.
    pub fn from_config(config: &ClientConfig, page: &Url) -> Result<Self, ChannelError> {
        let endpoint = derive_endpoint(page, &config.channel.route)?;
        Ok(Self::from_sections(endpoint, config))
    }

    fn from_sections(endpoint: Url, config: &ClientConfig) -> Self {
        Self {
            endpoint,
            backoff: config.channel.backoff.policy(),
            reconnect: config.channel.reconnect,
            view_attribute: config.views.attribute.clone(),
            categories: config.events.categories.clone(),
            auto_rediscover: config.views.auto_rediscover,
        }
    }
}

/// What handling a channel event amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    Opened { reconnect: bool, subscribed: usize },
    Rendered { view: String, anchors: usize },
    /// Render for a view with no anchors
    Dropped { view: String },
    Closed { reconnect_in: Option<Duration> },
    /// Event arrived after shutdown
    Ignored,
}

/// Session counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub subscriptions: u64,
    pub renders: u64,
    pub events_sent: u64,
    pub errors: u64,
}

/// One live page.
pub struct LiveClient<T: Transport, P: MarkupParser = TlParser, R: Reconciler = DomReconciler> {
    doc: Document,
    parser: P,
    reconciler: R,
    channel: Channel<T>,
    registry: ViewRegistry,
    hydrator: Hydrator,
    patcher: PatchApplier,
    bus: EventBus,
    auto_rediscover: bool,
    stats: SessionStats,
}

impl<T: Transport> LiveClient<T> {
    /// Client with the default parser and reconciler.
    pub fn with_document(doc: Document, options: ClientOptions) -> Self {
        Self::new(doc, TlParser, DomReconciler::new(), options)
    }
}

impl<T: Transport, P: MarkupParser, R: Reconciler> LiveClient<T, P, R> {
    pub fn new(doc: Document, parser: P, reconciler: R, options: ClientOptions) -> Self {
        Self {
            doc,
            parser,
            reconciler,
            channel: Channel::new(options.endpoint, options.backoff, options.reconnect),
            registry: ViewRegistry::new(),
            hydrator: Hydrator::new(options.view_attribute.clone()),
            patcher: PatchApplier::new(options.view_attribute.clone()),
            bus: EventBus::with_categories(options.view_attribute, options.categories),
            auto_rediscover: options.auto_rediscover,
            stats: SessionStats::default(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn state(&self) -> ChannelState {
        self.channel.state()
    }

    pub fn endpoint(&self) -> &Url {
        self.channel.endpoint()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    #[cfg(test)]
    pub fn reconciler(&self) -> &R {
        &self.reconciler
    }

    /// Whether the driver should connect a new transport now.
    pub fn needs_transport(&self) -> bool {
        self.channel.needs_transport()
    }

    pub fn transport_mut(&mut self) -> Option<&mut T> {
        self.channel.transport_mut()
    }

    /// Current markup of every anchor bound to `view`.
    pub fn view_markup(&self, view: &str) -> Vec<String> {
        self.registry
            .bindings(view)
            .iter()
            .map(|binding| self.doc.inner_html(binding.anchor))
            .collect()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Hand over a connected transport. Call [`LiveClient::handle`] with
    /// [`ChannelEvent::Open`] once it is ready.
    pub fn attach(&mut self, transport: T) -> Result<(), ClientError> {
        self.channel.attach(transport)?;
        Ok(())
    }

    /// Process one event from the channel.
    pub fn handle(&mut self, event: ChannelEvent) -> Result<Handled, ClientError> {
        if self.channel.state().is_closed() {
            debug!("live"; "ignoring {:?} on closed channel", event);
            return Ok(Handled::Ignored);
        }

        match event {
            ChannelEvent::Open => Ok(self.on_open()),
            ChannelEvent::Message(text) => self.on_message(&text).inspect_err(|_| {
                self.stats.errors += 1;
            }),
            ChannelEvent::Close(reason) => Ok(self.on_close(reason.as_deref())),
        }
    }

    fn on_open(&mut self) -> Handled {
        let reconnect = self.channel.opened();
        let report = self.rediscover();
        log!(
            "live";
            "{} {}: {} view(s), {} subscription(s)",
            if reconnect { "reconnected to" } else { "connected to" },
            self.channel.endpoint(),
            self.registry.view_count(),
            report.subscribed
        );
        Handled::Opened {
            reconnect,
            subscribed: report.subscribed,
        }
    }

    fn on_message(&mut self, text: &str) -> Result<Handled, ClientError> {
        let InboundMessage::Render(message) = InboundMessage::from_json(text)?;

        let outcome = self.patcher.apply(
            &mut self.doc,
            &mut self.registry,
            &self.parser,
            &mut self.reconciler,
            &message,
        )?;
        for err in &outcome.errors {
            self.stats.errors += 1;
            log!("error"; "{}", err);
        }
        if outcome.is_dropped() {
            return Ok(Handled::Dropped { view: message.id });
        }

        self.stats.renders += 1;
        debug!(
            "view"; "rendered `{}` into {} anchor(s), {} newly bound",
            message.id, outcome.anchors, outcome.bound
        );
        debug_do! {
            for markup in self.view_markup(&message.id) {
                debug!("view"; "`{}`: {}", message.id, markup);
            }
        }
        if self.auto_rediscover {
            self.rediscover();
        }
        Ok(Handled::Rendered {
            view: message.id,
            anchors: outcome.anchors,
        })
    }

    fn on_close(&mut self, reason: Option<&str>) -> Handled {
        self.registry.clear_subscriptions();
        let reconnect_in = self.channel.closed();
        match (reason, reconnect_in) {
            (_, Some(delay)) => {
                debug!("channel"; "lost ({}), retrying in {:?}", reason.unwrap_or("no reason"), delay)
            }
            (Some(reason), None) => log!("live"; "connection closed: {}", reason),
            (None, None) => log!("live"; "connection closed"),
        }
        Handled::Closed { reconnect_in }
    }

    /// Hydrate anchors not seen before and subscribe anything unsubscribed.
    ///
    /// Runs at every open and, with auto rediscovery, after every render.
    /// Subscribes only go out while the channel is open.
    pub fn rediscover(&mut self) -> HydrationReport {
        let Self {
            doc,
            parser,
            reconciler,
            channel,
            registry,
            hydrator,
            stats,
            ..
        } = self;

        let report = hydrator.hydrate(doc, registry, &*parser, reconciler, |msg| {
            if !channel.state().is_open() {
                return false;
            }
            match channel.send(msg) {
                Ok(()) => true,
                Err(e) => {
                    log!("error"; "subscribe `{}` failed: {}", msg.view(), e);
                    false
                }
            }
        });

        stats.subscriptions += report.subscribed as u64;
        for err in &report.errors {
            stats.errors += 1;
            log!("error"; "{}", err);
        }
        if report.discovered > 0 || report.pruned > 0 {
            debug!(
                "view"; "discovered {}, pruned {}, subscribed {}",
                report.discovered, report.pruned, report.subscribed
            );
        }
        report
    }

    /// Close the channel for good. Idempotent.
    pub fn shutdown(&mut self) {
        if !self.channel.state().is_closed() {
            debug!("live"; "shutting down");
        }
        self.channel.shutdown();
    }

    // =========================================================================
    // Interactions
    // =========================================================================

    /// Perform a user action and forward the interactions it produces.
    ///
    /// Returns the messages sent. Stops at the first failing interaction.
    pub fn interact(&mut self, action: &UserAction) -> Result<Vec<OutboundMessage>, ClientError> {
        let interactions = perform(&mut self.doc, action);
        let mut sent = Vec::new();
        for interaction in interactions {
            if let Some(message) = self.dispatch(interaction)? {
                sent.push(message);
            }
        }
        Ok(sent)
    }

    /// Forward one interaction, if its target declares an event.
    pub fn dispatch(&mut self, interaction: Interaction) -> Result<Option<OutboundMessage>, ClientError> {
        let result = self.try_dispatch(interaction);
        if result.is_err() {
            self.stats.errors += 1;
        }
        result
    }

    fn try_dispatch(&mut self, interaction: Interaction) -> Result<Option<OutboundMessage>, ClientError> {
        let Some(message) = self.bus.dispatch(&self.doc, interaction)? else {
            return Ok(None);
        };
        self.channel.send(&message)?;
        self.stats.events_sent += 1;
        debug!("event"; "{} on {} → {}", interaction.category, interaction.target, message.view());
        Ok(Some(message))
    }

    /// Element with the given `id` attribute.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.doc.element_by_id(id)
    }
}

impl<T: Transport, P: MarkupParser, R: Reconciler> Drop for LiveClient<T, P, R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
