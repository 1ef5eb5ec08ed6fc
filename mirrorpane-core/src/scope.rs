//! Lifecycle scope, consumer facade, and change publication
//!
//! One [`StateScope`] exists per UI-process lifetime. It exclusively owns the
//! state store, feeds it the host's message stream, and hands out
//! [`StateHandle`]s, the only surface consumers touch. Handles hold weak
//! references: once the scope is torn down, every facade call fails with
//! [`Error::InactiveScope`] instead of silently serving stale state, because
//! a handle outliving its scope is a wiring bug worth hearing about.
//!
//! Everything is single-threaded and cooperative. Messages are handled to
//! completion one at a time, so store mutations need no locking; publication
//! to observers is an explicit step after each successful mutation, run after
//! the store borrow is released so observers may freely read (or mutate)
//! through their own handles.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::error::{Error, Result};
use crate::message::{HostSink, InboundMessage, OutboundMessage};
use crate::store::{StateStore, StateView};
use crate::types::{ProviderConfig, TelemetrySetting};

/// Identifies one registered observer, for [`StateHandle::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type ObserverFn = Rc<dyn Fn(&StateView)>;

struct Observer {
    id: u64,
    callback: ObserverFn,
}

/// Shared core: the store plus the observer registry.
struct Inner {
    store: RefCell<StateStore>,
    observers: RefCell<Vec<Observer>>,
    next_observer_id: Cell<u64>,
}

impl Inner {
    /// Run one mutation; publish to observers iff it changed the store.
    fn mutate(&self, mutation: impl FnOnce(&mut StateStore) -> bool) {
        let mutated = mutation(&mut *self.store.borrow_mut());
        if mutated {
            self.publish();
        }
    }

    /// Notify every observer with a fresh view.
    ///
    /// Callbacks are cloned out of the registry first, and the view is built
    /// before any callback runs, so observers may subscribe, unsubscribe, or
    /// mutate re-entrantly (a re-entrant mutation simply publishes again).
    fn publish(&self) {
        let view = self.store.borrow().view();
        let callbacks: Vec<ObserverFn> = self
            .observers
            .borrow()
            .iter()
            .map(|observer| observer.callback.clone())
            .collect();
        for callback in callbacks {
            callback(&view);
        }
    }
}

/// Owns the state store for one UI-process lifetime.
///
/// Constructing the scope posts the `ready` signal to the host, exactly
/// once, unconditionally. Dropping it tears the store down and invalidates
/// every outstanding [`StateHandle`].
pub struct StateScope {
    inner: Rc<Inner>,
    host: Rc<dyn HostSink>,
}

impl StateScope {
    /// Create the scope and announce the UI process to the host.
    pub fn new(host: Rc<dyn HostSink>) -> Self {
        let scope = Self {
            inner: Rc::new(Inner {
                store: RefCell::new(StateStore::new()),
                observers: RefCell::new(Vec::new()),
                next_observer_id: Cell::new(0),
            }),
            host,
        };
        // The one outbound message this core ever sends. Fire-and-forget:
        // the host replies (if it is alive) with a full state message.
        scope.host.post(&OutboundMessage::Ready);
        debug!("state scope active, ready signal posted");
        scope
    }

    /// Fold one host message into the store, publishing on change.
    pub fn handle(&self, message: InboundMessage) {
        self.inner.mutate(|store| store.apply(message));
    }

    /// Decode one raw JSON host message and handle it.
    ///
    /// Unrecognized tags are handled (as no-ops) rather than erroring.
    pub fn handle_raw(&self, text: &str) -> Result<()> {
        self.handle(InboundMessage::from_json(text)?);
        Ok(())
    }

    /// A consumer handle onto this scope's state.
    pub fn state(&self) -> StateHandle {
        StateHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// Consumer facade: read the reconciled state, mutate named fields, observe
/// changes.
///
/// Handles are cheap to clone and hold no strong reference, so they never keep
/// a torn-down scope alive. Every method fails with
/// [`Error::InactiveScope`] once the owning [`StateScope`] is dropped.
///
/// Mutators are local-only: they patch the store and publish, but nothing is
/// sent to the host. Pushing a change back to the host is the caller's job,
/// outside this core.
#[derive(Clone)]
pub struct StateHandle {
    inner: Weak<Inner>,
}

impl StateHandle {
    fn upgrade(&self) -> Result<Rc<Inner>> {
        self.inner.upgrade().ok_or(Error::InactiveScope)
    }

    /// The full reconciled state as one read-only view.
    pub fn view(&self) -> Result<StateView> {
        Ok(self.upgrade()?.store.borrow().view())
    }

    /// Register an observer, called with a fresh view after every mutation.
    pub fn subscribe(&self, callback: impl Fn(&StateView) + 'static) -> Result<SubscriptionId> {
        let inner = self.upgrade()?;
        let id = inner.next_observer_id.get();
        inner.next_observer_id.set(id + 1);
        inner.observers.borrow_mut().push(Observer {
            id,
            callback: Rc::new(callback),
        });
        Ok(SubscriptionId(id))
    }

    /// Remove a previously registered observer.
    pub fn unsubscribe(&self, subscription: SubscriptionId) -> Result<()> {
        self.upgrade()?
            .observers
            .borrow_mut()
            .retain(|observer| observer.id != subscription.0);
        Ok(())
    }

    /// Replace the provider configuration.
    pub fn set_provider_config(&self, config: Option<ProviderConfig>) -> Result<()> {
        let inner = self.upgrade()?;
        inner.mutate(|store| {
            store.set_provider_config(config);
            true
        });
        Ok(())
    }

    /// Replace the custom instructions text.
    pub fn set_custom_instructions(&self, value: Option<String>) -> Result<()> {
        let inner = self.upgrade()?;
        inner.mutate(|store| {
            store.set_custom_instructions(value);
            true
        });
        Ok(())
    }

    /// Set the telemetry opt-in state.
    pub fn set_telemetry(&self, value: TelemetrySetting) -> Result<()> {
        let inner = self.upgrade()?;
        inner.mutate(|store| {
            store.set_telemetry(value);
            true
        });
        Ok(())
    }

    /// Set whether the release announcement is still pending.
    pub fn set_show_announcement(&self, value: bool) -> Result<()> {
        let inner = self.upgrade()?;
        inner.mutate(|store| {
            store.set_show_announcement(value);
            true
        });
        Ok(())
    }

    /// Toggle separate model selections for plan and act modes.
    pub fn set_plan_act_separate_models(&self, value: bool) -> Result<()> {
        let inner = self.upgrade()?;
        inner.mutate(|store| {
            store.set_plan_act_separate_models(value);
            true
        });
        Ok(())
    }
}
