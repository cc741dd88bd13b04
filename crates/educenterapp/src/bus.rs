//! # Update Channels
//!
//! When a view saves a record it broadcasts the new snapshot; every open view of that entity
//! type converges on it without re-fetching.
//!
//! ## Channels
//!
//! An [`EntityChannel<R>`] carries snapshots of one entity type. Channels are handed out by a
//! [`ChannelRegistry`], which names them `<app>:<entityName>Update` (e.g.
//! `jeducenterApp:studentUpdate`) and returns the same channel for the same entity type.
//! A registry can live for the whole process or for one request; nothing here is global.
//!
//! ## Subscriptions
//!
//! [`EntityChannel::subscribe`] returns a [`Subscription`] token. Dropping the token, or calling
//! [`Subscription::unsubscribe`], removes the listener. A view that keeps its token for exactly
//! its own lifetime can never be called back after teardown.
//!
//! Listeners are snapshotted before delivery, so a listener may subscribe, unsubscribe or publish
//! from inside its callback.

use crate::model::Entity;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::trace;

type Listener<R> = Rc<dyn Fn(&R)>;

struct ChannelInner<R> {
    name: String,
    listeners: RefCell<BTreeMap<u64, Listener<R>>>,
    next_id: Cell<u64>,
}

impl<R> ChannelInner<R> {
    fn remove(&self, id: u64) -> bool {
        self.listeners.borrow_mut().remove(&id).is_some()
    }
}

pub struct EntityChannel<R> {
    inner: Rc<ChannelInner<R>>,
}

impl<R> Clone for EntityChannel<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R: 'static> fmt::Debug for EntityChannel<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityChannel")
            .field("name", &self.inner.name)
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<R: 'static> EntityChannel<R> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(ChannelInner {
                name: name.into(),
                listeners: RefCell::new(BTreeMap::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&R) + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .insert(id, Rc::new(listener));
        trace!(channel = %self.inner.name, id, "subscribed");

        let weak: Weak<ChannelInner<R>> = Rc::downgrade(&self.inner);
        Subscription {
            channel: self.inner.name.clone(),
            release: Some(Box::new(move || {
                weak.upgrade().is_some_and(|inner| inner.remove(id))
            })),
        }
    }

    /// Delivers `payload` to every current listener. Returns how many were called.
    pub fn publish(&self, payload: &R) -> usize {
        let listeners: Vec<Listener<R>> =
            self.inner.listeners.borrow().values().cloned().collect();
        trace!(channel = %self.inner.name, listeners = listeners.len(), "publish");
        for listener in &listeners {
            listener(payload);
        }
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

/// Disposable listener handle. Unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    channel: String,
    release: Option<Box<dyn FnOnce() -> bool>>,
}

impl Subscription {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    /// Removes the listener. Returns false if it was already gone (channel dropped).
    pub fn unsubscribe(mut self) -> bool {
        self.release()
    }

    fn release(&mut self) -> bool {
        match self.release.take() {
            Some(release) => {
                trace!(channel = %self.channel, "unsubscribed");
                release()
            }
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Hands out one update channel per entity type, namespaced by application name.
pub struct ChannelRegistry {
    app: String,
    channels: RefCell<HashMap<String, Rc<dyn Any>>>,
}

impl ChannelRegistry {
    pub fn new(app: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            channels: RefCell::new(HashMap::new()),
        }
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn channel_name<R: Entity>(&self) -> String {
        format!("{}:{}Update", self.app, R::NAME)
    }

    pub fn channel<R: Entity>(&self) -> EntityChannel<R> {
        let name = self.channel_name::<R>();
        let mut channels = self.channels.borrow_mut();
        if let Some(existing) = channels.get(&name) {
            if let Ok(inner) = Rc::clone(existing).downcast::<ChannelInner<R>>() {
                return EntityChannel { inner };
            }
        }
        let channel = EntityChannel::new(name.clone());
        channels.insert(name, Rc::clone(&channel.inner) as Rc<dyn Any>);
        channel
    }
}

impl fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("app", &self.app)
            .field("channels", &self.channels.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LearningType, Student};

    #[test]
    fn test_channel_debug_shows_name_and_listeners() {
        let channel: EntityChannel<Student> = EntityChannel::new("app:studentUpdate");
        let _sub = channel.subscribe(|_| {});
        let out = format!("{channel:?}");
        assert!(out.contains("app:studentUpdate"));
        assert!(out.contains("listeners: 1"));
    }

    #[test]
    fn test_registry_names_channels_by_entity() {
        let registry = ChannelRegistry::new("jeducenterApp");
        assert_eq!(
            registry.channel::<Student>().name(),
            "jeducenterApp:studentUpdate"
        );
        assert_eq!(
            registry.channel::<LearningType>().name(),
            "jeducenterApp:learningTypeUpdate"
        );
    }

    #[test]
    fn test_registry_returns_same_channel() {
        let registry = ChannelRegistry::new("app");
        let a = registry.channel::<Student>();
        let b = registry.channel::<Student>();
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        let _sub = a.subscribe(move |_| counter.set(counter.get() + 1));

        assert_eq!(b.publish(&Student::default()), 1);
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn test_channels_are_scoped_to_entity_type() {
        let registry = ChannelRegistry::new("app");
        let students = registry.channel::<Student>();
        let _sub = students.subscribe(|_| panic!("wrong channel"));
        let types = registry.channel::<LearningType>();
        assert_eq!(types.publish(&LearningType::default()), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let channel: EntityChannel<Student> = EntityChannel::new("test");
        let sub = channel.subscribe(|_| {});
        assert_eq!(channel.listener_count(), 1);
        drop(sub);
        assert_eq!(channel.listener_count(), 0);
    }

    #[test]
    fn test_explicit_unsubscribe() {
        let channel: EntityChannel<Student> = EntityChannel::new("test");
        let sub = channel.subscribe(|_| {});
        assert!(sub.is_active());
        assert!(sub.unsubscribe());
        assert_eq!(channel.publish(&Student::default()), 0);
    }

    #[test]
    fn test_subscription_outliving_channel() {
        let channel: EntityChannel<Student> = EntityChannel::new("test");
        let sub = channel.subscribe(|_| {});
        drop(channel);
        assert!(!sub.unsubscribe());
    }

    #[test]
    fn test_listener_can_unsubscribe_during_publish() {
        let channel: EntityChannel<Student> = EntityChannel::new("test");
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let inner_slot = Rc::clone(&slot);
        let sub = channel.subscribe(move |_| {
            inner_slot.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(sub);

        assert_eq!(channel.publish(&Student::default()), 1);
        assert_eq!(channel.listener_count(), 0);
    }
}
