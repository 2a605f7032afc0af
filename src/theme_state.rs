//! Active theme tracking.
//!
//! `ThemeState` owns the single active theme for an application session. It
//! restores the persisted choice on startup, writes every change back to the
//! store and tells subscribers about the change.
use std::fmt;

use log::{debug, error, info, warn};

use crate::{
    KeyValueStore, NoteboxError, Result, StorageNotice, Theme, ThemeRegistry, THEME_KEY,
};

/// Handle returned by [`ThemeState::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

type Listener = Box<dyn FnMut(&Theme)>;

pub struct ThemeState<S: KeyValueStore> {
    store: S,
    active: &'static Theme,
    root_class: String,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: usize,
    notice: Option<StorageNotice>,
    notice_raised: bool,
}

impl<S: KeyValueStore> ThemeState<S> {
    /// Restores the active theme from `store`.
    ///
    /// A missing or unknown stored name, or a store that cannot be read,
    /// yields the default theme. This never fails.
    pub fn init(store: S) -> Self {
        let mut notice = None;
        let active = match store.load(THEME_KEY) {
            Ok(Some(name)) => {
                let theme = ThemeRegistry::by_name(&name);
                if theme.name != name {
                    warn!("Stored theme '{}' is unknown, using '{}'", name, theme.name);
                }
                theme
            }
            Ok(None) => ThemeRegistry::default_theme(),
            Err(e) => {
                error!("Error loading theme: {}", e);
                notice = Some(StorageNotice::new(THEME_KEY, e.to_string()));
                ThemeRegistry::default_theme()
            }
        };

        info!("Active theme: {}", active.name);
        Self {
            store,
            active,
            root_class: active.root_class(),
            listeners: Vec::new(),
            next_subscription: 0,
            notice_raised: notice.is_some(),
            notice,
        }
    }

    /// The currently active theme.
    pub fn get(&self) -> &'static Theme {
        self.active
    }

    /// The class string currently applied to the document root.
    pub fn root_class(&self) -> &str {
        &self.root_class
    }

    /// Makes `theme` the active theme.
    ///
    /// The choice is persisted by name; a failed write is logged and raised
    /// as a notice, and the new theme stays active in memory regardless.
    /// Afterwards the root class is recomputed and every subscriber is called.
    pub fn set(&mut self, theme: &Theme) {
        // Only registry members can become active
        let theme = ThemeRegistry::by_name(theme.name);
        debug!("Switching theme from {} to {}", self.active.name, theme.name);
        self.active = theme;

        if let Err(e) = self.store.save(THEME_KEY, theme.name) {
            error!("Error saving theme '{}': {}", theme.name, e);
            self.raise_notice(&e);
        }

        self.root_class = theme.root_class();
        for (_, listener) in self.listeners.iter_mut() {
            listener(theme);
        }
        info!("Theme set to {}", theme.name);
    }

    /// Activates the theme called `name`, rejecting unknown names.
    pub fn set_by_name(&mut self, name: &str) -> Result<&'static Theme> {
        let theme = ThemeRegistry::get(name).ok_or_else(|| NoteboxError::ThemeNotFound {
            name: name.to_string(),
        })?;
        self.set(theme);
        Ok(theme)
    }

    /// Registers `listener` to be called with the new theme after every `set`.
    pub fn subscribe(&mut self, listener: impl FnMut(&Theme) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// The pending storage warning, if any.
    pub fn notice(&self) -> Option<&StorageNotice> {
        self.notice.as_ref()
    }

    /// Hands out the storage warning. It is raised at most once per session.
    pub fn take_notice(&mut self) -> Option<StorageNotice> {
        self.notice.take()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn raise_notice(&mut self, err: &NoteboxError) {
        if !self.notice_raised {
            self.notice_raised = true;
            self.notice = Some(StorageNotice::new(THEME_KEY, err.to_string()));
        }
    }
}

impl<S: KeyValueStore> fmt::Debug for ThemeState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeState")
            .field("active", &self.active.name)
            .field("root_class", &self.root_class)
            .field("listeners", &self.listeners.len())
            .field("notice", &self.notice)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn init_without_stored_value_uses_default() {
        let state = ThemeState::init(MemoryStore::new());
        assert_eq!(state.get().name, "cosmic");
        assert_eq!(state.root_class(), state.get().root_class());
        assert!(state.notice().is_none());
    }

    #[test]
    fn init_with_unknown_name_uses_default() {
        let store = MemoryStore::new();
        store.save(THEME_KEY, "neon").unwrap();
        assert_eq!(ThemeState::init(&store).get().name, "cosmic");
    }

    #[test]
    fn init_matches_stored_name_exactly() {
        let store = MemoryStore::new();
        store.save(THEME_KEY, " forest\n").unwrap();
        assert_eq!(ThemeState::init(&store).get().name, "cosmic");
        store.save(THEME_KEY, "Forest").unwrap();
        assert_eq!(ThemeState::init(&store).get().name, "cosmic");
    }

    #[test]
    fn init_on_disabled_store_uses_default_and_raises_notice() {
        let mut state = ThemeState::init(MemoryStore::disabled());
        assert_eq!(state.get().name, "cosmic");
        assert_eq!(state.take_notice().unwrap().key, THEME_KEY);
        assert!(state.take_notice().is_none());
    }

    #[test]
    fn set_persists_and_survives_reload() {
        let store = Rc::new(MemoryStore::new());
        let mut state = ThemeState::init(Rc::clone(&store));
        state.set(ThemeRegistry::by_name("sunset"));

        assert_eq!(store.load(THEME_KEY).unwrap().as_deref(), Some("sunset"));
        let reloaded = ThemeState::init(Rc::clone(&store));
        assert_eq!(reloaded.get().name, "sunset");
    }

    #[test]
    fn set_updates_root_class_and_notifies_subscribers() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut state = ThemeState::init(MemoryStore::new());

        let sink = Rc::clone(&seen);
        let id = state.subscribe(move |theme| sink.borrow_mut().push(theme.name));

        state.set(ThemeRegistry::by_name("forest"));
        assert!(state.root_class().contains("text-[#ecfccb]"));

        assert!(state.unsubscribe(id));
        assert!(!state.unsubscribe(id));
        state.set(ThemeRegistry::by_name("sunset"));

        assert_eq!(*seen.borrow(), vec!["forest"]);
    }

    #[test]
    fn failed_write_keeps_new_theme_in_memory() {
        let store = Rc::new(MemoryStore::new());
        let mut state = ThemeState::init(Rc::clone(&store));
        store.set_available(false);

        state.set(ThemeRegistry::by_name("forest"));
        assert_eq!(state.get().name, "forest");
        assert!(state.take_notice().is_some());

        // The notice is one-time
        state.set(ThemeRegistry::by_name("sunset"));
        assert!(state.take_notice().is_none());
        assert_eq!(state.get().name, "sunset");
    }

    #[test]
    fn set_by_name_rejects_unknown_theme() {
        let mut state = ThemeState::init(MemoryStore::new());
        assert!(matches!(
            state.set_by_name("neon"),
            Err(NoteboxError::ThemeNotFound { .. })
        ));
        assert_eq!(state.set_by_name("forest").unwrap().name, "forest");
    }
}
