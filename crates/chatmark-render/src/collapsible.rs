//! Open/closed state for collapsible sections
//!
//! Sections are either Open or Closed. A forced-collapse section (tool calls
//! by default) starts Closed whatever the default-open preference says; only
//! its own toggle history can open it on mount. Other sections follow the
//! preference until the user toggles them.
//!
//! Toggle history is kept per id and outlives unmounting, so a section that
//! is re-created while a message streams keeps the state the user chose.

use chatmark_config::SectionConfig;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// What caused a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeCause {
    /// A user toggle
    User,
    /// A call from the host, such as a preference change
    Programmatic,
}

/// A transition, passed to listeners
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionChange {
    pub id: String,
    pub open: bool,
    pub cause: ChangeCause,
}

/// State of one mounted section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollapsibleState {
    pub id: String,
    pub is_open: bool,
    /// Initial state ignores the default-open preference
    pub forced_collapsed_type: bool,
    /// Toggles are ignored while set
    pub disabled: bool,
    /// The underlying content has finished streaming
    pub done: bool,
    /// The user has toggled this section
    pub locally_toggled: bool,
}

/// Handle returned by [`CollapsibleController::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

type Listener = Box<dyn FnMut(&SectionChange)>;

/// Owns the state of every section in one render context
pub struct CollapsibleController {
    config: SectionConfig,
    sections: BTreeMap<String, CollapsibleState>,
    history: HashMap<String, bool>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: usize,
}

impl CollapsibleController {
    pub fn new(config: SectionConfig) -> Self {
        Self {
            config,
            sections: BTreeMap::new(),
            history: HashMap::new(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Current section settings
    pub fn config(&self) -> &SectionConfig {
        &self.config
    }

    /// Mount a section, or refresh `done` if it is already mounted
    ///
    /// Initial state is the section's own toggle history when it has one,
    /// Closed for forced-collapse types, and the default-open preference
    /// otherwise.
    pub fn mount(&mut self, id: &str, section_type: &str, done: bool) -> &CollapsibleState {
        if self.sections.contains_key(id) {
            self.set_done(id, done);
        } else {
            let forced = self.config.is_forced_collapse(section_type);
            let toggled = self.history.get(id).copied();
            let is_open = match toggled {
                Some(open) => open,
                None if forced => false,
                None => self.config.details_open_by_default,
            };
            tracing::trace!(id, section_type, forced, is_open, "mounting section");
            self.sections.insert(
                id.to_string(),
                CollapsibleState {
                    id: id.to_string(),
                    is_open,
                    forced_collapsed_type: forced,
                    disabled: false,
                    done,
                    locally_toggled: toggled.is_some(),
                },
            );
        }
        &self.sections[id]
    }

    /// Flip a section; ignored when disabled or not mounted
    ///
    /// Returns the new open state when the section changed.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let state = self.sections.get_mut(id)?;
        if state.disabled {
            tracing::debug!(id, "ignoring toggle of disabled section");
            return None;
        }
        state.is_open = !state.is_open;
        state.locally_toggled = true;
        let open = state.is_open;
        self.history.insert(id.to_string(), open);
        self.notify(id, open, ChangeCause::User);
        Some(open)
    }

    /// Open or close a section from the host
    ///
    /// Does not count as a user toggle. Listeners fire only on an actual
    /// transition.
    pub fn set_open(&mut self, id: &str, open: bool) -> bool {
        let Some(state) = self.sections.get_mut(id) else {
            return false;
        };
        if state.is_open == open {
            return false;
        }
        state.is_open = open;
        self.notify(id, open, ChangeCause::Programmatic);
        true
    }

    /// Record whether the content has finished streaming
    pub fn set_done(&mut self, id: &str, done: bool) {
        if let Some(state) = self.sections.get_mut(id) {
            state.done = done;
        }
    }

    /// Enable or disable toggling
    pub fn set_disabled(&mut self, id: &str, disabled: bool) {
        if let Some(state) = self.sections.get_mut(id) {
            state.disabled = disabled;
        }
    }

    /// Change the default-open preference
    ///
    /// Sections that are neither forced nor toggled follow the new default.
    pub fn set_default_open(&mut self, open: bool) {
        self.config.details_open_by_default = open;
        let followers: Vec<String> = self
            .sections
            .values()
            .filter(|s| !s.forced_collapsed_type && !s.locally_toggled && s.is_open != open)
            .map(|s| s.id.clone())
            .collect();
        for id in followers {
            self.set_open(&id, open);
        }
    }

    /// Remove a section; its toggle history is kept
    pub fn unmount(&mut self, id: &str) -> Option<CollapsibleState> {
        self.sections.remove(id)
    }

    pub fn state(&self, id: &str) -> Option<&CollapsibleState> {
        self.sections.get(id)
    }

    /// Whether a mounted section is open; false when not mounted
    pub fn is_open(&self, id: &str) -> bool {
        self.sections.get(id).is_some_and(|s| s.is_open)
    }

    /// Mounted sections in id order
    pub fn sections(&self) -> impl Iterator<Item = &CollapsibleState> {
        self.sections.values()
    }

    /// Call `listener` on every transition of any section
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&SectionChange) + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns whether it was registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, id: &str, open: bool, cause: ChangeCause) {
        let change = SectionChange {
            id: id.to_string(),
            open,
            cause,
        };
        for (_, listener) in &mut self.listeners {
            listener(&change);
        }
    }
}

impl Default for CollapsibleController {
    fn default() -> Self {
        Self::new(SectionConfig::default())
    }
}

impl std::fmt::Debug for CollapsibleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollapsibleController")
            .field("config", &self.config)
            .field("sections", &self.sections)
            .field("history", &self.history)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
