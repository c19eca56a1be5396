use crate::config::EngineConfig;
use crate::fingerprint::Fingerprint;
use crate::parser::{self, ParseError};
use crate::types::{ChordStep, Key, KeyboardEvent};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

lazy_static::lazy_static! {
    static ref DEFAULT_ALIASES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("space", " ");
        m
    };
}

/// Invoked synchronously with the completing event and the matched command.
pub type Callback = Arc<dyn Fn(&dyn KeyboardEvent, &Command) + Send + Sync>;

/// Wraps a closure as a [`Callback`].
///
/// Registering the same `Callback` clone under several chord strings makes
/// those commands share callback identity, which `unregister_by_id` relies on.
pub fn callback<F>(f: F) -> Callback
where
    F: Fn(&dyn KeyboardEvent, &Command) + Send + Sync + 'static,
{
    Arc::new(f)
}

pub struct Command {
    pub key_string: String,
    pub id: Option<String>,
    pub sequence: Vec<ChordStep>,
    pub callback: Callback,
    pub timeout: Duration,
}

impl Command {
    pub fn first_step(&self) -> ChordStep {
        self.sequence[0]
    }

    pub fn same_callback(&self, other: &Command) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("key_string", &self.key_string)
            .field("id", &self.id)
            .field("sequence", &self.sequence)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// A multi-step command waiting for `command.sequence[step]`.
#[derive(Debug, Clone)]
pub struct OngoingMatch {
    pub command: Arc<Command>,
    pub step: usize,
    pub expires_at: Instant,
}

impl OngoingMatch {
    fn continues_with(&self, fingerprint: Fingerprint, key: Key, now: Instant) -> bool {
        self.command.sequence[self.step].matches(fingerprint, key) && self.expires_at > now
    }
}

#[derive(Default)]
struct EngineState {
    aliases: HashMap<String, String>,
    commands: HashMap<String, Arc<Command>>,
    by_fingerprint_key: HashMap<Fingerprint, HashMap<Key, Vec<Arc<Command>>>>,
    by_id: HashMap<String, Arc<Command>>,
    ongoing: Vec<OngoingMatch>,
}

impl EngineState {
    fn with_default_aliases() -> Self {
        Self {
            aliases: DEFAULT_ALIASES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            ..Self::default()
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    state: EngineState,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: EngineState::with_default_aliases(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.state.aliases
    }

    pub fn commands(&self) -> &HashMap<String, Arc<Command>> {
        &self.state.commands
    }

    pub fn command_by_id(&self, id: &str) -> Option<&Arc<Command>> {
        self.state.by_id.get(id)
    }

    pub fn command_by_key_string(&self, key_string: &str) -> Option<&Arc<Command>> {
        self.state.commands.get(key_string)
    }

    pub fn ongoing(&self) -> &[OngoingMatch] {
        &self.state.ongoing
    }

    /// Parses `key_string` and registers `callback` for it.
    ///
    /// A later registration with the same key string or id replaces the
    /// earlier one in the lookup tables, but every registration stays a
    /// candidate for matching until it is removed.
    pub fn register(
        &mut self,
        key_string: &str,
        callback: Callback,
        id: Option<&str>,
        timeout_ms: Option<u64>,
    ) -> Result<Arc<Command>, ParseError> {
        let sequence = parser::parse_sequence(key_string, &self.state.aliases)?;
        let timeout = timeout_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.config.timeout());

        let command = Arc::new(Command {
            key_string: key_string.to_string(),
            id: id.map(str::to_string),
            sequence,
            callback,
            timeout,
        });

        self.state
            .commands
            .insert(command.key_string.clone(), command.clone());

        let first = command.first_step();
        self.state
            .by_fingerprint_key
            .entry(first.fingerprint)
            .or_default()
            .entry(first.key)
            .or_default()
            .push(command.clone());

        if let Some(id) = &command.id {
            self.state.by_id.insert(id.clone(), command.clone());
        }

        debug!(
            "Registered {:?} (id={:?}, {} steps, timeout {:?})",
            command.key_string,
            command.id,
            command.sequence.len(),
            command.timeout
        );

        Ok(command)
    }

    /// Removes the command registered under `key_string`.
    ///
    /// Earlier registrations shadowed by the same key string are removed as
    /// well, together with their index entries and in-flight progress.
    pub fn unregister(&mut self, key_string: &str) -> Option<Arc<Command>> {
        let command = self.state.commands.remove(key_string)?;

        let mut removed = Vec::new();
        for bucket in self
            .state
            .by_fingerprint_key
            .values_mut()
            .flat_map(|by_key| by_key.values_mut())
        {
            bucket.retain(|candidate| {
                if candidate.key_string == key_string {
                    removed.push(candidate.clone());
                    false
                } else {
                    true
                }
            });
        }

        for stale in &removed {
            if let Some(id) = &stale.id {
                if self
                    .state
                    .by_id
                    .get(id)
                    .is_some_and(|registered| Arc::ptr_eq(registered, stale))
                {
                    self.state.by_id.remove(id);
                }
            }
            self.abandon(stale);
        }

        debug!("Unregistered {:?} ({} registrations)", key_string, removed.len());
        Some(command)
    }

    /// Removes the command registered under `id`. The index entry removed is
    /// the first one in its bucket sharing the command's callback.
    pub fn unregister_by_id(&mut self, id: &str) -> Option<Arc<Command>> {
        let command = self.state.by_id.remove(id)?;

        if self
            .state
            .commands
            .get(&command.key_string)
            .is_some_and(|registered| Arc::ptr_eq(registered, &command))
        {
            self.state.commands.remove(&command.key_string);
        }
        self.unindex(&command, |candidate| candidate.same_callback(&command));
        self.abandon(&command);

        debug!("Unregistered id {:?} ({:?})", id, command.key_string);
        Some(command)
    }

    pub fn alias(&mut self, from: &str, to: &str) {
        debug!("Alias {:?} -> {:?}", from, to);
        self.state.aliases.insert(from.to_string(), to.to_string());
    }

    /// Drops every in-flight sequence. Registrations and aliases are kept.
    pub fn reset(&mut self) {
        if !self.state.ongoing.is_empty() {
            debug!("Reset: abandoning {} ongoing matches", self.state.ongoing.len());
        }
        self.state.ongoing.clear();
    }

    pub fn handle(&mut self, event: &mut dyn KeyboardEvent) -> Option<Vec<String>> {
        self.handle_at(event, Instant::now())
    }

    /// Feeds one key press observed at `now`.
    ///
    /// Returns the ids of the commands that fired, or `None` if no command
    /// with an id fired. Callbacks have already run when this returns.
    pub fn handle_at(&mut self, event: &mut dyn KeyboardEvent, now: Instant) -> Option<Vec<String>> {
        let fingerprint = event.modifiers().fingerprint();
        let key = Key::from_event_key(event.key());

        let previous = std::mem::take(&mut self.state.ongoing);
        let tracked = previous.len();
        let continuing: Vec<OngoingMatch> = match key {
            Some(key) => previous
                .into_iter()
                .filter(|m| m.continues_with(fingerprint, key, now))
                .collect(),
            None => Vec::new(),
        };
        let candidates = key
            .map(|key| self.candidates(fingerprint, key))
            .unwrap_or_default();

        trace!(
            "Event {:?} (fingerprint {}): {}/{} ongoing continue, {} new candidates",
            event.key(),
            fingerprint,
            continuing.len(),
            tracked,
            candidates.len()
        );

        if continuing.is_empty() && candidates.is_empty() {
            return None;
        }

        self.apply_bubbling(event);

        let event: &dyn KeyboardEvent = event;
        let mut fired = Vec::new();
        let mut completed: Vec<Arc<Command>> = Vec::new();

        for ongoing in continuing {
            if completed.iter().any(|c| Arc::ptr_eq(c, &ongoing.command)) {
                continue;
            }
            self.advance_or_run(event, ongoing, now, &mut completed, &mut fired);
        }

        for command in candidates {
            let fresh = OngoingMatch {
                command,
                step: 0,
                expires_at: now,
            };
            self.advance_or_run(event, fresh, now, &mut completed, &mut fired);
        }

        if fired.is_empty() {
            None
        } else {
            Some(fired)
        }
    }

    fn candidates(&self, fingerprint: Fingerprint, key: Key) -> Vec<Arc<Command>> {
        self.state
            .by_fingerprint_key
            .get(&fingerprint)
            .and_then(|by_key| by_key.get(&key))
            .cloned()
            .unwrap_or_default()
    }

    fn advance_or_run(
        &mut self,
        event: &dyn KeyboardEvent,
        mut ongoing: OngoingMatch,
        now: Instant,
        completed: &mut Vec<Arc<Command>>,
        fired: &mut Vec<String>,
    ) {
        ongoing.expires_at = now + ongoing.command.timeout;
        ongoing.step += 1;

        if ongoing.step < ongoing.command.sequence.len() {
            self.state.ongoing.push(ongoing);
            return;
        }

        let command = ongoing.command;
        debug!("Firing {:?} (id={:?})", command.key_string, command.id);
        (command.callback)(event, command.as_ref());

        // A completed command restarts from scratch.
        self.abandon(&command);
        if let Some(id) = &command.id {
            fired.push(id.clone());
        }
        completed.push(command);
    }

    fn apply_bubbling(&self, event: &mut dyn KeyboardEvent) {
        if self.config.prevent_default {
            event.prevent_default();
        }
        if self.config.stop_immediate_propagation {
            event.stop_immediate_propagation();
        }
        if self.config.stop_propagation {
            event.stop_propagation();
        }
    }

    fn unindex(&mut self, command: &Command, same: impl Fn(&Arc<Command>) -> bool) {
        let first = command.first_step();
        let Some(bucket) = self
            .state
            .by_fingerprint_key
            .get_mut(&first.fingerprint)
            .and_then(|by_key| by_key.get_mut(&first.key))
        else {
            return;
        };

        if let Some(pos) = bucket.iter().position(same) {
            bucket.remove(pos);
        }
    }

    fn abandon(&mut self, command: &Arc<Command>) {
        self.state
            .ongoing
            .retain(|m| !Arc::ptr_eq(&m.command, command));
    }
}
