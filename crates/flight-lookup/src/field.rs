//! Typed lookup field state machine
//!
//! Keystrokes update the query and re-arm a single debounce timer. When the
//! timer fires (via [`LookupField::tick`]) and the trimmed query is long
//! enough, the field emits a [`LookupRequest`] tagged with a fresh sequence
//! number. Replies are applied only when their sequence number is still the
//! latest one, so a slow reply can never overwrite a newer result.
//!
//! ```text
//! set_query ──▶ [timer armed] ──tick──▶ on_debounce_fire ──▶ LookupRequest{seq}
//!                                                                  │
//!                        apply_reply(LookupReply{seq}) ◀───────────┘
//!                          seq == latest ? replace list : discard
//! ```

use crate::candidate::{Candidate, Category};
use crate::config::LookupConfig;
use crate::debounce::Debouncer;
use crate::error::FailureKind;
use crate::worker::{LookupReply, LookupRequest};
use std::time::Instant;

/// Called once for every committed selection
pub type SelectCallback = Box<dyn FnMut(&Candidate) + Send>;

/// What the input box shows when the user is not typing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Always show the live query text
    #[default]
    Query,
    /// Show the committed selection while the query is empty
    Selection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStatus {
    Idle,
    Pending,
    Ready,
    NoResults,
    Failed(FailureKind),
}

/// Result of offering a reply to the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// A newer request was issued (or the field was reset) after this one
    Stale,
    Disposed,
}

pub struct LookupField {
    category: Category,
    placeholder: String,
    display_mode: DisplayMode,
    min_query_len: usize,

    query: String,
    candidates: Vec<Candidate>,
    highlighted: usize,
    selected: Option<Candidate>,
    status: LookupStatus,
    open: bool,

    timer: Debouncer<String>,
    /// Bumped for every issued request and every invalidation
    latest_seq: u64,
    /// Sequence number of the last reply that changed the list
    applied_seq: u64,
    disposed: bool,

    on_select: Option<SelectCallback>,
}

impl LookupField {
    pub fn new(category: Category, config: &LookupConfig) -> Self {
        Self {
            category,
            placeholder: String::new(),
            display_mode: DisplayMode::default(),
            min_query_len: config.min_query_len,
            query: String::new(),
            candidates: Vec::new(),
            highlighted: 0,
            selected: None,
            status: LookupStatus::Idle,
            open: false,
            timer: Debouncer::new(config.debounce),
            latest_seq: 0,
            applied_seq: 0,
            disposed: false,
            on_select: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_display_mode(mut self, mode: DisplayMode) -> Self {
        self.display_mode = mode;
        self
    }

    pub fn with_selected(mut self, selected: Option<Candidate>) -> Self {
        self.selected = selected;
        self
    }

    pub fn on_select(mut self, callback: impl FnMut(&Candidate) + Send + 'static) -> Self {
        self.on_select = Some(Box::new(callback));
        self
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn selected(&self) -> Option<&Candidate> {
        self.selected.as_ref()
    }

    pub fn status(&self) -> LookupStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    pub fn applied_seq(&self) -> u64 {
        self.applied_seq
    }

    /// When the pending debounce fires, if one is armed
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Replace the query text and re-arm the debounce timer
    pub fn set_query(&mut self, text: impl Into<String>, now: Instant) {
        if self.disposed {
            return;
        }
        self.query = text.into();
        self.open = true;
        self.timer.arm(self.query.clone(), now);
    }

    /// Advance the debounce timer. Returns the lookup to issue, if any.
    pub fn tick(&mut self, now: Instant) -> Option<LookupRequest> {
        if self.disposed {
            return None;
        }
        let (_, text) = self.timer.poll(now)?;
        self.on_debounce_fire(&text)
    }

    /// Debounce expiry for the query `text`. Ignored if the query has changed
    /// since the timer was armed. Only reachable through `tick`, which hands
    /// out each arming once.
    fn on_debounce_fire(&mut self, text: &str) -> Option<LookupRequest> {
        if self.disposed || self.query != text {
            return None;
        }

        let trimmed = text.trim();
        if trimmed.chars().count() < self.min_query_len {
            self.invalidate();
            self.candidates.clear();
            self.highlighted = 0;
            self.status = LookupStatus::Idle;
            return None;
        }

        self.latest_seq += 1;
        self.status = LookupStatus::Pending;
        log::debug!(
            "Issuing {} lookup #{} for '{}'",
            self.category,
            self.latest_seq,
            trimmed
        );

        Some(LookupRequest {
            seq: self.latest_seq,
            category: self.category,
            query: trimmed.to_string(),
        })
    }

    /// Offer a lookup reply. Only the reply to the latest request is applied.
    pub fn apply_reply(&mut self, reply: LookupReply) -> ApplyOutcome {
        if self.disposed {
            return ApplyOutcome::Disposed;
        }
        if reply.seq != self.latest_seq || reply.seq == self.applied_seq {
            log::debug!(
                "Discarding stale {} lookup #{} for '{}' (latest #{})",
                self.category,
                reply.seq,
                reply.query,
                self.latest_seq
            );
            return ApplyOutcome::Stale;
        }

        self.applied_seq = reply.seq;
        self.highlighted = 0;

        match reply.result {
            Ok(candidates) => {
                log::debug!(
                    "{} lookup #{} for '{}': {} candidates in {:?}",
                    self.category,
                    reply.seq,
                    reply.query,
                    candidates.len(),
                    reply.duration
                );
                self.status = if candidates.is_empty() {
                    LookupStatus::NoResults
                } else {
                    LookupStatus::Ready
                };
                self.candidates = candidates;
            }
            Err(e) => {
                log::warn!("{} lookup for '{}' failed: {}", self.category, reply.query, e);
                self.candidates.clear();
                self.status = LookupStatus::Failed(e.kind());
            }
        }

        ApplyOutcome::Applied
    }

    /// Commit to a candidate. `None` is ignored.
    ///
    /// Clears the query, drops any pending or in-flight lookup and notifies
    /// the owner. Returns whether a selection happened.
    pub fn select_candidate(&mut self, candidate: Option<Candidate>) -> bool {
        let Some(candidate) = candidate else {
            return false;
        };
        if self.disposed {
            return false;
        }

        self.timer.cancel();
        self.invalidate();
        self.query.clear();
        self.candidates.clear();
        self.highlighted = 0;
        self.status = LookupStatus::Idle;
        self.open = false;

        if let Some(callback) = self.on_select.as_mut() {
            callback(&candidate);
        }
        self.selected = Some(candidate);
        true
    }

    /// Commit to the highlighted candidate in the open list
    pub fn select_highlighted(&mut self) -> bool {
        let candidate = self.highlighted().cloned();
        self.select_candidate(candidate)
    }

    /// Take over a value pushed down by the owner (form reset, swap).
    ///
    /// Does not notify `on_select` and does not trigger a lookup. Returns
    /// whether the value changed.
    pub fn adopt_external(&mut self, value: Option<Candidate>) -> bool {
        if self.disposed || self.selected == value {
            return false;
        }
        self.selected = value;
        true
    }

    /// Owner-driven reset: clear query, list, timer and selection
    pub fn reset(&mut self) {
        if self.disposed {
            return;
        }
        self.timer.cancel();
        self.invalidate();
        self.query.clear();
        self.candidates.clear();
        self.highlighted = 0;
        self.selected = None;
        self.status = LookupStatus::Idle;
        self.open = false;
    }

    /// Tear down. Later replies and timer fires become no-ops.
    pub fn dispose(&mut self) {
        self.timer.cancel();
        self.open = false;
        self.disposed = true;
    }

    pub fn open(&mut self) {
        if !self.disposed {
            self.open = true;
        }
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn highlighted_index(&self) -> usize {
        self.highlighted
    }

    pub fn highlighted(&self) -> Option<&Candidate> {
        if !self.open {
            return None;
        }
        self.candidates.get(self.highlighted)
    }

    /// Move the highlight, clamped to the list bounds
    pub fn move_highlight(&mut self, delta: isize) {
        if self.candidates.is_empty() {
            return;
        }
        let last = self.candidates.len() - 1;
        self.highlighted = self.highlighted.saturating_add_signed(delta).min(last);
    }

    /// Text for the input box, according to the display mode
    pub fn display_text(&self) -> String {
        match (self.display_mode, &self.selected) {
            (DisplayMode::Selection, Some(selected)) if self.query.is_empty() => {
                selected.display_label()
            }
            _ => self.query.clone(),
        }
    }

    /// Message shown in place of an empty list
    pub fn status_message(&self) -> Option<&'static str> {
        match self.status {
            LookupStatus::Pending if self.candidates.is_empty() => Some("Searching…"),
            LookupStatus::NoResults => Some("No results"),
            LookupStatus::Failed(_) => Some("No results (lookup failed)"),
            _ => None,
        }
    }

    /// Make every in-flight request stale
    fn invalidate(&mut self) {
        self.latest_seq += 1;
    }
}
