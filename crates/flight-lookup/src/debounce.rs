//! Single-slot cancellable timer
//!
//! The host loop owns the clock: it calls [`Debouncer::poll`] with the current
//! time, and the timer fires at most once per arming. Re-arming replaces the
//! pending payload, so a superseded arming can never fire.

use std::time::{Duration, Instant};

/// Identifies one arming of a [`Debouncer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Pending<T> {
    handle: TimerHandle,
    deadline: Instant,
    payload: T,
}

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    generation: u64,
    slot: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            slot: None,
        }
    }

    /// Arm the timer to fire `delay` after `now`, replacing any pending arming
    pub fn arm(&mut self, payload: T, now: Instant) -> TimerHandle {
        self.generation += 1;
        let handle = TimerHandle(self.generation);
        self.slot = Some(Pending {
            handle,
            deadline: now + self.delay,
            payload,
        });
        handle
    }

    /// Drop the pending arming, if any. Returns whether something was cancelled.
    pub fn cancel(&mut self) -> bool {
        self.slot.take().is_some()
    }

    /// Whether `handle` is still the pending arming
    pub fn is_live(&self, handle: TimerHandle) -> bool {
        self.slot.as_ref().is_some_and(|p| p.handle == handle)
    }

    pub fn is_armed(&self) -> bool {
        self.slot.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.slot.as_ref().map(|p| p.deadline)
    }

    /// Fire the pending arming if its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<(TimerHandle, T)> {
        if !self.slot.as_ref().is_some_and(|p| p.deadline <= now) {
            return None;
        }
        let pending = self.slot.take()?;
        Some((pending.handle, pending.payload))
    }
}
