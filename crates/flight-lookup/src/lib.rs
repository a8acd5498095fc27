//! Airport and airline lookup-as-you-type.
//!
//! [`LookupField`] turns keystrokes into debounced lookups and applies only
//! the reply to the most recently issued one. Lookups run on a background
//! worker ([`LookupChannel`]) against a [`LookupService`], normally the
//! remote HTTP API via [`HttpLookupClient`].

pub mod candidate;
pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod field;
pub mod worker;

pub use candidate::{Candidate, Category, parse_candidates};
pub use client::{HttpLookupClient, LookupResult, LookupService};
pub use config::LookupConfig;
pub use debounce::{Debouncer, TimerHandle};
pub use error::{ConfigError, FailureKind, LookupError};
pub use field::{ApplyOutcome, DisplayMode, LookupField, LookupStatus, SelectCallback};
pub use worker::{LookupChannel, LookupReply, LookupRequest, spawn_worker};
