//! Interactive search form
//!
//! Architecture:
//! - Main thread: handles UI rendering, input events and debounce ticks
//! - One worker thread per field: runs lookups against the remote API
//! - Communication via mpsc channels (request -> worker, reply <- worker)
//!
//! Layout:
//! ```text
//! ┌ From ───────────────────────────────────────────────────────┐
//! │ Paris (PAR)                                                 │
//! ├ To ─────────────────────────────────────────────────────────┤
//! │ lon▏                                                        │
//! ├ Airline ────────────────────────────────────────────────────┤
//! │ Search airlines                                             │
//! ├ Airports [3] ───────────────────────────────────────────────┤
//! │ ▌LHR  London Heathrow · London                              │
//! │  LGW  London Gatwick · London                               │
//! │  LCY  London City · London                                  │
//! └─────────────────────────────────────────────────────────────┘
//!  Tab: next field │ Enter: select │ ^S: swap │ ^R: reset │ Esc: done
//! ```

mod app;
mod ui;

use anyhow::{Context, Result};
use clap::Args;
use flight_lookup::{Candidate, Category, HttpLookupClient, LookupConfig, LookupService};
use serde::Serialize;
use std::sync::Arc;

pub use app::run;

#[derive(Args, Debug)]
pub struct FormArgs {
    /// Pre-fill the origin with this airport code
    #[arg(long, value_name = "CODE")]
    pub origin: Option<String>,

    /// Pre-fill the destination with this airport code
    #[arg(long, value_name = "CODE")]
    pub destination: Option<String>,

    /// Print the chosen values as JSON
    #[arg(long)]
    pub json: bool,
}

/// The three form slots, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Origin,
    Destination,
    Airline,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Origin, Slot::Destination, Slot::Airline];

    pub fn title(&self) -> &'static str {
        match self {
            Slot::Origin => "From",
            Slot::Destination => "To",
            Slot::Airline => "Airline",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Slot::Origin | Slot::Destination => Category::Airport,
            Slot::Airline => Category::Airline,
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Slot::Origin => "Where from?",
            Slot::Destination => "Where to?",
            Slot::Airline => "Any airline",
        }
    }
}

/// Values chosen in the form
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormSummary {
    pub origin: Option<Candidate>,
    pub destination: Option<Candidate>,
    pub airline: Option<Candidate>,
}

impl FormSummary {
    pub fn to_text(&self) -> String {
        let line = |slot: Slot, value: &Option<Candidate>| {
            let shown = value
                .as_ref()
                .map(|c| format!("{} {}", c.code, c.name))
                .unwrap_or_else(|| "-".to_string());
            format!("{:<8} {}", format!("{}:", slot.title()), shown)
        };

        [
            line(Slot::Origin, &self.origin),
            line(Slot::Destination, &self.destination),
            line(Slot::Airline, &self.airline),
        ]
        .join("\n")
    }
}

pub fn execute(args: FormArgs, config: LookupConfig) -> Result<()> {
    let service: Arc<dyn LookupService> = Arc::new(
        HttpLookupClient::new(config.clone()).context("Failed to create lookup client")?,
    );

    let seeds = FormSummary {
        origin: args
            .origin
            .as_deref()
            .and_then(|code| seed_airport(service.as_ref(), code)),
        destination: args
            .destination
            .as_deref()
            .and_then(|code| seed_airport(service.as_ref(), code)),
        airline: None,
    };

    let summary = run(&config, service, seeds)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.to_text());
    }
    Ok(())
}

/// Resolve an airport code to a candidate with a single lookup
fn seed_airport(service: &dyn LookupService, code: &str) -> Option<Candidate> {
    match service.lookup(Category::Airport, code) {
        Ok(candidates) => {
            let found = pick_exact(candidates, code);
            if found.is_none() {
                log::warn!("No airport with code '{}'", code);
            }
            found
        }
        Err(e) => {
            log::warn!("Failed to look up airport '{}': {}", code, e);
            None
        }
    }
}

fn pick_exact(candidates: Vec<Candidate>, code: &str) -> Option<Candidate> {
    candidates
        .into_iter()
        .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flight_lookup::{LookupError, LookupResult};

    #[test]
    fn test_summary_text() {
        let summary = FormSummary {
            origin: Some(Candidate::new("CDG", "Paris Charles de Gaulle").with_city("Paris")),
            destination: Some(Candidate::new("JFK", "John F. Kennedy International")),
            airline: None,
        };
        insta::assert_snapshot!(summary.to_text(), @r"
        From:    CDG Paris Charles de Gaulle
        To:      JFK John F. Kennedy International
        Airline: -
        ");
    }

    #[test]
    fn test_summary_json() {
        let summary = FormSummary {
            airline: Some(Candidate::new("AF", "Air France").with_city("France")),
            ..Default::default()
        };
        insta::assert_snapshot!(
            serde_json::to_string(&summary).unwrap(),
            @r#"{"origin":null,"destination":null,"airline":{"code":"AF","name":"Air France","city":"France"}}"#
        );
    }

    #[test]
    fn test_seed_airport_requires_exact_code() {
        let service = |_: Category, _: &str| -> LookupResult {
            Ok(vec![
                Candidate::new("LHR", "London Heathrow"),
                Candidate::new("LGW", "London Gatwick"),
            ])
        };
        assert_eq!(seed_airport(&service, "lgw").unwrap().code, "LGW");
        assert_eq!(seed_airport(&service, "LON"), None);

        let failing = |_: Category, _: &str| -> LookupResult {
            Err(LookupError::NotAnArray { found: "object" })
        };
        assert_eq!(seed_airport(&failing, "LHR"), None);
    }
}
