use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::Table;
use flight_lookup::{Candidate, Category, HttpLookupClient, LookupConfig, LookupService};

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// What to look up
    #[arg(value_enum)]
    pub category: Category,

    /// Search text (at least 2 characters)
    pub query: String,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: LookupArgs, config: LookupConfig) -> Result<()> {
    let query = args.query.trim();
    if query.chars().count() < config.min_query_len {
        anyhow::bail!(
            "Query must be at least {} characters, got '{}'",
            config.min_query_len,
            query
        );
    }

    let client = HttpLookupClient::new(config).context("Failed to create lookup client")?;
    let candidates = client
        .lookup(args.category, query)
        .with_context(|| format!("Failed to look up {} '{}'", args.category, query))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
        return Ok(());
    }

    if candidates.is_empty() {
        println!("{}", format!("No {}s match '{}'", args.category, query).dimmed());
        return Ok(());
    }

    println!("{}", candidate_table(args.category, &candidates));
    Ok(())
}

fn candidate_table(category: Category, candidates: &[Candidate]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);

    let label_header = match category {
        Category::Airport => "City",
        Category::Airline => "Country / Group",
    };
    table.set_header(vec!["Code", "Name", label_header]);

    for candidate in candidates {
        table.add_row(vec![
            candidate.code.as_str(),
            candidate.name.as_str(),
            candidate.city.as_deref().unwrap_or_default(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_table() {
        let candidates = vec![
            Candidate::new("JFK", "John F. Kennedy International").with_city("New York"),
            Candidate::new("LGA", "LaGuardia"),
        ];
        let rendered = candidate_table(Category::Airport, &candidates).to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert!(lines[1].contains("Code") && lines[1].contains("City"));
        assert!(lines.iter().any(|l| l.contains("JFK") && l.contains("New York")));
        assert!(lines.iter().any(|l| l.contains("LGA") && l.contains("LaGuardia")));

        let airlines =
            candidate_table(Category::Airline, &[Candidate::new("BA", "British Airways")]);
        assert!(airlines.to_string().contains("Country / Group"));
    }
}
