//! CLI interface for twilens
//!
//! Defines the command-line surface using clap: account management, call and
//! message search, owned-number listing, inactive-number scanning, number
//! configuration, and record drill-down.
//!
//! # Example
//!
//! ```bash
//! # Store credentials once
//! twilens accounts add prod --sid AC... --token ...
//!
//! # Calls involving a number over the last week
//! twilens calls +19193736940
//!
//! # Messages over an explicit range, exported to CSV
//! twilens messages +19193736940 --since 2024-07-01 --until 2024-07-31 --csv report.csv
//!
//! # Numbers with no activity in 60 days
//! twilens inactive --days 60
//! ```

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use twilens_core::error::{Result, TwilensError};
use twilens_core::types::DateRange;

/// Days covered by a search when no explicit range is given
const DEFAULT_RANGE_DAYS: u64 = 7;

/// Inspect Twilio call and message activity across accounts
#[derive(Parser, Debug, Clone)]
#[command(name = "twilens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Account name to operate as (defaults to the only stored account)
    #[arg(long, short = 'a', global = true, env = "TWILENS_ACCOUNT")]
    pub account: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Timezone for rendering timestamps (e.g. "America/New_York", "UTC")
    /// If not specified, uses the system's local timezone
    #[arg(long, short = 'z', global = true)]
    pub timezone: Option<String>,

    /// Render timestamps in UTC (overrides --timezone)
    #[arg(long, global = true)]
    pub utc: bool,

    /// Only show warnings and errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Show debug output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Arguments shared by the calls and messages searches
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Phone number to search for (E.164 or 10 digits)
    pub number: String,

    /// First day of the range, YYYY-MM-DD (default: 7 days ago)
    #[arg(long)]
    pub since: Option<String>,

    /// Last day of the range, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub until: Option<String>,

    /// Keep only records containing this text in any displayed field
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// Also write the results to a CSV file at this path
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

/// Arguments for the inactive-number scan
#[derive(Args, Debug, Clone)]
pub struct InactiveArgs {
    /// Trailing window in days; numbers silent for longer are inactive
    #[arg(long, default_value_t = 30)]
    pub days: u32,

    /// Also write the report to a CSV file at this path
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

/// Account management actions
#[derive(Subcommand, Debug, Clone)]
pub enum AccountsAction {
    /// Store credentials under a name (kept locally, encoded but NOT encrypted)
    Add {
        /// Unique account name
        name: String,
        /// Account SID (starts with AC)
        #[arg(long)]
        sid: String,
        /// Auth token
        #[arg(long)]
        token: String,
        /// Replace the account if the name is already taken
        #[arg(long)]
        overwrite: bool,
    },
    /// List stored account names
    List,
    /// Delete a stored account
    Remove {
        /// Name of the account to delete
        name: String,
    },
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Manage stored accounts
    Accounts {
        #[command(subcommand)]
        action: AccountsAction,
    },
    /// Search calls to and from a number
    Calls(SearchArgs),
    /// Search messages to and from a number
    Messages(SearchArgs),
    /// List phone numbers owned by the account
    Numbers,
    /// Find numbers with no recent call or message activity
    Inactive(InactiveArgs),
    /// Show the configuration of an owned number
    Config {
        /// Number to inspect (E.164 or 10 digits)
        number: String,
    },
    /// Show the event trail of a call or the full detail of a message
    Events {
        /// Record SID (CA... for calls, SM.../MM... for messages)
        sid: String,
    },
}

/// Parse a YYYY-MM-DD date argument
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| TwilensError::InvalidDate(format!("'{input}' (expected YYYY-MM-DD)")))
}

/// Resolve optional since/until arguments into a validated range
///
/// Defaults to the trailing week ending today.
pub fn resolve_range(
    since: Option<&str>,
    until: Option<&str>,
    today: NaiveDate,
) -> Result<DateRange> {
    let since = match since {
        Some(s) => parse_date(s)?,
        None => today - chrono::Duration::days(DEFAULT_RANGE_DAYS as i64),
    };
    let until = match until {
        Some(s) => parse_date(s)?,
        None => today,
    };
    DateRange::new(since, until)
}
