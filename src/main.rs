//! twilens - Inspect Twilio call and message activity across accounts

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use twilens::cli::{AccountsAction, Cli, Command, InactiveArgs, SearchArgs, resolve_range};
use twilens::{Result, TwilensError, aggregation};
use twilens_api::TwilioClient;
use twilens_core::credential_store::CredentialStore;
use twilens_core::filters::RecordFilter;
use twilens_core::registry::AccountRegistry;
use twilens_core::timezone::TimezoneConfig;
use twilens_core::types::{Account, AccountSid, ActivityKind, AuthToken, PhoneNumber, Totals};
use twilens_terminal::{csv, get_formatter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging. The --quiet flag should override RUST_LOG.
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("warn")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::new("twilens=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("twilens=info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let tz_config = TimezoneConfig::from_cli(cli.timezone.as_deref(), cli.utc)?;
    let mut registry = AccountRegistry::new(CredentialStore::load_default()?);

    match cli.command {
        Command::Accounts { action } => run_accounts(&mut registry, action),
        Command::Calls(args) => {
            let account = resolve_account(&mut registry, cli.account.as_deref())?;
            run_search(ActivityKind::Call, args, account, &tz_config, cli.json).await
        }
        Command::Messages(args) => {
            let account = resolve_account(&mut registry, cli.account.as_deref())?;
            run_search(ActivityKind::Message, args, account, &tz_config, cli.json).await
        }
        Command::Numbers => {
            let account = resolve_account(&mut registry, cli.account.as_deref())?;
            run_numbers(account, cli.json).await
        }
        Command::Inactive(args) => {
            let account = resolve_account(&mut registry, cli.account.as_deref())?;
            run_inactive(args, account, &tz_config, cli.json).await
        }
        Command::Config { number } => {
            let account = resolve_account(&mut registry, cli.account.as_deref())?;
            run_config(number, account, cli.json).await
        }
        Command::Events { sid } => {
            let account = resolve_account(&mut registry, cli.account.as_deref())?;
            run_events(sid, account, cli.json).await
        }
    }
}

/// Resolve the account for this invocation
///
/// An explicit `--account` wins; otherwise a store holding exactly one
/// account selects it implicitly.
fn resolve_account(registry: &mut AccountRegistry, selection: Option<&str>) -> Result<Account> {
    let name = match selection {
        Some(name) => name.to_string(),
        None => {
            let names = registry.names();
            match names.as_slice() {
                [only] => only.to_string(),
                _ => return Err(TwilensError::NoAccountSelected),
            }
        }
    };
    registry.set_active(&name)?;
    registry.active()
}

fn run_accounts(registry: &mut AccountRegistry, action: AccountsAction) -> Result<()> {
    match action {
        AccountsAction::Add {
            name,
            sid,
            token,
            overwrite,
        } => {
            let account = Account::new(
                name.clone(),
                AccountSid::parse(&sid)?,
                AuthToken::parse(&token)?,
            );
            registry.add(&account, overwrite)?;
            println!(
                "Saved account '{name}' to {} (auth token stored base64-encoded, not encrypted)",
                registry.store().path().display()
            );
            Ok(())
        }
        AccountsAction::List => {
            if registry.is_empty() {
                println!("No accounts stored; add one with 'twilens accounts add'");
            } else {
                for name in registry.names() {
                    println!("{name}");
                }
            }
            Ok(())
        }
        AccountsAction::Remove { name } => {
            registry.remove(&name)?;
            println!("Removed account '{name}'");
            Ok(())
        }
    }
}

async fn run_search(
    kind: ActivityKind,
    args: SearchArgs,
    account: Account,
    tz_config: &TimezoneConfig,
    json: bool,
) -> Result<()> {
    // Validate everything before the first request goes out
    let number = PhoneNumber::parse(&args.number)?;
    let range = resolve_range(
        args.since.as_deref(),
        args.until.as_deref(),
        chrono::Utc::now().date_naive(),
    )?;

    info!("fetching {kind} for {number}");
    let client = TwilioClient::new(&account)?;
    let fetch = tokio::spawn(async move {
        match kind {
            ActivityKind::Call => client.search_calls(&number, &range).await,
            ActivityKind::Message => client.search_messages(&number, &range).await,
        }
    });
    let results = fetch.await.map_err(|e| TwilensError::Task(e.to_string()))??;

    let mut records = aggregation::combine(results.to, results.from);
    if let Some(text) = args.filter {
        records = RecordFilter::new().with_text(text).apply(records);
    }
    let totals = Totals::from_records(&records);

    let formatter = get_formatter(json);
    println!(
        "{}",
        formatter.format_activity(kind, &records, &totals, &tz_config.tz)
    );

    if let Some(path) = args.csv {
        std::fs::write(&path, csv::activity_csv(kind, &records, &tz_config.tz))?;
        info!("wrote {} rows to {}", records.len(), path.display());
    }
    Ok(())
}

async fn run_numbers(account: Account, json: bool) -> Result<()> {
    let client = TwilioClient::new(&account)?;
    let fetch = tokio::spawn(async move { client.list_numbers().await });
    let numbers = fetch.await.map_err(|e| TwilensError::Task(e.to_string()))??;

    let formatter = get_formatter(json);
    println!("{}", formatter.format_numbers(&numbers));
    Ok(())
}

async fn run_inactive(
    args: InactiveArgs,
    account: Account,
    tz_config: &TimezoneConfig,
    json: bool,
) -> Result<()> {
    let client = TwilioClient::new(&account)?;
    let show_progress = !json && is_terminal::is_terminal(std::io::stdout());

    let scan = tokio::spawn(async move {
        let numbers = client.list_numbers().await?;
        info!("checking {} numbers for activity", numbers.len());

        let progress = if show_progress {
            let pb = ProgressBar::new(numbers.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} numbers")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut activity = HashMap::new();
        for number in &numbers {
            if let Some(pb) = &progress {
                pb.set_message(number.phone_number.clone());
            }
            let last = client
                .last_activity(&PhoneNumber::new(&number.phone_number))
                .await?;
            activity.insert(number.sid.clone(), last);
            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        Ok::<_, TwilensError>((numbers, activity))
    });
    let (numbers, activity) = scan.await.map_err(|e| TwilensError::Task(e.to_string()))??;

    let inactive = aggregation::find_inactive(
        &numbers,
        |n| activity.get(&n.sid).copied().flatten(),
        args.days,
        chrono::Utc::now(),
    );

    let formatter = get_formatter(json);
    println!(
        "{}",
        formatter.format_inactive(&inactive, numbers.len(), args.days, &tz_config.tz)
    );

    if let Some(path) = args.csv {
        std::fs::write(&path, csv::inactive_csv(&inactive, &tz_config.tz))?;
        info!("wrote {} rows to {}", inactive.len(), path.display());
    }
    Ok(())
}

async fn run_config(number: String, account: Account, json: bool) -> Result<()> {
    let number = PhoneNumber::parse(&number)?;
    let client = TwilioClient::new(&account)?;

    let fetch = tokio::spawn(async move {
        let numbers = client.list_numbers().await?;
        let owned = numbers
            .into_iter()
            .find(|n| n.phone_number == number.as_str())
            .ok_or_else(|| TwilensError::NumberNotFound(number.as_str().to_string()))?;
        client.number_config(&owned.sid).await
    });
    let config = fetch.await.map_err(|e| TwilensError::Task(e.to_string()))??;

    let formatter = get_formatter(json);
    println!("{}", formatter.format_number_config(&config));
    Ok(())
}

async fn run_events(sid: String, account: Account, json: bool) -> Result<()> {
    let client = TwilioClient::new(&account)?;
    let formatter = get_formatter(json);

    if sid.starts_with("CA") {
        let fetch = {
            let sid = sid.clone();
            tokio::spawn(async move { client.call_events(&sid).await })
        };
        let events = fetch.await.map_err(|e| TwilensError::Task(e.to_string()))??;
        println!("{}", formatter.format_call_events(&sid, &events));
        Ok(())
    } else if sid.starts_with("SM") || sid.starts_with("MM") {
        let fetch = {
            let sid = sid.clone();
            tokio::spawn(async move { client.message_detail(&sid).await })
        };
        let detail = fetch.await.map_err(|e| TwilensError::Task(e.to_string()))??;
        println!("{}", formatter.format_message_detail(&detail));
        Ok(())
    } else {
        Err(TwilensError::InvalidArgument(format!(
            "'{sid}' is not a call or message SID (expected CA..., SM..., or MM...)"
        )))
    }
}
