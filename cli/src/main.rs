mod commands;

use anyhow::{Context, Result};
use boleto_core::{BoletoStatus, StatusFilter};
use clap::{Parser, Subcommand};
use commands::{BoletoView, RegisterRequest, SummaryCard};
use serde::Serialize;
use std::sync::Arc;
use store::{InitOutcome, KvSlot, MemorySlot, SledSlot, Store, StoreOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "boletos", version, about = "Track Brazilian payment slips")]
struct Cli {
    /// Keep everything in memory; nothing is written to disk
    #[arg(long, global = true)]
    memory: bool,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List boletos, optionally filtered by status and a search query
    List {
        #[arg(short, long)]
        status: Option<BoletoStatus>,
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Register a new boleto
    Add {
        #[arg(long)]
        barcode: String,
        /// Amount as typed in the form, e.g. "R$ 1.234,56"; digits are read as cents
        #[arg(long)]
        amount: String,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due_date: String,
        #[arg(long)]
        issuer: String,
        #[arg(long)]
        description: String,
    },
    /// Change the status of a boleto
    SetStatus { id: String, status: BoletoStatus },
    /// Show one boleto
    Show { id: String },
    /// Count and total per status; pass a status (or "all") for a single card
    Summary { status: Option<StatusFilter> },
    /// Mark pending boletos past their due date as expired
    ExpireOverdue,
    /// Write the current settings to the config file so they can be edited
    InitConfig,
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_store(cfg: &config::AppConfig, memory: bool) -> Result<Store> {
    let slot: Arc<dyn KvSlot> = if memory {
        tracing::info!("Using in-memory slot");
        MemorySlot::new()
    } else {
        SledSlot::open(&cfg.storage.path).with_context(|| {
            format!("Failed to open storage at {}", cfg.storage.path.display())
        })?
    };

    let options = StoreOptions {
        key: cfg.storage.key.clone(),
        audit_log: if memory { None } else { cfg.audit.log_path() },
    };
    let store = Store::initialize(slot, options).context("Failed to initialize boleto store")?;

    match store.outcome() {
        InitOutcome::Loaded => {}
        InitOutcome::Seeded => tracing::info!("No boletos stored yet, added demonstration data"),
        InitOutcome::Recovered(err) => {
            tracing::warn!(error=%err, "Stored boletos were unreadable; kept a copy and reseeded")
        }
    }
    Ok(store)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let cfg = config::load().unwrap_or_else(|e| {
        tracing::warn!(error=%e, "Falling back to default config");
        config::AppConfig::default()
    });
    if let Command::InitConfig = cli.command {
        config::store(&cfg)?;
        println!("{}", config::config_path()?.display());
        return Ok(());
    }

    let mut store = open_store(&cfg, cli.memory)?;

    if cfg.auto_expire_overdue && !matches!(cli.command, Command::ExpireOverdue) {
        let expired = commands::expire_overdue(&mut store)?;
        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "Expired overdue boletos on startup");
        }
    }

    match cli.command {
        Command::List { status, query } => {
            let views = commands::list_boletos(&store, status, query);
            emit(cli.json, views.as_slice(), print_table)?;
        }
        Command::Add {
            barcode,
            amount,
            due_date,
            issuer,
            description,
        } => {
            let view = commands::register_boleto(
                &mut store,
                RegisterRequest {
                    barcode,
                    amount,
                    due_date,
                    issuer,
                    description,
                },
            )?;
            emit(cli.json, &view, print_detail)?;
        }
        Command::SetStatus { id, status } => {
            let view = commands::update_status(&mut store, &id, status)?;
            emit(cli.json, &view, print_detail)?;
        }
        Command::Show { id } => {
            let view = commands::show_boleto(&store, &id)?;
            emit(cli.json, &view, print_detail)?;
        }
        Command::Summary { status } => {
            let cards = match status {
                Some(filter) => vec![commands::summary_for(&store, filter)],
                None => commands::summary(&store),
            };
            emit(cli.json, cards.as_slice(), print_cards)?;
        }
        Command::ExpireOverdue => {
            let views = commands::expire_overdue(&mut store)?;
            emit(cli.json, views.as_slice(), print_table)?;
        }
        Command::InitConfig => unreachable!("handled before the store is opened"),
    }
    Ok(())
}

fn emit<T: Serialize + ?Sized>(json: bool, value: &T, plain: fn(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        plain(value);
    }
    Ok(())
}

fn print_table(views: &[BoletoView]) {
    if views.is_empty() {
        println!("Nenhum boleto encontrado");
        return;
    }
    println!(
        "{:<38} {:<28} {:<24} {:>14} {:<10} {:<9}",
        "ID", "Descrição", "Emissor", "Valor", "Vencimento", "Status"
    );
    for v in views {
        println!(
            "{:<38} {:<28} {:<24} {:>14} {:<10} {:<9}",
            v.id,
            truncate(&v.description, 28),
            truncate(&v.issuer, 24),
            v.amount,
            v.due_date,
            v.status_label
        );
    }
}

fn print_detail(v: &BoletoView) {
    println!("{} [{}]", v.description, v.status_label);
    println!("  ID:             {}", v.id);
    println!("  Emissor:        {}", v.issuer);
    println!("  Valor:          {}", v.amount);
    println!("  Vencimento:     {}", v.due_date);
    println!("  Código:         {}", v.barcode);
    println!("  Criado em:      {}", v.created_at);
    if let Some(paid) = &v.payment_date {
        println!("  Pago em:        {}", paid);
    }
}

fn print_cards(cards: &[SummaryCard]) {
    for card in cards {
        println!("{:<18} {:>4}  {:>16}", card.label, card.count, card.total);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max - 1).collect();
        out.push('…');
        out
    }
}
