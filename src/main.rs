use anyhow::{Context, Result};
use clap::Parser;
use points_exchange::adapters::{
    ConsolePrompt, ConsoleSink, EffectsDecorator, JsonCatalog, MarkupCatalog,
};
use points_exchange::config::{CatalogFormat, CliArgs, ExchangeConfig};
use points_exchange::core::format::format_points;
use points_exchange::domain::model::{ConfirmOutcome, ToggleOutcome};
use points_exchange::domain::ports::ProductCatalogSource;
use points_exchange::utils::{
    logger::{self, LogFormat},
    validation::Validate,
};
use points_exchange::{ProductCatalog, SelectionController};
use std::io::BufRead;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

const TICK: Duration = Duration::from_millis(50);

type Controller = SelectionController<EffectsDecorator<ConsoleSink>>;

enum Flow {
    Continue,
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    let log_format = if args.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(args.verbose, log_format);

    tracing::info!("🚀 Starting points-exchange");

    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            ExchangeConfig::from_file(path)
                .with_context(|| format!("failed to load config file '{}'", path))?
        }
        None => ExchangeConfig::default(),
    };
    args.apply_to(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let catalog_path = config
        .catalog_path()
        .context("no catalog configured; pass --catalog or set catalog.path")?
        .to_string();
    let source = load_catalog(&catalog_path, config.catalog_format())
        .with_context(|| format!("failed to load catalog '{}'", catalog_path))?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be exchanged");
        return print_dry_run(&config, &*source);
    }

    let sink = EffectsDecorator::new(ConsoleSink::new());
    let mut controller =
        SelectionController::init(&*source, sink, config.controller_settings())?;
    controller.sink_mut().mark_loaded();

    run_session(&mut controller).await
}

fn load_catalog(path: &str, format: CatalogFormat) -> Result<Box<dyn ProductCatalogSource>> {
    let source: Box<dyn ProductCatalogSource> = match format {
        CatalogFormat::Markup => Box::new(MarkupCatalog::from_file(path)?),
        CatalogFormat::Json => Box::new(JsonCatalog::from_file(path)?),
    };
    Ok(source)
}

fn print_dry_run(config: &ExchangeConfig, source: &dyn ProductCatalogSource) -> Result<()> {
    let entries = source.entries()?;
    let raw_count = entries.len();
    let catalog = ProductCatalog::from_entries(entries);
    let budget = source
        .available_points()
        .unwrap_or_else(|| config.default_budget());

    println!("📋 Catalog: {:?} ({:?})", config.catalog_path(), config.catalog_format());
    println!(
        "   {} items found, {} usable, budget {} points",
        raw_count,
        catalog.len(),
        format_points(budget)
    );
    for product in catalog.iter() {
        println!(
            "   - {:<20} {:>10} points  {}",
            product.id,
            format_points(product.points),
            product.name.as_deref().unwrap_or("")
        );
    }
    println!(
        "⏱️  Exchange delay {:?}, low-points threshold {}",
        config.exchange_delay(),
        format_points(config.low_points_threshold())
    );
    Ok(())
}

async fn run_session(controller: &mut Controller) -> Result<()> {
    let (tx, mut lines) = mpsc::channel::<String>(16);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    print_help();

    let mut ticker = tokio::time::interval(TICK);
    let mut last_tick = Instant::now();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                controller.advance(now - last_tick);
                last_tick = now;
                report_effects(controller);
            }
            line = lines.recv() => {
                let Some(line) = line else { break };
                match handle_command(controller, line.trim(), &mut lines).await? {
                    Flow::Continue => report_effects(controller),
                    Flow::Quit => break,
                }
            }
        }
    }

    tracing::info!(
        "👋 Session finished with {} exchanges, {} points left",
        controller.history().len(),
        format_points(controller.available_points())
    );
    Ok(())
}

async fn handle_command(
    controller: &mut Controller,
    line: &str,
    lines: &mut mpsc::Receiver<String>,
) -> Result<Flow> {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Ok(Flow::Continue);
    };

    match command {
        "toggle" | "t" => {
            let Some(id) = parts.next() else {
                println!("usage: toggle <product-id>");
                return Ok(Flow::Continue);
            };
            match controller.toggle_selection(id) {
                ToggleOutcome::UnknownProduct => println!("No product '{}'", id),
                ToggleOutcome::Locked => println!("An exchange is processing; please wait"),
                _ => {}
            }
        }
        "confirm" | "c" => {
            let mut prompt = ConsolePrompt::new(lines);
            match controller.confirm_selection(&mut prompt).await {
                ConfirmOutcome::Processing { ticket } => {
                    tracing::debug!("Exchange #{} submitted", ticket);
                }
                ConfirmOutcome::Declined => println!("Exchange cancelled"),
                ConfirmOutcome::EmptySelection => println!("Select at least one product first"),
                ConfirmOutcome::Busy => println!("An exchange is already processing"),
                ConfirmOutcome::NoConfirmControl => println!("Exchanges are not available"),
            }
        }
        "list" | "l" => {
            for product in controller.catalog().iter() {
                println!(
                    "  [{}] {:<20} {:>10} points  {}",
                    if product.selected { "x" } else { " " },
                    product.id,
                    format_points(product.points),
                    product.name.as_deref().unwrap_or("")
                );
            }
        }
        "status" | "s" => {
            println!("{}", serde_json::to_string_pretty(&controller.snapshot())?);
        }
        "history" => {
            println!("{}", serde_json::to_string_pretty(controller.history())?);
        }
        "goto" => {
            let href = parts.next().unwrap_or_default();
            if !controller.sink_mut().scroll_to_anchor(href) {
                println!("usage: goto #anchor");
            }
        }
        "help" | "h" | "?" => print_help(),
        "quit" | "q" | "exit" => return Ok(Flow::Quit),
        other => println!("Unknown command '{}'; type 'help'", other),
    }

    Ok(Flow::Continue)
}

fn report_effects(controller: &mut Controller) {
    for effect in controller.sink_mut().drain_effects() {
        tracing::debug!("✨ {:?}", effect);
    }
}

fn print_help() {
    println!("Commands:");
    println!("  toggle <id>   select or deselect a product (alias: t)");
    println!("  confirm       exchange the selected products (alias: c)");
    println!("  list          show the catalog (alias: l)");
    println!("  status        show budget and selection as JSON (alias: s)");
    println!("  history       show completed exchanges as JSON");
    println!("  goto #anchor  scroll to a section");
    println!("  quit          leave (alias: q)");
}
