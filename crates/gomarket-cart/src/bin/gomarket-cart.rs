//! # Cart Command-Line Driver
//!
//! Inspects and edits the on-device cart without the app.
//!
//! ## Usage
//! ```bash
//! # Show the cart
//! cargo run -p gomarket-cart -- show
//!
//! # Add a product (price in reais)
//! cargo run -p gomarket-cart -- add 42 "Camiseta" 49.90 https://img/42.png
//!
//! # Adjust quantities
//! cargo run -p gomarket-cart -- inc 42
//! cargo run -p gomarket-cart -- dec 42
//! cargo run -p gomarket-cart -- remove 42
//! cargo run -p gomarket-cart -- clear
//!
//! # Use a specific database or config file
//! cargo run -p gomarket-cart -- --db ./data/gomarket.db --config ./cart.toml show
//! ```

use gomarket_cart::{
    CartConfig, CartStore, CartSummary, HydrationOutcome, LogNavigator, Persistence,
};
use gomarket_core::{Money, NewLineItem};
use gomarket_db::{DbConfig, SqliteStore};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

enum Command {
    Show,
    Add {
        id: String,
        title: String,
        price: String,
        image_url: String,
    },
    Inc(String),
    Dec(String),
    Remove(String),
    Clear,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut positional: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    let command = match parse_command(&positional) {
        Some(command) => command,
        None => {
            print_usage();
            std::process::exit(2);
        }
    };

    let mut config = CartConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.storage.database_path = Some(path);
    }

    let path = config
        .database_path()
        .ok_or("Could not determine app data directory")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let storage = SqliteStore::new(DbConfig::new(&path)).await?;
    let cart = CartStore::new(Arc::new(storage), &config);

    if let HydrationOutcome::Failed(e) = cart.hydrate().await {
        eprintln!("⚠ Stored cart could not be loaded: {}", e);
    }

    let persistence = match command {
        Command::Show => Persistence::Unchanged,
        Command::Add {
            id,
            title,
            price,
            image_url,
        } => {
            let price: f64 = price
                .replace(',', ".")
                .parse()
                .map_err(|_| format!("Invalid price: {}", price))?;
            let item = NewLineItem::new(id, title, image_url, Money::from_major_units(price)?);
            cart.add_to_cart(item).await?
        }
        Command::Inc(id) => cart.increment(&id).await,
        Command::Dec(id) => cart.decrement(&id).await,
        Command::Remove(id) => cart.remove(&id).await,
        Command::Clear => cart.clear().await,
    };

    if let Persistence::Failed { error, .. } = persistence {
        eprintln!("⚠ Change not saved: {}", error);
    }
    if let Persistence::Failed { error, .. } = cart.flush().await {
        eprintln!("⚠ Flush failed: {}", error);
    }

    let format = config.currency_format();
    let items = cart.items();

    println!("Database: {}", path.display());
    println!();
    if items.is_empty() {
        println!("(cart is empty)");
    }
    for item in &items {
        println!(
            "  {:<12} {:<30} {:>4} × {:>12} = {:>12}",
            item.id,
            item.title,
            item.quantity,
            format.format(item.unit_price),
            format.format(item.line_total())
        );
    }

    let summary = CartSummary::new(cart, Arc::new(LogNavigator), format);
    println!();
    println!("{}", summary.display());

    Ok(())
}

fn parse_command(args: &[String]) -> Option<Command> {
    let arg = |n: usize| args.get(n).cloned();

    match args.first()?.as_str() {
        "show" => Some(Command::Show),
        "add" => Some(Command::Add {
            id: arg(1)?,
            title: arg(2)?,
            price: arg(3)?,
            image_url: arg(4).unwrap_or_default(),
        }),
        "inc" => Some(Command::Inc(arg(1)?)),
        "dec" => Some(Command::Dec(arg(1)?)),
        "remove" => Some(Command::Remove(arg(1)?)),
        "clear" => Some(Command::Clear),
        _ => None,
    }
}

fn print_usage() {
    println!("GoMarket Cart");
    println!();
    println!("Usage: gomarket-cart [OPTIONS] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  show                                 Print the cart");
    println!("  add <id> <title> <price> [image_url] Add a product (or one more of it)");
    println!("  inc <id>                             Quantity + 1");
    println!("  dec <id>                             Quantity - 1 (stops at zero)");
    println!("  remove <id>                          Drop the line");
    println!("  clear                                Empty the cart");
    println!();
    println!("Options:");
    println!("  -d, --db <PATH>        Database file (default: app data dir)");
    println!("  -c, --config <PATH>    Config file (default: app config dir)");
    println!("  -h, --help             Show this help message");
}

/// Initializes the tracing subscriber. Logs go to stderr so the cart listing
/// stays clean on stdout.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=gomarket=trace` - Show trace for gomarket crates only
/// - Default: `info,gomarket=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gomarket=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
