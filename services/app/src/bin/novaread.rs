//! services/app/src/bin/novaread.rs

use app_lib::{
    adapters::CatalogSeed,
    config::Config,
    error::AppError,
    runtime::{AppStore, PageView, Shell},
};
use futures::StreamExt;
use novaread_core::domain::ReaderTheme;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

const HELP: &str = "commands: #/<path> | back | forward | theme | reader-theme <dark|light|sepia> \
| login <email> <password> [remember] | register <username> <email> <password> | logout \
| scroll <pct> | suggest <text> | users <filter> | role <user-id> | ban <user-id> \
| dismiss <id> | notifications | quit";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. Starting NovaRead...");

    // --- 2. Seed the Catalog ---
    let seed = match &config.catalog_seed_path {
        Some(path) => {
            info!("Loading catalog seed from {}", path.display());
            CatalogSeed::from_path(path).await?
        }
        None => {
            info!("No CATALOG_SEED_PATH set, using the demo catalog");
            CatalogSeed::demo()
        }
    };
    let store = AppStore::in_memory(config, seed).await?;

    // --- 3. Start the Shell ---
    let mut shell = Shell::new(store, "#/");
    let changes = shell.router().changes();
    tokio::spawn(async move {
        tokio::pin!(changes);
        while let Some(change) = changes.next().await {
            debug!("Route event: {:?} -> {}", change.cause, change.fragment);
        }
    });
    print_json(&shell.start().await)?;
    eprintln!("{}", HELP);

    // --- 4. Command Loop ---
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => continue,
            ["quit"] | ["exit"] => break,
            [fragment] if fragment.starts_with('#') || fragment.starts_with('/') => {
                match shell.navigate(fragment).await {
                    Some(view) => print_json(&view)?,
                    None => eprintln!("already at {}", shell.router().current_fragment()),
                }
            }
            ["back"] => print_or_note(shell.back().await, "no page to go back to")?,
            ["forward"] => print_or_note(shell.forward().await, "no page to go forward to")?,
            ["theme"] => {
                let theme = shell.toggle_theme().await;
                print_json(&theme)?;
            }
            ["reader-theme", theme] => {
                let theme = match *theme {
                    "dark" => ReaderTheme::Dark,
                    "light" => ReaderTheme::Light,
                    "sepia" => ReaderTheme::Sepia,
                    other => {
                        eprintln!("unknown reader theme '{}'", other);
                        continue;
                    }
                };
                if shell.set_reader_theme(theme) {
                    print_current(&shell)?;
                } else {
                    eprintln!("not on a reader page");
                }
            }
            ["login", email, password, rest @ ..] => {
                let remember = rest.first() == Some(&"remember");
                match shell.submit_login(email, password, remember).await {
                    Ok(view) => print_json(&view)?,
                    Err(message) => eprintln!("{}", message),
                }
            }
            ["register", username, email, password] => {
                match shell.submit_register(username, email, password).await {
                    Ok(view) => print_json(&view)?,
                    Err(message) => eprintln!("{}", message),
                }
            }
            ["logout"] => print_json(&shell.logout().await)?,
            ["scroll", pct] => match pct.parse::<f64>() {
                Ok(pct) => match shell.set_scroll_percentage(pct) {
                    Some(pct) => println!("{}", pct),
                    None => eprintln!("not on a reader page"),
                },
                Err(e) => eprintln!("invalid percentage: {}", e),
            },
            ["suggest", text @ ..] => {
                let suggestions = shell.store().catalog.suggest(&text.join(" ")).await?;
                print_json(&suggestions)?;
            }
            ["users", filter @ ..] => {
                if shell.filter_users(&filter.join(" ")) {
                    if let Some(PageView::Admin(admin)) = shell.view() {
                        print_json(&admin.filtered_users())?;
                    }
                } else {
                    eprintln!("not on the admin page");
                }
            }
            ["role", user_id] => {
                if let Some(user) = shell.toggle_user_role(user_id).await {
                    print_json(&user)?;
                }
            }
            ["ban", user_id] => {
                let catalog = shell.store().catalog.clone();
                if let Some(user) = shell.admin(catalog.ban_user(user_id)).await {
                    print_json(&user)?;
                }
            }
            ["dismiss", id] => match Uuid::parse_str(id) {
                Ok(id) => println!("{}", shell.dismiss(id).await),
                Err(e) => eprintln!("invalid notification id: {}", e),
            },
            ["notifications"] => print_json(&shell.store().notifications.snapshot().await)?,
            _ => {
                warn!("Unrecognized command: {}", line);
                eprintln!("{}", HELP);
            }
        }
    }

    info!("Input closed, shutting down.");
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_or_note(view: Option<PageView>, note: &str) -> Result<(), AppError> {
    match view {
        Some(view) => print_json(&view),
        None => {
            eprintln!("{}", note);
            Ok(())
        }
    }
}

fn print_current(shell: &Shell) -> Result<(), AppError> {
    match shell.view() {
        Some(view) => print_json(view),
        None => Ok(()),
    }
}
