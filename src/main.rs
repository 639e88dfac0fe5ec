//! Storefront facade runner.
//!
//! Loads configuration, initializes telemetry and drives the facade the way
//! the dashboard views do: load every collection concurrently, then walk a
//! user through create → update → delete.
//!
//! ```text
//!                  ┌───────────────────────────────────────────────┐
//!   views / CLI    │                 Api                           │
//!  ───────────────▶│  users / products / orders  (Resource<R>)     │
//!                  │        │                                      │
//!                  │        ▼                                      │
//!                  │  instrument: request → delay → faults → store │
//!                  │        │                │                     │
//!                  │        ▼                ▼                     │
//!                  │   Store<R>        Telemetry ──▶ collector     │
//!                  └───────────────────────────────────────────────┘
//! ```
//!
//! With `--watch`, keeps running and applies config file changes until Ctrl-C.

use std::path::PathBuf;

use clap::Parser;

use storefront_facade::config::loader::load_or_default;
use storefront_facade::config::watcher::ConfigWatcher;
use storefront_facade::lifecycle::{self, signals, Shutdown};
use storefront_facade::model::{NewUser, OrderStatus, UserPatch};
use storefront_facade::Api;

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Drive the instrumented storefront facade", long_about = None)]
struct Args {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep running and apply config file changes until Ctrl-C.
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(args.config.as_deref())?;
    let app = lifecycle::start(config)?;

    tracing::info!("storefront-facade v{} starting", env!("CARGO_PKG_VERSION"));

    load_dashboard(&app.api).await;
    run_user_session(&app.api).await;

    if args.watch {
        match args.config.as_deref() {
            Some(path) => {
                let shutdown = Shutdown::new();
                let mut stop = shutdown.subscribe();
                tokio::spawn(signals::shutdown_on_ctrl_c(shutdown.clone()));

                let (watcher, mut updates) = ConfigWatcher::new(path);
                let watcher = watcher.with_current(app.config.clone());
                let _watcher = watcher.run()?;

                loop {
                    tokio::select! {
                        Some(config) = updates.recv() => {
                            app.api.reconfigure(&config);
                            load_dashboard(&app.api).await;
                        }
                        _ = stop.recv() => break,
                    }
                }
            }
            None => tracing::warn!("--watch needs --config, exiting"),
        }
    }

    app.stop().await;
    Ok(())
}

/// Fetch every collection concurrently and summarize it.
async fn load_dashboard(api: &Api) {
    let (users, products, orders) =
        tokio::join!(api.users.get_all(), api.products.get_all(), api.orders.get_all());

    match users {
        Ok(env) => tracing::info!(count = env.data.len(), "Users loaded"),
        Err(e) => tracing::warn!(error = %e, "Failed to load users"),
    }

    match products {
        Ok(env) => {
            let stock: u64 = env.data.iter().map(|p| u64::from(p.stock)).sum();
            tracing::info!(count = env.data.len(), units_in_stock = stock, "Products loaded");
        }
        Err(e) => tracing::warn!(error = %e, "Failed to load products"),
    }

    match orders {
        Ok(env) => {
            let revenue: f64 = env.data.iter().map(|o| o.total).sum();
            let open = env
                .data
                .iter()
                .filter(|o| matches!(o.status, OrderStatus::Pending | OrderStatus::Processing))
                .count();
            tracing::info!(count = env.data.len(), open, revenue, "Orders loaded");
        }
        Err(e) => tracing::warn!(error = %e, "Failed to load orders"),
    }
}

/// Create, promote and delete a user. The delete may hit injected failures.
async fn run_user_session(api: &Api) {
    let draft = NewUser {
        name: "Alice Walker".to_string(),
        email: "alice@example.com".to_string(),
        role: "user".to_string(),
    };

    let created = match api.users.create(draft).await {
        Ok(env) => env.data,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create user");
            return;
        }
    };
    tracing::info!(id = created.id, "User created");

    let promote = UserPatch {
        role: Some("admin".to_string()),
        ..Default::default()
    };
    if let Err(e) = api.users.update(created.id, promote).await {
        tracing::warn!(id = created.id, error = %e, "Failed to update user");
    }

    match api.users.delete(created.id).await {
        Ok(env) => tracing::info!(id = env.data.id, "User deleted"),
        Err(e) => tracing::warn!(id = created.id, error = %e, "Failed to delete user"),
    }
}
