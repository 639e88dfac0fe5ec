use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

use storefront_facade::config::loader::load_or_default;
use storefront_facade::lifecycle;
use storefront_facade::model::{
    NewOrder, NewProduct, NewUser, OrderPatch, OrderStatus, ProductPatch, UserPatch,
};
use storefront_facade::observability::{FanoutSink, MemorySink, ObservabilitySink};
use storefront_facade::{Api, ApiResult, Envelope};

#[derive(Parser)]
#[command(name = "storefront-cli")]
#[command(about = "Run single operations against the storefront facade", long_about = None)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip the artificial delay.
    #[arg(long)]
    no_delay: bool,

    /// Print the telemetry records emitted by the call.
    #[arg(long)]
    events: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User operations
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Product operations
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Order operations
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    List,
    Get { id: u64 },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "user")]
        role: String,
    },
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },
    Delete { id: u64 },
}

#[derive(Subcommand)]
enum ProductAction {
    List,
    Get { id: u64 },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        price: f64,
        #[arg(long, default_value = "General")]
        category: String,
        #[arg(long, default_value_t = 0)]
        stock: u32,
    },
    Update {
        id: u64,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        stock: Option<u32>,
    },
    Delete { id: u64 },
}

#[derive(Subcommand)]
enum OrderAction {
    List,
    Get { id: u64 },
    /// Create an order from a JSON body ({"userId", "userName", "products", "status"?}).
    Create { json: String },
    Update {
        id: u64,
        #[arg(long, value_parser = parse_status)]
        status: OrderStatus,
    },
    Delete { id: u64 },
}

fn parse_status(raw: &str) -> Result<OrderStatus, String> {
    serde_json::from_value(Value::String(raw.to_lowercase()))
        .map_err(|_| format!("unknown status '{}'", raw))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_or_default(cli.config.as_deref())?;
    if cli.no_delay {
        config.latency.min_ms = 0;
        config.latency.max_ms = 0;
    }
    let app = lifecycle::start(config)?;

    let captured = Arc::new(MemorySink::new());
    if cli.events {
        let telemetry = app.api.telemetry();
        let sinks: Vec<Arc<dyn ObservabilitySink>> = vec![telemetry.sink(), captured.clone()];
        telemetry.install(Arc::new(FanoutSink::new(sinks)));
    }

    let outcome = match cli.command {
        Commands::Users { action } => run_users(&app.api, action).await,
        Commands::Products { action } => run_products(&app.api, action).await,
        Commands::Orders { action } => run_orders(&app.api, action).await,
    };

    match &outcome {
        Ok(value) => println!("{}", serde_json::to_string_pretty(value)?),
        Err(body) => eprintln!("{}", serde_json::to_string_pretty(body)?),
    }

    if cli.events {
        for event in captured.events() {
            println!("{}", serde_json::to_string(&event)?);
        }
    }

    app.stop().await;
    if outcome.is_err() {
        std::process::exit(1);
    }
    Ok(())
}

/// Successful envelope as JSON, or the error body.
fn render<T: Serialize>(result: ApiResult<Envelope<T>>) -> Result<Value, Value> {
    result
        .map(|env| serde_json::json!(env))
        .map_err(|e| serde_json::json!(e.body()))
}

async fn run_users(api: &Api, action: UserAction) -> Result<Value, Value> {
    match action {
        UserAction::List => render(api.users.get_all().await),
        UserAction::Get { id } => render(api.users.get_by_id(id).await),
        UserAction::Create { name, email, role } => {
            render(api.users.create(NewUser { name, email, role }).await)
        }
        UserAction::Update {
            id,
            name,
            email,
            role,
        } => render(api.users.update(id, UserPatch { name, email, role }).await),
        UserAction::Delete { id } => render(api.users.delete(id).await),
    }
}

async fn run_products(api: &Api, action: ProductAction) -> Result<Value, Value> {
    match action {
        ProductAction::List => render(api.products.get_all().await),
        ProductAction::Get { id } => render(api.products.get_by_id(id).await),
        ProductAction::Create {
            name,
            description,
            price,
            category,
            stock,
        } => {
            let draft = NewProduct {
                name,
                description,
                price,
                category,
                stock,
            };
            render(api.products.create(draft).await)
        }
        ProductAction::Update { id, price, stock } => {
            let patch = ProductPatch {
                price,
                stock,
                ..Default::default()
            };
            render(api.products.update(id, patch).await)
        }
        ProductAction::Delete { id } => render(api.products.delete(id).await),
    }
}

async fn run_orders(api: &Api, action: OrderAction) -> Result<Value, Value> {
    match action {
        OrderAction::List => render(api.orders.get_all().await),
        OrderAction::Get { id } => render(api.orders.get_by_id(id).await),
        OrderAction::Update { id, status } => {
            let patch = OrderPatch {
                status: Some(status),
                ..Default::default()
            };
            render(api.orders.update(id, patch).await)
        }
        OrderAction::Create { json } => match serde_json::from_str::<NewOrder>(&json) {
            Ok(draft) => render(api.orders.create(draft).await),
            Err(e) => Err(serde_json::json!({
                "message": format!("invalid order JSON: {}", e),
                "code": "INVALID_INPUT",
            })),
        },
        OrderAction::Delete { id } => render(api.orders.delete(id).await),
    }
}
