use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use shape_client::{ApiError, ClientConfig, HttpShapeApi, MapSession, SessionError, ShapeStore, StoreError};
use shapes::{ShapeId, ShapeInput, Viewport};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("health check failed with HTTP {0}")]
    Unhealthy(u16),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("shape not found: {0}")]
    NotFound(ShapeId),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "tacmap-cli", about = "Map annotation shape store CLI")]
struct Cli {
    #[arg(long, env = "TACMAP_STORE_URL", default_value = shape_client::config::DEFAULT_STORE_URL)]
    base_url: String,

    #[arg(long, env = "TACMAP_SHAPES_PATH", default_value = shape_client::config::DEFAULT_SHAPES_PATH)]
    shapes_path: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Ping,
    /// List every shape in canonical form.
    List,
    Show {
        id: String,
    },
    Create {
        /// Canonical shape payload as JSON.
        #[arg(long)]
        data: String,
    },
    Update {
        id: String,
        #[arg(long)]
        data: String,
    },
    Delete {
        id: String,
    },
    /// Print the map position a shape would be centered on.
    Center {
        id: String,
    },
    /// Summarize what the map would draw.
    Scene,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::new(&cli.base_url, &cli.shapes_path);
    tracing::debug!(url = %config.collection_url(), "shape store endpoint");

    if let Command::Ping = cli.command {
        return run_ping(&config).await;
    }

    let api = HttpShapeApi::new(config)?;
    let mut store = ShapeStore::new(Arc::new(api));

    match cli.command {
        Command::Ping => Ok(()),
        Command::List => {
            let shapes = store.list().await?;
            print_json(&serde_json::to_value(shapes)?)
        }
        Command::Show { id } => {
            let id = ShapeId::new(id);
            store.list().await?;
            let shape = store.get(&id).ok_or_else(|| CliError::NotFound(id.clone()))?;
            print_json(&serde_json::to_value(shape)?)
        }
        Command::Create { data } => {
            let input = serde_json::from_str::<ShapeInput>(&data)?;
            let shape = store.create(&input).await?;
            print_json(&serde_json::to_value(shape)?)
        }
        Command::Update { id, data } => {
            let id = ShapeId::new(id);
            let input = serde_json::from_str::<ShapeInput>(&data)?;
            store.list().await?;
            let shape = store.update(&id, &input).await?;
            print_json(&serde_json::to_value(shape)?)
        }
        Command::Delete { id } => {
            let id = ShapeId::new(id);
            store.delete(&id).await?;
            print_json(&json!({ "success": true, "id": id }))
        }
        Command::Center { id } => {
            let mut session = MapSession::new(store, Viewport::default());
            session.refresh().await?;
            let at = session.center_on(&ShapeId::new(id))?;
            print_json(&serde_json::to_value(at)?)
        }
        Command::Scene => {
            let mut session = MapSession::new(store, Viewport::default());
            session.refresh().await?;
            let summary: Vec<Value> = session
                .scene()
                .iter()
                .map(|d| {
                    json!({
                        "id": d.shape_id,
                        "type": d.kind,
                        "primitives": d.primitives.len(),
                        "label": d.hit_target.label,
                    })
                })
                .collect();
            print_json(&Value::Array(summary))
        }
    }
}

async fn run_ping(config: &ClientConfig) -> Result<(), CliError> {
    let url = format!("{}/healthz", config.base_url);
    let response = reqwest::Client::new().get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Unhealthy(status.as_u16()));
    }
    println!("ok");
    Ok(())
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
