use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use da_api::DaConfig;
use da_engine::UploadAssetRequest;
use da_mcp::{DaToolServices, McpHttpServer, resolve_bind_address, serve_stdio};
use da_types::{ResourceLocation, ResponseBody};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "da-mcp", version, about = "MCP server and CLI for the DA content admin API")]
struct Cli {
    #[command(flatten)]
    overrides: ConfigOverrides,
    #[command(subcommand)]
    command: Command,
}

/// Flags that take precedence over the `DA_*` environment variables.
#[derive(Debug, Default, Args)]
struct ConfigOverrides {
    /// Bearer token for the admin APIs (overrides DA_ADMIN_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,
    /// Content admin base URL (overrides DA_ADMIN_BASE)
    #[arg(long, global = true)]
    admin_base: Option<String>,
    /// Preview/publish admin base URL (overrides DA_PIPELINE_BASE)
    #[arg(long, global = true)]
    pipeline_base: Option<String>,
    /// Branch used for preview and publish (overrides DA_GIT_REF)
    #[arg(long, global = true)]
    git_ref: Option<String>,
}

impl ConfigOverrides {
    fn apply(self, mut config: DaConfig) -> Result<DaConfig> {
        if let Some(token) = self.token {
            config = config.with_token(token);
        }
        if let Some(base) = self.admin_base.as_deref() {
            config = config.with_admin_base(base)?;
        }
        if let Some(base) = self.pipeline_base.as_deref() {
            config = config.with_pipeline_base(base)?;
        }
        if let Some(git_ref) = self.git_ref {
            config = config.with_git_ref(git_ref);
        }
        Ok(config)
    }
}

#[derive(Debug, Args)]
struct Target {
    /// Organization name
    org: String,
    /// Repository (site) name
    repo: String,
    /// Resource path relative to the repository root
    path: String,
}

impl Target {
    fn location(&self) -> ResourceLocation {
        ResourceLocation::new(&self.org, &self.repo, &self.path)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the MCP server (stdio unless --http is given)
    Serve {
        /// Serve streamable HTTP on this loopback address, e.g. 127.0.0.1:8765
        #[arg(long, value_name = "ADDR", num_args = 0..=1, default_missing_value = "127.0.0.1:0")]
        http: Option<String>,
    },
    /// List a folder
    List {
        org: String,
        repo: String,
        /// Folder to list; the repository root when omitted
        path: Option<String>,
    },
    /// Print a document or asset
    Get(Target),
    /// Create or overwrite a document from a local file
    Create {
        #[command(flatten)]
        target: Target,
        /// Local file holding the document body
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Delete a document or asset
    Delete(Target),
    /// Upload a local asset, then preview and publish it
    Upload {
        #[command(flatten)]
        target: Target,
        /// Local file to upload
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Trigger a preview build
    Preview(Target),
    /// Publish previewed content
    Publish(Target),
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.overrides.apply(DaConfig::from_env()?)?;
    let services = Arc::new(DaToolServices::from_config(&config)?);
    run(cli.command, services).await
}

/// Logs go to stderr so stdout stays reserved for MCP frames and command output.
fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(command: Command, services: Arc<DaToolServices>) -> Result<()> {
    let content = services.content().clone();
    match command {
        Command::Serve { http: None } => serve_stdio(services).await,
        Command::Serve { http: Some(address) } => serve_http(&address, services).await,
        Command::List { org, repo, path } => print_body(content.list(&org, &repo, path.as_deref()).await?),
        Command::Get(target) => print_body(content.get(&target.location()).await?),
        Command::Create {
            target,
            file,
            content_type,
        } => {
            let body = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            print_body(content.create(&target.location(), &body, content_type.as_deref()).await?)
        }
        Command::Delete(target) => print_body(content.delete(&target.location()).await?),
        Command::Upload {
            target,
            file,
            content_type,
        } => {
            let request = UploadAssetRequest {
                location: target.location(),
                local_path: file,
                content_type,
            };
            let result = services.publisher().upload_asset(&request).await?;
            print_json(&serde_json::to_value(&result)?)
        }
        Command::Preview(target) => print_body(content.preview(&target.location()).await?),
        Command::Publish(target) => print_body(content.publish(&target.location()).await?),
    }
}

async fn serve_http(address: &str, services: Arc<DaToolServices>) -> Result<()> {
    let bind_address = resolve_bind_address(Some(address))?;
    let running = McpHttpServer::new(bind_address, services).start().await?;
    eprintln!("MCP endpoint: http://{}/mcp", running.bound_address());
    tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
    info!(address = %running.bound_address(), "shutting down MCP HTTP server");
    running.stop().await
}

fn print_body(body: ResponseBody) -> Result<()> {
    match body {
        ResponseBody::Text(text) => {
            println!("{text}");
            Ok(())
        }
        ResponseBody::Empty => Ok(()),
        ResponseBody::Json(value) => print_json(&value),
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
