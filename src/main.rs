use anyhow::Context;
use cat_api::app::CatResolver;
use cat_api::auth::{Claims, JwtAuth, Role};
use cat_api::config::{Config, StorageBackend, StorageConfig, DEFAULT_CONFIG_PATH};
use cat_api::graphql::create_schema;
use cat_api::storage::{CatStore, InMemoryCatStore};
use cat_api::{logging, metrics, server};
use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "cat_api")]
#[command(about = "GraphQL API for cats")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the GraphQL HTTP server
    Serve {
        /// Port to run the server on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Allow serving with the built-in JWT secret (local development only)
        #[arg(long)]
        insecure_dev_secret: bool,
    },
    /// Print a signed bearer token for local testing
    IssueToken {
        #[arg(long)]
        user_id: String,
        #[arg(long, value_enum, default_value_t = RoleArg::User)]
        role: RoleArg,
        /// Lifetime in seconds (defaults to auth.token_ttl_secs)
        #[arg(long)]
        ttl_secs: Option<i64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    User,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::User => Role::User,
            RoleArg::Admin => Role::Admin,
        }
    }
}

async fn build_store(storage: &StorageConfig) -> anyhow::Result<Arc<dyn CatStore>> {
    match storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory cat store");
            Ok(Arc::new(InMemoryCatStore::new()))
        }
        #[cfg(feature = "db")]
        StorageBackend::Libsql => {
            let url = storage
                .url
                .as_deref()
                .context("storage.url or LIBSQL_URL is required for the libsql backend")?;
            let store =
                cat_api::storage::DatabaseCatStore::connect(url, storage.auth_token.clone())
                    .await?;
            info!("Database storage initialized successfully");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "db"))]
        StorageBackend::Libsql => {
            anyhow::bail!("the libsql backend requires building with the `db` feature")
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    let _log_guard = logging::init_logging();

    let config = Config::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config))?;
    let auth = Arc::new(JwtAuth::new(config.auth.jwt_secret.as_bytes()));

    match cli.command {
        Commands::Serve {
            port,
            insecure_dev_secret,
        } => {
            config.auth.ensure_serving_secret(insecure_dev_secret)?;
            if config.auth.uses_dev_secret() {
                warn!("Serving with the development JWT secret; tokens can be forged");
            }
            metrics::init_metrics();

            let store = build_store(&config.storage).await?;
            let schema = create_schema(CatResolver::new(store));
            let app = server::create_server(schema, auth);

            let port = port.unwrap_or(config.server.port);
            let addr: SocketAddr = format!("{}:{}", config.server.host, port)
                .parse()
                .with_context(|| format!("invalid listen address {}:{}", config.server.host, port))?;

            server::start_server(app, addr).await?;
        }
        Commands::IssueToken {
            user_id,
            role,
            ttl_secs,
        } => {
            let ttl = chrono::Duration::seconds(ttl_secs.unwrap_or(config.auth.token_ttl_secs));
            let token = auth.encode(&Claims::new(user_id, role.into(), ttl))?;
            println!("{token}");
        }
    }

    Ok(())
}
