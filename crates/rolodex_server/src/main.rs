use std::{collections::HashMap, net::SocketAddr, str::FromStr};

use anyhow::Context;
use axum::http::HeaderValue;
use clap::Parser;
use rolodex_core::{
    accounts::{DEFAULT_LIST_CAP, api::Caller, init_service},
    transport::{
        http::{DEFAULT_BODY_LIMIT, DEFAULT_HTTP_PORT, ServerOptions, router},
        identity::{HttpIdentityVerifier, StaticTokenVerifier},
    },
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

#[derive(Parser, Debug)]
#[command(name = "rolodex_server")]
#[command(about = "Rolodex accounts API server")]
struct RolodexServerArgs {
    /// Server address to bind to
    #[arg(short, long, default_value = "0.0.0.0")]
    address: String,

    /// Server port to bind to
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_HTTP_PORT)]
    port: u16,

    /// Store connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Identity provider token-verification endpoint
    #[arg(long, env = "IDENTITY_VERIFY_URL")]
    identity_url: Option<String>,

    /// Identity provider service credential, as inline JSON
    #[arg(long, env = "IDENTITY_CREDENTIALS", hide_env_values = true)]
    identity_credential: Option<String>,

    /// Accept fixed `token=uid[:email]` pairs instead of calling the
    /// identity provider (development and tests only)
    #[arg(long = "static-token")]
    static_tokens: Vec<String>,

    /// Allowed cross-origin request source
    #[arg(long, env = "CORS_ORIGIN")]
    cors_origin: Option<String>,

    /// Hard cap on rows returned by a single listing
    #[arg(long, env = "LIST_ROW_CAP", default_value_t = DEFAULT_LIST_CAP)]
    list_cap: u32,

    /// Request body limit in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = DEFAULT_BODY_LIMIT)]
    body_limit: usize,
}

fn parse_static_tokens(pairs: &[String]) -> anyhow::Result<HashMap<String, Caller>> {
    let mut tokens = HashMap::new();
    for pair in pairs {
        let (token, identity) =
            pair.split_once('=').context("static token must be token=uid[:email]")?;
        let (uid, email) = match identity.split_once(':') {
            Some((uid, email)) => (uid, Some(email.to_string())),
            None => (identity, None),
        };
        tokens.insert(token.to_string(), Caller::new(uid, email));
    }
    Ok(tokens)
}

#[cfg(not(tarpaulin_include))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(feature = "rolodex_tracing")]
    rolodex_core::rolodex_tracing::init();

    let args = RolodexServerArgs::parse();

    let cors_origin = args
        .cors_origin
        .as_deref()
        .map(HeaderValue::from_str)
        .transpose()
        .context("CORS_ORIGIN is not a valid header value")?;
    let options = ServerOptions { cors_origin, body_limit: args.body_limit };

    let connect = SqliteConnectOptions::from_str(&args.database_url)
        .context("DATABASE_URL is not a valid store connection string")?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect)
        .await
        .context("failed to connect to the store")?;
    let accounts = init_service(pool, Some(args.list_cap)).await?;

    let app = if args.static_tokens.is_empty() {
        let verify_url = args
            .identity_url
            .context("IDENTITY_VERIFY_URL is required unless static tokens are configured")?;
        let raw = args
            .identity_credential
            .context("IDENTITY_CREDENTIALS is required unless static tokens are configured")?;
        let credential: serde_json::Value =
            serde_json::from_str(&raw).context("IDENTITY_CREDENTIALS is not valid JSON")?;
        anyhow::ensure!(credential.is_object(), "IDENTITY_CREDENTIALS must be a JSON object");
        router(accounts, HttpIdentityVerifier::new(verify_url, credential), options)
    } else {
        let tokens = parse_static_tokens(&args.static_tokens)?;
        router(accounts, StaticTokenVerifier::new(tokens), options)
    };

    let address: SocketAddr = format!("{}:{}", args.address, args.port)
        .parse()
        .context("invalid listen address")?;
    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!("listening on {address}");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

/// Resolves on Ctrl-C, letting in-flight requests drain before exit.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}
