use std::net::TcpListener;
use std::path::PathBuf;

use anyhow::Context;
use folderbridge_host::config::Config;
use folderbridge_host::server::{self, DESCRIPTOR_PATH};
use folderbridge_protocol::Uri;
use tokio::signal;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command-line overrides on top of config.toml
#[derive(Debug, Default)]
struct Overrides {
    dir: Option<PathBuf>,
    port: Option<u16>,
    bind: Option<String>,
    folder: Option<String>,
}

fn print_help() {
    println!("folderbridge-host - dev server for the local-folder workbench");
    println!();
    println!("USAGE:");
    println!("    folderbridge-host [serve] [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --dir DIR        Directory with index.html and pkg/");
    println!("    --port N         Port to listen on");
    println!("    --bind ADDR      Address to bind");
    println!("    --folder URI     Default folder served in {DESCRIPTOR_PATH}");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version");
    println!();
    println!("CONFIG:");
    println!("    {}", Config::default_config_path().display());
}

fn parse_args(args: &[String]) -> anyhow::Result<Overrides> {
    let mut overrides = Overrides::default();
    let mut i = 1;
    while i < args.len() {
        let value = || {
            args.get(i + 1)
                .cloned()
                .with_context(|| format!("{} needs a value", args[i]))
        };
        match args[i].as_str() {
            "serve" => {
                i += 1;
                continue;
            }
            "--dir" => overrides.dir = Some(PathBuf::from(value()?)),
            "--port" => overrides.port = Some(value()?.parse().context("--port")?),
            "--bind" => overrides.bind = Some(value()?),
            "--folder" => overrides.folder = Some(value()?),
            other => anyhow::bail!("unknown argument {other:?} (see --help)"),
        }
        i += 2;
    }
    Ok(overrides)
}

/// Check if port is available
fn check_port_available(bind: &str, port: u16) -> bool {
    TcpListener::bind(format!("{bind}:{port}")).is_ok()
}

/// Find available port starting from `start`
fn find_available_port(bind: &str, start: u16) -> Option<u16> {
    (start..start.saturating_add(10)).find(|&port| check_port_available(bind, port))
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--version" | "-v") => {
            println!("folderbridge-host {VERSION}");
            return Ok(());
        }
        Some("--help" | "-h") => {
            print_help();
            return Ok(());
        }
        _ => {}
    }
    let overrides = parse_args(&args)?;

    Config::create_default_if_missing();
    let mut config = Config::load();
    tracing::info!(path = %Config::default_config_path().display(), "config loaded");

    if let Some(dir) = overrides.dir {
        config.server.dir = dir;
    }
    if let Some(port) = overrides.port {
        config.server.port = port;
    }
    if let Some(bind) = overrides.bind {
        config.server.bind = bind;
    }
    if let Some(folder) = overrides.folder {
        Uri::parse(&folder).with_context(|| format!("--folder {folder:?}"))?;
        config.workbench.folder_uri = Some(folder);
        config.workbench.workspace_uri = None;
    }

    let descriptor = config.workbench.descriptor()?;
    let bind = config.server.bind.clone();
    let port = if check_port_available(&bind, config.server.port) {
        config.server.port
    } else {
        let alternative = find_available_port(&bind, config.server.port.saturating_add(1))
            .with_context(|| format!("no free port near {}", config.server.port))?;
        tracing::warn!(wanted = config.server.port, using = alternative, "port in use");
        alternative
    };

    let dir = std::fs::canonicalize(&config.server.dir)
        .with_context(|| format!("serving directory {}", config.server.dir.display()))?;
    let app = server::router(descriptor, &dir);

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}")).await?;
    tracing::info!(url = %format!("http://{bind}:{port}/"), dir = %dir.display(), "serving workbench");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
