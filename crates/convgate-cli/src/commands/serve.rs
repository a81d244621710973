//! Start the gateway server.

use clap::Args;

use convgate_core::error::AppError;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Override the data root
    #[arg(long)]
    pub data_root: Option<String>,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, config_path: &str) -> Result<(), AppError> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref data_root) = args.data_root {
        config.storage.data_root = data_root.clone();
    }
    config.validate()?;

    println!("Starting conversion gateway...");
    println!("  Address:  {}", config.server.bind_address());
    println!("  Data:     {}", config.storage.data_root);
    println!("  Upstream: {}", config.upstream.endpoint);

    convgate_api::run_server(config).await
}
