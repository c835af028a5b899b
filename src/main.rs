use tracing::{debug, error, info};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use portal_client::{ClientConfig, ClientError, PortalClient};

const USAGE: &str = "usage: portal-client <status|login <user> <pass>|logout|quick|long|watch>";

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if it exists
    let env_file_path = match dotenvy::dotenv() {
        Ok(path) => Some(path),
        Err(_) => None,
    };

    // Initialize the tracing subscriber for structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                "portal_client=debug,warn".into()
            } else {
                "portal_client=info,warn".into()
            }
        }))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    match env_file_path {
        Some(path) => info!("Loaded environment variables from {}", path.display()),
        None => debug!("No .env file found. Using existing environment variables."),
    };

    if let Err(e) = run().await {
        error!(category = %e.category(), error = %e, "Command failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ClientError> {
    let config = ClientConfig::from_env()?;
    info!(origin = %config.api_origin, "Portal client starting");

    let client = PortalClient::new(config)?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("status") => {
            let logged_in = client.initialize().await;
            println!("logged in: {logged_in}");
        }
        Some("login") => {
            let (username, password) = match (args.get(1), args.get(2)) {
                (Some(u), Some(p)) => (u.clone(), p.clone()),
                _ => {
                    eprintln!("{USAGE}");
                    std::process::exit(2);
                }
            };
            client.initialize().await;
            client.session().login(&username, &password).await?;
            println!("logged in");
        }
        Some("logout") => {
            client.initialize().await;
            client.session().logout().await;
            println!("logged out");
        }
        Some("quick") => {
            let msg = client.api().quick().await?;
            println!("{}", msg.msg);
        }
        Some("long") => {
            let msg = client.api().long().await?;
            println!("{}", msg.msg);
        }
        Some("watch") => {
            // Print the current status, then every transition
            let mut status = client.session().subscribe().await;
            client.initialize().await;
            while let Ok(logged_in) = status.recv().await {
                println!("logged in: {logged_in}");
            }
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}
