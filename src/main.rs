use active_until_client::{
    ClientConfig, Delta, DevicePage, PageReload, UpdateClient,
    config::DEFAULT_BASE_URL,
    ui::{render_block_list, render_devices, render_page},
};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(name = "active-until", about = "Adjust how long home-network devices stay active")]
struct Cli {
    /// Base url of the device-management server.
    #[arg(long, env = "ACTIVE_UNTIL_URL", default_value = DEFAULT_BASE_URL)]
    server: String,

    /// Give up on a request after this many seconds. Unbounded when unset.
    #[arg(long, env = "ACTIVE_UNTIL_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Keep a device active for one more hour.
    Extend { ip: String },
    /// Take one hour off a device's active window.
    Retract { ip: String },
    /// Shift a device's active window by an arbitrary duration token, e.g. `30m`.
    Modify {
        ip: String,
        #[arg(allow_hyphen_values = true)]
        delta: String,
    },
    /// Deactivate a device now.
    Block { ip: String },
    /// Activate a device for the given number of hours from now.
    Unblock {
        ip: String,
        #[arg(long)]
        hours: i64,
    },
    /// Register a device with the server.
    Add { ip: String, name: String },
    /// Show the device table.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show which devices the firewall blocks right now.
    BlockList {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let timeout = cli.timeout_secs.map(Duration::from_secs);
    let config = ClientConfig::new(&cli.server)?.with_timeout(timeout);
    info!(server = %config.base_url, "using device server");

    let client = UpdateClient::new(config)?;
    let page = DevicePage::new(client.clone(), PageReload::new(client));

    let task = match cli.command {
        Command::Extend { ip } => Some(page.extend_active_window(&ip)),
        Command::Retract { ip } => Some(page.retract_active_window(&ip)),
        Command::Modify { ip, delta } => Some(page.modify_and_reload(&ip, Delta::new(delta))),
        Command::Block { ip } => Some(page.block(&ip)),
        Command::Unblock { ip, hours } => Some(page.unblock(&ip, hours)),
        Command::Add { ip, name } => Some(page.add_device(&ip, &name)),
        // Explicit reads report failures instead of printing an empty page.
        Command::List { json } => {
            let devices = page.client().device_list().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&devices)?);
            } else if devices.is_empty() {
                println!("no devices");
            } else {
                print!("{}", render_devices(&devices));
            }
            None
        }
        Command::BlockList { json } => {
            let list = page.client().block_list().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                print!("{}", render_block_list(&list));
            }
            None
        }
    };

    if let Some(task) = task {
        task.await?;
        let snapshot = page.refresher().snapshot().await;
        // Generation 0: the update was not applied, or the reload failed.
        if snapshot.generation > 0 {
            print!("{}", render_page(&snapshot));
        }
    }

    Ok(())
}
