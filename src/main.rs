use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use led_indicator::config::{Config, Overrides};
use led_indicator::{client, daemon, panic_handler, service};

#[derive(Parser)]
#[command(name = "led-indicator")]
#[command(author, version, about = "GPIO LED indicator controlled over D-Bus", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Read settings from a TOML file (command-line options still win)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// D-Bus service name [default: com.walbrix.LedIndicatorService]
    #[arg(short = 's', long, global = true)]
    service_name: Option<String>,

    /// D-Bus object path [default: /com/walbrix/LedIndicator]
    #[arg(short = 'o', long, global = true)]
    object_path: Option<String>,

    /// D-Bus interface name [default: com.walbrix.LedIndicator]
    #[arg(short = 'i', long, global = true)]
    interface_name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as D-Bus service
    Service {
        #[command(flatten)]
        line: LedArgs,
    },

    /// Set LED state
    Set {
        /// on, off or blink
        action: String,
    },

    /// Get LED state
    Get,

    /// Print D-Bus policy file
    Policyfile,

    /// Print systemd unit file
    Unitfile {
        #[command(flatten)]
        line: LedArgs,
    },
}

#[derive(Args)]
struct LedArgs {
    /// GPIO chip name [default: gpiochip0]
    #[arg(short, long)]
    chipname: Option<String>,

    /// GPIO line number [default: 13]
    #[arg(short, long)]
    line: Option<u32>,

    /// Blink half-period in milliseconds [default: 500]
    #[arg(long, value_name = "MS")]
    blink_half_period_ms: Option<u64>,

    /// Event loop wait bound in milliseconds, at most half the blink
    /// half-period [default: 100]
    #[arg(long, value_name = "MS")]
    poll_interval_ms: Option<u64>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        let line = match &self.command {
            Commands::Service { line } | Commands::Unitfile { line } => Some(line),
            _ => None,
        };
        Overrides {
            service_name: self.service_name.clone(),
            object_path: self.object_path.clone(),
            interface_name: self.interface_name.clone(),
            chipname: line.and_then(|l| l.chipname.clone()),
            line: line.and_then(|l| l.line),
            blink_half_period_ms: line.and_then(|l| l.blink_half_period_ms),
            poll_interval_ms: line.and_then(|l| l.poll_interval_ms),
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "led_indicator=debug,zbus=info"
    } else {
        "led_indicator=info,zbus=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // stdout carries command output; diagnostics go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::resolve(cli.config.as_deref(), cli.overrides())?;

    match cli.command {
        Commands::Service { .. } => {
            panic_handler::install(config.crash_log.clone());
            info!("Starting LED indicator daemon...");
            daemon::run(&config).await?;
        }

        Commands::Set { action } => {
            let accepted = client::set(&config.bus, &action).await?;
            println!("{}", client::set_result_line(accepted));
            return Ok(client::set_exit_code(accepted));
        }

        Commands::Get => {
            let action = client::get(&config.bus).await?;
            println!("{}", action);
        }

        Commands::Policyfile => {
            println!("{}", service::policy_file(&config.bus));
        }

        Commands::Unitfile { .. } => {
            let executable =
                service::get_executable_path().context("Cannot generate unit file")?;
            let config_file = cli
                .config
                .as_deref()
                .map(|path| path.canonicalize())
                .transpose()
                .context("Cannot resolve config file path")?;
            println!(
                "{}",
                service::unit_file(&executable, &config, config_file.as_deref())
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}
