use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dingrelay")]
#[command(about = "Relay webhook alerts to DingTalk robots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file (left alone if it exists).
    Init {
        /// Config file path (default: DINGRELAY_CONFIG_PATH or ~/.dingrelay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the relay: POST /webhook/{access_token} with {"text": "..."} is forwarded to DingTalk.
    Serve {
        /// Config file path (default: DINGRELAY_CONFIG_PATH or ~/.dingrelay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Listen port (default from config or 8080)
        #[arg(long, short)]
        port: Option<u16>,

        /// Bind address (default from config or 0.0.0.0)
        #[arg(long, short, value_name = "ADDR")]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("dingrelay {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port, bind }) => {
            if let Err(e) = run_serve(config, port, bind).await {
                log::error!("relay failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(dingtalk_relay::config::default_config_path);
    let dir = dingtalk_relay::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
    bind: Option<String>,
) -> anyhow::Result<()> {
    let (mut config, path) = dingtalk_relay::config::load_config(config_path)?;
    config.server.apply_overrides(port, bind);
    log::info!(
        "starting relay on {} (config {})",
        config.server.bind_addr(),
        path.display()
    );
    dingtalk_relay::relay::run_server(config).await
}
