use clap::{Parser, Subcommand};
use tracing::{error, info};

use hive_adapter::error::ErrorResponse;
use hive_adapter::{create_adapter, Config, HiveConfig, HiveError, HiveResult};

/// Run statements against Hive over the HiveServer Thrift protocol
#[derive(Parser, Debug)]
#[command(name = "hive-adapter")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Connection URL (e.g., hive://localhost:10000/default)
    #[arg(short = 'u', long = "url")]
    url: Option<String>,

    /// Host address (overrides the URL host)
    #[arg(short = 'H', long = "host")]
    host: Option<String>,

    /// Port number
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,

    /// Database to select after connecting
    #[arg(short = 'd', long = "database")]
    database: Option<String>,

    /// Connection timeout in milliseconds
    #[arg(long = "timeout-ms")]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a query and print raw rows
    Query { sql: String },
    /// Run a query and print records as JSON
    Select { sql: String },
    /// Execute a statement without fetching results
    Execute { sql: String },
    /// Print the reflected columns of a table as JSON
    Columns { table: String },
    /// List tables of the selected database
    Tables,
}

impl Cli {
    /// Apply command line overrides on top of the loaded configuration
    fn hive_config(&self, base: HiveConfig) -> HiveResult<HiveConfig> {
        let mut config = match &self.url {
            Some(url) => HiveConfig {
                timeout_ms: base.timeout_ms,
                ..HiveConfig::from_url(url)?
            },
            None => base,
        };

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(database) = &self.database {
            config.database = database.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }

        config.validate()?;
        Ok(config)
    }
}

fn run(cli: &Cli, config: HiveConfig) -> HiveResult<()> {
    let mut adapter = create_adapter(config)?;

    match &cli.command {
        Command::Query { sql } => {
            for row in adapter.query(sql)? {
                println!("{}", row);
            }
        }
        Command::Select { sql } => {
            let records = adapter.select(sql)?;
            print_json(&records);
        }
        Command::Execute { sql } => {
            adapter.execute(sql)?;
            info!("Statement executed");
        }
        Command::Columns { table } => {
            let columns = adapter.columns(table)?;
            print_json(&columns);
        }
        Command::Tables => {
            for table in adapter.tables()? {
                println!("{}", table);
            }
        }
    }

    adapter.disconnect();
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize output: {}", e),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let hive_config = cli.hive_config(config.hive)?;

    if let Err(e) = run(&cli, hive_config) {
        error!("Command failed: {}", e);
        let response = ErrorResponse::from(&e);
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&response).unwrap_or_else(|_| e.to_string())
        );
        std::process::exit(exit_code(&e));
    }

    Ok(())
}

fn exit_code(err: &HiveError) -> i32 {
    match err {
        HiveError::InvalidConfig(_) | HiveError::Config(_) => 2,
        HiveError::Connection { .. } | HiveError::Transport { .. } => 3,
        _ => 1,
    }
}
