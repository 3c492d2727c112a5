pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
pub use config::Config;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    config.validate()?;

    init_tracing(&config);

    match cli.command {
        Commands::Add {
            login,
            password,
            group,
            group_description,
            state_description,
        } => {
            cli::cmd_add_user(
                &config,
                login,
                password,
                group,
                group_description,
                state_description,
            )
            .await
        }

        Commands::Get {
            id,
            login,
            include,
            tracked,
            json,
        } => cli::cmd_get_user(&config, id, login, &include, tracked, json).await,

        Commands::List {
            skip,
            take,
            include,
            group,
            state,
            json,
        } => cli::cmd_list_users(&config, skip, take, &include, group, state, json).await,

        Commands::Block { id } => cli::cmd_block_user(&config, id).await,

        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("config.toml already exists.");
            }
            Ok(())
        }
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
