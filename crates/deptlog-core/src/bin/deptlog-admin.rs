//! Operational CLI for a deptlog data directory: health checks, record
//! inspection and targeted configuration changes.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, Command};
use tracing::info;

use deptlog_core::ConfigService;
use deptlog_data::store::{CacheStore, DocumentStore, MemoryCacheStore, SledDocumentStore};
use deptlog_data::{DataConfig, DataProvider, Environment};
use deptlog_record::GuildId;

fn cli() -> Command {
    Command::new("deptlog-admin")
        .version(deptlog_core::VERSION)
        .about("Inspect and adjust deptlog guild configuration")
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .default_value("deptlog-data")
                .value_parser(value_parser!(PathBuf))
                .help("Sled data directory holding guild records"),
        )
        .arg(
            Arg::new("dev")
                .long("dev")
                .action(ArgAction::SetTrue)
                .help("Address the development keyspace"),
        )
        .subcommand_required(true)
        .subcommand(Command::new("check").about("Open both stores and report health"))
        .subcommand(
            Command::new("show")
                .about("Print one guild's effective record as JSON")
                .arg(
                    Arg::new("guild")
                        .long("guild")
                        .required(true)
                        .help("Guild id"),
                ),
        )
        .subcommand(
            Command::new("set-auto-role")
                .about("Toggle automatic role assignment for a guild")
                .arg(
                    Arg::new("guild")
                        .long("guild")
                        .required(true)
                        .help("Guild id"),
                )
                .arg(
                    Arg::new("enabled")
                        .long("enabled")
                        .required(true)
                        .value_parser(value_parser!(bool))
                        .help("true to assign the department role on join"),
                ),
        )
        .subcommand(
            Command::new("set-award-channel")
                .about("Point a guild's award log at a channel")
                .arg(
                    Arg::new("guild")
                        .long("guild")
                        .required(true)
                        .help("Guild id"),
                )
                .arg(
                    Arg::new("channel")
                        .long("channel")
                        .required(true)
                        .help("Channel id, empty string to clear"),
                ),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let matches = cli().get_matches();

    let data_dir = matches.get_one::<PathBuf>("data-dir").unwrap().clone();
    let environment = if matches.get_flag("dev") {
        Environment::Development
    } else {
        Environment::Production
    };

    let documents = Arc::new(
        SledDocumentStore::open(&data_dir)
            .with_context(|| format!("opening data directory {}", data_dir.display()))?,
    );
    let provider = Arc::new(DataProvider::new(
        documents as Arc<dyn DocumentStore>,
        Arc::new(MemoryCacheStore::new()) as Arc<dyn CacheStore>,
        DataConfig::default().with_environment(environment),
    ));
    provider.connect().await.context("connecting stores")?;
    info!(keyspace = provider.keyspace().name(), "stores connected");

    match matches.subcommand() {
        Some(("check", _)) => {
            println!(
                "ok: keyspace {} at {}",
                provider.keyspace().name(),
                data_dir.display()
            );
        }
        Some(("show", args)) => {
            let guild = GuildId::new(args.get_one::<String>("guild").unwrap().as_str());
            let record = provider.guilds().fetch(&guild).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Some(("set-auto-role", args)) => {
            let guild = GuildId::new(args.get_one::<String>("guild").unwrap().as_str());
            let enabled = *args.get_one::<bool>("enabled").unwrap();

            let service = ConfigService::new(Arc::clone(&provider));
            let mutation = service.set_auto_role(&guild, enabled).await?;
            println!(
                "auto_role: {} -> {}",
                mutation.previous.config.auto_role, mutation.record.config.auto_role
            );
        }
        Some(("set-award-channel", args)) => {
            let guild = GuildId::new(args.get_one::<String>("guild").unwrap().as_str());
            let channel = args.get_one::<String>("channel").unwrap().clone();

            let service = ConfigService::new(Arc::clone(&provider));
            let mutation = service.set_award_channel(&guild, channel).await?;
            println!(
                "award channel: {:?} -> {:?}",
                mutation.previous.config.channels.award, mutation.record.config.channels.award
            );
        }
        _ => unreachable!("subcommand required"),
    }

    Ok(())
}
