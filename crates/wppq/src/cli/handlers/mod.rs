//! Command dispatch: config, logging and store setup, then the command

mod metrics;
mod phone;
mod queue;

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::ArgMatches;
use wppq_core::{EngineOptions, Error, IdentityProvider};

use crate::{
    commands::App,
    config::{self, Config},
    db::SqliteStore,
    identity::CliIdentity,
    logging,
};

/// Shared flags of every command
pub(crate) struct Context {
    pub(crate) app: App<SqliteStore>,
    pub(crate) json: bool,
}

pub async fn dispatch(matches: &ArgMatches) -> Result<()> {
    let config = resolve_config(config::load_config()?, matches)?;

    if let Err(e) = logging::init_tracing(&config.log.filter) {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Warning: {e}");
        }
    }

    let account = CliIdentity::from_config(&config).current_account()?;
    let store =
        SqliteStore::open(&config.database.path, config.database.max_connections).await?;
    let options = EngineOptions {
        max_reorder_retries: config.engine.max_reorder_retries,
    };
    let ctx = Context {
        app: App::new(Arc::new(store), options, account),
        json: matches.get_flag("json"),
    };

    match matches.subcommand() {
        Some(("phone", sub_m)) => phone::handle(&ctx, sub_m).await,
        Some(("queue", sub_m)) => queue::handle(&ctx, sub_m).await,
        Some(("metrics", sub_m)) => metrics::handle(&ctx, sub_m).await,
        _ => anyhow::bail!("Unknown command. Run 'wppq --help' for usage."),
    }
}

/// Apply the `--db` and `--account` flags, then validate the result
pub(crate) fn resolve_config(loaded: Config, matches: &ArgMatches) -> Result<Config> {
    let config = loaded.with_overrides(
        matches.get_one::<PathBuf>("db").cloned(),
        matches.get_one::<String>("account").cloned(),
    );
    config.validate()?;
    Ok(config)
}

/// A required positional argument
pub(crate) fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| Error::validation(format!("Missing argument <{name}>")).into())
}
