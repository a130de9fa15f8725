use anyhow::Result;
use clap::ArgMatches;

use super::Context;
use crate::commands::{emit, metrics};

pub async fn handle(ctx: &Context, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => {
            let dashboard = metrics::show(&ctx.app).await?;
            emit(ctx.json, &dashboard, metrics::render_dashboard)
        }
        _ => anyhow::bail!("Unknown metrics command. Run 'wppq metrics --help' for usage."),
    }
}
