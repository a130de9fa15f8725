use anyhow::Result;
use clap::ArgMatches;
use wppq_core::PhoneId;

use super::{required, Context};
use crate::commands::{emit, phone};

pub async fn handle(ctx: &Context, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("add", m)) => {
            let name = m.get_one::<String>("name").map_or("", String::as_str);
            let added = phone::add(&ctx.app, required(m, "number")?, name).await?;
            emit(ctx.json, &added, phone::render_phone)
        }
        Some(("list", _)) => {
            let rows = phone::list(&ctx.app).await?;
            emit(ctx.json, &rows, |rows| phone::render_phones(rows))
        }
        Some(("online", m)) => {
            let id = PhoneId::new(required(m, "phone")?);
            let change = phone::set_online(&ctx.app, &id, true).await?;
            emit(ctx.json, &change, phone::render_online_change)
        }
        Some(("offline", m)) => {
            let id = PhoneId::new(required(m, "phone")?);
            let change = phone::set_online(&ctx.app, &id, false).await?;
            emit(ctx.json, &change, phone::render_online_change)
        }
        Some(("edit", m)) => {
            let id = PhoneId::new(required(m, "phone")?);
            let edited = phone::edit(
                &ctx.app,
                &id,
                m.get_one::<String>("name").map(String::as_str),
                m.get_one::<String>("number").map(String::as_str),
            )
            .await?;
            emit(ctx.json, &edited, phone::render_phone)
        }
        Some(("remove", m)) => {
            let id = PhoneId::new(required(m, "phone")?);
            let outcome = phone::remove(&ctx.app, &id).await?;
            emit(ctx.json, &outcome, |outcome| phone::render_removed(&id, outcome))
        }
        _ => anyhow::bail!("Unknown phone command. Run 'wppq phone --help' for usage."),
    }
}
