use anyhow::Result;
use clap::ArgMatches;
use wppq_core::{EntryId, PhoneId};

use super::{required, Context};
use crate::commands::{emit, queue};

pub async fn handle(ctx: &Context, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("list", m)) => {
            let phone = m.get_one::<String>("phone").map(PhoneId::new);
            let rows = queue::list(&ctx.app, phone.as_ref()).await?;
            emit(ctx.json, &rows, |rows| queue::render_rows(rows))
        }
        Some(("push", m)) => {
            let phone = PhoneId::new(required(m, "phone")?);
            let entry = queue::push(&ctx.app, &phone).await?;
            emit(ctx.json, &entry, queue::render_entry)
        }
        Some(("move", m)) => {
            let phone = PhoneId::new(required(m, "phone")?);
            let entry = EntryId::new(required(m, "entry")?);
            let outcome =
                queue::move_entry(&ctx.app, &phone, &entry, required(m, "direction")?).await?;
            emit(ctx.json, &outcome, queue::render_outcome)
        }
        Some(("attend", m)) => {
            let phone = PhoneId::new(required(m, "phone")?);
            let entry = EntryId::new(required(m, "entry")?);
            let attendance = queue::attend(&ctx.app, &phone, &entry).await?;
            emit(ctx.json, &attendance, queue::render_attendance)
        }
        Some(("repair", m)) => {
            let phone = PhoneId::new(required(m, "phone")?);
            let outcome = queue::repair(&ctx.app, &phone).await?;
            emit(ctx.json, &outcome, queue::render_outcome)
        }
        _ => anyhow::bail!("Unknown queue command. Run 'wppq queue --help' for usage."),
    }
}
