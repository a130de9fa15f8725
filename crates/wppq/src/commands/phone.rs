//! Phone line commands

use serde::Serialize;
use wppq_core::{
    format_number, MetricsStore, OnlineChange, Outcome, Phone, PhoneId, PhoneStore, QueueEntry,
    Result,
};

use super::{or_dash, truncate, App};

/// A phone with its display number and queue length
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneRow {
    #[serde(flatten)]
    pub phone: Phone,
    pub display_number: String,
    pub waiting: usize,
}

pub async fn add<S: PhoneStore + MetricsStore + ?Sized>(
    app: &App<S>,
    number: &str,
    name: &str,
) -> Result<Phone> {
    app.registry().register(number, name, app.account()).await
}

/// Phones of the caller's account, oldest first
pub async fn list<S: PhoneStore + MetricsStore + ?Sized>(app: &App<S>) -> Result<Vec<PhoneRow>> {
    let phones = app.registry().list(app.account()).await?;
    let mut rows = Vec::with_capacity(phones.len());
    for phone in phones {
        let waiting = if phone.online {
            app.store().find_active_entries(&phone.id).await?.len()
        } else {
            0
        };
        rows.push(PhoneRow {
            display_number: phone.display_number(),
            phone,
            waiting,
        });
    }
    Ok(rows)
}

pub async fn set_online<S: PhoneStore + MetricsStore + ?Sized>(
    app: &App<S>,
    phone_id: &PhoneId,
    online: bool,
) -> Result<OnlineChange> {
    app.registry()
        .set_online(phone_id, online, app.account())
        .await
}

pub async fn edit<S: PhoneStore + MetricsStore + ?Sized>(
    app: &App<S>,
    phone_id: &PhoneId,
    name: Option<&str>,
    number: Option<&str>,
) -> Result<Phone> {
    app.registry()
        .edit(phone_id, name, number, app.account())
        .await
}

pub async fn remove<S: PhoneStore + MetricsStore + ?Sized>(
    app: &App<S>,
    phone_id: &PhoneId,
) -> Result<Outcome<Vec<QueueEntry>>> {
    app.registry().remove(phone_id, app.account()).await
}

pub fn render_phone(phone: &Phone) -> String {
    format!(
        "Phone {} {} {} ({})",
        phone.id,
        format_number(&phone.number),
        if phone.name.is_empty() { "-" } else { phone.name.as_str() },
        if phone.online { "online" } else { "offline" }
    )
}

pub fn render_phones(rows: &[PhoneRow]) -> String {
    if rows.is_empty() {
        return "No phones registered. Use 'wppq phone add <number>' to add one.".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:<6} {:<18} {:<20} {:<8} {:>7}  {}\n",
        "ID", "NUMBER", "NAME", "STATUS", "WAITING", "LAST CHANGE"
    ));
    for row in rows {
        out.push_str(&format!(
            "{:<6} {:<18} {:<20} {:<8} {:>7}  {}\n",
            truncate(row.phone.id.as_str(), 6),
            truncate(&row.display_number, 18),
            truncate(&row.phone.name, 20),
            if row.phone.online { "online" } else { "offline" },
            row.waiting,
            or_dash(
                row.phone
                    .last_online_change
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            ),
        ));
    }
    out.trim_end().to_string()
}

pub fn render_online_change(change: &OnlineChange) -> String {
    let mut out = render_phone(&change.phone);
    if let Some(entry) = &change.enqueued {
        out.push_str(&format!("\nQueued as entry {} at position {}", entry.id, entry.position));
    }
    if !change.deactivated.is_empty() {
        out.push_str(&format!(
            "\nDropped {} waiting entr{}",
            change.deactivated.len(),
            if change.deactivated.len() == 1 { "y" } else { "ies" }
        ));
    }
    out
}

pub fn render_removed(phone_id: &PhoneId, outcome: &Outcome<Vec<QueueEntry>>) -> String {
    match outcome {
        Outcome::Applied(entries) => {
            format!("Removed phone {phone_id} and dropped {} waiting", entries.len())
        }
        Outcome::NoOp => format!("Removed phone {phone_id}"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wppq_core::{AccountId, EngineOptions, Error, MemoryStore};

    use super::*;

    fn app() -> App<MemoryStore> {
        App::new(
            Arc::new(MemoryStore::new()),
            EngineOptions::default(),
            AccountId::new("user_owner"),
        )
    }

    #[tokio::test]
    async fn test_list_counts_waiting_on_online_phones() -> Result<()> {
        let app = app();
        let busy = add(&app, "11987654321", "Vendas").await?;
        add(&app, "11912345678", "Suporte").await?;
        set_online(&app, &busy.id, true).await?;
        app.engine().push(&busy.id, app.account()).await?;

        let rows = list(&app).await?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].display_number, "(11) 9 8765-4321");
        assert_eq!(rows[0].waiting, 2);
        assert_eq!(rows[1].waiting, 0);

        let table = render_phones(&rows);
        assert!(table.contains("Vendas"));
        assert!(table.contains("offline"));
        Ok(())
    }

    #[tokio::test]
    async fn test_offline_reports_dropped_entries() -> Result<()> {
        let app = app();
        let phone = add(&app, "11987654321", "").await?;
        set_online(&app, &phone.id, true).await?;
        let change = set_online(&app, &phone.id, false).await?;

        assert_eq!(change.deactivated.len(), 1);
        assert!(render_online_change(&change).contains("Dropped 1 waiting entry"));
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_number_is_rejected() -> Result<()> {
        let app = app();
        add(&app, "11987654321", "").await?;
        let err = add(&app, " 11987654321 ", "again").await;
        assert!(matches!(err, Err(Error::Validation(_))));
        Ok(())
    }

    #[test]
    fn test_render_empty_list() {
        assert!(render_phones(&[]).contains("wppq phone add"));
    }
}
