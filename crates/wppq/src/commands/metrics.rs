//! Dashboard metrics command

use chrono::Utc;
use wppq_core::{metrics, DashboardMetrics, MetricsStore, PhoneStore, Result};

use super::{or_dash, App};

pub async fn show<S: PhoneStore + MetricsStore + ?Sized>(
    app: &App<S>,
) -> Result<DashboardMetrics> {
    metrics::dashboard(app.store(), app.account(), Utc::now()).await
}

pub fn render_dashboard(dashboard: &DashboardMetrics) -> String {
    [
        format!("Phones:             {}", dashboard.total_phones),
        format!("Online:             {}", dashboard.online_phones),
        format!("Waiting:            {}", dashboard.waiting),
        format!("Average wait (min): {:.1}", dashboard.average_wait_minutes),
        format!("Attended today:     {}", dashboard.today_attendances),
        format!(
            "Last connection:    {}",
            or_dash(
                dashboard
                    .last_connection
                    .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            )
        ),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wppq_core::{AccountId, EngineOptions, MemoryStore};

    use super::*;
    use crate::commands::queue;

    #[tokio::test]
    async fn test_dashboard_counts() -> Result<()> {
        let app = App::new(
            Arc::new(MemoryStore::new()),
            EngineOptions::default(),
            AccountId::new("user_owner"),
        );
        let online = app
            .registry()
            .register("11987654321", "Vendas", app.account())
            .await?;
        app.registry()
            .register("11912345678", "Suporte", app.account())
            .await?;
        app.registry()
            .set_online(&online.id, true, app.account())
            .await?;
        let entry = queue::push(&app, &online.id).await?;
        queue::attend(&app, &online.id, &entry.id).await?;

        let dashboard = show(&app).await?;
        assert_eq!(dashboard.total_phones, 2);
        assert_eq!(dashboard.online_phones, 1);
        assert_eq!(dashboard.waiting, 1);
        assert_eq!(dashboard.today_attendances, 1);
        assert!(dashboard.last_connection.is_some());

        let text = render_dashboard(&dashboard);
        assert!(text.contains("Attended today:     1"));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_account() -> Result<()> {
        let app = App::new(
            Arc::new(MemoryStore::new()),
            EngineOptions::default(),
            AccountId::new("nobody"),
        );
        let dashboard = show(&app).await?;
        assert_eq!(dashboard.total_phones, 0);
        assert!(render_dashboard(&dashboard).contains("Last connection:    -"));
        Ok(())
    }
}
