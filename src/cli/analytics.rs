use tabled::Table;

use crate::{api, app::App, session::View, types::MetricTableRow};

use super::{fail, require, spinner};

/// Account-wide numbers, with the derived metrics the dashboard shows.
pub async fn stats(app: &App) {
    require(app, View::Analytics);

    let pb = spinner("Loading statistics...");
    let result = api::urls::user_stats(&app.client).await;
    pb.finish_and_clear();

    let summary = match result {
        Ok(stats) => stats.summary(),
        Err(e) => fail(app, "Failed to load statistics", e),
    };

    let rows = vec![
        row("Total URLs", summary.total_urls),
        row("Active URLs", summary.active_urls),
        row("Inactive URLs", summary.inactive_urls),
        row("Total visits", summary.total_visits),
        row("Average visits per URL", format!("{:.1}", summary.average_visits)),
        row(
            "Quota",
            format!(
                "{}/{} ({:.1}%)",
                summary.quota_used, summary.quota_limit, summary.quota_percent
            ),
        ),
    ];
    println!("{}", Table::new(rows));
}

pub async fn analytics(app: &App, short_code: String) {
    require(app, View::Analytics);

    match api::urls::analytics(&app.client, &short_code).await {
        Ok(analytics) => println!("{}", Table::new(analytics.rows())),
        Err(e) => fail(app, "Failed to load analytics", e),
    }
}

fn row(metric: &str, value: impl ToString) -> MetricTableRow {
    MetricTableRow {
        metric: metric.to_string(),
        value: value.to_string(),
    }
}
