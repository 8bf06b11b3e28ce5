use std::path::PathBuf;

use tabled::Table;

use crate::{
    api,
    app::App,
    error, info,
    session::View,
    success,
    types::{ShortUrl, ShortenRequest, UpdateUrlRequest, UrlTableRow},
    validate, warning,
};

use super::{fail, require, spinner};

pub async fn shorten(app: &App, url: String, custom_code: Option<String>) {
    require(app, View::Dashboard);

    let request = ShortenRequest {
        original_url: url.trim().to_string(),
        custom_code: custom_code.filter(|code| !code.trim().is_empty()),
    };
    if let Err(e) = validate::shorten(&request) {
        error!("{}", e);
    }

    let pb = spinner("Shortening URL...");
    let result = api::urls::shorten(&app.client, &request).await;
    pb.finish_and_clear();

    match result {
        Ok(created) => success!("Short URL: {}", created.short_url),
        Err(e) => fail(app, "Failed to shorten URL", e),
    }
}

pub async fn list(app: &App, search: Option<String>) {
    require(app, View::Urls);

    let pb = spinner("Loading short URLs...");
    let result = api::urls::list(&app.client).await;
    pb.finish_and_clear();

    let mut urls = match result {
        Ok(urls) => urls,
        Err(e) => fail(app, "Failed to load URLs", e),
    };

    if let Some(term) = search {
        let term = term.to_lowercase();
        urls.retain(|u| {
            u.short_code.to_lowercase().contains(&term)
                || u.original_url.to_lowercase().contains(&term)
        });
    }

    if urls.is_empty() {
        info!("No short URLs yet. Create one with `trimify shorten <url>`.");
        return;
    }

    let rows: Vec<UrlTableRow> = urls.iter().map(|u| table_row(app, u)).collect();
    println!("{}", Table::new(rows));
}

pub async fn show(app: &App, short_code: String) {
    require(app, View::Urls);

    match api::urls::detail(&app.client, &short_code).await {
        Ok(url) => println!("{}", Table::new(vec![table_row(app, &url)])),
        Err(e) => fail(app, "Failed to load URL", e),
    }

    // Counters are a bonus; the URL itself was already shown.
    match api::urls::stats(&app.client, &short_code).await {
        Ok(stats) => {
            let rows = stats.rows();
            if !rows.is_empty() {
                println!("{}", Table::new(rows));
            }
        }
        Err(e) => warning!("Could not load counters for {}: {}", short_code, e),
    }
}

pub async fn edit(app: &App, short_code: String, url: Option<String>, new_code: Option<String>) {
    require(app, View::Urls);

    if url.is_none() && new_code.is_none() {
        warning!("Nothing to change. Pass --url and/or --code.");
        return;
    }
    if let Some(url) = &url {
        let check = ShortenRequest {
            original_url: url.clone(),
            custom_code: None,
        };
        if let Err(e) = validate::shorten(&check) {
            error!("{}", e);
        }
    }

    let update = UpdateUrlRequest {
        original_url: url,
        custom_code: new_code,
    };
    match api::urls::update(&app.client, &short_code, &update).await {
        Ok(updated) => success!(
            "Updated {} -> {}",
            updated.resolved_short_url(&app.base_url),
            updated.original_url
        ),
        Err(e) => fail(app, "Failed to update URL", e),
    }
}

pub async fn delete(app: &App, short_codes: Vec<String>) {
    require(app, View::Urls);

    let result = match short_codes.as_slice() {
        [] => return,
        [code] => api::urls::delete(&app.client, code).await,
        codes => api::urls::bulk_delete(&app.client, codes).await,
    };

    match result {
        Ok(()) => success!("Deleted {}", short_codes.join(", ")),
        Err(e) => fail(app, "Failed to delete URL", e),
    }
}

pub async fn toggle(app: &App, short_codes: Vec<String>) {
    require(app, View::Urls);

    let result = match short_codes.as_slice() {
        [] => return,
        [code] => api::urls::toggle(&app.client, code).await,
        codes => api::urls::bulk_toggle(&app.client, codes).await,
    };

    match result {
        Ok(()) => success!("Toggled {}", short_codes.join(", ")),
        Err(e) => fail(app, "Failed to toggle URL", e),
    }
}

pub async fn qr(app: &App, short_code: String, output: Option<PathBuf>) {
    require(app, View::Urls);

    let pb = spinner("Generating QR code...");
    let result = api::urls::qr_code(&app.client, &short_code).await;
    pb.finish_and_clear();

    let image = match result {
        Ok(bytes) if bytes.is_empty() => error!("No QR code data received from server"),
        Ok(bytes) => bytes,
        Err(e) => fail(app, "Failed to generate QR code", e),
    };

    let path = output.unwrap_or_else(|| PathBuf::from(format!("qrcode-{short_code}.png")));
    if let Err(e) = async_fs::write(&path, image).await {
        error!("Failed to write {}. Err: {}", path.display(), e);
    }
    success!("QR code saved to {}", path.display());
}

pub async fn open(app: &App, short_code: String) {
    require(app, View::Urls);

    let target = match api::urls::detail(&app.client, &short_code).await {
        Ok(url) => url.resolved_short_url(&app.base_url),
        Err(e) => fail(app, "Failed to load URL", e),
    };

    if webbrowser::open(&target).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            target
        );
    }
}

fn table_row(app: &App, url: &ShortUrl) -> UrlTableRow {
    UrlTableRow {
        code: url.short_code.clone(),
        short_url: url.resolved_short_url(&app.base_url),
        original_url: url.original_url.clone(),
        created: url.created_day(),
        visits: url.visit_count,
        active: if url.is_active { "yes" } else { "no" }.to_string(),
    }
}
