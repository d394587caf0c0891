use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use valuepick_core::domain::recommendation::Recommendation;
use valuepick_core::extract::Extractor;
use valuepick_core::llm::perplexity::PerplexityClient;
use valuepick_core::pricing::PriceTable;
use valuepick_core::store::{RecommendationStore, RefreshOutcome, REFRESH_INTERVAL};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = valuepick_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let client = match PerplexityClient::from_settings(&settings) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "failed to build Perplexity client");
            return Err(err);
        }
    };
    let store = Arc::new(RecommendationStore::new(
        client,
        Extractor::new(PriceTable::default()),
    ));

    // Background refresh keeps the cache warm; a reader only pays the
    // collaborator round trip when its request beats the first tick.
    let scheduled = store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(REFRESH_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            scheduled.refresh().await;
        }
    });

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/stocks", get(list_stocks))
        .route("/api/stocks/with-metadata", get(list_stocks_with_metadata))
        .route("/api/stocks/update", post(trigger_update))
        .with_state(store)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

type SharedStore = Arc<RecommendationStore>;

async fn healthz() -> &'static str {
    "ok"
}

async fn list_stocks(State(store): State<SharedStore>) -> Json<Vec<Recommendation>> {
    let recommendations = store.get().await;
    tracing::info!(count = recommendations.len(), "returning stock recommendations");
    Json(recommendations)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StocksWithMetadata {
    recommendations: Vec<Recommendation>,
    count: usize,
    last_updated: String,
}

async fn list_stocks_with_metadata(
    State(store): State<SharedStore>,
) -> Json<StocksWithMetadata> {
    let (recommendations, last_updated) = store.get_with_timestamp().await;
    Json(StocksWithMetadata {
        count: recommendations.len(),
        last_updated: format_last_updated(last_updated),
        recommendations,
    })
}

#[derive(Debug, Serialize)]
struct UpdateAck {
    status: &'static str,
    message: String,
}

async fn trigger_update(State(store): State<SharedStore>) -> Json<UpdateAck> {
    let ack = match store.refresh().await {
        RefreshOutcome::Replaced(n) => UpdateAck {
            status: "success",
            message: format!("stock recommendations updated ({n} records)"),
        },
        RefreshOutcome::Insufficient(n) => UpdateAck {
            status: "skipped",
            message: format!("only {n} records extracted; kept previous recommendations"),
        },
        RefreshOutcome::Empty => UpdateAck {
            status: "failed",
            message: "no recommendations extracted; kept previous recommendations".to_string(),
        },
        RefreshOutcome::QueryFailed => UpdateAck {
            status: "failed",
            message: "recommendation query failed; kept previous recommendations".to_string(),
        },
    };
    Json(ack)
}

fn format_last_updated(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "Never".to_string(),
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &valuepick_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_timestamp_or_never() {
        assert_eq!(format_last_updated(None), "Never");

        let ts = Utc.with_ymd_and_hms(2026, 8, 7, 9, 30, 0).unwrap();
        assert_eq!(format_last_updated(Some(ts)), "2026-08-07 09:30:00");
    }
}
