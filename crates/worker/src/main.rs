use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use valuepick_core::extract::Extractor;
use valuepick_core::llm::perplexity::PerplexityClient;
use valuepick_core::llm::AdvisorClient;
use valuepick_core::pricing::PriceTable;
use valuepick_core::store::RECOMMENDATION_PROMPT;

#[derive(Debug, Parser)]
#[command(name = "valuepick_worker")]
struct Args {
    /// Extract from a local text file instead of querying the model.
    #[arg(long)]
    from_file: Option<std::path::PathBuf>,

    /// Log what was extracted without printing the JSON payload.
    #[arg(long)]
    dry_run: bool,
}

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

    let args = Args::parse();

    let answer = match &args.from_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let client = PerplexityClient::from_settings(&settings)?;
            match client.ask(RECOMMENDATION_PROMPT).await {
                Ok(answer) => answer,
                Err(err) => {
                    sentry_anyhow::capture_anyhow(&err);
                    return Err(err);
                }
            }
        }
    };

    let extractor = Extractor::new(PriceTable::default());
    let recommendations = extractor.extract(&answer);

    if recommendations.is_empty() {
        tracing::warn!("no recommendations extracted");
    }

    if args.dry_run {
        tracing::info!(
            count = recommendations.len(),
            dry_run = true,
            "extraction finished"
        );
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&recommendations)?);
    Ok(())
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
