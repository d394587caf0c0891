pub mod domain;
pub mod extract;
pub mod llm;
pub mod pricing;
pub mod store;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub perplexity_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                perplexity_api_key: std::env::var("PERPLEXITY_API_KEY").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_perplexity_api_key(&self) -> anyhow::Result<&str> {
            self.perplexity_api_key
                .as_deref()
                .context("PERPLEXITY_API_KEY is required")
        }
    }
}
