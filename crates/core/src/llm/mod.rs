pub mod error;
pub mod perplexity;

#[derive(Debug, Clone, Copy)]
pub enum Provider {
    Perplexity,
}

/// Outbound language-model seam. An `Err` (transport or API failure) and an
/// empty answer are both treated as a failed refresh by the store.
#[async_trait::async_trait]
pub trait AdvisorClient: Send + Sync {
    fn provider(&self) -> Provider;

    async fn ask(&self, prompt: &str) -> anyhow::Result<String>;
}
