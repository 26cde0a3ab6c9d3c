use async_trait::async_trait;

use crate::{FundamentalSnapshot, ScoringError};

/// Capability interface for one fundamentals source.
///
/// Implementations wrap a concrete provider's HTTP client and response
/// parsing (out of this engine's scope) and normalize whatever shape the
/// provider returns into a [`FundamentalSnapshot`]. `Ok(None)` means the
/// provider answered but had nothing usable for the symbol; errors are
/// absorbed by the resolver's fallback chain, never surfaced to scoring.
/// Rate limiting is the implementation's own concern.
#[async_trait]
pub trait FundamentalProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, symbol: &str) -> Result<Option<FundamentalSnapshot>, ScoringError>;
}
