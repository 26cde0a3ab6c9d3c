//! Priority-ordered fundamental-data resolution.
//!
//! Given a symbol, the resolver walks its providers strictly in order —
//! primary first, then secondary — and returns the first usable snapshot.
//! Provider failures and empty answers fall through to the next provider;
//! every provider failing collapses to `None`, which the factor scorer
//! treats as a normal input (it falls back to price proxies). Nothing here
//! races providers concurrently: a slow secondary must never override a
//! fast primary success.

use std::sync::Arc;

use scoring_core::{FundamentalProvider, FundamentalSnapshot};
use tracing::{debug, warn};

/// Fallback chain over [`FundamentalProvider`] implementations.
///
/// Providers are passed in explicitly at construction — there is no
/// environment-gated global, which keeps the resolver substitutable in
/// tests and free of import-time side effects.
pub struct FundamentalResolver {
    providers: Vec<Arc<dyn FundamentalProvider>>,
}

impl FundamentalResolver {
    pub fn new(providers: Vec<Arc<dyn FundamentalProvider>>) -> Self {
        Self { providers }
    }

    /// Convenience constructor for the common primary/secondary pair.
    pub fn with_chain(
        primary: Arc<dyn FundamentalProvider>,
        secondary: Arc<dyn FundamentalProvider>,
    ) -> Self {
        Self::new(vec![primary, secondary])
    }

    /// Resolve fundamentals for `symbol`, or `None` when no provider has
    /// usable data. `None` is a normal outcome, not an error: the caller
    /// scores from price proxies instead.
    pub async fn resolve(&self, symbol: &str) -> Option<FundamentalSnapshot> {
        for provider in &self.providers {
            match provider.fetch(symbol).await {
                Ok(Some(snapshot)) if snapshot.has_data() => {
                    debug!(provider = provider.name(), symbol, "fundamentals resolved");
                    return Some(snapshot);
                }
                Ok(_) => {
                    debug!(
                        provider = provider.name(),
                        symbol, "no usable fundamentals, trying next provider"
                    );
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        symbol,
                        error = %e,
                        "fundamentals provider failed, trying next provider"
                    );
                }
            }
        }
        debug!(symbol, "no fundamental data from any provider");
        None
    }
}
