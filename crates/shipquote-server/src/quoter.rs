//! Quote orchestration with optional catalog and postal enrichment.
//!
//! Both lookups run concurrently, each under its own timeout. The postal
//! bound comes from the client's [`PostalClient::lookup_budget`] so retries
//! get to run. A failed or slow lookup is logged and reported as a warning;
//! the quote itself is always produced. Pickup skips both lookups.

use std::collections::HashMap;
use std::time::Duration;

use shipquote_core::{CartLine, DeliveryMode, Destination, PostalCode, QuoteSet};
use shipquote_engine::QuoteEngine;
use shipquote_postal::PostalClient;
use sqlx::PgPool;
use uuid::Uuid;

const DEFAULT_CATALOG_TIMEOUT: Duration = Duration::from_secs(2);

/// A quote plus human-readable notes about skipped enrichment.
#[derive(Debug)]
pub struct QuoteOutcome {
    pub quote: QuoteSet,
    pub warnings: Vec<String>,
}

#[derive(Debug)]
pub struct ShippingQuoter {
    engine: QuoteEngine,
    catalog: Option<PgPool>,
    catalog_timeout: Duration,
    postal: Option<PostalClient>,
}

impl ShippingQuoter {
    #[must_use]
    pub fn new(engine: QuoteEngine) -> Self {
        Self {
            engine,
            catalog: None,
            catalog_timeout: DEFAULT_CATALOG_TIMEOUT,
            postal: None,
        }
    }

    #[must_use]
    pub fn with_catalog(mut self, pool: PgPool, timeout: Duration) -> Self {
        self.catalog = Some(pool);
        self.catalog_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_postal(mut self, client: PostalClient) -> Self {
        self.postal = Some(client);
        self
    }

    #[must_use]
    pub fn engine(&self) -> &QuoteEngine {
        &self.engine
    }

    #[must_use]
    pub fn catalog(&self) -> Option<&PgPool> {
        self.catalog.as_ref()
    }

    /// Quotes `lines`, filling missing declared weights from the catalog and
    /// resolving `postal_code` for display.
    pub async fn quote(
        &self,
        mut lines: Vec<CartLine>,
        mode: DeliveryMode,
        postal_code: Option<&str>,
    ) -> QuoteOutcome {
        let mut warnings = Vec::new();

        // Pickup is never weighed or shipped, so there is nothing to look up.
        let (catalog_ids, postal_code) = if mode == DeliveryMode::Pickup {
            (Vec::new(), None)
        } else {
            (ids_missing_weight(&lines), postal_code)
        };

        let (weights, destination) = tokio::join!(
            self.lookup_weights(&catalog_ids),
            self.resolve_destination(postal_code),
        );

        match weights {
            Ok(weights) => apply_declared_weights(&mut lines, &weights),
            Err(warning) => warnings.push(warning),
        }
        let destination = match destination {
            Ok(destination) => destination,
            Err(warning) => {
                warnings.push(warning);
                None
            }
        };

        QuoteOutcome {
            quote: self.engine.quote(&lines, mode, destination),
            warnings,
        }
    }

    async fn lookup_weights(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, String> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let Some(pool) = &self.catalog else {
            return Ok(HashMap::new());
        };

        match tokio::time::timeout(
            self.catalog_timeout,
            shipquote_db::fetch_declared_weights(pool, ids),
        )
        .await
        {
            Ok(Ok(weights)) => Ok(weights),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "catalog lookup failed; using product names");
                Err("catalog unavailable; weights derived from product names".to_string())
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.catalog_timeout.as_millis(),
                    "catalog lookup timed out; using product names"
                );
                Err("catalog lookup timed out; weights derived from product names".to_string())
            }
        }
    }

    async fn resolve_destination(&self, raw: Option<&str>) -> Result<Option<Destination>, String> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let postal_code = PostalCode::parse(raw).map_err(|e| {
            tracing::warn!(error = %e, "ignoring invalid postal code");
            e.to_string()
        })?;
        let Some(client) = &self.postal else {
            return Ok(None);
        };

        let budget = client.lookup_budget();
        match tokio::time::timeout(budget, client.resolve(&postal_code)).await {
            Ok(Ok(destination)) => Ok(Some(destination)),
            Ok(Err(e)) => {
                tracing::warn!(%postal_code, error = %e, "postal lookup failed");
                Err(format!("could not resolve postal code {postal_code}"))
            }
            Err(_) => {
                tracing::warn!(
                    %postal_code,
                    timeout_ms = budget.as_millis(),
                    "postal lookup timed out"
                );
                Err(format!("postal code lookup timed out for {postal_code}"))
            }
        }
    }
}

fn ids_missing_weight(lines: &[CartLine]) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = lines
        .iter()
        .filter(|line| line.declared_weight.is_none())
        .filter_map(|line| line.product_id)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn apply_declared_weights(lines: &mut [CartLine], weights: &HashMap<Uuid, String>) {
    for line in lines.iter_mut().filter(|l| l.declared_weight.is_none()) {
        if let Some(weight) = line.product_id.and_then(|id| weights.get(&id)) {
            line.declared_weight = Some(weight.clone());
        }
    }
}
