//! Swap admission pipeline
//!
//! Composes validation, admission, pool lookup and pricing into one fail-fast call that
//! runs before any ledger write, plus the helpers used around the write itself.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use swapgate_admission::{AdmissionLimiter, CounterStore};
use swapgate_amm::{PoolSourceError, PoolStateReader, PricingEngine};
use swapgate_config::GateConfig;
use swapgate_consistency::{CancellationSignal, ConsistencyPoller};
use swapgate_types::{PoolState, SwapQuote, SwapRequest};
use swapgate_validation::RequestValidator;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{GateError, Result};
use crate::idempotency::{body_hash, IdempotencyCache};
use crate::pacer::SubmissionPacer;

/// A request that passed every pre-execution check, with the price it was given
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdmittedSwap {
    pub pool_id: String,
    /// Pool state the quote was computed against, oriented input → output
    pub pool: PoolState,
    pub quote: SwapQuote,
    pub deadline: DateTime<Utc>,
}

/// The swap gate: one instance per process, shared across request tasks
pub struct SwapGate<S, R> {
    validator: RequestValidator,
    limiter: AdmissionLimiter<S>,
    pricing: PricingEngine,
    poller: ConsistencyPoller,
    pacer: SubmissionPacer,
    pools: Arc<R>,
    responses: IdempotencyCache<Value>,
    purge_interval: Option<Duration>,
}

impl<S, R> SwapGate<S, R>
where
    S: CounterStore,
    R: PoolStateReader,
{
    pub fn new(config: &GateConfig, store: Arc<S>, pools: Arc<R>) -> Self {
        Self {
            validator: RequestValidator::new(config.validation.clone())
                .with_max_key_length(config.idempotency.max_key_length),
            limiter: AdmissionLimiter::new(store, config.admission.clone()),
            pricing: PricingEngine::new(config.pricing),
            poller: ConsistencyPoller::new(config.poller),
            pacer: SubmissionPacer::new(&config.pacer),
            pools,
            responses: IdempotencyCache::new(Duration::from_secs(config.idempotency.ttl_seconds)),
            purge_interval: config.maintenance.purge_interval(),
        }
    }

    pub fn validator(&self) -> &RequestValidator {
        &self.validator
    }

    pub fn limiter(&self) -> &AdmissionLimiter<S> {
        &self.limiter
    }

    pub fn pricing(&self) -> &PricingEngine {
        &self.pricing
    }

    pub fn pacer(&self) -> &SubmissionPacer {
        &self.pacer
    }

    /// Run every pre-execution check and price the swap
    ///
    /// Order: request rules, admission, pool lookup, trade size against the input
    /// reserve, quote, then the client's impact cap and output floor against the quote.
    /// The first failure is returned; nothing is written anywhere except the rate
    /// counters.
    pub async fn admit(
        &self,
        party: Option<&str>,
        pool_id: &str,
        request: &SwapRequest,
        now: DateTime<Utc>,
    ) -> Result<AdmittedSwap> {
        self.validator.validate_request(request, now)?;
        self.limiter.acquire(party, now).await?;

        let snapshot = self
            .pools
            .snapshot(pool_id)
            .await?
            .ok_or_else(|| GateError::PoolNotFound {
                pool_id: pool_id.to_string(),
            })?;

        let pool = snapshot
            .orient(&request.input_symbol, &request.output_symbol)
            .ok_or_else(|| GateError::PairNotInPool {
                pool_id: pool_id.to_string(),
                input_symbol: request.input_symbol.clone(),
                output_symbol: request.output_symbol.clone(),
            })?;
        pool.check_invariants()
            .map_err(|source| PoolSourceError::Malformed {
                pool_id: pool_id.to_string(),
                source,
            })?;

        self.validator
            .validate_swap_ratio(request.amount_in, pool.reserve_in)?;

        let quote = self.pricing.quote_pool(&pool, request.amount_in)?;

        self.validator
            .validate_price_impact(quote.price_impact_bps, request.max_price_impact_bps)?;
        self.validator
            .validate_min_output_met(quote.amount_out, request.min_output)?;

        info!(
            pool_id,
            party = party.unwrap_or("-"),
            amount_in = %quote.amount_in,
            amount_out = %quote.amount_out,
            price_impact_bps = quote.price_impact_bps,
            "Swap admitted"
        );

        Ok(AdmittedSwap {
            pool_id: pool_id.to_string(),
            pool,
            quote,
            deadline: request.deadline,
        })
    }

    /// Check the ledger's reported result against the client's limits
    pub fn verify_execution(
        &self,
        request: &SwapRequest,
        actual_output: Decimal,
        actual_impact_bps: u32,
    ) -> Result<()> {
        self.validator
            .validate_min_output_met(actual_output, request.min_output)?;
        self.validator
            .validate_price_impact(actual_impact_bps, request.max_price_impact_bps)?;
        Ok(())
    }

    /// Wait for the read path to reflect a write, within the configured default wait
    pub async fn await_read_your_write<T, F, Fut, P>(
        &self,
        fetch: F,
        is_good: P,
        description: &str,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Option<T>>,
        P: Fn(&T) -> bool,
    {
        Ok(self
            .poller
            .poll_until_default(fetch, is_good, description)
            .await?)
    }

    /// [`await_read_your_write`](Self::await_read_your_write) that stops when `signal` fires
    pub async fn await_read_your_write_cancellable<T, F, Fut, P>(
        &self,
        fetch: F,
        is_good: P,
        description: &str,
        signal: CancellationSignal,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Option<T>>,
        P: Fn(&T) -> bool,
    {
        let max_wait = self.poller.config().default_max_wait();
        Ok(self
            .poller
            .poll_until_cancellable(fetch, is_good, max_wait, description, signal)
            .await?)
    }

    /// Wait for this process's next ledger submission slot
    pub async fn pace_submission(&self) {
        self.pacer.await_slot().await;
    }

    /// Cached response for a replayed request, `None` on first use
    pub fn replay(&self, key: &str, body: &[u8]) -> Result<Option<Value>> {
        self.validator.validate_idempotency_key(key)?;
        let cached = self.responses.check(key, &body_hash(body))?;
        if cached.is_some() {
            debug!(key, "Request answered from idempotency cache");
        }
        Ok(cached)
    }

    /// Remember the response sent for an idempotency key
    pub fn remember(&self, key: &str, body: &[u8], response: Value) {
        self.responses.register(key, &body_hash(body), response);
    }

    /// Drop expired idempotency entries
    pub fn purge_expired_responses(&self) -> usize {
        self.responses.purge_expired()
    }

    /// Drop expired rate counters and idempotency entries, returning how many went
    pub async fn purge_expired(&self) -> usize {
        let counters = self.limiter.purge_expired().await;
        let responses = self.purge_expired_responses();
        counters + responses
    }
}

impl<S, R> SwapGate<S, R>
where
    S: CounterStore + 'static,
    R: PoolStateReader + 'static,
{
    /// Start the periodic purge of expired in-process state
    ///
    /// Returns `None` when `maintenance.purge_interval_seconds` is 0. The task runs
    /// until its handle is aborted or the runtime shuts down.
    pub fn spawn_purge_task(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let every = self.purge_interval?;
        let gate = Arc::clone(self);
        info!(interval_secs = every.as_secs(), "Purge task started");

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let purged = gate.purge_expired().await;
                if purged > 0 {
                    debug!(purged, "Purged expired gate state");
                }
            }
        }))
    }
}
