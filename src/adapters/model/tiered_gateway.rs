//! Tiered Gateway - retry and failover across two model tiers.
//!
//! Wraps the fast and capable providers behind a single `generate`
//! operation. The retry/fallback sequence is driven by [`FailoverPlan`];
//! this type only issues attempts, sleeps out backoffs, and records every
//! failed attempt for operational visibility.

use tokio::time::sleep;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ports::{GenerationRequest, ModelError, ModelProvider};

use super::retry::{FailoverPlan, RetryPolicy, Step, Tier};

/// Both tiers are exhausted for one generation call.
#[derive(Debug, thiserror::Error)]
#[error("model unavailable after {attempts} attempt(s): {source}")]
pub struct ModelUnavailable {
    /// Attempts made across both tiers.
    pub attempts: u32,
    /// The last tier error observed.
    #[source]
    pub source: ModelError,
}

/// Gateway over a fast/capable pair of model tiers.
pub struct TieredGateway<F: ModelProvider, C: ModelProvider> {
    fast: F,
    capable: C,
}

impl<F: ModelProvider, C: ModelProvider> TieredGateway<F, C> {
    /// Creates a gateway from the two tier providers.
    pub fn new(fast: F, capable: C) -> Self {
        Self { fast, capable }
    }

    /// Runs one generation call through the retry/fallback plan.
    ///
    /// Succeeds with the first tier reply; fails with [`ModelUnavailable`]
    /// carrying the last underlying error once the plan is exhausted.
    pub async fn generate(
        &self,
        request: GenerationRequest,
        policy: RetryPolicy,
    ) -> Result<String, ModelUnavailable> {
        let request_id = Uuid::new_v4();
        let mut plan = FailoverPlan::new(policy);
        let mut last_error: Option<ModelError> = None;

        loop {
            match plan.step() {
                Step::Attempt { tier, attempt } => {
                    let outcome = match tier {
                        Tier::Fast => self.fast.generate(request.clone()).await,
                        Tier::Capable => self.capable.generate(request.clone()).await,
                    };

                    match outcome {
                        Ok(text) => {
                            plan.record_success();
                            return Ok(text);
                        }
                        Err(err) => {
                            warn!(
                                %request_id,
                                %tier,
                                attempt,
                                error = %err,
                                "generation attempt failed"
                            );
                            plan.record_failure(err.is_rate_limit());
                            if let Step::Attempt {
                                tier: Tier::Capable,
                                ..
                            } = plan.step()
                            {
                                info!(
                                    %request_id,
                                    fallback = %self.capable.model_info().model,
                                    "escalating to capable tier"
                                );
                            }
                            last_error = Some(err);
                        }
                    }
                }
                Step::Wait(delay) => {
                    sleep(delay).await;
                    plan.waited();
                }
                Step::Stop => {
                    let source = last_error.take().unwrap_or_else(|| {
                        ModelError::unavailable("no generation attempts were made")
                    });
                    return Err(ModelUnavailable {
                        attempts: plan.attempts_made(),
                        source,
                    });
                }
            }
        }
    }
}
