use std::sync::Arc;

use governor::DefaultDirectRateLimiter;
use rig::completion::{CompletionError, CompletionModel, CompletionRequest, CompletionResponse};
use tracing::{debug_span, info_span, Instrument};

/// Completion model that waits for a rate limiter slot before every request.
///
/// Clones share the limiter, so a single quota covers every handle.
#[derive(Clone)]
pub struct RateLimitedCompletionModel<M: CompletionModel> {
    model: M,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl<M> RateLimitedCompletionModel<M>
where
    M: CompletionModel,
{
    pub fn new(model: M, limiter: DefaultDirectRateLimiter) -> Self {
        Self {
            model,
            limiter: Arc::new(limiter),
        }
    }
}

impl<M: CompletionModel> CompletionModel for RateLimitedCompletionModel<M> {
    type Response = M::Response;

    async fn completion(
        &self,
        completion_request: CompletionRequest,
    ) -> Result<CompletionResponse<Self::Response>, CompletionError> {
        self.limiter
            .until_ready()
            .instrument(debug_span!("limiter"))
            .await;
        self.model
            .completion(completion_request)
            .instrument(info_span!("completion"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use governor::{Quota, RateLimiter};

    use super::*;
    use crate::model::mock_model::MockCompletionModel;
    use crate::model::Client;

    #[tokio::test]
    async fn test_completion_consumes_quota() {
        let mock = MockCompletionModel::new();
        mock.set_text_response("ok").await;
        let limiter = RateLimiter::direct(Quota::per_minute(NonZeroU32::MIN));
        let model = RateLimitedCompletionModel::new(mock.clone(), limiter);

        let reply = Client::new(model.clone(), "mock").prompt("hello").await.unwrap();

        assert_eq!(reply, "ok");
        assert_eq!(mock.calls(), 1);
        // The single slot of the quota is now taken for every clone
        assert!(model.limiter.check().is_err());
    }
}
