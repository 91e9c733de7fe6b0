use std::sync::Arc;

use crate::embedding::DualEncoder;
use crate::pipeline::RerankingPipeline;

pub struct HandlerState<E: DualEncoder + 'static> {
    pub pipeline: Arc<RerankingPipeline<E>>,

    /// Answer `200` with the canonical text when ranking is impossible.
    pub fallback_to_canonical: bool,
}

impl<E: DualEncoder + 'static> Clone for HandlerState<E> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            fallback_to_canonical: self.fallback_to_canonical,
        }
    }
}

impl<E: DualEncoder + 'static> HandlerState<E> {
    pub fn new(pipeline: RerankingPipeline<E>, fallback_to_canonical: bool) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            fallback_to_canonical,
        }
    }
}
