//! Consume loop
//!
//! Pulls reaction state changes one at a time, applies them to the
//! projection, then acknowledges them. A change is only acknowledged after
//! it was applied, so a crash in between leads to redelivery.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use social_core::{Reaction, ServiceResult, Source};
use tracing::{debug, info, warn};

use crate::projection::CountsProjection;

const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Reaction counts worker
pub struct Worker {
    source: Arc<dyn Source<Reaction>>,
    projection: Arc<CountsProjection>,
}

impl Worker {
    pub fn new(source: Arc<dyn Source<Reaction>>, projection: Arc<CountsProjection>) -> Self {
        Self { source, projection }
    }

    pub fn projection(&self) -> &CountsProjection {
        &self.projection
    }

    /// Consume, apply and acknowledge a single change
    pub async fn process_one(&self) -> ServiceResult<()> {
        let change = self.source.consume().await?;

        let applied = self.projection.apply(&change);
        debug!(
            namespace = %change.namespace,
            reaction_id = change.new.id,
            applied,
            "Processed reaction change"
        );

        self.source.ack(&change.ack_id).await
    }

    /// Process changes until `shutdown` resolves.
    ///
    /// A pending `consume` is abandoned on shutdown; whatever it had taken
    /// stays unacknowledged and is delivered again.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        info!("Worker started");

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                result = self.process_one() => {
                    if let Err(e) = result {
                        warn!(error = %e, code = e.code(), "Failed to process change, retrying");
                        tokio::select! {
                            () = &mut shutdown => break,
                            () = tokio::time::sleep(RETRY_DELAY) => {}
                        }
                    }
                }
            }
        }

        info!("Worker stopped");
    }
}
