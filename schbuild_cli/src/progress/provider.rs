//! Progress provider implementation for CLI
//!
//! Bridges the core library's progress reporting with the rendering task.

use schbuild_core::{ProgressProvider, ProgressUpdate};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Updates buffered between the orchestrator and the renderer
const CHANNEL_CAPACITY: usize = 256;

/// Slots per-job updates may not use, kept free for group updates
const GROUP_RESERVE: usize = 16;

/// Channel-based progress provider for CLI rendering
///
/// Sending never blocks the build. Per-job updates are dropped when the
/// renderer falls behind; group updates always fit in the reserved slots.
pub struct ChannelProvider {
    tx: Mutex<Option<mpsc::Sender<ProgressUpdate>>>,
}

impl ChannelProvider {
    pub fn new(tx: mpsc::Sender<ProgressUpdate>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }

    fn sender(&self) -> Option<mpsc::Sender<ProgressUpdate>> {
        match self.tx.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ProgressProvider for ChannelProvider {
    fn report(&self, update: ProgressUpdate) {
        let Some(tx) = self.sender() else {
            return;
        };

        let per_job = matches!(
            update,
            ProgressUpdate::JobStarted { .. } | ProgressUpdate::JobFinished { .. }
        );
        if per_job && tx.capacity() <= GROUP_RESERVE {
            return;
        }

        if let Err(e) = tx.try_send(update) {
            log::debug!("Dropped progress update: {e}");
        }
    }

    fn complete(&self) {
        // Dropping the sender lets the renderer leave its loop
        match self.tx.lock() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}

/// Create a progress provider and the receiver its renderer reads from
pub fn create_progress_infrastructure()
-> (Arc<dyn ProgressProvider>, mpsc::Receiver<ProgressUpdate>) {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let provider = Arc::new(ChannelProvider::new(tx)) as Arc<dyn ProgressProvider>;
    (provider, rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use schbuild_core::Target;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_updates_reach_the_receiver() {
        let (provider, mut rx) = create_progress_infrastructure();
        provider.report(ProgressUpdate::GroupStarted {
            target: Target::Png,
            total: 3,
        });
        provider.complete();

        assert_eq!(
            rx.recv().await,
            Some(ProgressUpdate::GroupStarted {
                target: Target::Png,
                total: 3
            })
        );
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_reports_after_complete_are_dropped() {
        let (provider, mut rx) = create_progress_infrastructure();
        provider.complete();
        provider.complete();
        provider.report(ProgressUpdate::GroupFinished {
            target: Target::Png,
        });
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_group_updates_survive_a_full_channel() {
        let (provider, mut rx) = create_progress_infrastructure();
        provider.report(ProgressUpdate::GroupStarted {
            target: Target::Png,
            total: 1000,
        });
        for i in 0..1000 {
            provider.report(ProgressUpdate::JobStarted {
                target: Target::Png,
                source: PathBuf::from(format!("s{i}.sch")),
            });
        }
        provider.report(ProgressUpdate::GroupFinished {
            target: Target::Png,
        });
        provider.complete();

        let mut received = Vec::new();
        while let Some(update) = rx.recv().await {
            received.push(update);
        }

        assert_eq!(
            received.first(),
            Some(&ProgressUpdate::GroupStarted {
                target: Target::Png,
                total: 1000
            })
        );
        assert_eq!(
            received.last(),
            Some(&ProgressUpdate::GroupFinished {
                target: Target::Png
            })
        );
        assert!(received.len() < CHANNEL_CAPACITY);
    }
}
