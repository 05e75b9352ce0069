use log::{debug, info};
use tokio::time::{sleep, Duration};

use std::future::Future;

use super::chain::{LedgerError, MiningResult};
use super::shared::SharedLedger;
use crate::config::LedgerConfig;

/// How a progress run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressOutcome {
    Completed,
    Cancelled,
}

/// Paced countdown shown while a block is "mined".
///
/// This is a presentation affordance only. It never touches the ledger; see
/// [`mine_with_progress`] for the variant that seals a block afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiningProgress {
    steps: u32,
    step_delay: Duration,
}

impl MiningProgress {
    pub fn new(steps: u32, step_delay: Duration) -> Self {
        MiningProgress {
            steps: steps.max(1),
            step_delay,
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.progress_steps, Duration::from_millis(config.progress_step_ms))
    }

    /// Same tick sequence without any waiting
    pub fn instant() -> Self {
        Self::new(100, Duration::ZERO)
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Total time a completed run waits
    pub fn duration(&self) -> Duration {
        self.step_delay * (self.steps + 1)
    }

    fn percent(&self, step: u32) -> u8 {
        (u64::from(step) * 100 / u64::from(self.steps)) as u8
    }

    /// Emits percentages from 0 to 100, waiting one step delay before each.
    ///
    /// Stops early with [`ProgressOutcome::Cancelled`] once `cancelled`
    /// resolves.
    pub async fn run<F, C>(&self, mut on_tick: F, cancelled: C) -> ProgressOutcome
    where
        F: FnMut(u8),
        C: Future<Output = ()>,
    {
        tokio::pin!(cancelled);

        for step in 0..=self.steps {
            tokio::select! {
                biased;
                _ = &mut cancelled => return ProgressOutcome::Cancelled,
                _ = sleep(self.step_delay) => {}
            }
            on_tick(self.percent(step));
        }

        ProgressOutcome::Completed
    }
}

impl Default for MiningProgress {
    fn default() -> Self {
        Self::from_config(&LedgerConfig::default())
    }
}

/// Plays the progress countdown, then seals a block for `miner`.
///
/// The ledger is only locked after the countdown completes. A cancelled run,
/// or a dropped future, leaves the pending pool exactly as it was.
pub async fn mine_with_progress<F, C>(
    ledger: &SharedLedger,
    miner: &str,
    progress: &MiningProgress,
    on_tick: F,
    cancelled: C,
) -> Result<MiningResult, LedgerError>
where
    F: FnMut(u8),
    C: Future<Output = ()>,
{
    debug!(
        "Mining block for {} over {} steps ({:?})",
        miner,
        progress.steps(),
        progress.duration()
    );

    match progress.run(on_tick, cancelled).await {
        ProgressOutcome::Completed => Ok(ledger.mine(miner)),
        ProgressOutcome::Cancelled => {
            info!("Mining by {} cancelled, pending pool kept", miner);
            Err(LedgerError::MiningCancelled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::future;
    use std::sync::atomic::{AtomicU8, Ordering};
    use std::sync::Arc;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_progress_ticks_to_completion() {
        let progress = MiningProgress::new(4, Duration::from_millis(1));
        let mut ticks = Vec::new();

        let outcome = progress.run(|p| ticks.push(p), future::pending()).await;

        assert_eq!(outcome, ProgressOutcome::Completed);
        assert_eq!(ticks, vec![0, 25, 50, 75, 100]);
    }

    #[tokio::test]
    async fn test_instant_progress_covers_every_percent() {
        let mut ticks = Vec::new();
        let outcome = MiningProgress::instant()
            .run(|p| ticks.push(p), future::pending())
            .await;

        assert_eq!(outcome, ProgressOutcome::Completed);
        assert_eq!(ticks.len(), 101);
        assert_eq!(ticks.first(), Some(&0));
        assert_eq!(ticks.last(), Some(&100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_keeps_pending_pool() {
        let ledger = SharedLedger::default();
        ledger.submit_transaction("Bob", "Carol", 10.0);

        let progress = MiningProgress::new(100, Duration::from_millis(30));
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();

        let task = {
            let ledger = ledger.clone();
            tokio::spawn(async move {
                mine_with_progress(&ledger, "Bob", &progress, |_| {}, async {
                    let _ = cancel_rx.await;
                })
                .await
            })
        };

        sleep(Duration::from_millis(200)).await;
        cancel_tx.send(()).unwrap();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(LedgerError::MiningCancelled)));
        assert_eq!(ledger.summary().pending_count, 1);
        assert_eq!(ledger.chain().len(), 1);
        assert_eq!(ledger.balance("Bob"), Some(90.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_progress_seals_block() {
        let ledger = SharedLedger::default();
        ledger.submit_transaction("Bank Network", "Alice", 50.0);

        let mut last = 0;
        let mined = mine_with_progress(
            &ledger,
            "Alice",
            &MiningProgress::default(),
            |p| last = p,
            future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(last, 100);
        assert_eq!(mined.block.index, 1);
        assert_eq!(mined.block.transactions.len(), 1);
        assert_eq!(ledger.balance("Alice"), Some(160.0));
        assert_eq!(ledger.summary().pending_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_during_progress_lands_in_block() {
        let ledger = SharedLedger::default();
        let progress = MiningProgress::new(10, Duration::from_millis(10));
        let last_tick = Arc::new(AtomicU8::new(0));

        let miner = {
            let ledger = ledger.clone();
            let last_tick = last_tick.clone();
            tokio::spawn(async move {
                mine_with_progress(
                    &ledger,
                    "miner",
                    &progress,
                    move |p| last_tick.store(p, Ordering::SeqCst),
                    future::pending(),
                )
                .await
            })
        };

        sleep(progress.duration() / 2).await;
        let reached = last_tick.load(Ordering::SeqCst);
        assert!(reached > 0 && reached < 100, "progress at {}%", reached);
        assert_eq!(ledger.chain().len(), 1);

        assert!(ledger.submit_transaction("Bob", "Carol", 1.0).accepted);

        let mined = miner.await.unwrap().unwrap();
        assert_eq!(last_tick.load(Ordering::SeqCst), 100);
        assert_eq!(mined.block.transactions.len(), 1);
        assert!(ledger.pending_transactions().is_empty());
    }

    #[test]
    fn test_duration() {
        let progress = MiningProgress::new(100, Duration::from_millis(30));
        assert_eq!(progress.duration(), Duration::from_millis(3030));
        assert_eq!(MiningProgress::new(0, Duration::ZERO).steps(), 1);
    }
}
