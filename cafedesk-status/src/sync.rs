/**
 * STATUS SYNCHRONIZER - Polling loop of the live computers table
 *
 * ROLE: Own the poll timer, request a snapshot every tick, and drive
 * reconciler + renderer with each snapshot that arrives.
 *
 * FLOW: tick → fetch (the only suspension point) → reconcile → render.
 * A failed poll touches nothing: the table keeps its last-known state and
 * the next tick is the retry.
 *
 * ORDERING: polls may overlap when the endpoint is slower than the period.
 * Each poll carries a sequence number; with `discard_out_of_order` a result
 * older than the last applied one is dropped.
 */

use crate::config::ConsoleConfig;
use crate::error::PollError;
use crate::health::HealthTracker;
use crate::models::StatusSnapshot;
use crate::reconciler::RowTable;
use crate::render::{RenderReport, RowRenderer, DEFAULT_EDIT_PATH_PREFIX};
use crate::source::StatusSource;
use crate::view::ViewContainer;
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub period: Duration,
    pub discard_out_of_order: bool,
    pub edit_path_prefix: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(5000),
            discard_out_of_order: true,
            edit_path_prefix: DEFAULT_EDIT_PATH_PREFIX.to_string(),
        }
    }
}

impl From<&ConsoleConfig> for SyncOptions {
    fn from(cfg: &ConsoleConfig) -> Self {
        Self {
            period: cfg.poll_interval(),
            discard_out_of_order: cfg.discard_out_of_order,
            edit_path_prefix: cfg.edit_path_prefix.clone(),
        }
    }
}

/// What happened to one poll.
#[derive(Debug)]
pub enum PollOutcome {
    Applied { seq: u64, report: RenderReport },
    Failed { seq: u64, error: PollError },
    /// Older than a poll already applied
    Discarded { seq: u64 },
}

impl PollOutcome {
    pub fn seq(&self) -> u64 {
        match self {
            PollOutcome::Applied { seq, .. }
            | PollOutcome::Failed { seq, .. }
            | PollOutcome::Discarded { seq } => *seq,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, PollOutcome::Applied { .. })
    }
}

pub struct Synchronizer<S, V> {
    source: Arc<S>,
    table: RowTable,
    view: V,
    renderer: RowRenderer,
    health: HealthTracker,
    options: SyncOptions,
    next_seq: u64,
    last_applied: Option<u64>,
}

impl<S, V> Synchronizer<S, V>
where
    S: StatusSource + Send + Sync + 'static,
    V: ViewContainer,
{
    pub fn new(source: S, view: V, options: SyncOptions) -> Self {
        Self {
            source: Arc::new(source),
            table: RowTable::new(),
            view,
            renderer: RowRenderer::new(&options.edit_path_prefix),
            health: HealthTracker::new(),
            options,
            next_seq: 0,
            last_applied: None,
        }
    }

    pub fn with_health(mut self, health: HealthTracker) -> Self {
        self.health = health;
        self
    }

    pub fn table(&self) -> &RowTable {
        &self.table
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn health(&self) -> &HealthTracker {
        &self.health
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Single poll, awaited to completion
    pub async fn poll_once(&mut self) -> PollOutcome {
        let seq = self.issue();
        let result = self.source.fetch().await;
        self.complete(seq, result)
    }

    /// Polls forever
    pub async fn run(self) -> Self {
        self.run_until(std::future::pending()).await
    }

    /// Polls immediately, then every period, until `shutdown` resolves.
    /// Requests still in flight at shutdown are dropped.
    pub async fn run_until<F: Future<Output = ()>>(mut self, shutdown: F) -> Self {
        info!(period_ms = self.options.period.as_millis() as u64, "starting status synchronizer");

        let mut ticker = interval(self.options.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight = FuturesUnordered::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    let seq = self.issue();
                    let source = Arc::clone(&self.source);
                    in_flight.push(async move { (seq, source.fetch().await) });
                }
                Some((seq, result)) = in_flight.next(), if !in_flight.is_empty() => {
                    self.complete(seq, result);
                }
            }
        }

        info!(rows = self.table.len(), dropped = in_flight.len(), "status synchronizer stopped");
        self
    }

    fn issue(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn complete(&mut self, seq: u64, result: Result<StatusSnapshot, PollError>) -> PollOutcome {
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(seq, %error, "status poll failed, keeping last-known table");
                self.health.record_failure(&error);
                return PollOutcome::Failed { seq, error };
            }
        };

        if self.options.discard_out_of_order && self.last_applied.is_some_and(|last| seq < last) {
            debug!(seq, last_applied = ?self.last_applied, "discarding out-of-order poll result");
            self.health.record_discarded();
            return PollOutcome::Discarded { seq };
        }

        let instructions = self.table.reconcile(&snapshot);
        let report = self.renderer.apply(&mut self.view, &instructions);
        self.last_applied = Some(self.last_applied.map_or(seq, |last| last.max(seq)));
        self.health
            .record_applied(self.table.len(), self.table.visible_count());

        debug!(
            seq,
            computers = snapshot.len(),
            instructions = instructions.len(),
            failures = report.failures.len(),
            "applied status snapshot"
        );
        PollOutcome::Applied { seq, report }
    }
}
