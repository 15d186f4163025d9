/*!
Test harness for the live status console

Wires a real `Synchronizer` + `HttpStatusSource` to a `StatusStub`, with
assertions on the resulting computers table.
*/

use crate::snapshot_helpers::SnapshotBuilder;
use crate::status_stub::StatusStub;
use anyhow::Result;
use cafedesk_status::models::{row_key, status_cell_key};
use cafedesk_status::view::CellContent;
use cafedesk_status::{
    ComputerId, Field, HttpStatusSource, PollOutcome, RowTable, StatusClass, SyncOptions, Synchronizer, TableView,
};
use std::time::Duration;

pub type HarnessSynchronizer = Synchronizer<HttpStatusSource, TableView>;

pub struct TestHarness {
    pub stub: StatusStub,
    sync: HarnessSynchronizer,
}

impl TestHarness {
    pub async fn start() -> Result<Self> {
        Self::start_with(SyncOptions::default()).await
    }

    pub async fn start_with(options: SyncOptions) -> Result<Self> {
        env_logger::builder().is_test(true).try_init().ok();

        let stub = StatusStub::start().await?;
        let source = HttpStatusSource::new(&stub.url(), Duration::from_secs(2))?;
        let sync = Synchronizer::new(source, TableView::new(), options);
        Ok(Self { stub, sync })
    }

    pub fn serve(&self, snapshot: &SnapshotBuilder) -> &Self {
        self.stub.push_snapshot(snapshot);
        self
    }

    pub async fn poll(&mut self) -> PollOutcome {
        let outcome = self.sync.poll_once().await;
        log::info!("🔄 poll #{} -> {}", outcome.seq(), describe(&outcome));
        outcome
    }

    /// Serve one snapshot and poll it
    pub async fn poll_snapshot(&mut self, snapshot: &SnapshotBuilder) -> PollOutcome {
        self.serve(snapshot);
        self.poll().await
    }

    /// Runs the real polling loop against the stub for `duration`
    pub async fn run_for(self, duration: Duration) -> (StatusStub, HarnessSynchronizer) {
        let sync = self.sync.run_until(tokio::time::sleep(duration)).await;
        (self.stub, sync)
    }

    pub fn view(&self) -> &TableView {
        self.sync.view()
    }

    pub fn table(&self) -> &RowTable {
        self.sync.table()
    }

    pub fn synchronizer(&self) -> &HarnessSynchronizer {
        &self.sync
    }

    pub fn html(&self) -> String {
        self.view().render_html()
    }

    pub fn assert_row_visible(&self, id: u64) -> Result<()> {
        let key = row_key(&ComputerId::from(id));
        match self.view().row(&key) {
            Some(row) if !row.hidden => Ok(()),
            Some(_) => anyhow::bail!("row {} is hidden", key),
            None => anyhow::bail!("row {} not in table", key),
        }
    }

    pub fn assert_row_hidden(&self, id: u64) -> Result<()> {
        let key = row_key(&ComputerId::from(id));
        match self.view().row(&key) {
            Some(row) if row.hidden => Ok(()),
            Some(_) => anyhow::bail!("row {} is visible", key),
            None => anyhow::bail!("row {} not in table", key),
        }
    }

    pub fn assert_cell(&self, id: u64, field: Field, expected: &str) -> Result<()> {
        let key = field.cell_key(&ComputerId::from(id));
        match self.view().cell_text(&key) {
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => anyhow::bail!("cell {} = {:?}, expected {:?}", key, actual, expected),
            None => anyhow::bail!("cell {} not in table", key),
        }
    }

    pub fn assert_status(&self, id: u64, label: &str, class: &StatusClass) -> Result<()> {
        let key = status_cell_key(&ComputerId::from(id));
        match self.view().cell(&key) {
            Some(CellContent::Status { label: l, class: c }) if l == label && c == class => Ok(()),
            Some(other) => anyhow::bail!("status cell {} = {:?}", key, other),
            None => anyhow::bail!("status cell {} not in table", key),
        }
    }
}

fn describe(outcome: &PollOutcome) -> String {
    match outcome {
        PollOutcome::Applied { report, .. } => {
            format!("applied ({} instructions, {} failures)", report.applied, report.failures.len())
        }
        PollOutcome::Failed { error, .. } => format!("failed: {error}"),
        PollOutcome::Discarded { .. } => "discarded".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot_helpers::computer;
    use crate::status_stub::StubResponse;
    use cafedesk_status::PollError;

    fn applied_count(outcome: &PollOutcome) -> usize {
        match outcome {
            PollOutcome::Applied { report, .. } => report.applied,
            other => panic!("expected applied poll, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_row_created_then_marked_stale() {
        let mut harness = TestHarness::start().await.unwrap();

        let a = SnapshotBuilder::new().with(computer(1).active("ivan", "10:00"));
        assert_eq!(applied_count(&harness.poll_snapshot(&a).await), 1);
        harness.assert_row_visible(1).unwrap();
        harness.assert_status(1, "Active", &StatusClass::Online).unwrap();

        assert_eq!(applied_count(&harness.poll_snapshot(&SnapshotBuilder::new()).await), 1);
        harness.assert_row_hidden(1).unwrap();
        assert!(!harness.table().get(&ComputerId::from(1)).unwrap().is_visible());
        assert_eq!(harness.view().rows().len(), 1);
    }

    #[tokio::test]
    async fn test_one_changed_field_is_one_write() {
        let mut harness = TestHarness::start().await.unwrap();

        let a = SnapshotBuilder::new()
            .with(computer(7).active("ivan", "10:00"))
            .with(computer(8).active("olga", "30:00"));
        let a2 = SnapshotBuilder::new()
            .with(computer(7).active("ivan", "09:59"))
            .with(computer(8).active("olga", "30:00"));

        harness.poll_snapshot(&a).await;
        assert_eq!(applied_count(&harness.poll_snapshot(&a2).await), 1);
        harness.assert_cell(7, Field::RemainingTime, "09:59").unwrap();
        harness.assert_cell(8, Field::RemainingTime, "30:00").unwrap();

        // unchanged snapshot: nothing to write
        assert_eq!(applied_count(&harness.poll().await), 0);
    }

    #[tokio::test]
    async fn test_failed_polls_leave_table_byte_identical() {
        let mut harness = TestHarness::start().await.unwrap();
        let a = SnapshotBuilder::new()
            .with(computer(1).active("ivan", "10:00"))
            .with(computer(2));

        harness.poll_snapshot(&a).await;
        let before = harness.html();

        harness.stub.push_error(500);
        assert!(matches!(harness.poll().await, PollOutcome::Failed { error: PollError::Status(500), .. }));
        harness.stub.push_raw("{\"computers\": ");
        assert!(matches!(harness.poll().await, PollOutcome::Failed { error: PollError::Malformed(_), .. }));
        harness.stub.push_raw("{}");
        assert!(matches!(harness.poll().await, PollOutcome::Failed { error: PollError::Malformed(_), .. }));

        assert_eq!(harness.html(), before);
        assert_eq!(harness.table().visible_count(), 2);

        let health = harness.synchronizer().health().get_health();
        assert_eq!(health.polls_failed, 3);
        assert!(health.last_error.is_some());
    }

    #[tokio::test]
    async fn test_revival_reuses_existing_row() {
        let mut harness = TestHarness::start().await.unwrap();

        harness
            .poll_snapshot(&SnapshotBuilder::new().with(computer(5).active("ivan", "10:00")).with(computer(6)))
            .await;
        harness.poll_snapshot(&SnapshotBuilder::new().with(computer(6))).await;
        harness.assert_row_hidden(5).unwrap();

        harness
            .poll_snapshot(&SnapshotBuilder::new().with(computer(5).active("ivan", "08:00")).with(computer(6)))
            .await;
        harness.assert_row_visible(5).unwrap();
        harness.assert_cell(5, Field::RemainingTime, "08:00").unwrap();
        assert_eq!(harness.view().rows().len(), 2);
        assert_eq!(harness.view().rows()[0].key, "row-5");
    }

    #[tokio::test]
    async fn test_status_change_rewrites_label_and_class() {
        let mut harness = TestHarness::start().await.unwrap();

        harness.poll_snapshot(&SnapshotBuilder::new().with(computer(3).active("ivan", "00:01"))).await;
        harness
            .poll_snapshot(&SnapshotBuilder::new().with(computer(3).status("Maintenance", StatusClass::Maintenance)))
            .await;

        harness.assert_status(3, "Maintenance", &StatusClass::Maintenance).unwrap();
        harness.assert_cell(3, Field::Client, "").unwrap();
        assert!(harness.html().contains("class=\"status-maintenance\">Maintenance</td>"));
    }

    #[tokio::test]
    async fn test_slow_poll_older_than_applied_one_is_discarded() {
        let options = SyncOptions {
            period: Duration::from_millis(50),
            ..SyncOptions::default()
        };
        let harness = TestHarness::start_with(options).await.unwrap();

        let old = SnapshotBuilder::new().with(computer(9).active("ivan", "10:00"));
        let new = SnapshotBuilder::new().with(computer(9).active("ivan", "09:59"));
        harness
            .stub
            .push_delayed(Duration::from_millis(300), StubResponse::Snapshot(old.to_json()))
            .push_snapshot(&new);

        let (stub, sync) = harness.run_for(Duration::from_millis(600)).await;

        assert!(stub.request_count() >= 3);
        assert_eq!(sync.view().cell_text("remaining-9"), Some("09:59"));
        assert!(sync.health().get_health().polls_discarded >= 1);
    }
}
