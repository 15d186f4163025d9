/*!
# Cafedesk DevKit - Tooling for the live status console

Library for developing and testing the console without the rental backend:
- Scripted status endpoint (real HTTP, ephemeral port)
- Snapshot builders matching the endpoint's wire format
- Test harness wiring a synchronizer to the stub
*/

pub mod snapshot_helpers;
pub mod status_stub;
pub mod test_utils;

pub use snapshot_helpers::{computer, ComputerBuilder, SnapshotBuilder};
pub use status_stub::{StatusStub, StubResponse};
pub use test_utils::TestHarness;
