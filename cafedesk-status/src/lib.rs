//! Cafedesk live status console
//!
//! Keeps the computers table of the admin console in line with the status
//! endpoint of the rental backend:
//! - `Synchronizer` polls the endpoint on a fixed period
//! - `RowTable` diffs each snapshot against what was last rendered
//! - `RowRenderer` applies the diff to a `ViewContainer` (in memory: `TableView`)

pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod models;
pub mod reconciler;
pub mod render;
pub mod source;
pub mod state;
pub mod sync;
pub mod view;

pub use config::{load_config, load_config_from, ConsoleConfig};
pub use error::{PollError, ViewError};
pub use health::{HealthTracker, SyncHealth};
pub use models::{ComputerId, ComputerStatus, Field, StatusClass, StatusSnapshot};
pub use reconciler::{RowInstruction, RowState, RowTable};
pub use render::{RenderReport, RowRenderer};
pub use source::{HttpStatusSource, StatusSource};
pub use state::{new_state, Shared};
pub use sync::{PollOutcome, SyncOptions, Synchronizer};
pub use view::{TableView, ViewContainer};
