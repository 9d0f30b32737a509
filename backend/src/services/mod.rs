//! Business logic services for the Cold Storage Inventory backend

pub mod archive;
pub mod publisher;
pub mod quota;
pub mod report_index;
pub mod run_lock;
pub mod snapshot;
pub mod stock;

pub use archive::{ArchiveOutcome, PgSnapshotStore, SnapshotArchiver, SnapshotStore};
pub use publisher::{ArtifactPublisher, PublishedReport};
pub use quota::{is_quota_message, QuotaRecoveryPolicy, QUOTA_SIGNALS};
pub use report_index::{ReportIndexService, ReportIndexStore, ReportListQuery, ReportPage};
pub use run_lock::{DailyRunLock, RunGuard};
pub use snapshot::{
    Clock, RunOutcome, RunSummary, SnapshotService, SnapshotSettings, SystemClock,
};
pub use stock::{StockQuery, StockService};
