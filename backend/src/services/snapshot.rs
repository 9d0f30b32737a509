//! Daily snapshot run: select, archive, render, publish
//!
//! Steps run strictly in order. An empty selection stops the run after the
//! archive step; a failure at any step aborts the rest and is returned to the
//! trigger (scheduler or HTTP handler).

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use shared::{offset_from_hours, ActiveSelector, RunTrigger, StockFilter};

use super::archive::{ArchiveOutcome, SnapshotArchiver, SnapshotStore};
use super::publisher::ArtifactPublisher;
use super::quota::QuotaRecoveryPolicy;
use super::report_index::ReportIndexStore;
use super::run_lock::DailyRunLock;
use super::stock::StockQuery;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::external::ObjectStorage;
use crate::report::{RemarkPolicy, ReportLayout, ReportRenderer, ReportTotals};

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Tunables for a snapshot run
#[derive(Debug, Clone)]
pub struct SnapshotSettings {
    pub offset: FixedOffset,
    pub title: String,
    pub layout: ReportLayout,
    pub artifact_prefix: String,
    pub retain_count: usize,
    pub url_ttl: Duration,
    pub scheduled_remark: RemarkPolicy,
    pub on_demand_remark: RemarkPolicy,
}

impl SnapshotSettings {
    pub fn from_config(config: &Config) -> Self {
        let report = &config.report;
        Self {
            offset: offset_from_hours(report.utc_offset_hours),
            title: report.title.clone(),
            layout: ReportLayout::for_variant(report.layout),
            artifact_prefix: report.artifact_prefix.clone(),
            retain_count: report.retain_count,
            url_ttl: Duration::from_secs(config.storage.url_ttl_secs),
            scheduled_remark: report.scheduled_remark,
            on_demand_remark: report.on_demand_remark,
        }
    }

    pub fn remark_for(&self, trigger: RunTrigger) -> RemarkPolicy {
        match trigger {
            RunTrigger::Scheduled => self.scheduled_remark,
            RunTrigger::OnDemand => self.on_demand_remark,
        }
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// No active items for the date; nothing was written or published
    NothingToDo { date: String },
    Published(RunSummary),
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub date: String,
    pub file_name: String,
    pub url: String,
    pub items: usize,
    pub pages: usize,
    pub totals: ReportTotals,
}

pub struct SnapshotService {
    stock: Arc<dyn StockQuery>,
    archiver: SnapshotArchiver,
    renderer: ReportRenderer,
    publisher: ArtifactPublisher,
    settings: SnapshotSettings,
    lock: DailyRunLock,
    clock: Arc<dyn Clock>,
}

impl SnapshotService {
    pub fn new(
        stock: Arc<dyn StockQuery>,
        snapshots: Arc<dyn SnapshotStore>,
        storage: Arc<dyn ObjectStorage>,
        index: Arc<dyn ReportIndexStore>,
        settings: SnapshotSettings,
    ) -> Self {
        let renderer = ReportRenderer::new(
            settings.layout.clone(),
            settings.title.clone(),
            settings.offset,
        );
        let quota = QuotaRecoveryPolicy::new(settings.artifact_prefix.clone(), settings.retain_count);
        let publisher = ArtifactPublisher::new(storage, index, quota, settings.url_ttl);

        Self {
            stock,
            archiver: SnapshotArchiver::new(snapshots),
            renderer,
            publisher,
            settings,
            lock: DailyRunLock::new(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run the whole pipeline for the current local date
    pub async fn run(&self, trigger: RunTrigger) -> AppResult<RunOutcome> {
        let now = self.clock.now();
        let selector = ActiveSelector::new(
            now.with_timezone(&self.settings.offset),
            StockFilter::default(),
        );
        let date = selector.window().date_key();

        let _guard = self
            .lock
            .try_acquire(selector.window().day())
            .ok_or_else(|| AppError::RunInProgress(date.clone()))?;

        tracing::info!(trigger = trigger.as_str(), date = %date, "Snapshot run started");

        match self.execute(&selector, now, trigger).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::error!(trigger = trigger.as_str(), date = %date, error = %e, "Snapshot run failed");
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        selector: &ActiveSelector,
        now: DateTime<Utc>,
        trigger: RunTrigger,
    ) -> AppResult<RunOutcome> {
        let date = selector.window().date_key();

        let items = self.stock.list_active(selector).await?;
        tracing::info!(date = %date, count = items.len(), "Active stock selected");

        match self.archiver.archive(&items, now).await? {
            ArchiveOutcome::NothingToDo => {
                tracing::info!(date = %date, "No active stock, skipping report");
                return Ok(RunOutcome::NothingToDo { date });
            }
            ArchiveOutcome::Archived(count) => {
                tracing::info!(date = %date, count, "Snapshot archived");
            }
        }

        let rendered = self
            .renderer
            .render(&items, &date, self.settings.remark_for(trigger));
        tracing::info!(
            date = %date,
            rows = rendered.rows,
            pages = rendered.pages,
            bytes = rendered.bytes.len(),
            "Report rendered"
        );

        let pages = rendered.pages;
        let totals = rendered.totals;
        let published = self.publisher.publish(rendered.bytes, &date).await?;
        tracing::info!(date = %date, key = %published.file_name, "Report published");

        Ok(RunOutcome::Published(RunSummary {
            date,
            file_name: published.file_name,
            url: published.url,
            items: items.len(),
            pages,
            totals,
        }))
    }
}
