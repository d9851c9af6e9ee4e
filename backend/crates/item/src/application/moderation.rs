//! Reports & Moderation

use std::sync::Arc;

use account::CurrentUser;
use kernel::id::{ItemId, ReportId};
use notification::{NewNotification, NotificationKind, NotificationSink, deliver};

use crate::application::config::ItemConfig;
use crate::domain::entity::report::{ItemReport, ReportReason, ReportStatus};
use crate::domain::repository::{ItemRepository, MemberDirectory, NewReport, ReportRepository};
use crate::error::{ItemError, ItemResult};

pub const REPORT_DESCRIPTION_MAX: usize = 1000;

#[derive(Debug, Clone)]
pub struct SubmitReportInput {
    pub reason: String,
    pub description: String,
}

pub struct SubmitReportUseCase<R, N>
where
    R: ItemRepository + ReportRepository + MemberDirectory,
    N: NotificationSink + Sync,
{
    repo: Arc<R>,
    sink: Arc<N>,
}

impl<R, N> SubmitReportUseCase<R, N>
where
    R: ItemRepository + ReportRepository + MemberDirectory,
    N: NotificationSink + Sync,
{
    pub fn new(repo: Arc<R>, sink: Arc<N>) -> Self {
        Self { repo, sink }
    }

    pub async fn execute(
        &self,
        item_id: ItemId,
        reporter: &CurrentUser,
        input: SubmitReportInput,
    ) -> ItemResult<ReportId> {
        let reason: ReportReason = input.reason.parse()?;
        let description = input.description.trim().to_string();
        if description.chars().count() > REPORT_DESCRIPTION_MAX {
            return Err(ItemError::InvalidInput(format!(
                "Description must be at most {REPORT_DESCRIPTION_MAX} characters"
            )));
        }

        let item = self.repo.find(item_id).await?.ok_or(ItemError::ItemNotFound)?;
        if item.is_owner(reporter.id) {
            return Err(ItemError::InvalidInput("You cannot report your own post".into()));
        }
        if self.repo.has_reported(item_id, reporter.id).await? {
            return Err(ItemError::AlreadyReported);
        }

        let report = NewReport {
            id: ReportId::new(),
            item_id,
            reporter_id: reporter.id,
            reason,
            description,
        };
        self.repo.create_report(&report).await?;

        tracing::info!(
            report_id = %report.id,
            item_id = %item_id,
            reason = reason.as_str(),
            "Item reported"
        );

        let admins = self.repo.admin_ids().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not load admins for report notification");
            Vec::new()
        });
        let notifications = admins
            .into_iter()
            .map(|admin_id| {
                NewNotification::new(
                    admin_id,
                    NotificationKind::Report,
                    format!("New report from {}", reporter.user_name),
                    format!(
                        "{} reported \"{}\" for {}.",
                        reporter.user_name,
                        item.title,
                        reason.label()
                    ),
                )
                .with_item(item_id)
                .with_report(report.id)
                .with_reference_url("/admin/reports")
            })
            .collect();
        deliver(self.sink.as_ref(), notifications).await;

        Ok(report.id)
    }
}

/// Admin side of the report queue
pub struct ReviewReportsUseCase<R, N>
where
    R: ReportRepository,
    N: NotificationSink + Sync,
{
    repo: Arc<R>,
    sink: Arc<N>,
    config: Arc<ItemConfig>,
}

impl<R, N> ReviewReportsUseCase<R, N>
where
    R: ReportRepository,
    N: NotificationSink + Sync,
{
    pub fn new(repo: Arc<R>, sink: Arc<N>, config: Arc<ItemConfig>) -> Self {
        Self { repo, sink, config }
    }

    pub async fn list(&self, status: Option<ReportStatus>) -> ItemResult<Vec<ItemReport>> {
        self.repo
            .list_reports(status, self.config.report_page_limit)
            .await
    }

    pub async fn resolve(&self, report_id: ReportId) -> ItemResult<ItemReport> {
        let report = self
            .repo
            .set_report_status(report_id, ReportStatus::Resolved)
            .await?
            .ok_or(ItemError::ReportNotFound)?;
        tracing::info!(report_id = %report_id, "Report resolved");
        Ok(report)
    }

    /// Marks the report reviewed and warns the post owner.
    pub async fn warn_owner(&self, report_id: ReportId) -> ItemResult<ItemReport> {
        let report = self
            .repo
            .set_report_status(report_id, ReportStatus::Reviewed)
            .await?
            .ok_or(ItemError::ReportNotFound)?;

        tracing::info!(
            report_id = %report_id,
            owner_id = %report.item_owner_id,
            "Post owner warned"
        );

        let warning = NewNotification::new(
            report.item_owner_id,
            NotificationKind::Warning,
            "Warning about your post",
            format!(
                "Your post \"{}\" was reported for {} and reviewed by an administrator. Please follow the community rules.",
                report.item_title,
                report.reason.label()
            ),
        )
        .with_item(report.item_id)
        .with_report(report.id);
        deliver(self.sink.as_ref(), vec![warning]).await;

        Ok(report)
    }
}
