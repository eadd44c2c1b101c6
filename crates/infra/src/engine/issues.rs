use chrono::Utc;
use tracing::info;

use depot_core::{DomainError, OrderNumber, ReportId, missing};
use depot_issues::{ImageIssueReport, IssueFilter, IssueStatus, find_open};

use crate::read_model::KeyValueStore;

use super::error::poisoned;
use super::views::ImageIssueOutcome;
use super::{EngineError, WarehouseEngine};

impl WarehouseEngine {
    /// Flag a product image problem seen on an order line.
    ///
    /// At most one OPEN report exists per product: while one is open, further
    /// calls return it with `already_reported = true`.
    pub fn report_image_issue(
        &self,
        number: &OrderNumber,
        row: u32,
        note: Option<&str>,
    ) -> Result<ImageIssueOutcome, EngineError> {
        let order = self.find(number)?;
        let line = order
            .line(row)
            .ok_or_else(|| DomainError::not_found(format!("line {row} of order {number}")))?;

        let _guard = self.issue_writes.lock().map_err(|_| poisoned("image issues"))?;
        let existing = self.issues.list();
        if let Some(open) = find_open(&existing, &line.product_code) {
            return Ok(ImageIssueOutcome {
                report: open.clone(),
                already_reported: true,
            });
        }

        let report = ImageIssueReport::open(
            ReportId::new(),
            number.clone(),
            row,
            line.product_code.clone(),
            line.product_name.clone(),
            note,
            Utc::now(),
        );
        self.issues.upsert(report.id, report.clone());
        info!(report = %report.id, order = %number, row, product = %report.product_code, "image issue reported");

        Ok(ImageIssueOutcome {
            report,
            already_reported: false,
        })
    }

    /// Reports matching `filter`, newest first.
    pub fn list_image_issues(&self, filter: &IssueFilter) -> Vec<ImageIssueReport> {
        let mut reports: Vec<ImageIssueReport> = self
            .issues
            .list()
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        reports.sort_by(|a, b| b.reported_at.cmp(&a.reported_at).then_with(|| b.id.cmp(&a.id)));
        reports
    }

    pub fn update_image_issue(
        &self,
        id: &ReportId,
        status: IssueStatus,
        note: Option<&str>,
    ) -> Result<ImageIssueReport, EngineError> {
        let _guard = self.issue_writes.lock().map_err(|_| poisoned("image issues"))?;
        let report = self
            .issues
            .get(id)
            .ok_or_else(|| EngineError::from(missing::<ImageIssueReport>(id)))?
            .with_status(status, note, Utc::now());
        self.issues.upsert(report.id, report.clone());
        info!(report = %id, status = %status, "image issue updated");
        Ok(report)
    }
}
