use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use depot_core::{DomainError, Entity, OrderNumber, ReportId};
use depot_stock::ProductCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    Open,
    Reviewed,
    Fixed,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Open => "OPEN",
            IssueStatus::Reviewed => "REVIEWED",
            IssueStatus::Fixed => "FIXED",
        }
    }
}

impl core::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for IssueStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OPEN" => Ok(IssueStatus::Open),
            "REVIEWED" => Ok(IssueStatus::Reviewed),
            "FIXED" => Ok(IssueStatus::Fixed),
            _ => Err(DomainError::validation(format!("unknown image issue status '{s}'"))),
        }
    }
}

/// One entry in a report's reviewer history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueNote {
    pub status: IssueStatus,
    pub note: Option<String>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageIssueReport {
    pub id: ReportId,
    pub order_number: OrderNumber,
    pub row: u32,
    pub product_code: ProductCode,
    pub product_name: String,
    pub note: Option<String>,
    pub status: IssueStatus,
    pub reported_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub history: Vec<IssueNote>,
}

impl ImageIssueReport {
    /// Open a new report against an order line.
    pub fn open(
        id: ReportId,
        order_number: OrderNumber,
        row: u32,
        product_code: ProductCode,
        product_name: impl Into<String>,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        let note = clean_note(note);
        Self {
            id,
            order_number,
            row,
            product_code,
            product_name: product_name.into(),
            history: vec![IssueNote {
                status: IssueStatus::Open,
                note: note.clone(),
                at: now,
            }],
            note,
            status: IssueStatus::Open,
            reported_at: now,
            updated_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == IssueStatus::Open
    }

    /// Move the report to `status`. Any of the three statuses may follow any
    /// other; each move is appended to the history.
    pub fn with_status(&self, status: IssueStatus, note: Option<&str>, now: DateTime<Utc>) -> Self {
        let note = clean_note(note);
        let mut next = self.clone();
        next.status = status;
        next.updated_at = now;
        next.history.push(IssueNote { status, note, at: now });
        next
    }
}

impl Entity for ImageIssueReport {
    const KIND: &'static str = "image issue";
    type Id = ReportId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Listing filter; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFilter {
    pub status: Option<IssueStatus>,
    pub product_code: Option<ProductCode>,
    pub order_number: Option<OrderNumber>,
}

impl IssueFilter {
    pub fn matches(&self, report: &ImageIssueReport) -> bool {
        self.status.is_none_or(|s| s == report.status)
            && self
                .product_code
                .as_ref()
                .is_none_or(|p| p == &report.product_code)
            && self
                .order_number
                .as_ref()
                .is_none_or(|o| o == &report.order_number)
    }
}

/// The open report for `product`, if any.
pub fn find_open<'a, I>(reports: I, product: &ProductCode) -> Option<&'a ImageIssueReport>
where
    I: IntoIterator<Item = &'a ImageIssueReport>,
{
    reports
        .into_iter()
        .find(|r| r.is_open() && &r.product_code == product)
}

fn clean_note(note: Option<&str>) -> Option<String> {
    note.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 10, minute, 0).unwrap()
    }

    fn report(product: &str) -> ImageIssueReport {
        ImageIssueReport::open(
            ReportId::new(),
            "A-1001".parse().unwrap(),
            1,
            ProductCode::new(product).unwrap(),
            "Bolt M8",
            Some("  photo shows M10 "),
            at(0),
        )
    }

    #[test]
    fn open_report_trims_note_and_starts_history() {
        let r = report("P1");
        assert!(r.is_open());
        assert_eq!(r.note.as_deref(), Some("photo shows M10"));
        assert_eq!(r.history.len(), 1);
    }

    #[test]
    fn status_can_jump_straight_to_fixed() {
        let r = report("P1").with_status(IssueStatus::Fixed, Some("replaced"), at(5));
        assert_eq!(r.status, IssueStatus::Fixed);
        assert_eq!(r.updated_at, at(5));
        assert_eq!(r.reported_at, at(0));
        assert_eq!(r.history.last().unwrap().note.as_deref(), Some("replaced"));
    }

    #[test]
    fn find_open_ignores_closed_reports() {
        let closed = report("P1").with_status(IssueStatus::Reviewed, None, at(1));
        let open = report("P2");
        let all = [closed, open.clone()];

        assert!(find_open(&all, &ProductCode::new("P1").unwrap()).is_none());
        assert_eq!(find_open(&all, &ProductCode::new("P2").unwrap()), Some(&open));
    }

    #[test]
    fn filter_combines_fields() {
        let r = report("P1");
        let filter = IssueFilter {
            status: Some(IssueStatus::Open),
            product_code: Some(ProductCode::new("P1").unwrap()),
            order_number: None,
        };
        assert!(filter.matches(&r));
        assert!(!IssueFilter {
            status: Some(IssueStatus::Fixed),
            ..IssueFilter::default()
        }
        .matches(&r));
    }

    #[test]
    fn status_parses_from_wire_names() {
        assert_eq!("reviewed".parse::<IssueStatus>().unwrap(), IssueStatus::Reviewed);
        assert!("CLOSED".parse::<IssueStatus>().is_err());
    }
}
