use serde::Deserialize;

use depot_core::{DomainError, OrderNumber};
use depot_fulfillment::WorkflowStatus;
use depot_infra::engine::{OrderFilter, StockEntry};
use depot_issues::{IssueFilter, IssueStatus};
use depot_stock::ProductCode;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct StartPickingRequest {
    pub picker_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportImageIssueRequest {
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateImageIssueRequest {
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StockFeedRequest {
    pub entries: Vec<StockEntry>,
}

#[derive(Debug, Deserialize)]
pub struct StockStatusRequest {
    pub available: bool,
}

// -------------------------
// Query strings
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub series: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub include_withdrawn: bool,
}

impl OrderListQuery {
    pub fn into_filter(self) -> Result<OrderFilter, DomainError> {
        Ok(OrderFilter {
            series: self.series,
            search: self.search,
            status: non_blank(self.status).map(|s| s.parse::<WorkflowStatus>()).transpose()?,
            include_withdrawn: self.include_withdrawn,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ImageIssueQuery {
    pub status: Option<String>,
    pub product_code: Option<String>,
    pub order_number: Option<String>,
}

impl ImageIssueQuery {
    pub fn into_filter(self) -> Result<IssueFilter, DomainError> {
        Ok(IssueFilter {
            status: non_blank(self.status).map(|s| s.parse::<IssueStatus>()).transpose()?,
            product_code: non_blank(self.product_code).map(ProductCode::new).transpose()?,
            order_number: non_blank(self.order_number).map(|s| s.parse::<OrderNumber>()).transpose()?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub active_only: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_values_match_everything() {
        let filter = OrderListQuery {
            status: Some(" ".into()),
            ..OrderListQuery::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter, OrderFilter::default());
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = ImageIssueQuery {
            status: Some("closed".into()),
            ..ImageIssueQuery::default()
        }
        .into_filter()
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn issue_filter_parses_order_number() {
        let filter = ImageIssueQuery {
            order_number: Some("a-12".into()),
            ..ImageIssueQuery::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.order_number.unwrap().to_string(), "A-12");
    }
}
