//! # Wire Types
//!
//! Response shapes and query parameters.
//!
//! Deals go out in the camelCase shape the blotter UI expects, with constant
//! currency and region columns the store does not hold. Brokers,
//! portfolios and allocations are returned as stored.

use crate::domain::entities::{Allocation, Broker, Deal, Portfolio, Record};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Currency reported for every deal.
pub const DEAL_CURRENCY: &str = "USD";

/// Region reported for every deal.
pub const DEAL_REGION: &str = "North America";

/// A record kind served over HTTP.
pub trait Resource: Record {
    /// Response body for one record.
    type Response: Serialize + Send + 'static;

    /// Converts a stored record into its response body.
    fn into_wire(self) -> Self::Response;
}

/// Deal as seen by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealResponse {
    /// Business key.
    pub id: String,
    /// Deal name.
    pub deal_name: String,
    /// Client name.
    pub client: Option<String>,
    /// Deal amount.
    pub amount: Option<f64>,
    /// Always [`DEAL_CURRENCY`].
    pub currency: String,
    /// Deal status.
    pub status: Option<String>,
    /// Start date.
    pub start_date: Option<NaiveDate>,
    /// End date.
    pub end_date: Option<NaiveDate>,
    /// Owner.
    pub owner: Option<String>,
    /// Always [`DEAL_REGION`].
    pub region: String,
}

impl From<Deal> for DealResponse {
    fn from(deal: Deal) -> Self {
        Self {
            id: deal.deal_id,
            deal_name: deal.deal_name,
            client: deal.client,
            amount: deal.amount,
            currency: DEAL_CURRENCY.to_string(),
            status: deal.status,
            start_date: deal.start_date,
            end_date: deal.end_date,
            owner: deal.owner,
            region: DEAL_REGION.to_string(),
        }
    }
}

impl Resource for Deal {
    type Response = DealResponse;

    fn into_wire(self) -> DealResponse {
        DealResponse::from(self)
    }
}

macro_rules! as_stored {
    ($($record:ty),*) => {
        $(
            impl Resource for $record {
                type Response = Self;

                fn into_wire(self) -> Self {
                    self
                }
            }
        )*
    };
}

as_stored!(Broker, Portfolio, Allocation);

/// `skip` / `limit` query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Pagination {
    /// Records to skip.
    pub skip: usize,
    /// Maximum records to return.
    pub limit: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { skip: 0, limit: 100 }
    }
}

impl Pagination {
    /// Applies the window to a full listing.
    #[must_use]
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.skip).take(self.limit).collect()
    }
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeResponse {
    /// Greeting.
    pub message: String,
    /// Service version.
    pub version: String,
    /// Where the API docs live.
    pub docs: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `healthy` while the process serves requests.
    pub status: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::DealDraft;
    use crate::domain::value_objects::Timestamp;

    #[test]
    fn deal_response_uses_camel_case_and_constants() {
        let draft = DealDraft::new("DD001", "Project Alpha")
            .with_amount(500_000.0)
            .with_dates(
                NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            );
        let deal = Deal::create(7, draft, Timestamp::now());
        let json = serde_json::to_value(deal.into_wire()).unwrap();

        assert_eq!(json["id"], "DD001");
        assert_eq!(json["dealName"], "Project Alpha");
        assert_eq!(json["amount"], 500_000.0);
        assert_eq!(json["currency"], "USD");
        assert_eq!(json["region"], "North America");
        assert_eq!(json["startDate"], "2024-01-15");
        assert_eq!(json["endDate"], "2024-12-31");
        assert!(json["client"].is_null());
        assert!(json.get("deal_id").is_none());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn pagination_defaults_and_window() {
        let page = Pagination::default();
        assert_eq!((page.skip, page.limit), (0, 100));

        let page = Pagination { skip: 2, limit: 3 };
        assert_eq!(page.apply((0..10).collect()), vec![2, 3, 4]);
        assert!(Pagination { skip: 20, limit: 5 }.apply(vec![1, 2]).is_empty());
    }
}
