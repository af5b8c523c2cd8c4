//! # Demo Data
//!
//! Sample deals, brokers and portfolios for a fresh blotter.
//!
//! Seeding is per kind: a kind that already holds any record is left alone,
//! so running the seed twice never duplicates data or trips uniqueness.

use crate::domain::entities::{
    Broker, BrokerDraft, Deal, DealDraft, Portfolio, PortfolioDraft, Record,
};
use crate::infrastructure::persistence::traits::{RecordStore, Repository, RepositoryResult};
use chrono::NaiveDate;
use tracing::info;

/// Number of records inserted per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Deals inserted.
    pub deals: usize,
    /// Brokers inserted.
    pub brokers: usize,
    /// Portfolios inserted.
    pub portfolios: usize,
}

impl SeedReport {
    /// Returns true if nothing was inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deals == 0 && self.brokers == 0 && self.portfolios == 0
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Sample deals.
#[must_use]
pub fn demo_deals() -> Vec<DealDraft> {
    [
        ("DD001", "Project Alpha", "ABC Corp", 500_000.0, "Active", date(2024, 1, 15), date(2024, 12, 31), "John Doe"),
        ("DD002", "Project Beta", "XYZ Inc", 750_000.0, "Pending", date(2024, 2, 1), date(2025, 1, 31), "Jane Smith"),
        ("DD003", "Project Gamma", "Tech Solutions", 320_000.0, "Active", date(2024, 3, 10), date(2024, 11, 30), "Bob Johnson"),
        ("DD004", "Project Delta", "Global Services", 920_000.0, "Completed", date(2023, 6, 1), date(2024, 5, 31), "Alice Brown"),
        ("DD005", "Project Epsilon", "Innovation Labs", 280_000.0, "Active", date(2024, 4, 1), date(2024, 10, 31), "Charlie Wilson"),
        ("DD006", "Project Zeta", "Digital Media", 650_000.0, "Pending", date(2024, 5, 15), date(2025, 2, 28), "Diana Prince"),
    ]
    .into_iter()
    .map(|(id, name, client, amount, status, start, end, owner)| {
        DealDraft::new(id, name)
            .with_client(client)
            .with_amount(amount)
            .with_status(status)
            .with_dates(start, end)
            .with_owner(owner)
    })
    .collect()
}

/// Sample brokers.
#[must_use]
pub fn demo_brokers() -> Vec<BrokerDraft> {
    [
        ("BRK001", "Goldman Sachs", "Active"),
        ("BRK002", "Morgan Stanley", "Active"),
        ("BRK003", "JP Morgan", "Active"),
        ("BRK004", "Bank of America", "Inactive"),
        ("BRK005", "Citigroup", "Active"),
    ]
    .into_iter()
    .map(|(id, name, status)| BrokerDraft::new(id, name, Some(status)))
    .collect()
}

/// Sample portfolios.
#[must_use]
pub fn demo_portfolios() -> Vec<PortfolioDraft> {
    [
        ("PF001", "Growth Portfolio", "Sarah Johnson", "Growth", date(2020, 1, 15), 15_000_000.0, "S&P 500", "High", 12.5),
        ("PF002", "Value Fund", "Michael Chen", "Value", date(2019, 6, 1), 25_000_000.0, "Russell 2000", "Medium", 8.3),
        ("PF003", "Balanced Portfolio", "Emily Rodriguez", "Balanced", date(2021, 3, 10), 18_000_000.0, "60/40 Mix", "Medium", 9.7),
        ("PF004", "Conservative Fund", "David Kim", "Income", date(2018, 9, 1), 30_000_000.0, "Barclays Agg", "Low", 4.2),
        ("PF005", "Emerging Markets", "Lisa Wang", "Growth", date(2022, 1, 1), 12_000_000.0, "MSCI EM", "Very High", 15.8),
        ("PF006", "Technology Fund", "James Anderson", "Sector Focus", date(2020, 7, 15), 20_000_000.0, "NASDAQ 100", "High", 18.2),
    ]
    .into_iter()
    .map(
        |(id, name, manager, strategy, inception, aum, benchmark, risk, performance)| {
            PortfolioDraft {
                manager: Some(manager.to_string()),
                strategy: Some(strategy.to_string()),
                inception_date: Some(inception),
                aum: Some(aum),
                benchmark: Some(benchmark.to_string()),
                risk_profile: Some(risk.to_string()),
                performance: Some(performance),
                ..PortfolioDraft::new(id, name)
            }
        },
    )
    .collect()
}

async fn seed_kind<R, S>(store: &S, drafts: Vec<R::Draft>) -> RepositoryResult<usize>
where
    R: Record,
    S: Repository<R> + ?Sized,
{
    if Repository::<R>::count(store).await? > 0 {
        return Ok(0);
    }
    let mut inserted = 0;
    for draft in drafts {
        Repository::<R>::create(store, draft).await?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Inserts the demo data into every kind that is currently empty.
///
/// # Errors
///
/// Propagates the first repository error. Records inserted before the
/// failure stay in place.
pub async fn seed_if_empty(store: &dyn RecordStore) -> RepositoryResult<SeedReport> {
    let report = SeedReport {
        deals: seed_kind::<Deal, _>(store, demo_deals()).await?,
        brokers: seed_kind::<Broker, _>(store, demo_brokers()).await?,
        portfolios: seed_kind::<Portfolio, _>(store, demo_portfolios()).await?,
    };
    info!(
        backend = store.backend_name(),
        deals = report.deals,
        brokers = report.brokers,
        portfolios = report.portfolios,
        "seed complete"
    );
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::{JsonFileStore, SqliteStore};
    use tempfile::tempdir;

    #[test]
    fn demo_keys_are_unique() {
        let mut deals: Vec<_> = demo_deals().into_iter().map(|d| d.deal_id).collect();
        deals.dedup();
        assert_eq!(deals.len(), 6);
        assert_eq!(demo_brokers().len(), 5);
        assert_eq!(demo_portfolios().len(), 6);
    }

    #[test]
    fn demo_deal_fields() {
        let first = demo_deals().remove(0);
        assert_eq!(first.deal_id, "DD001");
        assert_eq!(first.client.as_deref(), Some("ABC Corp"));
        assert_eq!(first.amount, Some(500_000.0));
        assert_eq!(first.start_date, NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[tokio::test]
    async fn seed_fills_empty_store_once() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        let report = seed_if_empty(&store).await.unwrap();
        assert_eq!(
            report,
            SeedReport {
                deals: 6,
                brokers: 5,
                portfolios: 6
            }
        );

        let again = seed_if_empty(&store).await.unwrap();
        assert!(again.is_empty());
        assert_eq!(Repository::<Deal>::count(&store).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn seed_skips_kinds_with_data() {
        let store = SqliteStore::connect("sqlite::memory:", 1).await.unwrap();
        Repository::<Broker>::create(&store, BrokerDraft::new("BRK900", "Local", None))
            .await
            .unwrap();

        let report = seed_if_empty(&store).await.unwrap();
        assert_eq!(report.brokers, 0);
        assert_eq!(report.deals, 6);
        assert_eq!(Repository::<Broker>::count(&store).await.unwrap(), 1);
    }
}
