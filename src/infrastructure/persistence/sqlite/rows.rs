//! # SQLite Row Mapping
//!
//! Column layout and row conversion for each record kind.
//!
//! Every table has the same frame: `id INTEGER PRIMARY KEY AUTOINCREMENT`,
//! the kind's data columns, then `created_at` / `updated_at` as RFC 3339
//! text. `AUTOINCREMENT` keeps ids from ever being reused, even after the
//! highest row is deleted and the process restarts.

use crate::domain::entities::{Allocation, Broker, Deal, Portfolio, Record};
use crate::domain::value_objects::{AuditStamps, Timestamp};
use chrono::NaiveDate;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::Row;

/// Query type with SQLite arguments bound.
pub type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// A value bound into an insert or update statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// INTEGER.
    Integer(i64),
    /// REAL, nullable.
    Real(Option<f64>),
    /// TEXT, nullable.
    Text(Option<String>),
    /// DATE stored as `YYYY-MM-DD`, nullable.
    Date(Option<NaiveDate>),
    /// BOOLEAN stored as 0/1.
    Bool(bool),
}

impl SqlValue {
    /// Binds this value as the next positional parameter.
    #[must_use]
    pub fn bind(self, query: SqliteQuery<'_>) -> SqliteQuery<'_> {
        match self {
            Self::Integer(v) => query.bind(v),
            Self::Real(v) => query.bind(v),
            Self::Text(v) => query.bind(v),
            Self::Date(v) => query.bind(v),
            Self::Bool(v) => query.bind(v),
        }
    }
}

fn text(value: &Option<String>) -> SqlValue {
    SqlValue::Text(value.clone())
}

/// Table mapping for a record kind.
pub trait SqlRecord: Record {
    /// Column the lookup key lives in.
    const KEY_COLUMN: &'static str;

    /// Data columns, in [`values`](Self::values) order. Excludes `id` and
    /// the audit stamps.
    const COLUMNS: &'static [&'static str];

    /// Idempotent table definition.
    const CREATE_TABLE: &'static str;

    /// Converts a lookup key into a bind value.
    fn key_value(key: &Self::Key) -> SqlValue;

    /// Returns the data column values.
    fn values(&self) -> Vec<SqlValue>;

    /// Builds a record from a full row.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error::ColumnDecode` if a column has an unexpected
    /// type or an audit stamp is not RFC 3339.
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error>;

    /// Sets the surrogate id assigned by the database.
    fn set_id(&mut self, id: i64);
}

#[derive(Debug, thiserror::Error)]
#[error("invalid RFC 3339 timestamp: {0}")]
struct InvalidTimestamp(String);

fn stamp(row: &SqliteRow, column: &str) -> Result<Option<Timestamp>, sqlx::Error> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|value| {
        Timestamp::parse_rfc3339(&value).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(InvalidTimestamp(value)),
        })
    })
    .transpose()
}

/// Reads the audit stamps, stamping any that are NULL with the current time.
fn audit_from_row(row: &SqliteRow) -> Result<AuditStamps, sqlx::Error> {
    let created_at = stamp(row, "created_at")?;
    let updated_at = stamp(row, "updated_at")?;
    let now = Timestamp::now();
    Ok(AuditStamps {
        created_at: created_at.unwrap_or(now),
        updated_at: updated_at.unwrap_or(now),
    })
}

impl SqlRecord for Deal {
    const KEY_COLUMN: &'static str = "deal_id";
    const COLUMNS: &'static [&'static str] = &[
        "deal_id",
        "deal_name",
        "client",
        "amount",
        "status",
        "start_date",
        "end_date",
        "owner",
    ];
    const CREATE_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS deals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            deal_id TEXT NOT NULL UNIQUE,
            deal_name TEXT NOT NULL,
            client TEXT,
            amount REAL,
            status TEXT,
            start_date DATE,
            end_date DATE,
            owner TEXT,
            created_at TEXT,
            updated_at TEXT
        )
    "#;

    fn key_value(key: &Self::Key) -> SqlValue {
        SqlValue::Text(Some(key.clone()))
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(Some(self.deal_id.clone())),
            SqlValue::Text(Some(self.deal_name.clone())),
            text(&self.client),
            SqlValue::Real(self.amount),
            text(&self.status),
            SqlValue::Date(self.start_date),
            SqlValue::Date(self.end_date),
            text(&self.owner),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            deal_id: row.try_get("deal_id")?,
            deal_name: row.try_get("deal_name")?,
            client: row.try_get("client")?,
            amount: row.try_get("amount")?,
            status: row.try_get("status")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            owner: row.try_get("owner")?,
            audit: audit_from_row(row)?,
        })
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl SqlRecord for Broker {
    const KEY_COLUMN: &'static str = "broker_id";
    const COLUMNS: &'static [&'static str] = &["broker_id", "broker_name", "status"];
    const CREATE_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS brokers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            broker_id TEXT NOT NULL UNIQUE,
            broker_name TEXT NOT NULL,
            status TEXT,
            created_at TEXT,
            updated_at TEXT
        )
    "#;

    fn key_value(key: &Self::Key) -> SqlValue {
        SqlValue::Text(Some(key.clone()))
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(Some(self.broker_id.clone())),
            SqlValue::Text(Some(self.broker_name.clone())),
            text(&self.status),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            broker_id: row.try_get("broker_id")?,
            broker_name: row.try_get("broker_name")?,
            status: row.try_get("status")?,
            audit: audit_from_row(row)?,
        })
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl SqlRecord for Portfolio {
    const KEY_COLUMN: &'static str = "portfolio_id";
    const COLUMNS: &'static [&'static str] = &[
        "portfolio_id",
        "portfolio_name",
        "manager",
        "strategy",
        "inception_date",
        "aum",
        "benchmark",
        "risk_profile",
        "performance",
    ];
    const CREATE_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS portfolios (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            portfolio_id TEXT NOT NULL UNIQUE,
            portfolio_name TEXT NOT NULL,
            manager TEXT,
            strategy TEXT,
            inception_date DATE,
            aum REAL,
            benchmark TEXT,
            risk_profile TEXT,
            performance REAL,
            created_at TEXT,
            updated_at TEXT
        )
    "#;

    fn key_value(key: &Self::Key) -> SqlValue {
        SqlValue::Text(Some(key.clone()))
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(Some(self.portfolio_id.clone())),
            SqlValue::Text(Some(self.portfolio_name.clone())),
            text(&self.manager),
            text(&self.strategy),
            SqlValue::Date(self.inception_date),
            SqlValue::Real(self.aum),
            text(&self.benchmark),
            text(&self.risk_profile),
            SqlValue::Real(self.performance),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            portfolio_id: row.try_get("portfolio_id")?,
            portfolio_name: row.try_get("portfolio_name")?,
            manager: row.try_get("manager")?,
            strategy: row.try_get("strategy")?,
            inception_date: row.try_get("inception_date")?,
            aum: row.try_get("aum")?,
            benchmark: row.try_get("benchmark")?,
            risk_profile: row.try_get("risk_profile")?,
            performance: row.try_get("performance")?,
            audit: audit_from_row(row)?,
        })
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl SqlRecord for Allocation {
    const KEY_COLUMN: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &[
        "deal_circle",
        "desc_of_security",
        "allocation_type",
        "circle_date",
        "is_add_on",
        "circle_notes",
        "deal_allocation",
        "allocation_date",
        "allocation_rounding",
        "cusip",
        "trader",
        "broker",
        "execution_date",
        "execution_reason",
        "execution_notes",
    ];
    const CREATE_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS allocations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            deal_circle TEXT,
            desc_of_security TEXT,
            allocation_type TEXT,
            circle_date DATE,
            is_add_on BOOLEAN NOT NULL DEFAULT 0,
            circle_notes TEXT,
            deal_allocation REAL,
            allocation_date DATE,
            allocation_rounding REAL,
            cusip TEXT,
            trader TEXT,
            broker TEXT,
            execution_date DATE,
            execution_reason TEXT,
            execution_notes TEXT,
            created_at TEXT,
            updated_at TEXT
        )
    "#;

    fn key_value(key: &Self::Key) -> SqlValue {
        SqlValue::Integer(*key)
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            text(&self.deal_circle),
            text(&self.desc_of_security),
            text(&self.allocation_type),
            SqlValue::Date(self.circle_date),
            SqlValue::Bool(self.is_add_on),
            text(&self.circle_notes),
            SqlValue::Real(self.deal_allocation),
            SqlValue::Date(self.allocation_date),
            SqlValue::Real(self.allocation_rounding),
            text(&self.cusip),
            text(&self.trader),
            text(&self.broker),
            SqlValue::Date(self.execution_date),
            text(&self.execution_reason),
            text(&self.execution_notes),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            deal_circle: row.try_get("deal_circle")?,
            desc_of_security: row.try_get("desc_of_security")?,
            allocation_type: row.try_get("allocation_type")?,
            circle_date: row.try_get("circle_date")?,
            is_add_on: row.try_get("is_add_on")?,
            circle_notes: row.try_get("circle_notes")?,
            deal_allocation: row.try_get("deal_allocation")?,
            allocation_date: row.try_get("allocation_date")?,
            allocation_rounding: row.try_get("allocation_rounding")?,
            cusip: row.try_get("cusip")?,
            trader: row.try_get("trader")?,
            broker: row.try_get("broker")?,
            execution_date: row.try_get("execution_date")?,
            execution_reason: row.try_get("execution_reason")?,
            execution_notes: row.try_get("execution_notes")?,
            audit: audit_from_row(row)?,
        })
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AllocationDraft, DealDraft};

    #[test]
    fn values_match_column_count() {
        let now = Timestamp::now();
        let deal = Deal::create(1, DealDraft::new("DD1", "One"), now);
        assert_eq!(deal.values().len(), Deal::COLUMNS.len());

        let allocation = Allocation::create(1, AllocationDraft::default(), now);
        assert_eq!(allocation.values().len(), Allocation::COLUMNS.len());
    }

    #[test]
    fn business_key_column_comes_first() {
        assert_eq!(Deal::COLUMNS.first(), Some(&Deal::KEY_COLUMN));
        assert_eq!(Broker::COLUMNS.first(), Some(&Broker::KEY_COLUMN));
        assert_eq!(Portfolio::COLUMNS.first(), Some(&Portfolio::KEY_COLUMN));
        assert!(!Allocation::COLUMNS.contains(&Allocation::KEY_COLUMN));
    }

    #[test]
    fn tables_are_named_after_collections() {
        assert!(Deal::CREATE_TABLE.contains("deals ("));
        assert!(Broker::CREATE_TABLE.contains("brokers ("));
        assert!(Portfolio::CREATE_TABLE.contains("portfolios ("));
        assert!(Allocation::CREATE_TABLE.contains("allocations ("));
    }
}
