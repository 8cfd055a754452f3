//! SubscriptionRepository trait implementation for SqliteStore.

use super::SqliteStore;
use crate::domain::{
    BillingCycle, Budget, Currency, PaymentMethod, Status, Subscription, Tag, YearMonth,
    parse_iso_date,
};
use crate::store::{
    StoreError, StoreResult, SubscriptionFilter, SubscriptionRepository, UsageCount, sort_usage,
};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{OptionalExtension, Row, params, params_from_iter};
use std::collections::BTreeMap;

const SUBSCRIPTION_COLUMNS: &str = "id, name, cost, billing_cycle, currency, start_date, \
     renewal_date, trial_end_date, payment_method, notes, status, tags, parent_subscription_id, \
     created_at, updated_at";

// ===========================================
// Row decoding
// ===========================================

/// Column values exactly as stored, before domain validation.
struct SubscriptionRow {
    id: i64,
    name: String,
    cost: f64,
    billing_cycle: String,
    currency: String,
    start_date: String,
    renewal_date: String,
    trial_end_date: Option<String>,
    payment_method: Option<String>,
    notes: Option<String>,
    status: String,
    tags: String,
    parent_subscription_id: Option<i64>,
    created_at: String,
    updated_at: String,
}

impl SubscriptionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            cost: row.get(2)?,
            billing_cycle: row.get(3)?,
            currency: row.get(4)?,
            start_date: row.get(5)?,
            renewal_date: row.get(6)?,
            trial_end_date: row.get(7)?,
            payment_method: row.get(8)?,
            notes: row.get(9)?,
            status: row.get(10)?,
            tags: row.get(11)?,
            parent_subscription_id: row.get(12)?,
            created_at: row.get(13)?,
            updated_at: row.get(14)?,
        })
    }

    fn into_subscription(self) -> StoreResult<Subscription> {
        let invalid = |what: &str, e: &dyn std::fmt::Display| {
            StoreError::InvalidData(format!("subscription {}: {}: {}", self.id, what, e))
        };

        let billing_cycle = self
            .billing_cycle
            .parse::<BillingCycle>()
            .map_err(|e| invalid("billing cycle", &e))?;
        let currency = Currency::new(&self.currency).map_err(|e| invalid("currency", &e))?;
        let start_date = parse_iso_date(&self.start_date, "start date")
            .map_err(|e| invalid("start date", &e))?;
        let renewal_date = parse_iso_date(&self.renewal_date, "renewal date")
            .map_err(|e| invalid("renewal date", &e))?;
        let trial_end_date = self
            .trial_end_date
            .as_deref()
            .map(|s| parse_iso_date(s, "trial end date"))
            .transpose()
            .map_err(|e| invalid("trial end date", &e))?;
        let payment_method = self
            .payment_method
            .as_deref()
            .map(PaymentMethod::new)
            .transpose()
            .map_err(|e| invalid("payment method", &e))?;
        let status = self.status.parse::<Status>().map_err(|e| invalid("status", &e))?;
        let created_at = stored_timestamp(&self.created_at).map_err(|e| invalid("created_at", &e))?;
        let updated_at = stored_timestamp(&self.updated_at).map_err(|e| invalid("updated_at", &e))?;

        Subscription::builder(self.name.clone(), self.cost, billing_cycle, currency, start_date)
            .id(self.id)
            .renewal_date(Some(renewal_date))
            .trial_end_date(trial_end_date)
            .payment_method(payment_method)
            .notes(self.notes.clone())
            .status(status)
            .tags(Tag::split_stored(&self.tags))
            .parent_subscription_id(self.parent_subscription_id)
            .timestamps(created_at, updated_at)
            .build()
            .map_err(|e| invalid("row", &e))
    }
}

fn stored_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ===========================================
// Filter translation
// ===========================================

/// Builds the WHERE clause and its bound values for a filter.
fn where_clause(filter: &SubscriptionFilter) -> (String, Vec<Value>) {
    let mut conditions: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if !filter.statuses.is_empty() {
        let placeholders = vec!["?"; filter.statuses.len()].join(", ");
        conditions.push(format!("status IN ({})", placeholders));
        values.extend(
            filter
                .statuses
                .iter()
                .map(|s| Value::Text(s.as_str().to_string())),
        );
    }

    if let Some(currency) = &filter.currency {
        conditions.push("currency = ?".to_string());
        values.push(Value::Text(currency.as_str().to_string()));
    }

    if let Some(tag) = &filter.tag {
        // Delimit both sides so "work" never matches "network".
        conditions.push("(',' || tags || ',') LIKE ('%,' || ? || ',%')".to_string());
        values.push(Value::Text(tag.as_str().to_string()));
    }

    if !filter.payment_methods.is_empty() {
        let placeholders = vec!["?"; filter.payment_methods.len()].join(", ");
        conditions.push(format!("payment_method IN ({})", placeholders));
        values.extend(
            filter
                .payment_methods
                .iter()
                .map(|m| Value::Text(m.as_str().to_string())),
        );
    }

    if let Some(parent) = filter.parent {
        conditions.push("parent_subscription_id = ?".to_string());
        values.push(Value::Integer(parent));
    }

    if conditions.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), values)
    }
}

fn order_clause(filter: &SubscriptionFilter) -> String {
    let direction = if filter.descending { "DESC" } else { "ASC" };
    match filter.sort {
        Some(key) => format!(
            " ORDER BY {} {}, name COLLATE NOCASE ASC, id ASC",
            key.column(),
            direction
        ),
        None => format!(" ORDER BY name COLLATE NOCASE {}, id {}", direction, direction),
    }
}

impl SqliteStore {
    fn query_subscriptions(
        &self,
        sql: &str,
        values: Vec<Value>,
    ) -> StoreResult<Vec<Subscription>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), SubscriptionRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(SubscriptionRow::into_subscription)
            .collect()
    }
}

// ===========================================
// Repository implementation
// ===========================================

impl SubscriptionRepository for SqliteStore {
    fn insert_subscription(&mut self, subscription: &Subscription) -> StoreResult<i64> {
        self.conn.execute(
            "INSERT INTO subscriptions (name, cost, billing_cycle, currency, start_date,
                 renewal_date, trial_end_date, payment_method, notes, status, tags,
                 parent_subscription_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                subscription.name(),
                subscription.cost(),
                subscription.billing_cycle().as_str(),
                subscription.currency().as_str(),
                format_date(subscription.start_date()),
                format_date(subscription.renewal_date()),
                subscription.trial_end_date().map(format_date),
                subscription.payment_method().map(PaymentMethod::as_str),
                subscription.notes(),
                subscription.status().as_str(),
                Tag::join(subscription.tags()),
                subscription.parent_subscription_id(),
                subscription.created_at().to_rfc3339(),
                subscription.updated_at().to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, name = subscription.name(), "inserted subscription");
        Ok(id)
    }

    fn get_subscription(&self, id: i64) -> StoreResult<Option<Subscription>> {
        let sql = format!("SELECT {} FROM subscriptions WHERE id = ?", SUBSCRIPTION_COLUMNS);
        let mut found = self.query_subscriptions(&sql, vec![Value::Integer(id)])?;
        Ok(found.pop())
    }

    fn find_by_name(&self, name: &str) -> StoreResult<Vec<Subscription>> {
        let sql = format!(
            "SELECT {} FROM subscriptions WHERE name = ? COLLATE NOCASE ORDER BY id",
            SUBSCRIPTION_COLUMNS
        );
        self.query_subscriptions(&sql, vec![Value::Text(name.trim().to_string())])
    }

    fn list_subscriptions(&self, filter: &SubscriptionFilter) -> StoreResult<Vec<Subscription>> {
        let (where_sql, mut values) = where_clause(filter);
        let mut sql = format!(
            "SELECT {} FROM subscriptions{}{}",
            SUBSCRIPTION_COLUMNS,
            where_sql,
            order_clause(filter)
        );
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        }
        tracing::debug!(%sql, "listing subscriptions");
        self.query_subscriptions(&sql, values)
    }

    fn update_subscription(&mut self, subscription: &Subscription) -> StoreResult<()> {
        let id = subscription.id().ok_or_else(|| {
            StoreError::InvalidData("cannot update an unsaved subscription".into())
        })?;

        let changed = self.conn.execute(
            "UPDATE subscriptions SET
                 name = ?1, cost = ?2, billing_cycle = ?3, currency = ?4, start_date = ?5,
                 renewal_date = ?6, trial_end_date = ?7, payment_method = ?8, notes = ?9,
                 status = ?10, tags = ?11, parent_subscription_id = ?12, updated_at = ?13
             WHERE id = ?14",
            params![
                subscription.name(),
                subscription.cost(),
                subscription.billing_cycle().as_str(),
                subscription.currency().as_str(),
                format_date(subscription.start_date()),
                format_date(subscription.renewal_date()),
                subscription.trial_end_date().map(format_date),
                subscription.payment_method().map(PaymentMethod::as_str),
                subscription.notes(),
                subscription.status().as_str(),
                Tag::join(subscription.tags()),
                subscription.parent_subscription_id(),
                subscription.updated_at().to_rfc3339(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound { id });
        }
        tracing::info!(id, "updated subscription");
        Ok(())
    }

    fn children_of(&self, id: i64) -> StoreResult<Vec<Subscription>> {
        self.list_subscriptions(&SubscriptionFilter::new().parent(Some(id)))
    }

    fn delete_subscription(&mut self, id: i64) -> StoreResult<()> {
        let tx = self.transaction()?;

        let name: String = tx
            .query_row("SELECT name FROM subscriptions WHERE id = ?", [id], |row| {
                row.get(0)
            })
            .optional()?
            .ok_or(StoreError::NotFound { id })?;

        let children = {
            let mut stmt = tx.prepare(
                "SELECT id, name FROM subscriptions WHERE parent_subscription_id = ? ORDER BY id",
            )?;
            stmt.query_map([id], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
                .collect::<Result<Vec<_>, _>>()?
        };
        if !children.is_empty() {
            return Err(StoreError::HasChildren { name, children });
        }

        tx.execute("DELETE FROM subscriptions WHERE id = ?", [id])?;
        tx.commit()?;
        tracing::info!(id, %name, "deleted subscription");
        Ok(())
    }

    fn set_budget(
        &mut self,
        period: YearMonth,
        currency: &Currency,
        amount: f64,
    ) -> StoreResult<bool> {
        let now = Utc::now().to_rfc3339();
        let tx = self.transaction()?;

        let existing = tx.execute(
            "UPDATE budgets SET amount = ?1, updated_at = ?2
             WHERE year = ?3 AND month = ?4 AND currency = ?5",
            params![amount, now, period.year(), period.month(), currency.as_str()],
        )?;
        let created = existing == 0;
        if created {
            tx.execute(
                "INSERT INTO budgets (year, month, currency, amount, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![period.year(), period.month(), currency.as_str(), amount, now],
            )?;
        }
        tx.commit()?;

        tracing::info!(%period, currency = currency.as_str(), amount, created, "stored budget");
        Ok(created)
    }

    fn get_budgets(
        &self,
        year: Option<i32>,
        month: Option<u32>,
        currency: Option<&Currency>,
    ) -> StoreResult<Vec<Budget>> {
        let mut conditions = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(year) = year {
            conditions.push("year = ?");
            values.push(Value::Integer(i64::from(year)));
        }
        if let Some(month) = month {
            conditions.push("month = ?");
            values.push(Value::Integer(i64::from(month)));
        }
        if let Some(currency) = currency {
            conditions.push("currency = ?");
            values.push(Value::Text(currency.as_str().to_string()));
        }

        let mut sql = String::from(
            "SELECT year, month, currency, amount, created_at, updated_at FROM budgets",
        );
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY year, month, currency");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), |row| {
                Ok((
                    row.get::<_, i32>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(year, month, currency, amount, created, updated)| {
                let period = YearMonth::new(year, month).ok_or_else(|| {
                    StoreError::InvalidData(format!("invalid budget period {}-{}", year, month))
                })?;
                let currency = Currency::new(&currency)
                    .map_err(|e| StoreError::InvalidData(format!("budget currency: {}", e)))?;
                let created = stored_timestamp(&created)
                    .map_err(|e| StoreError::InvalidData(format!("budget created_at: {}", e)))?;
                let updated = stored_timestamp(&updated)
                    .map_err(|e| StoreError::InvalidData(format!("budget updated_at: {}", e)))?;
                Ok(Budget::new(period, currency, amount, created, updated))
            })
            .collect()
    }

    fn tag_usage(&self, filter: &SubscriptionFilter) -> StoreResult<Vec<UsageCount>> {
        let unlimited = SubscriptionFilter {
            limit: None,
            ..filter.clone()
        };
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for subscription in self.list_subscriptions(&unlimited)? {
            for tag in subscription.tags() {
                *counts.entry(tag.as_str().to_string()).or_default() += 1;
            }
        }

        let mut usage: Vec<UsageCount> = counts
            .into_iter()
            .map(|(name, count)| UsageCount::new(name, count))
            .collect();
        sort_usage(&mut usage);
        Ok(usage)
    }

    fn payment_method_usage(&self, filter: &SubscriptionFilter) -> StoreResult<Vec<UsageCount>> {
        let (where_sql, values) = where_clause(filter);
        let null_guard = if where_sql.is_empty() {
            " WHERE payment_method IS NOT NULL"
        } else {
            " AND payment_method IS NOT NULL"
        };
        let sql = format!(
            "SELECT payment_method, COUNT(*) FROM subscriptions{}{} GROUP BY payment_method",
            where_sql, null_guard
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut usage = stmt
            .query_map(params_from_iter(values), |row| {
                Ok(UsageCount::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)? as usize,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        sort_usage(&mut usage);
        Ok(usage)
    }
}
