//! SQLite backend for the dealer CRM workflow services.
//!
//! Monetary values and timestamps are stored as TEXT and converted at the
//! row boundary; each query maps through a `*Row` struct with a `TryFrom`
//! into the domain model.

pub mod factory;

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::debug;

use crm_core::models::{
    Customer, Estimate, Fleet, NewCustomer, NewFleet, NewReferralSource, NewTag, ReferralSource,
    StageCount, Tag, WorkflowCounts, WorkflowStage,
};
use crm_core::service::{ServiceError, WorkflowService};
use crm_core::table::{EstimatePage, SortOrder, SortSpec, TableQuery};

pub use factory::SqliteServiceFactory;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug)]
pub struct SqliteWorkflowService {
    pool: SqlitePool,
}

impl SqliteWorkflowService {
    /// Open (or create) the database at `database_url`, which is either a
    /// bare file path or `":memory:"`.
    pub async fn new(database_url: &str) -> Result<Self, ServiceError> {
        let options = if database_url == ":memory:" {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| ServiceError::Connection(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(database_url)
                .create_if_missing(true)
        };

        // Single connection: a desktop app has one UI-driven caller, and it
        // keeps an in-memory database from splitting across connections.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| ServiceError::Connection(e.to_string()))?;

        debug!(database_url, "sqlite pool ready");
        Ok(Self { pool })
    }

    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create all tables if they do not exist yet.
    pub async fn init_schema(&self) -> Result<(), ServiceError> {
        sqlx::raw_sql(include_str!("../schema.sql"))
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        Ok(())
    }

    /// Insert one estimate row. When `estimate.id` is positive it is used
    /// as the row id; otherwise SQLite assigns one. Returns the row id.
    ///
    /// Not part of [`WorkflowService`]: the UI treats estimates as
    /// read-only apart from the stage transition. This exists for seeding
    /// and tests.
    pub async fn insert_estimate(&self, estimate: &Estimate) -> Result<i64, ServiceError> {
        let result = sqlx::query(
            "INSERT INTO estimates (
                id, order_no, order_name, customer_name, total, payment_terms,
                paid_status, workflow, inspection_status, order_status,
                is_authorized, technician, appointment, tags, due_date,
                payment_due_date, authorized_date, invoice_date,
                fully_paid_date, workflow_date, created_date
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(if estimate.id > 0 { Some(estimate.id) } else { None })
        .bind(&estimate.order_no)
        .bind(&estimate.order_name)
        .bind(&estimate.customer_name)
        .bind(estimate.total.to_string())
        .bind(&estimate.payment_terms)
        .bind(&estimate.paid_status)
        .bind(estimate.workflow.label())
        .bind(&estimate.inspection_status)
        .bind(&estimate.order_status)
        .bind(estimate.is_authorized as i32)
        .bind(&estimate.technician)
        .bind(&estimate.appointment)
        .bind(estimate.tags.join(","))
        .bind(format_optional_datetime(&estimate.due_date))
        .bind(format_optional_datetime(&estimate.payment_due_date))
        .bind(format_optional_datetime(&estimate.authorized_date))
        .bind(format_optional_datetime(&estimate.invoice_date))
        .bind(format_optional_datetime(&estimate.fully_paid_date))
        .bind(format_optional_datetime(&estimate.workflow_date))
        .bind(format_datetime(&estimate.created_date))
        .execute(&self.pool)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

}

#[derive(FromRow)]
struct EstimateRow {
    id: i64,
    order_no: String,
    order_name: String,
    customer_name: String,
    total: String,
    payment_terms: Option<String>,
    paid_status: Option<String>,
    workflow: String,
    inspection_status: Option<String>,
    order_status: Option<String>,
    is_authorized: i32,
    technician: Option<String>,
    appointment: Option<String>,
    tags: String,
    due_date: Option<String>,
    payment_due_date: Option<String>,
    authorized_date: Option<String>,
    invoice_date: Option<String>,
    fully_paid_date: Option<String>,
    workflow_date: Option<String>,
    created_date: String,
}

impl TryFrom<EstimateRow> for Estimate {
    type Error = ServiceError;

    fn try_from(row: EstimateRow) -> Result<Self, Self::Error> {
        let workflow = WorkflowStage::parse_label(&row.workflow).ok_or_else(|| {
            ServiceError::Database(format!("Invalid workflow stage: {}", row.workflow))
        })?;
        let tags = if row.tags.is_empty() {
            Vec::new()
        } else {
            row.tags.split(',').map(|t| t.trim().to_string()).collect()
        };

        Ok(Estimate {
            id: row.id,
            order_no: row.order_no,
            order_name: row.order_name,
            customer_name: row.customer_name,
            total: parse_decimal(&row.total)?,
            payment_terms: row.payment_terms,
            paid_status: row.paid_status,
            workflow,
            inspection_status: row.inspection_status,
            order_status: row.order_status,
            is_authorized: row.is_authorized != 0,
            technician: row.technician,
            appointment: row.appointment,
            tags,
            due_date: parse_optional_datetime(&row.due_date)?,
            payment_due_date: parse_optional_datetime(&row.payment_due_date)?,
            authorized_date: parse_optional_datetime(&row.authorized_date)?,
            invoice_date: parse_optional_datetime(&row.invoice_date)?,
            fully_paid_date: parse_optional_datetime(&row.fully_paid_date)?,
            workflow_date: parse_optional_datetime(&row.workflow_date)?,
            created_date: parse_datetime(&row.created_date)?,
        })
    }
}

fn parse_decimal(s: &str) -> Result<Decimal, ServiceError> {
    s.parse::<Decimal>()
        .map_err(|e| ServiceError::Database(format!("Failed to parse decimal '{s}': {e}")))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, ServiceError> {
    chrono::NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| ServiceError::Database(format!("Failed to parse datetime '{s}': {e}")))
}

fn parse_optional_datetime(s: &Option<String>) -> Result<Option<DateTime<Utc>>, ServiceError> {
    s.as_ref().map(|s| parse_datetime(s)).transpose()
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

fn format_optional_datetime(dt: &Option<DateTime<Utc>>) -> Option<String> {
    dt.as_ref().map(format_datetime)
}

/// WHERE clause and bind values shared by the page and count queries.
fn page_conditions(query: &TableQuery) -> (String, Vec<String>) {
    let mut clauses: Vec<&str> = Vec::new();
    let mut binds = Vec::new();

    if let Some(stage) = query.filter().stage {
        clauses.push("workflow = ?");
        binds.push(stage.label().to_string());
    }
    if let Some(technician) = &query.filter().technician {
        clauses.push("technician = ?");
        binds.push(technician.clone());
    }
    let text = query.query().trim();
    if !text.is_empty() {
        clauses.push("(order_no LIKE ? OR order_name LIKE ? OR customer_name LIKE ?)");
        let pattern = format!("%{text}%");
        binds.push(pattern.clone());
        binds.push(pattern.clone());
        binds.push(pattern);
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    (where_sql, binds)
}

/// Maps the opaque sort key onto a column. Unknown keys fall back to
/// newest-first, which is also the unsorted default.
fn order_by(sort: Option<&SortSpec>) -> String {
    const FALLBACK: &str = " ORDER BY created_date DESC, id DESC";

    let Some(spec) = sort else {
        return FALLBACK.to_string();
    };
    let column = match spec.key.as_str() {
        "order_no" | "orderNo" => "order_no",
        "order_name" | "orderName" => "order_name",
        "customer" | "customer_name" => "customer_name",
        "total" => "CAST(total AS REAL)",
        "due_date" | "dueDate" => "due_date",
        "workflow" => "workflow",
        "created_date" | "createdDate" => "created_date",
        _ => return FALLBACK.to_string(),
    };
    let direction = match spec.order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    format!(" ORDER BY {column} {direction}, id ASC")
}

#[async_trait]
impl WorkflowService for SqliteWorkflowService {
    async fn fetch_estimates_page(
        &self,
        query: &TableQuery,
    ) -> Result<EstimatePage, ServiceError> {
        let (where_sql, binds) = page_conditions(query);

        let count_sql = format!("SELECT COUNT(*) FROM estimates{where_sql}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for bind in &binds {
            count_query = count_query.bind(bind.as_str());
        }
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        let page_sql = format!(
            "SELECT id, order_no, order_name, customer_name, total, payment_terms,
                    paid_status, workflow, inspection_status, order_status,
                    is_authorized, technician, appointment, tags, due_date,
                    payment_due_date, authorized_date, invoice_date,
                    fully_paid_date, workflow_date, created_date
             FROM estimates{where_sql}{order} LIMIT ? OFFSET ?",
            order = order_by(query.sort()),
        );
        let mut page_query = sqlx::query_as::<_, EstimateRow>(&page_sql);
        for bind in &binds {
            page_query = page_query.bind(bind.as_str());
        }
        let rows = page_query
            .bind(i64::from(query.page_size()))
            .bind(query.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        let records = rows
            .into_iter()
            .map(Estimate::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EstimatePage {
            records,
            total: total.max(0) as u64,
        })
    }

    async fn fetch_workflow_counts(&self) -> Result<WorkflowCounts, ServiceError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT workflow, COUNT(*) FROM estimates GROUP BY workflow")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| ServiceError::Database(e.to_string()))?;

        let mut counts = WorkflowCounts::default();
        let mut all = 0i64;
        for (label, count) in rows {
            all += count;
            let slot: &mut StageCount = match WorkflowStage::parse_label(&label) {
                Some(WorkflowStage::Estimate) => &mut counts.estimates,
                Some(WorkflowStage::DroppedOff) => &mut counts.dropped_off,
                Some(WorkflowStage::InProgress) => &mut counts.in_progress,
                Some(WorkflowStage::Invoice) => &mut counts.invoices,
                None => {
                    return Err(ServiceError::Database(format!(
                        "Invalid workflow stage: {label}"
                    )));
                }
            };
            slot.status_count = count;
        }
        counts.all.status_count = all;

        Ok(counts)
    }

    async fn update_estimate_status(
        &self,
        id: i64,
        stage: WorkflowStage,
    ) -> Result<(), ServiceError> {
        let now = format_datetime(&Utc::now());
        let result = sqlx::query(
            "UPDATE estimates SET workflow = ?, workflow_date = ? WHERE id = ?",
        )
        .bind(stage.label())
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound);
        }
        Ok(())
    }

    async fn create_customer(&self, customer: NewCustomer) -> Result<Customer, ServiceError> {
        let now = Utc::now();
        let now_text = format_datetime(&now);
        let address = customer.address.clone().unwrap_or_default();
        let has_address = customer.address.is_some();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO customers (
                first_name, last_name, preferred_contact, tags, note,
                referral_source, company, fleet, payment_terms,
                on_shop_default, country, address1, address2, city, state,
                zip_code, default_fee, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(customer.preferred_contact.as_str())
        .bind(&customer.tags)
        .bind(&customer.note)
        .bind(&customer.referral_source)
        .bind(&customer.company)
        .bind(&customer.fleet)
        .bind(customer.payment_terms.map(|t| t.as_str()))
        .bind(customer.on_shop_default as i32)
        .bind(has_address.then(|| address.country.clone()))
        .bind(has_address.then(|| address.address1.clone()))
        .bind(if has_address { address.address2.clone() } else { None })
        .bind(has_address.then(|| address.city.clone()))
        .bind(has_address.then(|| address.state.clone()))
        .bind(has_address.then(|| address.zip_code.clone()))
        .bind(customer.default_fee.map(|d| d.to_string()))
        .bind(&now_text)
        .bind(&now_text)
        .execute(&mut *tx)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();

        for (position, phone) in customer.phone_numbers.iter().enumerate() {
            sqlx::query(
                "INSERT INTO customer_phones (customer_id, position, phone_type, number)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(id)
            .bind(position as i64)
            .bind(phone.phone_type.as_str())
            .bind(&phone.number)
            .execute(&mut *tx)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        }
        for (position, email) in customer.emails.iter().enumerate() {
            sqlx::query(
                "INSERT INTO customer_emails (customer_id, position, email)
                 VALUES (?, ?, ?)",
            )
            .bind(id)
            .bind(position as i64)
            .bind(email)
            .execute(&mut *tx)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(Customer {
            id,
            first_name: customer.first_name,
            last_name: customer.last_name,
            phone_numbers: customer.phone_numbers,
            emails: customer.emails,
            preferred_contact: customer.preferred_contact,
            tags: customer.tags,
            note: customer.note,
            referral_source: customer.referral_source,
            company: customer.company,
            fleet: customer.fleet,
            payment_terms: customer.payment_terms,
            on_shop_default: customer.on_shop_default,
            address: customer.address,
            default_fee: customer.default_fee,
            created_at: now,
            updated_at: now,
        })
    }

    async fn create_tag(&self, tag: NewTag) -> Result<Tag, ServiceError> {
        let now = Utc::now();
        let result = sqlx::query("INSERT INTO tags (name, created_at) VALUES (?, ?)")
            .bind(&tag.name)
            .bind(format_datetime(&now))
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(Tag {
            id: result.last_insert_rowid(),
            name: tag.name,
            created_at: now,
        })
    }

    async fn create_referral_source(
        &self,
        source: NewReferralSource,
    ) -> Result<ReferralSource, ServiceError> {
        let now = Utc::now();
        let result =
            sqlx::query("INSERT INTO referral_sources (name, created_at) VALUES (?, ?)")
                .bind(&source.name)
                .bind(format_datetime(&now))
                .execute(&self.pool)
                .await
                .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(ReferralSource {
            id: result.last_insert_rowid(),
            name: source.name,
            created_at: now,
        })
    }

    async fn create_fleet(&self, fleet: NewFleet) -> Result<Fleet, ServiceError> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        let result = sqlx::query("INSERT INTO fleets (company_name, created_at) VALUES (?, ?)")
            .bind(&fleet.company_name)
            .bind(format_datetime(&now))
            .execute(&mut *tx)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        let id = result.last_insert_rowid();

        for (position, phone) in fleet.phone_numbers.iter().enumerate() {
            sqlx::query(
                "INSERT INTO fleet_phones (fleet_id, position, phone_type, number)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(id)
            .bind(position as i64)
            .bind(phone.phone_type.as_str())
            .bind(&phone.number)
            .execute(&mut *tx)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        }
        for (position, email) in fleet.emails.iter().enumerate() {
            sqlx::query(
                "INSERT INTO fleet_emails (fleet_id, position, email) VALUES (?, ?, ?)",
            )
            .bind(id)
            .bind(position as i64)
            .bind(email)
            .execute(&mut *tx)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(Fleet {
            id,
            company_name: fleet.company_name,
            phone_numbers: fleet.phone_numbers,
            emails: fleet.emails,
            created_at: now,
        })
    }
}
