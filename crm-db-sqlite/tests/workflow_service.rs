//! Integration tests for the SQLite workflow service, run against an
//! in-memory database.

use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crm_core::models::{
    CustomerAddress, Estimate, NewCustomer, NewFleet, NewReferralSource, NewTag, PaymentTerms,
    PhoneEntry, PhoneType, PreferredContact, WorkflowStage,
};
use crm_core::service::{ServiceError, WorkflowService};
use crm_core::table::{EstimateFilter, SortOrder, SortSpec, TableQuery};
use crm_db_sqlite::SqliteWorkflowService;

async fn service() -> SqliteWorkflowService {
    let service = SqliteWorkflowService::new(":memory:")
        .await
        .expect("in-memory database");
    service.init_schema().await.expect("schema");
    service
}

fn estimate(id: i64, stage: WorkflowStage, total: Decimal) -> Estimate {
    let base = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    Estimate {
        id,
        order_no: format!("ORD-{id:04}"),
        order_name: format!("Order {id}"),
        customer_name: "Avery Shaw".to_string(),
        total,
        payment_terms: Some("receipt".to_string()),
        paid_status: Some("Unpaid".to_string()),
        workflow: stage,
        inspection_status: Some("Pending".to_string()),
        order_status: Some("Open".to_string()),
        is_authorized: id % 2 == 0,
        technician: Some("Sam Ortiz".to_string()),
        appointment: None,
        tags: vec!["walk-in".to_string()],
        due_date: Some(base + Duration::days(7)),
        payment_due_date: None,
        authorized_date: None,
        invoice_date: None,
        fully_paid_date: None,
        workflow_date: None,
        // Spread creation times so the default newest-first order is stable.
        created_date: base + Duration::minutes(id),
    }
}

async fn seed(service: &SqliteWorkflowService, count: i64) {
    for id in 1..=count {
        let stage = match id % 4 {
            0 => WorkflowStage::Invoice,
            1 => WorkflowStage::Estimate,
            2 => WorkflowStage::DroppedOff,
            _ => WorkflowStage::InProgress,
        };
        let total = Decimal::from(100 + id);
        service
            .insert_estimate(&estimate(id, stage, total))
            .await
            .expect("insert estimate");
    }
}

#[tokio::test]
async fn page_fetch_returns_one_page_and_backing_total() {
    let service = service().await;
    seed(&service, 25).await;

    let query = TableQuery::new(); // page 1, size 10
    let page = service.fetch_estimates_page(&query).await.unwrap();

    // The loaded page holds 10 records; "All" tab badges show this length,
    // while `total` carries the backing count of 25.
    assert_eq!(page.records.len(), 10);
    assert_eq!(page.total, 25);

    let mut last = TableQuery::new();
    last.set_page_index(3);
    let page = service.fetch_estimates_page(&last).await.unwrap();
    assert_eq!(page.records.len(), 5);
    assert_eq!(page.total, 25);
}

#[tokio::test]
async fn default_order_is_newest_first() {
    let service = service().await;
    seed(&service, 12).await;

    let page = service
        .fetch_estimates_page(&TableQuery::new())
        .await
        .unwrap();
    let ids: Vec<i64> = page.records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![12, 11, 10, 9, 8, 7, 6, 5, 4, 3]);
}

#[tokio::test]
async fn sort_spec_is_applied_verbatim() {
    let service = service().await;
    seed(&service, 5).await;

    let mut query = TableQuery::new();
    query.set_sort(Some(SortSpec::new("total", SortOrder::Desc)));
    let page = service.fetch_estimates_page(&query).await.unwrap();
    let totals: Vec<Decimal> = page.records.iter().map(|r| r.total).collect();
    assert_eq!(
        totals,
        vec![dec!(105), dec!(104), dec!(103), dec!(102), dec!(101)]
    );

    query.set_sort(Some(SortSpec::new("order_no", SortOrder::Asc)));
    let page = service.fetch_estimates_page(&query).await.unwrap();
    assert_eq!(page.records[0].order_no, "ORD-0001");
}

#[tokio::test]
async fn unknown_sort_key_falls_back_to_newest_first() {
    let service = service().await;
    seed(&service, 3).await;

    let mut query = TableQuery::new();
    query.set_sort(Some(SortSpec::new("nonsense", SortOrder::Asc)));
    let page = service.fetch_estimates_page(&query).await.unwrap();
    let ids: Vec<i64> = page.records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[tokio::test]
async fn free_text_query_narrows_page_and_total() {
    let service = service().await;
    seed(&service, 25).await;

    let mut query = TableQuery::new();
    query.set_query("ORD-0007");
    let page = service.fetch_estimates_page(&query).await.unwrap();
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.total, 1);
    assert_eq!(page.records[0].id, 7);
}

#[tokio::test]
async fn filter_object_restricts_by_stage() {
    let service = service().await;
    seed(&service, 25).await;

    let mut query = TableQuery::new();
    query.set_filter(EstimateFilter {
        stage: Some(WorkflowStage::Invoice),
        technician: None,
    });
    let page = service.fetch_estimates_page(&query).await.unwrap();
    assert_eq!(page.total, 6); // ids 4, 8, 12, 16, 20, 24
    assert!(
        page.records
            .iter()
            .all(|r| r.workflow == WorkflowStage::Invoice)
    );
}

#[tokio::test]
async fn status_update_round_trips_through_a_refetch() {
    let service = service().await;
    seed(&service, 50).await;

    let before = service
        .fetch_estimates_page(&TableQuery::new())
        .await
        .unwrap();
    assert_eq!(
        before.records.iter().find(|r| r.id == 42).unwrap().workflow,
        WorkflowStage::DroppedOff
    );

    service
        .update_estimate_status(42, WorkflowStage::InProgress)
        .await
        .unwrap();

    // Same descriptor, full page refetch: the server is the source of truth.
    let after = service
        .fetch_estimates_page(&TableQuery::new())
        .await
        .unwrap();
    let row = after.records.iter().find(|r| r.id == 42).unwrap();
    assert_eq!(row.workflow, WorkflowStage::InProgress);
    assert!(row.workflow_date.is_some());
}

#[tokio::test]
async fn status_update_for_missing_row_is_not_found() {
    let service = service().await;
    seed(&service, 3).await;

    let err = service
        .update_estimate_status(999, WorkflowStage::Invoice)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound));
}

#[tokio::test]
async fn workflow_counts_aggregate_the_whole_dataset() {
    let service = service().await;
    seed(&service, 25).await;

    let counts = service.fetch_workflow_counts().await.unwrap();
    assert_eq!(counts.all.status_count, 25);
    assert_eq!(counts.estimates.status_count, 7); // ids 1,5,...,25
    assert_eq!(counts.dropped_off.status_count, 6);
    assert_eq!(counts.in_progress.status_count, 6);
    assert_eq!(counts.invoices.status_count, 6);

    // Tab identity ids are fixed.
    assert_eq!(counts.all.id, 1);
    assert_eq!(counts.invoices.id, 5);
}

#[tokio::test]
async fn customer_insert_persists_contact_lists() {
    let service = service().await;

    let new_customer = NewCustomer {
        first_name: "Rowan".to_string(),
        last_name: "Patel".to_string(),
        phone_numbers: vec![
            PhoneEntry {
                phone_type: PhoneType::Mobile,
                number: "555-0101".to_string(),
            },
            PhoneEntry {
                phone_type: PhoneType::Work,
                number: "555-0102".to_string(),
            },
        ],
        emails: vec!["rowan@example.com".to_string()],
        preferred_contact: PreferredContact::Email,
        tags: None,
        note: Some("prefers morning appointments".to_string()),
        referral_source: Some("friend".to_string()),
        company: None,
        fleet: None,
        payment_terms: Some(PaymentTerms::Net30),
        on_shop_default: false,
        address: Some(CustomerAddress {
            country: "USA".to_string(),
            address1: "12 Elm St".to_string(),
            address2: None,
            city: "Portland".to_string(),
            state: "OR".to_string(),
            zip_code: "97201".to_string(),
        }),
        default_fee: Some(dec!(15.00)),
    };

    let customer = service.create_customer(new_customer).await.unwrap();
    assert!(customer.id > 0);
    assert_eq!(customer.phone_numbers.len(), 2);

    let phone_rows: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM customer_phones WHERE customer_id = ?")
            .bind(customer.id)
            .fetch_one(service.pool())
            .await
            .unwrap();
    assert_eq!(phone_rows, 2);

    let email_rows: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM customer_emails WHERE customer_id = ?")
            .bind(customer.id)
            .fetch_one(service.pool())
            .await
            .unwrap();
    assert_eq!(email_rows, 1);
}

#[tokio::test]
async fn ancillary_records_are_created() {
    let service = service().await;

    let tag = service
        .create_tag(NewTag {
            name: "fleet-priority".to_string(),
        })
        .await
        .unwrap();
    assert!(tag.id > 0);

    let source = service
        .create_referral_source(NewReferralSource {
            name: "radio ad".to_string(),
        })
        .await
        .unwrap();
    assert!(source.id > 0);

    let fleet = service
        .create_fleet(NewFleet {
            company_name: "Cascade Couriers".to_string(),
            phone_numbers: vec![PhoneEntry {
                phone_type: PhoneType::Office,
                number: "555-0199".to_string(),
            }],
            emails: vec!["dispatch@cascade.example".to_string()],
        })
        .await
        .unwrap();
    assert!(fleet.id > 0);
    assert_eq!(fleet.phone_numbers.len(), 1);
}
