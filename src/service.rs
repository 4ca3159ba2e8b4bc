use chrono::{DateTime, Local};
use thiserror::Error;

use crate::model::{CreateCustomer, CreateResp, CustomerRecord, ListResp};
use crate::store::{CustomerStore, StoreError};
use crate::util::epoch_now;

pub const DEFAULT_LIST_LIMIT: i64 = 50;

// Effective scan limit bounds; anything outside is clamped, never rejected.
const MIN_LIST_LIMIT: i64 = 1;
const MAX_LIST_LIMIT: i64 = 200;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct CustomerService<'a, S> {
    store: &'a S,
    table: &'a str,
}

impl<'a, S: CustomerStore> CustomerService<'a, S> {
    pub fn new(store: &'a S, table: &'a str) -> Self {
        Self { store, table }
    }

    pub async fn create(&self, payload: CreateCustomer) -> Result<CreateResp, ServiceError> {
        let missing = missing_fields(&payload);
        if !missing.is_empty() {
            return Err(ServiceError::MissingFields(missing));
        }

        let now = Local::now();
        let record = CustomerRecord {
            customer_id: customer_id(&now),
            name: payload.name.unwrap_or_default(),
            email: payload.email.unwrap_or_default(),
            company: payload.company.unwrap_or_default(),
            created_at: created_at(&now),
            status: "active".to_string(),
            expires_at: expiry(epoch_now(), ttl_days()),
            extra: payload.extra,
        };

        self.store.put_record(self.table, &record).await?;
        tracing::info!("customer created: {}", record.customer_id);

        Ok(CreateResp {
            message: "Customer created successfully".to_string(),
            customer_id: record.customer_id,
        })
    }

    pub async fn list(&self, requested: i64) -> Result<ListResp, ServiceError> {
        let limit = requested.clamp(MIN_LIST_LIMIT, MAX_LIST_LIMIT) as i32;
        let page = self.store.scan_page(self.table, limit).await?;
        Ok(ListResp {
            count: page.count,
            items: page.items,
        })
    }
}

/// Only key absence counts as missing; present-but-empty values pass.
fn missing_fields(payload: &CreateCustomer) -> Vec<String> {
    let mut missing = Vec::new();
    if payload.name.is_none() {
        missing.push("name".to_string());
    }
    if payload.email.is_none() {
        missing.push("email".to_string());
    }
    if payload.company.is_none() {
        missing.push("company".to_string());
    }
    missing
}

// Second-granularity ids collide for creates landing in the same second;
// accepted property of the scheme, not a bug to fix here.
fn customer_id(now: &DateTime<Local>) -> String {
    format!("cust_{}", now.format("%Y%m%d%H%M%S"))
}

fn created_at(now: &DateTime<Local>) -> String {
    now.naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

fn ttl_days() -> u64 {
    std::env::var("CUSTOMER_TTL_DAYS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

fn expiry(created_epoch: u64, ttl_days: u64) -> Option<u64> {
    (ttl_days > 0).then(|| created_epoch + ttl_days * 86_400)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::testing::MemStore;

    fn payload(v: serde_json::Value) -> CreateCustomer {
        serde_json::from_value(v).unwrap()
    }

    fn full_payload() -> CreateCustomer {
        payload(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "company": "Analytical Engines"
        }))
    }

    #[tokio::test]
    async fn create_rejects_missing_fields_in_order() {
        let store = MemStore::default();
        let svc = CustomerService::new(&store, "customers");

        let err = svc.create(payload(json!({"email": "a@b.c"}))).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required fields: name, company"
        );

        let err = svc.create(payload(json!({}))).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required fields: name, email, company"
        );
        assert!(store.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_strings_are_not_missing() {
        let store = MemStore::default();
        let svc = CustomerService::new(&store, "customers");

        let resp = svc
            .create(payload(json!({"name": "", "email": "", "company": ""})))
            .await
            .unwrap();
        assert!(resp.customer_id.starts_with("cust_"));
    }

    #[tokio::test]
    async fn create_persists_derived_fields() {
        let store = MemStore::default();
        let svc = CustomerService::new(&store, "customers");

        let resp = svc.create(full_payload()).await.unwrap();
        assert_eq!(resp.message, "Customer created successfully");

        let records = store.records.lock().unwrap();
        let rec = &records[0];
        assert_eq!(rec.customer_id, resp.customer_id);
        assert_eq!(rec.status, "active");

        let digits = rec.customer_id.strip_prefix("cust_").unwrap();
        assert_eq!(digits.len(), 14);
        assert!(digits.bytes().all(|b| b.is_ascii_digit()));
    }

    #[tokio::test]
    async fn extra_fields_survive_to_the_record() {
        let store = MemStore::default();
        let svc = CustomerService::new(&store, "customers");

        let mut p = full_payload();
        p.extra.insert("tier".into(), json!("gold"));
        svc.create(p).await.unwrap();

        let records = store.records.lock().unwrap();
        assert_eq!(records[0].extra.get("tier"), Some(&json!("gold")));
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_store_error() {
        let store = MemStore::failing();
        let svc = CustomerService::new(&store, "customers");

        let err = svc.create(full_payload()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));
    }

    #[tokio::test]
    async fn list_clamps_the_scan_limit() {
        let store = MemStore::default();
        let svc = CustomerService::new(&store, "customers");

        for requested in [0, -5, 1000, 50, 200] {
            svc.list(requested).await.unwrap();
        }
        assert_eq!(*store.scan_limits.lock().unwrap(), vec![1, 1, 200, 50, 200]);
    }

    #[tokio::test]
    async fn list_returns_count_and_items() {
        let store = MemStore::default();
        let svc = CustomerService::new(&store, "customers");

        svc.create(full_payload()).await.unwrap();
        let resp = svc.list(DEFAULT_LIST_LIMIT).await.unwrap();
        assert_eq!(resp.count, 1);
        assert_eq!(resp.items[0]["name"], json!("Ada"));
    }

    #[tokio::test]
    async fn positive_ttl_sets_expiry_days_out() {
        std::env::set_var("CUSTOMER_TTL_DAYS", "7");
        let store = MemStore::default();
        let svc = CustomerService::new(&store, "customers");
        svc.create(full_payload()).await.unwrap();
        std::env::remove_var("CUSTOMER_TTL_DAYS");

        let records = store.records.lock().unwrap();
        let exp = records[0].expires_at.unwrap();
        let want = epoch_now() + 7 * 86_400;
        assert!(want.abs_diff(exp) <= 2);
    }

    #[test]
    fn expiry_is_days_after_creation() {
        assert_eq!(expiry(1_000_000, 7), Some(1_000_000 + 7 * 86_400));
        assert_eq!(expiry(1_000_000, 1), Some(1_086_400));
        assert_eq!(expiry(1_000_000, 0), None);
    }

    #[test]
    fn id_and_timestamp_come_from_the_same_instant() {
        let now = Local::now();
        let id = customer_id(&now);
        let ts = created_at(&now);
        // cust_YYYYMMDDHHMMSS against YYYY-MM-DDTHH:MM:SS.ffffff
        assert_eq!(&id[5..9], &ts[0..4]);
        assert_eq!(&id[9..11], &ts[5..7]);
        assert_eq!(&id[11..13], &ts[8..10]);
    }
}
