use std::collections::HashMap;

use aws_sdk_dynamodb as ddb;
use aws_sdk_ssm as ssm;
use ddb::types::AttributeValue as Av;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::CustomerRecord;

/// Opaque backend failure. The detail is for server-side logs only and must
/// never reach a response body.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StoreError(String);

impl StoreError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}

/// One bounded page of scan results, in store-native order.
#[derive(Debug, Clone)]
pub struct ScanPage {
    pub items: Vec<Value>,
    pub count: i32,
}

pub trait CustomerStore {
    async fn put_record(&self, table: &str, record: &CustomerRecord) -> Result<(), StoreError>;
    async fn scan_page(&self, table: &str, limit: i32) -> Result<ScanPage, StoreError>;
}

/// Resolves the backing table name. Looked up once per invocation.
pub trait TableSource {
    async fn table_name(&self) -> Result<String, StoreError>;
}

#[derive(Clone)]
pub struct DynamoStore {
    client: ddb::Client,
}

impl DynamoStore {
    pub fn new(client: ddb::Client) -> Self {
        Self { client }
    }
}

impl CustomerStore for DynamoStore {
    async fn put_record(&self, table: &str, record: &CustomerRecord) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(record_item(record)))
            .send()
            .await
            .map_err(|e| StoreError::new(format!("ddb put_item: {e:?}")))?;
        Ok(())
    }

    async fn scan_page(&self, table: &str, limit: i32) -> Result<ScanPage, StoreError> {
        let resp = self
            .client
            .scan()
            .table_name(table)
            .limit(limit)
            .send()
            .await
            .map_err(|e| StoreError::new(format!("ddb scan: {e:?}")))?;

        let items = resp.items().iter().map(item_json).collect();
        Ok(ScanPage {
            items,
            count: resp.count(),
        })
    }
}

fn record_item(record: &CustomerRecord) -> HashMap<String, Av> {
    let mut item = HashMap::new();
    item.insert("customer_id".into(), Av::S(record.customer_id.clone()));
    item.insert("name".into(), Av::S(record.name.clone()));
    item.insert("email".into(), Av::S(record.email.clone()));
    item.insert("company".into(), Av::S(record.company.clone()));
    item.insert("created_at".into(), Av::S(record.created_at.clone()));
    item.insert("status".into(), Av::S(record.status.clone()));
    if let Some(ttl) = record.expires_at {
        item.insert("expires_at".into(), Av::N(ttl.to_string()));
    }
    for (k, v) in &record.extra {
        item.insert(k.clone(), attr_value(v));
    }
    item
}

fn attr_value(v: &Value) -> Av {
    match v {
        Value::String(s) => Av::S(s.clone()),
        Value::Number(n) => Av::N(n.to_string()),
        Value::Bool(b) => Av::Bool(*b),
        Value::Null => Av::Null(true),
        // Nested values are stored as their JSON text.
        other => Av::S(other.to_string()),
    }
}

fn item_json(item: &HashMap<String, Av>) -> Value {
    let mut out = Map::new();
    for (k, v) in item {
        out.insert(k.clone(), json_value(v));
    }
    Value::Object(out)
}

fn json_value(av: &Av) -> Value {
    match av {
        Av::S(s) => Value::String(s.clone()),
        Av::N(n) => n
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| n.parse::<f64>().map(Value::from))
            .unwrap_or_else(|_| Value::String(n.clone())),
        Av::Bool(b) => Value::Bool(*b),
        _ => Value::Null,
    }
}

#[derive(Clone)]
pub struct SsmTableSource {
    client: ssm::Client,
    parameter: String,
}

impl SsmTableSource {
    pub fn from_env(client: ssm::Client) -> Self {
        let parameter = std::env::var("TABLE_NAME_PARAM")
            .unwrap_or_else(|_| "/customer-api/dynamodb/table-name".to_string());
        Self { client, parameter }
    }
}

impl TableSource for SsmTableSource {
    async fn table_name(&self) -> Result<String, StoreError> {
        let resp = self
            .client
            .get_parameter()
            .name(&self.parameter)
            .send()
            .await
            .map_err(|e| StoreError::new(format!("ssm get_parameter: {e:?}")))?;

        resp.parameter()
            .and_then(|p| p.value())
            .map(str::to_string)
            .ok_or_else(|| StoreError::new(format!("ssm parameter {} has no value", self.parameter)))
    }
}
