use std::borrow::Cow;
use std::collections::HashMap;

use aws_config::BehaviorVersion;
use lambda_http::{Body, Error, Request, Response};
use serde_json::json;

use crate::model::CreateCustomer;
use crate::service::{CustomerService, ServiceError, DEFAULT_LIST_LIMIT};
use crate::store::{CustomerStore, DynamoStore, SsmTableSource, TableSource};
use crate::ui;

/// Deployment-stage path segments stripped before routing.
const STAGE_PREFIXES: [&str; 3] = ["dev", "staging", "prod"];

const CORS_HEADERS: [(&str, &str); 4] = [
    ("Content-Type", "application/json"),
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Headers",
        "Content-Type,X-Amz-Date,Authorization,X-Api-Key",
    ),
    ("Access-Control-Allow-Methods", "GET,POST,PUT,DELETE,OPTIONS"),
];

#[derive(Clone)]
pub struct Ctx<S, T> {
    pub store: S,
    pub tables: T,
}

impl Ctx<DynamoStore, SsmTableSource> {
    pub async fn new() -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self {
            store: DynamoStore::new(aws_sdk_dynamodb::Client::new(&config)),
            tables: SsmTableSource::from_env(aws_sdk_ssm::Client::new(&config)),
        }
    }
}

pub async fn router<S, T>(req: Request, ctx: &Ctx<S, T>) -> Result<Response<Body>, Error>
where
    S: CustomerStore,
    T: TableSource,
{
    // Resolved on every invocation, before any branching; the original
    // behavior this preserves means even a preflight hits the lookup.
    let table = match ctx.tables.table_name().await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("table lookup failed: {e}");
            return Ok(cors_json(500, json!({"error": "Internal server error"})));
        }
    };

    let method = req.method().clone();
    let path = normalize_path(req.uri().path()).into_owned();
    tracing::info!("{} {}", method, path);

    match (method.as_str(), path.as_str()) {
        ("OPTIONS", _) => Ok(preflight()),
        ("POST", p) if p.starts_with("/customers") => create_customer(req, ctx, &table).await,
        ("GET", p) if p.starts_with("/customers") => list_customers(req, ctx, &table).await,
        ("GET", _) => Ok(demo_page()),
        _ => Ok(cors_json(405, json!({"error": "Method not allowed"}))),
    }
}

async fn create_customer<S: CustomerStore, T>(
    req: Request,
    ctx: &Ctx<S, T>,
    table: &str,
) -> Result<Response<Body>, Error> {
    let body_bytes = match req.body() {
        Body::Text(s) => s.as_bytes().to_vec(),
        Body::Binary(b) => b.clone(),
        _ => Vec::new(),
    };
    // An absent body validates like an empty record.
    let raw: &[u8] = if body_bytes.is_empty() { b"{}" } else { &body_bytes };

    let payload: CreateCustomer = match serde_json::from_slice(raw) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("malformed request body: {e}");
            return Ok(cors_json(400, json!({"error": "Malformed request body"})));
        }
    };

    let service = CustomerService::new(&ctx.store, table);
    match service.create(payload).await {
        Ok(resp) => Ok(cors_json(201, serde_json::to_value(resp).unwrap())),
        Err(e) => Ok(error_response(e)),
    }
}

async fn list_customers<S: CustomerStore, T>(
    req: Request,
    ctx: &Ctx<S, T>,
    table: &str,
) -> Result<Response<Body>, Error> {
    let qp = req.uri().query().unwrap_or("");
    let params: HashMap<_, _> = url::form_urlencoded::parse(qp.as_bytes())
        .into_owned()
        .collect();
    // Bad input falls back to the default rather than erroring.
    let limit: i64 = params
        .get("limit")
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_LIST_LIMIT);

    let service = CustomerService::new(&ctx.store, table);
    match service.list(limit).await {
        Ok(resp) => Ok(cors_json(200, serde_json::to_value(resp).unwrap())),
        Err(e) => Ok(error_response(e)),
    }
}

fn error_response(e: ServiceError) -> Response<Body> {
    match e {
        ServiceError::MissingFields(_) => {
            tracing::error!("validation error: {e}");
            cors_json(400, json!({"error": e.to_string()}))
        }
        ServiceError::Store(detail) => {
            tracing::error!("store error: {detail}");
            cors_json(500, json!({"error": "Internal server error"}))
        }
    }
}

/// Strips a leading stage segment; every other path passes through unchanged.
fn normalize_path(path: &str) -> Cow<'_, str> {
    let Some(rest) = path.strip_prefix('/') else {
        return Cow::Borrowed(path);
    };
    let (first, tail) = rest.split_once('/').map_or((rest, ""), |(f, t)| (f, t));
    if !STAGE_PREFIXES.contains(&first) {
        return Cow::Borrowed(path);
    }
    if tail.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{tail}"))
    }
}

fn cors_json(status: u16, v: serde_json::Value) -> Response<Body> {
    let mut builder = Response::builder().status(status);
    for (name, value) in CORS_HEADERS {
        builder = builder.header(name, value);
    }
    builder.body(Body::Text(v.to_string())).unwrap()
}

fn preflight() -> Response<Body> {
    let mut builder = Response::builder().status(200);
    for (name, value) in CORS_HEADERS {
        builder = builder.header(name, value);
    }
    builder.body(Body::Empty).unwrap()
}

fn demo_page() -> Response<Body> {
    Response::builder()
        .status(200)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Body::Text(ui::DEMO_PAGE.to_string()))
        .unwrap()
}
