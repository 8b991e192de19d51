//! End-to-end service tests against the in-memory recording adapter.

mod common;

use common::{shared, users_mysql, users_postgres, RecordingAdapter};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use table_view_sql::domain::predicate::SqlValue;
use table_view_sql::{
    ColumnDescriptor, ColumnFilter, DataTableService, DiagnosticKind, EngineError,
    FilterRequest, PageRequest, QueryRequest, SchemaError, ServiceOptions,
};

fn service(adapter: Arc<RecordingAdapter>, options: ServiceOptions) -> DataTableService {
    DataTableService::new(adapter, options)
}

fn users_request() -> QueryRequest {
    QueryRequest::new(
        "users",
        vec![
            ColumnDescriptor::new("id"),
            ColumnDescriptor::new("name"),
            ColumnDescriptor::new("active"),
        ],
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn users_example_end_to_end() {
    let adapter = shared(users_postgres());
    let service = service(adapter.clone(), ServiceOptions::default());

    let filter = FilterRequest::default()
        .with_column(ColumnFilter::new("id", "").searchable(false))
        .with_global("jo", false);
    let request = users_request()
        .with_filter(filter)
        .with_page(PageRequest::new(0, 10))
        .with_draw(json!(7));

    let outcome = service.process(request).await.unwrap();
    let body = serde_json::to_value(&outcome.response).unwrap();

    assert_eq!(
        body,
        json!({
            "draw": 7,
            "recordsTotal": 3,
            "recordsFiltered": 2,
            "data": [
                { "id": 1, "name": "john", "active": true },
                { "id": 2, "name": "joanna", "active": false }
            ]
        })
    );
    assert!(outcome
        .diagnostics
        .has("active", |k| matches!(k, DiagnosticKind::ValueParseSkip { .. })));

    let statements = adapter.statements();
    assert_eq!(statements.len(), 3);
    assert!(statements[0].sql.starts_with("SELECT \"id\"::text AS \"id\""));
    assert_eq!(statements[1].sql, r#"SELECT COUNT(*) FROM "users" WHERE ("name" ILIKE $1)"#);
    assert_eq!(statements[1].values, vec![SqlValue::Text("%jo%".to_string())]);
    assert_eq!(statements[2].sql, r#"SELECT COUNT(*) FROM "users""#);
}

#[tokio::test]
async fn draw_is_echoed_verbatim() {
    let service = service(shared(users_mysql()), ServiceOptions::default());
    for draw in [json!("abc"), json!(42), json!(null), json!({ "nested": [1, 2] })] {
        let outcome = service
            .process(users_request().with_draw(draw.clone()))
            .await
            .unwrap();
        assert_eq!(serde_json::to_value(&outcome.response.draw).unwrap(), draw);
    }
}

#[tokio::test]
async fn transforms_and_exposed_names_shape_the_records() {
    let adapter = RecordingAdapter::postgres()
        .with_table("users", &[("id", "int4"), ("name", "text")])
        .with_rows(vec![json!({ "id": 1, "name": "john" }), json!({ "id": 2, "name": null })])
        .with_counts(2, 2);
    let service = service(shared(adapter), ServiceOptions::default());

    let request = QueryRequest::new(
        "users",
        vec![
            ColumnDescriptor::new("id").exposed_as("key"),
            ColumnDescriptor::new("name").with_transform(|v, row| match v.as_str() {
                Some(s) => json!(format!("{}#{}", s.to_uppercase(), row["id"])),
                None => json!("-"),
            }),
        ],
    );
    let outcome = service.process(request).await.unwrap();

    assert_eq!(
        serde_json::to_value(&outcome.response.data).unwrap(),
        json!([{ "key": 1, "name": "JOHN#1" }, { "key": 2, "name": "-" }])
    );
}

#[tokio::test]
async fn missing_schema_columns_format_as_null() {
    let adapter = RecordingAdapter::postgres()
        .with_table("users", &[("id", "int4")])
        .with_rows(vec![json!({ "id": 1 })])
        .with_counts(1, 1);
    let service = service(shared(adapter), ServiceOptions::default());

    let request = QueryRequest::new("users", vec![ColumnDescriptor::new("id"), ColumnDescriptor::new("ghost")]);
    let outcome = service.process(request).await.unwrap();

    assert_eq!(
        serde_json::to_value(&outcome.response.data).unwrap(),
        json!([{ "id": 1, "ghost": null }])
    );
    assert!(outcome
        .diagnostics
        .has("ghost", |k| *k == DiagnosticKind::MissingSchemaColumn));
}

#[tokio::test]
async fn records_filtered_never_exceeds_total() {
    let adapter = users_postgres().with_counts(9, 4);
    let service = service(shared(adapter), ServiceOptions::default());

    let request = users_request().with_filter(FilterRequest::default().with_global("jo", false));
    let outcome = service.process(request).await.unwrap();

    assert_eq!(outcome.response.records_total, 4);
    assert_eq!(outcome.response.records_filtered, 4);
}

#[tokio::test]
async fn schema_is_cached_per_table() {
    let adapter = shared(users_postgres());
    let service = service(adapter.clone(), ServiceOptions::default());

    service.process(users_request()).await.unwrap();
    service.process(users_request()).await.unwrap();

    assert_eq!(adapter.describe_calls(), 1);
    assert_eq!(service.cache().unwrap().len().await, 1);

    service.cache().unwrap().invalidate("users").await;
    service.process(users_request()).await.unwrap();
    assert_eq!(adapter.describe_calls(), 2);
}

#[tokio::test]
async fn disabled_cache_describes_every_request() {
    let adapter = shared(users_postgres());
    let service = service(
        adapter.clone(),
        ServiceOptions {
            schema_cache: false,
            timeout: None,
        },
    );

    service.process(users_request()).await.unwrap();
    service.process(users_request()).await.unwrap();

    assert!(service.cache().is_none());
    assert_eq!(adapter.describe_calls(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_requests_agree_on_schema() {
    let adapter = shared(users_postgres().with_delay(Duration::from_millis(20)));
    let service = Arc::new(service(adapter.clone(), ServiceOptions::default()));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move { service.describe("users").await }));
    }
    let mut schemas = Vec::new();
    for handle in handles {
        schemas.push(handle.await.unwrap().unwrap());
    }

    assert!(schemas.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(service.cache().unwrap().len().await, 1);
}

#[tokio::test]
async fn slow_database_times_out() {
    let adapter = users_postgres().with_delay(Duration::from_millis(200));
    let service = service(
        shared(adapter),
        ServiceOptions {
            schema_cache: true,
            timeout: Some(Duration::from_millis(20)),
        },
    );

    let err = service.process(users_request()).await.unwrap_err();
    match err {
        EngineError::Timeout { dialect, table, .. } => {
            assert_eq!(dialect, "postgres");
            assert_eq!(table, "users");
        }
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn unknown_table_is_a_schema_error() {
    let service = service(shared(users_postgres()), ServiceOptions::default());
    let err = service
        .process(QueryRequest::new("orders", vec![ColumnDescriptor::new("id")]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::Schema(SchemaError::TableNotFound { ref table, .. }) if table == "orders"
    ));
    assert!(err.to_string().contains("orders"));
}

#[tokio::test]
async fn execution_failures_carry_table_and_dialect() {
    let service = service(shared(users_mysql().failing_execution()), ServiceOptions::default());
    let err = service.process(users_request()).await.unwrap_err();

    match err {
        EngineError::Execution(e) => {
            assert_eq!(e.dialect, "mysql");
            assert_eq!(e.table, "users");
        }
        other => panic!("expected execution error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_requests_are_rejected_before_touching_the_database() {
    let adapter = shared(users_postgres());
    let service = service(adapter.clone(), ServiceOptions::default());

    let duplicate = QueryRequest::new(
        "users",
        vec![ColumnDescriptor::new("id"), ColumnDescriptor::new("name").exposed_as("id")],
    );
    let empty_table = QueryRequest::new(" ", vec![ColumnDescriptor::new("id")]);
    let no_columns = QueryRequest::new("users", vec![]);

    for request in [duplicate, empty_table, no_columns] {
        let err = service.process(request).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidRequest(_)));
    }
    assert_eq!(adapter.describe_calls(), 0);
    assert!(adapter.statements().is_empty());
}

#[tokio::test]
async fn compile_alone_needs_no_database() {
    let adapter = shared(users_postgres());
    let service = service(adapter.clone(), ServiceOptions::default());
    let schema = service.describe("users").await.unwrap();

    let request = users_request().with_filter(FilterRequest::default().with_column(ColumnFilter::new("id", "x")));
    let (plan, diagnostics) = service.compile(&request, &schema).unwrap();

    assert!(!plan.filtered_count.sql.contains("WHERE"));
    assert_eq!(diagnostics.len(), 1);
    assert!(adapter.statements().is_empty());
}
