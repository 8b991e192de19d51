//! Round trips against a real database.
//!
//! Runs only when `DATABASE_URL` is set (with `DB_DIALECT` naming its family);
//! otherwise every test returns early with a message.

use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use table_view_sql::infra::config::DatabaseConfig;
use table_view_sql::{
    BaseConditions, ColumnDescriptor, ColumnFilter, Condition, DataTableService, DatabaseAdapter,
    DialectKind, Direction, FilterRequest, MySqlAdapter, OrderKey, PageRequest, PostgresAdapter,
    QueryOutcome, QueryRequest, ServiceOptions, TypeCategory,
};

const TABLE: &str = "tvs_live_people";

async fn setup() -> Result<Option<Arc<dyn DatabaseAdapter>>, Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    if std::env::var("DATABASE_URL").is_err() {
        println!("DATABASE_URL not set; skipping live database test");
        return Ok(None);
    }
    let config = DatabaseConfig::from_env()?;

    let statements: Vec<String> = match config.dialect {
        DialectKind::Postgres => vec![
            format!("DROP TABLE IF EXISTS {}", TABLE),
            format!(
                "CREATE TABLE {} (id INTEGER PRIMARY KEY, name TEXT, score DOUBLE PRECISION, active BOOLEAN, born DATE, seen_at TIMESTAMP, meta JSONB)",
                TABLE
            ),
            format!(
                "INSERT INTO {} VALUES \
                 (1, 'John', 10.5, true, '1990-01-02', '2024-01-01 10:00:00', '{{}}'), \
                 (2, 'Joanna', 2.5, false, '1991-03-04', '2024-01-02 11:00:00', NULL), \
                 (3, '50% off', 3.5, true, NULL, NULL, NULL), \
                 (10, 'Mary', NULL, NULL, '1990-01-02', '2024-01-01 10:00:00', NULL)",
                TABLE
            ),
        ],
        DialectKind::MySql => vec![
            format!("DROP TABLE IF EXISTS {}", TABLE),
            format!(
                "CREATE TABLE {} (id INT PRIMARY KEY, name VARCHAR(64), score DOUBLE, active TINYINT(1), born DATE, seen_at DATETIME, meta JSON)",
                TABLE
            ),
            format!(
                "INSERT INTO {} VALUES \
                 (1, 'John', 10.5, 1, '1990-01-02', '2024-01-01 10:00:00', '{{}}'), \
                 (2, 'Joanna', 2.5, 0, '1991-03-04', '2024-01-02 11:00:00', NULL), \
                 (3, '50% off', 3.5, 1, NULL, NULL, NULL), \
                 (10, 'Mary', NULL, NULL, '1990-01-02', '2024-01-01 10:00:00', NULL)",
                TABLE
            ),
        ],
    };

    let adapter: Arc<dyn DatabaseAdapter> = match config.dialect {
        DialectKind::Postgres => {
            let adapter = PostgresAdapter::connect(&config).await?;
            for sql in &statements {
                sqlx::query(sql).execute(adapter.pool()).await?;
            }
            Arc::new(adapter)
        }
        DialectKind::MySql => {
            let adapter = MySqlAdapter::connect(&config).await?;
            for sql in &statements {
                sqlx::query(sql).execute(adapter.pool()).await?;
            }
            Arc::new(adapter)
        }
    };
    Ok(Some(adapter))
}

fn people() -> Vec<ColumnDescriptor> {
    ["id", "name", "score", "active", "born", "seen_at", "meta"]
        .into_iter()
        .map(ColumnDescriptor::new)
        .collect()
}

// One test so the scratch table is never rebuilt underneath a concurrent test.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn live_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let Some(adapter) = setup().await? else {
        return Ok(());
    };

    let schema = adapter.describe(TABLE).await?;
    let category = |name: &str| schema.iter().find(|c| c.source == name).map(|c| c.category);
    assert_eq!(category("id"), Some(TypeCategory::Integer));
    assert_eq!(category("name"), Some(TypeCategory::Text));
    assert_eq!(category("score"), Some(TypeCategory::Float));
    assert_eq!(category("active"), Some(TypeCategory::Boolean));
    assert_eq!(category("born"), Some(TypeCategory::Date));
    assert_eq!(category("seen_at"), Some(TypeCategory::DateTime));
    assert_eq!(category("meta"), Some(TypeCategory::Unknown));
    assert!(adapter.describe("tvs_no_such_table").await.is_err());

    let service = DataTableService::new(adapter, ServiceOptions::default());
    let run = |filter: FilterRequest| {
        QueryRequest::new(TABLE, people())
            .with_filter(filter)
            .with_page(PageRequest::new(0, 100))
    };

    // Filtered count agrees with a page spanning the whole filtered set.
    for filter in [
        FilterRequest::default(),
        FilterRequest::default().with_global("jo", false),
        FilterRequest::default().with_column(ColumnFilter::new("id", "abc")),
        FilterRequest::default().with_column(ColumnFilter::new("active", "true")),
        FilterRequest::default().with_column(ColumnFilter::new("born", "1990-01-02")),
        FilterRequest::default().with_column(ColumnFilter::new("seen_at", "2024-01-01 10:00:00")),
        FilterRequest::default().with_column(ColumnFilter::new("score", "2.5")),
        FilterRequest::default().with_column(ColumnFilter::new("name", "^jo").regex(true)),
    ] {
        let outcome = service.process(run(filter.clone())).await?;
        assert_eq!(
            outcome.response.records_filtered as usize,
            outcome.response.data.len(),
            "filter {:?}",
            filter
        );
        assert_eq!(outcome.response.records_total, 4);
    }

    let jo = service.process(run(FilterRequest::default().with_global("jo", false))).await?;
    assert_eq!(jo.response.records_filtered, 2);

    let literal = service
        .process(run(FilterRequest::default().with_column(ColumnFilter::new("name", "50%"))))
        .await?;
    assert_eq!(literal.response.records_filtered, 1);
    assert_eq!(literal.response.data[0]["name"], json!("50% off"));

    let decoded = service
        .process(run(FilterRequest::default().with_column(ColumnFilter::new("id", "1"))))
        .await?;
    let row = &decoded.response.data[0];
    assert_eq!(row["id"], json!(1));
    assert_eq!(row["score"], json!(10.5));
    assert_eq!(row["active"], json!(true));
    assert_eq!(row["born"], json!("1990-01-02"));

    // Numeric columns sort by value, not by their text rendering.
    let ids = |outcome: &QueryOutcome| -> Vec<JsonValue> {
        outcome.response.data.iter().map(|row| row["id"].clone()).collect()
    };
    let by_id = service
        .process(run(FilterRequest::default()).with_order(vec![OrderKey::new("id", Direction::Desc)]))
        .await?;
    assert_eq!(ids(&by_id), vec![json!(10), json!(3), json!(2), json!(1)]);

    let by_score = service
        .process(
            run(FilterRequest::default().with_column(ColumnFilter::new("active", "true")))
                .with_order(vec![OrderKey::new("score", Direction::Asc)]),
        )
        .await?;
    assert_eq!(ids(&by_score), vec![json!(3), json!(1)]);

    let page = service
        .process(
            QueryRequest::new(TABLE, people())
                .with_order(vec![OrderKey::new("id", Direction::Asc)])
                .with_page(PageRequest::new(1, 2)),
        )
        .await?;
    assert_eq!(ids(&page), vec![json!(2), json!(3)]);

    let scoped = service
        .process(run(FilterRequest::default()).with_base(BaseConditions {
            result: vec![Condition::eq("active", true)],
            all: vec![Condition::is_not_null("name")],
        }))
        .await?;
    assert_eq!(scoped.response.records_filtered, 2);
    assert_eq!(scoped.response.records_total, 4);

    Ok(())
}
