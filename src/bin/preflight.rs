use table_view_sql::infra::config::{DatabaseConfig, ServiceConfig};
use table_view_sql::infra::telemetry::init_tracing;
use table_view_sql::{storage, ViewRegistry};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [TABLE ...]\n\
         \n\
         Connects with the DB_* / DATABASE_URL settings, pings the database and\n\
         prints the type category of every column of each TABLE. Without\n\
         arguments, the tables of all views in VIEWS_FILE are checked.\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    let db_config = DatabaseConfig::from_env()?;
    let service_config = ServiceConfig::from_env()?;

    println!("> Preflight:");
    println!("  DB_DIALECT={}", db_config.dialect.dialect().name());
    match &db_config.url {
        Some(_) => println!("  DATABASE_URL=<set>"),
        None => println!(
            "  {}@{}:{}/{}",
            db_config.user, db_config.host, db_config.port, db_config.database
        ),
    }

    // Tables to check: CLI args, else every configured view.
    let tables: Vec<String> = if args.is_empty() {
        let views = ViewRegistry::load(&service_config.views_file)?;
        println!("  VIEWS_FILE={} ({} views)", service_config.views_file, views.len());
        let mut tables: Vec<String> = views
            .names()
            .iter()
            .filter_map(|name| views.get(name))
            .map(|view| view.table.clone())
            .collect();
        tables.sort();
        tables.dedup();
        tables
    } else {
        args
    };

    let adapter = storage::connect(&db_config).await?;
    adapter
        .ping()
        .await
        .map_err(|e| anyhow::anyhow!("Database ping failed: {}", e))?;
    println!("  Database is reachable.");

    let mut failures = 0usize;
    for table in &tables {
        match adapter.describe(table).await {
            Ok(columns) => {
                println!("  Table {}:", table);
                for column in columns {
                    println!(
                        "    {:<32} {:<24} {}",
                        column.source, column.raw_type, column.category
                    );
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("  Error: {}", e);
            }
        }
    }

    if failures > 0 {
        return Err(anyhow::anyhow!("{} table(s) could not be described", failures));
    }
    println!("> Preflight OK.");
    Ok(())
}
