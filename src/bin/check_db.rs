//! MySQL connection smoke test for the gravity_books database
//!
//! Run with: cargo run --bin check_db

use gravity_gateway::config::DbConfig;
use sqlx::mysql::MySqlConnection;
use sqlx::{Connection, Row};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = DbConfig::from_env();
    println!(
        "🔌 Connecting to {}@{}:{}/{} ...\n",
        config.user, config.host, config.port, config.database
    );

    let mut conn = MySqlConnection::connect(&config.url()).await?;
    println!("✅ Connected successfully!\n");

    println!("Sample titles from v_books:");
    let rows = sqlx::query("SELECT title FROM v_books LIMIT 3;")
        .fetch_all(&mut conn)
        .await?;
    for row in &rows {
        let title: String = row.try_get("title")?;
        println!(" - {}", title);
    }

    println!("\nBooks with 'gravity' in the title:");
    let rows = sqlx::query("SELECT DISTINCT title FROM book WHERE title LIKE '%gravity%';")
        .fetch_all(&mut conn)
        .await?;
    for row in &rows {
        let title: String = row.try_get("title")?;
        println!(" - {}", title);
    }

    conn.close().await?;
    println!("\n✅ Connection closed.");
    Ok(())
}
