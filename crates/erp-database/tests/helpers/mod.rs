//! Shared helpers for the PostgreSQL integration tests.
//!
//! Tests run against `TEST_DATABASE_URL` (or `DATABASE_URL`) and are skipped
//! when neither is set. Every test works on rows named with a unique tag so
//! tests can share one database without truncating it.

#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use erp_core::types::id::{ProductAttributeId, ProductId};
use erp_database::migration::run_migrations;

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Connect and migrate, or `None` when no database is configured.
pub async fn maybe_pool(test_name: &str) -> Option<PgPool> {
    let Ok(database_url) =
        std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL"))
    else {
        eprintln!("Skipping {test_name}: TEST_DATABASE_URL/DATABASE_URL is not set.");
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(8)
        .connect(&database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Skipping {test_name}: database is unreachable ({e}).");
            return None;
        }
    };

    run_migrations(&pool).await.expect("migrations should run");
    Some(pool)
}

/// A tag unique to this process and call, for names and prefixes.
pub fn unique(label: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .subsec_nanos();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{label}-{}-{nanos}-{n}", std::process::id())
}

/// Insert a product variant and return its id.
pub async fn insert_product(pool: &PgPool, name: &str) -> ProductId {
    sqlx::query_scalar("INSERT INTO product_products (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("product insert should succeed")
}

/// Insert a product attribute and return its id.
pub async fn insert_attribute(pool: &PgPool, name: &str) -> ProductAttributeId {
    sqlx::query_scalar("INSERT INTO product_attributes (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("attribute insert should succeed")
}

/// Rows in `table` whose `name` equals `name`.
pub async fn count_named(pool: &PgPool, table: &str, name: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} WHERE name = $1"))
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("count should succeed")
}

/// In-memory sink for the log lines emitted on the current thread.
#[derive(Debug, Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Route this thread's `tracing` output into the capture until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Everything captured so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
    }

    /// The captured lines containing `message`.
    pub fn lines_with(&self, message: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(message))
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
