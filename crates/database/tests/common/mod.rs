//! Shared setup for the database integration tests.
//!
//! The tests need a PostgreSQL database reachable through
//! `DAQSS_TEST_DATABASE_URL`. The schema is applied once per test binary and
//! every test works on uniquely named rows, so tests can run in parallel
//! against the same database.

#![allow(dead_code)]

use anyhow::Context;
use core_types::DqMetric;
use database::Daqss;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;
use uuid::Uuid;

const SCHEMA_SQL: &str = include_str!("../../sql/daqss.sql");

static SCHEMA: OnceCell<()> = OnceCell::const_new();

pub async fn setup() -> anyhow::Result<Daqss> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let url = std::env::var("DAQSS_TEST_DATABASE_URL")
        .context("DAQSS_TEST_DATABASE_URL must be set to run the database tests")?;
    let pool = PgPoolOptions::new().max_connections(2).connect(&url).await?;

    SCHEMA
        .get_or_try_init(|| async {
            sqlx::raw_sql(SCHEMA_SQL).execute(&pool).await.map(|_| ())
        })
        .await?;

    Ok(Daqss::from_pool(pool))
}

/// A name no other test run has used.
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

pub async fn count_rows(daqss: &Daqss, query: &str, key: &str) -> anyhow::Result<i64> {
    let count: i64 = sqlx::query_scalar(query).bind(key).fetch_one(daqss.pool()).await?;
    Ok(count)
}

/// A serializable DQ metric used to exercise metric storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completeness {
    pub name: String,
    pub column: String,
    pub threshold: f64,
}

impl DqMetric for Completeness {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        Some("Share of non-missing values in a column.")
    }
}

/// Log output captured on the current thread.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contains(&self, text: &str) -> bool {
        let buffer = self.0.lock().unwrap();
        String::from_utf8_lossy(&buffer).contains(text)
    }
}

pub struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedWriter(self.0.clone())
    }
}

/// Routes every event emitted on this thread into a buffer until the guard
/// drops. `#[tokio::test]` runs on a current-thread runtime, so this covers
/// everything the façade logs during the test.
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}
