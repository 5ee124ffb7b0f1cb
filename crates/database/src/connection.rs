use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::time::Duration;

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the driver connection options from the DaQSS settings.
///
/// Missing credentials are left unset. The driver then uses its defaults: the
/// username comes from `PGUSER` or the OS user, and no password is sent.
/// `.pgpass` files are never consulted.
pub fn connect_options(settings: &DatabaseSettings) -> Result<PgConnectOptions, DbError> {
    let (host, port) = settings.host_and_port()?;

    let mut options = PgConnectOptions::new_without_pgpass()
        .host(host)
        .port(port)
        .database(&settings.database);
    if let Some(username) = &settings.username {
        options = options.username(username);
    }
    if let Some(password) = &settings.password {
        options = options.password(password);
    }

    Ok(options)
}

/// Creates the connection factory for the façade.
///
/// No connection is opened here. Each operation acquires one connection when
/// it runs and releases it when the guard drops. Must be called from within a
/// Tokio runtime.
pub fn connect_lazy(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    let options = connect_options(settings)?;

    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_lazy_with(options);

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(host: &str) -> DatabaseSettings {
        DatabaseSettings {
            username: Some("alice".to_string()),
            password: Some("secret".to_string()),
            host: host.to_string(),
            database: "quality".to_string(),
        }
    }

    #[test]
    fn options_follow_settings() {
        let options = connect_options(&settings("db.internal:6543")).unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "alice");
        assert_eq!(options.get_database(), Some("quality"));
    }

    #[test]
    fn ipv6_host_is_passed_without_brackets() {
        let options = connect_options(&settings("[::1]:5433")).unwrap();
        assert_eq!(options.get_host(), "::1");
        assert_eq!(options.get_port(), 5433);
    }

    #[test]
    fn missing_username_falls_back_to_driver_default() {
        let mut anonymous = settings("localhost:5432");
        anonymous.username = None;
        anonymous.password = None;

        let options = connect_options(&anonymous).unwrap();
        let driver_default = PgConnectOptions::new_without_pgpass();
        assert_eq!(options.get_username(), driver_default.get_username());
    }

    #[test]
    fn malformed_port_is_a_configuration_error() {
        let result = connect_options(&settings("db.internal:abc"));
        assert!(matches!(result, Err(DbError::ConnectionConfigError(_))));
    }

    #[tokio::test]
    async fn lazy_factory_does_not_touch_the_network() {
        // Nothing listens on port 1; building the factory must still succeed.
        let pool = connect_lazy(&settings("127.0.0.1:1")).unwrap();
        assert_eq!(pool.size(), 0);
    }
}
