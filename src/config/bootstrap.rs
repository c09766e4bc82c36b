//! Runtime bootstrap: resolves database coordinates from the environment and,
//! outside the local environment, credentials from the secret repository.

use std::str::FromStr;
use std::sync::Arc;

use crate::config::env::VariableSource;
use crate::config::loader::ConfigError;
use crate::secrets::{SecretRepository, LATEST_VERSION};

/// `ENV` value selecting locally supplied credentials.
pub const LOCAL_ENV: &str = "local";

const DEFAULT_DB_PORT: u16 = 5432;

/// TLS mode for PostgreSQL connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SslMode {
    #[default]
    Disable,
    Allow,
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl FromStr for SslMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disable" => Ok(SslMode::Disable),
            "allow" => Ok(SslMode::Allow),
            "prefer" => Ok(SslMode::Prefer),
            "require" => Ok(SslMode::Require),
            "verify-ca" => Ok(SslMode::VerifyCa),
            "verify-full" => Ok(SslMode::VerifyFull),
            _ => Err(()),
        }
    }
}

/// How to reach the database.
#[derive(Clone, PartialEq, Eq)]
pub enum DatabaseConfig {
    /// Full connection URL (`postgres://…`, `sqlite:…`).
    Url(String),
    /// Individual PostgreSQL connection parameters.
    Params {
        host: String,
        port: u16,
        name: String,
        user: Option<String>,
        password: Option<String>,
        ssl_mode: SslMode,
    },
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseConfig::Url(url) => {
                let scheme = url.split(':').next().unwrap_or_default();
                write!(f, "Url({scheme}:<redacted>)")
            }
            DatabaseConfig::Params {
                host,
                port,
                name,
                user,
                password,
                ssl_mode,
            } => f
                .debug_struct("Params")
                .field("host", host)
                .field("port", port)
                .field("name", name)
                .field("user", user)
                .field("password", &password.as_ref().map(|_| "<redacted>"))
                .field("ssl_mode", ssl_mode)
                .finish(),
        }
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub database: DatabaseConfig,
}

impl AppConfig {
    pub fn is_local(&self) -> bool {
        self.env == LOCAL_ENV
    }
}

/// Where the database credentials live in the secret store.
#[derive(Debug, Clone, Default)]
pub struct SecretCoordinates {
    pub project_number: String,
    pub db_user_key: String,
    pub db_password_key: String,
}

impl SecretCoordinates {
    pub fn from_vars(vars: &dyn VariableSource) -> Self {
        Self {
            project_number: vars.var("GCP_PROJECT_NUMBER").unwrap_or_default(),
            db_user_key: vars.var("DB_USER_KEY").unwrap_or_default(),
            db_password_key: vars.var("DB_PASSWORD_KEY").unwrap_or_default(),
        }
    }
}

/// Database credentials fetched from the secret store.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    pub db_user: Option<String>,
    pub db_password: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("db_user", &self.db_user)
            .field("db_password", &self.db_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Resolves `AppConfig` from environment variables and the secret repository.
pub struct Bootstrap {
    vars: Arc<dyn VariableSource>,
    secrets: Option<Arc<dyn SecretRepository>>,
}

impl Bootstrap {
    pub fn new(
        vars: Arc<dyn VariableSource>,
        secrets: Option<Arc<dyn SecretRepository>>,
    ) -> Self {
        Self { vars, secrets }
    }

    /// Resolve the runtime configuration.
    pub async fn load(&self) -> Result<AppConfig, ConfigError> {
        let env = self.vars.var("ENV").unwrap_or_default();
        tracing::info!(env = %env, "Using configuration");

        if let Some(url) = self.vars.var("DATABASE_URL") {
            return Ok(AppConfig {
                env,
                database: DatabaseConfig::Url(url),
            });
        }

        let host = self.required("DB_HOST")?;
        let name = self.required("DB_NAME")?;
        let port = match self.vars.var("DB_PORT") {
            Some(port) => port.parse().map_err(|_| ConfigError::InvalidVariable {
                key: "DB_PORT",
                value: port.clone(),
            })?,
            None => DEFAULT_DB_PORT,
        };
        let ssl_mode = match self.vars.var("DB_SSL_MODE") {
            Some(mode) => mode.parse().map_err(|_| ConfigError::InvalidVariable {
                key: "DB_SSL_MODE",
                value: mode.clone(),
            })?,
            None => SslMode::default(),
        };

        let (user, password) = if env == LOCAL_ENV {
            (self.vars.var("DB_USER"), self.vars.var("DB_PASSWORD"))
        } else {
            let coords = SecretCoordinates::from_vars(self.vars.as_ref());
            let secrets = self.fetch_secrets(&coords).await?;
            (secrets.db_user, secrets.db_password)
        };

        Ok(AppConfig {
            env,
            database: DatabaseConfig::Params {
                host,
                port,
                name,
                user,
                password,
                ssl_mode,
            },
        })
    }

    /// Fetch the database credentials named by `coords`.
    ///
    /// A secret is only fetched when both its key and the project number are set.
    pub async fn fetch_secrets(&self, coords: &SecretCoordinates) -> Result<Secrets, ConfigError> {
        let mut secrets = Secrets::default();
        if coords.project_number.is_empty() {
            return Ok(secrets);
        }

        if !coords.db_user_key.is_empty() {
            secrets.db_user = Some(
                self.fetch_one("dbUser", &coords.project_number, &coords.db_user_key)
                    .await?,
            );
        }
        if !coords.db_password_key.is_empty() {
            secrets.db_password = Some(
                self.fetch_one("dbPassword", &coords.project_number, &coords.db_password_key)
                    .await?,
            );
        }

        Ok(secrets)
    }

    async fn fetch_one(
        &self,
        name: &'static str,
        project: &str,
        secret: &str,
    ) -> Result<String, ConfigError> {
        let repo = self
            .secrets
            .as_ref()
            .ok_or(ConfigError::MissingSecretRepository)?;

        repo.get_secret(project, secret, LATEST_VERSION)
            .await
            .map_err(|source| ConfigError::Secret {
                name,
                project: project.to_string(),
                secret: secret.to_string(),
                source,
            })
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.vars.var(key).ok_or(ConfigError::MissingVariable(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::SecretError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSecrets {
        values: HashMap<String, String>,
        calls: Mutex<Vec<(String, String, String)>>,
    }

    impl FakeSecrets {
        fn with(values: &[(&str, &str)]) -> Self {
            Self {
                values: values
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SecretRepository for FakeSecrets {
        async fn get_secret(
            &self,
            project: &str,
            secret_id: &str,
            version: &str,
        ) -> Result<String, SecretError> {
            self.calls.lock().unwrap().push((
                project.to_string(),
                secret_id.to_string(),
                version.to_string(),
            ));
            self.values
                .get(secret_id)
                .cloned()
                .ok_or(SecretError::Status {
                    status: 404,
                    body: "not found".to_string(),
                })
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> Arc<dyn VariableSource> {
        Arc::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        )
    }

    #[tokio::test]
    async fn test_database_url_wins() {
        let bootstrap = Bootstrap::new(
            vars(&[("ENV", "local"), ("DATABASE_URL", "postgres://u:p@db/shop")]),
            None,
        );

        let config = bootstrap.load().await.unwrap();
        assert!(config.is_local());
        assert_eq!(
            config.database,
            DatabaseConfig::Url("postgres://u:p@db/shop".to_string())
        );
    }

    #[tokio::test]
    async fn test_local_env_reads_credentials() {
        let bootstrap = Bootstrap::new(
            vars(&[
                ("ENV", "local"),
                ("DB_HOST", "localhost"),
                ("DB_NAME", "shop"),
                ("DB_PORT", "5433"),
                ("DB_USER", "dev"),
                ("DB_PASSWORD", "devpass"),
                ("DB_SSL_MODE", "require"),
            ]),
            None,
        );

        let config = bootstrap.load().await.unwrap();
        assert_eq!(
            config.database,
            DatabaseConfig::Params {
                host: "localhost".to_string(),
                port: 5433,
                name: "shop".to_string(),
                user: Some("dev".to_string()),
                password: Some("devpass".to_string()),
                ssl_mode: SslMode::Require,
            }
        );
    }

    #[tokio::test]
    async fn test_cloud_env_fetches_secrets() {
        let secrets = Arc::new(FakeSecrets::with(&[
            ("db-user", "svc_user"),
            ("db-pass", "svc_pass"),
        ]));
        let bootstrap = Bootstrap::new(
            vars(&[
                ("ENV", "production"),
                ("DB_HOST", "10.0.0.5"),
                ("DB_NAME", "shop"),
                ("DB_USER", "ignored"),
                ("GCP_PROJECT_NUMBER", "1234"),
                ("DB_USER_KEY", "db-user"),
                ("DB_PASSWORD_KEY", "db-pass"),
            ]),
            Some(secrets.clone() as Arc<dyn SecretRepository>),
        );

        let config = bootstrap.load().await.unwrap();
        match config.database {
            DatabaseConfig::Params { user, password, port, ssl_mode, .. } => {
                assert_eq!(user.as_deref(), Some("svc_user"));
                assert_eq!(password.as_deref(), Some("svc_pass"));
                assert_eq!(port, 5432);
                assert_eq!(ssl_mode, SslMode::Disable);
            }
            other => panic!("expected params, got {other:?}"),
        }

        let calls = secrets.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls
            .iter()
            .all(|(project, _, version)| project == "1234" && version == "latest"));
    }

    #[tokio::test]
    async fn test_fetch_secrets_skips_incomplete_coordinates() {
        let secrets = Arc::new(FakeSecrets::default());
        let repo: Arc<dyn SecretRepository> = secrets.clone();
        let bootstrap = Bootstrap::new(vars(&[]), Some(repo));

        let fetched = bootstrap
            .fetch_secrets(&SecretCoordinates {
                project_number: String::new(),
                db_user_key: "db-user".to_string(),
                db_password_key: "db-pass".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(fetched, Secrets::default());
        assert!(secrets.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_secret_failure_is_reported() {
        let bootstrap = Bootstrap::new(
            vars(&[
                ("DB_HOST", "10.0.0.5"),
                ("DB_NAME", "shop"),
                ("GCP_PROJECT_NUMBER", "1234"),
                ("DB_USER_KEY", "missing"),
            ]),
            Some(Arc::new(FakeSecrets::default()) as Arc<dyn SecretRepository>),
        );

        let err = bootstrap.load().await.unwrap_err();
        match err {
            ConfigError::Secret { name, secret, .. } => {
                assert_eq!(name, "dbUser");
                assert_eq!(secret, "missing");
            }
            other => panic!("expected secret error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cloud_env_without_repository() {
        let bootstrap = Bootstrap::new(
            vars(&[
                ("DB_HOST", "10.0.0.5"),
                ("DB_NAME", "shop"),
                ("GCP_PROJECT_NUMBER", "1234"),
                ("DB_USER_KEY", "db-user"),
            ]),
            None,
        );

        let err = bootstrap.load().await.unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecretRepository));
    }

    #[tokio::test]
    async fn test_missing_host() {
        let bootstrap = Bootstrap::new(vars(&[("ENV", "local"), ("DB_NAME", "shop")]), None);
        let err = bootstrap.load().await.unwrap_err();
        assert!(matches!(err, ConfigError::MissingVariable("DB_HOST")));
    }

    #[tokio::test]
    async fn test_invalid_port_and_ssl_mode() {
        let bootstrap = Bootstrap::new(
            vars(&[
                ("ENV", "local"),
                ("DB_HOST", "localhost"),
                ("DB_NAME", "shop"),
                ("DB_PORT", "big"),
            ]),
            None,
        );
        let err = bootstrap.load().await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVariable { key: "DB_PORT", .. }));

        let bootstrap = Bootstrap::new(
            vars(&[
                ("ENV", "local"),
                ("DB_HOST", "localhost"),
                ("DB_NAME", "shop"),
                ("DB_SSL_MODE", "sometimes"),
            ]),
            None,
        );
        let err = bootstrap.load().await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVariable { key: "DB_SSL_MODE", .. }));
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let params = DatabaseConfig::Params {
            host: "h".to_string(),
            port: 5432,
            name: "n".to_string(),
            user: Some("u".to_string()),
            password: Some("topsecret".to_string()),
            ssl_mode: SslMode::Disable,
        };
        assert!(!format!("{params:?}").contains("topsecret"));

        let url = DatabaseConfig::Url("postgres://u:topsecret@h/n".to_string());
        let debug = format!("{url:?}");
        assert!(!debug.contains("topsecret"));
        assert!(debug.starts_with("Url(postgres:"));
    }
}
