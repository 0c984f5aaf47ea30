use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use aula_core::AppError;
use tracing_subscriber::EnvFilter;

/// Backing store for roles, permissions and audit entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub store: StoreConfig,
    pub api_host: String,
    pub api_port: u16,
    pub cors_origin: Option<String>,
    pub bootstrap_admin: Option<String>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let first_arg = env::args().nth(1);
        Self::from_lookup(first_arg.as_deref(), |name| env::var(name).ok())
    }

    fn from_lookup(
        first_arg: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let migrate_only = first_arg == Some("migrate");
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let store = match optional("RBAC_STORE")
            .unwrap_or_else(|| "postgres".to_owned())
            .as_str()
        {
            "postgres" => {
                let database_url = optional("DATABASE_URL")
                    .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))?;
                let max_connections = optional("DATABASE_MAX_CONNECTIONS")
                    .map(|value| {
                        value.parse::<u32>().map_err(|error| {
                            AppError::Validation(format!(
                                "invalid DATABASE_MAX_CONNECTIONS: {error}"
                            ))
                        })
                    })
                    .transpose()?
                    .unwrap_or(10);

                StoreConfig::Postgres {
                    database_url,
                    max_connections,
                }
            }
            "memory" => StoreConfig::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "RBAC_STORE must be either 'postgres' or 'memory', got '{other}'"
                )));
            }
        };

        if migrate_only && store == StoreConfig::Memory {
            return Err(AppError::Validation(
                "the migrate command requires RBAC_STORE=postgres".to_owned(),
            ));
        }

        let api_host = optional("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = optional("API_PORT")
            .map(|value| {
                value
                    .parse::<u16>()
                    .map_err(|error| AppError::Validation(format!("invalid API_PORT: {error}")))
            })
            .transpose()?
            .unwrap_or(3001);

        Ok(Self {
            migrate_only,
            store,
            api_host,
            api_port,
            cors_origin: optional("API_CORS_ORIGIN"),
            bootstrap_admin: optional("RBAC_BOOTSTRAP_ADMIN").map(|value| value.trim().to_owned()),
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
