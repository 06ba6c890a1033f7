use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub uploads: UploadsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://quill.db?mode=rwc".to_string(),
            max_connections: 10,
            min_connections: 1,
            run_migrations: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub jwt_issuer: String,
    /// 未配置时禁用管理员注册
    pub admin_registration_code: Option<String>,
    /// `bcrypt` 或 `argon2`
    pub password_algorithm: String,
    pub bcrypt_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration: 3600,
            jwt_issuer: "quill".to_string(),
            admin_registration_code: None,
            password_algorithm: "bcrypt".to_string(),
            bcrypt_cost: 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    pub directory: PathBuf,
    pub url_prefix: String,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            directory: work_dir().join("uploads"),
            url_prefix: "/uploads/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 默认过滤规则，`RUST_LOG` 优先
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

fn work_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".quill")
}

impl Config {
    /// 默认值 → `~/.quill/quill.toml` → `./quill.toml` → `QUILL__*` 环境变量
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let user_config = work_dir().join("quill.toml");
        let builder = config::Config::builder()
            .add_source(config::File::from(user_config.as_path()).required(false))
            .add_source(config::File::with_name("quill.toml").required(false))
            .add_source(config::Environment::with_prefix("QUILL").separator("__"));

        builder.build()?.try_deserialize()
    }

    #[cfg(test)]
    fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert!(config.database.run_migrations);
        assert!(config.security.admin_registration_code.is_none());
        assert_eq!(config.uploads.url_prefix, "/uploads/");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8080

            [security]
            admin_registration_code = "open-sesame"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.security.admin_registration_code.as_deref(), Some("open-sesame"));
        assert_eq!(config.security.jwt_expiration, 3600);
        assert_eq!(config.database.max_connections, 10);
    }
}
