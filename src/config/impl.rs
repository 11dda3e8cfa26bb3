use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// 常用环境变量到配置键的映射，优先级高于配置文件与 `HACKFLOW_*`
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("APP_ENV", "app.environment"),
    ("RUST_LOG", "app.log_level"),
    ("SERVER_HOST", "server.host"),
    ("SERVER_PORT", "server.port"),
    ("UNIX_SOCKET", "server.unix_socket_path"),
    ("CPU_COUNT", "server.workers"),
    ("JWT_SECRET", "jwt.secret"),
    ("DATABASE_URL", "database.url"),
    ("REDIS_URL", "cache.redis.url"),
    ("REDIS_KEY_PREFIX", "cache.redis.key_prefix"),
    ("CACHE_TTL", "cache.default_ttl"),
    ("UPLOAD_DIR", "upload.dir"),
];

impl AppConfig {
    /// 加载配置：config.toml → config.{APP_ENV}.toml → HACKFLOW_* → 常用环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name(&format!("config.{environment}")).required(false))
            .add_source(
                Environment::with_prefix("HACKFLOW")
                    .separator("__")
                    .try_parsing(true),
            );

        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }

        Self::finalize(builder.build()?.try_deserialize()?)
    }

    /// 补全派生值并校验
    fn finalize(mut config: AppConfig) -> Result<Self, ConfigError> {
        if config.server.workers == 0 {
            config.server.workers = num_cpus::get().min(config.server.max_workers);
        }

        if config.is_production() && config.jwt.secret == DEFAULT_JWT_SECRET {
            return Err(ConfigError::Message(
                "jwt.secret must be changed in production".to_string(),
            ));
        }

        config.validate_scoring()?;
        Ok(config)
    }

    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 在应用启动时调用一次
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 默认权重须非负且合计为 100
    fn validate_scoring(&self) -> Result<(), ConfigError> {
        let weights = &self.scoring.default_weights;
        let all = [
            weights.innovation,
            weights.technical,
            weights.implementation,
            weights.impact,
        ];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::Message(
                "scoring.default_weights must be non-negative numbers".to_string(),
            ));
        }
        if (weights.sum() - 100.0).abs() > 1e-6 {
            return Err(ConfigError::Message(format!(
                "scoring.default_weights must sum to 100, got {}",
                weights.sum()
            )));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        Some(self.server.unix_socket_path.as_str()).filter(|path| !path.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn bundled() -> AppConfig {
        Config::builder()
            .add_source(File::from_str(
                include_str!("../../config.toml"),
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let config = AppConfig::finalize(bundled()).unwrap();
        assert!(config.server.workers >= 1);
        assert_eq!(config.scoring.default_weights.sum(), 100.0);
    }

    #[test]
    fn test_rejects_bad_weights() {
        let mut config = bundled();
        config.scoring.default_weights.impact = 40.0;
        assert!(AppConfig::finalize(config).is_err());

        let mut config = bundled();
        config.scoring.default_weights.innovation = -5.0;
        config.scoring.default_weights.impact = 55.0;
        assert!(AppConfig::finalize(config).is_err());
    }

    #[test]
    fn test_default_secret_rejected_in_production() {
        let mut config = bundled();
        config.app.environment = "production".to_string();
        assert!(AppConfig::finalize(config).is_err());
    }
}
