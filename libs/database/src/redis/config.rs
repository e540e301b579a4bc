use core_config::{env_or_default, ConfigError, FromEnv};

/// Redis connection configuration.
#[derive(Clone, Debug)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,
}

impl RedisConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Environment variables:
/// - `REDIS_URL` (optional) - full connection string, takes precedence
/// - `REDIS_HOST` (optional, default: 127.0.0.1)
/// - `REDIS_PORT` (optional, default: 6379)
impl FromEnv for RedisConfig {
    fn from_env() -> Result<Self, ConfigError> {
        if let Ok(url) = std::env::var("REDIS_URL") {
            return Ok(Self { url });
        }

        let host = env_or_default("REDIS_HOST", "127.0.0.1");
        let port = env_or_default("REDIS_PORT", "6379")
            .parse::<u16>()
            .map_err(|e| ConfigError::ParseError {
                key: "REDIS_PORT".to_string(),
                details: format!("{}", e),
            })?;

        Ok(Self {
            url: format!("redis://{}:{}", host, port),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_config_from_env_url_takes_precedence() {
        temp_env::with_vars(
            [
                ("REDIS_URL", Some("redis://cache.internal:7000")),
                ("REDIS_HOST", Some("ignored")),
            ],
            || {
                let config = RedisConfig::from_env().unwrap();
                assert_eq!(config.url, "redis://cache.internal:7000");
            },
        );
    }

    #[test]
    fn test_redis_config_from_env_host_port() {
        temp_env::with_vars(
            [
                ("REDIS_URL", None),
                ("REDIS_HOST", Some("redis.svc")),
                ("REDIS_PORT", Some("6380")),
            ],
            || {
                let config = RedisConfig::from_env().unwrap();
                assert_eq!(config.url, "redis://redis.svc:6380");
            },
        );
    }

    #[test]
    fn test_redis_config_from_env_defaults() {
        temp_env::with_vars(
            [
                ("REDIS_URL", None::<&str>),
                ("REDIS_HOST", None),
                ("REDIS_PORT", None),
            ],
            || {
                let config = RedisConfig::from_env().unwrap();
                assert_eq!(config.url, "redis://127.0.0.1:6379");
            },
        );
    }

    #[test]
    fn test_redis_config_from_env_invalid_port() {
        temp_env::with_vars(
            [("REDIS_URL", None), ("REDIS_PORT", Some("not_a_port"))],
            || {
                let err = RedisConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("REDIS_PORT"));
            },
        );
    }
}
