//! Argon2id 密码哈希

use crate::config::{AppConfig, Argon2Config};
use crate::errors::HackflowError;
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

fn hasher(config: &Argon2Config) -> Result<Argon2<'static>, HackflowError> {
    let params = Params::new(
        config.memory_cost,
        config.time_cost,
        config.parallelism,
        None,
    )
    .map_err(|e| HackflowError::validation(format!("Argon2 参数错误: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

fn hash_with(password: &str, config: &Argon2Config) -> Result<String, HackflowError> {
    let salt = SaltString::generate(&mut OsRng);
    hasher(config)?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HackflowError::validation(format!("密码哈希失败: {e}")))
}

/// 使用配置的 Argon2 参数生成 PHC 格式哈希
pub fn hash_password(password: &str) -> Result<String, HackflowError> {
    hash_with(password, &AppConfig::get().argon2)
}

/// 参数从哈希串中读取，因此调整配置不影响旧密码
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light() -> Argon2Config {
        Argon2Config {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_with("Hack4Good", &light()).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Hack4Good", &hash));
        assert!(!verify_password("hack4good", &hash));
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_invalid_params_are_reported() {
        let config = Argon2Config {
            memory_cost: 1,
            time_cost: 0,
            parallelism: 1,
        };
        assert!(hash_with("Hack4Good", &config).is_err());
    }
}
