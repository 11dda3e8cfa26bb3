use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::CreateUserRequest;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use std::sync::Arc;
use tracing::{debug, info, warn};

const FALLBACK_CACHE: &str = "moka";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 创建缓存实例
///
/// 依次尝试配置的后端和内存后端，全部失败时返回错误。
async fn create_cache() -> Result<Arc<dyn ObjectCache>, Box<dyn std::error::Error>> {
    let configured = AppConfig::get().cache.cache_type.as_str();

    let mut candidates = vec![configured];
    if configured != FALLBACK_CACHE {
        candidates.push(FALLBACK_CACHE);
    }

    for backend in candidates {
        let Some(constructor) = get_object_cache_plugin(backend) else {
            warn!("Cache backend '{}' not found in registry", backend);
            continue;
        };

        match constructor().await {
            Ok(cache) => {
                if backend != configured {
                    warn!("Falling back to {} cache backend", backend);
                }
                warn!("Successfully created {} cache backend", backend);
                return Ok(Arc::from(cache));
            }
            Err(e) => warn!("Failed to create {} cache: {}", backend, e),
        }
    }

    Err(format!("No cache backend available (configured: {configured})").into())
}

fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789!@#$%";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// 用户表为空时创建管理员账号
///
/// 账号信息读取 `ADMIN_USERNAME` / `ADMIN_EMAIL` / `ADMIN_PASSWORD`，未设置密码时生成随机密码并打印。
async fn seed_admin(storage: &Arc<dyn Storage>) {
    match storage.count_users().await {
        Ok(0) => info!("No users found in database, creating admin account..."),
        Ok(count) => {
            debug!("Database already has {} user(s), skipping admin seed", count);
            return;
        }
        Err(e) => {
            warn!("Failed to count users: {}, skipping admin seed", e);
            return;
        }
    }

    let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@hackflow.local".to_string());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        let generated = generate_random_password(16);
        warn!("==========================================================");
        warn!("  ADMIN_PASSWORD not set, generated password for '{}':", username);
        warn!("  {}", generated);
        warn!("==========================================================");
        generated
    });

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash admin password: {}, skipping admin seed", e);
            return;
        }
    };

    let request = CreateUserRequest {
        username,
        email,
        password: password_hash,
        role: UserRole::Admin,
        display_name: Some("Hackflow Admin".to_string()),
        avatar_url: None,
    };

    match storage.create_user(request).await {
        Ok(user) => info!("Admin account created (ID: {}, username: {})", user.id, user.username),
        Err(e) => warn!("Failed to create admin account: {}", e),
    }
}

/// 准备服务器启动的上下文：存储（含迁移）、管理员账号与对象缓存
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    debug!(
        "Registered cache backends: {:?}",
        crate::cache::register::registered_backends()
    );

    let scoring = &AppConfig::get().scoring;
    info!(
        "Scoring weights: innovation={} technical={} implementation={} impact={}",
        scoring.default_weights.innovation,
        scoring.default_weights.technical,
        scoring.default_weights.implementation,
        scoring.default_weights.impact
    );

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    seed_admin(&storage).await;

    let cache = create_cache().await.expect("Failed to create cache");
    warn!("Cache backend initialized");

    StartupContext { storage, cache }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::testing::{memory_storage, seed_user};

    #[test]
    fn test_generated_password_uses_charset() {
        let password = generate_random_password(24);
        assert_eq!(password.chars().count(), 24);
        assert!(password.chars().all(|c| !"0O1lI".contains(c)));
    }

    #[tokio::test]
    async fn test_seed_admin_skips_populated_database() {
        let storage = memory_storage().await;
        seed_user(&storage, "alice", UserRole::Participant).await;

        seed_admin(&storage).await;
        assert_eq!(storage.count_users().await.unwrap(), 1);
    }
}
