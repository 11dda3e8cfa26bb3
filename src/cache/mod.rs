//! 对象缓存
//!
//! 缓存后端以插件形式注册（`moka` 内存缓存、`redis`），启动时按配置选择。
//! 值统一以 JSON 字符串存储，类型化读写由 [`ObjectCache`] 的扩展方法完成。

pub mod object_cache;
pub mod register;
pub mod traits;

pub use traits::{CacheResult, ObjectCache, ObjectCacheExt};

/// 注册缓存插件
///
/// 在程序启动前通过 ctor 将构造函数写入插件注册表，
/// 类型需提供 `fn new() -> Result<Self, String>`。
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:expr, $ty:ty) => {
        #[ctor::ctor]
        unsafe fn __register_object_cache_plugin() {
            $crate::cache::register::register_object_cache_plugin(
                $name,
                std::sync::Arc::new(|| -> $crate::cache::register::BoxedObjectCacheFuture {
                    Box::pin(async {
                        match <$ty>::new() {
                            Ok(cache) => Ok(Box::new(cache) as Box<dyn $crate::cache::ObjectCache>),
                            Err(e) => Err($crate::errors::HackflowError::cache_connection(
                                format!("{} 缓存初始化失败: {e}", $name),
                            )),
                        }
                    })
                }),
            );
        }
    };
}
