//! Resource Store Port - 本地字节资源
//!
//! 拉取到的字节登记为不透明引用，渲染端只能看到引用，看不到来源地址。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("Resource already released: {0}")]
    ResourceReleased(String),
}

/// 不透明资源引用
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef(String);

impl ResourceRef {
    pub fn generate() -> Self {
        Self(format!("res-{}", Uuid::new_v4().simple()))
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 已登记的资源内容
#[derive(Debug, Clone)]
pub struct StoredResource {
    pub bytes: Bytes,
    pub mime_type: String,
}

/// Resource Store Port
pub trait ResourceStorePort: Send + Sync {
    /// 登记字节，返回新的引用
    fn register(&self, bytes: Bytes, mime_type: String) -> ResourceRef;

    /// 读取资源
    fn read(&self, reference: &ResourceRef) -> Result<StoredResource, ResourceError>;

    /// 撤销资源，返回是否确实移除
    fn revoke(&self, reference: &ResourceRef) -> bool;

    /// 当前存活的资源数
    fn live_count(&self) -> usize;
}

/// 资源句柄
///
/// 独占本地字节资源；`release` 只生效一次，之后的任何使用都返回 `ResourceReleased`。
/// 未显式释放的句柄在 drop 时释放。
pub struct ResourceHandle {
    reference: ResourceRef,
    mime_type: String,
    store: Arc<dyn ResourceStorePort>,
    released: AtomicBool,
}

impl ResourceHandle {
    /// 登记字节并取得句柄
    pub fn register(store: Arc<dyn ResourceStorePort>, bytes: Bytes, mime_type: String) -> Self {
        let reference = store.register(bytes, mime_type.clone());
        tracing::debug!(reference = %reference, "Resource registered");
        Self {
            reference,
            mime_type,
            store,
            released: AtomicBool::new(false),
        }
    }

    pub fn reference(&self) -> Result<&ResourceRef, ResourceError> {
        self.ensure_live()?;
        Ok(&self.reference)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn read(&self) -> Result<StoredResource, ResourceError> {
        self.ensure_live()?;
        self.store.read(&self.reference)
    }

    /// 释放资源；只有第一次调用返回 true
    pub fn release(&self) -> bool {
        if self
            .released
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.store.revoke(&self.reference);
        tracing::debug!(reference = %self.reference, "Resource released");
        true
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    fn ensure_live(&self) -> Result<(), ResourceError> {
        if self.is_released() {
            return Err(ResourceError::ResourceReleased(self.reference.to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("reference", &self.reference)
            .field("mime_type", &self.mime_type)
            .field("released", &self.is_released())
            .finish()
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        self.release();
    }
}
