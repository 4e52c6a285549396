//! In-Memory Resource Store Implementation

use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;

use crate::application::ports::{ResourceError, ResourceRef, ResourceStorePort, StoredResource};

/// 内存资源仓库
///
/// 相当于浏览器的 object URL 注册表：引用 -> 字节
pub struct InMemoryResourceStore {
    resources: DashMap<ResourceRef, StoredResource>,
    /// 引用 -> 撤销次数，仅测试断言使用
    #[cfg(test)]
    revocations: DashMap<ResourceRef, u32>,
}

impl InMemoryResourceStore {
    pub fn new() -> Self {
        Self {
            resources: DashMap::new(),
            #[cfg(test)]
            revocations: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 某个引用被撤销的次数
    #[cfg(test)]
    pub fn revoke_count(&self, reference: &ResourceRef) -> u32 {
        self.revocations.get(reference).map(|c| *c).unwrap_or(0)
    }
}

impl Default for InMemoryResourceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceStorePort for InMemoryResourceStore {
    fn register(&self, bytes: Bytes, mime_type: String) -> ResourceRef {
        let reference = ResourceRef::generate();
        let size = bytes.len();
        self.resources
            .insert(reference.clone(), StoredResource { bytes, mime_type });
        tracing::debug!(reference = %reference, size = size, "Resource stored");
        reference
    }

    fn read(&self, reference: &ResourceRef) -> Result<StoredResource, ResourceError> {
        self.resources
            .get(reference)
            .map(|r| r.clone())
            .ok_or_else(|| ResourceError::ResourceReleased(reference.to_string()))
    }

    fn revoke(&self, reference: &ResourceRef) -> bool {
        #[cfg(test)]
        {
            *self.revocations.entry(reference.clone()).or_insert(0) += 1;
        }
        let removed = self.resources.remove(reference).is_some();
        tracing::debug!(reference = %reference, removed = removed, "Resource revoked");
        removed
    }

    fn live_count(&self) -> usize {
        self.resources.len()
    }
}
