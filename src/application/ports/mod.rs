//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod media_fetcher;
mod rendering_surface;
mod resource_store;

pub use media_fetcher::{FetchError, FetchedMedia, MediaFetcherPort};
pub use rendering_surface::{RenderingSurfacePort, SurfaceError};
pub use resource_store::{
    ResourceError, ResourceHandle, ResourceRef, ResourceStorePort, StoredResource,
};
