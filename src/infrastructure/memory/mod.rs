//! Memory Layer - In-Memory State Management
//!
//! 实现 ResourceStore，管理已拉取媒体字节的内存登记

mod resource_store;

pub use resource_store::InMemoryResourceStore;
