//! Surface Adapter - 渲染端适配器
//!
//! 浏览器端播放器通过 WebSocket 接收命令，通过 /media/{reference} 读取字节

mod browser_surface;

pub use browser_surface::BrowserSurface;
