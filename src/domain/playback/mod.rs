//! Playback Context - 播放状态规则
//!
//! 纯状态运算（音量、静音、定位、全屏），不涉及渲染端与计时器

mod errors;
mod state;

pub use errors::PlaybackError;
pub use state::PlaybackState;
