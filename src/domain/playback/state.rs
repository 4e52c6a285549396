//! Playback Context - State

use serde::Serialize;

use super::PlaybackError;

const DEFAULT_VOLUME: f64 = 1.0;

/// 播放状态
///
/// 不变量:
/// - volume ∈ [0, 1]
/// - duration 未知时为 0，此时 seek 为空操作
/// - restore_volume 始终为最近一次非零音量
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub volume: f64,
    pub is_muted: bool,
    pub is_fullscreen: bool,
    pub controls_visible: bool,
    #[serde(skip)]
    restore_volume: f64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            position_secs: 0.0,
            duration_secs: 0.0,
            volume: DEFAULT_VOLUME,
            is_muted: false,
            is_fullscreen: false,
            controls_visible: true,
            restore_volume: DEFAULT_VOLUME,
        }
    }
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 切换播放/暂停，返回新的播放状态
    pub fn toggle_play(&mut self) -> bool {
        self.is_playing = !self.is_playing;
        self.is_playing
    }

    /// 定位到 `target` 秒，返回实际位置；时长未知时不做任何事
    pub fn seek(&mut self, target: f64) -> Option<f64> {
        if self.duration_secs <= 0.0 || target.is_nan() {
            return None;
        }
        self.position_secs = target.clamp(0.0, self.duration_secs);
        Some(self.position_secs)
    }

    /// 设置音量；0 表示静音但保留上一次的非零音量
    pub fn set_volume(&mut self, volume: f64) -> Result<(), PlaybackError> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(PlaybackError::InvalidVolume(volume));
        }
        self.volume = volume;
        if volume == 0.0 {
            self.is_muted = true;
        } else {
            self.restore_volume = volume;
            self.is_muted = false;
        }
        Ok(())
    }

    /// 切换静音，返回新的静音状态
    pub fn toggle_mute(&mut self) -> bool {
        if self.is_muted {
            self.is_muted = false;
            if self.volume == 0.0 {
                self.volume = self.restore_volume;
            }
        } else {
            self.is_muted = true;
        }
        self.is_muted
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        self.is_fullscreen = !self.is_fullscreen;
        self.is_fullscreen
    }

    /// 渲染端上报的时间进度
    pub fn update_time(&mut self, position: f64, duration: f64) {
        if duration.is_finite() && duration >= 0.0 {
            self.duration_secs = duration;
        }
        if position.is_finite() {
            self.position_secs = if self.duration_secs > 0.0 {
                position.clamp(0.0, self.duration_secs)
            } else {
                position.max(0.0)
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_duration(duration: f64) -> PlaybackState {
        let mut state = PlaybackState::new();
        state.update_time(0.0, duration);
        state
    }

    #[test]
    fn test_seek_clamps_to_duration() {
        let mut state = with_duration(120.0);
        assert_eq!(state.seek(-5.0), Some(0.0));
        assert_eq!(state.position_secs, 0.0);
        assert_eq!(state.seek(500.0), Some(120.0));
        assert_eq!(state.position_secs, 120.0);
        assert_eq!(state.seek(42.5), Some(42.5));
    }

    #[test]
    fn test_seek_is_noop_without_duration() {
        let mut state = PlaybackState::new();
        assert_eq!(state.seek(10.0), None);
        assert_eq!(state.position_secs, 0.0);
    }

    #[test]
    fn test_invalid_volume_rejected() {
        let mut state = PlaybackState::new();
        assert_eq!(
            state.set_volume(1.5),
            Err(PlaybackError::InvalidVolume(1.5))
        );
        assert!(state.set_volume(-0.1).is_err());
        assert!(state.set_volume(f64::NAN).is_err());
        assert_eq!(state.volume, 1.0);
    }

    #[test]
    fn test_zero_volume_mutes_and_unmute_restores() {
        let mut state = PlaybackState::new();
        state.set_volume(0.6).unwrap();
        state.set_volume(0.0).unwrap();
        assert!(state.is_muted);
        assert_eq!(state.volume, 0.0);

        assert!(!state.toggle_mute());
        assert_eq!(state.volume, 0.6);
    }

    #[test]
    fn test_mute_keeps_volume() {
        let mut state = PlaybackState::new();
        state.set_volume(0.3).unwrap();
        assert!(state.toggle_mute());
        assert_eq!(state.volume, 0.3);
        assert!(!state.toggle_mute());
        assert_eq!(state.volume, 0.3);
    }

    #[test]
    fn test_non_zero_volume_unmutes() {
        let mut state = PlaybackState::new();
        state.toggle_mute();
        state.set_volume(0.4).unwrap();
        assert!(!state.is_muted);
    }
}
