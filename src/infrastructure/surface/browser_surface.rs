//! Browser Surface - 通过事件通道驱动浏览器播放器

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::application::ports::{RenderingSurfacePort, ResourceRef, SurfaceError};
use crate::application::session::SessionPhase;
use crate::infrastructure::events::{EventPublisher, WsEvent};

/// 媒体路由前缀，与 `/media/:reference` 对应
const MEDIA_PATH: &str = "/media";

/// 浏览器渲染端
///
/// 记录当前挂载的引用（/media 路由只服务于已挂载的引用），
/// 并把每条命令作为 WsEvent 推送给浏览器。
pub struct BrowserSurface {
    attached: RwLock<Option<ResourceRef>>,
    publisher: Arc<EventPublisher>,
    closed: AtomicBool,
}

impl BrowserSurface {
    pub fn new(publisher: Arc<EventPublisher>) -> Self {
        Self {
            attached: RwLock::new(None),
            publisher,
            closed: AtomicBool::new(false),
        }
    }

    /// 宿主关闭后不再接受挂载
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.attached.write().take();
    }

    /// 引用是否为当前挂载的引用
    pub fn is_attached(&self, reference: &ResourceRef) -> bool {
        self.attached.read().as_ref() == Some(reference)
    }

    /// 引用对应的媒体地址
    pub fn media_url(&self, reference: &ResourceRef) -> String {
        format!("{}/{}", MEDIA_PATH, reference)
    }
}

impl RenderingSurfacePort for BrowserSurface {
    fn attach(&self, reference: &ResourceRef, mime_type: &str) -> Result<(), SurfaceError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SurfaceError::Unavailable("surface closed".to_string()));
        }
        *self.attached.write() = Some(reference.clone());
        self.publisher.publish(WsEvent::Attach {
            reference: reference.to_string(),
            url: self.media_url(reference),
            mime_type: mime_type.to_string(),
        });
        Ok(())
    }

    fn detach(&self) {
        if self.attached.write().take().is_some() {
            self.publisher.publish(WsEvent::Detach);
        }
    }

    fn play(&self) {
        self.publisher.publish(WsEvent::Play);
    }

    fn pause(&self) {
        self.publisher.publish(WsEvent::Pause);
    }

    fn seek(&self, position_secs: f64) {
        self.publisher.publish(WsEvent::Seek { position_secs });
    }

    fn set_volume(&self, volume: f64, muted: bool) {
        self.publisher.publish(WsEvent::Volume { volume, muted });
    }

    fn set_fullscreen(&self, fullscreen: bool) {
        self.publisher.publish(WsEvent::Fullscreen {
            enabled: fullscreen,
        });
    }

    fn set_controls_visible(&self, visible: bool) {
        self.publisher
            .publish(WsEvent::ControlsVisibility { visible });
    }

    fn phase_changed(&self, phase: SessionPhase) {
        self.publisher.publish(WsEvent::PhaseChanged { phase });
    }

    fn show_notice(&self, message: Option<&str>) {
        self.publisher.publish(WsEvent::Notice {
            message: message.map(str::to_string),
        });
    }

    fn attached(&self) -> Option<ResourceRef> {
        self.attached.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_attach_publishes_media_url() {
        let publisher = EventPublisher::new().arc();
        let mut rx = publisher.subscribe();
        let surface = BrowserSurface::new(publisher.clone());
        let reference = ResourceRef::from_string("res-1");

        surface.attach(&reference, "video/mp4").unwrap();
        assert!(surface.is_attached(&reference));
        assert_eq!(
            rx.recv().await.unwrap(),
            WsEvent::Attach {
                reference: "res-1".to_string(),
                url: "/media/res-1".to_string(),
                mime_type: "video/mp4".to_string(),
            }
        );

        surface.detach();
        assert_eq!(surface.attached(), None);
        assert_eq!(rx.recv().await.unwrap(), WsEvent::Detach);
    }

    #[test]
    fn test_closed_surface_rejects_attach() {
        let surface = BrowserSurface::new(EventPublisher::new().arc());
        surface.close();
        assert!(surface
            .attach(&ResourceRef::from_string("res-2"), "audio/mpeg")
            .is_err());
    }
}
