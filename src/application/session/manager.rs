//! Session Lifecycle Manager - 单一受保护会话的状态机
//!
//! Idle -> Loading -> Active -> (Detached) -> Released -> Idle
//!
//! 所有状态都在一把 `parking_lot::Mutex` 后面，只在同步段内修改；
//! 拉取是唯一的挂起点，挂起前释放锁，恢复后重新校验加载编号。
//! 锁顺序固定为 state -> policy / 定时器槽。

use std::sync::{Arc, Weak};

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use super::errors::SessionError;
use super::model::{LoadRequest, Notice, Session, SessionManagerConfig, SessionPhase, SessionSnapshot};
use crate::application::ports::{
    MediaFetcherPort, RenderingSurfacePort, ResourceHandle, ResourceStorePort,
};
use crate::application::timer::{TimerKind, TimerSlot, TimerTicket};
use crate::domain::access::{self, AccessDecision, AccessPolicy, RequestContext};
use crate::domain::media::MediaLocator;
use crate::domain::share::{self, ShareLink, ShareLinkBuilder, ShareLinkError, ShareToken};

enum Phase {
    Idle,
    Loading { load_id: u64, cancel: CancellationToken },
    Live(Session),
}

struct ManagerState {
    phase: Phase,
    notice: Option<Notice>,
    next_load_id: u64,
}

struct Inner {
    config: SessionManagerConfig,
    fetcher: Arc<dyn MediaFetcherPort>,
    store: Arc<dyn ResourceStorePort>,
    surface: Arc<dyn RenderingSurfacePort>,
    share_builder: ShareLinkBuilder,
    policy: RwLock<AccessPolicy>,
    state: Mutex<ManagerState>,
    controls_timer: TimerSlot,
    detach_timer: TimerSlot,
    notice_timer: TimerSlot,
}

/// 会话生命周期管理器
///
/// 进程内唯一的会话所有者。通过 `Arc<SessionLifecycleManager>` 共享；
/// 最后一个引用被丢弃时执行 `shutdown`。
pub struct SessionLifecycleManager {
    inner: Arc<Inner>,
}

impl SessionLifecycleManager {
    pub fn new(
        config: SessionManagerConfig,
        fetcher: Arc<dyn MediaFetcherPort>,
        store: Arc<dyn ResourceStorePort>,
        surface: Arc<dyn RenderingSurfacePort>,
        share_builder: ShareLinkBuilder,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                fetcher,
                store,
                surface,
                share_builder,
                policy: RwLock::new(policy),
                state: Mutex::new(ManagerState {
                    phase: Phase::Idle,
                    notice: None,
                    next_load_id: 0,
                }),
                controls_timer: TimerSlot::new(TimerKind::ControlsHide),
                detach_timer: TimerSlot::new(TimerKind::Detach),
                notice_timer: TimerSlot::new(TimerKind::NoticeClear),
            }),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    // ========== Access Policy ==========

    pub fn policy(&self) -> AccessPolicy {
        self.inner.policy.read().clone()
    }

    /// 替换访问策略；加载进行中拒绝修改（每次加载使用一份策略快照）
    pub fn set_policy(&self, policy: AccessPolicy) -> Result<(), SessionError> {
        let state = self.inner.state.lock();
        if matches!(state.phase, Phase::Loading { .. }) {
            return Err(SessionError::LoadInProgress);
        }
        tracing::info!(
            domain_check = policy.enable_domain_check,
            referrer_check = policy.enable_referrer_check,
            domains = policy.allowed_domains.len(),
            referrers = policy.allowed_referrers.len(),
            "Access policy updated"
        );
        *self.inner.policy.write() = policy;
        Ok(())
    }

    // ========== Load / Restore ==========

    /// 加载远程媒体并接管为唯一的活动会话
    ///
    /// 校验或门控失败时原有会话保持不变；两者通过后才会替换旧会话。
    pub async fn load(&self, request: LoadRequest) -> Result<SessionSnapshot, SessionError> {
        let inner = &self.inner;

        let (load_id, cancel, locator, token) = {
            let mut state = inner.state.lock();
            if matches!(state.phase, Phase::Loading { .. }) {
                tracing::warn!("Load rejected, another load is in progress");
                return Err(SessionError::LoadInProgress);
            }

            let (locator, token) = match inner.prepare_load(&request) {
                Ok(prepared) => prepared,
                Err(e) => {
                    inner.report(&mut state, &e);
                    return Err(e);
                }
            };

            inner.release_current(&mut state);

            state.next_load_id += 1;
            let load_id = state.next_load_id;
            let cancel = CancellationToken::new();
            state.phase = Phase::Loading {
                load_id,
                cancel: cancel.clone(),
            };
            tracing::info!(load_id = load_id, phase = SessionPhase::Loading.as_str(), "Loading media");
            tracing::debug!(load_id = load_id, locator = %locator, "Load target");
            inner.surface.phase_changed(SessionPhase::Loading);
            (load_id, cancel, locator, token)
        };

        let guard = LoadGuard {
            inner: Arc::downgrade(inner),
            load_id,
            armed: true,
        };
        let fetched = match tokio::time::timeout(
            inner.config.load_timeout,
            inner.fetcher.fetch(&locator, &cancel),
        )
        .await
        {
            Ok(result) => result.map_err(SessionError::from),
            Err(_) => {
                cancel.cancel();
                Err(SessionError::Timeout)
            }
        };
        guard.disarm();

        let mut state = inner.state.lock();
        let still_current =
            matches!(&state.phase, Phase::Loading { load_id: id, .. } if *id == load_id);
        if !still_current {
            // 加载期间被释放或关闭：字节从未登记
            tracing::info!(load_id = load_id, "Load abandoned, result discarded");
            return Err(SessionError::Cancelled);
        }

        let media = match fetched {
            Ok(media) => media,
            Err(e) => {
                inner.fail_load(&mut state, load_id, &e);
                return Err(e);
            }
        };

        let handle = ResourceHandle::register(inner.store.clone(), media.bytes, media.mime_type);
        let reference = handle.reference()?.clone();
        if let Err(e) = inner.surface.attach(&reference, handle.mime_type()) {
            handle.release();
            let err = SessionError::from(e);
            inner.fail_load(&mut state, load_id, &err);
            return Err(err);
        }

        let token = token.unwrap_or_else(|| ShareToken::generate(locator.as_str()));
        let session = Session::new(locator, handle, token);
        inner.sync_surface(&session);

        state.notice = None;
        inner.notice_timer.cancel();
        inner.surface.show_notice(None);

        tracing::info!(
            session_id = %session.id,
            reference = %reference,
            display_name = %session.display_name.as_str(),
            phase = SessionPhase::Active.as_str(),
            "Session active"
        );
        let snapshot = SessionSnapshot::of(&session, None);
        state.phase = Phase::Live(session);
        inner.surface.phase_changed(SessionPhase::Active);
        Ok(snapshot)
    }

    /// 从外部分享链接恢复会话
    ///
    /// 不是分享链接时返回 `Ok(None)`；链接损坏时展示提示并返回错误，
    /// 现有状态保持不变。
    pub async fn restore(
        &self,
        external_url: &str,
        context: RequestContext,
    ) -> Result<Option<SessionSnapshot>, SessionError> {
        let incoming = match share::parse_incoming(external_url) {
            Ok(incoming) => incoming,
            Err(ShareLinkError::NotAShareLink) => {
                tracing::debug!("Nothing to restore, not a share link");
                return Ok(None);
            }
            Err(e) => {
                let err = SessionError::from(e);
                let mut state = self.inner.state.lock();
                self.inner.report(&mut state, &err);
                return Err(err);
            }
        };

        tracing::info!("Restoring shared session");
        let request = LoadRequest::new(incoming.locator(), context).with_token(incoming.token);
        self.load(request).await.map(Some)
    }

    // ========== Playback Controls ==========

    pub fn toggle_play(&self) -> Result<SessionSnapshot, SessionError> {
        self.with_session("toggle_play", |inner, session| {
            if !session.attached {
                inner.reattach(session)?;
            }
            if session.playback.toggle_play() {
                inner.detach_timer.cancel();
                inner.surface.play();
            } else {
                inner.surface.pause();
                inner.schedule_detach();
            }
            tracing::debug!(session_id = %session.id, playing = session.playback.is_playing, "Play toggled");
            inner.touch_controls(session);
            Ok(())
        })
    }

    pub fn seek(&self, position_secs: f64) -> Result<SessionSnapshot, SessionError> {
        self.with_session("seek", |inner, session| {
            if let Some(position) = session.playback.seek(position_secs) {
                if session.attached {
                    inner.surface.seek(position);
                }
            }
            inner.touch_controls(session);
            Ok(())
        })
    }

    pub fn set_volume(&self, volume: f64) -> Result<SessionSnapshot, SessionError> {
        self.with_session("set_volume", |inner, session| {
            session.playback.set_volume(volume)?;
            if session.attached {
                inner
                    .surface
                    .set_volume(session.playback.volume, session.playback.is_muted);
            }
            inner.touch_controls(session);
            Ok(())
        })
    }

    pub fn toggle_mute(&self) -> Result<SessionSnapshot, SessionError> {
        self.with_session("toggle_mute", |inner, session| {
            session.playback.toggle_mute();
            if session.attached {
                inner
                    .surface
                    .set_volume(session.playback.volume, session.playback.is_muted);
            }
            inner.touch_controls(session);
            Ok(())
        })
    }

    pub fn toggle_fullscreen(&self) -> Result<SessionSnapshot, SessionError> {
        self.with_session("toggle_fullscreen", |inner, session| {
            let fullscreen = session.playback.toggle_fullscreen();
            if session.attached {
                inner.surface.set_fullscreen(fullscreen);
            }
            inner.touch_controls(session);
            Ok(())
        })
    }

    /// 通用用户交互：显示控制栏并重置隐藏计时
    pub fn interact(&self) -> Result<SessionSnapshot, SessionError> {
        self.with_session("interact", |inner, session| {
            inner.touch_controls(session);
            Ok(())
        })
    }

    // ========== Surface Events ==========

    pub fn time_update(&self, position_secs: f64, duration_secs: f64) -> Result<SessionSnapshot, SessionError> {
        self.with_session("time_update", |_, session| {
            session.playback.update_time(position_secs, duration_secs);
            Ok(())
        })
    }

    /// 渲染端报告播放已暂停
    pub fn pause_detected(&self) -> Result<SessionSnapshot, SessionError> {
        self.with_session("pause_detected", |inner, session| {
            session.playback.is_playing = false;
            inner.touch_controls(session);
            if session.attached && !inner.detach_timer.is_pending() {
                inner.schedule_detach();
            }
            Ok(())
        })
    }

    // ========== Release ==========

    /// 释放当前会话（加载中则取消加载），返回是否确有东西被释放
    pub fn release(&self) -> bool {
        let mut state = self.inner.state.lock();
        self.inner.release_current(&mut state)
    }

    /// 宿主关闭：取消在途加载与所有定时器，同步释放会话
    pub fn shutdown(&self) {
        let mut state = self.inner.state.lock();
        let released = self.inner.release_current(&mut state);
        state.notice = None;
        self.inner.controls_timer.cancel();
        self.inner.detach_timer.cancel();
        self.inner.notice_timer.cancel();
        tracing::info!(released = released, "Session manager shut down");
    }

    // ========== Queries ==========

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.state.lock();
        let notice = state.notice.clone();
        match &state.phase {
            Phase::Idle => SessionSnapshot::empty(SessionPhase::Idle, notice),
            Phase::Loading { .. } => SessionSnapshot::empty(SessionPhase::Loading, notice),
            Phase::Live(session) => SessionSnapshot::of(session, notice),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match &self.inner.state.lock().phase {
            Phase::Idle => SessionPhase::Idle,
            Phase::Loading { .. } => SessionPhase::Loading,
            Phase::Live(session) => session.phase(),
        }
    }

    pub fn notice(&self) -> Option<Notice> {
        self.inner.state.lock().notice.clone()
    }

    /// 当前会话的分享链接
    pub fn share_link(&self) -> Result<ShareLink, SessionError> {
        match &self.inner.state.lock().phase {
            Phase::Live(session) => Ok(self.inner.share_builder.build(
                &session.token,
                session.locator.as_str(),
                session.created_at,
            )),
            _ => Err(SessionError::NoActiveSession),
        }
    }

    pub fn share_token(&self) -> Option<ShareToken> {
        match &self.inner.state.lock().phase {
            Phase::Live(session) => Some(session.token.clone()),
            _ => None,
        }
    }

    /// 来源地址，仅供宿主内部使用，不会出现在快照中
    pub fn source_locator(&self) -> Option<MediaLocator> {
        match &self.inner.state.lock().phase {
            Phase::Live(session) => Some(session.locator.clone()),
            _ => None,
        }
    }

    fn with_session<F>(&self, operation: &'static str, f: F) -> Result<SessionSnapshot, SessionError>
    where
        F: FnOnce(&Arc<Inner>, &mut Session) -> Result<(), SessionError>,
    {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        match &mut state.phase {
            Phase::Live(session) => {
                session.handle.reference()?;
                f(&self.inner, session)?;
                Ok(SessionSnapshot::of(session, state.notice.clone()))
            }
            _ => {
                tracing::debug!(operation = operation, "Rejected, no active session");
                Err(SessionError::NoActiveSession)
            }
        }
    }
}

/// 拉取期间持有；调用方在拉取完成前丢弃 future 时复位到 Idle
struct LoadGuard {
    inner: Weak<Inner>,
    load_id: u64,
    armed: bool,
}

impl LoadGuard {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(inner) = self.inner.upgrade() {
            inner.abandon_load(self.load_id);
        }
    }
}

impl Drop for SessionLifecycleManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Inner {
    /// 预检地址、核对令牌、评估门控；不修改任何状态
    fn prepare_load(
        &self,
        request: &LoadRequest,
    ) -> Result<(MediaLocator, Option<ShareToken>), SessionError> {
        let locator = MediaLocator::parse(&request.locator)?;

        if let Some(token) = &request.token {
            let embedded = token.locator()?;
            if MediaLocator::parse(&embedded).map_or(true, |l| l != locator) {
                return Err(SessionError::MalformedToken(
                    "token does not match locator".to_string(),
                ));
            }
        }

        let policy = self.policy.read().clone();
        if let AccessDecision::Deny(reason) = access::evaluate(&policy, &request.context, &locator) {
            tracing::warn!(reason = reason.as_str(), "Load denied by access gate");
            return Err(SessionError::AccessDenied(reason));
        }

        Ok((locator, request.token.clone()))
    }

    /// 加载被调用方放弃：仍是同一次加载时取消拉取并回到 Idle
    fn abandon_load(&self, load_id: u64) {
        let mut state = self.state.lock();
        let still_current =
            matches!(&state.phase, Phase::Loading { load_id: id, .. } if *id == load_id);
        if !still_current {
            return;
        }
        if let Phase::Loading { cancel, .. } = std::mem::replace(&mut state.phase, Phase::Idle) {
            cancel.cancel();
        }
        tracing::info!(load_id = load_id, phase = SessionPhase::Idle.as_str(), "Load abandoned by caller");
        self.surface.phase_changed(SessionPhase::Idle);
    }

    fn fail_load(self: &Arc<Self>, state: &mut ManagerState, load_id: u64, err: &SessionError) {
        tracing::warn!(load_id = load_id, error = %err, phase = SessionPhase::Idle.as_str(), "Load failed");
        state.phase = Phase::Idle;
        self.surface.phase_changed(SessionPhase::Idle);
        self.report(state, err);
    }

    /// 设置用户提示并安排自动清除；契约类错误不提示
    fn report(self: &Arc<Self>, state: &mut ManagerState, err: &SessionError) {
        if !err.is_user_facing() {
            tracing::debug!(error = %err, "Operation rejected");
            return;
        }
        let message = err.user_message();
        self.surface.show_notice(Some(&message));
        state.notice = Some(Notice {
            message,
            created_at: Utc::now(),
        });

        let weak = Arc::downgrade(self);
        self.notice_timer.schedule(self.config.notice_display, move |ticket| {
            if let Some(inner) = weak.upgrade() {
                inner.on_notice_timer(ticket);
            }
        });
    }

    /// 释放当前会话或取消在途加载，之后状态为 Idle
    fn release_current(&self, state: &mut ManagerState) -> bool {
        match std::mem::replace(&mut state.phase, Phase::Idle) {
            Phase::Idle => false,
            Phase::Loading { load_id, cancel } => {
                cancel.cancel();
                tracing::info!(load_id = load_id, phase = SessionPhase::Idle.as_str(), "In-flight load cancelled");
                self.surface.phase_changed(SessionPhase::Idle);
                true
            }
            Phase::Live(session) => {
                self.release_session(session);
                true
            }
        }
    }

    fn release_session(&self, session: Session) {
        self.controls_timer.cancel();
        self.detach_timer.cancel();
        if session.attached {
            self.surface.detach();
        }
        let revoked = session.handle.release();
        tracing::info!(
            session_id = %session.id,
            revoked = revoked,
            phase = SessionPhase::Released.as_str(),
            "Session released"
        );
        self.surface.phase_changed(SessionPhase::Released);
        self.surface.phase_changed(SessionPhase::Idle);
    }

    /// 从仍然存活的句柄重新挂载，不重新拉取
    fn reattach(&self, session: &mut Session) -> Result<(), SessionError> {
        let reference = session.handle.reference()?.clone();
        self.surface.attach(&reference, session.handle.mime_type())?;
        session.attached = true;
        self.sync_surface(session);
        tracing::info!(
            session_id = %session.id,
            reference = %reference,
            phase = SessionPhase::Active.as_str(),
            "Session reattached"
        );
        self.surface.phase_changed(SessionPhase::Active);
        Ok(())
    }

    /// 把播放状态完整同步到渲染端
    fn sync_surface(&self, session: &Session) {
        let playback = &session.playback;
        if playback.position_secs > 0.0 {
            self.surface.seek(playback.position_secs);
        }
        self.surface.set_volume(playback.volume, playback.is_muted);
        self.surface.set_fullscreen(playback.is_fullscreen);
        self.surface.set_controls_visible(playback.controls_visible);
    }

    /// 控制栏可见；仅在播放中安排自动隐藏
    fn touch_controls(self: &Arc<Self>, session: &mut Session) {
        if !session.playback.controls_visible {
            session.playback.controls_visible = true;
            if session.attached {
                self.surface.set_controls_visible(true);
            }
        }

        if session.playback.is_playing {
            let weak = Arc::downgrade(self);
            self.controls_timer.schedule(self.config.controls_hide_delay, move |ticket| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_controls_timer(ticket);
                }
            });
        } else {
            self.controls_timer.cancel();
        }
    }

    fn schedule_detach(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.detach_timer.schedule(self.config.detach_delay, move |ticket| {
            if let Some(inner) = weak.upgrade() {
                inner.on_detach_timer(ticket);
            }
        });
    }

    fn on_controls_timer(&self, ticket: TimerTicket) {
        let mut state = self.state.lock();
        if !self.controls_timer.claim(ticket) {
            return;
        }
        if let Phase::Live(session) = &mut state.phase {
            if session.playback.is_playing && session.playback.controls_visible {
                session.playback.controls_visible = false;
                if session.attached {
                    self.surface.set_controls_visible(false);
                }
                tracing::trace!(session_id = %session.id, "Controls hidden");
            }
        }
    }

    fn on_detach_timer(&self, ticket: TimerTicket) {
        let mut state = self.state.lock();
        if !self.detach_timer.claim(ticket) {
            return;
        }
        if let Phase::Live(session) = &mut state.phase {
            if session.attached && !session.playback.is_playing {
                self.surface.detach();
                session.attached = false;
                tracing::info!(
                    session_id = %session.id,
                    phase = SessionPhase::Detached.as_str(),
                    "Session detached"
                );
                self.surface.phase_changed(SessionPhase::Detached);
            }
        }
    }

    fn on_notice_timer(&self, ticket: TimerTicket) {
        let mut state = self.state.lock();
        if !self.notice_timer.claim(ticket) {
            return;
        }
        if state.notice.take().is_some() {
            self.surface.show_notice(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::application::ports::{FetchError, ResourceRef};
    use crate::domain::access::DenyReason;
    use crate::domain::share::{encode, MEDIA_PARAM};
    use crate::infrastructure::adapters::FakeMediaFetcher;
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::memory::InMemoryResourceStore;
    use crate::infrastructure::surface::BrowserSurface;

    const VIDEO: &str = "https://host/video.mp4";
    const AUDIO: &str = "https://host/track.mp3";
    const CLIP: &str = "https://host/clip.webm";
    const SHARE_BASE: &str = "https://share.example.com/player";

    struct Harness {
        manager: Arc<SessionLifecycleManager>,
        fetcher: Arc<FakeMediaFetcher>,
        store: Arc<InMemoryResourceStore>,
        surface: Arc<BrowserSurface>,
    }

    fn preset(fetcher: FakeMediaFetcher) -> FakeMediaFetcher {
        fetcher
            .with_media(VIDEO, &b"video-bytes"[..])
            .with_media(AUDIO, &b"audio-bytes"[..])
            .with_media(CLIP, &b"clip-bytes"[..])
    }

    fn harness_with(fetcher: FakeMediaFetcher, policy: AccessPolicy) -> Harness {
        let fetcher = fetcher.arc();
        let store = InMemoryResourceStore::new().arc();
        let surface = Arc::new(BrowserSurface::new(EventPublisher::new().arc()));
        let manager = SessionLifecycleManager::new(
            SessionManagerConfig::default(),
            fetcher.clone(),
            store.clone(),
            surface.clone(),
            ShareLinkBuilder::parse(SHARE_BASE).unwrap(),
            policy,
        )
        .arc();
        Harness {
            manager,
            fetcher,
            store,
            surface,
        }
    }

    fn harness() -> Harness {
        harness_with(preset(FakeMediaFetcher::new()), AccessPolicy::default())
    }

    fn request(url: &str) -> LoadRequest {
        LoadRequest::new(url, RequestContext::default())
    }

    fn reference_of(snapshot: &SessionSnapshot) -> ResourceRef {
        ResourceRef::from_string(snapshot.resource_reference.clone().unwrap())
    }

    async fn wait_for_phase(manager: &SessionLifecycleManager, phase: SessionPhase) {
        for _ in 0..100 {
            if manager.phase() == phase {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("phase {:?} never reached", phase);
    }

    #[tokio::test]
    async fn test_load_then_restore_from_share_link() {
        let h = harness();
        let snapshot = h.manager.load(request(VIDEO)).await.unwrap();

        assert_eq!(snapshot.phase, SessionPhase::Active);
        assert_eq!(snapshot.display_name.as_deref(), Some("video.mp4"));
        let reference = reference_of(&snapshot);
        assert!(h.surface.is_attached(&reference));
        assert!(!serde_json::to_string(&snapshot).unwrap().contains(VIDEO));

        let link = h.manager.share_link().unwrap();
        let token = h.manager.share_token().unwrap();
        assert_eq!(link.token, token.as_str());
        let composed = reqwest::Url::parse(&link.composed_url).unwrap();
        let media = composed
            .query_pairs()
            .find(|(k, _)| k == MEDIA_PARAM)
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert_eq!(media, encode(VIDEO));

        let viewer = harness();
        let restored = viewer
            .manager
            .restore(&link.composed_url, RequestContext::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(restored.phase, SessionPhase::Active);
        assert_eq!(viewer.manager.source_locator().unwrap().as_str(), VIDEO);
        assert_eq!(viewer.manager.share_token().unwrap(), token);
    }

    #[tokio::test]
    async fn test_sequential_loads_keep_one_live_handle() {
        let h = harness();
        let mut references = Vec::new();
        for url in [VIDEO, AUDIO, CLIP] {
            let snapshot = h.manager.load(request(url)).await.unwrap();
            references.push(reference_of(&snapshot));
        }

        assert_eq!(h.store.live_count(), 1);
        assert_eq!(h.store.revoke_count(&references[0]), 1);
        assert_eq!(h.store.revoke_count(&references[1]), 1);
        assert_eq!(h.store.revoke_count(&references[2]), 0);
        assert!(h.surface.is_attached(&references[2]));
    }

    #[tokio::test]
    async fn test_second_load_while_loading_is_rejected() {
        let h = harness_with(preset(FakeMediaFetcher::gated()), AccessPolicy::default());
        let pending = {
            let manager = h.manager.clone();
            tokio::spawn(async move { manager.load(request(VIDEO)).await })
        };
        wait_for_phase(&h.manager, SessionPhase::Loading).await;

        assert_eq!(
            h.manager.load(request(AUDIO)).await.unwrap_err(),
            SessionError::LoadInProgress
        );
        assert_eq!(
            h.manager.set_policy(AccessPolicy::open()).unwrap_err(),
            SessionError::LoadInProgress
        );
        assert!(h.manager.notice().is_none());

        h.fetcher.release_one();
        let snapshot = pending.await.unwrap().unwrap();
        assert_eq!(snapshot.display_name.as_deref(), Some("video.mp4"));
        assert_eq!(h.fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_new_load_releases_active_session_before_fetching() {
        let h = harness_with(preset(FakeMediaFetcher::gated()), AccessPolicy::default());
        h.fetcher.release_one();
        let first = h.manager.load(request(VIDEO)).await.unwrap();
        let first_ref = reference_of(&first);

        let pending = {
            let manager = h.manager.clone();
            tokio::spawn(async move { manager.load(request(AUDIO)).await })
        };
        wait_for_phase(&h.manager, SessionPhase::Loading).await;
        assert_eq!(h.store.revoke_count(&first_ref), 1);
        assert_eq!(h.store.live_count(), 0);
        assert!(!h.surface.is_attached(&first_ref));

        h.fetcher.release_one();
        let second = pending.await.unwrap().unwrap();
        assert_eq!(second.display_name.as_deref(), Some("track.mp3"));
        assert_eq!(h.store.live_count(), 1);
    }

    #[tokio::test]
    async fn test_abandoned_load_returns_to_idle() {
        let h = harness_with(preset(FakeMediaFetcher::gated()), AccessPolicy::default());
        let pending = {
            let manager = h.manager.clone();
            tokio::spawn(async move { manager.load(request(VIDEO)).await })
        };
        wait_for_phase(&h.manager, SessionPhase::Loading).await;

        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());
        assert_eq!(h.manager.phase(), SessionPhase::Idle);
        assert_eq!(h.store.live_count(), 0);

        h.manager.set_policy(AccessPolicy::open()).unwrap();
        h.fetcher.release_one();
        let snapshot = h.manager.load(request(AUDIO)).await.unwrap();
        assert_eq!(snapshot.display_name.as_deref(), Some("track.mp3"));
        assert_eq!(h.store.live_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_load_releases_detached_session() {
        let h = harness();
        let first = h.manager.load(request(VIDEO)).await.unwrap();
        let first_ref = reference_of(&first);

        h.manager.toggle_play().unwrap();
        h.manager.pause_detected().unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(h.manager.phase(), SessionPhase::Detached);

        let second = h.manager.load(request(AUDIO)).await.unwrap();
        let second_ref = reference_of(&second);
        assert_eq!(h.store.revoke_count(&first_ref), 1);
        assert_eq!(h.store.live_count(), 1);
        assert!(h.surface.is_attached(&second_ref));
        assert!(!h.surface.is_attached(&first_ref));
        assert_eq!(second.phase, SessionPhase::Active);
    }

    #[tokio::test]
    async fn test_volume_and_seek_rules() {
        let h = harness();
        h.manager.load(request(VIDEO)).await.unwrap();

        // 时长未知时 seek 为空操作
        assert_eq!(h.manager.seek(30.0).unwrap().position_secs, 0.0);

        h.manager.time_update(0.0, 120.0).unwrap();
        assert_eq!(h.manager.seek(-5.0).unwrap().position_secs, 0.0);
        assert_eq!(h.manager.seek(500.0).unwrap().position_secs, 120.0);

        assert_eq!(
            h.manager.set_volume(1.5).unwrap_err(),
            SessionError::InvalidVolume(1.5)
        );
        assert!(h.manager.set_volume(f64::NAN).is_err());
        assert!(h.manager.notice().is_none());

        h.manager.set_volume(0.4).unwrap();
        let muted = h.manager.set_volume(0.0).unwrap();
        assert!(muted.is_muted);
        let restored = h.manager.toggle_mute().unwrap();
        assert!(!restored.is_muted);
        assert_eq!(restored.volume, 0.4);

        assert!(h.manager.toggle_fullscreen().unwrap().is_fullscreen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_controls_hide_only_while_playing() {
        let h = harness();
        h.manager.load(request(VIDEO)).await.unwrap();

        // 暂停状态下控制栏不隐藏
        h.manager.interact().unwrap();
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert!(h.manager.snapshot().controls_visible);

        assert!(h.manager.toggle_play().unwrap().is_playing);
        tokio::time::sleep(Duration::from_millis(2000)).await;
        h.manager.interact().unwrap();
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(h.manager.snapshot().controls_visible);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(!h.manager.snapshot().controls_visible);

        assert!(h.manager.interact().unwrap().controls_visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_detaches_and_play_reattaches_without_refetch() {
        let h = harness();
        let loaded = h.manager.load(request(VIDEO)).await.unwrap();
        let reference = reference_of(&loaded);

        h.manager.toggle_play().unwrap();
        h.manager.pause_detected().unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(h.manager.phase(), SessionPhase::Active);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(h.manager.phase(), SessionPhase::Detached);
        assert!(!h.surface.is_attached(&reference));
        let detached = h.manager.snapshot();
        assert!(detached.resource_reference.is_none());
        assert_eq!(h.store.live_count(), 1);

        // 分离状态下其他控制只更新状态
        h.manager.set_volume(0.5).unwrap();
        assert_eq!(h.manager.phase(), SessionPhase::Detached);

        let resumed = h.manager.toggle_play().unwrap();
        assert_eq!(resumed.phase, SessionPhase::Active);
        assert!(resumed.is_playing);
        assert_eq!(resumed.volume, 0.5);
        assert_eq!(reference_of(&resumed), reference);
        assert!(h.surface.is_attached(&reference));
        assert_eq!(h.fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resuming_before_detach_delay_keeps_attached() {
        let h = harness();
        h.manager.load(request(VIDEO)).await.unwrap();

        h.manager.toggle_play().unwrap();
        h.manager.toggle_play().unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        h.manager.toggle_play().unwrap();
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(h.manager.phase(), SessionPhase::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_denial_skips_fetch_and_notice_clears() {
        let policy = AccessPolicy {
            enable_domain_check: true,
            ..AccessPolicy::default()
        }
        .with_domains(["a.com"]);
        let h = harness_with(preset(FakeMediaFetcher::new()), policy);
        let context = RequestContext::new(Some("https://b.com".to_string()), None);

        let err = h
            .manager
            .load(LoadRequest::new(VIDEO, context))
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::AccessDenied(DenyReason::DomainNotAllowed));
        assert_eq!(h.fetcher.calls(), 0);
        assert_eq!(h.manager.phase(), SessionPhase::Idle);
        assert!(h.manager.notice().is_some());

        tokio::time::sleep(Duration::from_millis(5100)).await;
        assert!(h.manager.notice().is_none());

        let allowed = RequestContext::new(Some("https://a.com".to_string()), None);
        h.manager.load(LoadRequest::new(VIDEO, allowed)).await.unwrap();
        assert_eq!(h.fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_input_keeps_existing_session() {
        let h = harness();
        let loaded = h.manager.load(request(VIDEO)).await.unwrap();

        let err = h.manager.load(request("https://host/notes.txt")).await.unwrap_err();
        assert!(matches!(err, SessionError::InputValidation(_)));
        let current = h.manager.snapshot();
        assert_eq!(current.phase, SessionPhase::Active);
        assert_eq!(current.session_id, loaded.session_id);
        assert!(current.notice.is_some());
        assert_eq!(h.fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_network_error_sets_notice_and_returns_idle() {
        let fetcher = FakeMediaFetcher::new()
            .with_failure(VIDEO, FetchError::NetworkError { status: Some(503) })
            .with_media(AUDIO, &b"audio-bytes"[..]);
        let h = harness_with(fetcher, AccessPolicy::default());

        let err = h.manager.load(request(VIDEO)).await.unwrap_err();
        assert_eq!(err, SessionError::Network { status: Some(503) });
        let snapshot = h.manager.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Idle);
        assert!(snapshot.notice.unwrap().message.contains("503"));
        assert_eq!(h.store.live_count(), 0);

        // 成功加载清除提示
        let loaded = h.manager.load(request(AUDIO)).await.unwrap();
        assert!(loaded.notice.is_none());
        assert!(h.manager.notice().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_times_out() {
        let h = harness_with(preset(FakeMediaFetcher::gated()), AccessPolicy::default());

        let err = h.manager.load(request(VIDEO)).await.unwrap_err();
        assert_eq!(err, SessionError::Timeout);
        assert_eq!(h.manager.phase(), SessionPhase::Idle);
        assert!(h.manager.notice().is_some());
        assert_eq!(h.store.live_count(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_during_load_never_registers_bytes() {
        let h = harness_with(preset(FakeMediaFetcher::gated()), AccessPolicy::default());
        let pending = {
            let manager = h.manager.clone();
            tokio::spawn(async move { manager.load(request(VIDEO)).await })
        };
        wait_for_phase(&h.manager, SessionPhase::Loading).await;

        h.manager.shutdown();
        assert_eq!(pending.await.unwrap().unwrap_err(), SessionError::Cancelled);
        assert_eq!(h.manager.phase(), SessionPhase::Idle);
        assert_eq!(h.store.live_count(), 0);
    }

    #[tokio::test]
    async fn test_attach_failure_releases_fresh_handle() {
        let h = harness();
        h.surface.close();

        let err = h.manager.load(request(VIDEO)).await.unwrap_err();
        assert!(matches!(err, SessionError::Surface(_)));
        assert_eq!(h.manager.phase(), SessionPhase::Idle);
        assert_eq!(h.store.live_count(), 0);
    }

    #[tokio::test]
    async fn test_operations_after_release_fail() {
        let h = harness();
        let loaded = h.manager.load(request(VIDEO)).await.unwrap();
        let reference = reference_of(&loaded);

        assert!(h.manager.release());
        assert!(!h.manager.release());
        assert_eq!(h.store.revoke_count(&reference), 1);
        assert!(!h.surface.is_attached(&reference));

        assert_eq!(h.manager.toggle_play().unwrap_err(), SessionError::NoActiveSession);
        assert_eq!(h.manager.seek(1.0).unwrap_err(), SessionError::NoActiveSession);
        assert_eq!(h.manager.share_link().unwrap_err(), SessionError::NoActiveSession);
        assert_eq!(h.manager.snapshot().phase, SessionPhase::Idle);

        h.manager.shutdown();
        assert_eq!(h.store.revoke_count(&reference), 1);
    }

    #[tokio::test]
    async fn test_restore_without_share_params_is_noop() {
        let h = harness();
        let restored = h
            .manager
            .restore("https://share.example.com/player", RequestContext::default())
            .await
            .unwrap();
        assert!(restored.is_none());
        assert!(h.manager.notice().is_none());
        assert_eq!(h.fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_restore_with_corrupt_link_sets_notice() {
        let h = harness();
        let err = h
            .manager
            .restore(
                "https://share.example.com/player?token=abc&media=%21%21%21",
                RequestContext::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidSharedLink(_)));
        assert_eq!(h.manager.phase(), SessionPhase::Idle);
        assert!(h.manager.notice().is_some());
        assert_eq!(h.fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_token_for_other_locator_is_rejected() {
        let h = harness();
        let foreign = ShareToken::generate(AUDIO);

        let err = h
            .manager
            .load(request(VIDEO).with_token(foreign))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::MalformedToken(_)));
        assert_eq!(h.fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_dropping_manager_releases_session() {
        let h = harness();
        let loaded = h.manager.load(request(VIDEO)).await.unwrap();
        let reference = reference_of(&loaded);

        drop(h.manager);
        assert_eq!(h.store.live_count(), 0);
        assert_eq!(h.store.revoke_count(&reference), 1);
    }
}
