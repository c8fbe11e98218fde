//! Backend for vendor players that become usable asynchronously.
//!
//! The handle is returned to the facade immediately. Until the vendor
//! reports ready, sets and calls go to a [`CommandQueue`] and gets answer
//! neutral defaults. On readiness the queue is replayed once, in order, and
//! the backend switches to direct dispatch.
//!
//! Teardown cancels the pending construction: a vendor readiness callback
//! arriving afterwards destroys the late player and touches nothing else.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use bridge_traits::media::{
    CanPlayResponse, Method, NativeEvent, Property, PropertyValue, TimeRanges,
};
use bridge_traits::scheduler::IntervalScheduler;
use bridge_traits::vendor::{PlayerRequest, ReadySignal, VendorEvent, VendorHost, VendorPlayer};
use core_runtime::events::EventType;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::vendor::{EventModel, VendorProfile};
use crate::error::{PlaybackError, Result, ERROR_CREATING_RENDERER};
use crate::handle::{AccessorTable, BackendHandle};
use crate::loader::SdkLoader;
use crate::normalizer::{EventNormalizer, TimeupdatePoller};
use crate::queue::{CommandQueue, DrainSummary, PendingOperation};
use crate::readiness::Readiness;
use crate::renderer::RendererContext;

struct DeferredState {
    readiness: Readiness,
    player: Option<Rc<dyn VendorPlayer>>,
    paused: bool,
    ended: bool,
    looping: bool,
    autoplay: bool,
    visible: bool,
    /// Size requested before the player existed.
    size: Option<(u32, u32)>,
    waiters: Vec<oneshot::Sender<Result<()>>>,
}

pub struct DeferredBackend {
    profile: &'static VendorProfile,
    element_id: String,
    normalizer: EventNormalizer,
    poller: TimeupdatePoller,
    queue: RefCell<CommandQueue>,
    state: RefCell<DeferredState>,
    accessors: AccessorTable<DeferredBackend>,
    cancel: CancellationToken,
}

impl DeferredBackend {
    pub fn new(
        profile: &'static VendorProfile,
        ctx: RendererContext,
        scheduler: Rc<dyn IntervalScheduler>,
    ) -> Rc<Self> {
        let normalizer = EventNormalizer::from_context(&ctx);
        let poller = TimeupdatePoller::new(scheduler, ctx.poll_interval, normalizer.clone());
        Rc::new(Self {
            profile,
            element_id: ctx.element_id.clone(),
            normalizer,
            poller,
            queue: RefCell::new(CommandQueue::new()),
            state: RefCell::new(DeferredState {
                readiness: Readiness::Constructing,
                player: None,
                paused: true,
                ended: false,
                looping: false,
                autoplay: ctx.autoplay,
                visible: true,
                size: None,
                waiters: Vec::new(),
            }),
            accessors: accessor_table(),
            cancel: CancellationToken::new(),
        })
    }

    /// Ask the host for a player, through the vendor loader when the SDK
    /// script is shared.
    pub fn start(
        self: &Rc<Self>,
        request: PlayerRequest,
        host: Rc<dyn VendorHost>,
        loader: Option<&SdkLoader>,
    ) -> Result<()> {
        self.state
            .borrow_mut()
            .readiness
            .transition(Readiness::AwaitingExternalReady)?;
        let signal = self.ready_signal();

        match loader {
            Some(loader) => {
                let weak = Rc::downgrade(self);
                let token = self.cancel.clone();
                loader.enqueue(move || {
                    if token.is_cancelled() {
                        debug!(renderer = %request.renderer, "construction cancelled before sdk load");
                        return;
                    }
                    if let Err(err) = host.create_player(request, signal) {
                        if let Some(backend) = weak.upgrade() {
                            backend.fail(err.into());
                        }
                    }
                })
            }
            None => host.create_player(request, signal).map_err(Into::into),
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    pub fn pending_operations(&self) -> usize {
        self.queue.borrow().len()
    }

    fn ready_signal(self: &Rc<Self>) -> ReadySignal {
        let weak = Rc::downgrade(self);
        let token = self.cancel.clone();
        let renderer = self.profile.name;
        ReadySignal::new(move |outcome| {
            let backend = match weak.upgrade() {
                Some(backend) if !token.is_cancelled() => backend,
                _ => {
                    debug!(renderer, "late vendor readiness ignored");
                    if let Ok(player) = outcome {
                        if let Err(err) = player.destroy() {
                            debug!(renderer, error = %err, "late player teardown failed");
                        }
                    }
                    return;
                }
            };
            match outcome {
                Ok(player) => backend.on_player_ready(player),
                Err(err) => backend.fail(err.into()),
            }
        })
    }

    fn on_player_ready(self: &Rc<Self>, player: Rc<dyn VendorPlayer>) {
        let weak = Rc::downgrade(self);
        player.subscribe(Rc::new(move |event: VendorEvent| {
            if let Some(backend) = weak.upgrade() {
                backend.on_vendor_event(event);
            }
        }));

        let (visible, size) = {
            let mut state = self.state.borrow_mut();
            if let Err(err) = state.readiness.transition(Readiness::Ready) {
                warn!(renderer = self.profile.name, error = %err, "unexpected vendor readiness");
                return;
            }
            state.player = Some(player.clone());
            (state.visible, state.size.take())
        };

        if !visible {
            self.log_vendor_failure("hide", player.set_visible(false).map_err(Into::into));
        }
        if let Some((width, height)) = size {
            self.log_vendor_failure("resize", player.set_size(width, height).map_err(Into::into));
        }

        info!(
            renderer = self.profile.name,
            element = %self.element_id,
            "vendor player ready"
        );

        match self.profile.events {
            EventModel::Native => {
                self.normalizer.emit(EventType::RendererReady);
                self.drain();
            }
            EventModel::Polled => {
                self.drain();
                self.normalizer.announce_ready();
            }
        }

        let waiters = std::mem::take(&mut self.state.borrow_mut().waiters);
        for waiter in waiters {
            let _ = waiter.send(Ok(()));
        }
    }

    fn drain(&self) -> DrainSummary {
        // Replay without holding the queue borrow; replayed operations
        // dispatch directly now that the backend is ready.
        let mut queue = std::mem::take(&mut *self.queue.borrow_mut());
        let summary = queue.drain_with(self.profile.name, |op| op.apply(self));
        *self.queue.borrow_mut() = queue;
        debug!(
            renderer = self.profile.name,
            replayed = summary.replayed,
            dropped = summary.dropped,
            "pending operations replayed"
        );
        summary
    }

    /// Construction failed after the handle was handed out.
    fn fail(&self, err: PlaybackError) {
        let waiters = {
            let mut state = self.state.borrow_mut();
            if !state.readiness.is_pending() {
                return;
            }
            state.readiness = Readiness::Destroyed;
            std::mem::take(&mut state.waiters)
        };
        self.cancel.cancel();
        self.poller.stop();
        self.queue.borrow_mut().clear();

        debug!(renderer = self.profile.name, error = %err, "vendor player construction failed");
        self.normalizer.vendor_error(ERROR_CREATING_RENDERER);

        for waiter in waiters {
            let _ = waiter.send(Err(PlaybackError::creation(self.profile.name, err.to_string())));
        }
    }

    fn on_vendor_event(&self, event: VendorEvent) {
        if self.state.borrow().readiness.is_terminal() {
            return;
        }
        match event {
            VendorEvent::StateChange(player_state) => {
                let transition = EventNormalizer::translate_state(player_state);
                {
                    let mut state = self.state.borrow_mut();
                    state.paused = transition.paused;
                    state.ended = transition.ended;
                }
                self.poller.apply(transition.poll);
                self.normalizer.emit_all(&transition.events);
            }
            VendorEvent::Native { name, message } => {
                {
                    let mut state = self.state.borrow_mut();
                    match name.as_str() {
                        "play" | "playing" => {
                            state.paused = false;
                            state.ended = false;
                        }
                        "pause" => state.paused = true,
                        "ended" => state.ended = true,
                        _ => {}
                    }
                }
                self.normalizer.forward_native(&NativeEvent { name, message });
            }
            VendorEvent::Error { message } => {
                self.normalizer.vendor_error(&message);
            }
        }
    }

    fn player(&self) -> Result<Rc<dyn VendorPlayer>> {
        self.state
            .borrow()
            .player
            .clone()
            .ok_or_else(|| PlaybackError::NotReady(self.profile.name.to_string()))
    }

    fn log_vendor_failure(&self, action: &str, outcome: Result<()>) {
        if let Err(err) = outcome {
            warn!(renderer = self.profile.name, action, error = %err, "vendor call failed");
        }
    }

    fn load_source(&self, value: PropertyValue) -> Result<()> {
        let src = value
            .as_str()
            .ok_or_else(|| invalid(Property::Src, &value))?
            .to_string();
        let media_id = (self.profile.media_id)(&src);
        let autoplay = self.state.borrow().autoplay;
        self.player()?.load(&media_id, autoplay)?;
        self.state.borrow_mut().ended = false;
        Ok(())
    }

    fn invoke(&self, method: Method) -> Result<()> {
        let player = self.player()?;
        match method {
            Method::Play => player.play()?,
            Method::Pause => player.pause()?,
            Method::Load => {}
            Method::Stop if self.profile.supports_stop => player.stop()?,
            Method::Stop => return Err(PlaybackError::unsupported(self.profile.name, "call stop")),
        }
        Ok(())
    }
}

fn invalid(property: Property, value: &PropertyValue) -> PlaybackError {
    PlaybackError::InvalidValue {
        property: property.to_string(),
        value: format!("{:?}", value),
    }
}

fn number(property: Property, value: &PropertyValue) -> Result<f64> {
    value.as_f64().ok_or_else(|| invalid(property, value))
}

fn accessor_table() -> AccessorTable<DeferredBackend> {
    AccessorTable::<DeferredBackend>::new()
        .read_write(
            Property::Volume,
            |b| Ok(b.player()?.volume()?.into()),
            |b, v| {
                b.player()?.set_volume(number(Property::Volume, &v)?)?;
                b.normalizer.emit(EventType::VolumeChange);
                Ok(())
            },
        )
        .read_write(
            Property::Muted,
            |b| Ok(b.player()?.is_muted()?.into()),
            |b, v| {
                b.player()?.set_muted(v.truthy())?;
                b.normalizer.emit(EventType::VolumeChange);
                Ok(())
            },
        )
        .read_write(
            Property::CurrentTime,
            |b| Ok(b.player()?.current_time()?.into()),
            |b, v| Ok(b.player()?.seek_to(number(Property::CurrentTime, &v)?)?),
        )
        .read_only(Property::Duration, |b| Ok(b.player()?.duration()?.into()))
        .read_only(Property::Paused, |b| Ok(b.state.borrow().paused.into()))
        .read_only(Property::Ended, |b| Ok(b.state.borrow().ended.into()))
        .read_only(Property::Buffered, |b| {
            let player = b.player()?;
            let end = player.loaded_fraction()? * player.duration()?;
            Ok(TimeRanges::single(0.0, end).into())
        })
        .read_write(
            Property::Src,
            |b| Ok(b.player()?.media_url()?.into()),
            DeferredBackend::load_source,
        )
        .read_only(Property::CurrentSrc, |b| Ok(b.player()?.media_url()?.into()))
        .read_write(
            Property::PlaybackRate,
            |b| Ok(b.player()?.playback_rate()?.into()),
            |b, v| Ok(b.player()?.set_playback_rate(number(Property::PlaybackRate, &v)?)?),
        )
        .read_write(
            Property::Loop,
            |b| Ok(b.state.borrow().looping.into()),
            |b, v| {
                let looping = v.truthy();
                b.player()?.set_loop(looping)?;
                b.state.borrow_mut().looping = looping;
                Ok(())
            },
        )
        .read_write(
            Property::Autoplay,
            |b| Ok(b.state.borrow().autoplay.into()),
            |b, v| {
                b.state.borrow_mut().autoplay = v.truthy();
                Ok(())
            },
        )
}

impl BackendHandle for DeferredBackend {
    fn renderer_name(&self) -> String {
        self.profile.name.to_string()
    }

    fn readiness(&self) -> Readiness {
        self.state.borrow().readiness
    }

    fn get(&self, property: Property) -> Result<PropertyValue> {
        if !self.readiness().is_ready() {
            return Ok(property.neutral_default());
        }
        self.accessors.get(self, self.profile.name, property)
    }

    fn set(&self, property: Property, value: PropertyValue) -> Result<()> {
        match self.readiness() {
            Readiness::Ready => self.accessors.set(self, self.profile.name, property, value),
            Readiness::Destroyed => Ok(()),
            _ => {
                self.queue
                    .borrow_mut()
                    .enqueue(PendingOperation::Set { property, value });
                Ok(())
            }
        }
    }

    fn call(&self, method: Method) -> Result<()> {
        match self.readiness() {
            Readiness::Ready => self.invoke(method),
            Readiness::Destroyed => Ok(()),
            _ => {
                self.queue.borrow_mut().enqueue(PendingOperation::call(method));
                Ok(())
            }
        }
    }

    fn supports(&self, method: Method) -> bool {
        method != Method::Stop || self.profile.supports_stop
    }

    fn can_play_type(&self, mime: &str) -> CanPlayResponse {
        self.profile.accepts(mime).into()
    }

    fn show(&self) {
        let player = {
            let mut state = self.state.borrow_mut();
            state.visible = true;
            state.player.clone()
        };
        if let Some(player) = player {
            self.log_vendor_failure("show", player.set_visible(true).map_err(Into::into));
        }
    }

    fn hide(&self) {
        self.poller.stop();
        let (readiness, player) = {
            let mut state = self.state.borrow_mut();
            state.visible = false;
            (state.readiness, state.player.clone())
        };
        match (readiness, player) {
            (Readiness::Ready, Some(player)) => {
                self.log_vendor_failure("pause", player.pause().map_err(Into::into));
                self.log_vendor_failure("hide", player.set_visible(false).map_err(Into::into));
            }
            (readiness, _) if readiness.is_pending() => {
                self.queue.borrow_mut().enqueue(PendingOperation::call(Method::Pause));
            }
            _ => {}
        }
    }

    fn set_size(&self, width: u32, height: u32) -> Result<()> {
        match self.readiness() {
            Readiness::Ready => Ok(self.player()?.set_size(width, height)?),
            Readiness::Destroyed => Ok(()),
            _ => {
                self.state.borrow_mut().size = Some((width, height));
                Ok(())
            }
        }
    }

    fn destroy(&self) {
        let (player, waiters) = {
            let mut state = self.state.borrow_mut();
            if state.readiness.is_terminal() {
                return;
            }
            state.readiness = Readiness::Destroyed;
            (state.player.take(), std::mem::take(&mut state.waiters))
        };
        self.cancel.cancel();
        self.poller.stop();
        let dropped = self.queue.borrow_mut().clear();

        if let Some(player) = player {
            self.log_vendor_failure("destroy", player.destroy().map_err(Into::into));
        }
        debug!(
            renderer = self.profile.name,
            element = %self.element_id,
            dropped,
            "vendor backend destroyed"
        );

        for waiter in waiters {
            let _ = waiter.send(Err(PlaybackError::Cancelled));
        }
    }

    fn when_ready(&self) -> LocalBoxFuture<'static, Result<()>> {
        let mut state = self.state.borrow_mut();
        match state.readiness {
            Readiness::Ready => Box::pin(futures::future::ready(Ok(()))),
            Readiness::Destroyed => Box::pin(futures::future::ready(Err(PlaybackError::Cancelled))),
            _ => {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Box::pin(async move { rx.await.unwrap_or(Err(PlaybackError::Cancelled)) })
            }
        }
    }
}

impl fmt::Debug for DeferredBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("DeferredBackend")
            .field("renderer", &self.profile.name)
            .field("element", &self.element_id)
            .field("readiness", &state.readiness)
            .field("pending", &self.queue.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderers::vendor::profile;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::scheduler::TimerId;
    use bridge_traits::vendor::{PlayerState, VendorEventSink};
    use core_runtime::events::EventTarget;
    use std::cell::Cell;
    use std::time::Duration;

    #[derive(Default)]
    struct NullScheduler {
        active: Cell<usize>,
    }

    impl IntervalScheduler for NullScheduler {
        fn set_interval(&self, _period: Duration, _tick: Rc<dyn Fn()>) -> TimerId {
            self.active.set(self.active.get() + 1);
            TimerId(self.active.get() as u64)
        }

        fn clear_interval(&self, _id: TimerId) {
            self.active.set(self.active.get() - 1);
        }
    }

    #[derive(Default)]
    struct Player {
        volume: Cell<f64>,
        playing: Cell<bool>,
        destroyed: Cell<bool>,
        sink: RefCell<Option<VendorEventSink>>,
    }

    impl Player {
        fn push(&self, event: VendorEvent) {
            let sink = self.sink.borrow().clone();
            if let Some(sink) = sink {
                sink(event);
            }
        }
    }

    impl VendorPlayer for Player {
        fn play(&self) -> BridgeResult<()> {
            self.playing.set(true);
            Ok(())
        }
        fn pause(&self) -> BridgeResult<()> {
            self.playing.set(false);
            Ok(())
        }
        fn load(&self, _media_id: &str, _autoplay: bool) -> BridgeResult<()> {
            Ok(())
        }
        fn seek_to(&self, _seconds: f64) -> BridgeResult<()> {
            Ok(())
        }
        fn set_volume(&self, volume: f64) -> BridgeResult<()> {
            self.volume.set(volume);
            Ok(())
        }
        fn volume(&self) -> BridgeResult<f64> {
            Ok(self.volume.get())
        }
        fn set_muted(&self, _muted: bool) -> BridgeResult<()> {
            Ok(())
        }
        fn is_muted(&self) -> BridgeResult<bool> {
            Ok(false)
        }
        fn current_time(&self) -> BridgeResult<f64> {
            Ok(0.0)
        }
        fn duration(&self) -> BridgeResult<f64> {
            Ok(200.0)
        }
        fn loaded_fraction(&self) -> BridgeResult<f64> {
            Ok(0.25)
        }
        fn media_url(&self) -> BridgeResult<String> {
            Ok("https://www.youtube.com/watch?v=abc".into())
        }
        fn set_size(&self, _width: u32, _height: u32) -> BridgeResult<()> {
            Ok(())
        }
        fn subscribe(&self, sink: VendorEventSink) {
            *self.sink.borrow_mut() = Some(sink);
        }
        fn destroy(&self) -> BridgeResult<()> {
            self.destroyed.set(true);
            Ok(())
        }
    }

    /// Host that parks the ready signal until the test resolves it.
    #[derive(Default)]
    struct ParkingHost {
        signal: RefCell<Option<ReadySignal>>,
    }

    impl VendorHost for ParkingHost {
        fn inject_script(&self, _: &str, _: &str, _: Box<dyn FnOnce()>) -> BridgeResult<()> {
            Ok(())
        }

        fn create_player(&self, _request: PlayerRequest, ready: ReadySignal) -> BridgeResult<()> {
            *self.signal.borrow_mut() = Some(ready);
            Ok(())
        }
    }

    struct Fixture {
        target: EventTarget,
        seen: Rc<RefCell<Vec<String>>>,
        scheduler: Rc<NullScheduler>,
        host: Rc<ParkingHost>,
        backend: Rc<DeferredBackend>,
    }

    fn fixture(renderer: &str) -> Fixture {
        let target = EventTarget::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for event in EventType::CANONICAL.iter() {
            let seen = seen.clone();
            target.add_event_listener(event.as_str(), move |e| {
                seen.borrow_mut().push(e.name().to_string());
            });
        }
        let ctx = RendererContext {
            element_id: "mejs_test".into(),
            renderer: renderer.into(),
            events: target.downgrade(),
            autoplay: false,
            width: 640,
            height: 360,
            poll_interval: Duration::from_millis(250),
        };
        let scheduler = Rc::new(NullScheduler::default());
        let host = Rc::new(ParkingHost::default());
        let backend = DeferredBackend::new(profile(renderer).unwrap(), ctx, scheduler.clone());
        backend
            .start(PlayerRequest::default(), host.clone(), None)
            .unwrap();
        Fixture {
            target,
            seen,
            scheduler,
            host,
            backend,
        }
    }

    fn resolve(fixture: &Fixture, player: Rc<Player>) -> bool {
        let signal = fixture.host.signal.borrow_mut().take().unwrap();
        signal.resolve(player)
    }

    #[test]
    fn test_queue_then_replay_on_ready() {
        let fx = fixture("youtube_iframe");
        fx.backend.set(Property::Volume, 0.3.into()).unwrap();
        fx.backend.call(Method::Play).unwrap();

        assert_eq!(fx.backend.get(Property::Volume).unwrap(), PropertyValue::Null);
        assert_eq!(fx.backend.pending_operations(), 2);

        let player = Rc::new(Player::default());
        assert!(resolve(&fx, player.clone()));

        assert!(fx.backend.readiness().is_ready());
        assert_eq!(player.volume.get(), 0.3);
        assert!(player.playing.get());
        assert_eq!(
            fx.backend.get(Property::Volume).unwrap(),
            PropertyValue::Number(0.3)
        );
        // Replayed volume echoes before the ready sequence.
        assert_eq!(
            *fx.seen.borrow(),
            vec!["volumechange", "rendererready", "loadeddata", "loadedmetadata", "canplay"]
        );
        drop(fx.target);
    }

    #[test]
    fn test_state_changes_drive_poller_and_flags() {
        let fx = fixture("youtube_iframe");
        let player = Rc::new(Player::default());
        resolve(&fx, player.clone());

        player.push(VendorEvent::StateChange(PlayerState::Playing));
        assert!(fx.backend.is_polling());
        assert_eq!(fx.backend.get(Property::Paused).unwrap(), PropertyValue::Bool(false));

        fx.backend.hide();
        assert!(!fx.backend.is_polling());
        assert!(!player.playing.get());
        assert_eq!(fx.scheduler.active.get(), 0);

        player.push(VendorEvent::Error {
            message: "150".into(),
        });
        assert!(fx.seen.borrow().contains(&"error".to_string()));
    }

    #[test]
    fn test_buffered_is_single_range() {
        let fx = fixture("youtube_iframe");
        resolve(&fx, Rc::new(Player::default()));

        let buffered = fx.backend.get(Property::Buffered).unwrap();
        let ranges = buffered.as_ranges().unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges.end(0), Some(50.0));
    }

    #[test]
    fn test_stop_only_on_plugin_backends() {
        let iframe = fixture("youtube_iframe");
        assert!(!iframe.backend.supports(Method::Stop));

        let plugin = fixture("flash_video");
        assert!(plugin.backend.supports(Method::Stop));
        resolve(&plugin, Rc::new(Player::default()));
        // Native event model: rendererready first, no synthetic sequence.
        assert_eq!(*plugin.seen.borrow(), vec!["rendererready"]);
    }

    #[test]
    fn test_late_ready_after_destroy_is_ignored() {
        let fx = fixture("vimeo_iframe");
        fx.backend.set(Property::Volume, 0.5.into()).unwrap();
        fx.backend.destroy();

        let player = Rc::new(Player::default());
        assert!(resolve(&fx, player.clone()));

        assert!(player.destroyed.get());
        assert_eq!(player.volume.get(), 0.0);
        assert!(fx.seen.borrow().is_empty());
        assert_eq!(fx.backend.readiness(), Readiness::Destroyed);
    }

    #[test]
    fn test_rejected_construction_emits_error() {
        let fx = fixture("dailymotion_iframe");
        let signal = fx.host.signal.borrow_mut().take().unwrap();
        signal.reject(bridge_traits::BridgeError::OperationFailed("iframe blocked".into()));

        assert_eq!(*fx.seen.borrow(), vec!["error"]);
        assert_eq!(fx.backend.readiness(), Readiness::Destroyed);
    }

    #[tokio::test]
    async fn test_when_ready_resolves_and_cancels() {
        let fx = fixture("youtube_iframe");
        let ready = fx.backend.when_ready();
        resolve(&fx, Rc::new(Player::default()));
        assert!(ready.await.is_ok());

        let other = fixture("soundcloud_iframe");
        let pending = other.backend.when_ready();
        other.backend.destroy();
        assert!(matches!(pending.await, Err(PlaybackError::Cancelled)));
    }
}
