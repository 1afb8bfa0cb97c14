//! # Bridge Session
//!
//! One embedded experience from creation to teardown.
//!
//! ## Lifecycle
//!
//! 1. A session is created from an [`Experience`] (URL plus payload) and
//!    registered with a [`SessionRegistry`].
//! 2. The host creates its web view and calls [`BridgeSession::attach`]. The
//!    session navigates to the experience URL and becomes *current*.
//! 3. The host forwards script messages through
//!    [`BridgeSession::handle_script_message`]. On `kinestex_loaded` the auth
//!    payload is injected and the loading flags clear after short debounces.
//! 4. [`BridgeSession::teardown`] (or dropping the session) pauses media, runs
//!    the cleanup script, blanks the page and finally releases the view.
//!
//! Every view operation (navigation, injection, cleanup) is queued on one
//! per-session command channel and executed in order by a single worker task
//! that owns the view. Script injections are fire-and-forget and report
//! through [`Delivery`].

use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{WebViewHost, BLANK_PAGE_URL};
use core_runtime::config::{BridgeTimings, Credentials};
use futures::Stream;
use serde_json::{Map, Value};
use std::fmt;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::bus::{MessageBus, Receiver};
use crate::error::{BridgeSessionError, MessageError, Result};
use crate::experience::Experience;
use crate::message::KinestexMessage;
use crate::outbound::{self, WorkoutActivityAction, CLEANUP_SCRIPT};
use crate::registry::{SessionId, SessionRegistry};

/// Observable session flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    /// A view is attached and can receive scripts
    pub attached: bool,
    /// The page is navigating or has not reported `kinestex_loaded` yet
    pub loading: bool,
    /// The host's loading overlay should be shown
    pub overlay_visible: bool,
    pub torn_down: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            attached: false,
            loading: true,
            overlay_visible: true,
            torn_down: false,
        }
    }
}

/// Completion of a queued script injection.
#[derive(Debug)]
pub struct Delivery {
    receiver: oneshot::Receiver<BridgeResult<()>>,
}

impl Delivery {
    /// Waits for the script to finish evaluating.
    pub async fn outcome(self) -> BridgeResult<()> {
        self.receiver.await.unwrap_or_else(|_| {
            Err(BridgeError::OperationFailed(
                "view worker stopped before running the script".to_string(),
            ))
        })
    }
}

/// Result of asking a session to post something to its page.
#[derive(Debug)]
pub enum Dispatch {
    /// The script was queued; the delivery resolves once it has run
    Sent(Delivery),
    /// The session has no attached view or was torn down
    NotReady,
    /// No session was available to send through
    NoActiveSession,
}

impl Dispatch {
    pub fn is_sent(&self) -> bool {
        matches!(self, Dispatch::Sent(_))
    }

    /// Waits for delivery. Non-sent dispatches resolve to `NotAvailable`.
    pub async fn outcome(self) -> BridgeResult<()> {
        match self {
            Dispatch::Sent(delivery) => delivery.outcome().await,
            Dispatch::NotReady => Err(BridgeError::NotAvailable(
                "bridge session is not ready".to_string(),
            )),
            Dispatch::NoActiveSession => Err(BridgeError::NotAvailable(
                "no active bridge session".to_string(),
            )),
        }
    }
}

/// Work for the view worker, executed strictly in queue order.
enum ViewCommand {
    Attach {
        view: Arc<dyn WebViewHost>,
        url: String,
        reply: oneshot::Sender<BridgeResult<()>>,
    },
    Evaluate {
        label: &'static str,
        script: String,
        reply: oneshot::Sender<BridgeResult<()>>,
    },
    /// Drop a view whose content process died, without cleanup scripts
    Discard { reply: oneshot::Sender<()> },
    /// Full cleanup; the worker stops afterwards. Replies whether a view was held.
    Teardown { reply: oneshot::Sender<bool> },
}

/// Owns the attached view and runs queued commands one at a time.
struct ViewWorker {
    id: SessionId,
    timings: BridgeTimings,
    view: Option<Arc<dyn WebViewHost>>,
}

impl ViewWorker {
    fn start(
        runtime: &Handle,
        id: SessionId,
        timings: BridgeTimings,
    ) -> mpsc::UnboundedSender<ViewCommand> {
        let (commands, mut receiver) = mpsc::unbounded_channel();
        let mut worker = ViewWorker {
            id,
            timings,
            view: None,
        };
        runtime.spawn(async move {
            while let Some(command) = receiver.recv().await {
                if worker.run(command).await.is_break() {
                    break;
                }
            }
            debug!(session_id = %worker.id, "View worker stopped");
        });
        commands
    }

    async fn run(&mut self, command: ViewCommand) -> ControlFlow<()> {
        match command {
            ViewCommand::Attach { view, url, reply } => {
                if let Some(previous) = self.view.take() {
                    info!(session_id = %self.id, "Releasing previously attached web view");
                    self.release(previous.as_ref()).await;
                }
                let loaded = view.load_url(&url).await;
                self.view = Some(view);
                let _ = reply.send(loaded);
            }
            ViewCommand::Evaluate {
                label,
                script,
                reply,
            } => {
                let outcome = match &self.view {
                    Some(view) => view.evaluate_script(&script).await.map(|_| ()),
                    None => Err(BridgeError::NotAvailable(
                        "web view was released".to_string(),
                    )),
                };
                match &outcome {
                    Ok(()) => debug!(session_id = %self.id, label, "Script delivered"),
                    Err(e) => warn!(session_id = %self.id, label, error = %e, "Script failed"),
                }
                let _ = reply.send(outcome);
            }
            ViewCommand::Discard { reply } => {
                if let Some(view) = self.view.take() {
                    log_step(self.id, "stop loading", view.stop_loading().await);
                    log_step(self.id, "detach delegates", view.detach_delegates().await);
                }
                let _ = reply.send(());
            }
            ViewCommand::Teardown { reply } => {
                let held = match self.view.take() {
                    Some(view) => {
                        self.clean_up(view.as_ref()).await;
                        true
                    }
                    None => false,
                };
                let _ = reply.send(held);
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    async fn clean_up(&self, view: &dyn WebViewHost) {
        log_step(self.id, "pause media", view.pause_all_media_playback().await);
        log_step(
            self.id,
            "cleanup script",
            view.evaluate_script(CLEANUP_SCRIPT).await.map(|_| ()),
        );
        log_step(self.id, "load blank page", view.load_url(BLANK_PAGE_URL).await);

        sleep(self.timings.teardown_delay).await;

        self.release(view).await;
    }

    async fn release(&self, view: &dyn WebViewHost) {
        log_step(self.id, "stop loading", view.stop_loading().await);
        log_step(self.id, "detach delegates", view.detach_delegates().await);
        log_step(self.id, "release view", view.release().await);
    }
}

pub(crate) struct SessionInner {
    id: SessionId,
    page_url: String,
    payload: Map<String, Value>,
    credentials: Credentials,
    timings: BridgeTimings,
    commands: mpsc::UnboundedSender<ViewCommand>,
    state: watch::Sender<SessionState>,
    bus: MessageBus,
    registry: Arc<SessionRegistry>,
    runtime: Handle,
    teardown_started: AtomicBool,
}

impl SessionInner {
    fn snapshot(&self) -> SessionState {
        *self.state.borrow()
    }

    fn update(&self, apply: impl FnOnce(&mut SessionState)) {
        self.state.send_modify(apply);
    }

    /// Queues `script` behind every earlier view command.
    fn dispatch(&self, label: &'static str, script: String) -> Dispatch {
        let state = self.snapshot();
        if state.torn_down || !state.attached {
            warn!(session_id = %self.id, label, "Bridge session not ready; script dropped");
            return Dispatch::NotReady;
        }

        let (reply, receiver) = oneshot::channel();
        let command = ViewCommand::Evaluate {
            label,
            script,
            reply,
        };
        if self.commands.send(command).is_err() {
            warn!(session_id = %self.id, label, "View worker gone; script dropped");
            return Dispatch::NotReady;
        }

        Dispatch::Sent(Delivery { receiver })
    }

    pub(crate) fn send_action(&self, action: &str, value: Value) -> Dispatch {
        self.dispatch("action", outbound::control_script(action, value))
    }

    fn schedule_flag_clear(self: &Arc<Self>, delay: Duration, apply: fn(&mut SessionState)) {
        let session: Weak<SessionInner> = Arc::downgrade(self);
        self.runtime.spawn(async move {
            sleep(delay).await;
            if let Some(session) = session.upgrade() {
                session.update(apply);
            }
        });
    }

    async fn teardown(&self) {
        if self.teardown_started.swap(true, Ordering::SeqCst) {
            debug!(session_id = %self.id, "Teardown already performed");
            return;
        }

        info!(session_id = %self.id, "Tearing down bridge session");
        self.registry.unregister(self.id);
        self.update(|state| state.torn_down = true);

        let (reply, done) = oneshot::channel();
        let held = match self.commands.send(ViewCommand::Teardown { reply }) {
            Ok(()) => done.await.unwrap_or(false),
            Err(_) => false,
        };
        if !held {
            debug!(session_id = %self.id, "No web view to clean up");
        }

        self.update(|state| {
            state.attached = false;
            state.loading = false;
        });
        info!(session_id = %self.id, "Bridge session cleaned up");
    }
}

fn log_step(id: SessionId, step: &'static str, result: BridgeResult<()>) {
    if let Err(e) = result {
        warn!(session_id = %id, step, error = %e, "View step failed");
    }
}

/// Owner handle for one embedded experience.
///
/// Dropping the handle without calling [`teardown`](Self::teardown) schedules
/// teardown on the session's runtime.
pub struct BridgeSession {
    inner: Arc<SessionInner>,
}

impl BridgeSession {
    /// Creates and registers a session. Must be called within a Tokio runtime.
    pub fn new(
        experience: Experience,
        credentials: Credentials,
        timings: BridgeTimings,
        registry: Arc<SessionRegistry>,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            BridgeSessionError::Runtime(format!("bridge sessions need a Tokio runtime: {}", e))
        })?;
        if timings.ready_poll_interval.is_zero() {
            return Err(BridgeSessionError::Config(
                "ready poll interval must be greater than zero".to_string(),
            ));
        }

        let (state, _) = watch::channel(SessionState::default());
        let id = SessionId::new();
        let inner = Arc::new(SessionInner {
            id,
            page_url: experience.url,
            payload: experience.payload,
            credentials,
            timings,
            commands: ViewWorker::start(&runtime, id, timings),
            state,
            bus: MessageBus::default(),
            registry,
            runtime,
            teardown_started: AtomicBool::new(false),
        });
        inner.registry.register(inner.id, Arc::downgrade(&inner));
        debug!(session_id = %inner.id, url = %inner.page_url, "Created bridge session");

        Ok(Self { inner })
    }

    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    /// Experience URL including style parameters.
    pub fn url(&self) -> &str {
        &self.inner.page_url
    }

    /// Session data merged into the auth payload.
    pub fn payload(&self) -> &Map<String, Value> {
        &self.inner.payload
    }

    pub fn state(&self) -> SessionState {
        self.inner.snapshot()
    }

    /// Receiver notified on every state change.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn subscribe(&self) -> Receiver<KinestexMessage> {
        self.inner.bus.subscribe()
    }

    /// Inbound messages as a stream; ends when the session is dropped.
    pub fn messages(&self) -> impl Stream<Item = KinestexMessage> + Send + 'static {
        self.inner.bus.messages()
    }

    /// Hands the session its web view and navigates to the experience URL.
    ///
    /// A view attached earlier is stopped, detached and released first.
    pub async fn attach(&self, view: Arc<dyn WebViewHost>) -> Result<()> {
        let inner = &self.inner;
        if inner.snapshot().torn_down {
            return Err(BridgeSessionError::Config(
                "cannot attach a view to a torn-down session".to_string(),
            ));
        }

        let (reply, loaded) = oneshot::channel();
        let command = ViewCommand::Attach {
            view,
            url: inner.page_url.clone(),
            reply,
        };
        inner
            .commands
            .send(command)
            .map_err(|_| BridgeSessionError::Config("view worker has stopped".to_string()))?;
        match loaded.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(session_id = %inner.id, error = %e, "Failed to load experience URL"),
            Err(_) => {
                return Err(BridgeSessionError::Config(
                    "view worker has stopped".to_string(),
                ))
            }
        }

        inner.update(|state| {
            state.attached = true;
            state.loading = true;
        });
        inner.registry.set_current(inner.id);
        info!(session_id = %inner.id, "Web view attached");
        Ok(())
    }

    pub fn on_navigation_started(&self) {
        self.inner.update(|state| {
            if !state.torn_down {
                state.loading = true;
            }
        });
    }

    /// The page's content process died. The view is unusable and is dropped
    /// without running the cleanup script.
    pub async fn on_content_process_terminated(&self) {
        let inner = &self.inner;
        warn!(session_id = %inner.id, "Web content process terminated");

        let (reply, discarded) = oneshot::channel();
        if inner.commands.send(ViewCommand::Discard { reply }).is_ok() {
            let _ = discarded.await;
        }

        inner.update(|state| {
            state.attached = false;
            state.loading = false;
        });
        inner.registry.clear_current(inner.id);
    }

    /// Decodes a script message from the page and delivers it to subscribers.
    ///
    /// `kinestex_loaded` additionally injects the auth payload and schedules the
    /// loading and overlay flags to clear.
    pub fn handle_script_message(
        &self,
        channel: &str,
        body: &str,
    ) -> std::result::Result<KinestexMessage, MessageError> {
        let inner = &self.inner;
        let message = KinestexMessage::parse(channel, body).map_err(|e| {
            warn!(session_id = %inner.id, error = %e, "Dropping script message");
            e
        })?;

        if matches!(message, KinestexMessage::KinestexLoaded(_)) {
            self.on_page_loaded();
        }

        let delivered = inner.bus.publish(message.clone());
        debug!(
            session_id = %inner.id,
            message_type = message.message_type(),
            delivered,
            "Received page message"
        );
        Ok(message)
    }

    fn on_page_loaded(&self) {
        let inner = &self.inner;
        let script = outbound::auth_script(&inner.credentials, &inner.payload, &inner.page_url);
        if let Dispatch::Sent(_) = inner.dispatch("auth", script) {
            info!(session_id = %inner.id, "Authentication message queued");
        }
        inner.schedule_flag_clear(inner.timings.loading_debounce, |state| {
            state.loading = false
        });
        inner.schedule_flag_clear(inner.timings.overlay_debounce, |state| {
            state.overlay_visible = false
        });
    }

    pub fn send_current_exercise(&self, exercise: &str) -> Dispatch {
        self.inner
            .dispatch("currentExercise", outbound::current_exercise_script(exercise))
    }

    pub fn send_rest_speech(&self, speech: &str) -> Dispatch {
        self.inner
            .dispatch("currentRestSpeech", outbound::rest_speech_script(speech))
    }

    pub fn send_workout_action(&self, action: WorkoutActivityAction) -> Dispatch {
        self.inner
            .dispatch("workoutAction", outbound::workout_action_script(action))
    }

    /// Posts `{<action>: <value>}` to this session's page.
    pub fn send_action(&self, action: &str, value: Value) -> Dispatch {
        self.inner.send_action(action, value)
    }

    /// Attached and not torn down.
    pub fn is_ready(&self) -> bool {
        let state = self.inner.snapshot();
        state.attached && !state.torn_down
    }

    /// Polls [`is_ready`](Self::is_ready) until it holds or `timeout` elapses.
    ///
    /// A timeout too large to represent as a deadline waits indefinitely.
    pub async fn wait_until_ready(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let poll = self.inner.timings.ready_poll_interval;
        loop {
            if self.is_ready() {
                return true;
            }
            let pause = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    poll.min(deadline - now)
                }
                None => poll,
            };
            sleep(pause).await;
        }
    }

    /// [`wait_until_ready`](Self::wait_until_ready) with the configured timeout.
    pub async fn wait_until_ready_default(&self) -> bool {
        self.wait_until_ready(self.inner.timings.ready_timeout).await
    }

    /// Releases the view. Safe to call more than once.
    pub async fn teardown(&self) {
        self.inner.teardown().await;
    }
}

impl Drop for BridgeSession {
    fn drop(&mut self) {
        if self.inner.teardown_started.load(Ordering::SeqCst) {
            return;
        }
        self.inner.registry.unregister(self.inner.id);
        let inner = Arc::clone(&self.inner);
        debug!(session_id = %inner.id, "Session dropped; scheduling teardown");
        self.inner.runtime.spawn(async move {
            inner.teardown().await;
        });
    }
}

impl fmt::Debug for BridgeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeSession")
            .field("id", &self.inner.id)
            .field("url", &self.inner.page_url)
            .field("state", &self.inner.snapshot())
            .finish()
    }
}
