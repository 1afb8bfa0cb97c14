//! Bridge session lifecycle against a recording web view

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::WebViewHost;
use core_bridge::outbound::{self, CLEANUP_SCRIPT};
use core_bridge::{
    BridgeSession, BridgeSessionError, Dispatch, ExperienceFactory, ExperienceOptions,
    KinestexMessage, MessageError, SessionRegistry, WorkoutActivityAction,
};
use core_runtime::config::{BridgeTimings, Credentials};
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct RecordingView {
    calls: Mutex<Vec<String>>,
    fail_scripts: bool,
    fail_pause: bool,
}

impl RecordingView {
    fn failing() -> Self {
        Self {
            fail_scripts: true,
            fail_pause: true,
            ..Self::default()
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn scripts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| call.strip_prefix("eval:").map(str::to_owned))
            .collect()
    }
}

#[async_trait]
impl WebViewHost for RecordingView {
    async fn load_url(&self, url: &str) -> BridgeResult<()> {
        self.record(format!("load:{}", url));
        Ok(())
    }

    async fn evaluate_script(&self, script: &str) -> BridgeResult<Option<Value>> {
        self.record(format!("eval:{}", script));
        if self.fail_scripts {
            return Err(BridgeError::ScriptFailed("TypeError".into()));
        }
        Ok(None)
    }

    async fn pause_all_media_playback(&self) -> BridgeResult<()> {
        self.record("pause".into());
        if self.fail_pause {
            return Err(BridgeError::NotAvailable("pause".into()));
        }
        Ok(())
    }

    async fn stop_loading(&self) -> BridgeResult<()> {
        self.record("stop".into());
        Ok(())
    }

    async fn detach_delegates(&self) -> BridgeResult<()> {
        self.record("detach".into());
        Ok(())
    }

    async fn release(&self) -> BridgeResult<()> {
        self.record("release".into());
        Ok(())
    }
}

fn credentials() -> Credentials {
    Credentials {
        api_key: "key-1".into(),
        company_name: "Acme".into(),
        user_id: "user-1".into(),
    }
}

fn new_session(registry: &Arc<SessionRegistry>) -> BridgeSession {
    let experience = ExperienceFactory::new(credentials(), "https://kinestex.vercel.app")
        .workout("Fitness Lite", ExperienceOptions::new().param("planC", "cardio"))
        .unwrap();
    BridgeSession::new(
        experience,
        credentials(),
        BridgeTimings::default(),
        Arc::clone(registry),
    )
    .unwrap()
}

fn loaded_body() -> String {
    json!({"type": "kinestex_loaded"}).to_string()
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn test_attach_navigates_and_becomes_current() {
    let registry = Arc::new(SessionRegistry::new());
    let session = new_session(&registry);
    let view = Arc::new(RecordingView::default());

    assert!(!session.is_ready());
    assert!(registry.contains(session.id()));
    assert_eq!(registry.current(), None);

    session.attach(view.clone()).await.unwrap();

    assert!(session.is_ready());
    assert_eq!(registry.current(), Some(session.id()));
    assert_eq!(view.calls(), vec![format!("load:{}", session.url())]);
    assert!(session.url().contains("/workout/Fitness%20Lite?style=dark"));
}

#[tokio::test(start_paused = true)]
async fn test_kinestex_loaded_injects_auth_and_debounces() {
    let registry = Arc::new(SessionRegistry::new());
    let session = new_session(&registry);
    let view = Arc::new(RecordingView::default());
    session.attach(view.clone()).await.unwrap();
    let mut receiver = session.subscribe();

    let message = session
        .handle_script_message("listener", &loaded_body())
        .unwrap();
    assert!(matches!(message, KinestexMessage::KinestexLoaded(_)));
    assert!(matches!(
        receiver.recv().await.unwrap(),
        KinestexMessage::KinestexLoaded(_)
    ));

    settle().await;
    let scripts = view.scripts();
    assert_eq!(scripts.len(), 1);
    assert!(scripts[0].contains(r#""key":"key-1""#));
    assert!(scripts[0].contains(r#""company":"Acme""#));
    assert!(scripts[0].contains(r#""planC":"cardio""#));
    assert!(scripts[0].ends_with(&format!("\"{}\");", session.url())));

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(session.state().loading);
    assert!(session.state().overlay_visible);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!session.state().loading);
    assert!(session.state().overlay_visible);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(!session.state().overlay_visible);
}

#[tokio::test(start_paused = true)]
async fn test_every_message_reaches_the_stream() {
    let registry = Arc::new(SessionRegistry::new());
    let session = new_session(&registry);
    let mut messages = Box::pin(session.messages());

    for body in [
        json!({"type": "successful_repeat", "value": 3}),
        json!({"type": "exit_kinestex"}),
        json!({"type": "something_new"}),
    ] {
        session
            .handle_script_message("listener", &body.to_string())
            .unwrap();
    }

    assert!(matches!(messages.next().await, Some(KinestexMessage::Reps(_))));
    assert!(matches!(
        messages.next().await,
        Some(KinestexMessage::ExitKinestex(_))
    ));
    assert!(matches!(
        messages.next().await,
        Some(KinestexMessage::CustomType(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_malformed_messages_are_rejected() {
    let registry = Arc::new(SessionRegistry::new());
    let session = new_session(&registry);
    let mut receiver = session.subscribe();

    assert_eq!(
        session.handle_script_message("listener", "{}").unwrap_err(),
        MessageError::MissingType
    );
    assert!(matches!(
        session.handle_script_message("other", &loaded_body()),
        Err(MessageError::UnknownChannel(_))
    ));
    assert!(receiver.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_control_messages() {
    let registry = Arc::new(SessionRegistry::new());
    let session = new_session(&registry);
    let view = Arc::new(RecordingView::default());

    assert!(matches!(
        session.send_current_exercise("Squats"),
        Dispatch::NotReady
    ));

    session.attach(view.clone()).await.unwrap();

    session
        .send_current_exercise("Squats")
        .outcome()
        .await
        .unwrap();
    session.send_rest_speech("Breathe").outcome().await.unwrap();
    session
        .send_workout_action(WorkoutActivityAction::Start)
        .outcome()
        .await
        .unwrap();
    registry
        .send_action("pause", json!(true))
        .outcome()
        .await
        .unwrap();

    assert_eq!(
        view.scripts(),
        vec![
            r#"window.postMessage({"currentExercise":"Squats"}, "*");"#,
            r#"window.postMessage({"currentRestSpeech":"Breathe"}, "*");"#,
            r#"window.postMessage({"workout_activity_action":"start"}, "*");"#,
            r#"window.postMessage({"pause":true}, "*");"#,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_script_failure_is_reported_not_escalated() {
    let registry = Arc::new(SessionRegistry::new());
    let session = new_session(&registry);
    session
        .attach(Arc::new(RecordingView::failing()))
        .await
        .unwrap();

    let outcome = session.send_current_exercise("Squats").outcome().await;
    assert!(matches!(outcome, Err(BridgeError::ScriptFailed(_))));
    assert!(session.is_ready());
}

#[tokio::test(start_paused = true)]
async fn test_teardown_runs_every_step_in_order() {
    let registry = Arc::new(SessionRegistry::new());
    let session = new_session(&registry);
    let view = Arc::new(RecordingView::failing());
    session.attach(view.clone()).await.unwrap();

    session.teardown().await;

    assert_eq!(
        view.calls(),
        vec![
            format!("load:{}", session.url()),
            "pause".to_string(),
            format!("eval:{}", CLEANUP_SCRIPT),
            "load:about:blank".to_string(),
            "stop".to_string(),
            "detach".to_string(),
            "release".to_string(),
        ]
    );
    assert!(session.state().torn_down);
    assert!(!session.is_ready());
    assert_eq!(registry.current(), None);
    assert!(!registry.contains(session.id()));

    session.teardown().await;
    assert_eq!(view.calls().len(), 7);

    assert!(matches!(session.send_rest_speech("x"), Dispatch::NotReady));
    assert!(matches!(
        registry.send_action("pause", json!(true)),
        Dispatch::NoActiveSession
    ));
    assert!(matches!(
        session.attach(view.clone()).await,
        Err(BridgeSessionError::Config(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_teardown_waits_before_release() {
    let registry = Arc::new(SessionRegistry::new());
    let session = Arc::new(new_session(&registry));
    let view = Arc::new(RecordingView::default());
    session.attach(view.clone()).await.unwrap();

    let task = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.teardown().await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(view.calls().last().map(String::as_str), Some("load:about:blank"));

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(view.calls().last().map(String::as_str), Some("release"));
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_content_process_termination() {
    let registry = Arc::new(SessionRegistry::new());
    let session = new_session(&registry);
    let view = Arc::new(RecordingView::default());
    session.attach(view.clone()).await.unwrap();

    session.on_content_process_terminated().await;

    assert_eq!(view.calls()[1..], ["stop".to_string(), "detach".to_string()]);
    assert!(!session.is_ready());
    assert!(!session.state().loading);
    assert_eq!(registry.current(), None);
    assert!(matches!(
        session.send_current_exercise("Squats"),
        Dispatch::NotReady
    ));
}

#[tokio::test(start_paused = true)]
async fn test_navigation_sets_loading() {
    let registry = Arc::new(SessionRegistry::new());
    let session = new_session(&registry);
    session
        .attach(Arc::new(RecordingView::default()))
        .await
        .unwrap();
    session
        .handle_script_message("listener", &loaded_body())
        .unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!session.state().loading);

    session.on_navigation_started();
    assert!(session.state().loading);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_session_schedules_teardown() {
    let registry = Arc::new(SessionRegistry::new());
    let session = new_session(&registry);
    let id = session.id();
    let view = Arc::new(RecordingView::default());
    session.attach(view.clone()).await.unwrap();

    drop(session);
    assert!(matches!(
        registry.send_action("pause", json!(true)),
        Dispatch::NoActiveSession
    ));
    assert!(!registry.contains(id));

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(view.calls().last().map(String::as_str), Some("release"));
}

#[tokio::test(start_paused = true)]
async fn test_wait_until_ready() {
    let registry = Arc::new(SessionRegistry::new());
    let session = Arc::new(new_session(&registry));

    assert!(!session.wait_until_ready(Duration::from_millis(120)).await);

    tokio::spawn({
        let session = Arc::clone(&session);
        async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            session
                .attach(Arc::new(RecordingView::default()))
                .await
                .unwrap();
        }
    });

    assert!(session.wait_until_ready_default().await);
}

#[tokio::test(start_paused = true)]
async fn test_newest_attached_session_is_current() {
    let registry = Arc::new(SessionRegistry::new());
    let first = new_session(&registry);
    let second = new_session(&registry);
    let first_view = Arc::new(RecordingView::default());
    let second_view = Arc::new(RecordingView::default());

    first.attach(first_view.clone()).await.unwrap();
    second.attach(second_view.clone()).await.unwrap();
    assert_eq!(registry.current(), Some(second.id()));

    registry
        .send_action("currentExercise", json!("Lunges"))
        .outcome()
        .await
        .unwrap();
    assert!(first_view.scripts().is_empty());
    assert_eq!(second_view.scripts().len(), 1);

    second.teardown().await;
    assert_eq!(registry.current(), None);
    assert_eq!(registry.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_scripts_reach_the_page_in_send_order() {
    for _ in 0..25 {
        let registry = Arc::new(SessionRegistry::new());
        let session = new_session(&registry);
        let view = Arc::new(RecordingView::default());
        session.attach(view.clone()).await.unwrap();

        session
            .handle_script_message("listener", &loaded_body())
            .unwrap();
        let deliveries: Vec<Dispatch> = (0..20)
            .map(|n| session.send_current_exercise(&format!("ex{}", n)))
            .collect();
        for delivery in deliveries {
            delivery.outcome().await.unwrap();
        }

        let mut expected = vec![outbound::auth_script(
            &credentials(),
            session.payload(),
            session.url(),
        )];
        expected.extend((0..20).map(|n| outbound::current_exercise_script(&format!("ex{}", n))));
        assert_eq!(view.scripts(), expected);

        session.teardown().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_reattach_releases_previous_view() {
    let registry = Arc::new(SessionRegistry::new());
    let session = new_session(&registry);
    let first = Arc::new(RecordingView::default());
    let second = Arc::new(RecordingView::default());
    let load = format!("load:{}", session.url());

    session.attach(first.clone()).await.unwrap();
    session.attach(second.clone()).await.unwrap();

    assert_eq!(
        first.calls(),
        vec![
            load.clone(),
            "stop".to_string(),
            "detach".to_string(),
            "release".to_string(),
        ]
    );
    assert_eq!(second.calls(), vec![load.clone()]);

    session.send_rest_speech("Breathe").outcome().await.unwrap();
    assert!(first.scripts().is_empty());
    assert_eq!(second.scripts().len(), 1);

    session.teardown().await;
    assert_eq!(first.calls().len(), 4);
    assert_eq!(second.calls().last().map(String::as_str), Some("release"));
}

#[tokio::test(start_paused = true)]
async fn test_wait_until_ready_accepts_unbounded_timeout() {
    let registry = Arc::new(SessionRegistry::new());
    let session = Arc::new(new_session(&registry));

    tokio::spawn({
        let session = Arc::clone(&session);
        async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            session
                .attach(Arc::new(RecordingView::default()))
                .await
                .unwrap();
        }
    });

    assert!(session.wait_until_ready(Duration::MAX).await);
}

#[test]
fn test_session_requires_runtime() {
    let registry = Arc::new(SessionRegistry::new());
    let experience = ExperienceFactory::new(credentials(), "https://kinestex.vercel.app")
        .plan("p1", ExperienceOptions::new())
        .unwrap();
    let result = BridgeSession::new(
        experience,
        credentials(),
        BridgeTimings::default(),
        registry,
    );
    assert!(matches!(result, Err(BridgeSessionError::Runtime(_))));
}
