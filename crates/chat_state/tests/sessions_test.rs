//! Session directory and document library behaviour

mod test_utils;

use chat_state::{ChatError, NoticeLevel};
use test_utils::{chat, request_failed, FakeBackend, Op};

#[tokio::test]
async fn test_create_prepends_and_selects() {
    let backend = FakeBackend::new();
    backend.with_session("s-old", "Old");
    let controller = backend.controller();
    controller.sessions().list().await.unwrap();

    let created = controller.sessions().create(Some("Statics")).await.unwrap();

    let state = controller.store().snapshot();
    assert_eq!(state.sessions[0].id, created.id);
    assert_eq!(state.sessions[0].name, "Statics");
    assert_eq!(state.sessions.len(), 2);
    assert_eq!(state.current_session_id, Some(created.id.clone()));
    assert!(state.history(&created.id).is_empty());
}

#[tokio::test]
async fn test_failed_create_leaves_directory_unchanged() {
    let backend = FakeBackend::new();
    backend.with_session("s1", "Statics");
    let controller = backend.controller();
    controller.sessions().list().await.unwrap();
    controller.sessions().select("s1").await.unwrap();
    let mut notices = controller.notifier().subscribe();

    backend.fail_next(Op::CreateSession, request_failed("db down"));
    let err = controller.sessions().create(None).await.unwrap_err();

    assert!(matches!(err, ChatError::RequestFailed { .. }));
    let state = controller.store().snapshot();
    assert_eq!(state.sessions.len(), 1);
    assert_eq!(state.current_session_id.as_deref(), Some("s1"));
    assert_eq!(notices.try_recv().unwrap().level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_failed_list_keeps_previous_sessions() {
    let backend = FakeBackend::new();
    backend.with_session("s1", "Statics");
    let controller = backend.controller();
    controller.sessions().list().await.unwrap();

    backend.with_session("s2", "Dynamics");
    backend.fail_next(Op::ListSessions, request_failed("timeout"));
    assert!(controller.sessions().list().await.is_err());

    let ids: Vec<_> = controller
        .store()
        .read(|s| s.sessions.iter().map(|x| x.id.clone()).collect());
    assert_eq!(ids, vec!["s1".to_string()]);
}

#[tokio::test]
async fn test_select_unknown_session_is_rejected() {
    let backend = FakeBackend::new();
    let controller = backend.controller();

    let err = controller.sessions().select("ghost").await.unwrap_err();

    assert_eq!(err, ChatError::UnknownSession("ghost".to_string()));
    assert!(controller.store().read(|s| s.current_session_id.is_none()));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_select_loads_history() {
    let backend = FakeBackend::new();
    backend.with_session("s1", "Statics");
    backend.with_history(
        "s1",
        vec![
            chat("c1", "s1", "Hi", "Hello", &[]),
            chat("c2", "s1", "Beams?", "Yes", &[]),
        ],
    );
    let controller = backend.controller();
    controller.sessions().list().await.unwrap();

    controller.sessions().select("s1").await.unwrap();

    let ids: Vec<_> = controller
        .store()
        .read(|s| s.messages().iter().map(|m| m.id().to_string()).collect());
    assert_eq!(ids, vec!["c1".to_string(), "c2".to_string()]);
}

#[tokio::test]
async fn test_failed_history_load_empties_list() {
    let backend = FakeBackend::new();
    backend.with_session("s1", "Statics");
    backend.with_history("s1", vec![chat("c1", "s1", "Hi", "Hello", &[])]);
    let controller = backend.controller();
    controller.sessions().list().await.unwrap();
    controller.sessions().select("s1").await.unwrap();

    backend.fail_next(Op::History, request_failed("boom"));
    assert!(controller.sessions().load_history("s1").await.is_err());

    assert!(controller.store().read(|s| s.messages().is_empty()));
    assert_eq!(
        controller.store().read(|s| s.current_session_id.clone()),
        Some("s1".to_string())
    );
}

#[tokio::test]
async fn test_delete_current_session_clears_messages() {
    let backend = FakeBackend::new();
    backend.with_session("s1", "Statics");
    backend.with_session("s2", "Dynamics");
    backend.with_history("s1", vec![chat("c1", "s1", "Hi", "Hello", &[])]);
    let controller = backend.controller();
    controller.sessions().list().await.unwrap();
    controller.sessions().select("s1").await.unwrap();

    controller.sessions().delete("s1").await.unwrap();

    let state = controller.store().snapshot();
    assert!(state.current_session_id.is_none());
    assert!(state.messages().is_empty());
    assert!(state.session("s1").is_none());
    assert!(state.session("s2").is_some());
}

#[tokio::test]
async fn test_failed_delete_keeps_entry() {
    let backend = FakeBackend::new();
    backend.with_session("s1", "Statics");
    backend.with_history("s1", vec![chat("c1", "s1", "Hi", "Hello", &[])]);
    let controller = backend.controller();
    controller.sessions().list().await.unwrap();
    controller.sessions().select("s1").await.unwrap();
    let mut notices = controller.notifier().subscribe();

    backend.fail_next(Op::DeleteSession, request_failed("locked"));
    assert!(controller.sessions().delete("s1").await.is_err());

    let state = controller.store().snapshot();
    assert!(state.session("s1").is_some());
    assert_eq!(state.current_session_id.as_deref(), Some("s1"));
    assert_eq!(state.messages().len(), 1);
    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.text.contains("locked"));
}

#[tokio::test]
async fn test_record_sent_bumps_counters() {
    let backend = FakeBackend::new();
    let created = backend.with_session("s1", "Statics");
    let controller = backend.controller();
    controller.sessions().list().await.unwrap();

    controller.sessions().record_sent("s1");
    controller.sessions().record_sent("missing");

    let session = controller.store().read(|s| s.session("s1").cloned()).unwrap();
    assert_eq!(session.message_count, 1);
    assert!(session.updated_at >= created.updated_at);
}

#[tokio::test]
async fn test_document_delete_strips_selection() {
    let backend = FakeBackend::new();
    backend.with_document("d1", "beams.pdf");
    backend.with_document("d2", "columns.pdf");
    let controller = backend.controller();
    controller.documents().load().await.unwrap();
    controller.documents().select_all();
    assert_eq!(controller.documents().selected_ids().len(), 2);

    controller.documents().delete("d1").await.unwrap();

    let state = controller.store().snapshot();
    assert_eq!(state.selector.selected_ids(), ["d2".to_string()]);
    assert!(!state.selector.has_candidate("d1"));
}

#[tokio::test]
async fn test_failed_document_delete_changes_nothing() {
    let backend = FakeBackend::new();
    backend.with_document("d1", "beams.pdf");
    let controller = backend.controller();
    controller.documents().load().await.unwrap();
    controller.documents().toggle("d1");

    backend.fail_next(Op::DeleteDocument, request_failed("in use"));
    assert!(controller.documents().delete("d1").await.is_err());

    let state = controller.store().snapshot();
    assert!(state.selector.has_candidate("d1"));
    assert!(state.selector.is_selected("d1"));
}
