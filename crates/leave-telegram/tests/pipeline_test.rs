//! End-to-end webhook scenarios with a scripted model and recorded replies.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use leave_core::{IntentParser, ModelError, PipelineConfig, TextModel};
use leave_models::{
    AccountLink, ChatIdentity, LeaveRequest, LeaveRequestId, LeaveStatus, LeaveType, Locale,
    UserId, UserProfile,
};
use leave_persistence::{LeaveRepository, MemoryStore, PersistenceError};
use leave_telegram::{
    AccountLinker, DispatchOutcome, LeaveWriter, LinkOutcome, ReplySender, TelegramError, Update,
    WebhookDispatcher,
};
use serde_json::json;

struct ScriptedModel {
    answer: String,
    calls: AtomicUsize,
}

impl ScriptedModel {
    fn new(answer: serde_json::Value) -> Arc<Self> {
        Arc::new(Self {
            answer: answer.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingSender {
    fn texts(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }
}

#[async_trait]
impl ReplySender for RecordingSender {
    async fn send_reply(&self, chat_id: i64, text: &str) {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
    }
}

/// Delegates reads to a memory store and fails every leave-request insert.
struct FailingWrites(MemoryStore);

#[async_trait]
impl LeaveRepository for FailingWrites {
    async fn find_profile(&self, id: &UserId) -> leave_persistence::Result<Option<UserProfile>> {
        self.0.find_profile(id).await
    }
    async fn find_profile_by_email(
        &self,
        email: &str,
    ) -> leave_persistence::Result<Option<UserProfile>> {
        self.0.find_profile_by_email(email).await
    }
    async fn find_account_link(&self, id: i64) -> leave_persistence::Result<Option<AccountLink>> {
        self.0.find_account_link(id).await
    }
    async fn insert_account_link(&self, link: &AccountLink) -> leave_persistence::Result<()> {
        self.0.insert_account_link(link).await
    }
    async fn save_account_link(
        &self,
        link: &AccountLink,
    ) -> leave_persistence::Result<AccountLink> {
        self.0.save_account_link(link).await
    }
    async fn create_leave_request(
        &self,
        _request: &LeaveRequest,
    ) -> leave_persistence::Result<LeaveRequest> {
        Err(PersistenceError::Backend {
            status: 503,
            message: "database unavailable".into(),
        })
    }
    async fn get_leave_request(
        &self,
        id: &LeaveRequestId,
    ) -> leave_persistence::Result<Option<LeaveRequest>> {
        self.0.get_leave_request(id).await
    }
    async fn update_leave_request(&self, request: &LeaveRequest) -> leave_persistence::Result<()> {
        self.0.update_leave_request(request).await
    }
    async fn delete_leave_request(&self, id: &LeaveRequestId) -> leave_persistence::Result<()> {
        self.0.delete_leave_request(id).await
    }
    async fn list_leave_requests(
        &self,
        user_id: &UserId,
    ) -> leave_persistence::Result<Vec<LeaveRequest>> {
        self.0.list_leave_requests(user_id).await
    }
    async fn list_all_leave_requests(&self) -> leave_persistence::Result<Vec<LeaveRequest>> {
        self.0.list_all_leave_requests().await
    }
}

struct Harness {
    dispatcher: WebhookDispatcher,
    model: Arc<ScriptedModel>,
    sender: Arc<RecordingSender>,
}

fn harness(repo: Arc<dyn LeaveRepository>, answer: serde_json::Value) -> Harness {
    harness_in(repo, answer, Locale::En)
}

fn harness_in(
    repo: Arc<dyn LeaveRepository>,
    answer: serde_json::Value,
    locale: Locale,
) -> Harness {
    let model = ScriptedModel::new(answer);
    let sender = Arc::new(RecordingSender::default());
    let config = PipelineConfig::default();
    let dispatcher = WebhookDispatcher::new(
        IntentParser::new(model.clone(), config),
        AccountLinker::new(repo.clone()),
        LeaveWriter::new(repo, config),
        sender.clone(),
        config,
    )
    .with_locale(locale);
    Harness {
        dispatcher,
        model,
        sender,
    }
}

fn seeded_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_profiles([
        UserProfile::new("U1", "user@x.com", Some("User One")),
        UserProfile::new("U2", "new@x.com", Some("New User")),
    ]))
}

async fn link(store: &MemoryStore, chat_id: i64, user: &str, email: &str) {
    let link = AccountLink::new(&ChatIdentity::new(chat_id), UserId::from(user), email, Some(chat_id));
    store.insert_account_link(&link).await.unwrap();
}

fn message(from: i64, text: &str) -> Update {
    serde_json::from_str(&json!({
        "update_id": 1,
        "message": {
            "message_id": 10,
            "from": {"id": from, "is_bot": false, "first_name": "Test"},
            "chat": {"id": from, "type": "private", "first_name": "Test"},
            "date": 1_700_000_000,
            "text": text
        }
    })
    .to_string())
    .unwrap()
}

fn sick_leave_answer() -> serde_json::Value {
    json!({
        "intent": "leave_request",
        "start_date": "2025-11-20",
        "end_date": "2025-11-20",
        "leave_type": "Sick",
        "confidence": 0.95
    })
}

#[tokio::test]
async fn message_without_text_is_acknowledged_without_work() {
    let store = seeded_store();
    let h = harness(store.clone(), sick_leave_answer());
    let update: Update = serde_json::from_str(&json!({
        "update_id": 2,
        "message": {
            "message_id": 1,
            "from": {"id": 111, "is_bot": false, "first_name": "Test"},
            "chat": {"id": 111, "type": "private", "first_name": "Test"},
            "date": 1_700_000_000,
            "location": {"latitude": 13.75, "longitude": 100.5}
        }
    })
    .to_string())
    .unwrap();

    let outcome = h.dispatcher.dispatch(&update).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::Ignored);
    assert_eq!(h.model.calls(), 0);
    assert!(h.sender.texts().is_empty());
    assert!(store.list_all_leave_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn linked_user_sick_leave_is_written() {
    let store = seeded_store();
    link(&store, 111, "U1", "user@x.com").await;
    let h = harness(store.clone(), sick_leave_answer());

    let outcome = h
        .dispatcher
        .dispatch(&message(111, "Sick leave on 20/11/2025"))
        .await
        .unwrap();

    let DispatchOutcome::Submitted(request) = outcome else {
        panic!("expected a submitted request, got {outcome:?}");
    };
    assert_eq!(request.user_id.as_str(), "U1");
    assert_eq!(request.leave_type, LeaveType::Sick);
    assert_eq!(request.days, 1);
    assert_eq!(
        request.selected_dates,
        vec![NaiveDate::from_ymd_opt(2025, 11, 20).unwrap()]
    );
    assert_eq!(request.status, LeaveStatus::Pending);

    let stored = store.list_leave_requests(&UserId::from("U1")).await.unwrap();
    assert_eq!(stored.len(), 1);

    let replies = h.sender.texts();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("Sick Leave"));
    assert!(replies[0].contains("2025-11-20"));
    assert!(replies[0].contains("User One"));
}

#[tokio::test]
async fn low_confidence_is_not_understood() {
    let store = seeded_store();
    link(&store, 111, "U1", "user@x.com").await;
    let mut answer = sick_leave_answer();
    answer["confidence"] = json!(0.5);
    let h = harness(store.clone(), answer);

    let outcome = h.dispatcher.dispatch(&message(111, "maybe leave?")).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::NotUnderstood);
    assert!(h.sender.texts()[0].contains("didn't understand"));
    assert!(store.list_all_leave_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_intent_is_not_understood() {
    let store = seeded_store();
    let h = harness(store.clone(), json!({"intent": "unknown", "confidence": 0.99}));

    let outcome = h.dispatcher.dispatch(&message(111, "hello")).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::NotUnderstood);
    assert!(store.list_all_leave_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn half_day_tomorrow_asks_for_a_date() {
    let store = seeded_store();
    link(&store, 111, "U1", "user@x.com").await;
    let h = harness(
        store.clone(),
        json!({
            "intent": "incomplete_request",
            "start_date": null,
            "end_date": null,
            "confidence": 0.4,
            "is_half_day": true,
            "half_day_period": null
        }),
    );

    let outcome = h
        .dispatcher
        .dispatch(&message(111, "Half day leave tomorrow"))
        .await
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::NeedsDate);
    assert!(h.sender.texts()[0].contains("exact date"));
    assert!(store.list_all_leave_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn half_day_without_period_is_never_written() {
    let store = seeded_store();
    link(&store, 111, "U1", "user@x.com").await;
    let mut answer = sick_leave_answer();
    answer["is_half_day"] = json!(true);
    let h = harness(store.clone(), answer);

    let outcome = h
        .dispatcher
        .dispatch(&message(111, "Half day sick leave 20/11/2025"))
        .await
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::NeedsDate);
    assert!(store.list_all_leave_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn unlinked_user_is_told_to_connect() {
    let store = seeded_store();
    let h = harness(store.clone(), sick_leave_answer());

    let outcome = h
        .dispatcher
        .dispatch(&message(999, "Sick leave on 20/11/2025"))
        .await
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::NotLinked);
    assert!(h.sender.texts()[0].contains("/connect"));
    assert!(store.list_all_leave_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn connect_links_new_chat() {
    let store = seeded_store();
    let h = harness(store.clone(), sick_leave_answer());

    let outcome = h
        .dispatcher
        .dispatch(&message(222, "/connect new@x.com"))
        .await
        .unwrap();

    assert!(matches!(outcome, DispatchOutcome::Link(LinkOutcome::Linked { .. })));
    assert_eq!(h.model.calls(), 0);
    let link = store.find_account_link(222).await.unwrap().unwrap();
    assert_eq!(link.user_id.as_str(), "U2");
    assert_eq!(link.email, "new@x.com");
    assert!(h.sender.texts()[0].contains("Linked"));
}

#[tokio::test]
async fn connect_twice_reports_already_linked() {
    let store = seeded_store();
    let h = harness(store.clone(), sick_leave_answer());

    h.dispatcher
        .dispatch(&message(222, "/connect new@x.com"))
        .await
        .unwrap();
    let second = h
        .dispatcher
        .dispatch(&message(222, "/connect new@x.com"))
        .await
        .unwrap();

    assert_eq!(
        second,
        DispatchOutcome::Link(LinkOutcome::AlreadyLinked {
            email: "new@x.com".into()
        })
    );
    let link = store.find_account_link(222).await.unwrap().unwrap();
    assert_eq!(link.user_id.as_str(), "U2");
    assert!(h.sender.texts()[1].contains("already linked"));
}

#[tokio::test]
async fn unknown_slash_command_goes_to_parser() {
    let store = seeded_store();
    let h = harness(store, json!({"intent": "unknown", "confidence": 0.0}));

    let outcome = h.dispatcher.dispatch(&message(1, "/vacation")).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::NotUnderstood);
    assert_eq!(h.model.calls(), 1);
}

#[tokio::test]
async fn failed_write_propagates_and_never_claims_success() {
    let inner = MemoryStore::with_profiles([UserProfile::new("U1", "user@x.com", None)]);
    link(&inner, 111, "U1", "user@x.com").await;
    let h = harness(Arc::new(FailingWrites(inner)), sick_leave_answer());

    let result = h
        .dispatcher
        .dispatch(&message(111, "Sick leave on 20/11/2025"))
        .await;

    assert!(matches!(result, Err(TelegramError::Persistence(_))));
    let replies = h.sender.texts();
    assert_eq!(replies.len(), 1);
    assert!(!replies[0].contains("submitted"));
}

#[tokio::test]
async fn capitalised_connect_is_still_a_command() {
    let store = seeded_store();
    let h = harness(store.clone(), sick_leave_answer());

    let outcome = h
        .dispatcher
        .dispatch(&message(333, "/Connect new@x.com"))
        .await
        .unwrap();

    assert!(matches!(outcome, DispatchOutcome::Link(LinkOutcome::Linked { .. })));
    assert_eq!(h.model.calls(), 0);
}

#[tokio::test]
async fn thai_locale_replies_in_thai() {
    let store = seeded_store();
    link(&store, 111, "U1", "user@x.com").await;
    let h = harness_in(store, sick_leave_answer(), Locale::Th);

    let outcome = h
        .dispatcher
        .dispatch(&message(111, "ลาป่วยวันที่ 20/11/2025"))
        .await
        .unwrap();

    assert!(matches!(outcome, DispatchOutcome::Submitted(_)));
    let replies = h.sender.texts();
    assert!(replies[0].contains("ส่งคำขอลาเรียบร้อยแล้ว"));
    assert!(replies[0].contains("รอการอนุมัติ"));
}
