use std::sync::Arc;

use hepiq_core::{
    callback::{AdminCommand, CallbackAction},
    config::DepartmentAdmins,
    desk::SupportDesk,
    intake::IntakeState,
    domain::{ChatId, Department, PendingKind, Stage, StudyType, TicketId, TicketStatus},
    messaging::{
        recording::{RecordingMessenger, Sent},
        types::{CallbackQuery, Command, IncomingUpdate, PhotoMessage, TextMessage},
    },
    store::TicketStore,
    texts,
};

const CS_ADMIN: ChatId = ChatId(155833648);
const STUDENT: ChatId = ChatId(4242);
const STRANGER: ChatId = ChatId(777);

struct Harness {
    store: Arc<TicketStore>,
    messenger: Arc<RecordingMessenger>,
    desk: SupportDesk,
}

fn harness() -> Harness {
    harness_with(TicketStore::open_in_memory().unwrap())
}

fn harness_with(store: TicketStore) -> Harness {
    let store = Arc::new(store);
    let messenger = Arc::new(RecordingMessenger::new());
    // Only computer science has an administrator.
    let admins = Arc::new(DepartmentAdmins::new([(
        Department::ComputerScience,
        CS_ADMIN,
    )]));
    let desk = SupportDesk::new(store.clone(), admins, messenger.clone());
    Harness {
        store,
        messenger,
        desk,
    }
}

impl Harness {
    async fn text(&self, chat: ChatId, text: &str) {
        self.desk
            .handle(IncomingUpdate::Text(TextMessage {
                chat_id: chat,
                text: text.to_string(),
            }))
            .await
            .unwrap();
    }

    async fn press(&self, chat: ChatId, action: CallbackAction) {
        self.press_raw(chat, &action.encode()).await;
    }

    async fn press_raw(&self, chat: ChatId, data: &str) {
        self.desk
            .handle(IncomingUpdate::Callback(CallbackQuery {
                chat_id: chat,
                callback_id: format!("cb-{}", chat.0),
                data: data.to_string(),
            }))
            .await
            .unwrap();
    }

    async fn photo(&self, chat: ChatId, file_id: &str) {
        self.desk
            .handle(IncomingUpdate::Photo(PhotoMessage {
                chat_id: chat,
                file_id: file_id.to_string(),
            }))
            .await
            .unwrap();
    }

    async fn command(&self, chat: ChatId, name: &str) {
        self.desk
            .handle(IncomingUpdate::Command(Command {
                chat_id: chat,
                name: name.to_string(),
            }))
            .await
            .unwrap();
    }

    fn last_text(&self, chat: ChatId) -> String {
        self.messenger
            .last_to(chat)
            .and_then(|s| s.text().map(str::to_string))
            .unwrap_or_default()
    }

    fn status(&self, id: TicketId) -> Option<TicketStatus> {
        self.store.get_ticket(id).unwrap().unwrap().status()
    }

    /// Student files the scenario A ticket; returns its id.
    async fn file_scenario_a_ticket(&self) -> TicketId {
        self.command(STUDENT, "start").await;
        self.press(STUDENT, CallbackAction::NewTicket).await;
        self.text(STUDENT, "Ahmed Ali Hassan").await;
        self.press(
            STUDENT,
            CallbackAction::Department(Department::ComputerScience),
        )
        .await;
        self.press(STUDENT, CallbackAction::Stage(Stage::new(2).unwrap()))
            .await;
        self.press(STUDENT, CallbackAction::StudyType(StudyType::Evening))
            .await;
        self.text(STUDENT, "لا يصل رمز التحقق OTP").await;
        self.press(STUDENT, CallbackAction::SkipPhoto).await;

        let confirmation = self.last_text(STUDENT);
        let id = confirmation
            .split('#')
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|n| n.parse::<i64>().ok())
            .expect("confirmation carries the ticket id");
        TicketId(id)
    }
}

#[tokio::test]
async fn scenario_a_ticket_filed_and_admin_notified() {
    let h = harness();
    let id = h.file_scenario_a_ticket().await;

    let ticket = h.store.get_ticket(id).unwrap().unwrap();
    assert_eq!(ticket.status(), Some(TicketStatus::New));
    assert_eq!(ticket.student_chat_id, STUDENT);
    assert_eq!(ticket.student_fullname, "Ahmed Ali Hassan");
    assert_eq!(ticket.department, Department::ComputerScience);
    assert_eq!(ticket.stage.get(), 2);
    assert_eq!(ticket.study_type, StudyType::Evening);
    assert_eq!(ticket.description, "لا يصل رمز التحقق OTP");
    assert_eq!(ticket.admin_chat_id, CS_ADMIN);

    let to_admin = h.messenger.sent_to(CS_ADMIN);
    assert_eq!(to_admin.len(), 1);
    let keyboard = to_admin[0].keyboard().expect("summary has action buttons");
    let payloads: Vec<&str> = keyboard
        .buttons()
        .map(|b| b.callback_data.as_str())
        .collect();
    assert_eq!(
        payloads,
        vec![
            CallbackAction::Admin(AdminCommand::Assign, id).encode(),
            CallbackAction::Admin(AdminCommand::AskMore, id).encode(),
            CallbackAction::Admin(AdminCommand::Resolve, id).encode(),
        ]
    );
    assert!(!h.desk.intake().is_active(STUDENT));
}

#[tokio::test]
async fn scenario_b_unconfigured_department_creates_nothing() {
    let h = harness();
    h.press(STUDENT, CallbackAction::NewTicket).await;
    h.text(STUDENT, "Ahmed Ali Hassan").await;
    h.press(
        STUDENT,
        CallbackAction::Department(Department::InformationSystems),
    )
    .await;

    assert_eq!(h.last_text(STUDENT), texts::DEPARTMENT_NOT_CONFIGURED);
    assert!(!h.desk.intake().is_active(STUDENT));
    assert!(h.store.get_ticket(TicketId(1)).unwrap().is_none());
    assert!(h.messenger.sent_to(CS_ADMIN).is_empty());
}

#[tokio::test]
async fn scenario_c_request_more_info() {
    let h = harness();
    let id = h.file_scenario_a_ticket().await;

    h.press(CS_ADMIN, CallbackAction::Admin(AdminCommand::AskMore, id))
        .await;
    assert_eq!(h.status(id), Some(TicketStatus::WaitingStudent));
    let pending = h.store.get_admin_pending(CS_ADMIN).unwrap().unwrap();
    assert_eq!(pending.kind, PendingKind::AskMore);
    assert_eq!(pending.ticket_id, id);

    h.text(CS_ADMIN, "أرسل رقم الهاتف").await;
    assert_eq!(
        h.last_text(STUDENT),
        texts::student_more_info(id, "أرسل رقم الهاتف")
    );
    assert_eq!(h.last_text(CS_ADMIN), texts::ADMIN_QUESTION_SENT);
    assert!(h.store.get_admin_pending(CS_ADMIN).unwrap().is_none());
    assert_eq!(h.status(id), Some(TicketStatus::WaitingStudent));
}

#[tokio::test]
async fn scenario_d_resolution() {
    let h = harness();
    let id = h.file_scenario_a_ticket().await;

    h.press(CS_ADMIN, CallbackAction::Admin(AdminCommand::Resolve, id))
        .await;
    h.text(CS_ADMIN, "تم تغيير كلمة المرور").await;

    assert_eq!(h.status(id), Some(TicketStatus::Resolved));
    let to_student = h.last_text(STUDENT);
    assert!(to_student.contains("تم تغيير كلمة المرور"));
    assert_eq!(to_student, texts::student_resolved(id, "تم تغيير كلمة المرور"));
}

#[tokio::test]
async fn scenario_e_non_admin_is_rejected() {
    let h = harness();
    let id = h.file_scenario_a_ticket().await;

    for cmd in [
        AdminCommand::Assign,
        AdminCommand::AskMore,
        AdminCommand::Resolve,
    ] {
        h.press(STRANGER, CallbackAction::Admin(cmd, id)).await;
        assert_eq!(h.last_text(STRANGER), texts::REJECT_NOT_ADMIN);
    }
    // Even a garbled admin payload gets the same answer for strangers.
    h.press_raw(STRANGER, "ADM::NUKE::1").await;
    assert_eq!(h.last_text(STRANGER), texts::REJECT_NOT_ADMIN);

    assert_eq!(h.status(id), Some(TicketStatus::New));
    assert!(h.store.get_admin_pending(STRANGER).unwrap().is_none());
}

#[tokio::test]
async fn admin_text_without_pending_is_dropped() {
    let h = harness();
    let id = h.file_scenario_a_ticket().await;
    h.messenger.clear();

    h.text(CS_ADMIN, "hello?").await;
    assert!(h.messenger.sent().is_empty());
    assert_eq!(h.status(id), Some(TicketStatus::New));
}

#[tokio::test]
async fn stale_or_malformed_admin_buttons() {
    let h = harness();
    h.press(
        CS_ADMIN,
        CallbackAction::Admin(AdminCommand::Assign, TicketId(99)),
    )
    .await;
    assert_eq!(h.last_text(CS_ADMIN), texts::REJECT_NOT_FOUND);

    h.press_raw(CS_ADMIN, "ADM::ASSIGN").await;
    assert_eq!(h.last_text(CS_ADMIN), texts::REJECT_MALFORMED);
}

#[tokio::test]
async fn last_admin_action_wins() {
    let h = harness();
    let first = h.file_scenario_a_ticket().await;
    let second = h.file_scenario_a_ticket().await;
    assert!(second > first);

    h.press(CS_ADMIN, CallbackAction::Admin(AdminCommand::AskMore, first))
        .await;
    h.press(CS_ADMIN, CallbackAction::Admin(AdminCommand::Resolve, second))
        .await;
    h.text(CS_ADMIN, "تم تغيير كلمة المرور").await;

    assert_eq!(h.status(second), Some(TicketStatus::Resolved));
    assert_eq!(h.status(first), Some(TicketStatus::WaitingStudent));
}

#[tokio::test]
async fn cancel_and_faq_discard_the_form() {
    let h = harness();
    h.press(STUDENT, CallbackAction::NewTicket).await;
    h.text(STUDENT, "Ahmed Ali Hassan").await;

    h.command(STUDENT, "cancel").await;
    assert!(!h.desk.intake().is_active(STUDENT));
    assert_eq!(h.last_text(STUDENT), texts::CANCELLED);

    h.press(STUDENT, CallbackAction::NewTicket).await;
    h.press(STUDENT, CallbackAction::Faq).await;
    assert!(!h.desk.intake().is_active(STUDENT));
    assert_eq!(h.last_text(STUDENT), texts::FAQ);

    // Buttons from the abandoned form now only bring the menu back.
    h.press(STUDENT, CallbackAction::SkipPhoto).await;
    assert_eq!(h.last_text(STUDENT), texts::STALE_CHOICE);
    assert!(h.store.get_ticket(TicketId(1)).unwrap().is_none());
}

#[tokio::test]
async fn photo_attached_ticket_forwards_image() {
    let h = harness();
    h.press(STUDENT, CallbackAction::NewTicket).await;
    h.text(STUDENT, "Ahmed Ali Hassan").await;
    h.press(
        STUDENT,
        CallbackAction::Department(Department::ComputerScience),
    )
    .await;
    h.press(STUDENT, CallbackAction::Stage(Stage::new(4).unwrap()))
        .await;
    h.press(STUDENT, CallbackAction::StudyType(StudyType::Morning))
        .await;
    h.text(STUDENT, "كلمة المرور مرفوضة دائماً").await;
    h.press(STUDENT, CallbackAction::AttachPhoto).await;
    h.photo(STUDENT, "AgACAgIAAxkBAAIC").await;

    let to_admin = h.messenger.sent_to(CS_ADMIN);
    assert_eq!(to_admin.len(), 2);
    assert_eq!(
        to_admin[1],
        Sent::Photo {
            chat_id: CS_ADMIN,
            file_id: "AgACAgIAAxkBAAIC".to_string()
        }
    );
}

#[tokio::test]
async fn myid_reports_chat_id() {
    let h = harness();
    h.command(STRANGER, "myid").await;
    assert_eq!(h.last_text(STRANGER), texts::my_id(STRANGER.0));
}

#[tokio::test]
async fn new_ticket_mid_form_starts_over() {
    let h = harness();
    h.press(STUDENT, CallbackAction::NewTicket).await;
    h.text(STUDENT, "Ahmed Ali Hassan").await;
    h.press(
        STUDENT,
        CallbackAction::Department(Department::ComputerScience),
    )
    .await;
    assert_eq!(h.desk.intake().state(STUDENT), Some(IntakeState::AwaitingStage));

    h.press(STUDENT, CallbackAction::NewTicket).await;
    assert_eq!(
        h.desk.intake().state(STUDENT),
        Some(IntakeState::AwaitingFullName)
    );
    assert_eq!(h.last_text(STUDENT), texts::ASK_FULLNAME);

    // The earlier department answer no longer counts.
    h.press(STUDENT, CallbackAction::Stage(Stage::new(2).unwrap()))
        .await;
    assert_eq!(
        h.desk.intake().state(STUDENT),
        Some(IntakeState::AwaitingFullName)
    );
}

#[tokio::test]
async fn ticket_unreadable_after_insert_is_filed_once() {
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let path = format!("/tmp/hepiq-scenario-{}-{ts}.db", std::process::id());
    let h = harness_with(TicketStore::open(&path).unwrap());
    let side = rusqlite::Connection::open(&path).unwrap();
    side.execute_batch(
        "CREATE TRIGGER corrupt_stage AFTER INSERT ON tickets
         BEGIN UPDATE tickets SET stage = 9 WHERE id = NEW.id; END;",
    )
    .unwrap();

    h.file_scenario_a_ticket().await;
    assert!(!h.desk.intake().is_active(STUDENT));
    assert_eq!(h.messenger.sent_to(CS_ADMIN).len(), 1);

    // A second press on the old skip button cannot file again.
    h.press(STUDENT, CallbackAction::SkipPhoto).await;
    assert_eq!(h.last_text(STUDENT), texts::STALE_CHOICE);
    let rows: i64 = side
        .query_row(
            "SELECT COUNT(*) FROM tickets WHERE student_chat_id = ?1",
            [STUDENT.0],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(rows, 1);
}
