//! Student intake form.
//!
//! One in-memory session per student chat, living from "new ticket" until the
//! ticket is filed, the form is cancelled, or the process restarts. States are
//! strictly linear; a state only advances on valid input for that state.

use std::{collections::HashMap, sync::Arc, sync::Mutex};

use crate::{
    callback::CallbackAction,
    config::DepartmentAdmins,
    domain::{ChatId, Department, Stage, StudyType, TicketId},
    keyboards,
    messaging::{port::MessagingPort, types::InlineKeyboard},
    texts,
    tickets::{TicketService, TicketSubmission},
    Result,
};

pub const MIN_NAME_WORDS: usize = 3;
pub const MIN_DESCRIPTION_CHARS: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntakeState {
    AwaitingFullName,
    AwaitingDepartment,
    AwaitingStage,
    AwaitingStudyType,
    AwaitingDescription,
    AwaitingPhotoChoice,
    AwaitingPhoto,
}

/// One inbound event, as seen by the form.
#[derive(Clone, Copy, Debug)]
pub enum IntakeInput<'a> {
    Text(&'a str),
    Photo(&'a str),
    Choice(CallbackAction),
}

/// What a single step did with the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced(IntakeState),
    Reprompted(IntakeState),
    /// Department has no administrator; the form ended without a ticket.
    Blocked(Department),
    Filed(TicketId),
}

#[derive(Clone, Debug, Default)]
struct FormDraft {
    full_name: Option<String>,
    department: Option<Department>,
    stage: Option<Stage>,
    study_type: Option<StudyType>,
    description: Option<String>,
}

impl FormDraft {
    fn into_submission(
        self,
        student: ChatId,
        photo_file_id: Option<String>,
    ) -> Option<TicketSubmission> {
        Some(TicketSubmission {
            student_chat_id: student,
            student_fullname: self.full_name?,
            department: self.department?,
            stage: self.stage?,
            study_type: self.study_type?,
            description: self.description?,
            photo_file_id,
        })
    }
}

#[derive(Clone, Debug)]
struct IntakeSession {
    state: IntakeState,
    draft: FormDraft,
}

pub fn is_valid_full_name(s: &str) -> bool {
    s.split_whitespace().count() >= MIN_NAME_WORDS
}

pub fn is_valid_description(s: &str) -> bool {
    s.trim().chars().count() >= MIN_DESCRIPTION_CHARS
}

pub struct IntakeFlow {
    sessions: Mutex<HashMap<ChatId, IntakeSession>>,
    admins: Arc<DepartmentAdmins>,
    tickets: Arc<TicketService>,
    messenger: Arc<dyn MessagingPort>,
}

impl IntakeFlow {
    pub fn new(
        admins: Arc<DepartmentAdmins>,
        tickets: Arc<TicketService>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            admins,
            tickets,
            messenger,
        }
    }

    pub fn state(&self, chat: ChatId) -> Option<IntakeState> {
        self.sessions
            .lock()
            .ok()
            .and_then(|m| m.get(&chat).map(|s| s.state))
    }

    pub fn is_active(&self, chat: ChatId) -> bool {
        self.state(chat).is_some()
    }

    /// Begin (or restart) the form for `chat`.
    pub async fn start(&self, chat: ChatId) -> Result<()> {
        self.put(
            chat,
            IntakeSession {
                state: IntakeState::AwaitingFullName,
                draft: FormDraft::default(),
            },
        );
        tracing::debug!(chat_id = chat.0, "intake started");
        self.reply(chat, texts::ASK_FULLNAME, None).await;
        Ok(())
    }

    /// Drop any in-progress form. Returns whether one existed.
    pub fn abandon(&self, chat: ChatId) -> bool {
        self.take(chat).is_some()
    }

    /// Feed one event into the active session. No-op without a session.
    pub async fn handle(&self, chat: ChatId, input: IntakeInput<'_>) -> Result<Option<StepOutcome>> {
        let Some(mut session) = self.take(chat) else {
            return Ok(None);
        };

        let outcome = match (session.state, input) {
            (IntakeState::AwaitingFullName, IntakeInput::Text(text)) if is_valid_full_name(text) => {
                session.draft.full_name = Some(text.trim().to_string());
                self.advance(chat, session, IntakeState::AwaitingDepartment)
                    .await
            }
            (IntakeState::AwaitingDepartment, IntakeInput::Choice(CallbackAction::Department(dept))) => {
                if self.admins.admin_for(dept).is_none() {
                    tracing::warn!(
                        chat_id = chat.0,
                        department = dept.code(),
                        "intake blocked: department has no administrator"
                    );
                    self.reply(chat, texts::DEPARTMENT_NOT_CONFIGURED, None)
                        .await;
                    return Ok(Some(StepOutcome::Blocked(dept)));
                }
                session.draft.department = Some(dept);
                self.advance(chat, session, IntakeState::AwaitingStage).await
            }
            (IntakeState::AwaitingStage, IntakeInput::Choice(CallbackAction::Stage(stage))) => {
                session.draft.stage = Some(stage);
                self.advance(chat, session, IntakeState::AwaitingStudyType)
                    .await
            }
            (IntakeState::AwaitingStudyType, IntakeInput::Choice(CallbackAction::StudyType(st))) => {
                session.draft.study_type = Some(st);
                self.advance(chat, session, IntakeState::AwaitingDescription)
                    .await
            }
            (IntakeState::AwaitingDescription, IntakeInput::Text(text)) if is_valid_description(text) => {
                session.draft.description = Some(text.trim().to_string());
                self.advance(chat, session, IntakeState::AwaitingPhotoChoice)
                    .await
            }
            (
                IntakeState::AwaitingPhotoChoice | IntakeState::AwaitingPhoto,
                IntakeInput::Choice(CallbackAction::AttachPhoto),
            ) => {
                self.advance(chat, session, IntakeState::AwaitingPhoto)
                    .await
            }
            (
                IntakeState::AwaitingPhotoChoice | IntakeState::AwaitingPhoto,
                IntakeInput::Choice(CallbackAction::SkipPhoto),
            ) => return self.file(chat, session, None).await.map(Some),
            (
                IntakeState::AwaitingPhotoChoice | IntakeState::AwaitingPhoto,
                IntakeInput::Photo(file_id),
            ) => {
                return self
                    .file(chat, session, Some(file_id.to_string()))
                    .await
                    .map(Some)
            }
            (IntakeState::AwaitingPhoto, _) => {
                // Anything but an image: offer the skip-or-attach choice again.
                self.reply(chat, texts::INVALID_PHOTO, None).await;
                session.state = IntakeState::AwaitingPhotoChoice;
                self.reply(
                    chat,
                    texts::ASK_PHOTO_CHOICE,
                    Some(keyboards::photo_choice()),
                )
                .await;
                self.put(chat, session);
                StepOutcome::Reprompted(IntakeState::AwaitingPhotoChoice)
            }
            (state, _) => {
                let (text, keyboard) = reprompt(state);
                self.reply(chat, text, keyboard).await;
                self.put(chat, session);
                StepOutcome::Reprompted(state)
            }
        };

        Ok(Some(outcome))
    }

    async fn advance(&self, chat: ChatId, mut session: IntakeSession, next: IntakeState) -> StepOutcome {
        session.state = next;
        self.put(chat, session);
        let (text, keyboard) = prompt(next);
        self.reply(chat, text, keyboard).await;
        StepOutcome::Advanced(next)
    }

    async fn file(
        &self,
        chat: ChatId,
        session: IntakeSession,
        photo_file_id: Option<String>,
    ) -> Result<StepOutcome> {
        let Some(sub) = session.draft.clone().into_submission(chat, photo_file_id) else {
            // Unreachable through the linear flow; start over rather than file a partial ticket.
            tracing::error!(chat_id = chat.0, "intake draft incomplete at filing time");
            self.start(chat).await?;
            return Ok(StepOutcome::Reprompted(IntakeState::AwaitingFullName));
        };

        match self.tickets.file_ticket(sub).await {
            Ok(id) => {
                self.reply(chat, &texts::ticket_filed(id), Some(keyboards::main_menu()))
                    .await;
                Ok(StepOutcome::Filed(id))
            }
            Err(e) => {
                // Keep the answers so the student can retry from the photo choice.
                self.put(
                    chat,
                    IntakeSession {
                        state: IntakeState::AwaitingPhotoChoice,
                        ..session
                    },
                );
                Err(e)
            }
        }
    }

    fn take(&self, chat: ChatId) -> Option<IntakeSession> {
        self.sessions.lock().ok()?.remove(&chat)
    }

    fn put(&self, chat: ChatId, session: IntakeSession) {
        if let Ok(mut m) = self.sessions.lock() {
            m.insert(chat, session);
        }
    }

    async fn reply(&self, chat: ChatId, text: &str, keyboard: Option<InlineKeyboard>) {
        let res = match keyboard {
            Some(kb) => self.messenger.send_inline_keyboard(chat, text, kb).await,
            None => self.messenger.send_text(chat, text).await,
        };
        if let Err(e) = res {
            tracing::warn!(chat_id = chat.0, "intake reply failed: {e}");
        }
    }
}

fn prompt(state: IntakeState) -> (&'static str, Option<InlineKeyboard>) {
    match state {
        IntakeState::AwaitingFullName => (texts::ASK_FULLNAME, None),
        IntakeState::AwaitingDepartment => (texts::ASK_DEPARTMENT, Some(keyboards::departments())),
        IntakeState::AwaitingStage => (texts::ASK_STAGE, Some(keyboards::stages())),
        IntakeState::AwaitingStudyType => (texts::ASK_STUDY_TYPE, Some(keyboards::study_types())),
        IntakeState::AwaitingDescription => (texts::ASK_DESCRIPTION, None),
        IntakeState::AwaitingPhotoChoice => {
            (texts::ASK_PHOTO_CHOICE, Some(keyboards::photo_choice()))
        }
        IntakeState::AwaitingPhoto => (texts::ASK_PHOTO, None),
    }
}

fn reprompt(state: IntakeState) -> (&'static str, Option<InlineKeyboard>) {
    match state {
        IntakeState::AwaitingFullName => (texts::INVALID_FULLNAME, None),
        IntakeState::AwaitingDepartment => {
            (texts::INVALID_DEPARTMENT, Some(keyboards::departments()))
        }
        IntakeState::AwaitingStage => (texts::INVALID_STAGE, Some(keyboards::stages())),
        IntakeState::AwaitingStudyType => {
            (texts::INVALID_STUDY_TYPE, Some(keyboards::study_types()))
        }
        IntakeState::AwaitingDescription => (texts::INVALID_DESCRIPTION, None),
        IntakeState::AwaitingPhotoChoice => {
            (texts::INVALID_PHOTO_CHOICE, Some(keyboards::photo_choice()))
        }
        IntakeState::AwaitingPhoto => (texts::INVALID_PHOTO, None),
    }
}
