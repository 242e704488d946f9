//! Ticket lifecycle: filing, admin actions, and completion of pending actions.
//!
//! Store writes happen before any notification is attempted. A failed send is
//! logged and never rolls back the write.

use std::sync::Arc;

use crate::{
    callback::AdminCommand,
    config::DepartmentAdmins,
    domain::{
        ChatId, Department, NewTicket, PendingKind, Stage, StudyType, TicketId,
        TicketStatus,
    },
    errors::Error,
    keyboards,
    messaging::{port::MessagingPort, types::InlineKeyboard},
    store::TicketStore,
    texts, Result,
};

/// A completed intake form, ready to be filed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicketSubmission {
    pub student_chat_id: ChatId,
    pub student_fullname: String,
    pub department: Department,
    pub stage: Stage,
    pub study_type: StudyType,
    pub description: String,
    pub photo_file_id: Option<String>,
}

/// Why an admin button press was refused. No state is touched in any case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    NotAdmin,
    Malformed,
    NotFound,
    OtherDepartment,
}

impl Rejection {
    pub fn message(self) -> &'static str {
        match self {
            Rejection::NotAdmin => texts::REJECT_NOT_ADMIN,
            Rejection::Malformed => texts::REJECT_MALFORMED,
            Rejection::NotFound => texts::REJECT_NOT_FOUND,
            Rejection::OtherDepartment => texts::REJECT_OTHER_DEPARTMENT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminActionOutcome {
    Assigned,
    AwaitingText(PendingKind),
    Rejected(Rejection),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingOutcome {
    /// No pending entry; the text was not consumed.
    NoPending,
    QuestionRelayed(TicketId),
    Resolved(TicketId),
}

pub struct TicketService {
    store: Arc<TicketStore>,
    admins: Arc<DepartmentAdmins>,
    messenger: Arc<dyn MessagingPort>,
}

impl TicketService {
    pub fn new(
        store: Arc<TicketStore>,
        admins: Arc<DepartmentAdmins>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            store,
            admins,
            messenger,
        }
    }

    /// Persist the ticket and hand it to the department administrator.
    ///
    /// Once the insert succeeds the ticket id is returned whatever happens to
    /// the notification. The summary is built from the submission so it never
    /// depends on reading the row back.
    pub async fn file_ticket(&self, sub: TicketSubmission) -> Result<TicketId> {
        let admin = self.admins.admin_for(sub.department).ok_or_else(|| {
            Error::Config(format!(
                "no administrator configured for {}",
                sub.department.code()
            ))
        })?;

        let ticket = NewTicket {
            student_chat_id: sub.student_chat_id,
            student_fullname: sub.student_fullname,
            department: sub.department,
            stage: sub.stage,
            study_type: sub.study_type,
            description: sub.description,
            photo_file_id: sub.photo_file_id,
            admin_chat_id: admin,
        };
        let id = self.store.create_ticket(&ticket)?;
        tracing::info!(
            ticket_id = id.0,
            student = ticket.student_chat_id.0,
            admin = admin.0,
            department = ticket.department.code(),
            "ticket created"
        );

        self.notify_admin_new_ticket(id, &ticket).await;
        Ok(id)
    }

    async fn notify_admin_new_ticket(&self, id: TicketId, ticket: &NewTicket) {
        let admin = ticket.admin_chat_id;
        let summary = texts::admin_summary(id, ticket);
        let delivered = self
            .send(admin, &summary, Some(keyboards::admin_ticket_actions(id)))
            .await;

        if !delivered {
            return;
        }
        if let Some(photo) = &ticket.photo_file_id {
            if let Err(e) = self.messenger.send_photo(admin, photo).await {
                tracing::warn!(ticket_id = id.0, admin = admin.0, "photo not delivered: {e}");
            }
        }
    }

    /// Handle an accept / ask-more / resolve button press from `admin`.
    pub async fn apply_admin_action(
        &self,
        admin: ChatId,
        command: AdminCommand,
        ticket_id: TicketId,
    ) -> Result<AdminActionOutcome> {
        if !self.admins.is_admin(admin) {
            return Ok(self.reject(admin, Rejection::NotAdmin, Some(ticket_id)).await);
        }

        let Some(ticket) = self.store.get_ticket(ticket_id)? else {
            return Ok(self.reject(admin, Rejection::NotFound, Some(ticket_id)).await);
        };
        if ticket.admin_chat_id != admin {
            return Ok(self
                .reject(admin, Rejection::OtherDepartment, Some(ticket_id))
                .await);
        }

        match command {
            AdminCommand::Assign => {
                self.store
                    .update_ticket_status(ticket_id, TicketStatus::Assigned.as_str())?;
                tracing::info!(ticket_id = ticket_id.0, admin = admin.0, "ticket assigned");
                self.send(admin, &texts::admin_assigned(ticket_id), None)
                    .await;
                self.send(ticket.student_chat_id, texts::STUDENT_ASSIGNED, None)
                    .await;
                Ok(AdminActionOutcome::Assigned)
            }
            AdminCommand::AskMore => {
                self.store
                    .set_admin_pending(admin, PendingKind::AskMore, ticket_id)?;
                self.store
                    .update_ticket_status(ticket_id, TicketStatus::WaitingStudent.as_str())?;
                tracing::info!(ticket_id = ticket_id.0, admin = admin.0, "awaiting question text");
                self.send(admin, &texts::admin_ask_prompt(ticket_id), None)
                    .await;
                Ok(AdminActionOutcome::AwaitingText(PendingKind::AskMore))
            }
            AdminCommand::Resolve => {
                self.store
                    .set_admin_pending(admin, PendingKind::SendSolution, ticket_id)?;
                tracing::info!(ticket_id = ticket_id.0, admin = admin.0, "awaiting solution text");
                self.send(admin, &texts::admin_resolve_prompt(ticket_id), None)
                    .await;
                Ok(AdminActionOutcome::AwaitingText(PendingKind::SendSolution))
            }
        }
    }

    /// Reply with the rejection text and log it. Performs no mutation.
    pub async fn reject(
        &self,
        admin: ChatId,
        why: Rejection,
        ticket_id: Option<TicketId>,
    ) -> AdminActionOutcome {
        tracing::warn!(
            chat_id = admin.0,
            ticket_id = ticket_id.map(|t| t.0),
            "admin action rejected: {why:?}"
        );
        self.send(admin, why.message(), None).await;
        AdminActionOutcome::Rejected(why)
    }

    /// Consume the admin's pending action with `text`, if there is one.
    pub async fn complete_pending_action(&self, admin: ChatId, text: &str) -> Result<PendingOutcome> {
        let Some(pending) = self.store.get_admin_pending(admin)? else {
            return Ok(PendingOutcome::NoPending);
        };
        let text = text.trim();
        let ticket_id = pending.ticket_id;
        match pending.kind {
            PendingKind::AskMore => {
                self.store.clear_admin_pending(admin)?;
                self.notify_student(ticket_id, &texts::student_more_info(ticket_id, text))
                    .await?;
                self.send(admin, texts::ADMIN_QUESTION_SENT, None).await;
                tracing::info!(ticket_id = ticket_id.0, admin = admin.0, "question relayed");
                Ok(PendingOutcome::QuestionRelayed(ticket_id))
            }
            PendingKind::SendSolution => {
                // The pending entry outlives a failed status write.
                self.store
                    .update_ticket_status(ticket_id, TicketStatus::Resolved.as_str())?;
                self.store.clear_admin_pending(admin)?;
                self.notify_student(ticket_id, &texts::student_resolved(ticket_id, text))
                    .await?;
                self.send(admin, texts::ADMIN_SOLUTION_SENT, None).await;
                tracing::info!(ticket_id = ticket_id.0, admin = admin.0, "ticket resolved");
                Ok(PendingOutcome::Resolved(ticket_id))
            }
        }
    }

    async fn notify_student(&self, ticket_id: TicketId, message: &str) -> Result<()> {
        match self.store.get_ticket(ticket_id)? {
            Some(ticket) => {
                self.send(ticket.student_chat_id, message, None).await;
            }
            None => tracing::warn!(ticket_id = ticket_id.0, "student not notified: ticket missing"),
        }
        Ok(())
    }

    /// Best-effort send; returns whether the message went out.
    async fn send(&self, chat_id: ChatId, text: &str, keyboard: Option<InlineKeyboard>) -> bool {
        let res = match keyboard {
            Some(kb) => self.messenger.send_inline_keyboard(chat_id, text, kb).await,
            None => self.messenger.send_text(chat_id, text).await,
        };
        match res {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(chat_id = chat_id.0, "notification failed: {e}");
                false
            }
        }
    }
}
