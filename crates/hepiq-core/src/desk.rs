//! Update router.
//!
//! Dispatches each inbound event by (event kind, who sent it, whether a form
//! is in progress) to the intake form or the ticket lifecycle.

use std::sync::Arc;

use crate::{
    callback::{CallbackAction, ADMIN_PREFIX},
    config::DepartmentAdmins,
    domain::ChatId,
    intake::{IntakeFlow, IntakeInput},
    keyboards,
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, Command, IncomingUpdate, PhotoMessage, TextMessage},
    },
    store::TicketStore,
    texts,
    tickets::{PendingOutcome, Rejection, TicketService},
    Result,
};

pub struct SupportDesk {
    admins: Arc<DepartmentAdmins>,
    tickets: Arc<TicketService>,
    intake: IntakeFlow,
    messenger: Arc<dyn MessagingPort>,
}

impl SupportDesk {
    pub fn new(
        store: Arc<TicketStore>,
        admins: Arc<DepartmentAdmins>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        let tickets = Arc::new(TicketService::new(
            store,
            admins.clone(),
            messenger.clone(),
        ));
        let intake = IntakeFlow::new(admins.clone(), tickets.clone(), messenger.clone());
        Self {
            admins,
            tickets,
            intake,
            messenger,
        }
    }

    pub fn intake(&self) -> &IntakeFlow {
        &self.intake
    }

    pub async fn handle(&self, update: IncomingUpdate) -> Result<()> {
        match update {
            IncomingUpdate::Command(c) => self.on_command(c).await,
            IncomingUpdate::Callback(q) => self.on_callback(q).await,
            IncomingUpdate::Text(t) => self.on_text(t).await,
            IncomingUpdate::Photo(p) => self.on_photo(p).await,
        }
    }

    async fn on_command(&self, cmd: Command) -> Result<()> {
        let chat = cmd.chat_id;
        match cmd.name.as_str() {
            "start" | "help" => {
                self.send_menu(chat, texts::WELCOME).await;
            }
            "myid" => {
                self.send(chat, &texts::my_id(chat.0)).await;
            }
            "cancel" => {
                if self.intake.abandon(chat) {
                    tracing::info!(chat_id = chat.0, "intake cancelled");
                }
                self.send_menu(chat, texts::CANCELLED).await;
            }
            other => {
                tracing::debug!(chat_id = chat.0, command = other, "unknown command ignored");
            }
        }
        Ok(())
    }

    async fn on_callback(&self, q: CallbackQuery) -> Result<()> {
        if let Err(e) = self
            .messenger
            .answer_callback_query(&q.callback_id, None)
            .await
        {
            tracing::debug!(chat_id = q.chat_id.0, "answer_callback_query failed: {e}");
        }

        let chat = q.chat_id;
        let Some(action) = CallbackAction::parse(&q.data) else {
            if q.data.starts_with(ADMIN_PREFIX) {
                let why = if self.admins.is_admin(chat) {
                    Rejection::Malformed
                } else {
                    Rejection::NotAdmin
                };
                self.tickets.reject(chat, why, None).await;
            } else {
                tracing::debug!(chat_id = chat.0, data = %q.data, "unknown callback ignored");
            }
            return Ok(());
        };

        match action {
            CallbackAction::NewTicket => self.intake.start(chat).await,
            CallbackAction::Faq => {
                self.intake.abandon(chat);
                self.send_menu(chat, texts::FAQ).await;
                Ok(())
            }
            CallbackAction::Admin(command, ticket_id) => {
                self.tickets
                    .apply_admin_action(chat, command, ticket_id)
                    .await?;
                Ok(())
            }
            choice => {
                if self.intake.is_active(chat) {
                    self.intake
                        .handle(chat, IntakeInput::Choice(choice))
                        .await?;
                } else {
                    self.send_menu(chat, texts::STALE_CHOICE).await;
                }
                Ok(())
            }
        }
    }

    async fn on_text(&self, msg: TextMessage) -> Result<()> {
        let chat = msg.chat_id;
        if self.intake.is_active(chat) {
            self.intake.handle(chat, IntakeInput::Text(&msg.text)).await?;
            return Ok(());
        }

        if self.admins.is_admin(chat) {
            let outcome = self.tickets.complete_pending_action(chat, &msg.text).await?;
            if outcome == PendingOutcome::NoPending {
                tracing::debug!(chat_id = chat.0, "admin text without pending action dropped");
            }
            return Ok(());
        }

        tracing::debug!(chat_id = chat.0, "text outside of a form ignored");
        Ok(())
    }

    async fn on_photo(&self, msg: PhotoMessage) -> Result<()> {
        let chat = msg.chat_id;
        if self.intake.is_active(chat) {
            self.intake
                .handle(chat, IntakeInput::Photo(&msg.file_id))
                .await?;
        } else {
            tracing::debug!(chat_id = chat.0, "photo outside of a form ignored");
        }
        Ok(())
    }

    async fn send_menu(&self, chat: ChatId, text: &str) {
        if let Err(e) = self
            .messenger
            .send_inline_keyboard(chat, text, keyboards::main_menu())
            .await
        {
            tracing::warn!(chat_id = chat.0, "menu not delivered: {e}");
        }
    }

    async fn send(&self, chat: ChatId, text: &str) {
        if let Err(e) = self.messenger.send_text(chat, text).await {
            tracing::warn!(chat_id = chat.0, "reply not delivered: {e}");
        }
    }
}
