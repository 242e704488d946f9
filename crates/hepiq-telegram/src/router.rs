use std::{collections::HashMap, sync::Arc};

use teloxide::{
    dispatching::Dispatcher, dptree, error_handlers::LoggingErrorHandler, prelude::*,
    update_listeners::Polling,
};

use tokio::sync::{Mutex, OwnedMutexGuard};

use hepiq_core::{
    config::Config, desk::SupportDesk, messaging::port::MessagingPort, store::TicketStore,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub desk: Arc<SupportDesk>,
    pub messenger: Arc<dyn MessagingPort>,
    pub chat_locks: Arc<ChatLocks>,
}

/// Serializes update handling per chat; different chats run concurrently.
///
/// Entries nobody holds or waits on are pruned on the next `lock_chat`, so the
/// map tracks active chats only.
#[derive(Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub async fn lock_chat(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            map.entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.inner.lock().await.len()
    }
}

pub async fn run_polling(cfg: Arc<Config>, store: Arc<TicketStore>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    match bot.get_me().await {
        Ok(me) => tracing::info!("hepiq support bot started: @{}", me.username()),
        Err(e) => tracing::warn!("get_me failed: {e}"),
    }
    tracing::info!(database = %cfg.database_path.display(), "ticket store ready");
    for dept in cfg.department_admins.unconfigured() {
        tracing::warn!(
            department = dept.code(),
            "no administrator configured; tickets for this department are blocked"
        );
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let admins = Arc::new(cfg.department_admins.clone());
    let desk = Arc::new(SupportDesk::new(store, admins, messenger.clone()));

    let state = Arc::new(AppState {
        desk,
        messenger,
        chat_locks: Arc::new(ChatLocks::default()),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    // Updates queued while the bot was down are discarded.
    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("update listener error"),
        )
        .await;

    Ok(())
}
