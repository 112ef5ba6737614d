//! Application state shared across handlers.

use std::sync::Arc;

use leave_core::{IntentParser, PipelineConfig, TextModel};
use leave_models::Locale;
use leave_persistence::LeaveRepository;
use leave_telegram::{AccountLinker, LeaveWriter, ReplySender, WebhookDispatcher};

use crate::config::ApiConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    /// Store shared by the bot pipeline and the leave endpoints.
    pub repo: Arc<dyn LeaveRepository>,
    pub dispatcher: Arc<WebhookDispatcher>,
}

impl AppState {
    pub fn new(
        config: ApiConfig,
        repo: Arc<dyn LeaveRepository>,
        dispatcher: WebhookDispatcher,
    ) -> Self {
        Self {
            config: Arc::new(config),
            repo,
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Wires the webhook pipeline around `repo`, `model` and `sender`,
    /// replying in `locale`.
    pub fn assemble(
        config: ApiConfig,
        repo: Arc<dyn LeaveRepository>,
        model: Arc<dyn TextModel>,
        sender: Arc<dyn ReplySender>,
        pipeline: PipelineConfig,
        bot_username: Option<String>,
        locale: Locale,
    ) -> Self {
        let dispatcher = WebhookDispatcher::new(
            IntentParser::new(model, pipeline),
            AccountLinker::new(repo.clone()),
            LeaveWriter::new(repo.clone(), pipeline),
            sender,
            pipeline,
        )
        .with_bot_username(bot_username)
        .with_locale(locale);
        Self::new(config, repo, dispatcher)
    }

    pub fn linker(&self) -> &AccountLinker {
        self.dispatcher.linker()
    }
}
