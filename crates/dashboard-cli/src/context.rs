use crate::cli::Cli;
use crate::output;
use dashboard_assist::{GeminiClient, StoreAppsClient};
use dashboard_core::{AppConfig, Confirm, CountdownLocale, DashboardError, DashboardResult};
use dashboard_persistence::JsonDocumentStore;
use dashboard_sync::{BoardReconciler, CommitFailure, KeywordsView, NotesView};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const APP_SEARCH_API_KEY_ENV: &str = "APP_SEARCH_API_KEY";

/// Resolved settings for one CLI invocation: flags and env win over the
/// config file.
pub struct CliContext {
    pub config: AppConfig,
    pub data_dir: PathBuf,
    pub user_id: Option<String>,
}

impl CliContext {
    pub fn load(cli: &Cli) -> Self {
        let config = match &cli.config {
            Some(path) => AppConfig::load_from(path),
            None => AppConfig::load(),
        };
        let data_dir = cli
            .data_dir
            .clone()
            .unwrap_or_else(|| config.effective_data_dir());
        let user_id = cli
            .user
            .clone()
            .or_else(|| config.user_id.clone())
            .filter(|u| !u.trim().is_empty());

        tracing::debug!(
            "Using data dir {} for user {:?}",
            data_dir.display(),
            user_id
        );
        Self {
            config,
            data_dir,
            user_id,
        }
    }

    pub fn locale(&self) -> CountdownLocale {
        self.config.countdown_locale
    }

    fn store(&self) -> Arc<JsonDocumentStore> {
        Arc::new(JsonDocumentStore::new(&self.data_dir))
    }

    pub async fn board(&self) -> DashboardResult<BoardReconciler> {
        self.mount_board(self.store()).await
    }

    /// Board whose subscription also sees writes made by other processes.
    pub async fn watched_board(&self) -> DashboardResult<BoardReconciler> {
        let store = Arc::new(JsonDocumentStore::watching_external_changes(&self.data_dir));
        self.mount_board(store).await
    }

    async fn mount_board(&self, store: Arc<JsonDocumentStore>) -> DashboardResult<BoardReconciler> {
        let mut board = BoardReconciler::new(store);
        if !board.mount(self.user_id.as_deref()).await? {
            return Err(DashboardError::NotSignedIn);
        }
        Ok(board)
    }

    pub async fn notes(&self) -> DashboardResult<NotesView> {
        let mut notes = NotesView::new(self.store());
        if !notes.mount(self.user_id.as_deref()).await? {
            return Err(DashboardError::NotSignedIn);
        }
        Ok(notes)
    }

    pub async fn keywords(&self) -> DashboardResult<KeywordsView> {
        let mut keywords = KeywordsView::new(self.store());
        if !keywords.mount(self.user_id.as_deref()).await? {
            return Err(DashboardError::NotSignedIn);
        }
        Ok(keywords)
    }

    pub fn text_generator(&self) -> DashboardResult<GeminiClient> {
        let api_key = self
            .config
            .gemini_api_key
            .clone()
            .or_else(|| std::env::var(GEMINI_API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                DashboardError::Validation(format!(
                    "no Gemini API key: set gemini_api_key in the config or {}",
                    GEMINI_API_KEY_ENV
                ))
            })?;
        Ok(GeminiClient::new(api_key, self.config.effective_gemini_model()))
    }

    pub fn app_search(&self) -> DashboardResult<StoreAppsClient> {
        let api_key = self
            .config
            .app_search_api_key
            .clone()
            .or_else(|| std::env::var(APP_SEARCH_API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                DashboardError::Validation(format!(
                    "no app search API key: set app_search_api_key in the config or {}",
                    APP_SEARCH_API_KEY_ENV
                ))
            })?;
        Ok(StoreAppsClient::new(
            self.config.effective_app_search_url(),
            api_key,
        ))
    }
}

/// A one-shot command cannot leave a rejected write behind silently.
pub fn fail_on_commit_error(failure: Option<&CommitFailure>) {
    if let Some(failure) = failure {
        output::output_error(&format!(
            "Failed to save {}: {}",
            failure.key, failure.reason
        ));
    }
}

/// Asks on stderr and reads the answer from stdin.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "{} [y/N] ", prompt);
        let _ = stderr.flush();

        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}
