pub mod config;
pub mod dashboard;
pub mod db;
pub mod errors;
pub mod models;
pub mod redaction;
pub mod stores;
pub mod trends;

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

pub use crate::dashboard::{DashboardController, DashboardState};
pub use crate::errors::{AppError, AppResult};

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

pub fn init_tracing(log_dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "dashboard.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}

pub fn to_client_error(error: impl std::fmt::Display) -> String {
    redaction::redact_str(&error.to_string())
}

#[cfg(feature = "desktop")]
mod desktop {
    use crate::config::{self, DashboardConfig};
    use crate::dashboard::{DashboardController, DashboardState};
    use crate::errors::{AppError, AppResult};
    use crate::models::{
        BooleanResponse, DashboardView, FormOptions, LogMetricPayload, NavigationEntry, SaveGoalPayload,
        SubmissionReceipt,
    };
    use crate::{init_tracing, to_client_error};
    use std::path::PathBuf;
    use std::sync::{Arc, RwLock};
    use tauri::Manager;

    #[derive(Clone)]
    struct AppState {
        dashboard: Arc<RwLock<DashboardState>>,
        app_data_dir: PathBuf,
    }

    impl AppState {
        fn with_controller<T>(&self, action: impl FnOnce(&DashboardController) -> AppResult<T>) -> AppResult<T> {
            let state = self
                .dashboard
                .read()
                .map_err(|_| AppError::Internal("dashboard state lock poisoned".to_string()))?;
            action(state.controller()?)
        }

        fn restart(&self) -> AppResult<BooleanResponse> {
            let next = DashboardState::start(DashboardConfig::load(&self.app_data_dir));
            let success = next.halted_message().is_none();
            let mut state = self
                .dashboard
                .write()
                .map_err(|_| AppError::Internal("dashboard state lock poisoned".to_string()))?;
            *state = next;
            Ok(BooleanResponse { success })
        }
    }

    #[tauri::command]
    fn dashboard_render(
        state: tauri::State<'_, AppState>,
        selected_metric: Option<String>,
    ) -> Result<DashboardView, String> {
        state
            .with_controller(|controller| controller.render_dashboard(selected_metric.as_deref()))
            .map_err(to_client_error)
    }

    #[tauri::command]
    fn goal_save(state: tauri::State<'_, AppState>, payload: SaveGoalPayload) -> Result<SubmissionReceipt, String> {
        state
            .with_controller(|controller| controller.save_goal(payload))
            .map_err(to_client_error)
    }

    #[tauri::command]
    fn metric_log(state: tauri::State<'_, AppState>, payload: LogMetricPayload) -> Result<SubmissionReceipt, String> {
        state
            .with_controller(|controller| controller.log_metric(payload))
            .map_err(to_client_error)
    }

    #[tauri::command]
    fn form_options_get(state: tauri::State<'_, AppState>) -> Result<FormOptions, String> {
        state
            .with_controller(DashboardController::form_options)
            .map_err(to_client_error)
    }

    #[tauri::command]
    fn navigation_list() -> Vec<NavigationEntry> {
        DashboardController::navigation()
    }

    #[tauri::command]
    fn store_uri_save(state: tauri::State<'_, AppState>, uri: String) -> Result<BooleanResponse, String> {
        config::save_store_uri(&uri).map_err(to_client_error)?;
        state.restart().map_err(to_client_error)
    }

    #[tauri::command]
    fn store_uri_clear(state: tauri::State<'_, AppState>) -> Result<BooleanResponse, String> {
        config::clear_store_uri().map_err(to_client_error)?;
        state.restart().map_err(to_client_error)
    }

    pub fn run() {
        tauri::Builder::default()
            .setup(|app| {
                let app_data_dir = app.path().app_data_dir().map_err(|error| error.to_string())?;
                std::fs::create_dir_all(&app_data_dir).map_err(|error| error.to_string())?;
                init_tracing(&app_data_dir.join("logs"))?;

                let dashboard = DashboardState::start(DashboardConfig::load(&app_data_dir));
                app.manage(AppState {
                    dashboard: Arc::new(RwLock::new(dashboard)),
                    app_data_dir,
                });
                Ok(())
            })
            .invoke_handler(tauri::generate_handler![
                dashboard_render,
                goal_save,
                metric_log,
                form_options_get,
                navigation_list,
                store_uri_save,
                store_uri_clear
            ])
            .run(tauri::generate_context!())
            .expect("failed to run tauri app");
    }
}

#[cfg(feature = "desktop")]
pub use desktop::run;
