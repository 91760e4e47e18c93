//! Console application loop
//! Maps typed commands onto controller operations

use crate::console::{self, ConsoleConfirmer, LineSource, Printer};
use anyhow::Result;
use app_core::{
    t, AppConfig, AppState, Command, CommandId, CompressOptions, Controller, ConvertOptions, I18n,
    Message, NavigateOptions, SessionStore, TaskRequest, COMMAND_TABLE,
};
use app_net::{Backend, HttpBackend};
use directories::UserDirs;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use tokio::sync::mpsc::unbounded_channel;
use tokio::task::spawn_local;

/// Where downloaded originals are saved
fn download_dir() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Console front end over one controller
struct ConsoleApp {
    controller: Controller,
    i18n: Arc<I18n>,
    lines: Rc<LineSource>,
}

impl ConsoleApp {
    async fn command_loop(&self) {
        loop {
            console::prompt("> ");
            let Some(line) = self.lines.next_line().await else {
                break;
            };

            match Command::parse(&line) {
                Ok(Some(cmd)) => {
                    if !self.execute_command(&cmd).await {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => self.controller.invalid_input(e.user_message()),
            }

            // Let the printer catch up before the next prompt
            tokio::task::yield_now().await;
        }
    }

    /// Listing row path for a numeric argument, else the argument as a path
    fn row_path(&self, arg: Option<&str>) -> Option<String> {
        let Some(arg) = arg else {
            self.controller.invalid_input("index or path is required".into());
            return None;
        };

        let Ok(index) = arg.parse::<usize>() else {
            return Some(arg.to_string());
        };

        let view = self.controller.listing_view();
        let row = view.rows.get(index).filter(|r| !r.is_parent_link);
        match row {
            Some(row) => Some(row.path.clone()),
            None => {
                self.controller
                    .invalid_input(t!(self.i18n, "help-unknown-index", index = index));
                None
            }
        }
    }

    fn print_help(&self) {
        println!("{}", self.i18n.get("help-header"));
        for (_, _, usage) in COMMAND_TABLE {
            println!("  {}", usage);
        }
    }

    fn change_language(&self, locale: Option<&str>) {
        let Some(locale) = locale else {
            println!("{}", self.i18n.available_locales().join(", "));
            return;
        };

        if !self.i18n.set_locale(locale) {
            println!(
                "{}",
                self.i18n.message(&Message::UnknownLanguage {
                    locale: locale.to_string()
                })
            );
            return;
        }

        let current = self.i18n.current_locale();
        let state = self.controller.state();
        state.config.write().general.language = current.clone();
        if let Err(e) = state.save_config() {
            tracing::warn!("Failed to save language setting: {}", e);
        }
        println!("{}", self.i18n.message(&Message::LanguageChanged { locale: current }));
    }

    async fn lookup_address(&self, lat: Option<&str>, lon: Option<&str>) {
        match (lat, lon) {
            (None, None) => self.controller.lookup_preview_address().await,
            (Some(lat), Some(lon)) => match (lat.parse::<f64>(), lon.parse::<f64>()) {
                (Ok(lat), Ok(lon)) => self.controller.lookup_address(lat, lon).await,
                _ => self
                    .controller
                    .invalid_input(format!("bad coordinates: {} {}", lat, lon)),
            },
            _ => self.controller.invalid_input("both latitude and longitude are required".into()),
        }
    }

    /// Execute a command; `false` ends the session
    async fn execute_command(&self, cmd: &Command) -> bool {
        let cmd_id = cmd.id.as_str();
        let params = &cmd.params;
        let state = self.controller.state();

        tracing::debug!("Executing command: {} {:?}", cmd_id, params.args);

        match cmd_id {
            // ========================================
            // Navigation Commands (nav.*)
            // ========================================
            CommandId::NAV_LIST => {
                println!("{}", console::render_listing(&self.i18n, &self.controller.listing_view()));
            }
            CommandId::NAV_CHANGE_DIR => match params.arg(0) {
                Some(_) => {
                    self.controller
                        .navigate(&params.rest(), NavigateOptions::direct())
                        .await;
                }
                None => self.controller.invalid_input("path is required".into()),
            },
            CommandId::NAV_BACK => {
                self.controller.back().await;
            }
            CommandId::NAV_FORWARD => {
                self.controller.forward().await;
            }
            CommandId::NAV_REFRESH => {
                self.controller.refresh().await;
            }
            CommandId::NAV_OPEN => match params.arg(0).map(str::parse::<usize>) {
                Some(Ok(index)) => self.controller.activate(index).await,
                _ => self.controller.invalid_input("row index is required".into()),
            },

            // ========================================
            // Selection Commands (sel.*)
            // ========================================
            CommandId::SEL_SELECT => {
                if let Some(path) = self.row_path(params.arg(0)) {
                    self.controller.toggle_selection(&path, true);
                }
            }
            CommandId::SEL_UNSELECT => {
                if let Some(path) = self.row_path(params.arg(0)) {
                    self.controller.remove_from_selection(&path);
                }
            }
            CommandId::SEL_SELECT_ALL => self.controller.select_all(),
            CommandId::SEL_DESELECT_ALL => self.controller.clear_selection(),
            CommandId::SEL_SHOW => {
                println!(
                    "{}",
                    console::render_selection(&self.i18n, &self.controller.selection_items())
                );
            }

            // ========================================
            // Batch Commands (batch.*)
            // ========================================
            CommandId::BATCH_COMPRESS => {
                let args: Vec<&str> = params.args.iter().map(String::as_str).collect();
                match CompressOptions::parse(&args, state.cpu_count()) {
                    Ok(options) => self.controller.compress(options).await,
                    Err(e) => self.controller.invalid_input(e.user_message()),
                }
            }
            CommandId::BATCH_CONVERT => {
                let mut args: Vec<&str> = params.args.iter().map(String::as_str).collect();
                if params.has_flag("keep-pdf") {
                    args.push("--keep-pdf");
                }
                match ConvertOptions::parse(&args, state.cpu_count(), &state.supported_formats()) {
                    Ok(options) => self.controller.convert(options).await,
                    Err(e) => self.controller.invalid_input(e.user_message()),
                }
            }
            CommandId::BATCH_STOP => self.controller.stop().await,
            CommandId::BATCH_CLOSE_PROGRESS => self.controller.close_progress().await,

            // ========================================
            // Task Commands (task.*)
            // ========================================
            CommandId::TASK_COUNT => self.controller.run_task(TaskRequest::CountFormats).await,
            CommandId::TASK_FIX_EXT => self.controller.run_task(TaskRequest::FixExtensions).await,
            CommandId::TASK_CLEAN_EMPTY => {
                self.controller.run_task(TaskRequest::CleanEmptyFolders).await
            }
            CommandId::TASK_SEARCH => {
                let pattern = params.rest();
                if pattern.is_empty() {
                    self.controller.invalid_input("search pattern is required".into());
                } else {
                    self.controller
                        .run_task(TaskRequest::Search {
                            pattern,
                            is_regex: params.has_flag("regex"),
                            case_sensitive: params.has_flag("case"),
                        })
                        .await;
                }
            }
            CommandId::TASK_DELETE_FORMAT => match params.arg(0) {
                Some(format) => {
                    self.controller
                        .run_task(TaskRequest::DeleteByFormat {
                            format: format.to_lowercase(),
                        })
                        .await
                }
                None => self.controller.invalid_input("format is required".into()),
            },

            // ========================================
            // File / Preview Commands
            // ========================================
            CommandId::FILE_DELETE => {
                if let Some(path) = self.row_path(params.arg(0)) {
                    self.controller.delete_file(&path).await;
                }
            }
            CommandId::PREVIEW_OPEN => {
                if let Some(path) = self.row_path(params.arg(0)) {
                    self.controller.open_preview(&path).await;
                }
            }
            CommandId::PREVIEW_HOVER => {
                if let Some(path) = self.row_path(params.arg(0)) {
                    self.controller.hover_enter(&path);
                }
            }
            CommandId::PREVIEW_LEAVE => self.controller.hover_leave(),
            CommandId::PREVIEW_CLOSE => self.controller.close_preview(),
            CommandId::PREVIEW_ADDRESS => self.lookup_address(params.arg(0), params.arg(1)).await,

            // ========================================
            // App Commands (app.*)
            // ========================================
            CommandId::APP_LANGUAGE => self.change_language(params.arg(0)),
            CommandId::APP_HELP => self.print_help(),
            CommandId::APP_QUIT => return false,

            _ => {
                tracing::warn!("Unhandled command: {}", cmd_id);
            }
        }

        true
    }
}

/// Run the console session until `quit` or end of input
pub async fn run(config: AppConfig) -> Result<()> {
    let i18n = Arc::new(I18n::with_builtin(&config.general.language)?);
    if let Some(dir) = AppConfig::locales_dir().filter(|d| d.is_dir()) {
        if let Err(e) = i18n.load_from_dir(&dir) {
            tracing::warn!("Failed to load locale overrides from {:?}: {}", dir, e);
        }
    }

    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(&config.server.base_url)?);
    let state = Arc::new(AppState::new(config, SessionStore::open_default()));

    let (events_tx, events_rx) = unbounded_channel();
    let lines = Rc::new(LineSource::spawn_stdin());
    let confirmer = Rc::new(ConsoleConfirmer::new(i18n.clone(), lines.clone()));
    let controller = Controller::new(state, backend.clone(), confirmer, events_tx);

    let printer = Printer::new(i18n.clone(), backend, download_dir());
    let printer_task = spawn_local(printer.run(events_rx));

    println!("{}", i18n.get("app-title"));
    controller.startup().await;
    tokio::task::yield_now().await;

    let app = ConsoleApp {
        controller,
        i18n: i18n.clone(),
        lines,
    };
    app.command_loop().await;

    printer_task.abort();
    println!("{}", i18n.get("app-goodbye"));
    tracing::info!("ImageDeck session ended");
    Ok(())
}
