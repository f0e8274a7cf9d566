//! Application State
//!
//! Central application state management for khair.

use crate::api::reports::{self, DateRange, ReportKind};
use crate::api::{auth, ApiClient, ApiResult, AuthUser, FormError};
use crate::config::Config;
use crate::i18n::{delete_prompt, Failure, Locale};
use crate::resource::{
    get_all_resource_keys, get_resource, option_values, screen_for, AsyncStatus, Confirmation,
    FieldKind, Outcome, ResourceDef, ResourceScreen, ScreenEvent, Transition,
};
use anyhow::Result;
use chrono::{Datelike, Local};
use crossterm::event::KeyCode;
use serde_json::Value;
use std::collections::HashMap;
use std::ops::Range;
use std::path::PathBuf;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

// =========================================================================
// Configuration Constants
// =========================================================================

/// Default viewport height (will be updated during render based on terminal size)
const DEFAULT_VIEWPORT_HEIGHT: usize = 20;

/// Application modes
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Login,        // Credential form
    Normal,       // Viewing list / dashboard / reports
    Search,       // / live search input
    Filter,       // Filter bar
    Command,      // : command input
    Help,         // ? help popup
    Confirm,      // Confirmation dialog
    Warning,      // Warning/info dialog (OK only)
    Describe,     // Viewing JSON details of selected item
    Form,         // Create/edit modal
    StatusPicker, // Target status for a transition
}

/// What the main area shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Resource,
    Reports,
}

/// Action waiting for a yes/no answer
#[derive(Debug, Clone, PartialEq)]
pub enum PendingKind {
    Delete,
    Transition(Transition),
}

/// Pending action that requires confirmation
#[derive(Debug, Clone)]
pub struct PendingAction {
    pub kind: PendingKind,
    pub resource_key: String,
    pub record_id: String,
    pub message: String,
    pub destructive: bool,
    pub selected_yes: bool,
}

/// Login form
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus_password: bool,
    pub status: AsyncStatus,
}

/// Filter bar being edited; values are applied together on Enter
#[derive(Debug, Clone)]
pub struct FilterEditor {
    pub index: usize,
    pub values: Vec<String>,
}

/// Choice of target status for a transition
#[derive(Debug, Clone)]
pub struct StatusPicker {
    pub transition_key: String,
    pub record_id: String,
    pub options: Vec<String>,
    pub selected: usize,
}

/// Dashboard statistics
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub stats: Option<Value>,
    pub status: AsyncStatus,
}

/// Report aggregates and PDF export
#[derive(Debug, Clone)]
pub struct ReportsState {
    pub kind: ReportKind,
    pub range: DateRange,
    pub data: Option<Value>,
    pub status: AsyncStatus,
    pub scroll: usize,
    pub last_download: Option<PathBuf>,
}

/// A finished background call owned by the app rather than a screen
#[derive(Debug)]
pub enum AppEvent {
    Login(ApiResult<AuthUser>),
    Dashboard(ApiResult<Value>),
    Report {
        kind: ReportKind,
        range: DateRange,
        result: ApiResult<Value>,
    },
    Pdf {
        kind: ReportKind,
        result: Result<PathBuf, String>,
    },
}

/// Channels background tasks report on. Replaced whenever the session
/// changes, so tasks started for an earlier user can no longer deliver.
struct Channels {
    screen_tx: UnboundedSender<ScreenEvent>,
    screen_rx: UnboundedReceiver<ScreenEvent>,
    app_tx: UnboundedSender<AppEvent>,
    app_rx: UnboundedReceiver<AppEvent>,
}

impl Channels {
    fn new() -> Self {
        let (screen_tx, screen_rx) = mpsc::unbounded_channel();
        let (app_tx, app_rx) = mpsc::unbounded_channel();
        Self {
            screen_tx,
            screen_rx,
            app_tx,
            app_rx,
        }
    }
}

/// Main application state
pub struct App {
    // REST client (shares the session with every screen)
    pub api: ApiClient,
    pub user: Option<AuthUser>,

    // One screen per resource, keyed by registry key
    pub screens: HashMap<String, ResourceScreen>,
    pub current_resource_key: String,
    pub view: View,

    // Navigation state
    pub mode: Mode,
    pub locale: Locale,

    // Login
    pub login: LoginForm,

    // Search / filters
    pub search_text: String,
    pub filter_editor: Option<FilterEditor>,

    // Command input
    pub command_text: String,
    pub command_suggestions: Vec<String>,
    pub command_suggestion_selected: usize,
    pub command_preview: Option<String>,

    // Confirmation
    pub pending_action: Option<PendingAction>,
    pub status_picker: Option<StatusPicker>,

    // Form
    pub form_focus: usize,

    // UI state
    pub error_message: Option<String>,
    pub info_message: Option<String>,
    pub warning_message: Option<String>,
    pub describe_scroll: usize,

    // Dashboard and reports
    pub dashboard: DashboardState,
    pub reports: ReportsState,
    pub download_dir: PathBuf,

    // Persistent configuration
    pub config: Config,

    // Key press tracking
    pub last_key_press: Option<(KeyCode, std::time::Instant)>,

    // Read-only mode
    pub readonly: bool,

    // Virtual scrolling
    pub viewport_height: usize,
    pub scroll_offset: usize,

    // Background calls
    channels: Channels,
}

impl App {
    /// Create the app; `user` is set when a token was supplied up front
    pub fn new(
        api: ApiClient,
        config: Config,
        locale: Locale,
        readonly: bool,
        initial_resource: Option<String>,
        user: Option<AuthUser>,
    ) -> Self {
        let current_resource_key = initial_resource
            .or_else(|| config.last_resource.clone())
            .filter(|k| get_resource(k).is_some())
            .unwrap_or_else(|| "members".to_string());

        let today = Local::now().date_naive();
        let range = DateRange {
            start: config
                .report_start
                .clone()
                .unwrap_or_else(|| format!("{}-01-01", today.year())),
            end: config
                .report_end
                .clone()
                .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
        };

        let login = LoginForm {
            email: config.last_email.clone().unwrap_or_default(),
            focus_password: config.last_email.is_some(),
            ..Default::default()
        };

        let download_dir = dirs::download_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let mode = if user.is_some() { Mode::Normal } else { Mode::Login };

        Self {
            screens: build_screens(&api, locale),
            api,
            user,
            current_resource_key,
            view: View::Resource,
            mode,
            locale,
            login,
            search_text: String::new(),
            filter_editor: None,
            command_text: String::new(),
            command_suggestions: Vec::new(),
            command_suggestion_selected: 0,
            command_preview: None,
            pending_action: None,
            status_picker: None,
            form_focus: 0,
            error_message: None,
            info_message: None,
            warning_message: None,
            describe_scroll: 0,
            dashboard: DashboardState::default(),
            reports: ReportsState {
                kind: ReportKind::Members,
                range,
                data: None,
                status: AsyncStatus::default(),
                scroll: 0,
                last_download: None,
            },
            download_dir,
            config,
            last_key_press: None,
            readonly,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            scroll_offset: 0,
            channels: Channels::new(),
        }
    }

    // =========================================================================
    // Resource Definition Access
    // =========================================================================

    pub fn current_resource(&self) -> Option<&'static ResourceDef> {
        get_resource(&self.current_resource_key)
    }

    pub fn screen(&self) -> Option<&ResourceScreen> {
        self.screens.get(&self.current_resource_key)
    }

    pub fn screen_mut(&mut self) -> Option<&mut ResourceScreen> {
        self.screens.get_mut(&self.current_resource_key)
    }

    pub fn selected_item(&self) -> Option<&Value> {
        self.screen().and_then(|s| s.selected_record())
    }

    pub fn rows(&self) -> &[Value] {
        self.screen().map(|s| s.list.rows()).unwrap_or(&[])
    }

    pub fn get_available_commands(&self) -> Vec<String> {
        let mut commands: Vec<String> = get_all_resource_keys()
            .iter()
            .map(|s| s.to_string())
            .collect();

        // Add built-in commands
        commands.push("dashboard".to_string());
        commands.push("reports".to_string());
        commands.push("logout".to_string());
        commands.push("lang en".to_string());
        commands.push("lang ar".to_string());
        commands.push("range".to_string());

        commands.sort();
        commands
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Sign in with the login form's credentials on a background task
    pub fn submit_login(&mut self) {
        if self.login.status.loading {
            return;
        }
        self.login.status.start();

        let api = self.api.clone();
        let email = self.login.email.clone();
        let password = self.login.password.clone();
        let tx = self.channels.app_tx.clone();
        tokio::spawn(async move {
            let result = auth::login(&api, &email, &password).await;
            let _ = tx.send(AppEvent::Login(result));
        });
    }

    fn finish_login(&mut self, result: ApiResult<AuthUser>) {
        match result {
            Ok(user) => {
                self.login.password.clear();
                self.login.status.succeed();
                if let Err(e) = self.config.set_last_email(&user.email) {
                    tracing::warn!("Failed to save email to config: {}", e);
                }
                self.start_session(user);
            },
            Err(e) => {
                tracing::warn!("login failed: {}", e);
                self.login
                    .status
                    .fail(e.user_message(Failure::Login.message(self.locale)));
            },
        }
    }

    /// Fresh screens for the signed-in user
    fn start_session(&mut self, user: AuthUser) {
        self.user = Some(user);
        self.channels = Channels::new();
        self.screens = build_screens(&self.api, self.locale);
        self.dashboard = DashboardState::default();
        self.reports.data = None;
        self.reports.status = AsyncStatus::default();
        self.search_text.clear();
        self.scroll_offset = 0;
        self.mode = Mode::Normal;
    }

    pub async fn logout(&mut self) {
        auth::logout(&self.api).await;
        self.end_session(None);
    }

    fn end_session(&mut self, notice: Option<&str>) {
        self.user = None;
        self.channels = Channels::new();
        self.pending_action = None;
        self.status_picker = None;
        self.filter_editor = None;
        self.login.password.clear();
        self.login.status = AsyncStatus::default();
        if let Some(notice) = notice {
            self.login.status.error = Some(notice.to_string());
        }
        self.mode = Mode::Login;
    }

    /// Route to the login screen once the session has been cleared (e.g. a
    /// 401 on any call)
    pub async fn sync_session(&mut self) {
        if self.mode == Mode::Login || self.user.is_none() {
            return;
        }
        if !self.api.session.is_authenticated().await {
            tracing::info!("session ended, returning to login");
            self.end_session(Some("Session expired, please sign in again"));
        }
    }

    // =========================================================================
    // Data Fetching
    // =========================================================================

    /// Apply every background result that has arrived
    pub fn drain_responses(&mut self) {
        while let Ok(event) = self.channels.screen_rx.try_recv() {
            self.apply_screen_event(event);
        }
        while let Ok(event) = self.channels.app_rx.try_recv() {
            self.apply_app_event(event);
        }
        self.ensure_visible();
    }

    fn apply_screen_event(&mut self, event: ScreenEvent) {
        let key = event.resource().to_string();
        let Some(screen) = self.screens.get_mut(&key) else {
            tracing::warn!("response for unknown resource {}", key);
            return;
        };

        match event {
            ScreenEvent::List(response) => {
                screen.apply_list_response(response);
            },
            ScreenEvent::Saved { result, .. } => {
                let outcome = screen.finish_submit(result);
                if outcome == Outcome::Completed
                    && self.mode == Mode::Form
                    && self.current_resource_key == key
                {
                    self.info_message = Some("Saved".to_string());
                    self.mode = Mode::Normal;
                }
            },
            ScreenEvent::Action { failure, result, .. } => {
                screen.finish_action(result, failure);
            },
            ScreenEvent::Lookups { results, .. } => screen.apply_lookups(results),
            ScreenEvent::Detail { id, result, .. } => {
                screen.apply_detail(id, result);
            },
        }
    }

    fn apply_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Login(result) => self.finish_login(result),
            AppEvent::Dashboard(result) => match result {
                Ok(stats) => {
                    self.dashboard.stats = Some(stats);
                    self.dashboard.status.succeed();
                },
                Err(e) => {
                    tracing::warn!("dashboard failed: {}", e);
                    self.dashboard
                        .status
                        .fail(e.user_message(Failure::Load.message(self.locale)));
                },
            },
            AppEvent::Report { kind, range, result } => {
                if kind != self.reports.kind || range != self.reports.range {
                    tracing::debug!("dropping report {} for an earlier selection", kind.as_str());
                    return;
                }
                match result {
                    Ok(data) => {
                        self.reports.data = Some(data);
                        self.reports.status.succeed();
                    },
                    Err(e) => {
                        tracing::warn!("report {} failed: {}", kind.as_str(), e);
                        self.reports
                            .status
                            .fail(e.user_message(Failure::Report.message(self.locale)));
                    },
                }
            },
            AppEvent::Pdf { kind, result } => match result {
                Ok(path) => {
                    self.reports.status.succeed();
                    self.info_message = Some(format!("Saved {}", path.display()));
                    self.reports.last_download = Some(path);
                },
                Err(message) => {
                    tracing::warn!("pdf {} failed", kind.as_str());
                    self.reports.status.fail(message);
                },
            },
        }
    }

    /// Start the current screen's scheduled refresh, if any
    pub fn dispatch_refresh(&mut self) {
        if self.mode == Mode::Login || self.view != View::Resource {
            return;
        }
        let tx = self.channels.screen_tx.clone();
        if let Some(screen) = self.screen_mut() {
            screen.spawn_refresh(&tx);
        }
    }

    pub fn refresh_current(&mut self) {
        self.error_message = None;
        match self.view {
            View::Resource => {
                if let Some(screen) = self.screen_mut() {
                    screen.list.invalidate();
                }
            },
            View::Dashboard | View::Reports => {},
        }
    }

    pub fn load_dashboard(&mut self) {
        self.dashboard.status.start();
        let api = self.api.clone();
        let tx = self.channels.app_tx.clone();
        tokio::spawn(async move {
            let result = reports::fetch_dashboard(&api).await;
            let _ = tx.send(AppEvent::Dashboard(result));
        });
    }

    pub fn load_report(&mut self) {
        self.reports.scroll = 0;
        if !self.reports.kind.has_aggregate() {
            self.reports.data = None;
            self.reports.status = AsyncStatus::default();
            return;
        }

        self.reports.status.start();
        let api = self.api.clone();
        let kind = self.reports.kind;
        let range = self.reports.range.clone();
        let tx = self.channels.app_tx.clone();
        tokio::spawn(async move {
            let result = reports::fetch_report(&api, kind, &range).await;
            let _ = tx.send(AppEvent::Report { kind, range, result });
        });
    }

    /// Download the selected report as PDF into the download directory
    pub fn download_report(&mut self) {
        self.reports.status.start();
        let api = self.api.clone();
        let kind = self.reports.kind;
        let range = self.reports.range.clone();
        let dir = self.download_dir.clone();
        let fallback = Failure::Download.message(self.locale);
        let tx = self.channels.app_tx.clone();

        tokio::spawn(async move {
            let result = match reports::fetch_pdf(&api, kind, &range).await {
                Ok(bytes) => reports::save_pdf(&dir, kind, &bytes).await.map_err(|e| {
                    tracing::warn!("saving pdf failed: {:#}", e);
                    fallback.to_string()
                }),
                Err(e) => Err(e.user_message(fallback)),
            };
            let _ = tx.send(AppEvent::Pdf { kind, result });
        });
    }

    pub fn next_report_kind(&mut self) {
        self.reports.kind = self.reports.kind.next();
        self.load_report();
    }

    /// Change the report range (`YYYY-MM-DD YYYY-MM-DD`) and reload
    pub fn set_report_range(&mut self, start: &str, end: &str) {
        let valid = |d: &str| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").is_ok();
        if !valid(start) || !valid(end) || start > end {
            self.error_message = Some(format!("Invalid range: {} {}", start, end));
            return;
        }
        self.reports.range = DateRange {
            start: start.to_string(),
            end: end.to_string(),
        };
        if let Err(e) = self.config.set_report_range(start, end) {
            tracing::warn!("Failed to save report range to config: {}", e);
        }
        self.load_report();
    }

    // =========================================================================
    // Search and Filters
    // =========================================================================

    pub fn enter_search_mode(&mut self) {
        self.search_text = self
            .screen()
            .map(|s| s.list.query().search_term.clone())
            .unwrap_or_default();
        self.mode = Mode::Search;
    }

    /// Live search; every keystroke schedules a refresh
    pub fn update_search(&mut self) {
        let term = self.search_text.clone();
        if let Some(screen) = self.screen_mut() {
            if screen.list.set_search_term(&term) {
                screen.selected = 0;
            }
        }
        self.scroll_offset = 0;
    }

    pub fn enter_filter_mode(&mut self) {
        let Some(screen) = self.screen() else {
            return;
        };
        let def = screen.def();
        if def.filters.is_empty() {
            return;
        }

        let values = def
            .filters
            .iter()
            .map(|f| screen.list.query().filter(&f.key).to_string())
            .collect();

        self.ensure_lookups();
        self.filter_editor = Some(FilterEditor { index: 0, values });
        self.mode = Mode::Filter;
    }

    /// Values a select or reference filter can take; `""` means any
    pub fn filter_choices(&self, index: usize) -> Vec<String> {
        let Some(screen) = self.screen() else {
            return Vec::new();
        };
        let Some(filter) = screen.def().filters.get(index) else {
            return Vec::new();
        };

        let mut choices = vec![String::new()];
        if let Some(set) = &filter.options {
            choices.extend(option_values(set));
        } else if let Some(reference) = &filter.reference {
            choices.extend(screen.lookup_options(reference).iter().map(|(id, _)| id.clone()));
        } else {
            return Vec::new();
        }
        choices
    }

    /// Cycle the focused select/reference filter
    pub fn cycle_filter(&mut self, forward: bool) {
        let Some(index) = self.filter_editor.as_ref().map(|e| e.index) else {
            return;
        };
        let choices = self.filter_choices(index);
        if choices.is_empty() {
            return;
        }
        if let Some(editor) = self.filter_editor.as_mut() {
            let current = choices.iter().position(|c| *c == editor.values[index]).unwrap_or(0);
            let next = cycle_index(current, choices.len(), forward);
            editor.values[index] = choices[next].clone();
        }
    }

    /// Push every edited filter value into the list state
    pub fn apply_filters(&mut self) {
        let Some(editor) = self.filter_editor.take() else {
            return;
        };
        if let Some(screen) = self.screen_mut() {
            let keys: Vec<String> = screen.def().filters.iter().map(|f| f.key.clone()).collect();
            let mut changed = false;
            for (key, value) in keys.iter().zip(editor.values.iter()) {
                changed |= screen.list.set_filter(key, value.trim());
            }
            if changed {
                screen.selected = 0;
            }
        }
        self.scroll_offset = 0;
        self.mode = Mode::Normal;
    }

    pub fn clear_criteria(&mut self) {
        self.search_text.clear();
        if let Some(screen) = self.screen_mut() {
            if screen.list.clear_criteria() {
                screen.selected = 0;
            }
        }
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    pub fn next_page(&mut self) {
        if let Some(screen) = self.screen_mut() {
            if screen.list.next_page() {
                screen.selected = 0;
            }
        }
        self.scroll_offset = 0;
    }

    pub fn prev_page(&mut self) {
        if let Some(screen) = self.screen_mut() {
            if screen.list.prev_page() {
                screen.selected = 0;
            }
        }
        self.scroll_offset = 0;
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Detail view text: the fully fetched record once it has arrived
    pub fn selected_item_json(&self) -> Option<String> {
        self.screen()
            .and_then(|s| s.detail_record())
            .map(|item| serde_json::to_string_pretty(item).unwrap_or_default())
    }

    pub fn describe_line_count(&self) -> usize {
        self.selected_item_json()
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }

    pub fn describe_scroll_to_bottom(&mut self, visible_lines: usize) {
        let total = self.describe_line_count();
        self.describe_scroll = total.saturating_sub(visible_lines);
    }

    fn set_selected(&mut self, index: usize) {
        if let Some(screen) = self.screen_mut() {
            screen.selected = index;
        }
        self.ensure_visible();
    }

    fn selected(&self) -> usize {
        self.screen().map(|s| s.selected).unwrap_or(0)
    }

    pub fn next(&mut self) {
        match self.mode {
            Mode::StatusPicker => {
                if let Some(picker) = self.status_picker.as_mut() {
                    picker.selected = (picker.selected + 1).min(picker.options.len().saturating_sub(1));
                }
            },
            _ => {
                let len = self.rows().len();
                if len > 0 {
                    self.set_selected((self.selected() + 1).min(len - 1));
                }
            },
        }
    }

    pub fn previous(&mut self) {
        match self.mode {
            Mode::StatusPicker => {
                if let Some(picker) = self.status_picker.as_mut() {
                    picker.selected = picker.selected.saturating_sub(1);
                }
            },
            _ => {
                self.set_selected(self.selected().saturating_sub(1));
            },
        }
    }

    pub fn go_to_top(&mut self) {
        self.set_selected(0);
    }

    pub fn go_to_bottom(&mut self) {
        let len = self.rows().len();
        if len > 0 {
            self.set_selected(len - 1);
        }
    }

    // =========================================================================
    // Mode Transitions
    // =========================================================================

    pub fn enter_command_mode(&mut self) {
        self.mode = Mode::Command;
        self.command_text.clear();
        self.command_suggestions = self.get_available_commands();
        self.command_suggestion_selected = 0;
        self.command_preview = None;
    }

    pub fn update_command_suggestions(&mut self) {
        let input = self.command_text.to_lowercase();
        let all_commands = self.get_available_commands();

        if input.is_empty() {
            self.command_suggestions = all_commands;
        } else {
            self.command_suggestions = all_commands
                .into_iter()
                .filter(|cmd| cmd.contains(&input))
                .collect();
        }

        if self.command_suggestion_selected >= self.command_suggestions.len() {
            self.command_suggestion_selected = 0;
        }

        self.update_preview();
    }

    fn update_preview(&mut self) {
        self.command_preview = self
            .command_suggestions
            .get(self.command_suggestion_selected)
            .cloned();
    }

    pub fn next_suggestion(&mut self) {
        if !self.command_suggestions.is_empty() {
            self.command_suggestion_selected =
                (self.command_suggestion_selected + 1) % self.command_suggestions.len();
            self.update_preview();
        }
    }

    pub fn prev_suggestion(&mut self) {
        if !self.command_suggestions.is_empty() {
            self.command_suggestion_selected =
                cycle_index(self.command_suggestion_selected, self.command_suggestions.len(), false);
            self.update_preview();
        }
    }

    pub fn apply_suggestion(&mut self) {
        if let Some(preview) = &self.command_preview {
            self.command_text = preview.clone();
            self.update_command_suggestions();
        }
    }

    pub fn enter_help_mode(&mut self) {
        self.mode = Mode::Help;
    }

    pub fn enter_describe_mode(&mut self) {
        if self.selected_item().is_none() {
            return;
        }
        self.mode = Mode::Describe;
        self.describe_scroll = 0;
        let tx = self.channels.screen_tx.clone();
        if let Some(screen) = self.screen_mut() {
            screen.spawn_detail(&tx);
        }
    }

    pub fn enter_confirm_mode(&mut self, pending: PendingAction) {
        self.pending_action = Some(pending);
        self.mode = Mode::Confirm;
    }

    pub fn show_warning(&mut self, message: &str) {
        self.warning_message = Some(message.to_string());
        self.mode = Mode::Warning;
    }

    pub fn exit_mode(&mut self) {
        self.mode = Mode::Normal;
        self.pending_action = None;
        self.status_picker = None;
        self.filter_editor = None;
    }

    fn guard_readonly(&mut self) -> bool {
        if self.readonly {
            self.show_warning("Read-only mode: changes are disabled");
        }
        self.readonly
    }

    // =========================================================================
    // Form
    // =========================================================================

    /// Pickers show raw ids until their options arrive
    fn ensure_lookups(&mut self) {
        let tx = self.channels.screen_tx.clone();
        if let Some(screen) = self.screen_mut() {
            screen.spawn_lookups(&tx);
        }
    }

    pub fn open_create_form(&mut self) {
        if self.guard_readonly() {
            return;
        }
        self.ensure_lookups();
        if let Some(screen) = self.screen_mut() {
            screen.edit.open_create();
            self.form_focus = 0;
            self.mode = Mode::Form;
        }
    }

    pub fn open_edit_form(&mut self) {
        if self.guard_readonly() {
            return;
        }
        let Some(record) = self.selected_item().cloned() else {
            return;
        };
        self.ensure_lookups();
        if let Some(screen) = self.screen_mut() {
            if screen.edit.open_edit(&record) {
                self.form_focus = 0;
                self.mode = Mode::Form;
            }
        }
    }

    pub fn close_form(&mut self) {
        if let Some(screen) = self.screen_mut() {
            screen.edit.close();
        }
        self.mode = Mode::Normal;
    }

    fn focused_field(&self) -> Option<&'static crate::resource::FieldDef> {
        self.screen()?.def().fields.get(self.form_focus)
    }

    /// Focused field takes its value from a list rather than typing
    pub fn focused_is_choice(&self) -> bool {
        self.focused_field().is_some_and(|f| {
            matches!(f.kind, FieldKind::Select | FieldKind::Reference | FieldKind::Bool)
        })
    }

    pub fn form_next_field(&mut self) {
        let count = self.current_resource().map(|d| d.fields.len()).unwrap_or(0);
        if count > 0 {
            self.form_focus = cycle_index(self.form_focus, count, true);
        }
    }

    pub fn form_prev_field(&mut self) {
        let count = self.current_resource().map(|d| d.fields.len()).unwrap_or(0);
        if count > 0 {
            self.form_focus = cycle_index(self.form_focus, count, false);
        }
    }

    /// Type into the focused text-like field
    pub fn form_input(&mut self, c: Option<char>) {
        let Some(field) = self.focused_field() else {
            return;
        };
        if matches!(field.kind, FieldKind::Select | FieldKind::Reference | FieldKind::Bool) {
            return;
        }
        if let Some(screen) = self.screen_mut() {
            let mut text = screen.edit.field_text(&field.key);
            match c {
                Some(c) => text.push(c),
                None => {
                    text.pop();
                },
            }
            let _ = screen.edit.set_field(&field.key, Value::String(text));
        }
    }

    /// Cycle a select/reference field or toggle a bool field
    pub fn form_cycle(&mut self, forward: bool) {
        let Some(field) = self.focused_field() else {
            return;
        };
        let Some(screen) = self.screen_mut() else {
            return;
        };

        let choices: Vec<String> = match field.kind {
            FieldKind::Bool => {
                let current = matches!(screen.edit.field_value(&field.key), Some(Value::Bool(true)));
                let _ = screen.edit.set_field(&field.key, Value::Bool(!current));
                return;
            },
            FieldKind::Select => field.options.as_deref().map(option_values).unwrap_or_default(),
            FieldKind::Reference => field
                .reference
                .as_deref()
                .map(|r| screen.lookup_options(r).iter().map(|(id, _)| id.clone()).collect())
                .unwrap_or_default(),
            _ => return,
        };
        if choices.is_empty() {
            return;
        }

        let current = screen.edit.field_text(&field.key);
        let next = match choices.iter().position(|c| *c == current) {
            Some(idx) => cycle_index(idx, choices.len(), forward),
            None => 0,
        };
        let _ = screen.edit.set_field(&field.key, Value::String(choices[next].clone()));
    }

    /// Send the form; the answer is applied by `drain_responses`
    pub fn submit_form(&mut self) {
        let tx = self.channels.screen_tx.clone();
        let Some(screen) = self.screen_mut() else {
            return;
        };
        match screen.spawn_submit(&tx) {
            Ok(()) => {},
            Err(FormError::Required { field, .. }) => {
                if let Some(idx) = self
                    .current_resource()
                    .and_then(|d| d.fields.iter().position(|f| f.key == field))
                {
                    self.form_focus = idx;
                }
            },
            Err(e) => tracing::debug!("submit ignored: {}", e),
        }
    }

    // =========================================================================
    // Row Actions
    // =========================================================================

    pub fn request_delete(&mut self) {
        if self.guard_readonly() {
            return;
        }
        let Some(screen) = self.screen() else {
            return;
        };
        let Some(record) = screen.selected_record() else {
            return;
        };
        let Some(record_id) = screen.def().record_id(record) else {
            return;
        };

        let label = screen.def().record_label(record);
        let pending = PendingAction {
            kind: PendingKind::Delete,
            resource_key: screen.key().to_string(),
            record_id,
            message: delete_prompt(self.locale, &label),
            destructive: true,
            selected_yes: false,
        };
        self.enter_confirm_mode(pending);
    }

    /// Transition bound to a shortcut key on the selected row
    pub fn request_transition(&mut self, shortcut: &str) -> bool {
        let Some(screen) = self.screen() else {
            return false;
        };
        let def = screen.def();
        let Some(transition) = def.transition_by_shortcut(shortcut) else {
            return false;
        };
        if self.guard_readonly() {
            return true;
        }
        let Some(screen) = self.screen() else {
            return true;
        };
        let Some(record) = screen.selected_record() else {
            return true;
        };
        let Some(record_id) = def.record_id(record) else {
            return true;
        };
        if !transition.applies_to(record) {
            self.error_message = Some(format!("{} is not available for this record", transition.display_name));
            return true;
        }

        if let Some(set) = &transition.status_options {
            let options = option_values(set);
            let current = crate::resource::extract_json_value(record, "status");
            let selected = options.iter().position(|o| *o == current).unwrap_or(0);
            self.status_picker = Some(StatusPicker {
                transition_key: transition.key.clone(),
                record_id,
                options,
                selected,
            });
            self.mode = Mode::StatusPicker;
            return true;
        }

        let Some(action) = Transition::from_def(transition, None) else {
            return true;
        };
        let label = def.record_label(record);
        let pending = PendingAction {
            kind: PendingKind::Transition(action),
            resource_key: def.key.clone(),
            record_id,
            message: format!("{} '{}'?", transition.display_name, label),
            destructive: transition.key == "reject",
            selected_yes: true,
        };
        self.enter_confirm_mode(pending);
        true
    }

    /// Apply the status chosen in the picker
    pub fn confirm_status_picker(&mut self) {
        let Some(picker) = self.status_picker.take() else {
            return;
        };
        self.mode = Mode::Normal;

        let Some(def) = self.current_resource() else {
            return;
        };
        let Some(transition) = def.transitions.iter().find(|t| t.key == picker.transition_key) else {
            return;
        };
        let target = picker.options.get(picker.selected).map(String::as_str);
        let Some(action) = Transition::from_def(transition, target) else {
            return;
        };

        let tx = self.channels.screen_tx.clone();
        if let Some(screen) = self.screen_mut() {
            screen.spawn_transition(&picker.record_id, &action, &tx);
        }
    }

    /// Resolve the confirmation dialog
    pub fn resolve_pending(&mut self, confirmation: Confirmation) {
        let Some(pending) = self.pending_action.take() else {
            return;
        };
        self.mode = Mode::Normal;

        let tx = self.channels.screen_tx.clone();
        let Some(screen) = self.screens.get_mut(&pending.resource_key) else {
            return;
        };
        match pending.kind {
            PendingKind::Delete => {
                screen.spawn_remove(&pending.record_id, confirmation, &tx);
            },
            PendingKind::Transition(action) => {
                if confirmation == Confirmation::Confirmed {
                    screen.spawn_transition(&pending.record_id, &action, &tx);
                }
            },
        }
    }

    // =========================================================================
    // Command Execution
    // =========================================================================

    pub async fn execute_command(&mut self) -> Result<bool> {
        let command_text = if self.command_text.is_empty() {
            self.command_preview.clone().unwrap_or_default()
        } else if let Some(preview) = &self.command_preview {
            if preview.contains(&self.command_text) && !self.command_text.contains(' ') {
                preview.clone()
            } else {
                self.command_text.clone()
            }
        } else {
            self.command_text.clone()
        };

        let parts: Vec<&str> = command_text.split_whitespace().collect();

        let Some(&cmd) = parts.first() else {
            return Ok(false);
        };

        match cmd {
            "q" | "quit" => return Ok(true),
            "dashboard" => {
                self.show_dashboard();
            },
            "reports" => {
                self.show_reports();
            },
            "logout" => {
                self.logout().await;
            },
            "lang" => match parts.get(1).copied() {
                Some("en") => self.set_locale(Locale::En),
                Some("ar") => self.set_locale(Locale::Ar),
                _ => self.error_message = Some("Usage: lang en|ar".to_string()),
            },
            "range" => {
                if parts.len() == 3 {
                    self.view = View::Reports;
                    self.set_report_range(parts[1], parts[2]);
                } else {
                    self.error_message = Some("Usage: range YYYY-MM-DD YYYY-MM-DD".to_string());
                }
            },
            _ => {
                if get_resource(cmd).is_some() {
                    self.navigate_to_resource(cmd);
                } else {
                    self.error_message = Some(format!("Unknown command: {}", cmd));
                }
            },
        }

        Ok(false)
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
        for screen in self.screens.values_mut() {
            screen.set_locale(locale);
        }
        self.config.locale = Some(locale);
        if let Err(e) = self.config.save() {
            tracing::warn!("Failed to save locale to config: {}", e);
        }
    }

    // =========================================================================
    // View Navigation
    // =========================================================================

    pub fn navigate_to_resource(&mut self, resource_key: &str) {
        if get_resource(resource_key).is_none() {
            self.error_message = Some(format!("Unknown resource: {}", resource_key));
            return;
        }

        self.current_resource_key = resource_key.to_string();
        self.view = View::Resource;
        self.mode = Mode::Normal;
        self.scroll_offset = 0;
        self.search_text = self
            .screen()
            .map(|s| s.list.query().search_term.clone())
            .unwrap_or_default();

        if let Err(e) = self.config.set_last_resource(resource_key) {
            tracing::warn!("Failed to save resource to config: {}", e);
        }
    }

    /// Tab order: dashboard, resources in menu order, reports
    pub fn cycle_view(&mut self, forward: bool) {
        let mut stops: Vec<Option<&str>> = vec![None];
        stops.extend(get_all_resource_keys().into_iter().map(Some));
        stops.push(None);

        let current = match self.view {
            View::Dashboard => 0,
            View::Resource => stops
                .iter()
                .position(|s| *s == Some(self.current_resource_key.as_str()))
                .unwrap_or(1),
            View::Reports => stops.len() - 1,
        };
        let next = cycle_index(current, stops.len(), forward);

        match stops[next] {
            Some(key) => self.navigate_to_resource(key),
            None if next == 0 => self.show_dashboard(),
            None => self.show_reports(),
        }
    }

    pub fn show_dashboard(&mut self) {
        self.view = View::Dashboard;
        self.mode = Mode::Normal;
        self.load_dashboard();
    }

    pub fn show_reports(&mut self) {
        self.view = View::Reports;
        self.mode = Mode::Normal;
        if self.reports.data.is_none() && !self.reports.status.loading {
            self.load_report();
        }
    }

    /// Footer path, e.g. `khair > expenses > page 2/5`
    pub fn get_breadcrumb(&self) -> Vec<String> {
        let mut path = vec!["khair".to_string()];
        match self.view {
            View::Dashboard => path.push("dashboard".to_string()),
            View::Reports => {
                path.push("reports".to_string());
                path.push(self.reports.kind.as_str().to_string());
            },
            View::Resource => {
                path.push(self.current_resource_key.clone());
                if let Some(screen) = self.screen() {
                    let pages = screen.list.total_pages();
                    if pages > 0 {
                        path.push(format!("page {}/{}", screen.list.query().page, pages));
                    }
                }
            },
        }
        path
    }

    // =========================================================================
    // Virtual Scrolling
    // =========================================================================

    /// Update the viewport height (called from UI during render)
    pub fn update_viewport(&mut self, height: usize) {
        self.viewport_height = height.max(1);
    }

    /// Ensure the selected item is visible in the viewport
    pub fn ensure_visible(&mut self) {
        let len = self.rows().len();
        self.scroll_offset = visible_offset(self.selected(), self.scroll_offset, self.viewport_height, len);
    }

    /// Get the range of visible items
    pub fn visible_range(&self) -> Range<usize> {
        let len = self.rows().len();
        let start = self.scroll_offset.min(len);
        let end = (start + self.viewport_height).min(len);
        start..end
    }
}

fn build_screens(api: &ApiClient, locale: Locale) -> HashMap<String, ResourceScreen> {
    get_all_resource_keys()
        .into_iter()
        .filter_map(|key| screen_for(api.clone(), key, locale).map(|s| (key.to_string(), s)))
        .collect()
}

fn cycle_index(current: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (current + 1) % len
    } else if current == 0 {
        len - 1
    } else {
        current - 1
    }
}

/// Scroll offset keeping `selected` inside the viewport with a small margin
fn visible_offset(selected: usize, offset: usize, height: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }

    let margin = 2; // Keep cursor at least this far from edge
    let mut offset = offset;

    if selected < offset + margin {
        offset = selected.saturating_sub(margin);
    }
    if selected >= offset + height.saturating_sub(margin) {
        offset = selected.saturating_sub(height.saturating_sub(margin + 1));
    }

    offset.min(len.saturating_sub(height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Session;
    use crate::resource::{ListResponse, ListResult};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{bearer_token, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app() -> App {
        let api = ApiClient::new("http://127.0.0.1:9/api", Session::new()).unwrap();
        App::new(api, Config::default(), Locale::En, false, Some("expenses".into()), Some(AuthUser::from_token("t")))
    }

    fn load_rows(app: &mut App, rows: Vec<Value>) {
        let screen = app.screen_mut().unwrap();
        let ticket = screen.list.take_scheduled().unwrap();
        let total = rows.len() as u64;
        screen.list.apply(
            ticket.seq,
            Ok(ListResult { rows, total_count: total, total_pages: 1 }),
            "err",
        );
    }

    #[test]
    fn test_cycle_index_wraps() {
        assert_eq!(cycle_index(0, 3, false), 2);
        assert_eq!(cycle_index(2, 3, true), 0);
        assert_eq!(cycle_index(0, 0, true), 0);
    }

    #[test]
    fn test_visible_offset_keeps_selection_in_view() {
        assert_eq!(visible_offset(0, 5, 10, 100), 0);
        let offset = visible_offset(50, 30, 10, 100);
        assert!(50 >= offset && 50 < offset + 10);
        assert_eq!(visible_offset(24, 0, 10, 25), 15);
        assert_eq!(visible_offset(3, 0, 10, 0), 0);
    }

    #[test]
    fn test_starts_on_requested_resource() {
        let app = app();
        assert_eq!(app.current_resource_key, "expenses");
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.screens.len(), 6);
    }

    #[test]
    fn test_unknown_resource_falls_back_to_members() {
        let api = ApiClient::new("http://127.0.0.1:9/api", Session::new()).unwrap();
        let app = App::new(api, Config::default(), Locale::En, false, Some("nope".into()), None);
        assert_eq!(app.current_resource_key, "members");
        assert_eq!(app.mode, Mode::Login);
    }

    #[test]
    fn test_live_search_resets_page() {
        let mut app = app();
        app.search_text = "fuel".to_string();
        app.update_search();
        let query = app.screen().unwrap().list.query().clone();
        assert_eq!(query.search_term, "fuel");
        assert_eq!(query.page, 1);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut app = app();
        load_rows(&mut app, vec![json!({"_id": "e1", "purpose": "Hall rent", "approvalStatus": "pending"})]);
        app.request_delete();
        assert_eq!(app.mode, Mode::Confirm);
        let pending = app.pending_action.as_ref().unwrap();
        assert_eq!(pending.kind, PendingKind::Delete);
        assert!(!pending.selected_yes);
        assert!(pending.message.contains("Hall rent"));
    }

    #[test]
    fn test_readonly_blocks_changes() {
        let mut app = app();
        app.readonly = true;
        load_rows(&mut app, vec![json!({"_id": "e1", "approvalStatus": "pending"})]);
        app.request_delete();
        assert_eq!(app.mode, Mode::Warning);
        assert!(app.pending_action.is_none());
    }

    #[test]
    fn test_approve_only_for_pending_rows() {
        let mut app = app();
        load_rows(&mut app, vec![json!({"_id": "e1", "approvalStatus": "approved"})]);
        assert!(app.request_transition("a"));
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.error_message.is_some());
        assert!(!app.request_transition("z"));
    }

    #[test]
    fn test_status_picker_starts_at_current_status() {
        let mut app = app();
        app.navigate_to_resource("vehicles");
        load_rows(&mut app, vec![json!({"_id": "v1", "status": "maintenance"})]);
        assert!(app.request_transition("s"));
        assert_eq!(app.mode, Mode::StatusPicker);
        let picker = app.status_picker.as_ref().unwrap();
        assert_eq!(picker.options[picker.selected], "maintenance");
    }

    #[test]
    fn test_filter_editor_cycles_and_applies() {
        let mut app = app();
        load_rows(&mut app, vec![]);
        app.filter_editor = Some(FilterEditor { index: 0, values: vec![String::new()] });
        app.cycle_filter(true);
        let chosen = app.filter_editor.as_ref().unwrap().values[0].clone();
        assert!(!chosen.is_empty());
        app.apply_filters();
        let screen = app.screen().unwrap();
        assert_eq!(screen.list.query().filter("category"), chosen);
        assert!(screen.list.is_scheduled());
    }

    fn list_event(resource: &str, seq: u64, id: &str) -> ScreenEvent {
        ScreenEvent::List(ListResponse {
            resource: resource.to_string(),
            seq,
            result: Ok(ListResult { rows: vec![json!({"_id": id})], total_count: 1, total_pages: 1 }),
        })
    }

    #[test]
    fn test_responses_from_previous_session_are_dropped() {
        let mut app = app();
        let old_tx = app.channels.screen_tx.clone();
        let old = app.screens.get_mut("members").unwrap().list.take_scheduled().unwrap();

        app.end_session(None);
        app.start_session(AuthUser::from_token("t2"));
        let new = app.screens.get_mut("members").unwrap().list.take_scheduled().unwrap();
        assert_eq!(old.seq, new.seq);

        app.channels.screen_tx.send(list_event("members", new.seq, "new-user-row")).unwrap();
        assert!(old_tx.send(list_event("members", old.seq, "old-session-row")).is_err());
        app.drain_responses();

        let rows = app.screens["members"].list.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["_id"], "new-user-row");
    }

    #[test]
    fn test_failed_save_keeps_form_open() {
        let mut app = app();
        let screen = app.screen_mut().unwrap();
        screen.list.take_scheduled();
        screen.edit.open_create();
        app.mode = Mode::Form;

        app.channels
            .screen_tx
            .send(ScreenEvent::Saved {
                resource: "expenses".into(),
                result: Err(crate::api::ApiError::Validation("Amount must be positive".into())),
            })
            .unwrap();
        app.drain_responses();

        assert_eq!(app.mode, Mode::Form);
        let screen = app.screen().unwrap();
        assert!(screen.edit.is_open());
        assert_eq!(screen.edit.status.error.as_deref(), Some("Amount must be positive"));
        assert!(!screen.list.is_scheduled());
    }

    #[test]
    fn test_stale_report_is_ignored() {
        let mut app = app();
        app.reports.kind = ReportKind::Members;
        let range = app.reports.range.clone();
        app.channels
            .app_tx
            .send(AppEvent::Report { kind: ReportKind::Financial, range, result: Ok(json!({"total": 1})) })
            .unwrap();
        app.drain_responses();
        assert!(app.reports.data.is_none());
    }

    async fn served_app(server: &MockServer, resource: &str, signed_in: bool) -> App {
        let session = Session::new();
        let user = AuthUser::from_token("test-token");
        if signed_in {
            session.login(user.clone()).await;
        }
        let api = ApiClient::new(&format!("{}/api", server.uri()), session).unwrap();
        App::new(api, Config::default(), Locale::En, false, Some(resource.into()), signed_in.then_some(user))
    }

    /// Drain background results until `done` holds
    async fn settle(app: &mut App, done: impl Fn(&App) -> bool) {
        for _ in 0..500 {
            app.drain_responses();
            if done(app) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("background call did not finish");
    }

    #[tokio::test]
    async fn test_login_answer_arrives_later() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"token": "fresh", "name": "Admin", "email": "a@x.org"}))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut app = served_app(&server, "members", false).await;
        app.login.email = "a@x.org".into();
        app.login.password = "secret".into();
        app.submit_login();
        app.submit_login();
        assert!(app.login.status.loading);
        assert_eq!(app.mode, Mode::Login);

        settle(&mut app, |a| a.mode == Mode::Normal).await;
        assert_eq!(app.user.as_ref().map(|u| u.name.as_str()), Some("Admin"));
        assert!(app.login.password.is_empty());
        assert!(app.api.session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_slow_save_completes_in_background() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/expenses"))
            .and(bearer_token("test-token"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"data": {"_id": "e9"}}))
                    .set_delay(Duration::from_millis(300)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut app = served_app(&server, "expenses", true).await;
        app.screen_mut().unwrap().list.take_scheduled();
        app.open_create_form();
        assert_eq!(app.mode, Mode::Form);
        let screen = app.screen_mut().unwrap();
        screen.edit.set_field("category", json!("rent")).unwrap();
        screen.edit.set_field("amount", json!("250")).unwrap();
        screen.edit.set_field("spentBy", json!("Treasurer")).unwrap();
        screen.edit.set_field("purpose", json!("Hall rent")).unwrap();

        app.submit_form();
        app.submit_form();
        assert!(app.screen().unwrap().edit.status.loading);
        assert_eq!(app.mode, Mode::Form);

        settle(&mut app, |a| a.mode == Mode::Normal).await;
        assert_eq!(app.info_message.as_deref(), Some("Saved"));
        assert!(!app.screen().unwrap().edit.is_open());
        assert!(app.screen().unwrap().list.is_scheduled());
    }

    #[tokio::test]
    async fn test_describe_shows_fetched_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/members"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"_id": "m1", "fullName": {"first": "Sara", "last": "Ali"}}],
                "pagination": {"total": 1, "pages": 1}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/members/m1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"_id": "m1", "fullName": {"first": "Sara", "last": "Ali"}, "notes": "founding member"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut app = served_app(&server, "members", true).await;
        app.dispatch_refresh();
        settle(&mut app, |a| !a.rows().is_empty()).await;

        app.enter_describe_mode();
        assert_eq!(app.mode, Mode::Describe);
        settle(&mut app, |a| {
            a.selected_item_json().is_some_and(|j| j.contains("founding member"))
        })
        .await;
        assert!(!app.screen().unwrap().detail_status.loading);
    }

    #[test]
    fn test_breadcrumb_shows_page() {
        let mut app = app();
        load_rows(&mut app, vec![json!({"_id": "e1"})]);
        assert_eq!(app.get_breadcrumb(), vec!["khair", "expenses", "page 1/1"]);
    }
}
