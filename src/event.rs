//! Event Handling
//!
//! Keyboard and event handling for khair.

use crate::app::{App, Mode, View};
use crate::resource::Confirmation;
use anyhow::Result;
use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use std::time::Duration;

/// Handle events, returns true if app should quit
pub async fn handle_events(app: &mut App) -> Result<bool> {
    if poll(Duration::from_millis(100))? {
        if let Event::Key(key) = read()? {
            return handle_key_event(app, key.code, key.modifiers).await;
        }
    }
    Ok(false)
}

pub async fn handle_key_event(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Result<bool> {
    // Global quit shortcut
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(true);
    }

    match app.mode {
        Mode::Login => handle_login_mode(app, code, modifiers),
        Mode::Normal => handle_normal_mode(app, code, modifiers).await,
        Mode::Search => handle_search_mode(app, code, modifiers),
        Mode::Filter => handle_filter_mode(app, code, modifiers),
        Mode::Command => handle_command_mode(app, code, modifiers).await,
        Mode::Help => handle_help_mode(app, code),
        Mode::Confirm => handle_confirm_mode(app, code),
        Mode::Warning => handle_warning_mode(app, code),
        Mode::Describe => handle_describe_mode(app, code, modifiers),
        Mode::Form => handle_form_mode(app, code, modifiers),
        Mode::StatusPicker => handle_status_picker_mode(app, code),
    }
}

fn handle_login_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Result<bool> {
    match code {
        KeyCode::Esc => return Ok(true),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
            app.login.focus_password = !app.login.focus_password;
        },
        KeyCode::Enter => {
            if !app.login.focus_password && app.login.password.is_empty() {
                app.login.focus_password = true;
            } else {
                app.submit_login();
            }
        },
        KeyCode::Backspace => {
            if app.login.focus_password {
                app.login.password.pop();
            } else {
                app.login.email.pop();
            }
        },
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            if app.login.focus_password {
                app.login.password.push(c);
            } else {
                app.login.email.push(c);
            }
        },
        _ => {},
    }
    Ok(false)
}

async fn handle_normal_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Result<bool> {
    // Check for double-g (go to top)
    if code == KeyCode::Char('g') {
        if let Some((KeyCode::Char('g'), time)) = app.last_key_press {
            if time.elapsed() < Duration::from_millis(1000) {
                app.go_to_top();
                app.last_key_press = None;
                return Ok(false);
            }
        }
        app.last_key_press = Some((code, std::time::Instant::now()));
        return Ok(false);
    }

    // Clear last key press for non-g keys
    app.last_key_press = None;
    app.info_message = None;

    // Keys shared by every view
    match code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Char(':') => {
            app.enter_command_mode();
            return Ok(false);
        },
        KeyCode::Char('?') => {
            app.enter_help_mode();
            return Ok(false);
        },
        KeyCode::Tab => {
            app.cycle_view(true);
            return Ok(false);
        },
        KeyCode::BackTab => {
            app.cycle_view(false);
            return Ok(false);
        },
        _ => {},
    }

    match app.view {
        View::Resource => handle_resource_keys(app, code, modifiers),
        View::Dashboard => {
            if code == KeyCode::Char('R') {
                app.load_dashboard();
            }
            Ok(false)
        },
        View::Reports => handle_reports_keys(app, code),
    }
}

fn handle_resource_keys(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Result<bool> {
    match code {
        // Navigation - vim style + accessible alternatives
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.previous(),
        KeyCode::Home => app.go_to_top(),
        KeyCode::End | KeyCode::Char('G') => app.go_to_bottom(),

        // Pagination
        KeyCode::Char(']') | KeyCode::PageDown => app.next_page(),
        KeyCode::Char('[') | KeyCode::PageUp => app.prev_page(),
        KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => app.next_page(),
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => app.prev_page(),

        // Refresh
        KeyCode::Char('R') => app.refresh_current(),

        // Describe
        KeyCode::Enter | KeyCode::Char('d') => app.enter_describe_mode(),

        // Search / filter
        KeyCode::Char('/') => app.enter_search_mode(),
        KeyCode::Char('f') => app.enter_filter_mode(),
        KeyCode::Char('c') => app.clear_criteria(),

        // Create / edit / delete
        KeyCode::Char('n') => app.open_create_form(),
        KeyCode::Char('e') => app.open_edit_form(),
        KeyCode::Delete | KeyCode::Char('D') => app.request_delete(),

        // Transition shortcuts from the registry
        KeyCode::Char(c) => {
            app.request_transition(&c.to_string());
        },

        _ => {},
    }
    Ok(false)
}

fn handle_reports_keys(app: &mut App, code: KeyCode) -> Result<bool> {
    match code {
        KeyCode::Char('t') => app.next_report_kind(),
        KeyCode::Char('R') => app.load_report(),
        KeyCode::Char('p') => app.download_report(),
        KeyCode::Char('j') | KeyCode::Down => {
            app.reports.scroll = app.reports.scroll.saturating_add(1);
        },
        KeyCode::Char('k') | KeyCode::Up => {
            app.reports.scroll = app.reports.scroll.saturating_sub(1);
        },
        KeyCode::PageDown => {
            app.reports.scroll = app.reports.scroll.saturating_add(10);
        },
        KeyCode::PageUp => {
            app.reports.scroll = app.reports.scroll.saturating_sub(10);
        },
        _ => {},
    }
    Ok(false)
}

fn handle_search_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Result<bool> {
    match code {
        KeyCode::Esc => {
            app.search_text.clear();
            app.update_search();
            app.exit_mode();
        },
        KeyCode::Enter => {
            app.exit_mode();
        },
        KeyCode::Backspace => {
            app.search_text.pop();
            app.update_search();
        },
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            app.search_text.push(c);
            app.update_search();
        },
        _ => {},
    }
    Ok(false)
}

fn handle_filter_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Result<bool> {
    let Some(index) = app.filter_editor.as_ref().map(|e| e.index) else {
        app.exit_mode();
        return Ok(false);
    };
    let count = app.filter_editor.as_ref().map(|e| e.values.len()).unwrap_or(0);
    let is_choice = !app.filter_choices(index).is_empty();

    match code {
        KeyCode::Esc => {
            app.exit_mode();
        },
        KeyCode::Enter => {
            app.apply_filters();
        },
        KeyCode::Tab | KeyCode::Down => {
            if let Some(editor) = app.filter_editor.as_mut() {
                editor.index = (index + 1) % count.max(1);
            }
        },
        KeyCode::BackTab | KeyCode::Up => {
            if let Some(editor) = app.filter_editor.as_mut() {
                editor.index = if index == 0 { count.saturating_sub(1) } else { index - 1 };
            }
        },
        KeyCode::Right | KeyCode::Char(' ') if is_choice => app.cycle_filter(true),
        KeyCode::Left if is_choice => app.cycle_filter(false),
        KeyCode::Backspace if !is_choice => {
            if let Some(editor) = app.filter_editor.as_mut() {
                editor.values[index].pop();
            }
        },
        KeyCode::Char(c) if !is_choice && !modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(editor) = app.filter_editor.as_mut() {
                editor.values[index].push(c);
            }
        },
        _ => {},
    }
    Ok(false)
}

async fn handle_command_mode(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Result<bool> {
    match code {
        KeyCode::Esc => {
            app.exit_mode();
        },
        KeyCode::Enter => {
            let should_quit = app.execute_command().await?;
            if app.mode == Mode::Command {
                app.exit_mode();
            }
            return Ok(should_quit);
        },
        KeyCode::Backspace => {
            app.command_text.pop();
            app.update_command_suggestions();
        },
        KeyCode::Tab | KeyCode::Right => {
            app.apply_suggestion();
        },
        KeyCode::Down => {
            app.next_suggestion();
        },
        KeyCode::Up => {
            app.prev_suggestion();
        },
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_text.push(c);
            app.update_command_suggestions();
        },
        _ => {},
    }
    Ok(false)
}

fn handle_help_mode(app: &mut App, code: KeyCode) -> Result<bool> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Enter => {
            app.exit_mode();
        },
        _ => {},
    }
    Ok(false)
}

fn handle_confirm_mode(app: &mut App, code: KeyCode) -> Result<bool> {
    match code {
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
            app.resolve_pending(Confirmation::Declined);
        },
        KeyCode::Left | KeyCode::Char('h') => {
            if let Some(ref mut pending) = app.pending_action {
                pending.selected_yes = true;
            }
        },
        KeyCode::Right | KeyCode::Char('l') => {
            if let Some(ref mut pending) = app.pending_action {
                pending.selected_yes = false;
            }
        },
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.resolve_pending(Confirmation::Confirmed);
        },
        KeyCode::Enter => {
            let answer = match app.pending_action.as_ref() {
                Some(pending) if pending.selected_yes => Confirmation::Confirmed,
                _ => Confirmation::Declined,
            };
            app.resolve_pending(answer);
        },
        _ => {},
    }
    Ok(false)
}

fn handle_warning_mode(app: &mut App, code: KeyCode) -> Result<bool> {
    match code {
        KeyCode::Esc | KeyCode::Enter => {
            app.warning_message = None;
            app.exit_mode();
        },
        _ => {},
    }
    Ok(false)
}

fn handle_form_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Result<bool> {
    if app.screen().is_some_and(|s| s.edit.is_busy()) {
        return Ok(false);
    }

    match code {
        KeyCode::Esc => app.close_form(),
        KeyCode::Enter => app.submit_form(),
        KeyCode::Char('s') if modifiers.contains(KeyModifiers::CONTROL) => app.submit_form(),
        KeyCode::Tab | KeyCode::Down => app.form_next_field(),
        KeyCode::BackTab | KeyCode::Up => app.form_prev_field(),
        KeyCode::Right => app.form_cycle(true),
        KeyCode::Left => app.form_cycle(false),
        KeyCode::Backspace => app.form_input(None),
        KeyCode::Char(' ') if app.focused_is_choice() => app.form_cycle(true),
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => app.form_input(Some(c)),
        _ => {},
    }
    Ok(false)
}

fn handle_status_picker_mode(app: &mut App, code: KeyCode) -> Result<bool> {
    match code {
        KeyCode::Esc => app.exit_mode(),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.previous(),
        KeyCode::Enter => app.confirm_status_picker(),
        _ => {},
    }
    Ok(false)
}

fn handle_describe_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Result<bool> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => {
            app.exit_mode();
        },
        KeyCode::Char('j') | KeyCode::Down => {
            app.describe_scroll = app.describe_scroll.saturating_add(1);
        },
        KeyCode::Char('k') | KeyCode::Up => {
            app.describe_scroll = app.describe_scroll.saturating_sub(1);
        },
        KeyCode::PageDown => {
            app.describe_scroll = app.describe_scroll.saturating_add(10);
        },
        KeyCode::PageUp => {
            app.describe_scroll = app.describe_scroll.saturating_sub(10);
        },
        KeyCode::Char('d') => {
            if modifiers.contains(KeyModifiers::CONTROL) {
                app.describe_scroll = app.describe_scroll.saturating_add(10);
            } else {
                app.exit_mode();
            }
        },
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.describe_scroll = app.describe_scroll.saturating_sub(10);
        },
        KeyCode::Char('g') | KeyCode::Home => {
            app.describe_scroll = 0;
        },
        KeyCode::Char('G') | KeyCode::End => {
            app.describe_scroll_to_bottom(30); // Approximate visible lines
        },
        _ => {},
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, AuthUser, Session};
    use crate::config::Config;
    use crate::i18n::Locale;
    use serde_json::json;

    fn app(user: bool) -> App {
        let api = ApiClient::new("http://127.0.0.1:9/api", Session::new()).unwrap();
        let user = user.then(|| AuthUser::from_token("t"));
        App::new(api, Config::default(), Locale::En, false, Some("members".into()), user)
    }

    async fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key_event(app, code, KeyModifiers::NONE).await.unwrap()
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_everywhere() {
        let mut app = app(false);
        let quit = handle_key_event(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL)
            .await
            .unwrap();
        assert!(quit);
    }

    #[tokio::test]
    async fn test_login_typing_switches_fields() {
        let mut app = app(false);
        for c in "a@x.org".chars() {
            press(&mut app, KeyCode::Char(c)).await;
        }
        press(&mut app, KeyCode::Tab).await;
        press(&mut app, KeyCode::Char('p')).await;
        assert_eq!(app.login.email, "a@x.org");
        assert_eq!(app.login.password, "p");
        assert_eq!(app.mode, Mode::Login);
    }

    #[tokio::test]
    async fn test_search_mode_updates_query() {
        let mut app = app(true);
        press(&mut app, KeyCode::Char('/')).await;
        assert_eq!(app.mode, Mode::Search);
        for c in "ahm".chars() {
            press(&mut app, KeyCode::Char(c)).await;
        }
        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.screen().unwrap().list.query().search_term, "ahm");
    }

    #[tokio::test]
    async fn test_command_switches_resource() {
        let mut app = app(true);
        press(&mut app, KeyCode::Char(':')).await;
        for c in "trips".chars() {
            press(&mut app, KeyCode::Char(c)).await;
        }
        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.current_resource_key, "trips");
        assert_eq!(app.mode, Mode::Normal);
    }

    #[tokio::test]
    async fn test_create_form_typing_and_escape() {
        let mut app = app(true);
        press(&mut app, KeyCode::Char('n')).await;
        assert_eq!(app.mode, Mode::Form);
        for c in "Sara".chars() {
            press(&mut app, KeyCode::Char(c)).await;
        }
        assert_eq!(app.screen().unwrap().edit.field_text("fullName.first"), "Sara");
        press(&mut app, KeyCode::Esc).await;
        assert_eq!(app.mode, Mode::Normal);
        assert!(!app.screen().unwrap().edit.is_open());
    }

    #[tokio::test]
    async fn test_submit_returns_before_the_server_answers() {
        let mut app = app(true);
        app.navigate_to_resource("expenses");
        press(&mut app, KeyCode::Char('n')).await;
        let screen = app.screen_mut().unwrap();
        screen.edit.set_field("category", json!("rent")).unwrap();
        screen.edit.set_field("amount", json!("250")).unwrap();
        screen.edit.set_field("spentBy", json!("Treasurer")).unwrap();
        screen.edit.set_field("purpose", json!("Hall rent")).unwrap();

        press(&mut app, KeyCode::Enter).await;
        let screen = app.screen().unwrap();
        assert!(screen.edit.is_busy());
        assert!(screen.edit.status.loading);
        assert_eq!(app.mode, Mode::Form);

        // The session holds no token, so the save fails in the background
        for _ in 0..500 {
            app.drain_responses();
            if !app.screen().unwrap().edit.is_busy() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let screen = app.screen().unwrap();
        assert!(!screen.edit.is_busy());
        assert_eq!(screen.edit.status.error.as_deref(), Some("An error occurred while saving"));
        assert_eq!(app.mode, Mode::Form);

        let quit = handle_key_event(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL)
            .await
            .unwrap();
        assert!(quit);
    }

    #[tokio::test]
    async fn test_help_toggles() {
        let mut app = app(true);
        press(&mut app, KeyCode::Char('?')).await;
        assert_eq!(app.mode, Mode::Help);
        press(&mut app, KeyCode::Esc).await;
        assert_eq!(app.mode, Mode::Normal);
    }
}
