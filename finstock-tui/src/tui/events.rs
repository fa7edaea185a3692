use crate::tui::app::{App, View};
use crossterm::event::{KeyCode, KeyEvent};
use finstock_core::{export_json, histogram_for_config, report_file_name, AnalysisReport};

pub fn handle_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('?') => {
            app.toggle_help();
            return;
        }
        KeyCode::Char('j') | KeyCode::Down if app.view == View::Help => {
            app.help_scroll += 1;
            return;
        }
        KeyCode::Char('k') | KeyCode::Up if app.view == View::Help => {
            app.help_scroll = app.help_scroll.saturating_sub(1);
            return;
        }
        KeyCode::Esc if app.view == View::Help => {
            app.toggle_help();
            return;
        }
        _ => {}
    }
    match key.code {
        KeyCode::Char('1') | KeyCode::Char('O') => app.view = View::Overview,
        KeyCode::Char('2') | KeyCode::Char('P') => app.view = View::Price,
        KeyCode::Char('3') | KeyCode::Char('H') => app.view = View::Returns,
        KeyCode::Char('4') | KeyCode::Char('I') => app.view = View::Insights,
        KeyCode::Tab => {
            app.view = match app.view {
                View::Overview => View::Price,
                View::Price => View::Returns,
                View::Returns => View::Insights,
                View::Insights | View::Help => View::Overview,
            };
        }
        KeyCode::Left | KeyCode::Char('h') if app.view == View::Returns => app.prev_bin(),
        KeyCode::Right | KeyCode::Char('l') if app.view == View::Returns => app.next_bin(),
        KeyCode::Char('r') => app.reload(),
        KeyCode::Char('E') => export_current(app),
        KeyCode::Esc => app.view = View::Overview,
        _ => {}
    }
}

// JSON report to config.export.output_dir
fn export_current(app: &mut App) {
    let Some(payload) = app.payload.as_ref() else {
        app.status_msg = "no payload loaded".into();
        return;
    };
    let out_dir = std::path::Path::new(&app.config.export.output_dir);
    if let Err(e) = std::fs::create_dir_all(out_dir) {
        app.status_msg = format!("export dir error: {e}");
        return;
    }
    let out_path = out_dir.join(report_file_name(&payload.stock_info.symbol, "json"));
    let result = payload
        .returns_or_computed()
        .and_then(|r| histogram_for_config(&r, &app.config.histogram))
        .and_then(|h| AnalysisReport::new(payload, h))
        .and_then(|report| export_json(&out_path, &report));
    app.status_msg = match result {
        Ok(()) => format!("exported to {}", out_path.display()),
        Err(e) => format!("export error: {e}"),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use finstock_common::Config;
    use finstock_core::AnalysisPayload;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn loaded_app() -> App {
        let mut app = App::new("x.json".into(), Config::default());
        let payload = AnalysisPayload::from_json(
            r#"{"stock_info": {"symbol": "HDFC.NS"}, "daily_returns_histogram": [-1.0, 0.5, 2.0]}"#,
        )
        .unwrap();
        app.load_payload(payload).unwrap();
        app
    }

    #[test]
    fn number_keys_switch_views() {
        let mut app = loaded_app();
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.view, View::Returns);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.view, View::Insights);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.view, View::Overview);
    }

    #[test]
    fn arrows_move_bin_only_in_returns_view() {
        let mut app = loaded_app();
        press(&mut app, KeyCode::Right);
        assert_eq!(app.selected_bin, 0);
        app.view = View::Returns;
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.selected_bin, 1);
    }

    #[test]
    fn quit_key() {
        let mut app = loaded_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn export_sanitises_symbol_with_slash() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new("x.json".into(), Config::default());
        let payload = AnalysisPayload::from_json(
            r#"{"stock_info": {"symbol": "BRK/B"}, "daily_returns_histogram": [0.5, 1.0]}"#,
        )
        .unwrap();
        app.load_payload(payload).unwrap();
        app.config.export.output_dir = dir.path().to_string_lossy().into_owned();
        press(&mut app, KeyCode::Char('E'));
        assert!(dir.path().join("BRK_B.json").exists(), "{}", app.status_msg);
        assert!(!dir.path().join("BRK").exists());
    }

    #[test]
    fn export_writes_symbol_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded_app();
        app.config.export.output_dir = dir.path().to_string_lossy().into_owned();
        press(&mut app, KeyCode::Char('E'));
        assert!(dir.path().join("HDFC.NS.json").exists(), "{}", app.status_msg);
    }
}
