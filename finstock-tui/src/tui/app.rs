use crate::tui::panels::{PricePanel, ReturnsPanel};
use crate::tui::session::Session;
use crate::tui::theme::Theme;
use crate::tui::watch::WatchEvent;
use finstock_common::Config;
use finstock_core::{
    latest_intraday, AnalysisPayload, ChartSlot, PriceChartData, ReturnDistribution, Statistics,
};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Overview,
    Price,
    Returns,
    Insights,
    Help,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Overview => "overview",
            View::Price => "price",
            View::Returns => "returns",
            View::Insights => "insights",
            View::Help => "help",
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "price" => View::Price,
            "returns" => View::Returns,
            "insights" => View::Insights,
            _ => View::Overview,
        }
    }
}

pub struct App {
    pub input_path: String,
    pub feed_path: Option<PathBuf>,
    pub payload: Option<AnalysisPayload>,
    pub statistics: Option<Statistics>,
    pub price_chart: ChartSlot<PricePanel>,
    pub returns_chart: ChartSlot<ReturnsPanel>,
    pub view: View,
    pub previous_view: View,
    pub selected_bin: usize,
    pub status_msg: String,
    pub should_quit: bool,
    pub config: Config,
    pub theme: Theme,
    pub help_scroll: usize,
    pub watch_rx: Option<std::sync::mpsc::Receiver<WatchEvent>>, // reload events from filesystem watcher
    pub watcher: Option<notify::RecommendedWatcher>,
}

impl App {
    pub fn new(input_path: String, config: Config) -> Self {
        Self {
            input_path,
            feed_path: None,
            payload: None,
            statistics: None,
            price_chart: ChartSlot::new("price"),
            returns_chart: ChartSlot::new("returns"),
            view: View::Overview,
            previous_view: View::Overview,
            selected_bin: 0,
            status_msg: String::from("Loading..."),
            should_quit: false,
            theme: Theme::from_name(&config.display.theme),
            config,
            help_scroll: 0,
            watch_rx: None,
            watcher: None,
        }
    }

    /// Installs a payload and rebuilds both charts. Charts are left
    /// untouched when the payload is rejected.
    pub fn load_payload(&mut self, payload: AnalysisPayload) -> finstock_core::Result<()> {
        let returns = payload.returns_or_computed()?;
        let distribution = ReturnDistribution::from_series(&returns, &self.config.histogram)?;
        let statistics = match payload.statistics_or_computed() {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!(error = %e, "no statistics available");
                None
            }
        };
        let price = PriceChartData::from_points(payload.price_points());
        self.price_chart.replace(|| PricePanel::new(price));
        self.returns_chart.replace(|| ReturnsPanel::new(distribution));
        let bins = self.returns_chart.get().map_or(0, ReturnsPanel::bin_count);
        self.selected_bin = self.selected_bin.min(bins.saturating_sub(1));
        self.statistics = statistics;
        self.payload = Some(payload);
        Ok(())
    }

    pub fn reload(&mut self) {
        let path = PathBuf::from(&self.input_path);
        match AnalysisPayload::load(&path).and_then(|p| self.load_payload(p)) {
            Ok(()) => {
                self.apply_feed();
                self.status_msg = format!("reloaded {}", path.display());
            }
            Err(e) => {
                tracing::error!(error = %e, "reload failed");
                self.status_msg = format!("reload error: {e}");
            }
        }
    }

    /// Patches the intraday widget from the last update in the feed file.
    pub fn apply_feed(&mut self) {
        let Some(feed) = self.feed_path.clone() else { return };
        let Some(payload) = self.payload.as_mut() else { return };
        match std::fs::read_to_string(&feed) {
            Ok(text) => {
                if let Some(update) = latest_intraday(text.lines()) {
                    self.status_msg = format!("intraday update {}", update.last_updated);
                    payload.apply_intraday(update);
                }
            }
            Err(e) => {
                tracing::warn!(path = %feed.display(), error = %e, "feed unreadable");
                self.status_msg = format!("feed error: {e}");
            }
        }
    }

    pub fn handle_watch_event(&mut self, ev: WatchEvent) {
        match ev {
            WatchEvent::Payload => self.reload(),
            WatchEvent::Feed => self.apply_feed(),
        }
    }

    pub fn bin_count(&self) -> usize {
        self.returns_chart.get().map_or(0, ReturnsPanel::bin_count)
    }

    pub fn next_bin(&mut self) {
        if self.selected_bin + 1 < self.bin_count() {
            self.selected_bin += 1;
        }
    }

    pub fn prev_bin(&mut self) {
        self.selected_bin = self.selected_bin.saturating_sub(1);
    }

    pub fn toggle_help(&mut self) {
        if self.view == View::Help {
            self.view = self.previous_view.clone();
            self.help_scroll = 0;
        } else {
            self.previous_view = self.view.clone();
            self.view = View::Help;
        }
    }

    pub fn to_session(&self) -> Session {
        let view = if self.view == View::Help { &self.previous_view } else { &self.view };
        Session {
            input_path: self.input_path.clone(),
            view: view.name().into(),
            selected_bin: self.selected_bin,
        }
    }

    pub fn restore_from_session(&mut self, s: &Session) {
        if s.input_path != self.input_path {
            return;
        }
        self.view = View::from_name(&s.view);
        self.selected_bin = s.selected_bin.min(self.bin_count().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(returns: &str) -> AnalysisPayload {
        AnalysisPayload::from_json(&format!(
            r#"{{"stock_info": {{"symbol": "TCS.NS"}},
                "historical_data": [{{"date": "2024-01-01", "close": 10.0}}, {{"date": "2024-01-02", "close": 11.0}}],
                "daily_returns_histogram": {returns}}}"#
        ))
        .unwrap()
    }

    #[test]
    fn load_replaces_both_charts() {
        let mut app = App::new("x.json".into(), Config::default());
        app.load_payload(payload("[1.0, 2.0]")).unwrap();
        app.load_payload(payload("[1.0, 2.0, 3.0]")).unwrap();
        assert_eq!(app.price_chart.generation(), 2);
        assert_eq!(app.returns_chart.generation(), 2);
        assert_eq!(app.bin_count(), 10);
        assert!(app.statistics.is_some());
    }

    #[test]
    fn rejected_payload_keeps_old_charts() {
        let mut app = App::new("x.json".into(), Config::default());
        app.load_payload(payload("[1.0, 2.0]")).unwrap();
        assert!(app.load_payload(payload("[1.0, null]")).is_err());
        assert_eq!(app.returns_chart.generation(), 1);
        assert_eq!(app.bin_count(), 10);
    }

    #[test]
    fn bin_cursor_stays_in_range() {
        let mut app = App::new("x.json".into(), Config::default());
        app.load_payload(payload("[1.0, 2.0]")).unwrap();
        for _ in 0..30 {
            app.next_bin();
        }
        assert_eq!(app.selected_bin, 9);
        app.prev_bin();
        assert_eq!(app.selected_bin, 8);
    }

    #[test]
    fn help_returns_to_previous_view() {
        let mut app = App::new("x.json".into(), Config::default());
        app.view = View::Returns;
        app.toggle_help();
        assert_eq!(app.view, View::Help);
        assert_eq!(app.to_session().view, "returns");
        app.toggle_help();
        assert_eq!(app.view, View::Returns);
    }

    #[test]
    fn feed_patches_intraday() {
        let dir = tempfile::tempdir().unwrap();
        let feed = dir.path().join("feed.jsonl");
        std::fs::write(
            &feed,
            r#"{"type": "intraday_update", "data": {"last_updated": "09:30", "similar_pattern_found": "gap up", "prediction": "Up", "probability": 0.7}}"#,
        )
        .unwrap();
        let mut app = App::new("x.json".into(), Config::default());
        app.load_payload(payload("[1.0]")).unwrap();
        app.feed_path = Some(feed);
        app.apply_feed();
        let intraday = &app.payload.as_ref().unwrap().ai_predictions.intraday;
        assert_eq!(intraday.prediction, "Up");
    }
}
