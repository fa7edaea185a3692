use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, List, ListItem, Paragraph, Wrap},
};
use crate::tui::app::{App, View};
use crate::tui::theme::Theme;
use finstock_core::Statistics;

pub fn render(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    render_topbar(frame, app, chunks[0], theme);
    render_main(frame, app, chunks[1], theme);
    render_bottombar(frame, app, chunks[2], theme);
    if app.view == View::Help { render_help(frame, app, area); }
}

fn render_topbar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let mut spans = vec![Span::styled(" finstock ", Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD))];
    if let Some(p) = &app.payload {
        let info = &p.stock_info;
        spans.push(Span::raw(format!("{} ({})  ", info.symbol, info.display_name())));
        if let Some(price) = info.current_price {
            spans.push(Span::raw(format!("{price:.2} ")));
        }
        if let Some(chg) = info.day_change_pct() {
            spans.push(Span::styled(format!("{chg:+.2}%"), Style::default().fg(theme.signed(chg))));
        }
    } else {
        spans.push(Span::raw(app.input_path.clone()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.bg).fg(theme.fg)), area);
}

fn render_main(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    match app.view {
        View::Overview | View::Help => render_overview(frame, app, area, theme),
        View::Price => render_price(frame, app, area, theme),
        View::Returns => render_returns(frame, app, area, theme),
        View::Insights => render_insights(frame, app, area, theme),
    }
}

fn stat_line(name: &str, v: Option<f64>, suffix: &str) -> Line<'static> {
    Line::from(format!("{:<28}{}", name, v.map_or("-".into(), |x| format!("{x:.2}{suffix}"))))
}

fn statistics_lines(s: &Statistics) -> Vec<Line<'static>> {
    vec![
        Line::from(format!("{:<28}{} .. {}", "Period", s.start_date.as_deref().unwrap_or("-"), s.end_date.as_deref().unwrap_or("-"))),
        stat_line("Mean", s.mean, ""),
        stat_line("Median", s.median, ""),
        stat_line("Mode", s.mode, ""),
        stat_line("Std deviation", s.std_deviation, ""),
        stat_line("Variance", s.variance, ""),
        stat_line("Skewness", s.skewness, ""),
        stat_line("Kurtosis", s.kurtosis, ""),
        stat_line("Range", s.range, ""),
        stat_line("IQR", s.iqr, ""),
        stat_line("Min", s.min, ""),
        stat_line("Max", s.max, ""),
        stat_line("25th percentile", s.percentile_25, ""),
        stat_line("50th percentile", s.percentile_50, ""),
        stat_line("75th percentile", s.percentile_75, ""),
        stat_line("Coeff. of variation", s.coeff_of_variation, "%"),
    ]
}

fn probability_lines(s: &Statistics) -> Vec<Line<'static>> {
    vec![
        stat_line("P(next day up)", s.probability_next_day_up, "%"),
        stat_line("P(next day down)", s.probability_next_day_down, "%"),
        stat_line("Mean daily return", s.mean_daily_return_percent, "%"),
        stat_line("Std dev daily return", s.std_dev_daily_return_percent, "%"),
        stat_line("P(up | up)", s.cond_prob_up_given_up, "%"),
        stat_line("P(down | down)", s.cond_prob_down_given_down, "%"),
        stat_line("2-day up streak", s.prob_2_days_up_streak, "%"),
        stat_line("2-day down streak", s.prob_2_days_down_streak, "%"),
    ]
}

fn render_overview(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);
    let Some(stats) = &app.statistics else {
        let msg = Paragraph::new(Span::styled("No statistics available", Style::default().fg(theme.muted)))
            .block(Block::default().borders(Borders::ALL).title("Statistics"));
        frame.render_widget(msg, area);
        return;
    };
    let mut right = probability_lines(stats);
    if let Some(info) = app.payload.as_ref().map(|p| &p.stock_info) {
        right.push(Line::from(""));
        right.push(Line::from(Span::styled("Company", Style::default().add_modifier(Modifier::BOLD))));
        right.push(Line::from(format!("{:<28}{}", "Sector", info.sector.as_deref().unwrap_or("-"))));
        right.push(Line::from(format!("{:<28}{}", "Industry", info.industry.as_deref().unwrap_or("-"))));
        right.push(stat_line("Market cap", info.market_cap, ""));
        right.push(stat_line("Day high", info.day_high, ""));
        right.push(stat_line("Day low", info.day_low, ""));
        right.push(stat_line("Previous close", info.previous_close, ""));
    }
    frame.render_widget(Paragraph::new(statistics_lines(stats)).block(Block::default().borders(Borders::ALL).title("Statistics")), cols[0]);
    frame.render_widget(Paragraph::new(right).block(Block::default().borders(Borders::ALL).title("Probabilities")).wrap(Wrap { trim: false }), cols[1]);
}

fn render_price(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let block = Block::default().borders(Borders::ALL).title("Closing price");
    let Some(panel) = app.price_chart.get().filter(|p| !p.points.is_empty()) else {
        frame.render_widget(Paragraph::new(Span::styled("No price history available", Style::default().fg(theme.muted))).block(block), area);
        return;
    };
    let [lo, hi] = panel.y_bounds;
    let dataset = Dataset::default()
        .name("Close")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(theme.line))
        .data(&panel.points);
    let x_labels: Vec<Span> = panel.x_labels().into_iter().map(Span::raw).collect();
    let y_labels = vec![
        Span::raw(format!("{lo:.2}")),
        Span::raw(format!("{:.2}", (lo + hi) / 2.0)),
        Span::raw(format!("{hi:.2}")),
    ];
    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(Axis::default().style(Style::default().fg(theme.muted)).bounds([0.0, panel.x_max()]).labels(x_labels))
        .y_axis(Axis::default().style(Style::default().fg(theme.muted)).bounds(panel.y_bounds).labels(y_labels));
    let pct = app.config.display.price_chart_height_pct.clamp(20, 100);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(pct), Constraint::Min(0)])
        .split(area);
    frame.render_widget(chart, rows[0]);
    if rows[1].height > 0 {
        frame.render_widget(return_strip(app.statistics.as_ref(), theme), rows[1]);
    }
}

fn return_strip<'a>(stats: Option<&Statistics>, theme: &Theme) -> Paragraph<'a> {
    let fmt = |v: Option<f64>| v.map_or("-".to_string(), |x| format!("{x:.2}%"));
    let mean = stats.and_then(|s| s.mean_daily_return_percent);
    let line = Line::from(vec![
        Span::raw("mean daily return "),
        Span::styled(fmt(mean), Style::default().fg(mean.map_or(theme.muted, |m| theme.signed(m)))),
        Span::raw("  std dev "),
        Span::raw(fmt(stats.and_then(|s| s.std_dev_daily_return_percent))),
    ]);
    Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Daily returns"))
}

fn render_returns(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let block = Block::default().borders(Borders::ALL).title("Daily return distribution");
    let Some(data) = app.returns_chart.get().and_then(|p| p.data()) else {
        frame.render_widget(Paragraph::new(Span::styled("No return data available", Style::default().fg(theme.muted))).block(block), area);
        return;
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);
    let n = data.counts.len().max(1) as u16;
    let inner_width = rows[0].width.saturating_sub(2);
    let bar_width = (inner_width / n).saturating_sub(1).clamp(1, 9);
    let bars: Vec<Bar> = data
        .counts
        .iter()
        .zip(&data.labels)
        .enumerate()
        .map(|(i, (&c, label))| {
            let style = if i == app.selected_bin {
                Style::default().fg(theme.highlight)
            } else {
                Style::default().fg(theme.bar)
            };
            Bar::default().value(c).label(Line::from(label.clone())).style(style)
        })
        .collect();
    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .max(data.max_count().max(1));
    frame.render_widget(chart, rows[0]);
    let tooltip = data.tooltip(app.selected_bin).unwrap_or_default();
    frame.render_widget(
        Paragraph::new(tooltip).block(Block::default().borders(Borders::ALL).title(format!("Bin {}/{} (h/l)", app.selected_bin + 1, data.counts.len()))),
        rows[1],
    );
}

fn render_insights(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let Some(p) = &app.payload else {
        frame.render_widget(Paragraph::new("No payload loaded").block(Block::default().borders(Borders::ALL)), area);
        return;
    };
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);
    let ai = &p.ai_predictions;
    let mut lines = vec![
        Line::from(Span::styled("Long term (1y)", Style::default().add_modifier(Modifier::BOLD))),
        stat_line("  Forecast", ai.long_term.forecast_1y, ""),
        Line::from(format!("{:<28}{}", "  Recommendation", ai.long_term.recommendation)),
        stat_line("  Confidence", ai.long_term.confidence.map(|c| c * 100.0), "%"),
        Line::from(""),
        Line::from(Span::styled("Short term (7d)", Style::default().add_modifier(Modifier::BOLD))),
    ];
    match ai.short_term.forecast_7d_percent {
        Some(f) => lines.push(Line::from(vec![Span::raw(format!("{:<28}", "  Forecast")), Span::styled(format!("{f:+.2}%"), Style::default().fg(theme.signed(f)))])),
        None => lines.push(stat_line("  Forecast", None, "")),
    }
    lines.push(Line::from(format!("{:<28}{}", "  Recommendation", ai.short_term.recommendation)));
    lines.push(stat_line("  Confidence", ai.short_term.confidence.map(|c| c * 100.0), "%"));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Intraday", Style::default().add_modifier(Modifier::BOLD))));
    lines.push(Line::from(format!("{:<28}{}", "  Updated", ai.intraday.last_updated)));
    lines.push(Line::from(format!("{:<28}{}", "  Pattern", ai.intraday.similar_pattern_found)));
    lines.push(Line::from(format!("{:<28}{}", "  Prediction", ai.intraday.prediction)));
    lines.push(stat_line("  Probability", ai.intraday.probability.map(|c| c * 100.0), "%"));
    frame.render_widget(Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("AI predictions")).wrap(Wrap { trim: false }), cols[0]);

    let news = &p.news_sentiment;
    let mut items: Vec<ListItem> = vec![
        ListItem::new(format!("Stock sentiment:  {}", news.stock_news.overall_sentiment)),
        ListItem::new(format!("Market sentiment: {}", news.global_market.overall_market_sentiment)),
        ListItem::new(format!("Trending:         {}", news.global_market.trending_topic)),
        ListItem::new(""),
    ];
    for a in &news.stock_news.articles {
        let score = a.sentiment_score.unwrap_or(0.0);
        let label = a.sentiment_label.as_deref().unwrap_or("-");
        items.push(ListItem::new(Line::from(vec![
            Span::styled(format!("[{label:>8}] "), Style::default().fg(theme.signed(score))),
            Span::raw(format!("{} ({})", a.headline, a.source)),
        ])));
    }
    if !news.global_market.key_headlines.is_empty() {
        items.push(ListItem::new(""));
        for h in &news.global_market.key_headlines {
            items.push(ListItem::new(format!("- {h}")));
        }
    }
    frame.render_widget(List::new(items).block(Block::default().borders(Borders::ALL).title("News & sentiment")), cols[1]);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let text: Vec<Line> = [
        "q        Quit",
        "?        Toggle help",
        "1 / O    Overview",
        "2 / P    Price chart",
        "3 / H    Return histogram",
        "4 / I    Predictions and news",
        "Tab      Next view",
        "h / l    Previous / next bin",
        "r        Reload payload",
        "E        Export JSON report",
        "Esc      Back to overview",
    ]
    .iter()
    .skip(app.help_scroll)
    .map(|s| Line::from(format!("  {s}")))
    .collect();
    let mut lines = vec![Line::from(Span::styled("Keybindings", Style::default().add_modifier(Modifier::BOLD)))];
    lines.extend(text);
    let popup = centered_rect(50, 60, area);
    frame.render_widget(ratatui::widgets::Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Help (?)")), popup);
}

fn render_bottombar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let line = Line::from(vec![
        Span::raw(" "),
        Span::styled(app.status_msg.clone(), Style::default().fg(status_color(&app.status_msg, theme))),
        Span::raw(" | q:quit ?:help 1-4:views Tab r E"),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(theme.bg).fg(theme.fg)), area);
}

fn status_color(msg: &str, theme: &Theme) -> ratatui::style::Color {
    if msg.contains("error") {
        theme.error
    } else if msg.starts_with("no ") {
        theme.warning
    } else {
        theme.fg
    }
}

fn centered_rect(px: u16, py: u16, r: Rect) -> Rect {
    let v = Layout::default().direction(Direction::Vertical).constraints([Constraint::Percentage((100-py)/2), Constraint::Percentage(py), Constraint::Percentage((100-py)/2)]).split(r);
    Layout::default().direction(Direction::Horizontal).constraints([Constraint::Percentage((100-px)/2), Constraint::Percentage(px), Constraint::Percentage((100-px)/2)]).split(v[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use finstock_common::Config;
    use finstock_core::AnalysisPayload;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buf = terminal.backend().buffer().clone();
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn error_status_uses_error_colour() {
        let mut app = App::new("x.json".into(), Config::default());
        app.status_msg = "reload error: missing file".into();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        let buf = terminal.backend().buffer();
        // second cell of the bottom row, after the leading space
        let cell = &buf.content()[29 * 100 + 1];
        assert_eq!(cell.symbol(), "r");
        assert_eq!(cell.fg, app.theme.error);
        assert_eq!(status_color("feed error: gone", &app.theme), app.theme.error);
        assert_eq!(status_color("no payload loaded", &app.theme), app.theme.warning);
        assert_eq!(status_color("Ready", &app.theme), app.theme.fg);
    }

    #[test]
    fn returns_view_shows_placeholder_without_data() {
        let mut app = App::new("x.json".into(), Config::default());
        app.load_payload(AnalysisPayload::from_json(r#"{"stock_info": {"symbol": "A"}}"#).unwrap()).unwrap();
        app.view = View::Returns;
        assert!(draw(&app).contains("No return data available"));
    }

    #[test]
    fn returns_view_shows_tooltip() {
        let mut app = App::new("x.json".into(), Config::default());
        let payload = AnalysisPayload::from_json(
            r#"{"stock_info": {"symbol": "A"}, "daily_returns_histogram": [-1.0, 0.0, 1.0, 2.0, 3.0]}"#,
        )
        .unwrap();
        app.load_payload(payload).unwrap();
        app.view = View::Returns;
        assert!(draw(&app).contains("Range: -1.00% to -0.60% | Frequency: 1"));
    }
}
