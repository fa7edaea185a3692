mod logger;
mod tui;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::path::{Path, PathBuf};
use std::{io, time::Duration};
use tui::app::App;
use tui::events::handle_key;
use tui::session::Session;
use tui::ui::render;
use finstock_common::Config;
use finstock_core::{
    build_histogram_with_bins, export_csv, export_json, histogram_for_config, print_summary,
    report_file_name, AnalysisPayload, AnalysisReport, Histogram,
};

fn parse_bins(s: &str) -> Result<usize, String> { // reject 0 at CLI parse time
    let v: usize = s.parse().map_err(|_| format!("not an integer: {s}"))?;
    if v >= 1 { Ok(v) } else { Err("bins must be at least 1".into()) }
}

#[derive(Parser)]
#[command(name = "finstock", version, about = "Stock analysis dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive dashboard for an analysis payload
    View {
        path: String,
        #[arg(long)] watch: bool,
        /// JSON-lines intraday feed to patch the intraday widget from
        #[arg(long)] feed: Option<PathBuf>,
    },
    /// Print the return histogram
    Histogram {
        path: String,
        #[arg(long, value_parser = parse_bins)] bins: Option<usize>,
    },
    Summary { path: String, #[arg(long)] save: bool },
    Export {
        path: String,
        #[arg(long)] format: Option<String>,
        #[arg(long)] output: Option<String>,
    },
    Completions { shell: clap_complete::Shell },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("invalid finstock config")?;
    let _guard = match logger::init(&config.log.filter) {
        Ok(g) => Some(g),
        Err(e) => { eprintln!("logging disabled: {e}"); None }
    };
    match cli.command {
        Commands::View { path, watch, feed } => run_tui(path, watch, feed, config)?,
        Commands::Histogram { path, bins } => run_histogram(path, bins, &config)?,
        Commands::Summary { path, save } => run_summary(path, save, &config)?,
        Commands::Export { path, format, output } => run_export(path, format, output, &config)?,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "finstock", &mut io::stdout());
        }
    }
    Ok(())
}

fn load(path: &str) -> anyhow::Result<AnalysisPayload> {
    if !Path::new(path).exists() { anyhow::bail!("payload not found: {path}"); }
    Ok(AnalysisPayload::load(Path::new(path))?)
}

fn resolve_histogram(payload: &AnalysisPayload, bins: Option<usize>, config: &Config) -> anyhow::Result<Option<Histogram>> {
    let returns = payload.returns_or_computed()?;
    let hist = match bins {
        Some(n) if !returns.is_empty() => Some(build_histogram_with_bins(&returns, n)?),
        _ => histogram_for_config(&returns, &config.histogram)?,
    };
    Ok(hist)
}

fn run_tui(input_path: String, watch: bool, feed: Option<PathBuf>, config: Config) -> anyhow::Result<()> {
    let payload = load(&input_path)?;
    let mut app = App::new(input_path.clone(), config);
    app.feed_path = feed.clone();
    app.load_payload(payload)?;
    app.apply_feed();
    if let Some(s) = Session::load() { app.restore_from_session(&s); }
    if watch {
        let (watcher, rx) = tui::watch::spawn_watcher(Path::new(&input_path), feed.as_deref())?;
        app.watcher = Some(watcher);
        app.watch_rx = Some(rx);
        app.status_msg = "Watching for changes | q:quit ?:help".into();
    } else if app.status_msg == "Loading..." {
        app.status_msg = "Ready | q:quit ?:help".into();
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let tick = Duration::from_millis(66); // 15Hz
    let result = (|| -> anyhow::Result<()> {
        loop {
            terminal.draw(|f| render(f, &app))?;
            // drain filesystem events before reading keys
            let pending: Vec<_> = app.watch_rx.as_ref().map(|rx| rx.try_iter().collect()).unwrap_or_default();
            for ev in pending { app.handle_watch_event(ev); }
            if event::poll(tick)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press { handle_key(&mut app, key); }
                }
            }
            if app.should_quit { break; }
        }
        Ok(())
    })();
    if let Err(e) = app.to_session().save() { tracing::warn!(error = %e, "session not saved"); }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn run_histogram(input_path: String, bins: Option<usize>, config: &Config) -> anyhow::Result<()> {
    let payload = load(&input_path)?;
    let Some(hist) = resolve_histogram(&payload, bins, config)? else {
        println!("No return data for {}", payload.stock_info.symbol);
        return Ok(());
    };
    println!("{} daily returns, {} bins, width {:.4}%", hist.sample_count, hist.bins.len(), hist.width);
    let max_c = hist.bins.iter().map(|b| b.count).max().unwrap_or(1).max(1);
    let bw = 40usize;
    for (bin, label) in hist.bins.iter().zip(&hist.labels) {
        let blen = (bin.count as f64 / max_c as f64 * bw as f64) as usize;
        println!("{:>9} |{:<bw$}| {:>5}  {}", label, "█".repeat(blen), bin.count, bin.tooltip(), bw = bw);
    }
    Ok(())
}

fn run_summary(input_path: String, save: bool, config: &Config) -> anyhow::Result<()> {
    let payload = load(&input_path)?;
    let hist = resolve_histogram(&payload, None, config)?;
    let report = AnalysisReport::new(&payload, hist)?;
    print_summary(&report);
    if save {
        let out_dir = Path::new(&config.export.output_dir);
        std::fs::create_dir_all(out_dir)?;
        let out_path = out_dir.join("summary.json");
        export_json(&out_path, &report)?;
        println!("Summary saved to {}", out_path.display());
    }
    Ok(())
}

fn run_export(input_path: String, format: Option<String>, output: Option<String>, config: &Config) -> anyhow::Result<()> {
    let payload = load(&input_path)?;
    let format = format.unwrap_or_else(|| config.export.format.clone());
    let hist = resolve_histogram(&payload, None, config)?;
    let default_name = report_file_name(&payload.stock_info.symbol, &format);
    let out_path: PathBuf = if let Some(ref o) = output {
        PathBuf::from(o)
    } else {
        Path::new(&config.export.output_dir).join(&default_name)
    };
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() { std::fs::create_dir_all(parent)?; }
    }
    match format.as_str() {
        "json" => {
            let report = AnalysisReport::new(&payload, hist)?;
            export_json(&out_path, &report)?;
        }
        "csv" => {
            let Some(hist) = hist else { anyhow::bail!("no return data to export for {}", payload.stock_info.symbol) };
            export_csv(&out_path, &hist)?;
        }
        _ => anyhow::bail!("Unknown format: {format} (use json or csv)"),
    }
    println!("Exported to {}", out_path.display());
    Ok(())
}
