//! Main application entry point: a line-oriented controller over the
//! ingestion pipeline, table preview, plot dispatch and command console.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;
use tracing_subscriber::EnvFilter;

use pb_console::CommandConsole;
use pb_core::{AppState, DatasetOrigin, DisplayChannel, DisplayEntry, DisplayKind};
use pb_data::{builtin_dataset, builtin_label, builtin_names, parse_delimited};
use pb_views::{PlotDispatcher, PlotSurface, TablePreview};

mod services;

use services::{ArboardClipboard, DemoProjection};

/// Width the plot surface reports before anything resizes it.
const DEFAULT_SURFACE_WIDTH: u32 = 960;

/// Controller owning the shared context and handing it to each component.
struct PlotbenchApp {
    state: Arc<AppState>,
    channel: Arc<DisplayChannel>,
    console: CommandConsole,
    dispatcher: Arc<PlotDispatcher>,
    surface: Arc<PlotSurface>,
    /// Display revision drained to stdout so far.
    seen: u64,
}

impl PlotbenchApp {
    fn new() -> Self {
        let state = Arc::new(AppState::new());
        let channel = Arc::new(DisplayChannel::new());
        let console = CommandConsole::new(
            channel.clone(),
            Arc::new(ArboardClipboard),
            state.clone(),
        );
        let dispatcher = Arc::new(PlotDispatcher::new(
            Arc::new(DemoProjection),
            channel.clone(),
        ));
        let surface = Arc::new(PlotSurface::new("main-plot", DEFAULT_SURFACE_WIDTH));
        Self {
            state,
            channel,
            console,
            dispatcher,
            surface,
            seen: 0,
        }
    }

    /// Handle one input line. Returns false when the app should exit.
    async fn handle_line(&mut self, line: &str) -> bool {
        let line = line.trim();
        match line {
            ":quit" | ":q" => return false,
            ":help" => print_help(),
            ":clear" => self.console.clear(),
            ":copy" => self.console.copy_all().await,
            ":preview" => self.print_preview(),
            ":plot" => self.plot(),
            _ => {
                if let Some(id) = line.strip_prefix(":dataset ") {
                    self.select_builtin(id.trim());
                } else if let Some(path) = line.strip_prefix(":load ") {
                    self.load_file(path.trim()).await;
                } else if line.starts_with(':') {
                    self.channel
                        .warn(format!("unknown command '{line}' (try :help)"));
                } else {
                    self.console.submit(line).await;
                }
            }
        }
        true
    }

    fn select_builtin(&self, id: &str) {
        match (builtin_dataset(id), builtin_label(id)) {
            (Ok(dataset), Ok(label)) => {
                self.state
                    .adopt(dataset.clone(), DatasetOrigin::Builtin, label);
                self.surface.clear_content();
                self.channel
                    .log(format!("Built-in {label} data selected"));
                self.preview_current(&format!("{label} (built-in)"));
            }
            _ => {
                self.channel.warn(format!(
                    "unknown built-in dataset '{id}' (available: {})",
                    builtin_names().join(", ")
                ));
            }
        }
    }

    async fn load_file(&self, path: &str) {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(err) => {
                error!(path, "failed to read file: {err}");
                self.channel.error(format!("Could not read '{path}': {err}"));
                return;
            }
        };

        let dataset = parse_delimited(&text);
        let name = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(path)
            .to_string();
        self.state.adopt(dataset, DatasetOrigin::File, &name);
        self.surface.clear_content();
        self.preview_current(&format!("Loaded file: {name}"));
    }

    /// Render the bounded preview to stdout, warning about records whose
    /// keys differ from the first record's.
    fn preview_current(&self, title: &str) {
        let snapshot = self.state.snapshot();
        let preview = TablePreview::build(&snapshot.data, title);
        if preview.mismatched_records() > 0 {
            self.channel.warn(format!(
                "{} record(s) do not match the first record's fields",
                preview.mismatched_records()
            ));
        }
        println!("{}", preview.render_text());
    }

    fn print_preview(&self) {
        let snapshot = self.state.snapshot();
        let title = snapshot.name.clone().unwrap_or_else(|| "Dataset Preview".to_string());
        drop(snapshot);
        self.preview_current(&title);
    }

    /// Dispatch a plot as its own task so the console stays responsive
    /// while the projection service suspends.
    fn plot(&self) {
        let dispatcher = self.dispatcher.clone();
        let surface = self.surface.clone();
        let snapshot = self.state.snapshot();
        tokio::spawn(async move {
            dispatcher.dispatch(snapshot, &surface).await;
        });
    }

    /// Print display entries appended since the last drain.
    fn drain_display(&mut self) {
        let (entries, revision) = self.channel.entries_since(self.seen);
        self.seen = revision;
        for entry in entries {
            print_entry(&entry);
        }
    }
}

fn print_entry(entry: &DisplayEntry) {
    match entry.kind {
        DisplayKind::Log => println!("{}", entry.text),
        DisplayKind::Warn => println!("[warn] {}", entry.text),
        DisplayKind::Err => println!("[error] {}", entry.text),
        DisplayKind::Meta => println!("{}", entry.text),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  :load <path>    load a delimited text file (CSV/TSV)");
    println!(
        "  :dataset <id>   select a built-in dataset ({})",
        builtin_names().join(", ")
    );
    println!("  :preview        show a preview of the active dataset");
    println!("  :plot           project and plot the active dataset");
    println!("  :copy           copy the console log to the clipboard");
    println!("  :clear          clear the console log");
    println!("  :quit           exit");
    println!("Anything else is evaluated by the command console.");
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    println!("plotbench (type :help for commands)");
    let mut app = PlotbenchApp::new();

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    loop {
        // Let spawned plot tasks report before the next prompt
        tokio::task::yield_now().await;
        app.drain_display();

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };
        if !app.handle_line(&line).await {
            break;
        }
        app.drain_display();
    }

    Ok(())
}
