use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use viewer_core::{
    Document, InputEvent, Notification, PageGeometry, PageSize, ViewerConfig, ViewportCoordinator,
    ViewportSize,
};

#[derive(Debug, Parser)]
#[command(name = "viewer-cli")]
#[command(about = "Headless driver for the continuous viewer core")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a JSON input script and print one notification per line.
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the continuous layout of a document of identical pages.
    Layout {
        #[arg(long, default_value_t = 1)]
        pages: usize,
        #[arg(long, default_value_t = 612.0)]
        page_width: f64,
        #[arg(long, default_value_t = 792.0)]
        page_height: f64,
        #[arg(long, default_value_t = 1.0)]
        zoom: f64,
        #[arg(long, default_value_t = 800.0)]
        viewport_height: f64,
    },
    /// Print CLI version.
    Version,
}

/// Input file for `replay`.
#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    viewport: Option<ViewportSize>,
    #[serde(default)]
    config: ViewerConfig,
    pages: Vec<PageSize>,
    #[serde(default)]
    events: Vec<InputEvent>,
}

#[derive(Debug, Serialize)]
struct LayoutOutput {
    page_count: usize,
    zoom_factor: f64,
    total_height: f64,
    content_width: f64,
    max_scroll: f64,
    page_tops: Vec<f64>,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Replay { script, output } => run_replay(&script, output.as_deref()),
        Commands::Layout { pages, page_width, page_height, zoom, viewport_height } => {
            run_layout(pages, PageSize::new(page_width, page_height), zoom, viewport_height)
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_replay(script_path: &Path, output: Option<&Path>) -> Result<()> {
    if !script_path.exists() {
        anyhow::bail!("file does not exist: {}", script_path.display());
    }

    let raw = fs::read_to_string(script_path)
        .with_context(|| format!("failed to read {}", script_path.display()))?;
    let script: Script = serde_json::from_str(&raw).context("failed to parse replay script")?;

    let lines = replay(script)?;
    let rendered = lines.join("\n");

    match output {
        Some(path) => fs::write(path, rendered + "\n")
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }

    Ok(())
}

/// Feeds every script event through the coordinator, one flush per event.
fn replay(script: Script) -> Result<Vec<String>> {
    let size = script.viewport.unwrap_or_default();
    let mut coordinator =
        ViewportCoordinator::new(script.config, size).context("invalid viewer setup")?;
    let document = Document::new(script.pages).context("invalid page list")?;

    let mut lines = Vec::new();
    let loaded = Notification::ViewportChanged(coordinator.load_document(document));
    lines.push(serde_json::to_string(&loaded)?);

    for (index, event) in script.events.iter().enumerate() {
        if let Err(error) = coordinator.handle_input(event) {
            tracing::warn!(event = index, %error, "skipping input event");
            continue;
        }

        for notification in coordinator.flush() {
            lines.push(serde_json::to_string(&notification)?);
        }
    }

    Ok(lines)
}

fn run_layout(pages: usize, size: PageSize, zoom: f64, viewport_height: f64) -> Result<()> {
    if !zoom.is_finite() || zoom <= 0.0 {
        anyhow::bail!("--zoom must be a positive number");
    }

    let document = Document::uniform(pages, size).context("invalid page size")?;
    let layout = PageGeometry::new(document).layout(zoom);

    let payload = LayoutOutput {
        page_count: layout.page_count(),
        zoom_factor: layout.zoom_factor(),
        total_height: layout.total_height(),
        content_width: layout.content_width(),
        max_scroll: layout.max_scroll(viewport_height),
        page_tops: (0..layout.page_count()).filter_map(|index| layout.top_offset(index)).collect(),
    };

    let json = serde_json::to_string_pretty(&payload)?;
    println!("{json}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_emits_load_then_changes() {
        let script: Script = serde_json::from_str(
            r#"{
                "viewport": {"width": 1000, "height": 800},
                "pages": [{"width": 1200, "height": 1000}, {"width": 1200, "height": 1000}],
                "events": [
                    {"type": "wheel", "delta": -1},
                    {"type": "goto_page_requested", "index": 5}
                ]
            }"#,
        )
        .expect("valid script");

        let lines = replay(script).expect("replay succeeds");
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains(r#""type":"viewport_changed""#));
        assert!(lines[1].contains(r#""scroll_offset":100.0"#));
        assert!(lines[2].contains("Page number must be between 1 and 2."));
    }

    #[test]
    fn replay_rejects_invalid_pages() {
        let script: Script =
            serde_json::from_str(r#"{"pages": [{"width": 0, "height": 10}]}"#).expect("valid json");
        assert!(replay(script).is_err());
    }
}
