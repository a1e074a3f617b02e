mod app;
mod color;
mod config;
mod data;
mod error;
mod net;
mod state;
mod ui;

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use app::ModelEvalApp;
use clap::Parser;
use config::ClientConfig;
use eframe::egui;
use net::cookies::CookieJar;
use state::{AppState, Notifier, Page};

/// Desktop viewer for the classification analytics service
#[derive(Parser, Debug)]
#[command(name = "model-eval-viewer")]
struct Args {
    /// TOML configuration file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Service root, e.g. http://127.0.0.1:8000 (overrides config and env)
    #[arg(short = 'u', long = "base-url")]
    base_url: Option<String>,

    /// Show a saved analytics JSON instead of fetching it
    #[arg(short = 'p', long = "payload")]
    payload: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = ClientConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(url) = args.base_url {
        config.base_url = url;
    }
    log::info!("using service at {}", config.base_url);

    let jar = match config.cookie_path() {
        Some(path) => CookieJar::open(path.clone(), config.is_https()).unwrap_or_else(|e| {
            log::warn!("cookie jar {} unavailable ({e}); keeping cookies in memory", path.display());
            CookieJar::in_memory(config.is_https())
        }),
        None => CookieJar::in_memory(config.is_https()),
    };

    let offline = match &args.payload {
        Some(path) => Some(data::loader::load_file(path).with_context(|| {
            format!("loading payload {}", path.display())
        })?),
        None => None,
    };

    // Workers wake the UI through the context once the window exists.
    let repaint: Arc<OnceLock<egui::Context>> = Arc::new(OnceLock::new());
    let notify: Notifier = {
        let repaint = repaint.clone();
        Arc::new(move || {
            if let Some(ctx) = repaint.get() {
                ctx.request_repaint();
            }
        })
    };
    let mut state = AppState::new(config, jar, notify).context("creating client")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Model Evaluation Viewer",
        options,
        Box::new(move |cc| {
            // Install image loaders so egui can fetch and decode ROC curves.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            let _ = repaint.set(cc.egui_ctx.clone());

            match offline {
                Some(sections) => state.show_sections(sections),
                None => state.navigate(Page::Main),
            }
            Ok(Box::new(ModelEvalApp::new(state)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("running viewer: {e}"))
}
