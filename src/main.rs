pub mod config;
pub mod controller;
pub mod mapping;
pub mod osk;
pub mod ui;

use crate::config::BridgeConfig;
use crate::controller::controller_handle::ControllerHandle;
use crate::mapping::injector::EguiInjector;
use crate::ui::PageUI;
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use eframe::egui;
use std::path::PathBuf;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Gamepad to keyboard bridge with an on-screen keyboard
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path of the config file (default: <config dir>/padbridge/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start the window fullscreen
    #[arg(short, long)]
    fullscreen: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup(args.verbose)?;

    let config_path = args.config.clone().unwrap_or_else(BridgeConfig::default_path);
    let config = BridgeConfig::load(&config_path)
        .await
        .map_err(|e| eyre!("Failed to load config: {}", e))?;
    debug!("Effective config: {:?}", config);

    // Injected key events and OSK toggles, controller task → UI
    let (page_tx, page_rx) = mpsc::channel(1000);
    // Window focus, UI → controller task
    let (focus_tx, focus_rx) = watch::channel(true);

    let injector = EguiInjector::new(page_tx);
    let controller_handle = ControllerHandle::spawn(
        config.controller_settings(),
        config.key_map(),
        focus_rx,
        injector.clone(),
        injector,
    )
    .map_err(|e| eyre!("Failed to spawn controller: {}", e))?;

    info!("Starting UI");
    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = egui::ViewportBuilder::default()
        .with_title("padbridge")
        .with_fullscreen(args.fullscreen || config.window.fullscreen);

    let allow_exit = config.osk.allow_exit;
    let ui_result = eframe::run_native(
        "padbridge",
        native_options,
        Box::new(move |cc| Ok(Box::new(PageUI::new(cc, page_rx, focus_tx, allow_exit)))),
    );

    if let Err(e) = controller_handle.stop().await {
        error!("Controller did not shut down cleanly: {}", e);
    }

    ui_result.map_err(|e| eyre!("UI terminated with error: {}", e))
}

fn setup(verbose: bool) -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env(if verbose { Level::DEBUG } else { Level::INFO });
    Ok(())
}

fn setup_logging_env(level: Level) {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
