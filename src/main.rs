mod app;
mod audio;
mod config;
mod controller;
mod error;
mod utils;

use app::PlayerApp;
use crate::config::Settings;
use eframe::egui;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), eframe::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folder_player=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load().unwrap_or_else(|err| {
        warn!("{err}; falling back to default settings");
        Settings::default()
    });
    info!(?settings, "Starting music player");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.window.width, settings.window.height]),
        ..Default::default()
    };

    eframe::run_native(
        "Music Player",
        options,
        Box::new(|cc| Ok(Box::new(PlayerApp::new(cc, settings)))),
    )
}
