mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::{config::DEFAULT_LOG_FILTER, load_settings, strings};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::{
    backend_bridge::commands::BackendCommand, controller::events::UiEvent, ui::SurveyApp,
};

#[derive(Debug, Parser)]
#[command(name = "survey_gui", about = "Fill in a survey from an emailed link")]
struct Args {
    /// Survey link, e.g. https://portal.example/survey/abc?token=...
    link: Option<String>,
    /// Overrides the configured API base URL.
    #[arg(long)]
    api_base_url: Option<String>,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    let settings = load_settings().with_api_base_url(args.api_base_url);

    let filter = EnvFilter::try_new(&settings.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(strings::WINDOW_TITLE)
            .with_inner_size([760.0, 820.0])
            .with_min_inner_size([480.0, 420.0]),
        ..Default::default()
    };
    let initial_link = args.link;
    eframe::run_native(
        strings::WINDOW_TITLE,
        options,
        Box::new(move |_cc| Ok(Box::new(SurveyApp::new(cmd_tx, ui_rx, initial_link)))),
    )
}
