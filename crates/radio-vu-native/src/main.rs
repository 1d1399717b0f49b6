mod app;
mod painter;
mod preview;

use eframe::NativeOptions;

use crate::app::RadioPreviewApp;

fn main() -> eframe::Result<()> {
    radio_vu::logging::init(log::LevelFilter::Info);
    let native_options = NativeOptions::default();
    eframe::run_native(
        "radio-vu preview",
        native_options,
        Box::new(|cc| Ok(Box::new(RadioPreviewApp::new(cc)))),
    )
}
