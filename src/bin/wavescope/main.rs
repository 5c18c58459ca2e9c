//! wavescope - terminal waveform visualizer
//!
//! Record from the default input device:  cargo run
//! Visualize and scrub a recording:       cargo run -- take.wav

mod app;
mod ui;

use app::App;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let path = std::env::args().nth(1).map(std::path::PathBuf::from);

    let mut terminal = ratatui::init();
    let result = App::new(path).and_then(|mut app| app.run(&mut terminal));
    ratatui::restore();
    result
}
