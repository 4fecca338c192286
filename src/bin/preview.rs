use flavor_studio::config::StudioConfig;
use flavor_studio::design::DesignConfig;
use flavor_studio::render::window::{PreviewOptions, WindowConfig, run_preview};
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(err) = run() {
        eprintln!("[preview] error: {err}");
        std::process::exit(1);
    }
}

/// `preview [studio.json] [design.json]`
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let studio = match args.next() {
        Some(path) => StudioConfig::load(&PathBuf::from(path))?,
        None => StudioConfig::default(),
    };
    let design = match args.next() {
        Some(path) => serde_json::from_str::<DesignConfig>(&std::fs::read_to_string(path)?)?,
        None => DesignConfig::default(),
    };

    run_preview(PreviewOptions {
        window: WindowConfig::default(),
        asset_path: studio.asset_path.clone(),
        studio,
        design,
    })?;
    Ok(())
}
