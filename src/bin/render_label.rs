use flavor_studio::design::{FontStyle, Rgb};
use flavor_studio::texture::{LabelLayout, LabelSynthesizer};
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(err) = run() {
        eprintln!("[label] error: {err}");
        std::process::exit(1);
    }
}

/// `render_label <name> [#RRGGBB] [font] [output.png]`
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let name = args.next().unwrap_or_else(|| "My Flavor".to_string());
    let color = match args.next() {
        Some(hex) => Rgb::parse_hex(&hex)?,
        None => Rgb::from_u32(0xFFCC00),
    };
    let font = args
        .next()
        .map(|raw| FontStyle::from_name(&raw))
        .unwrap_or_default();
    let output_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("label.png"));

    let label = LabelSynthesizer::new(LabelLayout::default()).synthesize(&name, color, font);
    label.save_png(&output_path)?;
    println!(
        "[label] wrote {}x{} label ({} line(s) at {}px, {} text) to {}",
        label.width(),
        label.height(),
        label.lines().len(),
        label.font_size(),
        label.text_color(),
        output_path.display()
    );
    Ok(())
}
