use flavor_studio::design::{FontStyle, Rgb};
use flavor_studio::texture::{LabelLayout, LabelSynthesizer};

#[test]
fn spicy_mango_dream_wraps_in_white() {
    let synth = LabelSynthesizer::new(LabelLayout::default());
    let label = synth.synthesize("Spicy Mango Dream", Rgb::from_u32(0xDC4419), FontStyle::Bold);

    assert_eq!((label.width(), label.height()), (2048, 1024));
    assert_eq!(label.text_color(), Rgb::WHITE);
    assert!((1..=2).contains(&label.lines().len()), "{:?}", label.lines());
    assert_eq!(label.lines().join(" "), "Spicy Mango Dream");
    assert!(label.wrapped().widest_line() <= 1900.0);
    assert_eq!(label.pixels().len(), 2048 * 1024 * 4);
}

#[test]
fn synthesis_is_deterministic() {
    let synth = LabelSynthesizer::new(LabelLayout::default());
    let a = synth.synthesize("Truffle & Garlic", Rgb::from_u32(0x8B6914), FontStyle::Elegant);
    let b = synth.synthesize("Truffle & Garlic", Rgb::from_u32(0x8B6914), FontStyle::Elegant);
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_eq!(a.pixels(), b.pixels());
}

#[test]
fn every_font_style_renders_ink() {
    let synth = LabelSynthesizer::new(LabelLayout::default());
    let background = Rgb::from_u32(0x003DA5);
    let plain = synth.synthesize("", background, FontStyle::Bold);
    for style in FontStyle::ALL {
        let label = synth.synthesize("Crunch", background, style);
        assert_ne!(label.fingerprint(), plain.fingerprint(), "{style} drew nothing");
    }
}

#[test]
fn label_exports_as_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("label.png");
    let synth = LabelSynthesizer::new(LabelLayout {
        canvas_width: 128,
        canvas_height: 64,
        max_font_size: 24.0,
        min_font_size: 8.0,
        font_step: 4.0,
        max_text_width: 120.0,
        line_spacing: 4.0,
        flip_vertical: false,
    });
    let label = synth.synthesize("Dill", Rgb::from_u32(0x009245), FontStyle::Retro);
    label.save_png(&path).unwrap();

    let decoded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(decoded.as_raw(), label.pixels());
}

#[test]
fn accented_names_keep_their_letters() {
    let synth = LabelSynthesizer::new(LabelLayout::default());
    let background = Rgb::from_u32(0x2E7D32);
    let with_tilde = synth.synthesize("Jalapeño", background, FontStyle::Bold);
    let with_grave = synth.synthesize("Jalapeèo", background, FontStyle::Bold);
    let placeholder = synth.synthesize("Jalape?o", background, FontStyle::Bold);

    assert_ne!(with_tilde.fingerprint(), placeholder.fingerprint());
    assert_ne!(with_grave.fingerprint(), placeholder.fingerprint());
    assert_ne!(with_tilde.fingerprint(), with_grave.fingerprint());
}
