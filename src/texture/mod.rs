pub mod font;
pub mod wrap;

pub use font::{FontFace, FontFamily};
pub use wrap::{WrapSettings, WrappedText, wrap_text};

use crate::design::{FontStyle, LabelKey, Rgb, contrast_text_color};
use image::{RgbaImage, imageops};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher24;
use std::hash::Hasher;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to encode label image: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub max_font_size: f32,
    pub min_font_size: f32,
    pub font_step: f32,
    pub max_text_width: f32,
    /// Added to the font size to get the line pitch.
    pub line_spacing: f32,
    /// Flip rows so row 0 is the bottom of the label.
    pub flip_vertical: bool,
}

impl Default for LabelLayout {
    fn default() -> Self {
        Self {
            canvas_width: 2048,
            canvas_height: 1024,
            max_font_size: 380.0,
            min_font_size: 150.0,
            font_step: 30.0,
            max_text_width: 1900.0,
            line_spacing: 50.0,
            flip_vertical: false,
        }
    }
}

impl LabelLayout {
    pub fn wrap_settings(&self) -> WrapSettings {
        WrapSettings {
            max_font_size: self.max_font_size,
            min_font_size: self.min_font_size,
            font_step: self.font_step,
            max_width: self.max_text_width,
        }
    }
}

#[derive(Debug)]
pub struct LabelTexture {
    image: RgbaImage,
    background: Rgb,
    text_color: Rgb,
    font: FontStyle,
    wrapped: WrappedText,
    fingerprint: u64,
}

impl LabelTexture {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn text_color(&self) -> Rgb {
        self.text_color
    }

    pub fn font(&self) -> FontStyle {
        self.font
    }

    pub fn font_size(&self) -> f32 {
        self.wrapped.font_size
    }

    pub fn lines(&self) -> &[String] {
        &self.wrapped.lines
    }

    pub fn wrapped(&self) -> &WrappedText {
        &self.wrapped
    }

    /// SipHash of the pixel data; equal fingerprints mean equal rasters.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn save_png(&self, path: &Path) -> Result<(), TextureError> {
        self.image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LabelSynthesizer {
    layout: LabelLayout,
}

impl LabelSynthesizer {
    pub fn new(layout: LabelLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &LabelLayout {
        &self.layout
    }

    pub fn synthesize(&self, text: &str, background: Rgb, font: FontStyle) -> LabelTexture {
        let layout = &self.layout;
        let width = layout.canvas_width.max(1);
        let height = layout.canvas_height.max(1);

        let mut image = RgbaImage::new(width, height);
        let fill = background.to_rgba8();
        image
            .par_chunks_exact_mut(4)
            .for_each(|pixel| pixel.copy_from_slice(&fill));

        let text_color = contrast_text_color(background);
        let face = FontFace::for_style(font);
        let wrapped = wrap_text(text, &face, &layout.wrap_settings());

        let line_height = wrapped.font_size + layout.line_spacing;
        let block_height = line_height * wrapped.lines.len() as f32;
        let first_middle = (height as f32 - block_height) / 2.0 + line_height / 2.0;
        let center_x = width as f32 / 2.0;

        for (index, line) in wrapped.lines.iter().enumerate() {
            let middle_y = first_middle + index as f32 * line_height;
            face.draw_line(
                &mut image,
                line,
                wrapped.font_size,
                center_x,
                middle_y,
                text_color,
            );
        }

        if layout.flip_vertical {
            imageops::flip_vertical_in_place(&mut image);
        }

        let fingerprint = fingerprint_pixels(image.as_raw());
        log::debug!(
            "[texture] synthesized {}x{} label: {} line(s) at {}px, {} text",
            width,
            height,
            wrapped.lines.len(),
            wrapped.font_size,
            text_color
        );

        LabelTexture {
            image,
            background,
            text_color,
            font,
            wrapped,
            fingerprint,
        }
    }
}

fn fingerprint_pixels(bytes: &[u8]) -> u64 {
    let mut hasher = SipHasher24::new_with_keys(FINGERPRINT_KEY_0, FINGERPRINT_KEY_1);
    hasher.write(bytes);
    hasher.finish()
}

const FINGERPRINT_KEY_0: u64 = 0x6c61_6265_6c5f_7478;
const FINGERPRINT_KEY_1: u64 = 0x0f1a_b0c5_7ac0_5eed;

/// Remembers the texture for the most recent input tuple only. A different
/// tuple drops the previous texture.
#[derive(Debug, Default)]
pub struct LabelCache {
    synthesizer: LabelSynthesizer,
    current: Option<(LabelKey, Arc<LabelTexture>)>,
    hits: u64,
    misses: u64,
}

impl LabelCache {
    pub fn new(synthesizer: LabelSynthesizer) -> Self {
        Self {
            synthesizer,
            current: None,
            hits: 0,
            misses: 0,
        }
    }

    pub fn get_or_synthesize(&mut self, key: &LabelKey) -> Arc<LabelTexture> {
        if let Some((cached_key, texture)) = &self.current {
            if cached_key == key {
                self.hits += 1;
                return Arc::clone(texture);
            }
        }

        self.misses += 1;
        let texture = Arc::new(
            self.synthesizer
                .synthesize(&key.text, key.background, key.font),
        );
        self.current = Some((key.clone(), Arc::clone(&texture)));
        texture
    }

    pub fn current(&self) -> Option<&Arc<LabelTexture>> {
        self.current.as_ref().map(|(_, texture)| texture)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_layout() -> LabelLayout {
        LabelLayout {
            canvas_width: 512,
            canvas_height: 256,
            max_font_size: 95.0,
            min_font_size: 40.0,
            font_step: 10.0,
            max_text_width: 475.0,
            line_spacing: 12.0,
            flip_vertical: false,
        }
    }

    #[test]
    fn empty_text_is_a_plain_background() {
        let synth = LabelSynthesizer::new(small_layout());
        let label = synth.synthesize("", Rgb::from_u32(0x2FBF71), FontStyle::Modern);
        assert!(label.lines().is_empty());
        assert!(
            label
                .image()
                .pixels()
                .all(|px| px.0 == [0x2F, 0xBF, 0x71, 0xFF])
        );
    }

    #[test]
    fn light_backgrounds_get_black_text() {
        let synth = LabelSynthesizer::new(small_layout());
        let label = synth.synthesize("Lime", Rgb::from_u32(0xFFFFAA), FontStyle::Retro);
        assert_eq!(label.text_color(), Rgb::BLACK);
        assert!(label.image().pixels().any(|px| px.0 == [0, 0, 0, 0xFF]));
    }

    #[test]
    fn flip_mirrors_rows() {
        let upright = LabelSynthesizer::new(small_layout());
        let flipped = LabelSynthesizer::new(LabelLayout {
            flip_vertical: true,
            ..small_layout()
        });
        let color = Rgb::from_u32(0x8B6914);
        let a = upright.synthesize("Truffle", color, FontStyle::Elegant);
        let b = flipped.synthesize("Truffle", color, FontStyle::Elegant);

        let mut mirrored = a.image().clone();
        imageops::flip_vertical_in_place(&mut mirrored);
        assert_eq!(mirrored.as_raw(), b.image().as_raw());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn text_block_is_vertically_centered() {
        let synth = LabelSynthesizer::new(small_layout());
        let label = synth.synthesize("HH", Rgb::BLACK, FontStyle::Bold);
        let rows: Vec<u32> = label
            .image()
            .enumerate_pixels()
            .filter(|(_, _, px)| px.0 == [0xFF, 0xFF, 0xFF, 0xFF])
            .map(|(_, y, _)| y)
            .collect();
        let top = *rows.iter().min().unwrap() as i64;
        let bottom = *rows.iter().max().unwrap() as i64;
        assert!((top - (255 - bottom)).abs() <= 2, "top {top} bottom {bottom}");
    }

    #[test]
    fn cache_reuses_exact_tuple_and_drops_superseded() {
        let mut cache = LabelCache::new(LabelSynthesizer::new(small_layout()));
        let key = LabelKey {
            text: "Dill".into(),
            background: Rgb::from_u32(0x009245),
            font: FontStyle::Retro,
        };

        let first = cache.get_or_synthesize(&key);
        let again = cache.get_or_synthesize(&key);
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!((cache.hits(), cache.misses()), (1, 1));

        let other = LabelKey {
            font: FontStyle::Playful,
            ..key.clone()
        };
        let replaced = cache.get_or_synthesize(&other);
        assert!(!Arc::ptr_eq(&first, &replaced));
        assert_eq!(Arc::strong_count(&first), 2);
        drop(again);
        assert_eq!(Arc::strong_count(&first), 1);
    }
}
