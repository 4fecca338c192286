use super::font::FontFace;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapSettings {
    pub max_font_size: f32,
    pub min_font_size: f32,
    pub font_step: f32,
    pub max_width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WrappedText {
    pub font_size: f32,
    pub lines: Vec<String>,
    pub line_widths: Vec<f32>,
    /// True only when the minimum size was reached and a single word still
    /// does not fit on its own line.
    pub overflow: bool,
}

impl WrappedText {
    pub fn widest_line(&self) -> f32 {
        self.line_widths.iter().copied().fold(0.0, f32::max)
    }
}

/// Greedy word wrap with font-size backoff.
///
/// Starts at `max_font_size` and steps down by `font_step` whenever some word
/// alone is wider than `max_width`. The last step clamps to `min_font_size`;
/// at that size the wrapping is accepted even if a word overflows.
pub fn wrap_text(text: &str, face: &FontFace, settings: &WrapSettings) -> WrappedText {
    let words: Vec<&str> = text.split(' ').filter(|word| !word.is_empty()).collect();
    let mut font_size = settings.max_font_size.max(settings.min_font_size);

    loop {
        let (lines, line_widths, word_overflow) =
            greedy_lines(&words, face, font_size, settings.max_width);

        if word_overflow && font_size > settings.min_font_size && settings.font_step > 0.0 {
            font_size = (font_size - settings.font_step).max(settings.min_font_size);
            continue;
        }

        return WrappedText {
            font_size,
            lines,
            line_widths,
            overflow: word_overflow,
        };
    }
}

fn greedy_lines(
    words: &[&str],
    face: &FontFace,
    font_size: f32,
    max_width: f32,
) -> (Vec<String>, Vec<f32>, bool) {
    let mut lines = Vec::new();
    let mut widths = Vec::new();
    let mut word_overflow = false;
    let mut current = String::new();
    let mut current_width = 0.0;

    for word in words {
        if face.measure(word, font_size) > max_width {
            word_overflow = true;
        }

        let candidate = if current.is_empty() {
            (*word).to_string()
        } else {
            format!("{current} {word}")
        };
        let candidate_width = face.measure(&candidate, font_size);

        if candidate_width > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            widths.push(current_width);
            current_width = face.measure(word, font_size);
            current.push_str(word);
        } else {
            current = candidate;
            current_width = candidate_width;
        }
    }

    if !current.is_empty() {
        lines.push(current);
        widths.push(current_width);
    }

    (lines, widths, word_overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::FontStyle;
    use proptest::prelude::*;

    fn settings() -> WrapSettings {
        WrapSettings {
            max_font_size: 380.0,
            min_font_size: 150.0,
            font_step: 30.0,
            max_width: 1900.0,
        }
    }

    #[test]
    fn short_names_stay_on_one_line_at_full_size() {
        let face = FontFace::for_style(FontStyle::Bold);
        let wrapped = wrap_text("Lime", &face, &settings());
        assert_eq!(wrapped.font_size, 380.0);
        assert_eq!(wrapped.lines, vec!["Lime".to_string()]);
        assert!(!wrapped.overflow);
    }

    #[test]
    fn repeated_spaces_do_not_create_empty_words() {
        let face = FontFace::for_style(FontStyle::Bold);
        let wrapped = wrap_text("  Honey   Sriracha ", &face, &settings());
        assert!(wrapped.lines.iter().all(|line| !line.contains("  ")));
        assert_eq!(wrapped.lines.join(" "), "Honey Sriracha");
    }

    #[test]
    fn long_word_shrinks_font_before_wrapping() {
        let face = FontFace::for_style(FontStyle::Bold);
        let wrapped = wrap_text("Jalapenolicious", &face, &settings());
        assert!(wrapped.font_size < 380.0);
        assert!(wrapped.widest_line() <= 1900.0);
        assert!(!wrapped.overflow);
    }

    #[test]
    fn minimum_size_accepts_overflowing_word() {
        let face = FontFace::for_style(FontStyle::Retro);
        let word = "W".repeat(40);
        let wrapped = wrap_text(&word, &face, &settings());
        assert_eq!(wrapped.font_size, 150.0);
        assert!(wrapped.overflow);
        assert_eq!(wrapped.lines, vec![word]);
    }

    #[test]
    fn empty_text_produces_no_lines() {
        let face = FontFace::for_style(FontStyle::Modern);
        let wrapped = wrap_text("", &face, &settings());
        assert!(wrapped.lines.is_empty());
        assert_eq!(wrapped.font_size, 380.0);
    }

    proptest! {
        #[test]
        fn lines_fit_unless_escape_hatch(words in proptest::collection::vec("[A-Za-z]{1,24}", 0..8),
                                         style in 0usize..5) {
            let face = FontFace::for_style(FontStyle::ALL[style]);
            let text = words.join(" ");
            let wrapped = wrap_text(&text, &face, &settings());

            prop_assert_eq!(wrapped.lines.join(" "), text);
            if wrapped.overflow {
                prop_assert_eq!(wrapped.font_size, 150.0);
            }
            for (line, width) in wrapped.lines.iter().zip(&wrapped.line_widths) {
                let single_word = !line.contains(' ');
                prop_assert!(*width <= 1900.0 || (wrapped.overflow && single_word),
                    "line {:?} measured {}", line, width);
            }
        }
    }
}
