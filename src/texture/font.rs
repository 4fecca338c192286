use image::{Rgba, RgbaImage};

use crate::design::{FontStyle, Rgb};

pub const GLYPH_COLUMNS: u32 = 5;
pub const GLYPH_ROWS: u32 = 7;

/// Vertical units per em. Glyph rows sit in the middle seven units.
const EM_UNITS: f32 = 10.0;
const SPACE_UNITS: f32 = 3.0;
const TRACKING_UNITS: f32 = 1.0;
const ITALIC_SHEAR: f32 = 0.2;
const BOUNCE_UNITS: f32 = 0.35;
const FIRST_CODEPOINT: u32 = 32;
const FALLBACK_GLYPH: char = '?';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFamily {
    Sans,
    Serif,
    Cursive,
    Monospace,
}

impl FontFamily {
    fn aspect(self) -> f32 {
        match self {
            FontFamily::Sans | FontFamily::Monospace => 0.6,
            FontFamily::Serif => 0.66,
            FontFamily::Cursive => 0.62,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontFace {
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
}

impl FontFace {
    pub fn for_style(style: FontStyle) -> Self {
        match style {
            FontStyle::Bold | FontStyle::Modern => Self::new(FontFamily::Sans, true, false),
            FontStyle::Elegant => Self::new(FontFamily::Serif, true, true),
            FontStyle::Playful => Self::new(FontFamily::Cursive, true, false),
            FontStyle::Retro => Self::new(FontFamily::Monospace, true, false),
        }
    }

    pub const fn new(family: FontFamily, bold: bool, italic: bool) -> Self {
        Self {
            family,
            bold,
            italic,
        }
    }

    fn metrics(&self, size: f32) -> Metrics {
        let row = size / EM_UNITS;
        Metrics {
            row,
            column: row * self.family.aspect(),
            stroke: if self.bold { 2.0 } else { 1.0 },
        }
    }

    fn glyph_units(&self, ch: char) -> f32 {
        if ch == ' ' {
            return if self.family == FontFamily::Monospace {
                GLYPH_COLUMNS as f32 + TRACKING_UNITS
            } else {
                SPACE_UNITS
            };
        }

        let weight = if self.bold { 1.0 } else { 0.0 };
        let ink = match self.family {
            FontFamily::Monospace => GLYPH_COLUMNS,
            _ => glyph(ch).span().map_or(GLYPH_COLUMNS, |(_, width)| width),
        };
        ink as f32 + TRACKING_UNITS + weight
    }

    pub fn measure(&self, text: &str, size: f32) -> f32 {
        let units: f32 = text.chars().map(|ch| self.glyph_units(ch)).sum();
        units * self.metrics(size).column
    }

    /// Draws `text` horizontally centered on `center_x` with its glyph rows
    /// vertically centered on `middle_y`. Pixels falling off the canvas are
    /// clipped.
    pub fn draw_line(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        size: f32,
        center_x: f32,
        middle_y: f32,
        color: Rgb,
    ) {
        let metrics = self.metrics(size);
        let paint = Rgba(color.to_rgba8());
        let mut pen_x = center_x - self.measure(text, size) / 2.0;
        let glyph_top = middle_y - GLYPH_ROWS as f32 * metrics.row / 2.0;

        for (index, ch) in text.chars().enumerate() {
            let advance = self.glyph_units(ch) * metrics.column;
            if ch == ' ' {
                pen_x += advance;
                continue;
            }

            let glyph = glyph(ch);
            let first_column = match self.family {
                FontFamily::Monospace => 0,
                _ => glyph.span().map_or(0, |(first, _)| first),
            };
            let bounce = if self.family == FontFamily::Cursive && index % 2 == 1 {
                BOUNCE_UNITS * metrics.row
            } else {
                0.0
            };

            for (row, row_bits) in glyph.rows() {
                let shear = if self.italic {
                    (GLYPH_ROWS as f32 - 1.0 - row as f32) * metrics.row * ITALIC_SHEAR
                } else {
                    0.0
                };
                let y0 = glyph_top + bounce + row as f32 * metrics.row;

                for column in 0..GLYPH_COLUMNS {
                    if (row_bits >> (GLYPH_COLUMNS - 1 - column)) & 1 == 0 {
                        continue;
                    }
                    let offset = column.saturating_sub(first_column) as f32;
                    let x0 = pen_x + offset * metrics.column + shear;
                    fill_rect(
                        canvas,
                        x0,
                        y0,
                        metrics.column * metrics.stroke,
                        metrics.row,
                        paint,
                    );
                }
            }

            pen_x += advance;
        }
    }
}

struct Metrics {
    row: f32,
    column: f32,
    stroke: f32,
}

fn fill_rect(canvas: &mut RgbaImage, x: f32, y: f32, width: f32, height: f32, paint: Rgba<u8>) {
    let (canvas_width, canvas_height) = canvas.dimensions();
    let x_start = x.round().max(0.0) as u32;
    let y_start = y.round().max(0.0) as u32;
    let x_end = ((x + width).round().max(0.0) as u32).min(canvas_width);
    let y_end = ((y + height).round().max(0.0) as u32).min(canvas_height);

    for py in y_start..y_end {
        for px in x_start..x_end {
            canvas.put_pixel(px, py, paint);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Grave,
    Acute,
    Circumflex,
    Tilde,
    Diaeresis,
    Ring,
    Cedilla,
}

impl Mark {
    fn bits(self) -> [u8; 2] {
        match self {
            Mark::Grave => [0b01000, 0b00100],
            Mark::Acute => [0b00010, 0b00100],
            Mark::Circumflex => [0b00100, 0b01010],
            Mark::Tilde => [0b01101, 0b10110],
            Mark::Diaeresis => [0b00000, 0b01010],
            Mark::Ring => [0b01110, 0b01010],
            Mark::Cedilla => [0b00100, 0b01000],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Glyph {
    body: [u8; GLYPH_ROWS as usize],
    /// Two mark rows starting at this row; negative rows sit above the cell.
    mark: Option<(i32, [u8; 2])>,
}

impl Glyph {
    fn plain(body: [u8; GLYPH_ROWS as usize]) -> Self {
        Self { body, mark: None }
    }

    fn rows(&self) -> impl Iterator<Item = (i32, u8)> + '_ {
        let marks = self
            .mark
            .into_iter()
            .flat_map(|(top, bits)| [(top, bits[0]), (top + 1, bits[1])]);
        (0..)
            .zip(self.body.iter().copied())
            .chain(marks)
            .filter(|(_, bits)| *bits != 0)
    }

    /// First inked column and inked width, or `None` for blank glyphs.
    fn span(&self) -> Option<(u32, u32)> {
        let mask = self.rows().fold(0u8, |acc, (_, bits)| acc | bits);
        let inked = |column: &u32| mask >> (GLYPH_COLUMNS - 1 - column) & 1 == 1;
        let first = (0..GLYPH_COLUMNS).find(inked)?;
        let last = (0..GLYPH_COLUMNS).rev().find(inked)?;
        Some((first, last - first + 1))
    }
}

fn ascii_bits(ch: char) -> Option<[u8; GLYPH_ROWS as usize]> {
    let index = (ch as u32).checked_sub(FIRST_CODEPOINT)?;
    GLYPHS.get(index as usize).copied()
}

fn glyph(ch: char) -> Glyph {
    if let Some(body) = ascii_bits(ch) {
        return Glyph::plain(body);
    }
    if let Some((_, body)) = LATIN1_EXTRA.iter().find(|(extra, _)| *extra == ch) {
        return Glyph::plain(*body);
    }
    let Some((base, mark)) = decompose(ch) else {
        return Glyph::plain(GLYPHS[(FALLBACK_GLYPH as u32 - FIRST_CODEPOINT) as usize]);
    };

    let mut body = ascii_bits(base).unwrap_or_default();
    if base == 'i' {
        body[0] = 0;
    }
    let top = match mark {
        Mark::Cedilla => GLYPH_ROWS as i32,
        // x-height letters leave two blank rows for the mark inside the cell
        _ if body[0] == 0 && body[1] == 0 => 0,
        _ => -3,
    };
    Glyph {
        body,
        mark: Some((top, mark.bits())),
    }
}

/// Latin-1 letters drawn as an ASCII base plus a diacritic.
fn decompose(ch: char) -> Option<(char, Mark)> {
    const VOWEL_MARKS: [Mark; 6] = [
        Mark::Grave,
        Mark::Acute,
        Mark::Circumflex,
        Mark::Tilde,
        Mark::Diaeresis,
        Mark::Ring,
    ];
    const E_MARKS: [Mark; 4] = [Mark::Grave, Mark::Acute, Mark::Circumflex, Mark::Diaeresis];

    let lower = ch.is_lowercase();
    let code = ch as u32;
    let folded = if lower { code.wrapping_sub(0x20) } else { code };
    let (base, mark) = match folded {
        0xC0..=0xC5 => ('A', VOWEL_MARKS[(folded - 0xC0) as usize]),
        0xC7 => ('C', Mark::Cedilla),
        0xC8..=0xCB => ('E', E_MARKS[(folded - 0xC8) as usize]),
        0xCC..=0xCF => ('I', E_MARKS[(folded - 0xCC) as usize]),
        0xD1 => ('N', Mark::Tilde),
        0xD2..=0xD6 => ('O', VOWEL_MARKS[(folded - 0xD2) as usize]),
        0xD9..=0xDC => ('U', E_MARKS[(folded - 0xD9) as usize]),
        0xDD => ('Y', Mark::Acute),
        0xDF if lower => ('Y', Mark::Diaeresis),
        _ => return None,
    };
    if lower {
        Some((base.to_ascii_lowercase(), mark))
    } else {
        Some((base, mark))
    }
}

#[rustfmt::skip]
static LATIN1_EXTRA: [(char, [u8; GLYPH_ROWS as usize]); 11] = [
    ('¡', [0b00100, 0b00000, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
    ('¿', [0b00100, 0b00000, 0b00100, 0b01100, 0b10000, 0b10001, 0b01110]),
    ('Æ', [0b01111, 0b10100, 0b10100, 0b11110, 0b10100, 0b10100, 0b10111]),
    ('Ð', [0b11110, 0b01001, 0b01001, 0b11101, 0b01001, 0b01001, 0b11110]),
    ('Ø', [0b01111, 0b10011, 0b10101, 0b10101, 0b10101, 0b11001, 0b11110]),
    ('Þ', [0b10000, 0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000]),
    ('ß', [0b01110, 0b10001, 0b10001, 0b10110, 0b10001, 0b10001, 0b10110]),
    ('æ', [0b00000, 0b00000, 0b11010, 0b00101, 0b11111, 0b10100, 0b11011]),
    ('ð', [0b01010, 0b00100, 0b01010, 0b00001, 0b01111, 0b10001, 0b01110]),
    ('ø', [0b00000, 0b00000, 0b01111, 0b10011, 0b10101, 0b11001, 0b11110]),
    ('þ', [0b00000, 0b10000, 0b11110, 0b10001, 0b11110, 0b10000, 0b10000]),
];

/// Printable ASCII, one byte per row, most significant of the low five bits
/// is the leftmost column.
#[rustfmt::skip]
static GLYPHS: [[u8; GLYPH_ROWS as usize]; 95] = [
    // ' '  space
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
    // '!'
    [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
    // '"'
    [0b01010, 0b01010, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
    // '#'
    [0b01010, 0b11111, 0b01010, 0b01010, 0b11111, 0b01010, 0b00000],
    // '$'
    [0b00100, 0b01111, 0b10100, 0b01110, 0b00101, 0b11110, 0b00100],
    // '%'
    [0b11001, 0b11010, 0b00100, 0b00100, 0b01011, 0b10011, 0b00000],
    // '&'
    [0b01100, 0b10010, 0b01100, 0b01101, 0b10010, 0b01101, 0b00000],
    // '\''
    [0b00100, 0b00100, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
    // '('
    [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
    // ')'
    [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
    // '*'
    [0b00000, 0b00100, 0b10101, 0b01110, 0b10101, 0b00100, 0b00000],
    // '+'
    [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
    // ','
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00100, 0b01000],
    // '-'
    [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
    // '.'
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00100],
    // '/'
    [0b00001, 0b00010, 0b00010, 0b00100, 0b01000, 0b01000, 0b10000],
    // '0'
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
    // '1'
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    // '2'
    [0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
    // '3'
    [0b01110, 0b10001, 0b00001, 0b00110, 0b00001, 0b10001, 0b01110],
    // '4'
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
    // '5'
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    // '6'
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    // '7'
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
    // '8'
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    // '9'
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
    // ':'
    [0b00000, 0b00000, 0b00100, 0b00000, 0b00000, 0b00100, 0b00000],
    // ';'
    [0b00000, 0b00000, 0b00100, 0b00000, 0b00000, 0b00100, 0b01000],
    // '<'
    [0b00010, 0b00100, 0b01000, 0b10000, 0b01000, 0b00100, 0b00010],
    // '='
    [0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000],
    // '>'
    [0b01000, 0b00100, 0b00010, 0b00001, 0b00010, 0b00100, 0b01000],
    // '?'
    [0b01110, 0b10001, 0b00001, 0b00110, 0b00100, 0b00000, 0b00100],
    // '@'
    [0b01110, 0b10001, 0b10111, 0b10101, 0b10111, 0b10000, 0b01110],
    // 'A'
    [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
    // 'B'
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
    // 'C'
    [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
    // 'D'
    [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
    // 'E'
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
    // 'F'
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
    // 'G'
    [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
    // 'H'
    [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
    // 'I'
    [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    // 'J'
    [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
    // 'K'
    [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
    // 'L'
    [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
    // 'M'
    [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
    // 'N'
    [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
    // 'O'
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
    // 'P'
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
    // 'Q'
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
    // 'R'
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
    // 'S'
    [0b01110, 0b10001, 0b10000, 0b01110, 0b00001, 0b10001, 0b01110],
    // 'T'
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
    // 'U'
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
    // 'V'
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
    // 'W'
    [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
    // 'X'
    [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
    // 'Y'
    [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
    // 'Z'
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
    // '['
    [0b01110, 0b01000, 0b01000, 0b01000, 0b01000, 0b01000, 0b01110],
    // '\\'
    [0b10000, 0b01000, 0b01000, 0b00100, 0b00010, 0b00010, 0b00001],
    // ']'
    [0b01110, 0b00010, 0b00010, 0b00010, 0b00010, 0b00010, 0b01110],
    // '^'
    [0b00100, 0b01010, 0b10001, 0b00000, 0b00000, 0b00000, 0b00000],
    // '_'
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111],
    // '`'
    [0b01000, 0b00100, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
    // 'a'
    [0b00000, 0b00000, 0b01110, 0b00001, 0b01111, 0b10001, 0b01111],
    // 'b'
    [0b10000, 0b10000, 0b11110, 0b10001, 0b10001, 0b10001, 0b11110],
    // 'c'
    [0b00000, 0b00000, 0b01110, 0b10000, 0b10000, 0b10000, 0b01110],
    // 'd'
    [0b00001, 0b00001, 0b01111, 0b10001, 0b10001, 0b10001, 0b01111],
    // 'e'
    [0b00000, 0b00000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110],
    // 'f'
    [0b00110, 0b01001, 0b01000, 0b11110, 0b01000, 0b01000, 0b01000],
    // 'g'
    [0b00000, 0b00000, 0b01111, 0b10001, 0b01111, 0b00001, 0b01110],
    // 'h'
    [0b10000, 0b10000, 0b11110, 0b10001, 0b10001, 0b10001, 0b10001],
    // 'i'
    [0b00100, 0b00000, 0b01100, 0b00100, 0b00100, 0b00100, 0b01110],
    // 'j'
    [0b00010, 0b00000, 0b00110, 0b00010, 0b00010, 0b10010, 0b01100],
    // 'k'
    [0b10000, 0b10000, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010],
    // 'l'
    [0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    // 'm'
    [0b00000, 0b00000, 0b11010, 0b10101, 0b10101, 0b10101, 0b10001],
    // 'n'
    [0b00000, 0b00000, 0b11110, 0b10001, 0b10001, 0b10001, 0b10001],
    // 'o'
    [0b00000, 0b00000, 0b01110, 0b10001, 0b10001, 0b10001, 0b01110],
    // 'p'
    [0b00000, 0b00000, 0b11110, 0b10001, 0b11110, 0b10000, 0b10000],
    // 'q'
    [0b00000, 0b00000, 0b01111, 0b10001, 0b01111, 0b00001, 0b00001],
    // 'r'
    [0b00000, 0b00000, 0b10110, 0b11001, 0b10000, 0b10000, 0b10000],
    // 's'
    [0b00000, 0b00000, 0b01111, 0b10000, 0b01110, 0b00001, 0b11110],
    // 't'
    [0b00100, 0b00100, 0b01110, 0b00100, 0b00100, 0b00100, 0b00011],
    // 'u'
    [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b10001, 0b01111],
    // 'v'
    [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
    // 'w'
    [0b00000, 0b00000, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
    // 'x'
    [0b00000, 0b00000, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001],
    // 'y'
    [0b00000, 0b00000, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110],
    // 'z'
    [0b00000, 0b00000, 0b11111, 0b00010, 0b00100, 0b01000, 0b11111],
    // '{'
    [0b00011, 0b00100, 0b00100, 0b01000, 0b00100, 0b00100, 0b00011],
    // '|'
    [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
    // '}'
    [0b11000, 0b00100, 0b00100, 0b00010, 0b00100, 0b00100, 0b11000],
    // '~'
    [0b00000, 0b00000, 0b01000, 0b10101, 0b00010, 0b00000, 0b00000],];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_style_maps_to_a_bold_face() {
        for style in FontStyle::ALL {
            assert!(FontFace::for_style(style).bold, "{style}");
        }
        assert!(FontFace::for_style(FontStyle::Elegant).italic);
        assert_eq!(
            FontFace::for_style(FontStyle::Retro).family,
            FontFamily::Monospace
        );
    }

    #[test]
    fn proportional_faces_trim_narrow_glyphs() {
        let sans = FontFace::new(FontFamily::Sans, false, false);
        let mono = FontFace::new(FontFamily::Monospace, false, false);
        assert!(sans.measure("i", 100.0) < sans.measure("M", 100.0));
        assert_eq!(mono.measure("i", 100.0), mono.measure("M", 100.0));
    }

    #[test]
    fn measurement_scales_linearly_with_size() {
        let face = FontFace::for_style(FontStyle::Bold);
        let small = face.measure("Spicy Mango", 100.0);
        let large = face.measure("Spicy Mango", 300.0);
        assert!((large - small * 3.0).abs() < 1e-3);
    }

    #[test]
    fn unknown_characters_use_the_fallback_glyph() {
        assert_eq!(glyph('€'), glyph('?'));
        assert_eq!(glyph('\u{7f}'), glyph('?'));
    }

    #[test]
    fn latin1_letters_get_their_own_glyphs() {
        for ch in "ÀÁÂÃÄÅÇÈÉÊËÌÍÎÏÑÒÓÔÕÖÙÚÛÜÝàáâãäåçèéêëìíîïñòóôõöùúûüýÿ¡¿ÆÐØÞßæðøþ".chars() {
            assert_ne!(glyph(ch), glyph('?'), "{ch}");
        }
        assert_eq!(glyph('ñ').body, glyph('n').body);
        assert_ne!(glyph('ñ'), glyph('n'));
        assert_ne!(glyph('è'), glyph('é'));
        assert_eq!(decompose('Ö'), Some(('O', Mark::Diaeresis)));
        assert_eq!(decompose('ÿ'), Some(('y', Mark::Diaeresis)));
        assert_eq!(decompose('×'), None);
    }

    #[test]
    fn marks_clear_the_letter_they_sit_on() {
        let (top, _) = glyph('É').mark.unwrap();
        assert!(top + 2 <= 0);
        let (top, _) = glyph('ç').mark.unwrap();
        assert_eq!(top, GLYPH_ROWS as i32);
        // dotless base, mark inside the cell
        let i = glyph('í');
        assert_eq!(i.body[0], 0);
        assert_eq!(i.mark.unwrap().0, 0);
    }

    #[test]
    fn drawing_stays_inside_the_measured_box() {
        let face = FontFace::for_style(FontStyle::Bold);
        let mut canvas = RgbaImage::from_pixel(400, 100, Rgba([0, 0, 0, 255]));
        let width = face.measure("HI", 50.0);
        face.draw_line(&mut canvas, "HI", 50.0, 200.0, 50.0, Rgb::WHITE);

        let lit: Vec<u32> = canvas
            .enumerate_pixels()
            .filter(|(_, _, px)| px.0[0] == 255)
            .map(|(x, _, _)| x)
            .collect();
        assert!(!lit.is_empty());
        let left = (200.0 - width / 2.0).floor() as u32;
        let right = (200.0 + width / 2.0).ceil() as u32;
        assert!(lit.iter().all(|x| (left..=right).contains(x)));
    }
}
