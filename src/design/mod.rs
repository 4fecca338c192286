pub mod color;

pub use color::{Rgb, contrast_text_color, lighten_background};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const MAX_FLAVOR_NOTES: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DesignError {
    #[error("invalid hex color: {0:?}")]
    InvalidColor(String),
    #[error("a design holds at most {max} flavor notes")]
    ValidationLimit { max: usize },
    #[error("flavor note {0:?} is already selected")]
    DuplicateNote(String),
    #[error("flavor notes cannot be empty")]
    EmptyNote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum FontStyle {
    #[default]
    Bold,
    Elegant,
    Modern,
    Playful,
    Retro,
}

impl FontStyle {
    pub const ALL: [FontStyle; 5] = [
        FontStyle::Bold,
        FontStyle::Elegant,
        FontStyle::Modern,
        FontStyle::Playful,
        FontStyle::Retro,
    ];

    /// Case-insensitive lookup; unknown names fall back to [`FontStyle::Bold`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "elegant" => FontStyle::Elegant,
            "modern" => FontStyle::Modern,
            "playful" => FontStyle::Playful,
            "retro" => FontStyle::Retro,
            _ => FontStyle::Bold,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FontStyle::Bold => "bold",
            FontStyle::Elegant => "elegant",
            FontStyle::Modern => "modern",
            FontStyle::Playful => "playful",
            FontStyle::Retro => "retro",
        }
    }
}

impl From<String> for FontStyle {
    fn from(value: String) -> Self {
        FontStyle::from_name(&value)
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FlavorNotes {
    notes: Vec<String>,
}

impl FlavorNotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejected additions leave the set exactly as it was.
    pub fn add(&mut self, note: impl Into<String>) -> Result<(), DesignError> {
        let note = note.into().trim().to_string();
        if note.is_empty() {
            return Err(DesignError::EmptyNote);
        }
        if self.contains(&note) {
            return Err(DesignError::DuplicateNote(note));
        }
        if self.notes.len() >= MAX_FLAVOR_NOTES {
            return Err(DesignError::ValidationLimit {
                max: MAX_FLAVOR_NOTES,
            });
        }
        self.notes.push(note);
        Ok(())
    }

    pub fn remove(&mut self, note: &str) -> bool {
        let before = self.notes.len();
        self.notes.retain(|existing| !existing.eq_ignore_ascii_case(note));
        before != self.notes.len()
    }

    pub fn contains(&self, note: &str) -> bool {
        self.notes
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(note))
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.notes.len() >= MAX_FLAVOR_NOTES
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.notes.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.notes
    }
}

impl TryFrom<Vec<String>> for FlavorNotes {
    type Error = DesignError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        let mut notes = FlavorNotes::new();
        for note in value {
            notes.add(note)?;
        }
        Ok(notes)
    }
}

impl From<FlavorNotes> for Vec<String> {
    fn from(value: FlavorNotes) -> Self {
        value.notes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignConfig {
    pub name: String,
    pub bag_color: Rgb,
    pub font_style: FontStyle,
    pub flavor_notes: FlavorNotes,
    #[serde(skip)]
    pub image_upload: Option<Vec<u8>>,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            name: "My Flavor".to_string(),
            bag_color: Rgb::from_u32(0xFFCC00),
            font_style: FontStyle::Bold,
            flavor_notes: FlavorNotes::new(),
            image_upload: None,
        }
    }
}

impl DesignConfig {
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_bag_color_hex(&mut self, hex: &str) -> Result<(), DesignError> {
        self.bag_color = Rgb::parse_hex(hex)?;
        Ok(())
    }

    pub fn set_font_style(&mut self, style: FontStyle) {
        self.font_style = style;
    }

    pub fn add_flavor_note(&mut self, note: impl Into<String>) -> Result<(), DesignError> {
        self.flavor_notes.add(note)
    }

    pub fn remove_flavor_note(&mut self, note: &str) -> bool {
        self.flavor_notes.remove(note)
    }

    pub fn label_key(&self) -> LabelKey {
        LabelKey {
            text: self.name.clone(),
            background: self.bag_color,
            font: self.font_style,
        }
    }

    pub fn delta_from(&self, previous: &DesignConfig) -> DesignDelta {
        let color = self.bag_color != previous.bag_color;
        DesignDelta {
            body_color: color,
            background: color,
            label: color || self.name != previous.name || self.font_style != previous.font_style,
        }
    }

    pub fn to_submission(&self) -> SubmissionPayload {
        SubmissionPayload {
            flavor_name: self.name.clone(),
            bag_color: self.bag_color,
            font_choice: self.font_style,
            key_flavors: self.flavor_notes.as_slice().to_vec(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelKey {
    pub text: String,
    pub background: Rgb,
    pub font: FontStyle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DesignDelta {
    pub body_color: bool,
    pub background: bool,
    pub label: bool,
}

impl DesignDelta {
    pub const ALL: DesignDelta = DesignDelta {
        body_color: true,
        background: true,
        label: true,
    };

    pub fn is_empty(&self) -> bool {
        !(self.body_color || self.background || self.label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub flavor_name: String,
    pub bag_color: Rgb,
    pub font_choice: FontStyle,
    pub key_flavors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_notes() -> DesignConfig {
        let mut design = DesignConfig::default();
        for note in ["Smoked Paprika", "BBQ", "Savory"] {
            design.add_flavor_note(note).unwrap();
        }
        design
    }

    #[test]
    fn fourth_note_is_rejected_without_side_effects() {
        let mut design = three_notes();
        let err = design.add_flavor_note("Honey").unwrap_err();

        assert_eq!(err, DesignError::ValidationLimit { max: 3 });
        assert_eq!(
            design.flavor_notes.as_slice(),
            ["Smoked Paprika", "BBQ", "Savory"]
        );
    }

    #[test]
    fn duplicate_and_blank_notes_are_rejected() {
        let mut notes = FlavorNotes::new();
        notes.add("Lime").unwrap();
        assert_eq!(
            notes.add("lime"),
            Err(DesignError::DuplicateNote("lime".into()))
        );
        assert_eq!(notes.add("   "), Err(DesignError::EmptyNote));
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn removing_frees_a_slot() {
        let mut design = three_notes();
        assert!(design.remove_flavor_note("bbq"));
        assert!(!design.remove_flavor_note("bbq"));
        design.add_flavor_note("Chili").unwrap();
        assert_eq!(
            design.flavor_notes.as_slice(),
            ["Smoked Paprika", "Savory", "Chili"]
        );
    }

    #[test]
    fn deserializing_too_many_notes_fails() {
        let json = r##"{"name":"x","bagColor":"#000000","fontStyle":"retro",
            "flavorNotes":["a","b","c","d"]}"##;
        assert!(serde_json::from_str::<DesignConfig>(json).is_err());
    }

    #[test]
    fn unknown_font_names_fall_back_to_bold() {
        assert_eq!(FontStyle::from_name("Elegant"), FontStyle::Elegant);
        assert_eq!(FontStyle::from_name("gothic"), FontStyle::Bold);
        assert_eq!(FontStyle::from_name(""), FontStyle::Bold);
        let parsed: FontStyle = serde_json::from_str("\"script\"").unwrap();
        assert_eq!(parsed, FontStyle::Bold);
    }

    #[test]
    fn delta_tracks_visual_fields_only() {
        let base = three_notes();

        let mut renamed = base.clone();
        renamed.set_name("Spicy Mango Dream");
        assert_eq!(
            renamed.delta_from(&base),
            DesignDelta {
                body_color: false,
                background: false,
                label: true
            }
        );

        let mut recolored = base.clone();
        recolored.set_bag_color_hex("#2FBF71").unwrap();
        assert_eq!(recolored.delta_from(&base), DesignDelta::ALL);

        let mut tagged = base.clone();
        tagged.remove_flavor_note("BBQ");
        assert!(tagged.delta_from(&base).is_empty());
    }

    #[test]
    fn submission_payload_uses_wire_names() {
        let mut design = three_notes();
        design.set_name("Smoky BBQ Delight");
        design.set_bag_color_hex("#DC4419").unwrap();

        let value = serde_json::to_value(design.to_submission()).unwrap();
        assert_eq!(value["flavorName"], "Smoky BBQ Delight");
        assert_eq!(value["bagColor"], "#DC4419");
        assert_eq!(value["fontChoice"], "bold");
        assert_eq!(value["keyFlavors"][2], "Savory");
    }
}
