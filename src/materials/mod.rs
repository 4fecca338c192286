mod asset;

pub use asset::{AssetGraph, MaterialSlot, MeshNode, RegionSummary};

use crate::design::Rgb;
use crate::texture::LabelTexture;
use std::sync::Arc;

const LABEL_KEYWORDS: [&str; 2] = ["text", "label"];
const EXCLUDED_KEYWORDS: [&str; 3] = ["logo", "text", "label"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionClass {
    Label,
    Logo,
    Body,
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    let lowered = haystack.to_lowercase();
    keywords.iter().any(|keyword| lowered.contains(keyword))
}

pub fn is_label_region(mesh_name: &str, material_name: &str) -> bool {
    contains_any(mesh_name, &LABEL_KEYWORDS) || contains_any(material_name, &LABEL_KEYWORDS)
}

pub fn is_excluded_from_recolor(mesh_name: &str, material_name: &str) -> bool {
    contains_any(mesh_name, &EXCLUDED_KEYWORDS) || contains_any(material_name, &EXCLUDED_KEYWORDS)
}

pub fn classify(mesh_name: &str, material_name: &str) -> RegionClass {
    if is_label_region(mesh_name, material_name) {
        RegionClass::Label
    } else if is_excluded_from_recolor(mesh_name, material_name) {
        RegionClass::Logo
    } else {
        RegionClass::Body
    }
}

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Applied { slots: usize },
    /// The model has not finished loading; retry after load completes.
    NotReady,
    /// The model loaded but has no label regions to texture.
    NoLabelRegions,
}

impl RouteOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RouteOutcome::Applied { .. })
    }
}

pub fn apply_body_color(asset: Option<&mut AssetGraph>, color: Rgb) -> RouteOutcome {
    let Some(asset) = asset else {
        log::warn!("[materials] body color {color} requested before the model loaded");
        return RouteOutcome::NotReady;
    };

    let mut touched = 0;
    for node in asset.nodes_mut() {
        let mesh_name = node.name().to_string();
        for slot in node.slots_mut() {
            if is_excluded_from_recolor(&mesh_name, slot.name()) {
                continue;
            }
            slot.set_color(color);
            touched += 1;
        }
    }

    log::debug!("[materials] body color {color} applied to {touched} slot(s)");
    RouteOutcome::Applied { slots: touched }
}

pub fn apply_label_texture(
    asset: Option<&mut AssetGraph>,
    texture: &Arc<LabelTexture>,
) -> RouteOutcome {
    let Some(asset) = asset else {
        log::warn!("[materials] label texture requested before the model loaded");
        return RouteOutcome::NotReady;
    };

    let mut touched = 0;
    for node in asset.nodes_mut() {
        let mesh_name = node.name().to_string();
        for slot in node.slots_mut() {
            if !is_label_region(&mesh_name, slot.name()) {
                continue;
            }
            slot.set_map(Arc::clone(texture));
            touched += 1;
        }
    }

    if touched == 0 {
        log::warn!(
            "[materials] model {:?} has no label regions; label texture not applied",
            asset.source()
        );
        return RouteOutcome::NoLabelRegions;
    }

    log::debug!("[materials] label texture applied to {touched} slot(s)");
    RouteOutcome::Applied { slots: touched }
}
