use crate::design::Rgb;
use crate::texture::LabelTexture;
use std::sync::Arc;

use super::{RegionClass, classify};

/// One material slot on a mesh. Slots are instanced per mesh, so editing one
/// never leaks into another mesh that shared the authored material.
#[derive(Debug, Clone)]
pub struct MaterialSlot {
    name: String,
    color: Rgb,
    map: Option<Arc<LabelTexture>>,
    needs_update: bool,
    version: u64,
}

impl MaterialSlot {
    pub fn new(name: impl Into<String>, color: Rgb) -> Self {
        Self {
            name: name.into(),
            color,
            map: None,
            needs_update: false,
            version: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn map(&self) -> Option<&Arc<LabelTexture>> {
        self.map.as_ref()
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn set_color(&mut self, color: Rgb) {
        if self.color != color {
            self.color = color;
            self.version += 1;
        }
    }

    pub(crate) fn set_map(&mut self, texture: Arc<LabelTexture>) {
        self.map = Some(texture);
        self.needs_update = true;
        self.version += 1;
    }

    pub fn mark_uploaded(&mut self) {
        self.needs_update = false;
    }
}

#[derive(Debug, Clone)]
pub struct MeshNode {
    name: String,
    slots: Vec<MaterialSlot>,
}

impl MeshNode {
    pub fn new(name: impl Into<String>, slots: Vec<MaterialSlot>) -> Self {
        Self {
            name: name.into(),
            slots,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slots(&self) -> &[MaterialSlot] {
        &self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [MaterialSlot] {
        &mut self.slots
    }

    pub fn slot(&self, name: &str) -> Option<&MaterialSlot> {
        self.slots.iter().find(|slot| slot.name == name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionSummary {
    pub label: usize,
    pub logo: usize,
    pub body: usize,
}

#[derive(Debug, Clone)]
pub struct AssetGraph {
    source: String,
    nodes: Vec<MeshNode>,
}

impl AssetGraph {
    pub fn new(source: impl Into<String>, nodes: Vec<MeshNode>) -> Self {
        Self {
            source: source.into(),
            nodes,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn nodes(&self) -> &[MeshNode] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [MeshNode] {
        &mut self.nodes
    }

    pub fn mesh(&self, name: &str) -> Option<&MeshNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    pub fn slot_count(&self) -> usize {
        self.nodes.iter().map(|node| node.slots.len()).sum()
    }

    /// Counts slots per region so an asset without label geometry can be
    /// flagged when it loads.
    pub fn validate_regions(&self) -> RegionSummary {
        let mut summary = RegionSummary::default();
        for node in &self.nodes {
            for slot in &node.slots {
                match classify(&node.name, &slot.name) {
                    RegionClass::Label => summary.label += 1,
                    RegionClass::Logo => summary.logo += 1,
                    RegionClass::Body => summary.body += 1,
                }
            }
        }
        summary
    }

    pub fn pending_uploads(&self) -> impl Iterator<Item = (&MeshNode, &MaterialSlot)> {
        self.nodes.iter().flat_map(|node| {
            node.slots
                .iter()
                .filter(|slot| slot.needs_update)
                .map(move |slot| (node, slot))
        })
    }

    pub fn mark_all_uploaded(&mut self) {
        for node in &mut self.nodes {
            for slot in &mut node.slots {
                slot.mark_uploaded();
            }
        }
    }
}
