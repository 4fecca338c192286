use crate::design::Rgb;
use crate::materials::{AssetGraph, MaterialSlot, MeshNode};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read asset {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode asset {name:?}: {source}")]
    Decode {
        name: String,
        #[source]
        source: gltf::Error,
    },
    #[error("asset {0:?} contains no mesh nodes")]
    Empty(String),
}

/// Where model bytes come from. Fetching is the only await point of a load.
#[allow(async_fn_in_trait)]
pub trait AssetSource {
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<u8>, LoadError>;
}

#[derive(Debug, Clone)]
pub struct BytesSource {
    name: String,
    bytes: Vec<u8>,
}

impl BytesSource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl AssetSource for BytesSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        Ok(self.bytes.clone())
    }
}

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

impl AssetSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        std::fs::read(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Decodes glTF JSON or GLB bytes into the mesh/material graph the router
/// works on. Only names and base colors are read; geometry stays with the
/// backend.
pub fn decode_asset(name: &str, bytes: &[u8]) -> Result<AssetGraph, LoadError> {
    let document = gltf::Gltf::from_slice(bytes).map_err(|source| LoadError::Decode {
        name: name.to_string(),
        source,
    })?;

    let mut nodes = Vec::new();
    for node in document.nodes() {
        let Some(mesh) = node.mesh() else {
            continue;
        };
        let node_name = node
            .name()
            .or_else(|| mesh.name())
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh_{}", mesh.index()));

        let slots = mesh
            .primitives()
            .map(|primitive| {
                let material = primitive.material();
                let slot_name = match (material.name(), material.index()) {
                    (Some(name), _) => name.to_string(),
                    (None, Some(index)) => format!("material_{index}"),
                    (None, None) => "default".to_string(),
                };
                let [r, g, b, _] = material.pbr_metallic_roughness().base_color_factor();
                MaterialSlot::new(slot_name, Rgb::from_unit([r, g, b]))
            })
            .collect();
        nodes.push(MeshNode::new(node_name, slots));
    }

    if nodes.is_empty() {
        return Err(LoadError::Empty(name.to_string()));
    }

    log::info!(
        "[scene] decoded {name:?}: {} mesh node(s), {} material slot(s)",
        nodes.len(),
        nodes.iter().map(|node| node.slots().len()).sum::<usize>()
    );
    Ok(AssetGraph::new(name, nodes))
}

pub async fn load<S: AssetSource>(source: &S) -> Result<AssetGraph, LoadError> {
    let bytes = source.fetch().await?;
    decode_asset(source.name(), &bytes)
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Minimal glTF with a body, a label, a logo and an unnamed mesh node.
    pub const BAG_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "accessors": [
            { "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0, 0, 0], "max": [1, 1, 0] }
        ],
        "materials": [
            { "name": "Foil",
              "pbrMetallicRoughness": { "baseColorFactor": [1, 0, 0, 1] } },
            { "name": "Paper" },
            { "name": "LogoInk" },
            {}
        ],
        "meshes": [
            { "name": "BagMesh", "primitives": [
                { "attributes": { "POSITION": 0 }, "material": 0 },
                { "attributes": { "POSITION": 0 }, "material": 3 } ] },
            { "primitives": [ { "attributes": { "POSITION": 0 }, "material": 1 } ] },
            { "primitives": [ { "attributes": { "POSITION": 0 }, "material": 2 } ] },
            { "primitives": [ { "attributes": { "POSITION": 0 } } ] }
        ],
        "nodes": [
            { "name": "Bag_Body", "mesh": 0 },
            { "name": "Label_Front", "mesh": 1 },
            { "name": "Logo_Primary", "mesh": 2 },
            { "mesh": 3 },
            { "name": "Pivot", "children": [0] }
        ],
        "scenes": [ { "nodes": [4, 1, 2, 3] } ],
        "scene": 0
    }"#;

    pub const NO_MESH_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "nodes": [ { "name": "Empty" } ]
    }"#;
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn decodes_node_and_material_names() {
        let asset = decode_asset("bag.gltf", BAG_GLTF.as_bytes()).expect("decode");
        let names: Vec<&str> = asset.nodes().iter().map(|node| node.name()).collect();
        assert_eq!(names, vec!["Bag_Body", "Label_Front", "Logo_Primary", "mesh_3"]);

        let body = asset.mesh("Bag_Body").unwrap();
        assert_eq!(body.slots()[0].name(), "Foil");
        assert_eq!(body.slots()[0].color(), Rgb::new(0xFF, 0, 0));
        assert_eq!(body.slots()[1].name(), "material_3");
        assert_eq!(asset.mesh("mesh_3").unwrap().slots()[0].name(), "default");

        let summary = asset.validate_regions();
        assert_eq!((summary.label, summary.logo, summary.body), (1, 1, 3));
    }

    #[test]
    fn asset_without_meshes_is_rejected() {
        let err = decode_asset("empty.gltf", NO_MESH_GLTF.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Empty(name) if name == "empty.gltf"));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode_asset("junk", b"not a model").unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
    }

    #[test]
    fn file_source_reports_missing_path() {
        let source = FileSource::new("/definitely/not/here.glb");
        let err = pollster::block_on(load(&source)).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn file_source_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bag.gltf");
        std::fs::write(&path, BAG_GLTF).unwrap();
        let asset = pollster::block_on(load(&FileSource::new(&path))).unwrap();
        assert_eq!(asset.slot_count(), 5);
    }
}
