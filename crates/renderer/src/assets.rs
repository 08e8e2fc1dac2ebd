//! Asset loading: glTF models and image textures.

use std::path::Path;

use thiserror::Error;

use crate::mesh::MeshData;
use crate::vertex::Vertex;

pub use image::RgbaImage;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to load glTF: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
    #[error("glTF file contains no mesh geometry")]
    EmptyModel,
}

/// Load all mesh primitives from a glTF file into a single [`MeshData`].
///
/// Node transforms are not applied; models are expected to be exported with
/// geometry baked into a single object at the origin.
pub fn load_model(path: &Path) -> Result<MeshData, AssetError> {
    let (document, buffers, _images) = gltf::import(path)?;
    let mut data = MeshData::default();
    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|b| &b.0[..]));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();
            let normals: Vec<[f32; 3]> = match reader.read_normals() {
                Some(normals) => normals.collect(),
                None => vec![[0.0, 1.0, 0.0]; positions.len()],
            };
            let tex_coords: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
                Some(uvs) => uvs.into_f32().collect(),
                None => vec![[0.0, 0.0]; positions.len()],
            };
            let base = data.vertices.len() as u32;
            for i in 0..positions.len() {
                data.vertices.push(Vertex::new(
                    positions[i],
                    normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                    tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
                ));
            }
            match reader.read_indices() {
                Some(indices) => data.indices.extend(indices.into_u32().map(|i| i + base)),
                None => data.indices.extend(base..base + positions.len() as u32),
            }
        }
    }
    if data.is_empty() {
        return Err(AssetError::EmptyModel);
    }
    log::debug!(
        "loaded model {:?}: {} vertices, {} indices",
        path,
        data.vertices.len(),
        data.indices.len()
    );
    Ok(data)
}

/// Load an image file and convert it to RGBA8.
pub fn load_texture_image(path: &Path) -> Result<RgbaImage, AssetError> {
    let image = image::open(path)?;
    Ok(image.to_rgba8())
}
