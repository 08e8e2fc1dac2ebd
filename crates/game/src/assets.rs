//! Background asset loading.
//!
//! A loader thread reads the plane model and the sky/cloud textures from
//! disk and sends each one over a channel as soon as it is ready. The frame
//! loop drains the channel and uploads to the GPU; until then the game runs
//! with fallbacks (a box for the plane, no sky dome, no clouds). A failed
//! load is logged and the feature simply stays absent.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use renderer::{load_model, load_texture_image, MeshData, RgbaImage};

/// One finished asset, sent from the loader thread.
pub enum AssetEvent {
    PlaneModel(MeshData),
    SkyTexture(RgbaImage),
    CloudTexture(RgbaImage),
}

pub const PLANE_MODEL_PATH: &str = "planes/airplane.gltf";
pub const SKY_TEXTURE_PATH: &str = "images/stars.png";
pub const CLOUD_TEXTURE_PATH: &str = "images/clouds.png";

/// Start the loader thread. Each asset loads and reports independently.
pub fn spawn_loader(assets_dir: PathBuf) -> Receiver<AssetEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        match load_model(&assets_dir.join(PLANE_MODEL_PATH)) {
            Ok(mesh) => {
                if tx.send(AssetEvent::PlaneModel(mesh)).is_err() {
                    return;
                }
            }
            Err(e) => log::error!("plane model unavailable, using fallback box: {e}"),
        }
        match load_texture_image(&assets_dir.join(SKY_TEXTURE_PATH)) {
            Ok(image) => {
                if tx.send(AssetEvent::SkyTexture(image)).is_err() {
                    return;
                }
            }
            Err(e) => log::error!("sky texture unavailable, night sky stays bare: {e}"),
        }
        match load_texture_image(&assets_dir.join(CLOUD_TEXTURE_PATH)) {
            Ok(image) => {
                let _ = tx.send(AssetEvent::CloudTexture(image));
            }
            Err(e) => log::error!("cloud texture unavailable, skipping clouds: {e}"),
        }
    });
    rx
}
