use std::collections::BTreeMap;

use egui::{ColorImage, TextureId};
use log::debug;
use parking_lot::RwLock;

use crate::error::CanvasError;
use crate::render::TextureLoader;

/// One registered texture: the encoded bytes it was loaded from (kept for
/// persistence) and the backend handle once it has been uploaded.
#[derive(Debug, Clone)]
struct TextureEntry {
    bytes: Option<Vec<u8>>,
    id: Option<TextureId>,
}

/// Name-keyed texture registry.
///
/// This is the only piece of canvas state that may legitimately be touched
/// from outside the owning thread (e.g. a background decode task handing over
/// bytes), so it sits behind a lock. Everything else in the canvas is
/// single-threaded by design and stays lock-free.
#[derive(Debug, Default)]
pub struct TextureManager {
    entries: RwLock<BTreeMap<String, TextureEntry>>,
}

impl TextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `bytes` and uploads the image through `loader`, registering
    /// the handle under `name`. Re-registering a name replaces the texture.
    pub fn register(
        &self,
        name: &str,
        bytes: Vec<u8>,
        loader: &mut dyn TextureLoader,
    ) -> Result<(), CanvasError> {
        let image = decode(&bytes)?;
        let id = loader.load_texture(name, &image);
        debug!("registered texture {name:?} ({}x{})", image.size[0], image.size[1]);
        self.entries.write().insert(
            name.to_string(),
            TextureEntry {
                bytes: Some(bytes),
                id: Some(id),
            },
        );
        Ok(())
    }

    /// Registers raw persisted bytes without uploading. A `None` blob decodes
    /// to "no texture" and resolves to no handle until replaced. Call
    /// [`TextureManager::rebind`] to upload once a loader is available.
    pub(crate) fn register_raw(&self, name: &str, bytes: Option<Vec<u8>>) {
        self.entries
            .write()
            .insert(name.to_string(), TextureEntry { bytes, id: None });
    }

    /// Uploads every entry that still lacks a backend handle.
    pub fn rebind(&self, loader: &mut dyn TextureLoader) -> Result<(), CanvasError> {
        let mut entries = self.entries.write();
        for (name, entry) in entries.iter_mut() {
            if entry.id.is_some() {
                continue;
            }
            if let Some(bytes) = &entry.bytes {
                let image = decode(bytes)?;
                entry.id = Some(loader.load_texture(name, &image));
            }
        }
        Ok(())
    }

    /// The backend handle for `name`, if the texture exists and has been
    /// uploaded.
    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.entries.read().get(name).and_then(|e| e.id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// The encoded blobs for persistence, keyed by name.
    pub(crate) fn export(&self) -> BTreeMap<String, Option<Vec<u8>>> {
        self.entries
            .read()
            .iter()
            .map(|(name, entry)| (name.clone(), entry.bytes.clone()))
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.entries.write().clear();
    }
}

fn decode(bytes: &[u8]) -> Result<ColorImage, CanvasError> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    let size = [image.width() as usize, image.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, &image.into_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::NullTextureLoader;
    use image::{DynamicImage, ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(2, 2));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn register_decodes_and_assigns_a_handle() {
        let manager = TextureManager::new();
        let mut loader = NullTextureLoader::default();

        manager.register("paper", png_bytes(), &mut loader).unwrap();
        assert!(manager.contains("paper"));
        assert!(manager.id("paper").is_some());
        assert!(manager.id("missing").is_none());
    }

    #[test]
    fn register_rejects_garbage_bytes() {
        let manager = TextureManager::new();
        let mut loader = NullTextureLoader::default();

        let result = manager.register("bad", vec![0, 1, 2, 3], &mut loader);
        assert!(matches!(result, Err(CanvasError::TextureDecode(_))));
        assert!(!manager.contains("bad"));
    }

    #[test]
    fn rebind_uploads_raw_entries() {
        let manager = TextureManager::new();
        manager.register_raw("paper", Some(png_bytes()));
        manager.register_raw("empty", None);
        assert!(manager.id("paper").is_none());

        let mut loader = NullTextureLoader::default();
        manager.rebind(&mut loader).unwrap();
        assert!(manager.id("paper").is_some());
        // Absent blob stays handle-less.
        assert!(manager.id("empty").is_none());
        assert!(manager.contains("empty"));
    }

    #[test]
    fn export_round_trips_blobs() {
        let manager = TextureManager::new();
        let bytes = png_bytes();
        manager.register_raw("paper", Some(bytes.clone()));

        let exported = manager.export();
        assert_eq!(exported.get("paper"), Some(&Some(bytes)));
    }
}
