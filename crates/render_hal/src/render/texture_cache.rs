//! Path-keyed texture cache
//!
//! Textures are keyed by the raw bytes of the path or name they were
//! requested with. A hit skips both file IO and decoding, so a file edited on
//! disk keeps serving the texture decoded the first time until the entry is
//! flushed.

use std::ffi::OsString;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use super::api::{PixelFormat, RenderDevice, RenderError, RenderResult, Texture, TextureDesc};
use super::cache::ResourceCache;
use crate::assets::ImageData;
use crate::config::AssetConfig;

/// Cache key: the requested path exactly as given, or a memory texture name
#[derive(Debug, Clone, PartialEq, Eq)]
enum TextureKey {
    File(OsString),
    Memory(String),
}

impl TextureKey {
    fn as_bytes(&self) -> &[u8] {
        match self {
            Self::File(path) => path.as_encoded_bytes(),
            Self::Memory(name) => name.as_bytes(),
        }
    }
}

// Only the key bytes are hashed, so the logged hash is the MurmurHash2A of the path.
impl Hash for TextureKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write(self.as_bytes());
    }
}

/// Deduplicating texture loader
#[derive(Debug)]
pub struct TextureCache {
    textures: ResourceCache<TextureKey, dyn Texture>,
    flip_vertically: bool,
}

impl TextureCache {
    /// Create an empty cache using the hash seed and flip policy from `config`
    pub fn new(config: &AssetConfig) -> Self {
        Self {
            textures: ResourceCache::with_seed("texture", config.hash_seed),
            flip_vertically: config.flip_textures_vertically,
        }
    }

    /// Load a 2D texture from an image file
    ///
    /// Returns `Ok(None)` when the file does not exist. Decode failures are
    /// errors and nothing is cached for them.
    pub fn load_texture_2d_from_file(
        &mut self,
        device: &mut dyn RenderDevice,
        path: impl AsRef<Path>,
    ) -> RenderResult<Option<Arc<dyn Texture>>> {
        let path = path.as_ref();
        let key = TextureKey::File(path.as_os_str().to_owned());
        if let Some(texture) = self.textures.get(&key) {
            return Ok(Some(texture));
        }

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("Texture file {:?} not found", path);
                return Ok(None);
            }
            Err(e) => return Err(RenderError::Io(e)),
        };

        let mut image = ImageData::from_bytes(&bytes).map_err(|e| RenderError::TextureDecode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if self.flip_vertically {
            image.flip_vertically();
        }

        let desc = TextureDesc::new(image.width, image.height, PixelFormat::R8G8B8A8);
        let texture = device.create_texture_2d(&desc, &image.data)?;
        log::info!(
            "Loaded texture {} ({}x{}, {} bit) [hash 0x{:08x}]",
            path.display(),
            image.width,
            image.height,
            image.bit_depth,
            self.textures.key_hash(&key)
        );

        self.textures.insert(key, Arc::clone(&texture));
        Ok(Some(texture))
    }

    /// Create a 2D texture from raw pixels, cached under `name`
    pub fn load_texture_2d_from_memory(
        &mut self,
        device: &mut dyn RenderDevice,
        name: &str,
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: &[u8],
    ) -> RenderResult<Arc<dyn Texture>> {
        self.textures.get_or_try_insert_with(TextureKey::Memory(name.to_string()), |_| {
            let texture = device.create_texture_2d(&TextureDesc::new(width, height, format), pixels)?;
            log::info!("Created texture {} ({}x{} {:?})", name, width, height, format);
            Ok(texture)
        })
    }

    /// Release textures nobody else holds; returns how many were dropped
    pub fn flush(&mut self) -> usize {
        self.textures.sweep()
    }

    /// Drop every cached texture
    pub fn destroy(&mut self) {
        self.textures.clear();
    }

    /// Number of cached textures
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::hash::calculate_murmur_hash;
    use crate::render::headless::{HeadlessDevice, HeadlessTexture};
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, name: &str, top: [u8; 4], bottom: [u8; 4]) -> std::path::PathBuf {
        let mut img = image::RgbaImage::new(1, 2);
        img.put_pixel(0, 0, image::Rgba(top));
        img.put_pixel(0, 1, image::Rgba(bottom));
        let path = dir.path().join(name);
        img.save(&path).unwrap();
        path
    }

    fn first_pixel(texture: &Arc<dyn Texture>) -> Vec<u8> {
        let headless = texture.as_any().downcast_ref::<HeadlessTexture>().unwrap();
        headless.face(0).unwrap()[..4].to_vec()
    }

    #[test]
    fn test_load_and_flip() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "brick.png", [255, 0, 0, 255], [0, 0, 255, 255]);
        let mut device = HeadlessDevice::new();
        let mut cache = TextureCache::new(&AssetConfig::default());

        let texture = cache.load_texture_2d_from_file(&mut device, &path).unwrap().unwrap();
        assert_eq!((texture.width(), texture.height()), (1, 2));
        // Flipped: the bottom row comes first
        assert_eq!(first_pixel(&texture), vec![0, 0, 255, 255]);
    }

    #[test]
    fn test_no_flip_when_disabled() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "brick.png", [255, 0, 0, 255], [0, 0, 255, 255]);
        let mut device = HeadlessDevice::new();
        let config = AssetConfig {
            flip_textures_vertically: false,
            ..AssetConfig::default()
        };
        let mut cache = TextureCache::new(&config);

        let texture = cache.load_texture_2d_from_file(&mut device, &path).unwrap().unwrap();
        assert_eq!(first_pixel(&texture), vec![255, 0, 0, 255]);
    }

    #[test]
    fn test_hit_skips_io_and_is_stale_on_change() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "a.png", [1, 1, 1, 255], [1, 1, 1, 255]);
        let mut device = HeadlessDevice::new();
        let mut cache = TextureCache::new(&AssetConfig::default());

        let first = cache.load_texture_2d_from_file(&mut device, &path).unwrap().unwrap();

        // Overwrite with undecodable bytes; the cached texture is still served
        std::fs::write(&path, b"garbage").unwrap();
        let second = cache.load_texture_2d_from_file(&mut device, &path).unwrap().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(device.stats().textures_created, 1);
        assert_eq!(cache.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_paths_are_distinct_keys() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let small = dir.path().join(OsStr::from_bytes(b"tex\xff.png"));
        let large = dir.path().join(OsStr::from_bytes(b"tex\xfe.png"));
        image::RgbaImage::new(1, 1).save(&small).unwrap();
        image::RgbaImage::new(2, 2).save(&large).unwrap();

        let mut device = HeadlessDevice::new();
        let mut cache = TextureCache::new(&AssetConfig::default());
        let a = cache.load_texture_2d_from_file(&mut device, &small).unwrap().unwrap();
        let b = cache.load_texture_2d_from_file(&mut device, &large).unwrap().unwrap();

        assert_eq!((a.width(), b.width()), (1, 2));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 2);
        assert_eq!(device.stats().textures_created, 2);
    }

    #[test]
    fn test_key_hash_is_murmur_of_path_bytes() {
        let cache = TextureCache::new(&AssetConfig::default());
        let key = TextureKey::File(OsString::from("textures/brick.png"));
        assert_eq!(cache.textures.key_hash(&key), calculate_murmur_hash(b"textures/brick.png"));

        // A memory texture with the same bytes hashes alike but is a different key
        let named = TextureKey::Memory("textures/brick.png".to_string());
        assert_eq!(cache.textures.key_hash(&named), cache.textures.key_hash(&key));
        assert_ne!(named, key);
    }

    #[test]
    fn test_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        let mut device = HeadlessDevice::new();
        let mut cache = TextureCache::new(&AssetConfig::default());

        let result = cache.load_texture_2d_from_file(&mut device, dir.path().join("nope.png"));
        assert!(result.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"not a png at all").unwrap();
        let mut device = HeadlessDevice::new();
        let mut cache = TextureCache::new(&AssetConfig::default());

        let err = cache.load_texture_2d_from_file(&mut device, &path).unwrap_err();
        assert!(matches!(err, RenderError::TextureDecode { .. }));
        assert!(cache.is_empty());
        assert_eq!(device.stats().textures_created, 0);
    }

    #[test]
    fn test_from_memory_and_flush() {
        let mut device = HeadlessDevice::new();
        let mut cache = TextureCache::new(&AssetConfig::default());

        let white = cache
            .load_texture_2d_from_memory(&mut device, "white", 2, 2, PixelFormat::R8G8B8A8, &[255; 16])
            .unwrap();
        let again = cache
            .load_texture_2d_from_memory(&mut device, "white", 2, 2, PixelFormat::R8G8B8A8, &[0; 16])
            .unwrap();
        assert!(Arc::ptr_eq(&white, &again));
        assert_eq!(device.stats().textures_created, 1);

        assert_eq!(cache.flush(), 0);
        drop(white);
        drop(again);
        assert_eq!(cache.flush(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_short_pixel_data_is_rejected() {
        let mut device = HeadlessDevice::new();
        let mut cache = TextureCache::new(&AssetConfig::default());
        let result = cache.load_texture_2d_from_memory(&mut device, "short", 4, 4, PixelFormat::R8, &[0; 3]);
        assert!(matches!(result, Err(RenderError::InvalidTextureData { .. })));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_destroy() {
        let mut device = HeadlessDevice::new();
        let mut cache = TextureCache::new(&AssetConfig::default());
        let held = cache
            .load_texture_2d_from_memory(&mut device, "x", 1, 1, PixelFormat::R8, &[9])
            .unwrap();
        cache.destroy();
        assert!(cache.is_empty());
        assert_eq!(held.width(), 1);
    }
}
