//! Two-tier image cache keyed by image URL.
//!
//! The memory tier holds decoded images up to a fixed entry count and evicts
//! oldest-first. The disk tier stores one PNG per URL, named after the URL's
//! last path segment, directly inside the cache directory. URLs sharing a
//! final segment overwrite each other on disk, and the disk tier is never
//! pruned.
//!
//! All methods are synchronous and may touch the filesystem or run an image
//! codec; async callers should go through [`ImageLoader`](crate::ImageLoader).

use std::collections::{HashMap, VecDeque};
use std::error::Error as StdError;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use image::{DynamicImage, ImageFormat};
use reqwest::Url;
use tempfile::NamedTempFile;

#[derive(Default)]
struct MemoryTier {
    entries: HashMap<String, Arc<DynamicImage>>,
    order: VecDeque<String>,
}

/// Memory + disk image cache.
pub struct ImageStore {
    cache_dir: PathBuf,
    capacity: usize,
    memory: RwLock<MemoryTier>,
}

impl ImageStore {
    /// Create a store persisting to `cache_dir`, keeping at most
    /// `memory_capacity` decoded images in memory.
    ///
    /// The directory is created if missing. Failure to create it only
    /// disables the disk tier.
    pub fn new(cache_dir: PathBuf, memory_capacity: usize) -> Self {
        if let Err(e) = fs::create_dir_all(&cache_dir) {
            log::warn!("Failed to create image cache directory {:?}: {}", cache_dir, e);
        } else {
            log::info!("Image cache directory: {:?}", cache_dir);
        }
        Self {
            cache_dir,
            capacity: memory_capacity.max(1),
            memory: RwLock::new(MemoryTier::default()),
        }
    }

    /// Directory holding the disk tier.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Disk location for `url`, or `None` if its path has no usable final
    /// segment.
    pub fn disk_path(&self, url: &Url) -> Option<PathBuf> {
        let segment = url.path_segments()?.last()?;
        if segment.is_empty() || segment == "." || segment == ".." {
            return None;
        }
        Some(self.cache_dir.join(segment))
    }

    /// Memory-tier lookup only. Never touches the disk.
    pub fn get_memory(&self, url: &Url) -> Option<Arc<DynamicImage>> {
        self.read_memory().entries.get(url.as_str()).cloned()
    }

    /// Look up `url` in memory, then on disk. Disk hits are promoted into
    /// the memory tier.
    pub fn get(&self, url: &Url) -> Option<Arc<DynamicImage>> {
        if let Some(image) = self.get_memory(url) {
            log::debug!("Image memory hit: {}", url);
            return Some(image);
        }

        let path = self.disk_path(url)?;
        let bytes = fs::read(&path).ok()?;
        match image::load_from_memory(&bytes) {
            Ok(decoded) => {
                log::debug!("Image disk hit: {}", url);
                let image = Arc::new(decoded);
                self.insert_memory(url, Arc::clone(&image));
                Some(image)
            }
            Err(e) => {
                log::warn!("Unreadable cached image {:?}: {}", path, e);
                None
            }
        }
    }

    /// Cache `image` for `url` in memory and on disk.
    ///
    /// Disk failures are logged and swallowed; the image then lives in the
    /// memory tier only.
    pub fn put(&self, url: &Url, image: Arc<DynamicImage>) {
        self.insert_memory(url, Arc::clone(&image));

        let Some(path) = self.disk_path(url) else {
            log::debug!("No disk path for {}, caching in memory only", url);
            return;
        };
        match self.write_to_disk(&path, &image) {
            Ok(()) => log::debug!("Cached image {:?}", path),
            Err(e) => log::warn!("Failed to cache image {:?} on disk: {}", path, e),
        }
    }

    /// Drop every memory-tier entry, as the OS would under memory pressure.
    /// The disk tier is untouched.
    pub fn purge_memory(&self) {
        let mut memory = self.write_memory();
        memory.entries.clear();
        memory.order.clear();
    }

    /// Number of images currently held in memory.
    pub fn memory_len(&self) -> usize {
        self.read_memory().entries.len()
    }

    fn insert_memory(&self, url: &Url, image: Arc<DynamicImage>) {
        let key = url.as_str().to_string();
        let mut memory = self.write_memory();
        if memory.entries.insert(key.clone(), image).is_none() {
            memory.order.push_back(key);
        }
        while memory.entries.len() > self.capacity {
            let Some(oldest) = memory.order.pop_front() else {
                break;
            };
            memory.entries.remove(&oldest);
        }
    }

    /// Encode as PNG into a temp file next to `path`, then rename over it so
    /// concurrent writers of the same key never leave a torn file.
    fn write_to_disk(
        &self,
        path: &Path,
        image: &DynamicImage,
    ) -> Result<(), Box<dyn StdError + Send + Sync>> {
        let mut encoded = Cursor::new(Vec::new());
        image.write_to(&mut encoded, ImageFormat::Png)?;

        fs::create_dir_all(&self.cache_dir)?;
        let mut tmp = NamedTempFile::new_in(&self.cache_dir)?;
        tmp.write_all(encoded.get_ref())?;
        tmp.persist(path)?;
        Ok(())
    }

    fn read_memory(&self) -> RwLockReadGuard<'_, MemoryTier> {
        self.memory.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_memory(&self) -> RwLockWriteGuard<'_, MemoryTier> {
        self.memory.write().unwrap_or_else(|e| e.into_inner())
    }
}
