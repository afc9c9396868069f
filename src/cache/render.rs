use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::cache::fingerprint::{ALGORITHM_VERSION, Fingerprint, fingerprint_shadow};
use crate::effects::blur::BoxBlurEngine;
use crate::encode::png::{ImageCodec, PngCodec};
use crate::foundation::core::PixelBuffer;
use crate::foundation::error::{ShadowError, ShadowResult};
use crate::shape::raster::{RasterOpts, ShapeRasterizer};
use crate::shape::spec::{ShadowOptions, ShadowSpec};

/// Configuration for a [`RenderCache`].
#[derive(Clone, Debug, PartialEq)]
pub struct RenderCacheOpts {
    /// Root directory; entries live under `<cache_dir>/<ALGORITHM_VERSION>/`.
    pub cache_dir: PathBuf,
    /// Rasterizer options used for every render (and keyed into fingerprints).
    pub raster: RasterOpts,
    /// Blur the four channels on the rayon pool.
    pub parallel_channels: bool,
}

impl Default for RenderCacheOpts {
    fn default() -> Self {
        Self {
            cache_dir: std::env::temp_dir().join("softshadow"),
            raster: RasterOpts::default(),
            parallel_channels: true,
        }
    }
}

impl RenderCacheOpts {
    /// Default options rooted at `cache_dir`.
    pub fn in_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..Self::default()
        }
    }
}

/// Snapshot of a cache's counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered from the in-memory index.
    pub memory_hits: u64,
    /// Requests answered by reading a persisted entry.
    pub disk_hits: u64,
    /// Pipeline runs that completed and were published.
    pub renders: u64,
    /// Requests that returned an error.
    pub failures: u64,
}

#[derive(Default)]
struct Counters {
    memory_hits: AtomicU64,
    disk_hits: AtomicU64,
    renders: AtomicU64,
    failures: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Fingerprint-keyed store of encoded shadow images, mirrored in memory and on disk.
///
/// Each distinct fingerprint is rendered at most once at a time: concurrent requests
/// for the same shadow wait on a per-fingerprint lock and then read the published
/// bytes. Requests for different shadows never wait on each other's pipeline.
/// Entries are never evicted.
pub struct RenderCache {
    dir: PathBuf,
    opts: RenderCacheOpts,
    codec: Arc<dyn ImageCodec>,
    entries: RwLock<HashMap<Fingerprint, Arc<[u8]>>>,
    locks: Mutex<HashMap<Fingerprint, Arc<Mutex<()>>>>,
    counters: Counters,
    temp_seq: AtomicU64,
}

impl fmt::Debug for RenderCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self
            .entries
            .read()
            .map(|m| m.len())
            .unwrap_or_else(|e| e.into_inner().len());
        f.debug_struct("RenderCache")
            .field("dir", &self.dir)
            .field("opts", &self.opts)
            .field("codec", &self.codec.extension())
            .field("entries", &entries)
            .finish_non_exhaustive()
    }
}

impl RenderCache {
    /// Cache that encodes with [`PngCodec`]. Creates the versioned cache directory.
    pub fn new(opts: RenderCacheOpts) -> ShadowResult<Self> {
        Self::with_codec(opts, Arc::new(PngCodec))
    }

    /// Cache with a caller-supplied codec.
    pub fn with_codec(opts: RenderCacheOpts, codec: Arc<dyn ImageCodec>) -> ShadowResult<Self> {
        let dir = opts.cache_dir.join(ALGORITHM_VERSION);
        fs::create_dir_all(&dir).map_err(|e| ShadowError::storage(&dir, e))?;
        tracing::debug!(dir = %dir.display(), "render cache ready");
        Ok(Self {
            dir,
            opts,
            codec,
            entries: RwLock::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
            counters: Counters::default(),
            temp_seq: AtomicU64::new(0),
        })
    }

    /// Options this cache was built with.
    pub fn opts(&self) -> &RenderCacheOpts {
        &self.opts
    }

    /// Versioned directory holding the persisted entries.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Encoded shadow for `spec`, rendering it if no cached copy exists.
    pub fn get_or_render(&self, spec: &ShadowSpec) -> ShadowResult<Arc<[u8]>> {
        self.get_or_render_with(spec, &ShadowOptions::default())
    }

    /// Like [`RenderCache::get_or_render`], with border/position overrides.
    #[tracing::instrument(
        level = "debug",
        skip(self, spec, options),
        fields(width = spec.width, height = spec.height, blur = spec.blur_radius)
    )]
    pub fn get_or_render_with(
        &self,
        spec: &ShadowSpec,
        options: &ShadowOptions,
    ) -> ShadowResult<Arc<[u8]>> {
        let resolved = options.resolve(spec);
        let fp = fingerprint_shadow(&resolved, options.position.as_ref(), &self.opts.raster);
        let out = self.lookup_or_render(fp, &resolved);
        if let Err(err) = &out {
            Counters::bump(&self.counters.failures);
            tracing::error!(fingerprint = %fp, error = %err, "shadow render failed");
        }
        out
    }

    /// Fingerprint a request would be cached under.
    pub fn fingerprint_for(&self, spec: &ShadowSpec, options: &ShadowOptions) -> Fingerprint {
        fingerprint_shadow(
            &options.resolve(spec),
            options.position.as_ref(),
            &self.opts.raster,
        )
    }

    /// Where the entry for `fp` is (or would be) persisted.
    pub fn entry_path(&self, fp: Fingerprint) -> PathBuf {
        self.dir
            .join(format!("{}.{}", fp.to_hex(), self.codec.extension()))
    }

    /// `true` when `fp` is in the in-memory index. Disk is not consulted.
    pub fn contains(&self, fp: Fingerprint) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&fp)
    }

    /// Current counter values.
    pub fn stats(&self) -> CacheStats {
        let c = &self.counters;
        CacheStats {
            memory_hits: c.memory_hits.load(Ordering::Relaxed),
            disk_hits: c.disk_hits.load(Ordering::Relaxed),
            renders: c.renders.load(Ordering::Relaxed),
            failures: c.failures.load(Ordering::Relaxed),
        }
    }

    /// Drop the in-memory index. Persisted entries are kept and will be reloaded.
    pub fn clear_memory(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Drop the in-memory index and delete every persisted entry.
    pub fn clear_all(&self) -> ShadowResult<()> {
        self.clear_memory();
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(ShadowError::storage(&self.dir, e)),
        }
        fs::create_dir_all(&self.dir).map_err(|e| ShadowError::storage(&self.dir, e))?;
        tracing::debug!(dir = %self.dir.display(), "render cache cleared");
        Ok(())
    }

    fn lookup_or_render(&self, fp: Fingerprint, spec: &ShadowSpec) -> ShadowResult<Arc<[u8]>> {
        if let Some(bytes) = self.cached(fp)? {
            return Ok(bytes);
        }

        let lock = self.lock_for(fp);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Another thread may have published while we waited.
        if let Some(bytes) = self.cached(fp)? {
            return Ok(bytes);
        }

        tracing::debug!(fingerprint = %fp, "cache miss; rendering");
        let pixels = render_shadow_pixels(spec, &self.opts.raster, self.opts.parallel_channels)?;
        let encoded = self.codec.encode(&pixels)?;
        self.persist(fp, &encoded)?;

        let bytes: Arc<[u8]> = Arc::from(encoded);
        self.publish(fp, Arc::clone(&bytes));
        Counters::bump(&self.counters.renders);
        Ok(bytes)
    }

    fn cached(&self, fp: Fingerprint) -> ShadowResult<Option<Arc<[u8]>>> {
        let hit = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&fp)
            .cloned();
        if let Some(bytes) = hit {
            Counters::bump(&self.counters.memory_hits);
            tracing::debug!(fingerprint = %fp, "memory hit");
            return Ok(Some(bytes));
        }

        let path = self.entry_path(fp);
        match fs::read(&path) {
            Ok(data) if data.is_empty() => {
                tracing::warn!(path = %path.display(), "ignoring empty cache entry");
                Ok(None)
            }
            Ok(data) => {
                let bytes: Arc<[u8]> = Arc::from(data);
                self.publish(fp, Arc::clone(&bytes));
                Counters::bump(&self.counters.disk_hits);
                tracing::debug!(fingerprint = %fp, "disk hit");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ShadowError::storage(&path, e)),
        }
    }

    fn lock_for(&self, fp: Fingerprint) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(fp).or_insert_with(|| Arc::new(Mutex::new(()))))
    }

    fn publish(&self, fp: Fingerprint, bytes: Arc<[u8]>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(fp, bytes);
    }

    fn persist(&self, fp: Fingerprint, bytes: &[u8]) -> ShadowResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| ShadowError::storage(&self.dir, e))?;

        let seq = self.temp_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .dir
            .join(format!(".{}.{}.{seq}.tmp", fp.to_hex(), std::process::id()));
        let mut guard = TempFileGuard(Some(tmp.clone()));
        fs::write(&tmp, bytes).map_err(|e| ShadowError::storage(&tmp, e))?;

        let path = self.entry_path(fp);
        fs::rename(&tmp, &path).map_err(|e| ShadowError::storage(&path, e))?;
        guard.0 = None;
        Ok(())
    }
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = fs::remove_file(path);
        }
    }
}

/// Validate, rasterize and blur `spec` without touching any cache.
pub fn render_shadow_pixels(
    spec: &ShadowSpec,
    raster: &RasterOpts,
    parallel: bool,
) -> ShadowResult<PixelBuffer> {
    spec.validate()?;
    let mask = ShapeRasterizer::new(*raster).rasterize(spec);
    Ok(BoxBlurEngine::new(parallel).blur(&mask, spec.blur_radius))
}

/// Render `spec` with default raster options and encode it with `codec`.
pub fn render_shadow_png(spec: &ShadowSpec, codec: &dyn ImageCodec) -> ShadowResult<Vec<u8>> {
    let pixels = render_shadow_pixels(spec, &RasterOpts::default(), true)?;
    codec.encode(&pixels)
}

#[cfg(test)]
#[path = "../../tests/unit/cache/render.rs"]
mod tests;
