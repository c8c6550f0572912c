//! Pools of overlay assets.

use crate::error::Error;
use docsynth_geometry::OverlayRole;
use docsynth_render::Asset;
use rand::Rng;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The assets available for one overlay role.
///
/// A pool is never empty.
#[derive(Debug, Clone)]
pub struct AssetPool {
    role: OverlayRole,
    assets: Vec<Arc<Asset>>,
}

impl AssetPool {
    /// Load every `*.png` file of `dir`.
    ///
    /// Files that fail to decode are skipped with a warning. A missing
    /// directory counts as an empty one.
    pub fn load(role: OverlayRole, dir: &Path) -> Result<Self, Error> {
        let empty = || Error::AssetPoolEmpty {
            role,
            dir: dir.to_path_buf(),
        };

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(empty()),
            Err(e) => return Err(e.into()),
        };

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_png = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("png"));
            if is_png && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut assets = Vec::with_capacity(paths.len());
        for path in &paths {
            match Asset::open(path) {
                Ok(asset) => assets.push(Arc::new(asset)),
                Err(e) => log::warn!("skipping {role} asset {}: {e}", path.display()),
            }
        }

        if assets.is_empty() {
            return Err(empty());
        }

        log::info!("loaded {} {role} assets from {}", assets.len(), dir.display());
        Ok(Self { role, assets })
    }

    /// Build a pool from assets in memory.
    pub fn from_assets(role: OverlayRole, assets: Vec<Asset>) -> Result<Self, Error> {
        if assets.is_empty() {
            return Err(Error::AssetPoolEmpty {
                role,
                dir: PathBuf::new(),
            });
        }

        Ok(Self {
            role,
            assets: assets.into_iter().map(Arc::new).collect(),
        })
    }

    /// The role of the pool.
    pub fn role(&self) -> OverlayRole {
        self.role
    }

    /// The number of assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Always `false`, pools cannot be empty.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Pick an asset uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &Arc<Asset> {
        let index = rng.gen_range(0..self.assets.len());
        &self.assets[index]
    }

    /// All assets of the pool.
    pub fn assets(&self) -> &[Arc<Asset>] {
        &self.assets
    }
}
