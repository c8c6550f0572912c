//! Fixtures shared by the end-to-end tests.

use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch directory with a signature and a stamp pool.
#[derive(Debug)]
pub struct Workspace {
    root: TempDir,
}

impl Workspace {
    /// Create empty asset directories.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("failed to create a temporary directory");
        std::fs::create_dir(root.path().join("signatures")).expect("failed to create signatures");
        std::fs::create_dir(root.path().join("stamps")).expect("failed to create stamps");
        Self { root }
    }

    /// Create asset directories with one signature and two stamps.
    pub fn with_assets() -> Self {
        let ws = Self::new();
        write_ink(&ws.signatures().join("sig.png"), 300, 150, [20, 40, 200]);
        write_ink(&ws.stamps().join("round.png"), 200, 200, [200, 30, 30]);
        write_ink(&ws.stamps().join("square.png"), 180, 160, [120, 20, 160]);
        ws
    }

    /// The signature directory.
    pub fn signatures(&self) -> PathBuf {
        self.root.path().join("signatures")
    }

    /// The stamp directory.
    pub fn stamps(&self) -> PathBuf {
        self.root.path().join("stamps")
    }

    /// A path for outputs that does not exist yet.
    pub fn output(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Write an image with an opaque ink block in the middle and a transparent
/// frame around it.
pub fn write_ink(path: &Path, width: u32, height: u32, rgb: [u8; 3]) {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        let inside = x >= width / 4 && x < width * 3 / 4 && y >= height / 4 && y < height * 3 / 4;
        if inside {
            Rgba([rgb[0], rgb[1], rgb[2], 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    image.save(path).expect("failed to write a fixture image");
}

/// The sorted file names of a directory.
pub fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = std::fs::read_dir(dir)
        .expect("failed to read directory")
        .map(|e| {
            e.expect("failed to read entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
