//! Puzzle source seam
//!
//! `PuzzleService` reads puzzle text through `FileSystem`, so its tests can
//! serve puzzles from memory.

use std::io;
use std::path::Path;

pub trait FileSystem: Send + Sync {
    /// Whole puzzle text at `path`.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// `true` if `path` names a regular file that can be loaded as a puzzle.
    fn is_file(&self, path: &Path) -> bool;
}

/// Puzzles on the local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}
