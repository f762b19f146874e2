//! Puzzle service
//!
//! Loads a puzzle file and runs the passes in order: build, infer, size.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use termtree::Tree;
use tracing::{debug, info, instrument};

use crate::application::render::TreeRender;
use crate::application::report::BalanceReport;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{compute_layout_scales, infer_missing_weight, BeamTree, Resolution, TreeBuilder};
use crate::infrastructure::traits::FileSystem;

/// A puzzle after all passes have run.
#[derive(Debug, Clone)]
pub struct Puzzle {
    /// File the puzzle was read from
    pub source: PathBuf,
    /// Tree with the missing weight filled in and layout scales computed
    pub tree: BeamTree,
    /// The weight inference filled in, if any
    pub resolution: Option<Resolution>,
}

/// Service for loading and analysing balance puzzles.
pub struct PuzzleService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl PuzzleService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Read and analyse the puzzle at `path`.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Puzzle> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::PuzzleNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read puzzle", path)?;
        let mut puzzle = self.analyse(&content)?;
        puzzle.source = path.to_path_buf();
        Ok(puzzle)
    }

    /// Analyse puzzle text that did not come from a file.
    pub fn analyse(&self, content: &str) -> ApplicationResult<Puzzle> {
        let tree = TreeBuilder::new()
            .with_default_scale(self.settings.layout.default_scale)
            .build(content)?;
        debug!(beams = tree.len(), "puzzle parsed");

        let inference = infer_missing_weight(&tree)?;
        if let Some(resolution) = &inference.resolution {
            info!(
                beam = %resolution.beam,
                mass = resolution.mass,
                "weight of the missing pan is set"
            );
        }

        let tree = compute_layout_scales(&inference.tree, self.settings.layout_params());
        Ok(Puzzle {
            source: PathBuf::new(),
            tree,
            resolution: inference.resolution,
        })
    }

    /// Torque diagnostics and verdict for a loaded puzzle.
    pub fn report(&self, puzzle: &Puzzle) -> BalanceReport {
        BalanceReport::from_tree(&puzzle.tree, self.settings.check.tolerance)
    }

    pub fn render(&self, puzzle: &Puzzle) -> Tree<String> {
        puzzle.tree.to_tree_string()
    }
}
