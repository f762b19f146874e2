//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::PuzzleService;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    pub puzzle: PuzzleService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let puzzle = PuzzleService::new(fs, Arc::clone(&settings));

        Self { settings, puzzle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;

    struct OnePuzzle;

    impl FileSystem for OnePuzzle {
        fn read_to_string(&self, _path: &Path) -> io::Result<String> {
            Ok("B -2 3 1 -1\n".to_string())
        }

        fn is_file(&self, _path: &Path) -> bool {
            true
        }
    }

    #[test]
    fn test_puzzle_service_reads_through_injected_filesystem() {
        let container = ServiceContainer::with_deps(Settings::default(), Arc::new(OnePuzzle));
        let puzzle = container.puzzle.load(Path::new("anywhere.txt")).unwrap();
        assert_eq!(puzzle.resolution.unwrap().mass, 6.0);
        assert_eq!(container.settings.check.tolerance, 1e-9);
    }
}
