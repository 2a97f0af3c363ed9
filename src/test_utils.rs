//! Test utilities shared across test modules

use crate::paths::Paths;
use tempfile::TempDir;

/// Create a Paths struct for testing using a temporary directory
///
/// Mirrors the real ~/.pip/ layout inside the temp directory. Nothing is
/// created on disk, so tests also cover the "directory missing" path.
pub fn setup_test_paths(temp_dir: &TempDir) -> Paths {
    Paths::in_dir(temp_dir.path().join(".pip"))
}
