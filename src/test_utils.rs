//! Fixture helpers shared between unit and integration tests, gated behind
//! the `test-utils` feature so they compile only for test builds (this
//! crate's own `dev-dependencies` enables the feature when building
//! `tests/`).

use std::fs;
use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};

/// Writes a minimal `package.toml` under `<root>/<name>/<version>/`, the
/// on-disk layout [`crate::repo::FilesystemRepoGateway`] expects.
pub fn write_package(root: &Path, name: &str, version: &str) {
    let dir = root.join(name).join(version);
    fs::create_dir_all(&dir).expect("create fixture package directory");
    fs::write(dir.join("package.toml"), format!("name = \"{name}\"\nversion = \"{version}\"\n"))
        .expect("write fixture package.toml");
}

/// Backdates or fast-forwards a fixture package definition's mtime, so tests
/// can simulate a release happening at a specific, controlled time instead
/// of sleeping for real wall-clock time to pass.
pub fn set_release_time(root: &Path, name: &str, version: &str, unix_seconds: u64) {
    let path = root.join(name).join(version).join("package.toml");
    let file = fs::File::options().write(true).open(&path).expect("open fixture package.toml");
    let time = UNIX_EPOCH + Duration::from_secs(unix_seconds);
    file.set_modified(time).expect("set fixture mtime");
}

/// Rewrites a fixture package definition's content, changing its variant
/// state handle without necessarily changing its release time.
pub fn edit_package(root: &Path, name: &str, version: &str, extra: &str) {
    let path = root.join(name).join(version).join("package.toml");
    let mut content = fs::read_to_string(&path).expect("read fixture package.toml");
    content.push_str(extra);
    fs::write(&path, content).expect("rewrite fixture package.toml");
}
