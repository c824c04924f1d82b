//! Filesystem-backed repository gateway.
//!
//! Repository layout convention: each search path is a directory of
//! `<name>/<version>/package.toml` package definitions, one directory per
//! version. This mirrors the "definition file per version" shape this
//! codebase already uses for its own manifest/lockfile pair, just scoped to
//! a whole-repository tree instead of a single project.

use super::RepoGateway;
use crate::error::ResolverError;
use crate::key_builder::filesystem_repo_id;
use crate::types::{Variant, VariantHandle, VariantResource, VariantStateHandle};
use semver::Version;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

pub const DEFINITION_FILE: &str = "package.toml";

/// Reads a package repository tree from one or more filesystem roots.
pub struct FilesystemRepoGateway;

impl FilesystemRepoGateway {
    pub fn new() -> Self {
        Self
    }

    /// Every version directory for `name` found under `package_paths`, in
    /// search-path order, newest version first within each path. Used by
    /// the reference solver to pick candidates and by the iterative driver
    /// to know how many versions a given depth actually covers.
    pub fn list_versions(
        &self,
        name: &str,
        package_paths: &[PathBuf],
    ) -> Result<Vec<(Version, PathBuf)>, ResolverError> {
        let mut found = Vec::new();
        for root in package_paths {
            let pkg_dir = root.join(name);
            if !pkg_dir.is_dir() {
                continue;
            }
            for entry in fs::read_dir(&pkg_dir)? {
                let entry = entry?;
                if !entry.file_type()?.is_dir() {
                    continue;
                }
                let version_str = entry.file_name().to_string_lossy().into_owned();
                let Ok(version) = Version::parse(&version_str) else {
                    continue;
                };
                let def_path = entry.path().join(DEFINITION_FILE);
                if def_path.is_file() {
                    found.push((version, def_path));
                }
            }
        }
        found.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(found)
    }

    pub fn make_variant_handle(&self, name: &str, version: &Version, definition_path: &Path, repository_id: &str) -> VariantHandle {
        let mut fields = serde_json::Map::new();
        fields.insert("name".into(), serde_json::Value::String(name.to_string()));
        fields.insert("version".into(), serde_json::Value::String(version.to_string()));
        fields.insert(
            "definition_path".into(),
            serde_json::Value::String(definition_path.display().to_string()),
        );
        fields.insert(
            "repository_id".into(),
            serde_json::Value::String(repository_id.to_string()),
        );
        VariantHandle::new(fields)
    }
}

impl Default for FilesystemRepoGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn field(handle: &VariantHandle, name: &str) -> Result<String, ResolverError> {
    handle
        .get(name)
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ResolverError::Repository(format!("variant handle missing '{name}' field")))
}

impl RepoGateway for FilesystemRepoGateway {
    fn repository_id(&self, path: &Path) -> Result<String, ResolverError> {
        Ok(filesystem_repo_id(path))
    }

    fn last_release_time(&self, name: &str, package_paths: &[PathBuf]) -> Result<u64, ResolverError> {
        let mut latest: Option<u64> = None;
        for (_, def_path) in self.list_versions(name, package_paths)? {
            let metadata = fs::metadata(&def_path)?;
            let modified = metadata.modified()?;
            let secs = modified
                .duration_since(UNIX_EPOCH)
                .map_err(|e| ResolverError::Repository(format!("invalid mtime for {}: {e}", def_path.display())))?
                .as_secs();
            latest = Some(latest.map_or(secs, |cur| cur.max(secs)));
        }
        Ok(latest.unwrap_or(0))
    }

    fn variant_state_handle(&self, resource: &VariantResource) -> Result<VariantStateHandle, ResolverError> {
        let content = fs::read(&resource.definition_path)?;
        let mut hasher = Sha256::new();
        hasher.update(&content);
        Ok(VariantStateHandle(hex::encode(hasher.finalize())))
    }

    fn materialize_variant(&self, handle: &VariantHandle) -> Result<Variant, ResolverError> {
        let name = field(handle, "name")?;
        let version = field(handle, "version")?;
        let definition_path = PathBuf::from(field(handle, "definition_path")?);
        let repository_id = field(handle, "repository_id")?;
        Ok(Variant {
            qualified_name: format!("{name}-{version}"),
            name,
            resource: VariantResource {
                repository_id,
                definition_path,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_package(root: &Path, name: &str, version: &str, content: &str) -> PathBuf {
        let dir = root.join(name).join(version);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(DEFINITION_FILE);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn lists_versions_newest_first() {
        let dir = TempDir::new().unwrap();
        write_package(dir.path(), "foo", "1.0.0", "a");
        write_package(dir.path(), "foo", "2.1.0", "b");
        write_package(dir.path(), "foo", "1.5.0", "c");

        let gw = FilesystemRepoGateway::new();
        let versions = gw.list_versions("foo", &[dir.path().to_path_buf()]).unwrap();
        let rendered: Vec<String> = versions.iter().map(|(v, _)| v.to_string()).collect();
        assert_eq!(rendered, vec!["2.1.0", "1.5.0", "1.0.0"]);
    }

    #[test]
    fn state_handle_changes_when_content_changes() {
        let dir = TempDir::new().unwrap();
        let path = write_package(dir.path(), "foo", "1.0.0", "original");
        let gw = FilesystemRepoGateway::new();
        let resource = VariantResource {
            repository_id: "filesystem@x".into(),
            definition_path: path.clone(),
        };
        let before = gw.variant_state_handle(&resource).unwrap();
        fs::write(&path, "edited").unwrap();
        let after = gw.variant_state_handle(&resource).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn unknown_package_has_zero_release_time() {
        let dir = TempDir::new().unwrap();
        let gw = FilesystemRepoGateway::new();
        let t = gw.last_release_time("nope", &[dir.path().to_path_buf()]).unwrap();
        assert_eq!(t, 0);
    }

    #[test]
    fn materialize_round_trips_handle_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_package(dir.path(), "foo", "1.0.0", "a");
        let gw = FilesystemRepoGateway::new();
        let handle = gw.make_variant_handle("foo", &Version::parse("1.0.0").unwrap(), &path, "filesystem@x");
        let variant = gw.materialize_variant(&handle).unwrap();
        assert_eq!(variant.name, "foo");
        assert_eq!(variant.qualified_name, "foo-1.0.0");
        assert_eq!(variant.resource.definition_path, path);
    }
}
