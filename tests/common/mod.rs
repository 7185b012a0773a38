//! Shared package fixture for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const PROJECT_URL: &str = "https://github.com/brainelectronics/micropython-package-validation";

pub const DESCRIPTOR: &str = r#"
name = "micropython-package-validation-example"
version = "1.2.3"
description = "Validate MicroPython package JSON file"
url = "https://github.com/brainelectronics/micropython-package-validation"
license = "MIT"
packages = ["subdir1", "other_dir"]
install_requires = ["dependency_1", "dependency_2"]

[[data_files]]
group = "static"
files = ["static/style.css", "static/favicon.ico", "static/js/function.js"]

[[data_files]]
group = "other_files"
files = ["other_files/index.tpl", "other_files/page.tpl"]
"#;

pub const CHANGELOG: &str = "\
# Changelog

## [Unreleased]

## [9.8.7] - 2022-10-21
### Added
- Changelog based versioning
";

/// A package directory laid out like a typical MicroPython project
pub struct Fixture {
    pub dir: TempDir,
    root: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_descriptor(DESCRIPTOR)
    }

    pub fn with_descriptor(descriptor: &str) -> Self {
        let dir = TempDir::new().unwrap();
        // Packager paths are canonical
        let root = fs::canonicalize(dir.path()).unwrap();

        for file in [
            "subdir1/asdf.py",
            "other_dir/bar.py",
            "other_dir/baz.py",
            "other_dir/foo.py",
            "other_dir/nested/deep.py",
            "other_dir/README.md",
            "static/style.css",
            "static/favicon.ico",
            "static/js/function.js",
            "other_files/index.tpl",
            "other_files/page.tpl",
        ] {
            write_file(&root, file, "# content\n");
        }
        write_file(&root, "setup.toml", descriptor);
        write_file(&root, "changelog.md", CHANGELOG);

        Self { dir, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.path("setup.toml")
    }

    pub fn changelog_path(&self) -> PathBuf {
        self.path("changelog.md")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.path("package.json")
    }
}

pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}
