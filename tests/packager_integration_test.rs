/*!
 * Integration tests for manifest derivation, validation and creation
 */

mod common;

use common::{write_file, Fixture, PROJECT_URL};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use upypack::manifest::{ChangeKind, SENTINEL_VERSION};
use upypack::{Packager, PackageManifest, UpyError, UrlEntry, ValidationOptions};

fn packager(fixture: &Fixture) -> Packager {
    Packager::new(fixture.descriptor_path()).unwrap()
}

fn packager_with_manifest(fixture: &Fixture) -> Packager {
    Packager::builder(fixture.descriptor_path())
        .manifest_path(Some(fixture.manifest_path()))
        .build()
        .unwrap()
}

fn expected_manifest() -> Value {
    let alias = "github:brainelectronics/micropython-package-validation";
    let files = [
        "subdir1/asdf.py",
        "other_dir/bar.py",
        "other_dir/baz.py",
        "other_dir/foo.py",
        "static/style.css",
        "static/favicon.ico",
        "static/js/function.js",
        "other_files/index.tpl",
        "other_files/page.tpl",
    ];
    let urls: Vec<Value> = files
        .iter()
        .map(|f| json!([f, format!("{}/{}", alias, f)]))
        .collect();

    json!({
        "urls": urls,
        "deps": ["dependency_1", "dependency_2"],
        "version": "1.2.3"
    })
}

#[test]
fn test_descriptor_fields() {
    let fixture = Fixture::new();
    let packager = packager(&fixture);

    assert_eq!(packager.package_version(), "1.2.3");
    assert_eq!(packager.package_deps(), ["dependency_1", "dependency_2"]);
    assert_eq!(packager.package_url().unwrap(), PROJECT_URL);
    assert_eq!(packager.root_dir(), fixture.root());
}

#[test]
fn test_missing_version_uses_sentinel() {
    let fixture = Fixture::new();
    let mut packager = packager(&fixture);

    packager.descriptor_mut().version = None;
    assert_eq!(packager.package_version(), SENTINEL_VERSION);
    assert_eq!(packager.package_data().unwrap().version, SENTINEL_VERSION);
}

#[test]
fn test_missing_deps_are_empty() {
    let fixture = Fixture::new();
    let mut packager = packager(&fixture);

    packager.descriptor_mut().install_requires = None;
    assert!(packager.package_deps().is_empty());
    assert_eq!(packager.package_data().unwrap().deps, Vec::<String>::new());
}

#[test]
fn test_missing_url_is_fatal() {
    let fixture = Fixture::new();
    let mut packager = packager(&fixture);

    packager.descriptor_mut().url = None;
    let err = packager.package_data().unwrap_err();
    assert!(matches!(err, UpyError::MissingUrl));
    assert!(err.to_string().contains("URL is mandatory"));
}

#[test]
fn test_package_files_are_not_recursive() {
    let fixture = Fixture::new();
    let files = packager(&fixture).package_files();

    assert_eq!(
        files,
        vec![
            PathBuf::from("subdir1/asdf.py"),
            PathBuf::from("other_dir/bar.py"),
            PathBuf::from("other_dir/baz.py"),
            PathBuf::from("other_dir/foo.py"),
        ]
    );
}

#[test]
fn test_package_files_skip_hidden_and_directories() {
    let fixture = Fixture::new();
    write_file(fixture.root(), "subdir1/.hidden.py", "");
    fs::create_dir_all(fixture.path("subdir1/looks_like.py")).unwrap();

    let files = packager(&fixture).package_files();
    assert_eq!(files.len(), 4);
    assert!(!files.contains(&PathBuf::from("subdir1/.hidden.py")));
    assert!(!files.contains(&PathBuf::from("subdir1/looks_like.py")));
}

#[test]
fn test_missing_package_directory_is_skipped() {
    let fixture = Fixture::new();
    let mut packager = packager(&fixture);
    packager.descriptor_mut().packages = Some(vec!["nope".to_string(), "subdir1".to_string()]);

    assert_eq!(packager.package_files(), vec![PathBuf::from("subdir1/asdf.py")]);
}

#[test]
fn test_data_files_drop_missing_entries() {
    let fixture = Fixture::new();
    fs::remove_file(fixture.path("static/favicon.ico")).unwrap();
    let files = packager(&fixture).data_files();

    assert_eq!(
        files,
        vec![
            PathBuf::from("static/style.css"),
            PathBuf::from("static/js/function.js"),
            PathBuf::from("other_files/index.tpl"),
            PathBuf::from("other_files/page.tpl"),
        ]
    );
}

#[test]
fn test_single_data_file_group() {
    let fixture = Fixture::with_descriptor(
        r#"
url = "https://github.com/o/r"
data_files = [["static", ["static/style.css", "static/missing.ico"]]]
"#,
    );

    let files = packager(&fixture).data_files();
    assert_eq!(files, vec![PathBuf::from("static/style.css")]);
}

#[test]
fn test_package_data() {
    let fixture = Fixture::new();
    let manifest = packager(&fixture).package_data().unwrap();

    assert_eq!(manifest.to_value().unwrap(), expected_manifest());
    assert_eq!(
        manifest.urls[0],
        UrlEntry::new(
            "subdir1/asdf.py",
            "github:brainelectronics/micropython-package-validation/subdir1/asdf.py"
        )
    );
}

#[test]
fn test_package_data_without_github_url() {
    let fixture = Fixture::with_descriptor(
        r#"
url = "https://gitlab.com/o/r"
packages = ["subdir1"]
"#,
    );

    let manifest = packager(&fixture).package_data().unwrap();
    assert_eq!(manifest.urls[0].url(), "https://gitlab.com/o/r/subdir1/asdf.py");
    assert_eq!(manifest.version, SENTINEL_VERSION);
    assert!(manifest.deps.is_empty());
}

#[test]
fn test_package_data_reflects_filesystem_changes() {
    let fixture = Fixture::new();
    let packager = packager(&fixture);
    let before = packager.package_data().unwrap();

    write_file(fixture.root(), "subdir1/extra.py", "");
    let after = packager.package_data().unwrap();

    assert_eq!(after.urls.len(), before.urls.len() + 1);
}

#[test]
fn test_changelog_version_takes_precedence() {
    let fixture = Fixture::new();
    let packager = Packager::builder(fixture.descriptor_path())
        .changelog_path(Some(fixture.changelog_path()))
        .build()
        .unwrap();

    assert_eq!(packager.changelog_version().unwrap(), "9.8.7");
    assert_eq!(packager.package_data().unwrap().version, "9.8.7");
}

#[test]
fn test_existing_manifest_requires_path() {
    let fixture = Fixture::new();
    let packager = packager(&fixture);

    assert!(matches!(
        packager.existing_manifest(),
        Err(UpyError::NoManifestPath)
    ));
    assert!(matches!(
        packager.validate(&ValidationOptions::default()),
        Err(UpyError::NoManifestPath)
    ));
}

#[test]
fn test_existing_manifest_malformed_json() {
    let fixture = Fixture::new();
    fs::write(fixture.manifest_path(), "{\"urls\": [[").unwrap();

    let result = packager_with_manifest(&fixture).existing_manifest();
    assert!(matches!(result, Err(UpyError::Manifest(_))));
}

#[test]
fn test_create_then_validate() {
    let fixture = Fixture::new();
    let packager = packager_with_manifest(&fixture);

    let written = packager.create(None, false).unwrap();
    assert_eq!(written, fixture.manifest_path());
    assert!(packager.validate(&ValidationOptions::default()).unwrap());
    assert!(packager.validation_diff().unwrap().is_empty());

    let loaded = PackageManifest::load(&written).unwrap();
    assert_eq!(loaded, packager.package_data().unwrap());
}

#[test]
fn test_create_defaults_next_to_descriptor() {
    let fixture = Fixture::new();
    let packager = packager(&fixture);

    let written = packager.create(None, true).unwrap();
    assert_eq!(written, fixture.path("manifest.json"));

    let contents = fs::read_to_string(&written).unwrap();
    assert!(contents.starts_with("{\n    \"urls\": ["));
    let value: Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(value, expected_manifest());
}

#[test]
fn test_create_explicit_path_compact() {
    let fixture = Fixture::new();
    let target = fixture.path("out.json");

    let written = packager(&fixture).create(Some(&target), false).unwrap();
    assert_eq!(written, target);
    let contents = fs::read_to_string(&target).unwrap();
    assert!(!contents.contains('\n'));
}

#[test]
fn test_validation_ignores_url_order() {
    let fixture = Fixture::new();
    let mut existing = expected_manifest();
    let urls = existing["urls"].as_array_mut().unwrap();
    urls.reverse();
    urls.swap(0, 3);
    fs::write(fixture.manifest_path(), existing.to_string()).unwrap();

    let packager = packager_with_manifest(&fixture);
    assert!(packager.validate(&ValidationOptions::default()).unwrap());
}

#[test]
fn test_validation_version_mismatch() {
    let fixture = Fixture::new();
    let mut existing = expected_manifest();
    existing["version"] = json!("0.0.1");
    fs::write(fixture.manifest_path(), existing.to_string()).unwrap();

    let packager = packager_with_manifest(&fixture);
    assert!(!packager.validate(&ValidationOptions::default()).unwrap());
    assert!(packager
        .validate(&ValidationOptions::new().ignore_version(true))
        .unwrap());
    assert!(!packager
        .validate(&ValidationOptions::new().ignore_deps(true))
        .unwrap());
}

#[test]
fn test_validation_deps_mismatch() {
    let fixture = Fixture::new();
    let mut existing = expected_manifest();
    existing["deps"] = json!(["dependency_1"]);
    fs::write(fixture.manifest_path(), existing.to_string()).unwrap();

    let packager = packager_with_manifest(&fixture);
    assert!(!packager.validate(&ValidationOptions::default()).unwrap());
    assert!(packager
        .validate(&ValidationOptions::new().ignore_deps(true))
        .unwrap());
}

#[test]
fn test_validation_ignore_boot_main() {
    let fixture = Fixture::new();
    let mut existing = expected_manifest();
    existing["urls"].as_array_mut().unwrap().push(json!([
        "main.py",
        "github:brainelectronics/micropython-package-validation/main.py"
    ]));
    fs::write(fixture.manifest_path(), existing.to_string()).unwrap();

    let packager = packager_with_manifest(&fixture);
    assert!(!packager.validate(&ValidationOptions::default()).unwrap());
    assert!(packager
        .validate(&ValidationOptions::new().ignore_boot_main(true))
        .unwrap());
}

#[test]
fn test_validation_diff_ignores_exclusions() {
    let fixture = Fixture::new();
    let mut existing = expected_manifest();
    existing["version"] = json!("0.0.1");
    fs::write(fixture.manifest_path(), existing.to_string()).unwrap();

    let packager = packager_with_manifest(&fixture);
    assert!(packager
        .validate(&ValidationOptions::new().ignore_version(true))
        .unwrap());

    let diff = packager.validation_diff().unwrap();
    assert_eq!(diff.len(), 1);
    let entry = &diff.entries()[0];
    assert_eq!(entry.path, "$.version");
    assert_eq!(entry.kind, ChangeKind::Changed);
    assert_eq!(entry.before, Some(json!("1.2.3")));
    assert_eq!(entry.after, Some(json!("0.0.1")));
}

#[test]
fn test_validation_diff_reports_missing_file() {
    let fixture = Fixture::new();
    let packager = packager_with_manifest(&fixture);
    packager.create(None, false).unwrap();

    fs::remove_file(fixture.path("other_files/page.tpl")).unwrap();

    assert!(!packager.validate(&ValidationOptions::default()).unwrap());
    let diff = packager.validation_diff().unwrap();
    let added: Vec<_> = diff.of_kind(ChangeKind::Added).collect();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].path, "$.urls[8]");
}

#[test]
fn test_scoped_dispatch_receives_events() {
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::registry().with(
        tracing_subscriber::fmt::layer()
            .with_writer(move || writer.clone())
            .with_ansi(false),
    );

    let fixture = Fixture::with_descriptor("url = \"https://github.com/o/r\"\n");
    let packager = Packager::builder(fixture.descriptor_path())
        .dispatch(tracing::Dispatch::new(subscriber))
        .build()
        .unwrap();
    packager.package_data().unwrap();

    let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("No 'version' key found in descriptor"));
    assert!(output.contains("No 'packages' key found in descriptor"));
}
