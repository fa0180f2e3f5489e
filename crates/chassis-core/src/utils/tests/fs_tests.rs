use std::fs;
use std::path::Path;

use tempfile::tempdir;

use crate::utils::fs::{
    find_files, find_files_with_extension, list_subdirectories, relative_key_path,
};

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, "").unwrap();
}

#[test]
fn test_find_files_recurses_with_predicate() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a.json"));
    touch(&dir.path().join("nested/b.json"));
    touch(&dir.path().join("nested/c.txt"));

    let mut found = find_files(dir.path(), &|p: &Path| {
        p.extension().is_some_and(|e| e == "json")
    })
    .unwrap();
    found.sort();

    assert_eq!(found, vec![dir.path().join("a.json"), dir.path().join("nested/b.json")]);
}

#[test]
fn test_find_files_on_missing_path_is_empty() {
    let dir = tempdir().unwrap();
    let found = find_files(dir.path().join("nope"), &|_: &Path| true).unwrap();
    assert!(found.is_empty());
}

#[test]
fn test_find_files_with_extension_is_case_insensitive() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("upper.JSON"));
    touch(&dir.path().join("lower.json"));
    touch(&dir.path().join("other.yaml"));

    let found = find_files_with_extension(dir.path(), "json").unwrap();
    assert_eq!(found.len(), 2);
}

#[test]
fn test_list_subdirectories_skips_files() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("one")).unwrap();
    fs::create_dir_all(dir.path().join("two")).unwrap();
    touch(&dir.path().join("file.txt"));

    let mut subdirs = list_subdirectories(dir.path()).unwrap();
    subdirs.sort();
    assert_eq!(subdirs, vec![dir.path().join("one"), dir.path().join("two")]);
}

#[test]
fn test_list_subdirectories_of_missing_path_is_empty() {
    let dir = tempdir().unwrap();
    assert!(list_subdirectories(dir.path().join("nope")).unwrap().is_empty());
}

#[test]
fn test_relative_key_path_splits_segments_and_stem() {
    let base = Path::new("/conf");

    assert_eq!(
        relative_key_path(base, Path::new("/conf/index.json")),
        Some(vec!["index".to_string()])
    );
    assert_eq!(
        relative_key_path(base, Path::new("/conf/db/settings.json")),
        Some(vec!["db".to_string(), "settings".to_string()])
    );
    assert_eq!(relative_key_path(base, Path::new("/other/index.json")), None);
}
