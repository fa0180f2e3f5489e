use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Find files recursively in a directory that match a predicate
pub fn find_files<P, F>(path: P, predicate: &F) -> io::Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
    F: Fn(&Path) -> bool + ?Sized,
{
    let mut result = Vec::new();

    if !path.as_ref().exists() {
        return Ok(result);
    }

    if path.as_ref().is_file() {
        if predicate(path.as_ref()) {
            result.push(path.as_ref().to_path_buf());
        }
        return Ok(result);
    }

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();

        if entry_path.is_file() {
            if predicate(&entry_path) {
                result.push(entry_path);
            }
        } else if entry_path.is_dir() {
            let mut sub_results = find_files(&entry_path, predicate)?;
            result.append(&mut sub_results);
        }
    }

    Ok(result)
}

/// Find files with a specific extension
pub fn find_files_with_extension<P: AsRef<Path>>(path: P, extension: &str) -> io::Result<Vec<PathBuf>> {
    let extension_lower = extension.to_lowercase();
    find_files(path, &move |p: &Path| match p.extension() {
        Some(ext) => ext.to_string_lossy().to_lowercase() == extension_lower,
        None => false,
    })
}

/// List the immediate subdirectories of a path, in directory order.
///
/// Returns an empty list when the path does not exist (not every root has to
/// be populated).
pub fn list_subdirectories<P: AsRef<Path>>(path: P) -> io::Result<Vec<PathBuf>> {
    let mut result = Vec::new();

    if !path.as_ref().exists() {
        return Ok(result);
    }

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();
        if entry_path.is_dir() {
            result.push(entry_path);
        }
    }

    Ok(result)
}

/// Split a path relative to `base` into its directory segments plus the file
/// stem. Fragment files map onto nested key-paths this way: directory
/// segments nest, the stem becomes the leaf key.
pub fn relative_key_path(base: &Path, file: &Path) -> Option<Vec<String>> {
    let rel = file.strip_prefix(base).ok()?;
    let mut segments: Vec<String> = Vec::new();

    for component in rel.parent().into_iter().flat_map(|p| p.components()) {
        segments.push(component.as_os_str().to_string_lossy().into_owned());
    }

    let stem = rel.file_stem()?.to_string_lossy().into_owned();
    segments.push(stem);
    Some(segments)
}
