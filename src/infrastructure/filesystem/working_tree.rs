use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Whether a top-level entry name is hidden (`.git`, `.gitignore`, ...)
pub fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|name| name.starts_with('.')).unwrap_or(false)
}

/// Remove every non-hidden top-level entry of `dir`.
///
/// Hidden entries, including the repository metadata, are kept. A missing directory is
/// treated as already clear. Returns the removed paths.
pub fn clear_generated_content(dir: &Path) -> io::Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut removed = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if is_hidden(&entry.file_name()) {
            continue;
        }

        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
        removed.push(path);
    }

    removed.sort();
    Ok(removed)
}

/// Remove `dir` and everything below it, if present
pub fn remove_dir_if_exists(dir: &Path) -> io::Result<bool> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clear_keeps_hidden_entries() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::write(root.join(".gitignore"), "vendor/").unwrap();
        fs::create_dir_all(root.join("src/Api")).unwrap();
        fs::write(root.join("src/Api/Old.php"), "<?php").unwrap();
        fs::write(root.join("composer.json"), "{}").unwrap();

        let removed = clear_generated_content(root).unwrap();

        assert_eq!(removed, vec![root.join("composer.json"), root.join("src")]);
        assert!(root.join(".git/objects").is_dir());
        assert!(root.join(".gitignore").is_file());
        assert!(!root.join("src").exists());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("README.md"), "x").unwrap();

        assert_eq!(clear_generated_content(temp_dir.path()).unwrap().len(), 1);
        assert!(clear_generated_content(temp_dir.path()).unwrap().is_empty());
        assert!(clear_generated_content(&temp_dir.path().join("absent"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_remove_dir_if_exists() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("module");
        fs::create_dir_all(dir.join("src")).unwrap();

        assert!(remove_dir_if_exists(&dir).unwrap());
        assert!(!remove_dir_if_exists(&dir).unwrap());
    }
}
