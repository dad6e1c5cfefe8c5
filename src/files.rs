use std::ffi::OsStr;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::warn;
use walkdir::WalkDir;

/// Recursively collects the regular files under `root` whose extension
/// is in `extensions`, sorted by path.
///
/// Entries that can't be read (permissions, broken links) are logged and
/// skipped.  Symlinks are not followed.
pub fn find_files(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| has_extension(entry.path(), extensions))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Case-insensitive extension check.  `extensions` are given without the
/// leading dot.
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(OsStr::to_str) {
        Some(ext) => extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

pub fn load_file_bytes(path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
}

/// Replaces the contents of the file at `path` with `bytes`.
///
/// The original file is untouched unless the new contents were written
/// completely.
pub fn save_bytes_to_file(bytes: &[u8], path: &Path) -> io::Result<()> {
    replace_file_with(path, |w| w.write_all(bytes))
}

/// Writes new contents for `path` into a temporary file next to it, then
/// renames it over `path`.  If `write` fails the temporary file is
/// removed and `path` keeps its old contents.
fn replace_file_with<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;

    {
        let mut f = BufWriter::new(tmp.as_file_mut());
        write(&mut f)?;
        f.flush()?;
    }
    tmp.as_file().sync_all()?;

    // Keep the original's permissions rather than the temp file's 0600.
    if let Ok(metadata) = fs::metadata(path) {
        tmp.as_file().set_permissions(metadata.permissions())?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn has_extension_01() {
        let list = exts(&["c", "cpp", "h"]);
        assert!(has_extension(Path::new("main.cpp"), &list));
        assert!(has_extension(Path::new("dir/Main.CPP"), &list));
        assert!(has_extension(Path::new("a/b/util.H"), &list));
        assert!(!has_extension(Path::new("main.cc"), &list));
        assert!(!has_extension(Path::new("Makefile"), &list));
        assert!(!has_extension(Path::new("notes.c.txt"), &list));
        assert!(!has_extension(Path::new(".c"), &list));
    }

    #[test]
    fn find_files_01() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::write(root.join("main.CPP"), b"").unwrap();
        fs::write(root.join("readme.md"), b"").unwrap();
        fs::write(root.join("src/util.h"), b"").unwrap();
        fs::write(root.join("src/nested/impl.c"), b"").unwrap();
        fs::write(root.join("src/nested/impl.o"), b"").unwrap();
        fs::create_dir_all(root.join("dir.c")).unwrap();

        let found = find_files(root, &exts(&["c", "cpp", "h"]));
        assert_eq!(
            found,
            vec![
                root.join("main.CPP"),
                root.join("src/nested/impl.c"),
                root.join("src/util.h"),
            ]
        );
    }

    #[test]
    fn find_files_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_files(dir.path(), &exts(&["c"])).is_empty());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.h");
        fs::write(&path, b"something much longer than the new contents").unwrap();

        save_bytes_to_file(b"short", &path).unwrap();
        assert_eq!(load_file_bytes(&path).unwrap(), b"short".to_vec());
    }

    #[test]
    fn failed_save_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keep.cpp");
        let original = vec![b'o'; 500];
        fs::write(&path, &original).unwrap();

        // Fail partway through, like a full disk would.
        let result = replace_file_with(&path, |w| {
            w.write_all(&[b'n'; 1024])?;
            Err(io::Error::new(io::ErrorKind::Other, "file too large"))
        });

        assert!(result.is_err());
        assert_eq!(load_file_bytes(&path).unwrap(), original);

        // No temporary file left behind.
        let entries: Vec<PathBuf> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(entries, vec![path]);
    }

    #[cfg(unix)]
    #[test]
    fn save_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.h");
        fs::write(&path, b"old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        save_bytes_to_file(b"new", &path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
