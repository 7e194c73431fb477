//! Drawing file lookup in the local drawing library.

use crate::pipeline::input::has_pdf_extension;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The drawing for `code`: a file directly inside `drawing_dir` whose name
/// starts with `code` and ends in `.pdf` (any case). When several match, the
/// lexicographically first file name wins. Subdirectories are not searched.
pub fn find_drawing_file(drawing_dir: &Path, code: &str) -> Option<PathBuf> {
    if code.is_empty() {
        return None;
    }
    let entries = match std::fs::read_dir(drawing_dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot list drawing dir '{}': {}", drawing_dir.display(), e);
            return None;
        }
    };

    let mut candidates: Vec<(String, PathBuf)> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let path = entry.path();
            let name = entry.file_name().to_str()?.to_string();
            (path.is_file() && name.starts_with(code) && has_pdf_extension(&path))
                .then_some((name, path))
        })
        .collect();
    candidates.sort_by(|a, b| a.0.cmp(&b.0));

    let found = candidates.into_iter().next().map(|(_, p)| p);
    debug!("Drawing for {}: {:?}", code, found);
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn prefix_match_first_name_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("YY60030058导线-B版.pdf"), b"%PDF").unwrap();
        fs::write(dir.path().join("YY60030058导线-A02版.PDF"), b"%PDF").unwrap();
        fs::write(dir.path().join("YY6003005.pdf"), b"%PDF").unwrap();
        fs::write(dir.path().join("YY60030058.txt"), b"x").unwrap();

        let found = find_drawing_file(dir.path(), "YY60030058").unwrap();
        assert_eq!(found.file_name().unwrap(), "YY60030058导线-A02版.PDF");
    }

    #[test]
    fn subdirectories_are_not_searched() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("old");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("YY1.pdf"), b"%PDF").unwrap();
        fs::create_dir(dir.path().join("YY1.pdf.d")).unwrap();
        assert_eq!(find_drawing_file(dir.path(), "YY1"), None);
    }

    #[test]
    fn missing_dir_finds_nothing() {
        assert_eq!(find_drawing_file(Path::new("/no/such/drawings"), "YY1"), None);
    }
}
