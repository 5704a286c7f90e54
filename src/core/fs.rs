//! File helpers shared by the JSON stores

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Sibling path a store writes to before renaming over `path`
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_path_is_sibling() {
        assert_eq!(
            temp_path(Path::new("data/settings.json")),
            PathBuf::from("data/settings.json.tmp")
        );
    }
}
