// ABOUTME: Backup directory layout with atomic per-tag file writes
// ABOUTME: Sanitizes tag names into portable markdown filenames

use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BACKUP_DIR: &str = "backups";

const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if INVALID_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

pub struct BackupDir {
    pub root: PathBuf,
}

impl BackupDir {
    pub fn new(root: Option<PathBuf>) -> Self {
        BackupDir {
            root: root.unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_DIR)),
        }
    }

    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.md", sanitize_filename(name)))
    }

    /// Replaces `<root>/<name>.md` with `content` and returns its path.
    pub fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        self.ensure()?;
        let path = self.path_for(name);
        write_atomic(&path, content.as_bytes(), &self.root)?;
        Ok(path)
    }
}

pub fn write_atomic(path: &Path, content: &[u8], tmp_dir: &Path) -> Result<()> {
    use rand::Rng;

    let random: u32 = rand::thread_rng().gen();
    let tmp_path = tmp_dir.join(format!(".{:x}.part", random));

    fs::write(&tmp_path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        fs::set_permissions(&tmp_path, perms)?;
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_filename_replaces_each_char() {
        assert_eq!(sanitize_filename(r#"a<b>c:d"e/f\g|h?i*j"#), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_filename("//"), "__");
    }

    #[test]
    fn test_sanitize_filename_keeps_other_chars() {
        assert_eq!(sanitize_filename("Tech"), "Tech");
        assert_eq!(sanitize_filename("Slow Reads.2024 ü"), "Slow Reads.2024 ü");
    }

    #[test]
    fn test_backup_dir_default_root() {
        assert_eq!(BackupDir::new(None).root, PathBuf::from("backups"));
    }

    #[test]
    fn test_path_for_sanitizes() {
        let dir = BackupDir::new(Some(PathBuf::from("out")));
        assert_eq!(dir.path_for("a/b"), PathBuf::from("out").join("a_b.md"));
    }

    #[test]
    fn test_write_creates_directory_and_file() {
        let temp = TempDir::new().unwrap();
        let dir = BackupDir::new(Some(temp.path().join("nested").join("backups")));

        let path = dir.write("Tech", "# Tag: Tech\n\n").unwrap();

        assert_eq!(path, dir.root.join("Tech.md"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Tag: Tech\n\n");
    }

    #[test]
    fn test_write_overwrites_existing() {
        let temp = TempDir::new().unwrap();
        let dir = BackupDir::new(Some(temp.path().to_path_buf()));

        dir.write("Tech", "old content that is longer").unwrap();
        let path = dir.write("Tech", "new").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "new");
    }

    #[test]
    fn test_write_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let dir = BackupDir::new(Some(temp.path().to_path_buf()));
        dir.write("Tech", "x").unwrap();

        let names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["Tech.md"]);
    }

    #[test]
    #[cfg(unix)]
    fn test_write_atomic_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let target = temp.path().join("test.md");
        write_atomic(&target, b"hello", temp.path()).unwrap();

        let perms = fs::metadata(&target).unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }
}
