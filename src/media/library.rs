// Filesystem photo library rooted at the locally synchronized storage mirror.
//
// Layout: <root>/kpop_images/<group>/<member>/<member>__NN.<ext>

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::content_hash::{content_hash, content_hash_file};
use super::{normalize_member_key, MediaError, MediaStore};

/// Directory under the root holding group/member photo folders.
pub const PHOTOS_DIR: &str = "kpop_images";
/// Cover image shown with the main menu, relative to the root.
pub const COVER_IMAGE_PATH: &str = "cover_image/cover1.png";
/// Largest photo accepted for upload.
pub const MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

/// Local photo library with an in-memory member index.
pub struct PhotoLibrary {
    root: PathBuf,
    /// Normalized member key -> photo paths relative to `root`.
    index: RwLock<HashMap<String, Vec<PathBuf>>>,
}

impl PhotoLibrary {
    /// Open the library at `root` and index every photo found there.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let index = scan_photos(&root);
        tracing::info!(
            root = %root.display(),
            members = index.len(),
            "Photo library indexed"
        );
        Self {
            root,
            index: RwLock::new(index),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn member_dir(&self, group_key: &str, member: &str) -> PathBuf {
        self.root.join(PHOTOS_DIR).join(group_key).join(member)
    }

    /// Next free file name `<member>__NN<ext>` in the member's folder.
    ///
    /// Numbers start at 01 and gaps left by deleted files are reused.
    pub fn next_member_filename(
        &self,
        group_key: &str,
        member: &str,
        extension: &str,
    ) -> Result<String, MediaError> {
        check_component(group_key)?;
        check_component(member)?;
        let dir = self.member_dir(group_key, member);
        std::fs::create_dir_all(&dir)?;

        let prefix = format!("{member}__");
        let mut used = BTreeSet::new();
        for entry in std::fs::read_dir(&dir)?.flatten() {
            let path = entry.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(n) = stem.strip_prefix(&prefix).and_then(leading_two_digits) {
                used.insert(n);
            }
        }

        let mut n = 1;
        while used.contains(&n) {
            n += 1;
        }
        Ok(format!("{member}__{n:02}{}", normalize_extension(extension)))
    }
}

impl MediaStore for PhotoLibrary {
    fn fetch_images(&self, member: &str) -> Vec<Vec<u8>> {
        let key = normalize_member_key(member);
        let paths = match self.index.read() {
            Ok(index) => index.get(&key).cloned().unwrap_or_default(),
            Err(_) => return Vec::new(),
        };
        paths
            .iter()
            .filter_map(|rel| match std::fs::read(self.root.join(rel)) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    tracing::warn!(path = %rel.display(), "Failed to read photo: {e}");
                    None
                }
            })
            .collect()
    }

    fn has_images(&self, member: &str) -> bool {
        let key = normalize_member_key(member);
        self.index
            .read()
            .map(|index| index.get(&key).is_some_and(|paths| !paths.is_empty()))
            .unwrap_or(false)
    }

    fn store_image(
        &self,
        group_key: &str,
        member: &str,
        data: &[u8],
        extension: &str,
    ) -> Result<PathBuf, MediaError> {
        check_component(group_key)?;
        check_component(member)?;
        let dir = self.member_dir(group_key, member);
        std::fs::create_dir_all(&dir)?;

        let new_hash = content_hash(data);
        for entry in std::fs::read_dir(&dir)?.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match content_hash_file(&path) {
                Ok(existing) if existing == new_hash => return Err(MediaError::Duplicate),
                Ok(_) => {}
                Err(e) => tracing::warn!(path = %path.display(), "Skipping unreadable photo: {e}"),
            }
        }

        let filename = self.next_member_filename(group_key, member, extension)?;
        let path = dir.join(&filename);
        std::fs::write(&path, data)?;

        let rel = Path::new(PHOTOS_DIR).join(group_key).join(member).join(&filename);
        if let Ok(mut index) = self.index.write() {
            index
                .entry(normalize_member_key(member))
                .or_default()
                .push(rel);
        }
        tracing::info!(group = group_key, member, file = %filename, "Stored uploaded photo");
        Ok(path)
    }

    fn upload_groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = list_dirs(&self.root.join(PHOTOS_DIR))
            .into_iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_lowercase))
            .collect();
        groups.sort();
        groups.dedup();
        groups
    }

    fn cover_image(&self) -> Option<Vec<u8>> {
        std::fs::read(self.root.join(COVER_IMAGE_PATH)).ok()
    }
}

/// Build the member index. Each member folder is reachable by its full name and by
/// each whitespace-separated token of it, so "Bang Chan" also answers to "Chan".
fn scan_photos(root: &Path) -> HashMap<String, Vec<PathBuf>> {
    let mut index: HashMap<String, Vec<PathBuf>> = HashMap::new();
    for group_dir in list_dirs(&root.join(PHOTOS_DIR)) {
        for member_dir in list_dirs(&group_dir) {
            let Some(name) = member_dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let mut files: Vec<PathBuf> = match std::fs::read_dir(&member_dir) {
                Ok(entries) => entries
                    .flatten()
                    .map(|e| e.path())
                    .filter(|p| p.is_file())
                    .collect(),
                Err(_) => continue,
            };
            if files.is_empty() {
                continue;
            }
            files.sort();
            let rel_paths: Vec<PathBuf> = files
                .iter()
                .filter_map(|f| f.strip_prefix(root).ok().map(Path::to_path_buf))
                .collect();

            let mut keys: BTreeSet<String> = name.split_whitespace().map(normalize_member_key).collect();
            keys.insert(normalize_member_key(name));
            for key in keys {
                index.entry(key).or_default().extend(rel_paths.iter().cloned());
            }
        }
    }
    index
}

fn list_dirs(dir: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect(),
        Err(_) => Vec::new(),
    };
    dirs.sort();
    dirs
}

fn leading_two_digits(s: &str) -> Option<u32> {
    let digits = s.get(..2)?;
    if digits.chars().all(|c| c.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

fn normalize_extension(extension: &str) -> String {
    let ext = extension.trim().trim_start_matches('.');
    if ext.is_empty() {
        ".jpg".to_string()
    } else {
        format!(".{ext}")
    }
}

/// Reject names that would escape the member's folder.
fn check_component(name: &str) -> Result<(), MediaError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(|c: char| c == '/' || c == '\\') {
        return Err(MediaError::InvalidName(name.to_string()));
    }
    Ok(())
}
