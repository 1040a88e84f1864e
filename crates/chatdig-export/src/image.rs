//! Sidecar image lookup.
//!
//! Images attached to messages live next to the data store, named after a
//! shared identifier: `<root>/users/<db>/images/<id><ext>` with an optional
//! `<id>_thumb<ext>` thumbnail.

use std::path::{Path, PathBuf};

/// Extensions probed after the mime-derived one, in order.
const FALLBACK_EXTENSIONS: [&str; 6] = [".png", ".jpg", ".jpeg", ".gif", ".webp", ".bmp"];

/// Resolved image and thumbnail, relative to the data root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidecarImages {
    pub image: Option<PathBuf>,
    pub thumb: Option<PathBuf>,
}

/// Finds sidecar images for one database.
#[derive(Debug, Clone)]
pub struct ImageLocator {
    root: PathBuf,
    images_dir: PathBuf,
}

impl ImageLocator {
    pub fn new(root: &Path, db_name: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            images_dir: root.join("users").join(db_name).join("images"),
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Resolve the image and thumbnail stored under `id`.
    ///
    /// Extensions are tried mime-derived first, then the fallback list; the
    /// thumbnail must share the image's extension. If no extension matches,
    /// every directory entry whose name starts with `id` is considered in
    /// name order and the last match wins.
    pub fn locate(&self, id: &str, mime_type: Option<&str>) -> SidecarImages {
        if id.is_empty() || id.contains(['/', '\\']) || !self.images_dir.is_dir() {
            return SidecarImages::default();
        }

        for ext in candidate_extensions(mime_type) {
            let image = self.images_dir.join(format!("{id}{ext}"));
            if image.exists() {
                let thumb = self.images_dir.join(format!("{id}_thumb{ext}"));
                return SidecarImages {
                    image: Some(self.relative(&image)),
                    thumb: thumb.exists().then(|| self.relative(&thumb)),
                };
            }
        }

        self.prefix_match(id)
    }

    fn prefix_match(&self, id: &str) -> SidecarImages {
        let mut matches: Vec<PathBuf> = match std::fs::read_dir(&self.images_dir) {
            Ok(entries) => entries
                .filter_map(Result::ok)
                .filter(|e| e.file_name().to_string_lossy().starts_with(id))
                .map(|e| e.path())
                .collect(),
            Err(e) => {
                tracing::warn!("Failed to list {}: {}", self.images_dir.display(), e);
                return SidecarImages::default();
            }
        };
        matches.sort();

        let mut image = None;
        let mut thumb = None;
        for path in &matches {
            let name = file_name(path);
            if name.ends_with("_thumb.png") || name.ends_with("_thumb.jpg") {
                thumb = Some(path);
            } else if path.is_file() {
                image = Some(path);
            }
        }
        if image.is_some() && thumb.is_none() {
            thumb = matches.iter().find(|p| file_name(p).contains("_thumb"));
        }
        if matches.len() > 1 {
            tracing::debug!("{} files match image id {id}", matches.len());
        }

        SidecarImages {
            image: image.map(|p| self.relative(p)),
            thumb: thumb.map(|p| self.relative(p)),
        }
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Mime-derived extension first, then the fallbacks, without repeats.
fn candidate_extensions(mime_type: Option<&str>) -> Vec<String> {
    let mut exts = Vec::with_capacity(FALLBACK_EXTENSIONS.len() + 1);
    if let Some((_, subtype)) = mime_type.and_then(|m| m.rsplit_once('/')) {
        exts.push(format!(".{}", subtype.to_lowercase()));
    }
    for ext in FALLBACK_EXTENSIONS {
        if !exts.iter().any(|e| e == ext) {
            exts.push(ext.to_string());
        }
    }
    exts
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup(files: &[&str]) -> (TempDir, ImageLocator) {
        let tmp = TempDir::new().unwrap();
        let locator = ImageLocator::new(tmp.path(), "alice@host");
        std::fs::create_dir_all(locator.images_dir()).unwrap();
        for f in files {
            std::fs::write(locator.images_dir().join(f), b"img").unwrap();
        }
        (tmp, locator)
    }

    fn rel(name: &str) -> Option<PathBuf> {
        Some(Path::new("users/alice@host/images").join(name))
    }

    #[test]
    fn extension_order() {
        assert_eq!(
            candidate_extensions(Some("image/WEBP")),
            [".webp", ".png", ".jpg", ".jpeg", ".gif", ".bmp"]
        );
        assert_eq!(candidate_extensions(Some("image/png"))[0], ".png");
        assert_eq!(candidate_extensions(Some("png")).len(), 6);
        assert_eq!(candidate_extensions(None)[0], ".png");
    }

    #[test]
    fn mime_extension_wins() {
        let (_tmp, locator) = setup(&["abc.png", "abc.gif", "abc_thumb.gif"]);
        let found = locator.locate("abc", Some("image/gif"));
        assert_eq!(found.image, rel("abc.gif"));
        assert_eq!(found.thumb, rel("abc_thumb.gif"));
    }

    #[test]
    fn fallback_extension_without_thumb() {
        let (_tmp, locator) = setup(&["abc.jpg", "abc_thumb.png"]);
        let found = locator.locate("abc", None);
        assert_eq!(found.image, rel("abc.jpg"));
        assert_eq!(found.thumb, None);
    }

    #[test]
    fn prefix_match_fallback() {
        let (_tmp, locator) = setup(&["abc.tiff", "abc_thumb.jpg"]);
        let found = locator.locate("abc", Some("image/tiff"));
        // .tiff is the mime-derived extension, so it matches directly
        assert_eq!(found.image, rel("abc.tiff"));

        let (_tmp, locator) = setup(&["abc.heic", "abc_thumb.jpg"]);
        let found = locator.locate("abc", None);
        assert_eq!(found.image, rel("abc.heic"));
        assert_eq!(found.thumb, rel("abc_thumb.jpg"));
    }

    #[test]
    fn prefix_match_secondary_thumb() {
        let (_tmp, locator) = setup(&["abc", "abc_thumb.heic"]);
        let found = locator.locate("abc", None);
        // "abc_thumb.heic" sorts last and is a regular file, so it is the image
        assert_eq!(found.image, rel("abc_thumb.heic"));
        assert_eq!(found.thumb, rel("abc_thumb.heic"));
    }

    #[test]
    fn nothing_found() {
        let (_tmp, locator) = setup(&["other.png"]);
        assert_eq!(locator.locate("abc", None), SidecarImages::default());
    }

    #[test]
    fn missing_images_dir() {
        let tmp = TempDir::new().unwrap();
        let locator = ImageLocator::new(tmp.path(), "nobody");
        assert_eq!(locator.locate("abc", None), SidecarImages::default());
    }

    #[test]
    fn rejects_path_like_ids() {
        let (_tmp, locator) = setup(&["abc.png"]);
        assert_eq!(locator.locate("../images/abc", None), SidecarImages::default());
    }
}
