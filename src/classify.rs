use serde::{Deserialize, Serialize};

/// Fallback MIME type for unmapped or missing extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Media category derived from a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    Audio,
    Image,
    Other,
    Pdf,
    Text,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub mime_type: &'static str,
    pub category: ContentCategory,
}

impl Classification {
    const fn new(mime_type: &'static str, category: ContentCategory) -> Self {
        Self {
            mime_type,
            category,
        }
    }
}

/// Classify a filename by its extension alone. The match is case-sensitive and
/// never looks at file content.
pub fn classify(filename: &str) -> Classification {
    use ContentCategory::*;

    match extension(filename) {
        Some(".mp4") => Classification::new("video/mp4", Video),
        Some(".mov") => Classification::new("video/quicktime", Video),
        Some(".avi") => Classification::new("video/x-msvideo", Video),
        Some(".webm") => Classification::new("video/webm", Video),
        Some(".mp3") => Classification::new("audio/mpeg", Audio),
        Some(".wav") => Classification::new("audio/wav", Audio),
        Some(".ogg") => Classification::new("audio/ogg", Audio),
        Some(".jpg") | Some(".jpeg") => Classification::new("image/jpeg", Image),
        Some(".png") => Classification::new("image/png", Image),
        Some(".gif") => Classification::new("image/gif", Image),
        Some(".webp") => Classification::new("image/webp", Image),
        Some(".pdf") => Classification::new("application/pdf", Pdf),
        Some(".txt") => Classification::new("text/plain", Text),
        Some(".html") | Some(".htm") => Classification::new("text/html", Text),
        Some(".json") => Classification::new("application/json", Text),
        Some(".xml") => Classification::new("application/xml", Text),
        _ => Classification::new(OCTET_STREAM, Other),
    }
}

/// Extension of the last path element, including the leading dot.
fn extension(filename: &str) -> Option<&str> {
    let base = filename.rsplit('/').next().unwrap_or(filename);
    base.rfind('.').map(|idx| &base[idx..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_mapped_extensions() {
        let cases = [
            ("clip.mp4", "video/mp4", ContentCategory::Video),
            ("clip.mov", "video/quicktime", ContentCategory::Video),
            ("clip.avi", "video/x-msvideo", ContentCategory::Video),
            ("clip.webm", "video/webm", ContentCategory::Video),
            ("song.mp3", "audio/mpeg", ContentCategory::Audio),
            ("song.wav", "audio/wav", ContentCategory::Audio),
            ("song.ogg", "audio/ogg", ContentCategory::Audio),
            ("photo.jpg", "image/jpeg", ContentCategory::Image),
            ("photo.jpeg", "image/jpeg", ContentCategory::Image),
            ("photo.png", "image/png", ContentCategory::Image),
            ("anim.gif", "image/gif", ContentCategory::Image),
            ("photo.webp", "image/webp", ContentCategory::Image),
            ("paper.pdf", "application/pdf", ContentCategory::Pdf),
            ("notes.txt", "text/plain", ContentCategory::Text),
            ("page.html", "text/html", ContentCategory::Text),
            ("page.htm", "text/html", ContentCategory::Text),
            ("data.json", "application/json", ContentCategory::Text),
            ("data.xml", "application/xml", ContentCategory::Text),
        ];

        for (name, mime, category) in cases {
            let c = classify(name);
            assert_eq!(c.mime_type, mime, "mime for {name}");
            assert_eq!(c.category, category, "category for {name}");
        }
    }

    #[test]
    fn test_classify_unmapped_falls_back() {
        for name in ["archive.zip", "README", "", "trailing.", "photo.JPG"] {
            let c = classify(name);
            assert_eq!(c.mime_type, OCTET_STREAM, "mime for {name:?}");
            assert_eq!(c.category, ContentCategory::Other);
        }
    }

    #[test]
    fn test_classify_uses_last_extension_only() {
        assert_eq!(classify("backup.mp4.zip").category, ContentCategory::Other);
        assert_eq!(classify("1700000000-clip.tar.mp4").mime_type, "video/mp4");
    }

    #[test]
    fn test_extension_ignores_dots_in_directories() {
        assert_eq!(extension("some.dir/README"), None);
        assert_eq!(extension("some.dir/movie.webm"), Some(".webm"));
    }
}
