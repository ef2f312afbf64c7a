use serde::{Deserialize, Serialize};

/// Metadata for an uploaded file. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    /// Name submitted by the client, used for display and download headers
    pub original_name: String,
    /// Key of the object in backing storage
    pub stored_name: String,
}

impl FileRecord {
    /// A record whose stored name is its id.
    pub fn new(id: impl Into<String>, original_name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            stored_name: id.clone(),
            original_name: original_name.into(),
            id,
        }
    }
}

/// A text snippet.
///
/// The id is the key of the snapshot map and is not repeated inside the
/// serialized value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    #[serde(skip)]
    pub id: String,
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub burn_after_reading: bool,
}

impl Snippet {
    /// Title stored when the client leaves it empty.
    pub const UNTITLED: &'static str = "None";

    pub fn new(title: &str, text: impl Into<String>, burn_after_reading: bool) -> Self {
        let title = if title.is_empty() {
            Self::UNTITLED.to_string()
        } else {
            title.to_string()
        };
        Self {
            id: String::new(),
            title,
            text: text.into(),
            burn_after_reading,
        }
    }
}
