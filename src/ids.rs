//! Identifier generation for uploaded files and snippets.
//!
//! File ids are `<unix nanos>-<base name>` and are not checked for collisions;
//! the object store refuses to overwrite an existing key instead. Snippet ids
//! are short random strings checked against the live store by the caller.

use chrono::Utc;
use rand::Rng;

/// Alphabet snippet ids are drawn from.
pub const SNIPPET_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of a snippet id.
pub const SNIPPET_ID_LEN: usize = 3;

/// Number of distinct snippet ids (36^3).
pub const SNIPPET_ID_SPACE: usize = 46_656;

/// Strip directory components from a client-supplied name.
///
/// Returns `None` for names that have no usable final component (empty, `.`
/// or `..`), which would otherwise resolve outside the backing directory.
pub fn sanitize_name(raw: &str) -> Option<&str> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    match base {
        "" | "." | ".." => None,
        name => Some(name),
    }
}

/// Build a new file id for an upload named `original_name`.
pub fn new_file_id(original_name: &str) -> Option<String> {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    file_id_at(nanos, original_name)
}

fn file_id_at(nanos: i64, original_name: &str) -> Option<String> {
    sanitize_name(original_name).map(|base| format!("{nanos}-{base}"))
}

/// Draw one candidate snippet id.
pub fn random_snippet_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SNIPPET_ID_LEN)
        .map(|_| SNIPPET_ALPHABET[rng.gen_range(0..SNIPPET_ALPHABET.len())] as char)
        .collect()
}

/// Draw candidates until one is not taken.
///
/// Callers must guarantee at least one free id exists, otherwise this never
/// returns.
pub fn generate_snippet_id<R, F>(rng: &mut R, is_taken: F) -> String
where
    R: Rng + ?Sized,
    F: Fn(&str) -> bool,
{
    loop {
        let candidate = random_snippet_id(rng);
        if !is_taken(&candidate) {
            return candidate;
        }
    }
}
