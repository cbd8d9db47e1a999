// Filesystem output for rendered graphs

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const MAX_SLUG_LEN: usize = 80;
const HASH_PREFIX_LEN: usize = 12;

/// Turns an id into a filesystem-legal file stem.
///
/// The readable slug alone can collide (`/a-b` and `/a/b`), so a prefix of the
/// id's blake3 hash is appended.
pub fn safe_filename(id: &str) -> String {
    let without_scheme = id.split_once("://").map(|(_, rest)| rest).unwrap_or(id);

    let mut slug = String::with_capacity(without_scheme.len());
    let mut last_was_dash = false;
    for c in without_scheme.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }

    let mut slug = slug.trim_matches('-').to_string();
    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        slug = slug.trim_end_matches('-').to_string();
    }
    if slug.is_empty() {
        slug.push_str("page");
    }

    let hash = blake3::hash(id.as_bytes()).to_hex();
    format!("{}-{}", slug, &hash[..HASH_PREFIX_LEN])
}

/// Writes one `<safe_filename>.md` per entry into `directory`, creating it if needed.
/// Returns the written paths in input order.
pub fn write_many(directory: &Path, rendered: &[(String, String)]) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(directory)?;

    let mut written = Vec::with_capacity(rendered.len());
    for (id, text) in rendered {
        let path = directory.join(format!("{}.md", safe_filename(id)));
        fs::write(&path, text)?;
        written.push(path);
    }

    Ok(written)
}

pub fn write_one(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)
}
