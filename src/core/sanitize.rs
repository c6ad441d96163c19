//! Device-safe filenames
//!
//! Sampler file systems accept a narrow character set. Every function here
//! is pure and idempotent: feeding a result back in returns it unchanged.

use crate::domain::sample::DEFAULT_SAMPLE_NAME;
use unicode_normalization::UnicodeNormalization;

/// Longest filename accepted by the device file system
pub const MAX_FILENAME_LEN: usize = 255;

/// Sanitize a filename with the default length limit
///
/// The input is split at its last `.`. The stem is folded to
/// `[A-Za-z0-9_-]` and the extension to lower-case ASCII alphanumerics.
///
/// ```
/// use padkit::core::sanitize::sanitize_filename;
///
/// assert_eq!(sanitize_filename("Café  Kick (v2).WAV"), "Cafe_Kick_v2.wav");
/// assert_eq!(sanitize_filename("???.wav"), "sample.wav");
/// ```
pub fn sanitize_filename(filename: &str) -> String {
    sanitize_filename_with_limit(filename, MAX_FILENAME_LEN)
}

/// Sanitize a filename so the result fits `max_len`
///
/// The stem is truncated first. An extension too long to leave room for a
/// one-character stem is truncated as well, and below three characters the
/// extension is dropped.
pub fn sanitize_filename_with_limit(filename: &str, max_len: usize) -> String {
    let (stem, mut extension) = match filename.rfind('.') {
        Some(dot) => (&filename[..dot], sanitize_extension(&filename[dot + 1..])),
        None => (filename, String::new()),
    };

    if max_len < 3 {
        extension.clear();
    } else {
        extension = truncate(extension, max_len - 2);
    }

    let reserved = if extension.is_empty() {
        0
    } else {
        extension.len() + 1
    };
    let stem_limit = max_len.saturating_sub(reserved).max(1);
    let stem = truncate(sanitize_stem(stem, DEFAULT_SAMPLE_NAME), stem_limit);

    if extension.is_empty() {
        stem
    } else {
        format!("{stem}.{extension}")
    }
}

/// Sanitize a single directory name, substituting `fallback` when nothing survives
pub fn sanitize_component(name: &str, fallback: &str) -> String {
    truncate(sanitize_stem(name, fallback), MAX_FILENAME_LEN)
}

/// Minimal cleanup used when sanitizing is switched off
///
/// Only characters that would change the target directory are replaced.
pub fn escape_path_separators(filename: &str) -> String {
    let escaped: String = filename
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect();

    if escaped.trim().is_empty() || escaped == "." || escaped == ".." {
        DEFAULT_SAMPLE_NAME.to_string()
    } else {
        escaped
    }
}

fn sanitize_stem(stem: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut previous_separator = false;

    for c in stem.nfkd().filter(char::is_ascii) {
        let c = if c.is_ascii_whitespace() { '_' } else { c };
        if !(c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            continue;
        }

        let separator = c == '_' || c == '-';
        if separator && previous_separator {
            continue;
        }
        previous_separator = separator;
        out.push(c);
    }

    let trimmed = out.trim_start_matches(['.', '-', '_']);
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

fn sanitize_extension(extension: &str) -> String {
    extension
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// Input is ASCII after sanitize_stem, so byte length equals char count.
fn truncate(mut value: String, max_len: usize) -> String {
    if value.len() > max_len {
        value.truncate(max_len);
    }
    value
}
