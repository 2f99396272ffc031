//! Original <-> derivative file names.
//!
//! A derivative's final path segment is the original's stem, the `_Mark` marker, then the
//! original's extension (`jpg` when it had none). Deriving is normalize-then-append: a name that
//! already carries the marker keeps exactly one.

use crate::media::reference::MediaRef;

/// Marker appended to the stem of a derivative.
pub const MARK_SUFFIX: &str = "_Mark";
/// Extension used when the source name has none.
pub const DEFAULT_EXT: &str = "jpg";

/// Derivative file name for `reference` (final segment only, query and fragment dropped).
pub fn derive_derivative_name(reference: &str) -> String {
    let (_, segment) = split_reference(reference);
    let (stem, ext) = split_ext(segment);
    let base = stem.strip_suffix(MARK_SUFFIX).unwrap_or(stem);
    format!("{base}{MARK_SUFFIX}.{}", ext.unwrap_or(DEFAULT_EXT))
}

/// Original file name for a derivative, or `None` when `reference` is not a derivative.
pub fn derive_original_name(reference: &str) -> Option<String> {
    let (_, segment) = split_reference(reference);
    let (stem, ext) = split_ext(segment);
    let base = stem.strip_suffix(MARK_SUFFIX).filter(|b| !b.is_empty())?;
    Some(match ext {
        Some(ext) => format!("{base}.{ext}"),
        None => base.to_owned(),
    })
}

/// Like [`derive_derivative_name`] but keeps the directory prefix of `reference`.
pub fn derive_derivative_reference(reference: &str) -> String {
    let (dir, _) = split_reference(reference);
    format!("{dir}{}", derive_derivative_name(reference))
}

/// Like [`derive_original_name`] but keeps the directory prefix of `reference`.
pub fn derive_original_reference(reference: &str) -> Option<String> {
    let (dir, _) = split_reference(reference);
    derive_original_name(reference).map(|name| format!("{dir}{name}"))
}

pub fn is_derivative(reference: &str) -> bool {
    derive_original_name(reference).is_some()
}

/// Derivative check on a media reference; volatile references are judged by their artifact name.
pub fn is_derivative_ref(media: &MediaRef) -> bool {
    is_derivative(media.as_str())
}

/// `(directory prefix including its trailing '/', final segment)`, query and fragment removed.
fn split_reference(reference: &str) -> (&str, &str) {
    let end = reference.find(['?', '#']).unwrap_or(reference.len());
    let path = &reference[..end];
    match path.rfind('/') {
        Some(i) => path.split_at(i + 1),
        None => ("", path),
    }
}

/// `(stem, extension)`. A leading dot does not start an extension.
fn split_ext(segment: &str) -> (&str, Option<&str>) {
    match segment.rfind('.') {
        Some(i) if i > 0 && i + 1 < segment.len() => (&segment[..i], Some(&segment[i + 1..])),
        _ => (segment, None),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/naming.rs"]
mod tests;
