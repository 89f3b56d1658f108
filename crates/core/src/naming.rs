//! Snapshot file naming and camera URL templates.
//!
//! A snapshot name is `{door slug}-{UTC event time}-{index}.jpg`; names from
//! distinct door slugs or event times give distinct files.

use crate::types::Timestamp;

/// Placeholder in an image URL template replaced by the zero-based fetch index.
pub const INDEX_PLACEHOLDER: &str = "{index}";

/// File extension used for saved snapshots.
pub const SNAPSHOT_EXTENSION: &str = "jpg";

/// Reduce a door name to a filesystem-safe slug.
///
/// ASCII alphanumerics are lowercased, every other run of characters
/// collapses to a single `-`. A name with no usable characters becomes `door`.
///
/// ```
/// use doorwatch_core::naming::door_slug;
///
/// assert_eq!(door_slug("Garage"), "garage");
/// assert_eq!(door_slug("Back Door #2"), "back-door-2");
/// assert_eq!(door_slug("  !! "), "door");
/// ```
pub fn door_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        slug.push_str("door");
    }
    slug
}

/// Generate the file name for one snapshot of a transition event.
///
/// Convention: `{door_slug}-{YYYYMMDDTHHMMSSmmmZ}-{index}.jpg`
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use doorwatch_core::naming::snapshot_filename;
///
/// let at = Utc.with_ymd_and_hms(2024, 3, 9, 18, 30, 5).unwrap();
/// assert_eq!(snapshot_filename("Garage", at, 1), "garage-20240309T183005000Z-1.jpg");
/// ```
pub fn snapshot_filename(door: &str, at: Timestamp, index: u32) -> String {
    format!(
        "{}-{}-{index}.{SNAPSHOT_EXTENSION}",
        door_slug(door),
        at.format("%Y%m%dT%H%M%S%3fZ")
    )
}

/// Expand an image URL template for the given fetch index.
///
/// Templates without [`INDEX_PLACEHOLDER`] are returned unchanged.
pub fn expand_image_url(template: &str, index: u32) -> String {
    template.replace(INDEX_PLACEHOLDER, &index.to_string())
}
