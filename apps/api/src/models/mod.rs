pub mod candidate;
pub mod job;
pub mod match_result;
pub mod requirements;
pub mod resume;

use uuid::Uuid;

/// Stable id for a record submitted without one, derived from its identifying text.
///
/// The same text always yields the same id, so repeated submissions share
/// cache and store entries.
pub fn content_id(parts: &[&str]) -> Uuid {
    let key = parts
        .iter()
        .map(|p| p.trim().to_lowercase())
        .collect::<Vec<_>>()
        .join("\u{1f}");
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
}
