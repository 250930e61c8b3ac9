/// Canonical form of a license record, the exact bytes covered by its HMAC
use super::record::LicenseRecord;

/// Separator between canonical fields.
pub const FIELD_SEPARATOR: &str = "\n";

/// Builds the canonical string for `record`.
///
/// Fields are joined with `\n` in a fixed order: `valid_from`, `valid_until`,
/// `id`, then every `meta` value by ascending key. The map's own iteration
/// order is never used, so signer and verifier agree however `meta` was built.
///
/// No escaping is applied. Callers that sign must first run
/// [`LicenseRecord::check_signable`] to rule out embedded separators.
pub fn canonicalize(record: &LicenseRecord) -> String {
    let mut keys: Vec<&String> = record.meta.keys().collect();
    keys.sort_unstable();

    let mut parts: Vec<&str> = Vec::with_capacity(3 + keys.len());
    parts.push(&record.valid_from);
    parts.push(&record.valid_until);
    parts.push(record.id.as_deref().unwrap_or_default());
    parts.extend(keys.into_iter().map(|key| record.meta[key].as_str()));

    parts.join(FIELD_SEPARATOR)
}
