//! Opaque identifiers for generated elements.

use smol_str::SmolStr;

/// Prefix shared by every generated element id.
pub const ELEMENT_ID_PREFIX: &str = "element-";

const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;

/// Generate an id for a generated DOM element (format: `element-{9 base36 chars}`).
///
/// Collisions are tolerated: ids only scope radio-group names and give
/// generated nodes a handle, nothing relies on them being unique.
pub fn generate_unique_id() -> SmolStr {
    let mut id = String::with_capacity(ELEMENT_ID_PREFIX.len() + ID_LEN);
    id.push_str(ELEMENT_ID_PREFIX);
    for _ in 0..ID_LEN {
        id.push(ID_ALPHABET[fastrand::usize(..ID_ALPHABET.len())] as char);
    }
    SmolStr::from(id)
}
