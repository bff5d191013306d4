// 🔑 Stable Identity - Deterministic UUIDs from source URIs
//
// Identity is computed, never generated: the same (namespace prefix, URI)
// always yields the same UUID, across processes and runs. This is what
// makes re-uploading a taxonomy idempotent, and lets a characteristic
// reference its broader characteristic before that object exists.

use uuid::Uuid;

/// Stable identifier of every entity in the taxonomy
pub type StableId = Uuid;

// ============================================================================
// NAMESPACE PREFIXES
// ============================================================================

/// Units, prefixes and quantity kinds use the bare URI
pub const NO_PREFIX: &str = "";
pub const CHARACTERISTIC: &str = "characteristic:";
pub const PROPERTY: &str = "property:";
pub const META: &str = "meta:";
pub const SMW_UNIT: &str = "smwunit:";

// ============================================================================
// IDENTITY FUNCTIONS
// ============================================================================

/// Derive the stable identifier for `uri` under a namespace prefix
///
/// UUID version 5 over the URL namespace, name = prefix + uri.
pub fn stable_id(prefix: &str, uri: &str) -> StableId {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("{}{}", prefix, uri).as_bytes())
}

/// `OSW<32 hex digits>` form used in page titles
pub fn osw_id(id: &StableId) -> String {
    format!("OSW{}", id.simple())
}

/// `Item:OSW...` title of an item page
pub fn item_title(id: &StableId) -> String {
    format!("Item:{}", osw_id(id))
}

/// `Category:OSW...` title of a category page
pub fn category_title(id: &StableId) -> String {
    format!("Category:{}", osw_id(id))
}

/// Title of a sub-object that lives on its parent's page
pub fn sub_item_title(parent: &StableId, id: &StableId) -> String {
    format!("Item:{}#{}", osw_id(parent), osw_id(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_id_is_idempotent() {
        let a = stable_id(NO_PREFIX, "http://qudt.org/vocab/unit/M");
        let b = stable_id(NO_PREFIX, "http://qudt.org/vocab/unit/M");
        assert_eq!(a, b);
        assert_eq!(a.get_version_num(), 5);
    }

    #[test]
    fn test_prefix_changes_identity() {
        let uri = "http://qudt.org/vocab/quantitykind/Length";
        let plain = stable_id(NO_PREFIX, uri);
        let characteristic = stable_id(CHARACTERISTIC, uri);
        let property = stable_id(PROPERTY, uri);

        assert_ne!(plain, characteristic);
        assert_ne!(characteristic, property);
    }

    #[test]
    fn test_matches_uuid5_url_namespace() {
        // Reference value of uuid5(NAMESPACE_URL, "http://www.example.com/")
        let expected = Uuid::parse_str("fcde3c85-2270-590f-9e7c-ee003d65e0e2").unwrap();
        assert_eq!(stable_id(NO_PREFIX, "http://www.example.com/"), expected);
    }

    #[test]
    fn test_title_formats() {
        let id = Uuid::parse_str("fcde3c85-2270-590f-9e7c-ee003d65e0e2").unwrap();

        assert_eq!(osw_id(&id), "OSWfcde3c852270590f9e7cee003d65e0e2");
        assert_eq!(item_title(&id), "Item:OSWfcde3c852270590f9e7cee003d65e0e2");
        assert_eq!(category_title(&id), "Category:OSWfcde3c852270590f9e7cee003d65e0e2");
        assert_eq!(
            sub_item_title(&id, &id),
            "Item:OSWfcde3c852270590f9e7cee003d65e0e2#OSWfcde3c852270590f9e7cee003d65e0e2"
        );
    }
}
