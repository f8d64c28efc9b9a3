//! Vendor → call-center resource mapping stored on a team.

use std::collections::BTreeMap;

use nc_core::types::VendorId;
use serde::{Deserialize, Serialize};

/// Map of vendor id (decimal string key, as stored in JSON) to the list of
/// call-center resource ids that display that vendor's numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceMap(pub BTreeMap<String, Vec<String>>);

impl ResourceMap {
    /// Resource ids configured for a vendor. Blank entries are skipped.
    pub fn for_vendor(&self, vendor_id: VendorId) -> Vec<String> {
        self.0
            .get(&vendor_id.to_string())
            .map(|ids| {
                ids.iter()
                    .map(|id| id.trim())
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Set the resource list for a vendor.
    pub fn insert(&mut self, vendor_id: VendorId, resources: Vec<String>) {
        self.0.insert(vendor_id.to_string(), resources);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_vendor_reads_decimal_key() {
        let map: ResourceMap =
            serde_json::from_str(r#"{"3": ["11", " ", "12"], "4": []}"#).expect("parse");
        assert_eq!(map.for_vendor(VendorId(3)), vec!["11", "12"]);
        assert!(map.for_vendor(VendorId(4)).is_empty());
        assert!(map.for_vendor(VendorId(5)).is_empty());
    }
}
