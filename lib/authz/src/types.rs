//! Wire types of the role permission service.

use lostfound_access::PermissionSet;
use serde::Deserialize;
use serde::de::IgnoredAny;

/// A permission record as the service returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct PermissionRecord {
    /// Record identifier; unused by the dashboard.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    /// Permission name.
    #[serde(default)]
    pub name: Option<String>,
}

/// One element of the role permission list.
///
/// The service has answered both with bare names and with records.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PermissionEntry {
    /// A bare permission name.
    Name(String),
    /// A record carrying a `name` field.
    Record(PermissionRecord),
    /// Anything else (null, numbers, records without a string name).
    Unrecognized(IgnoredAny),
}

impl PermissionEntry {
    /// Returns the permission name, if the entry carries a usable one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        let name = match self {
            Self::Name(name) => name.as_str(),
            Self::Record(record) => record.name.as_deref()?,
            Self::Unrecognized(_) => return None,
        };
        (!name.is_empty()).then_some(name)
    }
}

/// Parses a role permission response body.
///
/// Returns `None` if the body is not a JSON array. Entries without a usable
/// name are dropped.
#[must_use]
pub fn parse_permission_list(body: &[u8]) -> Option<PermissionSet> {
    let entries: Vec<PermissionEntry> = serde_json::from_slice(body).ok()?;
    Some(entries.iter().filter_map(PermissionEntry::name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Option<PermissionSet> {
        parse_permission_list(value.to_string().as_bytes())
    }

    #[test]
    fn parses_records() {
        let set = parse(json!([
            { "id": "1", "name": "can_manage_items" },
            { "id": 2, "name": "can_manage_claims", "description": "Claims" }
        ]))
        .expect("array");
        assert_eq!(set.len(), 2);
        assert!(set.contains("can_manage_items"));
        assert!(set.contains("can_manage_claims"));
    }

    #[test]
    fn parses_bare_names() {
        let set = parse(json!(["can_manage_users", "can_manage_roles"])).expect("array");
        assert!(set.contains("can_manage_users"));
        assert!(set.contains("can_manage_roles"));
    }

    #[test]
    fn drops_unusable_entries() {
        let set = parse(json!([
            null,
            42,
            { "id": 3 },
            { "name": null },
            { "name": 7 },
            "",
            "can_manage_branches"
        ]))
        .expect("array");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["can_manage_branches"]);
    }

    #[test]
    fn names_are_kept_verbatim() {
        let set = parse(json!([" can_manage_items ", { "name": "can_manage_claims" }])).expect("array");
        assert!(set.contains(" can_manage_items "));
        assert!(!set.contains("can_manage_items"));
        assert!(set.contains("can_manage_claims"));
    }

    #[test]
    fn non_array_bodies_are_rejected() {
        assert!(parse(json!({ "permissions": ["can_manage_items"] })).is_none());
        assert!(parse(json!("can_manage_items")).is_none());
        assert!(parse_permission_list(b"<html>oops</html>").is_none());
    }

    #[test]
    fn empty_array_is_a_valid_empty_set() {
        assert_eq!(parse(json!([])), Some(PermissionSet::new()));
    }
}
