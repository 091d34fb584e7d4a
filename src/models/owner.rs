//! Resource identity and controller owner references

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Identity of a single object: (kind, name, namespace, uid)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceRef {
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub uid: String,
}

impl ResourceRef {
    /// Build a reference from object metadata
    pub fn from_meta(kind: &str, meta: &ObjectMeta) -> Self {
        Self {
            kind: kind.to_string(),
            name: meta.name.clone().unwrap_or_default(),
            namespace: meta.namespace.clone().unwrap_or_default(),
            uid: meta.uid.clone().unwrap_or_default(),
        }
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}

/// Back-reference from a child to the object that owns it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerLink {
    pub kind: String,
    pub name: String,
    pub uid: String,
    pub is_controller: bool,
}

/// Return the managing controller of an object, if it declares one
///
/// Only the owner reference flagged `controller: true` is authoritative.
/// Other owner references never affect where the object lands in the tree.
pub fn controller_of(meta: &ObjectMeta) -> Option<OwnerLink> {
    meta.owner_references
        .as_ref()?
        .iter()
        .find(|owner| owner.controller == Some(true))
        .map(|owner| OwnerLink {
            kind: owner.kind.clone(),
            name: owner.name.clone(),
            uid: owner.uid.clone(),
            is_controller: true,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;

    fn owner(kind: &str, name: &str, uid: &str, controller: Option<bool>) -> OwnerReference {
        OwnerReference {
            api_version: "apps/v1".to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
            uid: uid.to_string(),
            controller,
            block_owner_deletion: None,
        }
    }

    #[test]
    fn test_controller_of_picks_controller_flag() {
        let meta = ObjectMeta {
            name: Some("p1".to_string()),
            owner_references: Some(vec![
                owner("ConfigMap", "cm", "u-cm", None),
                owner("ReplicaSet", "rs1", "u-rs1", Some(true)),
            ]),
            ..Default::default()
        };

        let link = controller_of(&meta).unwrap();
        assert_eq!(link.kind, "ReplicaSet");
        assert_eq!(link.name, "rs1");
        assert_eq!(link.uid, "u-rs1");
        assert!(link.is_controller);
    }

    #[test]
    fn test_controller_of_ignores_non_controllers() {
        let meta = ObjectMeta {
            owner_references: Some(vec![owner("ReplicaSet", "rs1", "u", Some(false))]),
            ..Default::default()
        };
        assert!(controller_of(&meta).is_none());
        assert!(controller_of(&ObjectMeta::default()).is_none());
    }

    #[test]
    fn test_resource_ref_display() {
        let meta = ObjectMeta {
            name: Some("web".to_string()),
            namespace: Some("prod".to_string()),
            uid: Some("u1".to_string()),
            ..Default::default()
        };
        let r = ResourceRef::from_meta("Deployment", &meta);
        assert_eq!(r.to_string(), "Deployment/prod/web");
        assert_eq!(r.uid, "u1");
    }
}
