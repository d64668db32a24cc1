use serde::Serialize;

use crate::{document::Document, identity::Identity, sharing::SharingGrant, sharing::SharingRole};

/// Resolved access tier for one (document, identity) pair. Computed fresh on
/// every request — grants and organization membership can change between
/// calls, so verdicts are never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessVerdict {
    Owner,
    OrganizationMember,
    SharedEditor,
    SharedViewer,
    Denied,
}

/// Boolean permission set derived from a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub read: bool,
    pub write_title: bool,
    pub delete: bool,
    pub manage_sharing: bool,
    pub realtime_edit: bool,
}

const NONE: Capabilities = Capabilities {
    read: false,
    write_title: false,
    delete: false,
    manage_sharing: false,
    realtime_edit: false,
};

impl AccessVerdict {
    pub fn capabilities(self) -> Capabilities {
        match self {
            Self::Owner | Self::OrganizationMember => Capabilities {
                read: true,
                write_title: true,
                delete: true,
                manage_sharing: true,
                realtime_edit: true,
            },
            // Editors can manage shares but never delete the document.
            Self::SharedEditor => Capabilities {
                read: true,
                write_title: true,
                delete: false,
                manage_sharing: true,
                realtime_edit: true,
            },
            Self::SharedViewer => Capabilities {
                read: true,
                ..NONE
            },
            Self::Denied => NONE,
        }
    }
}

/// Resolves the access tier for `identity` on `document`, given the already
/// fetched explicit grant for that pair. Pure: all entry points call this
/// with pre-fetched records so the rules cannot drift between handlers.
///
/// Precedence, first match wins: anonymous, owner, organization member,
/// editor grant, viewer grant, denied. The unauthenticated read fallback is
/// a gateway policy, not a verdict, so anonymous callers always resolve to
/// `Denied` here.
pub fn resolve(
    identity: Option<&Identity>,
    document: &Document,
    grant: Option<&SharingGrant>,
) -> AccessVerdict {
    let Some(identity) = identity else {
        return AccessVerdict::Denied;
    };

    if document.owner_id == identity.subject {
        return AccessVerdict::Owner;
    }

    let same_organization = match (&document.organization_id, &identity.organization_id) {
        (Some(doc_org), Some(caller_org)) => doc_org == caller_org,
        _ => false,
    };
    if same_organization {
        return AccessVerdict::OrganizationMember;
    }

    match grant.map(|g| g.role) {
        Some(SharingRole::Editor) => AccessVerdict::SharedEditor,
        Some(SharingRole::Viewer) => AccessVerdict::SharedViewer,
        None => AccessVerdict::Denied,
    }
}
