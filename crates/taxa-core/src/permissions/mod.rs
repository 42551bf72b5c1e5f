//! Declarative permission predicates for tagging operations.
//!
//! An immutable table maps permission names to boolean predicates over
//! `(user, optional resource)`. The table is built once at process start
//! and passed by reference to the boundary layer; there is no ambient
//! global registry. A denied predicate returns `Ok(false)` — the caller
//! turns that into an authorization failure. Errors are reserved for
//! programming misuse (unknown permission names, wrong resource kinds).

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::errors::error_code::{self, ErrorCode};
use crate::types::Taxonomy;

/// The acting user, as seen by the permission predicates.
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    pub username: String,
    /// Platform staff are taxonomy admins.
    pub is_staff: bool,
    /// Superusers can already do anything.
    pub is_superuser: bool,
}

impl UserContext {
    pub fn staff(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_staff: true,
            is_superuser: false,
        }
    }

    pub fn regular(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_staff: false,
            is_superuser: false,
        }
    }
}

/// The resource a permission check applies to.
#[derive(Debug, Clone, Copy)]
pub enum PermissionResource<'a> {
    Taxonomy(&'a Taxonomy),
    /// A tag, carrying its owning taxonomy when one exists.
    Tag { taxonomy: Option<&'a Taxonomy> },
    /// A `(taxonomy, object_id)` pair for object-tag mutation checks.
    ObjectTag {
        taxonomy: &'a Taxonomy,
        object_id: &'a str,
    },
}

impl PermissionResource<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Self::Taxonomy(_) => "taxonomy",
            Self::Tag { .. } => "tag",
            Self::ObjectTag { .. } => "object_tag",
        }
    }
}

/// Programming-misuse errors from the evaluator. Normal denials are
/// `Ok(false)`, never errors.
#[derive(Debug, thiserror::Error)]
pub enum PermissionError {
    #[error("unknown permission `{permission}`")]
    UnknownPermission { permission: String },

    #[error("permission `{permission}` expects a {expected} resource, got {got}")]
    ResourceMismatch {
        permission: &'static str,
        expected: &'static str,
        got: &'static str,
    },
}

impl ErrorCode for PermissionError {
    fn error_code(&self) -> &'static str {
        error_code::PERMISSION_MISUSE
    }
}

/// Ownership check for the external object being tagged.
///
/// The tagged object belongs to a different subsystem, so this core cannot
/// decide who may modify it. The default implementation denies everything,
/// forcing integrators to register a real check rather than accidentally
/// allowing object mutation with no ownership check at all.
pub trait ObjectPermissionCheck: Send + Sync {
    fn can_change_object(&self, user: &UserContext, object_id: &str) -> bool;
}

/// The deny-all default object check.
pub struct DenyAllObjectCheck;

impl ObjectPermissionCheck for DenyAllObjectCheck {
    fn can_change_object(&self, _user: &UserContext, _object_id: &str) -> bool {
        false
    }
}

type Predicate = Box<
    dyn for<'a> Fn(
            &PermissionTable,
            &UserContext,
            Option<&PermissionResource<'a>>,
        ) -> Result<bool, PermissionError>
        + Send
        + Sync,
>;

/// Immutable permission-name → predicate table.
pub struct PermissionTable {
    rules: FxHashMap<&'static str, Predicate>,
    object_check: Arc<dyn ObjectPermissionCheck>,
}

/// Global staff and superusers are taxonomy admins.
pub fn is_taxonomy_admin(user: &UserContext) -> bool {
    user.is_staff || user.is_superuser
}

/// Anyone can view an enabled taxonomy or list all taxonomies, but only
/// taxonomy admins can view a disabled taxonomy.
fn can_view_taxonomy(user: &UserContext, taxonomy: Option<&Taxonomy>) -> bool {
    match taxonomy {
        None => true,
        Some(t) => t.enabled || is_taxonomy_admin(user),
    }
}

/// Even taxonomy admins cannot change system taxonomies.
fn can_change_taxonomy(user: &UserContext, taxonomy: Option<&Taxonomy>) -> bool {
    is_taxonomy_admin(user) && taxonomy.map_or(true, |t| !t.system_defined)
}

/// Even taxonomy admins cannot add tags to system taxonomies or free-text
/// taxonomies (the latter have no predefined tag tree).
fn can_change_tag(user: &UserContext, taxonomy: Option<&Taxonomy>) -> bool {
    is_taxonomy_admin(user)
        && taxonomy.map_or(true, |t| !t.allow_free_text && !t.system_defined)
}

fn expect_taxonomy<'a>(
    permission: &'static str,
    resource: Option<&PermissionResource<'a>>,
) -> Result<Option<&'a Taxonomy>, PermissionError> {
    match resource {
        None => Ok(None),
        Some(PermissionResource::Taxonomy(t)) => Ok(Some(*t)),
        Some(other) => Err(PermissionError::ResourceMismatch {
            permission,
            expected: "taxonomy",
            got: other.kind(),
        }),
    }
}

fn expect_tag<'a>(
    permission: &'static str,
    resource: Option<&PermissionResource<'a>>,
) -> Result<Option<Option<&'a Taxonomy>>, PermissionError> {
    match resource {
        None => Ok(None),
        Some(PermissionResource::Tag { taxonomy }) => Ok(Some(*taxonomy)),
        Some(other) => Err(PermissionError::ResourceMismatch {
            permission,
            expected: "tag",
            got: other.kind(),
        }),
    }
}

impl PermissionTable {
    /// Build the table with the deny-all object check.
    pub fn new() -> Self {
        Self::with_object_check(Arc::new(DenyAllObjectCheck))
    }

    /// Build the table with a host-registered object ownership check.
    pub fn with_object_check(object_check: Arc<dyn ObjectPermissionCheck>) -> Self {
        let mut rules: FxHashMap<&'static str, Predicate> = FxHashMap::default();

        for perm in ["taxonomy.add", "taxonomy.change", "taxonomy.delete"] {
            rules.insert(
                perm,
                Box::new(move |_table, user, resource| {
                    Ok(can_change_taxonomy(user, expect_taxonomy(perm, resource)?))
                }),
            );
        }
        rules.insert(
            "taxonomy.view",
            Box::new(|_table, user, resource| {
                Ok(can_view_taxonomy(
                    user,
                    expect_taxonomy("taxonomy.view", resource)?,
                ))
            }),
        );

        for perm in ["tag.add", "tag.change"] {
            rules.insert(
                perm,
                Box::new(move |_table, user, resource| {
                    Ok(expect_tag(perm, resource)?
                        .map_or(can_change_tag(user, None), |taxonomy| {
                            can_change_tag(user, taxonomy)
                        }))
                }),
            );
        }
        // Deleting a tag only needs admin; the free-text/system carve-outs
        // apply to add/change, not delete.
        rules.insert(
            "tag.delete",
            Box::new(|_table, user, _resource| Ok(is_taxonomy_admin(user))),
        );
        rules.insert("tag.view", Box::new(|_table, _user, _resource| Ok(true)));
        rules.insert(
            "tag.list",
            Box::new(|_table, user, resource| {
                Ok(can_view_taxonomy(user, expect_taxonomy("tag.list", resource)?))
            }),
        );

        for perm in ["object_tag.add", "object_tag.change", "object_tag.delete"] {
            rules.insert(
                perm,
                Box::new(move |table, user, resource| match resource {
                    // Method-level allow-through for framework wiring.
                    None => Ok(true),
                    Some(PermissionResource::ObjectTag {
                        taxonomy,
                        object_id,
                    }) => Ok(can_view_taxonomy(user, Some(*taxonomy))
                        && table.object_check.can_change_object(user, object_id)),
                    Some(other) => Err(PermissionError::ResourceMismatch {
                        permission: perm,
                        expected: "object_tag",
                        got: other.kind(),
                    }),
                }),
            );
        }
        rules.insert(
            "object_tag.view",
            Box::new(|_table, _user, _resource| Ok(true)),
        );

        Self {
            rules,
            object_check,
        }
    }

    /// Evaluate a permission for a user against an optional resource.
    pub fn has_perm(
        &self,
        permission: &str,
        user: &UserContext,
        resource: Option<&PermissionResource<'_>>,
    ) -> Result<bool, PermissionError> {
        let rule = self
            .rules
            .get(permission)
            .ok_or_else(|| PermissionError::UnknownPermission {
                permission: permission.to_string(),
            })?;
        rule(self, user, resource)
    }

    /// All registered permission names, for boundary-layer wiring.
    pub fn permission_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.rules.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self::new()
    }
}
