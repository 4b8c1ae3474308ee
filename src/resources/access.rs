//! Roles, privilege grants and policies.

use crate::diagnostics::Diagnostics;
use crate::kind::{Identity, KindDefinition, ResourceKind};
use crate::record::Record;
use crate::resources::BasicKind;
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::transport::ApiPath;

/// The `role` kind.
pub fn role() -> BasicKind {
    let schema = Schema::v0()
        .with_description("An access-control role")
        .with_attribute("id", Attribute::computed_string())
        .with_attribute("role_id", Attribute::computed_string())
        .with_attribute("role_name", Attribute::required_string())
        .with_attribute("role_description", Attribute::optional_string())
        .with_attribute(
            "grant_to_creating_role",
            Attribute::request_only_bool()
                .with_description("Grant the new role to the role that creates it"),
        )
        .with_attribute("owner_role_id", Attribute::computed_string());
    BasicKind::new(KindDefinition::new(
        "role",
        ApiPath::new("/role"),
        Identity::mirrored("roleId", "role_id"),
        schema,
    ))
}

/// The `role_privilege_grant` kind.
///
/// Grants cannot be edited in place; every attribute forces replacement.
pub fn role_privilege_grant() -> BasicKind {
    let schema = Schema::v0()
        .with_description("A privilege granted to a role")
        .with_attribute("id", Attribute::computed_string())
        .with_attribute("role_privilege_grant_id", Attribute::computed_string())
        .with_attribute("role_id", Attribute::required_string().with_force_new())
        .with_attribute(
            "privilege",
            Attribute::required_string()
                .with_force_new()
                .with_description("e.g. SELECT, CREATE_SCHEMA"),
        )
        .with_attribute(
            "entity_kind",
            Attribute::required_string()
                .with_force_new()
                .with_description("e.g. Table, Catalog, Account"),
        )
        .with_attribute("entity_id", Attribute::required_string().with_force_new())
        .with_attribute(
            "grant_kind",
            Attribute::required_string()
                .with_force_new()
                .with_description("Allow or Deny"),
        )
        .with_attribute("grant_option", Attribute::optional_bool().with_force_new())
        .with_attribute("schema_name", Attribute::optional_string().with_force_new())
        .with_attribute("table_name", Attribute::optional_string().with_force_new())
        .with_attribute("column_name", Attribute::optional_string().with_force_new());
    BasicKind::new(KindDefinition::new(
        "role_privilege_grant",
        ApiPath::new("/rolePrivilegeGrant"),
        Identity::mirrored("rolePrivilegeGrantId", "role_privilege_grant_id"),
        schema,
    ))
}

fn privileges_block() -> Block {
    Block::new()
        .with_attribute("grant_kind", Attribute::required_string())
        .with_attribute("privilege", Attribute::required_string_list())
}

fn scope_block() -> Block {
    Block::new()
        .with_attribute("entity_id", Attribute::optional_string())
        .with_attribute("entity_kind", Attribute::required_string())
        .with_attribute("schema_name", Attribute::optional_string())
        .with_attribute("table_name", Attribute::optional_string())
        .with_attribute("column_name", Attribute::optional_string())
        .with_block(
            "privileges",
            NestedBlock::single(privileges_block()).with_min_items(1),
        )
}

/// The `policy` kind.
#[derive(Debug, Clone)]
pub struct Policy(KindDefinition);

impl Policy {
    /// Describe the kind.
    pub fn new() -> Self {
        let schema = Schema::v0()
            .with_description("A role-scoped access policy")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("policy_id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string())
            .with_attribute("description", Attribute::optional_string())
            .with_attribute(
                "predicate",
                Attribute::required_string().with_description("SQL predicate gating the policy"),
            )
            .with_attribute("role_id", Attribute::required_string())
            .with_attribute(
                "expiration",
                Attribute::optional_string().with_description("RFC 3339 timestamp"),
            )
            .with_block("scopes", NestedBlock::list(scope_block()).with_min_items(1));
        Self(KindDefinition::new(
            "policy",
            ApiPath::new("/policy"),
            Identity::mirrored("policyId", "policy_id"),
            schema,
        ))
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceKind for Policy {
    fn definition(&self) -> &KindDefinition {
        &self.0
    }

    fn validate(&self, plan: &Record, diags: &mut Diagnostics) {
        let Some(scopes) = plan.get_list("scopes") else {
            return;
        };
        for (index, scope) in scopes.iter().enumerate() {
            let Some(scope) = scope.as_object() else {
                continue;
            };
            let path = format!("scopes[{index}].privileges.privilege");
            let empty = scope
                .get_object("privileges")
                .and_then(|p| p.get_list("privilege"))
                .is_some_and(|list| list.is_empty());
            if empty {
                diags.error(&path, format!("{path} must name at least one privilege"));
            }
        }
    }
}
