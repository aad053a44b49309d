//! Owners and the owner → tenant → product-count hierarchy.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::TenantConfig;
use crate::types::{Plan, TenantId, TenantStatus, UserId, UserRole};

/// A row of the `owners` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl Owner {
    /// Stand-in for a tenant whose owner row doesn't exist.
    #[must_use]
    pub fn placeholder(id: UserId) -> Self {
        let short: String = id.to_string().chars().take(8).collect();
        Self {
            id,
            email: String::new(),
            name: format!("Propietario {short}"),
            role: UserRole::TenantOwner,
        }
    }
}

/// Tenant line inside an owner node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantSummary {
    pub id: TenantId,
    pub slug: String,
    pub name: String,
    pub status: TenantStatus,
    pub plan: Plan,
    pub product_count: usize,
}

/// One owner with their tenants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerNode {
    pub owner: Owner,
    /// False when the owner row is missing and `owner` is a placeholder.
    pub registered: bool,
    pub tenants: Vec<TenantSummary>,
    pub total_products: usize,
}

/// Group tenants under their owners.
///
/// Registered owners come first in the given order, including owners with
/// no tenants. Tenants pointing at a missing owner row are grouped under
/// placeholder owners, in order of first appearance.
#[must_use]
pub fn group_by_owner(
    owners: &[Owner],
    tenants: &[TenantConfig],
    product_counts: &HashMap<TenantId, usize>,
) -> Vec<OwnerNode> {
    let mut nodes: Vec<OwnerNode> = owners
        .iter()
        .map(|owner| OwnerNode {
            owner: owner.clone(),
            registered: true,
            tenants: Vec::new(),
            total_products: 0,
        })
        .collect();
    let mut index: HashMap<UserId, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.owner.id, i))
        .collect();

    for tenant in tenants {
        let slot = *index.entry(tenant.owner_id).or_insert_with(|| {
            nodes.push(OwnerNode {
                owner: Owner::placeholder(tenant.owner_id),
                registered: false,
                tenants: Vec::new(),
                total_products: 0,
            });
            nodes.len() - 1
        });

        let product_count = product_counts.get(&tenant.id).copied().unwrap_or(0);
        if let Some(node) = nodes.get_mut(slot) {
            node.total_products += product_count;
            node.tenants.push(TenantSummary {
                id: tenant.id,
                slug: tenant.slug.to_string(),
                name: tenant.name.clone(),
                status: tenant.status,
                plan: tenant.plan,
                product_count,
            });
        }
    }

    nodes
}
