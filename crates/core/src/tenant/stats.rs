//! System-wide counts for the admin dashboard.

use std::collections::HashSet;

use serde::Serialize;

use super::{Owner, TenantConfig, TenantProduct};
use crate::types::{Plan, TenantStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub active: usize,
    pub inactive: usize,
    pub suspended: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanCounts {
    pub starter: usize,
    pub professional: usize,
    pub enterprise: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SystemStats {
    pub total_tenants: usize,
    pub by_status: StatusCounts,
    pub by_plan: PlanCounts,
    pub total_products: usize,
    pub products_in_stock: usize,
    /// Registered owners plus any owner ids only seen on tenants.
    pub total_owners: usize,
}

impl SystemStats {
    #[must_use]
    pub fn compute(tenants: &[TenantConfig], products: &[TenantProduct], owners: &[Owner]) -> Self {
        let mut stats = Self {
            total_tenants: tenants.len(),
            total_products: products.len(),
            products_in_stock: products.iter().filter(|p| p.product.in_stock()).count(),
            ..Self::default()
        };

        for tenant in tenants {
            match tenant.status {
                TenantStatus::Active => stats.by_status.active += 1,
                TenantStatus::Inactive => stats.by_status.inactive += 1,
                TenantStatus::Suspended => stats.by_status.suspended += 1,
            }
            match tenant.plan {
                Plan::Starter => stats.by_plan.starter += 1,
                Plan::Professional => stats.by_plan.professional += 1,
                Plan::Enterprise => stats.by_plan.enterprise += 1,
            }
        }

        stats.total_owners = owners
            .iter()
            .map(|o| o.id)
            .chain(tenants.iter().map(|t| t.owner_id))
            .collect::<HashSet<_>>()
            .len();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_product;
    use crate::tenant::sample_tenant;
    use crate::types::{TenantId, UserId, UserRole};

    #[test]
    fn test_counts() {
        let registered = Owner {
            id: UserId::generate(),
            email: "ana@example.com".to_owned(),
            name: "Ana".to_owned(),
            role: UserRole::TenantOwner,
        };
        let unregistered = UserId::generate();

        let mut suspended = sample_tenant("tienda-dos", registered.id);
        suspended.status = TenantStatus::Suspended;
        suspended.plan = Plan::Enterprise;
        let tenants = vec![
            sample_tenant("tienda-uno", registered.id),
            suspended,
            sample_tenant("tienda-tres", unregistered),
        ];

        let mut sold_out = sample_product("B", "Caladora", 10, 10);
        sold_out.stock = 0;
        let products = [sample_product("A", "Taladro", 10, 10), sold_out]
            .into_iter()
            .map(|product| TenantProduct {
                tenant_id: TenantId::generate(),
                product,
                created_at: None,
                updated_at: None,
            })
            .collect::<Vec<_>>();

        let stats = SystemStats::compute(&tenants, &products, &[registered]);

        assert_eq!(stats.total_tenants, 3);
        assert_eq!(stats.by_status, StatusCounts { active: 2, inactive: 0, suspended: 1 });
        assert_eq!(stats.by_plan, PlanCounts { starter: 2, professional: 0, enterprise: 1 });
        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.products_in_stock, 1);
        assert_eq!(stats.total_owners, 2);
    }

    #[test]
    fn test_empty_system() {
        assert_eq!(SystemStats::compute(&[], &[], &[]), SystemStats::default());
    }
}
