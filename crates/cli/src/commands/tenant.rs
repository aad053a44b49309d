//! Tenant management commands.
//!
//! # Usage
//!
//! ```bash
//! vitrina-cli tenant list
//! vitrina-cli tenant create -s herramientas-sur -n "Herramientas Sur" -o <owner-uuid> -p professional
//! ```

use thiserror::Error;

use vitrina_admin::backend::BackendError;
use vitrina_admin::db::TenantRepository;
use vitrina_core::catalog::Taxonomy;
use vitrina_core::tenant::{
    Branding, BusinessInfo, FeatureFlags, LayoutPreferences, NewTenant, PaymentSettings,
    TenantValidationError,
};
use vitrina_core::{Plan, TenantStatus, UserId};

use super::service::{ServiceBackend, ServiceError};

#[derive(Debug, Error)]
pub enum TenantError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Invalid tenant: {0}")]
    Invalid(#[from] TenantValidationError),
}

/// Print every tenant, newest first.
///
/// # Errors
///
/// Returns [`TenantError`] if the backend is unreachable or misconfigured.
pub async fn list() -> Result<(), TenantError> {
    let service = ServiceBackend::from_env()?;
    let tenants = TenantRepository::new(service.client(), service.token())
        .list(None)
        .await?;

    #[allow(clippy::print_stdout)]
    {
        for tenant in &tenants {
            println!(
                "{}  {:<24} {:<10} {:<13} {}",
                tenant.id,
                tenant.slug.as_str(),
                tenant.status.as_str(),
                tenant.plan.as_str(),
                tenant.name
            );
        }
    }
    tracing::info!(count = tenants.len(), "Listed tenants");
    Ok(())
}

/// Create an active tenant with default branding, features and taxonomy.
///
/// # Errors
///
/// Returns [`TenantError::Invalid`] for a bad slug or name, or
/// [`TenantError::Backend`] if the insert fails (a taken slug is a
/// conflict).
pub async fn create(slug: &str, name: &str, owner: UserId, plan: Plan) -> Result<(), TenantError> {
    let insert = new_tenant(slug, name, owner, plan).validate()?;
    let service = ServiceBackend::from_env()?;

    let tenant = TenantRepository::new(service.client(), service.token())
        .create(&insert)
        .await?;

    tracing::info!("Tenant created successfully!");
    tracing::info!("  ID: {}", tenant.id);
    tracing::info!("  Slug: {}", tenant.slug.as_str());
    tracing::info!("  Plan: {}", tenant.plan);
    tracing::info!("  Owner: {}", tenant.owner_id);
    Ok(())
}

fn new_tenant(slug: &str, name: &str, owner: UserId, plan: Plan) -> NewTenant {
    NewTenant {
        slug: slug.to_owned(),
        name: name.to_owned(),
        owner_id: owner,
        status: TenantStatus::Active,
        plan,
        branding: Branding::default(),
        business: BusinessInfo::default(),
        features: FeatureFlags::default(),
        payment: PaymentSettings::default(),
        taxonomy: Taxonomy::default(),
        layout: LayoutPreferences::default(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_slug_fails_before_any_request() {
        let result = new_tenant("Con Espacios", "Tienda", UserId::generate(), Plan::Starter)
            .validate();
        assert!(matches!(result, Err(TenantValidationError::Slug(_))));
    }

    #[test]
    fn test_new_tenant_trims_name() {
        let insert = new_tenant(
            "herramientas-sur",
            "  Herramientas Sur ",
            UserId::generate(),
            Plan::Enterprise,
        )
        .validate()
        .unwrap();
        assert_eq!(insert.name, "Herramientas Sur");
        assert_eq!(insert.plan, Plan::Enterprise);
        assert_eq!(insert.status, TenantStatus::Active);
    }
}
