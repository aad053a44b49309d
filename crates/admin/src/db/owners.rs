//! Owner repository.

use vitrina_core::UserId;
use vitrina_core::tenant::Owner;

use super::single;
use crate::backend::{BackendClient, BackendError, eq};

const TABLE: &str = "owners";

/// Repository for the `owners` table.
pub struct OwnerRepository<'a> {
    client: &'a BackendClient,
    token: Option<&'a str>,
}

impl<'a> OwnerRepository<'a> {
    #[must_use]
    pub const fn new(client: &'a BackendClient, token: Option<&'a str>) -> Self {
        Self { client, token }
    }

    /// All owners by name.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails.
    pub async fn list(&self) -> Result<Vec<Owner>, BackendError> {
        self.client
            .select(self.token, TABLE, &[("order", "name.asc,id.asc".to_string())])
            .await
    }

    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails.
    pub async fn get(&self, id: UserId) -> Result<Option<Owner>, BackendError> {
        let rows: Vec<Owner> = self
            .client
            .select(self.token, TABLE, &[("id", eq(id))])
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Insert an owner row. The id should be the owner's hosted auth user
    /// id so sign-in can find it.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Conflict`] for a duplicate id or email.
    pub async fn create(&self, owner: &Owner) -> Result<Owner, BackendError> {
        let rows = self.client.insert(self.token, TABLE, owner).await?;
        single(rows, "inserted owner")
    }
}
