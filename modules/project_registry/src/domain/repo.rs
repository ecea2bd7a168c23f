use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::contract::model::{
    HostedProject, Institution, NewInstitution, NewProject, NewUser, OwnedProject, Project, User,
};

// Persistence ports for the domain layer. Object-safe via `async_trait`;
// ids and timestamps come from the caller or the database.

/// A write refused by a schema constraint. Implementations attach it to the
/// returned `anyhow::Error` so callers can find it with `downcast_ref`.
#[derive(Debug, thiserror::Error)]
pub enum ConstraintViolation {
    #[error("unique constraint violated: {0}")]
    Unique(String),
    #[error("foreign key constraint violated: {0}")]
    ForeignKey(String),
}

#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn list_users(&self) -> anyhow::Result<Vec<User>>;
    /// First user (lowest id) with this rut.
    async fn find_user_by_rut(&self, rut: &str) -> anyhow::Result<Option<User>>;
    async fn user_exists(&self, id: i32) -> anyhow::Result<bool>;
    async fn surnames_exist(&self, surnames: &str) -> anyhow::Result<bool>;
    async fn insert_user(&self, u: NewUser) -> anyhow::Result<User>;
}

#[async_trait]
pub trait InstitutionsRepository: Send + Sync {
    async fn list_institutions(&self) -> anyhow::Result<Vec<Institution>>;
    async fn find_institution(&self, id: i32) -> anyhow::Result<Option<Institution>>;
    async fn insert_institution(
        &self,
        i: NewInstitution,
        created_at: DateTime<Utc>,
    ) -> anyhow::Result<Institution>;
    /// Overwrite the caller-editable fields; `created_at` is left alone.
    async fn update_institution(&self, id: i32, i: NewInstitution) -> anyhow::Result<Institution>;
    /// Returns true if a row was deleted.
    async fn delete_institution(&self, id: i32) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait ProjectsRepository: Send + Sync {
    async fn list_projects(&self) -> anyhow::Result<Vec<Project>>;
    async fn insert_project(&self, p: NewProject) -> anyhow::Result<Project>;
    async fn count_projects_of_institution(&self, institution_id: i32) -> anyhow::Result<u64>;
    /// Projects of an institution joined with their owners, by project id.
    async fn projects_with_owner(&self, institution_id: i32) -> anyhow::Result<Vec<OwnedProject>>;
    /// Projects of a user joined with their institution names, by project id.
    async fn projects_with_institution(&self, user_id: i32)
        -> anyhow::Result<Vec<HostedProject>>;
    /// Projects whose end date is strictly after `date`, by project id.
    async fn projects_ending_after(&self, date: NaiveDate) -> anyhow::Result<Vec<Project>>;
}
