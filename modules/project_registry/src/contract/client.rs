use async_trait::async_trait;

use crate::contract::{
    error::RegistryError,
    model::{
        Institution, InstitutionOverview, NewInstitution, NewProject, NewUser, Project,
        RemainingDays, User, UserOverview,
    },
};

/// In-process API of the project registry for other modules.
#[async_trait]
pub trait ProjectRegistryApi: Send + Sync {
    async fn list_institutions(&self) -> Result<Vec<Institution>, RegistryError>;

    async fn get_institution(&self, id: i32) -> Result<Institution, RegistryError>;

    async fn create_institution(
        &self,
        new_institution: NewInstitution,
    ) -> Result<Institution, RegistryError>;

    /// Replace name, description and address of an institution.
    async fn update_institution(
        &self,
        id: i32,
        fields: NewInstitution,
    ) -> Result<Institution, RegistryError>;

    /// Delete an institution and return what was removed.
    async fn delete_institution(&self, id: i32) -> Result<Institution, RegistryError>;

    async fn list_projects(&self) -> Result<Vec<Project>, RegistryError>;

    async fn create_project(&self, new_project: NewProject) -> Result<Project, RegistryError>;

    async fn list_users(&self) -> Result<Vec<User>, RegistryError>;

    async fn create_user(&self, new_user: NewUser) -> Result<User, RegistryError>;

    /// Institution with all of its projects and their owners.
    async fn institution_overview(&self, id: i32) -> Result<InstitutionOverview, RegistryError>;

    /// User (looked up by rut) with their projects and institution names.
    async fn user_overview(&self, rut: &str) -> Result<UserOverview, RegistryError>;

    /// Projects still running today with the days left until they end.
    async fn projects_remaining_days(&self) -> Result<Vec<RemainingDays>, RegistryError>;
}
