use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::ProjectRegistryApi,
    error::RegistryError,
    model::{
        Institution, InstitutionOverview, NewInstitution, NewProject, NewUser, Project,
        RemainingDays, User, UserOverview,
    },
};
use crate::domain::service::Service;

/// Local implementation of `ProjectRegistryApi` that delegates to the domain service
pub struct ProjectRegistryLocalClient {
    service: Arc<Service>,
}

impl ProjectRegistryLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ProjectRegistryApi for ProjectRegistryLocalClient {
    async fn list_institutions(&self) -> Result<Vec<Institution>, RegistryError> {
        self.service.list_institutions().await.map_err(Into::into)
    }

    async fn get_institution(&self, id: i32) -> Result<Institution, RegistryError> {
        self.service.get_institution(id).await.map_err(Into::into)
    }

    async fn create_institution(
        &self,
        new_institution: NewInstitution,
    ) -> Result<Institution, RegistryError> {
        self.service
            .create_institution(new_institution)
            .await
            .map_err(Into::into)
    }

    async fn update_institution(
        &self,
        id: i32,
        fields: NewInstitution,
    ) -> Result<Institution, RegistryError> {
        self.service
            .update_institution(id, fields)
            .await
            .map_err(Into::into)
    }

    async fn delete_institution(&self, id: i32) -> Result<Institution, RegistryError> {
        self.service.delete_institution(id).await.map_err(Into::into)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, RegistryError> {
        self.service.list_projects().await.map_err(Into::into)
    }

    async fn create_project(&self, new_project: NewProject) -> Result<Project, RegistryError> {
        self.service
            .create_project(new_project)
            .await
            .map_err(Into::into)
    }

    async fn list_users(&self) -> Result<Vec<User>, RegistryError> {
        self.service.list_users().await.map_err(Into::into)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, RegistryError> {
        self.service.create_user(new_user).await.map_err(Into::into)
    }

    async fn institution_overview(&self, id: i32) -> Result<InstitutionOverview, RegistryError> {
        self.service
            .institution_overview(id)
            .await
            .map_err(Into::into)
    }

    async fn user_overview(&self, rut: &str) -> Result<UserOverview, RegistryError> {
        self.service.user_overview(rut).await.map_err(Into::into)
    }

    async fn projects_remaining_days(&self) -> Result<Vec<RemainingDays>, RegistryError> {
        self.service
            .projects_remaining_days()
            .await
            .map_err(Into::into)
    }
}
