use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::contract::model::{
    Institution, InstitutionOverview, NewInstitution, NewProject, NewUser, Project, RemainingDays,
    User, UserOverview,
};
use crate::domain::calendar::days_until;
use crate::domain::error::DomainError;
use crate::domain::ports::Clock;
use crate::domain::repo::{
    ConstraintViolation, InstitutionsRepository, ProjectsRepository, UsersRepository,
};

// Column widths of the persisted schema.
const MAX_NAME_LEN: usize = 64;
const MAX_SURNAMES_LEN: usize = 128;
const MAX_RUT_LEN: usize = 9;
const MAX_POSITION_LEN: usize = 128;
const MAX_ADDRESS_LEN: usize = 128;

/// Domain service for institutions, projects and users.
/// Depends only on the repository and clock ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    users: Arc<dyn UsersRepository>,
    institutions: Arc<dyn InstitutionsRepository>,
    projects: Arc<dyn ProjectsRepository>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub validate_project_dates: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            validate_project_dates: true,
        }
    }
}

fn db_err(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}

fn violation(e: &anyhow::Error) -> Option<&ConstraintViolation> {
    e.downcast_ref::<ConstraintViolation>()
}

impl Service {
    /// Build a service over one repository implementing every storage port.
    pub fn new<R>(repo: Arc<R>, clock: Arc<dyn Clock>, config: ServiceConfig) -> Self
    where
        R: UsersRepository + InstitutionsRepository + ProjectsRepository + 'static,
    {
        Self {
            users: repo.clone(),
            institutions: repo.clone(),
            projects: repo,
            clock,
            config,
        }
    }

    /// The date derived fields (age, days remaining) are computed against.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // --- institutions ---

    #[instrument(name = "project_registry.service.list_institutions", skip(self))]
    pub async fn list_institutions(&self) -> Result<Vec<Institution>, DomainError> {
        let institutions = self.institutions.list_institutions().await.map_err(db_err)?;
        debug!("Listed {} institutions", institutions.len());
        Ok(institutions)
    }

    #[instrument(
        name = "project_registry.service.get_institution",
        skip(self),
        fields(institution_id = id)
    )]
    pub async fn get_institution(&self, id: i32) -> Result<Institution, DomainError> {
        self.institutions
            .find_institution(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::institution_not_found(id))
    }

    #[instrument(
        name = "project_registry.service.create_institution",
        skip(self, new_institution),
        fields(name = %new_institution.name)
    )]
    pub async fn create_institution(
        &self,
        new_institution: NewInstitution,
    ) -> Result<Institution, DomainError> {
        info!("Creating institution");
        validate_institution(&new_institution)?;

        let institution = self
            .institutions
            .insert_institution(new_institution, self.clock.now())
            .await
            .map_err(db_err)?;

        info!("Created institution with id={}", institution.id);
        Ok(institution)
    }

    #[instrument(
        name = "project_registry.service.update_institution",
        skip(self, changes),
        fields(institution_id = id)
    )]
    pub async fn update_institution(
        &self,
        id: i32,
        changes: NewInstitution,
    ) -> Result<Institution, DomainError> {
        info!("Updating institution");

        // existence first, so a missing id wins over invalid input
        self.get_institution(id).await?;
        validate_institution(&changes)?;

        let updated = self
            .institutions
            .update_institution(id, changes)
            .await
            .map_err(db_err)?;

        info!("Updated institution");
        Ok(updated)
    }

    /// Delete an institution and return it. Refused while projects
    /// still reference it.
    #[instrument(
        name = "project_registry.service.delete_institution",
        skip(self),
        fields(institution_id = id)
    )]
    pub async fn delete_institution(&self, id: i32) -> Result<Institution, DomainError> {
        info!("Deleting institution");

        let institution = self.get_institution(id).await?;

        let projects = self
            .projects
            .count_projects_of_institution(id)
            .await
            .map_err(db_err)?;
        if projects > 0 {
            return Err(DomainError::institution_in_use(id, projects));
        }

        let deleted = match self.institutions.delete_institution(id).await {
            Ok(deleted) => deleted,
            // a project was added after the count
            Err(e) if matches!(violation(&e), Some(ConstraintViolation::ForeignKey(_))) => {
                let projects = self
                    .projects
                    .count_projects_of_institution(id)
                    .await
                    .map_err(db_err)?;
                return Err(DomainError::institution_in_use(id, projects));
            }
            Err(e) => return Err(db_err(e)),
        };
        if !deleted {
            // removed concurrently between lookup and delete
            return Err(DomainError::institution_not_found(id));
        }

        info!("Deleted institution '{}'", institution.name);
        Ok(institution)
    }

    // --- projects ---

    #[instrument(name = "project_registry.service.list_projects", skip(self))]
    pub async fn list_projects(&self) -> Result<Vec<Project>, DomainError> {
        self.projects.list_projects().await.map_err(db_err)
    }

    #[instrument(
        name = "project_registry.service.create_project",
        skip(self, new_project),
        fields(
            name = %new_project.name,
            institution_id = new_project.institution_id,
            user_id = new_project.user_id
        )
    )]
    pub async fn create_project(&self, new_project: NewProject) -> Result<Project, DomainError> {
        info!("Creating project");
        self.validate_new_project(&new_project)?;

        if self
            .institutions
            .find_institution(new_project.institution_id)
            .await
            .map_err(db_err)?
            .is_none()
        {
            return Err(DomainError::validation(
                "institucion_id",
                format!("institution {} does not exist", new_project.institution_id),
            ));
        }
        if !self
            .users
            .user_exists(new_project.user_id)
            .await
            .map_err(db_err)?
        {
            return Err(DomainError::validation(
                "usuario_id",
                format!("user {} does not exist", new_project.user_id),
            ));
        }

        let institution_id = new_project.institution_id;
        let project = self
            .projects
            .insert_project(new_project)
            .await
            .map_err(|e| match violation(&e) {
                // institution deleted after the lookup above
                Some(ConstraintViolation::ForeignKey(_)) => DomainError::validation(
                    "institucion_id",
                    format!("institution {institution_id} does not exist"),
                ),
                _ => db_err(e),
            })?;

        info!("Created project with id={}", project.id);
        Ok(project)
    }

    // --- users ---

    #[instrument(name = "project_registry.service.list_users", skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        self.users.list_users().await.map_err(db_err)
    }

    #[instrument(
        name = "project_registry.service.create_user",
        skip(self, new_user),
        fields(rut = %new_user.rut)
    )]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating user");
        validate_new_user(&new_user)?;

        if self
            .users
            .surnames_exist(&new_user.surnames)
            .await
            .map_err(db_err)?
        {
            return Err(DomainError::surnames_already_exist(new_user.surnames));
        }

        // the lookup above can race a concurrent insert; the unique index decides
        let surnames = new_user.surnames.clone();
        let user = self
            .users
            .insert_user(new_user)
            .await
            .map_err(|e| match violation(&e) {
                Some(ConstraintViolation::Unique(_)) => {
                    DomainError::surnames_already_exist(surnames)
                }
                _ => db_err(e),
            })?;

        info!("Created user with id={}", user.id);
        Ok(user)
    }

    // --- aggregate reads ---

    #[instrument(
        name = "project_registry.service.institution_overview",
        skip(self),
        fields(institution_id = id)
    )]
    pub async fn institution_overview(&self, id: i32) -> Result<InstitutionOverview, DomainError> {
        let institution = self.get_institution(id).await?;
        let projects = self
            .projects
            .projects_with_owner(id)
            .await
            .map_err(db_err)?;

        debug!("Institution has {} projects", projects.len());
        Ok(InstitutionOverview {
            institution,
            projects,
        })
    }

    #[instrument(name = "project_registry.service.user_overview", skip(self))]
    pub async fn user_overview(&self, rut: &str) -> Result<UserOverview, DomainError> {
        let user = self
            .users
            .find_user_by_rut(rut)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::user_not_found(rut))?;
        let projects = self
            .projects
            .projects_with_institution(user.id)
            .await
            .map_err(db_err)?;

        debug!("User {} has {} projects", user.id, projects.len());
        Ok(UserOverview { user, projects })
    }

    #[instrument(name = "project_registry.service.projects_remaining_days", skip(self))]
    pub async fn projects_remaining_days(&self) -> Result<Vec<RemainingDays>, DomainError> {
        let today = self.clock.today();
        let running = self
            .projects
            .projects_ending_after(today)
            .await
            .map_err(db_err)?;

        debug!(%today, "{} projects still running", running.len());
        Ok(running
            .into_iter()
            .map(|p| RemainingDays {
                days_remaining: days_until(p.end_date, today),
                project_name: p.name,
            })
            .collect())
    }

    // --- validation helpers ---

    fn validate_new_project(&self, p: &NewProject) -> Result<(), DomainError> {
        require_text("nombre", &p.name, MAX_NAME_LEN)?;
        if self.config.validate_project_dates && p.end_date < p.start_date {
            return Err(DomainError::validation(
                "fecha_fin",
                format!(
                    "end date {} is before start date {}",
                    p.end_date, p.start_date
                ),
            ));
        }
        Ok(())
    }
}

fn validate_institution(i: &NewInstitution) -> Result<(), DomainError> {
    require_text("nombre", &i.name, MAX_NAME_LEN)?;
    require_text("direccion", &i.address, MAX_ADDRESS_LEN)?;
    Ok(())
}

fn validate_new_user(u: &NewUser) -> Result<(), DomainError> {
    require_text("nombre", &u.name, MAX_NAME_LEN)?;
    require_text("apellidos", &u.surnames, MAX_SURNAMES_LEN)?;
    require_text("rut", &u.rut, MAX_RUT_LEN)?;
    require_text("cargo", &u.position, MAX_POSITION_LEN)?;
    Ok(())
}

/// Non-blank and at most `max` characters.
fn require_text(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, "cannot be empty"));
    }
    let len = value.chars().count();
    if len > max {
        return Err(DomainError::validation(
            field,
            format!("too long: {len} characters (max: {max})"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_text_checks_blank_and_length() {
        assert!(require_text("rut", "12345678K", MAX_RUT_LEN).is_ok());
        assert!(matches!(
            require_text("rut", "   ", MAX_RUT_LEN),
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(
            require_text("rut", "123456789K", MAX_RUT_LEN),
            Err(DomainError::Validation { .. })
        ));
        // length is measured in characters, not bytes
        assert!(require_text("nombre", &"ñ".repeat(MAX_NAME_LEN), MAX_NAME_LEN).is_ok());
    }
}
