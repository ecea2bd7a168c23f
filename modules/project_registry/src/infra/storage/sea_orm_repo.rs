//! SeaORM-backed implementation of the storage ports.
//!
//! Generic over `C: ConnectionTrait`, so it can run on a `DatabaseConnection`
//! or on a transaction handed in by the caller.

use anyhow::{anyhow, Context};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};

use crate::contract::model::{
    HostedProject, Institution, NewInstitution, NewProject, NewUser, OwnedProject, Project, User,
};
use crate::domain::repo::{
    ConstraintViolation, InstitutionsRepository, ProjectsRepository, UsersRepository,
};
use crate::infra::storage::entity::{institution, project, user};

/// One repository for all three tables; holds the connection it was given.
pub struct SeaOrmRegistryRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmRegistryRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// Wrap a write error, keeping constraint violations recognizable.
fn write_err(e: DbErr, op: &'static str) -> anyhow::Error {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => {
            anyhow::Error::new(ConstraintViolation::Unique(msg)).context(op)
        }
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
            anyhow::Error::new(ConstraintViolation::ForeignKey(msg)).context(op)
        }
        _ => anyhow::Error::new(e).context(op),
    }
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmRegistryRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        let rows = user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.conn)
            .await
            .context("list_users failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_user_by_rut(&self, rut: &str) -> anyhow::Result<Option<User>> {
        let found = user::Entity::find()
            .filter(user::Column::Rut.eq(rut))
            .order_by_asc(user::Column::Id)
            .one(&self.conn)
            .await
            .context("find_user_by_rut failed")?;
        Ok(found.map(Into::into))
    }

    async fn user_exists(&self, id: i32) -> anyhow::Result<bool> {
        let count = user::Entity::find_by_id(id)
            .count(&self.conn)
            .await
            .context("user_exists failed")?;
        Ok(count > 0)
    }

    async fn surnames_exist(&self, surnames: &str) -> anyhow::Result<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Surnames.eq(surnames))
            .count(&self.conn)
            .await
            .context("surnames_exist failed")?;
        Ok(count > 0)
    }

    async fn insert_user(&self, u: NewUser) -> anyhow::Result<User> {
        let m = user::ActiveModel {
            id: NotSet,
            name: Set(u.name),
            surnames: Set(u.surnames),
            rut: Set(u.rut),
            birth_date: Set(u.birth_date),
            position: Set(u.position),
        };
        let inserted = m
            .insert(&self.conn)
            .await
            .map_err(|e| write_err(e, "insert_user failed"))?;
        Ok(inserted.into())
    }
}

#[async_trait::async_trait]
impl<C> InstitutionsRepository for SeaOrmRegistryRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn list_institutions(&self) -> anyhow::Result<Vec<Institution>> {
        let rows = institution::Entity::find()
            .order_by_asc(institution::Column::Id)
            .all(&self.conn)
            .await
            .context("list_institutions failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_institution(&self, id: i32) -> anyhow::Result<Option<Institution>> {
        let found = institution::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_institution failed")?;
        Ok(found.map(Into::into))
    }

    async fn insert_institution(
        &self,
        i: NewInstitution,
        created_at: DateTime<Utc>,
    ) -> anyhow::Result<Institution> {
        let m = institution::ActiveModel {
            id: NotSet,
            name: Set(i.name),
            description: Set(i.description),
            address: Set(i.address),
            created_at: Set(created_at),
        };
        let inserted = m
            .insert(&self.conn)
            .await
            .context("insert_institution failed")?;
        Ok(inserted.into())
    }

    async fn update_institution(&self, id: i32, i: NewInstitution) -> anyhow::Result<Institution> {
        let m = institution::ActiveModel {
            id: Set(id),
            name: Set(i.name),
            description: Set(i.description),
            address: Set(i.address),
            ..Default::default()
        };
        let updated = m
            .update(&self.conn)
            .await
            .context("update_institution failed")?;
        Ok(updated.into())
    }

    async fn delete_institution(&self, id: i32) -> anyhow::Result<bool> {
        let res = institution::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .map_err(|e| write_err(e, "delete_institution failed"))?;
        Ok(res.rows_affected > 0)
    }
}

#[async_trait::async_trait]
impl<C> ProjectsRepository for SeaOrmRegistryRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn list_projects(&self) -> anyhow::Result<Vec<Project>> {
        let rows = project::Entity::find()
            .order_by_asc(project::Column::Id)
            .all(&self.conn)
            .await
            .context("list_projects failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_project(&self, p: NewProject) -> anyhow::Result<Project> {
        let m = project::ActiveModel {
            id: NotSet,
            name: Set(p.name),
            description: Set(p.description),
            start_date: Set(p.start_date),
            end_date: Set(p.end_date),
            user_id: Set(p.user_id),
            institution_id: Set(p.institution_id),
        };
        let inserted = m
            .insert(&self.conn)
            .await
            .map_err(|e| write_err(e, "insert_project failed"))?;
        Ok(inserted.into())
    }

    async fn count_projects_of_institution(&self, institution_id: i32) -> anyhow::Result<u64> {
        project::Entity::find()
            .filter(project::Column::InstitutionId.eq(institution_id))
            .count(&self.conn)
            .await
            .context("count_projects_of_institution failed")
    }

    async fn projects_with_owner(&self, institution_id: i32) -> anyhow::Result<Vec<OwnedProject>> {
        let rows = project::Entity::find()
            .filter(project::Column::InstitutionId.eq(institution_id))
            .find_also_related(user::Entity)
            .order_by_asc(project::Column::Id)
            .all(&self.conn)
            .await
            .context("projects_with_owner failed")?;

        rows.into_iter()
            .map(|(p, owner)| {
                let owner = owner.ok_or_else(|| anyhow!("project {} has no owner row", p.id))?;
                Ok(OwnedProject {
                    project: p.into(),
                    owner: owner.into(),
                })
            })
            .collect()
    }

    async fn projects_with_institution(
        &self,
        user_id: i32,
    ) -> anyhow::Result<Vec<HostedProject>> {
        let rows = project::Entity::find()
            .filter(project::Column::UserId.eq(user_id))
            .find_also_related(institution::Entity)
            .order_by_asc(project::Column::Id)
            .all(&self.conn)
            .await
            .context("projects_with_institution failed")?;

        rows.into_iter()
            .map(|(p, inst)| {
                let inst = inst.ok_or_else(|| anyhow!("project {} has no institution row", p.id))?;
                Ok(HostedProject {
                    project: p.into(),
                    institution_name: inst.name,
                })
            })
            .collect()
    }

    async fn projects_ending_after(&self, date: NaiveDate) -> anyhow::Result<Vec<Project>> {
        let rows = project::Entity::find()
            .filter(project::Column::EndDate.gt(date))
            .order_by_asc(project::Column::Id)
            .all(&self.conn)
            .await
            .context("projects_ending_after failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
