use crate::contract::model::{Institution, Project, User};
use crate::infra::storage::entity::{institution, project, user};

impl From<user::Model> for User {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            surnames: m.surnames,
            rut: m.rut,
            birth_date: m.birth_date,
            position: m.position,
        }
    }
}

impl From<institution::Model> for Institution {
    fn from(m: institution::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            address: m.address,
            created_at: m.created_at,
        }
    }
}

impl From<project::Model> for Project {
    fn from(m: project::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            start_date: m.start_date,
            end_date: m.end_date,
            institution_id: m.institution_id,
            user_id: m.user_id,
        }
    }
}
