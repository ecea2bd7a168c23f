//! Wire documents. Field names are the JSON contract, hence Spanish.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::contract::model::{
    HostedProject, Institution, InstitutionOverview, NewInstitution, NewProject, NewUser,
    OwnedProject, Project, RemainingDays, User, UserOverview,
};
use crate::domain::calendar::parse_date;
use crate::domain::error::DomainError;

/// REST DTO for a user; `edad` is derived from `fecha_nacimiento`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i32,
    pub nombre: String,
    pub apellidos: String,
    pub rut: String,
    pub fecha_nacimiento: NaiveDate,
    pub cargo: String,
    pub edad: i32,
}

impl UserDto {
    /// Render a user with the age it has on `today`.
    pub fn from_user(user: User, today: NaiveDate) -> Self {
        let edad = user.age_on(today);
        Self {
            id: user.id,
            nombre: user.name,
            apellidos: user.surnames,
            rut: user.rut,
            fecha_nacimiento: user.birth_date,
            cargo: user.position,
            edad,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InstitutionDto {
    pub id: i32,
    pub nombre: String,
    pub descripcion: String,
    pub direccion: String,
    pub fecha_creacion: DateTime<Utc>,
}

impl From<Institution> for InstitutionDto {
    fn from(i: Institution) -> Self {
        Self {
            id: i.id,
            nombre: i.name,
            descripcion: i.description,
            direccion: i.address,
            fecha_creacion: i.created_at,
        }
    }
}

/// REST DTO for a project; `institucion` holds the institution id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProjectDto {
    pub id: i32,
    pub nombre: String,
    pub descripcion: String,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    pub institucion: i32,
    pub usuario_id: i32,
}

impl From<Project> for ProjectDto {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            nombre: p.name,
            descripcion: p.description,
            fecha_inicio: p.start_date,
            fecha_fin: p.end_date,
            institucion: p.institution_id,
            usuario_id: p.user_id,
        }
    }
}

/// Plain `{"Mensaje": ...}` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MessageDto {
    #[serde(rename = "Mensaje")]
    pub mensaje: String,
}

impl MessageDto {
    pub fn institution_not_found(id: i32) -> Self {
        Self {
            mensaje: format!("No existe la institucion con id {id}"),
        }
    }

    pub fn institution_deleted(name: &str, id: i32) -> Self {
        Self {
            mensaje: format!("Se ha eliminado la institucion con nombre {name} con lleva el id {id}"),
        }
    }
}

/// Institution lookups answer a missing id with a message instead of a problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum InstitutionOrMessage {
    Institution(InstitutionDto),
    Message(MessageDto),
}

/// Body of both create and update; PUT replaces all three fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateInstitutionReq {
    pub nombre: String,
    pub descripcion: String,
    pub direccion: String,
}

impl From<CreateInstitutionReq> for NewInstitution {
    fn from(req: CreateInstitutionReq) -> Self {
        Self {
            name: req.nombre,
            description: req.descripcion,
            address: req.direccion,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateProjectReq {
    pub nombre: String,
    pub descripcion: String,
    #[schema(example = "2024-01-01")]
    pub fecha_inicio: String,
    #[schema(example = "2024-12-31")]
    pub fecha_fin: String,
    pub institucion_id: i32,
    pub usuario_id: i32,
}

impl TryFrom<CreateProjectReq> for NewProject {
    type Error = DomainError;

    fn try_from(req: CreateProjectReq) -> Result<Self, Self::Error> {
        Ok(Self {
            start_date: parse_date("fecha_inicio", &req.fecha_inicio)?,
            end_date: parse_date("fecha_fin", &req.fecha_fin)?,
            name: req.nombre,
            description: req.descripcion,
            institution_id: req.institucion_id,
            user_id: req.usuario_id,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserReq {
    pub nombre: String,
    pub apellidos: String,
    pub rut: String,
    #[schema(example = "1990-06-15")]
    pub fecha_nacimiento: String,
    pub cargo: String,
}

impl TryFrom<CreateUserReq> for NewUser {
    type Error = DomainError;

    fn try_from(req: CreateUserReq) -> Result<Self, Self::Error> {
        Ok(Self {
            birth_date: parse_date("fecha_nacimiento", &req.fecha_nacimiento)?,
            name: req.nombre,
            surnames: req.apellidos,
            rut: req.rut,
            position: req.cargo,
        })
    }
}

// --- aggregate documents ---

/// Project inside an institution overview, with its owner inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OwnedProjectDto {
    pub id: i32,
    pub nombre: String,
    pub descripcion: String,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    pub usuario: UserDto,
}

impl OwnedProjectDto {
    fn from_owned(p: OwnedProject, today: NaiveDate) -> Self {
        Self {
            id: p.project.id,
            nombre: p.project.name,
            descripcion: p.project.description,
            fecha_inicio: p.project.start_date,
            fecha_fin: p.project.end_date,
            usuario: UserDto::from_user(p.owner, today),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InstitutionOverviewDto {
    pub id: i32,
    pub nombre: String,
    pub descripcion: String,
    pub direccion: String,
    pub fecha_creacion: DateTime<Utc>,
    pub proyectos: Vec<OwnedProjectDto>,
}

impl InstitutionOverviewDto {
    pub fn from_overview(o: InstitutionOverview, today: NaiveDate) -> Self {
        Self {
            id: o.institution.id,
            nombre: o.institution.name,
            descripcion: o.institution.description,
            direccion: o.institution.address,
            fecha_creacion: o.institution.created_at,
            proyectos: o
                .projects
                .into_iter()
                .map(|p| OwnedProjectDto::from_owned(p, today))
                .collect(),
        }
    }
}

/// Project inside a user overview; `institucion` is the institution name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HostedProjectDto {
    pub id: i32,
    pub nombre: String,
    pub descripcion: String,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    pub institucion: String,
}

impl From<HostedProject> for HostedProjectDto {
    fn from(p: HostedProject) -> Self {
        Self {
            id: p.project.id,
            nombre: p.project.name,
            descripcion: p.project.description,
            fecha_inicio: p.project.start_date,
            fecha_fin: p.project.end_date,
            institucion: p.institution_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserOverviewDto {
    pub id: i32,
    pub nombre: String,
    pub apellidos: String,
    pub rut: String,
    pub fecha_nacimiento: NaiveDate,
    pub cargo: String,
    pub edad: i32,
    pub proyectos: Vec<HostedProjectDto>,
}

impl UserOverviewDto {
    pub fn from_overview(o: UserOverview, today: NaiveDate) -> Self {
        let user = UserDto::from_user(o.user, today);
        Self {
            id: user.id,
            nombre: user.nombre,
            apellidos: user.apellidos,
            rut: user.rut,
            fecha_nacimiento: user.fecha_nacimiento,
            cargo: user.cargo,
            edad: user.edad,
            proyectos: o.projects.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RemainingDaysDto {
    pub nombre: String,
    pub dias_faltantes: i64,
}

impl From<RemainingDays> for RemainingDaysDto {
    fn from(r: RemainingDays) -> Self {
        Self {
            nombre: r.project_name,
            dias_faltantes: r.days_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn user_document_uses_wire_keys_and_iso_dates() {
        let user = User {
            id: 7,
            name: "Ana".into(),
            surnames: "Rojas Soto".into(),
            rut: "12345678K".into(),
            birth_date: ymd(1990, 6, 15),
            position: "Ingeniera".into(),
        };
        let v = serde_json::to_value(UserDto::from_user(user, ymd(2024, 1, 1))).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "id": 7,
                "nombre": "Ana",
                "apellidos": "Rojas Soto",
                "rut": "12345678K",
                "fecha_nacimiento": "1990-06-15",
                "cargo": "Ingeniera",
                "edad": 33
            })
        );
    }

    #[test]
    fn project_document_exposes_institution_id_under_institucion() {
        let p = Project {
            id: 1,
            name: "P".into(),
            description: String::new(),
            start_date: ymd(2024, 1, 1),
            end_date: ymd(2024, 12, 31),
            institution_id: 3,
            user_id: 9,
        };
        let v = serde_json::to_value(ProjectDto::from(p)).unwrap();
        assert_eq!(v["institucion"], 3);
        assert_eq!(v["usuario_id"], 9);
        assert_eq!(v["fecha_fin"], "2024-12-31");
    }

    #[test]
    fn message_serializes_under_capitalized_key() {
        let v = serde_json::to_value(InstitutionOrMessage::Message(
            MessageDto::institution_not_found(42),
        ))
        .unwrap();
        assert_eq!(
            v,
            serde_json::json!({ "Mensaje": "No existe la institucion con id 42" })
        );
    }

    #[test]
    fn malformed_dates_are_rejected_per_field() {
        let req = CreateProjectReq {
            nombre: "P".into(),
            descripcion: "d".into(),
            fecha_inicio: "2024-01-01".into(),
            fecha_fin: "31/12/2024".into(),
            institucion_id: 1,
            usuario_id: 1,
        };
        match NewProject::try_from(req) {
            Err(DomainError::InvalidDate { field, value }) => {
                assert_eq!(field, "fecha_fin");
                assert_eq!(value, "31/12/2024");
            }
            other => panic!("expected InvalidDate, got {other:?}"),
        }
    }
}
