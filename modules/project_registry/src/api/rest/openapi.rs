use api_ingress::problem::Problem;
use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};

/// OpenAPI document for the registry endpoints.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_institutions,
        handlers::create_institution,
        handlers::get_institution,
        handlers::update_institution,
        handlers::delete_institution,
        handlers::list_projects,
        handlers::create_project,
        handlers::list_users,
        handlers::create_user,
        handlers::institution_overview,
        handlers::user_overview,
        handlers::projects_remaining_days,
    ),
    components(schemas(
        Problem,
        dto::UserDto,
        dto::InstitutionDto,
        dto::ProjectDto,
        dto::MessageDto,
        dto::InstitutionOrMessage,
        dto::CreateInstitutionReq,
        dto::CreateProjectReq,
        dto::CreateUserReq,
        dto::OwnedProjectDto,
        dto::InstitutionOverviewDto,
        dto::HostedProjectDto,
        dto::UserOverviewDto,
        dto::RemainingDaysDto,
    )),
    tags(
        (name = "instituciones", description = "Institution CRUD"),
        (name = "proyectos", description = "Project list and create"),
        (name = "usuarios", description = "User list and create"),
        (name = "servicios", description = "Aggregate reads across entities"),
    )
)]
pub struct RegistryApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let v = serde_json::to_value(RegistryApiDoc::openapi()).unwrap();
        for path in [
            "/instituciones",
            "/institucion/{id}",
            "/proyectos",
            "/usuarios",
            "/servicio1/{institucion_id}",
            "/servicio2/{rut}",
            "/servicio4",
        ] {
            assert!(
                v["paths"].get(path).is_some(),
                "missing path {path} in OpenAPI document"
            );
        }
        assert!(v.pointer("/components/schemas/UserDto").is_some());
        assert!(v.pointer("/paths/~1institucion~1{id}/delete").is_some());
    }
}
