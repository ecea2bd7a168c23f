use std::sync::Arc;

use api_ingress::problem::{Problem, ProblemResponse};
use axum::{
    extract::{rejection::JsonRejection, Path},
    http::Uri,
    Extension, Json,
};
use tracing::{error, info};

use crate::api::rest::dto::{
    CreateInstitutionReq, CreateProjectReq, CreateUserReq, InstitutionDto, InstitutionOrMessage,
    InstitutionOverviewDto, MessageDto, ProjectDto, RemainingDaysDto, UserDto, UserOverviewDto,
};
use crate::api::rest::error::{map_domain_error, map_json_rejection};
use crate::contract::model::{NewProject, NewUser};
use crate::domain::error::DomainError;
use crate::domain::service::Service;

// --- institutions ---

/// List all institutions
#[utoipa::path(
    get,
    path = "/instituciones",
    tag = "instituciones",
    responses(
        (status = 200, description = "All institutions", body = Vec<InstitutionDto>),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn list_institutions(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
) -> Result<Json<Vec<InstitutionDto>>, ProblemResponse> {
    info!("Listing institutions");

    match svc.list_institutions().await {
        Ok(items) => Ok(Json(items.into_iter().map(InstitutionDto::from).collect())),
        Err(e) => {
            error!("Failed to list institutions: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Create an institution
#[utoipa::path(
    post,
    path = "/instituciones",
    tag = "instituciones",
    request_body = CreateInstitutionReq,
    responses(
        (status = 200, description = "Created institution", body = InstitutionDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn create_institution(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<CreateInstitutionReq>, JsonRejection>,
) -> Result<Json<InstitutionDto>, ProblemResponse> {
    let Json(req_body) = payload.map_err(|r| map_json_rejection(&r, uri.path()))?;
    info!("Creating institution: {:?}", req_body);

    match svc.create_institution(req_body.into()).await {
        Ok(institution) => Ok(Json(institution.into())),
        Err(e) => {
            error!("Failed to create institution: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get an institution, or a message when the id is unknown
#[utoipa::path(
    get,
    path = "/institucion/{id}",
    tag = "instituciones",
    params(("id" = i32, Path, description = "Institution id")),
    responses(
        (status = 200, description = "Institution, or a not-found message", body = InstitutionOrMessage),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn get_institution(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> Result<Json<InstitutionOrMessage>, ProblemResponse> {
    info!("Getting institution with id: {}", id);

    match svc.get_institution(id).await {
        Ok(institution) => Ok(Json(InstitutionOrMessage::Institution(institution.into()))),
        Err(DomainError::InstitutionNotFound { id }) => Ok(Json(InstitutionOrMessage::Message(
            MessageDto::institution_not_found(id),
        ))),
        Err(e) => {
            error!("Failed to get institution {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Replace the fields of an institution
#[utoipa::path(
    put,
    path = "/institucion/{id}",
    tag = "instituciones",
    params(("id" = i32, Path, description = "Institution id")),
    request_body = CreateInstitutionReq,
    responses(
        (status = 200, description = "Updated institution, or a not-found message", body = InstitutionOrMessage),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn update_institution(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    payload: Result<Json<CreateInstitutionReq>, JsonRejection>,
) -> Result<Json<InstitutionOrMessage>, ProblemResponse> {
    let Json(req_body) = payload.map_err(|r| map_json_rejection(&r, uri.path()))?;
    info!("Updating institution {} with: {:?}", id, req_body);

    match svc.update_institution(id, req_body.into()).await {
        Ok(institution) => Ok(Json(InstitutionOrMessage::Institution(institution.into()))),
        Err(DomainError::InstitutionNotFound { id }) => Ok(Json(InstitutionOrMessage::Message(
            MessageDto::institution_not_found(id),
        ))),
        Err(e) => {
            error!("Failed to update institution {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Delete an institution
#[utoipa::path(
    delete,
    path = "/institucion/{id}",
    tag = "instituciones",
    params(("id" = i32, Path, description = "Institution id")),
    responses(
        (status = 200, description = "Deletion confirmation", body = MessageDto),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Institution still has projects", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn delete_institution(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> Result<Json<MessageDto>, ProblemResponse> {
    info!("Deleting institution: {}", id);

    match svc.delete_institution(id).await {
        Ok(deleted) => Ok(Json(MessageDto::institution_deleted(&deleted.name, id))),
        Err(e) => {
            error!("Failed to delete institution {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

// --- projects ---

/// List all projects
#[utoipa::path(
    get,
    path = "/proyectos",
    tag = "proyectos",
    responses(
        (status = 200, description = "All projects", body = Vec<ProjectDto>),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn list_projects(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
) -> Result<Json<Vec<ProjectDto>>, ProblemResponse> {
    info!("Listing projects");

    match svc.list_projects().await {
        Ok(items) => Ok(Json(items.into_iter().map(ProjectDto::from).collect())),
        Err(e) => {
            error!("Failed to list projects: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Create a project
#[utoipa::path(
    post,
    path = "/proyectos",
    tag = "proyectos",
    request_body = CreateProjectReq,
    responses(
        (status = 200, description = "Created project", body = ProjectDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn create_project(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<CreateProjectReq>, JsonRejection>,
) -> Result<Json<ProjectDto>, ProblemResponse> {
    let Json(req_body) = payload.map_err(|r| map_json_rejection(&r, uri.path()))?;
    info!("Creating project: {:?}", req_body);

    let new_project =
        NewProject::try_from(req_body).map_err(|e| map_domain_error(&e, uri.path()))?;

    match svc.create_project(new_project).await {
        Ok(project) => Ok(Json(project.into())),
        Err(e) => {
            error!("Failed to create project: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

// --- users ---

/// List all users with their current age
#[utoipa::path(
    get,
    path = "/usuarios",
    tag = "usuarios",
    responses(
        (status = 200, description = "All users", body = Vec<UserDto>),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
) -> Result<Json<Vec<UserDto>>, ProblemResponse> {
    info!("Listing users");
    let today = svc.today();

    match svc.list_users().await {
        Ok(users) => Ok(Json(
            users
                .into_iter()
                .map(|u| UserDto::from_user(u, today))
                .collect(),
        )),
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Create a user
#[utoipa::path(
    post,
    path = "/usuarios",
    tag = "usuarios",
    request_body = CreateUserReq,
    responses(
        (status = 200, description = "Created user", body = UserDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Surnames already exist", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn create_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<CreateUserReq>, JsonRejection>,
) -> Result<Json<UserDto>, ProblemResponse> {
    let Json(req_body) = payload.map_err(|r| map_json_rejection(&r, uri.path()))?;
    info!("Creating user: {:?}", req_body);

    let new_user = NewUser::try_from(req_body).map_err(|e| map_domain_error(&e, uri.path()))?;
    let today = svc.today();

    match svc.create_user(new_user).await {
        Ok(user) => Ok(Json(UserDto::from_user(user, today))),
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

// --- aggregate reads ---

/// Institution with its projects and their owners
#[utoipa::path(
    get,
    path = "/servicio1/{institucion_id}",
    tag = "servicios",
    params(("institucion_id" = i32, Path, description = "Institution id")),
    responses(
        (status = 200, description = "One-element array with the institution overview", body = Vec<InstitutionOverviewDto>),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn institution_overview(
    Extension(svc): Extension<Arc<Service>>,
    Path(institucion_id): Path<i32>,
    uri: Uri,
) -> Result<Json<Vec<InstitutionOverviewDto>>, ProblemResponse> {
    info!("Institution overview for id: {}", institucion_id);
    let today = svc.today();

    match svc.institution_overview(institucion_id).await {
        Ok(overview) => Ok(Json(vec![InstitutionOverviewDto::from_overview(
            overview, today,
        )])),
        Err(e) => {
            error!("Failed to build institution overview {}: {}", institucion_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// User with their projects and the institution names
#[utoipa::path(
    get,
    path = "/servicio2/{rut}",
    tag = "servicios",
    params(("rut" = String, Path, description = "National identity number")),
    responses(
        (status = 200, description = "One-element array with the user overview", body = Vec<UserOverviewDto>),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn user_overview(
    Extension(svc): Extension<Arc<Service>>,
    Path(rut): Path<String>,
    uri: Uri,
) -> Result<Json<Vec<UserOverviewDto>>, ProblemResponse> {
    info!("User overview for rut: {}", rut);
    let today = svc.today();

    match svc.user_overview(&rut).await {
        Ok(overview) => Ok(Json(vec![UserOverviewDto::from_overview(overview, today)])),
        Err(e) => {
            error!("Failed to build user overview for {}: {}", rut, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Running projects and the days left until they end
#[utoipa::path(
    get,
    path = "/servicio4",
    tag = "servicios",
    responses(
        (status = 200, description = "One-element array holding the list of running projects", body = Vec<Vec<RemainingDaysDto>>),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn projects_remaining_days(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
) -> Result<Json<Vec<Vec<RemainingDaysDto>>>, ProblemResponse> {
    info!("Listing remaining days of running projects");

    match svc.projects_remaining_days().await {
        Ok(items) => Ok(Json(vec![items
            .into_iter()
            .map(RemainingDaysDto::from)
            .collect()])),
        Err(e) => {
            error!("Failed to list remaining days: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
