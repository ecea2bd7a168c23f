//! Aggregate read endpoints (servicio1, servicio2, servicio4) against a
//! pinned clock.

mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};

use common::{call, create_test_db, create_test_module, router_for, ymd};
use project_registry::config::ProjectRegistryConfig;
use project_registry::domain::ports::Clock;
use project_registry::api::rest::dto::{
    InstitutionOverviewDto, RemainingDaysDto, UserOverviewDto,
};
use project_registry::contract::model::{NewInstitution, NewProject, NewUser};
use project_registry::ProjectRegistry;

struct Seeded {
    uchile: i32,
    ana: i32,
    luis: i32,
}

/// Two institutions, two users, four projects with different end dates.
async fn seed(module: &ProjectRegistry) -> Result<Seeded> {
    let svc = module.service();

    let uchile = svc
        .create_institution(NewInstitution {
            name: "UChile".into(),
            description: "Universidad de Chile".into(),
            address: "Av. Libertador 1058".into(),
        })
        .await?
        .id;
    let puc = svc
        .create_institution(NewInstitution {
            name: "PUC".into(),
            description: "Pontificia".into(),
            address: "Av. Libertador 340".into(),
        })
        .await?
        .id;

    let ana = svc
        .create_user(NewUser {
            name: "Ana".into(),
            surnames: "Rojas Soto".into(),
            rut: "12345678K".into(),
            birth_date: ymd(1990, 6, 15),
            position: "Ingeniera".into(),
        })
        .await?
        .id;
    let luis = svc
        .create_user(NewUser {
            name: "Luis".into(),
            surnames: "Fuentes Mora".into(),
            rut: "7654321".into(),
            birth_date: ymd(1985, 12, 1),
            position: "Director".into(),
        })
        .await?
        .id;

    for (name, end, inst, user) in [
        ("Ended", ymd(2024, 6, 14), uchile, ana),
        ("EndsToday", ymd(2024, 6, 15), uchile, luis),
        ("Tomorrow", ymd(2024, 6, 16), puc, ana),
        ("YearEnd", ymd(2024, 12, 31), uchile, ana),
    ] {
        svc.create_project(NewProject {
            name: name.into(),
            description: format!("{name} project"),
            start_date: ymd(2024, 1, 1),
            end_date: end,
            institution_id: inst,
            user_id: user,
        })
        .await?;
    }

    Ok(Seeded { uchile, ana, luis })
}

#[tokio::test]
async fn servicio1_nests_projects_with_their_owners() -> Result<()> {
    let module = create_test_module(ymd(2024, 6, 15)).await;
    let ids = seed(&module).await?;
    let app = router_for(&module);

    let (status, body) = call(&app, "GET", &format!("/servicio1/{}", ids.uchile), None).await?;
    assert_eq!(status, StatusCode::OK);

    let outer: Vec<InstitutionOverviewDto> = serde_json::from_value(body)?;
    assert_eq!(outer.len(), 1);
    let overview = &outer[0];
    assert_eq!(overview.id, ids.uchile);
    assert_eq!(overview.nombre, "UChile");

    let names: Vec<&str> = overview.proyectos.iter().map(|p| p.nombre.as_str()).collect();
    assert_eq!(names, ["Ended", "EndsToday", "YearEnd"]);

    let first = &overview.proyectos[0];
    assert_eq!(first.usuario.id, ids.ana);
    assert_eq!(first.usuario.rut, "12345678K");
    // birthday today
    assert_eq!(first.usuario.edad, 34);

    let second = &overview.proyectos[1];
    assert_eq!(second.usuario.id, ids.luis);
    assert_eq!(second.usuario.edad, 38);

    Ok(())
}

/// Moves one day forward every time the date is read.
struct TickingClock {
    start: NaiveDate,
    reads: AtomicU32,
}

impl Clock for TickingClock {
    fn now(&self) -> DateTime<Utc> {
        self.start.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    fn today(&self) -> NaiveDate {
        let n = self.reads.fetch_add(1, Ordering::SeqCst);
        self.start + Days::new(u64::from(n))
    }
}

#[tokio::test]
async fn each_response_is_computed_against_one_date() -> Result<()> {
    // Ana turns 34 on 2024-06-15
    let clock = Arc::new(TickingClock {
        start: ymd(2024, 6, 14),
        reads: AtomicU32::new(0),
    });
    let module = ProjectRegistry::with_clock(
        create_test_db().await,
        ProjectRegistryConfig::default(),
        clock.clone(),
    );
    let ids = seed(&module).await?;
    let app = router_for(&module);
    let reads_before = clock.reads.load(Ordering::SeqCst);

    let (_, body) = call(&app, "GET", &format!("/servicio1/{}", ids.uchile), None).await?;
    let outer: Vec<InstitutionOverviewDto> = serde_json::from_value(body)?;
    let ages: Vec<(i32, i32)> = outer[0]
        .proyectos
        .iter()
        .map(|p| (p.usuario.id, p.usuario.edad))
        .collect();
    assert_eq!(ages, [(ids.ana, 33), (ids.luis, 38), (ids.ana, 33)]);
    assert_eq!(clock.reads.load(Ordering::SeqCst), reads_before + 1);

    let (_, body) = call(&app, "GET", "/servicio2/12345678K", None).await?;
    assert_eq!(body[0]["edad"], 34);
    assert_eq!(clock.reads.load(Ordering::SeqCst), reads_before + 2);

    let (_, body) = call(&app, "GET", "/usuarios", None).await?;
    assert_eq!(body[0]["edad"], 34);
    assert_eq!(clock.reads.load(Ordering::SeqCst), reads_before + 3);

    Ok(())
}

#[tokio::test]
async fn servicio1_without_projects_has_empty_list() -> Result<()> {
    let module = create_test_module(ymd(2024, 6, 15)).await;
    let svc = module.service();
    let id = svc
        .create_institution(NewInstitution {
            name: "Vacia".into(),
            description: String::new(),
            address: "Sin numero".into(),
        })
        .await?
        .id;
    let app = router_for(&module);

    let (status, body) = call(&app, "GET", &format!("/servicio1/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["proyectos"], json!([]));
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn servicio1_unknown_institution_is_not_found() -> Result<()> {
    let module = create_test_module(ymd(2024, 6, 15)).await;
    let app = router_for(&module);

    let (status, body) = call(&app, "GET", "/servicio1/77", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "REGISTRY_INSTITUTION_NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn servicio2_lists_user_projects_with_institution_names() -> Result<()> {
    let module = create_test_module(ymd(2024, 6, 15)).await;
    let ids = seed(&module).await?;
    let app = router_for(&module);

    let (status, body) = call(&app, "GET", "/servicio2/12345678K", None).await?;
    assert_eq!(status, StatusCode::OK);

    let outer: Vec<UserOverviewDto> = serde_json::from_value(body.clone())?;
    assert_eq!(outer.len(), 1);
    let overview = &outer[0];
    assert_eq!(overview.id, ids.ana);
    assert_eq!(overview.edad, 34);

    let hosted: Vec<(&str, &str)> = overview
        .proyectos
        .iter()
        .map(|p| (p.nombre.as_str(), p.institucion.as_str()))
        .collect();
    assert_eq!(
        hosted,
        [("Ended", "UChile"), ("Tomorrow", "PUC"), ("YearEnd", "UChile")]
    );
    assert_eq!(body[0]["proyectos"][0]["fecha_fin"], "2024-06-14");
    assert!(body[0]["proyectos"][0].get("usuario_id").is_none());

    Ok(())
}

#[tokio::test]
async fn servicio2_unknown_rut_is_not_found() -> Result<()> {
    let module = create_test_module(ymd(2024, 6, 15)).await;
    let app = router_for(&module);

    let (status, body) = call(&app, "GET", "/servicio2/00000000", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "REGISTRY_USER_NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn servicio4_reports_days_left_for_running_projects() -> Result<()> {
    let module = create_test_module(ymd(2024, 6, 15)).await;
    seed(&module).await?;
    let app = router_for(&module);

    let (status, body) = call(&app, "GET", "/servicio4", None).await?;
    assert_eq!(status, StatusCode::OK);

    let outer: Vec<Vec<RemainingDaysDto>> = serde_json::from_value(body)?;
    assert_eq!(outer.len(), 1);
    assert_eq!(
        outer[0],
        vec![
            RemainingDaysDto {
                nombre: "Tomorrow".into(),
                dias_faltantes: 1,
            },
            RemainingDaysDto {
                nombre: "YearEnd".into(),
                dias_faltantes: 199,
            },
        ]
    );

    Ok(())
}

#[tokio::test]
async fn servicio4_on_empty_registry_is_nested_empty_list() -> Result<()> {
    let module = create_test_module(ymd(2024, 6, 15)).await;
    let app = router_for(&module);

    let (status, body) = call(&app, "GET", "/servicio4", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([[]]));

    Ok(())
}
