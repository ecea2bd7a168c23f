#![cfg(feature = "integration")]

mod common;

use std::sync::Arc;

use anyhow::Result;
use sea_orm::Database;

use common::ymd;
use project_registry::contract::model::{NewInstitution, NewProject, NewUser};
use project_registry::domain::ports::FixedClock;
use project_registry::domain::repo::{InstitutionsRepository, ProjectsRepository, UsersRepository};
use project_registry::infra::storage::SeaOrmRegistryRepository;
use project_registry::ProjectRegistry;

#[tokio::test]
async fn registry_works_with_postgres() -> Result<()> {
    let dut = common::pg::bring_up_postgres().await?;

    let db = Database::connect(&dut.url).await?;
    ProjectRegistry::migrate(&db)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    // second run is a no-op
    ProjectRegistry::migrate(&db).await?;

    let repo = SeaOrmRegistryRepository::new(db.clone());

    let inst = repo
        .insert_institution(
            NewInstitution {
                name: "UChile".into(),
                description: "Universidad".into(),
                address: "Av. Libertador 1058".into(),
            },
            chrono::Utc::now(),
        )
        .await?;
    let user = repo
        .insert_user(NewUser {
            name: "Ana".into(),
            surnames: "Rojas Soto".into(),
            rut: "12345678K".into(),
            birth_date: ymd(1990, 6, 15),
            position: "Ingeniera".into(),
        })
        .await?;
    repo.insert_project(NewProject {
        name: "Sensorica".into(),
        description: "Red de sensores".into(),
        start_date: ymd(2024, 1, 1),
        end_date: ymd(2024, 12, 31),
        institution_id: inst.id,
        user_id: user.id,
    })
    .await?;

    assert!(repo.surnames_exist("Rojas Soto").await?);
    assert_eq!(repo.count_projects_of_institution(inst.id).await?, 1);

    let owned = repo.projects_with_owner(inst.id).await?;
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].owner, user);

    let hosted = repo.projects_with_institution(user.id).await?;
    assert_eq!(hosted[0].institution_name, "UChile");

    assert_eq!(repo.projects_ending_after(ymd(2024, 12, 30)).await?.len(), 1);
    assert!(repo.projects_ending_after(ymd(2024, 12, 31)).await?.is_empty());

    // the foreign key blocks deleting a referenced institution
    assert!(repo.delete_institution(inst.id).await.is_err());

    // same data through the module and its clock
    let module = ProjectRegistry::with_clock(
        db,
        Default::default(),
        Arc::new(FixedClock::on(ymd(2024, 6, 15))),
    );
    let remaining = module.service().projects_remaining_days().await?;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].days_remaining, 199);

    Ok(())
}
