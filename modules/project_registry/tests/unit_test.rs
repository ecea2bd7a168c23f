use chrono::NaiveDate;

use project_registry::contract::{error::RegistryError, model::*};
use project_registry::domain::error::DomainError;
// Internal modules are imported for testing only; consumers use `contract`.

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn user_born(birth_date: NaiveDate) -> User {
    User {
        id: 1,
        name: "Ana".into(),
        surnames: "Rojas".into(),
        rut: "12345678K".into(),
        birth_date,
        position: "Ingeniera".into(),
    }
}

#[test]
fn age_counts_whole_years() {
    let user = user_born(ymd(1990, 6, 15));
    assert_eq!(user.age_on(ymd(2024, 1, 1)), 33);
    assert_eq!(user.age_on(ymd(2024, 6, 14)), 33);
    assert_eq!(user.age_on(ymd(2024, 6, 15)), 34);
    assert_eq!(user.age_on(ymd(2024, 12, 31)), 34);
}

#[test]
fn leap_day_birthdays_turn_over_on_march_first() {
    let user = user_born(ymd(2000, 2, 29));
    assert_eq!(user.age_on(ymd(2023, 2, 28)), 22);
    assert_eq!(user.age_on(ymd(2023, 3, 1)), 23);
    assert_eq!(user.age_on(ymd(2024, 2, 29)), 24);
}

#[test]
fn domain_errors_collapse_into_contract_errors() {
    let cases = [
        (DomainError::institution_not_found(3), "not_found"),
        (DomainError::user_not_found("1-9"), "not_found"),
        (DomainError::surnames_already_exist("Rojas"), "conflict"),
        (DomainError::institution_in_use(3, 1), "conflict"),
        (DomainError::invalid_date("fecha_fin", "x"), "validation"),
        (DomainError::validation("nombre", "cannot be empty"), "validation"),
        (DomainError::database("connection reset"), "internal"),
    ];

    for (domain, expected) in cases {
        let kind = match RegistryError::from(domain) {
            RegistryError::NotFound { .. } => "not_found",
            RegistryError::Conflict { .. } => "conflict",
            RegistryError::Validation { .. } => "validation",
            RegistryError::Internal => "internal",
        };
        assert_eq!(kind, expected);
    }
}

#[test]
fn contract_errors_keep_domain_messages() {
    match RegistryError::from(DomainError::institution_not_found(12)) {
        RegistryError::NotFound { message } => assert!(message.contains("12")),
        other => panic!("Expected NotFound, got {other:?}"),
    }
    assert_eq!(RegistryError::internal(), RegistryError::Internal);
}
