use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// A person who can own projects. Pure model, no serde.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub name: String,
    /// Unique across users.
    pub surnames: String,
    /// National identity number.
    pub rut: String,
    pub birth_date: NaiveDate,
    pub position: String,
}

impl User {
    /// Whole years lived as of `today`; the birthday itself counts.
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        let years = today.year() - self.birth_date.year();
        if (today.month(), today.day()) < (self.birth_date.month(), self.birth_date.day()) {
            years - 1
        } else {
            years
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub surnames: String,
    pub rut: String,
    pub birth_date: NaiveDate,
    pub position: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Institution {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub address: String,
    /// Assigned on insert, never changed afterwards.
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied institution fields, for both create and full update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInstitution {
    pub name: String,
    pub description: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub institution_id: i32,
    pub user_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub institution_id: i32,
    pub user_id: i32,
}

/// A project together with the user who owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedProject {
    pub project: Project,
    pub owner: User,
}

/// A project together with the name of its institution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedProject {
    pub project: Project,
    pub institution_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionOverview {
    pub institution: Institution,
    pub projects: Vec<OwnedProject>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserOverview {
    pub user: User,
    pub projects: Vec<HostedProject>,
}

/// Days left until a still-running project ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemainingDays {
    pub project_name: String,
    pub days_remaining: i64,
}
