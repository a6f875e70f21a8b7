// feedback-report-service/src/credentials.rs

use rand::Rng;
use std::collections::HashSet;

use crate::error::{ReportError, Result};
use crate::models::Credential;

/// Highest two-digit sequence number a username can carry.
pub const MAX_SEQUENCE: u32 = 99;

const DEPARTMENT_PREFIXES: [(i32, &str); 9] = [
    (1, "CS"),
    (2, "A"),
    (3, "I"),
    (4, "M"),
    (5, "C"),
    (6, "EP"),
    (7, "EA"),
    (8, "EV"),
    (9, "F"),
];

pub fn year_prefix(year: i32) -> Result<&'static str> {
    match year {
        1 => Ok("FE"),
        2 => Ok("SE"),
        3 => Ok("TE"),
        4 => Ok("BE"),
        other => Err(ReportError::Validation(format!(
            "Student year must be between 1 and 4, got {other}"
        ))),
    }
}

/// Unknown departments get no prefix.
pub fn department_prefix(department_id: i32) -> &'static str {
    DEPARTMENT_PREFIXES
        .iter()
        .find(|(id, _)| *id == department_id)
        .map(|(_, prefix)| *prefix)
        .unwrap_or("")
}

pub fn semester_digit(semester: i32) -> char {
    if semester == 1 {
        '1'
    } else {
        '2'
    }
}

/// `{year}{department}{semester}` stem shared by every username of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsernamePattern {
    pub year_prefix: &'static str,
    stem: String,
}

impl UsernamePattern {
    pub fn new(department_id: i32, year: i32, semester: i32) -> Result<Self> {
        let year_prefix = year_prefix(year)?;
        let stem = format!(
            "{}{}{}",
            year_prefix,
            department_prefix(department_id),
            semester_digit(semester)
        );
        Ok(Self { year_prefix, stem })
    }

    pub fn prefix(&self) -> &str {
        &self.stem
    }

    pub fn username(&self, sequence: u32) -> String {
        format!("{}{:02}", self.stem, sequence)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCredential {
    pub username: String,
    pub password: String,
}

pub fn random_password(rng: &mut impl Rng) -> String {
    rng.gen_range(1000u16..=9999).to_string()
}

/// Picks `count` usernames in sequence order, skipping every name in
/// `taken`. `taken` must hold all stored usernames sharing the pattern's
/// prefix. Nothing is returned unless the whole batch fits.
pub fn plan_credentials(
    pattern: &UsernamePattern,
    taken: &HashSet<String>,
    count: usize,
    rng: &mut impl Rng,
) -> Result<Vec<PlannedCredential>> {
    let free: Vec<String> = (1..=MAX_SEQUENCE)
        .map(|seq| pattern.username(seq))
        .filter(|name| !taken.contains(name))
        .take(count)
        .collect();

    if free.len() < count {
        return Err(ReportError::CredentialSpaceExhausted {
            prefix: pattern.prefix().to_string(),
            requested: count,
            available: free.len(),
        });
    }

    Ok(free
        .into_iter()
        .map(|username| PlannedCredential {
            username,
            password: random_password(rng),
        })
        .collect())
}

/// A request for `count` fresh logins for one cohort of one department.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialBatch {
    pub department_id: i32,
    pub year: i32,
    pub semester: i32,
    pub academic_year: String,
    pub count: usize,
    pub pattern: UsernamePattern,
}

impl CredentialBatch {
    pub fn new(
        department_id: i32,
        year: i32,
        semester: i32,
        academic_year: &str,
        count: usize,
    ) -> Result<Self> {
        let academic_year = academic_year.trim();
        if academic_year.is_empty() {
            return Err(ReportError::Validation("Academic year is required".into()));
        }
        if semester < 1 {
            return Err(ReportError::Validation(format!("Invalid semester {semester}")));
        }
        if count == 0 {
            return Err(ReportError::Validation("Count must be at least 1".into()));
        }

        Ok(Self {
            department_id,
            year,
            semester,
            academic_year: academic_year.to_string(),
            count,
            pattern: UsernamePattern::new(department_id, year, semester)?,
        })
    }

    /// Plans the whole batch against `taken` and returns unused credentials.
    pub fn plan(&self, taken: &HashSet<String>, rng: &mut impl Rng) -> Result<Vec<Credential>> {
        let planned = plan_credentials(&self.pattern, taken, self.count, rng)?;

        Ok(planned
            .into_iter()
            .map(|p| Credential {
                username: p.username,
                password: p.password,
                department_id: self.department_id,
                year: self.year,
                semester: self.semester,
                academic_year: self.academic_year.clone(),
                used: false,
            })
            .collect())
    }
}
