//! crates/bytegurukul_core/src/domain.rs
//!
//! Defines the pure, core data structures for the server side of the application.
//! These structs are independent of any database; only the small value enums
//! (`Role`, `PaperType`) carry serde derives because clients persist them too.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Users and Roles
//=========================================================================================

/// The closed set of roles a user can hold.
///
/// Parsing is case-insensitive (`"Admin"`, `"admin"` and `"ADMIN"` are all accepted)
/// so free-form role strings are normalized once, at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Role {
    #[default]
    Student,
    Instructor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "instructor" => Ok(Role::Instructor),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// Represents a user - used throughout app. Never carries the password hash.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// The data needed to persist a freshly registered user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

//=========================================================================================
// Courses and Enrollments
//=========================================================================================

/// A course offered on the platform, owned by an instructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub instructor_id: Uuid,
    /// Username of the owning instructor, filled in by listing queries.
    pub instructor_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub instructor_id: Uuid,
}

/// A server-side record that a user joined a course.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
}

//=========================================================================================
// Internship Applications
//=========================================================================================

/// Status assigned to every application when it is first submitted.
pub const APPLICATION_PENDING: &str = "Pending";

/// An internship application. `status` is free text owned by the reviewing admin
/// (`Pending`, `Approved`, `Rejected`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub university: Option<String>,
    pub resume_text: Option<String>,
    pub role_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub university: Option<String>,
    pub resume_text: Option<String>,
    pub role_id: String,
}

//=========================================================================================
// Question Papers
//=========================================================================================

/// Whether a paper was set for the regular exam or a carry-over (re-sit) exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaperType {
    #[default]
    Regular,
    #[serde(rename = "Carry Over")]
    CarryOver,
}

impl PaperType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaperType::Regular => "Regular",
            PaperType::CarryOver => "Carry Over",
        }
    }
}

impl fmt::Display for PaperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaperType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Regular" => Ok(PaperType::Regular),
            "Carry Over" => Ok(PaperType::CarryOver),
            other => Err(format!("Unknown paper type: {}", other)),
        }
    }
}

/// A previous-year question paper. `file_url` is the public path of the stored PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionPaper {
    pub id: Uuid,
    pub subject: String,
    pub subject_code: String,
    pub year: String,
    pub semester: String,
    pub paper_type: PaperType,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewQuestionPaper {
    pub subject: String,
    pub subject_code: String,
    pub year: String,
    pub semester: String,
    pub paper_type: PaperType,
    pub file_url: String,
}

/// Filter value that disables the corresponding filter.
pub const FILTER_ALL: &str = "All";

/// Filters for listing question papers.
#[derive(Debug, Clone, Default)]
pub struct PaperFilter {
    pub year: Option<String>,
    pub semester: Option<String>,
    pub search: Option<String>,
}

impl PaperFilter {
    /// The year to match exactly, ignoring empty values and the `All` sentinel.
    pub fn year(&self) -> Option<&str> {
        active(self.year.as_deref())
    }

    pub fn semester(&self) -> Option<&str> {
        active(self.semester.as_deref())
    }

    /// The trimmed search term, if any.
    pub fn search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// A `LIKE` pattern for the search term with wildcard characters escaped.
    pub fn search_pattern(&self) -> Option<String> {
        self.search().map(|term| {
            let escaped = term
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{}%", escaped)
        })
    }

    /// Applies the filter to a single paper. Search is a case-insensitive substring
    /// match against the subject or the subject code.
    pub fn matches(&self, paper: &QuestionPaper) -> bool {
        if let Some(year) = self.year() {
            if paper.year != year {
                return false;
            }
        }
        if let Some(semester) = self.semester() {
            if paper.semester != semester {
                return false;
            }
        }
        match self.search() {
            Some(term) => {
                let term = term.to_lowercase();
                paper.subject.to_lowercase().contains(&term)
                    || paper.subject_code.to_lowercase().contains(&term)
            }
            None => true,
        }
    }
}

fn active(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != FILTER_ALL)
}
