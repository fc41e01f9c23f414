//! crates/bytegurukul_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases,
//! HTTP clients or browser storage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Application, Course, Enrollment, NewApplication, NewCourse, NewQuestionPaper, NewUser,
    PaperFilter, QuestionPaper, Role, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A uniqueness rule was violated (duplicate email, repeated enrollment).
    #[error("{0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---

    /// Persists a new user. Fails with `Conflict` if the email is taken.
    async fn create_user(&self, user: NewUser) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    /// Replaces a user's password hash and role.
    async fn update_user_credentials(
        &self,
        user_id: Uuid,
        password_hash: &str,
        role: Role,
    ) -> PortResult<User>;

    // --- Courses ---
    async fn list_courses(&self) -> PortResult<Vec<Course>>;

    async fn get_course_by_id(&self, course_id: Uuid) -> PortResult<Course>;

    async fn create_course(&self, course: NewCourse) -> PortResult<Course>;

    // --- Enrollments ---
    async fn find_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> PortResult<Option<Enrollment>>;

    /// Fails with `Conflict` if the pair already exists.
    async fn create_enrollment(&self, user_id: Uuid, course_id: Uuid) -> PortResult<Enrollment>;

    // --- Internship Applications ---
    async fn create_application(&self, application: NewApplication) -> PortResult<Application>;

    /// All applications, newest first.
    async fn list_applications(&self) -> PortResult<Vec<Application>>;

    async fn update_application_status(
        &self,
        application_id: Uuid,
        status: &str,
    ) -> PortResult<Application>;

    // --- Question Papers ---
    async fn create_question_paper(&self, paper: NewQuestionPaper) -> PortResult<QuestionPaper>;

    /// Papers matching the filter, newest first.
    async fn list_question_papers(&self, filter: &PaperFilter) -> PortResult<Vec<QuestionPaper>>;
}
