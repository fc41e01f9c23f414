//! services/api/src/adapters/memory.rs
//!
//! An in-memory implementation of the `DatabaseService` port.
//!
//! All state lives in `Vec`s behind a single `tokio::sync::RwLock`, so nothing
//! survives a restart. It backs local development when no `DATABASE_URL` is set
//! and the integration tests. Uniqueness rules match the Postgres schema.

use async_trait::async_trait;
use bytegurukul_core::domain::{
    Application, Course, Enrollment, NewApplication, NewCourse, NewQuestionPaper, NewUser,
    PaperFilter, QuestionPaper, Role, User, UserCredentials, APPLICATION_PENDING,
};
use bytegurukul_core::ports::{DatabaseService, PortError, PortResult};
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: Vec<UserCredentials>,
    courses: Vec<Course>,
    enrollments: Vec<Enrollment>,
    applications: Vec<Application>,
    papers: Vec<QuestionPaper>,
}

#[derive(Default)]
pub struct InMemoryDb {
    tables: RwLock<Tables>,
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first. Rows are scanned in reverse insertion order so that rows created
/// in the same instant still list the most recent insert first.
fn newest_first<T: Clone>(rows: &[T], created_at: impl Fn(&T) -> chrono::DateTime<Utc>) -> Vec<T> {
    let mut out: Vec<T> = rows.iter().rev().cloned().collect();
    out.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    out
}

fn with_instructor(course: &Course, users: &[UserCredentials]) -> Course {
    let mut course = course.clone();
    course.instructor_name = users
        .iter()
        .find(|c| c.user.id == course.instructor_id)
        .map(|c| c.user.username.clone());
    course
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn create_user(&self, user: NewUser) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|c| c.user.email == user.email) {
            return Err(PortError::Conflict("Email is already registered".to_string()));
        }
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: Utc::now(),
        };
        tables.users.push(UserCredentials {
            user: created.clone(),
            password_hash: user.password_hash,
        });
        Ok(created)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let tables = self.tables.read().await;
        tables
            .users
            .iter()
            .find(|c| c.user.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .iter()
            .find(|c| c.user.id == user_id)
            .map(|c| c.user.clone())
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn update_user_credentials(
        &self,
        user_id: Uuid,
        password_hash: &str,
        role: Role,
    ) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        let creds = tables
            .users
            .iter_mut()
            .find(|c| c.user.id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        creds.password_hash = password_hash.to_string();
        creds.user.role = role;
        Ok(creds.user.clone())
    }

    async fn list_courses(&self) -> PortResult<Vec<Course>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.courses, |c| c.created_at)
            .iter()
            .map(|c| with_instructor(c, &tables.users))
            .collect())
    }

    async fn get_course_by_id(&self, course_id: Uuid) -> PortResult<Course> {
        let tables = self.tables.read().await;
        tables
            .courses
            .iter()
            .find(|c| c.id == course_id)
            .map(|c| with_instructor(c, &tables.users))
            .ok_or_else(|| PortError::NotFound("Course not found".to_string()))
    }

    async fn create_course(&self, course: NewCourse) -> PortResult<Course> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|c| c.user.id == course.instructor_id) {
            return Err(PortError::Unexpected(format!(
                "instructor {} does not exist",
                course.instructor_id
            )));
        }
        let created = Course {
            id: Uuid::new_v4(),
            title: course.title,
            description: course.description,
            price: course.price,
            instructor_id: course.instructor_id,
            instructor_name: None,
            created_at: Utc::now(),
        };
        tables.courses.push(created.clone());
        Ok(with_instructor(&created, &tables.users))
    }

    async fn find_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> PortResult<Option<Enrollment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .enrollments
            .iter()
            .find(|e| e.user_id == user_id && e.course_id == course_id)
            .cloned())
    }

    async fn create_enrollment(&self, user_id: Uuid, course_id: Uuid) -> PortResult<Enrollment> {
        let mut tables = self.tables.write().await;
        if tables
            .enrollments
            .iter()
            .any(|e| e.user_id == user_id && e.course_id == course_id)
        {
            return Err(PortError::Conflict(
                "You are already enrolled in this course.".to_string(),
            ));
        }
        let enrollment = Enrollment {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            enrolled_at: Utc::now(),
        };
        tables.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn create_application(&self, application: NewApplication) -> PortResult<Application> {
        let mut tables = self.tables.write().await;
        let created = Application {
            id: Uuid::new_v4(),
            name: application.name,
            email: application.email,
            phone: application.phone,
            university: application.university,
            resume_text: application.resume_text,
            role_id: application.role_id,
            status: APPLICATION_PENDING.to_string(),
            created_at: Utc::now(),
        };
        tables.applications.push(created.clone());
        Ok(created)
    }

    async fn list_applications(&self) -> PortResult<Vec<Application>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.applications, |a| a.created_at))
    }

    async fn update_application_status(
        &self,
        application_id: Uuid,
        status: &str,
    ) -> PortResult<Application> {
        let mut tables = self.tables.write().await;
        let application = tables
            .applications
            .iter_mut()
            .find(|a| a.id == application_id)
            .ok_or_else(|| PortError::NotFound("Application not found".to_string()))?;
        application.status = status.to_string();
        Ok(application.clone())
    }

    async fn create_question_paper(&self, paper: NewQuestionPaper) -> PortResult<QuestionPaper> {
        let mut tables = self.tables.write().await;
        let created = QuestionPaper {
            id: Uuid::new_v4(),
            subject: paper.subject,
            subject_code: paper.subject_code,
            year: paper.year,
            semester: paper.semester,
            paper_type: paper.paper_type,
            file_url: paper.file_url,
            created_at: Utc::now(),
        };
        tables.papers.push(created.clone());
        Ok(created)
    }

    async fn list_question_papers(&self, filter: &PaperFilter) -> PortResult<Vec<QuestionPaper>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.papers, |p| p.created_at)
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect())
    }
}
