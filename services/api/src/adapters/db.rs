//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use bytegurukul_core::domain::{
    Application, Course, Enrollment, NewApplication, NewCourse, NewQuestionPaper, NewUser,
    PaperFilter, PaperType, QuestionPaper, Role, User, UserCredentials, APPLICATION_PENDING,
};
use bytegurukul_core::ports::{DatabaseService, PortError, PortResult};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at";

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> PortResult<UserCredentials> {
        let role = self
            .role
            .parse::<Role>()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(UserCredentials {
            user: User {
                id: self.id,
                username: self.username,
                email: self.email,
                role,
                created_at: self.created_at,
            },
            password_hash: self.password_hash,
        })
    }
}

#[derive(FromRow)]
struct CourseRecord {
    id: Uuid,
    title: String,
    description: Option<String>,
    price: f64,
    instructor_id: Uuid,
    instructor_name: Option<String>,
    created_at: DateTime<Utc>,
}
impl CourseRecord {
    fn to_domain(self) -> Course {
        Course {
            id: self.id,
            title: self.title,
            description: self.description,
            price: self.price,
            instructor_id: self.instructor_id,
            instructor_name: self.instructor_name,
            created_at: self.created_at,
        }
    }
}

const COURSE_SELECT: &str = "SELECT c.id, c.title, c.description, c.price, c.instructor_id, \
     u.username AS instructor_name, c.created_at \
     FROM courses c LEFT JOIN users u ON u.id = c.instructor_id";

#[derive(FromRow)]
struct EnrollmentRecord {
    id: Uuid,
    user_id: Uuid,
    course_id: Uuid,
    enrolled_at: DateTime<Utc>,
}
impl EnrollmentRecord {
    fn to_domain(self) -> Enrollment {
        Enrollment {
            id: self.id,
            user_id: self.user_id,
            course_id: self.course_id,
            enrolled_at: self.enrolled_at,
        }
    }
}

const APPLICATION_COLUMNS: &str =
    "id, name, email, phone, university, resume_text, role_id, status, created_at";

#[derive(FromRow)]
struct ApplicationRecord {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    university: Option<String>,
    resume_text: Option<String>,
    role_id: String,
    status: String,
    created_at: DateTime<Utc>,
}
impl ApplicationRecord {
    fn to_domain(self) -> Application {
        Application {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            university: self.university,
            resume_text: self.resume_text,
            role_id: self.role_id,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

const PAPER_COLUMNS: &str =
    "id, subject, subject_code, year, semester, paper_type, file_url, created_at";

#[derive(FromRow)]
struct PaperRecord {
    id: Uuid,
    subject: String,
    subject_code: String,
    year: String,
    semester: String,
    paper_type: String,
    file_url: String,
    created_at: DateTime<Utc>,
}
impl PaperRecord {
    fn to_domain(self) -> PortResult<QuestionPaper> {
        let paper_type = self
            .paper_type
            .parse::<PaperType>()
            .map_err(PortError::Unexpected)?;
        Ok(QuestionPaper {
            id: self.id,
            subject: self.subject,
            subject_code: self.subject_code,
            year: self.year,
            semester: self.semester,
            paper_type,
            file_url: self.file_url,
            created_at: self.created_at,
        })
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, user: NewUser) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (id, username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortError::Conflict("Email is already registered".to_string())
            } else {
                unexpected(e)
            }
        })?;
        Ok(record.to_domain()?.user)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => unexpected(e),
        })?;
        record.to_domain()
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", user_id)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain()?.user)
    }

    async fn update_user_credentials(
        &self,
        user_id: Uuid,
        password_hash: &str,
        role: Role,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET password_hash = $1, role = $2 WHERE id = $3 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(password_hash)
        .bind(role.as_str())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", user_id)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain()?.user)
    }

    async fn list_courses(&self) -> PortResult<Vec<Course>> {
        let records = sqlx::query_as::<_, CourseRecord>(&format!(
            "{} ORDER BY c.created_at DESC",
            COURSE_SELECT
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_course_by_id(&self, course_id: Uuid) -> PortResult<Course> {
        let record =
            sqlx::query_as::<_, CourseRecord>(&format!("{} WHERE c.id = $1", COURSE_SELECT))
                .bind(course_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| match e {
                    sqlx::Error::RowNotFound => PortError::NotFound("Course not found".to_string()),
                    _ => unexpected(e),
                })?;
        Ok(record.to_domain())
    }

    async fn create_course(&self, course: NewCourse) -> PortResult<Course> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO courses (id, title, description, price, instructor_id) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.price)
        .bind(course.instructor_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        self.get_course_by_id(id).await
    }

    async fn find_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> PortResult<Option<Enrollment>> {
        let record = sqlx::query_as::<_, EnrollmentRecord>(
            "SELECT id, user_id, course_id, enrolled_at FROM enrollments \
             WHERE user_id = $1 AND course_id = $2",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn create_enrollment(&self, user_id: Uuid, course_id: Uuid) -> PortResult<Enrollment> {
        let record = sqlx::query_as::<_, EnrollmentRecord>(
            "INSERT INTO enrollments (id, user_id, course_id) VALUES ($1, $2, $3) \
             RETURNING id, user_id, course_id, enrolled_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortError::Conflict("You are already enrolled in this course.".to_string())
            } else {
                unexpected(e)
            }
        })?;
        Ok(record.to_domain())
    }

    async fn create_application(&self, application: NewApplication) -> PortResult<Application> {
        let record = sqlx::query_as::<_, ApplicationRecord>(&format!(
            "INSERT INTO applications (id, name, email, phone, university, resume_text, role_id, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            APPLICATION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&application.name)
        .bind(&application.email)
        .bind(&application.phone)
        .bind(&application.university)
        .bind(&application.resume_text)
        .bind(&application.role_id)
        .bind(APPLICATION_PENDING)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_applications(&self) -> PortResult<Vec<Application>> {
        let records = sqlx::query_as::<_, ApplicationRecord>(&format!(
            "SELECT {} FROM applications ORDER BY created_at DESC",
            APPLICATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn update_application_status(
        &self,
        application_id: Uuid,
        status: &str,
    ) -> PortResult<Application> {
        let record = sqlx::query_as::<_, ApplicationRecord>(&format!(
            "UPDATE applications SET status = $1 WHERE id = $2 RETURNING {}",
            APPLICATION_COLUMNS
        ))
        .bind(status)
        .bind(application_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound("Application not found".to_string()),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn create_question_paper(&self, paper: NewQuestionPaper) -> PortResult<QuestionPaper> {
        let record = sqlx::query_as::<_, PaperRecord>(&format!(
            "INSERT INTO question_papers (id, subject, subject_code, year, semester, paper_type, file_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            PAPER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&paper.subject)
        .bind(&paper.subject_code)
        .bind(&paper.year)
        .bind(&paper.semester)
        .bind(paper.paper_type.as_str())
        .bind(&paper.file_url)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn list_question_papers(&self, filter: &PaperFilter) -> PortResult<Vec<QuestionPaper>> {
        let records = sqlx::query_as::<_, PaperRecord>(&format!(
            r"SELECT {} FROM question_papers
              WHERE ($1::TEXT IS NULL OR year = $1)
                AND ($2::TEXT IS NULL OR semester = $2)
                AND ($3::TEXT IS NULL
                     OR subject ILIKE $3 ESCAPE '\'
                     OR subject_code ILIKE $3 ESCAPE '\')
              ORDER BY created_at DESC",
            PAPER_COLUMNS
        ))
        .bind(filter.year())
        .bind(filter.semester())
        .bind(filter.search_pattern())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }
}
