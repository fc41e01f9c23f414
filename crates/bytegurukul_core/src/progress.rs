//! crates/bytegurukul_core/src/progress.rs
//!
//! The client-side enrollment and progress tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{
    load_json, save_json, scoped_key, DurableStorage, StorageError, COMPLETED_COURSES_KEY,
    ENROLLMENTS_KEY,
};

/// Progress value at which a course counts as completed.
pub const COMPLETE: f64 = 100.0;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ProgressError {
    #[error("Progress must be between 0 and 100, got {0}")]
    InvalidProgress(f64),
    #[error("Not enrolled in course {0}")]
    NotEnrolled(String),
}

/// The parts of a course the tracker needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseEnrollment {
    pub course_id: String,
    pub title: String,
    pub enrolled_at: DateTime<Utc>,
    pub progress_percent: f64,
    pub current_module: u32,
    pub current_lesson: u32,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Where a learner is in a course.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CourseProgress {
    pub progress_percent: f64,
    pub current_module: u32,
    pub current_lesson: u32,
}

impl Default for CourseProgress {
    fn default() -> Self {
        Self {
            progress_percent: 0.0,
            current_module: 0,
            current_lesson: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    owner: Option<String>,
    enrollments: Vec<CourseEnrollment>,
    completed: Vec<String>,
}

impl ProgressTracker {
    pub fn new(owner: Option<String>) -> Self {
        Self {
            owner,
            enrollments: Vec::new(),
            completed: Vec::new(),
        }
    }

    pub fn load(storage: &dyn DurableStorage, owner: Option<String>) -> Result<Self, StorageError> {
        let enrollments =
            load_json(storage, &scoped_key(ENROLLMENTS_KEY, owner.as_deref()))?.unwrap_or_default();
        let completed = load_json(storage, &scoped_key(COMPLETED_COURSES_KEY, owner.as_deref()))?
            .unwrap_or_default();
        Ok(Self {
            owner,
            enrollments,
            completed,
        })
    }

    pub fn save(&self, storage: &dyn DurableStorage) -> Result<(), StorageError> {
        save_json(
            storage,
            &scoped_key(ENROLLMENTS_KEY, self.owner.as_deref()),
            &self.enrollments,
        )?;
        save_json(
            storage,
            &scoped_key(COMPLETED_COURSES_KEY, self.owner.as_deref()),
            &self.completed,
        )
    }

    pub fn enrollments(&self) -> &[CourseEnrollment] {
        &self.enrollments
    }

    /// Ids of completed courses in completion order, without duplicates.
    pub fn completed_courses(&self) -> &[String] {
        &self.completed
    }

    /// Joins a course at zero progress. Re-enrolling is a no-op; returns whether
    /// a new enrollment was created.
    pub fn enroll(&mut self, course: CourseSummary) -> bool {
        if self.is_enrolled(&course.id) {
            return false;
        }
        self.enrollments.push(CourseEnrollment {
            course_id: course.id,
            title: course.title,
            enrolled_at: Utc::now(),
            progress_percent: 0.0,
            current_module: 0,
            current_lesson: 0,
            last_updated: None,
        });
        true
    }

    /// Overwrites the progress fields of an enrollment. Reaching 100 marks the course
    /// completed exactly once.
    pub fn advance(
        &mut self,
        course_id: &str,
        progress_percent: f64,
        module_index: u32,
        lesson_index: u32,
    ) -> Result<(), ProgressError> {
        if !(0.0..=COMPLETE).contains(&progress_percent) {
            return Err(ProgressError::InvalidProgress(progress_percent));
        }
        let enrollment = self
            .enrollments
            .iter_mut()
            .find(|e| e.course_id == course_id)
            .ok_or_else(|| ProgressError::NotEnrolled(course_id.to_string()))?;

        enrollment.progress_percent = progress_percent;
        enrollment.current_module = module_index;
        enrollment.current_lesson = lesson_index;
        enrollment.last_updated = Some(Utc::now());

        if progress_percent >= COMPLETE && !self.completed.iter().any(|id| id == course_id) {
            self.completed.push(course_id.to_string());
        }
        Ok(())
    }

    pub fn is_enrolled(&self, course_id: &str) -> bool {
        self.enrollments.iter().any(|e| e.course_id == course_id)
    }

    pub fn is_completed(&self, course_id: &str) -> bool {
        self.completed.iter().any(|id| id == course_id)
    }

    pub fn enrolled_course(&self, course_id: &str) -> Option<&CourseEnrollment> {
        self.enrollments.iter().find(|e| e.course_id == course_id)
    }

    /// Progress for a course, zeroed if the course is unknown.
    pub fn course_progress(&self, course_id: &str) -> CourseProgress {
        self.enrolled_course(course_id)
            .map(|e| CourseProgress {
                progress_percent: e.progress_percent,
                current_module: e.current_module,
                current_lesson: e.current_lesson,
            })
            .unwrap_or_default()
    }

    /// Mean progress across all enrollments, 0 when there are none.
    pub fn overall_progress(&self) -> f64 {
        if self.enrollments.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.enrollments.iter().map(|e| e.progress_percent).sum();
        sum / self.enrollments.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn course(id: &str) -> CourseSummary {
        CourseSummary {
            id: id.to_string(),
            title: format!("Course {}", id),
        }
    }

    #[test]
    fn enrolling_twice_is_a_no_op() {
        let mut tracker = ProgressTracker::new(None);
        assert!(tracker.enroll(course("rust")));
        tracker.advance("rust", 40.0, 1, 2).unwrap();
        assert!(!tracker.enroll(course("rust")));

        assert_eq!(tracker.enrollments().len(), 1);
        assert_eq!(tracker.course_progress("rust").progress_percent, 40.0);
    }

    #[test]
    fn overall_progress_is_the_mean() {
        let mut tracker = ProgressTracker::new(None);
        assert_eq!(tracker.overall_progress(), 0.0);

        tracker.enroll(course("a"));
        tracker.enroll(course("b"));
        tracker.enroll(course("c"));
        tracker.advance("a", 30.0, 0, 3).unwrap();
        tracker.advance("b", 60.0, 1, 0).unwrap();

        assert_eq!(tracker.overall_progress(), 30.0);
    }

    #[test]
    fn completion_is_recorded_once() {
        let mut tracker = ProgressTracker::new(None);
        tracker.enroll(course("a"));
        tracker.advance("a", 100.0, 4, 5).unwrap();
        tracker.advance("a", 100.0, 4, 5).unwrap();

        assert_eq!(tracker.completed_courses(), ["a".to_string()]);
        assert!(tracker.is_completed("a"));
    }

    #[test]
    fn out_of_range_progress_is_rejected() {
        let mut tracker = ProgressTracker::new(None);
        tracker.enroll(course("a"));
        assert_eq!(
            tracker.advance("a", 101.0, 0, 0),
            Err(ProgressError::InvalidProgress(101.0))
        );
        assert_eq!(
            tracker.advance("a", -1.0, 0, 0),
            Err(ProgressError::InvalidProgress(-1.0))
        );
        assert!(tracker.advance("a", f64::NAN, 0, 0).is_err());
        assert_eq!(tracker.course_progress("a"), CourseProgress::default());
    }

    #[test]
    fn advancing_an_unknown_course_fails() {
        let mut tracker = ProgressTracker::new(None);
        assert_eq!(
            tracker.advance("ghost", 10.0, 0, 0),
            Err(ProgressError::NotEnrolled("ghost".to_string()))
        );
    }

    #[test]
    fn tracker_round_trips_through_storage() {
        let storage = MemoryStorage::new();
        let mut tracker = ProgressTracker::new(Some("u1".to_string()));
        tracker.enroll(course("a"));
        tracker.advance("a", 100.0, 2, 1).unwrap();
        tracker.save(&storage).unwrap();

        let restored = ProgressTracker::load(&storage, Some("u1".to_string())).unwrap();
        assert_eq!(restored.enrollments(), tracker.enrollments());
        assert_eq!(restored.completed_courses(), ["a".to_string()]);
    }
}
