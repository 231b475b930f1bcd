//! Enrollment workflow: a student's request to join a course and the
//! lecturer-controlled approval gate converting it into course access.
//!
//! Per enrollment the state machine is `Requested` (approved = false) →
//! `Approved` (approved = true). There is no reject or withdraw transition;
//! both states are valid resting states.

use std::sync::Arc;

use coursehub_store::{Collection, CreateOutcome, Filter, RecordStore};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use crate::error::DomainError;
use crate::models::{Course, Enrollment, User};
use crate::{encode, load_user};

const UNKNOWN_STUDENT: &str = "Unknown Student";
const UNKNOWN_EMAIL: &str = "unknown@email.com";

/// Pending enrollment joined with display fields for the lecturer's queue.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEnrollment {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub student_name: String,
    pub course_name: String,
}

/// Approved enrollment joined with student display fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStudent {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub student_name: String,
    pub student_email: String,
}

/// A student's enrollment joined with the full course record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentEnrollment {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub course: Course,
}

#[derive(Clone)]
pub struct EnrollmentService {
    store: Arc<dyn RecordStore>,
}

impl EnrollmentService {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Requests enrollment of a student into a course. The insert is
    /// conditional on no enrollment existing for the (student, course) pair;
    /// a duplicate request returns the existing record unchanged.
    pub async fn request(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> Result<Enrollment, DomainError> {
        let user = load_user(self.store.as_ref(), student_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", student_id))?;
        if !matches!(user, User::Student(_)) {
            return Err(DomainError::Forbidden(
                "only students can request enrollment".to_owned(),
            ));
        }
        self.store
            .get(Collection::Courses, course_id)
            .await?
            .ok_or_else(|| DomainError::not_found("course", course_id))?;

        let enrollment = Enrollment {
            id: String::new(),
            student_id: student_id.to_owned(),
            course_id: course_id.to_owned(),
            approved: false,
            enrolled_at: chrono::Utc::now(),
        };
        let filter = Filter::field("studentId", student_id).and("courseId", course_id);
        match self
            .store
            .create_if_absent(Collection::Enrollments, &filter, encode(&enrollment)?)
            .await?
        {
            CreateOutcome::Created(id) => Ok(Enrollment { id, ..enrollment }),
            CreateOutcome::Exists(record) => Ok(record.decode()?),
        }
    }

    /// Returns the enrollment for the (student, course) pair, if any. Callers
    /// derive the three-state view with [`EnrollmentStatus::of`].
    ///
    /// [`EnrollmentStatus::of`]: crate::models::EnrollmentStatus::of
    pub async fn status(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>, DomainError> {
        let filter = Filter::field("studentId", student_id).and("courseId", course_id);
        let mut records = self.store.find(Collection::Enrollments, &filter).await?;
        records
            .pop()
            .map(|record| record.decode().map_err(DomainError::from))
            .transpose()
    }

    /// Approves an enrollment. Only the lecturer owning the enrollment's
    /// course may approve it; re-approving is a no-op in outcome.
    pub async fn approve(
        &self,
        lecturer_id: &str,
        enrollment_id: &str,
    ) -> Result<(), DomainError> {
        let enrollment: Enrollment = self
            .store
            .get(Collection::Enrollments, enrollment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("enrollment", enrollment_id))?
            .decode()?;
        let course: Course = self
            .store
            .get(Collection::Courses, &enrollment.course_id)
            .await?
            .ok_or_else(|| DomainError::not_found("course", enrollment.course_id.clone()))?
            .decode()?;
        if course.lecturer_id != lecturer_id {
            return Err(DomainError::Forbidden(
                "only the course owner can approve enrollments".to_owned(),
            ));
        }
        self.store
            .update_field(Collection::Enrollments, enrollment_id, "approved", json!(true))
            .await?;
        Ok(())
    }

    /// All pending enrollments across the lecturer's courses, joined with
    /// student and course display names. A failed per-enrollment student
    /// lookup drops that single row instead of failing the whole batch.
    pub async fn pending_for_lecturer(
        &self,
        lecturer_id: &str,
    ) -> Result<Vec<PendingEnrollment>, DomainError> {
        let courses = self
            .store
            .find(Collection::Courses, &Filter::field("lecturerId", lecturer_id))
            .await?;
        let mut pending = Vec::new();
        for record in courses {
            let course: Course = match record.decode() {
                Ok(course) => course,
                Err(error) => {
                    warn!(%error, "skipping malformed course record");
                    continue;
                }
            };
            let filter = Filter::field("courseId", course.id.clone()).and("approved", false);
            for record in self.store.find(Collection::Enrollments, &filter).await? {
                let enrollment: Enrollment = match record.decode() {
                    Ok(enrollment) => enrollment,
                    Err(error) => {
                        warn!(%error, "skipping malformed enrollment record");
                        continue;
                    }
                };
                let student_name =
                    match load_user(self.store.as_ref(), &enrollment.student_id).await {
                        Ok(Some(user)) => user.full_name().to_owned(),
                        Ok(None) => UNKNOWN_STUDENT.to_owned(),
                        Err(error) => {
                            warn!(
                                student_id = %enrollment.student_id,
                                %error,
                                "skipping enrollment, student lookup failed"
                            );
                            continue;
                        }
                    };
                pending.push(PendingEnrollment {
                    enrollment,
                    student_name,
                    course_name: course.title.clone(),
                });
            }
        }
        Ok(pending)
    }

    /// Approved enrollments for a course, joined with student display fields,
    /// with the same partial-failure tolerance as the pending list.
    pub async fn approved_for_course(
        &self,
        course_id: &str,
    ) -> Result<Vec<CourseStudent>, DomainError> {
        let filter = Filter::field("courseId", course_id).and("approved", true);
        let mut students = Vec::new();
        for record in self.store.find(Collection::Enrollments, &filter).await? {
            let enrollment: Enrollment = match record.decode() {
                Ok(enrollment) => enrollment,
                Err(error) => {
                    warn!(%error, "skipping malformed enrollment record");
                    continue;
                }
            };
            let (student_name, student_email) =
                match load_user(self.store.as_ref(), &enrollment.student_id).await {
                    Ok(Some(user)) => (user.full_name().to_owned(), user.email().to_owned()),
                    Ok(None) => (UNKNOWN_STUDENT.to_owned(), UNKNOWN_EMAIL.to_owned()),
                    Err(error) => {
                        warn!(
                            student_id = %enrollment.student_id,
                            %error,
                            "skipping enrollment, student lookup failed"
                        );
                        continue;
                    }
                };
            students.push(CourseStudent {
                enrollment,
                student_name,
                student_email,
            });
        }
        Ok(students)
    }

    /// A student's enrollments joined with their courses. Enrollments whose
    /// course has been deleted are dropped from the view.
    pub async fn for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<StudentEnrollment>, DomainError> {
        let filter = Filter::field("studentId", student_id);
        let mut enrollments = Vec::new();
        for record in self.store.find(Collection::Enrollments, &filter).await? {
            let enrollment: Enrollment = match record.decode() {
                Ok(enrollment) => enrollment,
                Err(error) => {
                    warn!(%error, "skipping malformed enrollment record");
                    continue;
                }
            };
            match self.store.get(Collection::Courses, &enrollment.course_id).await {
                Ok(Some(record)) => match record.decode() {
                    Ok(course) => enrollments.push(StudentEnrollment { enrollment, course }),
                    Err(error) => warn!(%error, "skipping malformed course record"),
                },
                Ok(None) => {}
                Err(error) => {
                    warn!(
                        course_id = %enrollment.course_id,
                        %error,
                        "skipping enrollment, course lookup failed"
                    );
                }
            }
        }
        Ok(enrollments)
    }
}

#[cfg(test)]
mod tests {
    use coursehub_store::{MemoryRecordStore, Record, StoreError};

    use super::*;
    use crate::models::{ClassLevel, EnrollmentStatus, Student};

    async fn seed_student(store: &MemoryRecordStore, id: &str, name: &str) {
        let student = User::Student(Student {
            id: id.to_owned(),
            email: format!("{id}@example.edu"),
            full_name: name.to_owned(),
            matriculation_number: "ND/23/001".to_owned(),
            class: ClassLevel::ND1,
            created_at: chrono::Utc::now(),
        });
        store
            .put(Collection::Users, id, encode(&student).unwrap())
            .await
            .unwrap();
    }

    async fn seed_course(store: &MemoryRecordStore, lecturer_id: &str) -> String {
        let course = Course {
            id: String::new(),
            title: "Data Structures".to_owned(),
            lecturer_id: lecturer_id.to_owned(),
            lecturer_name: "Dr. Okafor".to_owned(),
            required_class: ClassLevel::ND1,
            files: Vec::new(),
            created_at: chrono::Utc::now(),
        };
        store
            .create(Collection::Courses, encode(&course).unwrap())
            .await
            .unwrap()
    }

    fn service(store: &Arc<MemoryRecordStore>) -> EnrollmentService {
        EnrollmentService::new(Arc::clone(store) as Arc<dyn RecordStore>)
    }

    #[tokio::test]
    async fn request_then_status_is_pending() {
        let store = Arc::new(MemoryRecordStore::new());
        seed_student(&store, "s1", "Ada").await;
        let course_id = seed_course(&store, "l1").await;
        let enrollments = service(&store);

        let enrollment = enrollments.request("s1", &course_id).await.unwrap();
        assert!(!enrollment.approved);

        let status = enrollments.status("s1", &course_id).await.unwrap();
        assert_eq!(EnrollmentStatus::of(status.as_ref()), EnrollmentStatus::Pending);
        assert_eq!(status.unwrap().id, enrollment.id);
    }

    #[tokio::test]
    async fn status_without_request_is_not_enrolled() {
        let store = Arc::new(MemoryRecordStore::new());
        let enrollments = service(&store);
        let status = enrollments.status("s1", "c1").await.unwrap();
        assert_eq!(
            EnrollmentStatus::of(status.as_ref()),
            EnrollmentStatus::NotEnrolled
        );
    }

    #[tokio::test]
    async fn duplicate_request_returns_existing_record() {
        let store = Arc::new(MemoryRecordStore::new());
        seed_student(&store, "s1", "Ada").await;
        let course_id = seed_course(&store, "l1").await;
        let enrollments = service(&store);

        let first = enrollments.request("s1", &course_id).await.unwrap();
        let second = enrollments.request("s1", &course_id).await.unwrap();
        assert_eq!(first.id, second.id);

        let all = store
            .find(Collection::Enrollments, &Filter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn request_requires_student_role_and_existing_course() {
        let store = Arc::new(MemoryRecordStore::new());
        seed_student(&store, "s1", "Ada").await;
        let lecturer = User::Lecturer(crate::models::Lecturer {
            id: "l1".to_owned(),
            email: "l1@example.edu".to_owned(),
            full_name: "Dr. Okafor".to_owned(),
            created_at: chrono::Utc::now(),
        });
        store
            .put(Collection::Users, "l1", encode(&lecturer).unwrap())
            .await
            .unwrap();
        let course_id = seed_course(&store, "l1").await;
        let enrollments = service(&store);

        assert!(matches!(
            enrollments.request("l1", &course_id).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            enrollments.request("s1", "missing-course").await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn approve_is_idempotent_and_checks_ownership() {
        let store = Arc::new(MemoryRecordStore::new());
        seed_student(&store, "s1", "Ada").await;
        let course_id = seed_course(&store, "l1").await;
        let enrollments = service(&store);
        let enrollment = enrollments.request("s1", &course_id).await.unwrap();

        assert!(matches!(
            enrollments.approve("intruder", &enrollment.id).await,
            Err(DomainError::Forbidden(_))
        ));

        enrollments.approve("l1", &enrollment.id).await.unwrap();
        enrollments.approve("l1", &enrollment.id).await.unwrap();

        let status = enrollments.status("s1", &course_id).await.unwrap();
        assert_eq!(EnrollmentStatus::of(status.as_ref()), EnrollmentStatus::Enrolled);
        let all = store
            .find(Collection::Enrollments, &Filter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    /// Record store double whose user lookups fail for one poisoned id.
    struct FlakyUserStore {
        inner: MemoryRecordStore,
        poisoned_user: String,
    }

    #[async_trait::async_trait]
    impl RecordStore for FlakyUserStore {
        async fn create(
            &self,
            collection: Collection,
            fields: serde_json::Value,
        ) -> Result<String, StoreError> {
            self.inner.create(collection, fields).await
        }

        async fn create_if_absent(
            &self,
            collection: Collection,
            filter: &Filter,
            fields: serde_json::Value,
        ) -> Result<CreateOutcome, StoreError> {
            self.inner.create_if_absent(collection, filter, fields).await
        }

        async fn put(
            &self,
            collection: Collection,
            id: &str,
            fields: serde_json::Value,
        ) -> Result<(), StoreError> {
            self.inner.put(collection, id, fields).await
        }

        async fn get(
            &self,
            collection: Collection,
            id: &str,
        ) -> Result<Option<Record>, StoreError> {
            if collection == Collection::Users && id == self.poisoned_user {
                return Err(StoreError::Unavailable("simulated outage".to_owned()));
            }
            self.inner.get(collection, id).await
        }

        async fn find(
            &self,
            collection: Collection,
            filter: &Filter,
        ) -> Result<Vec<Record>, StoreError> {
            self.inner.find(collection, filter).await
        }

        async fn update_field(
            &self,
            collection: Collection,
            id: &str,
            field: &str,
            value: serde_json::Value,
        ) -> Result<(), StoreError> {
            self.inner.update_field(collection, id, field, value).await
        }

        async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
            self.inner.delete(collection, id).await
        }

        async fn list_append(
            &self,
            collection: Collection,
            id: &str,
            field: &str,
            value: serde_json::Value,
        ) -> Result<(), StoreError> {
            self.inner.list_append(collection, id, field, value).await
        }

        async fn list_remove(
            &self,
            collection: Collection,
            id: &str,
            field: &str,
            value: serde_json::Value,
        ) -> Result<(), StoreError> {
            self.inner.list_remove(collection, id, field, value).await
        }
    }

    #[tokio::test]
    async fn pending_list_skips_rows_whose_student_lookup_fails() {
        let store = Arc::new(FlakyUserStore {
            inner: MemoryRecordStore::new(),
            poisoned_user: "s2".to_owned(),
        });
        seed_student(&store.inner, "s1", "Ada").await;
        seed_student(&store.inner, "s2", "Grace").await;
        let course_id = seed_course(&store.inner, "l1").await;
        let enrollments =
            EnrollmentService::new(Arc::clone(&store) as Arc<dyn RecordStore>);

        enrollments.request("s1", &course_id).await.unwrap();
        enrollments.request("s2", &course_id).await.unwrap();

        let pending = enrollments.pending_for_lecturer("l1").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].student_name, "Ada");
        assert_eq!(pending[0].course_name, "Data Structures");
    }

    #[tokio::test]
    async fn absent_student_record_falls_back_to_placeholder_name() {
        let store = Arc::new(MemoryRecordStore::new());
        seed_student(&store, "s1", "Ada").await;
        let course_id = seed_course(&store, "l1").await;
        let enrollments = service(&store);
        enrollments.request("s1", &course_id).await.unwrap();
        store.delete(Collection::Users, "s1").await.unwrap();

        let pending = enrollments.pending_for_lecturer("l1").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].student_name, "Unknown Student");
    }

    #[tokio::test]
    async fn approved_for_course_lists_only_approved() {
        let store = Arc::new(MemoryRecordStore::new());
        seed_student(&store, "s1", "Ada").await;
        seed_student(&store, "s2", "Grace").await;
        let course_id = seed_course(&store, "l1").await;
        let enrollments = service(&store);

        let first = enrollments.request("s1", &course_id).await.unwrap();
        enrollments.request("s2", &course_id).await.unwrap();
        enrollments.approve("l1", &first.id).await.unwrap();

        let students = enrollments.approved_for_course(&course_id).await.unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].student_name, "Ada");
        assert_eq!(students[0].student_email, "s1@example.edu");
    }
}
