//! Course/file registry: course creation, class-gated visibility, and the
//! two-phase material removal that keeps blob storage and course metadata
//! from diverging.

use std::sync::Arc;

use chrono::Utc;
use coursehub_store::{BlobStore, Collection, DeleteOutcome, Filter, RecordStore};
use tracing::warn;

use crate::encode;
use crate::error::DomainError;
use crate::models::{ClassLevel, Course, CourseFile};

#[derive(Clone)]
pub struct CourseService {
    store: Arc<dyn RecordStore>,
    blobs: Arc<dyn BlobStore>,
}

impl CourseService {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    pub async fn create(
        &self,
        title: &str,
        lecturer_id: &str,
        lecturer_name: &str,
        required_class: ClassLevel,
    ) -> Result<Course, DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::Validation(
                "course title must not be empty".to_owned(),
            ));
        }
        let course = Course {
            id: String::new(),
            title: title.to_owned(),
            lecturer_id: lecturer_id.to_owned(),
            lecturer_name: lecturer_name.to_owned(),
            required_class,
            files: Vec::new(),
            created_at: Utc::now(),
        };
        let id = self.store.create(Collection::Courses, encode(&course)?).await?;
        Ok(Course { id, ..course })
    }

    pub async fn get(&self, course_id: &str) -> Result<Course, DomainError> {
        Ok(self
            .store
            .get(Collection::Courses, course_id)
            .await?
            .ok_or_else(|| DomainError::not_found("course", course_id))?
            .decode()?)
    }

    /// Courses visible to a student of the given class: a plain equality
    /// filter on the required class, no ranking.
    pub async fn available_for_class(
        &self,
        class: ClassLevel,
    ) -> Result<Vec<Course>, DomainError> {
        let filter = Filter::field("requiredClass", serde_json::to_value(class).map_err(
            coursehub_store::StoreError::from,
        )?);
        self.decode_courses(self.store.find(Collection::Courses, &filter).await?)
    }

    pub async fn for_lecturer(&self, lecturer_id: &str) -> Result<Vec<Course>, DomainError> {
        let filter = Filter::field("lecturerId", lecturer_id);
        self.decode_courses(self.store.find(Collection::Courses, &filter).await?)
    }

    pub async fn all(&self) -> Result<Vec<Course>, DomainError> {
        self.decode_courses(self.store.find(Collection::Courses, &Filter::default()).await?)
    }

    fn decode_courses(
        &self,
        records: Vec<coursehub_store::Record>,
    ) -> Result<Vec<Course>, DomainError> {
        records
            .into_iter()
            .map(|record| record.decode().map_err(DomainError::from))
            .collect()
    }

    /// Appends uploaded material metadata to the course's file list. The
    /// append is a set-union list mutation, never a full-list replace, so
    /// concurrent uploads cannot drop each other's files.
    pub async fn add_file(&self, course_id: &str, file: &CourseFile) -> Result<(), DomainError> {
        self.store
            .list_append(
                Collection::Courses,
                course_id,
                "files",
                serde_json::to_value(file).map_err(coursehub_store::StoreError::from)?,
            )
            .await?;
        Ok(())
    }

    /// Removes a material in two phases: the backing blob first, the metadata
    /// second. If the blob deletion genuinely fails the metadata is left
    /// intact so the operation can be retried; a blob that is already gone
    /// counts as deleted.
    pub async fn remove_file(&self, course_id: &str, file_id: &str) -> Result<(), DomainError> {
        let course = self.get(course_id).await?;
        let file = course
            .files
            .iter()
            .find(|file| file.id == file_id)
            .ok_or_else(|| DomainError::not_found("file", file_id))?;

        match self.blobs.delete(&file.url).await? {
            DeleteOutcome::Deleted => {}
            DeleteOutcome::AlreadyAbsent => {
                warn!(url = %file.url, "blob already absent, removing metadata anyway");
            }
        }
        self.store
            .list_remove(
                Collection::Courses,
                course_id,
                "files",
                serde_json::to_value(file).map_err(coursehub_store::StoreError::from)?,
            )
            .await?;
        Ok(())
    }

    pub async fn delete(&self, course_id: &str) -> Result<(), DomainError> {
        self.store.delete(Collection::Courses, course_id).await?;
        Ok(())
    }
}
