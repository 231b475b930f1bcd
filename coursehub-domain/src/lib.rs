//! Domain-logic core of the course platform: enrollment approval, quiz
//! authoring and scoring, and the course material registry, built against
//! the external store/identity contracts.

pub mod accounts;
pub mod enrollment;
pub mod error;
pub mod models;
pub mod quiz;
pub mod registry;

pub use accounts::{AccountService, NewLecturer, NewStudent, SystemStats};
pub use enrollment::{CourseStudent, EnrollmentService, PendingEnrollment, StudentEnrollment};
pub use error::DomainError;
pub use models::*;
pub use quiz::{LecturerResultView, NewQuestion, QuizService, StudentResultView};
pub use registry::CourseService;

use coursehub_store::{Collection, RecordStore, StoreError};
use serde::Serialize;
use serde_json::Value;

/// Serializes a model for storage, dropping the `id` field the store assigns.
pub(crate) fn encode<T: Serialize>(model: &T) -> Result<Value, StoreError> {
    let mut fields = serde_json::to_value(model)?;
    if let Value::Object(map) = &mut fields {
        map.remove("id");
    }
    Ok(fields)
}

pub(crate) async fn load_user(
    store: &dyn RecordStore,
    id: &str,
) -> Result<Option<models::User>, StoreError> {
    match store.get(Collection::Users, id).await? {
        Some(record) => Ok(Some(record.decode()?)),
        None => Ok(None),
    }
}
