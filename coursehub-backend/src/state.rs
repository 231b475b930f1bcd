use std::sync::Arc;

use coursehub_domain::{AccountService, CourseService, EnrollmentService, QuizService};
use coursehub_identity::IdentityGateway;
use coursehub_store::{BlobStore, RecordStore};
use coursehub_summarizer::Summarizer;

/// Shared handler state: the domain services plus the external collaborators
/// the routes talk to directly.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub courses: CourseService,
    pub enrollments: EnrollmentService,
    pub quizzes: QuizService,
    pub identity: Arc<dyn IdentityGateway>,
    pub summarizer: Arc<dyn Summarizer>,
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        identity: Arc<dyn IdentityGateway>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            accounts: AccountService::new(Arc::clone(&store), Arc::clone(&identity)),
            courses: CourseService::new(Arc::clone(&store), Arc::clone(&blobs)),
            enrollments: EnrollmentService::new(Arc::clone(&store)),
            quizzes: QuizService::new(store),
            identity,
            summarizer,
            blobs,
        }
    }
}
