//! Account lifecycle and admin reporting. Credentials live behind the
//! Identity Gateway; the user record keyed by the gateway's identifier is
//! the domain's own copy.

use std::sync::Arc;

use chrono::Utc;
use coursehub_identity::IdentityGateway;
use coursehub_store::{Collection, Filter, RecordStore};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::DomainError;
use crate::models::{Admin, ClassLevel, Lecturer, Student, User};
use crate::{encode, load_user};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub full_name: String,
    pub matriculation_number: String,
    pub email: String,
    pub class: ClassLevel,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLecturer {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SystemStats {
    pub total_students: usize,
    pub total_lecturers: usize,
    pub total_courses: usize,
    pub courses_with_materials: usize,
    pub total_enrollments: usize,
    pub approved_enrollments: usize,
    pub total_quiz_attempts: usize,
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn RecordStore>,
    identity: Arc<dyn IdentityGateway>,
}

impl AccountService {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, identity: Arc<dyn IdentityGateway>) -> Self {
        Self { store, identity }
    }

    fn require_field(value: &str, name: &str) -> Result<(), DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::Validation(format!("{name} is required")));
        }
        Ok(())
    }

    pub async fn register_student(&self, data: NewStudent) -> Result<Student, DomainError> {
        Self::require_field(&data.full_name, "full name")?;
        Self::require_field(&data.matriculation_number, "matriculation number")?;
        Self::require_field(&data.email, "email")?;
        Self::require_field(&data.password, "password")?;

        let user_id = self.identity.register(&data.email, &data.password).await?;
        let student = Student {
            id: user_id.clone(),
            email: data.email,
            full_name: data.full_name,
            matriculation_number: data.matriculation_number,
            class: data.class,
            created_at: Utc::now(),
        };
        self.store
            .put(
                Collection::Users,
                &user_id,
                encode(&User::Student(student.clone()))?,
            )
            .await?;
        info!(%user_id, "registered student");
        Ok(student)
    }

    pub async fn register_lecturer(&self, data: NewLecturer) -> Result<Lecturer, DomainError> {
        Self::require_field(&data.full_name, "full name")?;
        Self::require_field(&data.email, "email")?;
        Self::require_field(&data.password, "password")?;

        let user_id = self.identity.register(&data.email, &data.password).await?;
        let lecturer = Lecturer {
            id: user_id.clone(),
            email: data.email,
            full_name: data.full_name,
            created_at: Utc::now(),
        };
        self.store
            .put(
                Collection::Users,
                &user_id,
                encode(&User::Lecturer(lecturer.clone()))?,
            )
            .await?;
        info!(%user_id, "registered lecturer");
        Ok(lecturer)
    }

    /// Bootstrap path for a fresh deployment: creates the first admin
    /// account. Once any admin exists the path is closed and further admins
    /// can only come from an existing admin.
    pub async fn register_first_admin(&self, data: NewLecturer) -> Result<Admin, DomainError> {
        let admins = self
            .store
            .find(Collection::Users, &Filter::field("role", "admin"))
            .await?;
        if !admins.is_empty() {
            return Err(DomainError::Forbidden(
                "an admin account already exists".to_owned(),
            ));
        }
        self.register_admin(data).await
    }

    pub async fn register_admin(&self, data: NewLecturer) -> Result<Admin, DomainError> {
        Self::require_field(&data.full_name, "full name")?;
        Self::require_field(&data.email, "email")?;
        Self::require_field(&data.password, "password")?;

        let user_id = self.identity.register(&data.email, &data.password).await?;
        let admin = Admin {
            id: user_id.clone(),
            email: data.email,
            full_name: data.full_name,
            created_at: Utc::now(),
        };
        self.store
            .put(
                Collection::Users,
                &user_id,
                encode(&User::Admin(admin.clone()))?,
            )
            .await?;
        info!(%user_id, "registered admin");
        Ok(admin)
    }

    /// Exchanges credentials for a bearer token plus the caller's user record.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User), DomainError> {
        let token = self.identity.sign_in(email, password).await?;
        let user_id = self.identity.verify(&token).await?;
        let user = load_user(self.store.as_ref(), &user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", user_id))?;
        Ok((token, user))
    }

    pub async fn change_password(
        &self,
        user_id: &str,
        current: &str,
        new: &str,
    ) -> Result<(), DomainError> {
        Self::require_field(new, "new password")?;
        self.identity.change_password(user_id, current, new).await?;
        Ok(())
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, DomainError> {
        Ok(load_user(self.store.as_ref(), user_id).await?)
    }

    /// Removes both the gateway account and the user record.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), DomainError> {
        self.identity.remove(user_id).await?;
        self.store.delete(Collection::Users, user_id).await?;
        info!(%user_id, "deleted user");
        Ok(())
    }

    pub async fn list_students(&self) -> Result<Vec<Student>, DomainError> {
        let records = self
            .store
            .find(Collection::Users, &Filter::field("role", "student"))
            .await?;
        records
            .into_iter()
            .map(|record| record.decode().map_err(DomainError::from))
            .collect()
    }

    pub async fn list_lecturers(&self) -> Result<Vec<Lecturer>, DomainError> {
        let records = self
            .store
            .find(Collection::Users, &Filter::field("role", "lecturer"))
            .await?;
        records
            .into_iter()
            .map(|record| record.decode().map_err(DomainError::from))
            .collect()
    }

    pub async fn stats(&self) -> Result<SystemStats, DomainError> {
        let students = self
            .store
            .find(Collection::Users, &Filter::field("role", "student"))
            .await?
            .len();
        let lecturers = self
            .store
            .find(Collection::Users, &Filter::field("role", "lecturer"))
            .await?
            .len();
        let courses = self.store.find(Collection::Courses, &Filter::default()).await?;
        let courses_with_materials = courses
            .iter()
            .filter(|record| {
                record.fields["files"]
                    .as_array()
                    .is_some_and(|files| !files.is_empty())
            })
            .count();
        let enrollments = self
            .store
            .find(Collection::Enrollments, &Filter::default())
            .await?
            .len();
        let approved = self
            .store
            .find(Collection::Enrollments, &Filter::field("approved", true))
            .await?
            .len();
        let attempts = self
            .store
            .find(Collection::QuizResults, &Filter::default())
            .await?
            .len();
        Ok(SystemStats {
            total_students: students,
            total_lecturers: lecturers,
            total_courses: courses.len(),
            courses_with_materials,
            total_enrollments: enrollments,
            approved_enrollments: approved,
            total_quiz_attempts: attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use coursehub_identity::MemoryIdentityGateway;
    use coursehub_store::MemoryRecordStore;

    use super::*;
    use crate::models::Role;

    fn accounts() -> (AccountService, Arc<MemoryRecordStore>) {
        let store = Arc::new(MemoryRecordStore::new());
        let service = AccountService::new(
            Arc::clone(&store) as Arc<dyn RecordStore>,
            Arc::new(MemoryIdentityGateway::new()),
        );
        (service, store)
    }

    fn new_student(email: &str) -> NewStudent {
        NewStudent {
            full_name: "Ada Obi".to_owned(),
            matriculation_number: "ND/23/001".to_owned(),
            email: email.to_owned(),
            class: ClassLevel::ND1,
            password: "hunter2".to_owned(),
        }
    }

    #[tokio::test]
    async fn register_then_login_returns_typed_user() {
        let (accounts, _) = accounts();
        let student = accounts
            .register_student(new_student("ada@example.edu"))
            .await
            .unwrap();

        let (token, user) = accounts.login("ada@example.edu", "hunter2").await.unwrap();
        assert!(!token.is_empty());
        assert_eq!(user.role(), Role::Student);
        assert_eq!(user.id(), student.id);
        assert_eq!(user.full_name(), "Ada Obi");
    }

    #[tokio::test]
    async fn registration_requires_all_fields() {
        let (accounts, _) = accounts();
        let mut data = new_student("ada@example.edu");
        data.full_name = "  ".to_owned();
        assert!(matches!(
            accounts.register_student(data).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn role_listings_are_disjoint() {
        let (accounts, _) = accounts();
        accounts
            .register_student(new_student("ada@example.edu"))
            .await
            .unwrap();
        accounts
            .register_lecturer(NewLecturer {
                full_name: "Dr. Okafor".to_owned(),
                email: "okafor@example.edu".to_owned(),
                password: "hunter2".to_owned(),
            })
            .await
            .unwrap();
        accounts
            .register_admin(NewLecturer {
                full_name: "Registrar".to_owned(),
                email: "admin@example.edu".to_owned(),
                password: "hunter2".to_owned(),
            })
            .await
            .unwrap();

        assert_eq!(accounts.list_students().await.unwrap().len(), 1);
        assert_eq!(accounts.list_lecturers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn first_admin_bootstrap_closes_after_one_admin() {
        let (accounts, _) = accounts();
        let admin = accounts
            .register_first_admin(NewLecturer {
                full_name: "Registrar".to_owned(),
                email: "admin@example.edu".to_owned(),
                password: "hunter2".to_owned(),
            })
            .await
            .unwrap();
        let user = accounts.get_user(&admin.id).await.unwrap().unwrap();
        assert_eq!(user.role(), Role::Admin);

        assert!(matches!(
            accounts
                .register_first_admin(NewLecturer {
                    full_name: "Second Registrar".to_owned(),
                    email: "admin2@example.edu".to_owned(),
                    password: "hunter2".to_owned(),
                })
                .await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn delete_user_removes_record_and_credentials() {
        let (accounts, _) = accounts();
        let student = accounts
            .register_student(new_student("ada@example.edu"))
            .await
            .unwrap();
        accounts.delete_user(&student.id).await.unwrap();
        assert!(accounts.get_user(&student.id).await.unwrap().is_none());
        assert!(accounts.login("ada@example.edu", "hunter2").await.is_err());
    }

    #[tokio::test]
    async fn stats_count_roles_enrollments_and_materials() {
        let (accounts, store) = accounts();
        accounts
            .register_student(new_student("ada@example.edu"))
            .await
            .unwrap();
        accounts
            .register_lecturer(NewLecturer {
                full_name: "Dr. Okafor".to_owned(),
                email: "okafor@example.edu".to_owned(),
                password: "hunter2".to_owned(),
            })
            .await
            .unwrap();
        store
            .create(
                Collection::Courses,
                serde_json::json!({"title": "Algebra", "files": [{"id": "f1"}]}),
            )
            .await
            .unwrap();
        store
            .create(
                Collection::Enrollments,
                serde_json::json!({"studentId": "s", "courseId": "c", "approved": true}),
            )
            .await
            .unwrap();

        let stats = accounts.stats().await.unwrap();
        assert_eq!(stats.total_students, 1);
        assert_eq!(stats.total_lecturers, 1);
        assert_eq!(stats.total_courses, 1);
        assert_eq!(stats.courses_with_materials, 1);
        assert_eq!(stats.total_enrollments, 1);
        assert_eq!(stats.approved_enrollments, 1);
        assert_eq!(stats.total_quiz_attempts, 0);
    }
}
