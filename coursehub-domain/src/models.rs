//! Typed document shapes for the four record collections. Wire names are
//! camelCase to match the stored documents; every model carries its record
//! identifier in `id`, injected on decode and stripped on encode.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Program-year label gating course visibility to students.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassLevel {
    ND1,
    ND2,
    HND1,
    HND2,
}

impl FromStr for ClassLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ND1" => Ok(Self::ND1),
            "ND2" => Ok(Self::ND2),
            "HND1" => Ok(Self::HND1),
            "HND2" => Ok(Self::HND2),
            other => Err(format!("unknown class level: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Lecturer,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(default)]
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub matriculation_number: String,
    pub class: ClassLevel,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecturer {
    #[serde(default)]
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[serde(default)]
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

/// One record shape per role, discriminated by the stored `role` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum User {
    Student(Student),
    Lecturer(Lecturer),
    Admin(Admin),
}

impl User {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Student(student) => &student.id,
            Self::Lecturer(lecturer) => &lecturer.id,
            Self::Admin(admin) => &admin.id,
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        match self {
            Self::Student(student) => &student.email,
            Self::Lecturer(lecturer) => &lecturer.email,
            Self::Admin(admin) => &admin.email,
        }
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        match self {
            Self::Student(student) => &student.full_name,
            Self::Lecturer(lecturer) => &lecturer.full_name,
            Self::Admin(admin) => &admin.full_name,
        }
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Student(_) => Role::Student,
            Self::Lecturer(_) => Role::Lecturer,
            Self::Admin(_) => Role::Admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseFile {
    pub id: String,
    pub name: String,
    pub url: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub lecturer_id: String,
    /// Denormalized display copy; avoids a user join at read time.
    pub lecturer_name: String,
    pub required_class: ClassLevel,
    #[serde(default)]
    pub files: Vec<CourseFile>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    #[serde(default)]
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    pub approved: bool,
    pub enrolled_at: DateTime<Utc>,
}

/// Three-state enrollment view driving caller-side behavior; not a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnrollmentStatus {
    NotEnrolled,
    Pending,
    Enrolled,
}

impl EnrollmentStatus {
    #[must_use]
    pub fn of(enrollment: Option<&Enrollment>) -> Self {
        match enrollment {
            None => Self::NotEnrolled,
            Some(enrollment) if enrollment.approved => Self::Enrolled,
            Some(_) => Self::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "mcq")]
    MultipleChoice,
    #[serde(rename = "short-answer")]
    ShortAnswer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub prompt: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    /// Present only for multiple-choice questions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    #[serde(default)]
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub questions: Vec<QuizQuestion>,
    pub created_at: DateTime<Utc>,
}

/// Immutable once created; there is deliberately no update operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    #[serde(default)]
    pub id: String,
    pub student_id: String,
    pub quiz_id: String,
    pub course_id: String,
    pub score: u32,
    pub total_questions: u32,
    /// question id -> submitted answer
    pub answers: HashMap<String, String>,
    pub completed_at: DateTime<Utc>,
}
