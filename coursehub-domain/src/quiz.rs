//! Quiz workflow: authoring with up-front validation, deterministic scoring,
//! and the joined result views for students and lecturers.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use coursehub_store::{Collection, Filter, RecordStore};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::DomainError;
use crate::models::{Course, Quiz, QuizQuestion, QuizResult, QuestionKind};
use crate::{encode, load_user};

/// Question payload as authored; ids are assigned on create.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    pub prompt: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
}

/// Decides whether a submitted answer is correct for one question. Grading is
/// pluggable per question kind so a semantic short-answer grader can be
/// substituted later without changing the multiple-choice contract.
pub trait Grader: Send + Sync {
    fn is_correct(&self, question: &QuizQuestion, submitted: &str) -> bool;
}

fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Trimmed, case-insensitive equality against the stored correct answer.
pub struct ExactMatchGrader;

impl Grader for ExactMatchGrader {
    fn is_correct(&self, question: &QuizQuestion, submitted: &str) -> bool {
        normalize(submitted) == normalize(&question.correct_answer)
    }
}

#[must_use]
pub fn grader_for(kind: QuestionKind) -> &'static dyn Grader {
    // Both kinds currently grade by normalized exact match; short-answer
    // grading is exact-match, not semantic.
    match kind {
        QuestionKind::MultipleChoice | QuestionKind::ShortAnswer => &ExactMatchGrader,
    }
}

/// Counts the questions whose submitted answer grades as correct. Unanswered
/// questions and answers keyed by unknown question ids contribute zero.
#[must_use]
pub fn score(questions: &[QuizQuestion], answers: &HashMap<String, String>) -> u32 {
    let correct = questions
        .iter()
        .filter(|question| {
            answers
                .get(&question.id)
                .is_some_and(|submitted| grader_for(question.kind).is_correct(question, submitted))
        })
        .count();
    u32::try_from(correct).unwrap_or(u32::MAX)
}

fn validate(title: &str, questions: &[NewQuestion]) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::Validation(
            "quiz title must not be empty".to_owned(),
        ));
    }
    if questions.is_empty() {
        return Err(DomainError::Validation(
            "a quiz must contain at least one question".to_owned(),
        ));
    }
    for (index, question) in questions.iter().enumerate() {
        let index = index + 1;
        if question.prompt.trim().is_empty() {
            return Err(DomainError::Validation(format!(
                "question {index}: prompt must not be empty"
            )));
        }
        if question.correct_answer.trim().is_empty() {
            return Err(DomainError::Validation(format!(
                "question {index}: correct answer must not be empty"
            )));
        }
        if question.kind == QuestionKind::MultipleChoice {
            if question.options.is_empty() {
                return Err(DomainError::Validation(format!(
                    "question {index}: multiple-choice questions need options"
                )));
            }
            if question.options.iter().any(|option| option.trim().is_empty()) {
                return Err(DomainError::Validation(format!(
                    "question {index}: options must not be empty"
                )));
            }
        }
    }
    Ok(())
}

/// Student result joined with quiz and course display names.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResultView {
    #[serde(flatten)]
    pub result: QuizResult,
    pub quiz_title: String,
    pub course_name: String,
}

/// Lecturer-facing result row spanning all of the lecturer's courses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LecturerResultView {
    #[serde(flatten)]
    pub result: QuizResult,
    pub student_name: String,
    pub quiz_title: String,
    pub course_name: String,
}

#[derive(Clone)]
pub struct QuizService {
    store: Arc<dyn RecordStore>,
}

impl QuizService {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Creates a quiz after validating every question. The first violation
    /// aborts the whole create, naming the offending 1-based question index;
    /// nothing is persisted in that case. Question ids are assigned `q1`,
    /// `q2`, … in input order.
    pub async fn create(
        &self,
        course_id: &str,
        title: &str,
        questions: Vec<NewQuestion>,
    ) -> Result<Quiz, DomainError> {
        validate(title, &questions)?;
        let questions = questions
            .into_iter()
            .enumerate()
            .map(|(index, question)| QuizQuestion {
                id: format!("q{}", index + 1),
                prompt: question.prompt,
                kind: question.kind,
                options: question.options,
                correct_answer: question.correct_answer,
            })
            .collect();
        let quiz = Quiz {
            id: String::new(),
            course_id: course_id.to_owned(),
            title: title.to_owned(),
            questions,
            created_at: Utc::now(),
        };
        let id = self.store.create(Collection::Quizzes, encode(&quiz)?).await?;
        Ok(Quiz { id, ..quiz })
    }

    /// All quizzes of a course, unfiltered by visibility.
    pub async fn for_course(&self, course_id: &str) -> Result<Vec<Quiz>, DomainError> {
        let records = self
            .store
            .find(Collection::Quizzes, &Filter::field("courseId", course_id))
            .await?;
        records
            .into_iter()
            .map(|record| record.decode().map_err(DomainError::from))
            .collect()
    }

    /// Scores a submission against the quiz's questions at scoring time and
    /// persists one immutable result record.
    pub async fn submit(
        &self,
        student_id: &str,
        quiz_id: &str,
        course_id: &str,
        answers: HashMap<String, String>,
    ) -> Result<QuizResult, DomainError> {
        let quiz: Quiz = self
            .store
            .get(Collection::Quizzes, quiz_id)
            .await?
            .ok_or_else(|| DomainError::not_found("quiz", quiz_id))?
            .decode()?;
        let result = QuizResult {
            id: String::new(),
            student_id: student_id.to_owned(),
            quiz_id: quiz_id.to_owned(),
            course_id: course_id.to_owned(),
            score: score(&quiz.questions, &answers),
            total_questions: u32::try_from(quiz.questions.len()).unwrap_or(u32::MAX),
            answers,
            completed_at: Utc::now(),
        };
        let id = self
            .store
            .create(Collection::QuizResults, encode(&result)?)
            .await?;
        Ok(QuizResult { id, ..result })
    }

    /// A student's results joined with quiz and course names. Lookup errors
    /// drop the affected row; absent records fall back to placeholder names.
    pub async fn results_for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<StudentResultView>, DomainError> {
        let records = self
            .store
            .find(Collection::QuizResults, &Filter::field("studentId", student_id))
            .await?;
        let mut views = Vec::new();
        for record in records {
            let result: QuizResult = match record.decode() {
                Ok(result) => result,
                Err(error) => {
                    warn!(%error, "skipping malformed quiz result");
                    continue;
                }
            };
            let quiz_title = match self.store.get(Collection::Quizzes, &result.quiz_id).await {
                Ok(Some(record)) => record
                    .decode::<Quiz>()
                    .map(|quiz| quiz.title)
                    .unwrap_or_else(|_| "Unknown Quiz".to_owned()),
                Ok(None) => "Unknown Quiz".to_owned(),
                Err(error) => {
                    warn!(quiz_id = %result.quiz_id, %error, "skipping result, quiz lookup failed");
                    continue;
                }
            };
            let course_name = match self.store.get(Collection::Courses, &result.course_id).await {
                Ok(Some(record)) => record
                    .decode::<Course>()
                    .map(|course| course.title)
                    .unwrap_or_else(|_| "Unknown Course".to_owned()),
                Ok(None) => "Unknown Course".to_owned(),
                Err(error) => {
                    warn!(
                        course_id = %result.course_id,
                        %error,
                        "skipping result, course lookup failed"
                    );
                    continue;
                }
            };
            views.push(StudentResultView {
                result,
                quiz_title,
                course_name,
            });
        }
        Ok(views)
    }

    /// Fans out across the lecturer's courses and their quizzes, collecting
    /// results quiz by quiz. O(courses × quizzes) reads; acceptable at this
    /// scale. Per-item failures drop the affected rows only.
    pub async fn results_for_lecturer(
        &self,
        lecturer_id: &str,
    ) -> Result<Vec<LecturerResultView>, DomainError> {
        let courses = self
            .store
            .find(Collection::Courses, &Filter::field("lecturerId", lecturer_id))
            .await?;
        let mut views = Vec::new();
        for record in courses {
            let course: Course = match record.decode() {
                Ok(course) => course,
                Err(error) => {
                    warn!(%error, "skipping malformed course record");
                    continue;
                }
            };
            let quizzes = match self
                .store
                .find(Collection::Quizzes, &Filter::field("courseId", course.id.clone()))
                .await
            {
                Ok(quizzes) => quizzes,
                Err(error) => {
                    warn!(course_id = %course.id, %error, "skipping course, quiz query failed");
                    continue;
                }
            };
            for record in quizzes {
                let quiz: Quiz = match record.decode() {
                    Ok(quiz) => quiz,
                    Err(error) => {
                        warn!(%error, "skipping malformed quiz record");
                        continue;
                    }
                };
                let results = match self
                    .store
                    .find(Collection::QuizResults, &Filter::field("quizId", quiz.id.clone()))
                    .await
                {
                    Ok(results) => results,
                    Err(error) => {
                        warn!(quiz_id = %quiz.id, %error, "skipping quiz, result query failed");
                        continue;
                    }
                };
                for record in results {
                    let result: QuizResult = match record.decode() {
                        Ok(result) => result,
                        Err(error) => {
                            warn!(%error, "skipping malformed quiz result");
                            continue;
                        }
                    };
                    let student_name =
                        match load_user(self.store.as_ref(), &result.student_id).await {
                            Ok(Some(user)) => user.full_name().to_owned(),
                            Ok(None) => "Unknown Student".to_owned(),
                            Err(error) => {
                                warn!(
                                    student_id = %result.student_id,
                                    %error,
                                    "skipping result, student lookup failed"
                                );
                                continue;
                            }
                        };
                    views.push(LecturerResultView {
                        result,
                        student_name,
                        quiz_title: quiz.title.clone(),
                        course_name: course.title.clone(),
                    });
                }
            }
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use coursehub_store::MemoryRecordStore;

    use super::*;
    use crate::models::ClassLevel;

    fn question(prompt: &str, kind: QuestionKind, options: &[&str], answer: &str) -> NewQuestion {
        NewQuestion {
            prompt: prompt.to_owned(),
            kind,
            options: options.iter().map(|&option| option.to_owned()).collect(),
            correct_answer: answer.to_owned(),
        }
    }

    fn sample_questions() -> Vec<QuizQuestion> {
        vec![
            QuizQuestion {
                id: "q1".to_owned(),
                prompt: "Capital of France?".to_owned(),
                kind: QuestionKind::MultipleChoice,
                options: vec!["Paris".to_owned(), "London".to_owned()],
                correct_answer: "Paris".to_owned(),
            },
            QuizQuestion {
                id: "q2".to_owned(),
                prompt: "The answer to everything?".to_owned(),
                kind: QuestionKind::ShortAnswer,
                options: Vec::new(),
                correct_answer: "42".to_owned(),
            },
        ]
    }

    #[test]
    fn scoring_is_case_insensitive_and_trimmed() {
        let answers = HashMap::from([
            ("q1".to_owned(), "paris".to_owned()),
            ("q2".to_owned(), " 42 ".to_owned()),
        ]);
        assert_eq!(score(&sample_questions(), &answers), 2);
    }

    #[test]
    fn wrong_and_missing_answers_score_zero() {
        let answers = HashMap::from([("q1".to_owned(), "London".to_owned())]);
        assert_eq!(score(&sample_questions(), &answers), 0);
    }

    #[test]
    fn answers_for_unknown_question_ids_are_ignored() {
        let answers = HashMap::from([
            ("q9".to_owned(), "Paris".to_owned()),
            ("q2".to_owned(), "42".to_owned()),
        ]);
        assert_eq!(score(&sample_questions(), &answers), 1);
    }

    #[tokio::test]
    async fn create_assigns_question_ids_in_input_order() {
        let store = Arc::new(MemoryRecordStore::new());
        let quizzes = QuizService::new(Arc::clone(&store) as Arc<dyn RecordStore>);
        let quiz = quizzes
            .create(
                "c1",
                "Week 1",
                vec![
                    question("A?", QuestionKind::ShortAnswer, &[], "a"),
                    question("B?", QuestionKind::MultipleChoice, &["b", "c"], "b"),
                ],
            )
            .await
            .unwrap();
        assert_eq!(quiz.questions[0].id, "q1");
        assert_eq!(quiz.questions[1].id, "q2");

        let listed = quizzes.for_course("c1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, quiz.id);
    }

    #[tokio::test]
    async fn create_rejects_empty_option_naming_question_index() {
        let store = Arc::new(MemoryRecordStore::new());
        let quizzes = QuizService::new(Arc::clone(&store) as Arc<dyn RecordStore>);
        let error = quizzes
            .create(
                "c1",
                "Week 1",
                vec![
                    question("A?", QuestionKind::ShortAnswer, &[], "a"),
                    question("B?", QuestionKind::MultipleChoice, &["b", ""], "b"),
                ],
            )
            .await
            .unwrap_err();
        match error {
            DomainError::Validation(message) => assert!(message.contains("question 2")),
            other => panic!("expected validation error, got {other}"),
        }
        assert!(quizzes.for_course("c1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_empty_prompt_and_answer() {
        let store = Arc::new(MemoryRecordStore::new());
        let quizzes = QuizService::new(Arc::clone(&store) as Arc<dyn RecordStore>);
        let error = quizzes
            .create(
                "c1",
                "Week 1",
                vec![question("  ", QuestionKind::ShortAnswer, &[], "a")],
            )
            .await
            .unwrap_err();
        assert!(matches!(error, DomainError::Validation(ref m) if m.contains("question 1")));

        let error = quizzes
            .create(
                "c1",
                "Week 1",
                vec![question("A?", QuestionKind::ShortAnswer, &[], "")],
            )
            .await
            .unwrap_err();
        assert!(matches!(error, DomainError::Validation(ref m) if m.contains("question 1")));
    }

    #[tokio::test]
    async fn submit_scores_and_persists_an_immutable_result() {
        let store = Arc::new(MemoryRecordStore::new());
        let quizzes = QuizService::new(Arc::clone(&store) as Arc<dyn RecordStore>);
        let quiz = quizzes
            .create(
                "c1",
                "Week 1",
                vec![
                    question(
                        "Capital of France?",
                        QuestionKind::MultipleChoice,
                        &["Paris", "London"],
                        "Paris",
                    ),
                    question("The answer to everything?", QuestionKind::ShortAnswer, &[], "42"),
                ],
            )
            .await
            .unwrap();

        let answers = HashMap::from([
            ("q1".to_owned(), "PARIS".to_owned()),
            ("q2".to_owned(), "41".to_owned()),
        ]);
        let result = quizzes.submit("s1", &quiz.id, "c1", answers).await.unwrap();
        assert_eq!(result.score, 1);
        assert_eq!(result.total_questions, 2);

        let views = quizzes.results_for_student("s1").await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].quiz_title, "Week 1");
        // course record never existed, so the join falls back
        assert_eq!(views[0].course_name, "Unknown Course");
    }

    #[tokio::test]
    async fn submit_against_missing_quiz_is_not_found() {
        let store = Arc::new(MemoryRecordStore::new());
        let quizzes = QuizService::new(Arc::clone(&store) as Arc<dyn RecordStore>);
        assert!(matches!(
            quizzes.submit("s1", "missing", "c1", HashMap::new()).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn lecturer_results_fan_out_across_courses_and_quizzes() {
        let store = Arc::new(MemoryRecordStore::new());
        let quizzes = QuizService::new(Arc::clone(&store) as Arc<dyn RecordStore>);

        let course = Course {
            id: String::new(),
            title: "Data Structures".to_owned(),
            lecturer_id: "l1".to_owned(),
            lecturer_name: "Dr. Okafor".to_owned(),
            required_class: ClassLevel::ND1,
            files: Vec::new(),
            created_at: Utc::now(),
        };
        let course_id = store
            .create(Collection::Courses, crate::encode(&course).unwrap())
            .await
            .unwrap();
        let quiz = quizzes
            .create(
                &course_id,
                "Week 1",
                vec![question("A?", QuestionKind::ShortAnswer, &[], "a")],
            )
            .await
            .unwrap();
        quizzes
            .submit(
                "s1",
                &quiz.id,
                &course_id,
                HashMap::from([("q1".to_owned(), "a".to_owned())]),
            )
            .await
            .unwrap();

        let views = quizzes.results_for_lecturer("l1").await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].quiz_title, "Week 1");
        assert_eq!(views[0].course_name, "Data Structures");
        assert_eq!(views[0].student_name, "Unknown Student");
        assert_eq!(views[0].result.score, 1);

        assert!(quizzes.results_for_lecturer("l2").await.unwrap().is_empty());
    }
}
