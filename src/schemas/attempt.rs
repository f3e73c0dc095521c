use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::{Exam, ExamResult};
use crate::repositories::results::{ExamResultRow, StudentResultRow};
use crate::schemas::question::AttemptQuestionResponse;

/// Submitted answer sheet; absent question ids mean unanswered.
#[derive(Debug, Deserialize)]
pub(crate) struct AttemptSubmission {
    pub(crate) answers: HashMap<i64, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResultResponse {
    pub(crate) exam_id: i64,
    pub(crate) score: i32,
    pub(crate) correct_count: i32,
    pub(crate) wrong_count: i32,
    pub(crate) taken_at: String,
}

impl ResultResponse {
    pub(crate) fn from_db(result: ExamResult) -> Self {
        Self {
            exam_id: result.exam_id,
            score: result.score,
            correct_count: result.correct_count,
            wrong_count: result.wrong_count,
            taken_at: format_primitive(result.taken_at),
        }
    }

    pub(crate) fn from_student_row(row: &StudentResultRow) -> Self {
        Self {
            exam_id: row.exam_id,
            score: row.score,
            correct_count: row.correct_count,
            wrong_count: row.wrong_count,
            taken_at: format_primitive(row.taken_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptExamView {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) start_time: String,
    pub(crate) end_time: String,
    pub(crate) duration_minutes: i32,
}

impl AttemptExamView {
    pub(crate) fn from_db(exam: &Exam) -> Self {
        Self {
            id: exam.id,
            title: exam.title.clone(),
            start_time: format_primitive(exam.start_time),
            end_time: format_primitive(exam.end_time),
            duration_minutes: exam.duration_minutes,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(crate) enum JoinExamResponse {
    /// The student may start now; the answer key is stripped from questions.
    Admitted { exam: AttemptExamView, questions: Vec<AttemptQuestionResponse> },
    /// A result already exists; render it instead of an answer sheet.
    AlreadyTaken { result: ResultResponse },
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(crate) enum SubmitExamResponse {
    Recorded { result: ResultResponse },
    /// A concurrent or earlier submission won; this is the stored result.
    AlreadyTaken { result: ResultResponse },
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentResultResponse {
    pub(crate) id: i64,
    pub(crate) exam_id: i64,
    pub(crate) exam_title: String,
    pub(crate) category_name: String,
    pub(crate) score: i32,
    pub(crate) correct_count: i32,
    pub(crate) wrong_count: i32,
    pub(crate) taken_at: String,
}

impl StudentResultResponse {
    pub(crate) fn from_row(row: StudentResultRow) -> Self {
        Self {
            id: row.id,
            exam_id: row.exam_id,
            exam_title: row.exam_title,
            category_name: row.category_name,
            score: row.score,
            correct_count: row.correct_count,
            wrong_count: row.wrong_count,
            taken_at: format_primitive(row.taken_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamResultEntry {
    pub(crate) id: i64,
    pub(crate) student_id: i64,
    pub(crate) student_username: String,
    pub(crate) student_name: String,
    pub(crate) student_surname: String,
    pub(crate) score: i32,
    pub(crate) correct_count: i32,
    pub(crate) wrong_count: i32,
    pub(crate) taken_at: String,
}

impl ExamResultEntry {
    pub(crate) fn from_row(row: ExamResultRow) -> Self {
        Self {
            id: row.id,
            student_id: row.student_id,
            student_username: row.student_username,
            student_name: row.student_name,
            student_surname: row.student_surname,
            score: row.score,
            correct_count: row.correct_count,
            wrong_count: row.wrong_count,
            taken_at: format_primitive(row.taken_at),
        }
    }
}
