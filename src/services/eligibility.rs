use time::PrimitiveDateTime;

use crate::db::models::{Exam, ExamResult};

/// Outcome of asking whether a student may enter an exam right now.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Admission {
    /// The student may take the exam; carries the exam itself.
    Admit(Exam),
    /// A result is already on record; carries it so the caller can render it.
    AlreadyTaken(ExamResult),
    NotFound,
    NotYetOpen { opens_at: PrimitiveDateTime },
    Closed { closed_at: PrimitiveDateTime },
}

/// Decide admission from already-fetched state. Pure; callers re-run it with
/// a fresh wall clock on every join and again on every submit.
///
/// The prior-result check comes first on purpose: a student revisiting an
/// expired exam sees their score, not a time-window rejection.
pub(crate) fn check(
    prior: Option<ExamResult>,
    exam: Option<Exam>,
    now: PrimitiveDateTime,
) -> Admission {
    if let Some(result) = prior {
        return Admission::AlreadyTaken(result);
    }

    let Some(exam) = exam else {
        return Admission::NotFound;
    };

    if now < exam.start_time {
        return Admission::NotYetOpen { opens_at: exam.start_time };
    }
    if now > exam.end_time {
        return Admission::Closed { closed_at: exam.end_time };
    }

    Admission::Admit(exam)
}
