use std::collections::HashMap;

use crate::db::models::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Tally {
    pub(crate) correct: i32,
    pub(crate) wrong: i32,
    /// 0..=100, integer-truncated share of correct answers.
    pub(crate) score: i32,
}

/// Grade a submission against the full question set of an exam.
///
/// Every question is counted: an unanswered question is wrong, so
/// `correct + wrong` always equals the number of questions. Matching is a
/// case-sensitive exact comparison of the submitted letter. An exam with no
/// questions grades to zero.
pub(crate) fn grade(questions: &[Question], answers: &HashMap<i64, String>) -> Tally {
    let mut correct = 0;
    let mut wrong = 0;

    for question in questions {
        match answers.get(&question.id) {
            Some(choice) if *choice == question.correct_answer => correct += 1,
            _ => wrong += 1,
        }
    }

    let total = questions.len() as i32;
    let score = if total == 0 { 0 } else { correct * 100 / total };

    Tally { correct, wrong, score }
}
