// Quiz walk-through over parsed questions: one question at a time, score kept
// per question answered correctly.

use serde::Serialize;
use tracing::debug;

use crate::record_parser::QuizRecord;

/// Result of choosing an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    /// No current question (empty quiz or already complete)
    NoQuestion,
}

/// Where the session is after moving on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QuizProgress {
    Question(usize),
    Complete,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<QuizRecord>,
    current: usize,
    score: usize,
    /// Whether the current question has already been scored
    scored_current: bool,
}

impl QuizSession {
    pub fn new(questions: Vec<QuizRecord>) -> Self {
        Self {
            questions,
            current: 0,
            score: 0,
            scored_current: false,
        }
    }

    pub fn current(&self) -> Option<&QuizRecord> {
        self.questions.get(self.current)
    }

    pub fn current_index(&self) -> Option<usize> {
        (self.current < self.questions.len()).then_some(self.current)
    }

    /// Answer buttons for the current question: non-empty choices with their slot index
    pub fn visible_choices(&self) -> Vec<(usize, &str)> {
        self.current()
            .map(|q| q.visible_choices().collect())
            .unwrap_or_default()
    }

    /// Check a choice against the current question. Retries are allowed;
    /// only the first correct answer per question counts toward the score.
    pub fn answer(&mut self, choice_index: usize) -> AnswerOutcome {
        let Some(question) = self.current() else {
            return AnswerOutcome::NoQuestion;
        };

        if question.is_correct(choice_index) {
            if !self.scored_current {
                self.score += 1;
                self.scored_current = true;
            }
            debug!(question = self.current, choice_index, "Correct answer");
            AnswerOutcome::Correct
        } else {
            debug!(question = self.current, choice_index, "Incorrect answer");
            AnswerOutcome::Incorrect
        }
    }

    pub fn next_question(&mut self) -> QuizProgress {
        if self.current < self.questions.len() {
            self.current += 1;
            self.scored_current = false;
        }
        self.progress()
    }

    pub fn progress(&self) -> QuizProgress {
        match self.current_index() {
            Some(i) => QuizProgress::Question(i),
            None => QuizProgress::Complete,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress() == QuizProgress::Complete
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
