//! Deterministic mapping from settled results to displayed values.

use std::cmp::Ordering;

use kbdesk_core::{Insight, QuizQuestion, SearchResult, ValidationError};

use crate::quiz::AnswerMap;

// =============================================================================
// SEARCH
// =============================================================================

/// Similarity clamped into [0, 1]; non-finite scores count as 0.
pub fn clamp_similarity(similarity: f64) -> f64 {
    if similarity.is_finite() {
        similarity.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// `round(similarity * 100)`, half rounding up.
///
/// The epsilon absorbs binary representation error so that scores such as
/// 0.285 land on 29 rather than 28.
pub fn similarity_percent(similarity: f64) -> u8 {
    (clamp_similarity(similarity) * 100.0 + 1e-9).round() as u8
}

/// Label shown on a search hit, e.g. `89% match`.
pub fn similarity_label(similarity: f64) -> String {
    format!("{}% match", similarity_percent(similarity))
}

/// Sort hits by descending similarity. Equal scores keep their original order.
pub fn rank_results(mut results: Vec<SearchResult>) -> Vec<SearchResult> {
    results.sort_by(|a, b| {
        clamp_similarity(b.similarity)
            .partial_cmp(&clamp_similarity(a.similarity))
            .unwrap_or(Ordering::Equal)
    });
    results
}

/// A non-empty region of an [`Insight`], in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightRegion<'a> {
    Summary(&'a str),
    Sentiment(&'a str),
    Topics(&'a [String]),
    Answer(&'a str),
}

/// Regions to render for `insight`. Absent fields produce no region.
pub fn insight_regions(insight: &Insight) -> Vec<InsightRegion<'_>> {
    let mut regions = Vec::new();
    if let Some(summary) = insight.summary.as_deref() {
        regions.push(InsightRegion::Summary(summary));
    }
    if let Some(sentiment) = insight.sentiment.as_deref() {
        regions.push(InsightRegion::Sentiment(sentiment));
    }
    if let Some(topics) = insight.topics.as_deref() {
        if !topics.is_empty() {
            regions.push(InsightRegion::Topics(topics));
        }
    }
    if let Some(answer) = insight.answer.as_deref() {
        regions.push(InsightRegion::Answer(answer));
    }
    regions
}

// =============================================================================
// QUIZ
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScore {
    pub correct: usize,
    pub total: usize,
}

impl QuizScore {
    /// Share of correct answers, rounded to a whole percent.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.correct as f64 / self.total as f64) * 100.0).round() as u8
    }
}

/// Count answers that match the correct option.
///
/// Every question must have an answer.
pub fn score_quiz(
    questions: &[QuizQuestion],
    answers: &AnswerMap,
) -> Result<QuizScore, ValidationError> {
    let answered = (0..questions.len())
        .filter(|idx| answers.get(*idx).is_some())
        .count();
    if answered != questions.len() {
        return Err(ValidationError::IncompleteQuiz {
            answered,
            total: questions.len(),
        });
    }

    let correct = questions
        .iter()
        .enumerate()
        .filter(|(idx, q)| answers.get(*idx) == Some(q.correct_index))
        .count();

    Ok(QuizScore {
        correct,
        total: questions.len(),
    })
}

/// Marking of one option after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    /// The right answer, whether or not it was chosen.
    Correct,
    /// Chosen, but wrong.
    WrongChoice,
    Unmarked,
}

pub fn option_marks(question: &QuizQuestion, selected: Option<usize>) -> Vec<OptionMark> {
    (0..question.options.len())
        .map(|idx| {
            if idx == question.correct_index {
                OptionMark::Correct
            } else if selected == Some(idx) {
                OptionMark::WrongChoice
            } else {
                OptionMark::Unmarked
            }
        })
        .collect()
}
