//! Quiz generation and answering.
//!
//! Generation goes through an [`Operation`]; answering and scoring are local.
//! A successful generation replaces the whole [`QuizSheet`] in one assignment,
//! so answers given to a previous quiz can never be attributed to the new
//! questions.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use kbdesk_core::defaults;
use kbdesk_core::{
    Difficulty, Error, MaterialId, NoticeBus, QuizBackend, QuizQuestion, QuizRequest,
    QuizResponse, Result, ValidationError,
};

use crate::operation::{Operation, OperationStatus, Settlement, Submission, Ticket};
use crate::render::{option_marks, score_quiz, OptionMark, QuizScore};

/// Selected option per question index. Frozen once the quiz is submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerMap {
    answers: BTreeMap<usize, usize>,
    frozen: bool,
}

impl AnswerMap {
    /// Record `option` for `question`, replacing any earlier choice.
    pub fn insert(
        &mut self,
        question: usize,
        option: usize,
    ) -> std::result::Result<Option<usize>, ValidationError> {
        if self.frozen {
            return Err(ValidationError::QuizAlreadySubmitted);
        }
        Ok(self.answers.insert(question, option))
    }

    pub fn get(&self, question: usize) -> Option<usize> {
        self.answers.get(&question).copied()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    fn freeze(&mut self) {
        self.frozen = true;
    }

    fn clear(&mut self) {
        self.answers.clear();
        self.frozen = false;
    }
}

/// Generation parameters chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    pub material_id: Option<MaterialId>,
    pub count: u32,
    pub difficulty: Difficulty,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            material_id: None,
            count: defaults::QUIZ_QUESTION_COUNT,
            difficulty: Difficulty::default(),
        }
    }
}

/// A generated quiz together with the user's answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSheet {
    questions: Vec<QuizQuestion>,
    answers: AnswerMap,
    score: Option<QuizScore>,
}

impl QuizSheet {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self {
            questions,
            answers: AnswerMap::default(),
            score: None,
        }
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn score(&self) -> Option<QuizScore> {
        self.score
    }

    pub fn is_submitted(&self) -> bool {
        self.score.is_some()
    }

    /// Submission is allowed once every question has an answer.
    pub fn can_submit(&self) -> bool {
        !self.is_submitted() && self.answers.len() == self.questions.len()
    }

    pub fn select(
        &mut self,
        question: usize,
        option: usize,
    ) -> std::result::Result<(), ValidationError> {
        if self.is_submitted() {
            return Err(ValidationError::QuizAlreadySubmitted);
        }
        let in_range = self
            .questions
            .get(question)
            .is_some_and(|q| option < q.options.len());
        if !in_range {
            return Err(ValidationError::OptionOutOfRange { question, option });
        }
        self.answers.insert(question, option)?;
        Ok(())
    }

    pub fn submit(&mut self) -> std::result::Result<QuizScore, ValidationError> {
        if self.is_submitted() {
            return Err(ValidationError::QuizAlreadySubmitted);
        }
        let score = score_quiz(&self.questions, &self.answers)?;
        self.answers.freeze();
        self.score = Some(score);
        Ok(score)
    }

    /// Clear answers and score, keeping the questions.
    pub fn try_again(&mut self) {
        self.answers.clear();
        self.score = None;
    }

    /// Whether `question` was answered correctly. Only known after submission.
    pub fn verdict(&self, question: usize) -> Option<bool> {
        if !self.is_submitted() {
            return None;
        }
        let q = self.questions.get(question)?;
        Some(self.answers.get(question) == Some(q.correct_index))
    }

    /// Per-option marks for `question`. Only available after submission.
    pub fn marks(&self, question: usize) -> Option<Vec<OptionMark>> {
        if !self.is_submitted() {
            return None;
        }
        let q = self.questions.get(question)?;
        Some(option_marks(q, self.answers.get(question)))
    }
}

pub struct QuizView {
    pub config: QuizConfig,
    generation: Operation<QuizRequest, QuizResponse>,
    sheet: Option<QuizSheet>,
    notices: NoticeBus,
}

impl QuizView {
    pub fn new(notices: NoticeBus) -> Self {
        Self {
            config: QuizConfig::default(),
            generation: Operation::new("generate_quiz"),
            sheet: None,
            notices,
        }
    }

    pub fn status(&self) -> OperationStatus {
        self.generation.status()
    }

    pub fn is_generating(&self) -> bool {
        self.generation.is_pending()
    }

    pub fn sheet(&self) -> Option<&QuizSheet> {
        self.sheet.as_ref()
    }

    pub fn begin_generate(&mut self) -> Result<Submission<QuizRequest>> {
        let request = match self.validate_config() {
            Ok(request) => request,
            Err(err) => {
                self.notices.error(err.to_string());
                return Err(err.into());
            }
        };
        let ticket = self.generation.begin(request.clone())?;
        Ok(Submission { ticket, request })
    }

    fn validate_config(&self) -> std::result::Result<QuizRequest, ValidationError> {
        let material_id = self
            .config
            .material_id
            .clone()
            .ok_or(ValidationError::NoMaterialSelected)?;
        if self.config.count == 0 {
            return Err(ValidationError::InvalidQuestionCount);
        }
        Ok(QuizRequest {
            material_id,
            count: self.config.count,
            difficulty: self.config.difficulty,
        })
    }

    pub fn settle_generate(&mut self, ticket: Ticket, outcome: Result<QuizResponse>) -> Settlement {
        let outcome = outcome.and_then(|response| {
            if response.questions.is_empty() {
                return Err(Error::Operation("quiz has no questions".to_string()));
            }
            for q in &response.questions {
                q.check().map_err(Error::Operation)?;
            }
            Ok(response)
        });

        let settlement = self.generation.settle(ticket, outcome);
        match settlement {
            Settlement::Succeeded => {
                if let Some(response) = self.generation.result() {
                    debug!(question_count = response.questions.len(), "Quiz sheet replaced");
                    self.sheet = Some(QuizSheet::new(response.questions.clone()));
                }
                self.notices.success("Quiz generated successfully!");
            }
            Settlement::Failed => {
                if let Some(err) = self.generation.error() {
                    self.notices.error(err.to_string());
                }
            }
            Settlement::Stale => {}
        }
        settlement
    }

    #[instrument(skip(self, backend), fields(subsystem = "workspace", component = "quiz"))]
    pub async fn generate<B>(&mut self, backend: &B) -> Result<Settlement>
    where
        B: QuizBackend + ?Sized,
    {
        let submission = self.begin_generate()?;
        let outcome = backend.generate_quiz(&submission.request).await;
        Ok(self.settle_generate(submission.ticket, outcome))
    }

    pub fn select_answer(&mut self, question: usize, option: usize) -> Result<()> {
        let sheet = self.sheet.as_mut().ok_or(ValidationError::NoQuiz)?;
        sheet.select(question, option)?;
        Ok(())
    }

    pub fn can_submit(&self) -> bool {
        self.sheet.as_ref().is_some_and(QuizSheet::can_submit)
    }

    pub fn submit_quiz(&mut self) -> Result<QuizScore> {
        let sheet = self.sheet.as_mut().ok_or(ValidationError::NoQuiz)?;
        match sheet.submit() {
            Ok(score) => {
                self.notices.success(format!(
                    "Quiz completed! Score: {}/{}",
                    score.correct, score.total
                ));
                Ok(score)
            }
            Err(err) => {
                self.notices.error(err.to_string());
                Err(err.into())
            }
        }
    }

    pub fn try_again(&mut self) {
        if let Some(sheet) = self.sheet.as_mut() {
            sheet.try_again();
        }
    }

    pub fn reset(&mut self) {
        self.config = QuizConfig::default();
        self.sheet = None;
        self.generation.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbdesk_core::NoticeLevel;

    fn question(correct_index: usize) -> QuizQuestion {
        QuizQuestion {
            question: format!("Question with answer {}", correct_index),
            options: vec![
                "Option A".into(),
                "Option B".into(),
                "Option C".into(),
                "Option D".into(),
            ],
            correct_index,
        }
    }

    fn configured_view() -> QuizView {
        let mut view = QuizView::new(NoticeBus::default());
        view.config.material_id = Some(MaterialId::new("1"));
        view
    }

    fn generated_view(questions: Vec<QuizQuestion>) -> QuizView {
        let mut view = configured_view();
        let submission = view.begin_generate().unwrap();
        view.settle_generate(submission.ticket, Ok(QuizResponse { questions }));
        view
    }

    #[test]
    fn test_generate_requires_material() {
        let notices = NoticeBus::default();
        let mut rx = notices.subscribe();
        let mut view = QuizView::new(notices);

        let err = view.begin_generate().unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::NoMaterialSelected)
        ));
        assert_eq!(view.status(), OperationStatus::Idle);
        assert_eq!(rx.try_recv().unwrap().level, NoticeLevel::Error);
    }

    #[test]
    fn test_generate_requires_positive_count() {
        let mut view = configured_view();
        view.config.count = 0;

        let err = view.begin_generate().unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidQuestionCount)
        ));
        assert!(!view.is_generating());
    }

    #[test]
    fn test_generate_request_carries_config() {
        let mut view = configured_view();
        view.config.count = 10;
        view.config.difficulty = Difficulty::Hard;

        let submission = view.begin_generate().unwrap();
        assert_eq!(submission.request.count, 10);
        assert_eq!(submission.request.difficulty, Difficulty::Hard);
        assert_eq!(submission.request.material_id.as_str(), "1");
        assert!(view.is_generating());
    }

    #[test]
    fn test_submit_scores_matching_answers() {
        let mut view = generated_view(vec![question(1), question(2)]);
        view.select_answer(0, 1).unwrap();
        view.select_answer(1, 0).unwrap();

        let score = view.submit_quiz().unwrap();
        assert_eq!(score.correct, 1);
        assert_eq!(score.total, 2);
    }

    #[test]
    fn test_submit_disabled_until_all_answered() {
        let mut view = generated_view(vec![question(1), question(2)]);
        view.select_answer(0, 1).unwrap();
        assert!(!view.can_submit());

        let err = view.submit_quiz().unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::IncompleteQuiz {
                answered: 1,
                total: 2
            })
        ));

        view.select_answer(1, 2).unwrap();
        assert!(view.can_submit());
    }

    #[test]
    fn test_answers_frozen_after_submit() {
        let mut view = generated_view(vec![question(0)]);
        view.select_answer(0, 0).unwrap();
        view.submit_quiz().unwrap();

        let err = view.select_answer(0, 1).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::QuizAlreadySubmitted)
        ));
        let sheet = view.sheet().unwrap();
        assert_eq!(sheet.answers().get(0), Some(0));
        assert!(sheet.answers().is_frozen());
        assert!(!view.can_submit());
    }

    #[test]
    fn test_marks_derived_only_after_submit() {
        let mut view = generated_view(vec![question(1)]);
        view.select_answer(0, 3).unwrap();
        assert!(view.sheet().unwrap().marks(0).is_none());
        assert!(view.sheet().unwrap().verdict(0).is_none());

        view.submit_quiz().unwrap();
        let sheet = view.sheet().unwrap();
        assert_eq!(sheet.verdict(0), Some(false));
        assert_eq!(
            sheet.marks(0).unwrap(),
            vec![
                OptionMark::Unmarked,
                OptionMark::Correct,
                OptionMark::Unmarked,
                OptionMark::WrongChoice
            ]
        );
    }

    #[test]
    fn test_select_out_of_range_rejected() {
        let mut view = generated_view(vec![question(1)]);
        assert!(view.select_answer(0, 4).is_err());
        assert!(view.select_answer(1, 0).is_err());
        assert!(view.sheet().unwrap().answers().is_empty());
    }

    #[test]
    fn test_try_again_keeps_questions() {
        let mut view = generated_view(vec![question(1), question(2)]);
        view.select_answer(0, 1).unwrap();
        view.select_answer(1, 2).unwrap();
        view.submit_quiz().unwrap();

        view.try_again();
        let sheet = view.sheet().unwrap();
        assert_eq!(sheet.questions().len(), 2);
        assert!(sheet.answers().is_empty());
        assert!(!sheet.is_submitted());
        view.select_answer(0, 0).unwrap();
    }

    #[test]
    fn test_regeneration_resets_answers_atomically() {
        let mut view = generated_view(vec![question(1), question(2)]);
        view.select_answer(0, 1).unwrap();
        view.select_answer(1, 2).unwrap();
        view.submit_quiz().unwrap();

        let submission = view.begin_generate().unwrap();
        view.settle_generate(
            submission.ticket,
            Ok(QuizResponse {
                questions: vec![question(3)],
            }),
        );

        let sheet = view.sheet().unwrap();
        assert_eq!(sheet.questions().len(), 1);
        assert!(sheet.answers().is_empty());
        assert!(sheet.score().is_none());
    }

    #[test]
    fn test_malformed_quiz_is_operation_failure() {
        let mut view = configured_view();
        let submission = view.begin_generate().unwrap();
        let bad = QuizQuestion {
            question: "Broken".into(),
            options: vec!["Only".into()],
            correct_index: 0,
        };

        let settlement = view.settle_generate(
            submission.ticket,
            Ok(QuizResponse {
                questions: vec![bad],
            }),
        );
        assert_eq!(settlement, Settlement::Failed);
        assert!(view.sheet().is_none());
    }

    #[test]
    fn test_failed_generation_keeps_previous_sheet() {
        let mut view = generated_view(vec![question(1)]);
        view.select_answer(0, 1).unwrap();

        let submission = view.begin_generate().unwrap();
        view.settle_generate(submission.ticket, Err(Error::Operation("down".into())));

        let sheet = view.sheet().unwrap();
        assert_eq!(sheet.answers().get(0), Some(1));
        assert_eq!(view.status(), OperationStatus::Failed);
    }

    #[test]
    fn test_generate_rejected_while_pending() {
        let mut view = configured_view();
        view.begin_generate().unwrap();
        assert!(matches!(view.begin_generate(), Err(Error::InFlight(_))));
    }
}
