use alloc::{borrow::Cow, string::String};
use serde::{Deserialize, Serialize};

/// A single trivia question as stored in the question repository.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    /// Prompt to be displayed in chat.
    #[serde(alias = "question")]
    pub text: String,
    /// The expected answer. Submissions are compared case-insensitively.
    pub answer: String,
    /// Points awarded for a correct answer. See [`Question::points`] for the fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    /// Optional hand-written hint. One is derived from the answer otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Question {
    pub const DEFAULT_POINTS: u32 = 1;

    /// Points to award for this question.
    pub fn points(&self) -> u32 {
        self.points.unwrap_or(Self::DEFAULT_POINTS)
    }

    /// Both the prompt and the answer must have visible content.
    pub fn is_well_formed(&self) -> bool {
        !self.text.trim().is_empty() && !self.answer.trim().is_empty()
    }

    /// Checks a submission against the answer, ignoring case and surrounding whitespace.
    pub fn accepts(&self, submission: &str) -> bool {
        self.answer.trim().to_lowercase() == submission.trim().to_lowercase()
    }

    /// Returns the hand-written hint if present. Otherwise, the answer is masked such that only the
    /// first character of each word remains visible.
    pub fn hint(&self) -> Cow<'_, str> {
        if let Some(hint) = self.hint.as_deref() {
            return Cow::Borrowed(hint);
        }

        let mut masked = String::with_capacity(self.answer.len());
        let mut at_word_start = true;
        for c in self.answer.trim().chars() {
            if c.is_whitespace() {
                at_word_start = true;
                masked.push(c);
            } else if c.is_alphanumeric() {
                masked.push(if at_word_start { c } else { '_' });
                at_word_start = false;
            } else {
                masked.push(c);
            }
        }
        Cow::Owned(masked)
    }
}

#[cfg(test)]
mod tests {
    use super::Question;

    fn capital() -> Question {
        Question { text: "What is the capital of France?".into(), answer: "Paris".into(), points: None, hint: None }
    }

    #[test]
    fn accepts_regardless_of_case_and_padding() {
        let question = capital();
        assert!(question.accepts("Paris"));
        assert!(question.accepts(" paris "));
        assert!(question.accepts("PARIS"));
        assert!(!question.accepts("Pari"));
        assert!(!question.accepts(""));
    }

    #[test]
    fn points_fall_back_to_default() {
        let mut question = capital();
        assert_eq!(question.points(), 1);
        question.points = Some(5);
        assert_eq!(question.points(), 5);
    }

    #[test]
    fn derives_hint_from_answer() {
        let mut question = capital();
        assert_eq!(question.hint(), "P____");

        question.answer = String::from("  New York ");
        assert_eq!(question.hint(), "N__ Y___");

        question.answer = String::from("Rock 'n' Roll");
        assert_eq!(question.hint(), "R___ 'n' R___");

        question.hint = Some(String::from("It has a famous tower."));
        assert_eq!(question.hint(), "It has a famous tower.");
    }

    #[test]
    fn parses_repository_entries() {
        let question: Question =
            serde_json::from_str(r#"{ "question": "2 + 2?", "answer": "4", "points": 3 }"#).unwrap();
        assert_eq!(question.text, "2 + 2?");
        assert_eq!(question.points, Some(3));
        assert!(question.hint.is_none());
        assert!(question.is_well_formed());

        let blank: Question = serde_json::from_str(r#"{ "text": "  ", "answer": "4" }"#).unwrap();
        assert!(!blank.is_well_formed());
    }
}
