use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quiz::answer;
use crate::store::operations::words::WordEntry;

/// Locale the speech hint targets.
const SPEECH_LANG: &str = "en-US";
/// Sub-normal speaking rate for learner-paced playback.
const SPEECH_RATE: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    EngToKor,
    KorToEng,
}

/// Snapshot of one word at quiz start. Deliberately detached from the store
/// row so live edits mid-quiz cannot change a question under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizWord {
    pub eng: String,
    pub kor: String,
}

impl From<&WordEntry> for QuizWord {
    fn from(entry: &WordEntry) -> Self {
        Self {
            eng: entry.eng.clone(),
            kor: entry.kor.clone(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("no words in the selected books")]
    EmptyPool,
    #[error("quiz session already finished")]
    Finished,
}

/// Client-side speech synthesis hint, only present when the prompt is the
/// English field. Cancellation of in-flight utterances stays on the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechPrompt {
    pub text: String,
    pub lang: &'static str,
    pub rate: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub index: usize,
    pub total: usize,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech: Option<SpeechPrompt>,
}

#[derive(Debug)]
pub enum Verdict {
    Correct {
        finished: bool,
        next: Option<Question>,
    },
    Incorrect {
        /// Canonical raw expected answer, shown to the user.
        expected: String,
        /// The missed word, for wrong-note recording.
        missed: QuizWord,
        /// The same question, still active for retry.
        question: Question,
    },
}

#[derive(Debug)]
pub struct QuizSession {
    pool: Vec<QuizWord>,
    cursor: usize,
    direction: Direction,
}

impl QuizSession {
    /// Transition Setup → InProgress: shuffle the snapshot uniformly
    /// (Fisher–Yates via `SliceRandom`) and truncate to `count` when given.
    /// An empty snapshot blocks the transition.
    pub fn start<R: Rng>(
        mut pool: Vec<QuizWord>,
        direction: Direction,
        count: Option<usize>,
        rng: &mut R,
    ) -> Result<Self, QuizError> {
        if pool.is_empty() {
            return Err(QuizError::EmptyPool);
        }

        pool.shuffle(rng);
        if let Some(count) = count {
            if count > 0 && count < pool.len() {
                pool.truncate(count);
            }
        }

        Ok(Self {
            pool,
            cursor: 0,
            direction,
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn total(&self) -> usize {
        self.pool.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.pool.len()
    }

    /// The active question, or None once the session is Finished.
    pub fn question(&self) -> Option<Question> {
        let word = self.pool.get(self.cursor)?;
        let (prompt, speech) = match self.direction {
            Direction::EngToKor => (
                word.eng.clone(),
                Some(SpeechPrompt {
                    text: word.eng.clone(),
                    lang: SPEECH_LANG,
                    rate: SPEECH_RATE,
                }),
            ),
            Direction::KorToEng => (word.kor.clone(), None),
        };
        Some(Question {
            index: self.cursor,
            total: self.pool.len(),
            prompt,
            speech,
        })
    }

    /// Checks one answer against the active question.
    ///
    /// Correct advances the cursor (possibly into Finished); incorrect leaves
    /// the cursor in place and hands back the missed word so the caller can
    /// route it to the wrong-note book.
    pub fn submit(&mut self, input: &str) -> Result<Verdict, QuizError> {
        let word = self.pool.get(self.cursor).ok_or(QuizError::Finished)?;

        let expected = match self.direction {
            Direction::EngToKor => word.kor.as_str(),
            Direction::KorToEng => word.eng.as_str(),
        };

        if answer::is_correct(expected, input) {
            self.cursor += 1;
            let finished = self.is_finished();
            Ok(Verdict::Correct {
                finished,
                next: self.question(),
            })
        } else {
            let missed = word.clone();
            let expected = expected.to_string();
            let question = self
                .question()
                .ok_or(QuizError::Finished)?;
            Ok(Verdict::Incorrect {
                expected,
                missed,
                question,
            })
        }
    }
}
