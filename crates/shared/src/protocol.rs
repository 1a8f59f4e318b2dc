use serde::{Deserialize, Serialize};

use crate::domain::{GameMode, Genre, OptionKey};

/// Every JSON reply carries a `success` flag and, on failure, an `error` message.
pub trait Acknowledged {
    fn success(&self) -> bool;
    fn error_message(&self) -> Option<&str>;
}

macro_rules! acknowledged {
    ($($name:ident),+ $(,)?) => {
        $(
            impl Acknowledged for $name {
                fn success(&self) -> bool {
                    self.success
                }

                fn error_message(&self) -> Option<&str> {
                    self.error.as_deref()
                }
            }
        )+
    };
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartGameRequest {
    pub genre: Genre,
    pub game_mode: GameMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartGameResponse {
    pub success: bool,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub genre: Option<Genre>,
    #[serde(default)]
    pub game_mode: Option<GameMode>,
    #[serde(default)]
    pub game_url: Option<String>,
    #[serde(default)]
    pub hints: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateQuizRequest {
    pub story: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestionPayload {
    pub question: String,
    #[serde(with = "ordered_options")]
    pub options: Vec<(OptionKey, String)>,
    pub correct: OptionKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateQuizResponse {
    pub success: bool,
    #[serde(default)]
    pub questions: Vec<QuizQuestionPayload>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub is_correct: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub success: bool,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub questions_answered: Option<u32>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub level_score: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub success: bool,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub level_score: Option<u32>,
    #[serde(default)]
    pub questions_answered: u32,
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelCheckResponse {
    pub success: bool,
    #[serde(default)]
    pub leveled_up: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub hint_awarded: bool,
    #[serde(default)]
    pub new_level: Option<u32>,
    #[serde(default)]
    pub new_hints: Option<u32>,
    #[serde(default)]
    pub level_score: Option<u32>,
    #[serde(default)]
    pub story_word_limit: Option<u32>,
    #[serde(default)]
    pub questions_per_round: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `level` is serialized as `null` for classic games rather than omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordGameRequest {
    pub genre: Genre,
    pub game_mode: GameMode,
    pub score: u32,
    pub total_questions: u32,
    pub level: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordGameResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UseHintResponse {
    pub success: bool,
    #[serde(default)]
    pub hints_remaining: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkipLevelResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub hints_remaining: Option<u32>,
    #[serde(default)]
    pub new_level: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub active_sessions: u32,
}

acknowledged!(
    StartGameResponse,
    GenerateQuizResponse,
    SubmitAnswerResponse,
    ScoreResponse,
    LevelCheckResponse,
    RecordGameResponse,
    UseHintResponse,
    SkipLevelResponse,
);

/// The options object is keyed by letter and its document order is the display order,
/// so it is read entry by entry instead of through a hashed map.
mod ordered_options {
    use std::fmt;

    use serde::{
        de::{MapAccess, Visitor},
        ser::SerializeMap,
        Deserializer, Serializer,
    };

    use crate::domain::OptionKey;

    pub fn serialize<S>(options: &[(OptionKey, String)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(options.len()))?;
        for (key, text) in options {
            map.serialize_entry(key.as_str(), text)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(OptionKey, String)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedOptions;

        impl<'de> Visitor<'de> for OrderedOptions {
            type Value = Vec<(OptionKey, String)>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object mapping option keys to option text")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut options = Vec::with_capacity(access.size_hint().unwrap_or(4));
                while let Some((key, text)) = access.next_entry::<String, String>()? {
                    options.push((OptionKey(key), text));
                }
                Ok(options)
            }
        }

        deserializer.deserialize_map(OrderedOptions)
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
