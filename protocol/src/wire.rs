use std::collections::BTreeMap;

use seqmaster_core as game;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Renders a sequence item or answer the way the service printed it.
///
/// Sequences mix numbers and strings (code breaker patterns), so items arrive
/// as arbitrary JSON values. Strings are shown without quotes.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn display_values(values: &[Value]) -> Vec<String> {
    values.iter().map(display_value).collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModeRequest {
    pub mode: game::Mode,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnswerRequest<'a> {
    pub answer: &'a str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PurchaseRequest {
    pub power_up: game::PowerUpId,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubmitScoreRequest<'a> {
    pub name: &'a str,
    pub score: u64,
    pub mode: game::Mode,
}

/// Plain acknowledgement such as `{"status": "success"}`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Ack {
    pub status: Option<String>,
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChallengeBody {
    pub level: u32,
    pub score: u64,
    pub sequence: Vec<Value>,
    pub hint: String,
    pub mode: Option<String>,
    pub is_boss: bool,
    pub message: Option<String>,
}

impl From<ChallengeBody> for game::Challenge {
    fn from(body: ChallengeBody) -> Self {
        let mode = body.mode.and_then(|mode| match mode.parse() {
            Ok(mode) => Some(mode),
            Err(err) => {
                log::warn!("challenge names an unexpected mode: {}", err);
                None
            }
        });
        Self {
            level: body.level,
            score: body.score,
            sequence: display_values(&body.sequence),
            hint: body.hint,
            mode,
            is_boss: body.is_boss,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnswerBody {
    pub message: String,
    pub game_over: bool,
    pub correct_answer: Option<Value>,
    pub new_achievements: Vec<String>,
    pub bytes: Option<u64>,
    pub power_ups: Option<game::PowerUps>,
}

impl From<AnswerBody> for game::AnswerVerdict {
    fn from(body: AnswerBody) -> Self {
        let shop = match (body.bytes, body.power_ups) {
            (Some(bytes), Some(power_ups)) => Some(game::ShopState { bytes, power_ups }),
            _ => None,
        };
        Self {
            message: body.message,
            game_over: body.game_over,
            correct_answer: body.correct_answer.as_ref().map(display_value),
            new_achievements: body.new_achievements,
            shop,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LastAnswerBody {
    pub last_answer: Option<Value>,
}

impl LastAnswerBody {
    pub fn answer(&self) -> Option<String> {
        self.last_answer
            .as_ref()
            .filter(|value| !value.is_null())
            .map(display_value)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShopBody {
    pub bytes: u64,
    pub power_ups: game::PowerUps,
}

impl From<ShopBody> for game::ShopState {
    fn from(body: ShopBody) -> Self {
        Self {
            bytes: body.bytes,
            power_ups: body.power_ups,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BossSequenceBody {
    pub sequence: Vec<Value>,
    pub hint: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BossStartBody {
    pub sequences: Vec<BossSequenceBody>,
    pub total_time: Option<u32>,
    pub level: Option<u32>,
}

impl From<BossStartBody> for Vec<game::BossSequence> {
    fn from(body: BossStartBody) -> Self {
        body.sequences
            .into_iter()
            .map(|seq| game::BossSequence {
                sequence: display_values(&seq.sequence),
                hint: seq.hint,
            })
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BossAnswerBody {
    pub correct: bool,
    pub boss_defeated: bool,
    pub message: String,
    pub correct_answer: Option<Value>,
}

impl From<BossAnswerBody> for game::BossVerdict {
    fn from(body: BossAnswerBody) -> Self {
        Self {
            correct: body.correct,
            boss_defeated: body.boss_defeated,
            message: body.message,
            correct_answer: body.correct_answer.as_ref().map(display_value),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
    #[serde(default)]
    pub mode: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AchievementInfo {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub earned: bool,
}

/// `/api/achievements`, keyed by achievement id.
pub type AchievementCatalog = BTreeMap<String, AchievementInfo>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sequence_items_render_without_quotes() {
        assert_eq!(display_value(&json!(42)), "42");
        assert_eq!(display_value(&json!("A1")), "A1");
        assert_eq!(display_value(&json!(2.5)), "2.5");
        assert_eq!(display_value(&Value::Null), "");
    }

    #[test]
    fn challenge_with_unknown_mode_keeps_the_rest() {
        let body: ChallengeBody = serde_json::from_value(json!({
            "sequence": [1, "B", 3],
            "hint": "mixed",
            "level": 2,
            "score": 30,
            "timer": 20,
            "mode": "arcade",
            "is_boss": false,
        }))
        .unwrap();
        let challenge = game::Challenge::from(body);

        assert_eq!(challenge.mode, None);
        assert_eq!(challenge.sequence_display(), "1 B 3");
        assert_eq!(challenge.score, 30);
    }

    #[test]
    fn answer_carries_shop_only_when_complete() {
        let verdict = game::AnswerVerdict::from(
            serde_json::from_value::<AnswerBody>(json!({
                "message": "Correct! Score: 20",
                "bytes": 20,
                "power_ups": {"time_freeze": 1, "debugger": 0, "skip": 2},
                "new_achievements": ["quick_thinker"],
            }))
            .unwrap(),
        );
        assert_eq!(verdict.shop.map(|shop| shop.bytes), Some(20));
        assert_eq!(verdict.new_achievements, ["quick_thinker"]);

        let verdict = game::AnswerVerdict::from(
            serde_json::from_value::<AnswerBody>(json!({"message": "ok", "bytes": 5})).unwrap(),
        );
        assert_eq!(verdict.shop, None);
    }

    #[test]
    fn null_last_answer_is_absent() {
        let body: LastAnswerBody = serde_json::from_str(r#"{"last_answer": null}"#).unwrap();
        assert_eq!(body.answer(), None);

        let body: LastAnswerBody = serde_json::from_str(r#"{"last_answer": 42}"#).unwrap();
        assert_eq!(body.answer().as_deref(), Some("42"));
    }
}
