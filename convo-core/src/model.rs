use std::fmt;

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Extracted text for one side of a turn, ready to be laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBlock {
    pub role: MessageRole,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInput {
    pub method: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionItem {
    pub label: String,
    pub emoji: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recommendation {
    pub summary: Option<String>,
    pub total_estimated_cost: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssistantResponse {
    pub answer: Option<String>,
    pub output_list: Vec<OptionItem>,
    pub recommendation: Option<Recommendation>,
}

/// One user/assistant turn pair as stored in the conversation log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub user_input: Option<UserInput>,
    pub assistant_response: Option<AssistantResponse>,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    user_input: Option<Value>,
    #[serde(default)]
    assistant_response: Option<Value>,
}

impl Record {
    /// Parses one JSONL line. Returns `None` for anything that is not a JSON object.
    pub fn parse(line: &str) -> Option<Self> {
        let value = serde_json::from_str::<Value>(line).ok()?;
        if !value.is_object() {
            return None;
        }

        let raw = serde_json::from_value::<RawRecord>(value).ok()?;
        Some(Self {
            user_input: raw.user_input.as_ref().and_then(UserInput::from_value),
            assistant_response: raw
                .assistant_response
                .as_ref()
                .and_then(AssistantResponse::from_value),
        })
    }
}

impl UserInput {
    /// Empty objects and non-objects carry no user turn.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object().filter(|object| !object.is_empty())?;

        Some(Self {
            method: object
                .get("method")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            message: object
                .get("message")
                .and_then(scalar_text)
                .unwrap_or_default(),
        })
    }
}

impl AssistantResponse {
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object().filter(|object| !object.is_empty())?;

        let answer = object
            .get("answer")
            .and_then(Value::as_str)
            .filter(|answer| !answer.is_empty())
            .map(ToString::to_string);

        let output_list = object
            .get("output_list")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(OptionItem::from_value)
            .collect();

        let recommendation = object
            .get("recommendation")
            .and_then(Value::as_object)
            .filter(|recommendation| !recommendation.is_empty())
            .map(|recommendation| Recommendation {
                summary: recommendation.get("summary").and_then(truthy_text),
                total_estimated_cost: recommendation
                    .get("total_estimated_cost")
                    .and_then(truthy_text),
            });

        Some(Self {
            answer,
            output_list,
            recommendation,
        })
    }
}

impl OptionItem {
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;

        Some(Self {
            label: object
                .get("label")
                .and_then(scalar_text)
                .unwrap_or_default(),
            emoji: object.get("emoji").and_then(truthy_text),
            description: object.get("description").and_then(truthy_text),
        })
    }
}

/// Text form of a JSON scalar. Arrays, objects and null have none.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Like `scalar_text`, but empty strings, zero and `false` count as absent.
fn truthy_text(value: &Value) -> Option<String> {
    let is_falsy = match value {
        Value::String(text) => text.is_empty(),
        Value::Number(number) => matches!(number.as_f64(), Some(n) if n.abs() < f64::EPSILON),
        Value::Bool(flag) => !flag,
        Value::Null | Value::Array(_) | Value::Object(_) => true,
    };

    if is_falsy { None } else { scalar_text(value) }
}
