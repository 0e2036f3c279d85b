use crate::model::{AssistantResponse, OptionItem, Recommendation, UserInput};

pub const DEFAULT_PLACEHOLDER_EMOJI: &str = "mia";

/// Knobs for turning stored turns into display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// When set, an option whose emoji equals `placeholder_emoji` is rendered
    /// as if it had no emoji.
    pub treat_placeholder_emoji_as_absent: bool,
    pub placeholder_emoji: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            treat_placeholder_emoji_as_absent: true,
            placeholder_emoji: DEFAULT_PLACEHOLDER_EMOJI.to_string(),
        }
    }
}

/// A `chat` turn with an empty message still yields `Some("")`; callers skip empty text.
pub fn extract_user_message(user_input: Option<&UserInput>) -> Option<String> {
    let user_input = user_input?;

    match user_input.method.as_str() {
        "chat" => Some(user_input.message.clone()),
        "click" => Some(format!("[clicked: {}]", user_input.message)),
        _ if user_input.message.is_empty() => None,
        _ => Some(user_input.message.clone()),
    }
}

pub fn extract_assistant_message(
    assistant_response: Option<&AssistantResponse>,
    options: &ExtractOptions,
) -> Option<String> {
    let response = assistant_response?;
    let mut parts = Vec::new();

    // Emptiness is judged before trimming: a whitespace-only answer still
    // takes its slot as an empty part.
    if let Some(answer) = response.answer.as_deref()
        && !answer.is_empty()
    {
        parts.push(answer.trim().to_string());
    }

    if let Some(block) = render_options(&response.output_list, options) {
        parts.push(block);
    }

    if let Some(block) = response
        .recommendation
        .as_ref()
        .and_then(render_recommendation)
    {
        parts.push(block);
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

fn render_options(items: &[OptionItem], options: &ExtractOptions) -> Option<String> {
    if items.is_empty() {
        return None;
    }

    let lines = items
        .iter()
        .map(|item| {
            let mut line = match visible_emoji(item, options) {
                Some(emoji) => format!("  {emoji} {}", item.label),
                None => format!("  - {}", item.label),
            };
            if let Some(description) = &item.description {
                line.push_str(&format!(" ({description})"));
            }
            line
        })
        .collect::<Vec<_>>();

    Some(format!("Options:\n{}", lines.join("\n")))
}

fn visible_emoji<'a>(item: &'a OptionItem, options: &ExtractOptions) -> Option<&'a str> {
    let emoji = item.emoji.as_deref()?;
    if options.treat_placeholder_emoji_as_absent && emoji == options.placeholder_emoji {
        return None;
    }
    Some(emoji)
}

fn render_recommendation(recommendation: &Recommendation) -> Option<String> {
    let mut text = String::new();

    if let Some(summary) = &recommendation.summary {
        text.push_str(&format!("Summary: {summary}"));
    }
    if let Some(cost) = &recommendation.total_estimated_cost {
        text.push_str(&format!("\nEstimated Cost: {cost}"));
    }

    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
