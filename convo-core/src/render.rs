use tracing::debug;

use crate::extract::{ExtractOptions, extract_assistant_message, extract_user_message};
use crate::model::{DisplayBlock, MessageRole, Record};
use crate::wrap::wrap_text;

const USER_LABEL: &str = "USER:";
const ASSISTANT_LABEL: &str = "ASSISTANT:";

/// Fixed two-column geometry: user text hugs the right edge of `total_width`,
/// and both columns wrap at `column_width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub total_width: usize,
    pub column_width: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            total_width: 80,
            column_width: 60,
        }
    }
}

/// Renders raw source lines into a framed transcript. Blank lines and lines
/// that are not JSON objects are dropped without a diagnostic.
pub fn render_transcript<S: AsRef<str>>(
    lines: &[S],
    title: &str,
    layout: Layout,
    options: &ExtractOptions,
) -> String {
    let mut output = String::new();

    push_banner(&mut output, &format!("CONVERSATION: {title}"), layout);

    for (line_idx, line) in lines.iter().enumerate() {
        let line_no = line_idx + 1;
        let trimmed = line.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }

        let Some(record) = Record::parse(trimmed) else {
            debug!(line = line_no, "skipping line that is not a JSON object");
            continue;
        };

        for block in record_blocks(&record, options) {
            render_block(&mut output, &block, layout);
        }
    }

    push_banner(&mut output, "END OF CONVERSATION", layout);
    output
}

/// User block first, then assistant block. Empty text produces no block.
pub fn record_blocks(record: &Record, options: &ExtractOptions) -> Vec<DisplayBlock> {
    let user = extract_user_message(record.user_input.as_ref()).map(|text| DisplayBlock {
        role: MessageRole::User,
        text,
    });
    let assistant = extract_assistant_message(record.assistant_response.as_ref(), options).map(
        |text| DisplayBlock {
            role: MessageRole::Assistant,
            text,
        },
    );

    [user, assistant]
        .into_iter()
        .flatten()
        .filter(|block| !block.text.is_empty())
        .collect()
}

pub fn render_block(output: &mut String, block: &DisplayBlock, layout: Layout) {
    match block.role {
        MessageRole::User => render_right(output, &block.text, layout),
        MessageRole::Assistant => render_left(output, &block.text, layout),
    }
}

pub fn render_left(output: &mut String, text: &str, layout: Layout) {
    let rule = "-".repeat(layout.total_width);

    output.push('\n');
    push_line(output, &rule);
    push_line(output, ASSISTANT_LABEL);
    push_line(output, &rule);
    for line in wrap_text(text, layout.column_width) {
        push_line(output, &line);
    }
    output.push('\n');
}

pub fn render_right(output: &mut String, text: &str, layout: Layout) {
    output.push('\n');
    push_line(output, &align_right(USER_LABEL, layout.total_width));
    push_line(
        output,
        &align_right(&"-".repeat(layout.column_width), layout.total_width),
    );
    for line in wrap_text(text, layout.column_width) {
        push_line(output, &align_right(&line, layout.total_width));
    }
    output.push('\n');
}

fn push_banner(output: &mut String, heading: &str, layout: Layout) {
    let rule = "=".repeat(layout.total_width);

    push_line(output, &rule);
    push_line(output, &center(heading, layout.total_width));
    push_line(output, &rule);
}

fn push_line(output: &mut String, line: &str) {
    output.push_str(line);
    output.push('\n');
}

fn align_right(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.chars().count());
    format!("{}{text}", " ".repeat(padding))
}

// Odd leftover padding goes to the right.
fn center(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.chars().count());
    let left = padding / 2;
    format!("{}{text}{}", " ".repeat(left), " ".repeat(padding - left))
}
