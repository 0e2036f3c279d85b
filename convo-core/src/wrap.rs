//! Greedy word wrapping used by the transcript layout.
//!
//! Paragraphs are cut into chunks (whitespace runs, words, and word pieces
//! ending in a hyphen or before an em-dash) and packed greedily. Whitespace
//! inside a line is kept as written; whitespace at a line break is dropped,
//! except leading whitespace on the first line. A chunk longer than the width
//! fills the rest of the current line and continues on the next. Widths are
//! counted in chars.

const TAB_SIZE: usize = 8;

/// Wraps `text` to `width`, treating each `\n`-separated paragraph on its own.
/// Blank paragraphs become one empty line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let wrapped = wrap_paragraph(paragraph, width);
        if wrapped.is_empty() {
            lines.push(String::new());
        } else {
            lines.extend(wrapped);
        }
    }

    lines
}

fn wrap_paragraph(paragraph: &str, width: usize) -> Vec<String> {
    let chars = normalize_whitespace(paragraph);
    let mut chunks = split_chunks(&chars);
    chunks.reverse();

    let mut lines = Vec::new();
    while !chunks.is_empty() {
        let mut line = Vec::new();
        let mut line_len = 0;

        if !lines.is_empty() && chunks.last().is_some_and(|chunk| is_blank(chunk)) {
            chunks.pop();
        }

        while let Some(len) = chunks.last().map(Vec::len) {
            if line_len + len > width {
                break;
            }
            line_len += len;
            if let Some(chunk) = chunks.pop() {
                line.push(chunk);
            }
        }

        if chunks.last().is_some_and(|chunk| chunk.len() > width) {
            break_long_chunk(&mut chunks, &mut line, line_len, width);
        }

        if line.last().is_some_and(|chunk| is_blank(chunk)) {
            line.pop();
        }

        if !line.is_empty() {
            lines.push(line.concat().into_iter().collect());
        }
    }

    lines
}

/// Moves as much of the next chunk onto `line` as fits, preferring to cut
/// just after a hyphen.
fn break_long_chunk(
    chunks: &mut Vec<Vec<char>>,
    line: &mut Vec<Vec<char>>,
    line_len: usize,
    width: usize,
) {
    let space_left = if width < 1 { 1 } else { width - line_len };
    let Some(chunk) = chunks.pop() else {
        return;
    };

    let mut end = space_left.min(chunk.len());
    if chunk.len() > space_left
        && let Some(hyphen) = chunk[..space_left].iter().rposition(|&c| c == '-')
        && hyphen > 0
        && chunk[..hyphen].iter().any(|&c| c != '-')
    {
        end = hyphen + 1;
    }

    line.push(chunk[..end].to_vec());
    chunks.push(chunk[end..].to_vec());
}

/// Expands tabs to 8-column stops, then turns every ASCII whitespace char
/// into a plain space.
fn normalize_whitespace(paragraph: &str) -> Vec<char> {
    let mut chars = Vec::with_capacity(paragraph.len());
    let mut column = 0;

    for c in paragraph.chars() {
        match c {
            '\t' => {
                let spaces = TAB_SIZE - column % TAB_SIZE;
                chars.extend(std::iter::repeat_n(' ', spaces));
                column += spaces;
            }
            '\r' => {
                chars.push(' ');
                column = 0;
            }
            c if is_wrap_whitespace(c) => {
                chars.push(' ');
                column += 1;
            }
            c => {
                chars.push(c);
                column += 1;
            }
        }
    }

    chars
}

fn split_chunks(chars: &[char]) -> Vec<Vec<char>> {
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = if is_wrap_whitespace(chars[start]) {
            chars[start..]
                .iter()
                .position(|&c| !is_wrap_whitespace(c))
                .map_or(chars.len(), |offset| start + offset)
        } else if let Some(end) = em_dash_end(chars, start) {
            end
        } else {
            word_end(chars, start)
        };

        chunks.push(chars[start..end].to_vec());
        start = end;
    }

    chunks
}

/// End of the word piece starting at `start`: after a hyphen joining two
/// letter runs, before an em-dash, or at the next whitespace.
fn word_end(chars: &[char], start: usize) -> usize {
    let mut pos = start + 1;

    loop {
        if chars.get(pos) == Some(&'-') && breaks_after_hyphen(chars, pos) {
            return pos + 1;
        }
        if pos >= chars.len() || is_wrap_whitespace(chars[pos]) {
            return pos;
        }
        if is_word_punct(chars[pos - 1]) && dash_run_before_word(chars, pos).is_some() {
            return pos;
        }
        pos += 1;
    }
}

/// A run of two or more dashes between a word char and a word.
fn em_dash_end(chars: &[char], start: usize) -> Option<usize> {
    if start == 0 || !is_word_punct(chars[start - 1]) {
        return None;
    }
    dash_run_before_word(chars, start)
}

fn dash_run_before_word(chars: &[char], start: usize) -> Option<usize> {
    let dashes = chars[start..].iter().take_while(|&&c| c == '-').count();
    let end = start + dashes;
    (dashes >= 2 && chars.get(end).is_some_and(|&c| is_word_char(c))).then_some(end)
}

// "well-known" splits after the hyphen; "x-1" and "a-b" stay whole.
fn breaks_after_hyphen(chars: &[char], hyphen: usize) -> bool {
    let letter_at = |idx: Option<usize>| {
        idx.and_then(|idx| chars.get(idx))
            .is_some_and(|&c| is_letter(c))
    };

    let two_letters_before = letter_at(hyphen.checked_sub(2)) && letter_at(hyphen.checked_sub(1));
    let letter_hyphen_letter_before = letter_at(hyphen.checked_sub(3))
        && hyphen.checked_sub(2).and_then(|idx| chars.get(idx)) == Some(&'-')
        && letter_at(hyphen.checked_sub(1));
    if !two_letters_before && !letter_hyphen_letter_before {
        return false;
    }

    letter_at(Some(hyphen + 1))
        && (letter_at(Some(hyphen + 2))
            || (chars.get(hyphen + 2) == Some(&'-') && letter_at(Some(hyphen + 3))))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_letter(c: char) -> bool {
    is_word_char(c) && !c.is_numeric()
}

fn is_word_punct(c: char) -> bool {
    is_word_char(c) || matches!(c, '!' | '"' | '\'' | '&' | '.' | ',' | '?')
}

fn is_blank(chunk: &[char]) -> bool {
    chunk.iter().all(|c| c.is_whitespace())
}

// ASCII whitespace only, so non-breaking spaces stay inside words.
fn is_wrap_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}
