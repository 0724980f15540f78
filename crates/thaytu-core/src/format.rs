//! Content formatting for untrusted reply text.
//!
//! Only two constructs are interpreted: `**bold**` pairs and newlines.
//! Everything else is carried through as inert text. Terminal control
//! characters are stripped so a reply can never drive the terminal.

/// A run of text with a single emphasis state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Plain(String),
    Bold(String),
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain(s) | Segment::Bold(s) => s,
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, Segment::Bold(_))
    }
}

/// Displayable markup: one entry per line, each a sequence of segments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup {
    lines: Vec<Vec<Segment>>,
}

impl Markup {
    pub fn lines(&self) -> &[Vec<Segment>] {
        &self.lines
    }

    /// The text without emphasis, lines joined with `\n`
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.iter().map(Segment::text).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Convert raw text into markup. Never fails, the empty string gives one empty line.
pub fn format(text: &str) -> Markup {
    let clean = sanitize(text);
    Markup {
        lines: clean.split('\n').map(parse_bold_line).collect(),
    }
}

/// Drop control characters other than newline; tabs become a space.
fn sanitize(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\n' => Some('\n'),
            '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

/// Split one line into plain and bold segments
fn parse_bold_line(line: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut chars = line.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c != '*' || chars.peek() != Some(&'*') {
            current_text.push(c);
            continue;
        }
        // Consume the second *
        chars.next();

        // Find closing **
        let mut bold_text = String::new();
        let mut found_close = false;
        while let Some(c) = chars.next() {
            if c == '*' && chars.peek() == Some(&'*') {
                chars.next();
                found_close = true;
                break;
            }
            bold_text.push(c);
        }

        if found_close {
            if !current_text.is_empty() {
                segments.push(Segment::Plain(std::mem::take(&mut current_text)));
            }
            if !bold_text.is_empty() {
                segments.push(Segment::Bold(bold_text));
            }
        } else {
            // No closing **, treat as literal
            current_text.push_str("**");
            current_text.push_str(&bold_text);
        }
    }

    if !current_text.is_empty() {
        segments.push(Segment::Plain(current_text));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(s: &str) -> Segment {
        Segment::Plain(s.to_string())
    }

    fn bold(s: &str) -> Segment {
        Segment::Bold(s.to_string())
    }

    #[test]
    fn test_bold_pairs_become_emphasis() {
        let markup = format("Con sinh năm **Tân Tỵ** nha");
        assert_eq!(
            markup.lines(),
            &[vec![plain("Con sinh năm "), bold("Tân Tỵ"), plain(" nha")]]
        );
    }

    #[test]
    fn test_newlines_split_lines() {
        let markup = format("dòng một\n**dòng** hai");
        assert_eq!(markup.lines().len(), 2);
        assert_eq!(markup.lines()[1], vec![bold("dòng"), plain(" hai")]);
    }

    #[test]
    fn test_unclosed_bold_is_literal() {
        let markup = format("a **b** c **d");
        assert_eq!(
            markup.lines()[0],
            vec![plain("a "), bold("b"), plain(" c **d")]
        );
    }

    #[test]
    fn test_bold_does_not_span_lines() {
        let markup = format("**mở\nđóng**");
        assert_eq!(markup.plain_text(), "**mở\nđóng**");
        assert!(markup.lines().iter().flatten().all(|s| !s.is_bold()));
    }

    #[test]
    fn test_empty_input_produces_output() {
        let markup = format("");
        assert_eq!(markup.lines().len(), 1);
        assert!(markup.lines()[0].is_empty());
    }

    #[test]
    fn test_control_sequences_are_inert() {
        let markup = format("xin\u{1b}[2Jchào\r\n<script>alert(1)</script>");
        assert_eq!(markup.plain_text(), "xin[2Jchào\n<script>alert(1)</script>");
    }
}
