//! Comment block extraction by syntax family.
//!
//! The scanner is deliberately naive: it knows block delimiters, optional
//! line comments, and single/double-quoted strings that end at an unescaped
//! quote or at end of line. Regex literals, template literals and unquoted
//! `url(...)` bodies are not understood.

use std::ops::Range;

/// Delimiter conventions shared by a group of file types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxFamily {
    /// `/* ... */` with quoted strings.
    Css,
    /// `/* ... */`, skipping `//` line comments and quoted strings.
    Script,
    /// `<!-- ... -->`. Prose apostrophes make string tracking wrong here.
    Markup,
}

impl SyntaxFamily {
    /// Family for a lower-cased extension. Unknown extensions use block comments.
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "js" | "mjs" | "cjs" | "jsx" | "ts" | "tsx" | "scss" | "sass" | "less" | "styl" => {
                SyntaxFamily::Script
            }
            "html" | "htm" | "hbs" | "handlebars" | "mustache" | "njk" | "twig" | "xml"
            | "svg" | "vue" => SyntaxFamily::Markup,
            _ => SyntaxFamily::Css,
        }
    }

    pub fn delimiters(self) -> (&'static str, &'static str) {
        match self {
            SyntaxFamily::Css | SyntaxFamily::Script => ("/*", "*/"),
            SyntaxFamily::Markup => ("<!--", "-->"),
        }
    }

    fn line_comment(self) -> Option<&'static str> {
        match self {
            SyntaxFamily::Script => Some("//"),
            _ => None,
        }
    }

    fn quoted_strings(self) -> bool {
        !matches!(self, SyntaxFamily::Markup)
    }
}

/// One comment block with its delimiters stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBlock<'a> {
    pub text: &'a str,
    /// 1-based line of the opening delimiter.
    pub line: usize,
    /// Byte span of the whole comment, delimiters included.
    pub span: Range<usize>,
    /// Code precedes the opener on its line.
    pub inline: bool,
}

#[derive(Debug, Default)]
pub struct Extraction<'a> {
    pub blocks: Vec<CommentBlock<'a>>,
    /// Line of an opener that was never closed. Scanning stops there.
    pub unterminated: Option<usize>,
}

/// Extract every comment block of `family` from `source`, in order.
pub fn extract(source: &str, family: SyntaxFamily) -> Extraction<'_> {
    let bytes = source.as_bytes();
    let (open, close) = family.delimiters();
    let (open, close) = (open.as_bytes(), close.as_bytes());
    let line_comment = family.line_comment().map(str::as_bytes);
    let quoted = family.quoted_strings();

    let mut out = Extraction::default();
    let mut i = 0;

    while i < bytes.len() {
        let rest = &bytes[i..];

        if quoted && (rest[0] == b'"' || rest[0] == b'\'') {
            i = skip_string(bytes, i);
            continue;
        }

        if let Some(lc) = line_comment {
            if rest.starts_with(lc) {
                i = find(bytes, b"\n", i).unwrap_or(bytes.len());
                continue;
            }
        }

        if rest.starts_with(open) {
            let body_start = i + open.len();
            match find(bytes, close, body_start) {
                Some(body_end) => {
                    let end = body_end + close.len();
                    out.blocks.push(CommentBlock {
                        text: &source[body_start..body_end],
                        line: line_at(bytes, i),
                        span: i..end,
                        inline: has_code_before(bytes, i),
                    });
                    i = end;
                }
                None => {
                    out.unterminated = Some(line_at(bytes, i));
                    break;
                }
            }
            continue;
        }

        i += 1;
    }

    out
}

/// Index just past the string starting at `start`.
fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return j,
            b if b == quote => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

fn find(bytes: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

fn line_at(bytes: &[u8], pos: usize) -> usize {
    bytes[..pos].iter().filter(|&&b| b == b'\n').count() + 1
}

fn has_code_before(bytes: &[u8], pos: usize) -> bool {
    bytes[..pos]
        .iter()
        .rev()
        .take_while(|&&b| b != b'\n')
        .any(|b| !b.is_ascii_whitespace())
}
