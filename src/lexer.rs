//! Lexical analysis of a single input line into argument tokens.
//!
//! Quoting follows a small POSIX-like subset: single quotes preserve everything
//! literally, double quotes preserve everything except `\"` and `\\`, and the same
//! two escapes are recognised outside of quotes. Nothing else is special, so
//! `$`, `|`, `>` and friends are plain characters.

use log::debug;

/// Characters that a backslash escapes when it is not inside single quotes.
const ESCAPABLE: [char; 2] = ['"', '\\'];

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    in_single_quote: bool,
    in_double_quote: bool,
    buffer: String,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            in_single_quote: false,
            in_double_quote: false,
            buffer: String::new(),
        }
    }

    fn make_tokens(mut self) -> Vec<String> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match ch {
                '\'' if !self.in_double_quote => self.in_single_quote = !self.in_single_quote,
                '"' if !self.in_single_quote => self.in_double_quote = !self.in_double_quote,
                '\\' => self.handle_backslash(),
                ' ' if !self.quoted() => self.flush(&mut out),
                c => self.buffer.push(c),
            }
        }

        if self.quoted() {
            // Unterminated quotes are accepted: the tail of the line is quoted content.
            debug!(
                "unterminated {} quote, keeping {:?} as quoted text",
                if self.in_single_quote { "single" } else { "double" },
                self.buffer
            );
        }

        self.flush(&mut out);
        out
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn quoted(&self) -> bool {
        self.in_single_quote || self.in_double_quote
    }

    fn handle_backslash(&mut self) {
        if !self.in_single_quote {
            if let Some(next) = self.peek_char().filter(|c| ESCAPABLE.contains(c)) {
                self.read_char();
                self.buffer.push(next);
                return;
            }
        }
        self.buffer.push('\\');
    }

    fn flush(&mut self, out: &mut Vec<String>) {
        if !self.buffer.is_empty() {
            out.push(std::mem::take(&mut self.buffer));
        }
    }
}

/// Split a raw input line into unescaped argument tokens.
///
/// Never fails and never yields empty tokens; a blank line gives an empty vector.
pub fn tokenize(line: &str) -> Vec<String> {
    let tokens = LexingFSM::new(line).make_tokens();
    debug!("tokenized {:?} into {:?}", line, tokens);
    tokens
}

#[cfg(test)]
mod tests {
    use super::tokenize;

    #[test]
    fn splits_plain_words() {
        assert_eq!(tokenize("echo hello world"), vec!["echo", "hello", "world"]);
    }

    #[test]
    fn collapses_redundant_spaces() {
        assert_eq!(tokenize("   echo    a  b   "), vec!["echo", "a", "b"]);
    }

    #[test]
    fn empty_and_blank_lines_have_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("     ").is_empty());
    }

    #[test]
    fn single_quotes_preserve_spaces() {
        assert_eq!(tokenize("echo 'a  b'"), vec!["echo", "a  b"]);
    }

    #[test]
    fn single_quotes_keep_backslashes_and_double_quotes() {
        assert_eq!(tokenize(r#"echo 'x\"y\\z'"#), vec!["echo", r#"x\"y\\z"#]);
    }

    #[test]
    fn double_quotes_unescape_quote_and_backslash() {
        assert_eq!(tokenize(r#"echo "a\"b""#), vec!["echo", "a\"b"]);
        assert_eq!(tokenize(r#"echo "a\\b""#), vec!["echo", r"a\b"]);
    }

    #[test]
    fn double_quotes_keep_single_quotes() {
        assert_eq!(tokenize(r#"echo "it's here""#), vec!["echo", "it's here"]);
    }

    #[test]
    fn adjacent_quoted_parts_join_into_one_token() {
        assert_eq!(tokenize(r#"echo 'foo'"bar"baz"#), vec!["echo", "foobarbaz"]);
    }

    #[test]
    fn empty_quotes_do_not_produce_tokens() {
        assert_eq!(tokenize("echo '' \"\""), vec!["echo"]);
    }

    #[test]
    fn backslash_before_ordinary_character_is_literal() {
        assert_eq!(tokenize(r"echo a\nb"), vec!["echo", r"a\nb"]);
        assert_eq!(tokenize(r"echo a\ b"), vec!["echo", r"a\", "b"]);
    }

    #[test]
    fn escaped_quote_outside_quotes_does_not_open_a_quote() {
        assert_eq!(tokenize(r#"echo \"a b\""#), vec!["echo", "\"a", "b\""]);
    }

    #[test]
    fn trailing_backslash_is_kept() {
        assert_eq!(tokenize(r"echo foo\"), vec!["echo", r"foo\"]);
    }

    #[test]
    fn unterminated_quote_swallows_rest_of_line() {
        assert_eq!(tokenize("echo 'a  b"), vec!["echo", "a  b"]);
        assert_eq!(tokenize("echo \"x y"), vec!["echo", "x y"]);
    }

    #[test]
    fn tabs_are_ordinary_characters() {
        assert_eq!(tokenize("a\tb c"), vec!["a\tb", "c"]);
    }
}
