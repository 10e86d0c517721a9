use log::{debug, trace};

use crate::cursor::Cursor;
use crate::error::{ErrorKind, Failure, JsonError, Result};
use crate::options::ValidatorOptions;

const EXPECT_VALUE: &str =
    "expected one of `\"` `{` `[` `t` `f` `n` `-` `0` `1` `2` `3` `4` `5` `6` `7` `8` `9`";
const EXPECT_VALUE_OR_CLOSE: &str =
    "expected `]` or one of `\"` `{` `[` `t` `f` `n` `-` `0` `1` `2` `3` `4` `5` `6` `7` `8` `9`";
const EXPECT_ROOT: &str = "expected `{` or `[`";
const EXPECT_KEY: &str = "expected `\"` to start an object key";
const EXPECT_KEY_OR_CLOSE: &str = "expected `\"` or `}`";
const EXPECT_COLON: &str = "expected `:`";
const EXPECT_OBJECT_NEXT: &str = "expected `,` or `}`";
const EXPECT_ARRAY_NEXT: &str = "expected `,` or `]`";
const EXPECT_DIGIT: &str = "expected one of `0` `1` `2` `3` `4` `5` `6` `7` `8` `9`";
const EXPECT_NUMBER_END: &str = "expected `.`, `e` or the end of the number";
const EXPECT_CLOSING_QUOTE: &str = "expected closing `\"`";
const EXPECT_ESCAPE: &str =
    "expected `u` and 4 hex digits, or one of `\"` `\\` `/` `b` `f` `n` `r` `t` after `\\`";
const EXPECT_HEX: &str = "expected 4 hex digits after `\\u`";
const CONTROL_CHARACTER: &str = "control characters are not allowed in strings (< 0x20)";
const EXTRA_CHARACTERS: &str = "extra characters after parsing";

/// Checks `input` against the json grammar with default options.
///
/// ```
/// use ferrite_gate::{validate, ErrorKind};
///
/// assert!(validate(br#"{"a": [1, 2.5, "x!", true, null]}"#).is_ok());
///
/// let err = validate(br#"{"a": }"#).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::InvalidSyntax);
/// assert_eq!(err.offset(), 6);
/// ```
pub fn validate(input: &[u8]) -> Result<(), JsonError> {
    validate_with(input, &ValidatorOptions::default())
}

pub fn validate_str(input: &str) -> Result<(), JsonError> {
    validate(input.as_bytes())
}

/// Checks `input` in a single left-to-right pass, reporting the first
/// violation only.
pub fn validate_with(input: &[u8], options: &ValidatorOptions) -> Result<(), JsonError> {
    let mut validator = Validator::new(input, options);
    match validator.document() {
        Ok(()) => {
            debug!("valid json, {} bytes", input.len());
            Ok(())
        }
        Err(failure) => {
            let message = match failure.kind {
                ErrorKind::DepthExceeded => format!(
                    "expected at most {} nested objects and arrays",
                    options.max_depth
                ),
                _ => failure.expected.to_string(),
            };
            let err = JsonError::from_failure(failure, message, input);
            debug!(
                "invalid json, {:?} at byte {} of {}",
                err.kind(),
                err.offset(),
                input.len()
            );
            Err(err)
        }
    }
}

/// Recursive descent over one document. Each production consumes exactly
/// its own bytes from the shared cursor.
struct Validator<'a, 'o> {
    cursor: Cursor<'a>,
    options: &'o ValidatorOptions,
    depth: usize,
}

impl<'a, 'o> Validator<'a, 'o> {
    fn new(input: &'a [u8], options: &'o ValidatorOptions) -> Self {
        Self {
            cursor: Cursor::new(input),
            options,
            depth: 0,
        }
    }

    fn document(&mut self) -> Result<()> {
        self.cursor.skip_whitespace();
        let expected = if self.options.allow_scalar_root {
            EXPECT_VALUE
        } else {
            EXPECT_ROOT
        };
        match self.cursor.peek(0, expected)? {
            b'{' | b'[' => self.value()?,
            _ if self.options.allow_scalar_root => self.value()?,
            _ => {
                return Err(self
                    .cursor
                    .syntax(EXPECT_ROOT)
                    .help("wrap the document in `[]` or `{}`"))
            }
        }
        self.cursor.skip_whitespace();
        if !self.cursor.is_empty() {
            return Err(self
                .cursor
                .syntax(EXTRA_CHARACTERS)
                .help("remove everything after the end of the document"));
        }
        Ok(())
    }

    fn value(&mut self) -> Result<()> {
        match self.cursor.peek(0, EXPECT_VALUE)? {
            b'"' => self.string(),
            b'{' => self.object(),
            b'[' => self.array(),
            b't' => self.literal(b"true", "expected `true`"),
            b'f' => self.literal(b"false", "expected `false`"),
            b'n' => self.literal(b"null", "expected `null`"),
            b'-' | b'0'..=b'9' => self.number(),
            b'+' => Err(self
                .cursor
                .syntax(EXPECT_VALUE)
                .help("remove the leading `+`")),
            b'.' => Err(self
                .cursor
                .syntax(EXPECT_VALUE)
                .help("add a `0` before the `.`")),
            b'\'' => Err(self
                .cursor
                .syntax(EXPECT_VALUE)
                .help("json strings use double quotes")),
            b'}' | b']' => Err(self.cursor.syntax(EXPECT_VALUE).help("add a value here")),
            _ => Err(self.cursor.syntax(EXPECT_VALUE)),
        }
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.options.max_depth {
            trace!(
                "nesting limit of {} hit at byte {}",
                self.options.max_depth,
                self.cursor.position()
            );
            return Err(self
                .cursor
                .fail(ErrorKind::DepthExceeded, "expected shallower nesting")
                .help("flatten the document or raise the nesting limit"));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn object(&mut self) -> Result<()> {
        self.enter()?;
        self.expect(b'{', "expected `{`")?;
        self.cursor.skip_whitespace();
        if self.cursor.peek(0, EXPECT_KEY_OR_CLOSE)? == b'}' {
            self.cursor.advance(1)?;
            self.leave();
            return Ok(());
        }

        loop {
            self.key()?;
            self.cursor.skip_whitespace();
            self.expect(b':', EXPECT_COLON)
                .map_err(|f| f.hint("add `:` after the key"))?;
            self.cursor.skip_whitespace();
            self.value()?;
            self.cursor.skip_whitespace();

            match self.cursor.peek(0, EXPECT_OBJECT_NEXT)? {
                b',' => {
                    self.cursor.advance(1)?;
                    self.cursor.skip_whitespace();
                    if self.cursor.peek(0, EXPECT_KEY)? == b'}' {
                        return Err(self
                            .cursor
                            .syntax(EXPECT_KEY)
                            .help("remove the trailing comma"));
                    }
                }
                b'}' => {
                    self.cursor.advance(1)?;
                    break;
                }
                _ => {
                    return Err(self
                        .cursor
                        .syntax(EXPECT_OBJECT_NEXT)
                        .help("add `,` between members"))
                }
            }
        }

        self.leave();
        Ok(())
    }

    fn key(&mut self) -> Result<()> {
        match self.cursor.peek(0, EXPECT_KEY)? {
            b'"' => self.string(),
            b'\'' => Err(self
                .cursor
                .syntax(EXPECT_KEY)
                .help("keys use double quotes, not single quotes")),
            b',' => Err(self
                .cursor
                .syntax(EXPECT_KEY)
                .help("remove the extra comma")),
            _ => Err(self
                .cursor
                .syntax(EXPECT_KEY)
                .help("wrap the key in double quotes")),
        }
    }

    fn array(&mut self) -> Result<()> {
        self.enter()?;
        self.expect(b'[', "expected `[`")?;
        self.cursor.skip_whitespace();
        if self.cursor.peek(0, EXPECT_VALUE_OR_CLOSE)? == b']' {
            self.cursor.advance(1)?;
            self.leave();
            return Ok(());
        }

        loop {
            self.value()?;
            self.cursor.skip_whitespace();

            match self.cursor.peek(0, EXPECT_ARRAY_NEXT)? {
                b',' => {
                    self.cursor.advance(1)?;
                    self.cursor.skip_whitespace();
                    if self.cursor.peek(0, EXPECT_VALUE)? == b']' {
                        return Err(self
                            .cursor
                            .syntax(EXPECT_VALUE)
                            .help("remove the trailing comma"));
                    }
                }
                b']' => {
                    self.cursor.advance(1)?;
                    break;
                }
                _ => {
                    return Err(self
                        .cursor
                        .syntax(EXPECT_ARRAY_NEXT)
                        .help("add `,` between elements"))
                }
            }
        }

        self.leave();
        Ok(())
    }

    fn string(&mut self) -> Result<()> {
        self.expect(b'"', "expected `\"`")?;
        loop {
            let rest = self.cursor.rest();
            let stop = memchr::memchr2(b'"', b'\\', rest).unwrap_or(rest.len());
            if let Some(control) = rest[..stop].iter().position(|&b| b < 0x20) {
                self.cursor.advance(control)?;
                return Err(self
                    .cursor
                    .syntax(CONTROL_CHARACTER)
                    .help("escape it, e.g. `\\n` or `\\t`"));
            }
            self.cursor.advance(stop)?;

            let backslash = self.cursor.position();
            match self.cursor.current() {
                Some(b'"') => return self.cursor.advance(1),
                Some(_) => {
                    self.cursor.advance(1)?;
                    self.escape(backslash)?;
                }
                None => {
                    return Err(self
                        .cursor
                        .fail(ErrorKind::UnexpectedEnd, EXPECT_CLOSING_QUOTE)
                        .help("close the string with `\"`"))
                }
            }
        }
    }

    /// Byte after a backslash. Surrogate pairing of `\u` escapes is not
    /// checked.
    fn escape(&mut self, backslash: usize) -> Result<()> {
        match self.cursor.peek(0, EXPECT_ESCAPE)? {
            b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => self.cursor.advance(1),
            b'u' => {
                for i in 1..=4 {
                    if !self.cursor.peek(i, EXPECT_HEX)?.is_ascii_hexdigit() {
                        return Err(Failure::new(ErrorKind::InvalidEscape, EXPECT_HEX, backslash)
                            .help("`\\u` takes exactly 4 hex digits, e.g. `\\u00e9`"));
                    }
                }
                self.cursor.advance(5)
            }
            _ => Err(
                Failure::new(ErrorKind::InvalidEscape, EXPECT_ESCAPE, backslash)
                    .help("escape a literal backslash as `\\\\`"),
            ),
        }
    }

    fn literal(&mut self, keyword: &'static [u8], expected: &'static str) -> Result<()> {
        let start = self.cursor.position();
        for (i, &b) in keyword.iter().enumerate() {
            if self.cursor.peek(i, expected)? != b {
                return Err(Failure::new(ErrorKind::InvalidSyntax, expected, start));
            }
        }
        self.cursor.advance(keyword.len())
    }

    fn number(&mut self) -> Result<()> {
        if self.cursor.peek(0, EXPECT_VALUE)? == b'-' {
            self.cursor.advance(1)?;
        }

        match self.cursor.peek(0, EXPECT_DIGIT)? {
            b'0' => {
                self.cursor.advance(1)?;
                if let Some(b'0'..=b'9') = self.cursor.current() {
                    return Err(self
                        .cursor
                        .syntax(EXPECT_NUMBER_END)
                        .help("remove the leading zero"));
                }
            }
            b'1'..=b'9' => {
                self.cursor.advance(1)?;
                self.digit_run()?;
            }
            _ => return Err(self.cursor.syntax(EXPECT_DIGIT)),
        }

        if self.cursor.current() == Some(b'.') {
            self.cursor.advance(1)?;
            self.digits()
                .map_err(|f| f.hint("add a digit after the `.`"))?;
        }

        if let Some(b'e' | b'E') = self.cursor.current() {
            self.cursor.advance(1)?;
            if let Some(b'+' | b'-') = self.cursor.current() {
                self.cursor.advance(1)?;
            }
            self.digits()
                .map_err(|f| f.hint("add a digit to the exponent"))?;
        }

        Ok(())
    }

    /// One or more digits.
    fn digits(&mut self) -> Result<()> {
        match self.cursor.peek(0, EXPECT_DIGIT)? {
            b'0'..=b'9' => {
                self.cursor.advance(1)?;
                self.digit_run()
            }
            _ => Err(self.cursor.syntax(EXPECT_DIGIT)),
        }
    }

    /// Zero or more digits. Running into the end of input here is fine: the
    /// number may be the last token of the document.
    fn digit_run(&mut self) -> Result<()> {
        let run = self
            .cursor
            .rest()
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        self.cursor.advance(run)
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<()> {
        if self.cursor.peek(0, expected)? != byte {
            return Err(self.cursor.syntax(expected));
        }
        self.cursor.advance(1)
    }
}
