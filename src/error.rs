use std::fmt;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Longest excerpt copied out of the input for a diagnostic.
const EXCERPT_LEN: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A byte that no production allows at this point.
    InvalidSyntax,
    /// Input ran out in the middle of a production.
    UnexpectedEnd,
    /// A backslash followed by something other than a legal escape.
    InvalidEscape,
    /// Objects and arrays nested past the configured limit.
    DepthExceeded,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidSyntax => "invalid syntax",
            Self::UnexpectedEnd => "unexpected end of input",
            Self::InvalidEscape => "invalid escape sequence",
            Self::DepthExceeded => "nesting depth exceeded",
        })
    }
}

/// Abort raised deep inside the validators.
///
/// Cheap to copy so it can travel back up through every `?` unchanged. Only
/// the entry point turns it into a [`JsonError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Failure {
    pub(crate) kind: ErrorKind,
    pub(crate) expected: &'static str,
    pub(crate) help: Option<&'static str>,
    pub(crate) offset: usize,
}

impl Failure {
    pub(crate) fn new(kind: ErrorKind, expected: &'static str, offset: usize) -> Self {
        Self {
            kind,
            expected,
            help: None,
            offset,
        }
    }

    pub(crate) fn help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    /// Like [`Failure::help`], but leaves running out of input alone.
    pub(crate) fn hint(self, help: &'static str) -> Self {
        match self.kind {
            ErrorKind::InvalidSyntax => self.help(help),
            _ => self,
        }
    }
}

/// Where in the input a violation was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    excerpt: String,
    offset: usize,
    line: usize,
    column: usize,
}

impl Location {
    fn new(src: &[u8], offset: usize) -> Self {
        let rest = &src[offset..];
        let excerpt = String::from_utf8_lossy(&rest[..EXCERPT_LEN.min(rest.len())]).into_owned();

        let before = &src[..offset];
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let column = match memchr::memrchr(b'\n', before) {
            Some(newline) => offset - newline,
            None => offset + 1,
        };

        Self {
            excerpt,
            offset,
            line,
            column,
        }
    }

    /// Up to 40 bytes of input starting at the failure, lossily decoded.
    pub fn excerpt(&self) -> &str {
        &self.excerpt
    }

    /// Byte offset of the failure from the start of the input.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 1-based line of the failure.
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based byte column of the failure within its line.
    pub fn column(&self) -> usize {
        self.column
    }
}

/// The first grammar violation found in a document.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum JsonError {
    #[error("invalid syntax: {message}")]
    #[diagnostic(code(ferrite::invalid_syntax))]
    InvalidSyntax {
        message: String,
        #[label("unexpected character")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
        location: Location,
    },
    #[error("unexpected end of input: {message}")]
    #[diagnostic(code(ferrite::unexpected_end))]
    UnexpectedEnd {
        message: String,
        #[label("input ended here")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
        location: Location,
    },
    #[error("invalid escape sequence: {message}")]
    #[diagnostic(code(ferrite::invalid_escape))]
    InvalidEscape {
        message: String,
        #[label("invalid escape")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
        location: Location,
    },
    #[error("nesting depth exceeded: {message}")]
    #[diagnostic(code(ferrite::depth_exceeded))]
    DepthExceeded {
        message: String,
        #[label("nested too deeply")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
        location: Location,
    },
}

impl JsonError {
    pub(crate) fn from_failure(failure: Failure, message: String, src: &[u8]) -> Self {
        let offset = failure.offset.min(src.len());
        // a failure at end of input is drawn on the last byte so it stays visible
        let span = match (offset < src.len(), src.len()) {
            (true, _) => SourceSpan::new(offset.into(), 1),
            (false, 0) => SourceSpan::new(0usize.into(), 0),
            (false, len) => SourceSpan::new((len - 1).into(), 1),
        };
        let help = failure.help.map(str::to_string);
        let location = Location::new(src, offset);

        match failure.kind {
            ErrorKind::InvalidSyntax => Self::InvalidSyntax {
                message,
                span,
                help,
                location,
            },
            ErrorKind::UnexpectedEnd => Self::UnexpectedEnd {
                message,
                span,
                help,
                location,
            },
            ErrorKind::InvalidEscape => Self::InvalidEscape {
                message,
                span,
                help,
                location,
            },
            ErrorKind::DepthExceeded => Self::DepthExceeded {
                message,
                span,
                help,
                location,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSyntax { .. } => ErrorKind::InvalidSyntax,
            Self::UnexpectedEnd { .. } => ErrorKind::UnexpectedEnd,
            Self::InvalidEscape { .. } => ErrorKind::InvalidEscape,
            Self::DepthExceeded { .. } => ErrorKind::DepthExceeded,
        }
    }

    /// What the validator expected to find, e.g. ``expected `,` or `]` ``.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidSyntax { message, .. }
            | Self::UnexpectedEnd { message, .. }
            | Self::InvalidEscape { message, .. }
            | Self::DepthExceeded { message, .. } => message,
        }
    }

    pub fn help(&self) -> Option<&str> {
        match self {
            Self::InvalidSyntax { help, .. }
            | Self::UnexpectedEnd { help, .. }
            | Self::InvalidEscape { help, .. }
            | Self::DepthExceeded { help, .. } => help.as_deref(),
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            Self::InvalidSyntax { location, .. }
            | Self::UnexpectedEnd { location, .. }
            | Self::InvalidEscape { location, .. }
            | Self::DepthExceeded { location, .. } => location,
        }
    }

    /// Bytes the diagnostic label points at.
    pub fn span(&self) -> SourceSpan {
        match self {
            Self::InvalidSyntax { span, .. }
            | Self::UnexpectedEnd { span, .. }
            | Self::InvalidEscape { span, .. }
            | Self::DepthExceeded { span, .. } => *span,
        }
    }

    pub fn excerpt(&self) -> &str {
        self.location().excerpt()
    }

    pub fn offset(&self) -> usize {
        self.location().offset()
    }

    pub fn line(&self) -> usize {
        self.location().line()
    }

    pub fn column(&self) -> usize {
        self.location().column()
    }
}

pub(crate) type Result<T, E = Failure> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn error_at(src: &[u8], offset: usize) -> JsonError {
        let failure = Failure::new(ErrorKind::InvalidSyntax, "expected `,` or `]`", offset);
        JsonError::from_failure(failure, failure.expected.to_string(), src)
    }

    #[test]
    fn excerpt_is_clamped_to_remaining_input() {
        let err = error_at(b"[1 2]", 3);
        assert_eq!(err.excerpt(), "2]");
        assert_eq!(err.offset(), 3);
        assert_eq!(err.span(), SourceSpan::new(3usize.into(), 1));
    }

    #[test]
    fn excerpt_is_capped_at_forty_bytes() {
        let src = format!("[{}]", "1,".repeat(100));
        let err = error_at(src.as_bytes(), 1);
        assert_eq!(err.excerpt().len(), EXCERPT_LEN);
    }

    #[test]
    fn failure_at_end_is_labelled_on_the_last_byte() {
        let err = error_at(b"[1,", 3);
        assert_eq!(err.excerpt(), "");
        assert_eq!(err.offset(), 3);
        assert_eq!(err.span(), SourceSpan::new(2usize.into(), 1));
    }

    #[test]
    fn failure_on_empty_input_has_empty_span() {
        let err = error_at(b"", 0);
        assert_eq!(err.span(), SourceSpan::new(0usize.into(), 0));
    }

    #[test]
    fn line_and_column_are_one_based() {
        let err = error_at(b"{\n  \"a\": 1\n  x}", 13);
        assert_eq!((err.line(), err.column()), (3, 3));

        let err = error_at(b"[x]", 1);
        assert_eq!((err.line(), err.column()), (1, 2));
    }

    #[test]
    fn display_joins_kind_and_message() {
        let err = error_at(b"[1 2]", 3);
        assert_eq!(err.to_string(), "invalid syntax: expected `,` or `]`");
        assert_eq!(err.to_string(), format!("{}: {}", err.kind(), err.message()));
    }

    #[test]
    fn each_kind_maps_to_its_own_variant() {
        for kind in [
            ErrorKind::InvalidSyntax,
            ErrorKind::UnexpectedEnd,
            ErrorKind::InvalidEscape,
            ErrorKind::DepthExceeded,
        ] {
            let failure = Failure::new(kind, "expected `x`", 0);
            let err = JsonError::from_failure(failure, failure.expected.to_string(), b"[");
            assert_eq!(err.kind(), kind);
            assert_eq!(err.to_string(), format!("{kind}: expected `x`"));
        }
    }

    #[test]
    fn diagnostic_carries_code_and_help() {
        let failure = Failure::new(ErrorKind::InvalidEscape, "expected escape", 2)
            .help("escape the backslash as \\\\");
        let err = JsonError::from_failure(failure, failure.expected.to_string(), b"[\"\\x\"]");
        let code = Diagnostic::code(&err).map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("ferrite::invalid_escape"));
        let help = Diagnostic::help(&err).map(|h| h.to_string());
        assert_eq!(help.as_deref(), Some("escape the backslash as \\\\"));
        let labels: Vec<_> = err.labels().into_iter().flatten().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].label(), Some("invalid escape"));
        assert_eq!(labels[0].offset(), 2);
    }
}
