use std::error::Error;
use std::fmt;

/// A type alias for results that may fail to translate.
pub type Result<T> = ::std::result::Result<T, TranslateError>;

/// Everything that can go wrong while translating a formula.
#[derive(Debug)]
pub enum TranslateError {
    Parse(ParseError),
    Dialect(DialectError),
    Internal(InternalError),
}

/// A formula did not match the grammar.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(offset: usize, message: impl Into<String>) -> ParseError {
        ParseError {
            offset,
            message: message.into(),
        }
    }
}

/// A `Dialect` was constructed with an inconsistent configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DialectError {
    pub message: String,
}

impl DialectError {
    pub fn new(message: impl Into<String>) -> DialectError {
        DialectError {
            message: message.into(),
        }
    }
}

/// An invariant was violated by a well-formed tree; indicates a bug rather
/// than bad input.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalError {
    pub message: String,
}

impl InternalError {
    pub fn new(message: impl Into<String>) -> InternalError {
        InternalError {
            message: message.into(),
        }
    }
}

impl From<ParseError> for TranslateError {
    fn from(e: ParseError) -> TranslateError {
        TranslateError::Parse(e)
    }
}

impl From<DialectError> for TranslateError {
    fn from(e: DialectError) -> TranslateError {
        TranslateError::Dialect(e)
    }
}

impl From<InternalError> for TranslateError {
    fn from(e: InternalError) -> TranslateError {
        TranslateError::Internal(e)
    }
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TranslateError::Parse(e) => write!(f, "parse error at offset {}: {}", e.offset, e.message),
            TranslateError::Dialect(e) => write!(f, "dialect error: {}", e.message),
            TranslateError::Internal(e) => write!(f, "internal error: {}", e.message),
        }
    }
}

impl Error for TranslateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_parse_error() {
        let e: TranslateError = ParseError::new(4, "unexpected end of input").into();
        assert_eq!(e.to_string(), "parse error at offset 4: unexpected end of input");
    }
}
