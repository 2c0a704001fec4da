use core::fmt;
use core::fmt::Formatter;
use parse_js::error::SyntaxError;
use std::error::Error;
use std::fmt::Display;

#[derive(Clone, Debug)]
pub enum CjsError {
  // Anything else (unexpected shapes, unresolvable names) degrades silently
  // instead of erroring, so a parse failure is the only failure.
  Parse { path: String, error: SyntaxError },
}

impl Display for CjsError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      CjsError::Parse { path, error } => write!(f, "failed to parse {}: {}", path, error),
    }
  }
}

impl Error for CjsError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      CjsError::Parse { error, .. } => Some(error),
    }
  }
}
