use std::error::Error;
use thiserror::Error;

pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// An error annotated with what the caller was doing when it happened.
#[derive(Error, Debug)]
#[error("{context}")]
pub struct Wrapped {
    context: String,
    #[source]
    source: BoxError,
}

impl Wrapped {
    pub fn new(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }
}

pub trait ResultExt<T> {
    /// Wrap the error, if any, with a context message.
    fn wrap_err(self, context: impl Into<String>) -> Result<T, Wrapped>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn wrap_err(self, context: impl Into<String>) -> Result<T, Wrapped> {
        self.map_err(|e| Wrapped::new(context, e))
    }
}

/// Follow `source()` until the innermost error is reached.
pub fn root_cause<'a>(err: &'a (dyn Error + 'static)) -> &'a (dyn Error + 'static) {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current
}
