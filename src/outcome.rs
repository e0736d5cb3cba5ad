//! Error-or-value envelope used at the tool handler boundary.
//!
//! Pipelines return `Result<T, E>` with a typed `E`. `settle` runs one on its own
//! task so that a panic comes back as [`Failure::Unexpected`] instead of taking the
//! server down with it.

use std::any::Any;
use std::fmt;
use std::future::Future;

#[derive(Debug)]
pub enum Failure<E> {
    /// One of the typed errors the pipeline can produce.
    Known(E),
    /// Anything else (panic or task cancellation), reduced to its message.
    Unexpected(String),
}

impl<E: fmt::Display> fmt::Display for Failure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(e) => write!(f, "{e}"),
            Self::Unexpected(msg) => write!(f, "{msg}"),
        }
    }
}

pub type Outcome<T, E> = Result<T, Failure<E>>;

pub async fn settle<F, T, E>(fut: F) -> Outcome<T, E>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    match tokio::spawn(fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(Failure::Known(e)),
        Err(join) if join.is_panic() => Err(Failure::Unexpected(panic_message(join.into_panic()))),
        Err(join) => Err(Failure::Unexpected(join.to_string())),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown error".into()
    }
}
