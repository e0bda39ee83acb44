//! Error Context
//!
//! Wraps errors from figment, toml and the filesystem into the broker's
//! domain `Error`, keeping the original error as the source. None of these
//! produce provider errors, so nothing wrapped here is ever retried or
//! triggers fallback.
//!
//! | Method | Variant |
//! |--------|---------|
//! | `context` / `with_context` | `Error::Infrastructure` |
//! | `io_context` | `Error::Io` |
//! | `config_context` | `Error::Configuration` |

use orb_domain::error::{Error, Result};
use std::fmt::Display;

type Source = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone, Copy)]
enum Layer {
    Infrastructure,
    Io,
    Configuration,
}

impl Layer {
    fn wrap(self, message: String, source: Source) -> Error {
        let source = Some(source);
        match self {
            Self::Infrastructure => Error::Infrastructure { message, source },
            Self::Io => Error::Io { message, source },
            Self::Configuration => Error::Configuration { message, source },
        }
    }
}

/// Attach a description to a foreign error
///
/// ```ignore
/// let raw = toml::to_string_pretty(&config).context("Failed to serialize config")?;
/// std::fs::write(&path, raw).io_context(format!("Failed to write {}", path.display()))?;
/// ```
pub trait ErrorContext<T>: Sized {
    /// Wrap as an infrastructure error
    fn context(self, context: impl Display) -> Result<T>;

    /// Like [`ErrorContext::context`], building the description only on failure
    fn with_context<C: Display>(self, f: impl FnOnce() -> C) -> Result<T>;

    /// Wrap as an I/O error
    fn io_context(self, context: impl Display) -> Result<T>;

    /// Wrap as a configuration error
    fn config_context(self, context: impl Display) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Display) -> Result<T> {
        attach(self, Layer::Infrastructure, || context)
    }

    fn with_context<C: Display>(self, f: impl FnOnce() -> C) -> Result<T> {
        attach(self, Layer::Infrastructure, f)
    }

    fn io_context(self, context: impl Display) -> Result<T> {
        attach(self, Layer::Io, || context)
    }

    fn config_context(self, context: impl Display) -> Result<T> {
        attach(self, Layer::Configuration, || context)
    }
}

fn attach<T, E, C>(
    result: std::result::Result<T, E>,
    layer: Layer,
    describe: impl FnOnce() -> C,
) -> Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
    C: Display,
{
    result.map_err(|err| {
        let message = format!("{}: {err}", describe());
        layer.wrap(message, Box::new(err))
    })
}
