//! Subscriber setup and secret masking for log output.
//!
//! Every line goes through [`mask_sensitive`] before reaching the terminal.
//! Lines emitted while a request is handled sit inside its `correlation`
//! span, which carries the `correlation_id` field.

use std::borrow::Cow;
use std::io;
use std::sync::LazyLock;

use regex::Regex;
use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, Layer, fmt::MakeWriter, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "workout_log=info,tower_http=info";

static MASKS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (
            r#"(?i)"(password|token|api_key|secret)"\s*:\s*"[^"]*""#,
            r#""${1}":"***""#,
        ),
        (
            r#"(?i)\b(password|token|api_key|secret)=("[^"]*"|[^\s,}]+)"#,
            "${1}=***",
        ),
        (
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            "***@***.***",
        ),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("valid regex"), replacement))
    .collect()
});

/// Replaces secret-looking values and e-mail addresses with placeholders.
pub fn mask_sensitive(line: &str) -> Cow<'_, str> {
    let mut masked = Cow::Borrowed(line);
    for (pattern, replacement) in MASKS.iter() {
        if pattern.is_match(&masked) {
            masked = Cow::Owned(pattern.replace_all(&masked, *replacement).into_owned());
        }
    }
    masked
}

/// `MakeWriter` that masks every formatted event before handing it on.
#[derive(Debug, Clone)]
pub struct MaskingMakeWriter<M> {
    inner: M,
}

impl<M> MaskingMakeWriter<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<'a, M> MakeWriter<'a> for MaskingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = MaskingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        MaskingWriter {
            inner: self.inner.make_writer(),
        }
    }
}

/// Writer produced by [`MaskingMakeWriter`].
#[derive(Debug)]
pub struct MaskingWriter<W> {
    inner: W,
}

impl<W: io::Write> io::Write for MaskingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // The fmt layer hands over one whole event per write.
        let text = String::from_utf8_lossy(buf);
        self.inner.write_all(mask_sensitive(&text).as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Formatting layer writing masked lines to `writer`.
///
/// Colour codes are off: they would split `key=value` pairs apart and
/// defeat the masks.
pub fn masked_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(MaskingMakeWriter::new(writer))
}

/// Installs the global subscriber. `RUST_LOG` overrides [`DEFAULT_FILTER`].
pub fn init() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(masked_layer(io::stdout))
        .init();
}
