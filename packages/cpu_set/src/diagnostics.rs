use tracing::{error, warn};

use crate::{Error, Item};

/// Describes where a CPU list came from, so problems with it can be logged in a form a human can
/// trace back to the source.
///
/// Passing a context to [`parse_with_context()`][crate::parse_with_context] or
/// [`extend_with_context()`][crate::extend_with_context] does not change how the list is parsed.
/// It only enables logging: inverted ranges are logged as warnings and hard failures as errors,
/// with the context attached as fields of the `tracing` event.
///
/// # Example
///
/// ```
/// use cpu_set::ParseContext;
///
/// let context = ParseContext::new()
///     .with_unit("worker.service")
///     .with_filename("/etc/worker.conf")
///     .with_line(12)
///     .with_field("CPUAffinity");
///
/// // Logs a warning because the range is inverted, but parsing succeeds.
/// let set = cpu_set::parse_with_context("5-3", &context).unwrap();
/// assert!(set.is_empty());
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ParseContext {
    unit: Option<String>,
    filename: Option<String>,
    line: Option<u32>,
    field: Option<String>,
}

impl ParseContext {
    /// Creates a context with no location details.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the subsystem or unit that owns the setting.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Names the file the CPU list was read from.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the line number the CPU list was read from.
    #[must_use]
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Names the setting whose value is the CPU list.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// The subsystem or unit that owns the setting, if known.
    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// The file the CPU list was read from, if known.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// The line the CPU list was read from, if known.
    #[must_use]
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// The setting whose value is the CPU list, if known.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub(crate) fn warn_inverted_range(&self, token: &str, lower: Item, upper: Item) {
        warn!(
            unit = self.unit(),
            filename = self.filename(),
            line = self.line,
            field = self.field(),
            "range '{token}' is invalid, {lower} > {upper}, ignoring"
        );
    }

    pub(crate) fn report_failure(&self, text: &str, failure: &Error) {
        error!(
            unit = self.unit(),
            filename = self.filename(),
            line = self.line,
            field = self.field(),
            error = %failure,
            "invalid CPU list '{text}'"
        );
    }
}
