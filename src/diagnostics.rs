//! Coded, leveled diagnostics forwarded to the host log channel.
//!
//! Every message is prefixed with the product tag and a numeric code so log
//! scrapers can group agent warnings without parsing free text. The host
//! channel is the `log` facade; the embedding process decides where it goes.
//!
//! Reporting is fire-and-forget. Nothing in this crate branches on whether a
//! report was delivered.

use crate::utils::config::PRODUCT_TAG;
use std::fmt::{self, Write};

/// Severity of a diagnostic, mapped onto `log` levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Notice,
    Debug,
}

impl Severity {
    pub fn level(self) -> log::Level {
        match self {
            Severity::Error => log::Level::Error,
            Severity::Warning => log::Level::Warn,
            Severity::Notice => log::Level::Info,
            Severity::Debug => log::Level::Debug,
        }
    }
}

/// Numeric code attached to every diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Configuration and storage setup (directories, config files)
    Config,
    /// Plugin discovery and loading
    Plugin,
    /// Log writing and rollover
    Log,
    /// Anything raised while the interpreter is running a request
    Runtime,
    Other(u32),
}

impl ErrorCode {
    pub fn code(self) -> u32 {
        match self {
            ErrorCode::Config => 20001,
            ErrorCode::Plugin => 20002,
            ErrorCode::Log => 20003,
            ErrorCode::Runtime => 20004,
            ErrorCode::Other(code) => code,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Build the tagged message without sending it anywhere
///
/// **Public** - also used by callers that persist diagnostics themselves
///
/// # Example
/// ```
/// use rasp_diag::diagnostics::{format_diagnostic, ErrorCode};
/// let msg = format_diagnostic(ErrorCode::Config, format_args!("bad value {}", 3));
/// assert_eq!(msg, "[RASP] 20001 bad value 3");
/// ```
pub fn format_diagnostic(code: ErrorCode, args: fmt::Arguments<'_>) -> String {
    let mut message = format!("{} {} ", PRODUCT_TAG, code);
    // A failing Display impl leaves whatever was written so far.
    let _ = message.write_fmt(args);
    message
}

/// Format and forward a diagnostic to the host log channel
///
/// **Public** - main entry point for agent warnings
///
/// # Arguments
/// * `severity` - Level the message is logged at
/// * `code` - Numeric diagnostic code
/// * `args` - Pre-substituted message, usually from `format_args!`
///
/// # Returns
/// The message that was forwarded
pub fn report(severity: Severity, code: ErrorCode, args: fmt::Arguments<'_>) -> String {
    let message = format_diagnostic(code, args);
    log::log!(target: "rasp", severity.level(), "{}", message);
    message
}

/// Shorthand for `report(severity, code, format_args!(...))`
#[macro_export]
macro_rules! diagnostic {
    ($severity:expr, $code:expr, $($arg:tt)+) => {
        $crate::diagnostics::report($severity, $code, format_args!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn test_format_has_tag_and_code() {
        let msg = format_diagnostic(ErrorCode::Plugin, format_args!("{} plugins", 2));
        assert_eq!(msg, "[RASP] 20002 2 plugins");
    }

    #[test]
    fn test_custom_code() {
        let msg = report(Severity::Debug, ErrorCode::Other(42), format_args!("x"));
        assert_eq!(msg, "[RASP] 42 x");
    }

    #[test]
    fn test_failing_display_keeps_partial_message() {
        let msg = format_diagnostic(ErrorCode::Log, format_args!("before {} after", Broken));
        assert!(msg.starts_with("[RASP] 20003 before "));
    }

    #[test]
    fn test_macro_forwards() {
        let msg = crate::diagnostic!(Severity::Warning, ErrorCode::Runtime, "hook {}", "fopen");
        assert_eq!(msg, "[RASP] 20004 hook fopen");
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(Severity::Warning.level(), log::Level::Warn);
        assert_eq!(Severity::Notice.level(), log::Level::Info);
    }
}
