//! Localized message formats for server error numbers.
//!
//! A message format contains `%1`..`%N` placeholders that are substituted
//! with the argument strings carried in the server's exception payload.
//! The catalog language is chosen once per process from the environment
//! locale; Japanese environments get the Japanese catalog, everything else
//! falls back to English.

mod english;
mod japanese;

use std::collections::HashMap;

lazy_static! {
    static ref FORMAT_MAP: HashMap<i32, &'static str> = {
        let table = if locale_is_japanese() {
            japanese::TABLE
        } else {
            english::TABLE
        };
        table.iter().copied().collect()
    };
}

fn locale_is_japanese() -> bool {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty())
        .is_some_and(|value| value.starts_with("ja"))
}

/// Builds the localized message for an error number.
///
/// Unknown numbers produce a generic text carrying the raw number and the
/// arguments, so that nothing the server reports is swallowed.
pub fn make_error_message(errno: i32, arguments: &[String]) -> String {
    let Some(format) = FORMAT_MAP.get(&errno) else {
        return format!("Unknown error (code={errno}, arguments={arguments:?})");
    };

    let mut buf = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            buf.push(c);
            continue;
        }
        let mut num = 0_usize;
        while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
            num = num * 10 + d as usize;
            chars.next();
        }
        match arguments.get(num.wrapping_sub(1)) {
            Some(arg) => buf.push_str(arg),
            None => buf.push('%'),
        }
    }
    buf
}

#[cfg(test)]
mod tests {
    use crate::error_code;

    #[test]
    fn formats_without_arguments() {
        assert_eq!(
            super::make_error_message(error_code::CONNECTION_NOT_EXIST, &[]),
            "Connection exception - connection does not exist."
        );
    }

    #[test]
    fn formats_with_one_argument() {
        assert_eq!(
            super::make_error_message(error_code::CLIENT_NOT_EXIST, &["1".to_string()]),
            "Connection exception - client(ID=1) does not exist."
        );
    }

    #[test]
    fn formats_with_two_arguments() {
        assert_eq!(
            super::make_error_message(
                error_code::DYNAMIC_PARAMETER_NOT_MATCH,
                &["1".to_string(), "2".to_string()]
            ),
            "The number of parameter values(1) does not match parameters(2)."
        );
    }

    #[test]
    fn unknown_code_is_not_swallowed() {
        let message = super::make_error_message(987_654, &["x".to_string()]);
        assert!(message.contains("987654"));
        assert!(message.contains('x'));
    }
}
