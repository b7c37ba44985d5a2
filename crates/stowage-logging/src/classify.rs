//! Deciding which errors reach the log, and how their cause reads.

use std::error::Error;

use stowage_errors::{root_cause, ObjectError};

/// True when the root cause of `err` is an expected object layer outcome
/// that must not be logged.
pub fn is_ignorable(err: &(dyn Error + 'static)) -> bool {
    root_cause(err)
        .downcast_ref::<ObjectError>()
        .is_some_and(ObjectError::is_ignorable)
}

/// Root cause text with each word capitalized.
pub fn cause_text(err: &(dyn Error + 'static)) -> String {
    title_case(&root_cause(err).to_string())
}

/// Uppercase the first letter of every word. Letters already inside a word
/// are left untouched.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = is_word_separator(c);
    }
    out
}

fn is_word_separator(c: char) -> bool {
    if c.is_ascii() {
        !(c.is_ascii_alphanumeric() || c == '_')
    } else {
        c.is_whitespace()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_errors::{ResultExt, Wrapped};

    #[test]
    fn test_every_allow_listed_variant_is_ignorable() {
        let errors = vec![
            ObjectError::BucketNotFound { bucket: "b".into() },
            ObjectError::BucketNotEmpty { bucket: "b".into() },
            ObjectError::BucketExists { bucket: "b".into() },
            ObjectError::ObjectNotFound {
                bucket: "b".into(),
                object: "o".into(),
            },
            ObjectError::ObjectExistsAsDirectory {
                bucket: "b".into(),
                object: "o".into(),
            },
            ObjectError::BucketPolicyNotFound { bucket: "b".into() },
            ObjectError::InvalidUploadId {
                upload_id: "u".into(),
            },
        ];
        for err in &errors {
            assert!(is_ignorable(err), "{err}");
        }
    }

    #[test]
    fn test_wrapped_ignorable_is_still_ignorable() {
        let err = Wrapped::new(
            "stat object",
            ObjectError::ObjectNotFound {
                bucket: "b".into(),
                object: "o".into(),
            },
        );
        assert!(is_ignorable(&err));
    }

    #[test]
    fn test_foreign_errors_are_not_ignorable() {
        let err = std::io::Error::other("disk on fire");
        assert!(!is_ignorable(&err));

        let res: Result<(), _> = Err(ObjectError::StorageFull);
        let err = res.wrap_err("writing part").unwrap_err();
        assert!(!is_ignorable(&err));
    }

    #[test]
    fn test_cause_text_uses_root_cause() {
        let err = Wrapped::new("opening data directory", ObjectError::StorageFull);
        assert_eq!(
            cause_text(&err),
            "Storage Reached Its Minimum Free Disk Threshold."
        );
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("disk full"), "Disk Full");
        assert_eq!(title_case("no such file (os error 2)"), "No Such File (Os Error 2)");
        assert_eq!(title_case("don't panic"), "Don'T Panic");
        assert_eq!(title_case("snake_case stays"), "Snake_case Stays");
        assert_eq!(title_case("already Upper"), "Already Upper");
        assert_eq!(title_case("été chaud"), "Été Chaud");
        assert_eq!(title_case(""), "");
    }
}
