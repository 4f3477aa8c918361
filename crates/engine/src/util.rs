//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidInput(format!("invalid {label} id")))
}

/// Parse an optional stored UUID.
pub(crate) fn parse_opt_uuid(value: Option<&str>, label: &str) -> ResultEngine<Option<Uuid>> {
    value.map(|v| parse_uuid(v, label)).transpose()
}

/// Amounts entering a workflow must be strictly positive.
pub(crate) fn require_positive(amount: MoneyCents, label: &str) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::field(label, "must be greater than zero"));
    }
    Ok(())
}

/// Trim a mandatory text field.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::field(label, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional free-text field, returning an empty string when absent.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

/// "No comment" placeholder used in review notifications.
pub(crate) fn comment_or_default(comment: &str) -> &str {
    if comment.is_empty() {
        "No comment"
    } else {
        comment
    }
}

/// Generates `as_str`/`TryFrom<&str>` for a status-like enum stored as text.
macro_rules! impl_text_enum {
    ($ty:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl TryFrom<&str> for $ty {
            type Error = $crate::EngineError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    other => Err($crate::EngineError::InvalidInput(format!(
                        concat!("invalid ", $label, ": {}"),
                        other
                    ))),
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use impl_text_enum;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_amounts_only() {
        assert!(require_positive(MoneyCents::new(1), "amount").is_ok());
        assert_eq!(
            require_positive(MoneyCents::ZERO, "amount"),
            Err(EngineError::field("amount", "must be greater than zero"))
        );
    }

    #[test]
    fn required_text_is_trimmed() {
        assert_eq!(normalize_required_text("  Fuel ", "title").unwrap(), "Fuel");
        assert!(normalize_required_text("   ", "title").is_err());
        assert_eq!(normalize_optional_text(None), "");
    }
}
