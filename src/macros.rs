//! Macros to reduce boilerplate in the codebase

/// Macro to generate Display and FromStr implementations for closed enums
///
/// Parsing is case-insensitive; anything outside the listed strings is
/// rejected with the given error constructor rather than mapped to a
/// fallback variant.
///
/// # Usage
///
/// ```rust,ignore
/// enum_display_fromstr!(
///     IssueCategory,
///     CivicError::invalid_category,
///     {
///         Road => "road",
///         Water => "water",
///     }
/// );
/// ```
#[macro_export]
macro_rules! enum_display_fromstr {
    (
        $enum_name:ident,
        $error_variant:path,
        { $($variant:ident => $str:literal),+ $(,)? }
    ) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $($enum_name::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::error::CivicError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok($enum_name::$variant),)+
                    _ => Err($error_variant(s.to_string())),
                }
            }
        }
    };
}

#[cfg(test)]
mod test {
    use crate::error::CivicError;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestEnum {
        A,
        InFlight,
    }

    enum_display_fromstr!(TestEnum, CivicError::invalid_status, {
        A => "a",
        InFlight => "in-flight",
    });

    #[test]
    fn test_display() {
        assert_eq!(TestEnum::A.to_string(), "a");
        assert_eq!(TestEnum::InFlight.to_string(), "in-flight");
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!("IN-FLIGHT".parse::<TestEnum>().unwrap(), TestEnum::InFlight);
        assert_eq!(" a ".parse::<TestEnum>().unwrap(), TestEnum::A);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "b".parse::<TestEnum>().unwrap_err();
        assert!(matches!(err, CivicError::InvalidStatus(s) if s == "b"));
    }
}
