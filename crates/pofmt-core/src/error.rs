use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Why a template, or a pair of templates, failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A `%` in literal text that does not start a specifier. Carries the
    /// character after the `%`, or `%` when the template ends there.
    InvalidSpecifierSyntax(char),
    UnknownConversion(String),
    UnknownFlag(char),
    DuplicateFlag(char),
    IllegalIndex(String),
    IllegalWidth(String),
    IllegalPrecision(String),
    FlagConversionMismatch { flag: char, conversion: char },
    IllegalFlagCombination(String),
    MissingWidth(String),
    MissingPreviousArgument(String),
    SpecifierSetMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
    ExactMismatch,
}

pub type FormatResult<T> = Result<T, FormatError>;

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::InvalidSpecifierSyntax(c) => {
                write!(f, "invalid format specifier near '{c}'")
            }
            FormatError::UnknownConversion(conversion) => {
                write!(f, "unknown conversion '{conversion}'")
            }
            FormatError::UnknownFlag(flag) => write!(f, "unknown flag '{flag}'"),
            FormatError::DuplicateFlag(flag) => write!(f, "duplicate flag '{flag}'"),
            FormatError::IllegalIndex(index) => write!(f, "illegal argument index {index}"),
            FormatError::IllegalWidth(width) => write!(f, "illegal width {width}"),
            FormatError::IllegalPrecision(precision) => {
                write!(f, "illegal precision {precision}")
            }
            FormatError::FlagConversionMismatch { flag, conversion } => {
                write!(f, "flag '{flag}' is not allowed with conversion '{conversion}'")
            }
            FormatError::IllegalFlagCombination(flags) => {
                write!(f, "illegal flag combination '{flags}'")
            }
            FormatError::MissingWidth(specifier) => {
                write!(f, "missing width in '{specifier}'")
            }
            FormatError::MissingPreviousArgument(specifier) => {
                write!(f, "'{specifier}' refers to a previous argument but none exists")
            }
            FormatError::SpecifierSetMismatch {
                missing,
                unexpected,
            } => {
                write!(
                    f,
                    "format lists do not match: missing [{}], unexpected [{}]",
                    missing.join(", "),
                    unexpected.join(", ")
                )
            }
            FormatError::ExactMismatch => f.write_str("translation does not match the source text"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FormatError {}
