use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use crate::conversion::{Category, category_of, fold_conversion, is_datetime_suffix};
use crate::legality::{Policy, validate_specifier};
use crate::scanner::{RawSpecifier, Scanner, Segment};
use crate::{Flags, FormatError, FormatResult};

/// How a specifier selects the argument it formats.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexMode {
    /// `%N$...`, 1-based.
    Explicit(usize),
    /// `%<...`, reuses the argument of the previous specifier.
    Relative,
    /// Takes the next position of the implicit counter.
    Ordinal,
    /// `%%` and `%n` bind no argument.
    None,
}

/// A decoded format specifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Specifier {
    pub index: IndexMode,
    pub flags: Flags,
    pub width: Option<usize>,
    pub precision: Option<usize>,
    pub datetime: bool,
    /// Lower case code for ordinary conversions; the verbatim suffix for
    /// datetime conversions.
    pub conversion: char,
    pub category: Category,
}

impl Specifier {
    /// Decodes a raw match without applying the legality rules.
    pub fn decode(raw: &RawSpecifier<'_>) -> FormatResult<Self> {
        let mut flags = Flags::parse(raw.flags)?;
        let width = parse_width(raw.width)?;
        let precision = parse_precision(raw.precision)?;

        let (conversion, category) = match raw.datetime {
            Some(marker) => {
                if !is_datetime_suffix(raw.conversion) {
                    let mut code = String::new();
                    code.push(marker);
                    code.push(raw.conversion);
                    return Err(FormatError::UnknownConversion(code));
                }
                if marker == 'T' {
                    flags.insert(Flags::UPPERCASE);
                }
                (raw.conversion, Category::DateTime)
            }
            None => {
                let (code, uppercase) = fold_conversion(raw.conversion)
                    .ok_or_else(|| FormatError::UnknownConversion(raw.conversion.to_string()))?;
                if uppercase {
                    flags.insert(Flags::UPPERCASE);
                }
                let category = category_of(code)
                    .ok_or_else(|| FormatError::UnknownConversion(code.to_string()))?;
                (code, category)
            }
        };

        // `<` overrides a written index, which must still be well formed
        let explicit = raw.index.map(parse_index).transpose()?;
        let index = if !category.binds_argument() {
            IndexMode::None
        } else if flags.contains(Flags::PREVIOUS) {
            IndexMode::Relative
        } else if let Some(position) = explicit {
            IndexMode::Explicit(position)
        } else {
            IndexMode::Ordinal
        };

        Ok(Self {
            index,
            flags,
            width,
            precision,
            datetime: raw.datetime.is_some(),
            conversion,
            category,
        })
    }

    pub fn is_uppercase(&self) -> bool {
        self.flags.contains(Flags::UPPERCASE)
    }

    /// Conversion character as written, with case restored.
    pub fn conversion_char(&self) -> char {
        if !self.datetime && self.is_uppercase() {
            self.conversion.to_ascii_uppercase()
        } else {
            self.conversion
        }
    }
}

fn parse_index(digits: &str) -> FormatResult<usize> {
    match digits.parse::<usize>() {
        Ok(0) | Err(_) => Err(FormatError::IllegalIndex(digits.to_string())),
        Ok(index) => Ok(index),
    }
}

fn parse_width(digits: Option<&str>) -> FormatResult<Option<usize>> {
    digits
        .map(|digits| {
            digits
                .parse::<usize>()
                .map_err(|_| FormatError::IllegalWidth(digits.to_string()))
        })
        .transpose()
}

fn parse_precision(digits: Option<&str>) -> FormatResult<Option<usize>> {
    digits
        .map(|digits| {
            digits
                .parse::<usize>()
                .map_err(|_| FormatError::IllegalPrecision(digits.to_string()))
        })
        .transpose()
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("%")?;
        if let IndexMode::Explicit(index) = self.index {
            write!(f, "{index}$")?;
        }
        write!(f, "{}", self.flags)?;
        if let Some(width) = self.width {
            write!(f, "{width}")?;
        }
        if let Some(precision) = self.precision {
            write!(f, ".{precision}")?;
        }
        if self.datetime {
            f.write_str(if self.is_uppercase() { "T" } else { "t" })?;
        }
        write!(f, "{}", self.conversion_char())
    }
}

/// Parses text holding exactly one specifier, applying the default policy.
impl FromStr for Specifier {
    type Err = FormatError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut scanner = Scanner::new(text);
        let raw = match scanner.next() {
            Some(Ok(Segment::Specifier(raw))) => raw,
            Some(Err(err)) => return Err(err),
            Some(Ok(Segment::Literal(literal))) => {
                let c = literal.chars().next().unwrap_or('%');
                return Err(FormatError::InvalidSpecifierSyntax(c));
            }
            None => return Err(FormatError::InvalidSpecifierSyntax('%')),
        };
        if let Some(trailing) = scanner.next() {
            let c = match trailing? {
                Segment::Literal(literal) => literal.chars().next().unwrap_or('%'),
                Segment::Specifier(_) => '%',
            };
            return Err(FormatError::InvalidSpecifierSyntax(c));
        }
        let specifier = Specifier::decode(&raw)?;
        validate_specifier(&specifier, &Policy::default())?;
        Ok(specifier)
    }
}
