use alloc::string::ToString;

use crate::conversion::Category;
use crate::specifier::Specifier;
use crate::{Flags, FormatError, FormatResult};

/// Knobs for rules that depend on how values are rendered.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Policy {
    /// Accept `#` on `%s`, for renderers with custom formattable values.
    pub formattable_strings: bool,
}

const NUMERIC_ONLY: [Flags; 5] = [
    Flags::PLUS,
    Flags::LEADING_SPACE,
    Flags::ZERO_PAD,
    Flags::GROUP,
    Flags::PARENTHESES,
];

const NOT_FOR_TEXTUAL: [Flags; 6] = [
    Flags::ALTERNATE,
    Flags::PLUS,
    Flags::LEADING_SPACE,
    Flags::ZERO_PAD,
    Flags::GROUP,
    Flags::PARENTHESES,
];

/// Applies the flag, width and precision rules of the specifier's category.
pub fn validate_specifier(spec: &Specifier, policy: &Policy) -> FormatResult<()> {
    match spec.category {
        Category::General => check_general(spec, policy),
        Category::Character => check_character(spec),
        Category::Integer => check_integer(spec),
        Category::Float => check_float(spec),
        Category::DateTime => check_datetime(spec),
        Category::Percent => check_percent(spec),
        Category::LineSeparator => check_line_separator(spec),
    }
}

fn check_general(spec: &Specifier, policy: &Policy) -> FormatResult<()> {
    let alternate_allowed = spec.conversion == 's' && policy.formattable_strings;
    if spec.flags.contains(Flags::ALTERNATE) && !alternate_allowed {
        return Err(mismatch(spec, Flags::ALTERNATE));
    }
    require_width_for(spec, Flags::LEFT_JUSTIFY)?;
    reject_flags(spec, &NUMERIC_ONLY)
}

fn check_character(spec: &Specifier) -> FormatResult<()> {
    reject_precision(spec)?;
    reject_flags(spec, &NOT_FOR_TEXTUAL)?;
    require_width_for(spec, Flags::LEFT_JUSTIFY)
}

fn check_integer(spec: &Specifier) -> FormatResult<()> {
    check_numeric(spec)?;
    reject_precision(spec)?;
    match spec.conversion {
        'd' => reject_flags(spec, &[Flags::ALTERNATE]),
        _ => reject_flags(
            spec,
            &[
                Flags::GROUP,
                Flags::PARENTHESES,
                Flags::PLUS,
                Flags::LEADING_SPACE,
            ],
        ),
    }
}

fn check_float(spec: &Specifier) -> FormatResult<()> {
    check_numeric(spec)?;
    match spec.conversion {
        'a' => reject_flags(spec, &[Flags::PARENTHESES, Flags::GROUP]),
        'e' => reject_flags(spec, &[Flags::GROUP]),
        'g' => reject_flags(spec, &[Flags::ALTERNATE]),
        _ => Ok(()),
    }
}

fn check_numeric(spec: &Specifier) -> FormatResult<()> {
    if spec.width.is_none()
        && (spec.flags.contains(Flags::LEFT_JUSTIFY) || spec.flags.contains(Flags::ZERO_PAD))
    {
        return Err(FormatError::MissingWidth(spec.to_string()));
    }
    let signs = spec.flags.contains(Flags::PLUS) && spec.flags.contains(Flags::LEADING_SPACE);
    let padding = spec.flags.contains(Flags::LEFT_JUSTIFY) && spec.flags.contains(Flags::ZERO_PAD);
    if signs || padding {
        return Err(FormatError::IllegalFlagCombination(spec.flags.to_string()));
    }
    Ok(())
}

fn check_datetime(spec: &Specifier) -> FormatResult<()> {
    reject_precision(spec)?;
    reject_flags(spec, &NOT_FOR_TEXTUAL)?;
    require_width_for(spec, Flags::LEFT_JUSTIFY)
}

fn check_percent(spec: &Specifier) -> FormatResult<()> {
    reject_precision(spec)?;
    if !spec.flags.without(Flags::LEFT_JUSTIFY).is_empty() {
        return Err(FormatError::IllegalFlagCombination(spec.flags.to_string()));
    }
    require_width_for(spec, Flags::LEFT_JUSTIFY)
}

fn check_line_separator(spec: &Specifier) -> FormatResult<()> {
    reject_precision(spec)?;
    if let Some(width) = spec.width {
        return Err(FormatError::IllegalWidth(width.to_string()));
    }
    if !spec.flags.is_empty() {
        return Err(FormatError::IllegalFlagCombination(spec.flags.to_string()));
    }
    Ok(())
}

fn reject_precision(spec: &Specifier) -> FormatResult<()> {
    match spec.precision {
        Some(precision) => Err(FormatError::IllegalPrecision(precision.to_string())),
        None => Ok(()),
    }
}

fn reject_flags(spec: &Specifier, forbidden: &[Flags]) -> FormatResult<()> {
    match forbidden.iter().find(|flag| spec.flags.contains(**flag)) {
        Some(flag) => Err(mismatch(spec, *flag)),
        None => Ok(()),
    }
}

fn require_width_for(spec: &Specifier, flag: Flags) -> FormatResult<()> {
    if spec.width.is_none() && spec.flags.contains(flag) {
        return Err(FormatError::MissingWidth(spec.to_string()));
    }
    Ok(())
}

fn mismatch(spec: &Specifier, flag: Flags) -> FormatError {
    FormatError::FlagConversionMismatch {
        flag: flag.symbol().unwrap_or('?'),
        conversion: spec.conversion_char(),
    }
}
