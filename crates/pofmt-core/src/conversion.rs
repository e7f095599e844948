/// Closed classification of a conversion, each with its own legality rules.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// `b`, `h`, `s`
    General,
    /// `c`
    Character,
    /// `d`, `o`, `x`
    Integer,
    /// `e`, `f`, `g`, `a`
    Float,
    /// `t`/`T` followed by a suffix
    DateTime,
    /// `%%`
    Percent,
    /// `%n`
    LineSeparator,
}

impl Category {
    /// Whether specifiers of this category consume an argument.
    pub const fn binds_argument(self) -> bool {
        !matches!(self, Category::Percent | Category::LineSeparator)
    }
}

/// Category of a case-folded, non-datetime conversion code.
pub const fn category_of(conversion: char) -> Option<Category> {
    match conversion {
        'b' | 'h' | 's' => Some(Category::General),
        'c' => Some(Category::Character),
        'd' | 'o' | 'x' => Some(Category::Integer),
        'e' | 'f' | 'g' | 'a' => Some(Category::Float),
        '%' => Some(Category::Percent),
        'n' => Some(Category::LineSeparator),
        _ => None,
    }
}

/// Folds a raw conversion character to its canonical code.
///
/// Returns the lower case code and whether the input was upper case, or
/// `None` when the character is not a conversion. Only conversions with an
/// upper case form are accepted in upper case.
pub const fn fold_conversion(raw: char) -> Option<(char, bool)> {
    match raw {
        'B' | 'H' | 'S' | 'C' | 'X' | 'E' | 'G' | 'A' => {
            Some((raw.to_ascii_lowercase(), true))
        }
        _ => match category_of(raw) {
            Some(_) => Some((raw, false)),
            None => None,
        },
    }
}

/// Suffixes accepted after a `t`/`T` marker. Case sensitive.
pub const fn is_datetime_suffix(suffix: char) -> bool {
    matches!(
        suffix,
        // time
        'H' | 'I' | 'k' | 'l' | 'M' | 'S' | 'L' | 'N' | 'p' | 'z' | 'Z' | 's' | 'Q'
        // date
        | 'B' | 'b' | 'h' | 'A' | 'a' | 'C' | 'Y' | 'y' | 'j' | 'm' | 'd' | 'e'
        // composites
        | 'R' | 'T' | 'r' | 'D' | 'F' | 'c'
    )
}
