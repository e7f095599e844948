use core::fmt;

use crate::{FormatError, FormatResult};

/// Fixed-size set of specifier flags.
///
/// `UPPERCASE` is never written by template authors; it records that the
/// conversion (or the `T` datetime marker) was given in upper case.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Flags(u16);

impl Flags {
    pub const NONE: Flags = Flags(0);
    pub const LEFT_JUSTIFY: Flags = Flags(1 << 0);
    pub const UPPERCASE: Flags = Flags(1 << 1);
    pub const ALTERNATE: Flags = Flags(1 << 2);
    pub const PLUS: Flags = Flags(1 << 3);
    pub const LEADING_SPACE: Flags = Flags(1 << 4);
    pub const ZERO_PAD: Flags = Flags(1 << 5);
    pub const GROUP: Flags = Flags(1 << 6);
    pub const PARENTHESES: Flags = Flags(1 << 7);
    pub const PREVIOUS: Flags = Flags(1 << 8);

    const SYMBOLS: [(Flags, char); 8] = [
        (Flags::LEFT_JUSTIFY, '-'),
        (Flags::ALTERNATE, '#'),
        (Flags::PLUS, '+'),
        (Flags::LEADING_SPACE, ' '),
        (Flags::ZERO_PAD, '0'),
        (Flags::GROUP, ','),
        (Flags::PARENTHESES, '('),
        (Flags::PREVIOUS, '<'),
    ];

    /// Parses a run of flag characters, rejecting repeats.
    pub fn parse(input: &str) -> FormatResult<Self> {
        let mut flags = Flags::NONE;
        for c in input.chars() {
            let flag = Flags::from_char(c)?;
            if flags.contains(flag) {
                return Err(FormatError::DuplicateFlag(c));
            }
            flags.insert(flag);
        }
        Ok(flags)
    }

    pub fn from_char(c: char) -> FormatResult<Self> {
        Flags::SYMBOLS
            .iter()
            .find(|(_, symbol)| *symbol == c)
            .map(|(flag, _)| *flag)
            .ok_or(FormatError::UnknownFlag(c))
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Flags) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Flags) {
        self.0 |= other.0;
    }

    pub const fn without(self, other: Flags) -> Flags {
        Flags(self.0 & !other.0)
    }

    /// Character of a single user-facing flag, if `self` is exactly one.
    pub fn symbol(self) -> Option<char> {
        Flags::SYMBOLS
            .iter()
            .find(|(flag, _)| *flag == self)
            .map(|(_, symbol)| *symbol)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, symbol) in Flags::SYMBOLS {
            if self.contains(flag) {
                write!(f, "{symbol}")?;
            }
        }
        Ok(())
    }
}
