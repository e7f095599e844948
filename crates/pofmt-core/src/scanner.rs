use alloc::vec::Vec;

use crate::{FormatError, FormatResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// One specifier as it appears in the template, before decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawSpecifier<'a> {
    pub text: &'a str,
    /// Digits of an `N$` group, without the `$`.
    pub index: Option<&'a str>,
    pub flags: &'a str,
    pub width: Option<&'a str>,
    /// Digits after the `.`.
    pub precision: Option<&'a str>,
    /// The `t` or `T` marker, if present.
    pub datetime: Option<char>,
    pub conversion: char,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Specifier(RawSpecifier<'a>),
}

/// Splits a template into literal runs and raw specifiers.
///
/// The segments cover the input exactly and in order. A `%` that does not
/// start a specifier ends the scan with [`FormatError::InvalidSpecifierSyntax`].
pub struct Scanner<'a> {
    input: &'a str,
    bytes: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            offset: 0,
            failed: false,
        }
    }

    pub fn scan_all(self) -> FormatResult<Vec<Segment<'a>>> {
        self.collect()
    }

    fn next_segment(&mut self) -> FormatResult<Segment<'a>> {
        let start = self.offset;
        if self.bytes[start] == b'%' {
            return match self.match_specifier(start) {
                Some(raw) => {
                    self.offset = raw.span.end;
                    Ok(Segment::Specifier(raw))
                }
                None => Err(self.invalid_at(start)),
            };
        }
        while self.offset < self.bytes.len() && self.bytes[self.offset] != b'%' {
            self.offset += 1;
        }
        Ok(Segment::Literal(&self.input[start..self.offset]))
    }

    // %[index$][flags][width][.precision][t|T]conversion
    fn match_specifier(&self, start: usize) -> Option<RawSpecifier<'a>> {
        let mut cursor = start + 1;

        let mut index = None;
        let digits_end = self.skip_digits(cursor);
        if digits_end > cursor && self.byte_at(digits_end) == Some(b'$') {
            index = Some(&self.input[cursor..digits_end]);
            cursor = digits_end + 1;
        }

        let flags_start = cursor;
        while self.byte_at(cursor).is_some_and(is_flag_byte) {
            cursor += 1;
        }
        let flags = &self.input[flags_start..cursor];

        let mut width = None;
        let width_end = self.skip_digits(cursor);
        if width_end > cursor {
            width = Some(&self.input[cursor..width_end]);
            cursor = width_end;
        }

        let mut precision = None;
        if self.byte_at(cursor) == Some(b'.') {
            let precision_end = self.skip_digits(cursor + 1);
            if precision_end > cursor + 1 {
                precision = Some(&self.input[cursor + 1..precision_end]);
                cursor = precision_end;
            }
        }

        let mut datetime = None;
        if let Some(marker @ (b't' | b'T')) = self.byte_at(cursor) {
            if self.byte_at(cursor + 1).is_some_and(is_conversion_byte) {
                datetime = Some(char::from(marker));
                cursor += 1;
            }
        }

        let conversion = self.byte_at(cursor).filter(|byte| is_conversion_byte(*byte))?;
        let end = cursor + 1;
        Some(RawSpecifier {
            text: &self.input[start..end],
            index,
            flags,
            width,
            precision,
            datetime,
            conversion: char::from(conversion),
            span: Span { start, end },
        })
    }

    fn skip_digits(&self, mut cursor: usize) -> usize {
        while self.byte_at(cursor).is_some_and(|byte| byte.is_ascii_digit()) {
            cursor += 1;
        }
        cursor
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }

    fn invalid_at(&self, percent: usize) -> FormatError {
        let nearby = self.input[percent + 1..].chars().next().unwrap_or('%');
        FormatError::InvalidSpecifierSyntax(nearby)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = FormatResult<Segment<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.bytes.len() {
            return None;
        }
        let segment = self.next_segment();
        if segment.is_err() {
            self.failed = true;
        }
        Some(segment)
    }
}

fn is_flag_byte(byte: u8) -> bool {
    matches!(byte, b'-' | b'#' | b'+' | b' ' | b'0' | b',' | b'(' | b'<')
}

fn is_conversion_byte(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'%'
}

#[cfg(test)]
mod tests {
    use super::{Scanner, Segment};
    use crate::FormatError;
    use alloc::vec;
    use alloc::vec::Vec;

    fn specifier_texts(input: &str) -> Vec<&str> {
        Scanner::new(input)
            .scan_all()
            .expect("scan")
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Specifier(raw) => Some(raw.text),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    #[test]
    fn splits_literals_and_specifiers() {
        let segments = Scanner::new("Found %d items in %s").scan_all().expect("scan");
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0], Segment::Literal("Found "));
        assert!(matches!(&segments[1], Segment::Specifier(raw) if raw.conversion == 'd'));
        assert_eq!(segments[2], Segment::Literal(" items in "));
        assert!(matches!(&segments[3], Segment::Specifier(raw) if raw.conversion == 's'));
    }

    #[test]
    fn captures_every_group() {
        let segments = Scanner::new("%2$-,10.3tY").scan_all().expect("scan");
        let Segment::Specifier(raw) = &segments[0] else {
            panic!("expected specifier");
        };
        assert_eq!(raw.index, Some("2"));
        assert_eq!(raw.flags, "-,");
        assert_eq!(raw.width, Some("10"));
        assert_eq!(raw.precision, Some("3"));
        assert_eq!(raw.datetime, Some('t'));
        assert_eq!(raw.conversion, 'Y');
        assert_eq!(raw.span.end, 11);
    }

    #[test]
    fn zero_after_flags_is_a_flag() {
        let segments = Scanner::new("%05d").scan_all().expect("scan");
        let Segment::Specifier(raw) = &segments[0] else {
            panic!("expected specifier");
        };
        assert_eq!(raw.flags, "0");
        assert_eq!(raw.width, Some("5"));
    }

    #[test]
    fn digits_without_dollar_are_width() {
        let segments = Scanner::new("%12s").scan_all().expect("scan");
        let Segment::Specifier(raw) = &segments[0] else {
            panic!("expected specifier");
        };
        assert_eq!(raw.index, None);
        assert_eq!(raw.width, Some("12"));
    }

    #[test]
    fn lone_t_is_a_conversion() {
        let segments = Scanner::new("%t!").scan_all().expect("scan");
        let Segment::Specifier(raw) = &segments[0] else {
            panic!("expected specifier");
        };
        assert_eq!(raw.datetime, None);
        assert_eq!(raw.conversion, 't');
    }

    #[test]
    fn percent_and_newline_are_specifiers() {
        assert_eq!(specifier_texts("100%% done%n"), vec!["%%", "%n"]);
    }

    #[test]
    fn rejects_stray_percent_with_next_character() {
        let err = Scanner::new("50%! off").scan_all().expect_err("invalid");
        assert_eq!(err, FormatError::InvalidSpecifierSyntax('!'));
    }

    #[test]
    fn percent_before_word_can_form_a_specifier() {
        // space flag, octal conversion
        assert_eq!(specifier_texts("50% off"), vec!["% o"]);
    }

    #[test]
    fn rejects_trailing_percent() {
        let err = Scanner::new("%d%").scan_all().expect_err("invalid");
        assert_eq!(err, FormatError::InvalidSpecifierSyntax('%'));
    }

    #[test]
    fn rejects_unterminated_precision() {
        let err = Scanner::new("%1.x").scan_all().expect_err("invalid");
        assert_eq!(err, FormatError::InvalidSpecifierSyntax('1'));
    }

    #[test]
    fn stops_after_first_error() {
        let mut scanner = Scanner::new("a%!b");
        assert!(matches!(scanner.next(), Some(Ok(Segment::Literal("a")))));
        assert!(matches!(scanner.next(), Some(Err(_))));
        assert!(scanner.next().is_none());
    }

    #[test]
    fn keeps_non_ascii_literals_intact() {
        let segments = Scanner::new("Größe: %d €").scan_all().expect("scan");
        assert_eq!(segments[0], Segment::Literal("Größe: "));
        assert_eq!(segments[2], Segment::Literal(" €"));
    }
}
