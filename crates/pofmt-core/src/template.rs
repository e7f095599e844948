use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::legality::{Policy, validate_specifier};
use crate::scanner::{Scanner, Segment};
use crate::specifier::{IndexMode, Specifier};
use crate::{Flags, FormatError, FormatResult};

/// How a translation is compared with its source text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Strings must be identical.
    Exact,
    /// Specifier multisets must be identical; literal text may differ.
    #[default]
    Compatible,
}

/// Scans, decodes and validates every specifier of a template, in order.
pub fn parse_specifiers(template: &str, policy: &Policy) -> FormatResult<Vec<Specifier>> {
    let mut specifiers = Vec::new();
    for segment in Scanner::new(template) {
        if let Segment::Specifier(raw) = segment? {
            let specifier = Specifier::decode(&raw)?;
            validate_specifier(&specifier, policy)?;
            specifiers.push(specifier);
        }
    }
    Ok(specifiers)
}

/// Identity of a specifier for comparison: the argument it binds instead of
/// the way the index was written.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecifierKey(Specifier);

impl SpecifierKey {
    fn new(specifier: &Specifier, argument: Option<usize>) -> Self {
        let index = match argument {
            Some(position) => IndexMode::Explicit(position),
            None => IndexMode::None,
        };
        Self(Specifier {
            index,
            flags: specifier.flags.without(Flags::PREVIOUS),
            ..*specifier
        })
    }

    /// 1-based argument position, `None` for `%%` and `%n`.
    pub fn argument(&self) -> Option<usize> {
        match self.0.index {
            IndexMode::Explicit(position) => Some(position),
            _ => None,
        }
    }

    pub fn specifier(&self) -> &Specifier {
        &self.0
    }
}

impl fmt::Display for SpecifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Order-independent, repetition-counting collection of a template's
/// specifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecifierSet {
    counts: BTreeMap<SpecifierKey, usize>,
}

impl SpecifierSet {
    pub fn parse(template: &str, policy: &Policy) -> FormatResult<Self> {
        let specifiers = parse_specifiers(template, policy)?;
        Self::from_specifiers(&specifiers)
    }

    /// Resolves argument positions and counts the resulting keys.
    ///
    /// The ordinal counter advances only on ordinal specifiers; a relative
    /// specifier binds whatever the last argument-binding specifier bound.
    pub fn from_specifiers(specifiers: &[Specifier]) -> FormatResult<Self> {
        let mut counts = BTreeMap::new();
        let mut ordinal = 0usize;
        let mut last = None;
        for specifier in specifiers {
            let argument = match specifier.index {
                IndexMode::Explicit(position) => Some(position),
                IndexMode::Ordinal => {
                    ordinal += 1;
                    Some(ordinal)
                }
                IndexMode::Relative => {
                    let previous = last.ok_or_else(|| {
                        FormatError::MissingPreviousArgument(specifier.to_string())
                    })?;
                    Some(previous)
                }
                IndexMode::None => None,
            };
            if argument.is_some() {
                last = argument;
            }
            *counts.entry(SpecifierKey::new(specifier, argument)).or_insert(0) += 1;
        }
        Ok(Self { counts })
    }

    pub fn len(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn count(&self, key: &SpecifierKey) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SpecifierKey, usize)> {
        self.counts.iter().map(|(key, count)| (key, *count))
    }

    /// Keys present more often in `self` than in `other`, repeated by the
    /// surplus.
    pub fn difference(&self, other: &SpecifierSet) -> Vec<SpecifierKey> {
        let mut surplus = Vec::new();
        for (key, count) in self.iter() {
            let extra = count.saturating_sub(other.count(key));
            surplus.extend(core::iter::repeat(*key).take(extra));
        }
        surplus
    }

    /// Fails with [`FormatError::SpecifierSetMismatch`] unless both sets are
    /// equal.
    pub fn ensure_matches(&self, candidate: &SpecifierSet) -> FormatResult<()> {
        if self == candidate {
            return Ok(());
        }
        Err(FormatError::SpecifierSetMismatch {
            missing: render_keys(&self.difference(candidate)),
            unexpected: render_keys(&candidate.difference(self)),
        })
    }
}

fn render_keys(keys: &[SpecifierKey]) -> Vec<String> {
    keys.iter().map(|key| key.to_string()).collect()
}

/// Checks a candidate translation against its source template.
///
/// Both templates must be well formed in either mode.
pub fn check_templates(
    source: &str,
    candidate: &str,
    mode: MatchMode,
    policy: &Policy,
) -> FormatResult<()> {
    let source_set = SpecifierSet::parse(source, policy)?;
    let candidate_set = SpecifierSet::parse(candidate, policy)?;
    match mode {
        MatchMode::Exact if source == candidate => Ok(()),
        MatchMode::Exact => Err(FormatError::ExactMismatch),
        MatchMode::Compatible => source_set.ensure_matches(&candidate_set),
    }
}

#[cfg(test)]
mod tests {
    use super::{MatchMode, SpecifierSet, check_templates, parse_specifiers};
    use crate::legality::Policy;
    use crate::FormatError;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;

    fn compatible(source: &str, candidate: &str) -> Result<(), FormatError> {
        check_templates(source, candidate, MatchMode::Compatible, &Policy::default())
    }

    fn exact(source: &str, candidate: &str) -> Result<(), FormatError> {
        check_templates(source, candidate, MatchMode::Exact, &Policy::default())
    }

    fn set(template: &str) -> SpecifierSet {
        SpecifierSet::parse(template, &Policy::default()).expect("set")
    }

    #[test]
    fn reordered_explicit_indices_are_compatible() {
        let source = "Found %d items in %s";
        let candidate = "%2$s contiene %1$d elementi";
        assert_eq!(compatible(source, candidate), Ok(()));
        assert_eq!(exact(source, candidate), Err(FormatError::ExactMismatch));
    }

    #[test]
    fn literal_text_is_ignored_in_compatible_mode() {
        assert_eq!(compatible("%d%%", "%d %%"), Ok(()));
        assert_eq!(exact("%d%%", "%d %%"), Err(FormatError::ExactMismatch));
        assert_eq!(exact("%d%%", "%d%%"), Ok(()));
    }

    #[test]
    fn reports_missing_and_unexpected_specifiers() {
        let err = compatible("%s has %d", "%s has %s").expect_err("mismatch");
        assert_eq!(
            err,
            FormatError::SpecifierSetMismatch {
                missing: vec!["%2$d".to_string()],
                unexpected: vec!["%2$s".to_string()],
            }
        );
    }

    #[test]
    fn multiplicity_matters() {
        assert!(compatible("%%", "%% %%").is_err());
        assert_eq!(compatible("%1$s %1$s", "%1$s %<s"), Ok(()));
    }

    #[test]
    fn case_of_conversion_matters() {
        assert!(compatible("%s", "%S").is_err());
    }

    #[test]
    fn ordinal_counter_ignores_explicit_indices() {
        assert_eq!(compatible("%2$s %s %s", "%2$s %1$s %2$s"), Ok(()));
    }

    #[test]
    fn relative_needs_a_previous_argument() {
        assert_eq!(
            SpecifierSet::parse("%% %<s", &Policy::default()),
            Err(FormatError::MissingPreviousArgument("%<s".to_string()))
        );
    }

    #[test]
    fn exact_mode_still_rejects_malformed_templates() {
        assert_eq!(
            exact("50%! off", "50%! off"),
            Err(FormatError::InvalidSpecifierSyntax('!'))
        );
        assert_eq!(
            exact("50% off", "50% off"),
            Err(FormatError::FlagConversionMismatch {
                flag: ' ',
                conversion: 'o',
            })
        );
    }

    #[test]
    fn previous_flag_reuses_argument_despite_written_index() {
        assert_eq!(compatible("%1$s %2$<s", "%1$s %1$s"), Ok(()));
        assert!(compatible("%1$s %2$<s", "%1$s %2$s").is_err());
    }

    #[test]
    fn parse_specifiers_keeps_template_order() {
        let specifiers = parse_specifiers("%s then %d", &Policy::default()).expect("parse");
        let conversions: Vec<char> = specifiers.iter().map(|spec| spec.conversion).collect();
        assert_eq!(conversions, vec!['s', 'd']);
    }

    #[test]
    fn set_counts_repetitions() {
        let specifiers = set("%1$s and %1$s and %%");
        assert_eq!(specifiers.len(), 3);
        assert!(!specifiers.is_empty());
        assert!(set("no placeholders").is_empty());
    }
}
