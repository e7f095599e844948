use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::legality::Policy;
use crate::template::{MatchMode, SpecifierSet, check_templates};
use crate::FormatError;

/// Identity of a message inside a catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageKey {
    pub context: Option<String>,
    pub id: String,
}

impl MessageKey {
    pub fn new(context: Option<String>, id: impl Into<String>) -> Self {
        Self {
            context,
            id: id.into(),
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "ctx: {context:?}, id: {:?}", self.id),
            None => write!(f, "id: {:?}", self.id),
        }
    }
}

/// One translatable unit as supplied by a catalog reader.
///
/// For plural messages `translations` holds one string per plural form;
/// otherwise slot 0 holds the only translation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageRecord {
    pub context: Option<String>,
    pub id: String,
    pub id_plural: Option<String>,
    pub translations: Vec<String>,
    pub source_references: Vec<String>,
    pub fuzzy: bool,
}

impl MessageRecord {
    pub fn key(&self) -> MessageKey {
        MessageKey::new(self.context.clone(), self.id.clone())
    }

    pub fn translation(&self) -> &str {
        self.translations.first().map(String::as_str).unwrap_or("")
    }
}

/// Records of one translation source, in file order, unique by key.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    records: Vec<MessageRecord>,
    index: BTreeMap<MessageKey, usize>,
}

impl Catalog {
    pub fn from_records(
        records: impl IntoIterator<Item = MessageRecord>,
    ) -> Result<Self, CatalogIssue> {
        let mut catalog = Catalog::default();
        for record in records {
            let key = record.key();
            if catalog.index.contains_key(&key) {
                return Err(CatalogIssue::new(Some(key), IssueKind::DuplicateKey));
            }
            catalog.index.insert(key, catalog.records.len());
            catalog.records.push(record);
        }
        Ok(catalog)
    }

    pub fn get(&self, key: &MessageKey) -> Option<&MessageRecord> {
        self.index.get(key).map(|position| &self.records[*position])
    }

    pub fn contains(&self, key: &MessageKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageRecord> {
        self.records.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &MessageKey> {
        self.index.keys()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CheckOptions {
    pub mode: MatchMode,
    pub allow_empty_translations: bool,
    pub allow_fuzzy: bool,
    pub policy: Policy,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            mode: MatchMode::Compatible,
            allow_empty_translations: true,
            allow_fuzzy: true,
            policy: Policy::default(),
        }
    }
}

/// Which string of a message a template came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TemplateField {
    Id,
    IdPlural,
    Translation(usize),
}

impl fmt::Display for TemplateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateField::Id => f.write_str("msgid"),
            TemplateField::IdPlural => f.write_str("msgid_plural"),
            TemplateField::Translation(slot) => write!(f, "msgstr[{slot}]"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Source,
    Candidate,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => f.write_str("source"),
            Side::Candidate => f.write_str("candidate"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IssueKind {
    KeySetMismatch {
        missing: Vec<MessageKey>,
        unexpected: Vec<MessageKey>,
    },
    DuplicateKey,
    SourceReferenceMismatch {
        source: Vec<String>,
        candidate: Vec<String>,
    },
    PluralFormMismatch {
        source: Option<String>,
        candidate: Option<String>,
    },
    InsufficientPluralForms {
        side: Side,
        required: usize,
        found: usize,
    },
    Template {
        source_field: TemplateField,
        candidate_field: TemplateField,
        source: String,
        candidate: String,
        error: FormatError,
    },
    InvalidTemplate {
        side: Side,
        field: TemplateField,
        template: String,
        error: FormatError,
    },
    EmptyTranslationDisallowed(TemplateField),
    FuzzyDisallowed,
}

/// A policy violation found while comparing two catalogs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogIssue {
    pub key: Option<MessageKey>,
    pub kind: IssueKind,
}

impl CatalogIssue {
    pub fn new(key: Option<MessageKey>, kind: IssueKind) -> Self {
        Self { key, kind }
    }

    /// Stable short name of the issue kind.
    pub fn code(&self) -> &'static str {
        match self.kind {
            IssueKind::KeySetMismatch { .. } => "key-set-mismatch",
            IssueKind::DuplicateKey => "duplicate-key",
            IssueKind::SourceReferenceMismatch { .. } => "source-reference-mismatch",
            IssueKind::PluralFormMismatch { .. } => "plural-form-mismatch",
            IssueKind::InsufficientPluralForms { .. } => "insufficient-plural-forms",
            IssueKind::Template {
                error: FormatError::ExactMismatch,
                ..
            } => "exact-mismatch",
            IssueKind::Template { .. } => "specifier-set-mismatch",
            IssueKind::InvalidTemplate { .. } => "invalid-specifier",
            IssueKind::EmptyTranslationDisallowed(_) => "empty-translation",
            IssueKind::FuzzyDisallowed => "fuzzy-translation",
        }
    }

    /// The catalog the issue points at, when only one of them is at fault.
    pub fn side(&self) -> Option<Side> {
        match self.kind {
            IssueKind::InsufficientPluralForms { side, .. }
            | IssueKind::InvalidTemplate { side, .. } => Some(side),
            _ => None,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::KeySetMismatch {
                missing,
                unexpected,
            } => {
                f.write_str("message lists do not match; missing in candidate: [")?;
                write_joined(f, missing)?;
                f.write_str("], unexpected in candidate: [")?;
                write_joined(f, unexpected)?;
                f.write_str("]")
            }
            IssueKind::DuplicateKey => f.write_str("duplicate message context id pair"),
            IssueKind::SourceReferenceMismatch { source, candidate } => write!(
                f,
                "source references do not match: {source:?} != {candidate:?}"
            ),
            IssueKind::PluralFormMismatch { source, candidate } => write!(
                f,
                "ids of plural forms do not match: {source:?} != {candidate:?}"
            ),
            IssueKind::InsufficientPluralForms {
                side,
                required,
                found,
            } => write!(
                f,
                "{side} message must have {required} plural forms, but has {found}"
            ),
            IssueKind::Template {
                source_field,
                candidate_field,
                source,
                candidate,
                error,
            } => write!(
                f,
                "{source_field} {source:?} vs {candidate_field} {candidate:?}: {error}"
            ),
            IssueKind::InvalidTemplate {
                side,
                field,
                template,
                error,
            } => write!(f, "{side} {field} {template:?} is malformed: {error}"),
            IssueKind::EmptyTranslationDisallowed(field) => {
                write!(f, "empty translations are not allowed, but {field} is empty")
            }
            IssueKind::FuzzyDisallowed => {
                f.write_str("fuzzy translations are not allowed, but translation is fuzzy")
            }
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, keys: &[MessageKey]) -> fmt::Result {
    for (position, key) in keys.iter().enumerate() {
        if position > 0 {
            f.write_str("; ")?;
        }
        write!(f, "{key}")?;
    }
    Ok(())
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}, {key}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CatalogIssue {}

const SOURCE_PLURAL_FORMS: usize = 2;

/// Compares a candidate catalog with its source catalog.
///
/// Every issue of every entry is collected, in source catalog order.
pub fn check_catalogs(
    source: &Catalog,
    candidate: &Catalog,
    options: &CheckOptions,
) -> Result<(), Vec<CatalogIssue>> {
    let mut issues = Vec::new();

    let missing: Vec<MessageKey> = source
        .keys()
        .filter(|key| !candidate.contains(key))
        .cloned()
        .collect();
    let unexpected: Vec<MessageKey> = candidate
        .keys()
        .filter(|key| !source.contains(key))
        .cloned()
        .collect();
    if !missing.is_empty() || !unexpected.is_empty() {
        issues.push(CatalogIssue::new(
            None,
            IssueKind::KeySetMismatch {
                missing,
                unexpected,
            },
        ));
    }

    for record in source.iter() {
        let key = record.key();
        if let Some(translated) = candidate.get(&key) {
            let mut entry = EntryCheck {
                key,
                options,
                issues: &mut issues,
            };
            entry.run(record, translated);
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

struct EntryCheck<'a> {
    key: MessageKey,
    options: &'a CheckOptions,
    issues: &'a mut Vec<CatalogIssue>,
}

impl EntryCheck<'_> {
    fn run(&mut self, source: &MessageRecord, candidate: &MessageRecord) {
        let mut source_refs = source.source_references.clone();
        let mut candidate_refs = candidate.source_references.clone();
        source_refs.sort();
        candidate_refs.sort();
        if source_refs != candidate_refs {
            self.report(IssueKind::SourceReferenceMismatch {
                source: source_refs,
                candidate: candidate_refs,
            });
        }

        if source.id_plural != candidate.id_plural {
            self.report(IssueKind::PluralFormMismatch {
                source: source.id_plural.clone(),
                candidate: candidate.id_plural.clone(),
            });
            self.check_fuzzy(candidate);
            return;
        }

        match &source.id_plural {
            Some(id_plural) => self.check_plural(source, id_plural, candidate),
            None => {
                self.compare(
                    TemplateField::Id,
                    &source.id,
                    TemplateField::Translation(0),
                    candidate.translation(),
                );
            }
        }

        self.check_fuzzy(candidate);
    }

    fn check_fuzzy(&mut self, candidate: &MessageRecord) {
        if candidate.fuzzy && !self.options.allow_fuzzy {
            self.report(IssueKind::FuzzyDisallowed);
        }
    }

    fn check_plural(
        &mut self,
        source: &MessageRecord,
        id_plural: &str,
        candidate: &MessageRecord,
    ) {
        if source.translations.len() != SOURCE_PLURAL_FORMS {
            self.report(IssueKind::InsufficientPluralForms {
                side: Side::Source,
                required: SOURCE_PLURAL_FORMS,
                found: source.translations.len(),
            });
        }
        if candidate.translations.len() < SOURCE_PLURAL_FORMS {
            self.report(IssueKind::InsufficientPluralForms {
                side: Side::Candidate,
                required: SOURCE_PLURAL_FORMS,
                found: candidate.translations.len(),
            });
            return;
        }
        for (slot, translation) in candidate.translations.iter().enumerate() {
            let (source_field, source_text) = if slot == 0 {
                (TemplateField::Id, source.id.as_str())
            } else {
                (TemplateField::IdPlural, id_plural)
            };
            self.compare(
                source_field,
                source_text,
                TemplateField::Translation(slot),
                translation,
            );
        }
    }

    fn compare(
        &mut self,
        source_field: TemplateField,
        source: &str,
        candidate_field: TemplateField,
        candidate: &str,
    ) {
        let options = self.options;
        if let Err(error) = check_templates(source, candidate, options.mode, &options.policy) {
            let kind = match error {
                FormatError::ExactMismatch | FormatError::SpecifierSetMismatch { .. } => {
                    IssueKind::Template {
                        source_field,
                        candidate_field,
                        source: source.into(),
                        candidate: candidate.into(),
                        error,
                    }
                }
                error if SpecifierSet::parse(source, &options.policy).is_err() => {
                    IssueKind::InvalidTemplate {
                        side: Side::Source,
                        field: source_field,
                        template: source.into(),
                        error,
                    }
                }
                error => IssueKind::InvalidTemplate {
                    side: Side::Candidate,
                    field: candidate_field,
                    template: candidate.into(),
                    error,
                },
            };
            self.report(kind);
        }
        if candidate.is_empty() && !self.options.allow_empty_translations {
            self.report(IssueKind::EmptyTranslationDisallowed(candidate_field));
        }
    }

    fn report(&mut self, kind: IssueKind) {
        self.issues.push(CatalogIssue::new(Some(self.key.clone()), kind));
    }
}
