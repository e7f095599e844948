use std::fs;
use std::path::Path;

use pofmt_core::{Catalog, CatalogIssue, MessageRecord};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoReadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("{0}")]
    Catalog(#[from] CatalogIssue),
}

/// A gettext PO or POT file split into its header and messages.
#[derive(Debug, Clone, Default)]
pub struct PoFile {
    /// `msgstr` of the entry with an empty `msgid` and no context.
    pub header: Option<String>,
    pub records: Vec<MessageRecord>,
}

impl PoFile {
    /// Value of a `Name: value` header line.
    pub fn header_field(&self, name: &str) -> Option<&str> {
        self.header.as_deref()?.lines().find_map(|line| {
            let (field, value) = line.split_once(':')?;
            (field.trim() == name).then(|| value.trim())
        })
    }

    pub fn into_catalog(self) -> Result<Catalog, PoReadError> {
        Ok(Catalog::from_records(self.records)?)
    }
}

pub fn read_po(path: &Path) -> Result<PoFile, PoReadError> {
    let contents = fs::read_to_string(path)?;
    parse_po(&contents)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Field {
    Context,
    Id,
    IdPlural,
    Str,
    StrPlural(usize),
}

#[derive(Debug, Default)]
struct EntryBuilder {
    start_line: usize,
    context: Option<String>,
    id: Option<String>,
    id_plural: Option<String>,
    translation: Option<String>,
    plural_translations: Vec<String>,
    references: Vec<String>,
    fuzzy: bool,
    current: Option<Field>,
}

impl EntryBuilder {
    fn has_keywords(&self) -> bool {
        self.current.is_some()
    }

    fn has_translation(&self) -> bool {
        self.translation.is_some() || !self.plural_translations.is_empty()
    }

    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Context => self.context.get_or_insert_with(String::new),
            Field::Id => self.id.get_or_insert_with(String::new),
            Field::IdPlural => self.id_plural.get_or_insert_with(String::new),
            Field::Str => self.translation.get_or_insert_with(String::new),
            Field::StrPlural(slot) => &mut self.plural_translations[slot],
        }
    }
}

/// Parses PO text. Obsolete (`#~`) entries are dropped.
pub fn parse_po(content: &str) -> Result<PoFile, PoReadError> {
    let mut file = PoFile::default();
    let mut entry = EntryBuilder::default();

    for (offset, raw_line) in content.lines().enumerate() {
        let line_number = offset + 1;
        let line = raw_line.trim();

        if line.is_empty() {
            finish_entry(&mut file, std::mem::take(&mut entry))?;
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            if entry.has_translation() {
                finish_entry(&mut file, std::mem::take(&mut entry))?;
            }
            if let Some(references) = comment.strip_prefix(':') {
                entry
                    .references
                    .extend(references.split_whitespace().map(str::to_string));
            } else if let Some(flags) = comment.strip_prefix(',') {
                if flags.split(',').any(|flag| flag.trim() == "fuzzy") {
                    entry.fuzzy = true;
                }
            }
            continue;
        }

        if line.starts_with('"') {
            let Some(field) = entry.current else {
                return Err(syntax(line_number, "string continuation without a keyword"));
            };
            let value = unquote(line, line_number)?;
            entry.field_mut(field).push_str(&value);
            continue;
        }

        let (keyword, rest) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| syntax(line_number, format!("unexpected line {line:?}")))?;
        let field = parse_keyword(keyword, line_number)?;

        let starts_new_entry = match field {
            Field::Context => entry.id.is_some() || entry.context.is_some(),
            Field::Id => entry.id.is_some(),
            _ => false,
        };
        if starts_new_entry {
            finish_entry(&mut file, std::mem::take(&mut entry))?;
        }
        if !entry.has_keywords() {
            entry.start_line = line_number;
        }

        match field {
            Field::IdPlural | Field::Str | Field::StrPlural(_) if entry.id.is_none() => {
                return Err(syntax(line_number, format!("{keyword} before msgid")));
            }
            Field::StrPlural(slot) if slot != entry.plural_translations.len() => {
                return Err(syntax(line_number, format!("{keyword} out of order")));
            }
            Field::StrPlural(_) => entry.plural_translations.push(String::new()),
            _ => {}
        }

        let value = unquote(rest, line_number)?;
        entry.current = Some(field);
        entry.field_mut(field).push_str(&value);
    }

    finish_entry(&mut file, entry)?;
    Ok(file)
}

fn parse_keyword(keyword: &str, line_number: usize) -> Result<Field, PoReadError> {
    match keyword {
        "msgctxt" => Ok(Field::Context),
        "msgid" => Ok(Field::Id),
        "msgid_plural" => Ok(Field::IdPlural),
        "msgstr" => Ok(Field::Str),
        _ => keyword
            .strip_prefix("msgstr[")
            .and_then(|rest| rest.strip_suffix(']'))
            .and_then(|slot| slot.parse::<usize>().ok())
            .map(Field::StrPlural)
            .ok_or_else(|| syntax(line_number, format!("unknown keyword {keyword:?}"))),
    }
}

fn finish_entry(file: &mut PoFile, entry: EntryBuilder) -> Result<(), PoReadError> {
    if !entry.has_keywords() {
        return Ok(());
    }
    let Some(id) = entry.id else {
        return Err(syntax(entry.start_line, "entry without msgid"));
    };
    let translations = match (entry.translation, entry.plural_translations.is_empty()) {
        (Some(_), false) => {
            return Err(syntax(entry.start_line, "entry mixes msgstr and msgstr[N]"));
        }
        (Some(translation), true) => vec![translation],
        (None, false) => entry.plural_translations,
        (None, true) => return Err(syntax(entry.start_line, "entry without msgstr")),
    };

    if id.is_empty() && entry.context.is_none() {
        if file.header.is_some() {
            return Err(syntax(entry.start_line, "duplicate header entry"));
        }
        file.header = translations.into_iter().next();
        return Ok(());
    }

    file.records.push(MessageRecord {
        context: entry.context,
        id,
        id_plural: entry.id_plural,
        translations,
        source_references: entry.references,
        fuzzy: entry.fuzzy,
    });
    Ok(())
}

/// Strips the surrounding quotes and resolves escapes in one pass.
fn unquote(value: &str, line_number: usize) -> Result<String, PoReadError> {
    let inner = value
        .trim()
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| syntax(line_number, "expected a quoted string"))?;

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('"') => result.push('"'),
            Some('\\') => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => return Err(syntax(line_number, "dangling escape")),
        }
    }
    Ok(result)
}

fn syntax(line: usize, message: impl Into<String>) -> PoReadError {
    PoReadError::Syntax {
        line,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_po, PoReadError};

    const SAMPLE: &str = r#"# Translations
msgid ""
msgstr ""
"Content-Type: text/plain; charset=UTF-8\n"
"Plural-Forms: nplurals=2; plural=(n != 1);\n"

#: src/ui.rs:10 src/ui.rs:42
#, fuzzy, c-format
msgctxt "menu"
msgid "Open %s"
msgstr "Ouvrir %s"

#: src/files.rs:7
msgid "%d file"
msgid_plural "%d files"
msgstr[0] "%d fichier"
msgstr[1] "%d fichiers"

#~ msgid "Old"
#~ msgstr "Vieux"
"#;

    #[test]
    fn reads_header_and_messages() {
        let file = parse_po(SAMPLE).expect("parse");
        assert_eq!(
            file.header_field("Plural-Forms"),
            Some("nplurals=2; plural=(n != 1);")
        );
        assert_eq!(file.records.len(), 2);

        let open = &file.records[0];
        assert_eq!(open.context.as_deref(), Some("menu"));
        assert_eq!(open.id, "Open %s");
        assert_eq!(open.translations, vec!["Ouvrir %s".to_string()]);
        assert_eq!(open.source_references, vec!["src/ui.rs:10", "src/ui.rs:42"]);
        assert!(open.fuzzy);

        let files = &file.records[1];
        assert_eq!(files.id_plural.as_deref(), Some("%d files"));
        assert_eq!(files.translations.len(), 2);
        assert!(!files.fuzzy);
    }

    #[test]
    fn joins_continuation_lines_and_unescapes() {
        let content = "msgid \"\"\n\"Line 1\\n\"\n\"Line \\\"2\\\"\"\nmsgstr \"x\"\n";
        let file = parse_po(content).expect("parse");
        assert_eq!(file.records[0].id, "Line 1\nLine \"2\"");
    }

    #[test]
    fn splits_entries_without_blank_lines() {
        let content = "msgid \"a\"\nmsgstr \"A\"\nmsgid \"b\"\nmsgstr \"B\"\n";
        let file = parse_po(content).expect("parse");
        assert_eq!(file.records.len(), 2);
        assert_eq!(file.records[1].translations, vec!["B".to_string()]);
    }

    #[test]
    fn comments_after_msgstr_belong_to_next_entry() {
        let content = "msgid \"a\"\nmsgstr \"A\"\n#: b.rs:1\nmsgid \"b\"\nmsgstr \"B\"\n";
        let file = parse_po(content).expect("parse");
        assert!(file.records[0].source_references.is_empty());
        assert_eq!(file.records[1].source_references, vec!["b.rs:1"]);
    }

    #[test]
    fn reports_syntax_errors_with_line() {
        let err = parse_po("msgid \"a\"\nmsgstr unquoted\n").expect_err("syntax");
        match err {
            PoReadError::Syntax { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_order_plural_slots() {
        let content = "msgid \"a\"\nmsgid_plural \"as\"\nmsgstr[1] \"x\"\n";
        assert!(matches!(
            parse_po(content),
            Err(PoReadError::Syntax { line: 3, .. })
        ));
    }

    #[test]
    fn rejects_entry_without_translation() {
        assert!(matches!(
            parse_po("msgid \"a\"\n\n"),
            Err(PoReadError::Syntax { line: 1, .. })
        ));
    }

    #[test]
    fn duplicate_keys_fail_when_building_catalog() {
        let content = "msgid \"a\"\nmsgstr \"\"\n\nmsgid \"a\"\nmsgstr \"\"\n";
        let file = parse_po(content).expect("parse");
        assert!(matches!(file.into_catalog(), Err(PoReadError::Catalog(_))));
    }
}
