use std::fmt::Write as _;
use std::path::PathBuf;

use pofmt_core::MessageRecord;
use thiserror::Error;

const DEFAULT_PLURAL_EXPRESSION: &str = "(n != 1) ? 1 : 0";
const CONTEXT_SEPARATOR: char = '\u{4}';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodegenError {
    #[error("invalid resource name {0:?}")]
    InvalidResource(String),
    #[error("invalid language tag {0:?}")]
    InvalidLanguage(String),
    #[error("Plural-Forms header has no plural expression: {0:?}")]
    MissingPluralExpression(String),
}

/// Where a generated class lives and what it is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaTarget {
    pub package: Option<String>,
    pub class_name: String,
}

impl JavaTarget {
    /// `com.example.Messages` + `pt-BR` gives `com.example.Messages_pt_BR`.
    pub fn new(resource: &str, language: &str) -> Result<Self, CodegenError> {
        let segments: Vec<&str> = resource.split('.').collect();
        if !segments.iter().all(|segment| is_java_identifier(segment)) {
            return Err(CodegenError::InvalidResource(resource.to_string()));
        }
        let language_suffix = language.replace('-', "_");
        if language_suffix.is_empty()
            || !language_suffix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(CodegenError::InvalidLanguage(language.to_string()));
        }

        let (name, packages) = segments
            .split_last()
            .ok_or_else(|| CodegenError::InvalidResource(resource.to_string()))?;
        let package = (!packages.is_empty()).then(|| packages.join("."));
        Ok(Self {
            package,
            class_name: format!("{name}_{language_suffix}"),
        })
    }

    /// Path of the source file relative to the output root.
    pub fn relative_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        if let Some(package) = &self.package {
            path.extend(package.split('.'));
        }
        path.push(format!("{}.java", self.class_name));
        path
    }
}

fn is_java_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => chars
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$'),
        _ => false,
    }
}

/// Java expression selecting the plural slot for `n`.
pub fn plural_expression(plural_forms: Option<&str>) -> Result<String, CodegenError> {
    let Some(header) = plural_forms else {
        return Ok(DEFAULT_PLURAL_EXPRESSION.to_string());
    };
    let expression = header
        .split(';')
        .find_map(|part| part.trim().strip_prefix("plural="))
        .map(str::trim)
        .filter(|expression| !expression.is_empty())
        .ok_or_else(|| CodegenError::MissingPluralExpression(header.to_string()))?;

    if expression.contains('?') || expression.parse::<u32>().is_ok() {
        Ok(expression.to_string())
    } else {
        Ok(format!("({expression}) ? 1 : 0"))
    }
}

pub fn message_key(record: &MessageRecord) -> String {
    match &record.context {
        Some(context) => format!("{context}{CONTEXT_SEPARATOR}{}", record.id),
        None => record.id.clone(),
    }
}

/// Renders the class. Messages with no translated text are left out so
/// lookups fall back to the caller's default.
pub fn generate_java(
    target: &JavaTarget,
    records: &[MessageRecord],
    plural_expression: &str,
) -> String {
    let mut out = String::new();
    let class = &target.class_name;

    out.push_str("// Generated by pofmt. Do not edit.\n");
    if let Some(package) = &target.package {
        let _ = writeln!(out, "package {package};");
    }
    out.push_str("\nimport java.util.HashMap;\nimport java.util.Map;\n\n");
    let _ = writeln!(out, "public final class {class} {{");
    out.push_str("    private static final Map<String, String[]> MESSAGES = new HashMap<>();\n\n");
    out.push_str("    static {\n");
    for record in records
        .iter()
        .filter(|record| record.translations.iter().any(|text| !text.is_empty()))
    {
        let values: Vec<String> = record
            .translations
            .iter()
            .map(|text| java_string(text))
            .collect();
        let _ = writeln!(
            out,
            "        MESSAGES.put({}, new String[] {{{}}});",
            java_string(&message_key(record)),
            values.join(", ")
        );
    }
    out.push_str("    }\n\n");
    let _ = writeln!(out, "    private {class}() {{\n    }}\n");
    out.push_str("    public static String[] lookup(String key) {\n");
    out.push_str("        return MESSAGES.get(key);\n    }\n\n");
    out.push_str("    public static int pluralIndex(long n) {\n");
    let _ = writeln!(out, "        return (int) ({plural_expression});");
    out.push_str("    }\n}\n");
    out
}

/// Quoted Java string literal; everything outside printable ASCII is escaped.
fn java_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{unit:04x}");
                }
            }
        }
    }
    out.push('"');
    out
}
