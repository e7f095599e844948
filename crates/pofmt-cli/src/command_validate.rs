use std::fs;
use std::path::{Path, PathBuf};

use pofmt_core::{check_catalogs, Catalog, CheckOptions, MatchMode, Policy, Side};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::load_config_or_default;
use crate::diagnostic::Diagnostic;
use crate::po::{parse_po, PoReadError};

#[derive(Debug, Error)]
pub enum ValidateCommandError {
    #[error("config error: {0}")]
    Config(#[from] crate::error::CliError),
    #[error("{}: {source}", path.display())]
    Po { path: PathBuf, source: PoReadError },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation failed with {0} diagnostics")]
    Failed(usize),
}

/// Command-line overrides are `Some`; `None` falls back to the config file.
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    pub source_path: PathBuf,
    pub candidate_path: PathBuf,
    pub exact_match: Option<bool>,
    pub allow_empty_translations: Option<bool>,
    pub allow_fuzzy: Option<bool>,
    pub report_path: Option<PathBuf>,
    pub config_path: PathBuf,
}

#[derive(Debug, Serialize)]
struct InputFile {
    path: String,
    digest: String,
}

#[derive(Debug, Serialize)]
struct ValidateReport {
    source: InputFile,
    candidate: InputFile,
    messages: usize,
    diagnostics: Vec<Diagnostic>,
}

struct LoadedCatalog {
    catalog: Catalog,
    input: InputFile,
}

/// Returns the number of messages checked.
pub fn run_validate(options: &ValidateOptions) -> Result<usize, ValidateCommandError> {
    let config = load_config_or_default(&options.config_path)?;
    let exact_match = options.exact_match.unwrap_or(config.exact_match);
    let check_options = CheckOptions {
        mode: if exact_match {
            MatchMode::Exact
        } else {
            MatchMode::Compatible
        },
        allow_empty_translations: options
            .allow_empty_translations
            .unwrap_or(config.allow_empty_translations),
        allow_fuzzy: options.allow_fuzzy.unwrap_or(config.allow_fuzzy),
        policy: Policy {
            formattable_strings: config.formattable_strings,
        },
    };

    info!(
        source = %options.source_path.display(),
        candidate = %options.candidate_path.display(),
        mode = ?check_options.mode,
        "validating translations"
    );

    let source = load(&options.source_path)?;
    let candidate = load(&options.candidate_path)?;
    info!(
        source_messages = source.catalog.len(),
        candidate_messages = candidate.catalog.len(),
        "catalogs loaded"
    );

    let outcome = check_catalogs(&source.catalog, &candidate.catalog, &check_options);
    let diagnostics: Vec<Diagnostic> = match outcome {
        Ok(()) => Vec::new(),
        Err(issues) => issues
            .iter()
            .map(|issue| {
                warn!(
                    source = %source.input.path,
                    candidate = %candidate.input.path,
                    code = issue.code(),
                    "{issue}"
                );
                let file = match issue.side() {
                    Some(Side::Source) => &source.input.path,
                    _ => &candidate.input.path,
                };
                Diagnostic::from_issue(issue).with_file(file.clone())
            })
            .collect(),
    };

    let messages = source.catalog.len();
    if let Some(report_path) = &options.report_path {
        let report = ValidateReport {
            source: source.input,
            candidate: candidate.input,
            messages,
            diagnostics: diagnostics.clone(),
        };
        write_report(report_path, &report)?;
        info!(report = %report_path.display(), "report written");
    }

    if diagnostics.is_empty() {
        info!(messages, "translations are consistent");
        Ok(messages)
    } else {
        Err(ValidateCommandError::Failed(diagnostics.len()))
    }
}

fn load(path: &Path) -> Result<LoadedCatalog, ValidateCommandError> {
    let contents = fs::read_to_string(path)?;
    let po_error = |source| ValidateCommandError::Po {
        path: path.to_path_buf(),
        source,
    };
    let catalog = parse_po(&contents)
        .and_then(|file| file.into_catalog())
        .map_err(po_error)?;
    Ok(LoadedCatalog {
        catalog,
        input: InputFile {
            path: path.display().to_string(),
            digest: sha256_hex(contents.as_bytes()),
        },
    })
}

fn write_report(path: &Path, report: &ValidateReport) -> Result<(), ValidateCommandError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::{run_validate, sha256_hex, ValidateCommandError, ValidateOptions};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    const TEMPLATE: &str = r#"msgid ""
msgstr ""
"Plural-Forms: nplurals=2; plural=(n != 1);\n"

#: src/main.rs:3
msgid "Found %d items in %s"
msgstr ""

msgid "%d file"
msgid_plural "%d files"
msgstr[0] ""
msgstr[1] ""
"#;

    const TRANSLATION: &str = r#"msgid ""
msgstr ""
"Plural-Forms: nplurals=2; plural=(n > 1);\n"

#: src/main.rs:3
msgid "Found %d items in %s"
msgstr "%2$s contiene %1$d elementi"

msgid "%d file"
msgid_plural "%d files"
msgstr[0] "%d fichier"
msgstr[1] "%d fichiers"
"#;

    fn temp_dir() -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        path.push(format!("pofmt_validate_{nanos}"));
        fs::create_dir_all(&path).expect("dir");
        path
    }

    fn options(dir: &PathBuf, candidate: &str) -> ValidateOptions {
        fs::write(dir.join("messages.pot"), TEMPLATE).expect("write pot");
        fs::write(dir.join("fr.po"), candidate).expect("write po");
        ValidateOptions {
            source_path: dir.join("messages.pot"),
            candidate_path: dir.join("fr.po"),
            exact_match: None,
            allow_empty_translations: None,
            allow_fuzzy: None,
            report_path: None,
            config_path: dir.join("pofmt.toml"),
        }
    }

    #[test]
    fn accepts_consistent_translation() {
        let dir = temp_dir();
        let checked = run_validate(&options(&dir, TRANSLATION)).expect("valid");
        assert_eq!(checked, 2);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn exact_match_requires_identical_text() {
        let dir = temp_dir();
        let mut options = options(&dir, TRANSLATION);
        options.exact_match = Some(true);
        let err = run_validate(&options).expect_err("exact");
        // the reordered singular and both plural slots
        assert!(matches!(err, ValidateCommandError::Failed(3)));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn config_file_supplies_defaults() {
        let dir = temp_dir();
        let options = options(&dir, TRANSLATION);
        fs::write(&options.config_path, "exact_match = true\n").expect("config");
        assert!(matches!(
            run_validate(&options),
            Err(ValidateCommandError::Failed(3))
        ));

        let mut overridden = options.clone();
        overridden.exact_match = Some(false);
        assert!(run_validate(&overridden).is_ok());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn writes_report_with_digests() {
        let dir = temp_dir();
        let broken = TRANSLATION.replace("%2$s contiene %1$d elementi", "%s contiene elementi");
        let mut options = options(&dir, &broken);
        options.report_path = Some(dir.join("out").join("report.json"));

        let err = run_validate(&options).expect_err("mismatch");
        assert!(matches!(err, ValidateCommandError::Failed(1)));

        let report = fs::read_to_string(dir.join("out").join("report.json")).expect("report");
        let value: serde_json::Value = serde_json::from_str(&report).expect("json");
        assert_eq!(value["messages"], 2);
        assert_eq!(value["source"]["digest"], sha256_hex(TEMPLATE.as_bytes()));
        assert_eq!(value["diagnostics"][0]["code"], "specifier-set-mismatch");
        assert_eq!(value["diagnostics"][0]["id"], "Found %d items in %s");
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn malformed_source_template_points_at_source_file() {
        let dir = temp_dir();
        let malformed = |text: &str| text.replace("in %s\"", "in %-s\"");
        let mut options = options(&dir, &malformed(TRANSLATION));
        fs::write(&options.source_path, malformed(TEMPLATE)).expect("write");
        options.report_path = Some(dir.join("report.json"));

        assert!(run_validate(&options).is_err());
        let report = fs::read_to_string(dir.join("report.json")).expect("report");
        let value: serde_json::Value = serde_json::from_str(&report).expect("json");
        assert_eq!(value["diagnostics"][0]["code"], "invalid-specifier");
        assert!(
            value["diagnostics"][0]["file"]
                .as_str()
                .expect("file")
                .ends_with("messages.pot")
        );
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn reports_unreadable_po() {
        let dir = temp_dir();
        let options = options(&dir, "msgid \"a\"\nmsgstr nope\n");
        match run_validate(&options) {
            Err(ValidateCommandError::Po { path, .. }) => assert!(path.ends_with("fr.po")),
            other => panic!("unexpected result {other:?}"),
        }
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn digest_has_prefix() {
        assert!(sha256_hex(b"").starts_with("sha256:e3b0c442"));
    }
}
