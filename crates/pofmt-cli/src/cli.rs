use std::path::PathBuf;

use thiserror::Error;

use crate::command_generate::{run_generate, GenerateCommandError, GenerateOptions};
use crate::command_validate::{run_validate, ValidateCommandError, ValidateOptions};

const DEFAULT_CONFIG: &str = "pofmt.toml";

#[derive(Debug, Error)]
pub enum CliAppError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Validate(#[from] ValidateCommandError),
    #[error(transparent)]
    Generate(#[from] GenerateCommandError),
}

pub fn run() -> Result<(), CliAppError> {
    let mut args = std::env::args().skip(1);
    let command = args
        .next()
        .ok_or_else(|| CliAppError::Usage(usage()))?;
    match command.as_str() {
        "validate" => {
            let options = parse_validate_options(args.collect())?;
            run_validate(&options)?;
            Ok(())
        }
        "generate" => {
            let options = parse_generate_options(args.collect())?;
            run_generate(&options)?;
            Ok(())
        }
        _ => Err(CliAppError::Usage(usage())),
    }
}

fn parse_validate_options(args: Vec<String>) -> Result<ValidateOptions, CliAppError> {
    let mut source_path = None;
    let mut candidate_path = None;
    let mut exact_match = None;
    let mut allow_empty_translations = None;
    let mut allow_fuzzy = None;
    let mut report_path = None;
    let mut config_path = PathBuf::from(DEFAULT_CONFIG);
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--source" => source_path = Some(PathBuf::from(next_value("--source", &mut iter)?)),
            "--candidate" => {
                candidate_path = Some(PathBuf::from(next_value("--candidate", &mut iter)?))
            }
            "--exact-match" => exact_match = Some(true),
            "--no-empty" => allow_empty_translations = Some(false),
            "--no-fuzzy" => allow_fuzzy = Some(false),
            "--report" => report_path = Some(PathBuf::from(next_value("--report", &mut iter)?)),
            "--config" => config_path = PathBuf::from(next_value("--config", &mut iter)?),
            "--help" | "-h" => return Err(CliAppError::Usage(usage())),
            _ => return Err(CliAppError::Usage(usage())),
        }
    }
    let source_path = source_path.ok_or_else(|| CliAppError::Usage(usage()))?;
    let candidate_path = candidate_path.ok_or_else(|| CliAppError::Usage(usage()))?;
    Ok(ValidateOptions {
        source_path,
        candidate_path,
        exact_match,
        allow_empty_translations,
        allow_fuzzy,
        report_path,
        config_path,
    })
}

fn parse_generate_options(args: Vec<String>) -> Result<GenerateOptions, CliAppError> {
    let mut po_path = None;
    let mut resource = None;
    let mut language = None;
    let mut out_dir = None;
    let mut config_path = PathBuf::from(DEFAULT_CONFIG);
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--po" => po_path = Some(PathBuf::from(next_value("--po", &mut iter)?)),
            "--resource" => resource = Some(next_value("--resource", &mut iter)?),
            "--language" => language = Some(next_value("--language", &mut iter)?),
            "--out" => out_dir = Some(PathBuf::from(next_value("--out", &mut iter)?)),
            "--config" => config_path = PathBuf::from(next_value("--config", &mut iter)?),
            "--help" | "-h" => return Err(CliAppError::Usage(usage())),
            _ => return Err(CliAppError::Usage(usage())),
        }
    }
    let po_path = po_path.ok_or_else(|| CliAppError::Usage(usage()))?;
    let resource = resource.ok_or_else(|| CliAppError::Usage(usage()))?;
    let language = language.ok_or_else(|| CliAppError::Usage(usage()))?;
    Ok(GenerateOptions {
        po_path,
        resource,
        language,
        out_dir,
        config_path,
    })
}

fn next_value(flag: &str, iter: &mut impl Iterator<Item = String>) -> Result<String, CliAppError> {
    iter.next()
        .ok_or_else(|| CliAppError::Usage(format!("{flag} requires a value\n\n{}", usage())))
}

fn usage() -> String {
    "usage: pofmt validate --source <pot> --candidate <po> [--exact-match] [--no-empty] [--no-fuzzy] [--report <json>] [--config <path>]\n       pofmt generate --po <file> --resource <dotted.Name> --language <tag> [--out <dir>] [--config <path>]".to_string()
}

#[cfg(test)]
mod tests {
    use super::{parse_generate_options, parse_validate_options, CliAppError};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_validate_options() {
        let options = parse_validate_options(args(&[
            "--source",
            "messages.pot",
            "--candidate",
            "fr.po",
        ]))
        .expect("options");
        assert!(options.source_path.ends_with("messages.pot"));
        assert!(options.candidate_path.ends_with("fr.po"));
        assert_eq!(options.exact_match, None);
        assert_eq!(options.allow_fuzzy, None);
        assert!(options.config_path.ends_with("pofmt.toml"));
    }

    #[test]
    fn parses_validate_switches() {
        let options = parse_validate_options(args(&[
            "--source",
            "a.pot",
            "--candidate",
            "b.po",
            "--exact-match",
            "--no-empty",
            "--no-fuzzy",
            "--report",
            "report.json",
        ]))
        .expect("options");
        assert_eq!(options.exact_match, Some(true));
        assert_eq!(options.allow_empty_translations, Some(false));
        assert_eq!(options.allow_fuzzy, Some(false));
        assert!(options.report_path.expect("report").ends_with("report.json"));
    }

    #[test]
    fn validate_requires_both_files() {
        let err = parse_validate_options(args(&["--source", "a.pot"])).expect_err("usage");
        assert!(matches!(err, CliAppError::Usage(_)));
    }

    #[test]
    fn reports_missing_value() {
        match parse_validate_options(args(&["--source"])) {
            Err(CliAppError::Usage(message)) => {
                assert!(message.starts_with("--source requires a value"))
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn parses_generate_options() {
        let options = parse_generate_options(args(&[
            "--po",
            "fr.po",
            "--resource",
            "com.example.Messages",
            "--language",
            "fr",
        ]))
        .expect("options");
        assert_eq!(options.resource, "com.example.Messages");
        assert_eq!(options.language, "fr");
        assert!(options.out_dir.is_none());
    }
}
