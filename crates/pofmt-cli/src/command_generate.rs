use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::codegen::{generate_java, plural_expression, CodegenError, JavaTarget};
use crate::config::load_config_or_default;
use crate::po::{read_po, PoReadError};

#[derive(Debug, Error)]
pub enum GenerateCommandError {
    #[error("config error: {0}")]
    Config(#[from] crate::error::CliError),
    #[error(transparent)]
    Po(#[from] PoReadError),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub po_path: PathBuf,
    pub resource: String,
    pub language: String,
    pub out_dir: Option<PathBuf>,
    pub config_path: PathBuf,
}

/// Writes the Java class for one catalog and returns its path.
pub fn run_generate(options: &GenerateOptions) -> Result<PathBuf, GenerateCommandError> {
    let config = load_config_or_default(&options.config_path)?;
    let out_dir = options
        .out_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.generated_dir));

    let target = JavaTarget::new(&options.resource, &options.language)?;
    let file = read_po(&options.po_path)?;
    let expression = plural_expression(file.header_field("Plural-Forms"))?;
    // rejects duplicate keys
    let catalog = file.into_catalog()?;
    let records: Vec<_> = catalog.iter().cloned().collect();

    let path = out_dir.join(target.relative_path());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, generate_java(&target, &records, &expression))?;
    info!(
        po = %options.po_path.display(),
        class = %target.class_name,
        messages = records.len(),
        out = %path.display(),
        "generated resource class"
    );
    Ok(path)
}
