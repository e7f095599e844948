#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod catalog;
mod conversion;
mod error;
mod flags;
mod legality;
mod scanner;
mod specifier;
mod template;

pub use catalog::{
    Catalog, CatalogIssue, CheckOptions, IssueKind, MessageKey, MessageRecord, Side,
    TemplateField, check_catalogs,
};
pub use conversion::{Category, category_of, fold_conversion, is_datetime_suffix};
pub use error::{FormatError, FormatResult};
pub use flags::Flags;
pub use legality::{Policy, validate_specifier};
pub use scanner::{RawSpecifier, Scanner, Segment, Span};
pub use specifier::{IndexMode, Specifier};
pub use template::{MatchMode, SpecifierKey, SpecifierSet, check_templates, parse_specifiers};
