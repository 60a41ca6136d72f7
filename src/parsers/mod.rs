use anyhow::{Context, Result};
use log::debug;
use regex::Regex;
use std::path::Path;
use thiserror::Error;

use crate::backup;
use crate::diagnostics::{Diagnostics, PatchResult};
use crate::version::Increment;

pub mod assembly_info_parser;
pub mod sdk_project_parser;

use assembly_info_parser::AssemblyInfoParser;
use sdk_project_parser::SdkProjectParser;

#[derive(Debug, Error)]
pub enum ParsingError {
    #[error("Invalid project file: {0}")]
    InvalidXml(#[from] roxmltree::Error),
}

pub trait Parser {
    type Document;

    fn update_file(path: impl AsRef<Path>, increment: &Increment) -> Result<Diagnostics> {
        let path = path.as_ref();
        debug!("Processing file: '{}'", path.display());
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read '{}'", path.display()))?;
        let document = Self::read(&contents)?;

        let (mut diagnostics, document) = Self::process(document, increment).into_persistable();
        match document {
            Some(document) => {
                std::fs::write(path, Self::render(&document))
                    .with_context(|| format!("Unable to write '{}'", path.display()))?;
                diagnostics.ok(format!("Wrote new version file '{}'", path.display()));
            }
            None => diagnostics.info("Not writing file (unresolved errors)"),
        }
        Ok(diagnostics)
    }

    fn filename_match_regex() -> Result<Regex>;
    fn read(contents: &str) -> Result<Self::Document>;
    fn process(document: Self::Document, increment: &Increment) -> PatchResult<Self::Document>;
    fn render(document: &Self::Document) -> String;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FileType {
    Unknown,
    Sdk,
    AssemblyInfo,
}

impl FileType {
    /// Classifies by trailing extension only, so `/`, `\` and UNC paths all behave the same.
    pub fn from_file_name(file_name: impl AsRef<str>) -> Result<Self> {
        let file_name = file_name.as_ref();
        if SdkProjectParser::filename_match_regex()?.is_match(file_name) {
            Ok(FileType::Sdk)
        } else if AssemblyInfoParser::filename_match_regex()?.is_match(file_name) {
            Ok(FileType::AssemblyInfo)
        } else {
            Ok(FileType::Unknown)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOptions {
    pub increment: Increment,
    pub backup: bool,
}

/// Classifies, backs up and rewrites a single file.
///
/// Hard failures (unreadable file, invalid XML, failed backup) are reported as
/// Error diagnostics, so the result always describes the whole run.
pub fn process_file(path: impl AsRef<Path>, options: &ProcessOptions) -> Diagnostics {
    let path = path.as_ref();
    let mut diagnostics = Diagnostics::new();
    if let Err(e) = try_process_file(path, options, &mut diagnostics) {
        diagnostics.error(format!("Failed: {e:#}"));
    }
    diagnostics
}

fn try_process_file(
    path: &Path,
    options: &ProcessOptions,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    match FileType::from_file_name(path.to_string_lossy())? {
        FileType::Sdk => {
            backup_if_requested(path, options, diagnostics)?;
            diagnostics.extend(SdkProjectParser::update_file(path, &options.increment)?);
        }
        FileType::AssemblyInfo => {
            backup_if_requested(path, options, diagnostics)?;
            diagnostics.extend(AssemblyInfoParser::update_file(path, &options.increment)?);
        }
        FileType::Unknown => {
            diagnostics.error(format!("Unknown file type '{}'", path.display()));
        }
    }
    Ok(())
}

fn backup_if_requested(
    path: &Path,
    options: &ProcessOptions,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    if options.backup {
        let backup = backup::backup_file(path)?;
        diagnostics.info(format!("Backed up to '{}'", backup.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_sdk() {
        assert_eq!(FileType::from_file_name("x.csproj").unwrap(), FileType::Sdk);
        assert_eq!(FileType::from_file_name("a/b/c.CSPROJ").unwrap(), FileType::Sdk);
        assert_eq!(
            FileType::from_file_name(r"TestFiles\expected_sdk_style_test_2.csproj").unwrap(),
            FileType::Sdk
        );
    }

    #[test]
    fn test_file_type_assembly_info() {
        assert_eq!(FileType::from_file_name("x.cs").unwrap(), FileType::AssemblyInfo);
        assert_eq!(
            FileType::from_file_name(r"Properties\AssemblyInfo.CS").unwrap(),
            FileType::AssemblyInfo
        );
    }

    #[test]
    fn test_file_type_unknown() {
        assert_eq!(FileType::from_file_name("x.txt").unwrap(), FileType::Unknown);
        assert_eq!(FileType::from_file_name("x.xml").unwrap(), FileType::Unknown);
        assert_eq!(FileType::from_file_name("x.cs.bak").unwrap(), FileType::Unknown);
        assert_eq!(FileType::from_file_name("csproj").unwrap(), FileType::Unknown);
        assert_eq!(FileType::from_file_name("").unwrap(), FileType::Unknown);
    }

    #[test]
    fn test_file_type_path_styles() {
        for path in [
            r"c:\TestFiles\project.csproj",
            r"\\shared-folder\TestFiles\project.csproj",
            "/we/use/unix/style/too/project.csproj",
        ] {
            assert_eq!(FileType::from_file_name(path).unwrap(), FileType::Sdk, "{path}");
        }
    }
}
