use crate::diagnostics::{Diagnostics, PatchResult};
use crate::parsers::Parser;
use crate::version::Increment;
use log::debug;
use regex::Regex;

pub const ASSEMBLY_VERSION: &str = "AssemblyVersion";
pub const ASSEMBLY_FILE_VERSION: &str = "AssemblyFileVersion";

const TAGS: [&str; 2] = [ASSEMBLY_VERSION, ASSEMBLY_FILE_VERSION];
const POSTFIX: &str = "\")]";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// The lines of a legacy `AssemblyInfo.cs` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLines {
    pub lines: Vec<String>,
    pub line_ending: LineEnding,
}

impl SourceLines {
    pub fn parse(contents: &str) -> Self {
        let line_ending = if contents.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        };
        Self {
            lines: contents.lines().map(str::to_string).collect(),
            line_ending,
        }
    }

    /// Every line, including the last, is terminated with the detected line ending.
    pub fn render(&self) -> String {
        let line_ending = self.line_ending.as_str();
        self.lines
            .iter()
            .map(|line| format!("{line}{line_ending}"))
            .collect()
    }
}

impl From<Vec<String>> for SourceLines {
    fn from(lines: Vec<String>) -> Self {
        Self {
            lines,
            line_ending: LineEnding::default(),
        }
    }
}

pub fn attribute_prefix(tag: &str) -> String {
    format!("[assembly: {tag}(\"")
}

/// Extracts the version from a `[assembly: <tag>("<version>")]` line.
///
/// Returns `None` if the line does not declare `tag`. A declaration without the
/// closing `")]` still counts as a match and yields an empty version.
pub fn version_from_attribute_line(tag: &str, line: &str) -> Option<String> {
    let prefix = attribute_prefix(tag);
    let line = line.replace('\t', "");
    let rest = line.trim().strip_prefix(prefix.as_str())?;
    let version = rest
        .find(POSTFIX)
        .map(|end| rest[..end].trim())
        .unwrap_or_default();
    Some(version.to_string())
}

pub struct AssemblyInfoParser;

impl Parser for AssemblyInfoParser {
    type Document = SourceLines;

    fn filename_match_regex() -> anyhow::Result<Regex> {
        Ok(Regex::new(r#"(?i)\.cs$"#)?)
    }

    fn read(contents: &str) -> anyhow::Result<SourceLines> {
        Ok(SourceLines::parse(contents))
    }

    fn process(mut document: SourceLines, increment: &Increment) -> PatchResult<SourceLines> {
        let mut diagnostics = Diagnostics::new();
        let mut found = [false; TAGS.len()];

        for line in document.lines.iter_mut() {
            let original = line.clone();
            for (tag, found) in TAGS.iter().zip(found.iter_mut()) {
                let Some(current) = version_from_attribute_line(tag, &original) else {
                    continue;
                };

                match increment.apply(&current) {
                    Ok(new_version) => {
                        debug!("{tag}: {current} -> {new_version}");
                        diagnostics.ok(format!("Found {tag} old: {current}, new {new_version}"));
                        *found = true;
                        // Canonical form; original indentation is dropped.
                        *line = format!("{}{new_version}{POSTFIX}", attribute_prefix(tag));
                    }
                    Err(e) => {
                        debug!("{tag}: {e}");
                        diagnostics.warning(format!("Unable to increment {tag} '{current}'"));
                    }
                }
            }
        }

        for (tag, found) in TAGS.iter().zip(found) {
            if !found {
                diagnostics.warning(format!("{tag} not found in file"));
            }
        }

        PatchResult::new(diagnostics, document)
    }

    fn render(document: &SourceLines) -> String {
        document.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;

    const ASSEMBLY_INFO: &str = "using System.Reflection;\r\nusing System.Runtime.InteropServices;\r\n\r\n[assembly: AssemblyTitle(\"Sample\")]\r\n[assembly: ComVisible(false)]\r\n\t[assembly: AssemblyVersion(\"1.1.1\")]\r\n[assembly: AssemblyFileVersion(\"1.1.1\")]\r\n";

    fn lines(lines: &[&str]) -> SourceLines {
        SourceLines::from(lines.iter().map(|l| l.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_version_from_attribute_line() {
        let test_lines = [
            "using System.Reflection;",
            "\t[assembly: AssemblyVersion(\"1.23.4.5\")]",
            "\t[assembly: AssemblyFileVersion(\"2.34.5.6\")]",
            "\r\n",
            "",
            "   ",
        ];
        let expected_assembly = [None, Some("1.23.4.5"), None, None, None, None];
        let expected_file = [None, None, Some("2.34.5.6"), None, None, None];

        for (i, line) in test_lines.iter().enumerate() {
            assert_eq!(
                version_from_attribute_line(ASSEMBLY_VERSION, line).as_deref(),
                expected_assembly[i],
                "{ASSEMBLY_VERSION} {i}"
            );
            assert_eq!(
                version_from_attribute_line(ASSEMBLY_FILE_VERSION, line).as_deref(),
                expected_file[i],
                "{ASSEMBLY_FILE_VERSION} {i}"
            );
        }
    }

    #[test]
    fn test_malformed_attribute_yields_empty_version() {
        assert_eq!(
            version_from_attribute_line(ASSEMBLY_VERSION, "[assembly: AssemblyVersion(\"1.0.0"),
            Some(String::new())
        );
        assert_eq!(
            version_from_attribute_line(ASSEMBLY_VERSION, "[assembly: AssemblyVersion(\")]"),
            Some(String::new())
        );
    }

    #[test]
    fn test_commented_out_attribute_is_ignored() {
        assert_eq!(
            version_from_attribute_line(ASSEMBLY_VERSION, "// [assembly: AssemblyVersion(\"1.0.*\")]"),
            None
        );
    }

    #[test]
    fn test_process_rewrites_both_attributes() {
        let document = AssemblyInfoParser::read(ASSEMBLY_INFO).unwrap();
        let result = AssemblyInfoParser::process(document, &Increment::new(2, 1));

        let messages: Vec<_> = result.diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            [
                "Found AssemblyVersion old: 1.1.1, new 1.1.2",
                "Found AssemblyFileVersion old: 1.1.1, new 1.1.2",
            ]
        );
        assert_eq!(result.diagnostics.exit_code(), 0);

        let expected = ASSEMBLY_INFO
            .replace("\t[assembly: AssemblyVersion", "[assembly: AssemblyVersion")
            .replace("1.1.1", "1.1.2");
        assert_eq!(AssemblyInfoParser::render(result.payload()), expected);
    }

    #[test]
    fn test_process_preserves_other_lines() {
        let document = lines(&[
            "using System.Reflection;",
            "  [assembly: AssemblyVersion(\"2.0\")]  ",
            "// trailing comment",
        ]);
        let result = AssemblyInfoParser::process(document, &Increment::new(0, 1));

        assert_eq!(
            result.payload().lines,
            [
                "using System.Reflection;",
                "[assembly: AssemblyVersion(\"3.0\")]",
                "// trailing comment",
            ]
        );
        assert_eq!(
            result.diagnostics.iter().last().map(|d| d.message.as_str()),
            Some("AssemblyFileVersion not found in file")
        );
    }

    #[test]
    fn test_missing_attributes_warn() {
        let result = AssemblyInfoParser::process(lines(&["namespace Foo;"]), &Increment::new(0, 1));
        let severities: Vec<_> = result.diagnostics.iter().map(|d| d.severity).collect();
        assert_eq!(severities, [Severity::Warning, Severity::Warning]);
        assert_eq!(result.payload().lines, ["namespace Foo;"]);
    }

    #[test]
    fn test_failed_increment_leaves_line_unchanged() {
        let document = lines(&["[assembly: AssemblyVersion(\"1.0\")]"]);
        let result = AssemblyInfoParser::process(document, &Increment::new(2, 1));

        assert_eq!(result.payload().lines, ["[assembly: AssemblyVersion(\"1.0\")]"]);
        let messages: Vec<_> = result.diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            [
                "Unable to increment AssemblyVersion '1.0'",
                "AssemblyVersion not found in file",
                "AssemblyFileVersion not found in file",
            ]
        );
        assert_eq!(result.diagnostics.error_count(), 0);
    }

    #[test]
    fn test_set_version() {
        let document = AssemblyInfoParser::read(ASSEMBLY_INFO).unwrap();
        let increment = Increment::new(0, 1).with_set_version("5.6.7.8");
        let result = AssemblyInfoParser::process(document, &increment);
        assert!(
            result
                .payload()
                .lines
                .contains(&"[assembly: AssemblyFileVersion(\"5.6.7.8\")]".to_string())
        );
    }

    #[test]
    fn test_line_endings_are_kept() {
        assert_eq!(SourceLines::parse("a\r\nb\r\n").line_ending, LineEnding::CrLf);
        assert_eq!(SourceLines::parse("a\nb").line_ending, LineEnding::Lf);
        assert_eq!(SourceLines::parse("a\nb").render(), "a\nb\n");
        assert_eq!(SourceLines::parse("").render(), "");
    }

    #[test]
    fn test_filename_regex() {
        let regex = AssemblyInfoParser::filename_match_regex().unwrap();
        assert!(regex.is_match("/path/to/Properties/AssemblyInfo.cs"));
        assert!(regex.is_match(r"\\server\share\AssemblyInfo.CS"));
        assert!(!regex.is_match("/path/to/App.csproj"));
        assert!(!regex.is_match("/path/to/AssemblyInfo.cs.bak"));
    }
}
