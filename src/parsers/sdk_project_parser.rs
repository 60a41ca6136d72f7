use crate::diagnostics::{Diagnostics, PatchResult};
use crate::parsers::{Parser, ParsingError};
use crate::version::Increment;
use log::debug;
use regex::Regex;
use std::fmt;
use std::ops::Range;

/// Elements whose text gets incremented, in processing order.
pub const VERSION_NODES: [&str; 3] = ["AssemblyVersion", "FileVersion", "Version"];

/// Elements that are only checked for presence and a non-false value.
pub const ADVISORY_NODES: [&str; 2] = [
    "IncludeSourceRevisionInInformationalVersion",
    "GenerateAssemblyInfo",
];

const BOM: char = '\u{feff}';

#[derive(Debug, Clone)]
struct Element {
    name: String,
    text: String,
    /// Byte range of the whole element, tags included.
    range: Range<usize>,
    /// Byte range of everything between the start and end tag; `None` for empty elements.
    content: Option<Range<usize>>,
    replacement: Option<String>,
    /// Dropped from the document because an ancestor's content was rewritten.
    removed: bool,
}

/// An SDK-style project file that can have element text rewritten in place.
///
/// Only the content of rewritten elements changes when rendered; everything
/// else in the source (formatting, comments, namespaces) is kept byte-for-byte.
#[derive(Debug, Clone)]
pub struct ProjectDocument {
    source: String,
    has_bom: bool,
    elements: Vec<Element>,
}

impl ProjectDocument {
    pub fn parse(source: impl Into<String>) -> Result<Self, ParsingError> {
        let mut source = source.into();
        let has_bom = source.starts_with(BOM);
        if has_bom {
            source.remove(0);
        }

        let elements: Vec<Element> = {
            let document = roxmltree::Document::parse(&source)?;
            document
                .descendants()
                .filter(|node| node.is_element())
                .map(|node| Element {
                    name: node.tag_name().name().to_string(),
                    range: node.range(),
                    text: node
                        .descendants()
                        .filter(|n| n.is_text())
                        .filter_map(|n| n.text())
                        .collect(),
                    content: node
                        .first_child()
                        .zip(node.last_child())
                        .map(|(first, last)| first.range().start..last.range().end),
                    replacement: None,
                    removed: false,
                })
                .collect()
        };

        Ok(Self {
            source,
            has_bom,
            elements,
        })
    }

    /// Indices of every element with the given local name, in document order.
    fn find(&self, name: &str) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, element)| !element.removed && element.name == name)
            .map(|(index, _)| index)
            .collect()
    }

    /// Concatenated text of every element with the given local name, in document order.
    pub fn text_of(&self, name: &str) -> Vec<&str> {
        self.elements
            .iter()
            .filter(|element| !element.removed && element.name == name)
            .map(|element| element.text.as_str())
            .collect()
    }

    /// Replaces all content of the element, so nested elements stop existing.
    fn set_text(&mut self, index: usize, text: &str) -> bool {
        let Some(content) = self.elements.get(index).and_then(|e| e.content.clone()) else {
            return false;
        };
        for (other, element) in self.elements.iter_mut().enumerate() {
            if other == index {
                element.text = text.to_string();
                element.replacement = Some(text.to_string());
            } else if content.start <= element.range.start && element.range.end <= content.end {
                element.removed = true;
            }
        }
        true
    }

    pub fn is_modified(&self) -> bool {
        self.elements
            .iter()
            .any(|e| !e.removed && e.replacement.is_some())
    }

    pub fn render(&self) -> String {
        let mut edits: Vec<(&Range<usize>, &str)> = self
            .elements
            .iter()
            .filter(|e| !e.removed)
            .filter_map(|e| Some((e.content.as_ref()?, e.replacement.as_deref()?)))
            .collect();
        edits.sort_by_key(|(range, _)| range.start);

        let mut output = String::with_capacity(self.source.len() + 3);
        if self.has_bom {
            output.push(BOM);
        }
        let mut cursor = 0;
        for (range, text) in edits {
            // Already replaced as part of a rewritten ancestor.
            if range.start < cursor {
                continue;
            }
            output.push_str(&self.source[cursor..range.start]);
            output.push_str(&escape_text(text));
            cursor = range.end;
        }
        output.push_str(&self.source[cursor..]);
        output
    }
}

impl fmt::Display for ProjectDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Returns the only element called `tag`, or records why there isn't exactly one.
fn find_single(
    document: &ProjectDocument,
    tag: &str,
    diagnostics: &mut Diagnostics,
) -> Option<usize> {
    match document.find(tag).as_slice() {
        [] => {
            diagnostics.warning(format!("Node <{tag}> not found"));
            None
        }
        [index] => Some(*index),
        matches => {
            diagnostics.warning(format!("Node <{tag}> found {} times", matches.len()));
            None
        }
    }
}

pub struct SdkProjectParser;

impl Parser for SdkProjectParser {
    type Document = ProjectDocument;

    fn filename_match_regex() -> anyhow::Result<Regex> {
        Ok(Regex::new(r#"(?i)\.csproj$"#)?)
    }

    fn read(contents: &str) -> anyhow::Result<ProjectDocument> {
        Ok(ProjectDocument::parse(contents)?)
    }

    fn process(mut document: ProjectDocument, increment: &Increment) -> PatchResult<ProjectDocument> {
        let mut diagnostics = Diagnostics::new();

        // NOTE: the first missing, duplicated or empty node ends the list; the nodes
        // after it are neither checked nor incremented.
        for tag in VERSION_NODES {
            let Some(index) = find_single(&document, tag, &mut diagnostics) else {
                break;
            };

            let current = document.elements[index].text.clone();
            if current.is_empty() {
                diagnostics.warning(format!("Tag <{tag}> present but value empty"));
                break;
            }

            match increment.apply(&current) {
                Ok(new_version) => {
                    if document.set_text(index, &new_version) {
                        debug!("<{tag}>: {current} -> {new_version}");
                        diagnostics.ok(format!("Set <{tag}> from '{current}' to '{new_version}'"));
                    } else {
                        diagnostics.error(format!("Unable to rewrite <{tag}>, value '{current}'"));
                    }
                }
                Err(e) => {
                    debug!("<{tag}>: {e}");
                    diagnostics.error(format!("Error incrementing <{tag}>, value '{current}'"));
                }
            }
        }

        // Same early exit on missing/duplicate; a false value only warns.
        for tag in ADVISORY_NODES {
            let Some(index) = find_single(&document, tag, &mut diagnostics) else {
                break;
            };

            let value = document.elements[index].text.trim();
            if value.is_empty() || value.eq_ignore_ascii_case("false") {
                diagnostics.warning(format!("Node <{tag}> is set to false"));
            }
        }

        PatchResult::new(diagnostics, document)
    }

    fn render(document: &ProjectDocument) -> String {
        document.render()
    }
}
