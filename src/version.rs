use thiserror::Error;

const DELIMITER: &str = ".";

/// What to do with every version string a parser finds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Increment {
    /// Zero-based index of the segment to change.
    pub position: usize,
    pub amount: i32,
    /// Replaces the whole version when non-blank.
    pub set_version: Option<String>,
}

impl Increment {
    pub fn new(position: usize, amount: i32) -> Self {
        Self {
            position,
            amount,
            set_version: None,
        }
    }

    pub fn with_set_version(mut self, set_version: impl Into<String>) -> Self {
        self.set_version = Some(set_version.into());
        self
    }

    pub fn apply(&self, version: &str) -> Result<String, VersionError> {
        increment(version, self.position, self.amount, self.set_version.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Position {position} is out of range for version '{version}' ({segments} segments)")]
    PositionOutOfRange {
        version: String,
        position: usize,
        segments: usize,
    },
}

impl VersionError {
    /// The version string the failed increment was asked to work on, unchanged.
    pub fn version(&self) -> &str {
        match self {
            VersionError::PositionOutOfRange { version, .. } => version,
        }
    }
}

/// Increments the segment at `position` of a dot-delimited version string by `amount`.
///
/// A non-blank `set_version` wins over everything else and is returned as-is,
/// even when `version` itself is malformed.
pub fn increment(
    version: &str,
    position: usize,
    amount: i32,
    set_version: Option<&str>,
) -> Result<String, VersionError> {
    if let Some(set_version) = set_version.filter(|v| !v.trim().is_empty()) {
        return Ok(set_version.to_string());
    }

    let mut segments: Vec<String> = version.split(DELIMITER).map(str::to_string).collect();
    let Some(segment) = segments.get_mut(position) else {
        return Err(VersionError::PositionOutOfRange {
            version: version.to_string(),
            position,
            segments: segments.len(),
        });
    };

    // Non-numeric segments count as zero, so "1.a.1" at position 1 becomes "1.1.1".
    let current = parse_segment(segment);
    *segment = current.wrapping_add(amount).to_string();

    Ok(segments.join(DELIMITER))
}

fn parse_segment(segment: &str) -> i32 {
    segment.trim().parse::<i32>().unwrap_or(0)
}
