use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::pad::{normalize, PadId};

/// What a sheet step expects. Tokens that don't name a pad are kept verbatim
/// so they still show up on the sheet, but nothing can ever match them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetToken {
    Pad(PadId),
    Unmatchable(String),
}

impl SheetToken {
    pub fn parse(raw: &str) -> Self {
        match normalize(raw) {
            Some(pad) => SheetToken::Pad(pad),
            None => SheetToken::Unmatchable(raw.trim().to_uppercase()),
        }
    }

    pub fn pad(&self) -> Option<PadId> {
        match self {
            SheetToken::Pad(pad) => Some(*pad),
            SheetToken::Unmatchable(_) => None,
        }
    }

    pub fn matches(&self, struck: Option<PadId>) -> bool {
        matches!((self.pad(), struck), (Some(expected), Some(got)) if expected == got)
    }
}

impl fmt::Display for SheetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetToken::Pad(pad) => write!(f, "{pad}"),
            SheetToken::Unmatchable(literal) => f.write_str(literal),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Judgement {
    Pending,
    Correct,
    Wrong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetStep {
    pub expected: SheetToken,
    pub judgement: Judgement,
}

impl SheetStep {
    pub fn new(expected: SheetToken) -> Self {
        Self {
            expected,
            judgement: Judgement::Pending,
        }
    }
}

/// Split sheet text into raw tokens. Any whitespace separates steps.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Read a sheet from a plain text file.
pub fn read_sheet_file<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(tokenize(&text))
}
