// src/types.rs

use std::fmt;

/// Source language of a located submission.
///
/// The set is closed and keyed by file extension. The declaration order is
/// also the preference order when one directory holds several candidates:
/// languages that can be executed automatically come first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Language {
    Python,
    Java,
    C,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Python, Language::Java, Language::C];

    /// Map a file extension (without the leading dot) to a language.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            "c" => Some(Language::C),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::Java => "java",
            Language::C => "c",
        }
    }

    /// Human readable name, as shown to the marker.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Java => "Java",
            Language::C => "C",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How submissions are driven through the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkingMode {
    /// Mark every submission, then offer one retry pass over the failures.
    Auto,
    /// The operator picks submissions one at a time.
    Manual,
}

impl MarkingMode {
    pub fn from_manual_flag(manual: bool) -> Self {
        if manual {
            MarkingMode::Manual
        } else {
            MarkingMode::Auto
        }
    }
}
