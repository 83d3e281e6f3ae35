use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SnippetError;

/// Target language of a snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnippetLanguage {
    Curl,
    JavaScript,
    TypeScript,
    Python,
    Node,
    Php,
    Java,
    Go,
}

impl SnippetLanguage {
    pub const ALL: [SnippetLanguage; 8] = [
        SnippetLanguage::Curl,
        SnippetLanguage::JavaScript,
        SnippetLanguage::TypeScript,
        SnippetLanguage::Python,
        SnippetLanguage::Node,
        SnippetLanguage::Php,
        SnippetLanguage::Java,
        SnippetLanguage::Go,
    ];

    /// Canonical identifier, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            SnippetLanguage::Curl => "curl",
            SnippetLanguage::JavaScript => "javascript",
            SnippetLanguage::TypeScript => "typescript",
            SnippetLanguage::Python => "python",
            SnippetLanguage::Node => "node",
            SnippetLanguage::Php => "php",
            SnippetLanguage::Java => "java",
            SnippetLanguage::Go => "go",
        }
    }

    /// Human-readable name used in snippet descriptions.
    pub fn display_name(&self) -> &'static str {
        match self {
            SnippetLanguage::Curl => "cURL",
            SnippetLanguage::JavaScript => "JavaScript (fetch)",
            SnippetLanguage::TypeScript => "TypeScript (fetch)",
            SnippetLanguage::Python => "Python (requests)",
            SnippetLanguage::Node => "Node.js (axios)",
            SnippetLanguage::Php => "PHP (cURL)",
            SnippetLanguage::Java => "Java (HttpClient)",
            SnippetLanguage::Go => "Go (net/http)",
        }
    }
}

impl fmt::Display for SnippetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SnippetLanguage {
    type Err = SnippetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "curl" | "shell" => Ok(SnippetLanguage::Curl),
            "javascript" | "js" => Ok(SnippetLanguage::JavaScript),
            "typescript" | "ts" => Ok(SnippetLanguage::TypeScript),
            "python" | "py" => Ok(SnippetLanguage::Python),
            "node" | "nodejs" => Ok(SnippetLanguage::Node),
            "php" => Ok(SnippetLanguage::Php),
            "java" => Ok(SnippetLanguage::Java),
            "go" | "golang" => Ok(SnippetLanguage::Go),
            _ => Err(SnippetError::UnsupportedLanguage(s.to_string())),
        }
    }
}
