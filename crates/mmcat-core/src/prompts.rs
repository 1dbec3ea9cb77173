//! Prompt library for the categorization request
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/mmcat/prompts/overrides/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! A prompt file is YAML frontmatter followed by a `# System` and a `# User`
//! section. `{{var}}` placeholders are replaced at render time.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{CategorySet, ClassificationItem};

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const CATEGORIZE_TRANSACTIONS: &str =
        include_str!("../../../prompts/categorize_transactions.md");
}

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Batch categorization of transaction descriptions
    CategorizeTransactions,
}

impl PromptId {
    /// Get the string identifier for this prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CategorizeTransactions => "categorize_transactions",
        }
    }

    /// Get all known prompt IDs
    pub fn all() -> &'static [PromptId] {
        &[Self::CategorizeTransactions]
    }

    /// Get the default embedded content for this prompt
    fn default_content(&self) -> &'static str {
        match self {
            Self::CategorizeTransactions => defaults::CATEGORIZE_TRANSACTIONS,
        }
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    /// Unique identifier
    pub id: String,
    /// Version number for tracking changes
    pub version: u32,
}

/// A loaded prompt with metadata and content
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Metadata from frontmatter
    pub metadata: PromptMetadata,
    /// The prompt content (system + user sections)
    pub content: String,
    /// Path to override file (if any)
    pub override_path: Option<PathBuf>,
}

/// System and user text ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Whether this came from an override file
    pub fn is_override(&self) -> bool {
        self.override_path.is_some()
    }

    /// Get the system section of the prompt
    pub fn system_section(&self) -> Option<&str> {
        extract_section(&self.content, "# System")
    }

    /// Get the user section of the prompt
    pub fn user_section(&self) -> Option<&str> {
        extract_section(&self.content, "# User")
    }

    /// Render both sections with template variables replaced
    pub fn render(&self, vars: &HashMap<&str, &str>) -> Result<RenderedPrompt> {
        let system = self.system_section().ok_or_else(|| {
            Error::InvalidData(format!("Prompt {} has no '# System' section", self.metadata.id))
        })?;
        let user = self.user_section().ok_or_else(|| {
            Error::InvalidData(format!("Prompt {} has no '# User' section", self.metadata.id))
        })?;

        Ok(RenderedPrompt {
            system: substitute(system, vars),
            user: substitute(user, vars),
        })
    }

    /// Render the categorization request for a batch
    ///
    /// `{{categories}}` becomes a JSON list of labels, `{{fallback}}` the
    /// fallback label and `{{transactions}}` the pretty-printed item array.
    pub fn render_categorization(
        &self,
        categories: &CategorySet,
        items: &[ClassificationItem],
    ) -> Result<RenderedPrompt> {
        let labels = serde_json::to_string(categories.labels())?;
        let payload = serde_json::to_string_pretty(items)?;

        let mut vars = HashMap::new();
        vars.insert("categories", labels.as_str());
        vars.insert("fallback", categories.fallback());
        vars.insert("transactions", payload.as_str());
        self.render(&vars)
    }
}

/// Prompt library for loading prompts
pub struct PromptLibrary {
    /// Override directory path
    override_dir: Option<PathBuf>,
}

impl PromptLibrary {
    /// Create a new prompt library with default paths
    pub fn new() -> Self {
        Self {
            override_dir: default_prompts_dir(),
        }
    }

    /// Create a prompt library with a custom override directory
    pub fn with_override_dir(path: PathBuf) -> Self {
        Self {
            override_dir: Some(path),
        }
    }

    /// Create a prompt library with no override directory (embedded only)
    pub fn embedded_only() -> Self {
        Self { override_dir: None }
    }

    /// Load a prompt (checking override first, then default)
    pub fn get(&self, id: PromptId) -> Result<Prompt> {
        if let Some(path) = self.override_path(id).filter(|p| p.exists()) {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read prompt override {}: {}", path.display(), e))
            })?;
            let (metadata, body) = parse_prompt(&content)?;
            return Ok(Prompt {
                metadata,
                content: body,
                override_path: Some(path),
            });
        }

        let (metadata, body) = parse_prompt(id.default_content())?;
        Ok(Prompt {
            metadata,
            content: body,
            override_path: None,
        })
    }

    /// Where an override for `id` would live
    pub fn override_path(&self, id: PromptId) -> Option<PathBuf> {
        self.override_dir
            .as_ref()
            .map(|d| d.join(format!("{}.md", id.as_str())))
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("mmcat").join("prompts").join("overrides"))
}

/// Parse a prompt file into metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();

    // Check for YAML frontmatter
    if !content.starts_with("---") {
        return Err(Error::Config(
            "Prompt must start with YAML frontmatter (---)".into(),
        ));
    }

    // Find end of frontmatter
    let rest = &content[3..];
    let end = rest.find("---").ok_or_else(|| {
        Error::Config("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::Config(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}

/// Extract a section from the prompt content
fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)?;
    let after_header = &content[start + header.len()..];

    // Find the next header or end of content
    let end = after_header.find("\n# ").unwrap_or(after_header.len());

    Some(after_header[..end].trim())
}

/// Mustache-style replacement of {{var}} in a single left-to-right pass
///
/// Substituted values are never rescanned, so transaction text containing
/// `{{...}}` reaches the provider verbatim. Unknown placeholders are kept.
fn substitute(template: &str, vars: &HashMap<&str, &str>) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find("}}") else {
            result.push_str(&rest[start..]);
            return result;
        };

        match vars.get(&after[..end]) {
            Some(value) => {
                result.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                result.push_str("{{");
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionId;

    #[test]
    fn test_parse_prompt() {
        let content = r#"---
id: test_prompt
version: 1
---

# System
Test system prompt.

# User
Test user prompt with {{variable}}.
"#;

        let (metadata, body) = parse_prompt(content).unwrap();
        assert_eq!(metadata.id, "test_prompt");
        assert_eq!(metadata.version, 1);
        assert!(body.contains("# System"));
        assert!(body.contains("# User"));
    }

    #[test]
    fn test_parse_prompt_requires_frontmatter() {
        assert!(parse_prompt("# System\nhi").is_err());
        assert!(parse_prompt("---\nid: x\nversion: 1\n# System").is_err());
    }

    #[test]
    fn test_extract_section() {
        let content = r#"# System
System content here.

# User
User content here."#;

        assert_eq!(
            extract_section(content, "# System"),
            Some("System content here.")
        );
        assert_eq!(
            extract_section(content, "# User"),
            Some("User content here.")
        );
        assert_eq!(extract_section(content, "# Other"), None);
    }

    #[test]
    fn test_default_prompt_parses() {
        let lib = PromptLibrary::embedded_only();
        for id in PromptId::all() {
            let prompt = lib.get(*id).unwrap();
            assert_eq!(prompt.metadata.id, id.as_str());
            assert!(!prompt.is_override());
            assert!(prompt.system_section().is_some());
            assert!(prompt.user_section().is_some());
        }
    }

    #[test]
    fn test_render_categorization() {
        let lib = PromptLibrary::embedded_only();
        let prompt = lib.get(PromptId::CategorizeTransactions).unwrap();
        let categories = CategorySet::new(["Pets", "Shopping"], "Uncategorized");
        let items = vec![ClassificationItem {
            id: TransactionId::from(7),
            detail: "Vet Clinic - checkup".to_string(),
        }];

        let rendered = prompt.render_categorization(&categories, &items).unwrap();

        assert!(rendered.system.contains("categorized_transactions"));
        assert!(rendered
            .system
            .contains(r#"["Uncategorized","Pets","Shopping"]"#));
        assert!(rendered
            .system
            .contains(r#"When in doubt, categorize as "Uncategorized""#));
        assert!(!rendered.system.contains("{{"));

        let payload: serde_json::Value = serde_json::from_str(&rendered.user).unwrap();
        assert_eq!(payload[0]["id"], "7");
        assert_eq!(payload[0]["detail"], "Vet Clinic - checkup");
    }

    #[test]
    fn test_override_dir_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("categorize_transactions.md"),
            "---\nid: categorize_transactions\nversion: 2\n---\n# System\nCustom {{fallback}}\n\n# User\n{{transactions}}\n",
        )
        .unwrap();

        let lib = PromptLibrary::with_override_dir(dir.path().to_path_buf());
        let prompt = lib.get(PromptId::CategorizeTransactions).unwrap();
        assert!(prompt.is_override());
        assert_eq!(prompt.metadata.version, 2);

        let rendered = prompt
            .render_categorization(&CategorySet::default(), &[])
            .unwrap();
        assert_eq!(rendered.system, "Custom Uncategorized");
        assert_eq!(rendered.user, "[]");
    }

    #[test]
    fn test_missing_override_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let lib = PromptLibrary::with_override_dir(dir.path().to_path_buf());
        let prompt = lib.get(PromptId::CategorizeTransactions).unwrap();
        assert!(!prompt.is_override());
        assert_eq!(
            lib.override_path(PromptId::CategorizeTransactions),
            Some(dir.path().join("categorize_transactions.md"))
        );
    }

    #[test]
    fn test_substitute_does_not_rescan_values() {
        let mut vars = HashMap::new();
        vars.insert("a", "{{b}}");
        vars.insert("b", "B");
        assert_eq!(substitute("{{a}}-{{b}}", &vars), "{{b}}-B");
        assert_eq!(substitute("{{unknown}} {{b}}", &vars), "{{unknown}} B");
        assert_eq!(substitute("{{x {{b}}", &vars), "{{x B");
        assert_eq!(substitute("open {{b", &vars), "open {{b");
    }

    #[test]
    fn test_render_keeps_braces_in_transaction_text() {
        let prompt = PromptLibrary::embedded_only()
            .get(PromptId::CategorizeTransactions)
            .unwrap();
        let detail = "Shop - ref {{fallback}} {{categories}}";
        let items = vec![ClassificationItem {
            id: TransactionId::from(1),
            detail: detail.to_string(),
        }];

        // HashMap order differs between renders
        for _ in 0..50 {
            let rendered = prompt
                .render_categorization(&CategorySet::default(), &items)
                .unwrap();
            let payload: serde_json::Value = serde_json::from_str(&rendered.user).unwrap();
            assert_eq!(payload[0]["detail"], detail);
        }
    }

    #[test]
    fn test_render_requires_sections() {
        let prompt = Prompt {
            metadata: PromptMetadata {
                id: "broken".into(),
                version: 1,
            },
            content: "# System\nonly system".into(),
            override_path: None,
        };
        assert!(prompt.render(&HashMap::new()).is_err());
    }
}
