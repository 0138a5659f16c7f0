use crate::error::{BoardError, Result};
use crate::sentiment::strip_markers;

/// Default maximum word length in characters
pub const MAX_WORD_LENGTH: usize = 50;
/// Default maximum template length in characters
pub const MAX_TEMPLATE_LENGTH: usize = 300;
/// Maximum contributor name length in characters
pub const MAX_CONTRIBUTOR_LENGTH: usize = 100;

/// Validation for words, templates and contributor names
#[derive(Debug, Copy, Clone)]
pub struct InputValidator {
    max_word_length: usize,
    max_template_length: usize,
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new(MAX_WORD_LENGTH, MAX_TEMPLATE_LENGTH)
    }
}

impl InputValidator {
    /// Create a validator with explicit length bounds
    #[must_use]
    pub const fn new(max_word_length: usize, max_template_length: usize) -> Self {
        Self {
            max_word_length,
            max_template_length,
        }
    }

    /// Validate a word
    pub fn validate_word(&self, word: &str) -> Result<()> {
        let trimmed = word.trim();
        if trimmed.is_empty() {
            return Err(BoardError::EmptyWord);
        }

        if trimmed.chars().count() > self.max_word_length {
            return Err(BoardError::WordTooLong {
                max: self.max_word_length,
            });
        }

        if trimmed.chars().any(char::is_control) {
            return Err(BoardError::InvalidWord(trimmed.to_string()));
        }

        Ok(())
    }

    /// Validate a single template; a bare marker counts as empty
    pub fn validate_template(&self, template: &str) -> Result<()> {
        let text = strip_markers(template);
        if text.trim().is_empty() {
            return Err(BoardError::EmptyTemplate);
        }

        if template.trim().chars().count() > self.max_template_length {
            return Err(BoardError::TemplateTooLong {
                max: self.max_template_length,
            });
        }

        Ok(())
    }

    /// Validate a word's full template list
    pub fn validate_templates<S: AsRef<str>>(&self, templates: &[S]) -> Result<()> {
        if templates.is_empty() {
            return Err(BoardError::NoTemplates);
        }

        for template in templates {
            self.validate_template(template.as_ref())?;
        }

        if let Some(duplicate) = first_duplicate(templates) {
            return Err(BoardError::DuplicateTemplate(duplicate));
        }

        Ok(())
    }

    /// Validate a word together with its templates
    pub fn validate_word_input<S: AsRef<str>>(&self, word: &str, templates: &[S]) -> Result<()> {
        self.validate_word(word)?;
        self.validate_templates(templates)
    }

    /// Validate a contributor display name
    pub fn validate_contributor_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(BoardError::InvalidContributor(
                "Contributor name cannot be empty".to_string(),
            ));
        }

        if name.chars().count() > MAX_CONTRIBUTOR_LENGTH {
            return Err(BoardError::InvalidContributor(format!(
                "Contributor name too long (max {MAX_CONTRIBUTOR_LENGTH} characters)"
            )));
        }

        if name.chars().any(char::is_control) {
            return Err(BoardError::InvalidContributor(
                "Contributor name contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }
}

/// True if two templates are equal after trimming
#[must_use]
pub fn has_duplicate_templates<S: AsRef<str>>(templates: &[S]) -> bool {
    first_duplicate(templates).is_some()
}

fn first_duplicate<S: AsRef<str>>(templates: &[S]) -> Option<String> {
    let mut seen = std::collections::HashSet::new();
    templates
        .iter()
        .map(|t| t.as_ref().trim())
        .find(|t| !seen.insert(*t))
        .map(ToString::to_string)
}

/// Split raw multi-template input into templates.
///
/// Commas and newlines separate templates except inside a `${...}` marker or
/// placeholder. A marker stays open for splitting purposes until one more
/// character follows its `}`, so `a${x},b` is a single template. Each
/// template is trimmed and empty ones are dropped.
#[must_use]
pub fn parse_templates(raw: &str) -> Vec<String> {
    let mut templates = Vec::new();
    let mut current = String::new();
    let mut in_placeholder = false;
    let mut in_marker = false;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '$' if chars.peek() == Some(&'{') => {
                in_placeholder = true;
                in_marker = true;
                current.push(c);
            },
            '}' if in_placeholder => {
                in_placeholder = false;
                current.push(c);
            },
            ',' | '\n' if !in_marker => {
                push_trimmed(&mut templates, &current);
                current.clear();
            },
            _ => {
                current.push(c);
                if !in_placeholder && last_marker_closed(&current) {
                    in_marker = false;
                }
            },
        }
    }
    push_trimmed(&mut templates, &current);

    templates
}

fn last_marker_closed(text: &str) -> bool {
    match (text.rfind("${"), text.rfind('}')) {
        (Some(open), Some(close)) => close > open,
        _ => false,
    }
}

fn push_trimmed(templates: &mut Vec<String>, candidate: &str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        templates.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_templates_keeps_commas_inside_markers() {
        let parsed = parse_templates("${บวก}${a,b}one, ${กลาง}two\nthree,,");
        assert_eq!(parsed, vec!["${บวก}${a,b}one", "${กลาง}two", "three"]);
    }

    #[test]
    fn test_bare_marker_is_empty_template() {
        let validator = InputValidator::default();
        assert!(matches!(
            validator.validate_template("${บวก}  "),
            Err(BoardError::EmptyTemplate)
        ));
    }
}
