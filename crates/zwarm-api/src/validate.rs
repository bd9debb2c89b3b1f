use url::Url;

use crate::error::{ApiError, FieldError};

/// Accumulates field-level violations so one 400 response reports all of
/// them at once instead of failing on the first.
#[derive(Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

fn length(value: &str) -> usize {
    value.chars().count()
}

pub fn mission_fields(v: &mut Validator, title: &str, description: &str, tags: Option<&[String]>) {
    if length(title) < 3 {
        v.push("title", "Title must be at least 3 characters long.");
    } else if length(title) > 100 {
        v.push("title", "Title can be at most 100 characters.");
    }

    if length(description) < 10 {
        v.push("description", "Description must be at least 10 characters long.");
    } else if length(description) > 5000 {
        v.push("description", "Description can be at most 5000 characters.");
    }

    if let Some(tags) = tags {
        if tags.len() > 5 {
            v.push("tags", "You can add a maximum of 5 tags.");
        }
        for (i, tag) in tags.iter().enumerate() {
            if tag.is_empty() {
                v.push(format!("tags[{}]", i), "Tag cannot be empty.");
            } else if length(tag) > 25 {
                v.push(format!("tags[{}]", i), "Tag cannot be longer than 25 characters.");
            } else if !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                v.push(
                    format!("tags[{}]", i),
                    "Tag can only contain letters, numbers, and hyphens.",
                );
            }
        }
    }
}

pub fn task_text(v: &mut Validator, text: &str) {
    if text.is_empty() {
        v.push("text", "Task text cannot be empty.");
    } else if length(text) > 500 {
        v.push("text", "Task text can be at most 500 characters.");
    }
}

pub fn comment_content(v: &mut Validator, content: &str) {
    if content.is_empty() {
        v.push("content", "Comment cannot be empty.");
    } else if length(content) > 1000 {
        v.push("content", "Comment is too long.");
    }
}

pub fn resource_fields(v: &mut Validator, title: &str, url: &str, description: Option<&str>) {
    if title.is_empty() {
        v.push("title", "Title cannot be empty.");
    } else if length(title) > 100 {
        v.push("title", "Title can be at most 100 characters.");
    }

    if length(url) > 500 || Url::parse(url).is_err() {
        v.push("url", "Must be a valid URL (e.g., http://example.com).");
    }

    if let Some(description) = description {
        if length(description) > 500 {
            v.push("description", "Description can be at most 500 characters.");
        }
    }
}

pub fn username(v: &mut Validator, username: &str) {
    if length(username) < 3 {
        v.push("username", "Username must be at least 3 characters.");
    } else if length(username) > 25 {
        v.push("username", "Username can be at most 25 characters.");
    } else if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        v.push("username", "Username can only contain letters, numbers, and underscores.");
    }
}

pub fn settings_fields(
    v: &mut Validator,
    name: Option<&str>,
    bio: Option<&str>,
    skills: Option<&[String]>,
) {
    if let Some(name) = name {
        username(v, name);
    }
    if let Some(bio) = bio {
        if length(bio) > 500 {
            v.push("bio", "Bio must be at most 500 characters.");
        }
    }
    if let Some(skills) = skills {
        if skills.len() > 10 {
            v.push("skills", "You can add up to 10 skills.");
        }
    }
}

pub fn register_fields(v: &mut Validator, email: &str, name: &str, password: &str) {
    if !email.contains('@') || length(email) > 255 {
        v.push("email", "Must be a valid email address.");
    }
    username(v, name);
    if password.len() < 8 {
        v.push("password", "Password must be at least 8 characters.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(f: impl FnOnce(&mut Validator)) -> Vec<String> {
        let mut v = Validator::new();
        f(&mut v);
        match v.finish() {
            Ok(()) => vec![],
            Err(ApiError::Validation(details)) => details.into_iter().map(|d| d.field).collect(),
            Err(_) => unreachable!(),
        }
    }

    #[test]
    fn mission_bounds_accept_the_happy_path() {
        let tags = vec!["aerospace".to_string(), "diy-rockets".to_string()];
        let fields = run(|v| {
            mission_fields(v, "Build a Rocket", "Reach 1000ft", Some(tags.as_slice()));
        });
        assert!(fields.is_empty());
    }

    #[test]
    fn every_violated_field_is_reported() {
        let fields = run(|v| mission_fields(v, "ab", "short", None));
        assert_eq!(fields, vec!["title", "description"]);
    }

    #[test]
    fn tag_rules_flag_each_bad_entry() {
        let tags = vec![
            "ok-tag".to_string(),
            "".to_string(),
            "has space".to_string(),
            "x".repeat(26),
        ];
        let fields = run(|v| mission_fields(v, "Garden Project", "A sustainable garden", Some(tags.as_slice())));
        assert_eq!(fields, vec!["tags[1]", "tags[2]", "tags[3]"]);
    }

    #[test]
    fn too_many_tags_is_a_single_list_error() {
        let tags: Vec<String> = (0..6).map(|i| format!("tag-{}", i)).collect();
        let fields = run(|v| mission_fields(v, "Garden Project", "A sustainable garden", Some(tags.as_slice())));
        assert_eq!(fields, vec!["tags"]);
    }

    #[test]
    fn resource_url_must_be_absolute() {
        assert_eq!(
            run(|v| resource_fields(v, "Docs", "not a url", None)),
            vec!["url"]
        );
        assert_eq!(
            run(|v| resource_fields(v, "Docs", "/relative/path", None)),
            vec!["url"]
        );
        assert!(run(|v| resource_fields(v, "Docs", "https://example.com/guide", None)).is_empty());
    }

    #[test]
    fn username_charset_is_restricted() {
        assert!(run(|v| username(v, "rocket_girl99")).is_empty());
        assert_eq!(run(|v| username(v, "no spaces")), vec!["username"]);
        assert_eq!(run(|v| username(v, "ab")), vec!["username"]);
    }

    #[test]
    fn bounds_count_characters_not_bytes() {
        // 3 characters, 12 bytes: must satisfy the 3-char title minimum
        let title = "🚀🚀🚀";
        assert!(run(|v| mission_fields(v, title, "A long enough description", None)).is_empty());
    }
}
