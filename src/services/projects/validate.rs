//! 项目字段校验

use crate::models::projects::requests::{CreateProjectRequest, UpdateProjectRequest};

pub const TITLE_MIN_CHARS: usize = 5;
pub const TITLE_MAX_CHARS: usize = 100;
pub const TAGLINE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MIN_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 5000;

fn check_title(title: &str) -> Result<(), String> {
    let len = title.trim().chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&len) {
        return Err(format!(
            "Title length must be between {TITLE_MIN_CHARS} and {TITLE_MAX_CHARS} characters"
        ));
    }
    Ok(())
}

fn check_tagline(tagline: &str) -> Result<(), String> {
    if tagline.chars().count() > TAGLINE_MAX_CHARS {
        return Err(format!(
            "Tagline cannot exceed {TAGLINE_MAX_CHARS} characters"
        ));
    }
    Ok(())
}

fn check_description(description: &str) -> Result<(), String> {
    let len = description.trim().chars().count();
    if !(DESCRIPTION_MIN_CHARS..=DESCRIPTION_MAX_CHARS).contains(&len) {
        return Err(format!(
            "Description length must be between {DESCRIPTION_MIN_CHARS} and {DESCRIPTION_MAX_CHARS} characters"
        ));
    }
    Ok(())
}

fn check_url(field: &str, url: &str) -> Result<(), String> {
    if url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(format!("{field} must be an http(s) URL"))
    }
}

fn check_urls(
    demo_url: Option<&String>,
    video_url: Option<&String>,
    github_url: Option<&String>,
) -> Result<(), String> {
    if let Some(url) = demo_url {
        check_url("Demo URL", url)?;
    }
    if let Some(url) = video_url {
        check_url("Video URL", url)?;
    }
    if let Some(url) = github_url {
        check_url("GitHub URL", url)?;
    }
    Ok(())
}

pub fn validate_create(req: &CreateProjectRequest) -> Result<(), String> {
    check_title(&req.title)?;
    if let Some(tagline) = &req.tagline {
        check_tagline(tagline)?;
    }
    check_description(&req.description)?;
    check_urls(
        req.demo_url.as_ref(),
        req.video_url.as_ref(),
        req.github_url.as_ref(),
    )
}

pub fn validate_update(req: &UpdateProjectRequest) -> Result<(), String> {
    if let Some(title) = &req.title {
        check_title(title)?;
    }
    if let Some(tagline) = &req.tagline {
        check_tagline(tagline)?;
    }
    if let Some(description) = &req.description {
        check_description(description)?;
    }
    check_urls(
        req.demo_url.as_ref(),
        req.video_url.as_ref(),
        req.github_url.as_ref(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateProjectRequest {
        CreateProjectRequest {
            title: "Solar Tracker".to_string(),
            tagline: Some("Follow the sun".to_string()),
            description: "x".repeat(DESCRIPTION_MIN_CHARS),
            technologies: vec!["rust".to_string()],
            demo_url: Some("https://demo.example.com".to_string()),
            video_url: None,
            github_url: None,
        }
    }

    #[test]
    fn test_valid_project() {
        assert!(validate_create(&request()).is_ok());
    }

    #[test]
    fn test_title_bounds() {
        let mut req = request();
        req.title = "Abcd".to_string();
        assert!(validate_create(&req).is_err());
        req.title = "a".repeat(TITLE_MAX_CHARS + 1);
        assert!(validate_create(&req).is_err());
        req.title = "a".repeat(TITLE_MAX_CHARS);
        assert!(validate_create(&req).is_ok());
    }

    #[test]
    fn test_description_counts_chars() {
        let mut req = request();
        req.description = "评".repeat(DESCRIPTION_MIN_CHARS);
        assert!(validate_create(&req).is_ok());
        req.description = "short".to_string();
        assert!(validate_create(&req).is_err());
    }

    #[test]
    fn test_url_scheme() {
        let mut req = request();
        req.github_url = Some("ftp://example.com/repo".to_string());
        assert_eq!(
            validate_create(&req).unwrap_err(),
            "GitHub URL must be an http(s) URL"
        );
    }

    #[test]
    fn test_update_only_checks_present_fields() {
        assert!(validate_update(&UpdateProjectRequest::default()).is_ok());
        let update = UpdateProjectRequest {
            tagline: Some("t".repeat(TAGLINE_MAX_CHARS + 1)),
            ..Default::default()
        };
        assert!(validate_update(&update).is_err());
    }
}
