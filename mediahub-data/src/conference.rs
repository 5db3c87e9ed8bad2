use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::config::Config;
use crate::schedule::ScheduleState;
use crate::storage::{dir_writable, join_url};

/// Aspect ratios the frontend knows how to render.
pub const ASPECT_RATIOS: [&str; 2] = ["4:3", "16:9"];

/// Slug grammar: word characters, optionally segmented by '/'.
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+(?:/\w+)*$").expect("slug regex"));

/// A managed event series owning schedule/download metadata and media
/// storage paths.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conference {
    pub id: i64,
    pub acronym: String,
    pub slug: String,
    pub title: Option<String>,
    pub schedule_url: Option<String>,
    pub schedule_state: ScheduleState,
    pub logo: Option<String>,
    pub images_path: String,
    pub recordings_path: String,
    pub aspect_ratio: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields for inserting a new conference. The id, schedule state, and
/// timestamps are assigned by the persistence layer.
#[derive(Debug, Clone, Default)]
pub struct NewConference {
    pub acronym: String,
    pub slug: String,
    pub title: Option<String>,
    pub schedule_url: Option<String>,
    pub logo: Option<String>,
    pub images_path: String,
    pub recordings_path: String,
    pub aspect_ratio: Option<String>,
}

/// A field-level validation error reported to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

/// Result of validating a record. No persistence occurs while errors
/// are present.
#[derive(Debug, Default, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<FieldIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are no errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push(FieldIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }
}

impl NewConference {
    /// Field validation applied before insert: presence of acronym and
    /// slug, slug grammar, aspect-ratio membership. Uniqueness is
    /// enforced by the database schema.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();

        if self.acronym.trim().is_empty() {
            result.add_error("acronym", "can't be blank");
        }

        if self.slug.trim().is_empty() {
            result.add_error("slug", "can't be blank");
        } else if !SLUG_RE.is_match(&self.slug) {
            result.add_error("slug", "is invalid");
        }

        if let Some(ref ratio) = self.aspect_ratio {
            if !ASPECT_RATIOS.contains(&ratio.as_str()) {
                result.add_error(
                    "aspect_ratio",
                    &format!("must be one of: {}", ASPECT_RATIOS.join(", ")),
                );
            }
        }

        result
    }
}

impl Conference {
    /// True when a schedule URL is set and non-empty. Gates the download
    /// enqueue.
    pub fn has_schedule_url(&self) -> bool {
        self.schedule_url
            .as_deref()
            .is_some_and(|url| !url.is_empty())
    }

    /// URL of a single event page, derived from the schedule URL by
    /// swapping the trailing `schedule.xml` segment.
    pub fn event_url(&self, event_id: &str) -> Option<String> {
        match self.schedule_url.as_deref() {
            Some(url) if !url.is_empty() => {
                Some(url.replacen("schedule.xml", &format!("events/{}.html", event_id), 1))
            }
            _ => None,
        }
    }

    /// Logo URL as the frontend generates it: always a .png under
    /// `images/logos`, falling back to the shared unknown logo.
    pub fn logo_url(&self, config: &Config) -> String {
        match self.logo.as_deref() {
            Some(logo) if !logo.is_empty() => {
                let stem = Path::new(logo)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(logo);
                let base = join_url(&config.frontend_url, "images/logos");
                join_url(&join_url(&base, &self.images_path), &format!("{}.png", stem))
            }
            _ => join_url(&config.frontend_url, "images/logos/unknown.png"),
        }
    }

    /// Acronym when present, else the numeric id.
    pub fn display_name(&self) -> String {
        if self.acronym.is_empty() {
            self.id.to_string()
        } else {
            self.acronym.clone()
        }
    }

    /// Absolute on-disk location of this conference's image folder.
    pub fn images_dir(&self, config: &Config) -> PathBuf {
        config.images_directory().absolute_path(&self.images_path)
    }

    /// Absolute on-disk location of this conference's recordings folder.
    pub fn recordings_dir(&self, config: &Config) -> PathBuf {
        config
            .recordings_directory()
            .absolute_path(&self.recordings_path)
    }

    /// Precondition check before exposing the record through the API:
    /// both storage directories must be writable. Blocking filesystem
    /// I/O.
    pub fn validate_for_api(&self, config: &Config) -> ValidationResult {
        let mut result = ValidationResult::new();

        let images = self.images_dir(config);
        if !dir_writable(&images) {
            result.add_error(
                "images_path",
                &format!("images path {} not writable", images.display()),
            );
        }

        let recordings = self.recordings_dir(config);
        if !dir_writable(&recordings) {
            result.add_error(
                "recordings_path",
                &format!("recordings path {} not writable", recordings.display()),
            );
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    fn make_conference() -> Conference {
        Conference {
            id: 17,
            acronym: "FOSDEM".to_string(),
            slug: "conferences/fosdem".to_string(),
            title: None,
            schedule_url: None,
            schedule_state: ScheduleState::NotPresent,
            logo: None,
            images_path: "fosdem".to_string(),
            recordings_path: "fosdem".to_string(),
            aspect_ratio: None,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            updated_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_event_url_swaps_schedule_segment() {
        let mut conf = make_conference();
        conf.schedule_url = Some("http://x/schedule.xml".to_string());
        assert_eq!(
            conf.event_url("42").as_deref(),
            Some("http://x/events/42.html")
        );
    }

    #[test]
    fn test_event_url_none_without_url() {
        let conf = make_conference();
        assert!(conf.event_url("42").is_none());

        let mut conf = make_conference();
        conf.schedule_url = Some(String::new());
        assert!(conf.event_url("42").is_none());
    }

    #[test]
    fn test_display_name_prefers_acronym() {
        let conf = make_conference();
        assert_eq!(conf.display_name(), "FOSDEM");

        let mut conf = make_conference();
        conf.acronym = String::new();
        assert_eq!(conf.display_name(), "17");
    }

    #[test]
    fn test_logo_url_replaces_extension_with_png() {
        let (config, _dir) = test_config();
        let mut conf = make_conference();
        conf.logo = Some("foo.jpg".to_string());

        let url = conf.logo_url(&config);
        assert!(
            url.ends_with("/images/logos/fosdem/foo.png"),
            "unexpected url: {}",
            url
        );
        assert!(url.starts_with(&config.frontend_url));
    }

    #[test]
    fn test_logo_url_falls_back_to_unknown() {
        let (config, _dir) = test_config();
        let conf = make_conference();
        assert!(conf
            .logo_url(&config)
            .ends_with("/images/logos/unknown.png"));
    }

    #[test]
    fn test_validate_requires_acronym_and_slug() {
        let new = NewConference::default();
        let result = new.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "acronym"));
        assert!(result.errors.iter().any(|e| e.field == "slug"));
    }

    #[test]
    fn test_validate_slug_grammar() {
        let valid = ["frab23", "conferences/frab23", "a/b/c", "x_1"];
        for slug in valid {
            let new = NewConference {
                acronym: "frab23".to_string(),
                slug: slug.to_string(),
                ..Default::default()
            };
            assert!(new.validate().is_valid(), "slug {} should be valid", slug);
        }

        let invalid = ["/frab23", "frab23/", "a//b", "a b", "a-b"];
        for slug in invalid {
            let new = NewConference {
                acronym: "frab23".to_string(),
                slug: slug.to_string(),
                ..Default::default()
            };
            assert!(
                !new.validate().is_valid(),
                "slug {} should be invalid",
                slug
            );
        }
    }

    #[test]
    fn test_validate_aspect_ratio_membership() {
        let mut new = NewConference {
            acronym: "frab23".to_string(),
            slug: "frab23".to_string(),
            aspect_ratio: Some("16:9".to_string()),
            ..Default::default()
        };
        assert!(new.validate().is_valid());

        new.aspect_ratio = Some("21:9".to_string());
        let result = new.validate();
        assert!(result.errors.iter().any(|e| e.field == "aspect_ratio"));
    }

    #[test]
    fn test_validate_for_api_passes_with_writable_dirs() {
        let (config, _dir) = test_config();
        let conf = make_conference();
        std::fs::create_dir_all(conf.images_dir(&config)).unwrap();
        std::fs::create_dir_all(conf.recordings_dir(&config)).unwrap();

        assert!(conf.validate_for_api(&config).is_valid());
    }

    #[test]
    fn test_validate_for_api_reports_missing_dirs() {
        let (config, _dir) = test_config();
        let conf = make_conference();

        let result = conf.validate_for_api(&config);
        assert!(!result.is_valid());
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors.iter().any(|e| e.field == "images_path"));
        assert!(result.errors.iter().any(|e| e.field == "recordings_path"));
        assert!(result.errors[0].message.contains("not writable"));
    }
}
