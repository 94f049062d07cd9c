//! Profile completion: draft editing, validation, avatar upload and save.

use crate::error::ClientError;
use crate::http::ApiClient;
use crate::session::Viewer;
use crate::shell::Route;
use crate::upload::ImageUploader;
use chrono::NaiveDate;
use common_lib::{NewUserRecord, UserSummary};
use email_address::EmailAddress;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.\-]+$").unwrap());

const USERNAME_MIN_LENGTH: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FirstName,
    LastName,
    Age,
    Dob,
    Email,
    Username,
    CountryCode,
    Phone,
    Bio,
    Avatar,
    General,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::FirstName => "first_name",
            Field::LastName => "last_name",
            Field::Age => "age",
            Field::Dob => "dob",
            Field::Email => "email",
            Field::Username => "username",
            Field::CountryCode => "country_code",
            Field::Phone => "phone",
            Field::Bio => "bio",
            Field::Avatar => "avatar",
            Field::General => "general",
        }
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_name" => Ok(Field::FirstName),
            "last_name" => Ok(Field::LastName),
            "age" => Ok(Field::Age),
            "dob" => Ok(Field::Dob),
            "email" => Ok(Field::Email),
            "username" => Ok(Field::Username),
            "country_code" => Ok(Field::CountryCode),
            "phone" => Ok(Field::Phone),
            "bio" => Ok(Field::Bio),
            "avatar" | "avatar_url" => Ok(Field::Avatar),
            "general" => Ok(Field::General),
            other => Err(format!("unknown field: {other}")),
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-field validation or server messages, in form order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

/// Values entered on the profile form.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub age: String,
    pub dob: String,
    pub country_code: String,
    pub phone: String,
    pub bio: String,
    /// Hosted image URL, set once an upload succeeded.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Local image still waiting to be uploaded.
    #[serde(default)]
    pub avatar_file: Option<PathBuf>,
}

impl ProfileDraft {
    /// Empty draft with email and username taken from the identity claims.
    pub fn prefilled(viewer: &Viewer) -> Self {
        ProfileDraft {
            email: viewer.email.clone().unwrap_or_default(),
            username: viewer.username.clone().unwrap_or_default(),
            ..Default::default()
        }
    }

    /// Sets a field as typed, dropping leading whitespace.
    ///
    /// [`Field::General`] only ever carries server messages and cannot be set.
    pub fn set(&mut self, field: Field, value: &str) -> Result<(), String> {
        let value = value.trim_start().to_string();
        match field {
            Field::FirstName => self.first_name = value,
            Field::LastName => self.last_name = value,
            Field::Age => self.age = value,
            Field::Dob => self.dob = value,
            Field::Email => self.email = value,
            Field::Username => self.username = value,
            Field::CountryCode => self.country_code = value,
            Field::Phone => self.phone = value,
            Field::Bio => self.bio = value,
            Field::Avatar => {
                self.avatar_url = Some(value).filter(|v| !v.is_empty());
            }
            Field::General => return Err(format!("{field} is not an editable field")),
        }
        Ok(())
    }

    fn has_avatar(&self) -> bool {
        self.avatar_url.as_deref().is_some_and(|u| !u.trim().is_empty())
            || self.avatar_file.is_some()
    }

    /// E.164 form of the number, `+<country code><number>`, or `None`
    /// while either part is missing.
    pub fn international_phone(&self) -> Option<String> {
        let code = self.country_code.trim().trim_start_matches('+');
        let phone: String = self.phone.chars().filter(|c| !c.is_whitespace()).collect();
        if code.is_empty() || phone.is_empty() {
            return None;
        }
        Some(format!("+{code}{phone}"))
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();

        if self.first_name.trim().is_empty() {
            errors.insert(Field::FirstName, "First name is required.");
        }
        if self.last_name.trim().is_empty() {
            errors.insert(Field::LastName, "Last name is required.");
        }
        if !self
            .age
            .trim()
            .parse::<f64>()
            .is_ok_and(|age| age.is_finite() && age > 0.0)
        {
            errors.insert(Field::Age, "Valid age required.");
        }
        if NaiveDate::parse_from_str(self.dob.trim(), "%Y-%m-%d").is_err() {
            errors.insert(Field::Dob, "Date of birth required.");
        }
        if !is_valid_email(self.email.trim()) {
            errors.insert(Field::Email, "Valid email is required.");
        }

        let username = self.username.trim();
        if username.is_empty() {
            errors.insert(Field::Username, "Username is required.");
        } else if username.chars().count() < USERNAME_MIN_LENGTH {
            errors.insert(
                Field::Username,
                "Username must be at least 3 characters long.",
            );
        } else if !USERNAME_REGEX.is_match(username) {
            errors.insert(
                Field::Username,
                "Username can only contain letters, numbers, underscores, periods, or hyphens.",
            );
        }

        if !self
            .international_phone()
            .is_some_and(|number| is_valid_phone(&number))
        {
            errors.insert(Field::Phone, "Valid phone number required.");
        }
        if self.bio.trim().is_empty() {
            errors.insert(Field::Bio, "Bio is required.");
        }
        if !self.has_avatar() {
            errors.insert(Field::Avatar, "Avatar upload is required.");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn to_record(&self, avatar_url: String, identity_user_id: &str) -> NewUserRecord {
        NewUserRecord {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            age: self.age.trim().to_string(),
            dob: self.dob.trim().to_string(),
            country_code: self.country_code.trim().to_string(),
            phone: self.phone.trim().to_string(),
            bio: self.bio.trim().to_string(),
            avatar_url,
            identity_user_id: Some(identity_user_id.to_string()),
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    EmailAddress::from_str(email)
        .map(|address| {
            let domain = address.domain();
            domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        })
        .unwrap_or(false)
}

fn is_valid_phone(number: &str) -> bool {
    phonenumber::parse(None, number)
        .map(|parsed| phonenumber::is_valid(&parsed))
        .unwrap_or(false)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProfilePhase {
    #[default]
    Editing,
    Validating,
    Uploading,
    Submitting,
    Saved,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Banner {
    Success(String),
    Error(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// The draft failed validation; nothing was sent.
    Invalid(FieldErrors),
    /// The avatar upload failed; the profile was not saved.
    UploadFailed(String),
    /// The backend refused the profile.
    Rejected(FieldErrors),
    Saved {
        user: Option<UserSummary>,
        navigate_to: Route,
    },
}

pub struct ProfileController {
    viewer_id: String,
    draft: ProfileDraft,
    phase: ProfilePhase,
    errors: FieldErrors,
    banner: Option<Banner>,
}

impl ProfileController {
    pub fn new(viewer: &Viewer) -> Self {
        Self::with_draft(viewer, ProfileDraft::prefilled(viewer))
    }

    pub fn with_draft(viewer: &Viewer, draft: ProfileDraft) -> Self {
        ProfileController {
            viewer_id: viewer.user_id.clone(),
            draft,
            phase: ProfilePhase::Editing,
            errors: FieldErrors::default(),
            banner: None,
        }
    }

    pub fn draft(&self) -> &ProfileDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ProfileDraft {
        &mut self.draft
    }

    pub fn phase(&self) -> ProfilePhase {
        self.phase
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    /// Validates, uploads the avatar when one is pending, and saves.
    ///
    /// Nothing reaches the network unless the whole draft is valid. A
    /// successful upload is kept on the draft so a retry does not upload
    /// the same image twice.
    pub async fn submit(
        &mut self,
        api: &ApiClient,
        uploader: &dyn ImageUploader,
    ) -> SubmitOutcome {
        self.banner = None;
        self.phase = ProfilePhase::Validating;

        if let Err(errors) = self.draft.validate() {
            log::debug!("profile draft invalid - fields: {}", errors.len());
            self.errors = errors.clone();
            self.phase = ProfilePhase::Editing;
            return SubmitOutcome::Invalid(errors);
        }
        self.errors = FieldErrors::default();

        let avatar_url = match self.resolve_avatar(uploader).await {
            Ok(url) => url,
            Err(e) => {
                let message = format!("Upload failed: {e}");
                self.errors.insert(Field::Avatar, message.clone());
                self.phase = ProfilePhase::Editing;
                return SubmitOutcome::UploadFailed(message);
            }
        };

        self.phase = ProfilePhase::Submitting;
        let record = self.draft.to_record(avatar_url, &self.viewer_id);
        match api.create_user(&record).await {
            Ok(user) => {
                log::info!("profile saved - username: {}", record.username);
                self.phase = ProfilePhase::Saved;
                self.banner = Some(Banner::Success("Profile saved successfully!".to_string()));
                SubmitOutcome::Saved {
                    user,
                    navigate_to: Route::Dashboard,
                }
            }
            Err(e) => {
                self.apply_save_error(&e);
                self.phase = ProfilePhase::Editing;
                SubmitOutcome::Rejected(self.errors.clone())
            }
        }
    }

    async fn resolve_avatar(&mut self, uploader: &dyn ImageUploader) -> Result<String, ClientError> {
        if let Some(url) = self.draft.avatar_url.as_ref().filter(|u| !u.trim().is_empty()) {
            return Ok(url.clone());
        }
        let Some(file) = self.draft.avatar_file.clone() else {
            return Err(ClientError::Upload("no image selected".to_string()));
        };

        self.phase = ProfilePhase::Uploading;
        let url = uploader.upload(&file).await?;
        self.draft.avatar_url = Some(url.clone());
        self.draft.avatar_file = None;
        Ok(url)
    }

    fn apply_save_error(&mut self, error: &ClientError) {
        log::warn!("profile save failed: {error}");
        match error.conflict_message() {
            Some(message) if message.contains("username already exists") => {
                self.errors
                    .insert(Field::Username, "This username is already taken.");
                self.banner = Some(Banner::Error(
                    "Username already taken. Please choose a different one.".to_string(),
                ));
            }
            Some(message) if message.contains("Email is already in use") => {
                self.errors
                    .insert(Field::Email, "This email is already in use.");
                self.banner = Some(Banner::Error(
                    "Email is already in use. Please use a different email.".to_string(),
                ));
            }
            Some(message) => {
                self.errors.insert(Field::General, message);
                self.banner = Some(Banner::Error(message.to_string()));
            }
            None => {
                let message = format!("Failed to save profile: {error}");
                self.errors.insert(Field::General, message.clone());
                self.banner = Some(Banner::Error(message));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> ProfileDraft {
        ProfileDraft {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            username: "ada_l".to_string(),
            email: "ada@example.com".to_string(),
            age: "36".to_string(),
            dob: "1815-12-10".to_string(),
            country_code: "1".to_string(),
            phone: "2015550123".to_string(),
            bio: "First programmer.".to_string(),
            avatar_url: Some("https://img.example.com/ada.png".to_string()),
            avatar_file: None,
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert_eq!(valid_draft().validate(), Ok(()));
    }

    #[test]
    fn test_empty_draft_reports_every_field() {
        let errors = ProfileDraft::default().validate().unwrap_err();
        for field in [
            Field::FirstName,
            Field::LastName,
            Field::Age,
            Field::Dob,
            Field::Email,
            Field::Username,
            Field::Phone,
            Field::Bio,
            Field::Avatar,
        ] {
            assert!(errors.get(field).is_some(), "missing error for {field}");
        }
    }

    #[test]
    fn test_age_must_be_positive_number() {
        for age in ["", "0", "-3", "abc", "NaN", "inf"] {
            let mut draft = valid_draft();
            draft.age = age.to_string();
            let errors = draft.validate().unwrap_err();
            assert_eq!(errors.get(Field::Age), Some("Valid age required."));
        }

        let mut draft = valid_draft();
        draft.age = "4.5".to_string();
        assert_eq!(draft.validate(), Ok(()));
    }

    #[test]
    fn test_dob_must_be_iso_date() {
        let mut draft = valid_draft();
        draft.dob = "10/12/1815".to_string();
        assert!(draft.validate().unwrap_err().get(Field::Dob).is_some());

        draft.dob = "1815-02-30".to_string();
        assert!(draft.validate().unwrap_err().get(Field::Dob).is_some());
    }

    #[test]
    fn test_email_rules() {
        assert!(is_valid_email("ada@example.com"));
        assert!(!is_valid_email("ada@localhost"));
        assert!(!is_valid_email("ada.example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_username_rules() {
        let cases = [
            ("", "Username is required."),
            ("ab", "Username must be at least 3 characters long."),
            (
                "ada lovelace",
                "Username can only contain letters, numbers, underscores, periods, or hyphens.",
            ),
        ];
        for (username, message) in cases {
            let mut draft = valid_draft();
            draft.username = username.to_string();
            assert_eq!(
                draft.validate().unwrap_err().get(Field::Username),
                Some(message)
            );
        }

        let mut draft = valid_draft();
        draft.username = "a.b-c_1".to_string();
        assert_eq!(draft.validate(), Ok(()));
    }

    #[test]
    fn test_phone_rules() {
        let mut draft = valid_draft();
        assert_eq!(draft.international_phone().as_deref(), Some("+12015550123"));

        draft.country_code = "+1".to_string();
        draft.phone = "201 555 0123".to_string();
        assert_eq!(draft.international_phone().as_deref(), Some("+12015550123"));
        assert_eq!(draft.validate(), Ok(()));

        draft.phone = "12".to_string();
        assert!(draft.validate().unwrap_err().get(Field::Phone).is_some());

        draft.phone = "+12015550123".to_string();
        draft.country_code = String::new();
        assert_eq!(draft.international_phone(), None);
        assert_eq!(
            draft.validate().unwrap_err().get(Field::Phone),
            Some("Valid phone number required.")
        );
    }

    #[test]
    fn test_pending_file_counts_as_avatar() {
        let mut draft = valid_draft();
        draft.avatar_url = None;
        assert!(draft.validate().unwrap_err().get(Field::Avatar).is_some());

        draft.avatar_file = Some(PathBuf::from("/tmp/ada.png"));
        assert_eq!(draft.validate(), Ok(()));
    }

    #[test]
    fn test_set_trims_leading_whitespace() {
        let mut draft = ProfileDraft::default();
        draft.set(Field::FirstName, "  Ada ").unwrap();
        draft.set(Field::Avatar, "   ").unwrap();
        assert_eq!(draft.first_name, "Ada ");
        assert_eq!(draft.avatar_url, None);
    }

    #[test]
    fn test_general_field_is_not_editable() {
        let mut draft = valid_draft();
        assert!(draft.set(Field::General, "anything").is_err());
        assert_eq!(draft, valid_draft());
    }

    #[test]
    fn test_prefilled_from_claims() {
        let viewer = Viewer {
            user_id: "user_1".to_string(),
            email: Some("ada@example.com".to_string()),
            username: Some("ada_l".to_string()),
            is_admin: false,
        };
        let draft = ProfileDraft::prefilled(&viewer);
        assert_eq!(draft.email, "ada@example.com");
        assert_eq!(draft.username, "ada_l");
        assert_eq!(draft.first_name, "");
    }

    #[test]
    fn test_record_carries_identity_id() {
        let record = valid_draft().to_record("https://img/x.png".to_string(), "user_1");
        assert_eq!(record.identity_user_id.as_deref(), Some("user_1"));
        assert_eq!(record.avatar_url, "https://img/x.png");
        assert_eq!(record.username, "ada_l");
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in [
            Field::FirstName,
            Field::Dob,
            Field::Avatar,
            Field::Phone,
            Field::General,
        ] {
            assert_eq!(field.name().parse::<Field>(), Ok(field));
        }
    }
}
