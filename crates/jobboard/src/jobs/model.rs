use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Industry vocabulary accepted on job postings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Industry {
    Business,
    #[serde(rename = "Information Technology")]
    InformationTechnology,
    Banking,
    #[serde(rename = "Education/Training")]
    EducationTraining,
    Telecommunication,
    Others,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    Permanent,
    Temporary,
    Internship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinEducation {
    Bachelors,
    Masters,
    Phd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Experience {
    #[serde(rename = "No Experience")]
    None,
    #[serde(rename = "1 year - 2 years")]
    OneToTwoYears,
    #[serde(rename = "2 year - 5 years")]
    TwoToFiveYears,
    #[serde(rename = "More than 5 years")]
    MoreThanFiveYears,
}

/// One recorded application against a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    pub name: String,
    pub email: String,
    pub applied_at: DateTime<Utc>,
}

/// A stored job posting. Wire field names stay camelCase to match the
/// public query surface (`sort=-postingDate`, `salary[gte]=...`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub slug: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub address: String,
    pub company: String,
    pub industry: Vec<Industry>,
    pub job_type: JobType,
    pub min_education: MinEducation,
    pub positions: u32,
    pub experience: Experience,
    pub salary: u64,
    pub posting_date: DateTime<Utc>,
    pub last_date: DateTime<Utc>,
    #[serde(default)]
    pub applicants_applied: Vec<Applicant>,
}

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// Application window length when the posting does not name a closing date.
const DEFAULT_POSTING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum JobValidationError {
    #[error("please enter a job title")]
    TitleRequired,
    #[error("job title can not exceed {TITLE_MAX_CHARS} characters")]
    TitleTooLong,
    #[error("please enter a job description")]
    DescriptionRequired,
    #[error("job description can not exceed {DESCRIPTION_MAX_CHARS} characters")]
    DescriptionTooLong,
    #[error("please add a valid email address")]
    InvalidEmail,
    #[error("please add an address")]
    AddressRequired,
    #[error("please add a company name")]
    CompanyRequired,
    #[error("please select at least one industry")]
    IndustryRequired,
}

impl Job {
    pub fn validate(&self) -> Result<(), JobValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(JobValidationError::TitleRequired);
        }
        if title.chars().count() > TITLE_MAX_CHARS {
            return Err(JobValidationError::TitleTooLong);
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(JobValidationError::DescriptionRequired);
        }
        if description.chars().count() > DESCRIPTION_MAX_CHARS {
            return Err(JobValidationError::DescriptionTooLong);
        }
        if let Some(email) = &self.email {
            if !email_is_plausible(email) {
                return Err(JobValidationError::InvalidEmail);
            }
        }
        if self.address.trim().is_empty() {
            return Err(JobValidationError::AddressRequired);
        }
        if self.company.trim().is_empty() {
            return Err(JobValidationError::CompanyRequired);
        }
        if self.industry.is_empty() {
            return Err(JobValidationError::IndustryRequired);
        }
        Ok(())
    }
}

/// Inbound posting payload; the service derives the slug and fills date
/// defaults before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub email: Option<String>,
    pub address: String,
    pub company: String,
    pub industry: Vec<Industry>,
    pub job_type: JobType,
    pub min_education: MinEducation,
    #[serde(default = "default_positions")]
    pub positions: u32,
    pub experience: Experience,
    pub salary: u64,
    #[serde(default)]
    pub posting_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_date: Option<DateTime<Utc>>,
}

fn default_positions() -> u32 {
    1
}

impl JobDraft {
    pub fn into_job(self, now: DateTime<Utc>) -> Job {
        let posting_date = self.posting_date.unwrap_or(now);
        let last_date = self
            .last_date
            .unwrap_or(posting_date + Duration::days(DEFAULT_POSTING_WINDOW_DAYS));
        Job {
            id: None,
            slug: slugify(&self.title),
            title: self.title,
            description: self.description,
            email: self.email,
            address: self.address,
            company: self.company,
            industry: self.industry,
            job_type: self.job_type,
            min_education: self.min_education,
            positions: self.positions,
            experience: self.experience,
            salary: self.salary,
            posting_date,
            last_date,
            applicants_applied: Vec::new(),
        }
    }
}

/// Partial update; only provided fields change. A new title re-derives the
/// slug.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
    pub industry: Option<Vec<Industry>>,
    pub job_type: Option<JobType>,
    pub min_education: Option<MinEducation>,
    pub positions: Option<u32>,
    pub experience: Option<Experience>,
    pub salary: Option<u64>,
    pub last_date: Option<DateTime<Utc>>,
}

impl JobUpdate {
    pub fn apply_to(self, job: &mut Job) {
        if let Some(title) = self.title {
            job.slug = slugify(&title);
            job.title = title;
        }
        if let Some(description) = self.description {
            job.description = description;
        }
        if let Some(email) = self.email {
            job.email = Some(email);
        }
        if let Some(address) = self.address {
            job.address = address;
        }
        if let Some(company) = self.company {
            job.company = company;
        }
        if let Some(industry) = self.industry {
            job.industry = industry;
        }
        if let Some(job_type) = self.job_type {
            job.job_type = job_type;
        }
        if let Some(min_education) = self.min_education {
            job.min_education = min_education;
        }
        if let Some(positions) = self.positions {
            job.positions = positions;
        }
        if let Some(experience) = self.experience {
            job.experience = experience;
        }
        if let Some(salary) = self.salary {
            job.salary = salary;
        }
        if let Some(last_date) = self.last_date {
            job.last_date = last_date;
        }
    }
}

/// URL-friendly slug: lowercased, alphanumeric runs joined by single
/// hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;
    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

fn email_is_plausible(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> JobDraft {
        JobDraft {
            title: "Senior Software Engineer".to_string(),
            description: "Build and run the jobs platform.".to_string(),
            email: Some("hiring@acme.example".to_string()),
            address: "12 Harbor Way".to_string(),
            company: "Acme".to_string(),
            industry: vec![Industry::InformationTechnology],
            job_type: JobType::Permanent,
            min_education: MinEducation::Bachelors,
            positions: 2,
            experience: Experience::TwoToFiveYears,
            salary: 90000,
            posting_date: None,
            last_date: None,
        }
    }

    #[test]
    fn slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("Senior Software Engineer"), "senior-software-engineer");
        assert_eq!(slugify("C++ / Rust Developer!"), "c-rust-developer");
        assert_eq!(slugify("  Node.js  "), "node-js");
    }

    #[test]
    fn draft_fills_date_defaults() {
        let now = Utc::now();
        let job = draft().into_job(now);
        assert_eq!(job.posting_date, now);
        assert_eq!(job.last_date, now + Duration::days(7));
        assert_eq!(job.slug, "senior-software-engineer");
        job.validate().expect("valid job");
    }

    #[test]
    fn validation_rejects_overlong_title_and_bad_email() {
        let now = Utc::now();

        let mut long_title = draft();
        long_title.title = "x".repeat(TITLE_MAX_CHARS + 1);
        assert_eq!(
            long_title.into_job(now).validate(),
            Err(JobValidationError::TitleTooLong)
        );

        let mut bad_email = draft();
        bad_email.email = Some("not-an-address".to_string());
        assert_eq!(
            bad_email.into_job(now).validate(),
            Err(JobValidationError::InvalidEmail)
        );

        let mut no_industry = draft();
        no_industry.industry = Vec::new();
        assert_eq!(
            no_industry.into_job(now).validate(),
            Err(JobValidationError::IndustryRequired)
        );
    }

    #[test]
    fn update_rederives_slug_with_new_title() {
        let mut job = draft().into_job(Utc::now());
        JobUpdate {
            title: Some("Staff Engineer".to_string()),
            salary: Some(120000),
            ..JobUpdate::default()
        }
        .apply_to(&mut job);

        assert_eq!(job.slug, "staff-engineer");
        assert_eq!(job.salary, 120000);
        assert_eq!(job.company, "Acme");
    }

    #[test]
    fn wire_names_are_camel_case() {
        let job = draft().into_job(Utc::now());
        let value = serde_json::to_value(&job).expect("serialize");
        assert!(value.get("jobType").is_some());
        assert!(value.get("postingDate").is_some());
        assert_eq!(value.get("industry").unwrap()[0], "Information Technology");
    }
}
