use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::{Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;

use jobboard::error::AppError;
use jobboard::jobs::{Experience, Industry, JobDraft, JobService, JobType, MinEducation, JOBS_COLLECTION};
use jobboard::store::{DocumentStore, InMemoryStore};
use jobboard::users::{Role, User, UserService, USERS_COLLECTION};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Store wired with the text indexes the search stage relies on.
pub(crate) fn build_store() -> InMemoryStore {
    InMemoryStore::new()
        .with_text_index(JOBS_COLLECTION, ["title", "description", "company"])
        .with_text_index(USERS_COLLECTION, ["name"])
}

/// Seed a handful of postings and accounts so the demo command and a fresh
/// `serve --seed-demo` have data to filter.
pub(crate) async fn seed_demo_data<S>(
    jobs: &JobService<S>,
    users: &UserService<S>,
) -> Result<(), AppError>
where
    S: DocumentStore,
{
    for (title, company, industry, job_type, salary, positions, days_ago) in [
        (
            "Senior Software Engineer",
            "Harborview Systems",
            Industry::InformationTechnology,
            JobType::Permanent,
            120_000,
            2,
            1,
        ),
        (
            "Software Engineer",
            "Northbank Financial",
            Industry::Banking,
            JobType::Permanent,
            90_000,
            3,
            4,
        ),
        (
            "Data Engineer",
            "Harborview Systems",
            Industry::InformationTechnology,
            JobType::Temporary,
            75_000,
            1,
            2,
        ),
        (
            "Teaching Assistant",
            "Lakeside Institute",
            Industry::EducationTraining,
            JobType::Internship,
            28_000,
            5,
            6,
        ),
        (
            "Network Operations Analyst",
            "Citywide Telecom",
            Industry::Telecommunication,
            JobType::Permanent,
            64_000,
            2,
            3,
        ),
    ] {
        let posting_date = Utc::now() - Duration::days(days_ago);
        jobs.create(JobDraft {
            title: title.to_string(),
            description: format!("{title} at {company}."),
            email: Some("hiring@".to_string() + &company.to_lowercase().replace(' ', "-") + ".example"),
            address: "Remote".to_string(),
            company: company.to_string(),
            industry: vec![industry],
            job_type,
            min_education: MinEducation::Bachelors,
            positions,
            experience: Experience::OneToTwoYears,
            salary,
            posting_date: Some(posting_date),
            last_date: Some(posting_date + Duration::days(30)),
        })
        .await?;
    }

    for (name, email, role) in [
        ("Avery Reed", "avery@example.com", Role::Employer),
        ("Sam Field", "sam@example.com", Role::User),
        ("Jordan Blake", "jordan@example.com", Role::Admin),
    ] {
        users
            .register(User {
                id: None,
                name: name.to_string(),
                email: email.to_string(),
                role,
                created_at: Utc::now(),
            })
            .await?;
    }

    Ok(())
}
