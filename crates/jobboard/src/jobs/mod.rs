//! Job-posting domain: models, service facade, and HTTP router.

pub mod model;
pub mod router;
pub mod service;

pub use model::{
    Applicant, Experience, Industry, Job, JobDraft, JobType, JobUpdate, JobValidationError,
    MinEducation,
};
pub use router::job_router;
pub use service::{ApplicationRequest, JobService, JobServiceError, JobStats, JOBS_COLLECTION};
