use crate::infra::{build_store, seed_demo_data};
use clap::Args;
use std::sync::Arc;

use jobboard::config::PaginationConfig;
use jobboard::error::AppError;
use jobboard::jobs::JobService;
use jobboard::query::ParamMap;
use jobboard::users::UserService;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Filter on an industry value, e.g. "Banking"
    #[arg(long)]
    pub(crate) industry: Option<String>,
    /// Minimum salary, applied as salary[gte]
    #[arg(long)]
    pub(crate) min_salary: Option<u64>,
    /// Free-text phrase; hyphens become spaces, e.g. software-engineer
    #[arg(long)]
    pub(crate) q: Option<String>,
    /// Sort specification, e.g. -salary or company,-postingDate
    #[arg(long)]
    pub(crate) sort: Option<String>,
    /// Page number (1-based)
    #[arg(long)]
    pub(crate) page: Option<usize>,
    /// Page size
    #[arg(long)]
    pub(crate) limit: Option<usize>,
}

/// Seed the in-memory store and print one filtered listing, exercising the
/// same pipeline the HTTP listing endpoint runs.
pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(build_store());
    let jobs = Arc::new(JobService::new(
        store.clone(),
        PaginationConfig::DEFAULT_MAX_PAGE_SIZE,
    ));
    let users = Arc::new(UserService::new(
        store,
        PaginationConfig::DEFAULT_MAX_PAGE_SIZE,
    ));
    seed_demo_data(&jobs, &users).await?;

    let mut pairs: Vec<(String, String)> = Vec::new();
    if let Some(industry) = args.industry {
        pairs.push(("industry".to_string(), industry));
    }
    if let Some(min_salary) = args.min_salary {
        pairs.push(("salary[gte]".to_string(), min_salary.to_string()));
    }
    if let Some(q) = args.q {
        pairs.push(("q".to_string(), q));
    }
    if let Some(sort) = args.sort {
        pairs.push(("sort".to_string(), sort));
    }
    if let Some(page) = args.page {
        pairs.push(("page".to_string(), page.to_string()));
    }
    if let Some(limit) = args.limit {
        pairs.push(("limit".to_string(), limit.to_string()));
    }

    let documents = jobs.list(ParamMap::from_pairs(pairs)).await?;

    println!("results: {}", documents.len());
    for document in &documents {
        let field = |name: &str| {
            document
                .get(name)
                .map(|value| match value {
                    serde_json::Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_else(|| "-".to_string())
        };
        println!(
            "  {:<30} {:<22} salary {:>8}  posted {}",
            field("title"),
            field("company"),
            field("salary"),
            field("postingDate"),
        );
    }

    Ok(())
}
