use crate::infra::{build_service, parse_category, AppService};
use clap::Args;
use job_triage::config::AppConfig;
use job_triage::error::AppError;
use job_triage::telemetry;
use job_triage::workflows::triage::{BoardSummary, BoardView, Category, RefreshOutcome};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ListArgs {
    /// Category to print (new, saved, applied, archived). Defaults to new.
    #[arg(long, value_parser = parse_category)]
    pub(crate) category: Option<Category>,
    /// Print at most this many postings
    #[arg(long)]
    pub(crate) limit: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct MoveArgs {
    /// Target category (saved, applied, archived, or new to unclassify)
    #[arg(value_parser = parse_category)]
    pub(crate) category: Category,
    /// Posting identifier
    pub(crate) id: String,
}

pub(crate) async fn run_list(args: ListArgs) -> Result<(), AppError> {
    let service = prepare().await?;
    let view = service.view(args.category);
    print!("{}", render_view(&view, args.limit));
    Ok(())
}

pub(crate) async fn run_move(args: MoveArgs) -> Result<(), AppError> {
    let service = prepare().await?;
    let summary = service.move_identifier(args.category, &args.id)?;
    let category = service.category_of(&args.id);
    println!("Posting {} is now {}", args.id, category);
    print!("{}", render_summary(&summary));
    Ok(())
}

pub(crate) async fn run_purge() -> Result<(), AppError> {
    let service = prepare().await?;
    let advice = service.purge_advice();
    let summary = service.purge_unused()?;
    println!(
        "Purged {} stale identifier(s); {} remain",
        advice.stale_ids,
        advice.stored_ids.saturating_sub(advice.stale_ids)
    );
    print!("{}", render_summary(&summary));
    Ok(())
}

/// Loads config, opens the file-backed board and applies one fetch so every
/// command sees live postings.
async fn prepare() -> Result<Arc<AppService>, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let service = build_service(&config)?;
    if let RefreshOutcome::Applied { summary, .. } = service.refresh().await? {
        if summary.counts.new > 0 {
            println!("There are {} new job(s) available.", summary.counts.new);
        }
    }
    Ok(service)
}

fn render_summary(summary: &BoardSummary) -> String {
    let counts = &summary.counts;
    let mut out = format!(
        "new {} | saved {} | applied {} | archived {}\n",
        counts.new, counts.saved, counts.applied, counts.archived
    );
    if summary.purge_recommended {
        out.push_str("Stored identifiers greatly outnumber live postings; run `purge`.\n");
    }
    out
}

fn render_view(view: &BoardView, limit: Option<usize>) -> String {
    let mut out = format!("{}\n", view.heading);
    let shown = limit.unwrap_or(view.postings.len());

    for posting in view.postings.iter().take(shown) {
        let marker = if posting.relevant { "*" } else { " " };
        out.push_str(&format!(
            "{marker} [{}] {} | {} | {}\n",
            posting.id, posting.title, posting.company, posting.location
        ));
        let mut details = Vec::new();
        if let Some(created) = &posting.created_label {
            details.push(created.clone());
        }
        if let Some(contract) = &posting.contract_label {
            details.push(contract.clone());
        }
        if !details.is_empty() {
            out.push_str(&format!("    {}\n", details.join(" | ")));
        }
        out.push_str(&format!("    {}\n", posting.redirect_url));
    }

    if view.postings.len() > shown {
        out.push_str(&format!("  ... {} more\n", view.postings.len() - shown));
    }
    out.push_str(&render_summary(&BoardSummary {
        category: view.active_category,
        counts: view.counts,
        displayed: view.postings.len(),
        purge_recommended: view.purge_recommended,
    }));
    out
}
