use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, OutputOptions, print_json};
use crate::analytics::IssueAnalytics;
use crate::backend::IssueBackend;
use crate::controller::BrowseController;
use crate::display::{format_status_colored, issue_table, print_issue_list, print_page};
use crate::error::Result;
use crate::map::MapView;
use crate::query::{Choice, IssueFilter, SortKey, StatusFilter};
use crate::types::{IssueCategory, IssueStatus};

/// Browse list criteria from the command line
#[derive(Debug, Clone)]
pub struct BrowseOptions {
    pub category: Choice<IssueCategory>,
    pub status: Choice<IssueStatus>,
    pub search: Option<String>,
    pub sort: SortKey,
    pub page: i64,
    pub page_size: usize,
}

/// List issues a page at a time
pub async fn cmd_browse<B: IssueBackend>(
    backend: &B,
    options: BrowseOptions,
    output: OutputOptions,
) -> Result<()> {
    let mut controller = BrowseController::new(options.page_size, MapView::default());
    controller.refresh(backend).await?;

    controller.set_category(options.category);
    controller.set_status(options.status);
    if let Some(search) = &options.search {
        controller.set_search(search);
    }
    controller.set_sort(options.sort);
    controller.set_page(options.page);

    let page = controller.page_view();

    if output.json {
        return print_json(&page);
    }

    if options.page > page.page as i64 {
        println!(
            "{}",
            format!(
                "Page {} is past the end; showing page {}.",
                options.page, page.page
            )
            .dimmed()
        );
    }
    print_page(&page, controller.criteria());
    Ok(())
}

/// List the signed-in user's own issues with per-status counts
pub async fn cmd_mine<B: IssueBackend>(
    backend: &B,
    status: Choice<IssueStatus>,
    output: OutputOptions,
) -> Result<()> {
    let issues = backend.user_issues().await?;
    let counts = IssueAnalytics::status_counts(&issues);
    let filter = StatusFilter::new(status);
    let shown: Vec<_> = issues.into_iter().filter(|i| filter.matches(i)).collect();

    let summary = IssueStatus::ALL
        .iter()
        .map(|s| format!("{} {}", format_status_colored(*s), counts.for_status(*s)))
        .collect::<Vec<_>>()
        .join("  ");
    let text = if shown.is_empty() {
        format!("{summary}\n\nYou have not reported any issues matching this filter.")
    } else {
        format!("{summary}\n\n{}", issue_table(&shown))
    };

    CommandOutput::new(json!({
        "counts": counts,
        "issues": shown,
    }))
    .with_text(text)
    .print(output)
}

/// List issues the signed-in user has voted on
pub async fn cmd_voted<B: IssueBackend>(backend: &B, output: OutputOptions) -> Result<()> {
    let issues = backend.voted_issues().await?;
    if output.json {
        return print_json(&issues);
    }
    print_issue_list(&issues, "You have not voted on any issues yet.");
    Ok(())
}
