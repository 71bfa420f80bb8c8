//! Terminal rendering of issues, markers and analytics.

use owo_colors::{OwoColorize, Stream};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::analytics::AnalyticsReport;
use crate::map::Marker;
use crate::pagination::Page;
use crate::query::BrowseCriteria;
use crate::types::{Issue, IssueStatus, UserProfile};
use crate::utils::truncate_string;
use crate::vote::VoteState;

const ID_WIDTH: usize = 8;
const TITLE_WIDTH: usize = 40;
const LOCATION_WIDTH: usize = 28;

pub fn format_status_colored(status: IssueStatus) -> String {
    format_status_colored_with_format(status, |s| format!("[{s}]"))
}

pub fn format_status_colored_with_format<F>(status: IssueStatus, format_fn: F) -> String
where
    F: Fn(&str) -> String,
{
    let badge = format_fn(&status.to_string());
    match status {
        IssueStatus::Pending => badge
            .if_supports_color(Stream::Stdout, |s| s.yellow())
            .to_string(),
        IssueStatus::InProgress => badge
            .if_supports_color(Stream::Stdout, |s| s.cyan())
            .to_string(),
        IssueStatus::Resolved => badge
            .if_supports_color(Stream::Stdout, |s| s.green())
            .to_string(),
    }
}

fn short_id(id: &str) -> String {
    id.chars().take(ID_WIDTH).collect()
}

/// A row in the issue list table
#[derive(Tabled)]
struct IssueRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Votes")]
    votes: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Reported")]
    reported: String,
}

impl IssueRow {
    fn new(issue: &Issue) -> Self {
        Self {
            id: short_id(&issue.id),
            title: truncate_string(&issue.title, TITLE_WIDTH),
            category: issue.category.display_name().to_string(),
            status: format_status_colored(issue.status),
            votes: issue.votes.to_string(),
            location: truncate_string(&issue.location, LOCATION_WIDTH),
            reported: issue.created_at.strftime("%Y-%m-%d").to_string(),
        }
    }
}

pub fn issue_table(issues: &[Issue]) -> String {
    let rows: Vec<IssueRow> = issues.iter().map(IssueRow::new).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

pub fn print_issue_list(issues: &[Issue], empty_message: &str) {
    if issues.is_empty() {
        println!("{empty_message}");
    } else {
        println!("{}", issue_table(issues));
    }
}

/// What to say when the browse list comes back empty.
pub fn empty_browse_message(criteria: &BrowseCriteria) -> &'static str {
    if criteria.is_default() {
        "No issues have been reported yet."
    } else {
        "No issues match these filters. Run without filters to see everything."
    }
}

pub fn print_page(page: &Page<Issue>, criteria: &BrowseCriteria) {
    print_issue_list(&page.items, empty_browse_message(criteria));
    println!(
        "Page {} of {} ({} issue{})",
        page.page,
        page.total_pages,
        page.total_items,
        if page.total_items == 1 { "" } else { "s" }
    );
}

pub fn print_issue_detail(issue: &Issue, viewer: Option<&str>, vote_state: VoteState) {
    println!("{}", issue.title.bold());
    println!(
        "{} {}  {} vote{}",
        format_status_colored(issue.status),
        issue.category.display_name(),
        issue.votes,
        if issue.votes == 1 { "" } else { "s" }
    );
    println!("ID:        {}", issue.id.cyan());
    println!("Location:  {}", issue.location);
    if let Some(point) = issue.coordinates() {
        println!("Position:  {:.5}, {:.5}", point.lat, point.lng);
    }
    println!("Reported:  {}", issue.created_at.strftime("%Y-%m-%d %H:%M UTC"));
    if issue.updated_at != issue.created_at {
        println!("Updated:   {}", issue.updated_at.strftime("%Y-%m-%d %H:%M UTC"));
    }
    if let Some(url) = &issue.image_url {
        println!("Photo:     {url}");
    }
    println!();
    println!("{}", issue.description);
    println!();

    match vote_state {
        VoteState::Committed => println!("{}", "You have voted on this issue.".dimmed()),
        _ if viewer.is_some() => println!("Vote with: civicsync vote {}", issue.id),
        _ => {}
    }
    if issue.is_editable_by(viewer) {
        println!("You reported this issue and can still edit or delete it.");
    }
}

/// A row in the map marker table
#[derive(Tabled)]
struct MarkerRow {
    #[tabled(rename = "")]
    glyph: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Lat")]
    lat: String,
    #[tabled(rename = "Lng")]
    lng: String,
}

impl MarkerRow {
    fn new(marker: &Marker) -> Self {
        let glyph = marker.category.marker_glyph().to_string();
        Self {
            glyph: if marker.selected {
                format!("*{glyph}")
            } else {
                glyph
            },
            id: short_id(&marker.issue_id),
            title: truncate_string(&marker.title, TITLE_WIDTH),
            status: format_status_colored(marker.status),
            lat: format!("{:.4}", marker.position.lat),
            lng: if marker.placed {
                format!("{:.4}", marker.position.lng)
            } else {
                format!("{:.4} (approx.)", marker.position.lng)
            },
        }
    }
}

pub fn marker_table(markers: &[Marker]) -> String {
    let rows: Vec<MarkerRow> = markers.iter().map(MarkerRow::new).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

pub fn print_profile(profile: &UserProfile) {
    println!("ID:    {}", profile.id.cyan());
    println!("Name:  {}", profile.name.as_deref().unwrap_or("(not set)"));
    println!("Email: {}", profile.email.as_deref().unwrap_or("(not set)"));
    match profile.bio.as_deref() {
        Some(bio) if !bio.is_empty() => println!("\n{bio}"),
        _ => {}
    }
}

/// Horizontal bar scaled so the largest count fills `width` cells.
fn bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let cells = (count * width).div_ceil(max);
    "█".repeat(cells)
}

pub fn print_analytics(report: &AnalyticsReport) {
    println!("{}", "Overview".bold());
    println!(
        "  {} issues: {} pending, {} in progress, {} resolved ({} on the map)",
        report.total,
        report.statuses.pending,
        report.statuses.in_progress,
        report.statuses.resolved,
        report.mapped
    );

    println!("\n{}", "By category".bold());
    let max = report.categories.iter().map(|c| c.count).max().unwrap_or(0);
    for entry in &report.categories {
        println!("  {:<12} {:>4} {}", entry.label, entry.count, bar(entry.count, max, 30));
    }

    println!("\n{}", "Reported per day".bold());
    let max = report.daily.iter().map(|d| d.count).max().unwrap_or(0);
    for day in &report.daily {
        println!(
            "  {} {:>4} {}",
            day.date.strftime("%a %b %d"),
            day.count,
            bar(day.count, max, 30)
        );
    }

    println!("\n{}", "Most supported".bold());
    print_issue_list(&report.top_voted, "  No issues yet.");
}
