use jiff::Zoned;
use jiff::tz::TimeZone;

use super::{OutputOptions, print_json};
use crate::analytics::IssueAnalytics;
use crate::backend::IssueBackend;
use crate::display::print_analytics;
use crate::error::Result;

/// Dashboard: category split, daily reports, most supported issues
pub async fn cmd_analytics<B: IssueBackend>(
    backend: &B,
    days: u32,
    top: usize,
    output: OutputOptions,
) -> Result<()> {
    let issues = backend.list_issues().await?;
    let today = Zoned::now().with_time_zone(TimeZone::UTC).date();
    let report = IssueAnalytics::report(&issues, days.max(1), top, today);

    if output.json {
        return print_json(&report);
    }
    print_analytics(&report);
    Ok(())
}
