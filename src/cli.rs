use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::analytics::{DEFAULT_TOP_N, DEFAULT_WINDOW_DAYS};
use crate::query::{Choice, SortKey};
use crate::types::{IssueCategory, IssueStatus, VALID_CATEGORIES, VALID_STATUSES};

#[derive(Parser)]
#[command(name = "civicsync")]
#[command(about = "Report, browse, vote on and map civic issues")]
#[command(version)]
pub struct Cli {
    /// Use built-in sample data instead of the hosted backend
    #[arg(long, global = true)]
    pub offline: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List issues a page at a time
    #[command(visible_alias = "ls")]
    Browse {
        /// Category: road, water, sanitation, electricity, other, or all
        #[arg(short, long, default_value = "all", value_parser = parse_category_choice)]
        category: Choice<IssueCategory>,

        /// Status: pending, in-progress, resolved, or all
        #[arg(short, long, default_value = "all", value_parser = parse_status_choice)]
        status: Choice<IssueStatus>,

        /// Text to find in title, description or location
        #[arg(short = 'q', long)]
        search: Option<String>,

        /// Sort: newest, votes, location
        #[arg(long, default_value = "newest", value_parser = parse_sort)]
        sort: SortKey,

        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,
    },

    /// Show one issue in full
    Show {
        /// Issue ID
        id: String,
    },

    /// Report a new issue
    Report {
        /// Short title (5-100 characters)
        title: String,

        /// What is wrong (20-1000 characters)
        #[arg(short, long)]
        description: String,

        /// Category: road, water, sanitation, electricity, other
        #[arg(short, long, value_parser = parse_category)]
        category: IssueCategory,

        /// Where it is (5-200 characters)
        #[arg(short, long)]
        location: String,

        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,

        /// Photo to attach
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Edit an issue you reported while it is still pending
    Edit {
        /// Issue ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long, value_parser = parse_category)]
        category: Option<IssueCategory>,

        #[arg(short, long)]
        location: Option<String>,

        #[arg(short, long, value_parser = parse_status)]
        status: Option<IssueStatus>,

        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,

        /// Replace the photo
        #[arg(long, conflicts_with = "remove_image")]
        image: Option<PathBuf>,

        /// Remove the photo
        #[arg(long)]
        remove_image: bool,
    },

    /// Delete an issue you reported while it is still pending
    Delete {
        /// Issue ID
        id: String,
    },

    /// Support an issue with your vote
    Vote {
        /// Issue ID
        id: String,
    },

    /// Issues you reported
    Mine {
        /// Status: pending, in-progress, resolved, or all
        #[arg(short, long, default_value = "all", value_parser = parse_status_choice)]
        status: Choice<IssueStatus>,
    },

    /// Issues you voted on
    Voted,

    /// Show or change a profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Category split, daily reports and most supported issues
    Analytics {
        /// Trailing window in days
        #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: u32,

        /// Length of the most-supported list
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
    },

    /// Show the markers the map would draw
    Map {
        /// Categories to show (repeatable; default: all)
        #[arg(short, long = "category", value_parser = parse_category)]
        categories: Vec<IssueCategory>,

        /// Statuses to show (repeatable; default: pending and in-progress)
        #[arg(short, long = "status", value_parser = parse_status)]
        statuses: Vec<IssueStatus>,

        /// Text to find in titles
        #[arg(short = 'q', long)]
        search: Option<String>,

        /// Issue to select and fly to
        #[arg(long)]
        select: Option<String>,
    },

    /// Look up a place by name or address
    Geocode {
        /// Place or address text
        text: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show a profile (yours by default)
    Show {
        /// User ID
        user_id: Option<String>,
    },
    /// Update your name or bio
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Dotted key, e.g. backend.url
        key: String,
        value: String,
    },
    /// Get a configuration value
    Get {
        /// Dotted key, e.g. browse.page_size
        key: String,
    },
}

/// Generic validation helper for parsing values with a standard error message format.
fn parse_with_validation<T, F>(
    s: &str,
    parser: F,
    field_name: &str,
    valid_values: &[&str],
) -> Result<T, String>
where
    F: FnOnce(&str) -> Result<T, String>,
{
    parser(s).map_err(|_| {
        format!(
            "Invalid {}. Must be one of: {}",
            field_name,
            valid_values.join(", ")
        )
    })
}

fn parse_category(s: &str) -> Result<IssueCategory, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "category",
        VALID_CATEGORIES,
    )
}

fn parse_status(s: &str) -> Result<IssueStatus, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "status",
        VALID_STATUSES,
    )
}

fn parse_category_choice(s: &str) -> Result<Choice<IssueCategory>, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "category",
        &[VALID_CATEGORIES, &["all"]].concat(),
    )
}

fn parse_status_choice(s: &str) -> Result<Choice<IssueStatus>, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "status",
        &[VALID_STATUSES, &["all"]].concat(),
    )
}

fn parse_sort(s: &str) -> Result<SortKey, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "sort key",
        SortKey::ALL_STRINGS,
    )
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_browse_defaults() {
        let cli = Cli::try_parse_from(["civicsync", "browse"]).unwrap();
        match cli.command {
            Commands::Browse {
                category,
                status,
                sort,
                page,
                ..
            } => {
                assert_eq!(category, Choice::All);
                assert_eq!(status, Choice::All);
                assert_eq!(sort, SortKey::Newest);
                assert_eq!(page, 1);
            }
            _ => panic!("expected browse"),
        }
    }

    #[test]
    fn test_rejects_unknown_category() {
        let err = Cli::try_parse_from(["civicsync", "browse", "--category", "potholes"])
            .err()
            .unwrap()
            .to_string();
        assert!(err.contains("Must be one of: road, water"), "{err}");
    }

    #[test]
    fn test_map_takes_repeated_filters() {
        let cli = Cli::try_parse_from([
            "civicsync", "--offline", "map", "-c", "road", "-c", "water", "-s", "resolved",
        ])
        .unwrap();
        assert!(cli.offline);
        match cli.command {
            Commands::Map {
                categories,
                statuses,
                ..
            } => {
                assert_eq!(categories, [IssueCategory::Road, IssueCategory::Water]);
                assert_eq!(statuses, [IssueStatus::Resolved]);
            }
            _ => panic!("expected map"),
        }
    }

    #[test]
    fn test_report_coordinates_travel_together() {
        assert!(
            Cli::try_parse_from([
                "civicsync",
                "report",
                "Broken hydrant",
                "-d",
                "Leaking all over the sidewalk",
                "-c",
                "water",
                "-l",
                "Fifth and Pine",
                "--lat",
                "40.7",
            ])
            .is_err()
        );
    }
}
