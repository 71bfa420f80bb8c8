//! Seed data for `--offline` runs.

use jiff::{SignedDuration, Timestamp};

use crate::backend::MemoryBackend;
use crate::types::{Issue, IssueCategory, IssueStatus, UserProfile};

pub const DEMO_USER_ID: &str = "demo-user";

struct Seed {
    title: &'static str,
    description: &'static str,
    category: IssueCategory,
    location: &'static str,
    status: IssueStatus,
    hours_ago: i64,
    votes: u32,
    position: Option<(f64, f64)>,
    owner: &'static str,
}

const SEEDS: &[Seed] = &[
    Seed {
        title: "Pothole on Main Street",
        description: "Deep pothole in the eastbound lane, cars swerve to avoid it.",
        category: IssueCategory::Road,
        location: "Main Street & 3rd Avenue",
        status: IssueStatus::Pending,
        hours_ago: 5,
        votes: 9,
        position: Some((40.7142, -74.0059)),
        owner: "neighbor-1",
    },
    Seed {
        title: "Water leak near the library",
        description: "Clean water has been running down the curb for two days.",
        category: IssueCategory::Water,
        location: "Public Library, Elm Street",
        status: IssueStatus::InProgress,
        hours_ago: 30,
        votes: 14,
        position: Some((40.7306, -73.9866)),
        owner: "neighbor-2",
    },
    Seed {
        title: "Overflowing bins in the park",
        description: "Trash cans by the playground have not been emptied this week.",
        category: IssueCategory::Sanitation,
        location: "Riverside Park playground",
        status: IssueStatus::Pending,
        hours_ago: 52,
        votes: 3,
        position: Some((40.8010, -73.9712)),
        owner: DEMO_USER_ID,
    },
    Seed {
        title: "Street light out on Pine",
        description: "The light at the corner has been dark since the storm.",
        category: IssueCategory::Electricity,
        location: "Pine Street & 4th Avenue",
        status: IssueStatus::Resolved,
        hours_ago: 120,
        votes: 21,
        position: Some((40.7075, -74.0113)),
        owner: "neighbor-1",
    },
    Seed {
        title: "Graffiti on the underpass",
        description: "Large tags covering the pedestrian underpass walls.",
        category: IssueCategory::Other,
        location: "Harbor Road underpass",
        status: IssueStatus::InProgress,
        hours_ago: 75,
        votes: 2,
        position: None,
        owner: "neighbor-3",
    },
    Seed {
        title: "Cracked sidewalk by school",
        description: "Raised slab is a tripping hazard for kids walking to school.",
        category: IssueCategory::Road,
        location: "Lincoln Elementary, Oak Avenue",
        status: IssueStatus::Pending,
        hours_ago: 10,
        votes: 6,
        position: Some((40.7484, -73.9857)),
        owner: "neighbor-2",
    },
];

/// Sample issues created relative to `now`.
pub fn demo_issues(now: Timestamp) -> Vec<Issue> {
    SEEDS
        .iter()
        .enumerate()
        .map(|(i, seed)| {
            let created_at = now - SignedDuration::from_hours(seed.hours_ago);
            Issue {
                id: format!("demo-{}", i + 1),
                title: seed.title.to_string(),
                description: seed.description.to_string(),
                category: seed.category,
                location: seed.location.to_string(),
                status: seed.status,
                created_at,
                updated_at: created_at,
                user_id: seed.owner.to_string(),
                image_url: None,
                votes: seed.votes,
                latitude: seed.position.map(|p| p.0),
                longitude: seed.position.map(|p| p.1),
            }
        })
        .collect()
}

/// In-memory backend with the sample issues, signed in as the demo user.
pub fn demo_backend() -> MemoryBackend {
    let backend = MemoryBackend::with_issues(demo_issues(Timestamp::now()));
    backend.insert_profile(UserProfile {
        id: DEMO_USER_ID.to_string(),
        name: Some("Demo Resident".to_string()),
        email: Some("demo@example.org".to_string()),
        bio: None,
    });
    backend.as_user(DEMO_USER_ID)
}
