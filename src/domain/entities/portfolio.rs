use serde::Serialize;

use crate::entities::{
    education::EducationEntry,
    profile::Profile,
    project::{Project, ProjectSummary},
};

/// What the public portfolio page shows.
///
/// `Pending` stands in for "still loading": a user who never saved a profile
/// keeps showing it instead of an error.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PortfolioView {
    Pending,
    Ready {
        profile: PublicProfile,
        projects: Vec<ProjectSummary>,
    },
}

impl PortfolioView {
    pub fn ready(user_id: &str, profile: Profile, projects: Vec<Project>, current_year: i32) -> Self {
        PortfolioView::Ready {
            profile: PublicProfile {
                user_id: user_id.to_string(),
                display_name: profile.display_name,
                bio: profile.bio,
                hobbies: profile.hobbies,
                education: profile
                    .education
                    .into_iter()
                    .map(|entry| PublicEducation::new(entry, current_year))
                    .collect(),
            },
            projects: projects.into_iter().map(ProjectSummary::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PublicProfile {
    pub user_id: String,
    pub display_name: String,
    pub bio: String,
    pub hobbies: String,
    pub education: Vec<PublicEducation>,
}

#[derive(Debug, Serialize)]
pub struct PublicEducation {
    pub school: String,
    pub degree: String,
    pub specialization: String,
    pub start_year: String,
    pub end_year: String,
    pub ongoing: bool,
}

impl PublicEducation {
    fn new(entry: EducationEntry, current_year: i32) -> Self {
        let ongoing = entry.is_ongoing_in(current_year);
        PublicEducation {
            school: entry.school,
            degree: entry.degree,
            specialization: entry.specialization,
            start_year: entry.start_year,
            end_year: entry.end_year,
            ongoing,
        }
    }
}
