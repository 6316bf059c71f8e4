//! User data models

use serde::{Deserialize, Serialize};

/// A registered student account.
///
/// Accounts are created by the institutional SSO collaborator; this store
/// only persists them. The `show_*` flags control whether the matching
/// attributes are visible to other users in the candidate feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: usize,
    pub email: String,
    pub display_name: String,
    pub student_id: Option<String>,
    pub course: Option<String>,
    pub year: Option<u32>,
    pub faculty: Option<String>,
    pub show_course: bool,
    pub show_year: bool,
    pub show_faculty: bool,
    /// Unix timestamp.
    pub created: i64,
}

/// Fields accepted when the SSO collaborator registers an account.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub student_id: Option<String>,
    pub course: Option<String>,
    pub year: Option<u32>,
    pub faculty: Option<String>,
}

impl User {
    /// The course/year/faculty attributes as other users may see them.
    pub fn visible_attributes(&self) -> (Option<&str>, Option<u32>, Option<&str>) {
        (
            if self.show_course {
                self.course.as_deref()
            } else {
                None
            },
            if self.show_year { self.year } else { None },
            if self.show_faculty {
                self.faculty.as_deref()
            } else {
                None
            },
        )
    }
}
