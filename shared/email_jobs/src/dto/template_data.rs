use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembershipEmail {
    pub user_name: String,
    pub team_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMembershipEmail {
    pub user_name: String,
    pub project_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDeadlineReminderEmail {
    pub user_name: String,
    pub project_name: String,
    /// YYYY-MM-DD
    pub due_date: String,
}
