use strum::{AsRefStr, EnumString};

///
/// Templates known to the worker. Serialized as template file name.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
pub enum EmailTemplate {
    #[strum(serialize = "team_join.html")]
    TeamJoin,

    #[strum(serialize = "team_leave.html")]
    TeamLeave,

    #[strum(serialize = "project_join.html")]
    ProjectJoin,

    #[strum(serialize = "project_leave.html")]
    ProjectLeave,

    #[strum(serialize = "project_deadline_reminder.html")]
    ProjectDeadlineReminder,
}

impl EmailTemplate {
    pub const ALL: [EmailTemplate; 5] = [
        EmailTemplate::TeamJoin,
        EmailTemplate::TeamLeave,
        EmailTemplate::ProjectJoin,
        EmailTemplate::ProjectLeave,
        EmailTemplate::ProjectDeadlineReminder,
    ];

    ///
    /// Subject line for email about team or project `name`
    ///
    pub fn subject(&self, name: &str) -> String {
        match self {
            EmailTemplate::TeamJoin => format!("Welcome to Team {name}"),
            EmailTemplate::TeamLeave => format!("Leaving Team {name}"),
            EmailTemplate::ProjectJoin => format!("Assigned to Project {name}"),
            EmailTemplate::ProjectLeave => format!("Removed from Project {name}"),
            EmailTemplate::ProjectDeadlineReminder => {
                format!("Project Reminder: {name} is due soon")
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn template_names_are_file_names() {
        assert_eq!(EmailTemplate::TeamJoin.as_ref(), "team_join.html");
        assert_eq!(
            EmailTemplate::from_str("project_deadline_reminder.html").unwrap(),
            EmailTemplate::ProjectDeadlineReminder
        );
        assert!(EmailTemplate::from_str("unknown.html").is_err());
    }

    #[test]
    fn subjects() {
        assert_eq!(EmailTemplate::TeamLeave.subject("Core"), "Leaving Team Core");
        assert_eq!(
            EmailTemplate::ProjectDeadlineReminder.subject("Apollo"),
            "Project Reminder: Apollo is due soon"
        );
    }
}
