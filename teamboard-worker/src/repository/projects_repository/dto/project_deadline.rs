use time::Date;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDeadline {
    pub name: String,
    pub end_date: Date,
    pub members: Vec<ProjectDeadlineMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDeadlineMember {
    pub name: String,
    pub email: String,
}
