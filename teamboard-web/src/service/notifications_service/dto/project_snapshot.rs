use time::Date;

///
/// Project fields compared to decide whether members are told about an update
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSnapshot {
    pub name: String,
    pub abbreviation: String,
    pub leader_id: i64,
    pub team_id: i64,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

impl ProjectSnapshot {
    pub fn info_changed(&self, updated: &ProjectSnapshot) -> bool {
        self != updated
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use time::macros::date;

    fn create_snapshot() -> ProjectSnapshot {
        ProjectSnapshot {
            name: "Apollo".to_string(),
            abbreviation: "APL".to_string(),
            leader_id: 1,
            team_id: 2,
            start_date: None,
            end_date: Some(date!(2026 - 10 - 30)),
        }
    }

    #[test]
    fn info_changed_same_snapshot() {
        let snapshot = create_snapshot();

        assert!(!snapshot.info_changed(&snapshot.clone()));
    }

    #[test]
    fn info_changed_both_dates_absent_is_equal() {
        let mut before = create_snapshot();
        before.end_date = None;
        let after = before.clone();

        assert!(!before.info_changed(&after));
    }

    #[test]
    fn info_changed_date_removed() {
        let before = create_snapshot();
        let mut after = before.clone();
        after.end_date = None;

        assert!(before.info_changed(&after));
    }

    #[test]
    fn info_changed_leader() {
        let before = create_snapshot();
        let mut after = before.clone();
        after.leader_id = 5;

        assert!(before.info_changed(&after));
    }
}
