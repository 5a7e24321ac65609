use chrono::{DateTime, Utc};
use legends_api::{Snapshot, SourceKind, Team, TeamStatus};

/// Status shown for a team in every table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayStatus {
    Registered,
    Online,
    Offline,
}

impl DisplayStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DisplayStatus::Registered => "REGISTERED",
            DisplayStatus::Online => "ONLINE",
            DisplayStatus::Offline => "OFFLINE",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            DisplayStatus::Registered => "status-registered",
            DisplayStatus::Online => "status-online",
            DisplayStatus::Offline => "status-offline",
        }
    }

    /// Presence value for leaderboard teams, `None` for registrations.
    pub fn presence(&self) -> Option<TeamStatus> {
        match self {
            DisplayStatus::Registered => None,
            DisplayStatus::Online => Some(TeamStatus::Online),
            DisplayStatus::Offline => Some(TeamStatus::Offline),
        }
    }
}

/// One display row worth of team data, whichever collection it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedTeamView {
    pub id: String,
    pub source: SourceKind,
    pub display_name: String,
    pub participant1: String,
    pub participant2: String,
    pub phone1: String,
    pub phone2: String,
    pub unique_code: String,
    pub in_leaderboard: bool,
    pub status: DisplayStatus,
    pub points: u32,
    pub wins: u32,
    pub games_played: u32,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    /// 1-based position in the backend's leaderboard array.
    pub rank: usize,
    pub team: UnifiedTeamView,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub total: usize,
    pub in_leaderboard: usize,
    pub pending: usize,
    pub total_points: u64,
}

/// Everything the renderer needs, derived from one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciled {
    /// The participants collection alone.
    pub registrations: Vec<UnifiedTeamView>,
    /// Participants followed by leaderboard entries, unsorted.
    pub teams: Vec<UnifiedTeamView>,
    pub ranked: Vec<RankedEntry>,
    pub counters: Counters,
    /// False when the backend's leaderboard order is not point-descending.
    /// Ranks still follow array order.
    pub ranking_follows_points: bool,
}

/// A record is "in leaderboard" when it came from the leaderboard collection,
/// carries the leaderboard-only `name` key, or is flagged by the
/// participants endpoint's join.
pub fn is_in_leaderboard(team: &Team) -> bool {
    team.source == SourceKind::Leaderboard || team.has_leaderboard_name || team.joined_leaderboard
}

pub fn classify(team: &Team) -> DisplayStatus {
    if !is_in_leaderboard(team) {
        return DisplayStatus::Registered;
    }
    match team.status.unwrap_or(TeamStatus::Offline) {
        TeamStatus::Online => DisplayStatus::Online,
        TeamStatus::Offline => DisplayStatus::Offline,
    }
}

pub fn unify(team: &Team) -> UnifiedTeamView {
    UnifiedTeamView {
        id: team.id.clone(),
        source: team.source,
        display_name: team.team_name.clone(),
        participant1: team.participant1.clone(),
        participant2: team.participant2.clone(),
        phone1: team.phone1.clone(),
        phone2: team.phone2.clone(),
        unique_code: team.unique_code.clone(),
        in_leaderboard: is_in_leaderboard(team),
        status: classify(team),
        points: team.points,
        wins: team.wins,
        games_played: team.games_played,
        created_at: team.created_at,
    }
}

/// Rank = index + 1. Ties keep backend order; nothing is re-sorted.
pub fn rank(leaderboard: &[Team]) -> Vec<RankedEntry> {
    leaderboard
        .iter()
        .enumerate()
        .map(|(index, team)| RankedEntry {
            rank: index + 1,
            team: unify(team),
        })
        .collect()
}

pub fn reconcile(snapshot: &Snapshot) -> Reconciled {
    let registrations: Vec<UnifiedTeamView> = snapshot.participants.iter().map(unify).collect();
    let teams: Vec<UnifiedTeamView> = registrations
        .iter()
        .cloned()
        .chain(snapshot.leaderboard.iter().map(unify))
        .collect();

    let in_leaderboard: Vec<&UnifiedTeamView> = teams.iter().filter(|t| t.in_leaderboard).collect();
    let counters = Counters {
        total: teams.len(),
        in_leaderboard: in_leaderboard.len(),
        pending: teams.len() - in_leaderboard.len(),
        total_points: in_leaderboard.iter().map(|t| u64::from(t.points)).sum(),
    };

    let ranking_follows_points = snapshot
        .leaderboard
        .windows(2)
        .all(|pair| pair[0].points >= pair[1].points);

    Reconciled {
        registrations,
        teams,
        ranked: rank(&snapshot.leaderboard),
        counters,
        ranking_follows_points,
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{leaderboard, registration};
    use super::*;

    #[test]
    fn combined_count_is_sum_of_both_collections() {
        let snapshot = Snapshot {
            participants: vec![registration("a", "Alpha"), registration("b", "Beta")],
            leaderboard: vec![leaderboard("c", "Gamma", 5, None)],
        };
        let model = reconcile(&snapshot);
        assert_eq!(model.teams.len(), 3);
        assert_eq!(model.counters.total, snapshot.participants.len() + snapshot.leaderboard.len());
        assert_eq!(model.counters.in_leaderboard, 1);
        assert_eq!(model.counters.pending, 2);
        assert_eq!(model.counters.total_points, 5);
    }

    #[test]
    fn teams_are_registrations_then_leaderboard() {
        let snapshot = Snapshot {
            participants: vec![registration("a", "Alpha")],
            leaderboard: vec![leaderboard("z", "Zed", 1, None), leaderboard("y", "Yak", 9, None)],
        };
        let ids: Vec<_> = reconcile(&snapshot).teams.into_iter().map(|t| t.id).collect();
        assert_eq!(ids, ["a", "z", "y"]);
    }

    #[test]
    fn rank_is_index_plus_one_and_follows_input_order() {
        let board = vec![
            leaderboard("x", "X", 30, None),
            leaderboard("y", "Y", 30, None),
            leaderboard("z", "Z", 10, None),
        ];
        let ranks: Vec<_> = rank(&board).into_iter().map(|e| (e.rank, e.team.id)).collect();
        assert_eq!(ranks, [(1, "x".to_string()), (2, "y".to_string()), (3, "z".to_string())]);

        let reordered = vec![board[2].clone(), board[0].clone(), board[1].clone()];
        let ranks: Vec<_> = rank(&reordered).into_iter().map(|e| (e.rank, e.team.id)).collect();
        assert_eq!(ranks, [(1, "z".to_string()), (2, "x".to_string()), (3, "y".to_string())]);
    }

    #[test]
    fn unsorted_leaderboard_is_flagged_not_resorted() {
        let snapshot = Snapshot {
            participants: vec![],
            leaderboard: vec![leaderboard("low", "Low", 1, None), leaderboard("high", "High", 50, None)],
        };
        let model = reconcile(&snapshot);
        assert!(!model.ranking_follows_points);
        assert_eq!(model.ranked[0].team.id, "low");
    }

    #[test]
    fn leaderboard_status_defaults_to_offline() {
        assert_eq!(classify(&leaderboard("a", "A", 0, None)), DisplayStatus::Offline);
        assert_eq!(
            classify(&leaderboard("a", "A", 0, Some(TeamStatus::Online))),
            DisplayStatus::Online
        );
        assert_eq!(classify(&registration("b", "B")), DisplayStatus::Registered);
    }

    #[test]
    fn named_participant_counts_as_leaderboard() {
        let mut team = registration("a", "A");
        team.has_leaderboard_name = true;
        assert!(is_in_leaderboard(&team));
        assert_eq!(classify(&team), DisplayStatus::Offline);
    }

    #[test]
    fn join_flag_marks_registration_as_leaderboard() {
        let mut team = registration("a", "A");
        team.joined_leaderboard = true;
        team.status = Some(TeamStatus::Online);
        team.points = 7;
        let snapshot = Snapshot { participants: vec![team, registration("b", "B")], leaderboard: vec![] };
        let model = reconcile(&snapshot);
        assert_eq!(model.registrations[0].status, DisplayStatus::Online);
        assert_eq!(model.counters.in_leaderboard, 1);
        assert_eq!(model.counters.pending, 1);
        assert_eq!(model.counters.total_points, 7);
    }

    #[test]
    fn empty_snapshot_yields_zero_counters() {
        let model = reconcile(&Snapshot::default());
        assert_eq!(model.counters, Counters::default());
        assert!(model.teams.is_empty());
        assert!(model.ranking_follows_points);
    }

    #[test]
    fn promoted_team_moves_between_tables() {
        let before = Snapshot {
            participants: vec![registration("abc", "Punchline")],
            leaderboard: vec![],
        };
        assert!(reconcile(&before).registrations.iter().any(|t| t.id == "abc"));

        let after = Snapshot {
            participants: vec![],
            leaderboard: vec![leaderboard("abc", "Punchline", 0, None)],
        };
        let model = reconcile(&after);
        assert!(model.registrations.iter().all(|t| t.id != "abc"));
        let entry = model.ranked.iter().find(|e| e.team.id == "abc").expect("promoted team");
        assert_eq!(entry.team.status, DisplayStatus::Offline);
    }
}
