//! Pure projection of the reconciled roster into tables, counters and the
//! distribution summary. No I/O; the same inputs always give the same view.

pub mod html;

use crate::state::app_settings::{Capabilities, RegistrationLayout};
use crate::state::reconcile::{Counters, DisplayStatus, Reconciled, UnifiedTeamView};
use crate::state::session::FetchState;
use chrono::{DateTime, Utc};
use legends_api::{SourceKind, TeamStatus};

pub const NOT_IN_LEADERBOARD: &str = "NOT IN LEADERBOARD";
pub const UNREACHABLE: &str = "Cannot connect to database";
const MISSING: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Registrations,
    AllTeams,
    Leaderboard,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [TableKind::Registrations, TableKind::AllTeams, TableKind::Leaderboard];

    pub fn title(&self) -> &'static str {
        match self {
            TableKind::Registrations => "Registered Teams",
            TableKind::AllTeams => "All Teams",
            TableKind::Leaderboard => "Leaderboard",
        }
    }

    pub fn empty_text(&self) -> &'static str {
        match self {
            TableKind::Registrations => "No teams registered yet",
            TableKind::AllTeams => "No teams found in system",
            TableKind::Leaderboard => "No teams in leaderboard yet",
        }
    }

    fn columns(&self, layout: RegistrationLayout) -> Vec<&'static str> {
        match (self, layout) {
            (TableKind::Registrations, RegistrationLayout::Standings) => {
                vec!["Team", "Participants", "Code", "Status", "Points"]
            }
            (TableKind::Registrations, RegistrationLayout::Contact) => {
                vec!["Team", "Participant 1", "Participant 2", "Phones", "Code", "Registered"]
            }
            (TableKind::AllTeams, _) => {
                vec!["Team", "Participants", "Phones", "Code", "Source", "Status"]
            }
            (TableKind::Leaderboard, _) => vec!["Rank", "Team", "Points", "Wins", "Games", "Status"],
        }
    }
}

/// Operation offered on a row. Derived on every render, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Promote,
    SetStatus { current: TeamStatus },
    Delete,
}

impl RowAction {
    pub fn label(&self) -> &'static str {
        match self {
            RowAction::Promote => "MOVE TO LEADERBOARD",
            RowAction::SetStatus { .. } => "SET STATUS",
            RowAction::Delete => "DELETE",
        }
    }

    pub fn key(&self) -> char {
        match self {
            RowAction::Promote => 's',
            RowAction::SetStatus { .. } => 't',
            RowAction::Delete => 'd',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub team_id: String,
    pub team_name: String,
    pub source: SourceKind,
    pub status: DisplayStatus,
    /// Leaderboard position, only on leaderboard table rows.
    pub rank: Option<usize>,
    /// One entry per column; a cell may span several lines.
    pub cells: Vec<Vec<String>>,
    pub actions: Vec<RowAction>,
}

impl RowView {
    pub fn height(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(1).max(1)
    }

    pub fn action(&self, wanted: fn(&RowAction) -> bool) -> Option<RowAction> {
        self.actions.iter().copied().find(|a| wanted(a))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Loading,
    Empty(&'static str),
    Unreachable,
}

impl Placeholder {
    pub fn text(&self) -> &'static str {
        match self {
            Placeholder::Loading => "Loading teams...",
            Placeholder::Empty(text) => text,
            Placeholder::Unreachable => UNREACHABLE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableBody {
    Rows(Vec<RowView>),
    Placeholder(Placeholder),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub kind: TableKind,
    pub columns: Vec<&'static str>,
    /// Interactive surfaces append an actions column.
    pub has_actions: bool,
    pub body: TableBody,
}

impl TableView {
    pub fn rows(&self) -> &[RowView] {
        match &self.body {
            TableBody::Rows(rows) => rows,
            TableBody::Placeholder(_) => &[],
        }
    }
}

/// Registered vs. in-leaderboard split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Distribution {
    pub registered: usize,
    pub in_leaderboard: usize,
}

impl Distribution {
    pub fn total(&self) -> usize {
        self.registered + self.in_leaderboard
    }

    /// Percentage of `part` in the total, 0 when there is nothing to split.
    pub fn share(&self, part: usize) -> f64 {
        match self.total() {
            0 => 0.0,
            total => part as f64 * 100.0 / total as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub registrations: TableView,
    pub all_teams: TableView,
    pub leaderboard: TableView,
    pub counters: Counters,
    pub distribution: Distribution,
    pub ranking_follows_points: bool,
}

impl DashboardView {
    pub fn table(&self, kind: TableKind) -> &TableView {
        match kind {
            TableKind::Registrations => &self.registrations,
            TableKind::AllTeams => &self.all_teams,
            TableKind::Leaderboard => &self.leaderboard,
        }
    }
}

pub fn render(model: &Reconciled, fetch: &FetchState, caps: &Capabilities) -> DashboardView {
    let table = |kind: TableKind, rows: Vec<RowView>| {
        let body = match fetch {
            FetchState::Pending => TableBody::Placeholder(Placeholder::Loading),
            FetchState::Failed { .. } => TableBody::Placeholder(Placeholder::Unreachable),
            FetchState::Ready if rows.is_empty() => {
                TableBody::Placeholder(Placeholder::Empty(kind.empty_text()))
            }
            FetchState::Ready => TableBody::Rows(rows),
        };
        TableView {
            kind,
            columns: kind.columns(caps.layout),
            has_actions: caps.promote || caps.set_status || caps.delete,
            body,
        }
    };

    let registrations = model
        .registrations
        .iter()
        .map(|team| registration_row(team, caps))
        .collect();
    let all_teams = model.teams.iter().map(|team| all_teams_row(team, caps)).collect();
    let leaderboard = model
        .ranked
        .iter()
        .map(|entry| leaderboard_row(&entry.team, entry.rank, caps))
        .collect();

    DashboardView {
        registrations: table(TableKind::Registrations, registrations),
        all_teams: table(TableKind::AllTeams, all_teams),
        leaderboard: table(TableKind::Leaderboard, leaderboard),
        counters: model.counters,
        distribution: Distribution {
            registered: model.counters.pending,
            in_leaderboard: model.counters.in_leaderboard,
        },
        ranking_follows_points: model.ranking_follows_points,
    }
}

/// Actions keyed on classification: promote for registrations, a status
/// toggle for leaderboard teams, delete wherever the profile allows it.
pub fn actions_for(team: &UnifiedTeamView, caps: &Capabilities) -> Vec<RowAction> {
    let mut actions = Vec::new();
    match team.status.presence() {
        None if caps.promote => actions.push(RowAction::Promote),
        Some(current) if caps.set_status => actions.push(RowAction::SetStatus { current }),
        _ => {}
    }
    if caps.delete {
        actions.push(RowAction::Delete);
    }
    actions
}

fn registration_row(team: &UnifiedTeamView, caps: &Capabilities) -> RowView {
    let cells = match caps.layout {
        RegistrationLayout::Standings => vec![
            one(&team.display_name),
            vec![text(&team.participant1), text(&team.participant2)],
            one(&team.unique_code),
            vec![team.status.label().to_string()],
            standings(team),
        ],
        RegistrationLayout::Contact => vec![
            one(&team.display_name),
            one(&team.participant1),
            one(&team.participant2),
            phones(team),
            one(&team.unique_code),
            vec![format_date(team.created_at)],
        ],
    };
    row(team, None, cells, caps)
}

fn all_teams_row(team: &UnifiedTeamView, caps: &Capabilities) -> RowView {
    let cells = vec![
        one(&team.display_name),
        vec![text(&team.participant1), text(&team.participant2)],
        phones(team),
        one(&team.unique_code),
        vec![team.source.label().to_string()],
        vec![team.status.label().to_string()],
    ];
    row(team, None, cells, caps)
}

fn leaderboard_row(team: &UnifiedTeamView, rank: usize, caps: &Capabilities) -> RowView {
    let cells = vec![
        vec![format!("#{rank}")],
        one(&team.display_name),
        vec![team.points.to_string()],
        vec![team.wins.to_string()],
        vec![team.games_played.to_string()],
        vec![team.status.label().to_string()],
    ];
    row(team, Some(rank), cells, caps)
}

fn row(team: &UnifiedTeamView, rank: Option<usize>, cells: Vec<Vec<String>>, caps: &Capabilities) -> RowView {
    RowView {
        team_id: team.id.clone(),
        team_name: team.display_name.clone(),
        source: team.source,
        status: team.status,
        rank,
        cells,
        actions: actions_for(team, caps),
    }
}

fn standings(team: &UnifiedTeamView) -> Vec<String> {
    if !team.in_leaderboard {
        return vec![NOT_IN_LEADERBOARD.to_string()];
    }
    vec![
        format!("{} PTS", team.points),
        format!("{} W / {} G", team.wins, team.games_played),
    ]
}

fn phones(team: &UnifiedTeamView) -> Vec<String> {
    vec![text(&team.phone1), text(&team.phone2)]
}

fn one(value: &str) -> Vec<String> {
    vec![text(value)]
}

fn text(value: &str) -> String {
    if value.trim().is_empty() { MISSING.to_string() } else { value.to_string() }
}

fn format_date(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

/// Drops control characters so backend strings cannot move the cursor or
/// recolor the terminal.
pub fn terminal_safe(value: &str) -> String {
    value.chars().filter(|c| !c.is_control()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_settings::Profile;
    use crate::state::reconcile::fixtures::{leaderboard, registration};
    use crate::state::reconcile::reconcile;
    use chrono::TimeZone;
    use legends_api::Snapshot;

    fn ready(snapshot: &Snapshot, profile: Profile) -> DashboardView {
        render(&reconcile(snapshot), &FetchState::Ready, &profile.capabilities())
    }

    fn sample() -> Snapshot {
        Snapshot {
            participants: vec![registration("r1", "Alpha")],
            leaderboard: vec![
                leaderboard("l1", "Top", 40, Some(TeamStatus::Online)),
                leaderboard("l2", "Next", 20, None),
            ],
        }
    }

    #[test]
    fn empty_collections_render_placeholders_and_zero_counters() {
        let view = ready(&Snapshot::default(), Profile::Admin);
        assert_eq!(
            view.registrations.body,
            TableBody::Placeholder(Placeholder::Empty("No teams registered yet"))
        );
        assert_eq!(
            view.all_teams.body,
            TableBody::Placeholder(Placeholder::Empty("No teams found in system"))
        );
        assert_eq!(
            view.leaderboard.body,
            TableBody::Placeholder(Placeholder::Empty("No teams in leaderboard yet"))
        );
        assert_eq!(view.counters, Counters::default());
        assert_eq!(view.distribution.share(0), 0.0);
    }

    #[test]
    fn failed_fetch_renders_unreachable_row_everywhere() {
        let fetch = FetchState::Failed { message: "refused".into() };
        let view = render(&Reconciled::default(), &fetch, &Profile::Dashboard.capabilities());
        for kind in TableKind::ALL {
            assert_eq!(view.table(kind).body, TableBody::Placeholder(Placeholder::Unreachable));
        }
        assert_eq!(Placeholder::Unreachable.text(), "Cannot connect to database");
    }

    #[test]
    fn admin_actions_follow_classification() {
        let view = ready(&sample(), Profile::Admin);
        assert_eq!(view.all_teams.rows()[0].actions, [RowAction::Promote, RowAction::Delete]);
        assert_eq!(
            view.all_teams.rows()[1].actions,
            [RowAction::SetStatus { current: TeamStatus::Online }, RowAction::Delete]
        );
        assert_eq!(
            view.leaderboard.rows()[1].actions,
            [RowAction::SetStatus { current: TeamStatus::Offline }, RowAction::Delete]
        );
    }

    #[test]
    fn dashboard_never_offers_delete_and_public_deletes_everywhere() {
        let dashboard = ready(&sample(), Profile::Dashboard);
        assert!(dashboard.all_teams.rows().iter().all(|r| !r.actions.contains(&RowAction::Delete)));

        let public = ready(&sample(), Profile::Public);
        for row in public.all_teams.rows() {
            assert_eq!(row.actions, [RowAction::Delete]);
        }
    }

    #[test]
    fn standings_column_marks_registrations() {
        let mut snapshot = sample();
        let mut joined = registration("r2", "Joined");
        joined.joined_leaderboard = true;
        joined.points = 12;
        joined.wins = 2;
        joined.games_played = 3;
        snapshot.participants.push(joined);

        let view = ready(&snapshot, Profile::Admin);
        let rows = view.registrations.rows();
        assert_eq!(rows[0].cells[4], [NOT_IN_LEADERBOARD]);
        assert_eq!(rows[1].cells[4], ["12 PTS", "2 W / 3 G"]);
        assert_eq!(rows[1].cells[3], ["OFFLINE"]);
    }

    #[test]
    fn contact_layout_shows_registration_date() {
        let mut snapshot = Snapshot { participants: vec![registration("a", "A")], leaderboard: vec![] };
        snapshot.participants[0].created_at = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).single();
        snapshot.participants.push(registration("b", "B"));

        let view = ready(&snapshot, Profile::Public);
        assert_eq!(view.registrations.columns.last(), Some(&"Registered"));
        assert_eq!(view.registrations.rows()[0].cells[5], ["2025-03-14"]);
        assert_eq!(view.registrations.rows()[1].cells[5], ["N/A"]);
    }

    #[test]
    fn leaderboard_rows_carry_rank() {
        let view = ready(&sample(), Profile::Dashboard);
        let rows = view.leaderboard.rows();
        assert_eq!(rows[0].rank, Some(1));
        assert_eq!(rows[0].cells[0], ["#1"]);
        assert_eq!(rows[1].cells[2], ["20"]);
        assert_eq!(view.counters.total_points, 60);
        assert_eq!(view.distribution, Distribution { registered: 1, in_leaderboard: 2 });
    }

    #[test]
    fn render_is_idempotent() {
        let model = reconcile(&sample());
        let caps = Profile::Admin.capabilities();
        assert_eq!(render(&model, &FetchState::Ready, &caps), render(&model, &FetchState::Ready, &caps));
    }

    #[test]
    fn control_characters_are_stripped() {
        assert_eq!(terminal_safe("Bad\u{1b}[31mTeam\n"), "Bad[31mTeam");
    }
}
