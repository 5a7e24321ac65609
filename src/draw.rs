use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span, Text};
use tui::widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::distribution::DistributionChart;
use crate::state::app_state::{Modal, Severity};
use crate::state::form::FormField;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::state::reconcile::DisplayStatus;
use crate::ui::layout::LayoutAreas;
use crate::view::{DashboardView, RowView, TableBody, TableKind, terminal_safe};

static TABS: &[&str; 5] = &["Registrations", "All Teams", "Leaderboard", "Analytics", "Register"];

const HELP_TEXT: &str = "\
1-5      switch tab
j/k      move selection
s        move selected team to leaderboard
t        set online/offline status
d        delete selected team
g        generate a unique code
e        export participants PDF
r        refresh now
f        full screen
\"        toggle log pane
Esc      dismiss banner / close prompt
q        quit

Register tab: Tab/Shift-Tab move between fields, F2 generates a code,
Enter submits, Esc goes back.";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);
    let view = app.view();

    let _ = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Registrations => draw_table(f, layout.main, app, &view, TableKind::Registrations),
            MenuItem::AllTeams => draw_table(f, layout.main, app, &view, TableKind::AllTeams),
            MenuItem::Leaderboard => draw_table(f, layout.main, app, &view, TableKind::Leaderboard),
            MenuItem::Analytics => draw_analytics(f, layout.main, &view),
            MenuItem::Register => draw_register(f, layout.main, app),
            MenuItem::Help => draw_placeholder(f, layout.main, HELP_TEXT),
        }

        draw_notice(f, layout.notice, app);
        if app.state.show_logs {
            draw_logs(f, layout.logs);
        }
        if let Some(modal) = app.state.modal.as_ref() {
            draw_modal(f, f.area(), modal);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Registrations => 0,
        MenuItem::AllTeams => 1,
        MenuItem::Leaderboard => 2,
        MenuItem::Analytics => 3,
        MenuItem::Register => 4,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new(format!("{} | Help: ? ", app.settings.profile.title()))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn status_color(status: DisplayStatus) -> Color {
    match status {
        DisplayStatus::Registered => Color::Blue,
        DisplayStatus::Online => Color::Green,
        DisplayStatus::Offline => Color::Red,
    }
}

fn rank_style(rank: Option<usize>) -> Style {
    match rank {
        Some(1) => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        Some(2) => Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
        Some(3) => Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
        _ => Style::default(),
    }
}

fn multiline(lines: &[String]) -> Text<'static> {
    Text::from(lines.iter().map(|l| Line::from(terminal_safe(l))).collect::<Vec<_>>())
}

fn draw_table(f: &mut Frame, area: Rect, app: &App, view: &DashboardView, kind: TableKind) {
    let table_view = view.table(kind);
    let title = if kind == TableKind::Leaderboard && !view.ranking_follows_points {
        format!(" {} (backend order, not sorted by points) ", kind.title())
    } else {
        format!(" {} ", kind.title())
    };
    let block = default_border(Color::White).title(title);

    let rows = match &table_view.body {
        TableBody::Placeholder(placeholder) => {
            let inner = block.inner(area);
            f.render_widget(block, area);
            f.render_widget(
                Paragraph::new(placeholder.text())
                    .style(Style::default().fg(Color::DarkGray))
                    .alignment(Alignment::Center),
                inner,
            );
            return;
        }
        TableBody::Rows(rows) => rows,
    };

    let mut headers = table_view.columns.clone();
    if table_view.has_actions {
        headers.push("Actions");
    }
    let header = Row::new(headers.iter().map(|h| Cell::from(*h)))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let status_column = table_view.columns.iter().position(|c| *c == "Status");
    let body: Vec<Row> = rows
        .iter()
        .map(|row| table_row(row, status_column, table_view.has_actions))
        .collect();

    let widths: Vec<Constraint> = headers
        .iter()
        .map(|h| match *h {
            "Rank" => Constraint::Length(6),
            "Points" | "Wins" | "Games" => Constraint::Length(8),
            "Actions" => Constraint::Length(26),
            _ => Constraint::Fill(1),
        })
        .collect();

    let table = Table::new(body, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = TableState::default().with_selected(Some(app.state.selection.get(kind)));
    f.render_stateful_widget(table, area, &mut state);
}

fn table_row(row: &RowView, status_column: Option<usize>, has_actions: bool) -> Row<'static> {
    let mut cells: Vec<Cell> = row
        .cells
        .iter()
        .enumerate()
        .map(|(index, lines)| {
            let cell = Cell::from(multiline(lines));
            if status_column == Some(index) {
                cell.style(Style::default().fg(status_color(row.status)))
            } else {
                cell
            }
        })
        .collect();

    if has_actions {
        let hints: Vec<String> = row
            .actions
            .iter()
            .map(|a| format!("[{}] {}", a.key(), a.label()))
            .collect();
        cells.push(Cell::from(multiline(&hints)).style(Style::default().fg(Color::DarkGray)));
    }

    let height = row.height().max(row.actions.len()) as u16;
    Row::new(cells).height(height).style(rank_style(row.rank))
}

fn draw_analytics(f: &mut Frame, area: Rect, view: &DashboardView) {
    let block = default_border(Color::White).title(" Analytics ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [counter_area, _gap, chart_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Length(1), Constraint::Length(4)]).areas(inner);

    let counters = view.counters;
    let boxes = [
        ("Total Teams", counters.total.to_string()),
        ("In Leaderboard", counters.in_leaderboard.to_string()),
        ("Pending", counters.pending.to_string()),
        ("Total Points", counters.total_points.to_string()),
    ];
    let areas = Layout::horizontal([Constraint::Fill(1); 4]).split(counter_area);
    for ((label, value), area) in boxes.into_iter().zip(areas.iter()) {
        f.render_widget(
            Paragraph::new(Span::styled(value, Style::default().add_modifier(Modifier::BOLD)))
                .alignment(Alignment::Center)
                .block(default_border(Color::DarkGray).title(format!(" {label} "))),
            *area,
        );
    }

    f.render_widget(DistributionChart { distribution: view.distribution }, chart_area);
}

fn draw_register(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Register Team ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let form = &app.state.form;
    let mut lines = Vec::new();
    let code = match app.state.session.held_code() {
        Some(code) => Span::styled(code.to_string(), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        None => Span::styled("none (press F2)", Style::default().fg(Color::DarkGray)),
    };
    lines.push(Line::from(vec![Span::raw("Unique code: "), code]));
    lines.push(Line::default());

    for field in FormField::ALL {
        let focused = form.focus == field;
        let marker = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let cursor = if focused { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{:<15}", field.label()), style),
            Span::raw(format!("{}{cursor}", terminal_safe(form.value(field)))),
        ]));
    }

    lines.push(Line::default());
    let submit = if form.submitting {
        Span::styled("Registering...", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled("[Enter] Register Team", Style::default().fg(Color::Cyan))
    };
    lines.push(Line::from(submit));
    lines.push(Line::from(Span::styled(
        "Tab/Shift-Tab move  F2 generate code  Esc back",
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_notice(f: &mut Frame, area: Rect, app: &App) {
    let Some(notice) = app.state.notice.as_ref() else {
        return;
    };
    let color = match notice.severity {
        Severity::Success => Color::Green,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
    };
    let hint = if notice.severity == Severity::Success { "" } else { "  (Esc to dismiss)" };
    f.render_widget(
        Paragraph::new(format!(" {}{hint}", terminal_safe(&notice.text))).style(Style::default().fg(color)),
        area,
    );
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::Gray));
    f.render_widget(logs, area);
}

fn draw_modal(f: &mut Frame, area: Rect, modal: &Modal) {
    let popup = centered(area, 56, 7);
    f.render_widget(Clear, popup);

    let (title, lines) = match modal {
        Modal::Confirm { mutation } => (
            " Confirm ",
            vec![
                Line::from(mutation.confirmation().unwrap_or_default()),
                Line::from(Span::styled(
                    terminal_safe(mutation.team_name()),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::default(),
                Line::from(Span::styled("[y] yes   [n] no", Style::default().fg(Color::DarkGray))),
            ],
        ),
        Modal::StatusPicker { name, choice, .. } => (
            " Set Status ",
            vec![
                Line::from(terminal_safe(name)),
                Line::default(),
                Line::from(Span::styled(
                    format!("< {} >", choice.label()),
                    Style::default().fg(match choice {
                        legends_api::TeamStatus::Online => Color::Green,
                        legends_api::TeamStatus::Offline => Color::Red,
                    }),
                )),
                Line::from(Span::styled("arrows change  Enter apply  Esc cancel", Style::default().fg(Color::DarkGray))),
            ],
        ),
    };

    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(default_border(Color::Yellow).title(title)),
        popup,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Left),
        inner,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(3), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
