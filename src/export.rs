use crate::state::app_settings::{AppSettings, FeedSource};
use crate::state::network::load_roster;
use crate::state::reconcile::reconcile;
use crate::state::session::FetchState;
use crate::view::{self, html};
use chrono::Local;
use legends_api::Snapshot;
use legends_api::client::{ApiError, LegendsApi};
use log::{info, warn};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub const PDF_TITLE: &str = "Laughing Legends Participants";
pub const PDF_FILE_NAME: &str = "LaughingLegends_Participants.pdf";
pub const PDF_COLUMNS: [&str; 5] = ["Team Name", "Participant 1", "Participant 2", "Phone 1", "Phone 2"];

// A4 landscape, millimetres.
const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 15.0;
const ROW_HEIGHT: f32 = 7.0;
const TITLE_SIZE: f32 = 18.0;
const TEXT_SIZE: f32 = 10.0;
const CELL_CHARS: usize = 28;
pub const ROWS_PER_PAGE: usize = 22;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("could not write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not build PDF: {0}")]
    Pdf(String),
}

/// One line per team, participants first, then leaderboard entries.
pub fn participant_rows(snapshot: &Snapshot) -> Vec<[String; 5]> {
    snapshot
        .participants
        .iter()
        .chain(snapshot.leaderboard.iter())
        .map(|team| {
            [
                team.team_name.clone(),
                team.participant1.clone(),
                team.participant2.clone(),
                team.phone1.clone(),
                team.phone2.clone(),
            ]
        })
        .collect()
}

fn fit(cell: &str, max: usize) -> String {
    if cell.chars().count() <= max {
        return cell.to_string();
    }
    let mut short: String = cell.chars().take(max.saturating_sub(3)).collect();
    short.push_str("...");
    short
}

pub fn write_pdf(rows: &[[String; 5]], dir: &Path) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(PDF_FILE_NAME);

    let (doc, page, layer) = PdfDocument::new(PDF_TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(format!("{e:?}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(format!("{e:?}")))?;

    let mut chunks: Vec<&[[String; 5]]> = rows.chunks(ROWS_PER_PAGE).collect();
    if chunks.is_empty() {
        chunks.push(&[]);
    }

    let mut current = doc.get_page(page).get_layer(layer);
    for (index, chunk) in chunks.iter().enumerate() {
        if index > 0 {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            current = doc.get_page(page).get_layer(layer);
        }
        draw_page(&current, chunk, &regular, &bold, index == 0);
    }

    let mut writer = BufWriter::new(File::create(&path)?);
    doc.save(&mut writer).map_err(|e| ExportError::Pdf(format!("{e:?}")))?;
    Ok(path)
}

fn draw_page(
    layer: &PdfLayerReference,
    rows: &[[String; 5]],
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
    first: bool,
) {
    let mut y = PAGE_HEIGHT - MARGIN;
    if first {
        layer.use_text(PDF_TITLE, TITLE_SIZE, Mm(MARGIN), Mm(y), bold);
        y -= ROW_HEIGHT * 2.0;
    }

    let column_width = (PAGE_WIDTH - 2.0 * MARGIN) / PDF_COLUMNS.len() as f32;
    for (i, column) in PDF_COLUMNS.iter().enumerate() {
        layer.use_text(*column, TEXT_SIZE, Mm(MARGIN + column_width * i as f32), Mm(y), bold);
    }
    y -= ROW_HEIGHT;

    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            layer.use_text(
                fit(cell, CELL_CHARS),
                TEXT_SIZE,
                Mm(MARGIN + column_width * i as f32),
                Mm(y),
                regular,
            );
        }
        y -= ROW_HEIGHT;
    }
}

pub fn write_html(snapshot: &Snapshot, settings: &AppSettings, out: &Path) -> Result<PathBuf, ExportError> {
    let dashboard = view::render(&reconcile(snapshot), &FetchState::Ready, &settings.capabilities());
    let report = html::render_report(&dashboard, settings.profile.title(), Local::now());
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(out, report)?;
    Ok(out.to_path_buf())
}

/// Fetches the combined roster and writes the participant PDF.
pub async fn export_pdf(client: &LegendsApi, dir: &Path) -> Result<(PathBuf, usize), ExportError> {
    let snapshot = load_roster(client, FeedSource::Combined).await?.snapshot;
    let rows = participant_rows(&snapshot);
    let count = rows.len();
    let dir = dir.to_path_buf();
    let path = tokio::task::spawn_blocking(move || write_pdf(&rows, &dir))
        .await
        .map_err(|e| ExportError::Pdf(e.to_string()))??;
    info!("exported {count} teams to {}", path.display());
    Ok((path, count))
}

pub async fn export_html(settings: &AppSettings, out: &Path) -> Result<PathBuf, ExportError> {
    let client = LegendsApi::new(settings.api_url.as_str());
    let roster = load_roster(&client, settings.source).await?;
    if let Some(partial) = &roster.partial {
        warn!("report is incomplete: {partial}");
    }
    let snapshot = roster.snapshot;
    let path = write_html(&snapshot, settings, out)?;
    info!("wrote report for {} teams to {}", snapshot.len(), path.display());
    Ok(path)
}
