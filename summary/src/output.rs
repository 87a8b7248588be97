//! CSV and JSON renderings of folder and corpus summaries.
//!
//! Every file is written to a temporary sibling and renamed into place, so a
//! reader never observes a partially written output.

use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::CorpusSummary;
use crate::EpisodeSummary;
use crate::Error;
use crate::FolderSummary;
use crate::Result;
use crate::episode::RECORD_TIME_FORMAT;

pub const FOLDER_CSV_FILE_NAME: &str = "hdf5_analysis_summary.csv";
pub const CORPUS_CSV_FILE_NAME: &str = "summary_hdf5.csv";
pub const CORPUS_JSON_FILE_NAME: &str = "hdf5_total_summary.json";

/// `task_name` of the trailing totals row.
pub const TOTAL_ROW_LABEL: &str = "TOTAL";

/// Column order of every summary CSV; the header is generated from the field
/// names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub task_name: String,
    pub total_time_seconds: f64,
    pub total_time_hours: f64,
    pub frame_count: u64,
    pub frame_rate: f64,
    pub robot_id: String,
    pub operator_id: String,
    pub segment_count: u64,
    pub record_time: String,
    pub environment: String,
    pub software_version: String,
    pub target_item: String,
    pub target_area: String,
    pub description: String,
}

impl SummaryRow {
    pub fn for_episode(episode: &EpisodeSummary) -> Self {
        Self {
            task_name: episode.task_name.clone(),
            total_time_seconds: episode.total_time_seconds,
            total_time_hours: episode.total_time_hours(),
            frame_count: episode.frame_count,
            frame_rate: episode.frame_rate,
            robot_id: episode.robot_id.clone(),
            operator_id: episode.operator_id.clone(),
            segment_count: episode.segment_count,
            record_time: format_record_time(episode.record_time),
            environment: episode.environment.clone(),
            software_version: episode.software_version.clone(),
            target_item: episode.target_item.clone(),
            target_area: episode.target_area.clone(),
            description: episode.description.clone(),
        }
    }

    /// One row standing for a whole folder. Metadata columns carry the value
    /// the folder's episodes share, or their distinct values joined by `;`.
    pub fn for_folder(folder: &FolderSummary) -> Self {
        Self::rollup(
            folder.folder_name.clone(),
            folder.total_time_seconds,
            folder.total_frame_count,
            folder.total_segment_count,
            &folder.episodes.iter().collect::<Vec<_>>(),
        )
    }

    pub fn folder_total(folder: &FolderSummary) -> Self {
        Self {
            task_name: TOTAL_ROW_LABEL.to_string(),
            ..Self::for_folder(folder)
        }
    }

    pub fn corpus_total(corpus: &CorpusSummary) -> Self {
        let episodes: Vec<&EpisodeSummary> = corpus
            .folders
            .values()
            .flat_map(|folder| folder.episodes.iter())
            .collect();
        Self::rollup(
            TOTAL_ROW_LABEL.to_string(),
            corpus.total_time_seconds,
            corpus.total_frame_count,
            corpus.total_segment_count,
            &episodes,
        )
    }

    fn rollup(
        task_name: String,
        total_time_seconds: f64,
        frame_count: u64,
        segment_count: u64,
        episodes: &[&EpisodeSummary],
    ) -> Self {
        let shared =
            |field: fn(&EpisodeSummary) -> &str| shared_value(episodes.iter().map(|e| field(e)));
        Self {
            task_name,
            total_time_seconds,
            total_time_hours: total_time_seconds / 3600.0,
            frame_count,
            frame_rate: crate::folder::effective_frame_rate(frame_count, total_time_seconds),
            robot_id: shared(|e| e.robot_id.as_str()),
            operator_id: shared(|e| e.operator_id.as_str()),
            segment_count,
            record_time: format_record_time(episodes.iter().filter_map(|e| e.record_time).min()),
            environment: shared(|e| e.environment.as_str()),
            software_version: shared(|e| e.software_version.as_str()),
            target_item: shared(|e| e.target_item.as_str()),
            target_area: shared(|e| e.target_area.as_str()),
            description: shared(|e| e.description.as_str()),
        }
    }
}

fn format_record_time(time: Option<chrono::NaiveDateTime>) -> String {
    time.map(|time| time.format(RECORD_TIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// Distinct values in first-seen order, joined by `;`.
fn shared_value<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let mut distinct: Vec<&str> = Vec::new();
    for value in values {
        if !distinct.contains(&value) {
            distinct.push(value);
        }
    }
    distinct.join(";")
}

pub fn render_csv(rows: &[SummaryRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| Error::Csv(err.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Episode rows in discovery order followed by the folder totals.
pub fn folder_rows(folder: &FolderSummary) -> Vec<SummaryRow> {
    folder
        .episodes
        .iter()
        .map(SummaryRow::for_episode)
        .chain(std::iter::once(SummaryRow::folder_total(folder)))
        .collect()
}

/// Folder rows in discovery order followed by the grand totals.
pub fn corpus_rows(corpus: &CorpusSummary) -> Vec<SummaryRow> {
    corpus
        .folders
        .values()
        .map(SummaryRow::for_folder)
        .chain(std::iter::once(SummaryRow::corpus_total(corpus)))
        .collect()
}

pub fn render_corpus_json(corpus: &CorpusSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(corpus)?)
}

pub fn write_folder_csv(folder: &FolderSummary, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(FOLDER_CSV_FILE_NAME);
    write_atomically(&path, &render_csv(&folder_rows(folder))?)?;
    Ok(path)
}

pub fn write_corpus_csv(corpus: &CorpusSummary, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(CORPUS_CSV_FILE_NAME);
    write_atomically(&path, &render_csv(&corpus_rows(corpus))?)?;
    Ok(path)
}

pub fn write_corpus_json(corpus: &CorpusSummary, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(CORPUS_JSON_FILE_NAME);
    write_atomically(&path, &render_corpus_json(corpus)?)?;
    Ok(path)
}

pub fn write_atomically(write_path: &Path, contents: &str) -> Result<()> {
    let parent = match write_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|err| Error::io(parent, err))?;
    let tmp = NamedTempFile::new_in(parent).map_err(|err| Error::io(parent, err))?;
    std::fs::write(tmp.path(), contents).map_err(|err| Error::io(tmp.path(), err))?;
    tmp.persist(write_path)
        .map_err(|err| Error::io(write_path, err.error))?;
    Ok(())
}
