//! Plain-text tables for terminal output.

use client_core::grid::{GridCell, TimeSlot, Weekday, WeeklyGrid, LUNCH_MARKER};
use shared::{
    domain::SectionAssignment,
    protocol::{RoomStat, TeacherStat, TranscriptRecord},
};
use std::collections::BTreeMap;

/// Left-aligned columns separated by `|`, with a dashed rule under the header.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');
    for row in rows {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    out.push_str(line.join(" | ").trim_end());
    out.push('\n');
}

fn cell_text(cell: &GridCell) -> String {
    match cell {
        GridCell::Empty => String::new(),
        GridCell::Lunch => LUNCH_MARKER.to_string(),
        GridCell::Section(section) if section.room_label.is_empty() => section.course_label.clone(),
        GridCell::Section(section) => format!("{} ({})", section.course_label, section.room_label),
    }
}

/// One row per weekday, one column per time slot.
pub fn weekly_grid(grid: &WeeklyGrid) -> String {
    let mut headers = vec!["Day"];
    headers.extend(TimeSlot::ALL.iter().map(|slot| slot.label()));
    let rows: Vec<Vec<String>> = Weekday::ALL
        .iter()
        .map(|day| {
            let mut row = vec![day.name().to_string()];
            row.extend(grid.row(*day).iter().map(cell_text));
            row
        })
        .collect();
    table(&headers, &rows)
}

pub fn sections(sections: &[SectionAssignment]) -> String {
    let rows: Vec<Vec<String>> = sections
        .iter()
        .map(|section| {
            vec![
                section
                    .course_id
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
                section.course_label.clone(),
                section.teacher_label.clone(),
                section.room_label.clone(),
                section.meetings.join(", "),
                section.enrollment_summary.clone().unwrap_or_default(),
            ]
        })
        .collect();
    table(
        &["Course ID", "Course", "Teacher", "Room", "Meetings", "Students"],
        &rows,
    )
}

pub fn transcript(records: &[TranscriptRecord]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            vec![
                record.course_code.clone(),
                record.course_name.clone(),
                record
                    .credits
                    .map(|credits| format!("{credits:.1}"))
                    .unwrap_or_default(),
                record.semester.clone(),
                record.status.clone(),
                record
                    .recorded_at
                    .map(|at| at.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();
    table(
        &["Code", "Course", "Credits", "Semester", "Status", "Recorded"],
        &rows,
    )
}

fn daily_load(load: &BTreeMap<String, f64>) -> String {
    load.iter()
        .map(|(day, hours)| format!("{} {hours:.1}", day.get(..3).unwrap_or(day)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn teacher_stats(stats: &[TeacherStat]) -> String {
    let rows: Vec<Vec<String>> = stats
        .iter()
        .map(|stat| {
            vec![
                stat.teacher_name.clone(),
                stat.sections_assigned.to_string(),
                format!("{:.1}", stat.weekly_hours),
                format!("{:.1}%", stat.utilization_percent),
                daily_load(&stat.daily_load),
            ]
        })
        .collect();
    table(
        &["Teacher", "Sections", "Hours/week", "Utilization", "Daily load"],
        &rows,
    )
}

pub fn room_stats(stats: &[RoomStat]) -> String {
    let rows: Vec<Vec<String>> = stats
        .iter()
        .map(|stat| {
            vec![
                stat.room_name.clone(),
                format!("{:.1}", stat.weekly_hours_used),
                format!("{:.1}%", stat.utilization_percent),
                stat.overlap_count.to_string(),
                daily_load(&stat.daily_load),
            ]
        })
        .collect();
    table(
        &["Room", "Hours used", "Utilization", "Overlaps", "Daily load"],
        &rows,
    )
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
