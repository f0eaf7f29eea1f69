//! Weekly timetable construction from section meeting descriptors.
//!
//! The grid is a fixed 5 day x 5 slot table. Meeting strings the builder does
//! not understand are dropped without error, and when two sections land on the
//! same cell the one listed later wins.

use std::fmt;

use shared::domain::SectionAssignment;

pub const LUNCH_MARKER: &str = "LUNCH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "MONDAY",
            Weekday::Tuesday => "TUESDAY",
            Weekday::Wednesday => "WEDNESDAY",
            Weekday::Thursday => "THURSDAY",
            Weekday::Friday => "FRIDAY",
        }
    }

    /// Exact, upper-case match only.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeSlot {
    NineToEleven,
    ElevenToTwelve,
    Lunch,
    OneToThree,
    ThreeToFive,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 5] = [
        TimeSlot::NineToEleven,
        TimeSlot::ElevenToTwelve,
        TimeSlot::Lunch,
        TimeSlot::OneToThree,
        TimeSlot::ThreeToFive,
    ];

    pub fn key(self) -> &'static str {
        match self {
            TimeSlot::NineToEleven => "9-11",
            TimeSlot::ElevenToTwelve => "11-12",
            TimeSlot::Lunch => "12-1",
            TimeSlot::OneToThree => "13-15",
            TimeSlot::ThreeToFive => "15-17",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeSlot::NineToEleven => "9AM–11AM",
            TimeSlot::ElevenToTwelve => "11AM–12PM",
            TimeSlot::Lunch => "12–1PM (LUNCH)",
            TimeSlot::OneToThree => "1PM–3PM",
            TimeSlot::ThreeToFive => "3PM–5PM",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.key() == key)
    }

    pub fn is_lunch(self) -> bool {
        self == TimeSlot::Lunch
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// Checked in order; a later match overrides an earlier one.
const TIME_TOKENS: [(&str, TimeSlot); 4] = [
    ("9AM-11AM", TimeSlot::NineToEleven),
    ("11AM-12PM", TimeSlot::ElevenToTwelve),
    ("1PM-3PM", TimeSlot::OneToThree),
    ("3PM-5PM", TimeSlot::ThreeToFive),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCell {
    Empty,
    Lunch,
    Section(SectionAssignment),
}

impl GridCell {
    pub fn section(&self) -> Option<&SectionAssignment> {
        match self {
            GridCell::Section(section) => Some(section),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyGrid {
    cells: [[GridCell; 5]; 5],
}

impl Default for WeeklyGrid {
    fn default() -> Self {
        Self::empty()
    }
}

impl WeeklyGrid {
    /// Grid with every class slot empty and lunch marked.
    pub fn empty() -> Self {
        let row = || {
            TimeSlot::ALL.map(|slot| {
                if slot.is_lunch() {
                    GridCell::Lunch
                } else {
                    GridCell::Empty
                }
            })
        };
        Self {
            cells: [row(), row(), row(), row(), row()],
        }
    }

    pub fn cell(&self, day: Weekday, slot: TimeSlot) -> &GridCell {
        &self.cells[day.index()][slot.index()]
    }

    pub fn section_at(&self, day: Weekday, slot: TimeSlot) -> Option<&SectionAssignment> {
        self.cell(day, slot).section()
    }

    pub fn row(&self, day: Weekday) -> &[GridCell; 5] {
        &self.cells[day.index()]
    }

    /// Cells holding a section, in day then slot order.
    pub fn occupied(&self) -> impl Iterator<Item = (Weekday, TimeSlot, &SectionAssignment)> + '_ {
        Weekday::ALL.into_iter().flat_map(move |day| {
            TimeSlot::ALL
                .into_iter()
                .filter_map(move |slot| self.section_at(day, slot).map(|s| (day, slot, s)))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.occupied().next().is_none()
    }

    fn place(&mut self, day: Weekday, slot: TimeSlot, section: &SectionAssignment) {
        if slot.is_lunch() {
            return;
        }
        self.cells[day.index()][slot.index()] = GridCell::Section(section.clone());
    }
}

/// Resolves one meeting descriptor such as `"MONDAY 9AM-11AM"` to a grid cell.
///
/// Returns `None` for anything unrecognized: no whitespace, an unknown day, or
/// a time token outside the four class periods.
pub fn parse_meeting(meeting: &str) -> Option<(Weekday, TimeSlot)> {
    let (day, time_token) = meeting.split_once(char::is_whitespace)?;
    let slot = TIME_TOKENS
        .iter()
        .rev()
        .find(|(token, _)| time_token.contains(token))
        .map(|(_, slot)| *slot)?;
    let day = Weekday::from_name(day)?;
    Some((day, slot))
}

/// Builds the weekly grid for `sections`, processed in order.
pub fn build(sections: &[SectionAssignment]) -> WeeklyGrid {
    let mut grid = WeeklyGrid::empty();
    for section in sections {
        for meeting in &section.meetings {
            if let Some((day, slot)) = parse_meeting(meeting) {
                grid.place(day, slot, section);
            }
        }
    }
    grid
}

#[cfg(test)]
#[path = "tests/grid_tests.rs"]
mod tests;
