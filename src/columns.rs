//! Column dependency resolver
//!
//! The grid is four columns wide. The first row holds the module headers;
//! each header drives the enabled state and color of the controls stacked
//! under it. Four row-groups sit at fixed offsets (4, 8, 12, 16) from the
//! header, and a caller picks which of them follow the header with
//! [`RowGroupFlags`]. Groups that are not flagged are left out of the result
//! entirely: the caller must leave those controls as they are.
//!
//! Everything here is a pure function of the header value and is replayed in
//! full on every header change.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid width
pub const NUM_COLUMNS: usize = 4;

/// Header value that disables its column.
///
/// Hard-coded to 5 while colors only cover 0-4, so 6-127 come out enabled
/// and neutral. Kept as-is; see DESIGN.md.
pub const DISABLED_VALUE: u8 = 5;

/// Column display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Yellow,
    Green,
    Blue,
    Purple,
    /// The widget background color of whatever UI renders the grid
    Neutral,
}

impl Color {
    /// RGB triple, `None` for neutral
    pub fn rgb(self) -> Option<(u8, u8, u8)> {
        match self {
            Color::Red => Some((235, 78, 40)),
            Color::Yellow => Some((230, 205, 36)),
            Color::Green => Some((85, 194, 84)),
            Color::Blue => Some((105, 210, 228)),
            Color::Purple => Some((95, 49, 160)),
            Color::Neutral => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::Red => "red",
            Color::Yellow => "yellow",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Purple => "purple",
            Color::Neutral => "neutral",
        };
        write!(f, "{}", name)
    }
}

/// Enabled flag and color derived from a header value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub enabled: bool,
    pub color: Color,
}

/// Bucket a header value.
///
/// The enable check and the color choice are independent: 50 is enabled and
/// neutral, 5 is disabled and neutral.
pub fn bucket_of(value: u8) -> Bucket {
    let color = match value {
        0 => Color::Red,
        1 => Color::Yellow,
        2 => Color::Green,
        3 => Color::Blue,
        4 => Color::Purple,
        _ => Color::Neutral,
    };
    Bucket {
        enabled: value != DISABLED_VALUE,
        color,
    }
}

/// Dependent row-group under a header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowGroup {
    First,
    Second,
    Third,
    Fourth,
}

impl RowGroup {
    pub const ALL: [RowGroup; 4] = [
        RowGroup::First,
        RowGroup::Second,
        RowGroup::Third,
        RowGroup::Fourth,
    ];

    /// Registry offset of the group's column-0 control
    pub fn base_offset(self) -> usize {
        match self {
            RowGroup::First => 4,
            RowGroup::Second => 8,
            RowGroup::Third => 12,
            RowGroup::Fourth => 16,
        }
    }
}

/// Which row-groups follow a header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowGroupFlags {
    pub first: bool,
    pub second: bool,
    pub third: bool,
    pub fourth: bool,
}

impl RowGroupFlags {
    pub fn new(first: bool, second: bool, third: bool, fourth: bool) -> Self {
        Self {
            first,
            second,
            third,
            fourth,
        }
    }

    pub fn all() -> Self {
        Self::new(true, true, true, true)
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Flags used by the editor for each header column.
    ///
    /// The texture column (3) only drives its first two groups. Mix and
    /// Output Level sit below them in that column and never follow it.
    pub fn for_column(column: usize) -> Self {
        if column % NUM_COLUMNS == 3 {
            Self::new(true, true, false, false)
        } else {
            Self::all()
        }
    }

    pub fn contains(&self, group: RowGroup) -> bool {
        match group {
            RowGroup::First => self.first,
            RowGroup::Second => self.second,
            RowGroup::Third => self.third,
            RowGroup::Fourth => self.fourth,
        }
    }

    /// Flagged groups in offset order
    pub fn groups(self) -> impl Iterator<Item = RowGroup> {
        RowGroup::ALL.into_iter().filter(move |g| self.contains(*g))
    }
}

/// A row touched by a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Row {
    /// The header control itself
    Header,
    Group(RowGroup),
}

/// Resolved value for one control in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowState<T> {
    pub row: Row,
    /// Registry index of the control
    pub index: usize,
    pub value: T,
}

/// A header control changed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderValueChanged {
    pub column: usize,
    pub value: u8,
}

/// Everything a UI needs to apply after a header change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnUpdate {
    pub column: usize,
    pub bucket: Bucket,
    /// Header row is never included here
    pub enabled: Vec<RowState<bool>>,
    /// Header row first, then flagged groups
    pub colors: Vec<RowState<Color>>,
}

/// Stateless resolver bound to a registry size
#[derive(Debug, Clone, Copy)]
pub struct ColumnResolver {
    control_count: usize,
}

impl ColumnResolver {
    pub fn new(control_count: usize) -> Self {
        Self { control_count }
    }

    /// Registry indices of the flagged groups that exist
    fn group_rows(&self, column: usize, flags: RowGroupFlags) -> Vec<(Row, usize)> {
        let offset = column % NUM_COLUMNS;
        flags
            .groups()
            .map(|group| (Row::Group(group), group.base_offset() + offset))
            .filter(|(_, index)| *index < self.control_count)
            .collect()
    }

    /// Enabled flag for each flagged row-group
    pub fn resolve_enabled(
        &self,
        column: usize,
        value: u8,
        flags: RowGroupFlags,
    ) -> Vec<RowState<bool>> {
        let enabled = bucket_of(value).enabled;
        self.group_rows(column, flags)
            .into_iter()
            .map(|(row, index)| RowState {
                row,
                index,
                value: enabled,
            })
            .collect()
    }

    /// Color for the header row and each flagged row-group
    pub fn resolve_color(
        &self,
        column: usize,
        value: u8,
        flags: RowGroupFlags,
    ) -> Vec<RowState<Color>> {
        let color = bucket_of(value).color;
        let header = column % NUM_COLUMNS;

        let mut rows = Vec::with_capacity(5);
        if header < self.control_count {
            rows.push(RowState {
                row: Row::Header,
                index: header,
                value: color,
            });
        }
        rows.extend(
            self.group_rows(column, flags)
                .into_iter()
                .map(|(row, index)| RowState {
                    row,
                    index,
                    value: color,
                }),
        );
        rows
    }

    /// Single entry point for header change events
    pub fn on_header_changed(&self, event: HeaderValueChanged, flags: RowGroupFlags) -> ColumnUpdate {
        ColumnUpdate {
            column: event.column,
            bucket: bucket_of(event.value),
            enabled: self.resolve_enabled(event.column, event.value, flags),
            colors: self.resolve_color(event.column, event.value, flags),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices<T>(rows: &[RowState<T>]) -> Vec<usize> {
        rows.iter().map(|r| r.index).collect()
    }

    #[test]
    fn test_bucket_enabled_everywhere_but_five() {
        for value in 0..=127u8 {
            assert_eq!(bucket_of(value).enabled, value != 5, "value {}", value);
        }
    }

    #[test]
    fn test_bucket_colors() {
        assert_eq!(bucket_of(0).color, Color::Red);
        assert_eq!(bucket_of(1).color, Color::Yellow);
        assert_eq!(bucket_of(2).color, Color::Green);
        assert_eq!(bucket_of(3).color, Color::Blue);
        assert_eq!(bucket_of(4).color, Color::Purple);
        assert_eq!(bucket_of(5), Bucket { enabled: false, color: Color::Neutral });
        assert_eq!(bucket_of(50), Bucket { enabled: true, color: Color::Neutral });
        assert_eq!(bucket_of(44).color, Color::Neutral);
    }

    #[test]
    fn test_resolve_color_column_zero_all_groups() {
        let resolver = ColumnResolver::new(28);
        let rows = resolver.resolve_color(0, 2, RowGroupFlags::all());

        assert_eq!(indices(&rows), vec![0, 4, 8, 12, 16]);
        assert!(rows.iter().all(|r| r.value == Color::Green));
        assert_eq!(rows[0].row, Row::Header);
        assert_eq!(rows[4].row, Row::Group(RowGroup::Fourth));
    }

    #[test]
    fn test_header_colored_even_without_flags() {
        let resolver = ColumnResolver::new(28);
        let rows = resolver.resolve_color(2, 4, RowGroupFlags::none());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], RowState { row: Row::Header, index: 2, value: Color::Purple });

        assert!(resolver.resolve_enabled(2, 4, RowGroupFlags::none()).is_empty());
    }

    #[test]
    fn test_unflagged_groups_are_left_out() {
        let resolver = ColumnResolver::new(28);
        let flags = RowGroupFlags::new(true, false, true, false);

        let enabled = resolver.resolve_enabled(1, 5, flags);
        assert_eq!(indices(&enabled), vec![5, 13]);
        assert!(enabled.iter().all(|r| !r.value));

        let colors = resolver.resolve_color(1, 5, flags);
        assert_eq!(indices(&colors), vec![1, 5, 13]);
    }

    #[test]
    fn test_column_wraps_modulo_grid_width() {
        let resolver = ColumnResolver::new(28);
        let rows = resolver.resolve_enabled(5, 0, RowGroupFlags::all());
        assert_eq!(indices(&rows), vec![5, 9, 13, 17]);
    }

    #[test]
    fn test_out_of_bounds_rows_are_skipped() {
        let resolver = ColumnResolver::new(14);
        let rows = resolver.resolve_color(3, 1, RowGroupFlags::all());
        assert_eq!(indices(&rows), vec![3, 7, 11]);

        let resolver = ColumnResolver::new(2);
        assert!(resolver.resolve_color(3, 1, RowGroupFlags::all()).is_empty());
    }

    #[test]
    fn test_texture_column_default_flags() {
        assert_eq!(RowGroupFlags::for_column(0), RowGroupFlags::all());
        assert_eq!(RowGroupFlags::for_column(2), RowGroupFlags::all());
        assert_eq!(
            RowGroupFlags::for_column(3),
            RowGroupFlags::new(true, true, false, false)
        );

        let resolver = ColumnResolver::new(28);
        let update = resolver.on_header_changed(
            HeaderValueChanged { column: 3, value: 5 },
            RowGroupFlags::for_column(3),
        );
        assert_eq!(indices(&update.enabled), vec![7, 11]);
        assert_eq!(indices(&update.colors), vec![3, 7, 11]);
        assert!(!update.bucket.enabled);
    }

    #[test]
    fn test_palette() {
        assert_eq!(Color::Red.rgb(), Some((235, 78, 40)));
        assert_eq!(Color::Neutral.rgb(), None);
        assert_eq!(Color::Blue.to_string(), "blue");
    }
}
