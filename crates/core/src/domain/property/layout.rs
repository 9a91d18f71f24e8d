use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

/// Columns that together identify one unit in the district sheet: zone, complex,
/// building, unit.
pub const KEY_COLUMNS: [&str; 4] = ["구역", "단지명", "동", "호"];
pub const IDENTIFIER_SEPARATOR: &str = " / ";

const IDENTIFIER_HEADERS: [&str; 5] = ["주소", "단지명", "address", "name", "id"];
const VALUE_HEADERS: [&str; 4] = ["공시가격", "가격", "assessed_value", "value"];
const AREA_HEADERS: [&str; 3] = ["면적", "전용면적", "area"];
const BUILT_YEAR_HEADERS: [&str; 3] = ["준공연도", "연도", "year"];

const MIN_VALUE_YEAR: i32 = 2010;
const MAX_VALUE_YEAR: i32 = 2100;

static YEAR_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}$").expect("year header pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearColumn {
    pub year: i32,
    pub index: usize,
}

/// Where each record field lives in a data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    identifier: Vec<usize>,
    zone: Option<usize>,
    value: usize,
    value_year: Option<i32>,
    years: Vec<YearColumn>,
    area: Option<usize>,
    built_year: Option<usize>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::positional()
    }
}

impl ColumnLayout {
    /// Identifier in the first column, assessed value in the second.
    pub fn positional() -> Self {
        ColumnLayout {
            identifier: vec![0],
            zone: None,
            value: 1,
            value_year: None,
            years: Vec::new(),
            area: None,
            built_year: None,
        }
    }

    /// Reads the layout off a normalized header row. Columns it cannot place
    /// fall back to the positional layout.
    pub fn detect(header: &[String], preferred_year: Option<i32>) -> Self {
        let find = |names: &[&str]| {
            names.iter().find_map(|name| {
                header
                    .iter()
                    .position(|cell| cell.eq_ignore_ascii_case(name))
            })
        };

        let key_indices: Option<Vec<usize>> = KEY_COLUMNS
            .iter()
            .map(|name| header.iter().position(|cell| cell == name))
            .collect();

        let (identifier, zone) = match key_indices {
            Some(indices) => {
                let zone = indices.first().copied();
                (indices, zone)
            }
            None => (vec![find(&IDENTIFIER_HEADERS).unwrap_or(0)], None),
        };

        let years = year_columns(header);
        let year_column = preferred_year
            .and_then(|year| years.iter().find(|column| column.year == year))
            .or_else(|| years.last())
            .copied();

        let (value, value_year) = match year_column {
            Some(column) => (column.index, Some(column.year)),
            None => (find(&VALUE_HEADERS).unwrap_or(1), None),
        };

        ColumnLayout {
            identifier,
            zone,
            value,
            value_year,
            years,
            area: find(&AREA_HEADERS),
            built_year: find(&BUILT_YEAR_HEADERS),
        }
    }

    /// Re-targets the value column to another year column, if the sheet has it.
    pub fn with_value_year(&self, year: i32) -> Option<Self> {
        let column = self.years.iter().find(|column| column.year == year)?;
        Some(ColumnLayout {
            value: column.index,
            value_year: Some(column.year),
            ..self.clone()
        })
    }

    pub fn value_column(&self) -> usize {
        self.value
    }

    pub fn value_year(&self) -> Option<i32> {
        self.value_year
    }

    pub fn years(&self) -> &[YearColumn] {
        &self.years
    }

    pub fn year_column(&self, year: i32) -> Option<YearColumn> {
        self.years.iter().find(|column| column.year == year).copied()
    }

    pub fn has_zone(&self) -> bool {
        self.zone.is_some()
    }

    pub fn identifier_of(&self, row: &[String]) -> String {
        self.identifier
            .iter()
            .map(|index| cell(row, *index))
            .collect::<Vec<_>>()
            .join(IDENTIFIER_SEPARATOR)
    }

    pub fn zone_of<'a>(&self, row: &'a [String]) -> Option<&'a str> {
        self.zone.map(|index| cell(row, index))
    }

    pub fn value_cell<'a>(&self, row: &'a [String]) -> &'a str {
        cell(row, self.value)
    }

    pub fn area_cell<'a>(&self, row: &'a [String]) -> Option<&'a str> {
        self.area.map(|index| cell(row, index))
    }

    pub fn built_year_cell<'a>(&self, row: &'a [String]) -> Option<&'a str> {
        self.built_year.map(|index| cell(row, index))
    }

    /// Sorted distinct non-empty zones, for the zone selector.
    pub fn distinct_zones(&self, rows: &[Vec<String>]) -> Vec<String> {
        rows.iter()
            .filter_map(|row| self.zone_of(row))
            .filter(|zone| !zone.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

/// Trimmed cell contents; short rows read as empty cells.
pub fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(|cell| cell.trim()).unwrap_or("")
}

fn year_columns(header: &[String]) -> Vec<YearColumn> {
    let mut years: Vec<YearColumn> = header
        .iter()
        .enumerate()
        .filter(|(_, name)| YEAR_HEADER.is_match(name))
        .filter_map(|(index, name)| {
            let year = name.parse::<i32>().ok()?;
            (MIN_VALUE_YEAR..=MAX_VALUE_YEAR)
                .contains(&year)
                .then_some(YearColumn { year, index })
        })
        .collect();

    years.sort_by_key(|column| column.year);
    years.dedup_by_key(|column| column.year);
    years
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        header(cells)
    }

    #[test]
    fn test_district_header() {
        let layout = ColumnLayout::detect(
            &header(&["구역", "단지명", "동", "호", "2016", "2017", "비고"]),
            None,
        );
        assert!(layout.has_zone());
        assert_eq!(layout.value_column(), 5);
        assert_eq!(layout.value_year(), Some(2017));
        assert_eq!(
            layout.years(),
            [
                YearColumn { year: 2016, index: 4 },
                YearColumn { year: 2017, index: 5 }
            ]
        );

        let data = row(&["1구역", "현대1차", "11", "101", "20.5", "22"]);
        assert_eq!(layout.identifier_of(&data), "1구역 / 현대1차 / 11 / 101");
        assert_eq!(layout.zone_of(&data), Some("1구역"));
        assert_eq!(layout.value_cell(&data), "22");
    }

    #[test]
    fn test_preferred_year() {
        let layout =
            ColumnLayout::detect(&header(&["구역", "단지명", "동", "호", "2016", "2017"]), Some(2016));
        assert_eq!(layout.value_year(), Some(2016));
        assert_eq!(layout.value_column(), 4);

        let missing =
            ColumnLayout::detect(&header(&["구역", "단지명", "동", "호", "2016", "2017"]), Some(1999));
        assert_eq!(missing.value_year(), Some(2017));
    }

    #[test]
    fn test_with_value_year() {
        let layout = ColumnLayout::detect(&header(&["id", "2020", "2021"]), None);
        let retargeted = layout.with_value_year(2020).unwrap();
        assert_eq!(retargeted.value_column(), 1);
        assert!(layout.with_value_year(2030).is_none());
    }

    #[test]
    fn test_years_out_of_range_ignored() {
        let layout = ColumnLayout::detect(&header(&["id", "1999", "9999", "price"]), None);
        assert!(layout.years().is_empty());
        assert_eq!(layout.value_column(), 1);
    }

    #[test]
    fn test_named_columns() {
        let layout = ColumnLayout::detect(&header(&["면적", "주소", "공시가격", "준공연도"]), None);
        let data = row(&["84.9", "압구정로 1", "30", "1978"]);
        assert_eq!(layout.identifier_of(&data), "압구정로 1");
        assert_eq!(layout.value_cell(&data), "30");
        assert_eq!(layout.area_cell(&data), Some("84.9"));
        assert_eq!(layout.built_year_cell(&data), Some("1978"));
        assert!(!layout.has_zone());
    }

    #[test]
    fn test_unknown_header_is_positional() {
        let layout = ColumnLayout::detect(&header(&["foo", "bar"]), None);
        assert_eq!(layout, ColumnLayout::positional());
    }

    #[test]
    fn test_short_row_reads_empty() {
        let layout = ColumnLayout::positional();
        assert_eq!(layout.value_cell(&row(&["A"])), "");
    }

    #[test]
    fn test_distinct_zones() {
        let layout = ColumnLayout::detect(&header(&["구역", "단지명", "동", "호", "2016"]), None);
        let rows = vec![
            row(&["2구역", "a", "1", "1", "1"]),
            row(&["1구역", "b", "1", "1", "1"]),
            row(&["2구역", "c", "1", "1", "1"]),
            row(&["", "d", "1", "1", "1"]),
        ];
        assert_eq!(layout.distinct_zones(&rows), ["1구역", "2구역"]);
    }
}
