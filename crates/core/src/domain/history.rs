//! Year-by-year views of one unit: how its rank moved inside its zone and
//! across the district, and how its price tracked the closest-priced unit of
//! another zone.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use super::{
    property::{layout::ColumnLayout, parse::parse_value},
    ranking::min_ranks,
};

/// Comparison year used when the sheet has it.
pub const DEFAULT_BASE_YEAR: i32 = 2016;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRank {
    pub year: i32,
    pub zone_rank: Option<usize>,
    pub overall_rank: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub year: i32,
    pub selected: f64,
    pub other: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceComparison {
    pub base_year: i32,
    pub other_row_index: usize,
    pub other_identifier: String,
    pub other_zone: String,
    pub points: Vec<PricePoint>,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonUnavailable {
    #[error("sheet has no zone column")]
    NoZoneColumn,
    #[error("sheet has no {0} column")]
    NoBaseYear(i32),
    #[error("selected unit has no {0} value")]
    NoBaseValue(i32),
    #[error("no unit in another zone has a {0} value")]
    NoCandidates(i32),
    #[error("no year has values for both units")]
    NoCommonYears,
}

/// Values of one column for every row; `None` where the cell does not parse.
fn column_values(rows: &[Vec<String>], index: usize) -> Vec<Option<f64>> {
    rows.iter()
        .map(|row| row.get(index).and_then(|cell| parse_value(cell).ok()))
        .collect()
}

/// Ranks of `target` in every year where it has a value. Rows without a value
/// in a year are left out of that year's ranking.
pub fn rank_history(layout: &ColumnLayout, rows: &[Vec<String>], target: usize) -> Vec<YearRank> {
    let Some(target_row) = rows.get(target) else {
        return Vec::new();
    };
    let target_zone = layout.zone_of(target_row);

    layout
        .years()
        .iter()
        .filter_map(|column| {
            let values = column_values(rows, column.index);
            values[target]?;

            let ranked: Vec<(usize, f64)> = values
                .iter()
                .enumerate()
                .filter_map(|(index, value)| value.map(|value| (index, value)))
                .collect();
            let overall = rank_of(&ranked, target)?;

            let zone_rank = target_zone.and_then(|zone| {
                let in_zone: Vec<(usize, f64)> = ranked
                    .iter()
                    .copied()
                    .filter(|(index, _)| layout.zone_of(&rows[*index]) == Some(zone))
                    .collect();
                rank_of(&in_zone, target)
            });

            Some(YearRank {
                year: column.year,
                zone_rank,
                overall_rank: overall,
            })
        })
        .collect()
}

fn rank_of(entries: &[(usize, f64)], target: usize) -> Option<usize> {
    let values: Vec<f64> = entries.iter().map(|(_, value)| *value).collect();
    let position = entries.iter().position(|(index, _)| *index == target)?;
    min_ranks(&values).get(position).copied()
}

/// `DEFAULT_BASE_YEAR` if the sheet has it, otherwise its earliest year.
pub fn base_year(layout: &ColumnLayout) -> Option<i32> {
    layout
        .year_column(DEFAULT_BASE_YEAR)
        .or_else(|| layout.years().first().copied())
        .map(|column| column.year)
}

/// Finds the unit in a different zone whose `base_year` value is closest to
/// the target's, and pairs their values for every year both have.
pub fn closest_in_other_zone(
    layout: &ColumnLayout,
    rows: &[Vec<String>],
    target: usize,
    base_year: i32,
) -> Result<PriceComparison, ComparisonUnavailable> {
    if !layout.has_zone() {
        return Err(ComparisonUnavailable::NoZoneColumn);
    }
    let base_column = layout
        .year_column(base_year)
        .ok_or(ComparisonUnavailable::NoBaseYear(base_year))?;
    let target_row = rows
        .get(target)
        .ok_or(ComparisonUnavailable::NoBaseValue(base_year))?;
    let target_zone = layout.zone_of(target_row);

    let base_values = column_values(rows, base_column.index);
    let base_value = base_values[target].ok_or(ComparisonUnavailable::NoBaseValue(base_year))?;

    // `min_by` keeps the first of equal distances, so ties go to sheet order.
    let (other, _) = base_values
        .iter()
        .enumerate()
        .filter(|(index, _)| {
            let zone = layout.zone_of(&rows[*index]);
            zone != target_zone && zone.is_some_and(|zone| !zone.is_empty())
        })
        .filter_map(|(index, value)| value.map(|value| (index, (value - base_value).abs())))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .ok_or(ComparisonUnavailable::NoCandidates(base_year))?;

    let by_year: BTreeMap<i32, PricePoint> = layout
        .years()
        .iter()
        .filter_map(|column| {
            let selected = parse_value(rows[target].get(column.index)?).ok()?;
            let other = parse_value(rows[other].get(column.index)?).ok()?;
            Some((
                column.year,
                PricePoint {
                    year: column.year,
                    selected,
                    other,
                },
            ))
        })
        .collect();

    if by_year.is_empty() {
        return Err(ComparisonUnavailable::NoCommonYears);
    }

    Ok(PriceComparison {
        base_year,
        other_row_index: other,
        other_identifier: layout.identifier_of(&rows[other]),
        other_zone: layout.zone_of(&rows[other]).unwrap_or_default().to_string(),
        points: by_year.into_values().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    fn district() -> (ColumnLayout, Vec<Vec<String>>) {
        let layout = ColumnLayout::detect(
            &strings(&["구역", "단지명", "동", "호", "2016", "2017", "2018"]),
            None,
        );
        let rows = vec![
            strings(&["1구역", "현대", "1", "101", "20", "24", "30"]),
            strings(&["1구역", "현대", "1", "102", "18", "25", ""]),
            strings(&["2구역", "한양", "2", "201", "19", "21", "27"]),
            strings(&["2구역", "한양", "2", "202", "30", "", "35"]),
            strings(&["3구역", "미성", "3", "301", "21.5", "22", "26"]),
        ];
        (layout, rows)
    }

    #[test]
    fn test_rank_history() {
        let (layout, rows) = district();
        let history = rank_history(&layout, &rows, 1);
        assert_eq!(
            history,
            [
                YearRank { year: 2016, zone_rank: Some(2), overall_rank: 5 },
                YearRank { year: 2017, zone_rank: Some(1), overall_rank: 1 },
            ]
        );
    }

    #[test]
    fn test_rank_history_out_of_range() {
        let (layout, rows) = district();
        assert!(rank_history(&layout, &rows, 99).is_empty());
    }

    #[test]
    fn test_rank_history_without_year_columns() {
        let layout = ColumnLayout::positional();
        assert!(rank_history(&layout, &[strings(&["A", "1"])], 0).is_empty());
    }

    #[test]
    fn test_base_year() {
        let (layout, _) = district();
        assert_eq!(base_year(&layout), Some(2016));

        let later = ColumnLayout::detect(&strings(&["id", "2019", "2018"]), None);
        assert_eq!(base_year(&later), Some(2018));
        assert_eq!(base_year(&ColumnLayout::positional()), None);
    }

    #[test]
    fn test_closest_in_other_zone() {
        let (layout, rows) = district();
        let comparison = closest_in_other_zone(&layout, &rows, 0, 2016).unwrap();
        assert_eq!(comparison.other_row_index, 2);
        assert_eq!(comparison.other_identifier, "2구역 / 한양 / 2 / 201");
        assert_eq!(comparison.other_zone, "2구역");
        assert_eq!(
            comparison.points,
            [
                PricePoint { year: 2016, selected: 20.0, other: 19.0 },
                PricePoint { year: 2017, selected: 24.0, other: 21.0 },
                PricePoint { year: 2018, selected: 30.0, other: 27.0 },
            ]
        );
    }

    #[test]
    fn test_comparison_skips_years_missing_a_value() {
        let (layout, rows) = district();
        let comparison = closest_in_other_zone(&layout, &rows, 3, 2016).unwrap();
        assert_eq!(comparison.other_row_index, 4);
        let years: Vec<i32> = comparison.points.iter().map(|point| point.year).collect();
        assert_eq!(years, [2016, 2018]);
    }

    #[test]
    fn test_comparison_unavailable() {
        let (layout, rows) = district();
        assert_eq!(
            closest_in_other_zone(&layout, &rows, 0, 2015),
            Err(ComparisonUnavailable::NoBaseYear(2015))
        );
        assert_eq!(
            closest_in_other_zone(&ColumnLayout::positional(), &rows, 0, 2016),
            Err(ComparisonUnavailable::NoZoneColumn)
        );

        let single_zone = vec![
            strings(&["1구역", "현대", "1", "101", "20", "24", "30"]),
            strings(&["1구역", "현대", "1", "102", "18", "25", ""]),
        ];
        assert_eq!(
            closest_in_other_zone(&layout, &single_zone, 0, 2016),
            Err(ComparisonUnavailable::NoCandidates(2016))
        );
    }
}
