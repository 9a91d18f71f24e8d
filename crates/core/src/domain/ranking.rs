use std::{cmp::Ordering, collections::BTreeMap};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::{
    format::{format_value, DEFAULT_VALUE_UNIT},
    property::{layout::ColumnLayout, record::PropertyRecord},
};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    ValueDesc,
    ValueAsc,
    Identifier,
    SheetOrder,
}

impl SortOrder {
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::ValueDesc => "공시가격 높은 순",
            SortOrder::ValueAsc => "공시가격 낮은 순",
            SortOrder::Identifier => "이름 순",
            SortOrder::SheetOrder => "시트 순서",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankingQuery {
    pub filter_text: String,
    pub sort_order: SortOrder,
    pub zone: Option<String>,
}

impl RankingQuery {
    pub fn new(filter_text: impl Into<String>, sort_order: SortOrder) -> Self {
        RankingQuery {
            filter_text: filter_text.into(),
            sort_order,
            zone: None,
        }
    }

    pub fn with_zone(mut self, zone: Option<String>) -> Self {
        self.zone = zone.filter(|zone| !zone.trim().is_empty());
        self
    }

    /// Trimmed filter text, or `None` when there is nothing to filter by.
    pub fn search_text(&self) -> Option<&str> {
        Some(self.filter_text.trim()).filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRecord {
    /// Position in this view, starting at 1.
    pub rank: usize,
    /// Rank among every valid record by value, ties sharing the lowest rank.
    pub overall_rank: usize,
    /// Same as `overall_rank`, within the record's zone.
    pub zone_rank: Option<usize>,
    pub formatted_value: String,
    #[serde(flatten)]
    pub record: PropertyRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub dropped_count: usize,
    pub total_rows: usize,
    pub top: Option<f64>,
    pub bottom: Option<f64>,
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingView {
    pub records: Vec<RankedRecord>,
    pub summary: Summary,
    pub value_year: Option<i32>,
}

impl RankingView {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dropped_count(&self) -> usize {
        self.summary.dropped_count
    }
}

/// Turns raw data rows into a ranked view. Holds no state beyond its
/// configuration, so equal inputs always give equal views.
#[derive(Debug, Clone)]
pub struct RankingProcessor {
    layout: ColumnLayout,
    value_unit: String,
}

impl Default for RankingProcessor {
    fn default() -> Self {
        Self::new(ColumnLayout::positional())
    }
}

impl RankingProcessor {
    pub fn new(layout: ColumnLayout) -> Self {
        RankingProcessor {
            layout,
            value_unit: DEFAULT_VALUE_UNIT.to_string(),
        }
    }

    pub fn with_value_unit(mut self, value_unit: impl Into<String>) -> Self {
        self.value_unit = value_unit.into();
        self
    }

    /// Parses the rows that have a numeric value, in sheet order. The second
    /// element is the number of rows dropped.
    pub fn parse_rows(&self, raw_rows: &[Vec<String>]) -> (Vec<PropertyRecord>, usize) {
        let mut dropped = 0;
        let records = raw_rows
            .iter()
            .enumerate()
            .filter_map(
                |(row_index, row)| match PropertyRecord::from_row(&self.layout, row_index, row) {
                    Ok(record) => Some(record),
                    Err(err) => {
                        tracing::debug!(row_index, %err, "dropping row");
                        dropped += 1;
                        None
                    }
                },
            )
            .collect();
        (records, dropped)
    }

    pub fn process(&self, raw_rows: &[Vec<String>], query: &RankingQuery) -> RankingView {
        let (records, dropped_count) = self.parse_rows(raw_rows);

        let values: Vec<f64> = records.iter().map(|record| record.value).collect();
        let overall_ranks = min_ranks(&values);
        let zone_ranks = self.zone_ranks(&records);

        let needle = query.search_text().map(str::to_lowercase);
        let mut kept: Vec<(PropertyRecord, usize, Option<usize>)> = records
            .into_iter()
            .zip(overall_ranks)
            .zip(zone_ranks)
            .map(|((record, overall), zone)| (record, overall, zone))
            .filter(|(record, _, _)| match &needle {
                Some(needle) => record.identifier.to_lowercase().contains(needle),
                None => true,
            })
            .filter(|(record, _, _)| match &query.zone {
                Some(zone) => record.zone.as_deref() == Some(zone.as_str()),
                None => true,
            })
            .collect();

        // Records arrive in sheet order and `sort_by` is stable, so ties keep it.
        match query.sort_order {
            SortOrder::ValueDesc => kept.sort_by(|a, b| by_value(b.0.value, a.0.value)),
            SortOrder::ValueAsc => kept.sort_by(|a, b| by_value(a.0.value, b.0.value)),
            SortOrder::Identifier => kept.sort_by(|a, b| a.0.identifier.cmp(&b.0.identifier)),
            SortOrder::SheetOrder => kept.sort_by_key(|entry| entry.0.row_index),
        }

        let ranked: Vec<RankedRecord> = kept
            .into_iter()
            .enumerate()
            .map(|(position, (record, overall_rank, zone_rank))| RankedRecord {
                rank: position + 1,
                overall_rank,
                zone_rank,
                formatted_value: format_value(record.value, &self.value_unit),
                record,
            })
            .collect();

        RankingView {
            summary: summarize(&ranked, dropped_count, raw_rows.len()),
            records: ranked,
            value_year: self.layout.value_year(),
        }
    }

    fn zone_ranks(&self, records: &[PropertyRecord]) -> Vec<Option<usize>> {
        let mut ranks = vec![None; records.len()];
        if !self.layout.has_zone() {
            return ranks;
        }

        let mut by_zone: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (index, record) in records.iter().enumerate() {
            if let Some(zone) = record.zone.as_deref() {
                by_zone.entry(zone).or_default().push(index);
            }
        }

        for members in by_zone.values() {
            let values: Vec<f64> = members.iter().map(|&index| records[index].value).collect();
            for (&index, rank) in members.iter().zip(min_ranks(&values)) {
                ranks[index] = Some(rank);
            }
        }
        ranks
    }
}

/// Parsed values are finite, so equal means equal: `-0` ties with `0`.
fn by_value(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Ranks `values` from highest to lowest. Equal values share the lowest rank
/// of their group and the next distinct value skips ahead (1, 2, 2, 4).
/// The result is aligned with the input.
pub fn min_ranks(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| by_value(values[b], values[a]));

    let mut ranks = vec![0; values.len()];
    let mut previous: Option<(f64, usize)> = None;
    for (position, &index) in order.iter().enumerate() {
        let value = values[index];
        let rank = match previous {
            Some((previous_value, previous_rank)) if previous_value == value => previous_rank,
            _ => position + 1,
        };
        ranks[index] = rank;
        previous = Some((value, rank));
    }
    ranks
}

fn summarize(records: &[RankedRecord], dropped_count: usize, total_rows: usize) -> Summary {
    let values = records.iter().map(|ranked| ranked.record.value);
    let top = values.clone().reduce(f64::max);
    let bottom = values.clone().reduce(f64::min);
    let mean = (!records.is_empty()).then(|| values.sum::<f64>() / records.len() as f64);

    Summary {
        count: records.len(),
        dropped_count,
        total_rows,
        top,
        bottom,
        mean,
    }
}

/// Ranks rows whose first cell is the identifier and second cell the value.
pub fn process(raw_rows: &[Vec<String>], filter_text: &str, sort_order: SortOrder) -> RankingView {
    RankingProcessor::default().process(raw_rows, &RankingQuery::new(filter_text, sort_order))
}
