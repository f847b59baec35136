use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::features::{build_features, FeatureVector};
use crate::tables::{ExecAttributeRecord, MatchRecord, OpportunityRecord};
use crate::{Executive, Opportunity};

/// One assembled (opportunity, executive) pair: the fixed-order feature
/// vector plus its binary relevance label. Grouped by `assignment_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub assignment_id: i64,
    pub exec_id: i64,
    pub features: FeatureVector,
    pub label: u8,
}

/// Why a raw match row was excluded from the dataset. Skips are counted,
/// never silently discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RowSkip {
    MissingAssignmentId,
    MissingExecId,
    MissingOutcome,
}

impl fmt::Display for RowSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RowSkip::MissingAssignmentId => "missing_assignment_id",
            RowSkip::MissingExecId => "missing_exec_id",
            RowSkip::MissingOutcome => "missing_outcome",
        };
        f.write_str(name)
    }
}

/// Per-run accounting for the dataset build, reported at job completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssemblyReport {
    pub rows_kept: usize,
    pub rows_skipped: BTreeMap<RowSkip, usize>,
    pub groups_dropped_without_positive: usize,
}

impl AssemblyReport {
    pub fn rows_skipped_total(&self) -> usize {
        self.rows_skipped.values().sum()
    }
}

/// Pivot the long-form attribute table into one wide row per executive,
/// keeping the first non-null value per attribute type. Rows without an
/// executive id are ignored. Output is ordered by executive id.
pub fn pivot_executives(rows: &[ExecAttributeRecord]) -> Vec<Executive> {
    let mut wide: BTreeMap<i64, Executive> = BTreeMap::new();

    for row in rows {
        let Some(exec_id) = row.exec_entity_id else {
            continue;
        };

        let entry = wide.entry(exec_id).or_insert_with(|| Executive {
            exec_id: Some(exec_id),
            ..Executive::default()
        });

        let json = row.json_value.as_deref().filter(|v| !v.trim().is_empty());
        let string = row.string_value.as_deref().filter(|v| !v.trim().is_empty());

        match row.attribute_type.as_str() {
            "sectors" => first_wins(&mut entry.sectors, json),
            "sub_sectors" => first_wins(&mut entry.sub_sectors, json),
            "industry" => first_wins(&mut entry.industry, json),
            "hq_address" => first_wins(&mut entry.hq_country, string),
            "scale" => first_wins(&mut entry.scale, string),
            other => {
                tracing::debug!(attribute_type = other, exec_id, "unmapped attribute type");
            }
        }
    }

    wide.into_values().collect()
}

fn first_wins(slot: &mut Option<String>, value: Option<&str>) {
    if slot.is_none() {
        if let Some(value) = value {
            *slot = Some(value.to_string());
        }
    }
}

fn opportunity_from_record(record: &OpportunityRecord) -> Opportunity {
    Opportunity {
        assignment_id: record.assignment_id,
        sectors: record.sectors.clone(),
        sub_sectors: record.sub_sectors.clone(),
        industry: record.industry.clone(),
        country: record.country.clone(),
        scale: record.scale.clone(),
    }
}

/// Left-join matches with opportunities and the wide executive table, build
/// features row-wise, and label each row. A match row referencing an unknown
/// opportunity or executive is retained with absent fields (its features
/// degrade to zero); only rows missing a key or the outcome are skipped.
pub fn assemble_dataset(
    matches: &[MatchRecord],
    opportunities: &[OpportunityRecord],
    executives: &[Executive],
) -> (Vec<FeatureRow>, AssemblyReport) {
    let opportunity_index: HashMap<i64, Opportunity> = opportunities
        .iter()
        .filter_map(|record| {
            record
                .assignment_id
                .map(|id| (id, opportunity_from_record(record)))
        })
        .collect();

    let executive_index: HashMap<i64, &Executive> = executives
        .iter()
        .filter_map(|exec| exec.exec_id.map(|id| (id, exec)))
        .collect();

    let absent_opportunity = Opportunity::default();
    let absent_executive = Executive::default();

    let mut report = AssemblyReport::default();
    let mut rows = Vec::with_capacity(matches.len());

    for record in matches {
        let skip = if record.assignment_id.is_none() {
            Some(RowSkip::MissingAssignmentId)
        } else if record.exec_entity_id.is_none() {
            Some(RowSkip::MissingExecId)
        } else if record.outcome.is_none() {
            Some(RowSkip::MissingOutcome)
        } else {
            None
        };

        if let Some(reason) = skip {
            *report.rows_skipped.entry(reason).or_insert(0) += 1;
            continue;
        }

        let assignment_id = record.assignment_id.unwrap_or_default();
        let exec_id = record.exec_entity_id.unwrap_or_default();
        let outcome = record.outcome.unwrap_or_default();

        let opportunity = opportunity_index
            .get(&assignment_id)
            .unwrap_or(&absent_opportunity);
        let executive = executive_index
            .get(&exec_id)
            .copied()
            .unwrap_or(&absent_executive);

        rows.push(FeatureRow {
            assignment_id,
            exec_id,
            features: build_features(opportunity, executive),
            label: u8::from(outcome != 0.0),
        });
    }

    report.rows_kept = rows.len();
    (rows, report)
}

/// Drop every group with zero positive labels. Opportunities with no
/// verified placement carry no ranking signal and would poison both
/// training and evaluation, so the whole group goes, not a sample of it.
pub fn drop_groups_without_positive(
    rows: Vec<FeatureRow>,
    report: &mut AssemblyReport,
) -> Vec<FeatureRow> {
    let mut positives_per_group: BTreeMap<i64, usize> = BTreeMap::new();
    for row in &rows {
        *positives_per_group.entry(row.assignment_id).or_insert(0) += usize::from(row.label == 1);
    }

    report.groups_dropped_without_positive = positives_per_group
        .values()
        .filter(|&&count| count == 0)
        .count();

    let kept: Vec<FeatureRow> = rows
        .into_iter()
        .filter(|row| positives_per_group[&row.assignment_id] > 0)
        .collect();

    report.rows_kept = kept.len();
    kept
}
