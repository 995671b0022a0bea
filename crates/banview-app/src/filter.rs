// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Page, RecordField, RecordId, RecordNode};

/// The three independent filter axes. `"all"` disables an axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub keyword: String,
    pub period: String,
    pub reason: String,
}

impl FilterCriteria {
    pub const UNCONSTRAINED: &'static str = "all";
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            period: Self::UNCONSTRAINED.to_owned(),
            reason: Self::UNCONSTRAINED.to_owned(),
        }
    }
}

/// A record a pass could not evaluate because an attribute was missing.
/// The record's visibility is left exactly as the previous passes set it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSkip {
    pub record: RecordId,
    pub field: RecordField,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterReport {
    pub visible: usize,
    pub hidden: usize,
    pub skipped: Vec<FilterSkip>,
}

impl FilterReport {
    pub fn total(&self) -> usize {
        self.visible + self.hidden
    }
}

/// Re-evaluates record visibility whenever a criterion changes. Passes
/// only add hides on top of an initial reset-to-visible, so their order
/// cannot change the outcome.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    criteria: FilterCriteria,
}

impl FilterEngine {
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_keyword(&mut self, page: &mut Page, raw: &str) -> FilterReport {
        self.criteria.keyword = raw.trim().to_lowercase();
        self.recompute(page)
    }

    pub fn set_period(&mut self, page: &mut Page, value: &str) -> FilterReport {
        self.criteria.period = value.to_owned();
        self.recompute(page)
    }

    pub fn set_reason(&mut self, page: &mut Page, value: &str) -> FilterReport {
        self.criteria.reason = value.to_owned();
        self.recompute(page)
    }

    /// Full O(n) re-evaluation of every record against all three axes.
    pub fn recompute(&self, page: &mut Page) -> FilterReport {
        let mut report = FilterReport::default();
        if page.records.is_empty() {
            return report;
        }

        for record in &mut page.records {
            record.visible = true;
        }

        self.keyword_pass(&mut page.records, &mut report);
        self.period_pass(&mut page.records, &mut report);
        self.reason_pass(&mut page.records, &mut report);

        for record in &page.records {
            if record.visible {
                report.visible += 1;
            } else {
                report.hidden += 1;
            }
        }
        report
    }

    /// Hides records where none of the searchable fields contains the
    /// keyword, case-insensitively. A record missing any searchable field
    /// is skipped by this pass.
    fn keyword_pass(&self, records: &mut [RecordNode], report: &mut FilterReport) {
        if self.criteria.keyword.is_empty() {
            return;
        }

        for record in records {
            let mut values = Vec::with_capacity(RecordField::KEYWORD_FIELDS.len());
            let mut missing = None;
            for field in RecordField::KEYWORD_FIELDS {
                match record.attr(field) {
                    Some(value) => values.push(value),
                    None => {
                        missing = Some(field);
                        break;
                    }
                }
            }
            if let Some(field) = missing {
                report.skipped.push(FilterSkip {
                    record: record.id,
                    field,
                });
                continue;
            }

            let matched = values
                .iter()
                .any(|value| value.to_lowercase().contains(&self.criteria.keyword));
            if !matched {
                record.visible = false;
            }
        }
    }

    fn period_pass(&self, records: &mut [RecordNode], report: &mut FilterReport) {
        Self::tag_pass(records, report, RecordField::Period, &self.criteria.period);
    }

    fn reason_pass(&self, records: &mut [RecordNode], report: &mut FilterReport) {
        Self::tag_pass(records, report, RecordField::Reason, &self.criteria.reason);
    }

    /// Exact-equality pass over one category attribute.
    fn tag_pass(
        records: &mut [RecordNode],
        report: &mut FilterReport,
        field: RecordField,
        criterion: &str,
    ) {
        if criterion == FilterCriteria::UNCONSTRAINED {
            return;
        }

        for record in records {
            let matches = record.attr(field).map(|value| value == criterion);
            match matches {
                Some(true) => {}
                Some(false) => record.visible = false,
                None => report.skipped.push(FilterSkip {
                    record: record.id,
                    field,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FilterCriteria, FilterEngine, FilterSkip};
    use crate::{Page, RecordField, RecordId, RecordNode};

    fn record(id: i64, ip: &str, period: &str, reason: &str) -> RecordNode {
        let mut record = RecordNode::new(RecordId::new(id));
        record.set_attr(RecordField::Ip, ip);
        record.set_attr(RecordField::BanStart, "2026-08-01 10:00");
        record.set_attr(RecordField::BanEnd, "2026-08-02 10:00");
        record.set_attr(RecordField::Remain, "22h 14m");
        record.set_attr(RecordField::Period, period);
        record.set_attr(RecordField::Reason, reason);
        record
    }

    fn two_record_page() -> Page {
        let mut page = Page::new();
        page.records.push(record(1, "10.0.0.1", "ban", "abuse"));
        page.records.push(record(2, "10.0.0.2", "greban", "spam"));
        page
    }

    fn visibility(page: &Page) -> Vec<bool> {
        page.records.iter().map(|record| record.visible).collect()
    }

    #[test]
    fn default_criteria_are_unconstrained() {
        let engine = FilterEngine::default();
        assert_eq!(engine.criteria(), &FilterCriteria::default());
        assert_eq!(engine.criteria().period, "all");
        assert_eq!(engine.criteria().reason, "all");
        assert!(engine.criteria().keyword.is_empty());
    }

    #[test]
    fn empty_keyword_leaves_every_record_visible() {
        let mut page = two_record_page();
        let mut engine = FilterEngine::default();

        let report = engine.set_keyword(&mut page, "");
        assert_eq!(visibility(&page), vec![true, true]);
        assert_eq!(report.visible, 2);
        assert_eq!(report.hidden, 0);
    }

    #[test]
    fn keyword_matches_any_searchable_field() {
        let mut page = two_record_page();
        let mut engine = FilterEngine::default();

        engine.set_keyword(&mut page, "10.0.0.1");
        assert_eq!(visibility(&page), vec![true, false]);

        // ban_start is shared, so both rows match on it.
        engine.set_keyword(&mut page, "2026-08-01");
        assert_eq!(visibility(&page), vec![true, true]);

        // category attributes are not searched by the keyword pass
        engine.set_keyword(&mut page, "abuse");
        assert_eq!(visibility(&page), vec![false, false]);
    }

    #[test]
    fn keyword_is_trimmed_lowercased_and_case_insensitive() {
        let mut page = Page::new();
        let mut upper = record(1, "2001:DB8::17", "ban", "abuse");
        upper.set_attr(RecordField::Remain, "Permanent");
        page.records.push(upper);

        let mut engine = FilterEngine::default();
        engine.set_keyword(&mut page, "  2001:db8  ");
        assert_eq!(engine.criteria().keyword, "2001:db8");
        assert_eq!(visibility(&page), vec![true]);

        engine.set_keyword(&mut page, "PERMANENT");
        assert_eq!(visibility(&page), vec![true]);

        engine.set_keyword(&mut page, "no-match");
        assert_eq!(visibility(&page), vec![false]);
    }

    #[test]
    fn period_pass_hides_only_other_periods() {
        let mut page = two_record_page();
        let mut engine = FilterEngine::default();

        let report = engine.set_period(&mut page, "ban");
        assert_eq!(visibility(&page), vec![true, false]);
        assert_eq!(report.visible, 1);
        assert_eq!(report.hidden, 1);

        let report = engine.set_period(&mut page, "all");
        assert_eq!(visibility(&page), vec![true, true]);
        assert_eq!(report.hidden, 0);
    }

    #[test]
    fn passes_are_additive_hides() {
        let mut page = two_record_page();
        let mut engine = FilterEngine::default();

        // keyword keeps row 1 only, reason keeps row 2 only: nothing survives
        engine.set_keyword(&mut page, "10.0.0.1");
        let report = engine.set_reason(&mut page, "spam");
        assert_eq!(visibility(&page), vec![false, false]);
        assert_eq!(report.visible, 0);
        assert_eq!(report.hidden, 2);
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut page = two_record_page();
        let mut engine = FilterEngine::default();
        engine.set_keyword(&mut page, "10.0.0");
        engine.set_period(&mut page, "greban");

        let first = engine.recompute(&mut page);
        let first_visibility = visibility(&page);
        let second = engine.recompute(&mut page);

        assert_eq!(first, second);
        assert_eq!(visibility(&page), first_visibility);
    }

    #[test]
    fn empty_list_recompute_is_a_noop() {
        let mut page = Page::new();
        let mut engine = FilterEngine::default();
        let report = engine.set_keyword(&mut page, "anything");
        assert_eq!(report.total(), 0);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn criteria_sequence_scenario() {
        let mut page = two_record_page();
        let mut engine = FilterEngine::default();

        engine.set_keyword(&mut page, "10.0.0.1");
        assert_eq!(visibility(&page), vec![true, false]);

        engine.set_keyword(&mut page, "");
        engine.set_period(&mut page, "ban");
        assert_eq!(visibility(&page), vec![true, false]);

        engine.set_period(&mut page, "all");
        engine.set_reason(&mut page, "spam");
        assert_eq!(visibility(&page), vec![false, true]);
    }

    #[test]
    fn malformed_record_is_skipped_deterministically() {
        let mut page = two_record_page();
        let mut gap = RecordNode::new(RecordId::new(3));
        gap.set_attr(RecordField::Ip, "10.0.0.3");
        gap.set_attr(RecordField::BanStart, "2026-08-01 10:00");
        // ban_end, remain, period, reason all absent
        page.records.push(gap);

        let mut engine = FilterEngine::default();
        let report = engine.set_keyword(&mut page, "10.0.0.3");

        // the malformed record keeps its reset-visible state
        assert_eq!(visibility(&page), vec![false, false, true]);
        assert_eq!(
            report.skipped,
            vec![FilterSkip {
                record: RecordId::new(3),
                field: RecordField::BanEnd,
            }]
        );

        // repeat runs report the identical skip list
        let again = engine.recompute(&mut page);
        assert_eq!(again.skipped, report.skipped);
    }

    #[test]
    fn tag_pass_reports_missing_category_attribute() {
        let mut page = Page::new();
        let mut gap = RecordNode::new(RecordId::new(9));
        gap.set_attr(RecordField::Ip, "10.0.0.9");
        gap.set_attr(RecordField::BanStart, "2026-08-01 10:00");
        gap.set_attr(RecordField::BanEnd, "2026-08-02 10:00");
        gap.set_attr(RecordField::Remain, "3h");
        gap.set_attr(RecordField::Reason, "abuse");
        page.records.push(gap);

        let mut engine = FilterEngine::default();
        let report = engine.set_period(&mut page, "ban");

        assert_eq!(
            report.skipped,
            vec![FilterSkip {
                record: RecordId::new(9),
                field: RecordField::Period,
            }]
        );
        // skipped by the period pass: stays visible from the reset
        assert!(page.records[0].visible);
        assert_eq!(report.visible, 1);
    }

    #[test]
    fn attribute_whitespace_is_not_trimmed_for_matching() {
        let mut page = Page::new();
        let mut padded = record(1, "10.0.0.1", " ban", "abuse");
        padded.set_attr(RecordField::Ip, "10.0.0.1");
        page.records.push(padded);

        let mut engine = FilterEngine::default();
        engine.set_period(&mut page, "ban");
        // " ban" != "ban": exact equality over the stored value
        assert_eq!(visibility(&page), vec![false]);
    }
}
