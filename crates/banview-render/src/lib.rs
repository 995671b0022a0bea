// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! The templating layer of the dashboard: turns ban data into the page
//! tree the interaction core reads. The core never creates records or
//! widgets itself, so everything here runs before any filtering.

use anyhow::{Context, Result};
use banview_app::{
    BanRecord, BanSnapshot, DateRangeInputs, FilterCriteria, OptionButton, Page, RecordField,
    RecordId, RecordNode, SelectSetting, SelectWidget, WidgetId,
};
use std::collections::BTreeSet;
use time::OffsetDateTime;
use time::macros::format_description;

const TIMESTAMP_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");
const DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Builds the full page: record list, select widgets with options derived
/// from the data, and the date-range inputs.
pub fn render_page(snapshot: &BanSnapshot, now: OffsetDateTime) -> Result<Page> {
    let mut page = Page::new();
    page.records = render_records(&snapshot.bans, now)?;

    let periods = distinct_tags(&snapshot.bans, |ban| ban.period.as_str());
    let reasons = distinct_tags(&snapshot.bans, |ban| ban.reason.as_str());

    page.selects.push(tag_widget(
        WidgetId::new(1),
        SelectSetting::Period,
        &periods,
    ));
    page.selects.push(tag_widget(
        WidgetId::new(2),
        SelectSetting::Reason,
        &reasons,
    ));
    page.selects.push(instances_widget(WidgetId::new(3), snapshot));
    page.date_range = date_range_inputs(&snapshot.bans, now)?;

    Ok(page)
}

/// Renders one record node per ban, all six attributes present.
pub fn render_records(bans: &[BanRecord], now: OffsetDateTime) -> Result<Vec<RecordNode>> {
    let mut records = Vec::with_capacity(bans.len());
    for (index, ban) in bans.iter().enumerate() {
        let mut record = RecordNode::new(RecordId::new(index as i64 + 1));
        record.set_attr(RecordField::Ip, ban.ip.clone());
        record.set_attr(RecordField::BanStart, format_timestamp(ban.ban_start)?);
        record.set_attr(
            RecordField::BanEnd,
            match ban.ban_end {
                Some(ban_end) => format_timestamp(ban_end)?,
                None => "never".to_owned(),
            },
        );
        record.set_attr(RecordField::Remain, remaining_label(now, ban.ban_end));
        record.set_attr(RecordField::Period, ban.period.clone());
        record.set_attr(RecordField::Reason, ban.reason.clone());
        records.push(record);
    }
    Ok(records)
}

/// Human label for the time a ban has left.
pub fn remaining_label(now: OffsetDateTime, ban_end: Option<OffsetDateTime>) -> String {
    let Some(end) = ban_end else {
        return "permanent".to_owned();
    };
    let remaining = end - now;
    if remaining <= time::Duration::ZERO {
        return "expired".to_owned();
    }

    let days = remaining.whole_days();
    let hours = remaining.whole_hours() % 24;
    let minutes = remaining.whole_minutes() % 60;
    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        "under 1m".to_owned()
    }
}

fn format_timestamp(value: OffsetDateTime) -> Result<String> {
    value
        .format(&TIMESTAMP_FORMAT)
        .context("format ban timestamp")
}

fn distinct_tags<'a>(bans: &'a [BanRecord], tag: impl Fn(&'a BanRecord) -> &'a str) -> Vec<String> {
    bans.iter()
        .map(tag)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Period/reason widget: `all` first, then the distinct tags in sorted
/// order. A widget with nothing but `all` is rendered disabled.
fn tag_widget(id: WidgetId, setting: SelectSetting, tags: &[String]) -> SelectWidget {
    let mut widget = SelectWidget::new(id, setting.as_str(), FilterCriteria::UNCONSTRAINED);
    widget.push_option(OptionButton::new(FilterCriteria::UNCONSTRAINED));
    for tag in tags {
        widget.push_option(OptionButton::new(tag.clone()));
    }
    widget.disabled = widget.options.len() <= 1;
    widget.sync_selected_option();
    widget
}

/// Instances widget: `all` plus one option per known instance, each
/// carrying its deployment kind as the scope tag.
fn instances_widget(id: WidgetId, snapshot: &BanSnapshot) -> SelectWidget {
    let mut widget = SelectWidget::new(
        id,
        SelectSetting::Instances.as_str(),
        FilterCriteria::UNCONSTRAINED,
    );
    widget.push_option(OptionButton::new(FilterCriteria::UNCONSTRAINED).with_scope_tag("global"));
    for instance in &snapshot.instances {
        widget.push_option(OptionButton::new(instance.name.clone()).with_scope_tag(instance.kind.clone()));
    }
    widget.disabled = widget.options.len() <= 1;
    widget.sync_selected_option();
    widget
}

/// Date inputs prefilled with the span of the data; shown because the
/// initial scope is the global `all`.
fn date_range_inputs(bans: &[BanRecord], now: OffsetDateTime) -> Result<DateRangeInputs> {
    let earliest = bans
        .iter()
        .map(|ban| ban.ban_start)
        .min()
        .unwrap_or(now);
    Ok(DateRangeInputs {
        from_value: earliest.format(&DATE_FORMAT).context("format from date")?,
        to_value: now.format(&DATE_FORMAT).context("format to date")?,
        visible: true,
    })
}
