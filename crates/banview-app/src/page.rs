// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::{RecordField, RecordId, WidgetId};

/// One rendered ban row. The rendering layer owns creation and attribute
/// values; the interaction core only flips `visible`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordNode {
    pub id: RecordId,
    attrs: BTreeMap<RecordField, String>,
    pub visible: bool,
}

impl RecordNode {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            attrs: BTreeMap::new(),
            visible: true,
        }
    }

    pub fn set_attr(&mut self, field: RecordField, value: impl Into<String>) {
        self.attrs.insert(field, value.into());
    }

    /// Attribute value exactly as rendered; `None` marks a malformed record.
    pub fn attr(&self, field: RecordField) -> Option<&str> {
        self.attrs.get(&field).map(String::as_str)
    }

    pub fn has_all_attrs(&self) -> bool {
        RecordField::ALL.iter().all(|field| self.attrs.contains_key(field))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionButton {
    pub value: String,
    pub scope_tag: Option<String>,
    pub selected: bool,
}

impl OptionButton {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            scope_tag: None,
            selected: false,
        }
    }

    pub fn with_scope_tag(mut self, tag: impl Into<String>) -> Self {
        self.scope_tag = Some(tag.into());
        self
    }
}

/// A dropdown/select control: trigger button, display-text node, and an
/// option panel. `open` drives both the panel and the indicator glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectWidget {
    pub id: WidgetId,
    pub setting: String,
    pub disabled: bool,
    pub display_text: String,
    pub open: bool,
    pub options: Vec<OptionButton>,
}

impl SelectWidget {
    pub fn new(id: WidgetId, setting: impl Into<String>, display_text: impl Into<String>) -> Self {
        Self {
            id,
            setting: setting.into(),
            disabled: false,
            display_text: display_text.into(),
            open: false,
            options: Vec::new(),
        }
    }

    pub fn push_option(&mut self, option: OptionButton) {
        self.options.push(option);
    }

    /// Marks the option matching the display text as selected.
    pub fn sync_selected_option(&mut self) {
        for option in &mut self.options {
            option.selected = option.value == self.display_text;
        }
    }

    pub fn selected_option_index(&self) -> Option<usize> {
        self.options.iter().position(|option| option.selected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DateRangeInputs {
    pub from_value: String,
    pub to_value: String,
    pub visible: bool,
}

/// The abstract document the core operates on: record list, keyword input,
/// select widgets, and the date-range input pair.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    pub keyword_input: String,
    pub records: Vec<RecordNode>,
    pub selects: Vec<SelectWidget>,
    pub date_range: DateRangeInputs,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn widget(&self, id: WidgetId) -> Option<&SelectWidget> {
        self.selects.iter().find(|widget| widget.id == id)
    }

    pub fn widget_mut(&mut self, id: WidgetId) -> Option<&mut SelectWidget> {
        self.selects.iter_mut().find(|widget| widget.id == id)
    }

    pub fn widget_by_setting(&self, setting: &str) -> Option<&SelectWidget> {
        self.selects.iter().find(|widget| widget.setting == setting)
    }

    /// Displayed value of the widget for `setting`, if such a widget exists.
    pub fn displayed_value(&self, setting: &str) -> Option<&str> {
        self.widget_by_setting(setting)
            .map(|widget| widget.display_text.as_str())
    }

    pub fn visible_records(&self) -> impl Iterator<Item = &RecordNode> {
        self.records.iter().filter(|record| record.visible)
    }

    pub fn visible_count(&self) -> usize {
        self.visible_records().count()
    }

    pub fn open_widgets(&self) -> impl Iterator<Item = &SelectWidget> {
        self.selects.iter().filter(|widget| widget.open)
    }

    /// Swaps in a freshly rendered record list, e.g. after a scope change.
    pub fn replace_records(&mut self, records: Vec<RecordNode>) {
        self.records = records;
    }
}
