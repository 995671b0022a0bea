// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{LOCAL_SCOPE_TAG, Page, SelectSetting, WidgetId};

/// A dropdown selection that became the widget's new displayed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitNotice {
    pub widget: WidgetId,
    pub setting: String,
    pub value: String,
    pub scope_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectEvent {
    Opened(WidgetId),
    Closed(WidgetId),
    Committed(CommitNotice),
    DateRangeVisibility(bool),
}

/// Keeps at most one dropdown open across all select widgets and turns
/// option picks into committed display values. Interactions that do not
/// resolve to a known widget or option return no events.
#[derive(Debug, Clone, Default)]
pub struct SelectController {
    open_widget: Option<WidgetId>,
}

impl SelectController {
    pub fn open_widget(&self) -> Option<WidgetId> {
        self.open_widget
    }

    /// A click on a widget's trigger button.
    pub fn trigger_clicked(&mut self, page: &mut Page, id: WidgetId) -> Vec<SelectEvent> {
        let Some(widget) = page.widget(id) else {
            return Vec::new();
        };
        if widget.disabled {
            return Vec::new();
        }

        match self.open_widget {
            Some(current) if current == id => {
                self.set_open(page, id, false);
                self.open_widget = None;
                vec![SelectEvent::Closed(id)]
            }
            Some(current) => {
                self.set_open(page, current, false);
                self.set_open(page, id, true);
                self.open_widget = Some(id);
                vec![SelectEvent::Closed(current), SelectEvent::Opened(id)]
            }
            None => {
                self.set_open(page, id, true);
                self.open_widget = Some(id);
                vec![SelectEvent::Opened(id)]
            }
        }
    }

    /// A click on one option button inside the open widget's panel.
    pub fn option_clicked(
        &mut self,
        page: &mut Page,
        id: WidgetId,
        option_index: usize,
    ) -> Vec<SelectEvent> {
        if self.open_widget != Some(id) {
            return Vec::new();
        }
        let Some(widget) = page.widget_mut(id) else {
            return Vec::new();
        };
        let Some(option) = widget.options.get(option_index) else {
            return Vec::new();
        };

        let value = option.value.clone();
        let scope_tag = option.scope_tag.clone();

        // re-selecting the displayed value only closes the panel, so no
        // downstream recompute or reload fires
        if value == widget.display_text {
            widget.open = false;
            self.open_widget = None;
            return vec![SelectEvent::Closed(id)];
        }

        widget.display_text = value.clone();
        for (index, option) in widget.options.iter_mut().enumerate() {
            option.selected = index == option_index;
        }
        widget.open = false;
        let setting = widget.setting.clone();
        self.open_widget = None;

        let mut events = vec![
            SelectEvent::Closed(id),
            SelectEvent::Committed(CommitNotice {
                widget: id,
                setting: setting.clone(),
                value,
                scope_tag: scope_tag.clone(),
            }),
        ];

        if SelectSetting::parse(&setting) == Some(SelectSetting::Instances) {
            let show = scope_tag.as_deref() != Some(LOCAL_SCOPE_TAG);
            page.date_range.visible = show;
            events.push(SelectEvent::DateRangeVisibility(show));
        }

        events
    }

    fn set_open(&self, page: &mut Page, id: WidgetId, open: bool) {
        if let Some(widget) = page.widget_mut(id) {
            widget.open = open;
        }
    }
}
