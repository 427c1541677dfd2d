//! Form collector: bounded selections for every field plus a submit action.
//!
//! Each field holds an index into its closed option list, so only in-domain
//! values can be produced. A `FormRecord` comes out only on `Submit`.

use crate::domain::{FormRecord, IntField, STOREY_RANGE_COUNT, STOREY_RANGE_LABELS};

/// Label of the submit button.
pub const SUBMIT_LABEL: &str = "Predict selling price";

/// Step used by page up/down.
const PAGE_STEP: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Int(IntField),
    StoreyRange,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            FormField::Int(f) => f.label(),
            FormField::StoreyRange => "Storey_range",
        }
    }

    pub fn option_count(self) -> usize {
        match self {
            FormField::Int(f) => f.option_count(),
            FormField::StoreyRange => STOREY_RANGE_COUNT,
        }
    }

    /// Display text of option `index` (clamped to the list).
    pub fn option_label(self, index: usize) -> String {
        let index = index.min(self.option_count() - 1);
        match self {
            FormField::Int(f) => (f.bounds().0 + index as u32).to_string(),
            FormField::StoreyRange => STOREY_RANGE_LABELS[index].to_string(),
        }
    }
}

/// Form layout: the first column holds five fields, the second the rest.
pub const FORM_FIELDS: [FormField; 10] = [
    FormField::Int(IntField::Month),
    FormField::Int(IntField::Town),
    FormField::Int(IntField::FlatType),
    FormField::Int(IntField::Block),
    FormField::Int(IntField::StreetName),
    FormField::StoreyRange,
    FormField::Int(IntField::FloorAreaSqm),
    FormField::Int(IntField::FlatModel),
    FormField::Int(IntField::LeaseCommenceDate),
    FormField::Int(IntField::RegYear),
];

/// Fields per column.
pub const COLUMN_LEN: usize = 5;

/// Focus index of the submit button (after the last field).
pub const SUBMIT_FOCUS: usize = FORM_FIELDS.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    FocusNext,
    FocusPrev,
    /// Move the focused selection by a number of options.
    Step(i64),
    PageUp,
    PageDown,
    First,
    Last,
    /// Enter: submits on the button, advances focus elsewhere.
    Activate,
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Submitted(FormRecord),
    NotSubmitted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    selections: [usize; FORM_FIELDS.len()],
    focus: usize,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    /// Every field starts on its first option.
    pub fn new() -> Self {
        Self {
            selections: [0; FORM_FIELDS.len()],
            focus: 0,
        }
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focused_field(&self) -> Option<FormField> {
        FORM_FIELDS.get(self.focus).copied()
    }

    /// Current display text of field `slot`.
    pub fn display_value(&self, slot: usize) -> String {
        FORM_FIELDS[slot].option_label(self.selections[slot])
    }

    /// Select the option whose label equals `label`. Returns false if absent.
    #[cfg(test)]
    fn select_label(&mut self, slot: usize, label: &str) -> bool {
        let field = FORM_FIELDS[slot];
        match (0..field.option_count()).find(|&i| field.option_label(i) == label) {
            Some(i) => {
                self.selections[slot] = i;
                true
            }
            None => false,
        }
    }

    /// Apply one user action; only a submit yields a record.
    pub fn collect(&mut self, action: FormAction) -> Submission {
        match action {
            FormAction::FocusNext => self.focus = (self.focus + 1).min(SUBMIT_FOCUS),
            FormAction::FocusPrev => self.focus = self.focus.saturating_sub(1),
            FormAction::Step(delta) => self.step(delta),
            FormAction::PageUp => self.step(-PAGE_STEP),
            FormAction::PageDown => self.step(PAGE_STEP),
            FormAction::First => self.step(i64::MIN / 2),
            FormAction::Last => self.step(i64::MAX / 2),
            FormAction::Activate => {
                if self.focus == SUBMIT_FOCUS {
                    return Submission::Submitted(self.record());
                }
                self.focus += 1;
            }
            FormAction::Submit => return Submission::Submitted(self.record()),
        }
        Submission::NotSubmitted
    }

    fn step(&mut self, delta: i64) {
        let Some(field) = self.focused_field() else {
            return;
        };
        let max = field.option_count() as i64 - 1;
        let cur = self.selections[self.focus] as i64;
        self.selections[self.focus] = cur.saturating_add(delta).clamp(0, max) as usize;
    }

    fn int_value(&self, target: IntField) -> u32 {
        let slot = FORM_FIELDS
            .iter()
            .position(|f| *f == FormField::Int(target))
            .unwrap_or_default();
        target.bounds().0 + self.selections[slot] as u32
    }

    /// Snapshot of the current selections.
    pub fn record(&self) -> FormRecord {
        let storey_slot = FORM_FIELDS
            .iter()
            .position(|f| *f == FormField::StoreyRange)
            .unwrap_or_default();
        FormRecord {
            month: self.int_value(IntField::Month),
            town: self.int_value(IntField::Town),
            flat_type: self.int_value(IntField::FlatType),
            block: self.int_value(IntField::Block),
            street_name: self.int_value(IntField::StreetName),
            storey_range: STOREY_RANGE_LABELS[self.selections[storey_slot]].to_string(),
            floor_area_sqm: self.int_value(IntField::FloorAreaSqm),
            flat_model: self.int_value(IntField::FlatModel),
            lease_commence_date: self.int_value(IntField::LeaseCommenceDate),
            reg_year: self.int_value(IntField::RegYear),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample_record;

    fn fill_sample(form: &mut FormState) {
        let values = [
            "3", "5", "2", "123", "45", "04 TO 06", "90", "3", "1990", "2020",
        ];
        for (slot, value) in values.iter().enumerate() {
            assert!(form.select_label(slot, value), "slot {slot} rejected {value}");
        }
    }

    #[test]
    fn defaults_are_first_options() {
        let form = FormState::new();
        let record = form.record();
        assert_eq!(record.month, 1);
        assert_eq!(record.town, 0);
        assert_eq!(record.block, 1);
        assert_eq!(record.storey_range, "10 TO 12");
        assert_eq!(record.floor_area_sqm, 28);
        assert_eq!(record.lease_commence_date, 1966);
        assert_eq!(record.reg_year, 1990);
    }

    #[test]
    fn editing_does_not_submit() {
        let mut form = FormState::new();
        assert_eq!(form.collect(FormAction::Step(1)), Submission::NotSubmitted);
        assert_eq!(form.collect(FormAction::FocusNext), Submission::NotSubmitted);
        assert_eq!(form.collect(FormAction::PageDown), Submission::NotSubmitted);
        assert_eq!(form.collect(FormAction::Activate), Submission::NotSubmitted);
    }

    #[test]
    fn submit_yields_current_record() {
        let mut form = FormState::new();
        fill_sample(&mut form);
        assert_eq!(
            form.collect(FormAction::Submit),
            Submission::Submitted(sample_record())
        );
    }

    #[test]
    fn activate_on_button_submits() {
        let mut form = FormState::new();
        for _ in 0..SUBMIT_FOCUS {
            form.collect(FormAction::FocusNext);
        }
        assert_eq!(form.focus(), SUBMIT_FOCUS);
        assert!(matches!(
            form.collect(FormAction::Activate),
            Submission::Submitted(_)
        ));
    }

    #[test]
    fn selections_clamp_to_domain() {
        let mut form = FormState::new();
        form.collect(FormAction::Step(-5));
        assert_eq!(form.record().month, 1);
        form.collect(FormAction::Last);
        assert_eq!(form.record().month, 12);
        form.collect(FormAction::Step(100));
        assert_eq!(form.record().month, 12);
        form.collect(FormAction::First);
        assert_eq!(form.record().month, 1);
    }

    #[test]
    fn storey_range_options_follow_encoding_order() {
        let mut form = FormState::new();
        for _ in 0..5 {
            form.collect(FormAction::FocusNext);
        }
        assert_eq!(form.focused_field(), Some(FormField::StoreyRange));
        form.collect(FormAction::Step(1));
        assert_eq!(form.record().storey_range, "04 TO 06");
        form.collect(FormAction::Last);
        assert_eq!(form.record().storey_range, "49 TO 51");
    }

    #[test]
    fn focus_stays_within_form() {
        let mut form = FormState::new();
        form.collect(FormAction::FocusPrev);
        assert_eq!(form.focus(), 0);
        for _ in 0..50 {
            form.collect(FormAction::FocusNext);
        }
        assert_eq!(form.focus(), SUBMIT_FOCUS);
        // Stepping on the button is a no-op.
        let before = form.clone();
        form.collect(FormAction::Step(1));
        assert_eq!(form, before);
    }

    #[test]
    fn unknown_labels_are_not_selectable() {
        let mut form = FormState::new();
        assert!(!form.select_label(0, "13"));
        assert!(!form.select_label(5, "NOT A RANGE"));
    }
}
