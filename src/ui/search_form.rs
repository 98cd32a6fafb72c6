use crate::api_client::SearchError;
use crate::config::config::SearchConfig;
use crate::data::business::{clamp_criteria_value, SearchCriteria};
use crossterm::event::Event;
use tui_input::{backend::crossterm::EventHandler, Input};

/// Result caps offered by the advanced panel
pub const MAX_RESULTS_PRESETS: [u32; 4] = [10, 20, 30, 50];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Industry,
    Location,
    Radius,
    MaxResults,
}

/// State of the search header: text inputs, advanced options and presets.
///
/// The form never talks to the network. `submit` only validates and
/// builds the criteria; the page controller decides what happens next.
#[derive(Debug, Clone)]
pub struct SearchForm {
    industry: Input,
    location: Input,
    radius_km: u32,
    max_results: u32,
    show_advanced: bool,
    focus: FormField,
    popular_industries: Vec<String>,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self::new(&SearchConfig::default())
    }
}

impl SearchForm {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            industry: Input::default(),
            location: Input::default(),
            radius_km: config.radius_km(),
            max_results: config.max_results(),
            show_advanced: false,
            focus: FormField::Industry,
            popular_industries: config.popular_industries.clone(),
        }
    }

    pub fn industry(&self) -> &str {
        self.industry.value()
    }

    pub fn location(&self) -> &str {
        self.location.value()
    }

    pub fn set_industry(&mut self, value: &str) {
        self.industry = Input::new(value.to_string());
    }

    pub fn set_location(&mut self, value: &str) {
        self.location = Input::new(value.to_string());
    }

    pub fn radius_km(&self) -> u32 {
        self.radius_km
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    pub fn show_advanced(&self) -> bool {
        self.show_advanced
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn popular_industries(&self) -> &[String] {
        &self.popular_industries
    }

    /// Input widget backing the focused text field, if a text field has focus
    pub fn focused_input(&self) -> Option<&Input> {
        match self.focus {
            FormField::Industry => Some(&self.industry),
            FormField::Location => Some(&self.location),
            FormField::Radius | FormField::MaxResults => None,
        }
    }

    /// Overwrite the industry with a preset. Never submits.
    pub fn quick_select(&mut self, index: usize) -> Option<String> {
        let preset = self.popular_industries.get(index)?.clone();
        self.set_industry(&preset);
        Some(preset)
    }

    /// Show or hide the advanced panel. Hiding it moves focus off the
    /// advanced controls but keeps their values.
    pub fn toggle_advanced(&mut self) {
        self.show_advanced = !self.show_advanced;
        if !self.show_advanced && matches!(self.focus, FormField::Radius | FormField::MaxResults) {
            self.focus = FormField::Industry;
        }
    }

    fn focus_order(&self) -> &'static [FormField] {
        if self.show_advanced {
            &[
                FormField::Industry,
                FormField::Location,
                FormField::Radius,
                FormField::MaxResults,
            ]
        } else {
            &[FormField::Industry, FormField::Location]
        }
    }

    pub fn focus_next(&mut self) {
        let order = self.focus_order();
        let pos = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = order[(pos + 1) % order.len()];
    }

    pub fn focus_prev(&mut self) {
        let order = self.focus_order();
        let pos = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = order[(pos + order.len() - 1) % order.len()];
    }

    pub fn adjust_radius(&mut self, delta: i32) {
        let next = (self.radius_km as i64 + delta as i64).max(0) as u32;
        self.radius_km = clamp_criteria_value(next);
    }

    /// Step the result cap to the next (or previous) preset, wrapping around
    pub fn cycle_max_results(&mut self, forward: bool) {
        let current = self.max_results;
        let next = if forward {
            MAX_RESULTS_PRESETS
                .iter()
                .copied()
                .find(|p| *p > current)
                .unwrap_or(MAX_RESULTS_PRESETS[0])
        } else {
            MAX_RESULTS_PRESETS
                .iter()
                .rev()
                .copied()
                .find(|p| *p < current)
                .unwrap_or(MAX_RESULTS_PRESETS[MAX_RESULTS_PRESETS.len() - 1])
        };
        self.max_results = clamp_criteria_value(next);
    }

    /// Route a terminal event to the focused text field
    pub fn handle_input_event(&mut self, event: &Event) -> bool {
        match self.focus {
            FormField::Industry => self.industry.handle_event(event).is_some(),
            FormField::Location => self.location.handle_event(event).is_some(),
            FormField::Radius | FormField::MaxResults => false,
        }
    }

    /// Validate the fields and build criteria for a new search
    pub fn submit(&self) -> Result<SearchCriteria, SearchError> {
        Ok(SearchCriteria::new(self.industry(), self.location())?
            .with_radius_km(self.radius_km)
            .with_max_results(self.max_results))
    }
}
