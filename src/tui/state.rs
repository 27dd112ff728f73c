use super::views::GeoView;
use crate::config::DashboardConfig;
use crate::query::{
    country_suburb_options, mean_occupancy_for_window, mean_price_by_country_for_property_type,
    top_suburbs_by_mean_price, CategoryMean, ListingTable, OccupancyWindow, PriceRange,
};
use std::collections::VecDeque;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Geospatial,
    Visualization,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Home, Page::Geospatial, Page::Visualization];

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Geospatial => "Geospatial Analysis",
            Page::Visualization => "Visualization",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VizTab {
    PriceVsLocation,
    PriceVsPropertyType,
    Occupancy,
}

impl VizTab {
    pub const ALL: [VizTab; 3] = [
        VizTab::PriceVsLocation,
        VizTab::PriceVsPropertyType,
        VizTab::Occupancy,
    ];

    pub fn title(self) -> &'static str {
        match self {
            VizTab::PriceVsLocation => "Price vs Location",
            VizTab::PriceVsPropertyType => "Price vs Property Type",
            VizTab::Occupancy => "Occupancy Rate",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Price bound slider: `min`, `min + step`, ... capped at `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSlider {
    range: PriceRange,
    step: f64,
    position: usize,
}

impl PriceSlider {
    /// Starts at the cheapest price.
    pub fn new(range: PriceRange, step: f64) -> Self {
        Self {
            range,
            step,
            position: 0,
        }
    }

    fn last_position(&self) -> usize {
        ((self.range.max - self.range.min) / self.step).ceil() as usize
    }

    pub fn value(&self) -> f64 {
        (self.range.min + self.position as f64 * self.step).min(self.range.max)
    }

    pub fn range(&self) -> PriceRange {
        self.range
    }

    pub fn raise(&mut self) -> bool {
        if self.position < self.last_position() {
            self.position += 1;
            true
        } else {
            false
        }
    }

    pub fn lower(&mut self) -> bool {
        if self.position > 0 {
            self.position -= 1;
            true
        } else {
            false
        }
    }
}

/// User intents, decoupled from key codes so selections can be driven in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuiCommand {
    Quit,
    NextPage,
    GotoPage(Page),
    NextCountry,
    PrevCountry,
    NextSuburb,
    PrevSuburb,
    RaisePrice,
    LowerPrice,
    NextTab,
    PrevTab,
    NextPropertyType,
    PrevPropertyType,
    NextOccupancyWindow,
    ScrollDown,
    ScrollUp,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub message: String,
}

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone)]
pub struct AppState {
    pub page: Page,
    pub viz_tab: VizTab,
    pub dataset_label: String,
    pub row_count: usize,
    pub top_k: usize,
    pub start_time: Instant,

    pub countries: Vec<String>,
    pub property_types: Vec<String>,

    // Geospatial selections
    pub geo_country: usize,
    pub slider: Option<PriceSlider>,
    pub suburbs: Vec<String>,
    pub geo_suburb: usize,
    pub geo: GeoView,
    pub names_scroll: usize,

    // Visualization selections
    pub viz_country: usize,
    pub property_type: usize,
    pub occupancy_window: OccupancyWindow,
    pub top_suburbs: Vec<CategoryMean>,
    pub property_type_means: Vec<CategoryMean>,
    pub occupancy_means: Vec<CategoryMean>,

    pub logs: VecDeque<LogEntry>,
}

impl AppState {
    pub fn new(table: &ListingTable, config: &DashboardConfig, dataset_label: &str) -> Self {
        let countries = table.countries();
        let start_country = config
            .default_country
            .as_ref()
            .and_then(|c| {
                let pos = countries.iter().position(|x| x == c);
                if pos.is_none() {
                    tracing::warn!(country = %c, "default_country not in dataset");
                }
                pos
            })
            .unwrap_or(0);

        let mut state = Self {
            page: Page::Home,
            viz_tab: VizTab::PriceVsLocation,
            dataset_label: dataset_label.to_string(),
            row_count: table.len(),
            top_k: config.top_k,
            start_time: Instant::now(),
            countries,
            property_types: table.property_types(),
            geo_country: start_country,
            slider: table.price_range().map(|r| PriceSlider::new(r, config.price_step)),
            suburbs: Vec::new(),
            geo_suburb: 0,
            geo: GeoView::default(),
            names_scroll: 0,
            viz_country: start_country,
            property_type: 0,
            occupancy_window: OccupancyWindow::Days30,
            top_suburbs: Vec::new(),
            property_type_means: Vec::new(),
            occupancy_means: Vec::new(),
            logs: VecDeque::with_capacity(MAX_LOGS),
        };
        state.refresh_geo(table);
        state.refresh_location(table);
        state.refresh_property_type(table);
        state.refresh_occupancy(table);
        state
    }

    pub fn push_log(&mut self, level: &str, message: String) {
        let time = chrono::Local::now().format("%H:%M:%S%.3f").to_string();
        if self.logs.len() >= MAX_LOGS {
            self.logs.pop_front();
        }
        self.logs.push_back(LogEntry {
            time,
            level: level.to_string(),
            message,
        });
    }

    pub fn uptime(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        format!("{}h {:02}m", h, m)
    }

    pub fn geo_country_name(&self) -> Option<&str> {
        self.countries.get(self.geo_country).map(String::as_str)
    }

    pub fn geo_suburb_name(&self) -> Option<&str> {
        self.suburbs.get(self.geo_suburb).map(String::as_str)
    }

    pub fn viz_country_name(&self) -> Option<&str> {
        self.countries.get(self.viz_country).map(String::as_str)
    }

    pub fn property_type_name(&self) -> Option<&str> {
        self.property_types.get(self.property_type).map(String::as_str)
    }

    pub fn max_price(&self) -> Option<f64> {
        self.slider.map(|s| s.value())
    }

    /// Apply one command. Returns `false` when the dashboard should exit.
    /// Only the query whose inputs changed is re-run.
    pub fn apply(&mut self, cmd: TuiCommand, table: &ListingTable) -> bool {
        match cmd {
            TuiCommand::Quit => return false,
            TuiCommand::NextPage => self.page = self.page.next(),
            TuiCommand::GotoPage(p) => self.page = p,
            TuiCommand::NextTab => self.viz_tab = self.viz_tab.next(),
            TuiCommand::PrevTab => self.viz_tab = self.viz_tab.prev(),
            TuiCommand::NextCountry | TuiCommand::PrevCountry => {
                let forward = cmd == TuiCommand::NextCountry;
                if self.page == Page::Visualization {
                    self.viz_country = cycle(self.viz_country, self.countries.len(), forward);
                    self.refresh_location(table);
                } else {
                    self.geo_country = cycle(self.geo_country, self.countries.len(), forward);
                    self.refresh_geo(table);
                }
            }
            TuiCommand::NextSuburb | TuiCommand::PrevSuburb => {
                let forward = cmd == TuiCommand::NextSuburb;
                self.geo_suburb = cycle(self.geo_suburb, self.suburbs.len(), forward);
                self.refresh_geo(table);
            }
            TuiCommand::RaisePrice | TuiCommand::LowerPrice => {
                let moved = match self.slider.as_mut() {
                    Some(s) if cmd == TuiCommand::RaisePrice => s.raise(),
                    Some(s) => s.lower(),
                    None => false,
                };
                if moved {
                    self.refresh_geo(table);
                }
            }
            TuiCommand::NextPropertyType | TuiCommand::PrevPropertyType => {
                let forward = cmd == TuiCommand::NextPropertyType;
                self.property_type = cycle(self.property_type, self.property_types.len(), forward);
                self.refresh_property_type(table);
            }
            TuiCommand::NextOccupancyWindow => {
                self.occupancy_window = self.occupancy_window.next();
                self.refresh_occupancy(table);
            }
            TuiCommand::ScrollDown => {
                self.names_scroll = (self.names_scroll + 1).min(self.geo.names.len().saturating_sub(1));
            }
            TuiCommand::ScrollUp => self.names_scroll = self.names_scroll.saturating_sub(1),
        }
        true
    }

    /// Re-derive the suburb choices for the current country and price bound,
    /// keep the selected suburb if it survived, then rebuild the maps.
    fn refresh_geo(&mut self, table: &ListingTable) {
        self.names_scroll = 0;
        let (Some(country), Some(max_price)) = (self.geo_country_name().map(str::to_string), self.max_price())
        else {
            self.suburbs.clear();
            self.geo = GeoView::empty("No listings loaded");
            return;
        };

        let previous = self.geo_suburb_name().map(str::to_string);
        self.suburbs = match country_suburb_options(table, &country, max_price) {
            Ok(s) => s,
            Err(e) => {
                self.push_log("WARN", format!("suburb options: {e}"));
                Vec::new()
            }
        };
        self.geo_suburb = previous
            .and_then(|p| self.suburbs.iter().position(|s| *s == p))
            .unwrap_or(0)
            .min(self.suburbs.len().saturating_sub(1));

        let Some(suburb) = self.geo_suburb_name().map(str::to_string) else {
            self.geo = GeoView::empty(format!(
                "No suburbs in {} at or under {:.0}",
                country, max_price
            ));
            return;
        };

        self.geo = match GeoView::build(table, &country, &suburb, max_price) {
            Ok(view) => view,
            Err(e) => {
                tracing::debug!(country = %country, suburb = %suburb, error = %e, "geo view empty");
                self.push_log("WARN", e.to_string());
                GeoView::empty(e.to_string())
            }
        };
    }

    fn refresh_location(&mut self, table: &ListingTable) {
        self.top_suburbs = match self.viz_country_name() {
            Some(c) => top_suburbs_by_mean_price(table, c, self.top_k),
            None => Vec::new(),
        };
    }

    fn refresh_property_type(&mut self, table: &ListingTable) {
        self.property_type_means = match self.property_type_name() {
            Some(t) => mean_price_by_country_for_property_type(table, t),
            None => Vec::new(),
        };
    }

    fn refresh_occupancy(&mut self, table: &ListingTable) {
        self.occupancy_means = mean_occupancy_for_window(table, self.occupancy_window);
    }
}

fn cycle(current: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        0
    } else if forward {
        (current + 1) % len
    } else {
        (current + len - 1) % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Listing;

    fn listing(country: &str, suburb: &str, property_type: &str, price: f64, occ_30: f64) -> Listing {
        Listing {
            name: format!("{suburb} #{price}"),
            country: country.to_string(),
            suburb: suburb.to_string(),
            latitude: 10.0,
            longitude: 20.0,
            price,
            rating: Some(90.0),
            property_type: property_type.to_string(),
            occupancy_30: occ_30,
            occupancy_60: 0.0,
            occupancy_90: 0.0,
            occupancy_365: 0.0,
        }
    }

    fn table() -> ListingTable {
        ListingTable::new(vec![
            listing("Spain", "Born", "Loft", 50.0, 10.0),
            listing("Spain", "Gracia", "House", 700.0, 20.0),
            listing("Canada", "Plateau", "Loft", 1200.0, 30.0),
        ])
    }

    fn config() -> DashboardConfig {
        DashboardConfig::default()
    }

    #[test]
    fn test_slider_steps_and_caps() {
        let range = PriceRange {
            min: 50.0,
            max: 1200.0,
        };
        let mut s = PriceSlider::new(range, 500.0);
        assert_eq!(s.value(), 50.0);
        assert!(s.raise());
        assert_eq!(s.value(), 550.0);
        assert!(s.raise());
        assert_eq!(s.value(), 1050.0);
        assert!(s.raise());
        assert_eq!(s.value(), 1200.0);
        assert!(!s.raise());
        assert!(s.lower());
        assert_eq!(s.value(), 1050.0);
    }

    #[test]
    fn test_initial_state() {
        let state = AppState::new(&table(), &config(), "test.csv");
        assert_eq!(state.countries, vec!["Spain", "Canada"]);
        assert_eq!(state.max_price(), Some(50.0));
        assert_eq!(state.suburbs, vec!["Born"]);
        assert_eq!(state.geo.names, vec!["Born #50"]);
        assert_eq!(state.top_suburbs.len(), 2);
        assert_eq!(state.top_suburbs[0].label, "Gracia");
        assert_eq!(state.property_type_means[0].label, "Canada");
        assert_eq!(state.occupancy_means.len(), 2);
    }

    #[test]
    fn test_default_country_from_config() {
        let cfg = DashboardConfig {
            default_country: Some("Canada".to_string()),
            ..config()
        };
        let state = AppState::new(&table(), &cfg, "test.csv");
        assert_eq!(state.geo_country_name(), Some("Canada"));
        assert_eq!(state.viz_country_name(), Some("Canada"));
        // Cheapest Canadian listing is above the starting bound
        assert!(state.suburbs.is_empty());
        assert!(state.geo.no_data.is_some());
    }

    #[test]
    fn test_unknown_default_country_falls_back_to_first() {
        let cfg = DashboardConfig {
            default_country: Some("Atlantis".to_string()),
            ..config()
        };
        let state = AppState::new(&table(), &cfg, "test.csv");
        assert_eq!(state.geo_country_name(), Some("Spain"));
        assert_eq!(state.viz_country_name(), Some("Spain"));
    }

    #[test]
    fn test_raising_price_adds_suburbs_and_keeps_selection() {
        let t = table();
        let mut state = AppState::new(&t, &config(), "test.csv");
        assert!(state.apply(TuiCommand::RaisePrice, &t));
        assert!(state.apply(TuiCommand::RaisePrice, &t));
        assert_eq!(state.suburbs, vec!["Born", "Gracia"]);
        assert_eq!(state.geo_suburb_name(), Some("Born"));
        state.apply(TuiCommand::NextSuburb, &t);
        assert_eq!(state.geo_suburb_name(), Some("Gracia"));
        state.apply(TuiCommand::LowerPrice, &t);
        state.apply(TuiCommand::LowerPrice, &t);
        assert_eq!(state.suburbs, vec!["Born"]);
        assert_eq!(state.geo_suburb_name(), Some("Born"));
    }

    #[test]
    fn test_country_key_is_page_aware() {
        let t = table();
        let mut state = AppState::new(&t, &config(), "test.csv");
        state.apply(TuiCommand::GotoPage(Page::Visualization), &t);
        state.apply(TuiCommand::NextCountry, &t);
        assert_eq!(state.viz_country_name(), Some("Canada"));
        assert_eq!(state.geo_country_name(), Some("Spain"));
        assert_eq!(state.top_suburbs[0].label, "Plateau");
    }

    #[test]
    fn test_occupancy_and_property_type_cycle() {
        let t = table();
        let mut state = AppState::new(&t, &config(), "test.csv");
        state.apply(TuiCommand::NextOccupancyWindow, &t);
        assert_eq!(state.occupancy_window, OccupancyWindow::Days60);
        state.apply(TuiCommand::NextPropertyType, &t);
        assert_eq!(state.property_type_name(), Some("House"));
        assert_eq!(state.property_type_means.len(), 1);
        state.apply(TuiCommand::PrevPropertyType, &t);
        assert_eq!(state.property_type_name(), Some("Loft"));
    }

    #[test]
    fn test_quit_and_tabs() {
        let t = table();
        let mut state = AppState::new(&t, &config(), "test.csv");
        state.apply(TuiCommand::PrevTab, &t);
        assert_eq!(state.viz_tab, VizTab::Occupancy);
        state.apply(TuiCommand::NextPage, &t);
        assert_eq!(state.page, Page::Geospatial);
        assert!(!state.apply(TuiCommand::Quit, &t));
    }

    #[test]
    fn test_empty_table_state() {
        let t = ListingTable::default();
        let mut state = AppState::new(&t, &config(), "empty");
        assert!(state.slider.is_none());
        assert!(state.geo.no_data.is_some());
        state.apply(TuiCommand::NextCountry, &t);
        state.apply(TuiCommand::RaisePrice, &t);
        assert!(state.top_suburbs.is_empty());
    }
}
