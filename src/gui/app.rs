//! Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::charts::StaticChartRenderer;
use crate::config::DashboardConfig;
use crate::data::{DataLoader, DataProcessor, IncidentRecord, Selection};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::stats::DashboardCalculator;
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::thread;

const EXPORT_WIDTH: u32 = 2000;
const EXPORT_HEIGHT: u32 = 450;

/// CSV loading result from background thread
enum LoadResult {
    Progress(String),
    Complete {
        loader: DataLoader,
        records: Vec<IncidentRecord>,
        states: Vec<String>,
    },
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    loader: DataLoader,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    default_year: i32,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,

    /// Selection the chart viewer currently shows
    computed: Option<Selection>,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        Self::with_config(config)
    }

    /// Build the app state without a window; starts loading when a data path is configured.
    pub fn with_config(config: DashboardConfig) -> Self {
        let mut app = Self {
            loader: DataLoader::new(),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            default_year: config.default_year,
            load_rx: None,
            is_loading: false,
            computed: None,
        };
        app.control_panel.set_year(config.default_year);

        if let Some(path) = config.data_path {
            app.start_loading(path);
        }

        app
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.start_loading(path);
        }
    }

    /// Load CSV in a background thread
    fn start_loading(&mut self, path: PathBuf) {
        // Drop the previous dataset so nothing is computed from it while loading
        self.loader = DataLoader::new();
        self.chart_viewer.clear();
        self.computed = None;
        self.control_panel.export_enabled = false;
        self.control_panel.settings.csv_path = Some(path.clone());
        self.control_panel.set_status("Loading CSV file...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        tracing::info!(path = %path.display(), "loading incident data");

        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress("Reading CSV file...".to_string()));

            let path_str = path.to_string_lossy().to_string();
            let mut loader = DataLoader::new();
            let result = loader
                .load_csv(&path_str)
                .map_err(|e| e.to_string())
                .and_then(|df| {
                    let _ = tx.send(LoadResult::Progress("Indexing incidents...".to_string()));
                    let records = DataProcessor::records(df).map_err(|e| e.to_string())?;
                    let states = DataProcessor::states(df).map_err(|e| e.to_string())?;
                    Ok((records, states))
                });

            let _ = match result {
                Ok((records, states)) => tx.send(LoadResult::Complete {
                    loader,
                    records,
                    states,
                }),
                Err(error) => tx.send(LoadResult::Error(error)),
            };
        });
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(status) => {
                        self.control_panel.set_status(&status);
                    }
                    LoadResult::Complete {
                        loader,
                        records,
                        states,
                    } => {
                        self.loader = loader;
                        self.computed = None;
                        let row_count = self.loader.get_row_count();
                        if let Some(path) = self.loader.get_file_path() {
                            tracing::info!(path = %path.display(), rows = row_count, "dataset ready");
                        }
                        self.chart_viewer.set_records(records);
                        self.control_panel.update_states(states);
                        self.control_panel.set_year(self.default_year);
                        self.refresh_cities();
                        self.control_panel.set_status(&format!(
                            "Loaded {} incidents in {} states",
                            row_count,
                            self.control_panel.states.len()
                        ));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(error) => {
                        tracing::error!(%error, "failed to load incident data");
                        self.control_panel.set_status(&format!("Error: {}", error));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Repopulate the city selector for the selected state
    fn refresh_cities(&mut self) {
        let Some(df) = self.loader.get_dataframe() else {
            return;
        };

        match DataProcessor::cities_in_state(df, &self.control_panel.settings.state) {
            Ok(cities) => self.control_panel.update_cities(cities),
            Err(e) => {
                tracing::error!(error = %e, "failed to list cities");
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }

    /// Recompute chart data when the selection differs from what is shown
    fn refresh_dashboard(&mut self) {
        let selection = self.control_panel.selection();
        if self.is_loading
            || !selection.is_complete()
            || self.computed.as_ref() == Some(&selection)
        {
            return;
        }
        let Some(df) = self.loader.get_dataframe() else {
            return;
        };

        tracing::debug!(
            state = %selection.state,
            city = %selection.city_or_county,
            year = selection.year,
            "selection changed"
        );

        match DashboardCalculator::compute(df, &selection) {
            Ok(data) => {
                self.chart_viewer.set_data(data);
                self.control_panel.export_enabled = true;
                self.computed = Some(selection);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to compute dashboard");
                self.control_panel.set_status(&format!("Error: {}", e));
                self.computed = Some(selection);
            }
        }
    }

    /// Handle PNG export of the bar charts
    fn handle_export_png(&mut self) {
        let Some(data) = &self.chart_viewer.data else {
            self.control_panel.set_status("No charts to export");
            return;
        };

        let file_name = format!(
            "casualties_{}_{}.png",
            data.selection.state, data.selection.city_or_county
        )
        .replace(' ', "_");

        let output_path = match rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name(file_name)
            .save_file()
        {
            Some(path) => path,
            None => return,
        };

        match StaticChartRenderer::render_bar_figure(&output_path, data, EXPORT_WIDTH, EXPORT_HEIGHT) {
            Ok(()) => {
                self.control_panel
                    .set_status(&format!("Exported {}", output_path.display()));
                if let Err(e) = open::that(&output_path) {
                    tracing::warn!(error = %e, "could not open exported image");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        SidePanel::left("control_panel")
            .min_width(320.0)
            .max_width(360.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::StateChanged => self.refresh_cities(),
                        ControlPanelAction::SelectionChanged => {}
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        self.refresh_dashboard();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn app_for(file: &NamedTempFile, default_year: i32) -> DashboardApp {
        let config = DashboardConfig {
            data_path: Some(file.path().to_path_buf()),
            default_year,
            ..Default::default()
        };
        let mut app = DashboardApp::with_config(config);
        wait_for_load(&mut app);
        app
    }

    fn wait_for_load(app: &mut DashboardApp) {
        for _ in 0..1000 {
            app.check_load_results();
            if !app.is_loading {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("load did not finish");
    }

    fn shown_killed(app: &DashboardApp) -> i64 {
        app.chart_viewer
            .data
            .as_ref()
            .map(|d| d.grand_totals().0)
            .unwrap_or(-1)
    }

    #[test]
    fn load_selects_first_state_first_city_and_default_year() {
        let file = write_csv(
            "2013,Texas,Austin,1,0,30.26,-97.74\n\
             2014,Ohio,Dayton,0,2,39.75,-84.19\n\
             2015,Ohio,Akron,3,1,41.08,-81.51\n",
        );

        let mut app = app_for(&file, 2015);
        app.refresh_dashboard();

        let selection = app.control_panel.selection();
        assert_eq!(selection, Selection::new("Ohio", "Akron", 2015));
        assert_eq!(app.control_panel.cities, vec!["Akron", "Dayton"]);
        assert!(app.control_panel.status.starts_with("Loaded 3 incidents"));
        assert!(app.control_panel.export_enabled);
        assert_eq!(shown_killed(&app), 3);
        assert_eq!(app.chart_viewer.records.len(), 3);
    }

    #[test]
    fn recomputes_only_when_selection_changes() {
        let file = write_csv(
            "2013,Ohio,Akron,1,0,41.08,-81.51\n\
             2014,Ohio,Akron,2,0,41.09,-81.52\n",
        );
        let mut app = app_for(&file, 2013);
        app.refresh_dashboard();
        assert!(app.chart_viewer.data.is_some());

        // Unchanged selection leaves the viewer alone
        app.chart_viewer.data = None;
        app.refresh_dashboard();
        assert!(app.chart_viewer.data.is_none());

        app.control_panel.set_year(2014);
        app.refresh_dashboard();
        let data = app.chart_viewer.data.as_ref().unwrap();
        assert_eq!(data.selection.year, 2014);
        assert_eq!(data.killed_points.len(), 1);
        assert_eq!(data.killed_points[0].count, 2);
    }

    #[test]
    fn state_change_cascades_to_its_first_city() {
        let file = write_csv(
            "2013,Ohio,Akron,1,0,41.08,-81.51\n\
             2013,Texas,Houston,0,1,29.76,-95.37\n\
             2013,Texas,Austin,2,0,30.26,-97.74\n",
        );
        let mut app = app_for(&file, 2013);
        app.refresh_dashboard();

        app.control_panel.settings.state = "Texas".to_string();
        app.refresh_cities();
        app.refresh_dashboard();

        assert_eq!(app.control_panel.settings.city_or_county, "Austin");
        assert_eq!(shown_killed(&app), 2);
    }

    #[test]
    fn reloading_shows_the_new_file() {
        let first = write_csv("2013,Ohio,Akron,1,1,41.08,-81.51\n");
        let second = write_csv("2013,Ohio,Akron,9,9,41.08,-81.51\n");
        let mut app = app_for(&first, 2013);
        app.refresh_dashboard();
        assert_eq!(shown_killed(&app), 1);

        app.start_loading(second.path().to_path_buf());
        // A frame while the new file is still loading
        app.refresh_dashboard();
        assert!(app.chart_viewer.data.is_none());
        assert!(!app.control_panel.export_enabled);

        wait_for_load(&mut app);
        app.refresh_dashboard();

        assert_eq!(shown_killed(&app), 9);
    }

    #[test]
    fn load_error_is_reported_in_status() {
        let file = write_csv("a,b,c\n1,2,3\n");

        let mut app = app_for(&file, 2013);
        app.refresh_dashboard();

        assert!(app.control_panel.status.starts_with("Error: Unrecognised CSV layout"));
        assert!(app.chart_viewer.data.is_none());
        assert!(!app.control_panel.export_enabled);
        assert!(app.control_panel.states.is_empty());
    }
}
