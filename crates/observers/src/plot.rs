//! Plotting observer for time-stepping controllers.
//!
//! See [`PlotObserver`] for usage.

use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};
use multistep_core::Observer;
use multistep_solvers::transient::Event;

use crate::recorder::Probe;

/// Configuration for rendering a [`PlotObserver`] result.
///
/// Construct with [`ShowConfig::new`] and chain builder methods as needed.
///
/// # Example
///
/// ```ignore
/// obs.show(ShowConfig::new().title("Newmark").legend())?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShowConfig {
    title: Option<String>,
    legend: bool,
    x_label: Option<String>,
}

impl ShowConfig {
    /// Creates a new `ShowConfig`: no title, no legend, no axis label.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the window title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Enables a legend labeling each trace by name.
    #[must_use]
    pub fn legend(mut self) -> Self {
        self.legend = true;
        self
    }

    /// Labels the x-axis.
    #[must_use]
    pub fn x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = Some(label.into());
        self
    }
}

/// An observer that collects traces over simulation time and displays them
/// via egui.
///
/// The const generic `N` is the number of traces. A trace is filled either by
/// a [`Probe`] sampled from every transient [`Event`], or manually through
/// [`record`][PlotObserver::record] (for reference curves such as an
/// analytical solution).
///
/// # Example
///
/// ```ignore
/// let mut obs = PlotObserver::<2>::new(["Newmark", "Analytical"])
///     .with_probe(0, Probe::second(0, 0));
/// problem.solve(&mut obs)?;
/// for i in 0..=300 {
///     let t = 0.1 * f64::from(i);
///     obs.record(t, [None, Some(t.cos())]);
/// }
/// obs.show(ShowConfig::new().title("Free oscillation").legend())?;
/// ```
#[derive(Debug)]
pub struct PlotObserver<const N: usize> {
    names: [String; N],
    probes: [Option<Probe>; N],
    data: [Vec<[f64; 2]>; N],
}

impl<const N: usize> PlotObserver<N> {
    /// Creates a new `PlotObserver` with the given trace names and no probes.
    #[must_use]
    pub fn new(names: [&str; N]) -> Self {
        Self {
            names: names.map(str::to_owned),
            probes: [None; N],
            data: std::array::from_fn(|_| Vec::new()),
        }
    }

    /// Fills trace `trace` from `probe` at every observed event.
    ///
    /// # Panics
    ///
    /// Panics if `trace` is not below `N`.
    #[must_use]
    pub fn with_probe(mut self, trace: usize, probe: Probe) -> Self {
        self.probes[trace] = Some(probe);
        self
    }

    /// Records a single data point across all traces.
    ///
    /// For each trace slot, `None` skips recording for that trace while
    /// leaving other traces unaffected.
    pub fn record(&mut self, x: f64, traces: [Option<f64>; N]) {
        for (i, y) in traces.into_iter().enumerate() {
            if let Some(y) = y {
                self.data[i].push([x, y]);
            }
        }
    }

    /// Opens a blocking egui window displaying all collected traces.
    ///
    /// Blocks until the window is closed by the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the native window cannot be created.
    pub fn show(self, config: ShowConfig) -> Result<(), eframe::Error> {
        let options = eframe::NativeOptions::default();
        let title = config.title.unwrap_or_default();
        let traces: Vec<(String, Vec<[f64; 2]>)> = self.names.into_iter().zip(self.data).collect();

        eframe::run_native(
            &title,
            options,
            Box::new(move |_cc| {
                Ok(Box::new(PlotApp {
                    traces,
                    legend: config.legend,
                    x_label: config.x_label,
                }))
            }),
        )
    }

    fn sample(&mut self, event: &Event<'_>) {
        let values = self.probes.map(|probe| probe.and_then(|probe| probe.sample(event)));
        self.record(event.time, values);
    }
}

impl<const N: usize, A> Observer<Event<'_>, A> for PlotObserver<N> {
    fn observe(&mut self, event: &Event<'_>) -> Option<A> {
        self.sample(event);
        None
    }
}

/// Allows `&mut PlotObserver<N>` to be passed to controllers that take an
/// observer by value, so [`PlotObserver::show`] can be called after the
/// solve completes.
impl<const N: usize, A> Observer<Event<'_>, A> for &mut PlotObserver<N> {
    fn observe(&mut self, event: &Event<'_>) -> Option<A> {
        (*self).sample(event);
        None
    }
}

/// The egui [`eframe::App`] that renders collected traces.
struct PlotApp {
    traces: Vec<(String, Vec<[f64; 2]>)>,
    legend: bool,
    x_label: Option<String>,
}

impl eframe::App for PlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let mut plot = Plot::new("plot_observer");
            if self.legend {
                plot = plot.legend(Legend::default());
            }
            if let Some(label) = &self.x_label {
                plot = plot.x_axis_label(label.clone());
            }
            plot.show(ui, |plot_ui| {
                for (name, points) in &self.traces {
                    let plot_points: PlotPoints = points.iter().copied().collect();
                    plot_ui.line(Line::new(plot_points).name(name));
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use multistep_core::DVector;
    use multistep_solvers::history::History;

    fn history(q: f64, qdot: f64) -> History {
        let mut history = History::starting_at(0.0);
        history
            .set_initial_condition(0, &DVector::from_element(1, q))
            .expect("should accept q0");
        history
            .set_initial_condition(1, &DVector::from_element(1, qdot))
            .expect("should accept qdot0");
        history
    }

    fn feed(obs: &mut PlotObserver<2>, time: f64, second: &History) {
        let event = Event {
            step: 0,
            time,
            iterations: None,
            first: None,
            second: Some(second),
        };
        let _: Option<()> = obs.observe(&event);
    }

    #[test]
    fn probed_traces_follow_events() {
        let mut obs = PlotObserver::new(["q", "qdot"])
            .with_probe(0, Probe::second(0, 0))
            .with_probe(1, Probe::second(1, 0));

        feed(&mut obs, 0.0, &history(1.0, 0.0));
        feed(&mut obs, 0.5, &history(0.5, -1.0));

        assert_eq!(obs.data[0], [[0.0, 1.0], [0.5, 0.5]]);
        assert_eq!(obs.data[1], [[0.0, 0.0], [0.5, -1.0]]);
    }

    #[test]
    fn unprobed_traces_stay_manual() {
        let mut obs = PlotObserver::new(["numerical", "reference"]).with_probe(0, Probe::second(0, 0));

        feed(&mut obs, 1.0, &history(2.0, 0.0));
        obs.record(1.0, [None, Some(3.0)]);

        assert_eq!(obs.data[0], [[1.0, 2.0]]);
        assert_eq!(obs.data[1], [[1.0, 3.0]]);
    }

    #[test]
    fn probes_on_missing_partitions_are_skipped() {
        let mut obs = PlotObserver::new(["first", "second"])
            .with_probe(0, Probe::first(0, 0))
            .with_probe(1, Probe::second(0, 0));

        feed(&mut obs, 0.0, &history(1.0, 0.0));

        assert!(obs.data[0].is_empty());
        assert_eq!(obs.data[1], [[0.0, 1.0]]);
    }

    #[test]
    fn never_returns_an_action() {
        let mut obs: PlotObserver<2> = PlotObserver::new(["a", "b"]);
        let second = history(0.0, 0.0);
        let event = Event {
            step: 1,
            time: 0.1,
            iterations: Some(2),
            first: None,
            second: Some(&second),
        };
        let action: Option<()> = obs.observe(&event);
        assert!(action.is_none());
    }
}
