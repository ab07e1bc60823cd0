use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};
use nalgebra::Vector2;

use perch_glider::guess;
use perch_glider::optimizer::{solve, SolveOutcome, SolverConfig, TrajectoryResult};
use perch_glider::vehicle::{BoundarySpec, PhysicalParameters, StateLimits};

const KNOTS: usize = 10;
const DURATION: f64 = 1.0; // s

fn main() -> eframe::Result {
    let params = PhysicalParameters::builder().duration(DURATION, KNOTS).build();
    let limits = StateLimits {
        theta: 1.0,
        phi: 1.0,
        velocity: 5.0,
        thetadot: 5.0,
        phidot: 5.0,
    };
    let boundary = BoundarySpec::anchored_at(limits, 0.0, 1.0);
    let start = Vector2::new(0.0, 1.0);
    let end = Vector2::new(1.0, 0.0);
    let initial = guess::straight_line(start, end, KNOTS, DURATION).unwrap_or_default();
    let outcome = solve(&params, &boundary, &initial, &SolverConfig::default())
        .unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            SolveOutcome::default()
        });
    let guess_path = TrajectoryResult::from_decision_vector(&initial).unwrap_or_default();

    let app = PerchViz {
        outcome,
        guess: guess_path,
        timestep: params.timestep,
    };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Perching Glider Trajectory", options, Box::new(|_| Ok(Box::new(app))))
}

struct PerchViz {
    outcome: SolveOutcome,
    guess: TrajectoryResult,
    timestep: f64,
}

impl PerchViz {
    fn series(&self, values: &[f64]) -> PlotPoints<'static> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| [i as f64 * self.timestep, *v])
            .collect()
    }
}

impl eframe::App for PerchViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let traj = &self.outcome.trajectory;

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(format!("Perch: {} knots", traj.len()));
            ui.label(format!(
                "Cost: {:.4}  |  Evaluations: {}  |  Stop: {}  |  Max violation: {:.2e}  |  {:.0} ms",
                self.outcome.objective,
                self.outcome.evaluations,
                self.outcome.termination.as_str(),
                self.outcome.constraints.max_violation,
                self.outcome.elapsed.as_secs_f64() * 1000.0,
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half_w = available.x / 2.0 - 8.0;
            let half_h = available.y / 2.0 - 8.0;

            ui.horizontal(|ui| {
                // Vertical vs horizontal position
                ui.vertical(|ui| {
                    ui.label("Path (m)");
                    let solved: PlotPoints =
                        traj.x.iter().zip(&traj.z).map(|(x, z)| [*x, *z]).collect();
                    let initial: PlotPoints = self.guess.x.iter()
                        .zip(&self.guess.z)
                        .map(|(x, z)| [*x, *z])
                        .collect();
                    Plot::new("path")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("x (m)")
                        .data_aspect(1.0)
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Guess", initial));
                            plot_ui.line(Line::new("Optimized", solved));
                        });
                });

                // Velocities vs Time
                ui.vertical(|ui| {
                    ui.label("Velocity (m/s)");
                    Plot::new("velocity")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("vx", self.series(&traj.vx)));
                            plot_ui.line(Line::new("vz", self.series(&traj.vz)));
                        });
                });
            });

            ui.horizontal(|ui| {
                // Pitch angle vs Time
                ui.vertical(|ui| {
                    ui.label("Pitch (deg)");
                    let deg: Vec<f64> = traj.theta.iter().map(|t| t.to_degrees()).collect();
                    Plot::new("pitch")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Pitch", self.series(&deg)));
                        });
                });

                // Elevator deflection vs Time
                ui.vertical(|ui| {
                    ui.label("Elevator (deg)");
                    let deg: Vec<f64> = traj.phi.iter().map(|p| p.to_degrees()).collect();
                    Plot::new("elevator")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Elevator", self.series(&deg)));
                        });
                });
            });
        });
    }
}
