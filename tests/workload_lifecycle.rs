use std::cell::RefCell;
use std::rc::Rc;

use fabricsim::workload::{Application,WorkloadCoordinator};

struct SaturatingApp
{
	started: bool,
	killed: bool,
	latency_average: f64,
}

impl Application for SaturatingApp
{
	fn start(&mut self) { self.started = true; }
	fn stop(&mut self) {}
	fn kill(&mut self) { self.killed = true; }
	fn percent_complete(&self) -> f64 { if self.killed { 1.0 } else { 0.0 } }
	fn injection_latency_average(&self) -> Option<f64> { Some(self.latency_average) }
	fn kill_on_saturation(&self) -> bool { true }
}

/// An application whose rolling injection-latency average exceeds the configured threshold is
/// force-completed by `check_saturation`, driving it through the rest of the lifecycle exactly
/// as a normally-completing application would.
#[test]
fn saturated_application_completes_early_and_reaches_done()
{
	let quit = Rc::new(RefCell::new(false));
	let mut coordinator = WorkloadCoordinator::new(Rc::clone(&quit));
	let app = Rc::new(RefCell::new(SaturatingApp{ started: false, killed: false, latency_average: 50.0 }));
	coordinator.register(Rc::clone(&app) as Rc<RefCell<dyn Application>>);

	coordinator.report_ready(0);
	assert!(app.borrow().started);

	coordinator.check_saturation(10.0);
	coordinator.report_done(0);

	assert!(app.borrow().killed);
	assert!(*quit.borrow());
}

/// An application below the saturation threshold is left alone.
#[test]
fn application_under_threshold_is_not_force_completed()
{
	let quit = Rc::new(RefCell::new(false));
	let mut coordinator = WorkloadCoordinator::new(quit);
	let app = Rc::new(RefCell::new(SaturatingApp{ started: false, killed: false, latency_average: 1.0 }));
	coordinator.register(Rc::clone(&app) as Rc<RefCell<dyn Application>>);
	coordinator.report_ready(0);
	coordinator.check_saturation(10.0);
	// Still Started, not yet Complete: report_complete below must be the first transition.
	coordinator.report_complete(0);
	coordinator.report_done(0);
	assert!(app.borrow().killed);
}
