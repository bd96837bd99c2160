/*!

Synchronizes applications through their lifecycle and gates the measurement window. An
application owns its terminals; the coordinator owns a per-interface `MessageDistributor` that
demultiplexes received messages to the `(application, terminal)` pair that should see them.

*/

use std::rc::Rc;
use std::cell::RefCell;
use std::collections::HashMap;

use crate::packet::Message;

/// An application's lifecycle state. `Killed` is terminal.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Fsm
{
	Ready,
	Started,
	Complete,
	Done,
	Killed,
}

/// The per-application contract the coordinator drives.
pub trait Application
{
	fn start(&mut self);
	fn stop(&mut self);
	fn kill(&mut self);
	fn percent_complete(&self) -> f64;
	/// A rolling measure the coordinator may consult for `kill-on-saturation`; `None` if the
	/// application does not track it.
	fn injection_latency_average(&self) -> Option<f64> { None }
	fn kill_on_saturation(&self) -> bool { false }
}

struct Tracked
{
	application: Rc<RefCell<dyn Application>>,
	state: Fsm,
}

/// Routes an arriving message to the `(application, terminal)` pair that owns it.
#[derive(Default)]
pub struct MessageDistributor
{
	owners: HashMap<usize,(usize,usize)>,
}

impl MessageDistributor
{
	pub fn register_terminal(&mut self, terminal: usize, application_index: usize, local_terminal: usize)
	{
		self.owners.insert(terminal,(application_index,local_terminal));
	}
	pub fn route(&self, message: &Message) -> (usize,usize)
	{
		*self.owners.get(&message.owner_terminal).expect("message delivered to an unregistered terminal")
	}
}

/// Drives every registered application through `Ready -> Started -> Complete -> Done ->
/// Killed`. Monitoring is enabled exactly once (when every application has reported ready) and
/// disabled exactly once (when every application has reported done).
pub struct WorkloadCoordinator
{
	applications: Vec<Tracked>,
	quit: Rc<RefCell<bool>>,
	monitoring_enabled: bool,
	monitoring_disabled: bool,
	started_count: u32,
	stopped_count: u32,
	killed_count: u32,
}

impl WorkloadCoordinator
{
	pub fn new(quit: Rc<RefCell<bool>>) -> WorkloadCoordinator
	{
		WorkloadCoordinator{
			applications: Vec::new(),
			quit,
			monitoring_enabled: false,
			monitoring_disabled: false,
			started_count: 0,
			stopped_count: 0,
			killed_count: 0,
		}
	}

	pub fn register(&mut self, application: Rc<RefCell<dyn Application>>)
	{
		self.applications.push(Tracked{ application, state: Fsm::Ready });
	}

	pub fn num_applications(&self) -> usize { self.applications.len() }

	/// Called once per application when it reports `ready`. When every application has, calls
	/// `start()` on all of them and enables monitoring exactly once.
	pub fn report_ready(&mut self, index: usize)
	{
		assert_eq!(self.applications[index].state, Fsm::Ready);
		self.applications[index].state = Fsm::Started;
		self.started_count += 1;
		if self.started_count as usize == self.applications.len()
		{
			assert!(!self.monitoring_enabled, "monitoring must be enabled exactly once");
			for tracked in self.applications.iter_mut() { tracked.application.borrow_mut().start(); }
			self.monitoring_enabled = true;
		}
	}

	/// Called once per application when it reports `complete`. When every application has,
	/// calls `stop()` on all of them.
	pub fn report_complete(&mut self, index: usize)
	{
		assert_eq!(self.applications[index].state, Fsm::Started);
		self.applications[index].state = Fsm::Complete;
		self.stopped_count += 1;
		if self.stopped_count as usize == self.applications.len()
		{
			for tracked in self.applications.iter_mut() { tracked.application.borrow_mut().stop(); }
		}
	}

	/// Called once per application when it has drained all in-flight messages. At all-done,
	/// `kill()` is called on every application, monitoring ends exactly once, and the event
	/// loop's quit flag is raised so it may drain naturally.
	pub fn report_done(&mut self, index: usize)
	{
		assert_eq!(self.applications[index].state, Fsm::Complete);
		self.applications[index].state = Fsm::Done;
		self.killed_count += 1;
		if self.killed_count as usize == self.applications.len()
		{
			for tracked in self.applications.iter_mut()
			{
				tracked.application.borrow_mut().kill();
				tracked.state = Fsm::Killed;
			}
			assert!(!self.monitoring_disabled, "monitoring must be disabled exactly once");
			self.monitoring_disabled = true;
			*self.quit.borrow_mut() = true;
		}
	}

	/// Per-application saturation check the coordinator may run periodically: an application
	/// configured with `kill_on_saturation` whose rolling injection-latency average exceeds
	/// `threshold` is force-completed early. This is an observable application-level outcome,
	/// not an error.
	pub fn check_saturation(&mut self, threshold: f64)
	{
		for (index,tracked) in self.applications.iter().enumerate()
		{
			if tracked.state != Fsm::Started { continue; }
			let app = tracked.application.borrow();
			if app.kill_on_saturation() && app.injection_latency_average().map_or(false,|avg|avg>threshold)
			{
				let avg = app.injection_latency_average().unwrap();
				drop(app);
				log::warn!("application {} saturated (injection latency average {} exceeds threshold {}), completing early",index,avg,threshold);
				self.report_complete(index);
			}
		}
	}

	/// A periodic progress line, gated by the caller on its own reporting interval; replaces a
	/// direct `println!` progress banner with the crate's own `log` facade.
	pub fn log_progress(&self, current_cycle: crate::event::Time)
	{
		let percent: Vec<String> = self.applications.iter()
			.map(|t|format!("{:.1}%",t.application.borrow().percent_complete()*100.0))
			.collect();
		log::info!("cycle {}: applications at {}",current_cycle,percent.join(", "));
	}

	pub fn monitoring_enabled(&self) -> bool { self.monitoring_enabled }
	pub fn monitoring_disabled(&self) -> bool { self.monitoring_disabled }
}

#[cfg(test)]
mod tests
{
	use super::*;

	struct Toy{ started: u32, stopped: u32, killed: u32 }
	impl Application for Toy
	{
		fn start(&mut self) { self.started += 1; }
		fn stop(&mut self) { self.stopped += 1; }
		fn kill(&mut self) { self.killed += 1; }
		fn percent_complete(&self) -> f64 { 1.0 }
	}

	#[test]
	fn lifecycle_gates_exactly_once_per_transition()
	{
		let quit = Rc::new(RefCell::new(false));
		let mut coordinator = WorkloadCoordinator::new(Rc::clone(&quit));
		let apps: Vec<_> = (0..2).map(|_|Rc::new(RefCell::new(Toy{started:0,stopped:0,killed:0}))).collect();
		for app in &apps { coordinator.register(Rc::clone(app) as Rc<RefCell<dyn Application>>); }

		coordinator.report_ready(0);
		assert!(!coordinator.monitoring_enabled());
		coordinator.report_ready(1);
		assert!(coordinator.monitoring_enabled());
		assert_eq!(apps[0].borrow().started,1);
		assert_eq!(apps[1].borrow().started,1);

		coordinator.report_complete(0);
		coordinator.report_complete(1);
		assert_eq!(apps[0].borrow().stopped,1);

		coordinator.report_done(0);
		assert!(!*quit.borrow());
		coordinator.report_done(1);
		assert!(*quit.borrow());
		assert!(coordinator.monitoring_disabled());
		assert_eq!(apps[0].borrow().killed,1);
		assert_eq!(apps[1].borrow().killed,1);
	}

	#[test]
	#[should_panic]
	fn reporting_ready_twice_is_rejected()
	{
		let quit = Rc::new(RefCell::new(false));
		let mut coordinator = WorkloadCoordinator::new(quit);
		coordinator.register(Rc::new(RefCell::new(Toy{started:0,stopped:0,killed:0})));
		coordinator.report_ready(0);
		coordinator.report_ready(0);
	}
}
