/*!

The event scheduler: a priority queue of `(time, epsilon, insertion-index)`-ordered dispatches
driving every other component. Time never decreases; the `epsilon` field is a sub-tick ordering
index used to encode same-cycle happens-after edges (a credit increment scheduled at
`epsilon+1` of the event that caused it always observes that event first).

*/

use std::cmp::{Ordering};
use std::collections::BinaryHeap;
use std::rc::Rc;
use std::cell::RefCell;

/// Virtual time, in whatever opaque unit the configuration's `channel_cycle_time`/
/// `core_cycle_time` are expressed in.
pub type Time = u64;

/// A request to call back into a component at a future `(time, epsilon)`.
#[derive(Clone)]
pub struct EventGeneration
{
	pub delay: Time,
	pub epsilon_offset: u32,
	pub event: Event,
}

/// The receiver and the payload/tag of a scheduled dispatch. The receiver is a non-owning
/// handle; the scheduler never takes ownership of components, matching the tree-ownership
/// model where downward edges own and upward/lateral edges only observe.
#[derive(Clone)]
pub struct Event
{
	pub receiver: Rc<RefCell<dyn Eventful>>,
}

/// Anything the scheduler can dispatch into. `process` runs to completion; there is no
/// suspension within a handler, only further `EventGeneration`s scheduled as a result.
pub trait Eventful
{
	/// Called by the scheduler when one of this component's pending events fires.
	/// `current_cycle` is `now` at dispatch time. Returns further events to enqueue.
	fn process(&mut self, current_cycle: Time) -> Vec<EventGeneration>;
	/// Whether this component still has pending internal work (used by `Simulator::is_ended`
	/// style drains; components with nothing left need not be polled).
	fn pending_events(&self) -> bool;
	/// Schedules this component to be awoken on its own next cycle; used when a component
	/// reschedules itself.
	fn add_pending_event(&mut self);
}

#[derive(Clone)]
struct QueueItem
{
	time: Time,
	epsilon: u64,
	insertion_index: u64,
	event: Event,
}

impl PartialEq for QueueItem { fn eq(&self,other:&Self)->bool { self.cmp(other)==Ordering::Equal } }
impl Eq for QueueItem {}
impl PartialOrd for QueueItem { fn partial_cmp(&self,other:&Self)->Option<Ordering> { Some(self.cmp(other)) } }
impl Ord for QueueItem
{
	fn cmp(&self, other:&Self) -> Ordering
	{
		// BinaryHeap is a max-heap; we want the earliest (time,epsilon,insertion_index) first,
		// so reverse the natural order.
		other.time.cmp(&self.time)
			.then_with(||other.epsilon.cmp(&self.epsilon))
			.then_with(||other.insertion_index.cmp(&self.insertion_index))
	}
}

/// The event queue and virtual clock. Owns monotonic `now`/`epsilon` and the insertion counter
/// that breaks ties FIFO.
pub struct Scheduler
{
	queue: BinaryHeap<QueueItem>,
	now: Time,
	epsilon: u64,
	next_insertion: u64,
	quit: Rc<RefCell<bool>>,
}

impl Scheduler
{
	pub fn new() -> Scheduler
	{
		Scheduler{
			queue: BinaryHeap::new(),
			now: 0,
			epsilon: 0,
			next_insertion: 0,
			quit: Rc::new(RefCell::new(false)),
		}
	}
	pub fn now(&self) -> Time { self.now }
	pub fn epsilon(&self) -> u64 { self.epsilon }
	/// A shared quit flag a `WorkloadCoordinator` can set; polled once per dispatched event,
	/// mirroring the original `ExitNotifier`/`Simulator::stop` cooperative-flag pattern.
	pub fn quit_flag(&self) -> Rc<RefCell<bool>> { Rc::clone(&self.quit) }
	pub fn stop(&self) { *self.quit.borrow_mut() = true; }

	/// Enqueues a dispatch. `time` must be `>= now`; if `time == now` then `epsilon_offset`
	/// must be `> 0` relative to the currently-dispatching event's epsilon, i.e. scheduling at
	/// the current epsilon is a programming error.
	pub fn schedule(&mut self, delay: Time, epsilon_offset: u32, receiver: Rc<RefCell<dyn Eventful>>)
	{
		let time = self.now + delay;
		let epsilon = if delay==0 { self.epsilon + epsilon_offset as u64 } else { epsilon_offset as u64 };
		assert!(delay>0 || epsilon_offset>0, "scheduling at the current epsilon is a programming error");
		let insertion_index = self.next_insertion;
		self.next_insertion += 1;
		self.queue.push(QueueItem{ time, epsilon, insertion_index, event: Event{ receiver } });
	}

	fn push_generation(&mut self, gen: EventGeneration)
	{
		self.schedule(gen.delay, gen.epsilon_offset, gen.event.receiver);
	}

	/// Dequeues and dispatches until the queue is empty or `stop()` was called.
	pub fn run(&mut self)
	{
		loop
		{
			if *self.quit.borrow() { break; }
			let item = match self.queue.pop() { Some(i) => i, None => break };
			assert!(item.time >= self.now, "monotone virtual time violated");
			self.now = item.time;
			self.epsilon = item.epsilon;
			let generated = item.event.receiver.borrow_mut().process(self.now);
			for gen in generated
			{
				self.push_generation(gen);
			}
		}
	}

	pub fn is_empty(&self) -> bool { self.queue.is_empty() }
	pub fn len(&self) -> usize { self.queue.len() }
}

impl Default for Scheduler { fn default() -> Self { Scheduler::new() } }

#[cfg(test)]
mod tests
{
	use super::*;

	struct Counter{ pub fired: Rc<RefCell<Vec<(Time,u64)>>> }
	impl Eventful for Counter
	{
		fn process(&mut self, current_cycle: Time) -> Vec<EventGeneration>
		{
			self.fired.borrow_mut().push((current_cycle,0));
			vec![]
		}
		fn pending_events(&self) -> bool { false }
		fn add_pending_event(&mut self) {}
	}

	#[test]
	fn dispatches_in_time_then_epsilon_order()
	{
		let mut scheduler = Scheduler::new();
		let fired = Rc::new(RefCell::new(Vec::new()));
		let receiver: Rc<RefCell<dyn Eventful>> = Rc::new(RefCell::new(Counter{fired: Rc::clone(&fired)}));
		scheduler.schedule(5,0,Rc::clone(&receiver));
		scheduler.schedule(5,0,Rc::clone(&receiver));
		scheduler.schedule(1,0,Rc::clone(&receiver));
		scheduler.run();
		let log = fired.borrow();
		assert_eq!(log.len(),3);
		assert_eq!(log[0].0,1);
		assert_eq!(log[1].0,5);
		assert_eq!(log[2].0,5);
	}

	#[test]
	#[should_panic(expected="current epsilon")]
	fn same_time_same_epsilon_rejected()
	{
		let mut scheduler = Scheduler::new();
		let fired = Rc::new(RefCell::new(Vec::new()));
		let receiver: Rc<RefCell<dyn Eventful>> = Rc::new(RefCell::new(Counter{fired}));
		scheduler.schedule(0,0,receiver);
	}

	#[test]
	fn monotone_time_never_decreases()
	{
		let mut scheduler = Scheduler::new();
		let fired = Rc::new(RefCell::new(Vec::new()));
		let receiver: Rc<RefCell<dyn Eventful>> = Rc::new(RefCell::new(Counter{fired:Rc::clone(&fired)}));
		scheduler.schedule(3,0,Rc::clone(&receiver));
		scheduler.run();
		assert_eq!(scheduler.now(),3);
	}
}
