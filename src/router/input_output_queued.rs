/*!

The input-output-queued variant: adds a per-output FIFO that absorbs bursts from the crossbar,
and an `Ejector` on the local-terminal port enforcing at most one flit delivered to the
terminal per core cycle. Credit accounting toward downstream is driven by output-queue
occupancy, not by the crossbar decision, so a flit departing the crossbar into a full output
queue is itself an invariant violation (the queue is sized to never overflow if upstream
credits are honored).

*/

use std::rc::Rc;
use std::collections::VecDeque;

use crate::event::{Eventful,EventGeneration,Time};
use crate::packet::Flit;
use crate::router::{Router,AcknowledgeMessage};
use crate::router::core::RouterCore;

/// Enforces "at most one flit forwarded to the terminal per core cycle"; a second `eject` call
/// within the same cycle without an intervening `reset_cycle` is a programming error.
pub struct Ejector
{
	queue: VecDeque<Rc<Flit>>,
	ejected_this_cycle: bool,
}

impl Ejector
{
	pub fn new() -> Ejector { Ejector{ queue: VecDeque::new(), ejected_this_cycle: false } }
	pub fn push(&mut self, flit: Rc<Flit>) { self.queue.push_back(flit); }
	pub fn reset_cycle(&mut self) { self.ejected_this_cycle = false; }
	pub fn eject(&mut self) -> Option<Rc<Flit>>
	{
		assert!(!self.ejected_this_cycle, "ejector invariant violated: two flits to the terminal in one cycle");
		let flit = self.queue.pop_front();
		if flit.is_some() { self.ejected_this_cycle = true; }
		flit
	}
}

pub struct InputOutputQueuedRouter
{
	core: RouterCore,
	output_queues: Vec<VecDeque<Rc<Flit>>>,
	output_queue_capacity: usize,
	/// The local-terminal port, if this router has one; ejection only applies there.
	terminal_port: Option<usize>,
	ejector: Ejector,
}

impl InputOutputQueuedRouter
{
	pub fn new(core: RouterCore, output_queue_capacity: usize, terminal_port: Option<usize>) -> InputOutputQueuedRouter
	{
		let num_ports = core.num_ports;
		InputOutputQueuedRouter{
			core, output_queues: (0..num_ports).map(|_|VecDeque::new()).collect(),
			output_queue_capacity, terminal_port, ejector: Ejector::new(),
		}
	}

	/// Drains non-terminal output queues onto their channels (one flit per cycle per queue, in
	/// FIFO order), and runs the ejector once for the terminal port if present. Call once per
	/// cycle after `step_cycle`.
	pub fn drain_outputs(&mut self) -> Vec<(usize,Rc<Flit>)>
	{
		self.ejector.reset_cycle();
		let mut sent = Vec::new();
		for port in 0..self.core.num_ports
		{
			if Some(port)==self.terminal_port
			{
				if let Some(flit) = self.ejector.eject() { sent.push((port,flit)); }
			}
			else if let Some(flit) = self.output_queues[port].pop_front()
			{
				sent.push((port,flit));
			}
		}
		sent
	}
}

impl Router for InputOutputQueuedRouter
{
	fn num_ports(&self) -> usize { self.core.num_ports }
	fn num_virtual_channels(&self) -> usize { self.core.num_vcs }
	fn receive_flit(&mut self, current_cycle: Time, port: usize, flit: Rc<Flit>)
	{
		let vc = flit.virtual_channel().expect("a flit must be VC-assigned before reaching the router");
		self.core.receive_flit(current_cycle,port,vc,flit);
	}
	fn step_cycle(&mut self, current_cycle: Time) -> Vec<(usize,Rc<Flit>)>
	{
		let departures = self.core.step_cycle(current_cycle);
		for (output_port,flit) in departures.iter().cloned()
		{
			assert!(self.output_queues[output_port].len() < self.output_queue_capacity, "output queue overflow on port {}", output_port);
			if Some(output_port)==self.terminal_port
			{
				self.ejector.push(flit);
			}
			else
			{
				self.output_queues[output_port].push_back(flit);
			}
		}
		departures
	}
	fn acknowledge(&mut self, port: usize, ack: AcknowledgeMessage)
	{
		self.core.acknowledge(port,ack);
	}
}

impl Eventful for InputOutputQueuedRouter
{
	fn process(&mut self, current_cycle: Time) -> Vec<EventGeneration>
	{
		self.step_cycle(current_cycle);
		self.drain_outputs();
		vec![]
	}
	fn pending_events(&self) -> bool
	{
		self.core.inputs.iter().any(|unit|!unit.buffer.is_empty()) || self.output_queues.iter().any(|q|!q.is_empty())
	}
	fn add_pending_event(&mut self) {}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	#[should_panic(expected="one cycle")]
	fn ejector_rejects_two_ejections_in_one_cycle()
	{
		let mut ejector = Ejector::new();
		ejector.push(Rc::new(crate::packet::Flit{
			packet: std::rc::Weak::new(), index:0, head:true, tail:true,
			virtual_channel: std::cell::RefCell::new(None), creation_time: 0,
		}));
		ejector.eject();
		ejector.eject();
	}
}
