/*!

The input-queued router variant: `RouterCore` with no further staging — a granted flit goes
straight from the crossbar onto the output channel.

*/

use std::rc::Rc;

use crate::event::{Eventful,EventGeneration,Time};
use crate::packet::Flit;
use crate::router::{Router,AcknowledgeMessage};
use crate::router::core::RouterCore;

pub struct InputQueuedRouter
{
	core: RouterCore,
	/// Flits that departed the crossbar this cycle, awaiting pickup by the channel layer via
	/// `take_departures`.
	departures: Vec<(usize,Rc<Flit>)>,
}

impl InputQueuedRouter
{
	pub fn new(core: RouterCore) -> InputQueuedRouter
	{
		InputQueuedRouter{ core, departures: Vec::new() }
	}
	pub fn take_departures(&mut self) -> Vec<(usize,Rc<Flit>)>
	{
		std::mem::take(&mut self.departures)
	}
}

impl Router for InputQueuedRouter
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
		self.departures.extend(departures.iter().cloned());
		departures
	}
	fn acknowledge(&mut self, port: usize, ack: AcknowledgeMessage)
	{
		self.core.acknowledge(port,ack);
	}
}

impl Eventful for InputQueuedRouter
{
	fn process(&mut self, current_cycle: Time) -> Vec<EventGeneration>
	{
		self.step_cycle(current_cycle);
		vec![]
	}
	fn pending_events(&self) -> bool
	{
		self.core.inputs.iter().any(|unit|!unit.buffer.is_empty())
	}
	fn add_pending_event(&mut self) {}
}
