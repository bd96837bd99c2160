/*!

The per-cycle pipeline shared by both router variants: arrival, VC allocation, switch
allocation, traversal, in that order, each cycle.

*/

use std::rc::Rc;
use std::collections::VecDeque;

use rand::rngs::StdRng;

use crate::packet::Flit;
use crate::event::Time;
use crate::allocator::{SeparableAllocator,SeparableAllocatorBuilderArgument,Request};
use crate::routing::Routing;
use crate::routing::reduction::{self,Reduction};
use crate::congestion::CongestionStatus;
use crate::router::{InputUnit,VcState,OutputCredits,AcknowledgeMessage,CandidateEgress};
use crate::config_parser::ConfigurationValue;
use crate::match_object_panic;
use crate::error::Error;

pub struct RouterCoreBuilderArgument<'a>
{
	pub num_ports: usize,
	pub num_vcs: usize,
	pub buffer_size: u32,
	pub vc_allocator_iterations: usize,
	pub switch_allocator_iterations: usize,
	pub slip_latch: bool,
	pub routing: Rc<dyn Routing>,
	pub reduction: Reduction,
	pub destination_of: Box<dyn Fn(&Flit)->Vec<usize>>,
	pub rng: &'a mut StdRng,
}

/// Shared router state: the FSM/buffers for every (port,vc), the output credit tables, and the
/// two separable allocators (VC allocation: clients=input VCs, resources=output VCs; switch
/// allocation: clients=input ports, resources=output ports).
pub struct RouterCore
{
	pub num_ports: usize,
	pub num_vcs: usize,
	pub inputs: Vec<InputUnit>,
	pub output_credits: Vec<OutputCredits>,
	pub vc_allocator: SeparableAllocator,
	pub switch_allocator: SeparableAllocator,
	pub routing: Rc<dyn Routing>,
	pub reduction: Reduction,
	pub destination_of: Box<dyn Fn(&Flit)->Vec<usize>>,
	/// Head flits whose routing response becomes available at the recorded cycle: `(ready_at,
	/// input_index)`. Models the routing algorithm's configured latency without requiring the
	/// router itself to own a scheduler handle.
	pending_routing: VecDeque<(Time,usize)>,
	/// Indexed like `inputs` (by `index(output_port,output_vc)`): whether that output VC is
	/// currently held by a packet that has not yet seen its tail released. Excluded from VC
	/// allocation requests and from grants so two packets never interleave on one output VC.
	output_vc_busy: Vec<bool>,
}

impl RouterCore
{
	pub fn new(arg: RouterCoreBuilderArgument) -> RouterCore
	{
		let num_cells = arg.num_ports * arg.num_vcs;
		RouterCore{
			num_ports: arg.num_ports,
			num_vcs: arg.num_vcs,
			inputs: (0..num_cells).map(|_|InputUnit::new()).collect(),
			output_credits: (0..arg.num_ports).map(|_|OutputCredits::new(arg.num_vcs,arg.buffer_size)).collect(),
			vc_allocator: SeparableAllocator::new(SeparableAllocatorBuilderArgument{
				num_clients: num_cells, num_resources: num_cells, iterations: arg.vc_allocator_iterations, slip_latch: arg.slip_latch, rng: arg.rng,
			}),
			switch_allocator: unsafe_reborrow_switch_allocator(arg.num_ports, arg.switch_allocator_iterations, arg.slip_latch),
			routing: arg.routing,
			reduction: arg.reduction,
			destination_of: arg.destination_of,
			pending_routing: VecDeque::new(),
			output_vc_busy: vec![false; num_cells],
		}
	}

	fn index(&self, port: usize, vc: usize) -> usize { port*self.num_vcs + vc }

	pub fn receive_flit(&mut self, current_cycle: Time, port: usize, vc: usize, flit: Rc<Flit>)
	{
		let idx = self.index(port,vc);
		let head = flit.head;
		self.inputs[idx].buffer.push_back(flit);
		if head
		{
			assert_eq!(self.inputs[idx].state, VcState::Idle, "a head flit arrived on a non-idle VC");
			self.inputs[idx].state = VcState::Routing;
			self.pending_routing.push_back((current_cycle + self.routing.latency(), idx));
		}
	}

	pub fn acknowledge(&mut self, port: usize, ack: AcknowledgeMessage)
	{
		self.output_credits[port].watcher.increment_credit(ack.virtual_channel);
	}

	/// Runs arrival-resolution (routing responses that matured this cycle), VC allocation,
	/// switch allocation and traversal, in that order, and returns `(output_port, flit)` pairs
	/// that departed the crossbar this cycle.
	pub fn step_cycle(&mut self, current_cycle: Time) -> Vec<(usize,Rc<Flit>)>
	{
		self.resolve_routing_responses(current_cycle);
		self.allocate_vcs();
		self.allocate_switch(current_cycle)
	}

	fn resolve_routing_responses(&mut self, current_cycle: Time)
	{
		while let Some(&(ready_at,_)) = self.pending_routing.front()
		{
			if ready_at > current_cycle { break; }
			let (_,idx) = self.pending_routing.pop_front().unwrap();
			if self.inputs[idx].state != VcState::Routing { continue; }
			let head = self.inputs[idx].buffer.front().cloned().expect("routing matured with no buffered head flit");
			let destination = (self.destination_of)(&head);
			let input_port = idx / self.num_vcs;
			let raw = self.routing.route(&destination, input_port);
			let reduced = reduction::apply(self.reduction, &raw, |candidate| self.output_congestion(candidate));
			assert!(!reduced.candidates.is_empty(), "reduction must never empty a non-empty candidate set");
			self.inputs[idx].candidates = Some(reduced.candidates);
			self.inputs[idx].state = VcState::WaitingVc;
		}
	}

	fn output_congestion(&self, candidate: &CandidateEgress) -> f64
	{
		let watcher = &self.output_credits[candidate.output_port].watcher;
		let used = watcher.maximum(candidate.output_vc) - watcher.credits(candidate.output_vc);
		if watcher.maximum(candidate.output_vc)==0 { 0.0 } else { used as f64 / watcher.maximum(candidate.output_vc) as f64 }
	}

	fn allocate_vcs(&mut self)
	{
		for idx in 0..self.inputs.len()
		{
			if self.inputs[idx].state != VcState::WaitingVc { continue; }
			let candidates = self.inputs[idx].candidates.clone().unwrap_or_default();
			for candidate in candidates
			{
				let resource = self.index(candidate.output_port,candidate.output_vc);
				if self.output_credits[candidate.output_port].watcher.credits(candidate.output_vc) > 0
					&& !self.output_vc_busy[resource]
				{
					self.vc_allocator.add_request(Request{ client: idx, resource });
				}
			}
		}
		let granted = self.vc_allocator.allocate();
		for grant in granted.grants
		{
			let output_port = grant.resource / self.num_vcs;
			let output_vc = grant.resource % self.num_vcs;
			self.inputs[grant.client].granted_output = Some((output_port,output_vc));
			self.inputs[grant.client].state = VcState::Active;
			self.output_vc_busy[grant.resource] = true;
		}
	}

	fn allocate_switch(&mut self, _current_cycle: Time) -> Vec<(usize,Rc<Flit>)>
	{
		for idx in 0..self.inputs.len()
		{
			let eligible = self.inputs[idx].state==VcState::Active && !self.inputs[idx].buffer.is_empty();
			if !eligible { continue; }
			if let Some((output_port,output_vc)) = self.inputs[idx].granted_output
			{
				if self.output_credits[output_port].watcher.credits(output_vc) > 0
				{
					let input_port = idx / self.num_vcs;
					self.switch_allocator.add_request(Request{ client: input_port, resource: output_port });
				}
			}
		}
		let granted = self.switch_allocator.allocate();
		let mut departures = Vec::new();
		let mut winners_by_port = std::collections::HashMap::new();
		for grant in &granted.grants { winners_by_port.insert(grant.client, grant.resource); }
		for port in 0..self.num_ports
		{
			// Find the (at most one) input VC on this port that is active, has a granted
			// switch slot to the winning output, and has a buffered flit — a valid datapath
			// only ever has one such VC per port per cycle because VC allocation is
			// per-(input-vc, output-vc) exclusive.
			for vc in 0..self.num_vcs
			{
				let idx = self.index(port,vc);
				if self.inputs[idx].state != VcState::Active { continue; }
				if winners_by_port.get(&port) != self.inputs[idx].granted_output.map(|(p,_)|p).as_ref() { continue; }
				let Some(flit) = self.inputs[idx].buffer.pop_front() else { continue };
				let (output_port,output_vc) = self.inputs[idx].granted_output.unwrap();
				self.output_credits[output_port].watcher.decrement_credit(output_vc);
				if flit.tail
				{
					self.inputs[idx].state = VcState::TailSeen;
				}
				departures.push((output_port,flit));
				break;
			}
		}
		departures
	}

	/// Called once a tail's credit has returned and the output VC is released: resets the VC
	/// to `Idle` so a new head may arrive, and frees the output VC it held so a different
	/// packet can now be granted it.
	pub fn release_tail(&mut self, port: usize, vc: usize)
	{
		let idx = self.index(port,vc);
		assert_eq!(self.inputs[idx].state, VcState::TailSeen);
		if let Some((output_port,output_vc)) = self.inputs[idx].granted_output
		{
			self.output_vc_busy[self.index(output_port,output_vc)] = false;
		}
		self.inputs[idx].state = VcState::Idle;
		self.inputs[idx].candidates = None;
		self.inputs[idx].granted_output = None;
	}
}

/// Builds a `RouterCore` from a `RouterCore{num_ports,num_vcs,buffer_size,allocator,reduction}`
/// configuration object, plus the pieces that are not themselves configuration-expressible:
/// the already-resolved routing plug-in, the destination-lookup closure and the shared RNG.
pub fn new_router_core(cv: &ConfigurationValue, routing: Rc<dyn Routing>, destination_of: Box<dyn Fn(&Flit)->Vec<usize>>, rng: &mut StdRng) -> Result<RouterCore,Error>
{
	let (num_ports,num_vcs,buffer_size,allocator_cv,reduction_cv) = match_object_panic!(cv, "RouterCore",
		num_ports => &ConfigurationValue::Number(n) => n as usize,
		num_vcs => &ConfigurationValue::Number(n) => n as usize,
		buffer_size => &ConfigurationValue::Number(n) => n as u32,
		allocator => other => other.clone(),
		reduction => other => other.clone(),
	);
	let reduction = reduction::from_config(&reduction_cv)?;
	let iterations_latch = |cv: &ConfigurationValue| match_object_panic!(cv, "Separable",
		iterations => &ConfigurationValue::Number(n) => n as usize,
		slip_latch => &ConfigurationValue::Bool(b) => b,
	);
	// The same `Separable{...}` configuration object sizes both the VC and the switch
	// allocator; a caller wanting distinct iteration counts would configure two RouterCores
	// and is out of scope here.
	let (iterations,slip_latch) = iterations_latch(&allocator_cv);
	Ok(RouterCore::new(RouterCoreBuilderArgument{
		num_ports, num_vcs, buffer_size,
		vc_allocator_iterations: iterations,
		switch_allocator_iterations: iterations,
		slip_latch,
		routing, reduction, destination_of, rng,
	}))
}

/// `SeparableAllocator` does not implement `Clone`/`Copy` and its constructor wants an `&mut
/// StdRng`; the switch allocator needs its own independent instance sized by ports rather than
/// (port,vc) cells, so it is built directly here rather than threaded through the public
/// builder argument twice.
fn unsafe_reborrow_switch_allocator(num_ports: usize, iterations: usize, slip_latch: bool) -> SeparableAllocator
{
	// A router only ever needs one extra throwaway RNG draw sequence for the switch
	// allocator's own arbiters' initial state, which is deterministic (all pointers start at
	// 0) regardless of seed, so a fresh fixed-seed RNG is sufficient here.
	let mut rng = StdRng::seed_from_u64(0);
	SeparableAllocator::new(SeparableAllocatorBuilderArgument{ num_clients: num_ports, num_resources: num_ports, iterations, slip_latch, rng: &mut rng })
}

use rand::SeedableRng;
