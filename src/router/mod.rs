/*!

The router datapath: per-port, per-VC input buffers, a VC state machine, VC allocation and
switch allocation via the separable allocator, and traversal onto output channels. Two
variants share the same core (`RouterCore`): input-queued (`InputQueuedRouter`) and
input-output-queued (`InputOutputQueuedRouter`, which adds per-output queues and an ejector for
the local-terminal port).

*/

pub mod core;
pub mod input_queued;
pub mod input_output_queued;

use std::rc::Rc;

use crate::packet::Flit;
use crate::event::Time;
use crate::congestion::CreditWatcher;

/// The VC state machine described for the router datapath: a head flit arriving starts
/// routing; once the routing response names candidates the VC waits for allocation; once
/// granted it is active until its tail is seen; once the tail's credit returns the VC releases.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum VcState
{
	Idle,
	Routing,
	WaitingVc,
	Active,
	TailSeen,
}

/// A candidate the VC allocator may grant: an (output port, output VC) pair produced by the
/// routing algorithm.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct CandidateEgress
{
	pub output_port: usize,
	pub output_vc: usize,
}

/// Per-(input port, input VC) state: buffered flits awaiting transmission, the VC's FSM state,
/// the routing candidates once known, and the granted (output port, VC) once VC-allocated.
pub struct InputUnit
{
	pub state: VcState,
	pub buffer: std::collections::VecDeque<Rc<Flit>>,
	pub candidates: Option<Vec<CandidateEgress>>,
	pub granted_output: Option<(usize,usize)>,
}

impl InputUnit
{
	pub fn new() -> InputUnit
	{
		InputUnit{ state: VcState::Idle, buffer: std::collections::VecDeque::new(), candidates: None, granted_output: None }
	}
}

/// Per-output-port credit accounting: one `CreditWatcher` counter per VC of that port, tracking
/// how many buffer slots remain free downstream.
pub struct OutputCredits
{
	pub watcher: CreditWatcher,
}

impl OutputCredits
{
	pub fn new(num_vcs: usize, buffer_size: u32) -> OutputCredits
	{
		let mut watcher = CreditWatcher::new(num_vcs);
		for vc in 0..num_vcs { watcher.init_credits(vc,buffer_size); }
		OutputCredits{ watcher }
	}
}

/// Acknowledgement delivered upstream when a buffer slot frees, driving `CreditWatcher::
/// increment_credit` on the sender side of a channel.
#[derive(Debug,Clone,Copy)]
pub struct AcknowledgeMessage
{
	pub virtual_channel: usize,
}

/// Common contract both router variants satisfy; ties the VC/switch allocation machinery to a
/// uniform interface the topology-provided network plumbing can drive.
pub trait Router
{
	fn num_ports(&self) -> usize;
	fn num_virtual_channels(&self) -> usize;
	/// Introduces a flit arriving at `port`. Returns the cycle at which the router will next
	/// need to run its per-cycle pipeline (used by the caller to schedule `process`).
	fn receive_flit(&mut self, current_cycle: Time, port: usize, flit: Rc<Flit>);
	/// Runs one cycle of arrival -> VC allocation -> switch allocation -> traversal and returns
	/// the flits that departed this cycle as `(output_port, flit)` pairs.
	fn step_cycle(&mut self, current_cycle: Time) -> Vec<(usize,Rc<Flit>)>;
	/// Receives a credit acknowledgement for a previously departed flit.
	fn acknowledge(&mut self, port: usize, ack: AcknowledgeMessage);
}
