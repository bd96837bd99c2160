/*!

The routing-algorithm plug-in contract. A concrete algorithm (butterfly, dragonfly, torus
dimension-order, ...) is a topology-specific external collaborator and out of scope here; this
module defines the interface the router datapath drives and the `Reduction` policies that
collapse a raw candidate set using the congestion oracle.

*/

pub mod reduction;

use crate::event::Time;
use crate::router::CandidateEgress;

/// A routing response: the admissible `(output port, VC)` candidates for a flit, plus whether
/// every one of them is a minimal-hop choice.
#[derive(Debug,Clone)]
pub struct CandidateSet
{
	pub candidates: Vec<CandidateEgress>,
	pub is_minimal: Vec<bool>,
}

impl CandidateSet
{
	pub fn all_minimal(&self) -> bool
	{
		!self.is_minimal.is_empty() && self.is_minimal.iter().all(|&m|m)
	}
	pub fn minimal_subset(&self) -> CandidateSet
	{
		let mut candidates = Vec::new();
		let mut is_minimal = Vec::new();
		for (c,m) in self.candidates.iter().zip(self.is_minimal.iter())
		{
			if *m { candidates.push(*c); is_minimal.push(true); }
		}
		CandidateSet{ candidates, is_minimal }
	}
}

/// The plug-in contract. `request`/`processRequest` in spec terms collapse here to a single
/// synchronous `route` call plus a `latency`; the router applies the latency by deferring when
/// the resulting candidates become visible to VC allocation, rather than the algorithm owning
/// its own event continuation.
pub trait Routing
{
	/// Cycles between a head flit's arrival and its routing response becoming available.
	fn latency(&self) -> Time;
	/// Produces the raw candidate set for a flit entering at `input_port` bound for
	/// `destination`. Must be non-empty for a reachable destination; an empty response is an
	/// invariant violation (the model is assumed correct by construction), not a recoverable
	/// condition.
	fn route(&self, destination: &[usize], input_port: usize) -> CandidateSet;
}

/// A trivial routing algorithm used by this crate's own tests: single candidate, always
/// minimal, fixed latency. Concrete production algorithms (per-topology) are out of scope.
pub struct FixedRouting
{
	pub latency: Time,
	pub candidate: CandidateEgress,
}

impl Routing for FixedRouting
{
	fn latency(&self) -> Time { self.latency }
	fn route(&self, _destination: &[usize], _input_port: usize) -> CandidateSet
	{
		CandidateSet{ candidates: vec![self.candidate], is_minimal: vec![true] }
	}
}
