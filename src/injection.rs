/*!

The injection-algorithm plug-in contract: given a packet about to leave the source interface,
produce a set of candidate VCs on the first hop. Latency-bound and event-driven like the
routing-algorithm contract; concrete traffic-aware policies are out of scope, this module
defines only the interface the `Interface` consumes.

*/

use crate::event::Time;

pub trait InjectionAlgorithm
{
	fn latency(&self) -> Time;
	/// Candidate VCs for a packet of `protocol_class`. Non-empty for a reachable VC base.
	fn candidate_vcs(&self, protocol_class: usize, vc_base: usize, vc_count: usize) -> Vec<usize>;
}

/// Always offers every VC in the protocol class's range; the simplest possible policy, used by
/// this crate's own tests.
pub struct AllVcs
{
	pub latency: Time,
}

impl InjectionAlgorithm for AllVcs
{
	fn latency(&self) -> Time { self.latency }
	fn candidate_vcs(&self, _protocol_class: usize, vc_base: usize, vc_count: usize) -> Vec<usize>
	{
		(vc_base..vc_base+vc_count).collect()
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn all_vcs_offers_the_full_range()
	{
		let algorithm = AllVcs{ latency: 2 };
		assert_eq!(algorithm.candidate_vcs(0,4,3),vec![4,5,6]);
	}
}
