/*!

The arbiter contract consumed by the separable allocator: round-robin by default, but pluggable
— any implementation that picks at most one enabled input per call and whose `latch` advances
the internal pointer past the last granted index is acceptable.

*/

/// One arbiter instance, owning a priority pointer over a fixed number of inputs.
pub trait Arbiter
{
	/// Marks `input` as requesting in this cycle.
	fn request(&mut self, input: usize);
	/// Picks at most one of the currently requesting inputs and returns it; does not by itself
	/// move the pointer (see `latch`).
	fn arbitrate(&mut self) -> Option<usize>;
	/// Advances the pointer past the index returned by the most recent `arbitrate` call that
	/// actually won (callers only invoke this when a win occurred).
	fn latch(&mut self, winner: usize);
	/// Drops all pending requests, readying the arbiter for the next cycle.
	fn clear(&mut self);
}

/// Round-robin arbiter: grants the lowest-index requester at or after a rotating pointer.
#[derive(Debug,Clone)]
pub struct RoundRobinArbiter
{
	num_inputs: usize,
	pointer: usize,
	requested: Vec<bool>,
}

impl RoundRobinArbiter
{
	pub fn new(num_inputs: usize) -> RoundRobinArbiter
	{
		RoundRobinArbiter{ num_inputs, pointer: 0, requested: vec![false;num_inputs] }
	}
	pub fn pointer(&self) -> usize { self.pointer }
}

impl Arbiter for RoundRobinArbiter
{
	fn request(&mut self, input: usize) { self.requested[input] = true; }
	fn arbitrate(&mut self) -> Option<usize>
	{
		(0..self.num_inputs)
			.map(|offset|(self.pointer+offset) % self.num_inputs)
			.find(|&i|self.requested[i])
	}
	fn latch(&mut self, winner: usize)
	{
		self.pointer = (winner + 1) % self.num_inputs;
	}
	fn clear(&mut self)
	{
		self.requested.iter_mut().for_each(|r|*r=false);
	}
}
