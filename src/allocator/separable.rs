/*!

The two-phase separable allocator: client-side arbiters each pick one resource per client
(request phase), then resource-side arbiters each pick one winning client per resource (grant
phase). Repeated for `iterations` rounds. Latching policy is the `slip_latch` flag: `false`
latches every arbiter every iteration ("latch-always"); `true` latches only the arbiters
involved in a win, the iSLIP anti-starvation discipline.

The accept/clear step after a resource-side win clears the winner's entire row and the
resource's entire column from the request matrix with two separately-named loop variables,
unlike the original C++ implementation this is modeled on, which reuses the name `r` for both
the outer (resource) loop and the inner (winner's-row) loop; confusing but not incorrect since
C++ scoping shadows correctly. Whatever is left requested but unmatched after the configured
number of iterations is dropped too: `allocate` clears the whole matrix before returning, so a
caller's `add_request` calls describe exactly one cycle's candidates, never a carry-over from
a cycle that lost.

*/

use rand::rngs::StdRng;

use crate::allocator::arbiter::{Arbiter,RoundRobinArbiter};
use crate::matrix::Matrix;

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct Request
{
	pub client: usize,
	pub resource: usize,
}

#[derive(Debug,Default)]
pub struct GrantedRequests
{
	pub grants: Vec<Request>,
}

impl GrantedRequests
{
	pub fn add(&mut self, request: Request) { self.grants.push(request); }
}

pub struct SeparableAllocatorBuilderArgument<'a>
{
	pub num_clients: usize,
	pub num_resources: usize,
	pub iterations: usize,
	pub slip_latch: bool,
	pub rng: &'a mut StdRng,
}

/// The separable allocator. `request`/`requests` matrix is `R`; `grant` matrix (the result of
/// the most recent `allocate`) is `G`; `G` is always a subset of the `R` given to that call, and
/// is itself a matching (at most one set bit per row and per column).
pub struct SeparableAllocator
{
	num_clients: usize,
	num_resources: usize,
	iterations: usize,
	slip_latch: bool,
	requests: Matrix<bool>,
	client_arbiters: Vec<RoundRobinArbiter>,
	resource_arbiters: Vec<RoundRobinArbiter>,
}

impl SeparableAllocator
{
	pub fn new(arg: SeparableAllocatorBuilderArgument) -> SeparableAllocator
	{
		assert!(arg.num_clients>0 && arg.num_resources>0);
		assert!(arg.iterations>=1);
		SeparableAllocator{
			num_clients: arg.num_clients,
			num_resources: arg.num_resources,
			iterations: arg.iterations,
			slip_latch: arg.slip_latch,
			requests: Matrix::constant(false,arg.num_clients,arg.num_resources),
			client_arbiters: (0..arg.num_clients).map(|_|RoundRobinArbiter::new(arg.num_resources)).collect(),
			resource_arbiters: (0..arg.num_resources).map(|_|RoundRobinArbiter::new(arg.num_clients)).collect(),
		}
	}

	/// Adds a request bit `R[client,resource] = true`. Requests accumulate across calls until
	/// consumed by `allocate`.
	pub fn add_request(&mut self, request: Request)
	{
		assert!(request.client<self.num_clients && request.resource<self.num_resources);
		self.requests.set(request.client,request.resource,true);
	}

	/// Drops every request bit, including ones that lost every iteration of the last
	/// `allocate` call. Called at the end of `allocate` so a stale losing request can never
	/// survive into a cycle whose `add_request` calls did not re-assert it.
	fn clear_requests(&mut self)
	{
		self.requests.fill(false);
	}

	/// Runs `iterations` request/grant rounds over the currently set request bits and returns
	/// the resulting grant matching. Clears the entire request matrix before returning, so a
	/// fresh set of `add_request` calls is expected before the next `allocate`.
	pub fn allocate(&mut self) -> GrantedRequests
	{
		let mut granted = GrantedRequests::default();
		let mut in_match = vec![false;self.num_clients];
		let mut out_match = vec![false;self.num_resources];

		for _iteration in 0..self.iterations
		{
			// Request phase: each client arbitrates among the resources it still has a
			// live request bit for and that are not already matched this call.
			let mut intermediate = Matrix::constant(false,self.num_clients,self.num_resources);
			for client in 0..self.num_clients
			{
				if in_match[client] { continue; }
				let arbiter = &mut self.client_arbiters[client];
				arbiter.clear();
				for resource in 0..self.num_resources
				{
					if *self.requests.get(client,resource) && !out_match[resource]
					{
						arbiter.request(resource);
					}
				}
				let picked = arbiter.arbitrate();
				if let Some(resource) = picked
				{
					intermediate.set(client,resource,true);
				}
				// Latch-always advances every client arbiter every iteration, win or not.
				if !self.slip_latch
				{
					let next = picked.unwrap_or_else(||arbiter.pointer());
					arbiter.latch(next);
				}
			}

			// Grant phase: each resource arbitrates among the clients that targeted it in the
			// intermediate matrix.
			for resource in 0..self.num_resources
			{
				if out_match[resource] { continue; }
				let arbiter = &mut self.resource_arbiters[resource];
				arbiter.clear();
				for client in 0..self.num_clients
				{
					if *intermediate.get(client,resource) { arbiter.request(client); }
				}
				let winner = arbiter.arbitrate();
				if let Some(winning_client) = winner
				{
					in_match[winning_client] = true;
					out_match[resource] = true;
					granted.add(Request{ client: winning_client, resource });

					// The winner cannot be rematched and the resource cannot be reassigned
					// within this `allocate` call: clear the winner's row and the resource's
					// column from the live request matrix. Two distinct loop variables, one
					// per axis, unlike the shadowed `r` in the C++ original.
					for other_resource in 0..self.num_resources
					{
						self.requests.set(winning_client,other_resource,false);
					}
					for other_client in 0..self.num_clients
					{
						self.requests.set(other_client,resource,false);
					}

					if self.slip_latch
					{
						arbiter.latch(winning_client);
						self.client_arbiters[winning_client].latch(resource);
					}
				}
				// Latch-always advances every resource arbiter every iteration regardless of
				// whether it won this round; iSLIP only advances the arbiters on a win (above).
				if !self.slip_latch
				{
					let next = arbiter.pointer();
					arbiter.latch(next);
				}
			}
		}
		self.clear_requests();
		granted
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use ::rand::SeedableRng;

	fn new_allocator(n: usize, iterations: usize, slip_latch: bool) -> SeparableAllocator
	{
		let mut rng = StdRng::seed_from_u64(0);
		SeparableAllocator::new(SeparableAllocatorBuilderArgument{
			num_clients: n, num_resources: n, iterations, slip_latch, rng: &mut rng,
		})
	}

	#[test]
	fn full_request_matrix_yields_a_permutation()
	{
		let mut allocator = new_allocator(4,1,true);
		for c in 0..4 { for r in 0..4 { allocator.add_request(Request{client:c,resource:r}); } }
		let granted = allocator.allocate();
		assert_eq!(granted.grants.len(),4);
		let mut clients: Vec<_> = granted.grants.iter().map(|g|g.client).collect();
		let mut resources: Vec<_> = granted.grants.iter().map(|g|g.resource).collect();
		clients.sort(); resources.sort();
		assert_eq!(clients,vec![0,1,2,3]);
		assert_eq!(resources,vec![0,1,2,3]);
	}

	#[test]
	fn single_iteration_is_one_request_grant_round()
	{
		// With one request per client all aimed at resource 0, only one client can win in a
		// single iteration no matter how many clients there are.
		let mut allocator = new_allocator(3,1,true);
		for c in 0..3 { allocator.add_request(Request{client:c,resource:0}); }
		let granted = allocator.allocate();
		assert_eq!(granted.grants.len(),1);
	}

	#[test]
	fn multiple_iterations_can_match_more_of_a_sparse_matrix()
	{
		// client 0 -> resource 0 and resource 1; client 1 -> resource 0 only.
		// A single-iteration run can leave client1 unmatched if client0 wins resource 0 first;
		// more iterations let client1's request surface once resource0 is already taken and
		// client0 has exhausted it, but client0 also requests resource1, so 2 iterations are
		// enough to match both clients.
		let mut allocator = new_allocator(2,2,true);
		allocator.add_request(Request{client:0,resource:0});
		allocator.add_request(Request{client:0,resource:1});
		allocator.add_request(Request{client:1,resource:0});
		let granted = allocator.allocate();
		assert_eq!(granted.grants.len(),2);
	}

	#[test]
	fn grant_matrix_is_always_a_matching()
	{
		let mut allocator = new_allocator(4,2,false);
		for c in 0..4 { for r in 0..4 { allocator.add_request(Request{client:c,resource:r}); } }
		let granted = allocator.allocate();
		let mut seen_clients = std::collections::HashSet::new();
		let mut seen_resources = std::collections::HashSet::new();
		for g in &granted.grants
		{
			assert!(seen_clients.insert(g.client),"client {} granted twice",g.client);
			assert!(seen_resources.insert(g.resource),"resource {} granted twice",g.resource);
		}
	}

	#[test]
	fn a_losing_request_does_not_survive_into_the_next_allocate_call()
	{
		// Both clients want resource 0 only; client 1 loses the first call. If its request bit
		// survived, the second call (where only client 0 re-requests, this time resource 1)
		// would wrongly still grant client 1 resource 0 even though nothing re-asserted it.
		let mut allocator = new_allocator(2,1,true);
		allocator.add_request(Request{client:0,resource:0});
		allocator.add_request(Request{client:1,resource:0});
		let first = allocator.allocate();
		assert_eq!(first.grants.len(),1);
		let loser = if first.grants[0].client==0 {1} else {0};

		allocator.add_request(Request{client: 1-loser, resource:0});
		let second = allocator.allocate();
		assert_eq!(second.grants.len(),1);
		assert_eq!(second.grants[0].client,1-loser,"the loser's stale request must not resurface");
	}

	#[test]
	fn islip_pointer_only_advances_on_a_win()
	{
		// client 0 never requests; its arbiter pointer must stay put across allocate() calls
		// under slip_latch=true.
		let mut allocator = new_allocator(2,1,true);
		allocator.add_request(Request{client:1,resource:0});
		allocator.allocate();
		assert_eq!(allocator.client_arbiters[0].pointer(),0);
	}
}
