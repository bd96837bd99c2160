/*!

The separable allocator family: request/grant matching across clients and resources, used both
by the router's VC allocator (clients = input VCs, resources = output VCs) and its switch
allocator (clients = input ports, resources = output ports).

*/

pub mod arbiter;
pub mod separable;

use rand::rngs::StdRng;

use crate::config_parser::ConfigurationValue;
use crate::match_object_panic;
pub use self::separable::{SeparableAllocator,SeparableAllocatorBuilderArgument,Request,GrantedRequests};

pub struct AllocatorBuilderArgument<'a>
{
	pub cv: &'a ConfigurationValue,
	pub num_clients: usize,
	pub num_resources: usize,
	pub rng: &'a mut StdRng,
}

/// Builds a `SeparableAllocator` from a configuration object of the form
/// `Separable{ iterations: N, slip_latch: bool }`.
pub fn new_allocator(arg: AllocatorBuilderArgument) -> SeparableAllocator
{
	let (iterations,slip_latch) = match_object_panic!(arg.cv, "Separable",
		iterations => &ConfigurationValue::Number(n) => n as usize,
		slip_latch => &ConfigurationValue::Bool(b) => b,
	);
	SeparableAllocator::new(SeparableAllocatorBuilderArgument{
		num_clients: arg.num_clients,
		num_resources: arg.num_resources,
		iterations,
		slip_latch,
		rng: arg.rng,
	})
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::config_parser::parse;
	use ::rand::SeedableRng;

	#[test]
	fn builds_from_configuration()
	{
		let cv = parse("Separable{iterations: 2, slip_latch: true}").unwrap();
		let mut rng = StdRng::seed_from_u64(1);
		let mut allocator = new_allocator(AllocatorBuilderArgument{ cv: &cv, num_clients: 2, num_resources: 2, rng: &mut rng });
		allocator.add_request(Request{client:0,resource:0});
		allocator.add_request(Request{client:1,resource:1});
		let granted = allocator.allocate();
		assert_eq!(granted.grants.len(),2);
	}
}
