/*!

The address-translation oracle the core depends on but does not implement: concrete topology
constructions (butterfly, dragonfly, torus, ...) are external collaborators. This module
defines only the interface, plus a trivial fixture topology used by this crate's own
integration tests.

*/

/// Little-endian vectors of component indices; the concrete format is topology-specific and
/// opaque to the core.
pub type Address = Vec<usize>;

pub trait Topology
{
	fn num_routers(&self) -> usize;
	fn num_servers(&self) -> usize;
	fn ports(&self, router: usize) -> usize;
	fn interface_id_to_address(&self, id: usize) -> Address;
	fn address_to_interface_id(&self, address: &Address) -> usize;
	fn router_id_to_address(&self, id: usize) -> Address;
	fn address_to_router_id(&self, address: &Address) -> usize;
	fn minimal_hops(&self, source: usize, destination: usize) -> u32;
}

/// A single-router, two-terminal fixture: terminal 0 and terminal 1 are both attached to the
/// one router, on ports 0 and 1 respectively. Used only by this crate's own end-to-end test
/// (single-link loopback); never a production topology.
pub struct PointToPoint;

impl Topology for PointToPoint
{
	fn num_routers(&self) -> usize { 1 }
	fn num_servers(&self) -> usize { 2 }
	fn ports(&self, _router: usize) -> usize { 2 }
	fn interface_id_to_address(&self, id: usize) -> Address { vec![id] }
	fn address_to_interface_id(&self, address: &Address) -> usize { address[0] }
	fn router_id_to_address(&self, id: usize) -> Address { vec![id] }
	fn address_to_router_id(&self, address: &Address) -> usize { address[0] }
	fn minimal_hops(&self, source: usize, destination: usize) -> u32 { if source==destination { 0 } else { 1 } }
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn address_translation_round_trips()
	{
		let topology = PointToPoint;
		for id in 0..topology.num_servers()
		{
			let address = topology.interface_id_to_address(id);
			assert_eq!(topology.address_to_interface_id(&address),id);
		}
	}

	#[test]
	fn minimal_hops_is_one_between_distinct_terminals()
	{
		let topology = PointToPoint;
		assert_eq!(topology.minimal_hops(0,1),1);
		assert_eq!(topology.minimal_hops(0,0),0);
	}
}
