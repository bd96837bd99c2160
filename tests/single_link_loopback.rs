mod common;

use std::rc::Rc;

use fabricsim::config_parser::parse;
use fabricsim::packet::{Message,Transaction};
use fabricsim::interface::{fragment_message,SinkReassembler};
use fabricsim::router::core::new_router_core;
use fabricsim::router::CandidateEgress;
use fabricsim::routing::FixedRouting;

use common::{create_router_core_config,RouterCoreConfigBuilder,create_separable_allocator,SeparableAllocatorBuilder};

/// End to end: a message is fragmented, injected into a router core built from a parsed
/// configuration, and reassembled at the sink once its single packet's tail departs.
#[test]
fn message_traverses_a_single_hop_and_reassembles_at_the_sink()
{
	let allocator_cv = create_separable_allocator(SeparableAllocatorBuilder{ iterations: 1, slip_latch: true });
	let cv = create_router_core_config(RouterCoreConfigBuilder{
		num_ports: 2, num_vcs: 1, buffer_size: 4, allocator: allocator_cv, reduction: parse("none").unwrap(),
	});

	let routing = Rc::new(FixedRouting{ latency: 1, candidate: CandidateEgress{ output_port: 1, output_vc: 0 } });
	let mut rng = rand::rngs::StdRng::seed_from_u64(0);
	let mut core = new_router_core(&cv,routing,Box::new(|_destination|vec![0]),&mut rng).unwrap();

	let message = Rc::new(Message{
		transaction: Transaction::new(0,0,0),
		destination: vec![1],
		protocol_class: 0,
		owner_terminal: 1,
		requested_size: 3,
		packets: std::cell::RefCell::new(Vec::new()),
		creation_time: 0,
	});
	let packets = fragment_message(&message,8,0);
	assert_eq!(packets.len(),1);

	for flit in &packets[0].flits
	{
		flit.set_virtual_channel(0);
		core.receive_flit(0,0,0,flit.clone());
	}

	let mut sink = SinkReassembler::new();
	sink.register_message(Rc::clone(&message),message.transaction,packets.len());

	let mut delivered = None;
	for cycle in 0..10
	{
		let departures = core.step_cycle(cycle);
		for (port,flit) in departures
		{
			assert_eq!(port,1,"the only configured candidate targets port 1");
			if let Some(done) = sink.accept_flit(packets[0].packet_id,message.transaction,flit)
			{
				delivered = Some(done);
			}
		}
		if delivered.is_some() { break; }
	}
	assert_eq!(delivered,Some(message.transaction));
}

use rand::SeedableRng;
