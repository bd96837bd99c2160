/*!

The terminal-facing node: fragments outgoing messages into packets and flits, applies the
injection algorithm, and honors per-VC credits toward the first-hop router on the source side;
reassembles incoming flits into packets and messages on the sink side.

*/

use std::rc::{Rc,Weak};
use std::cell::RefCell;
use std::collections::HashMap;

use crate::packet::{Flit,Packet,Message,Transaction};
use crate::event::Time;
use crate::congestion::CreditWatcher;

/// Breaks a message into packets of at most `max_packet_size` flits each, and each packet into
/// flits; assigns sequential packet ids within the message. Zero-length messages are rejected.
pub fn fragment_message(message: &Rc<Message>, max_packet_size: usize, now: Time) -> Vec<Rc<Packet>>
{
	let total_flits = message.requested_size;
	assert!(total_flits>0, "zero-length messages are rejected");
	let mut packets = Vec::new();
	let mut packet_id = 0u32;
	let mut remaining = total_flits;
	while remaining>0
	{
		let size = remaining.min(max_packet_size);
		let flits = (0..size).map(|i|Rc::new(Flit{
			packet: Weak::new(),
			index: i,
			head: i==0,
			tail: i==size-1,
			virtual_channel: RefCell::new(None),
			creation_time: now,
		})).collect();
		packets.push(Rc::new(Packet{ message: Rc::downgrade(message), packet_id, flits }));
		packet_id += 1;
		remaining -= size;
	}
	*message.packets.borrow_mut() = packets.clone();
	assert_eq!(message.fragmented_size(),message.requested_size,"fragmentation must conserve message size");
	packets
}

/// Source-side injection state for one interface: per-VC credits toward the first hop, and the
/// queue of packets awaiting an injection-algorithm decision.
pub struct SourceInjector
{
	pub credits: CreditWatcher,
	pending: Vec<Rc<Packet>>,
}

impl SourceInjector
{
	pub fn new(num_vcs: usize, buffer_size: u32) -> SourceInjector
	{
		let mut credits = CreditWatcher::new(num_vcs);
		for vc in 0..num_vcs { credits.init_credits(vc,buffer_size); }
		SourceInjector{ credits, pending: Vec::new() }
	}
	pub fn enqueue(&mut self, packet: Rc<Packet>) { self.pending.push(packet); }
	/// Pops the next packet ready to send on `vc`, provided a credit is available; blocks
	/// (returns `None`) when credits are exhausted, per the credit-based backpressure contract.
	pub fn try_send(&mut self, vc: usize) -> Option<Rc<Packet>>
	{
		if self.credits.credits(vc)==0 || self.pending.is_empty() { return None; }
		self.credits.decrement_credit(vc);
		Some(self.pending.remove(0))
	}
}

/// Sink-side reassembly: flits are grouped by packet id; a tail completes a packet; a message
/// is delivered once every one of its packets has been completed.
pub struct SinkReassembler
{
	in_flight_packets: HashMap<u32,Vec<Rc<Flit>>>,
	messages_in_flight: HashMap<u64,MessageAssembly>,
}

struct MessageAssembly
{
	message: Rc<Message>,
	expected_packets: usize,
	completed_packets: usize,
}

impl SinkReassembler
{
	pub fn new() -> SinkReassembler
	{
		SinkReassembler{ in_flight_packets: HashMap::new(), messages_in_flight: HashMap::new() }
	}

	/// Registers a message that is about to start arriving, so completed packets can be
	/// attributed to it; `expected_packets` is known once the message is fragmented.
	pub fn register_message(&mut self, message: Rc<Message>, transaction: Transaction, expected_packets: usize)
	{
		self.messages_in_flight.insert(transaction.key(), MessageAssembly{ message, expected_packets, completed_packets: 0 });
	}

	/// Accepts one arriving flit, grouped by `packet_id`. Returns the owning transaction once
	/// its final packet completes (the caller then hands the message to the application and
	/// drops the bookkeeping entry).
	pub fn accept_flit(&mut self, packet_id: u32, transaction: Transaction, flit: Rc<Flit>) -> Option<Transaction>
	{
		let tail = flit.tail;
		let entry = self.in_flight_packets.entry(packet_id).or_default();
		entry.push(flit);
		if !tail { return None; }
		self.in_flight_packets.remove(&packet_id);
		let assembly = self.messages_in_flight.get_mut(&transaction.key()).expect("tail arrived for an unregistered message");
		assembly.completed_packets += 1;
		if assembly.completed_packets==assembly.expected_packets
		{
			self.messages_in_flight.remove(&transaction.key());
			Some(transaction)
		}
		else
		{
			None
		}
	}
}

impl Default for SinkReassembler { fn default() -> Self { SinkReassembler::new() } }

#[cfg(test)]
mod tests
{
	use super::*;

	fn message(size: usize) -> Rc<Message>
	{
		Rc::new(Message{
			transaction: Transaction::new(0,0,0),
			destination: vec![1],
			protocol_class: 0,
			owner_terminal: 0,
			requested_size: size,
			packets: RefCell::new(Vec::new()),
			creation_time: 0,
		})
	}

	#[test]
	fn fragments_into_expected_packet_count()
	{
		let msg = message(10);
		let packets = fragment_message(&msg,4,0);
		assert_eq!(packets.len(),3);
		assert_eq!(packets[0].size()+packets[1].size()+packets[2].size(),10);
	}

	#[test]
	#[should_panic(expected="zero-length")]
	fn rejects_zero_length_messages()
	{
		let msg = message(0);
		fragment_message(&msg,4,0);
	}

	#[test]
	fn source_injector_blocks_when_credits_exhausted()
	{
		let msg = message(1);
		let packets = fragment_message(&msg,1,0);
		let mut injector = SourceInjector::new(1,1);
		injector.enqueue(packets[0].clone());
		assert!(injector.try_send(0).is_some());
		injector.enqueue(packets[0].clone());
		assert!(injector.try_send(0).is_none(), "credits exhausted, must block");
	}

	#[test]
	fn sink_delivers_message_only_after_every_packet_completes()
	{
		let msg = message(2);
		let packets = fragment_message(&msg,1,0);
		let mut sink = SinkReassembler::new();
		let transaction = Transaction::new(0,0,0);
		sink.register_message(Rc::clone(&msg),transaction,packets.len());
		let first = sink.accept_flit(packets[0].packet_id,transaction,packets[0].flits[0].clone());
		assert!(first.is_none());
		let second = sink.accept_flit(packets[1].packet_id,transaction,packets[1].flits[0].clone());
		assert_eq!(second,Some(transaction));
	}
}
