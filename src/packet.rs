/*!

The flit/packet/message data hierarchy. Flits are the atomic transfer unit and are owned by
their packet; packets are owned by their message; messages are owned by the application until
delivered.

*/

use std::rc::{Rc,Weak};
use std::cell::RefCell;

use crate::event::Time;
use crate::quantify::Quantifiable;

/// A 64-bit transaction key packed as `(appId:8 | termId:24 | msgId:32)`.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub struct Transaction(u64);

impl Transaction
{
	pub fn new(app_id: u8, term_id: u32, msg_id: u32) -> Transaction
	{
		assert!(term_id < (1<<24), "termId must fit in 24 bits");
		let key = ((app_id as u64) << 56) | ((term_id as u64) << 32) | (msg_id as u64);
		Transaction(key)
	}
	pub fn app_id(&self) -> u8 { (self.0 >> 56) as u8 }
	pub fn term_id(&self) -> u32 { ((self.0 >> 32) & 0xFF_FFFF) as u32 }
	pub fn msg_id(&self) -> u32 { (self.0 & 0xFFFF_FFFF) as u32 }
	pub fn key(&self) -> u64 { self.0 }
}

/// A flit, the atomic transfer unit. Holds a non-owning back-reference to its packet.
#[derive(Debug)]
pub struct Flit
{
	pub packet: Weak<Packet>,
	/// Index within the packet; `0` iff `head`, `packet.size()-1` iff `tail`.
	pub index: usize,
	pub head: bool,
	pub tail: bool,
	/// The VC this flit is currently assigned to; mutated as it is routed hop by hop.
	pub virtual_channel: RefCell<Option<usize>>,
	pub creation_time: Time,
}

impl Flit
{
	pub fn virtual_channel(&self) -> Option<usize> { *self.virtual_channel.borrow() }
	pub fn set_virtual_channel(&self, vc: usize) { *self.virtual_channel.borrow_mut() = Some(vc); }
}

impl Quantifiable for Flit
{
	fn total_memory(&self) -> usize { std::mem::size_of::<Flit>() }
}

/// An ordered, non-empty sequence of flits sharing a stable packet id and (once its head wins
/// VC allocation) a single VC until the tail departs.
#[derive(Debug)]
pub struct Packet
{
	pub message: Weak<Message>,
	pub packet_id: u32,
	pub flits: Vec<Rc<Flit>>,
}

impl Packet
{
	pub fn size(&self) -> usize { self.flits.len() }
	pub fn check_invariants(&self)
	{
		assert!(!self.flits.is_empty(),"a packet must have at least one flit");
		assert!(self.flits[0].head,"first flit must be the head");
		assert!(self.flits.last().unwrap().tail,"last flit must be the tail");
		for (i,flit) in self.flits.iter().enumerate()
		{
			assert_eq!(flit.index,i);
			assert_eq!(flit.head, i==0);
			assert_eq!(flit.tail, i==self.flits.len()-1);
		}
	}
}

impl Quantifiable for Packet
{
	fn total_memory(&self) -> usize { std::mem::size_of::<Packet>() + self.flits.total_memory() }
}

/// An application-level unit; fragments into packets at the source interface and is
/// reassembled at the destination interface.
#[derive(Debug)]
pub struct Message
{
	pub transaction: Transaction,
	pub destination: Vec<usize>,
	pub protocol_class: usize,
	pub owner_terminal: usize,
	/// The total flit count requested at creation; fragmentation must produce packets summing
	/// to exactly this, per the `size == Sum packet.size` invariant.
	pub requested_size: usize,
	pub packets: RefCell<Vec<Rc<Packet>>>,
	pub creation_time: Time,
}

impl Message
{
	/// The size once fragmented (`Sum packet.size`); equals `requested_size` by invariant.
	pub fn fragmented_size(&self) -> usize
	{
		self.packets.borrow().iter().map(|p|p.size()).sum()
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	fn build_packet(num_flits: usize) -> Packet
	{
		let flits = (0..num_flits).map(|i|Rc::new(Flit{
			packet: Weak::new(),
			index: i,
			head: i==0,
			tail: i==num_flits-1,
			virtual_channel: RefCell::new(None),
			creation_time: 0,
		})).collect();
		Packet{ message: Weak::new(), packet_id: 0, flits }
	}

	#[test]
	fn single_flit_packet_is_head_and_tail()
	{
		let packet = build_packet(1);
		packet.check_invariants();
		assert!(packet.flits[0].head && packet.flits[0].tail);
	}

	#[test]
	fn multi_flit_packet_has_exactly_one_head_and_tail()
	{
		let packet = build_packet(4);
		packet.check_invariants();
		let heads = packet.flits.iter().filter(|f|f.head).count();
		let tails = packet.flits.iter().filter(|f|f.tail).count();
		assert_eq!(heads,1);
		assert_eq!(tails,1);
	}

	#[test]
	fn transaction_key_round_trips_fields()
	{
		let t = Transaction::new(12, 5000, 99);
		assert_eq!(t.app_id(),12);
		assert_eq!(t.term_id(),5000);
		assert_eq!(t.msg_id(),99);
	}

	#[test]
	#[should_panic]
	fn transaction_rejects_oversized_term_id()
	{
		Transaction::new(0, 1<<24, 0);
	}
}
