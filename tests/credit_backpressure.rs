use std::cell::RefCell;
use std::rc::Rc;

use fabricsim::interface::{fragment_message,SourceInjector};
use fabricsim::packet::{Message,Transaction};

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

/// Under saturation (credits exhausted faster than they are returned) the source injector must
/// block rather than overrun the downstream buffer; once a credit is returned, exactly one more
/// send becomes possible.
#[test]
fn source_injector_resumes_after_a_credit_is_returned()
{
	let mut injector = SourceInjector::new(1,2);
	for _ in 0..3
	{
		let msg = message(1);
		let packets = fragment_message(&msg,1,0);
		injector.enqueue(packets[0].clone());
	}

	assert!(injector.try_send(0).is_some());
	assert!(injector.try_send(0).is_some());
	assert!(injector.try_send(0).is_none(), "both credits spent, third send must block");

	injector.credits.increment_credit(0);
	assert!(injector.try_send(0).is_some(), "a credit returned and a packet is still pending, so the send must now succeed");
	assert!(injector.try_send(0).is_none(), "no packets left to send");
}
