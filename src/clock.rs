/*!

Maps a logical clock (channel or core) to its cycle period and computes cycle-boundary
alignment, so components scheduled off different clocks still land on event-queue ticks.

*/

use crate::event::Time;

/// A named clock with a fixed integer period, expressed in the same opaque time unit as the
/// event scheduler.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct ClockDomain
{
	period: Time,
}

impl ClockDomain
{
	pub fn new(period: Time) -> ClockDomain
	{
		assert!(period>0,"a clock domain must have a strictly positive period");
		ClockDomain{ period }
	}
	pub fn period(&self) -> Time { self.period }
	/// The smallest multiple of `period` that is `>= now`.
	pub fn next_boundary_at_or_after(&self, now: Time) -> Time
	{
		let remainder = now % self.period;
		if remainder==0 { now } else { now + (self.period - remainder) }
	}
	/// Cycles elapsed up to and including `now`.
	pub fn cycle_index(&self, now: Time) -> Time { now / self.period }
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn aligns_to_next_boundary()
	{
		let clock = ClockDomain::new(4);
		assert_eq!(clock.next_boundary_at_or_after(0),0);
		assert_eq!(clock.next_boundary_at_or_after(1),4);
		assert_eq!(clock.next_boundary_at_or_after(4),4);
		assert_eq!(clock.next_boundary_at_or_after(5),8);
	}

	#[test]
	fn cycle_index_floors()
	{
		let clock = ClockDomain::new(3);
		assert_eq!(clock.cycle_index(8),2);
	}
}
