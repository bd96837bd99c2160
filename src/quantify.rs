/*!

A minimal memory-accounting trait, used by the statistics layer to report how many bytes a
component's dynamic state occupies (queues grow and shrink over a run; this is more informative
than `size_of` alone).

*/

/// Something that can report an approximation of its own heap footprint.
pub trait Quantifiable
{
	fn total_memory(&self) -> usize;
}

impl Quantifiable for usize { fn total_memory(&self) -> usize { std::mem::size_of::<usize>() } }
impl Quantifiable for u64 { fn total_memory(&self) -> usize { std::mem::size_of::<u64>() } }
impl Quantifiable for f64 { fn total_memory(&self) -> usize { std::mem::size_of::<f64>() } }
impl Quantifiable for bool { fn total_memory(&self) -> usize { std::mem::size_of::<bool>() } }

impl<T:Quantifiable> Quantifiable for Vec<T>
{
	fn total_memory(&self) -> usize
	{
		std::mem::size_of::<Self>() + self.iter().map(|x|x.total_memory()).sum::<usize>()
	}
}

impl<T:Quantifiable> Quantifiable for std::collections::VecDeque<T>
{
	fn total_memory(&self) -> usize
	{
		std::mem::size_of::<Self>() + self.iter().map(|x|x.total_memory()).sum::<usize>()
	}
}

impl<T:Quantifiable> Quantifiable for Option<T>
{
	fn total_memory(&self) -> usize
	{
		std::mem::size_of::<Self>() + self.as_ref().map_or(0,|x|x.total_memory())
	}
}
