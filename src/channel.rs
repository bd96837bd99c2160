/*!

A unidirectional link carrying at most one flit per VC per channel cycle, with a fixed integer
propagation latency. Internally a fixed-depth FIFO pipeline: a flit inserted at cycle `t`
emerges at cycle `t + latency`.

*/

use std::collections::VecDeque;
use std::rc::Rc;

use crate::event::Time;
use crate::packet::Flit;

struct PipelineEntry
{
	emerge_at: Time,
	flit: Rc<Flit>,
}

/// A single channel. Monitoring counters (per-VC flit counts and utilization) only accumulate
/// while `monitoring` is enabled, matching the workload coordinator's measurement window.
pub struct Channel
{
	latency: Time,
	pipeline: VecDeque<PipelineEntry>,
	monitoring: bool,
	per_vc_flit_count: Vec<u64>,
	cycles_monitored: u64,
	cycles_busy: u64,
}

impl Channel
{
	pub fn new(latency: Time, num_vcs: usize) -> Channel
	{
		assert!(latency>0);
		Channel{
			latency,
			pipeline: VecDeque::new(),
			monitoring: false,
			per_vc_flit_count: vec![0;num_vcs],
			cycles_monitored: 0,
			cycles_busy: 0,
		}
	}

	pub fn latency(&self) -> Time { self.latency }

	/// Inserts `flit` at cycle `t`; at most one flit may be set per cycle.
	pub fn set_next_flit(&mut self, current_cycle: Time, flit: Rc<Flit>)
	{
		if let Some(last) = self.pipeline.back()
		{
			assert!(last.emerge_at != current_cycle + self.latency, "at most one flit may be set per channel cycle");
		}
		if self.monitoring
		{
			if let Some(vc) = flit.virtual_channel() { self.per_vc_flit_count[vc] += 1; }
			self.cycles_busy += 1;
		}
		self.pipeline.push_back(PipelineEntry{ emerge_at: current_cycle + self.latency, flit });
	}

	/// Pops any flit(s) whose emergence cycle is `<= current_cycle` — ordinarily exactly one,
	/// since inserts are already spaced by at least `1` channel cycle by `set_next_flit`'s
	/// invariant.
	pub fn pop_ready(&mut self, current_cycle: Time) -> Option<Rc<Flit>>
	{
		if self.pipeline.front().map_or(false,|e|e.emerge_at<=current_cycle)
		{
			Some(self.pipeline.pop_front().unwrap().flit)
		}
		else
		{
			None
		}
	}

	pub fn begin_monitoring(&mut self)
	{
		self.monitoring = true;
		self.per_vc_flit_count.iter_mut().for_each(|c|*c=0);
		self.cycles_monitored = 0;
		self.cycles_busy = 0;
	}

	/// Stops monitoring and flushes the accumulated counters to the channel log (represented
	/// here as the returned summary; the concrete append-only sink is out of scope).
	pub fn end_monitoring(&mut self) -> ChannelMonitoringSummary
	{
		self.monitoring = false;
		ChannelMonitoringSummary{
			per_vc_flit_count: self.per_vc_flit_count.clone(),
			utilization: if self.cycles_monitored==0 { 0.0 } else { self.cycles_busy as f64 / self.cycles_monitored as f64 },
		}
	}

	pub fn tick_monitoring_cycle(&mut self)
	{
		if self.monitoring { self.cycles_monitored += 1; }
	}
}

#[derive(Debug,Clone)]
pub struct ChannelMonitoringSummary
{
	pub per_vc_flit_count: Vec<u64>,
	pub utilization: f64,
}
