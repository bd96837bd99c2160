/*!

Accumulates the statistics a periodic report or a final summary is built from. The main
measures are documented as fields of [`StatisticMeasurement`]. Everything here is indexed by
plain `usize` server/link ids rather than by a concrete topology, since the topology itself is
an external collaborator.

*/

use crate::channel::ChannelMonitoringSummary;
use crate::packet::{Message,Packet};
use crate::event::Time;

/// Per-server counters, reset at the start of each measurement window.
#[derive(Debug,Clone,Default)]
pub struct ServerStatistics
{
	pub created_flits: usize,
	pub consumed_flits: usize,
	pub consumed_messages: usize,
	pub total_message_delay: u64,
	/// The last cycle in which this server injected a flit, or `0`.
	pub cycle_last_created_flit: Time,
	/// The last cycle in which this server finished consuming a message, or `0`.
	pub cycle_last_consumed_message: Time,
	/// Times the injection algorithm declined to generate because the source queue was full.
	pub missed_generations: usize,
}

impl ServerStatistics
{
	pub fn new() -> ServerStatistics { ServerStatistics::default() }
	fn reset(&mut self)
	{
		self.created_flits = 0;
		self.consumed_flits = 0;
		self.consumed_messages = 0;
		self.total_message_delay = 0;
		self.missed_generations = 0;
	}
}

/// Statistics captured for one router-to-router link.
#[derive(Debug,Clone,Default)]
pub struct LinkStatistics
{
	pub flit_arrivals: usize,
}

impl LinkStatistics
{
	fn reset(&mut self) { self.flit_arrivals = 0; }
	pub fn accumulate(&mut self, summary: &ChannelMonitoringSummary)
	{
		self.flit_arrivals += summary.per_vc_flit_count.iter().sum::<u64>() as usize;
	}
}

/// One measurement window's worth of accumulated counters. `Default::default()` gives the
/// empty window produced at every reset; `begin_cycle` must be set explicitly afterward.
#[derive(Debug,Clone,Default)]
pub struct StatisticMeasurement
{
	pub begin_cycle: Time,
	pub created_flits: usize,
	pub consumed_flits: usize,
	pub consumed_packets: usize,
	pub consumed_messages: usize,
	pub total_message_delay: u64,
	pub total_packet_network_delay: u64,
	pub total_packet_hops: u64,
	pub total_packet_per_hop_count: Vec<usize>,
	/// Indexed by virtual channel: how many times a flit advanced on a link using that VC.
	pub virtual_channel_usage: Vec<usize>,
}

impl StatisticMeasurement
{
	/// The Jain fairness index over per-server injected-flit counts; close to `1` when every
	/// server generates a similar load, regardless of its magnitude.
	pub fn jain_server_created_flits(&self, servers: &[ServerStatistics]) -> f64
	{
		jain_index(servers.iter().map(|s|s.created_flits as f64))
	}
	/// The Jain fairness index over per-server consumed-flit counts.
	pub fn jain_server_consumed_flits(&self, servers: &[ServerStatistics]) -> f64
	{
		jain_index(servers.iter().map(|s|s.consumed_flits as f64))
	}
}

fn jain_index(values: impl Iterator<Item=f64> + Clone) -> f64
{
	let n = values.clone().count() as f64;
	let sum: f64 = values.clone().sum();
	let sum_sq: f64 = values.map(|x|x*x).sum();
	if sum_sq==0.0 { return 1.0; }
	sum*sum/sum_sq/n
}

/// All global statistics captured over the lifetime of a simulation, plus the periodic window
/// used for temporal reports.
#[derive(Debug)]
pub struct Statistics
{
	pub servers: Vec<ServerStatistics>,
	pub links: Vec<LinkStatistics>,
	pub current_measurement: StatisticMeasurement,
	/// Nonzero enables periodic measurements at intervals of this many cycles.
	pub temporal_step: Time,
	pub temporal_statistics: Vec<StatisticMeasurement>,
	pub columns: Vec<ReportColumn>,
}

impl Statistics
{
	pub fn new(num_servers: usize, num_links: usize, temporal_step: Time) -> Statistics
	{
		Statistics{
			servers: vec![ServerStatistics::new(); num_servers],
			links: vec![LinkStatistics::default(); num_links],
			current_measurement: StatisticMeasurement::default(),
			temporal_step,
			temporal_statistics: Vec::new(),
			columns: vec![
				ReportColumnKind::BeginEndCycle.into(),
				ReportColumnKind::InjectedLoad.into(),
				ReportColumnKind::AcceptedLoad.into(),
				ReportColumnKind::AveragePacketHops.into(),
				ReportColumnKind::AverageMessageDelay.into(),
				ReportColumnKind::ServerGenerationJainIndex.into(),
			],
		}
	}

	/// Header line for the columns configured to be periodically logged.
	pub fn header(&self) -> String
	{
		self.columns.iter().map(|c|c.header()).collect()
	}
	/// Formats the current values of the periodic columns, for a `log::info!` call by the
	/// caller driving the measurement window.
	pub fn format(&self, next_cycle: Time) -> String
	{
		self.columns.iter().map(|c|c.format(self,next_cycle)).collect()
	}

	/// Forgets all captured statistics and begins a fresh window at `next_cycle`.
	pub fn reset(&mut self, next_cycle: Time)
	{
		self.current_measurement = StatisticMeasurement{ begin_cycle: next_cycle, ..Default::default() };
		for server in self.servers.iter_mut() { server.reset(); }
		for link in self.links.iter_mut() { link.reset(); }
	}

	pub fn track_created_flit(&mut self, server: usize, cycle: Time)
	{
		self.servers[server].created_flits += 1;
		self.servers[server].cycle_last_created_flit = cycle;
		self.current_measurement.created_flits += 1;
		if let Some(m) = self.current_temporal_measurement(cycle) { m.created_flits += 1; }
	}

	pub fn track_consumed_flit(&mut self, server: usize, cycle: Time)
	{
		self.servers[server].consumed_flits += 1;
		self.current_measurement.consumed_flits += 1;
		if let Some(m) = self.current_temporal_measurement(cycle) { m.consumed_flits += 1; }
	}

	/// Called when a server consumes a packet's tail flit; `hops` is the number of
	/// router-to-router hops travelled, `injected_at` the cycle the packet entered the network.
	pub fn track_consumed_packet(&mut self, packet: &Packet, hops: usize, injected_at: Time, cycle: Time)
	{
		let delay = cycle - injected_at;
		self.current_measurement.consumed_packets += 1;
		self.current_measurement.total_packet_network_delay += delay;
		self.current_measurement.total_packet_hops += hops as u64;
		if self.current_measurement.total_packet_per_hop_count.len() <= hops
		{
			self.current_measurement.total_packet_per_hop_count.resize(hops+1,0);
		}
		self.current_measurement.total_packet_per_hop_count[hops] += 1;
		let _ = packet;
		if let Some(m) = self.current_temporal_measurement(cycle)
		{
			m.consumed_packets += 1;
			m.total_packet_network_delay += delay;
			m.total_packet_hops += hops as u64;
		}
	}

	pub fn track_consumed_message(&mut self, server: usize, message: &Message, cycle: Time)
	{
		let delay = cycle - message.creation_time;
		self.servers[server].consumed_messages += 1;
		self.servers[server].total_message_delay += delay;
		self.servers[server].cycle_last_consumed_message = cycle;
		self.current_measurement.consumed_messages += 1;
		self.current_measurement.total_message_delay += delay;
		if let Some(m) = self.current_temporal_measurement(cycle)
		{
			m.consumed_messages += 1;
			m.total_message_delay += delay;
		}
	}

	pub fn track_missed_generation(&mut self, server: usize)
	{
		self.servers[server].missed_generations += 1;
	}

	/// Called once per flit hop, with the VC it traversed on.
	pub fn track_flit_hop(&mut self, vc: usize, cycle: Time)
	{
		if self.current_measurement.virtual_channel_usage.len() <= vc
		{
			self.current_measurement.virtual_channel_usage.resize(vc+1,0);
		}
		self.current_measurement.virtual_channel_usage[vc] += 1;
		if let Some(m) = self.current_temporal_measurement(cycle)
		{
			if m.virtual_channel_usage.len() <= vc { m.virtual_channel_usage.resize(vc+1,0); }
			m.virtual_channel_usage[vc] += 1;
		}
	}

	pub fn accumulate_link(&mut self, link: usize, summary: &ChannelMonitoringSummary)
	{
		self.links[link].accumulate(summary);
	}

	fn current_temporal_measurement(&mut self, cycle: Time) -> Option<&mut StatisticMeasurement>
	{
		if self.temporal_step==0 { return None; }
		let index = (cycle / self.temporal_step) as usize;
		if self.temporal_statistics.len() <= index
		{
			self.temporal_statistics.resize_with(index+1, StatisticMeasurement::default);
			self.temporal_statistics[index].begin_cycle = index as Time * self.temporal_step;
		}
		Some(&mut self.temporal_statistics[index])
	}
}

/// The available statistical columns for periodic reports; each knows its header and how to
/// format itself from a [`Statistics`] snapshot.
#[derive(Debug,Clone,Copy)]
#[allow(dead_code)]
enum ReportColumnKind
{
	BeginEndCycle,
	InjectedLoad,
	AcceptedLoad,
	ServerGenerationJainIndex,
	ServerConsumptionJainIndex,
	AverageMessageDelay,
	AveragePacketNetworkDelay,
	AveragePacketHops,
}

impl ReportColumnKind
{
	fn name(&self) -> &'static str
	{
		match self
		{
			ReportColumnKind::BeginEndCycle => "cycle_begin-cycle_end",
			ReportColumnKind::InjectedLoad => "injected_load",
			ReportColumnKind::AcceptedLoad => "accepted_load",
			ReportColumnKind::ServerGenerationJainIndex => "server_generation_jain_index",
			ReportColumnKind::ServerConsumptionJainIndex => "server_consumption_jain_index",
			ReportColumnKind::AverageMessageDelay => "average_message_delay",
			ReportColumnKind::AveragePacketNetworkDelay => "average_packet_network_delay",
			ReportColumnKind::AveragePacketHops => "average_packet_hops",
		}
	}
}

/// A statistical column with its display width.
#[derive(Debug,Clone)]
pub struct ReportColumn
{
	kind: ReportColumnKind,
	width: usize,
}

impl ReportColumn
{
	fn header(&self) -> String { format!("{name:width$}",name=self.kind.name(),width=self.width) }
	fn format(&self, statistics: &Statistics, next_cycle: Time) -> String
	{
		let cycles = (next_cycle - statistics.current_measurement.begin_cycle + 1) as f64;
		let num_servers = statistics.servers.len() as f64;
		let value = match self.kind
		{
			ReportColumnKind::BeginEndCycle => format!("{}-{}",statistics.current_measurement.begin_cycle,next_cycle-1),
			ReportColumnKind::InjectedLoad => format!("{}",statistics.current_measurement.created_flits as f64/cycles/num_servers),
			ReportColumnKind::AcceptedLoad => format!("{}",statistics.current_measurement.consumed_flits as f64/cycles/num_servers),
			ReportColumnKind::ServerGenerationJainIndex => format!("{}",statistics.current_measurement.jain_server_created_flits(&statistics.servers)),
			ReportColumnKind::ServerConsumptionJainIndex => format!("{}",statistics.current_measurement.jain_server_consumed_flits(&statistics.servers)),
			ReportColumnKind::AverageMessageDelay => format!("{}",statistics.current_measurement.total_message_delay as f64/statistics.current_measurement.consumed_messages as f64),
			ReportColumnKind::AveragePacketNetworkDelay => format!("{}",statistics.current_measurement.total_packet_network_delay as f64/statistics.current_measurement.consumed_packets as f64),
			ReportColumnKind::AveragePacketHops => format!("{}",statistics.current_measurement.total_packet_hops as f64/statistics.current_measurement.consumed_packets as f64),
		};
		format!("{value:width$}",value=value,width=self.width)
	}
}

impl From<ReportColumnKind> for ReportColumn
{
	fn from(kind: ReportColumnKind) -> ReportColumn
	{
		let width = 1 + kind.name().len();
		ReportColumn{ kind, width }
	}
}
