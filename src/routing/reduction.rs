/*!

Reduction policies collapse a routing algorithm's raw candidate set using the congestion
oracle (`congestion::CongestionStatus`) before the VC allocator sees it.

*/

use crate::router::CandidateEgress;
use crate::routing::CandidateSet;
use crate::config_parser::ConfigurationValue;
use crate::error::Error;

#[derive(Debug,Clone,Copy,PartialEq)]
pub enum Reduction
{
	/// Keep every candidate as-is.
	None,
	/// Keep only the least congested candidate, preferring minimal-hop candidates if any exist.
	LeastCongestedMinimal,
	/// Keep all minimal-hop candidates if any exist, otherwise keep everything.
	AllMinimal,
	/// A weight function preserved from the system this is modeled on: it is defined strictly
	/// over non-minimal candidates plus a constant bias, and disregards minimal candidates'
	/// congestion entirely even when present. See DESIGN.md for why this disregard is kept
	/// rather than "fixed".
	WeightedNonMinimal{ independent_bias: f64 },
}

/// Parses a reduction policy from a configuration value: either a bareword literal
/// (`none`, `all_minimal`, `least_congested_minimal`) or an object for the parameterized
/// `weighted_non_minimal{independent_bias: N}`.
pub fn from_config(cv: &ConfigurationValue) -> Result<Reduction,Error>
{
	if let Some(literal) = cv.as_str()
	{
		return match literal
		{
			"none" => Ok(Reduction::None),
			"all_minimal" => Ok(Reduction::AllMinimal),
			"least_congested_minimal" => Ok(Reduction::LeastCongestedMinimal),
			_ => Err(Error::ill_formed_configuration(crate::source_location!(),cv.clone())),
		};
	}
	if cv.object_name()==Some("weighted_non_minimal")
	{
		let independent_bias = cv.get_field("independent_bias").and_then(|v|v.as_f64())
			.ok_or_else(||Error::missing_field(crate::source_location!(),"independent_bias".to_string()))?;
		return Ok(Reduction::WeightedNonMinimal{independent_bias});
	}
	Err(Error::ill_formed_configuration(crate::source_location!(),cv.clone()))
}

/// Applies `reduction` to `set`, consulting `congestion_of` for a candidate's `[0,1]` reading.
pub fn apply(reduction: Reduction, set: &CandidateSet, congestion_of: impl Fn(&CandidateEgress)->f64) -> CandidateSet
{
	assert!(!set.candidates.is_empty(), "routing produced an empty candidate set for a reachable destination");
	match reduction
	{
		Reduction::None => set.clone(),
		Reduction::AllMinimal =>
		{
			let minimal = set.minimal_subset();
			if minimal.candidates.is_empty() { set.clone() } else { minimal }
		},
		Reduction::LeastCongestedMinimal =>
		{
			let minimal = set.minimal_subset();
			let pool = if minimal.candidates.is_empty() { set } else { &minimal };
			let best = pool.candidates.iter().enumerate()
				.min_by(|(_,a),(_,b)|congestion_of(a).partial_cmp(&congestion_of(b)).unwrap())
				.map(|(i,_)|i).unwrap();
			CandidateSet{ candidates: vec![pool.candidates[best]], is_minimal: vec![pool.is_minimal[best]] }
		},
		Reduction::WeightedNonMinimal{independent_bias} =>
		{
			let non_minimal = CandidateSet{
				candidates: set.candidates.iter().zip(&set.is_minimal).filter(|(_,m)|!**m).map(|(c,_)|*c).collect(),
				is_minimal: set.is_minimal.iter().filter(|m|!**m).map(|_|false).collect(),
			};
			let pool = if non_minimal.candidates.is_empty() { set } else { &non_minimal };
			let best = pool.candidates.iter().enumerate()
				.min_by(|(_,a),(_,b)|
				{
					let wa = independent_bias + congestion_of(a);
					let wb = independent_bias + congestion_of(b);
					wa.partial_cmp(&wb).unwrap()
				})
				.map(|(i,_)|i).unwrap();
			CandidateSet{ candidates: vec![pool.candidates[best]], is_minimal: vec![pool.is_minimal[best]] }
		},
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	fn candidate_set() -> CandidateSet
	{
		CandidateSet{
			candidates: vec![
				CandidateEgress{output_port:0,output_vc:0},
				CandidateEgress{output_port:1,output_vc:0},
				CandidateEgress{output_port:2,output_vc:0},
			],
			is_minimal: vec![true,true,false],
		}
	}

	#[test]
	fn all_minimal_keeps_only_minimal_candidates()
	{
		let set = candidate_set();
		let reduced = apply(Reduction::AllMinimal,&set,|_|0.0);
		assert_eq!(reduced.candidates.len(),2);
		assert!(reduced.candidates.iter().all(|c|c.output_port!=2));
	}

	#[test]
	fn all_minimal_falls_back_to_everything_when_none_are_minimal()
	{
		let set = CandidateSet{ candidates: vec![CandidateEgress{output_port:0,output_vc:0}], is_minimal: vec![false] };
		let reduced = apply(Reduction::AllMinimal,&set,|_|0.0);
		assert_eq!(reduced.candidates.len(),1);
	}

	#[test]
	fn least_congested_minimal_picks_the_lowest_reading_among_minimal_candidates()
	{
		let set = candidate_set();
		let congestion = |c: &CandidateEgress| if c.output_port==1 { 0.1 } else { 0.9 };
		let reduced = apply(Reduction::LeastCongestedMinimal,&set,congestion);
		assert_eq!(reduced.candidates.len(),1);
		assert_eq!(reduced.candidates[0].output_port,1);
	}

	#[test]
	fn from_config_parses_barewords_and_the_parameterized_variant()
	{
		use crate::config_parser::parse;
		assert_eq!(from_config(&parse("none").unwrap()).unwrap(),Reduction::None);
		assert_eq!(from_config(&parse("all_minimal").unwrap()).unwrap(),Reduction::AllMinimal);
		assert_eq!(from_config(&parse("weighted_non_minimal{independent_bias: 0.5}").unwrap()).unwrap(),Reduction::WeightedNonMinimal{independent_bias:0.5});
	}

	#[test]
	fn from_config_rejects_unknown_literal()
	{
		use crate::config_parser::parse;
		assert!(from_config(&parse("bogus").unwrap()).is_err());
	}

	#[test]
	fn weighted_non_minimal_ignores_minimal_candidates_entirely()
	{
		let set = candidate_set();
		// Port 0 (minimal) is given an artificially low congestion, but the weighted reduction
		// must never consider it since it is a minimal candidate.
		let congestion = |c: &CandidateEgress| if c.output_port==0 { 0.0 } else { 0.5 };
		let reduced = apply(Reduction::WeightedNonMinimal{independent_bias:1.0},&set,congestion);
		assert_eq!(reduced.candidates.len(),1);
		assert_eq!(reduced.candidates[0].output_port,2);
	}
}
