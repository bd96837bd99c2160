/*!

A compile-time-populated registry mapping `(base-type, key-string) -> factory`, so a
configuration object's bareword name can select a concrete implementation without the core
knowing about every plug-in at compile time. One `HashMap` per plug-in category; an unknown key
at lookup time is a fatal configuration error (`Error::unknown_plugin_key`).

*/

use std::collections::HashMap;
use std::rc::Rc;

use crate::config_parser::ConfigurationValue;
use crate::error::Error;
use crate::routing::Routing;
use crate::injection::InjectionAlgorithm;

type RoutingFactory = Box<dyn Fn(&ConfigurationValue) -> Result<Rc<dyn Routing>,Error>>;
type InjectionFactory = Box<dyn Fn(&ConfigurationValue) -> Result<Rc<dyn InjectionAlgorithm>,Error>>;

/// Holds the registered factories for every plug-in category the core consumes. Concrete
/// topologies/routing algorithms/traffic patterns are external collaborators; they register
/// themselves here at program init rather than the core knowing their names.
#[derive(Default)]
pub struct Plugs
{
	pub routing: HashMap<String,RoutingFactory>,
	pub injection: HashMap<String,InjectionFactory>,
}

impl Plugs
{
	pub fn new() -> Plugs { Plugs::default() }

	pub fn register_routing(&mut self, key: &str, factory: RoutingFactory)
	{
		self.routing.insert(key.to_string(),factory);
	}
	pub fn register_injection(&mut self, key: &str, factory: InjectionFactory)
	{
		self.injection.insert(key.to_string(),factory);
	}

	pub fn build_routing(&self, cv: &ConfigurationValue) -> Result<Rc<dyn Routing>,Error>
	{
		let key = cv.object_name().ok_or_else(||Error::bad_argument(crate::source_location!()))?;
		let factory = self.routing.get(key).ok_or_else(||Error::unknown_plugin_key(crate::source_location!(),"routing".to_string(),key.to_string()))?;
		factory(cv)
	}
	pub fn build_injection(&self, cv: &ConfigurationValue) -> Result<Rc<dyn InjectionAlgorithm>,Error>
	{
		let key = cv.object_name().ok_or_else(||Error::bad_argument(crate::source_location!()))?;
		let factory = self.injection.get(key).ok_or_else(||Error::unknown_plugin_key(crate::source_location!(),"injection".to_string(),key.to_string()))?;
		factory(cv)
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::config_parser::parse;
	use crate::routing::FixedRouting;
	use crate::router::CandidateEgress;

	#[test]
	fn unknown_key_is_a_configuration_error()
	{
		let plugs = Plugs::new();
		let cv = parse("Nonexistent{}").unwrap();
		let err = plugs.build_routing(&cv);
		assert!(err.is_err());
	}

	#[test]
	fn registered_key_builds_successfully()
	{
		let mut plugs = Plugs::new();
		plugs.register_routing("Fixed",Box::new(|_cv|Ok(Rc::new(FixedRouting{ latency: 1, candidate: CandidateEgress{output_port:0,output_vc:0} }) as Rc<dyn Routing>)));
		let cv = parse("Fixed{}").unwrap();
		assert!(plugs.build_routing(&cv).is_ok());
	}
}
