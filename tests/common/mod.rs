use fabricsim::config_parser::ConfigurationValue;

/// Encapsulates the parameters needed to build a `Separable{...}` allocator configuration.
pub struct SeparableAllocatorBuilder
{
	pub iterations: usize,
	pub slip_latch: bool,
}

/// Creates a configuration value for a separable allocator.
pub fn create_separable_allocator(arg: SeparableAllocatorBuilder) -> ConfigurationValue
{
	ConfigurationValue::Object("Separable".to_string(), vec![
		("iterations".to_string(), ConfigurationValue::Number(arg.iterations as f64)),
		("slip_latch".to_string(), ConfigurationValue::Bool(arg.slip_latch)),
	])
}

/// Encapsulates the parameters needed to build a router-core configuration shared by both
/// router variants.
pub struct RouterCoreConfigBuilder
{
	pub num_ports: usize,
	pub num_vcs: usize,
	pub buffer_size: usize,
	pub allocator: ConfigurationValue,
	pub reduction: ConfigurationValue,
}

/// Creates a configuration value for a router core.
pub fn create_router_core_config(arg: RouterCoreConfigBuilder) -> ConfigurationValue
{
	ConfigurationValue::Object("RouterCore".to_string(), vec![
		("num_ports".to_string(), ConfigurationValue::Number(arg.num_ports as f64)),
		("num_vcs".to_string(), ConfigurationValue::Number(arg.num_vcs as f64)),
		("buffer_size".to_string(), ConfigurationValue::Number(arg.buffer_size as f64)),
		("allocator".to_string(), arg.allocator),
		("reduction".to_string(), arg.reduction),
	])
}
