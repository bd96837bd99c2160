/*!

This module is for managing errors in fabricsim. To avoid invoking `panic!` in favor of a more
graceful exit. Cases that should never happen in a correctly constructed simulation (a dual
winner in a matching, a flit on the wrong VC, scheduling into the past) are kept as `panic!`;
those are invariant violations, not recoverable conditions.

Instead of `expect` or `unwrap_or_else` try
* `map_err` like in `.map_err(|e|Error::could_not_parse_file(source_location!(),path,e))?;`
* `ok_or_else` like in `.ok_or_else( ||Error::missing_field(source_location!(),"num_vcs".to_string()) )?;

Instead of `panic!` for a configuration-time problem, return an error with
`return Err( Error::unknown_plugin_key(source_location!(),base_type,key) );`

The `error!` macro eases the writing a little. E.g., `error!(unknown_plugin_key,"router".to_string(),key)`.

To include arbitrary messages use `with_message`, e.g.
`Error::undetermined(source_location!()).with_message(format!("bad vc count: {}",n))`.

*/

use std::fmt::{Display,Formatter};

use crate::config_parser::ConfigurationValue;

/// The main Error class to be used in each `Result<Whatever,Error>`.
#[derive(Debug)]
pub struct Error
{
	pub source_location: SourceLocation,
	pub kind: ErrorKind,
	pub message: Option<String>,
}

/// A source code location where an error occurred.
#[derive(Debug)]
pub struct SourceLocation
{
	pub file: &'static str,
	pub line: u32,
	pub column: u32,
}

#[derive(Debug)]
pub enum ErrorKind
{
	/// A plug-in registry lookup by string key found nothing registered under that key.
	UnknownPluginKey{
		base_type: String,
		key: String,
	},
	/// A required field was absent from a configuration object.
	MissingField{
		field: String,
	},
	/// A configuration value was present but had the wrong shape or an out-of-range value.
	IllFormedConfiguration{
		value: ConfigurationValue,
	},
	/// The configuration text could not be parsed.
	CouldNotParseConfiguration{
		position: usize,
	},
	/// Some method received a bad argument. There should be an attached message with further explanation.
	BadArgument,
	/// Any other error. Better to add new variants than to use this one.
	Undetermined,
}

// source_location!()
#[macro_export]
macro_rules! source_location{
	() => {
		$crate::error::SourceLocation{
			file: file!(),
			line: line!(),
			column: column!(),
		}
	}
}
#[macro_export]
macro_rules! error{
	($kind:ident,$($args:tt)*) => {{
		$crate::error::Error::$kind( $crate::source_location!(), $($args)* )
	}};
	($kind:ident) => {{
		$crate::error::Error::$kind( $crate::source_location!() )
	}};
}

use ErrorKind::*;

impl Error
{
	pub fn new(source_location:SourceLocation, kind:ErrorKind) -> Error
	{
		Error{
			source_location,
			kind,
			message:None,
		}
	}
	pub fn with_message(mut self,message:String) -> Error
	{
		match self.message
		{
			Some(ref mut text) => *text += &message,
			None => self.message=Some(message),
		}
		self
	}
	pub fn unknown_plugin_key(source_location:SourceLocation,base_type:String,key:String)->Error
	{
		Error{
			source_location,
			kind: UnknownPluginKey{base_type,key},
			message:None,
		}
	}
	pub fn missing_field(source_location:SourceLocation,field:String)->Error
	{
		Error{
			source_location,
			kind: MissingField{field},
			message:None,
		}
	}
	pub fn ill_formed_configuration(source_location:SourceLocation,value:ConfigurationValue)->Error
	{
		Error{
			source_location,
			kind: IllFormedConfiguration{value},
			message:None,
		}
	}
	pub fn could_not_parse_configuration(source_location:SourceLocation,position:usize)->Error
	{
		Error{
			source_location,
			kind: CouldNotParseConfiguration{position},
			message:None,
		}
	}
	pub fn bad_argument(source_location:SourceLocation)->Error
	{
		Error{
			source_location,
			kind: BadArgument,
			message:None,
		}
	}
	pub fn undetermined(source_location:SourceLocation)->Error
	{
		Error{
			source_location,
			kind: Undetermined,
			message:None,
		}
	}
}

impl Display for Error
{
	fn fmt(&self, formatter: &mut Formatter<'_>) -> Result<(), std::fmt::Error>
	{
		let Error{source_location:location,kind,message} = self;
		writeln!(formatter,"Error at file {} at line {} column {}.",location.file,location.line,location.column)?;
		if let Some(text) = message
		{
			writeln!(formatter,"{}",text)?;
		}
		kind.fmt(formatter)?;
		Ok(())
	}
}

impl Display for ErrorKind
{
	fn fmt(&self, formatter: &mut Formatter<'_>) -> Result<(), std::fmt::Error>
	{
		match self
		{
			UnknownPluginKey{base_type,key} =>
			{
				writeln!(formatter,"UnknownPluginKey error: no {} is registered under the key \"{}\".",base_type,key)?;
			},
			MissingField{field} =>
			{
				writeln!(formatter,"MissingField error: the configuration object is missing required field \"{}\".",field)?;
			},
			IllFormedConfiguration{value} =>
			{
				writeln!(formatter,"IllFormedConfiguration error: the following configuration value could not be interpreted:\n{}",value)?;
			},
			CouldNotParseConfiguration{position} =>
			{
				writeln!(formatter,"CouldNotParseConfiguration error: parsing failed at byte offset {}.",position)?;
			},
			BadArgument =>
			{
				writeln!(formatter,"BadArgument: bad arguments given to a function.")?;
			},
			Undetermined =>
			{
				writeln!(formatter,"Undetermined error: a generic error. The concrete error should be more specific.")?;
			},
		}
		Ok(())
	}
}

impl std::error::Error for Error {}
