/*!

A small typed configuration tree and a recursive-descent parser for it, in the style used
throughout the crate to describe topologies, routers, routing algorithms and traffic: not JSON,
but a terser domain-specific grammar where a plug-in selection reads as a bareword name followed
by a brace-delimited field list, e.g.

```text
Basic{
	virtual_channels: 4,
	buffer_size: 32,
	bubble: true,
}
```

*/

use std::fmt::{Display,Formatter};

/// A node of a parsed configuration tree.
#[derive(Debug,Clone,PartialEq)]
pub enum ConfigurationValue
{
	/// A numeric literal. The grammar has no integer/float distinction; callers cast as needed.
	Number(f64),
	/// A bareword, used as a plug-in key or an enum-like tag (e.g. `vc`, `port_ave`).
	Literal(String),
	/// A quoted string.
	Text(String),
	Bool(bool),
	Array(Vec<ConfigurationValue>),
	/// A named record: the name selects a plug-in, the pairs are its fields.
	Object(String,Vec<(String,ConfigurationValue)>),
	/// A deferred arithmetic expression over named variables, for simple derived quantities.
	Expr(String),
	None,
}

impl Display for ConfigurationValue
{
	fn fmt(&self, formatter: &mut Formatter<'_>) -> Result<(), std::fmt::Error>
	{
		match self
		{
			ConfigurationValue::Number(x) => write!(formatter,"{}",x),
			ConfigurationValue::Literal(s) => write!(formatter,"{}",s),
			ConfigurationValue::Text(s) => write!(formatter,"\"{}\"",s),
			ConfigurationValue::Bool(b) => write!(formatter,"{}",b),
			ConfigurationValue::Array(v) =>
			{
				write!(formatter,"[")?;
				for (i,x) in v.iter().enumerate()
				{
					if i>0 { write!(formatter,",")?; }
					write!(formatter,"{}",x)?;
				}
				write!(formatter,"]")
			},
			ConfigurationValue::Object(name,pairs) =>
			{
				write!(formatter,"{}{{",name)?;
				for (k,v) in pairs.iter()
				{
					write!(formatter,"{}:{},",k,v)?;
				}
				write!(formatter,"}}")
			},
			ConfigurationValue::Expr(s) => write!(formatter,"={}",s),
			ConfigurationValue::None => write!(formatter,"None"),
		}
	}
}

impl ConfigurationValue
{
	/// Fetch a field of an `Object` by name. Used by `match_object_panic!`.
	pub fn get_field(&self,field:&str) -> Option<&ConfigurationValue>
	{
		match self
		{
			ConfigurationValue::Object(_,pairs) => pairs.iter().find(|(k,_)|k==field).map(|(_,v)|v),
			_ => None,
		}
	}
	pub fn as_f64(&self) -> Option<f64>
	{
		match self { ConfigurationValue::Number(x) => Some(*x), _ => None }
	}
	pub fn as_usize(&self) -> Option<usize>
	{
		self.as_f64().map(|x|x as usize)
	}
	pub fn as_bool(&self) -> Option<bool>
	{
		match self { ConfigurationValue::Bool(b) => Some(*b), _ => None }
	}
	pub fn as_str(&self) -> Option<&str>
	{
		match self
		{
			ConfigurationValue::Literal(s) | ConfigurationValue::Text(s) => Some(s),
			_ => None,
		}
	}
	pub fn as_array(&self) -> Option<&[ConfigurationValue]>
	{
		match self { ConfigurationValue::Array(v) => Some(v), _ => None }
	}
	/// The bareword name of an `Object`, used to dispatch on a plug-in registry.
	pub fn object_name(&self) -> Option<&str>
	{
		match self { ConfigurationValue::Object(name,_) => Some(name), _ => None }
	}
}

/// Extracts typed fields out of an `Object`'s pair list, panicking with the offending field name
/// on anything missing or mistyped. This is the mechanism behind "fatal at construction, emitted
/// with the offending key" configuration errors: these are caller mistakes in a config file, not
/// recoverable run-time conditions, so a panic with a clear message is preferred to a `Result`
/// threaded through every builder.
#[macro_export]
macro_rules! match_object_panic{
	($value:expr, $name:literal, $($field:ident => $pattern:pat => $extract:expr),+ $(,)?) =>
	{{
		let cv = $value;
		match cv
		{
			$crate::config_parser::ConfigurationValue::Object(ref object_name, ref pairs) =>
			{
				if object_name != $name
				{
					panic!("expected a configuration object named \"{}\", got \"{}\"",$name,object_name);
				}
				$(
				let $field = pairs.iter().find(|(k,_)|k==stringify!($field))
					.unwrap_or_else(||panic!("missing required field \"{}\" in {}",stringify!($field),$name));
				let $field = match &$field.1 { $pattern => $extract, other => panic!("field \"{}\" in {} has the wrong shape: {:?}",stringify!($field),$name,other) };
				)+
				($($field),+)
			},
			other => panic!("expected a configuration object named \"{}\", got {:?}",$name,other),
		}
	}}
}

/// Parses configuration text into a `ConfigurationValue` tree.
///
/// Grammar (informal):
/// - `value := number | bool | text | array | object | literal`
/// - `object := literal '{' (ident ':' value ',')* '}'`
/// - `array := '[' (value ',')* ']'`
pub fn parse(input: &str) -> Result<ConfigurationValue, crate::error::Error>
{
	let mut parser = Parser{ input: input.as_bytes(), pos: 0 };
	parser.skip_ws();
	let value = parser.parse_value()?;
	parser.skip_ws();
	Ok(value)
}

struct Parser<'a>
{
	input: &'a [u8],
	pos: usize,
}

impl<'a> Parser<'a>
{
	fn peek(&self) -> Option<u8> { self.input.get(self.pos).copied() }
	fn skip_ws(&mut self)
	{
		while let Some(c) = self.peek()
		{
			if c.is_ascii_whitespace() { self.pos+=1; }
			else if c==b'#' { while self.peek().map_or(false,|c|c!=b'\n') { self.pos+=1; } }
			else { break; }
		}
	}
	fn fail(&self) -> crate::error::Error
	{
		crate::error::Error::could_not_parse_configuration(crate::source_location!(),self.pos)
	}
	fn parse_ident(&mut self) -> Result<String, crate::error::Error>
	{
		let start = self.pos;
		while let Some(c) = self.peek()
		{
			if c.is_ascii_alphanumeric() || c==b'_' { self.pos+=1; } else { break; }
		}
		if self.pos==start { return Err(self.fail()); }
		Ok(String::from_utf8_lossy(&self.input[start..self.pos]).into_owned())
	}
	fn parse_value(&mut self) -> Result<ConfigurationValue, crate::error::Error>
	{
		self.skip_ws();
		match self.peek()
		{
			Some(b'[') => self.parse_array(),
			Some(b'"') => self.parse_text(),
			Some(b'=') => { self.pos+=1; let start=self.pos; while self.peek().map_or(false,|c|c!=b','&&c!=b'}') { self.pos+=1; } Ok(ConfigurationValue::Expr(String::from_utf8_lossy(&self.input[start..self.pos]).trim().to_string())) },
			Some(c) if c==b'-' || c.is_ascii_digit() => self.parse_number(),
			Some(c) if c.is_ascii_alphabetic() || c==b'_' =>
			{
				let ident = self.parse_ident()?;
				self.skip_ws();
				match ident.as_str()
				{
					"true" => Ok(ConfigurationValue::Bool(true)),
					"false" => Ok(ConfigurationValue::Bool(false)),
					"None" => Ok(ConfigurationValue::None),
					_ =>
					{
						if self.peek()==Some(b'{') { self.parse_object(ident) }
						else { Ok(ConfigurationValue::Literal(ident)) }
					}
				}
			},
			_ => Err(self.fail()),
		}
	}
	fn parse_number(&mut self) -> Result<ConfigurationValue, crate::error::Error>
	{
		let start = self.pos;
		if self.peek()==Some(b'-') { self.pos+=1; }
		while self.peek().map_or(false,|c|c.is_ascii_digit()||c==b'.') { self.pos+=1; }
		let text = std::str::from_utf8(&self.input[start..self.pos]).map_err(|_|self.fail())?;
		let value: f64 = text.parse().map_err(|_|self.fail())?;
		Ok(ConfigurationValue::Number(value))
	}
	fn parse_text(&mut self) -> Result<ConfigurationValue, crate::error::Error>
	{
		self.pos+=1;
		let start = self.pos;
		while self.peek().map_or(false,|c|c!=b'"') { self.pos+=1; }
		if self.peek()!=Some(b'"') { return Err(self.fail()); }
		let text = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
		self.pos+=1;
		Ok(ConfigurationValue::Text(text))
	}
	fn parse_array(&mut self) -> Result<ConfigurationValue, crate::error::Error>
	{
		self.pos+=1;
		let mut values = Vec::new();
		loop
		{
			self.skip_ws();
			if self.peek()==Some(b']') { self.pos+=1; break; }
			values.push(self.parse_value()?);
			self.skip_ws();
			match self.peek()
			{
				Some(b',') => { self.pos+=1; },
				Some(b']') => { self.pos+=1; break; },
				_ => return Err(self.fail()),
			}
		}
		Ok(ConfigurationValue::Array(values))
	}
	fn parse_object(&mut self, name: String) -> Result<ConfigurationValue, crate::error::Error>
	{
		self.pos+=1;
		let mut pairs = Vec::new();
		loop
		{
			self.skip_ws();
			if self.peek()==Some(b'}') { self.pos+=1; break; }
			let key = self.parse_ident()?;
			self.skip_ws();
			if self.peek()!=Some(b':') { return Err(self.fail()); }
			self.pos+=1;
			let value = self.parse_value()?;
			pairs.push((key,value));
			self.skip_ws();
			match self.peek()
			{
				Some(b',') => { self.pos+=1; },
				Some(b'}') => { self.pos+=1; break; },
				_ => return Err(self.fail()),
			}
		}
		Ok(ConfigurationValue::Object(name,pairs))
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn parses_flat_object()
	{
		let cv = parse("Basic{virtual_channels: 4, bubble: true}").unwrap();
		assert_eq!(cv.object_name(),Some("Basic"));
		assert_eq!(cv.get_field("virtual_channels").and_then(|v|v.as_usize()),Some(4));
		assert_eq!(cv.get_field("bubble").and_then(|v|v.as_bool()),Some(true));
	}

	#[test]
	fn parses_nested_array_and_object()
	{
		let cv = parse("Configuration{sides: [4,4], router: Basic{virtual_channels: 2}}").unwrap();
		let sides = cv.get_field("sides").unwrap().as_array().unwrap();
		assert_eq!(sides.len(),2);
		let router = cv.get_field("router").unwrap();
		assert_eq!(router.object_name(),Some("Basic"));
	}

	#[test]
	fn rejects_garbage()
	{
		assert!(parse("{{{").is_err());
	}
}
