/*!

A simple row-major matrix, used for the allocator's request/grant/metadata matrices and for
precomputed distance tables consumed by routing algorithms.

*/

use std::mem::size_of;
use crate::quantify::Quantifiable;

#[derive(Debug,Clone)]
pub struct Matrix<T>
{
	data: Vec<T>,
	num_rows: usize,
	num_columns: usize,
}

impl<T> Matrix<T>
{
	pub fn get(&self,row:usize,column:usize) -> &T
	{
		&self.data[row*self.num_columns+column]
	}
	pub fn get_mut(&mut self,row:usize,column:usize) -> &mut T
	{
		&mut self.data[row*self.num_columns+column]
	}
	pub fn set(&mut self,row:usize,column:usize,value:T)
	{
		self.data[row*self.num_columns+column] = value;
	}
	pub fn num_rows(&self) -> usize { self.num_rows }
	pub fn num_columns(&self) -> usize { self.num_columns }
	/// Build a matrix with constant values.
	pub fn constant(value:T,num_rows:usize,num_columns:usize) -> Matrix<T> where T:Clone
	{
		Matrix{
			data: vec![value;num_rows*num_columns],
			num_rows,
			num_columns,
		}
	}
	/// Reset every entry to `value`, keeping the shape. Used once per allocator iteration to
	/// clear the intermediate matrix without reallocating.
	pub fn fill(&mut self,value:T) where T:Clone
	{
		self.data.iter_mut().for_each(|x|*x=value.clone());
	}
	pub fn row(&self,row:usize) -> &[T]
	{
		&self.data[row*self.num_columns..(row+1)*self.num_columns]
	}
}

impl<T:Quantifiable> Quantifiable for Matrix<T>
{
	fn total_memory(&self) -> usize
	{
		size_of::<Matrix<T>>() + self.data.total_memory()
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn get_set_roundtrip()
	{
		let mut m = Matrix::constant(0u32,3,4);
		m.set(1,2,7);
		assert_eq!(*m.get(1,2),7);
		assert_eq!(*m.get(0,0),0);
		assert_eq!(m.row(1),[0,0,7,0]);
	}
}
