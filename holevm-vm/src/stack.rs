//! # Operand Stack
//!
//! Bounded LIFO of machine words. The bound is the running program's
//! `stack_cap`, so overflow belongs to a program's semantics just like
//! division by zero.

use crate::error::{self, Result};
use crate::opcode::Word;

/// Capacity used by synthesized programs and by `Stack::default()`
pub const DEFAULT_STACK_CAP: usize = 256;

#[derive(Debug, Clone)]
pub struct Stack {
    data: Vec<Word>,
    capacity: usize,
}

impl Default for Stack {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_STACK_CAP)
    }
}

impl Stack {
    pub fn with_capacity(capacity: usize) -> Self {
        // synthesized programs stay shallow; grow on demand past that
        Stack { data: Vec::with_capacity(capacity.min(16)), capacity }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fails without touching the stack when fewer than `n` values are held
    fn require(&self, n: usize) -> Result<()> {
        if self.data.len() < n {
            Err(error::stack_underflow().with_context("depth", self.data.len().to_string()))
        } else {
            Ok(())
        }
    }

    pub fn push(&mut self, value: Word) -> Result<()> {
        if self.data.len() == self.capacity {
            return Err(error::stack_overflow(self.capacity));
        }
        self.data.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Word> {
        self.data
            .pop()
            .ok_or_else(|| error::stack_underflow().with_context("depth", "0"))
    }

    /// Operands of a binary op: `(a, b)` with `b` taken from the top
    pub fn pop_pair(&mut self) -> Result<(Word, Word)> {
        self.require(2)?;
        let b = self.pop()?;
        let a = self.pop()?;
        Ok((a, b))
    }

    pub fn peek(&self) -> Result<&Word> {
        self.require(1)?;
        Ok(&self.data[self.data.len() - 1])
    }

    pub fn dup(&mut self) -> Result<()> {
        let top = self.peek()?.clone();
        self.push(top)
    }

    pub fn swap(&mut self) -> Result<()> {
        self.require(2)?;
        let n = self.data.len();
        self.data.swap(n - 1, n - 2);
        Ok(())
    }

    /// Bottom to top
    pub fn as_slice(&self) -> &[Word] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn words(values: &[i64]) -> Vec<Word> {
        values.iter().map(|&v| Word::from(v)).collect()
    }

    fn stack_of(values: &[i64]) -> Stack {
        let mut stack = Stack::default();
        for v in words(values) {
            stack.push(v).unwrap();
        }
        stack
    }

    fn underflows<T: std::fmt::Debug>(r: Result<T>) -> bool {
        r.is_err_and(|e| e.kind() == ErrorKind::StackUnderflow)
    }

    #[test]
    fn test_lifo_order() {
        let mut stack = stack_of(&[1, -2, 3]);
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.pop().unwrap(), Word::from(3));
        assert_eq!(stack.pop().unwrap(), Word::from(-2));
        assert_eq!(stack.pop().unwrap(), Word::from(1));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_pop_pair_is_below_then_top() {
        let mut stack = stack_of(&[5, 10, 4]);
        assert_eq!(stack.pop_pair().unwrap(), (Word::from(10), Word::from(4)));
        assert_eq!(stack.as_slice(), words(&[5]));
    }

    #[test]
    fn test_failed_pop_pair_leaves_stack_intact() {
        let mut stack = stack_of(&[7]);
        assert!(underflows(stack.pop_pair()));
        assert_eq!(stack.as_slice(), words(&[7]));
    }

    #[test]
    fn test_dup_and_swap() {
        let mut stack = stack_of(&[42]);
        stack.dup().unwrap();
        assert_eq!(stack.as_slice(), words(&[42, 42]));

        let mut stack = stack_of(&[1, 2]);
        stack.swap().unwrap();
        assert_eq!(stack.as_slice(), words(&[2, 1]));
    }

    #[test]
    fn test_underflow_on_every_reader() {
        let mut stack = Stack::default();
        assert!(underflows(stack.pop()));
        assert!(underflows(stack.peek()));
        assert!(underflows(stack.dup()));

        stack.push(Word::from(1)).unwrap();
        assert!(underflows(stack.swap()));
    }

    #[test]
    fn test_capacity_bound() {
        let mut stack = Stack::with_capacity(4);
        for i in 0..4 {
            stack.push(Word::from(i)).unwrap();
        }
        assert!(stack.push(Word::from(999)).is_err_and(|e| e.kind() == ErrorKind::StackOverflow));
        assert!(stack.dup().is_err_and(|e| e.kind() == ErrorKind::StackOverflow));
        assert_eq!(stack.len(), 4);
    }

    #[test]
    fn test_words_are_unbounded() {
        let big = Word::from(i64::MAX) * Word::from(4);
        let mut stack = Stack::default();
        stack.push(big.clone()).unwrap();
        stack.dup().unwrap();
        assert_eq!(stack.pop_pair().unwrap(), (big.clone(), big));
    }
}
