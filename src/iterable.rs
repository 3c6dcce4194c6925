//! Iterable: a factory of fresh [`Cursor`]s, plus lazy combinators.
//!
//! Implement [`Iterable::new_cursor`] and every combinator and fold comes
//! for free. Combinators consume their inputs and only capture them; no
//! element is visited until a cursor of the result is advanced. Each call to
//! `new_cursor` starts an independent traversal.
//!
//! Cursors never borrow the iterable that made them. A cursor owns whatever
//! state it needs (a source cursor, a shared handle to the user function,
//! or a borrow of the underlying collection's data), so an inner iterable
//! built by `flat_map` can be dropped as soon as its cursor exists.
//!
//! Functions are stored behind `Rc` so combinator values stay cheap to
//! clone without requiring `F: Clone`. Internally they are called through
//! [`Transform`], which every `Fn(&X) -> Y` closure implements and which the
//! set and map views implement with named function objects.

use crate::cursor::{self, materialize, no_current, Cursor, SliceCursor, SourceCursor};
use core::fmt;
use std::rc::Rc;

/// A one-argument function over borrowed input.
pub trait Transform<X: ?Sized> {
    type Output;

    fn apply(&self, x: &X) -> Self::Output;
}

impl<X: ?Sized, Y, F> Transform<X> for F
where
    F: Fn(&X) -> Y,
{
    type Output = Y;

    #[inline]
    fn apply(&self, x: &X) -> Y {
        self(x)
    }
}

/// Returned by the seedless reductions on an empty iterable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceError {
    Empty,
}

impl fmt::Display for ReduceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReduceError::Empty => f.write_str("cannot reduce an empty iterable without a seed"),
        }
    }
}

impl std::error::Error for ReduceError {}

/// Clones a pair out of two borrowed halves.
pub type PairFn<X, Y> = fn(&X, &Y) -> (X, Y);

fn pair<X: Clone, Y: Clone>(x: &X, y: &Y) -> (X, Y) {
    (x.clone(), y.clone())
}

pub type Zip<A, B> = ZipWith<A, B, PairFn<<A as Iterable>::Item, <B as Iterable>::Item>>;

pub type Product<A, B> =
    FlatMap<A, ProductWith<B, PairFn<<A as Iterable>::Item, <B as Iterable>::Item>>>;

pub trait Iterable {
    type Item;
    type Cursor: Cursor<Item = Self::Item>;

    /// Starts a fresh traversal.
    fn new_cursor(&self) -> Self::Cursor;

    fn map<Y, F>(self, f: F) -> Map<Self, F>
    where
        Self: Sized,
        F: Fn(&Self::Item) -> Y,
    {
        Map {
            source: self,
            f: Rc::new(f),
        }
    }

    fn filter<P>(self, pred: P) -> Filter<Self, P>
    where
        Self: Sized,
        P: Fn(&Self::Item) -> bool,
    {
        Filter {
            source: self,
            pred: Rc::new(pred),
        }
    }

    /// Maps and filters in one pass; `None` drops the element.
    fn filter_map<Y, F>(self, f: F) -> FilterMap<Self, F>
    where
        Self: Sized,
        F: Fn(&Self::Item) -> Option<Y>,
    {
        FilterMap {
            source: self,
            f: Rc::new(f),
        }
    }

    /// Depth-first concatenation of `f(x)` for every `x`, in order.
    fn flat_map<J, F>(self, f: F) -> FlatMap<Self, F>
    where
        Self: Sized,
        J: Iterable,
        F: Fn(&Self::Item) -> J,
    {
        FlatMap {
            source: self,
            f: Rc::new(f),
        }
    }

    fn concat<J>(self, that: J) -> Concat<Self, J>
    where
        Self: Sized,
        J: Iterable<Item = Self::Item>,
    {
        Concat {
            first: self,
            second: that,
        }
    }

    /// Pairs elements positionally. Stops at the shorter side.
    fn zip<J>(self, that: J) -> Zip<Self, J>
    where
        Self: Sized,
        Self::Item: Clone,
        J: Iterable,
        J::Item: Clone,
    {
        self.zip_with(that, pair::<Self::Item, J::Item> as PairFn<Self::Item, J::Item>)
    }

    /// Combines elements positionally with `f`. Stops at the shorter side.
    fn zip_with<J, F, Z>(self, that: J, f: F) -> ZipWith<Self, J, F>
    where
        Self: Sized,
        J: Iterable,
        F: Fn(&Self::Item, &J::Item) -> Z,
    {
        ZipWith {
            a: self,
            b: that,
            f: Rc::new(f),
        }
    }

    /// Back-to-front traversal. Every cursor of the result first drains a
    /// full cursor of `self` into a buffer.
    fn reversed(self) -> Reversed<Self>
    where
        Self: Sized,
        Self::Item: Clone,
    {
        Reversed { source: self }
    }

    fn cartesian_product<J>(self, that: J) -> Product<Self, J>
    where
        Self: Sized,
        Self::Item: Clone,
        J: Iterable + Clone,
        J::Item: Clone,
    {
        self.cartesian_product_with(that, pair::<Self::Item, J::Item> as PairFn<Self::Item, J::Item>)
    }

    /// `f(x, y)` for every `x` of `self` and, within it, every `y` of `that`.
    fn cartesian_product_with<J, F, Z>(self, that: J, f: F) -> FlatMap<Self, ProductWith<J, F>>
    where
        Self: Sized,
        Self::Item: Clone,
        J: Iterable + Clone,
        F: Fn(&Self::Item, &J::Item) -> Z,
    {
        FlatMap {
            source: self,
            f: Rc::new(ProductWith {
                that,
                f: Rc::new(f),
            }),
        }
    }

    fn count(&self) -> usize {
        let mut cursor = self.new_cursor();
        let mut n = 0;
        while cursor.advance() {
            n += 1;
        }
        n
    }

    fn is_empty(&self) -> bool {
        !self.new_cursor().advance()
    }

    fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Self::Item),
    {
        let mut cursor = self.new_cursor();
        while cursor.advance() {
            f(cursor.current());
        }
    }

    fn fold_left<A, F>(&self, init: A, mut f: F) -> A
    where
        F: FnMut(A, &Self::Item) -> A,
    {
        let mut cursor = self.new_cursor();
        let mut acc = init;
        while cursor.advance() {
            acc = f(acc, cursor.current());
        }
        acc
    }

    /// Seeded fold whose accumulator has the element type.
    fn fold<F>(&self, init: Self::Item, f: F) -> Self::Item
    where
        F: FnMut(Self::Item, &Self::Item) -> Self::Item,
    {
        self.fold_left(init, f)
    }

    fn fold_right<A, F>(&self, init: A, mut f: F) -> A
    where
        Self::Item: Clone,
        F: FnMut(&Self::Item, A) -> A,
    {
        materialize(self.new_cursor())
            .iter()
            .rev()
            .fold(init, |acc, x| f(x, acc))
    }

    fn reduce_left<F>(&self, mut f: F) -> Result<Self::Item, ReduceError>
    where
        Self::Item: Clone,
        F: FnMut(Self::Item, &Self::Item) -> Self::Item,
    {
        let mut cursor = self.new_cursor();
        if !cursor.advance() {
            return Err(ReduceError::Empty);
        }
        let mut acc = cursor.current().clone();
        while cursor.advance() {
            acc = f(acc, cursor.current());
        }
        Ok(acc)
    }

    fn reduce_right<F>(&self, mut f: F) -> Result<Self::Item, ReduceError>
    where
        Self::Item: Clone,
        F: FnMut(&Self::Item, Self::Item) -> Self::Item,
    {
        let mut buffer = materialize(self.new_cursor());
        let last = buffer.pop().ok_or(ReduceError::Empty)?;
        Ok(buffer.iter().rev().fold(last, |acc, x| f(x, acc)))
    }

    /// Left-to-right reduction over owned elements.
    fn reduce<F>(&self, mut f: F) -> Result<Self::Item, ReduceError>
    where
        Self::Item: Clone,
        F: FnMut(Self::Item, Self::Item) -> Self::Item,
    {
        self.reduce_left(|acc, x| f(acc, x.clone()))
    }

    fn to_vec(&self) -> Vec<Self::Item>
    where
        Self::Item: Clone,
    {
        materialize(self.new_cursor())
    }

    /// Elements rendered with `Display`, separated by `delimiter`.
    fn make_string(&self, delimiter: &str) -> String
    where
        Self::Item: fmt::Display,
    {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write_joined(self, delimiter, &mut out);
        out
    }

    /// `Display` adapter listing the elements separated by `"; "`.
    fn display(&self) -> Rendered<'_, Self>
    where
        Self: Sized,
        Self::Item: fmt::Display,
    {
        Rendered(self)
    }

    /// Std iterator over a fresh cursor.
    fn iter(&self) -> cursor::Iter<Self::Cursor> {
        self.new_cursor().into_std()
    }
}

fn write_joined<I, W>(iterable: &I, delimiter: &str, out: &mut W) -> fmt::Result
where
    I: Iterable + ?Sized,
    I::Item: fmt::Display,
    W: fmt::Write,
{
    let mut cursor = iterable.new_cursor();
    let mut first = true;
    while cursor.advance() {
        if !first {
            out.write_str(delimiter)?;
        }
        first = false;
        write!(out, "{}", cursor.current())?;
    }
    Ok(())
}

/// See [`Iterable::display`].
pub struct Rendered<'a, I: ?Sized>(&'a I);

impl<I> fmt::Display for Rendered<'_, I>
where
    I: Iterable + ?Sized,
    I::Item: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(self.0, "; ", f)
    }
}

// Sources

impl<'a, T> Iterable for &'a [T] {
    type Item = T;
    type Cursor = SliceCursor<'a, T>;

    fn new_cursor(&self) -> Self::Cursor {
        SliceCursor::new(self)
    }
}

impl<'a, T> Iterable for &'a Vec<T> {
    type Item = T;
    type Cursor = SliceCursor<'a, T>;

    fn new_cursor(&self) -> Self::Cursor {
        SliceCursor::new(self.as_slice())
    }
}

/// Iterable over a cloneable std iterator; each cursor drives a clone.
#[derive(Clone, Debug)]
pub struct Source<I> {
    iter: I,
}

pub fn source<I>(iter: I) -> Source<I::IntoIter>
where
    I: IntoIterator,
    I::IntoIter: Clone,
{
    Source {
        iter: iter.into_iter(),
    }
}

pub fn empty<T>() -> Source<core::iter::Empty<T>> {
    Source {
        iter: core::iter::empty(),
    }
}

impl<I: Iterator + Clone> Iterable for Source<I> {
    type Item = I::Item;
    type Cursor = SourceCursor<I>;

    fn new_cursor(&self) -> Self::Cursor {
        SourceCursor::new(self.iter.clone())
    }
}

// map

pub struct Map<I, F> {
    pub(crate) source: I,
    pub(crate) f: Rc<F>,
}

impl<I: Clone, F> Clone for Map<I, F> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            f: Rc::clone(&self.f),
        }
    }
}

impl<I, F> Iterable for Map<I, F>
where
    I: Iterable,
    F: Transform<I::Item>,
{
    type Item = F::Output;
    type Cursor = MapCursor<I::Cursor, F>;

    fn new_cursor(&self) -> Self::Cursor {
        MapCursor {
            source: self.source.new_cursor(),
            f: Rc::clone(&self.f),
            current: None,
        }
    }
}

/// Applies `f` once per element, when the element is reached.
pub struct MapCursor<C: Cursor, F: Transform<C::Item>> {
    source: C,
    f: Rc<F>,
    current: Option<F::Output>,
}

impl<C: Cursor, F: Transform<C::Item>> Cursor for MapCursor<C, F> {
    type Item = F::Output;

    fn advance(&mut self) -> bool {
        self.current = if self.source.advance() {
            Some(self.f.apply(self.source.current()))
        } else {
            None
        };
        self.current.is_some()
    }

    fn current(&self) -> &F::Output {
        self.current.as_ref().unwrap_or_else(|| no_current())
    }
}

// filter

pub struct Filter<I, P> {
    pub(crate) source: I,
    pub(crate) pred: Rc<P>,
}

impl<I: Clone, P> Clone for Filter<I, P> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            pred: Rc::clone(&self.pred),
        }
    }
}

impl<I, P> Iterable for Filter<I, P>
where
    I: Iterable,
    P: Transform<I::Item, Output = bool>,
{
    type Item = I::Item;
    type Cursor = FilterCursor<I::Cursor, P>;

    fn new_cursor(&self) -> Self::Cursor {
        FilterCursor {
            source: self.source.new_cursor(),
            pred: Rc::clone(&self.pred),
        }
    }
}

pub struct FilterCursor<C, P> {
    source: C,
    pred: Rc<P>,
}

impl<C, P> Cursor for FilterCursor<C, P>
where
    C: Cursor,
    P: Transform<C::Item, Output = bool>,
{
    type Item = C::Item;

    fn advance(&mut self) -> bool {
        while self.source.advance() {
            if self.pred.apply(self.source.current()) {
                return true;
            }
        }
        false
    }

    #[inline]
    fn current(&self) -> &C::Item {
        self.source.current()
    }
}

// filter_map

pub struct FilterMap<I, F> {
    pub(crate) source: I,
    pub(crate) f: Rc<F>,
}

impl<I: Clone, F> Clone for FilterMap<I, F> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            f: Rc::clone(&self.f),
        }
    }
}

impl<I, F, Y> Iterable for FilterMap<I, F>
where
    I: Iterable,
    F: Transform<I::Item, Output = Option<Y>>,
{
    type Item = Y;
    type Cursor = FilterMapCursor<I::Cursor, F, Y>;

    fn new_cursor(&self) -> Self::Cursor {
        FilterMapCursor {
            source: self.source.new_cursor(),
            f: Rc::clone(&self.f),
            current: None,
        }
    }
}

pub struct FilterMapCursor<C, F, Y> {
    source: C,
    f: Rc<F>,
    current: Option<Y>,
}

impl<C, F, Y> Cursor for FilterMapCursor<C, F, Y>
where
    C: Cursor,
    F: Transform<C::Item, Output = Option<Y>>,
{
    type Item = Y;

    fn advance(&mut self) -> bool {
        self.current = None;
        while self.source.advance() {
            self.current = self.f.apply(self.source.current());
            if self.current.is_some() {
                return true;
            }
        }
        false
    }

    fn current(&self) -> &Y {
        self.current.as_ref().unwrap_or_else(|| no_current())
    }
}

// flat_map

pub struct FlatMap<I, F> {
    pub(crate) source: I,
    pub(crate) f: Rc<F>,
}

impl<I: Clone, F> Clone for FlatMap<I, F> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            f: Rc::clone(&self.f),
        }
    }
}

impl<I, F> Iterable for FlatMap<I, F>
where
    I: Iterable,
    F: Transform<I::Item>,
    F::Output: Iterable,
{
    type Item = <F::Output as Iterable>::Item;
    type Cursor = FlatMapCursor<I::Cursor, F>;

    fn new_cursor(&self) -> Self::Cursor {
        FlatMapCursor {
            outer: self.source.new_cursor(),
            f: Rc::clone(&self.f),
            state: FlatState::NeedOuter,
        }
    }
}

enum FlatState<J> {
    NeedOuter,
    HaveInner(J),
    Done,
}

pub struct FlatMapCursor<C, F>
where
    C: Cursor,
    F: Transform<C::Item>,
    F::Output: Iterable,
{
    outer: C,
    f: Rc<F>,
    state: FlatState<<F::Output as Iterable>::Cursor>,
}

impl<C, F> Cursor for FlatMapCursor<C, F>
where
    C: Cursor,
    F: Transform<C::Item>,
    F::Output: Iterable,
{
    type Item = <F::Output as Iterable>::Item;

    fn advance(&mut self) -> bool {
        loop {
            match &mut self.state {
                FlatState::HaveInner(inner) => {
                    if inner.advance() {
                        return true;
                    }
                    self.state = FlatState::NeedOuter;
                }
                FlatState::NeedOuter => {
                    if !self.outer.advance() {
                        self.state = FlatState::Done;
                        return false;
                    }
                    let inner = self.f.apply(self.outer.current()).new_cursor();
                    self.state = FlatState::HaveInner(inner);
                }
                FlatState::Done => return false,
            }
        }
    }

    fn current(&self) -> &Self::Item {
        match &self.state {
            FlatState::HaveInner(inner) => inner.current(),
            _ => no_current(),
        }
    }
}

// concat

#[derive(Clone)]
pub struct Concat<A, B> {
    first: A,
    second: B,
}

impl<A, B> Iterable for Concat<A, B>
where
    A: Iterable,
    B: Iterable<Item = A::Item>,
{
    type Item = A::Item;
    type Cursor = ConcatCursor<A::Cursor, B::Cursor>;

    fn new_cursor(&self) -> Self::Cursor {
        ConcatCursor {
            first: self.first.new_cursor(),
            second: self.second.new_cursor(),
            phase: Phase::First,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    First,
    Second,
    Done,
}

pub struct ConcatCursor<CA, CB> {
    first: CA,
    second: CB,
    phase: Phase,
}

impl<CA, CB> Cursor for ConcatCursor<CA, CB>
where
    CA: Cursor,
    CB: Cursor<Item = CA::Item>,
{
    type Item = CA::Item;

    fn advance(&mut self) -> bool {
        if self.phase == Phase::First {
            if self.first.advance() {
                return true;
            }
            self.phase = Phase::Second;
        }
        if self.phase == Phase::Second {
            if self.second.advance() {
                return true;
            }
            self.phase = Phase::Done;
        }
        false
    }

    fn current(&self) -> &CA::Item {
        match self.phase {
            Phase::First => self.first.current(),
            Phase::Second => self.second.current(),
            Phase::Done => no_current(),
        }
    }
}

// zip_with

pub struct ZipWith<A, B, F> {
    a: A,
    b: B,
    f: Rc<F>,
}

impl<A: Clone, B: Clone, F> Clone for ZipWith<A, B, F> {
    fn clone(&self) -> Self {
        Self {
            a: self.a.clone(),
            b: self.b.clone(),
            f: Rc::clone(&self.f),
        }
    }
}

impl<A, B, F, Z> Iterable for ZipWith<A, B, F>
where
    A: Iterable,
    B: Iterable,
    F: Fn(&A::Item, &B::Item) -> Z,
{
    type Item = Z;
    type Cursor = ZipCursor<A::Cursor, B::Cursor, F, Z>;

    fn new_cursor(&self) -> Self::Cursor {
        ZipCursor {
            a: self.a.new_cursor(),
            b: self.b.new_cursor(),
            f: Rc::clone(&self.f),
            current: None,
            done: false,
        }
    }
}

/// Advances both sides on every step; the first side to run dry ends the
/// traversal, and an element already pulled from the other side is dropped.
pub struct ZipCursor<CA, CB, F, Z> {
    a: CA,
    b: CB,
    f: Rc<F>,
    current: Option<Z>,
    done: bool,
}

impl<CA, CB, F, Z> Cursor for ZipCursor<CA, CB, F, Z>
where
    CA: Cursor,
    CB: Cursor,
    F: Fn(&CA::Item, &CB::Item) -> Z,
{
    type Item = Z;

    fn advance(&mut self) -> bool {
        if !self.done && self.a.advance() && self.b.advance() {
            self.current = Some((self.f)(self.a.current(), self.b.current()));
            return true;
        }
        self.done = true;
        self.current = None;
        false
    }

    fn current(&self) -> &Z {
        self.current.as_ref().unwrap_or_else(|| no_current())
    }
}

// reversed

#[derive(Clone)]
pub struct Reversed<I> {
    source: I,
}

impl<I> Iterable for Reversed<I>
where
    I: Iterable,
    I::Item: Clone,
{
    type Item = I::Item;
    type Cursor = ReversedCursor<I::Item>;

    fn new_cursor(&self) -> Self::Cursor {
        let buffer = materialize(self.source.new_cursor());
        log::trace!("reversed cursor buffered {} elements", buffer.len());
        ReversedCursor {
            buffer,
            current: None,
        }
    }
}

pub struct ReversedCursor<T> {
    buffer: Vec<T>,
    current: Option<T>,
}

impl<T> Cursor for ReversedCursor<T> {
    type Item = T;

    fn advance(&mut self) -> bool {
        self.current = self.buffer.pop();
        self.current.is_some()
    }

    fn current(&self) -> &T {
        self.current.as_ref().unwrap_or_else(|| no_current())
    }
}

// cartesian products

/// Maps `x` to `that.map(|y| f(x, y))`.
pub struct ProductWith<J, F> {
    that: J,
    f: Rc<F>,
}

impl<J: Clone, F> Clone for ProductWith<J, F> {
    fn clone(&self) -> Self {
        Self {
            that: self.that.clone(),
            f: Rc::clone(&self.f),
        }
    }
}

impl<X, J, F, Z> Transform<X> for ProductWith<J, F>
where
    X: Clone,
    J: Iterable + Clone,
    F: Fn(&X, &J::Item) -> Z,
{
    type Output = Map<J, Bind<X, F>>;

    fn apply(&self, x: &X) -> Self::Output {
        Map {
            source: self.that.clone(),
            f: Rc::new(Bind {
                x: x.clone(),
                f: Rc::clone(&self.f),
            }),
        }
    }
}

/// `f` with its first argument fixed.
pub struct Bind<X, F> {
    x: X,
    f: Rc<F>,
}

impl<X, Y, F, Z> Transform<Y> for Bind<X, F>
where
    F: Fn(&X, &Y) -> Z,
{
    type Output = Z;

    #[inline]
    fn apply(&self, y: &Y) -> Z {
        (self.f)(&self.x, y)
    }
}
