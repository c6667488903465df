//! Composable time signals.
//!
//! A [`Signal`] maps a query time to one sample. Some signals are pure math
//! of `t`; others carry private state that evolves between calls (phase
//! accumulation, envelope stages). Either way composing code only ever sees
//! `sample(time)`.
//!
//! Signals combine pointwise:
//!
//! ```
//! use lilt_dsp::signal::{from_fn, BoxedSignal, Signal};
//!
//! let a = BoxedSignal::new(from_fn(|t| t));
//! let b = BoxedSignal::constant(2.0);
//! let mut product = a * b;
//! assert_eq!(product.sample(3.0), 6.0);
//! ```
//!
//! Division is total: a zero denominator yields `0` for that query time, so
//! the audio callback never sees NaN or infinity from a composition.

/// Pointwise arithmetic and mixing combinators.
pub mod ops;
/// Non-blocking probe that copies samples out of the audio thread.
pub mod tap;
/// Control-set levels and gates.
pub mod value;

use std::fmt;

use crate::{Sample, Time};

pub use ops::{mix, Difference, Mix, Product, Quotient, Sum};
pub use tap::{Tap, TapReading};
pub use value::{Trigger, Value};

/// Anything that produces one sample per query time.
///
/// Implementors may keep internal state, which is why `sample` takes
/// `&mut self`. The state belongs to the signal alone and is never shared.
pub trait Signal: Send {
    fn sample(&mut self, time: Time) -> Sample;
}

impl Signal for Box<dyn Signal> {
    #[inline]
    fn sample(&mut self, time: Time) -> Sample {
        (**self).sample(time)
    }
}

/// Signal built from a closure. See [`from_fn`].
pub struct FromFn<F>(F);

/// Wrap a `FnMut(Time) -> Sample` closure as a [`Signal`].
///
/// The closure may capture and mutate its own state.
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: FnMut(Time) -> Sample + Send,
{
    FromFn(f)
}

impl<F> Signal for FromFn<F>
where
    F: FnMut(Time) -> Sample + Send,
{
    #[inline]
    fn sample(&mut self, time: Time) -> Sample {
        (self.0)(time)
    }
}

/// A signal that ignores time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant(pub Sample);

impl Signal for Constant {
    #[inline]
    fn sample(&mut self, _time: Time) -> Sample {
        self.0
    }
}

impl From<Sample> for Constant {
    fn from(value: Sample) -> Self {
        Constant(value)
    }
}

/// Fixed or modulated signal input.
///
/// Used wherever a parameter can be either a plain number or another signal,
/// for example an oscillator's frequency (a modulated frequency is FM).
pub enum Param {
    /// A constant value
    Fixed(Sample),
    /// A value read from a signal at each query time
    Modulated(Box<dyn Signal>),
}

impl Param {
    pub fn fixed(value: Sample) -> Self {
        Param::Fixed(value)
    }

    pub fn modulated(signal: impl Signal + 'static) -> Self {
        Param::Modulated(Box::new(signal))
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Param::Fixed(_))
    }
}

impl Signal for Param {
    #[inline]
    fn sample(&mut self, time: Time) -> Sample {
        match self {
            Param::Fixed(value) => *value,
            Param::Modulated(signal) => signal.sample(time),
        }
    }
}

impl Default for Param {
    fn default() -> Self {
        Param::Fixed(0.0)
    }
}

impl From<Sample> for Param {
    fn from(value: Sample) -> Self {
        Param::Fixed(value)
    }
}

impl From<BoxedSignal> for Param {
    fn from(signal: BoxedSignal) -> Self {
        Param::Modulated(signal.0)
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Param::Modulated(_) => f.write_str("Modulated(..)"),
        }
    }
}

/// Type-erased signal that supports `+ - * /`.
///
/// Operators take both operands by value and return a new signal that
/// evaluates them at the same time argument. Mixing with plain numbers
/// (`signal * 0.5`, `1.0 + signal`) lifts the number to a [`Constant`].
pub struct BoxedSignal(Box<dyn Signal>);

impl BoxedSignal {
    pub fn new(signal: impl Signal + 'static) -> Self {
        BoxedSignal(Box::new(signal))
    }

    pub fn constant(value: Sample) -> Self {
        BoxedSignal::new(Constant(value))
    }

    pub fn into_inner(self) -> Box<dyn Signal> {
        self.0
    }
}

impl Signal for BoxedSignal {
    #[inline]
    fn sample(&mut self, time: Time) -> Sample {
        self.0.sample(time)
    }
}

impl From<Sample> for BoxedSignal {
    fn from(value: Sample) -> Self {
        BoxedSignal::constant(value)
    }
}

impl From<Box<dyn Signal>> for BoxedSignal {
    fn from(signal: Box<dyn Signal>) -> Self {
        BoxedSignal(signal)
    }
}

macro_rules! boxed_operator {
    ($trait:ident, $method:ident, $combinator:ident) => {
        impl std::ops::$trait for BoxedSignal {
            type Output = BoxedSignal;

            fn $method(self, rhs: BoxedSignal) -> BoxedSignal {
                BoxedSignal::new($combinator::new(self, rhs))
            }
        }

        impl std::ops::$trait<Sample> for BoxedSignal {
            type Output = BoxedSignal;

            fn $method(self, rhs: Sample) -> BoxedSignal {
                BoxedSignal::new($combinator::new(self, Constant(rhs)))
            }
        }

        impl std::ops::$trait<BoxedSignal> for Sample {
            type Output = BoxedSignal;

            fn $method(self, rhs: BoxedSignal) -> BoxedSignal {
                BoxedSignal::new($combinator::new(Constant(self), rhs))
            }
        }
    };
}

boxed_operator!(Add, add, Sum);
boxed_operator!(Sub, sub, Difference);
boxed_operator!(Mul, mul, Product);
boxed_operator!(Div, div, Quotient);

/// Fluent combinators for any [`Signal`].
pub trait SignalExt: Signal + Sized {
    fn plus<B: Signal>(self, other: B) -> Sum<Self, B> {
        Sum::new(self, other)
    }

    fn minus<B: Signal>(self, other: B) -> Difference<Self, B> {
        Difference::new(self, other)
    }

    /// Multiply by another signal (amplitude or ring modulation).
    fn amplify<B: Signal>(self, other: B) -> Product<Self, B> {
        Product::new(self, other)
    }

    fn divide<B: Signal>(self, other: B) -> Quotient<Self, B> {
        Quotient::new(self, other)
    }

    /// Multiply by a fixed gain.
    fn scale(self, gain: Sample) -> Product<Self, Constant> {
        Product::new(self, Constant(gain))
    }

    /// Add a fixed offset.
    fn offset(self, amount: Sample) -> Sum<Self, Constant> {
        Sum::new(self, Constant(amount))
    }

    fn boxed(self) -> BoxedSignal
    where
        Self: 'static,
    {
        BoxedSignal::new(self)
    }
}

impl<S: Signal> SignalExt for S {}
