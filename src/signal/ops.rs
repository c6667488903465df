use crate::{signal::Signal, Sample, Time};

/*
Pointwise Combinators
=====================

Every combinator here evaluates both operands at the SAME query time and
combines the two results. Nothing is buffered, so a combinator adds no
latency and keeps no state of its own; any state lives in the operands.

  Sum        a(t) + b(t)
  Difference a(t) - b(t)
  Product    a(t) * b(t)    amplitude control, ring modulation
  Quotient   a(t) / b(t)    0 wherever b(t) == 0

Operand order matters for stateful operands only in the sense that `a` is
sampled before `b` on every call. Neither operand is skipped: even when the
quotient's denominator is zero the numerator still advances, so an
oscillator upstream does not lose phase.

Mix sums any number of signals of one type without normalizing. Three
voices at full scale sum to 3.0; scale afterwards if that matters.
*/

macro_rules! pointwise {
    ($(#[$doc:meta])* $name:ident, |$a:ident, $b:ident| $combine:expr) => {
        $(#[$doc])*
        pub struct $name<A, B> {
            pub a: A,
            pub b: B,
        }

        impl<A, B> $name<A, B> {
            pub fn new(a: A, b: B) -> Self {
                Self { a, b }
            }
        }

        impl<A: Signal, B: Signal> Signal for $name<A, B> {
            #[inline]
            fn sample(&mut self, time: Time) -> Sample {
                let $a = self.a.sample(time);
                let $b = self.b.sample(time);
                $combine
            }
        }
    };
}

pointwise!(
    /// `a(t) + b(t)`
    Sum,
    |a, b| a + b
);
pointwise!(
    /// `a(t) - b(t)`
    Difference,
    |a, b| a - b
);
pointwise!(
    /// `a(t) * b(t)`
    Product,
    |a, b| a * b
);
pointwise!(
    /// `a(t) / b(t)`, or `0` when `b(t)` is zero.
    Quotient,
    |a, b| if b == 0.0 { 0.0 } else { a / b }
);

/// Unnormalized sum of a list of signals.
pub struct Mix<S> {
    sources: Vec<S>,
}

impl<S> Mix<S> {
    pub fn new(sources: Vec<S>) -> Self {
        Self { sources }
    }

    pub fn push(&mut self, source: S) {
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl<S> Default for Mix<S> {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
        }
    }
}

impl<S: Signal> Signal for Mix<S> {
    #[inline]
    fn sample(&mut self, time: Time) -> Sample {
        self.sources.iter_mut().map(|s| s.sample(time)).sum()
    }
}

/// Sum every signal in `sources`. An empty mix is silence.
pub fn mix<S: Signal>(sources: impl IntoIterator<Item = S>) -> Mix<S> {
    Mix::new(sources.into_iter().collect())
}
