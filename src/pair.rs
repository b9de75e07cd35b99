/// A two-slot holder with asymmetric mutability.
///
/// `first` is fixed at construction and only readable afterwards; `second`
/// stays assignable for the holder's lifetime. Useful wherever a call site
/// needs to carry two correlated values without declaring a dedicated type,
/// and one of them must not drift after creation.
///
/// Purely structural: no validation, no equality semantics beyond those of
/// the slots themselves.
///
/// # Example
///
/// ```
/// use merge_kit::Pair;
///
/// let mut sent = Pair::new("msg-abc", 0);
/// sent.second = 42; // seq assigned after the server acknowledges
///
/// assert_eq!(*sent.first(), "msg-abc");
/// assert_eq!(sent.second, 42);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair<F, S> {
    first: F,
    /// The mutable slot.
    pub second: S,
}

impl<F, S> Pair<F, S> {
    /// Create a pair; `first` becomes immutable from here on.
    pub fn new(first: F, second: S) -> Self {
        Self { first, second }
    }

    /// Borrow the immutable slot.
    #[must_use]
    pub fn first(&self) -> &F {
        &self.first
    }

    /// Consume the pair, releasing both slots.
    #[must_use]
    pub fn into_parts(self) -> (F, S) {
        (self.first, self.second)
    }
}
