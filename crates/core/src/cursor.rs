//! Element cursor trait
//!
//! The cursor is the source a stream writer drains. It is owned and driven
//! by the writer's background thread only.

use crate::element::Element;
use crate::error::CursorError;

/// A source of dataset elements.
///
/// `Ok(Some(element))` is the next element, `Ok(None)` is end of sequence.
/// Once end of sequence has been returned the cursor is not called again.
pub trait ElementCursor: Send {
    /// Produce the next element
    fn next_element(&mut self) -> Result<Option<Element>, CursorError>;
}

impl<C: ElementCursor + ?Sized> ElementCursor for Box<C> {
    fn next_element(&mut self) -> Result<Option<Element>, CursorError> {
        (**self).next_element()
    }
}

/// Adapts any `Iterator` of elements (or element results) into a cursor.
pub struct IterCursor<I> {
    iter: I,
}

impl<I> IterCursor<I> {
    /// Wrap an iterator
    pub fn new(iter: I) -> Self {
        IterCursor { iter }
    }
}

impl<I> ElementCursor for IterCursor<I>
where
    I: Iterator<Item = Result<Element, CursorError>> + Send,
{
    fn next_element(&mut self) -> Result<Option<Element>, CursorError> {
        self.iter.next().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iter_cursor_yields_then_ends() {
        let items = vec![Ok(Element::from_bytes(vec![1])), Ok(Element::from_bytes(vec![2]))];
        let mut cursor = IterCursor::new(items.into_iter());

        assert_eq!(
            cursor.next_element().unwrap(),
            Some(Element::from_bytes(vec![1]))
        );
        assert_eq!(
            cursor.next_element().unwrap(),
            Some(Element::from_bytes(vec![2]))
        );
        assert_eq!(cursor.next_element().unwrap(), None);
    }

    #[test]
    fn test_iter_cursor_propagates_error() {
        let items: Vec<Result<Element, CursorError>> =
            vec![Err(CursorError::Source("bad read".to_string()))];
        let mut boxed: Box<dyn ElementCursor> = Box::new(IterCursor::new(items.into_iter()));
        assert!(matches!(
            boxed.next_element(),
            Err(CursorError::Source(_))
        ));
    }
}
