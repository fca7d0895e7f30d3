//! # View Composition
//!
//! Builds a view model from several streams at once. The result emits only
//! after every input emitted, and only while the *primary* input is ready, so a
//! view never renders half-loaded data.

use crate::operators::{combine_latest2, combine_latest3};
use crate::stream::Stream;

/// Whether a value is complete enough to render.
pub trait Ready {
    fn is_ready(&self) -> bool;
}

impl<T> Ready for Option<T> {
    fn is_ready(&self) -> bool {
        self.is_some()
    }
}

impl<T> Ready for Vec<T> {
    fn is_ready(&self) -> bool {
        !self.is_empty()
    }
}

impl Ready for String {
    fn is_ready(&self) -> bool {
        !self.is_empty()
    }
}

/// Combines `primary` and `secondary` into a view model via `build`.
///
/// Combinations where `primary` is not ready are skipped.
pub fn compose_view2<P, S, V>(
    primary: &Stream<P>,
    secondary: &Stream<S>,
    build: impl Fn(P, S) -> V + 'static,
) -> Stream<V>
where
    P: Ready + Clone + 'static,
    S: Clone + 'static,
    V: 'static,
{
    combine_latest2(primary, secondary)
        .filter(|(primary, _)| primary.is_ready())
        .map(move |(primary, secondary)| build(primary, secondary))
}

/// Three-input form of [`compose_view2`].
pub fn compose_view3<P, S1, S2, V>(
    primary: &Stream<P>,
    first: &Stream<S1>,
    second: &Stream<S2>,
    build: impl Fn(P, S1, S2) -> V + 'static,
) -> Stream<V>
where
    P: Ready + Clone + 'static,
    S1: Clone + 'static,
    S2: Clone + 'static,
    V: 'static,
{
    combine_latest3(primary, first, second)
        .filter(|(primary, _, _)| primary.is_ready())
        .map(move |(primary, first, second)| build(primary, first, second))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActionStream;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    struct Vm {
        product: Option<&'static str>,
        title: String,
    }

    #[test]
    fn test_view_waits_for_primary_readiness() {
        let product = ActionStream::with_initial(None);
        let title = ActionStream::with_initial(String::new());
        let views = Rc::new(RefCell::new(Vec::new()));
        let _subscription = {
            let views = views.clone();
            compose_view2(&product.stream(), &title.stream(), |product, title| Vm {
                product,
                title,
            })
            .for_each(move |vm| views.borrow_mut().push(vm))
        };
        assert!(views.borrow().is_empty());

        title.emit("Product Detail for: Hammer".to_string());
        assert!(views.borrow().is_empty());

        product.emit(Some("Hammer"));
        assert_eq!(
            *views.borrow(),
            vec![Vm {
                product: Some("Hammer"),
                title: "Product Detail for: Hammer".to_string(),
            }]
        );
    }

    #[test]
    fn test_secondary_may_be_empty() {
        let views = Rc::new(RefCell::new(Vec::new()));
        let _subscription = {
            let views = views.clone();
            compose_view3(
                &Stream::of(vec![1, 2]),
                &Stream::of(Vec::<u32>::new()),
                &Stream::of(None::<u32>),
                |products, suppliers, selected| (products.len(), suppliers.len(), selected),
            )
            .for_each(move |vm| views.borrow_mut().push(vm))
        };
        assert_eq!(*views.borrow(), vec![(2, 0, None)]);
    }

    #[test]
    fn test_readiness_rules() {
        assert!(!None::<u8>.is_ready());
        assert!(Some(0u8).is_ready());
        assert!(!Vec::<u8>::new().is_ready());
        assert!(!String::new().is_ready());
        assert!("x".to_string().is_ready());
    }
}
