use testtree_store::ElementRef;

/// Subscriber told about elements whose categories really changed.
///
/// Called synchronously, once per detected change, while the factory's
/// category lock is held. Reading the factory and resolving members is
/// fine; resolving a suite or reconciling categories from here deadlocks.
pub trait ElementObserver: Send + Sync {
    fn element_changed(&self, element: &ElementRef);
}

impl<F> ElementObserver for F
where
    F: Fn(&ElementRef) + Send + Sync,
{
    fn element_changed(&self, element: &ElementRef) {
        self(element)
    }
}
