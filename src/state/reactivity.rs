// ============================================================================
// REACTIVITY - Sistema de notificaciones/subscribers para reactividad
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

type Callback<E> = Rc<dyn Fn(&E)>;

/// Lista de subscribers compartida entre clones del estado que la contiene
pub struct Subscribers<E> {
    callbacks: Rc<RefCell<Vec<Callback<E>>>>,
}

impl<E> Subscribers<E> {
    pub fn new() -> Self {
        Self {
            callbacks: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Suscribirse a cambios
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&E) + 'static,
    {
        self.callbacks.borrow_mut().push(Rc::new(callback));
    }

    /// Notificar a todos los subscribers.
    /// Se copia la lista antes de llamar para que un callback pueda suscribir a otro.
    pub fn notify(&self, event: &E) {
        let callbacks: Vec<Callback<E>> = self.callbacks.borrow().iter().cloned().collect();
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Clone for Subscribers<E> {
    fn clone(&self) -> Self {
        Self {
            callbacks: Rc::clone(&self.callbacks),
        }
    }
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn clones_share_subscribers() {
        let subscribers: Subscribers<u32> = Subscribers::new();
        let seen = Rc::new(Cell::new(0));
        {
            let seen = Rc::clone(&seen);
            subscribers.subscribe(move |n| seen.set(seen.get() + n));
        }

        let clone = subscribers.clone();
        clone.notify(&3);
        subscribers.notify(&4);
        assert_eq!(seen.get(), 7);
        assert_eq!(clone.len(), 1);
    }

    #[test]
    fn callback_may_subscribe_during_notify() {
        let subscribers: Subscribers<()> = Subscribers::new();
        let inner = subscribers.clone();
        subscribers.subscribe(move |_| inner.subscribe(|_| {}));
        subscribers.notify(&());
        assert_eq!(subscribers.len(), 2);
    }
}
