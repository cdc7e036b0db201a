// ============================================================================
// STATE MODULE - State Management con Rc<RefCell> + notificaciones
// ============================================================================

pub mod reactivity;
pub mod session_state;
pub mod cart_state;

pub use reactivity::*;
pub use session_state::*;
pub use cart_state::*;
