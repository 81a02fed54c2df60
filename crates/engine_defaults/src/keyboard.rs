//! Key bindings.
//!
//! The engine never polls a device. The application translates its own
//! input events into [`KeyEvent`]s and either queues them on the controller
//! with [`KeyboardController::push`], to be dispatched during the next
//! update, or dispatches them on the spot with
//! [`KeyboardController::handle`].

use std::collections::BTreeMap;
use std::fmt;

use engine_ecs::{Component, Context, Dependency, RunFlag};
use engine_math::Transform2D;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Whether a key went down or came back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyState {
    Down,
    Up,
}

/// One key transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent<K> {
    /// The key that changed.
    pub key: K,
    /// Whether it went down or up.
    pub state: KeyState,
}

impl<K> KeyEvent<K> {
    /// A press of `key`.
    pub fn down(key: K) -> Self {
        Self {
            key,
            state: KeyState::Down,
        }
    }

    /// A release of `key`.
    pub fn up(key: K) -> Self {
        Self {
            key,
            state: KeyState::Up,
        }
    }
}

type Callback = Box<dyn FnMut()>;

struct Binding {
    down: Callback,
    up: Callback,
}

/// Maps keys of type `K` to a pair of zero-argument callbacks.
pub struct KeyboardController<K> {
    bindings: BTreeMap<K, Binding>,
    pending: Vec<KeyEvent<K>>,
}

impl<K> KeyboardController<K>
where
    K: Ord + fmt::Debug + 'static,
{
    /// A controller with no bindings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: BTreeMap::new(),
            pending: Vec::new(),
        }
    }

    /// Bind `key`, replacing any earlier binding.
    pub fn set_key(&mut self, key: K, down: impl FnMut() + 'static, up: impl FnMut() + 'static) {
        debug!(?key, "key bound");
        self.bindings.insert(
            key,
            Binding {
                down: Box::new(down),
                up: Box::new(up),
            },
        );
    }

    /// Builder form of [`KeyboardController::set_key`].
    #[must_use]
    pub fn with_key(
        mut self,
        key: K,
        down: impl FnMut() + 'static,
        up: impl FnMut() + 'static,
    ) -> Self {
        self.set_key(key, down, up);
        self
    }

    /// Bind `key` so that pressing it stops `run`.
    pub fn set_quit_key(&mut self, key: K, run: RunFlag) {
        self.set_key(key, move || run.stop(), || {});
    }

    /// Drop `key`'s binding. Returns whether one existed.
    pub fn remove_key(&mut self, key: &K) -> bool {
        self.bindings.remove(key).is_some()
    }

    /// Returns `true` if `key` has a binding.
    #[must_use]
    pub fn is_bound(&self, key: &K) -> bool {
        self.bindings.contains_key(key)
    }

    /// Queue `event` for the next update.
    pub fn push(&mut self, event: KeyEvent<K>) {
        self.pending.push(event);
    }

    /// Run the callback bound to `event` now. Returns `false` for unbound
    /// keys.
    pub fn handle(&mut self, event: &KeyEvent<K>) -> bool {
        let Some(binding) = self.bindings.get_mut(&event.key) else {
            trace!(key = ?event.key, "unbound key ignored");
            return false;
        };
        match event.state {
            KeyState::Down => (binding.down)(),
            KeyState::Up => (binding.up)(),
        }
        true
    }

    /// Dispatch and clear every queued event, oldest first. Returns how many
    /// hit a binding.
    pub fn dispatch_pending(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        pending.iter().filter(|event| self.handle(event)).count()
    }
}

impl<K> Default for KeyboardController<K>
where
    K: Ord + fmt::Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug> fmt::Debug for KeyboardController<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyboardController")
            .field("keys", &self.bindings.keys().collect::<Vec<_>>())
            .field("pending", &self.pending)
            .finish()
    }
}

impl<K> Component for KeyboardController<K>
where
    K: Ord + fmt::Debug + 'static,
{
    fn type_name() -> &'static str {
        "KeyboardController"
    }

    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::auto_attach::<Transform2D>()]
    }

    fn update(&mut self, _ctx: &mut Context<'_>) {
        self.dispatch_pending();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use engine_ecs::World;

    use super::*;

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let handle = Rc::clone(&count);
        (count, move || handle.set(handle.get() + 1))
    }

    #[test]
    fn test_down_and_up_run_their_own_callbacks() {
        let (downs, on_down) = counter();
        let (ups, on_up) = counter();
        let mut keys = KeyboardController::new().with_key('w', on_down, on_up);

        assert!(keys.handle(&KeyEvent::down('w')));
        assert!(keys.handle(&KeyEvent::down('w')));
        assert!(keys.handle(&KeyEvent::up('w')));
        assert!(!keys.handle(&KeyEvent::down('x')));

        assert_eq!(downs.get(), 2);
        assert_eq!(ups.get(), 1);
    }

    #[test]
    fn test_rebinding_replaces() {
        let (first, on_first) = counter();
        let (second, on_second) = counter();
        let mut keys = KeyboardController::new();
        keys.set_key('a', on_first, || {});
        keys.set_key('a', on_second, || {});
        keys.handle(&KeyEvent::down('a'));
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);

        assert!(keys.remove_key(&'a'));
        assert!(!keys.is_bound(&'a'));
    }

    #[test]
    fn test_quit_key_stops_the_world() {
        let mut world = World::new();
        let run = world.run_flag();
        let e = world.create_entity();
        let mut keys = KeyboardController::new();
        keys.set_quit_key("escape", world.run_flag());
        keys.push(KeyEvent::up("escape"));
        world.add_component(e, keys).unwrap();

        world.update();
        assert!(run.is_running());

        world
            .component_mut::<KeyboardController<&'static str>>(e)
            .unwrap()
            .push(KeyEvent::down("escape"));
        world.update();
        assert!(!run.is_running());
    }

    #[test]
    fn test_queued_events_dispatch_once_in_order() {
        let order = Rc::new(std::cell::RefCell::new(Vec::new()));
        let (down_log, up_log) = (Rc::clone(&order), Rc::clone(&order));
        let mut keys = KeyboardController::new().with_key(
            1u32,
            move || down_log.borrow_mut().push("down"),
            move || up_log.borrow_mut().push("up"),
        );
        keys.push(KeyEvent::down(1));
        keys.push(KeyEvent::down(2));
        keys.push(KeyEvent::up(1));

        assert_eq!(keys.dispatch_pending(), 2);
        assert_eq!(keys.dispatch_pending(), 0);
        assert_eq!(*order.borrow(), vec!["down", "up"]);
    }

    #[test]
    fn test_auto_attaches_transform() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, KeyboardController::<char>::new()).unwrap();
        assert!(world.has_component::<Transform2D>(e));
    }

    #[test]
    fn test_event_from_json() {
        let event: KeyEvent<char> = serde_json::from_str(r#"{ "key": "q", "state": "down" }"#).unwrap();
        assert_eq!(event, KeyEvent::down('q'));
    }
}
