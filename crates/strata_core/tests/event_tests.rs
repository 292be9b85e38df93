//! # Event Tests
//!
//! Listener behavior as seen through the universe: dispatch order, failure
//! propagation and unsubscription.
//!
//! Run with: cargo test --package strata_core --test event_tests

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use strata_core::{
    Component, ComponentAttached, ComponentDetached, ComponentType, EcsError, EntityCreated,
    EntityRemoved, Event, Universe,
};

#[derive(Debug)]
struct Position {
    x: f32,
}
impl Component for Position {}

#[derive(Debug)]
struct Veto;

impl fmt::Display for Veto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("attach vetoed")
    }
}

impl std::error::Error for Veto {}

#[test]
fn two_listeners_fire_once_each_in_registration_order() {
    let mut universe = Universe::default();
    let log = Rc::new(RefCell::new(Vec::new()));

    let first = Rc::clone(&log);
    universe
        .events_mut()
        .listen(move |event: &ComponentAttached| first.borrow_mut().push(("first", event.entity)));
    let second = Rc::clone(&log);
    universe
        .events_mut()
        .listen(move |event: &ComponentAttached| second.borrow_mut().push(("second", event.entity)));

    let entity = universe.create_entity().unwrap();
    universe.attach_component(entity, Position { x: 1.0 }).unwrap();

    assert_eq!(*log.borrow(), vec![("first", entity), ("second", entity)]);
}

#[test]
fn redundant_attach_publishes_nothing() {
    let mut universe = Universe::default();
    let count = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&count);
    universe
        .events_mut()
        .listen(move |_: &ComponentAttached| *counter.borrow_mut() += 1);

    let entity = universe.create_entity().unwrap();
    universe.attach_component(entity, Position { x: 1.0 }).unwrap();
    assert!(universe
        .attach_component(entity, Position { x: 2.0 })
        .unwrap()
        .is_none());

    assert_eq!(*count.borrow(), 1);
    assert_eq!(universe.component::<Position>(entity).map(|p| p.x), Some(1.0));
}

#[test]
fn listener_failure_aborts_fan_out_and_reaches_caller() {
    let mut universe = Universe::default();
    let reached = Rc::new(RefCell::new(false));

    universe
        .events_mut()
        .subscribe(|_: &ComponentAttached| Err(Veto.into()));
    let flag = Rc::clone(&reached);
    universe
        .events_mut()
        .listen(move |_: &ComponentAttached| *flag.borrow_mut() = true);

    let entity = universe.create_entity().unwrap();
    let err = universe
        .attach_component(entity, Position { x: 0.0 })
        .unwrap_err();

    match err {
        EcsError::Listener { event, source } => {
            assert!(event.ends_with("ComponentAttached"));
            assert_eq!(source.to_string(), "attach vetoed");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!*reached.borrow());
    // The attach itself happened before dispatch.
    assert!(universe.has_component::<Position>(entity));
}

#[test]
fn deferred_listener_failure_stops_the_drain() {
    let mut universe = Universe::default();
    universe
        .events_mut()
        .subscribe(|_: &ComponentDetached| Err("detach rejected".into()));

    let a = universe.create_entity().unwrap();
    let b = universe.create_entity().unwrap();
    universe.attach_component(a, Position { x: 0.0 }).unwrap();
    universe.attach_component(b, Position { x: 0.0 }).unwrap();

    universe.detach_component_deferred::<Position>(a);
    universe.detach_component_deferred::<Position>(b);

    assert!(matches!(
        universe.drain_actions(),
        Err(EcsError::Listener { .. })
    ));
    assert!(!universe.has_component::<Position>(a));
    assert!(universe.has_component::<Position>(b));
    assert_eq!(universe.pending_actions(), 1);
}

#[test]
fn unsubscribed_listener_is_not_called() {
    let mut universe = Universe::default();
    let count = Rc::new(RefCell::new(0));

    let counter = Rc::clone(&count);
    let id = universe
        .events_mut()
        .listen(move |_: &EntityCreated| *counter.borrow_mut() += 1);

    universe.create_entity().unwrap();
    assert!(universe.events_mut().unsubscribe::<EntityCreated>(id));
    universe.create_entity().unwrap();

    assert_eq!(*count.borrow(), 1);
    assert!(!universe.events().has_listeners::<EntityCreated>());
}

#[test]
fn destroy_publishes_detaches_before_removal() {
    let mut universe = Universe::default();
    let log = Rc::new(RefCell::new(Vec::new()));

    let detached = Rc::clone(&log);
    universe.events_mut().listen(move |event: &ComponentDetached| {
        assert_eq!(event.component, ComponentType::of::<Position>());
        detached.borrow_mut().push("detached");
    });
    let removed = Rc::clone(&log);
    universe
        .events_mut()
        .listen(move |_: &EntityRemoved| removed.borrow_mut().push("removed"));

    let entity = universe.create_entity().unwrap();
    universe.attach_component(entity, Position { x: 0.0 }).unwrap();
    universe.destroy_entity(entity).unwrap();

    assert_eq!(*log.borrow(), vec!["detached", "removed"]);
}

struct Damage(u32);
impl Event for Damage {}

#[test]
fn custom_events_share_the_bus() {
    let mut universe = Universe::default();
    let total = Rc::new(RefCell::new(0));

    let sum = Rc::clone(&total);
    universe
        .events_mut()
        .listen(move |damage: &Damage| *sum.borrow_mut() += damage.0);

    universe.events_mut().publish(&Damage(3)).unwrap();
    universe.events_mut().publish(&Damage(4)).unwrap();
    assert_eq!(*total.borrow(), 7);
}
