//! Undo/redo exactness for single, composite and random action sequences.

use lf_circuit::{
    Action, AddComponent, CircuitError, ComponentKind, ComponentSpec, Connect, ConnectionError,
    Designer, GroupAction, History, PortCountChange, PortDirection, Property, Select,
    SetInputState, SetProperty, TickClocks, delete_group, deselect_all, select_group,
};
use lf_core::{CompId, WireId};

fn place(designer: &mut Designer, history: &mut History, kind: ComponentKind) -> CompId {
    let add = AddComponent::new(designer, ComponentSpec::new(kind)).expect("reserve component");
    let id = add.id();
    history.perform(designer, add).expect("add component");
    id
}

fn connect(
    designer: &mut Designer,
    history: &mut History,
    from: (CompId, usize),
    to: (CompId, usize),
) -> WireId {
    let source = designer.component(from.0).unwrap().output(from.1).unwrap();
    let target = designer.component(to.0).unwrap().input(to.1).unwrap();
    let action = Connect::new(designer, source, target);
    let wire = action.wire();
    history.perform(designer, action).expect("connect");
    wire
}

fn set(designer: &mut Designer, history: &mut History, comp: CompId, on: bool) {
    let action = SetInputState::new(designer, comp, on).expect("input component");
    history.perform(designer, action).expect("set input");
}

/// Two switches into an AND gate into an LED.
struct AndCircuit {
    a: CompId,
    b: CompId,
    and: CompId,
    led: CompId,
}

fn and_circuit(designer: &mut Designer, history: &mut History) -> AndCircuit {
    let a = place(designer, history, ComponentKind::switch());
    let b = place(designer, history, ComponentKind::switch());
    let and = place(designer, history, ComponentKind::And);
    let led = place(designer, history, ComponentKind::led());
    connect(designer, history, (a, 0), (and, 0));
    connect(designer, history, (b, 0), (and, 1));
    connect(designer, history, (and, 0), (led, 0));
    AndCircuit { a, b, and, led }
}

#[test]
fn connect_undo_redo_round_trip() {
    let mut designer = Designer::new();
    let mut history = History::new();
    let sw = place(&mut designer, &mut history, ComponentKind::ConstantHigh);
    let led = place(&mut designer, &mut history, ComponentKind::led());
    let before = designer.circuit().clone();

    let wire = connect(&mut designer, &mut history, (sw, 0), (led, 0));
    let after = designer.circuit().clone();
    assert!(designer.input_signal(led, 0).unwrap());

    assert!(history.undo(&mut designer).unwrap());
    assert_eq!(designer.circuit(), &before);
    assert!(designer.wire(wire).is_none());

    assert!(history.redo(&mut designer).unwrap());
    assert_eq!(designer.circuit(), &after);
}

#[test]
fn group_executes_in_order_and_undoes_in_reverse() {
    let mut designer = Designer::new();
    let mut history = History::new();
    let led = place(&mut designer, &mut history, ComponentKind::led());
    let before = designer.circuit().clone();

    // The connect refers to ports the first child has only reserved.
    let add = AddComponent::new(&mut designer, ComponentSpec::new(ComponentKind::ConstantHigh)).unwrap();
    let source = add.outputs()[0];
    let target = designer.component(led).unwrap().input(0).unwrap();
    let connect = Connect::new(&mut designer, source, target);
    let group = GroupAction::named("Place Source").with(add).with(connect);

    history.perform(&mut designer, group).unwrap();
    assert!(designer.input_signal(led, 0).unwrap());
    assert_eq!(history.undo_names().last().map(String::as_str), Some("Place Source"));

    history.undo(&mut designer).unwrap();
    assert_eq!(designer.circuit(), &before);
}

#[test]
fn failing_child_rolls_back_the_group() {
    let mut designer = Designer::new();
    let mut history = History::new();
    let high = place(&mut designer, &mut history, ComponentKind::ConstantHigh);
    let led = place(&mut designer, &mut history, ComponentKind::led());
    let before = designer.circuit().clone();

    let source = designer.component(high).unwrap().output(0).unwrap();
    let target = designer.component(led).unwrap().input(0).unwrap();
    let add = AddComponent::new(&mut designer, ComponentSpec::new(ComponentKind::Not)).unwrap();
    let first = Connect::new(&mut designer, source, target);
    let second = Connect::new(&mut designer, add.outputs()[0], target);
    let group = GroupAction::new().with(add).with(first).with(second);

    let err = history.perform(&mut designer, group).unwrap_err();
    assert!(matches!(
        err,
        CircuitError::Connection(ConnectionError::InputOccupied { .. })
    ));
    assert_eq!(designer.circuit(), &before);
    assert_eq!(history.undo_names().len(), 2);
}

#[test]
fn deleting_a_connected_gate_is_fully_reversible() {
    let mut designer = Designer::new();
    let mut history = History::new();
    let c = and_circuit(&mut designer, &mut history);
    set(&mut designer, &mut history, c.a, true);
    set(&mut designer, &mut history, c.b, true);
    let select = select_group(&designer, &[c.and, c.led]);
    history.perform(&mut designer, select).unwrap();
    assert!(designer.input_signal(c.led, 0).unwrap());
    let before = designer.circuit().clone();
    let selection = designer.selection().clone();

    let delete = delete_group(&designer, &[c.and]).unwrap();
    assert_eq!(delete.len(), 1 + 3 + 1);
    history.perform(&mut designer, delete).unwrap();
    assert!(designer.component(c.and).is_none());
    assert_eq!(designer.circuit().wire_count(), 0);
    assert!(!designer.input_signal(c.led, 0).unwrap());
    assert!(!designer.is_selected(c.and));

    history.undo(&mut designer).unwrap();
    assert_eq!(designer.circuit(), &before);
    assert_eq!(designer.selection(), &selection);
    assert!(designer.input_signal(c.led, 0).unwrap());

    history.redo(&mut designer).unwrap();
    assert!(designer.component(c.and).is_none());
}

#[test]
fn removing_a_wired_component_is_refused() {
    let mut designer = Designer::new();
    let mut history = History::new();
    let c = and_circuit(&mut designer, &mut history);
    let remove = lf_circuit::RemoveComponent::new(&designer, c.and).unwrap();
    let err = history.perform(&mut designer, remove).unwrap_err();
    assert_eq!(err, CircuitError::WiresAttached { comp: c.and, count: 3 });
}

#[test]
fn port_count_shrink_disconnects_and_undo_reconnects() {
    let mut designer = Designer::new();
    let mut history = History::new();
    let c = and_circuit(&mut designer, &mut history);

    let grow = PortCountChange::new(&mut designer, c.and, PortDirection::Input, 4).unwrap();
    history.perform(&mut designer, grow).unwrap();
    let extra = place(&mut designer, &mut history, ComponentKind::ConstantHigh);
    connect(&mut designer, &mut history, (extra, 0), (c.and, 3));
    set(&mut designer, &mut history, c.a, true);
    set(&mut designer, &mut history, c.b, true);
    assert!(!designer.input_signal(c.led, 0).unwrap(), "input 2 is floating low");
    let before = designer.circuit().clone();
    let wires = designer.circuit().wire_count();

    let shrink = PortCountChange::new(&mut designer, c.and, PortDirection::Input, 2).unwrap();
    history.perform(&mut designer, shrink).unwrap();
    assert_eq!(designer.component(c.and).unwrap().inputs().len(), 2);
    assert_eq!(designer.circuit().wire_count(), wires - 1);
    assert!(designer.input_signal(c.led, 0).unwrap());

    history.undo(&mut designer).unwrap();
    assert_eq!(designer.circuit(), &before);
    assert_eq!(designer.circuit().wire_count(), wires);
}

#[test]
fn port_count_request_is_clamped() {
    let mut designer = Designer::new();
    let mut history = History::new();
    let or = place(&mut designer, &mut history, ComponentKind::Or);
    let change = PortCountChange::new(&mut designer, or, PortDirection::Input, 20).unwrap();
    assert_eq!(change.target(), 8);
    history.perform(&mut designer, change).unwrap();
    assert_eq!(designer.component(or).unwrap().inputs().len(), 8);

    let same = PortCountChange::new(&mut designer, or, PortDirection::Input, 9).unwrap();
    assert!(same.is_empty());
    assert!(!history.perform(&mut designer, same).unwrap());
}

#[test]
fn undo_restores_flip_flop_state() {
    let mut designer = Designer::new();
    let mut history = History::new();
    let d = place(&mut designer, &mut history, ComponentKind::switch());
    let clock = place(&mut designer, &mut history, ComponentKind::clock());
    let ff = place(&mut designer, &mut history, ComponentKind::t_flip_flop());
    connect(&mut designer, &mut history, (d, 0), (ff, 0));
    connect(&mut designer, &mut history, (clock, 0), (ff, 1));
    set(&mut designer, &mut history, d, true);
    let before = designer.circuit().clone();

    history.perform(&mut designer, TickClocks::all()).unwrap();
    assert!(designer.output_signal(ff, 0).unwrap());

    history.undo(&mut designer).unwrap();
    assert_eq!(designer.circuit(), &before);
    assert_eq!(
        designer.component(ff).unwrap().kind,
        ComponentKind::TFlipFlop { q: false, clk: false }
    );
}

#[test]
fn property_and_selection_round_trip() {
    let mut designer = Designer::new();
    let mut history = History::new();
    let led = place(&mut designer, &mut history, ComponentKind::led());
    let clock = place(&mut designer, &mut history, ComponentKind::clock());

    let color = SetProperty::new(led, Property::Color("#ff0000".into()));
    history.perform(&mut designer, color).unwrap();
    let rename = SetProperty::new(clock, Property::Name("clk".into()));
    history.perform(&mut designer, rename).unwrap();
    history.perform(&mut designer, Select::select(led)).unwrap();
    assert_eq!(designer.circuit().find("clk"), Some(clock));
    assert!(designer.is_selected(led));

    let bad = SetProperty::new(led, Property::ClockPeriod(10));
    assert!(matches!(
        history.perform(&mut designer, bad),
        Err(CircuitError::InvalidKind { .. })
    ));

    history.undo(&mut designer).unwrap();
    history.undo(&mut designer).unwrap();
    history.undo(&mut designer).unwrap();
    assert!(designer.selection().is_empty());
    assert_eq!(designer.circuit().find("clk"), None);
    assert_eq!(
        designer.component(led).unwrap().kind,
        ComponentKind::led()
    );
}

#[test]
fn new_action_clears_redo_and_empty_actions_are_skipped() {
    let mut designer = Designer::new();
    let mut history = History::new();
    let sw = place(&mut designer, &mut history, ComponentKind::switch());
    assert!(!history.perform(&mut designer, TickClocks::all()).unwrap());
    let nothing = deselect_all(&designer);
    assert!(!history.perform(&mut designer, nothing).unwrap());

    set(&mut designer, &mut history, sw, true);
    history.undo(&mut designer).unwrap();
    assert!(history.can_redo());
    assert_eq!(history.redo_names(), vec!["Switched On Switch".to_string()]);

    set(&mut designer, &mut history, sw, false);
    assert!(!history.can_redo());
    assert_eq!(
        history.undo_names(),
        vec!["Added Switch".to_string(), "Switched Off Switch".to_string()]
    );

    assert!(history.undo(&mut designer).unwrap());
    assert!(history.undo(&mut designer).unwrap());
    assert!(!history.undo(&mut designer).unwrap());
    assert_eq!(designer.circuit().component_count(), 0);
}

#[test]
fn undo_before_execute_is_an_error() {
    let mut designer = Designer::new();
    let mut action = TickClocks::all();
    assert!(matches!(
        action.undo(&mut designer),
        Err(CircuitError::NotExecuted { .. })
    ));
}

mod proptests {
    use super::*;
    use lf_circuit::Circuit;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Add(u8),
        Connect(usize, usize, usize),
        Toggle(usize),
        Resize(usize, usize),
        Delete(usize),
        Tick,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0u8..6).prop_map(Op::Add),
            4 => (any::<usize>(), any::<usize>(), any::<usize>())
                .prop_map(|(a, b, p)| Op::Connect(a, b, p)),
            2 => any::<usize>().prop_map(Op::Toggle),
            1 => (any::<usize>(), 0usize..10).prop_map(|(c, n)| Op::Resize(c, n)),
            1 => any::<usize>().prop_map(Op::Delete),
            1 => Just(Op::Tick),
        ]
    }

    fn kind(tag: u8) -> ComponentKind {
        match tag {
            0 => ComponentKind::switch(),
            1 => ComponentKind::And,
            2 => ComponentKind::Xor,
            3 => ComponentKind::led(),
            4 => ComponentKind::d_flip_flop(),
            _ => ComponentKind::clock(),
        }
    }

    fn build(designer: &mut Designer, op: &Op) -> Option<Box<dyn Action>> {
        let comps: Vec<CompId> = designer.circuit().components().map(|c| c.id).collect();
        let pick = |i: usize| comps.get(i % comps.len().max(1)).copied();
        match op {
            Op::Add(tag) => {
                let add = AddComponent::new(designer, ComponentSpec::new(kind(*tag))).ok()?;
                Some(Box::new(add))
            }
            Op::Connect(a, b, p) => {
                let from = designer.component(pick(*a)?)?;
                let to = designer.component(pick(*b)?)?;
                let source = *from.outputs().first()?;
                let target = *to.inputs().get(p % to.inputs().len().max(1))?;
                Some(Box::new(Connect::new(designer, source, target)))
            }
            Op::Toggle(i) => {
                let comp = pick(*i)?;
                let on = match designer.component(comp)?.kind {
                    ComponentKind::Switch { on } => on,
                    _ => return None,
                };
                Some(Box::new(SetInputState::new(designer, comp, !on).ok()?))
            }
            Op::Resize(i, n) => {
                let comp = pick(*i)?;
                let change = PortCountChange::new(designer, comp, PortDirection::Input, *n).ok()?;
                Some(Box::new(change))
            }
            Op::Delete(i) => Some(Box::new(delete_group(designer, &[pick(*i)?]).ok()?)),
            Op::Tick => Some(Box::new(TickClocks::all())),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn random_edits_undo_and_redo_exactly(ops in prop::collection::vec(op(), 1..40)) {
            let mut designer = Designer::new();
            let mut history = History::new();
            let mut states: Vec<Circuit> = vec![designer.circuit().clone()];

            for op in &ops {
                let Some(mut action) = build(&mut designer, op) else { continue };
                let prior = designer.circuit().clone();
                match action.execute(&mut designer) {
                    Ok(()) => {
                        if history.add_boxed(action) {
                            states.push(designer.circuit().clone());
                        } else {
                            prop_assert_eq!(designer.circuit(), &prior);
                        }
                    }
                    Err(_) => {
                        prop_assert_eq!(designer.circuit(), &prior);
                    }
                }
            }

            let last = states.last().cloned();
            for expected in states.iter().rev().skip(1) {
                prop_assert!(history.undo(&mut designer).unwrap());
                prop_assert_eq!(designer.circuit(), expected);
            }
            prop_assert!(!history.can_undo());

            while history.redo(&mut designer).unwrap() {}
            prop_assert_eq!(Some(designer.circuit().clone()), last);
        }
    }
}
