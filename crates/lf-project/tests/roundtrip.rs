use lf_circuit::{
    AddComponent, AddTemplate, ComponentKind, ComponentSpec, Connect, Designer, EngineConfig, History,
    IcTemplate, SetInputState, TickClocks,
};
use lf_core::CompId;
use lf_project::schema::*;
use lf_project::{
    LATEST_VERSION, ProjectError, deserialize, load, load_json, load_yaml, save, save_json, save_yaml,
    serialize,
};

fn place(designer: &mut Designer, history: &mut History, spec: ComponentSpec) -> CompId {
    let add = AddComponent::new(designer, spec).expect("reserve component");
    let id = add.id();
    history.perform(designer, add).expect("add component");
    id
}

fn connect(designer: &mut Designer, history: &mut History, from: (CompId, usize), to: (CompId, usize)) {
    let source = designer.component(from.0).unwrap().output(from.1).unwrap();
    let target = designer.component(to.0).unwrap().input(to.1).unwrap();
    let action = Connect::new(designer, source, target);
    history.perform(designer, action).expect("connect");
}

fn set(designer: &mut Designer, history: &mut History, comp: CompId, on: bool) {
    let action = SetInputState::new(designer, comp, on).expect("input component");
    history.perform(designer, action).expect("set input");
}

fn and_template() -> IcTemplate {
    let mut inner = Designer::new();
    let mut history = History::new();
    let a = place(&mut inner, &mut history, ComponentSpec::new(ComponentKind::switch()).named("A"));
    let b = place(&mut inner, &mut history, ComponentSpec::new(ComponentKind::switch()).named("B"));
    let and = place(&mut inner, &mut history, ComponentSpec::new(ComponentKind::And));
    let led = place(&mut inner, &mut history, ComponentSpec::new(ComponentKind::led()).named("Y"));
    connect(&mut inner, &mut history, (a, 0), (and, 0));
    connect(&mut inner, &mut history, (b, 0), (and, 1));
    connect(&mut inner, &mut history, (and, 0), (led, 0));
    IcTemplate::from_circuit("AND IC", inner.circuit().clone()).expect("valid template")
}

/// A circuit touching every persisted feature: resized gate, latched
/// flip-flop, coloured LED, IC instance.
fn sample_designer() -> Designer {
    let mut designer = Designer::new();
    let mut history = History::new();
    let add = AddTemplate::new(&mut designer, and_template());
    let template = add.id();
    history.perform(&mut designer, add).unwrap();

    let a = place(&mut designer, &mut history, ComponentSpec::new(ComponentKind::switch()).named("A"));
    let b = place(&mut designer, &mut history, ComponentSpec::new(ComponentKind::switch()).named("B"));
    let and3 = place(
        &mut designer,
        &mut history,
        ComponentSpec::new(ComponentKind::And).with_inputs(3),
    );
    let clock = place(&mut designer, &mut history, ComponentSpec::new(ComponentKind::clock()));
    let ff = place(&mut designer, &mut history, ComponentSpec::new(ComponentKind::d_flip_flop()));
    let red = place(
        &mut designer,
        &mut history,
        ComponentSpec::new(ComponentKind::Led {
            color: "#ff0000".to_string(),
        })
        .named("Q"),
    );
    let spec = designer.ic_spec(template).unwrap();
    let ic = place(&mut designer, &mut history, spec);
    let out = place(&mut designer, &mut history, ComponentSpec::new(ComponentKind::led()).named("IC out"));

    connect(&mut designer, &mut history, (a, 0), (and3, 0));
    connect(&mut designer, &mut history, (b, 0), (and3, 1));
    connect(&mut designer, &mut history, (a, 0), (ff, 0));
    connect(&mut designer, &mut history, (clock, 0), (ff, 1));
    connect(&mut designer, &mut history, (ff, 0), (red, 0));
    connect(&mut designer, &mut history, (a, 0), (ic, 0));
    connect(&mut designer, &mut history, (b, 0), (ic, 1));
    connect(&mut designer, &mut history, (ic, 0), (out, 0));

    set(&mut designer, &mut history, a, true);
    set(&mut designer, &mut history, b, true);
    history.perform(&mut designer, TickClocks::all()).unwrap();
    // Q latched high; dropping D afterwards must not disturb it.
    set(&mut designer, &mut history, a, false);
    designer
}

#[test]
fn designer_roundtrip_is_exact() {
    let designer = sample_designer();
    let file = serialize(&designer).unwrap();
    assert_eq!(file.version, LATEST_VERSION);
    assert_eq!(file.templates.len(), 1);
    assert_eq!(file.circuit.components.len(), 8);
    assert_eq!(file.circuit.wires.len(), 8);
    assert_eq!(file.circuit.components[2].inputs, Some(3));
    assert_eq!(file.circuit.components[0].inputs, None);

    let restored = deserialize(&file).unwrap();
    assert_eq!(restored.circuit(), designer.circuit());
    let original: Vec<&IcTemplate> = designer.templates().map(|(_, t)| t).collect();
    let copied: Vec<&IcTemplate> = restored.templates().map(|(_, t)| t).collect();
    assert_eq!(original, copied);
    assert!(restored.last_pass().unwrap().is_settled());

    // Serializing again gives the same tree.
    assert_eq!(serialize(&restored).unwrap(), file);
}

#[test]
fn latched_flip_flop_survives_reload() {
    let designer = sample_designer();
    let restored = deserialize(&serialize(&designer).unwrap()).unwrap();
    let q = restored.circuit().find("Q").unwrap();
    assert!(restored.input_signal(q, 0).unwrap());
    let out = restored.circuit().find("IC out").unwrap();
    assert!(!restored.input_signal(out, 0).unwrap());
}

#[test]
fn step_cap_setting_roundtrips() {
    let designer = Designer::with_config(EngineConfig::default().with_max_steps(500));
    let file = serialize(&designer).unwrap();
    assert_eq!(file.settings.max_steps, Some(500));
    assert_eq!(deserialize(&file).unwrap().config().max_steps, 500);

    let file = serialize(&Designer::new()).unwrap();
    assert!(file.settings.is_default());
}

#[test]
fn roundtrip_yaml_and_json_files() {
    let file = serialize(&sample_designer()).unwrap();
    let temp_dir = std::env::temp_dir();

    let yaml = temp_dir.join("lf_project_roundtrip.yaml");
    save_yaml(&yaml, &file).unwrap();
    assert_eq!(load_yaml(&yaml).unwrap(), file);

    let json = temp_dir.join("lf_project_roundtrip.json");
    save_json(&json, &file).unwrap();
    assert_eq!(load_json(&json).unwrap(), file);

    let by_extension = temp_dir.join("lf_project_roundtrip_ext.yml");
    save(&by_extension, &file).unwrap();
    assert_eq!(load(&by_extension).unwrap(), file);

    let unknown = temp_dir.join("lf_project_roundtrip.txt");
    assert!(matches!(save(&unknown, &file), Err(ProjectError::UnknownFormat { .. })));
}

#[test]
fn hand_written_yaml_loads() {
    let text = r##"
version: 1
name: inverter
circuit:
  components:
    - { name: In, type: switch, state: { on: true } }
    - { name: Inv, type: not }
    - { name: Out, type: led, state: { color: "#00ff00" } }
  wires:
    - { from: { component: 0, port: 0 }, to: { component: 1, port: 0 } }
    - { from: { component: 1, port: 0 }, to: { component: 2, port: 0 } }
"##;
    let file: CircuitFile = serde_yaml::from_str(text).unwrap();
    let designer = deserialize(&file).unwrap();
    let out = designer.circuit().find("Out").unwrap();
    assert!(!designer.input_signal(out, 0).unwrap());
    assert_eq!(
        designer.component(out).unwrap().kind,
        ComponentKind::Led {
            color: "#00ff00".to_string()
        }
    );
}

/// Set and reset switches into an SR latch whose Q lights an LED.
fn latch_circuit(designer: &mut Designer, history: &mut History) {
    let s = place(designer, history, ComponentSpec::new(ComponentKind::switch()).named("S"));
    let r = place(designer, history, ComponentSpec::new(ComponentKind::switch()).named("R"));
    let latch = place(designer, history, ComponentSpec::new(ComponentKind::sr_latch()));
    let q = place(designer, history, ComponentSpec::new(ComponentKind::led()).named("Q"));
    connect(designer, history, (s, 0), (latch, 0));
    connect(designer, history, (r, 0), (latch, 1));
    connect(designer, history, (latch, 0), (q, 0));
}

/// SET/RESET switches driving an instance of `template`, with its first
/// output on an LED named OUT.
fn drive_ic(designer: &mut Designer, history: &mut History, template: lf_core::TemplateId) -> (CompId, CompId) {
    let set_sw = place(designer, history, ComponentSpec::new(ComponentKind::switch()).named("SET"));
    let reset_sw = place(designer, history, ComponentSpec::new(ComponentKind::switch()).named("RESET"));
    let spec = designer.ic_spec(template).unwrap();
    let ic = place(designer, history, spec);
    let out = place(designer, history, ComponentSpec::new(ComponentKind::led()).named("OUT"));
    connect(designer, history, (set_sw, 0), (ic, 0));
    connect(designer, history, (reset_sw, 0), (ic, 1));
    connect(designer, history, (ic, 0), (out, 0));
    (set_sw, reset_sw)
}

fn out_lit(designer: &Designer) -> bool {
    let out = designer.circuit().find("OUT").unwrap();
    designer.input_signal(out, 0).unwrap()
}

#[test]
fn latched_ic_survives_reload() {
    let mut inner = Designer::new();
    let mut history = History::new();
    latch_circuit(&mut inner, &mut history);
    let template = IcTemplate::from_circuit("LATCH", inner.circuit().clone()).unwrap();

    let mut designer = Designer::new();
    let add = AddTemplate::new(&mut designer, template);
    let id = add.id();
    history.perform(&mut designer, add).unwrap();
    let (set_sw, _) = drive_ic(&mut designer, &mut history, id);
    set(&mut designer, &mut history, set_sw, true);
    set(&mut designer, &mut history, set_sw, false);
    assert!(out_lit(&designer));

    let file = serialize(&designer).unwrap();
    let mut restored = deserialize(&file).unwrap();
    assert!(out_lit(&restored));
    assert_eq!(restored.circuit(), designer.circuit());
    assert_eq!(serialize(&restored).unwrap(), file);

    // The restored latch still responds to its inputs.
    let mut history = History::new();
    let reset = restored.circuit().find("RESET").unwrap();
    set(&mut restored, &mut history, reset, true);
    assert!(!out_lit(&restored));

    // Saved inner state must line up with the template.
    let mut short = file.clone();
    let ic_state = &mut short.circuit.components[2].state;
    if let Some(StateValue::Inner(inner)) = ic_state.get_mut("inner") {
        inner.pop();
    }
    assert!(matches!(deserialize(&short), Err(ProjectError::Decode { .. })));

    // Without saved state the instance starts from its template.
    let mut bare = file.clone();
    bare.circuit.components[2].state.remove("inner");
    bare.circuit.components[2].high = None;
    assert!(!out_lit(&deserialize(&bare).unwrap()));
}

#[test]
fn nested_latched_ic_survives_reload() {
    let mut history = History::new();
    let mut inner = Designer::new();
    latch_circuit(&mut inner, &mut history);
    let latch = IcTemplate::from_circuit("LATCH", inner.circuit().clone()).unwrap();

    // A wrapper around one latch instance, built in its own session.
    let mut wrap_session = Designer::new();
    let add = AddTemplate::new(&mut wrap_session, latch.clone());
    let latch_id = add.id();
    history.perform(&mut wrap_session, add).unwrap();
    let s = place(&mut wrap_session, &mut history, ComponentSpec::new(ComponentKind::switch()));
    let r = place(&mut wrap_session, &mut history, ComponentSpec::new(ComponentKind::switch()));
    let spec = wrap_session.ic_spec(latch_id).unwrap();
    let nested = place(&mut wrap_session, &mut history, spec);
    let y = place(&mut wrap_session, &mut history, ComponentSpec::new(ComponentKind::led()));
    connect(&mut wrap_session, &mut history, (s, 0), (nested, 0));
    connect(&mut wrap_session, &mut history, (r, 0), (nested, 1));
    connect(&mut wrap_session, &mut history, (nested, 0), (y, 0));
    let wrap = IcTemplate::from_circuit("WRAP", wrap_session.circuit().clone()).unwrap();

    let mut designer = Designer::new();
    let add = AddTemplate::new(&mut designer, latch);
    history.perform(&mut designer, add).unwrap();
    let add = AddTemplate::new(&mut designer, wrap);
    let wrap_id = add.id();
    history.perform(&mut designer, add).unwrap();
    let (set_sw, _) = drive_ic(&mut designer, &mut history, wrap_id);
    set(&mut designer, &mut history, set_sw, true);
    set(&mut designer, &mut history, set_sw, false);
    assert!(out_lit(&designer));

    let file = serialize(&designer).unwrap();
    let restored = deserialize(&file).unwrap();
    assert!(out_lit(&restored));
    assert_eq!(restored.circuit(), designer.circuit());

    let path = std::env::temp_dir().join("lf_project_nested_latch.yaml");
    save_yaml(&path, &file).unwrap();
    assert_eq!(load_yaml(&path).unwrap(), file);
}

fn legacy_file() -> CircuitFile {
    CircuitFile {
        version: 0,
        name: "legacy".to_string(),
        settings: SettingsDef::default(),
        templates: vec![],
        circuit: CircuitDef {
            components: vec![
                ComponentDef::new("H", "consthigh"),
                ComponentDef::new("N", "notgate"),
                ComponentDef::new("L", "led"),
            ],
            wires: vec![
                WireDef {
                    from: PortRef { component: 0, port: 0 },
                    to: PortRef { component: 1, port: 0 },
                },
                WireDef {
                    from: PortRef { component: 1, port: 0 },
                    to: PortRef { component: 2, port: 0 },
                },
            ],
        },
    }
}

#[test]
fn legacy_file_is_migrated_on_load() {
    let path = std::env::temp_dir().join("lf_project_legacy.json");
    std::fs::write(&path, serde_json::to_string(&legacy_file()).unwrap()).unwrap();
    let file = load_json(&path).unwrap();
    assert_eq!(file.version, LATEST_VERSION);
    assert_eq!(file.circuit.components[0].kind, "constant_high");

    let designer = deserialize(&legacy_file()).unwrap();
    let led = designer.circuit().find("L").unwrap();
    assert!(!designer.input_signal(led, 0).unwrap());
}

#[test]
fn decode_errors_are_reported() {
    let mut bad_port = legacy_file();
    bad_port.circuit.wires[1].to.port = 3;
    assert!(matches!(deserialize(&bad_port), Err(ProjectError::Circuit(_))));

    let mut too_wide = legacy_file();
    too_wide.circuit.components[1] = ComponentDef {
        inputs: Some(9),
        ..ComponentDef::new("N", "and")
    };
    assert!(matches!(deserialize(&too_wide), Err(ProjectError::Decode { .. })));

    let mut fixed_count = legacy_file();
    fixed_count.circuit.components[2].inputs = Some(2);
    assert!(matches!(deserialize(&fixed_count), Err(ProjectError::Decode { .. })));

    let mut bad_high = legacy_file();
    bad_high.circuit.components[1].high = Some(vec![1]);
    assert!(matches!(deserialize(&bad_high), Err(ProjectError::Decode { .. })));

    let mut future = legacy_file();
    future.version = LATEST_VERSION + 1;
    assert!(matches!(deserialize(&future), Err(ProjectError::Validation(_))));
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn kind(code: u8) -> ComponentKind {
        match code % 5 {
            0 => ComponentKind::switch(),
            1 => ComponentKind::Not,
            2 => ComponentKind::And,
            3 => ComponentKind::Or,
            _ => ComponentKind::led(),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn random_feed_forward_circuits_roundtrip(
            codes in prop::collection::vec(any::<u8>(), 2..8),
            seeds in prop::collection::vec(any::<u8>(), 32),
        ) {
            let mut designer = Designer::new();
            let mut history = History::new();
            let ids: Vec<CompId> = codes
                .iter()
                .map(|c| place(&mut designer, &mut history, ComponentSpec::new(kind(*c))))
                .collect();

            // Wires only run forward, so the circuit is acyclic.
            let mut seed = seeds.iter().cycle();
            for (j, target) in ids.iter().enumerate() {
                let inputs = designer.component(*target).unwrap().inputs().len();
                for k in 0..inputs {
                    let pick = *seed.next().unwrap() as usize;
                    let sources: Vec<CompId> = ids[..j]
                        .iter()
                        .copied()
                        .filter(|s| !designer.component(*s).unwrap().outputs().is_empty())
                        .collect();
                    if sources.is_empty() || pick % 3 == 0 {
                        continue;
                    }
                    let source = sources[pick % sources.len()];
                    connect(&mut designer, &mut history, (source, 0), (*target, k));
                }
            }
            for id in &ids {
                if designer.component(*id).unwrap().kind.is_user_input() {
                    let on = *seed.next().unwrap() % 2 == 0;
                    set(&mut designer, &mut history, *id, on);
                }
            }

            let file = serialize(&designer).unwrap();
            let restored = deserialize(&file).unwrap();
            prop_assert_eq!(restored.circuit(), designer.circuit());
        }
    }
}
