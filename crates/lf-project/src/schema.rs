//! Circuit file schema definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CircuitFile {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "SettingsDef::is_default")]
    pub settings: SettingsDef,
    /// IC templates. A template may only use templates listed before it.
    #[serde(default)]
    pub templates: Vec<TemplateDef>,
    #[serde(default)]
    pub circuit: CircuitDef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettingsDef {
    /// Overrides the engine's step cap for this circuit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<usize>,
}

impl SettingsDef {
    pub fn is_default(&self) -> bool {
        self == &SettingsDef::default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CircuitDef {
    #[serde(default)]
    pub components: Vec<ComponentDef>,
    #[serde(default)]
    pub wires: Vec<WireDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentDef {
    pub name: String,
    /// Component type tag (`and`, `switch`, `d_flip_flop`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Input port count; the type's default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<usize>,
    /// Type-specific state (switch position, LED colour, flip-flop contents).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub state: BTreeMap<String, StateValue>,
    /// Indices of output ports that were high when saved. When absent the
    /// component is evaluated on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Vec<usize>>,
}

impl ComponentDef {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            inputs: None,
            outputs: None,
            state: BTreeMap::new(),
            high: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StateValue {
    Bool(bool),
    Int(i64),
    Text(String),
    /// Inner component states of an IC instance.
    Inner(Vec<InnerDef>),
}

/// Saved state of one component inside an IC instance, by position in the
/// template's component list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InnerDef {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub state: BTreeMap<String, StateValue>,
    /// Indices of output ports that were high.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub high: Vec<usize>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireDef {
    pub from: PortRef,
    pub to: PortRef,
}

/// A port addressed by component index (in the enclosing circuit's
/// component list) and port index (in that component's output or input
/// list).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PortRef {
    pub component: usize,
    pub port: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateDef {
    pub name: String,
    pub circuit: CircuitDef,
    /// Component indices of the switches/buttons that become IC inputs.
    #[serde(default)]
    pub inputs: Vec<usize>,
    /// Component indices of the LEDs that become IC outputs.
    #[serde(default)]
    pub outputs: Vec<usize>,
}
