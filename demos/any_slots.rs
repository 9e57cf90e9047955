//! Mixing values of different types in `Dynamic` slots.
//!
//! Run with: cargo run --example any_slots

use serde::{Deserialize, Serialize};
use serde_envelope::{from_str, to_string, Dynamic, Registry, Tagged, Value};
use std::collections::BTreeMap;
use std::error::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Temperature {
    celsius: f32,
}
serde_envelope::tagged!(Temperature => "demo.Temperature");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Reading {
    sensor: String,
    value: Dynamic,
}
serde_envelope::tagged!(Reading => "demo.Reading");

fn describe(value: &Value) -> String {
    match value {
        Value::Nil => "nothing".to_string(),
        Value::Scalar(scalar) => format!("{} {}", scalar.kind(), scalar),
        other => other
            .shape()
            .map(|shape| shape.to_string())
            .unwrap_or_default(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut attributes = BTreeMap::new();
    attributes.insert("floor".to_string(), Dynamic::from(3u8));
    attributes.insert("label".to_string(), Dynamic::from("lab"));
    attributes.insert("last".to_string(), Dynamic::new(Temperature { celsius: 21.5 }));
    attributes.insert("spare".to_string(), Dynamic::nil());

    let readings = vec![
        Reading {
            sensor: "t1".to_string(),
            value: Dynamic::new(Temperature { celsius: 19.25 }),
        },
        Reading {
            sensor: "door".to_string(),
            value: Dynamic::from(true),
        },
        Reading {
            sensor: "history".to_string(),
            value: Dynamic::new(vec![Some(18.5f32), None, Some(20.0)]),
        },
    ];

    let attributes_json = to_string(&attributes)?;
    let readings_json = to_string(&readings)?;
    println!("Attributes:\n{}\n", attributes_json);
    println!("Readings:\n{}\n", readings_json);

    let registry = Registry::new();
    registry.register::<Temperature>()?;
    registry.register::<Reading>()?;

    if let Value::Mapping(_, _, entries) = from_str(&attributes_json, &registry)? {
        for (key, value) in &entries {
            println!("{:>6}: {}", key, describe(value));
        }
    }

    let readings_back = Vec::<Reading>::from_value(from_str(&readings_json, &registry)?)?;
    assert_eq!(readings, readings_back);
    println!("\n✓ Round-trip successful");

    Ok(())
}
