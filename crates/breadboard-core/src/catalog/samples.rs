//! Built-in sample parts, so the editor is usable without a parts library.

use crate::footprint::{ConnectorDefinition, ConnectorKind, MemoryAssets, PartDefinition};

const LED_RED_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="80" viewBox="0 0 40 80">
  <circle id="body" cx="20" cy="20" r="16" fill="#e53935"/>
  <line id="connector0pin" x1="12" y1="30" x2="12" y2="78" stroke="#999" stroke-width="2"/>
  <circle id="connector0terminal" cx="12" cy="78" r="2"/>
  <line id="connector1pin" x1="28" y1="30" x2="28" y2="70" stroke="#999" stroke-width="2"/>
  <circle id="connector1terminal" cx="28" cy="70" r="2"/>
</svg>"##;

const RESISTOR_330_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="20" viewBox="0 0 120 20">
  <line id="connector0pin" x1="30" y1="10" x2="2" y2="10" stroke="#999" stroke-width="2"/>
  <circle id="connector0terminal" cx="2" cy="10" r="2"/>
  <rect id="body" x="30" y="2" width="60" height="16" rx="6" fill="#d7b377"/>
  <line id="connector1pin" x1="90" y1="10" x2="118" y2="10" stroke="#999" stroke-width="2"/>
  <circle id="connector1terminal" cx="118" cy="10" r="2"/>
</svg>"##;

const ARDUINO_UNO_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="140" viewBox="0 0 200 140">
  <rect id="board" x="0" y="0" width="200" height="140" rx="8" fill="#00878f"/>
  <rect id="connector0pin" x="16" y="4" width="8" height="8"/>
  <circle id="connector0terminal" cx="20" cy="8" r="2"/>
  <rect id="connector1pin" x="36" y="4" width="8" height="8"/>
  <circle id="connector1terminal" cx="40" cy="8" r="2"/>
  <rect id="connector2pin" x="56" y="4" width="8" height="8"/>
  <circle id="connector2terminal" cx="60" cy="8" r="2"/>
</svg>"##;

pub const LED_RED_FOOTPRINT: &str = "/parts/breadboard/led-red-breadboard.svg";
pub const RESISTOR_330_FOOTPRINT: &str = "/parts/breadboard/resistor-330-breadboard.svg";
pub const ARDUINO_UNO_FOOTPRINT: &str = "/parts/breadboard/arduino-uno-breadboard.svg";

fn pin(index: usize, name: &str, description: &str) -> ConnectorDefinition {
    let mut connector =
        ConnectorDefinition::new(format!("connector{}", index), name, ConnectorKind::Source);
    connector.description = description.to_string();
    connector.svg_id = format!("connector{}pin", index);
    connector.terminal_id = format!("connector{}terminal", index);
    connector
}

fn part(
    id: &str,
    title: &str,
    description: &str,
    properties: &[(&str, &str)],
    tags: &[&str],
    footprint_ref: &str,
    connectors: Vec<ConnectorDefinition>,
) -> PartDefinition {
    let mut part = PartDefinition::new(id, title);
    part.description = description.to_string();
    part.author = "Sample Author".to_string();
    part.properties = properties
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    part.tags = tags.iter().map(|t| t.to_string()).collect();
    part.footprint_ref = footprint_ref.to_string();
    part.connectors = connectors;
    part
}

/// The sample part definitions.
pub fn sample_parts() -> Vec<PartDefinition> {
    vec![
        part(
            "led-red",
            "Red LED (5mm)",
            "A standard 5mm red LED",
            &[
                ("family", "LED"),
                ("color", "red"),
                ("size", "5mm"),
                ("forward voltage", "2.0V"),
                ("max current", "20mA"),
            ],
            &["LED", "light", "red"],
            LED_RED_FOOTPRINT,
            vec![pin(0, "anode", "positive lead"), pin(1, "cathode", "negative lead")],
        ),
        part(
            "resistor-330",
            "330Ω Resistor",
            "A 330 ohm through-hole resistor",
            &[
                ("family", "Resistor"),
                ("resistance", "330Ω"),
                ("tolerance", "±5%"),
                ("power", "0.25W"),
            ],
            &["resistor", "330", "ohm"],
            RESISTOR_330_FOOTPRINT,
            vec![pin(0, "pin0", "pin"), pin(1, "pin1", "pin")],
        ),
        part(
            "arduino-uno",
            "Arduino Uno R3",
            "Arduino Uno R3 microcontroller board",
            &[
                ("family", "Arduino"),
                ("type", "Uno R3"),
                ("processor", "ATmega328P"),
            ],
            &["Arduino", "microcontroller", "Uno"],
            ARDUINO_UNO_FOOTPRINT,
            vec![
                pin(0, "D13", "Digital pin 13"),
                pin(1, "GND", "Ground"),
                pin(2, "5V", "5V power"),
            ],
        ),
    ]
}

/// Footprint assets for the sample parts.
pub fn sample_assets() -> MemoryAssets {
    let assets = MemoryAssets::new();
    assets.insert(LED_RED_FOOTPRINT, LED_RED_SVG);
    assets.insert(RESISTOR_330_FOOTPRINT, RESISTOR_330_SVG);
    assets.insert(ARDUINO_UNO_FOOTPRINT, ARDUINO_UNO_SVG);
    assets
}
