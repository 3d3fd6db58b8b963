//! Program assembly
//!
//! Wraps compiled layer streams into a complete program: user header, unit
//! word, optional homing, a comment banner per layer, the optional back-side
//! pass and a user footer.

use crate::emitter::CommandStream;
use crate::job::{CompiledJob, CompiledLayer};
use plotkit_core::{get_unit_label, MeasurementSystem};
use serde::{Deserialize, Serialize};

/// Width of the layer banner between the `;(` and `)` delimiters.
const BANNER_WIDTH: usize = 60;

/// Number of tool slots; tool numbers wrap after this.
pub const TOOL_SLOTS: u32 = 32;

/// Options for program assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramOptions {
    /// Text written before anything else
    pub header: Option<String>,
    /// Text written after everything else
    pub footer: Option<String>,
    pub units: MeasurementSystem,
    /// Home X and Y before the first layer
    pub home_before: bool,
    /// Return to the origin after the last layer
    pub home_after: bool,
    /// Write a comment banner before each layer
    pub layer_banners: bool,
    /// Tool loaded when the program starts
    pub starting_tool: u32,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            header: None,
            footer: None,
            units: MeasurementSystem::Metric,
            home_before: true,
            home_after: false,
            layer_banners: true,
            starting_tool: 0,
        }
    }
}

/// Tool change to the slot after `current`, and the new current slot.
pub fn tool_change(current: u32) -> (String, u32) {
    let next = (current % TOOL_SLOTS + 1) % TOOL_SLOTS;
    (format!("T{} M6", current % TOOL_SLOTS + 1), next)
}

/// Comment banner announcing a layer.
pub fn layer_banner(name: &str, feed: u32) -> Vec<String> {
    let rule = format!(";({})", "*".repeat(BANNER_WIDTH));
    vec![
        rule.clone(),
        format!(";(***** Layer: {:<41} *****)", name),
        format!(";(***** Feed Rate: {:<37} *****)", feed),
        rule,
        format!(";(MSG,Starting layer '{}')", name),
        String::new(),
    ]
}

/// Assembles a compiled job into program text.
///
/// `pen_up` is the lift macro; every layer that draws anything ends with it.
pub fn render_program(job: &CompiledJob, options: &ProgramOptions, pen_up: &[String]) -> String {
    let mut program = CommandStream::new();

    if let Some(header) = &options.header {
        program.extend(header.lines());
    }
    program.push(format!(
        "{} ; All units in {}",
        options.units.units_word(),
        get_unit_label(options.units)
    ));
    if options.home_before {
        program.push("G28 X Y ; home X and Y");
    }
    program.push("");

    write_layers(&mut program, &job.layers, options, pen_up);

    if !job.back_layers.is_empty() {
        program.push("");
        program.push(";(MSG,Please flip over material)");
        program.push("");
        let (change, _) = tool_change(options.starting_tool);
        program.push(change);
        write_layers(&mut program, &job.back_layers, options, pen_up);
    }

    if options.home_after {
        program.push("");
        program.push("G00 X0 Y0 F4000 ; home");
    }
    if let Some(footer) = &options.footer {
        program.extend(footer.lines());
    }
    program.to_text()
}

fn write_layers(
    program: &mut CommandStream,
    layers: &[CompiledLayer],
    options: &ProgramOptions,
    pen_up: &[String],
) {
    for layer in layers {
        if options.layer_banners {
            program.extend(layer_banner(&layer.id, layer.feed));
        }
        program.extend(layer.commands.lines().iter().cloned());
        if !layer.commands.is_empty() && !layer.commands.ends_with(pen_up) {
            program.extend(pen_up.iter().cloned());
        }
    }
}
