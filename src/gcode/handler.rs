//! Applies parsed mixing commands to an engine.

use core::fmt::Write;

use heapless::String;

use crate::error::{CommandError, Error, MixError, Result};
use crate::mixer::{AxisLocks, MixingEngine};

use super::parser::{parse_command, MixCommand};

/// Text reply to a command; empty when the command has nothing to report.
pub type Report = String<128>;

/// Apply `command` to `engine`.
///
/// # Errors
///
/// Propagates the engine's rejection; the engine is unchanged in that case
/// except for collector writes made before the rejection.
pub fn execute<L: AxisLocks>(engine: &mut MixingEngine<L>, command: &MixCommand) -> Result<Report> {
    match *command {
        MixCommand::SetMixFactor { channel, weight } => {
            engine.set_collector(channel, weight)?;
            Ok(Report::new())
        }
        MixCommand::SaveMix { tool } => {
            let tool = tool.unwrap_or_else(|| engine.selected_tool());
            engine.normalize(tool)?;
            Ok(Report::new())
        }
        MixCommand::SetMix { ref factors } => {
            let channels = engine.capabilities().channels() as usize;
            let given = &factors[..channels];
            // no factors keeps the current mix
            if given.iter().all(|f| f.is_none()) {
                return Ok(Report::new());
            }
            for (channel, factor) in given.iter().enumerate() {
                engine.set_collector(channel as u8, factor.unwrap_or(0.0))?;
            }
            engine.normalize(engine.selected_tool())?;
            Ok(Report::new())
        }
        MixCommand::Gradient(ref settings) => {
            engine.update_gradient(settings)?;
            gradient_report(engine)
        }
        MixCommand::SelectTool(tool) => {
            engine.select_tool(tool)?;
            Ok(Report::new())
        }
    }
}

/// Parse and apply one line. Blank and comment-only lines do nothing.
pub fn process_line<L: AxisLocks>(engine: &mut MixingEngine<L>, line: &str) -> Result<Report> {
    match parse_command(line) {
        Ok(command) => execute(engine, &command),
        Err(Error::Command(CommandError::Empty)) => Ok(Report::new()),
        Err(e) => {
            warn!("rejected command line");
            Err(e)
        }
    }
}

/// `Gradient Mix ON ; Start T0 Z0.00 ; End T1 Z10.00 ; Current Z5.00 (50%|50%)`
fn gradient_report<L: AxisLocks>(engine: &mut MixingEngine<L>) -> Result<Report> {
    let (enabled, alias, start, end) = {
        let g = engine
            .gradient()
            .ok_or(Error::Mix(MixError::GradientUnavailable))?;
        (
            g.is_enabled(),
            g.alias(),
            (g.start_vtool(), g.start_z()),
            (g.end_vtool(), g.end_z()),
        )
    };

    let mut report = Report::new();
    let _ = write!(report, "Gradient Mix {}", if enabled { "ON" } else { "OFF" });
    if !enabled {
        return Ok(report);
    }

    if let Some(tool) = alias {
        let _ = write!(report, " (T{})", tool);
    }
    let _ = write!(report, " ; Start T{} Z{:.2}", start.0, start.1);
    let _ = write!(report, " ; End T{} Z{:.2}", end.0, end.1);

    engine.update_mix_from_gradient()?;
    let z = engine.gradient().and_then(|g| g.current_z()).unwrap_or(0.0);
    let _ = write!(report, " ; Current Z{:.2} (", z);
    for (i, pct) in engine.mix().iter().enumerate() {
        let sep = if i == 0 { "" } else { "|" };
        let _ = write!(report, "{}{}%", sep, pct);
    }
    let _ = report.push(')');
    Ok(report)
}
