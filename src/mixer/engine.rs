//! Mixing engine: palette of virtual tools, collector and gradient control.

use crate::config::MixerCapabilities;
use crate::error::{Error, MixError, Result};
use crate::planner::{MixBlock, ZPosition};

use super::gradient::{GradientSettings, GradientState};
use super::locks::{AxisLocks, LockCoordinator};
use super::proportions::MixRow;
use super::{MAX_CHANNELS, MAX_TOOL_SLOTS};

/// Preset ratios for two channels, written to tools 2 and up.
const PRESETS_2: [[f32; 2]; 6] = [
    [1.0, 1.0],
    [3.0, 1.0],
    [1.0, 3.0],
    [1.0, 2.0],
    [2.0, 1.0],
    [3.0, 2.0],
];

/// Preset ratios for three channels, written to tools 3 and up.
const PRESETS_3: [[f32; 3]; 5] = [
    [1.0, 1.0, 1.0],
    [1.0, 3.0, 0.0],
    [0.0, 3.0, 1.0],
    [0.0, 1.0, 1.0],
    [1.0, 1.0, 0.0],
];

/// Owns the palette and drives the lock sink.
///
/// Every palette row is either normalized (max weight [`COLOR_A_MASK`](super::COLOR_A_MASK))
/// or the retract sync row. Mutating calls validate their input before touching any
/// row, and every change to the selected tool's row pushes fresh lock state to the
/// sink before returning.
pub struct MixingEngine<L: AxisLocks> {
    caps: MixerCapabilities,
    locks: LockCoordinator,
    sink: L,
    collector: [f32; MAX_CHANNELS],
    color: [MixRow; MAX_TOOL_SLOTS],
    selected: u8,
    mix: [u8; MAX_CHANNELS],
    gradient: Option<GradientState>,
    retract_saved: Option<u8>,
    last_z: f32,
}

impl<L: AxisLocks> MixingEngine<L> {
    /// Create an engine and run [`init`](Self::init).
    ///
    /// # Errors
    ///
    /// Returns an error if the lock sink rejects the initial lock state.
    pub fn new(caps: MixerCapabilities, sink: L) -> Result<Self> {
        let channels = caps.channels();
        let mut engine = Self {
            locks: LockCoordinator::new(caps.locks()),
            gradient: None,
            sink,
            collector: [0.0; MAX_CHANNELS],
            color: [MixRow::zero(channels); MAX_TOOL_SLOTS],
            selected: 0,
            mix: [0; MAX_CHANNELS],
            retract_saved: None,
            last_z: 0.0,
            caps,
        };
        engine.init()?;
        Ok(engine)
    }

    /// Boot-time state: default palette, tool 0 selected, gradient off.
    pub fn init(&mut self) -> Result<()> {
        let channels = self.caps.channels();
        self.collector = [0.0; MAX_CHANNELS];
        self.selected = 0;
        self.retract_saved = None;
        self.gradient = self
            .caps
            .gradient()
            .then(|| GradientState::new(channels, self.caps.gradient_alias()));

        self.reset_vtools()?;

        if let Some(tool) = self.caps.retract_sync_tool() {
            self.color[tool as usize] = MixRow::full(channels);
        }

        self.update_mix_from_vtool(self.selected)?;
        let z = self.last_z;
        if self.gradient.is_some() {
            self.update_gradient_for_z(z)?;
        }

        info!(
            "mixer init: {} channels, {} tools",
            channels,
            self.caps.virtual_tools()
        );
        Ok(())
    }

    /// Rebuild the default palette.
    ///
    /// Tool `t` gets pure channel `t`; tools past the channel count get pure
    /// channel 0. With presets enabled, the preset ratios are normalized into
    /// the following tools. The collector is cleared afterwards.
    pub fn reset_vtools(&mut self) -> Result<()> {
        let channels = self.caps.channels();
        let tools = self.caps.virtual_tools();

        for t in 0..tools {
            let channel = if t < channels { t } else { 0 };
            self.color[t as usize] = MixRow::pure(channels, channel);
        }

        if self.caps.presets() {
            match channels {
                2 => {
                    for (i, weights) in PRESETS_2.iter().enumerate() {
                        self.normalize_preset(2 + i as u8, weights)?;
                    }
                }
                3 => {
                    for (i, weights) in PRESETS_3.iter().enumerate() {
                        self.normalize_preset(3 + i as u8, weights)?;
                    }
                }
                _ => {}
            }
        }

        self.clear_collector();
        info!("virtual tools reset");
        self.update_locks()
    }

    fn normalize_preset(&mut self, tool: u8, weights: &[f32]) -> Result<()> {
        if tool >= self.caps.virtual_tools() {
            return Ok(());
        }
        self.collector[..weights.len()].copy_from_slice(weights);
        self.normalize(tool)
    }

    /// Scale the collector so its largest weight is full scale and store it in `tool`.
    ///
    /// Locks are recomputed when `tool` is the selected tool.
    ///
    /// # Errors
    ///
    /// - `MixError::ToolOutOfRange` if `tool` is not a virtual tool
    /// - `MixError::DegenerateMix` if the collector is all zero
    ///
    /// The palette is unchanged on error.
    pub fn normalize(&mut self, tool: u8) -> Result<()> {
        self.check_tool(tool)?;

        let row = match MixRow::from_weights(self.collector()) {
            Ok(row) => row,
            Err(e) => {
                warn!("normalize T{} rejected: collector is degenerate", tool);
                return Err(e);
            }
        };

        self.color[tool as usize] = row;
        debug!("normalized T{}: max {}", tool, row.max());

        if tool == self.selected {
            self.update_locks()?;
        }
        self.refresh_gradient();
        Ok(())
    }

    /// Push lock state for the selected tool to the lock sink.
    pub fn update_locks(&mut self) -> Result<()> {
        let row = self.color[self.selected as usize];
        self.locks.apply(&row, &mut self.sink)
    }

    /// Select a virtual tool and recompute locks.
    ///
    /// # Errors
    ///
    /// Returns `MixError::ToolOutOfRange` without changing the selection.
    pub fn select_tool(&mut self, tool: u8) -> Result<()> {
        if let Err(e) = self.check_tool(tool) {
            warn!("T{} rejected: out of range", tool);
            return Err(e);
        }
        self.retract_saved = None;
        self.activate(tool)
    }

    fn activate(&mut self, tool: u8) -> Result<()> {
        self.selected = tool;
        debug!("selected T{}", tool);
        self.update_locks()?;
        self.refresh_gradient();
        self.update_mix_from_vtool(tool)
    }

    /// Switch to the all-channels tool for a retract, remembering the current tool.
    ///
    /// # Errors
    ///
    /// Returns `MixError::RetractSyncUnavailable` if no sync tool is configured.
    pub fn begin_retract_sync(&mut self) -> Result<()> {
        let tool = self
            .caps
            .retract_sync_tool()
            .ok_or(Error::Mix(MixError::RetractSyncUnavailable))?;
        if self.retract_saved.is_none() {
            self.retract_saved = Some(self.selected);
        }
        self.activate(tool)
    }

    /// Restore the tool that was selected before [`begin_retract_sync`](Self::begin_retract_sync).
    pub fn end_retract_sync(&mut self) -> Result<()> {
        match self.retract_saved.take() {
            Some(tool) => self.activate(tool),
            None => Ok(()),
        }
    }

    /// Whether the retract sync tool is active.
    #[inline]
    pub fn in_retract_sync(&self) -> bool {
        self.retract_saved.is_some()
    }

    /// Write `proportion` split by the tool's weights into the collector.
    ///
    /// # Errors
    ///
    /// - `MixError::ToolOutOfRange` if `tool` has no palette row
    /// - `MixError::DegenerateMix` if the row is all zero
    pub fn refresh_collector(&mut self, proportion: f32, tool: u8) -> Result<&[f32]> {
        let mut out = [0.0f32; MAX_CHANNELS];
        self.refresh_collector_into(proportion, tool, &mut out)?;
        self.collector = out;
        Ok(self.collector())
    }

    /// Like [`refresh_collector`](Self::refresh_collector) but writes into `dest`.
    ///
    /// `dest` is untouched on error.
    pub fn refresh_collector_into(&self, proportion: f32, tool: u8, dest: &mut [f32]) -> Result<()> {
        let row = self.tool_row(tool)?;
        let shares = row.proportions(proportion)?;
        let n = dest.len().min(self.caps.channels() as usize);
        dest[..n].copy_from_slice(&shares[..n]);
        Ok(())
    }

    /// Collector weights.
    #[inline]
    pub fn collector(&self) -> &[f32] {
        &self.collector[..self.caps.channels() as usize]
    }

    /// Stage one collector weight. Negative weights are stored as zero.
    ///
    /// # Errors
    ///
    /// - `MixError::ChannelOutOfRange` for an unknown channel
    /// - `MixError::InvalidWeight` for NaN or infinity
    pub fn set_collector(&mut self, channel: u8, weight: f32) -> Result<()> {
        let count = self.caps.channels();
        if channel >= count {
            return Err(Error::Mix(MixError::ChannelOutOfRange { channel, count }));
        }
        if !weight.is_finite() {
            return Err(Error::Mix(MixError::InvalidWeight(weight)));
        }
        self.collector[channel as usize] = weight.max(0.0);
        Ok(())
    }

    /// Zero the collector.
    pub fn clear_collector(&mut self) {
        self.collector = [0.0; MAX_CHANNELS];
    }

    /// Percentage view of the mix being edited.
    #[inline]
    pub fn mix(&self) -> &[u8] {
        &self.mix[..self.caps.channels() as usize]
    }

    /// Load the percentage view from a tool's row.
    pub fn update_mix_from_vtool(&mut self, tool: u8) -> Result<()> {
        self.mix = self.percentages_of(tool)?;
        Ok(())
    }

    /// Overwrite the percentage view. Missing channels read as zero.
    pub fn set_mix(&mut self, mix: &[u8]) {
        self.mix = [0; MAX_CHANNELS];
        let n = mix.len().min(self.caps.channels() as usize);
        for (dst, &pct) in self.mix.iter_mut().zip(&mix[..n]) {
            *dst = pct.min(100);
        }
    }

    /// Store the percentage view into the selected tool.
    ///
    /// # Errors
    ///
    /// Returns `MixError::DegenerateMix` if every percentage is zero.
    pub fn update_vtool_from_mix(&mut self) -> Result<()> {
        let row = MixRow::from_percentages(self.mix())?;
        self.color[self.selected as usize] = row;
        self.update_locks()?;
        self.refresh_gradient();
        Ok(())
    }

    /// Load the percentage view from the gradient's current mix.
    pub fn update_mix_from_gradient(&mut self) -> Result<()> {
        let gradient = self
            .gradient
            .as_ref()
            .ok_or(Error::Mix(MixError::GradientUnavailable))?;
        let n = self.caps.channels() as usize;
        self.mix[..n].copy_from_slice(gradient.mix());
        Ok(())
    }

    /// Gradient state, if the capability is configured.
    #[inline]
    pub fn gradient(&self) -> Option<&GradientState> {
        self.gradient.as_ref()
    }

    /// Change gradient parameters and re-evaluate whether it is active.
    ///
    /// # Errors
    ///
    /// - `MixError::GradientUnavailable` without the gradient capability
    /// - `MixError::ToolOutOfRange` for a start, end or alias tool outside the palette
    pub fn update_gradient(&mut self, settings: &GradientSettings) -> Result<()> {
        if self.gradient.is_none() {
            return Err(Error::Mix(MixError::GradientUnavailable));
        }
        for tool in [settings.start_vtool, settings.end_vtool, settings.alias.flatten()]
            .into_iter()
            .flatten()
        {
            self.check_tool(tool)?;
        }

        if let Some(gradient) = self.gradient.as_mut() {
            gradient.apply(settings);
        }
        self.refresh_gradient();
        Ok(())
    }

    /// Enable or disable the gradient from its current parameters.
    ///
    /// On enabling, the start and end mixes are taken from their tools and the
    /// row is recomputed for the last known Z.
    pub fn refresh_gradient(&mut self) {
        let selected = self.selected;
        let Some(gradient) = self.gradient.as_ref() else {
            return;
        };

        if !gradient.is_usable(selected) {
            if let Some(gradient) = self.gradient.as_mut() {
                gradient.deactivate();
            }
            return;
        }

        let (start_vtool, end_vtool) = (gradient.start_vtool(), gradient.end_vtool());
        let mixes = self
            .percentages_of(start_vtool)
            .and_then(|start| Ok((start, self.percentages_of(end_vtool)?)));

        let z = self.last_z;
        if let Some(gradient) = self.gradient.as_mut() {
            match mixes {
                Ok((start, end)) => {
                    gradient.activate(start, end);
                    gradient.update_for_z(z);
                    debug!("gradient T{} -> T{} active", start_vtool, end_vtool);
                }
                Err(_) => gradient.deactivate(),
            }
        }
    }

    /// Recompute the gradient row for `z`. Skipped when Z has not changed.
    ///
    /// Returns `true` if the row was recomputed.
    pub fn update_gradient_for_z(&mut self, z: f32) -> Result<bool> {
        self.last_z = z;
        let gradient = self
            .gradient
            .as_mut()
            .ok_or(Error::Mix(MixError::GradientUnavailable))?;
        Ok(gradient.update_for_z(z))
    }

    /// Recompute the gradient row from the planner's current Z.
    pub fn update_gradient_for_planner_z<Z: ZPosition + ?Sized>(&mut self, source: &Z) -> Result<bool> {
        self.update_gradient_for_z(source.z_position_mm())
    }

    /// Per-move gradient hook: past the window the end tool is selected and the
    /// row clamps to the end mix, inside it the row is interpolated.
    /// Does nothing while the gradient is off.
    pub fn gradient_control(&mut self, z: f32) -> Result<()> {
        let Some(gradient) = self.gradient.as_ref() else {
            return Ok(());
        };
        if !gradient.is_enabled() {
            self.last_z = z;
            return Ok(());
        }

        if z >= gradient.end_z() {
            let end = gradient.end_vtool();
            if self.selected != end {
                self.activate(end)?;
            }
        }
        // Clamps to the end mix past the window whichever tool was selected before.
        self.update_gradient_for_z(z)?;
        Ok(())
    }

    /// Row new blocks are planned with: the gradient row while it is active,
    /// otherwise the selected tool's row.
    pub fn current_row(&self) -> MixRow {
        match self.gradient.as_ref() {
            Some(gradient) if gradient.is_enabled() => *gradient.color(),
            _ => self.color[self.selected as usize],
        }
    }

    /// Copy the current row into `block`.
    pub fn populate_block(&self, block: &mut MixBlock) {
        block.color = self.current_row();
    }

    /// Selected tool.
    #[inline]
    pub fn selected_tool(&self) -> u8 {
        self.selected
    }

    /// Row of any palette slot, including the retract sync tool.
    pub fn tool_row(&self, tool: u8) -> Result<&MixRow> {
        let count = self.caps.tool_slots();
        if tool >= count {
            return Err(Error::Mix(MixError::ToolOutOfRange { tool, count }));
        }
        Ok(&self.color[tool as usize])
    }

    /// Capabilities the engine was built with.
    #[inline]
    pub fn capabilities(&self) -> &MixerCapabilities {
        &self.caps
    }

    /// Lock coordinator.
    #[inline]
    pub fn lock_coordinator(&self) -> &LockCoordinator {
        &self.locks
    }

    /// Lock sink.
    #[inline]
    pub fn lock_sink(&self) -> &L {
        &self.sink
    }

    /// Consume the engine, returning the lock sink.
    pub fn release(self) -> L {
        self.sink
    }

    fn check_tool(&self, tool: u8) -> Result<()> {
        let count = self.caps.virtual_tools();
        if tool >= count {
            return Err(Error::Mix(MixError::ToolOutOfRange { tool, count }));
        }
        Ok(())
    }

    fn percentages_of(&self, tool: u8) -> Result<[u8; MAX_CHANNELS]> {
        self.tool_row(tool)?.percentages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::{LockMask, COLOR_A_MASK};
    use proptest::prelude::*;

    fn two_channel_locked() -> MixingEngine<LockMask> {
        let caps = MixerCapabilities::new(2, 8)
            .unwrap()
            .with_presets(true)
            .with_lock(0)
            .unwrap()
            .with_lock(1)
            .unwrap();
        MixingEngine::new(caps, LockMask::new()).unwrap()
    }

    fn assert_locks_match(engine: &MixingEngine<LockMask>) {
        let row = engine.tool_row(engine.selected_tool()).unwrap();
        for binding in engine.lock_coordinator().bindings() {
            assert_eq!(
                engine.lock_sink().is_locked(binding.actuator),
                row.weight(binding.channel) == 0
            );
        }
    }

    #[test]
    fn test_init_palette() {
        let engine = two_channel_locked();
        assert_eq!(engine.selected_tool(), 0);
        assert_eq!(engine.tool_row(0).unwrap().weights(), &[COLOR_A_MASK, 0]);
        assert_eq!(engine.tool_row(1).unwrap().weights(), &[0, COLOR_A_MASK]);
        assert_eq!(engine.mix(), &[100, 0]);
        assert!(engine.collector().iter().all(|&c| c == 0.0));
        assert_locks_match(&engine);
    }

    #[test]
    fn test_two_channel_presets() {
        let engine = two_channel_locked();
        assert_eq!(engine.tool_row(2).unwrap().weights(), &[128, 128]);
        assert_eq!(engine.tool_row(3).unwrap().weights(), &[128, 43]);
        assert_eq!(engine.tool_row(4).unwrap().weights(), &[43, 128]);
        assert_eq!(engine.tool_row(5).unwrap().weights(), &[64, 128]);
        assert_eq!(engine.tool_row(6).unwrap().weights(), &[128, 64]);
        assert_eq!(engine.tool_row(7).unwrap().weights(), &[128, 85]);
    }

    #[test]
    fn test_three_channel_presets_and_padding() {
        let caps = MixerCapabilities::new(3, 10).unwrap().with_presets(true);
        let engine = MixingEngine::new(caps, LockMask::new()).unwrap();

        assert_eq!(engine.tool_row(3).unwrap().weights(), &[128, 128, 128]);
        assert_eq!(engine.tool_row(4).unwrap().weights(), &[43, 128, 0]);
        assert_eq!(engine.tool_row(7).unwrap().weights(), &[128, 128, 0]);
        // past the presets: pure channel 0
        assert_eq!(engine.tool_row(8).unwrap().weights(), &[128, 0, 0]);
    }

    #[test]
    fn test_without_presets_tools_past_channels_are_channel_zero() {
        let caps = MixerCapabilities::new(2, 4).unwrap();
        let engine = MixingEngine::new(caps, LockMask::new()).unwrap();
        assert_eq!(engine.tool_row(2).unwrap().weights(), &[COLOR_A_MASK, 0]);
        assert_eq!(engine.tool_row(3).unwrap().weights(), &[COLOR_A_MASK, 0]);
    }

    #[test]
    fn test_normalize_selected_updates_locks() {
        let mut engine = two_channel_locked();
        assert!(engine.lock_sink().is_locked(1));

        engine.set_collector(0, 1.0).unwrap();
        engine.set_collector(1, 3.0).unwrap();
        engine.normalize(0).unwrap();

        assert_eq!(engine.tool_row(0).unwrap().weights(), &[43, COLOR_A_MASK]);
        assert!(!engine.lock_sink().is_locked(0));
        assert!(!engine.lock_sink().is_locked(1));
    }

    #[test]
    fn test_degenerate_normalize_leaves_palette() {
        let mut engine = two_channel_locked();
        let before = *engine.tool_row(3).unwrap();

        assert_eq!(
            engine.normalize(3),
            Err(Error::Mix(MixError::DegenerateMix))
        );
        assert_eq!(*engine.tool_row(3).unwrap(), before);
    }

    #[test]
    fn test_out_of_range_tool() {
        let mut engine = two_channel_locked();
        engine.set_collector(0, 1.0).unwrap();

        assert!(matches!(
            engine.normalize(8),
            Err(Error::Mix(MixError::ToolOutOfRange { tool: 8, count: 8 }))
        ));
        assert!(engine.select_tool(8).is_err());
        assert_eq!(engine.selected_tool(), 0);
        assert!(engine.refresh_collector(1.0, 9).is_err());
    }

    #[test]
    fn test_select_tool_updates_locks() {
        let mut engine = two_channel_locked();
        engine.select_tool(1).unwrap();
        assert!(engine.lock_sink().is_locked(0));
        assert!(!engine.lock_sink().is_locked(1));
        assert_eq!(engine.mix(), &[0, 100]);

        engine.select_tool(2).unwrap();
        assert_eq!(engine.lock_sink().bits(), 0);
    }

    #[test]
    fn test_set_collector_clamps_negative() {
        let mut engine = two_channel_locked();
        engine.set_collector(0, -2.0).unwrap();
        assert_eq!(engine.collector()[0], 0.0);
        assert!(engine.set_collector(0, f32::NAN).is_err());
        assert!(engine.set_collector(2, 1.0).is_err());
    }

    #[test]
    fn test_refresh_collector_splits_proportion() {
        let mut engine = two_channel_locked();
        let c = engine.refresh_collector(2.0, 2).unwrap();
        assert!((c[0] - 1.0).abs() < 1e-6);
        assert!((c[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_mix_round_trip_to_selected_tool() {
        let mut engine = two_channel_locked();
        engine.set_mix(&[25, 75]);
        engine.update_vtool_from_mix().unwrap();
        assert_eq!(engine.tool_row(0).unwrap().weights(), &[43, COLOR_A_MASK]);
        assert_locks_match(&engine);

        engine.set_mix(&[0, 0]);
        assert!(engine.update_vtool_from_mix().is_err());
        assert_eq!(engine.tool_row(0).unwrap().weights(), &[43, COLOR_A_MASK]);
    }

    #[test]
    fn test_retract_sync() {
        let caps = MixerCapabilities::new(2, 4)
            .unwrap()
            .with_retract_sync(true)
            .with_lock(0)
            .unwrap()
            .with_lock(1)
            .unwrap();
        let mut engine = MixingEngine::new(caps, LockMask::new()).unwrap();
        engine.select_tool(1).unwrap();
        assert!(engine.lock_sink().is_locked(0));

        engine.begin_retract_sync().unwrap();
        assert_eq!(engine.selected_tool(), 4);
        assert_eq!(engine.current_row().weights(), &[COLOR_A_MASK, COLOR_A_MASK]);
        assert_eq!(engine.lock_sink().bits(), 0);

        engine.end_retract_sync().unwrap();
        assert_eq!(engine.selected_tool(), 1);
        assert!(engine.lock_sink().is_locked(0));
        // the sync tool cannot be picked directly
        assert!(engine.select_tool(4).is_err());
    }

    #[test]
    fn test_retract_sync_unavailable() {
        let mut engine = two_channel_locked();
        assert_eq!(
            engine.begin_retract_sync(),
            Err(Error::Mix(MixError::RetractSyncUnavailable))
        );
    }

    fn gradient_engine(alias: Option<u8>) -> MixingEngine<LockMask> {
        let caps = MixerCapabilities::new(2, 4)
            .unwrap()
            .with_gradient(alias)
            .unwrap();
        let mut engine = MixingEngine::new(caps, LockMask::new()).unwrap();
        engine
            .update_gradient(&GradientSettings {
                start_z: Some(0.0),
                end_z: Some(10.0),
                start_vtool: Some(0),
                end_vtool: Some(1),
                ..Default::default()
            })
            .unwrap();
        engine
    }

    #[test]
    fn test_gradient_controls_blocks() {
        let mut engine = gradient_engine(None);
        assert!(engine.gradient().unwrap().is_enabled());

        engine.gradient_control(5.0).unwrap();
        assert_eq!(engine.current_row().weights(), &[COLOR_A_MASK, COLOR_A_MASK]);

        engine.gradient_control(10.0).unwrap();
        assert_eq!(engine.selected_tool(), 1);
        assert_eq!(engine.current_row().weights(), &[0, COLOR_A_MASK]);
    }

    #[test]
    fn test_gradient_past_window_with_end_tool_selected() {
        let mut engine = gradient_engine(None);
        engine.select_tool(1).unwrap();
        assert!(engine.gradient().unwrap().is_enabled());

        engine.gradient_control(5.0).unwrap();
        assert_eq!(engine.current_row().weights(), &[COLOR_A_MASK, COLOR_A_MASK]);

        engine.gradient_control(12.0).unwrap();
        assert_eq!(engine.selected_tool(), 1);
        assert_eq!(engine.current_row().weights(), &[0, COLOR_A_MASK]);

        let mut block = MixBlock::new(10, crate::motion::Direction::Extrude, MixRow::zero(2));
        engine.populate_block(&mut block);
        assert_eq!(block.color.weights(), &[0, COLOR_A_MASK]);
    }

    #[test]
    fn test_gradient_alias_gates_activation() {
        let mut engine = gradient_engine(Some(3));
        assert!(!engine.gradient().unwrap().is_enabled());

        engine.select_tool(3).unwrap();
        assert!(engine.gradient().unwrap().is_enabled());

        engine.select_tool(0).unwrap();
        assert!(!engine.gradient().unwrap().is_enabled());
    }

    #[test]
    fn test_gradient_rejects_bad_tools() {
        let mut engine = gradient_engine(None);
        let err = engine.update_gradient(&GradientSettings {
            end_vtool: Some(9),
            ..Default::default()
        });
        assert!(matches!(err, Err(Error::Mix(MixError::ToolOutOfRange { .. }))));
        assert_eq!(engine.gradient().unwrap().end_vtool(), 1);
    }

    #[test]
    fn test_gradient_unavailable() {
        let mut engine = two_channel_locked();
        assert!(engine.update_gradient(&GradientSettings::default()).is_err());
        assert!(engine.update_gradient_for_z(1.0).is_err());
        assert!(engine.gradient_control(1.0).is_ok());
    }

    #[test]
    fn test_populate_block_copies_row() {
        let mut engine = two_channel_locked();
        engine.select_tool(4).unwrap();
        let mut block = MixBlock::new(100, crate::motion::Direction::Extrude, MixRow::zero(2));
        engine.populate_block(&mut block);
        assert_eq!(block.color.weights(), &[43, COLOR_A_MASK]);
    }

    proptest! {
        #[test]
        fn prop_normalize_full_scale_and_idempotent(a in 0.0f32..1000.0, b in 0.0f32..1000.0) {
            prop_assume!(a > 0.0 || b > 0.0);
            let mut engine = two_channel_locked();
            engine.set_collector(0, a).unwrap();
            engine.set_collector(1, b).unwrap();

            engine.normalize(5).unwrap();
            let first = *engine.tool_row(5).unwrap();
            prop_assert_eq!(first.max(), COLOR_A_MASK);

            engine.normalize(5).unwrap();
            prop_assert_eq!(*engine.tool_row(5).unwrap(), first);
        }

        #[test]
        fn prop_locks_follow_selected_row(tool in 0u8..8) {
            let mut engine = two_channel_locked();
            engine.select_tool(tool).unwrap();
            assert_locks_match(&engine);
        }
    }
}
